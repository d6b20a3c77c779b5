//! # Incremental engine
//!
//! Each step breeds `num_offspring` children (in pairs, with a single child
//! when the count is odd) and inserts them one at a time, each displacing an
//! existing member chosen by the [`ReplacementStrategy`] or by a custom
//! replacement function.
//!
//! A custom function receives the child and the population and returns the
//! storage index of the member to displace. Crowding is the classic use:
//!
//! ```rust
//! use evopop::error::Result;
//! use evopop::evolution::{GaOptions, GeneticAlgorithm, IncrementalGa};
//! use evopop::genome::{Genome, Individual};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Point(f64);
//!
//! impl Genome for Point {
//!     fn evaluate(&self) -> Result<f64> {
//!         Ok(self.0)
//!     }
//!
//!     fn compare(&self, other: &Self) -> Result<f64> {
//!         Ok((self.0 - other.0).abs().min(1.0))
//!     }
//! }
//!
//! let options = GaOptions::builder().population_size(6).num_generations(3).build().unwrap();
//! let mut ga = IncrementalGa::new(&Individual::new(Point(0.5)), options).unwrap();
//!
//! // Displace the most similar member.
//! ga.set_custom_replacement(|child, population| {
//!     population
//!         .iter()
//!         .enumerate()
//!         .map(|(i, m)| (i, child.compare(m).unwrap_or(1.0)))
//!         .fold((0, f64::INFINITY), |best, (i, d)| if d < best.1 { (i, d) } else { best })
//!         .0
//! });
//!
//! ga.evolve(8).unwrap();
//! assert_eq!(ga.population().len(), 6);
//! ```

use std::fmt;
use std::sync::Arc;

use super::core::{member, GaCore, GeneticAlgorithm, Tally};
use super::options::{GaOptions, ReplacementStrategy};
use crate::error::{GeneticError, Result};
use crate::genome::{CloneMode, Genome, Individual};
use crate::population::{Population, SortBasis};

/// Chooses the storage index of the member a child displaces.
pub type CustomReplacement<G> =
    Arc<dyn Fn(&Individual<G>, &Population<G>) -> usize + Send + Sync>;

pub struct IncrementalGa<G: Genome> {
    core: GaCore<G>,
    population: Population<G>,
    children: Vec<Individual<G>>,
    custom: Option<CustomReplacement<G>>,
}

impl<G: Genome> fmt::Debug for IncrementalGa<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncrementalGa")
            .field("core", &self.core)
            .field("population", &self.population)
            .field("children", &self.children.len())
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

impl<G: Genome> IncrementalGa<G> {
    pub fn new(template: &Individual<G>, options: GaOptions) -> Result<Self> {
        let population = Population::new(template, options.get_population_size());
        Self::from_population(population, options)
    }

    pub fn from_population(mut population: Population<G>, mut options: GaOptions) -> Result<Self> {
        options.set_population_size(population.len());
        let core = GaCore::new(options)?;
        population.set_order(core.options.get_goal().order());
        Ok(Self {
            core,
            population,
            children: Vec::new(),
            custom: None,
        })
    }

    pub fn num_offspring(&self) -> usize {
        self.core.options.get_num_offspring()
    }

    pub fn set_num_offspring(&mut self, n: usize) -> Result<()> {
        if n == 0 {
            return Err(GeneticError::Configuration(
                "number of offspring cannot be zero".to_string(),
            ));
        }
        self.core.options.set_num_offspring(n);
        Ok(())
    }

    pub fn replacement_strategy(&self) -> ReplacementStrategy {
        self.core.options.get_replacement_strategy()
    }

    /// Selects a built-in strategy and drops any custom replacement function.
    pub fn set_replacement_strategy(&mut self, strategy: ReplacementStrategy) {
        self.core.options.set_replacement_strategy(strategy);
        self.custom = None;
    }

    /// Installs a custom replacement function. It takes precedence over the
    /// configured strategy until [`set_replacement_strategy`] is called.
    ///
    /// [`set_replacement_strategy`]: Self::set_replacement_strategy
    pub fn set_custom_replacement<F>(&mut self, replace: F)
    where
        F: Fn(&Individual<G>, &Population<G>) -> usize + Send + Sync + 'static,
    {
        self.custom = Some(Arc::new(replace));
    }

    fn prepare_children(&mut self) {
        let wanted = self.core.options.get_num_offspring();
        self.children.truncate(wanted);
        if let Some(template) = self.population.member(0) {
            while self.children.len() < wanted {
                self.children.push(template.clone_with(CloneMode::Attributes));
            }
        }
    }

    /// Storage index in `population` the `k`-th child displaces.
    /// `parents[k]` is the parent the child is paired with.
    fn victim(
        &mut self,
        population: &mut Population<G>,
        k: usize,
        parents: &[usize],
    ) -> Result<usize> {
        let len = population.len();
        if let Some(replace) = &self.custom {
            let index = replace(&self.children[k], population);
            if index >= len {
                return Err(GeneticError::IndexOutOfRange { index, len });
            }
            return Ok(index);
        }

        match self.core.options.get_replacement_strategy() {
            ReplacementStrategy::Worst => population.worst_index(0, SortBasis::Raw),
            ReplacementStrategy::Random => Ok(self.core.rng.random_index(len)),
            ReplacementStrategy::Parent => {
                // Both children of a self-mating would land on the same slot.
                if k % 2 == 1 && parents[k - 1] == parents[k] {
                    population.worst_index(0, SortBasis::Raw)
                } else {
                    Ok(parents[k])
                }
            }
        }
    }
}

impl<G: Genome> GeneticAlgorithm<G> for IncrementalGa<G> {
    fn core(&self) -> &GaCore<G> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut GaCore<G> {
        &mut self.core
    }

    fn population(&self) -> &Population<G> {
        &self.population
    }

    fn population_mut(&mut self) -> &mut Population<G> {
        &mut self.population
    }

    fn initialize(&mut self, seed: u32) -> Result<()> {
        self.core.reseed(seed);
        let evaluations = self.core.initialize_population(&mut self.population)?;
        self.core.stats.reset(&mut self.population)?;
        self.core.stats.count_evaluations(evaluations);
        self.children.clear();
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        self.prepare_children();
        let n = self.children.len();
        let mut tally = Tally::default();
        let mut parents = Vec::with_capacity(n);

        {
            let core = &mut self.core;
            let population = &mut self.population;
            let children = &mut self.children;

            let mut i = 0;
            while i < n {
                let mom_index = population.select(&mut core.rng)?;
                let dad_index = population.select(&mut core.rng)?;
                tally.selections += 2;
                let mom = member(population, mom_index)?;
                let dad = member(population, dad_index)?;
                if i + 1 < n {
                    let (head, tail) = children.split_at_mut(i + 1);
                    core.breed_pair(mom, dad, &mut head[i], &mut tail[0], &mut tally)?;
                    parents.push(mom_index);
                    parents.push(dad_index);
                } else {
                    core.breed_one(mom, dad, &mut children[i], &mut tally)?;
                    parents.push(mom_index);
                }
                i += 2;
            }

            for child in children.iter_mut() {
                tally.evaluations += core.evaluate_individual(child)?;
            }
        }

        // Each insertion can move the worst, so insert into a copy and keep
        // it only if every child found a slot.
        let mut next = self.population.clone();
        for k in 0..n {
            let index = self.victim(&mut next, k, &parents)?;
            next.set_member(index, self.children[k].clone())?;
            tally.replacements += 1;
        }
        self.population = next;

        tally.record(&mut self.core.stats);
        self.core.stats.update(&mut self.population)?;
        self.core.log_generation(&self.population);
        Ok(())
    }
}
