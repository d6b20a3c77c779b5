//! # Generational engine
//!
//! Every step builds an entirely new population from parents drawn out of the
//! previous one. With elitism enabled, the previous generation's best replaces
//! the new generation's worst whenever it is strictly better than everything
//! the new generation produced.
//!
//! ## Example
//!
//! ```rust
//! use evopop::error::Result;
//! use evopop::evolution::{GaOptions, GeneticAlgorithm, SimpleGa};
//! use evopop::genome::{Genome, Individual};
//! use evopop::rng::RandomNumberGenerator;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Ones(Vec<bool>);
//!
//! impl Genome for Ones {
//!     fn initialize(&mut self, rng: &mut RandomNumberGenerator) -> Result<()> {
//!         self.0.iter_mut().for_each(|b| *b = rng.random_bit());
//!         Ok(())
//!     }
//!
//!     fn mutate(&mut self, p: f64, rng: &mut RandomNumberGenerator) -> Result<usize> {
//!         let mut n = 0;
//!         for b in self.0.iter_mut() {
//!             if rng.flip_coin(p) {
//!                 *b = !*b;
//!                 n += 1;
//!             }
//!         }
//!         Ok(n)
//!     }
//!
//!     fn evaluate(&self) -> Result<f64> {
//!         Ok(self.0.iter().filter(|b| **b).count() as f64)
//!     }
//! }
//!
//! let options = GaOptions::builder()
//!     .population_size(10)
//!     .num_generations(5)
//!     .build()
//!     .unwrap();
//! let mut ga = SimpleGa::new(&Individual::new(Ones(vec![false; 8])), options).unwrap();
//! let best = ga.evolve(42).unwrap();
//! assert_eq!(ga.statistics().generation(), 5);
//! assert!(best.score() <= 8.0);
//! ```

use tracing::debug;

use super::core::{member, GaCore, GeneticAlgorithm, Tally};
use super::options::GaOptions;
use crate::error::Result;
use crate::genome::{Genome, Individual};
use crate::population::{Population, SortBasis};

#[derive(Debug)]
pub struct SimpleGa<G: Genome> {
    core: GaCore<G>,
    population: Population<G>,
    previous: Population<G>,
}

impl<G: Genome> SimpleGa<G> {
    /// An engine whose population holds `population_size` copies of
    /// `template`.
    pub fn new(template: &Individual<G>, options: GaOptions) -> Result<Self> {
        let population = Population::new(template, options.get_population_size());
        Self::from_population(population, options)
    }

    /// An engine around an existing population. Its scaling and selection
    /// schemes are kept; its size overrides the configured one.
    pub fn from_population(mut population: Population<G>, mut options: GaOptions) -> Result<Self> {
        options.set_population_size(population.len());
        let core = GaCore::new(options)?;
        population.set_order(core.options.get_goal().order());
        let previous = population.clone();
        Ok(Self {
            core,
            population,
            previous,
        })
    }

    pub fn elitism(&self) -> bool {
        self.core.options.get_elitism()
    }

    pub fn set_elitism(&mut self, elitism: bool) {
        self.core.options.set_elitism(elitism);
    }

    /// Fills `population` with children of `previous`, scores them and
    /// carries the elite over. Leaves `previous` untouched.
    fn breed_generation(&mut self, tally: &mut Tally) -> Result<()> {
        let n = self.previous.len();
        let core = &mut self.core;
        let previous = &mut self.previous;
        let children = self.population.members_mut();

        let mut i = 0;
        while i < n {
            let mom = previous.select(&mut core.rng)?;
            let dad = previous.select(&mut core.rng)?;
            tally.selections += 2;
            let mom = member(previous, mom)?;
            let dad = member(previous, dad)?;
            if i + 1 < n {
                let (head, tail) = children.split_at_mut(i + 1);
                core.breed_pair(mom, dad, &mut head[i], &mut tail[0], tally)?;
            } else {
                core.breed_one(mom, dad, &mut children[i], tally)?;
            }
            i += 2;
        }

        tally.evaluations += self.core.evaluate(&mut self.population)?;
        if self.core.options.get_elitism() {
            self.carry_elite()?;
        }
        Ok(())
    }

    fn carry_elite(&mut self) -> Result<()> {
        let order = self.population.order();
        let elite = self.previous.best_index(0, SortBasis::Raw)?;
        let elite_score = member(&self.previous, elite)?.score();
        let new_best = self.population.best(0, SortBasis::Raw)?.score();
        if !order.is_better(elite_score, new_best) {
            return Ok(());
        }

        let worst = self.population.worst_index(0, SortBasis::Raw)?;
        let elite = member(&self.previous, elite)?.clone();
        self.population.set_member(worst, elite)?;
        debug!(score = elite_score, replaced = worst, "elite carried over");
        Ok(())
    }
}

impl<G: Genome> GeneticAlgorithm<G> for SimpleGa<G> {
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
        self.previous = self.population.clone();
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        std::mem::swap(&mut self.population, &mut self.previous);
        if self.population.len() != self.previous.len() {
            self.population = self.previous.clone();
        }

        let mut tally = Tally::default();
        if let Err(e) = self.breed_generation(&mut tally) {
            // The current generation is still intact in `previous`.
            std::mem::swap(&mut self.population, &mut self.previous);
            return Err(e);
        }
        tally.replacements += self.population.len();

        tally.record(&mut self.core.stats);
        self.core.stats.update(&mut self.population)?;
        self.core.log_generation(&self.population);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::testing::{Bits, Real};

    fn options(generations: usize) -> GaOptions {
        GaOptions::builder()
            .population_size(12)
            .num_generations(generations)
            .p_mutation(0.05)
            .seed(9)
            .build()
            .unwrap()
    }

    fn engine(generations: usize) -> SimpleGa<Bits> {
        SimpleGa::new(&Individual::new(Bits::zeros(16)), options(generations)).unwrap()
    }

    #[test]
    fn test_step_keeps_population_size() {
        let mut ga = engine(10);
        ga.initialize(0).unwrap();
        for _ in 0..5 {
            ga.step().unwrap();
            assert_eq!(ga.population().len(), 12);
            ga.population().check_consistency().unwrap();
        }
        assert_eq!(ga.statistics().generation(), 5);
        assert_eq!(ga.statistics().selections(), 5 * 12);
        assert_eq!(ga.statistics().replacements(), 5 * 12);
    }

    #[test]
    fn test_odd_population_size() {
        let options = GaOptions::builder()
            .population_size(7)
            .num_generations(3)
            .build()
            .unwrap();
        let mut ga = SimpleGa::new(&Individual::new(Bits::zeros(8)), options).unwrap();
        ga.evolve(4).unwrap();
        assert_eq!(ga.population().len(), 7);
        assert_eq!(ga.statistics().selections(), 3 * 8);
    }

    #[test]
    fn test_elitism_never_loses_the_best() {
        let mut ga = engine(30);
        ga.initialize(0).unwrap();
        let mut best = ga.population_mut().max();
        while !ga.done() {
            ga.step().unwrap();
            let current = ga.population_mut().max();
            assert!(current >= best);
            best = current;
        }
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let run = || {
            let mut ga = engine(15);
            ga.initialize(0).unwrap();
            let mut means = vec![];
            while !ga.done() {
                ga.step().unwrap();
                means.push(ga.statistics().current().mean);
            }
            means
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_runs_without_operators() {
        let options = GaOptions::builder()
            .population_size(4)
            .num_generations(3)
            .build()
            .unwrap();
        let mut ga = SimpleGa::new(&Individual::new(Real(2.0)), options).unwrap();
        let best = ga.evolve(1).unwrap();
        assert_eq!(best.score(), 2.0);
        assert_eq!(ga.statistics().mutations(), 0);
        assert_eq!(ga.statistics().crossovers(), 0);
    }

    #[test]
    fn test_minimizing_moves_toward_zero() {
        let options = GaOptions::builder()
            .population_size(20)
            .num_generations(40)
            .goal(crate::evolution::options::Goal::Minimize)
            .build()
            .unwrap();
        let mut ga = SimpleGa::new(&Individual::new(Bits::zeros(16)), options).unwrap();
        ga.population_mut()
            .set_scaling(crate::scaling::NoScaling);
        ga.population_mut()
            .set_selector(crate::selection::TournamentSelector::default());
        ga.initialize(3).unwrap();
        let initial = ga.statistics().current().min;
        let best = ga.evolve(3).unwrap();
        assert!(best.score() <= initial);
        assert_eq!(ga.statistics().best_ever(), best.score());
    }
}
