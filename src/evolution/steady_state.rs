//! # Steady-state engine
//!
//! The population persists across generations. Each step breeds a batch of
//! children sized by [`Replacement`](super::options::Replacement), adds them,
//! and then drops the same number of members from the worst end of the
//! fitness ordering, so the population size never changes.

use super::core::{GaCore, GeneticAlgorithm};
use super::options::{GaOptions, Replacement};
use crate::error::Result;
use crate::genome::{CloneMode, Genome, Individual};
use crate::population::Population;

#[derive(Debug)]
pub struct SteadyStateGa<G: Genome> {
    core: GaCore<G>,
    population: Population<G>,
    scratch: Vec<Individual<G>>,
}

impl<G: Genome> SteadyStateGa<G> {
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
        Ok(Self {
            core,
            population,
            scratch: Vec::new(),
        })
    }

    pub fn replacement(&self) -> Replacement {
        self.core.options.get_replacement()
    }

    /// Changes how many members are replaced per generation. Takes effect on
    /// the next step.
    pub fn set_replacement(&mut self, replacement: Replacement) -> Result<()> {
        let previous = self.core.options.get_replacement();
        self.core.options.set_replacement(replacement);
        if let Err(e) = self.core.options.validate() {
            self.core.options.set_replacement(previous);
            return Err(e);
        }
        Ok(())
    }

    /// Sizes the child buffer for the current population and replacement
    /// setting.
    fn prepare_scratch(&mut self) {
        let wanted = self
            .core
            .options
            .get_replacement()
            .count(self.population.len());
        if self.scratch.len() == wanted {
            return;
        }
        self.scratch.truncate(wanted);
        if let Some(template) = self.population.member(0) {
            while self.scratch.len() < wanted {
                self.scratch.push(template.clone_with(CloneMode::Attributes));
            }
        }
    }
}

impl<G: Genome> GeneticAlgorithm<G> for SteadyStateGa<G> {
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
        self.scratch.clear();
        self.prepare_scratch();
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        self.prepare_scratch();
        let tally = self
            .core
            .steady_state_step(&mut self.population, &mut self.scratch)?;

        tally.record(&mut self.core.stats);
        self.core.stats.update(&mut self.population)?;
        self.core.log_generation(&self.population);
        Ok(())
    }
}
