//! # Deme engine
//!
//! Several sub-populations ("demes") evolve side by side, each with a
//! steady-state step per generation. Every `migration_frequency` generations
//! the `migration_count` best members of each deme are copied over the worst
//! members of the next deme around a ring. Migration copies values, so the
//! total number of individuals never changes.
//!
//! Demes are stepped one after another on the calling thread, all drawing
//! from the engine's single random stream.
//!
//! The engine's own [`population`](GeneticAlgorithm::population) holds the
//! current best of each deme, and the overall statistics are computed over it.
//! Each deme also keeps statistics of its own.

use tracing::debug;

use super::core::{GaCore, GeneticAlgorithm};
use super::options::{GaOptions, LogLevel};
use crate::error::{GeneticError, Result};
use crate::genome::{CloneMode, Genome, Individual};
use crate::population::{Population, SortBasis};
use crate::scaling::ScalingScheme;
use crate::selection::SelectionScheme;
use crate::statistics::Statistics;

#[derive(Debug)]
pub struct DemeGa<G: Genome> {
    core: GaCore<G>,
    population: Population<G>,
    demes: Vec<Population<G>>,
    deme_stats: Vec<Statistics<G>>,
    scratch: Vec<Vec<Individual<G>>>,
}

impl<G: Genome> DemeGa<G> {
    /// `num_populations` demes of `population_size` copies of `template`.
    pub fn new(template: &Individual<G>, options: GaOptions) -> Result<Self> {
        let core = GaCore::new(options)?;
        let order = core.options.get_goal().order();
        let count = core.options.get_num_populations();
        let size = core.options.get_population_size();

        let demes = (0..count)
            .map(|_| Population::new(template, size).with_order(order))
            .collect();
        let deme_stats = (0..count)
            .map(|_| {
                let mut stats = Statistics::new();
                GaCore::configure_statistics(&mut stats, &core.options, false)?;
                Ok(stats)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            population: Population::new(template, count).with_order(order),
            demes,
            deme_stats,
            scratch: vec![Vec::new(); count],
            core,
        })
    }

    pub fn num_demes(&self) -> usize {
        self.demes.len()
    }

    pub fn deme(&self, index: usize) -> Option<&Population<G>> {
        self.demes.get(index)
    }

    pub fn deme_mut(&mut self, index: usize) -> Option<&mut Population<G>> {
        self.demes.get_mut(index)
    }

    pub fn deme_statistics(&self, index: usize) -> Option<&Statistics<G>> {
        self.deme_stats.get(index)
    }

    /// Total number of individuals across every deme.
    pub fn total_size(&self) -> usize {
        self.demes.iter().map(Population::len).sum()
    }

    /// Resizes one deme. Growing copies existing members, shrinking drops the
    /// worst.
    pub fn set_deme_size(&mut self, index: usize, size: usize) -> Result<()> {
        let len = self.demes.len();
        let deme = self
            .demes
            .get_mut(index)
            .ok_or(GeneticError::IndexOutOfRange { index, len })?;
        deme.resize(size, SortBasis::Raw, &mut self.core.rng)?;
        self.scratch[index].clear();
        Ok(())
    }

    /// Attaches a copy of `scaling` to every deme.
    pub fn set_scaling<S: ScalingScheme<G> + Clone>(&mut self, scaling: S) {
        for deme in &mut self.demes {
            deme.set_scaling(scaling.clone());
        }
    }

    /// Attaches a copy of `selector` to every deme.
    pub fn set_selector<S: SelectionScheme<G> + Clone>(&mut self, selector: S) {
        for deme in &mut self.demes {
            deme.set_selector(selector.clone());
        }
    }

    pub fn migration_count(&self) -> usize {
        self.core.options.get_migration_count()
    }

    pub fn set_migration_count(&mut self, count: usize) {
        self.core.options.set_migration_count(count);
    }

    pub fn migration_frequency(&self) -> usize {
        self.core.options.get_migration_frequency()
    }

    /// Generations between migrations; 0 disables migration.
    pub fn set_migration_frequency(&mut self, frequency: usize) {
        self.core.options.set_migration_frequency(frequency);
    }

    fn prepare_scratch(&mut self, index: usize) {
        let deme = &self.demes[index];
        let scratch = &mut self.scratch[index];
        let wanted = self.core.options.get_replacement().count(deme.len());
        scratch.truncate(wanted);
        if let Some(template) = deme.member(0) {
            while scratch.len() < wanted {
                scratch.push(template.clone_with(CloneMode::Attributes));
            }
        }
    }

    /// Copies the best of each deme over the worst of its ring successor.
    pub fn migrate(&mut self) -> Result<()> {
        let n = self.demes.len();
        if n < 2 {
            return Ok(());
        }
        let wanted = self.core.options.get_migration_count();
        if wanted == 0 {
            return Ok(());
        }

        let mut migrants = Vec::with_capacity(n);
        for deme in self.demes.iter_mut() {
            let count = wanted.min(deme.len());
            let mut batch = Vec::with_capacity(count);
            for rank in 0..count {
                batch.push(deme.best(rank, SortBasis::Raw)?.clone());
            }
            migrants.push(batch);
        }

        for (source, batch) in migrants.into_iter().enumerate() {
            let target = (source + 1) % n;
            let deme = &mut self.demes[target];
            let count = batch.len().min(deme.len());
            let slots = (0..count)
                .map(|rank| deme.worst_index(rank, SortBasis::Raw))
                .collect::<Result<Vec<_>>>()?;
            for (slot, migrant) in slots.into_iter().zip(batch) {
                deme.set_member(slot, migrant)?;
            }
            if self.core.options.get_log_level() == LogLevel::Verbose {
                debug!(from = source, to = target, count, "migrated");
            }
        }
        Ok(())
    }

    /// Points the engine population at the current best of every deme.
    fn collect_bests(&mut self) -> Result<()> {
        if self.population.len() != self.demes.len() {
            self.population
                .resize(self.demes.len(), SortBasis::Raw, &mut self.core.rng)?;
        }
        for (i, deme) in self.demes.iter_mut().enumerate() {
            let best = deme.best(0, SortBasis::Raw)?.clone();
            self.population.set_member(i, best)?;
        }
        Ok(())
    }
}

impl<G: Genome> GeneticAlgorithm<G> for DemeGa<G> {
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
        let mut evaluations = 0;
        for (deme, stats) in self.demes.iter_mut().zip(self.deme_stats.iter_mut()) {
            let n = self.core.initialize_population(deme)?;
            stats.reset(deme)?;
            stats.count_evaluations(n);
            evaluations += n;
        }
        for scratch in &mut self.scratch {
            scratch.clear();
        }

        self.collect_bests()?;
        self.core.stats.reset(&mut self.population)?;
        self.core.stats.count_evaluations(evaluations);
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        // Every deme steps on a copy so a failure leaves all of them as
        // they were.
        let mut next = self.demes.clone();
        let mut tallies = Vec::with_capacity(next.len());
        for (i, deme) in next.iter_mut().enumerate() {
            self.prepare_scratch(i);
            tallies.push(self.core.steady_state_step(deme, &mut self.scratch[i])?);
        }
        self.demes = next;

        for (i, tally) in tallies.into_iter().enumerate() {
            tally.record(&mut self.deme_stats[i]);
            tally.record(&mut self.core.stats);
            self.deme_stats[i].update(&mut self.demes[i])?;
        }

        let frequency = self.core.options.get_migration_frequency();
        let generation = self.core.stats.generation() + 1;
        if frequency > 0 && generation % frequency == 0 {
            self.migrate()?;
        }

        self.collect_bests()?;
        self.core.stats.update(&mut self.population)?;
        self.core.log_generation(&self.population);
        Ok(())
    }
}
