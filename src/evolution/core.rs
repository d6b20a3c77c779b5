//! # Engine core
//!
//! State and helpers shared by every engine: options, the random stream,
//! statistics, crossover overrides, the terminator, and the bookkeeping that
//! turns a missing genome operator into a logged no-op.
//!
//! The [`GeneticAlgorithm`] trait is the common lifecycle: `initialize` seeds
//! the stream and scores the starting population, `step` advances exactly one
//! generation, `done` asks the terminator, and `evolve` strings them together.
//! Calling `step`/`done` directly lets the caller stop between generations.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::options::{GaOptions, LogLevel};
use super::termination::{EvolutionState, Terminator, UponGeneration};
use crate::error::{GeneticError, OptionExt, Result};
use crate::genome::{AsexualCrossover, Genome, Individual, SexualCrossover};
use crate::population::{Population, SortBasis, SortOrder};
use crate::rng::RandomNumberGenerator;
use crate::statistics::{FileScoreSink, Statistics};

/// Operator counts accumulated while breeding, folded into [`Statistics`]
/// afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Tally {
    pub selections: usize,
    pub crossovers: usize,
    pub mutations: usize,
    pub replacements: usize,
    pub evaluations: usize,
}

impl Tally {
    pub fn record<G: Genome>(&self, stats: &mut Statistics<G>) {
        stats.count_selections(self.selections);
        stats.count_crossovers(self.crossovers);
        stats.count_mutations(self.mutations);
        stats.count_replacements(self.replacements);
        stats.count_evaluations(self.evaluations);
    }
}

pub struct GaCore<G: Genome> {
    pub(crate) options: GaOptions,
    pub(crate) rng: RandomNumberGenerator,
    pub(crate) stats: Statistics<G>,
    crossover: Option<SexualCrossover<G>>,
    asexual_crossover: Option<AsexualCrossover<G>>,
    terminator: Arc<dyn Terminator>,
    warned: HashSet<&'static str>,
}

impl<G: Genome> fmt::Debug for GaCore<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GaCore")
            .field("options", &self.options)
            .field("rng", &self.rng)
            .field("stats", &self.stats)
            .field("crossover", &self.crossover.is_some())
            .field("asexual_crossover", &self.asexual_crossover.is_some())
            .finish_non_exhaustive()
    }
}

impl<G: Genome> GaCore<G> {
    /// Validates `options` and sets up statistics from them. The default
    /// terminator stops after the configured number of generations.
    pub fn new(options: GaOptions) -> Result<Self> {
        options.validate()?;
        let mut stats = Statistics::new();
        Self::configure_statistics(&mut stats, &options, true)?;
        Ok(Self {
            rng: RandomNumberGenerator::seeded(options.get_seed()),
            options,
            stats,
            crossover: None,
            asexual_crossover: None,
            terminator: Arc::new(UponGeneration),
            warned: HashSet::new(),
        })
    }

    pub(crate) fn configure_statistics(
        stats: &mut Statistics<G>,
        options: &GaOptions,
        with_sink: bool,
    ) -> Result<()> {
        stats.set_score_frequency(options.get_score_frequency());
        stats.set_flush_frequency(options.get_flush_frequency())?;
        stats.set_score_selection(options.get_score_selection());
        stats.set_record_diversity(options.get_record_diversity());
        stats.set_convergence_window(options.get_n_convergence());
        stats.set_best_size(options.get_num_best());
        match options.get_score_file() {
            Some(path) if with_sink => stats.set_sink(FileScoreSink::new(path)),
            _ => stats.clear_sink(),
        }
        Ok(())
    }

    pub fn options(&self) -> &GaOptions {
        &self.options
    }

    pub fn statistics(&self) -> &Statistics<G> {
        &self.stats
    }

    pub fn rng_mut(&mut self) -> &mut RandomNumberGenerator {
        &mut self.rng
    }

    pub fn set_terminator<T: Terminator + 'static>(&mut self, terminator: T) {
        self.terminator = Arc::new(terminator);
    }

    /// Overrides the sexual crossover of every genome the engine mates.
    pub fn set_crossover(&mut self, crossover: SexualCrossover<G>) {
        self.crossover = Some(crossover);
    }

    /// Overrides the asexual crossover used when a genome has no sexual one.
    pub fn set_asexual_crossover(&mut self, crossover: AsexualCrossover<G>) {
        self.asexual_crossover = Some(crossover);
    }

    /// Restarts the random stream. A zero `seed` falls back to the configured
    /// seed, and a zero configured seed draws one from system entropy.
    pub(crate) fn reseed(&mut self, seed: u32) {
        let seed = if seed != 0 {
            seed
        } else {
            self.options.get_seed()
        };
        self.rng = RandomNumberGenerator::seeded(seed);
        info!(seed = self.rng.seed(), "random stream seeded");
    }

    pub fn state(&self) -> EvolutionState {
        EvolutionState {
            generation: self.stats.generation(),
            num_generations: self.options.get_num_generations(),
            convergence: self.stats.convergence(),
            population_convergence: self.stats.population_convergence(),
            p_convergence: self.options.get_p_convergence(),
            goal: self.options.get_goal(),
            best_ever: self.stats.best_ever(),
        }
    }

    pub fn done(&self) -> bool {
        self.terminator.done(&self.state())
    }

    /// Turns a missing-operator error into `fallback`, warning once per
    /// operator. Any other error is passed through.
    pub(crate) fn tolerate<T>(&mut self, result: Result<T>, fallback: T) -> Result<T> {
        match result {
            Err(GeneticError::MissingOperator(op)) => {
                if self.warned.insert(op) {
                    warn!(operator = op, "genome operator not defined, treating it as a no-op");
                }
                Ok(fallback)
            }
            other => other,
        }
    }

    /// Randomizes and scores a fresh population; returns the number of
    /// evaluations.
    pub(crate) fn initialize_population(&mut self, population: &mut Population<G>) -> Result<usize> {
        population.set_order(self.options.get_goal().order());
        let initialized = population.initialize(&mut self.rng);
        self.tolerate(initialized, ())?;
        self.evaluate(population)
    }

    pub(crate) fn evaluate(&mut self, population: &mut Population<G>) -> Result<usize> {
        let evaluated = population.evaluate(false);
        self.tolerate(evaluated, 0)
    }

    pub(crate) fn evaluate_individual(&mut self, individual: &mut Individual<G>) -> Result<usize> {
        let stale = !individual.is_evaluated();
        let evaluated = individual.evaluate(false).map(|_| usize::from(stale));
        self.tolerate(evaluated, 0)
    }

    pub(crate) fn mutate(&mut self, individual: &mut Individual<G>) -> Result<usize> {
        let mutated = individual.mutate(self.options.get_p_mutation(), &mut self.rng);
        self.tolerate(mutated, 0)
    }

    /// Sexual crossover through the engine override or the genome. If the
    /// genome has no sexual crossover, each child is derived asexually from
    /// one parent; failing that, it becomes a copy of that parent.
    pub(crate) fn mate(
        &mut self,
        mom: &Individual<G>,
        dad: &Individual<G>,
        mut sister: Option<&mut Individual<G>>,
        mut brother: Option<&mut Individual<G>>,
    ) -> Result<usize> {
        let result = match &self.crossover {
            Some(op) => Individual::crossover_with(
                op,
                mom,
                dad,
                sister.as_deref_mut(),
                brother.as_deref_mut(),
                &mut self.rng,
            ),
            None => Individual::crossover(
                mom,
                dad,
                sister.as_deref_mut(),
                brother.as_deref_mut(),
                &mut self.rng,
            ),
        };

        match result {
            Err(e) if e.is_misconfiguration() => {
                self.tolerate::<()>(Err(e), ())?;
                let mut produced = 0;
                for (parent, child) in [(mom, sister), (dad, brother)] {
                    if let Some(child) = child {
                        produced += self.asexual(parent, child)?;
                    }
                }
                Ok(produced)
            }
            other => other,
        }
    }

    fn asexual(&mut self, parent: &Individual<G>, child: &mut Individual<G>) -> Result<usize> {
        let result = match &self.asexual_crossover {
            Some(op) => op(parent.genome(), child.genome_mut(), &mut self.rng),
            None => Individual::asexual_crossover(parent, child, &mut self.rng),
        };
        match result {
            Err(e) if e.is_misconfiguration() => {
                self.tolerate::<()>(Err(e), ())?;
                child.copy_from(parent);
                Ok(0)
            }
            other => other,
        }
    }

    /// Two children from two parents: crossover with probability
    /// `p_crossover`, plain copies otherwise, then mutation of both.
    pub(crate) fn breed_pair(
        &mut self,
        mom: &Individual<G>,
        dad: &Individual<G>,
        sister: &mut Individual<G>,
        brother: &mut Individual<G>,
        tally: &mut Tally,
    ) -> Result<()> {
        if self.rng.flip_coin(self.options.get_p_crossover()) {
            tally.crossovers += self.mate(mom, dad, Some(&mut *sister), Some(&mut *brother))?;
        } else {
            sister.copy_from(mom);
            brother.copy_from(dad);
        }
        tally.mutations += self.mutate(sister)?;
        tally.mutations += self.mutate(brother)?;
        Ok(())
    }

    /// One child from two parents: crossover with probability `p_crossover`,
    /// otherwise a copy of a parent chosen by coin flip, then mutation.
    pub(crate) fn breed_one(
        &mut self,
        mom: &Individual<G>,
        dad: &Individual<G>,
        child: &mut Individual<G>,
        tally: &mut Tally,
    ) -> Result<()> {
        if self.rng.flip_coin(self.options.get_p_crossover()) {
            tally.crossovers += self.mate(mom, dad, Some(&mut *child), None)?;
        } else if self.rng.random_bit() {
            child.copy_from(mom);
        } else {
            child.copy_from(dad);
        }
        tally.mutations += self.mutate(child)?;
        Ok(())
    }

    /// One steady-state generation on `population`: breed `scratch.len()`
    /// children from selected parents, add them, then remove as many of the
    /// worst members by fitness. The population size is unchanged.
    ///
    /// On error `population` keeps its members; only the children in
    /// `scratch` may have changed.
    pub(crate) fn steady_state_step(
        &mut self,
        population: &mut Population<G>,
        scratch: &mut [Individual<G>],
    ) -> Result<Tally> {
        let mut tally = Tally::default();
        let n = scratch.len();

        let mut i = 0;
        while i < n {
            let mom = population.select(&mut self.rng)?;
            let dad = population.select(&mut self.rng)?;
            tally.selections += 2;
            let mom = member(population, mom)?;
            let dad = member(population, dad)?;
            if i + 1 < n {
                let (head, tail) = scratch.split_at_mut(i + 1);
                self.breed_pair(mom, dad, &mut head[i], &mut tail[0], &mut tally)?;
            } else {
                self.breed_one(mom, dad, &mut scratch[i], &mut tally)?;
            }
            i += 2;
        }

        for child in scratch.iter_mut() {
            tally.evaluations += self.evaluate_individual(child)?;
        }

        // Scaling can still fail on the merged members, so trim a copy.
        let mut next = population.clone();
        for child in scratch.iter() {
            next.add(child.clone());
        }
        tally.evaluations += self.evaluate(&mut next)?;
        let keep = next.len() - n;
        next.resize(keep, SortBasis::Scaled, &mut self.rng)?;
        *population = next;
        tally.replacements += n;
        Ok(tally)
    }

    /// Emits the per-generation log lines the configured level asks for.
    pub(crate) fn log_generation(&self, population: &Population<G>) {
        let level = self.options.get_log_level();
        if level == LogLevel::None {
            return;
        }
        let current = self.stats.current();
        let best = match population.order() {
            SortOrder::HighIsBest => current.max,
            SortOrder::LowIsBest => current.min,
        };
        info!(
            generation = self.stats.generation(),
            best,
            mean = current.mean,
            "generation complete"
        );
        if level == LogLevel::Verbose {
            for (index, m) in population.iter().enumerate() {
                debug!(
                    generation = self.stats.generation(),
                    index,
                    score = m.score(),
                    genome = ?m.genome(),
                    "member"
                );
            }
        }
    }
}

/// Looks up a member by storage index.
pub(crate) fn member<G: Genome>(population: &Population<G>, index: usize) -> Result<&Individual<G>> {
    population
        .member(index)
        .ok_or_else_genetic(|| GeneticError::IndexOutOfRange {
            index,
            len: population.len(),
        })
}

/// The lifecycle shared by every engine.
pub trait GeneticAlgorithm<G: Genome> {
    fn core(&self) -> &GaCore<G>;

    fn core_mut(&mut self) -> &mut GaCore<G>;

    /// The population the engine reports on.
    fn population(&self) -> &Population<G>;

    fn population_mut(&mut self) -> &mut Population<G>;

    /// Seeds the random stream, initializes and scores the population and
    /// resets the statistics.
    fn initialize(&mut self, seed: u32) -> Result<()>;

    /// Advances exactly one generation.
    fn step(&mut self) -> Result<()>;

    fn done(&self) -> bool {
        self.core().done()
    }

    fn statistics(&self) -> &Statistics<G> {
        self.core().statistics()
    }

    fn options(&self) -> &GaOptions {
        self.core().options()
    }

    fn rng(&mut self) -> &mut RandomNumberGenerator {
        self.core_mut().rng_mut()
    }

    fn set_terminator<T: Terminator + 'static>(&mut self, terminator: T)
    where
        Self: Sized,
    {
        self.core_mut().set_terminator(terminator);
    }

    fn set_crossover<F>(&mut self, crossover: F)
    where
        Self: Sized,
        F: Fn(&G, &G, Option<&mut G>, Option<&mut G>, &mut RandomNumberGenerator) -> Result<usize>
            + Send
            + Sync
            + 'static,
    {
        self.core_mut().set_crossover(Arc::new(crossover));
    }

    fn set_asexual_crossover<F>(&mut self, crossover: F)
    where
        Self: Sized,
        F: Fn(&G, &mut G, &mut RandomNumberGenerator) -> Result<usize> + Send + Sync + 'static,
    {
        self.core_mut().set_asexual_crossover(Arc::new(crossover));
    }

    fn flush_scores(&mut self) -> Result<()> {
        self.core_mut().stats.flush_scores()
    }

    /// Initializes, steps until the terminator says stop, flushes the score
    /// history and returns the best individual seen during the run.
    fn evolve(&mut self, seed: u32) -> Result<Individual<G>> {
        self.initialize(seed)?;
        info!(
            seed = self.core().rng.seed(),
            population = self.population().len(),
            "evolution started"
        );

        while !self.done() {
            self.step()?;
        }
        self.flush_scores()?;

        let best = self
            .statistics()
            .best_individual(0)
            .cloned()
            .ok_or_else_genetic(|| GeneticError::EmptyPopulation)?;
        info!(
            generations = self.statistics().generation(),
            best = best.score(),
            "evolution finished"
        );
        Ok(best)
    }
}
