//! # GaOptions
//!
//! The `GaOptions` struct holds every tunable parameter of a run: population
//! size, generation count, operator probabilities, convergence settings,
//! replacement policy, score history settings, multi-population settings, the
//! optimization goal, the seed and the logging level.
//!
//! ## Example
//!
//! ```rust
//! use evopop::evolution::options::{GaOptions, Goal, LogLevel, Replacement};
//!
//! // Defaults
//! let defaults = GaOptions::default();
//! assert_eq!(defaults.get_population_size(), 30);
//! assert_eq!(defaults.get_num_generations(), 250);
//!
//! // Builder with validation
//! let options = GaOptions::builder()
//!     .population_size(60)
//!     .num_generations(400)
//!     .p_mutation(0.001)
//!     .replacement(Replacement::Count(10))
//!     .goal(Goal::Minimize)
//!     .log_level(LogLevel::Minimal)
//!     .build()
//!     .unwrap();
//! assert_eq!(options.get_population_size(), 60);
//!
//! assert!(GaOptions::builder().p_crossover(1.5).build().is_err());
//! ```
//!
//! ## Enums
//!
//! - `LogLevel`: how much per-generation detail the engines emit through
//!   `tracing` (`Verbose`, `Minimal`, `None`).
//! - `Goal`: maximize or minimize the objective.
//! - `Replacement`: how many members a steady-state generation replaces.
//! - `ReplacementStrategy`: which member an incremental offspring displaces.

use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{check_probability, GeneticError, Result};
use crate::population::SortOrder;
use crate::statistics::ScoreSelection;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// A summary per generation plus one line per member.
    Verbose,
    /// A summary per generation.
    Minimal,
    #[default]
    None,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Goal {
    #[default]
    Maximize,
    Minimize,
}

impl Goal {
    /// The population sort order that puts the best members first.
    pub fn order(self) -> SortOrder {
        match self {
            Goal::Maximize => SortOrder::HighIsBest,
            Goal::Minimize => SortOrder::LowIsBest,
        }
    }
}

/// Size of the batch a steady-state generation creates and replaces.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Replacement {
    /// A fraction of the population, in `(0, 1]`.
    Fraction(f64),
    /// An explicit number of members.
    Count(usize),
}

impl Replacement {
    /// Number of members replaced in a population of `population_size`:
    /// at least 1 and at most the population size.
    pub fn count(self, population_size: usize) -> usize {
        let n = match self {
            Replacement::Fraction(f) => (f * population_size as f64) as usize,
            Replacement::Count(n) => n,
        };
        n.clamp(1, population_size.max(1))
    }
}

impl Default for Replacement {
    fn default() -> Self {
        Replacement::Fraction(0.25)
    }
}

/// Which existing member an incremental offspring displaces.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplacementStrategy {
    #[default]
    Worst,
    Random,
    /// The first child replaces the mother, the second the father.
    Parent,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct GaOptions {
    population_size: usize,
    num_generations: usize,
    p_mutation: f64,
    p_crossover: f64,
    p_convergence: f64,
    n_convergence: usize,
    replacement: Replacement,
    score_frequency: usize,
    flush_frequency: usize,
    score_file: Option<PathBuf>,
    score_selection: ScoreSelection,
    record_diversity: bool,
    elitism: bool,
    num_populations: usize,
    migration_count: usize,
    migration_frequency: usize,
    num_best: usize,
    goal: Goal,
    num_offspring: usize,
    replacement_strategy: ReplacementStrategy,
    seed: u32,
    log_level: LogLevel,
}

impl Default for GaOptions {
    fn default() -> Self {
        Self {
            population_size: 30,
            num_generations: 250,
            p_mutation: 0.01,
            p_crossover: 0.9,
            p_convergence: 0.99,
            n_convergence: 20,
            replacement: Replacement::default(),
            score_frequency: 1,
            flush_frequency: 0,
            score_file: None,
            score_selection: ScoreSelection::ALL,
            record_diversity: false,
            elitism: true,
            num_populations: 10,
            migration_count: 5,
            migration_frequency: 1,
            num_best: 1,
            goal: Goal::Maximize,
            num_offspring: 2,
            replacement_strategy: ReplacementStrategy::Worst,
            seed: 0,
            log_level: LogLevel::None,
        }
    }
}

impl GaOptions {
    /// Returns a builder for creating a validated `GaOptions` instance.
    pub fn builder() -> GaOptionsBuilder {
        GaOptionsBuilder::default()
    }

    /// Checks every parameter against its valid domain.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for probabilities outside `[0, 1]` or a
    /// replacement fraction outside `(0, 1]`, and `Configuration` for sizes
    /// that must be nonzero.
    pub fn validate(&self) -> Result<()> {
        check_probability("mutation probability", self.p_mutation)?;
        check_probability("crossover probability", self.p_crossover)?;
        check_probability("convergence percentage", self.p_convergence)?;

        let nonzero = [
            ("population size", self.population_size),
            ("convergence window", self.n_convergence),
            ("number of populations", self.num_populations),
            ("number of best genomes", self.num_best),
            ("number of offspring", self.num_offspring),
        ];
        for (name, value) in nonzero {
            if value == 0 {
                return Err(GeneticError::Configuration(format!(
                    "{} cannot be zero",
                    name
                )));
            }
        }

        match self.replacement {
            Replacement::Fraction(f) if !(f > 0.0 && f <= 1.0) => {
                Err(GeneticError::InvalidArgument(format!(
                    "replacement fraction must be in (0, 1], got {}",
                    f
                )))
            }
            Replacement::Count(0) => Err(GeneticError::Configuration(
                "replacement count cannot be zero".to_string(),
            )),
            _ => Ok(()),
        }
    }

    pub fn get_population_size(&self) -> usize {
        self.population_size
    }

    pub fn get_num_generations(&self) -> usize {
        self.num_generations
    }

    pub fn get_p_mutation(&self) -> f64 {
        self.p_mutation
    }

    pub fn get_p_crossover(&self) -> f64 {
        self.p_crossover
    }

    pub fn get_p_convergence(&self) -> f64 {
        self.p_convergence
    }

    pub fn get_n_convergence(&self) -> usize {
        self.n_convergence
    }

    pub fn get_replacement(&self) -> Replacement {
        self.replacement
    }

    pub fn get_score_frequency(&self) -> usize {
        self.score_frequency
    }

    pub fn get_flush_frequency(&self) -> usize {
        self.flush_frequency
    }

    pub fn get_score_file(&self) -> Option<&Path> {
        self.score_file.as_deref()
    }

    pub fn get_score_selection(&self) -> ScoreSelection {
        self.score_selection
    }

    pub fn get_record_diversity(&self) -> bool {
        self.record_diversity
    }

    pub fn get_elitism(&self) -> bool {
        self.elitism
    }

    pub fn get_num_populations(&self) -> usize {
        self.num_populations
    }

    pub fn get_migration_count(&self) -> usize {
        self.migration_count
    }

    pub fn get_migration_frequency(&self) -> usize {
        self.migration_frequency
    }

    pub fn get_num_best(&self) -> usize {
        self.num_best
    }

    pub fn get_goal(&self) -> Goal {
        self.goal
    }

    pub fn get_num_offspring(&self) -> usize {
        self.num_offspring
    }

    pub fn get_replacement_strategy(&self) -> ReplacementStrategy {
        self.replacement_strategy
    }

    pub fn get_seed(&self) -> u32 {
        self.seed
    }

    pub fn get_log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn set_population_size(&mut self, value: usize) {
        self.population_size = value;
    }

    pub fn set_num_generations(&mut self, value: usize) {
        self.num_generations = value;
    }

    pub fn set_p_mutation(&mut self, value: f64) {
        self.p_mutation = value;
    }

    pub fn set_p_crossover(&mut self, value: f64) {
        self.p_crossover = value;
    }

    pub fn set_p_convergence(&mut self, value: f64) {
        self.p_convergence = value;
    }

    pub fn set_n_convergence(&mut self, value: usize) {
        self.n_convergence = value;
    }

    pub fn set_replacement(&mut self, value: Replacement) {
        self.replacement = value;
    }

    pub fn set_score_frequency(&mut self, value: usize) {
        self.score_frequency = value;
    }

    pub fn set_flush_frequency(&mut self, value: usize) {
        self.flush_frequency = value;
    }

    pub fn set_score_file(&mut self, value: Option<PathBuf>) {
        self.score_file = value;
    }

    pub fn set_score_selection(&mut self, value: ScoreSelection) {
        self.score_selection = value;
    }

    pub fn set_record_diversity(&mut self, value: bool) {
        self.record_diversity = value;
    }

    pub fn set_elitism(&mut self, value: bool) {
        self.elitism = value;
    }

    pub fn set_num_populations(&mut self, value: usize) {
        self.num_populations = value;
    }

    pub fn set_migration_count(&mut self, value: usize) {
        self.migration_count = value;
    }

    pub fn set_migration_frequency(&mut self, value: usize) {
        self.migration_frequency = value;
    }

    pub fn set_num_best(&mut self, value: usize) {
        self.num_best = value;
    }

    pub fn set_goal(&mut self, value: Goal) {
        self.goal = value;
    }

    pub fn set_num_offspring(&mut self, value: usize) {
        self.num_offspring = value;
    }

    pub fn set_replacement_strategy(&mut self, value: ReplacementStrategy) {
        self.replacement_strategy = value;
    }

    pub fn set_seed(&mut self, value: u32) {
        self.seed = value;
    }

    pub fn set_log_level(&mut self, value: LogLevel) {
        self.log_level = value;
    }
}

/// Builder for `GaOptions`.
///
/// Unset fields take the [`GaOptions::default`] values.
#[derive(Debug, Clone, Default)]
pub struct GaOptionsBuilder {
    options: GaOptions,
}

impl GaOptionsBuilder {
    pub fn population_size(mut self, value: usize) -> Self {
        self.options.population_size = value;
        self
    }

    pub fn num_generations(mut self, value: usize) -> Self {
        self.options.num_generations = value;
        self
    }

    pub fn p_mutation(mut self, value: f64) -> Self {
        self.options.p_mutation = value;
        self
    }

    pub fn p_crossover(mut self, value: f64) -> Self {
        self.options.p_crossover = value;
        self
    }

    pub fn p_convergence(mut self, value: f64) -> Self {
        self.options.p_convergence = value;
        self
    }

    pub fn n_convergence(mut self, value: usize) -> Self {
        self.options.n_convergence = value;
        self
    }

    pub fn replacement(mut self, value: Replacement) -> Self {
        self.options.replacement = value;
        self
    }

    pub fn score_frequency(mut self, value: usize) -> Self {
        self.options.score_frequency = value;
        self
    }

    pub fn flush_frequency(mut self, value: usize) -> Self {
        self.options.flush_frequency = value;
        self
    }

    pub fn score_file(mut self, value: impl Into<PathBuf>) -> Self {
        self.options.score_file = Some(value.into());
        self
    }

    pub fn score_selection(mut self, value: ScoreSelection) -> Self {
        self.options.score_selection = value;
        self
    }

    pub fn record_diversity(mut self, value: bool) -> Self {
        self.options.record_diversity = value;
        self
    }

    pub fn elitism(mut self, value: bool) -> Self {
        self.options.elitism = value;
        self
    }

    pub fn num_populations(mut self, value: usize) -> Self {
        self.options.num_populations = value;
        self
    }

    pub fn migration_count(mut self, value: usize) -> Self {
        self.options.migration_count = value;
        self
    }

    pub fn migration_frequency(mut self, value: usize) -> Self {
        self.options.migration_frequency = value;
        self
    }

    pub fn num_best(mut self, value: usize) -> Self {
        self.options.num_best = value;
        self
    }

    pub fn goal(mut self, value: Goal) -> Self {
        self.options.goal = value;
        self
    }

    pub fn num_offspring(mut self, value: usize) -> Self {
        self.options.num_offspring = value;
        self
    }

    pub fn replacement_strategy(mut self, value: ReplacementStrategy) -> Self {
        self.options.replacement_strategy = value;
        self
    }

    pub fn seed(mut self, value: u32) -> Self {
        self.options.seed = value;
        self
    }

    pub fn log_level(mut self, value: LogLevel) -> Self {
        self.options.log_level = value;
        self
    }

    /// Builds the `GaOptions` instance after validating it.
    pub fn build(self) -> Result<GaOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}
