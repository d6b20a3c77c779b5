//! # Statistics
//!
//! Running metrics across the generations of one run:
//!
//! - the generation counter and operator counters (selections, crossovers,
//!   mutations, replacements, evaluations);
//! - online performance (the running mean of every generation's mean score,
//!   generation 0 included) and offline performance (the running means of the
//!   generation maxima and minima);
//! - the best score of each of the last `n` generations, from which
//!   [`convergence`](Statistics::convergence) is computed;
//! - a buffered score history, sampled every `score_frequency` generations and
//!   flushed to a [`ScoreSink`] every `flush_frequency` samples;
//! - a best-of-all tracker holding the best distinct individuals ever seen.
//!
//! ## Example
//!
//! ```rust
//! use evopop::genome::{Genome, Individual};
//! use evopop::population::Population;
//! use evopop::statistics::Statistics;
//! use evopop::error::Result;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Value(f64);
//!
//! impl Genome for Value {
//!     fn evaluate(&self) -> Result<f64> {
//!         Ok(self.0)
//!     }
//! }
//!
//! let members = [1.0, 2.0, 3.0].iter().map(|v| Individual::new(Value(*v))).collect();
//! let mut pop = Population::from_individuals(members);
//! pop.evaluate(false).unwrap();
//!
//! let mut stats = Statistics::new();
//! stats.reset(&mut pop).unwrap();
//! assert_eq!(stats.generation(), 0);
//! assert_eq!(stats.current().max, 3.0);
//! assert_eq!(stats.best_individual(0).unwrap().score(), 3.0);
//!
//! stats.update(&mut pop).unwrap();
//! assert_eq!(stats.generation(), 1);
//! assert_eq!(stats.online(), 2.0);
//! ```

pub mod record;
pub mod sink;

use std::collections::VecDeque;
use std::fmt;

use tracing::debug;

use crate::error::Result;
use crate::genome::{Genome, Individual};
use crate::population::{Population, SortBasis, SortOrder};

pub use record::{ScoreRecord, ScoreSelection, ScoreSummary};
pub use sink::{FileScoreSink, ScoreSink};

pub const DEFAULT_CONVERGENCE_WINDOW: usize = 20;

#[derive(Debug)]
pub struct Statistics<G: Genome> {
    generation: usize,
    order: SortOrder,

    selections: usize,
    crossovers: usize,
    mutations: usize,
    replacements: usize,
    evaluations: usize,

    online: f64,
    offline_max: f64,
    offline_min: f64,
    max_ever: f64,
    min_ever: f64,
    initial: ScoreSummary,
    current: ScoreSummary,

    convergence_window: usize,
    best_scores: VecDeque<f64>,

    score_frequency: usize,
    flush_frequency: usize,
    selection: ScoreSelection,
    record_diversity: bool,
    history: Vec<ScoreRecord>,
    sink: Option<Box<dyn ScoreSink>>,

    best_size: usize,
    best: Vec<Individual<G>>,
}

impl<G: Genome> Default for Statistics<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Genome> Statistics<G> {
    pub fn new() -> Self {
        Self {
            generation: 0,
            order: SortOrder::HighIsBest,
            selections: 0,
            crossovers: 0,
            mutations: 0,
            replacements: 0,
            evaluations: 0,
            online: 0.0,
            offline_max: 0.0,
            offline_min: 0.0,
            max_ever: 0.0,
            min_ever: 0.0,
            initial: ScoreSummary::default(),
            current: ScoreSummary::default(),
            convergence_window: DEFAULT_CONVERGENCE_WINDOW,
            best_scores: VecDeque::with_capacity(DEFAULT_CONVERGENCE_WINDOW),
            score_frequency: 1,
            flush_frequency: 0,
            selection: ScoreSelection::ALL,
            record_diversity: false,
            history: Vec::new(),
            sink: None,
            best_size: 1,
            best: Vec::new(),
        }
    }

    /// Record a score sample every `frequency` generations (0 disables).
    pub fn set_score_frequency(&mut self, frequency: usize) {
        self.score_frequency = frequency;
    }

    pub fn score_frequency(&self) -> usize {
        self.score_frequency
    }

    /// How many samples are buffered before they are handed to the sink.
    /// 0 disables the score history.
    ///
    /// Samples already buffered are flushed first. If that fails the
    /// frequency is left unchanged.
    pub fn set_flush_frequency(&mut self, frequency: usize) -> Result<()> {
        self.flush_scores()?;
        self.flush_frequency = frequency;
        self.history.reserve(frequency);
        Ok(())
    }

    pub fn flush_frequency(&self) -> usize {
        self.flush_frequency
    }

    pub fn set_score_selection(&mut self, selection: ScoreSelection) {
        self.selection = selection;
    }

    pub fn score_selection(&self) -> ScoreSelection {
        self.selection
    }

    /// Whether population diversity is computed each generation. It costs a
    /// full pairwise comparison of the population.
    pub fn set_record_diversity(&mut self, record: bool) {
        self.record_diversity = record;
    }

    pub fn records_diversity(&self) -> bool {
        self.record_diversity
    }

    pub fn set_sink<S: ScoreSink + 'static>(&mut self, sink: S) {
        self.sink = Some(Box::new(sink));
    }

    pub fn clear_sink(&mut self) {
        self.sink = None;
    }

    /// Number of generations the convergence ratio looks back over.
    pub fn set_convergence_window(&mut self, n: usize) {
        self.convergence_window = n.max(1);
        while self.best_scores.len() > self.convergence_window {
            self.best_scores.pop_front();
        }
    }

    pub fn convergence_window(&self) -> usize {
        self.convergence_window
    }

    /// Number of distinct best individuals tracked across the run. Takes
    /// effect at the next [`reset`](Self::reset); a smaller value trims the
    /// tracker immediately.
    pub fn set_best_size(&mut self, size: usize) {
        self.best_size = size.max(1);
        self.best.truncate(self.best_size);
    }

    pub fn best_size(&self) -> usize {
        self.best_size
    }

    /// Starts a new run from an initialized, evaluated population.
    pub fn reset(&mut self, population: &mut Population<G>) -> Result<()> {
        self.generation = 0;
        self.order = population.order();
        self.selections = 0;
        self.crossovers = 0;
        self.mutations = 0;
        self.replacements = 0;
        self.evaluations = 0;
        self.history.clear();
        self.best_scores.clear();

        let summary = self.summarize(population)?;
        self.initial = summary;
        self.current = summary;
        self.online = summary.mean;
        self.offline_max = summary.max;
        self.offline_min = summary.min;
        self.max_ever = summary.max;
        self.min_ever = summary.min;
        self.push_best_score();

        self.best.clear();
        for rank in 0..population.len() {
            if self.best.len() == self.best_size {
                break;
            }
            let candidate = population.best(rank, SortBasis::Raw)?;
            if !self.best.iter().any(|b| b == candidate) {
                self.best.push(candidate.clone());
            }
        }

        self.record_sample()?;
        Ok(())
    }

    /// Folds one more generation into the running metrics.
    pub fn update(&mut self, population: &mut Population<G>) -> Result<()> {
        self.generation += 1;
        self.order = population.order();

        let summary = self.summarize(population)?;
        self.current = summary;
        let g = self.generation as f64;
        self.online = (self.online * g + summary.mean) / (g + 1.0);
        self.offline_max = (self.offline_max * g + summary.max) / (g + 1.0);
        self.offline_min = (self.offline_min * g + summary.min) / (g + 1.0);
        self.max_ever = self.max_ever.max(summary.max);
        self.min_ever = self.min_ever.min(summary.min);
        self.push_best_score();
        self.update_best(population)?;

        self.record_sample()
    }

    /// Writes any buffered score history to the sink.
    pub fn flush_scores(&mut self) -> Result<()> {
        if self.history.is_empty() {
            return Ok(());
        }
        match self.sink.as_mut() {
            Some(sink) => sink.write(&self.history, self.selection)?,
            None => debug!(
                records = self.history.len(),
                "no score sink configured, discarding score history"
            ),
        }
        self.history.clear();
        Ok(())
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn online(&self) -> f64 {
        self.online
    }

    pub fn offline_max(&self) -> f64 {
        self.offline_max
    }

    pub fn offline_min(&self) -> f64 {
        self.offline_min
    }

    pub fn max_ever(&self) -> f64 {
        self.max_ever
    }

    pub fn min_ever(&self) -> f64 {
        self.min_ever
    }

    /// The best raw score seen so far, on the population's order.
    pub fn best_ever(&self) -> f64 {
        match self.order {
            SortOrder::HighIsBest => self.max_ever,
            SortOrder::LowIsBest => self.min_ever,
        }
    }

    pub fn initial(&self) -> &ScoreSummary {
        &self.initial
    }

    pub fn current(&self) -> &ScoreSummary {
        &self.current
    }

    /// The best score from `convergence_window - 1` generations ago divided by
    /// the current best score. 0 until the window has filled, or when the
    /// current best is 0.
    pub fn convergence(&self) -> f64 {
        if self.best_scores.len() < self.convergence_window {
            return 0.0;
        }
        match (self.best_scores.front(), self.best_scores.back()) {
            (Some(oldest), Some(current)) if *current != 0.0 => oldest / current,
            _ => 0.0,
        }
    }

    /// The current minimum score divided by the current maximum; 0 when the
    /// maximum is 0.
    pub fn population_convergence(&self) -> f64 {
        if self.current.max == 0.0 {
            0.0
        } else {
            self.current.min / self.current.max
        }
    }

    pub fn selections(&self) -> usize {
        self.selections
    }

    pub fn crossovers(&self) -> usize {
        self.crossovers
    }

    pub fn mutations(&self) -> usize {
        self.mutations
    }

    pub fn replacements(&self) -> usize {
        self.replacements
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub(crate) fn count_selections(&mut self, n: usize) {
        self.selections += n;
    }

    pub(crate) fn count_crossovers(&mut self, n: usize) {
        self.crossovers += n;
    }

    pub(crate) fn count_mutations(&mut self, n: usize) {
        self.mutations += n;
    }

    pub(crate) fn count_replacements(&mut self, n: usize) {
        self.replacements += n;
    }

    pub(crate) fn count_evaluations(&mut self, n: usize) {
        self.evaluations += n;
    }

    /// The score samples not yet flushed.
    pub fn scores(&self) -> &[ScoreRecord] {
        &self.history
    }

    /// The `rank`-th best individual seen during the run.
    pub fn best_individual(&self, rank: usize) -> Option<&Individual<G>> {
        self.best.get(rank)
    }

    /// The best-of-all individuals, best first.
    pub fn best_individuals(&self) -> &[Individual<G>] {
        &self.best
    }

    /// The best-of-all individuals as a population of their own.
    pub fn best_population(&self) -> Population<G> {
        Population::from_individuals(self.best.clone()).with_order(self.order)
    }

    fn summarize(&self, population: &mut Population<G>) -> Result<ScoreSummary> {
        let stats = population.statistics(false);
        let diversity = if self.record_diversity {
            match population.diversity() {
                Ok(d) => Some(d),
                Err(e) if e.is_misconfiguration() => None,
                Err(e) => return Err(e),
            }
        } else {
            None
        };
        Ok(ScoreSummary {
            mean: stats.mean,
            max: stats.max,
            min: stats.min,
            stddev: stats.stddev,
            diversity,
        })
    }

    fn push_best_score(&mut self) {
        let best = match self.order {
            SortOrder::HighIsBest => self.current.max,
            SortOrder::LowIsBest => self.current.min,
        };
        if self.best_scores.len() == self.convergence_window {
            self.best_scores.pop_front();
        }
        self.best_scores.push_back(best);
    }

    /// Inserts members that beat the worst tracked individual and are not
    /// already tracked. Members are visited best first, so the scan stops at
    /// the first one that does not qualify.
    fn update_best(&mut self, population: &mut Population<G>) -> Result<()> {
        for rank in 0..population.len() {
            let candidate = population.best(rank, SortBasis::Raw)?;
            let qualifies = match self.best.last() {
                None => true,
                Some(worst) => {
                    self.best.len() < self.best_size
                        || self.order.is_better(candidate.score(), worst.score())
                }
            };
            if !qualifies {
                break;
            }
            if self.best.iter().any(|b| b == candidate) {
                continue;
            }

            if self.best.len() == self.best_size {
                self.best.pop();
            }
            let at = self
                .best
                .iter()
                .position(|b| self.order.is_better(candidate.score(), b.score()))
                .unwrap_or(self.best.len());
            self.best.insert(at, candidate.clone());
        }
        Ok(())
    }

    fn record_sample(&mut self) -> Result<()> {
        if self.flush_frequency == 0 || self.score_frequency == 0 {
            return Ok(());
        }
        if self.generation % self.score_frequency != 0 {
            return Ok(());
        }
        self.history
            .push(ScoreRecord::new(self.generation, self.current));
        if self.history.len() >= self.flush_frequency {
            self.flush_scores()?;
        }
        Ok(())
    }
}

impl<G: Genome> fmt::Display for Statistics<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "GA statistics")?;
        writeln!(f, "  generations:        {}", self.generation)?;
        writeln!(f, "  evaluations:        {}", self.evaluations)?;
        writeln!(f, "  selections:         {}", self.selections)?;
        writeln!(f, "  crossovers:         {}", self.crossovers)?;
        writeln!(f, "  mutations:          {}", self.mutations)?;
        writeln!(f, "  replacements:       {}", self.replacements)?;
        writeln!(f, "  best-of-all tracked: {}", self.best.len())?;
        writeln!(f, "  max ever:           {}", self.max_ever)?;
        writeln!(f, "  min ever:           {}", self.min_ever)?;
        writeln!(f, "  online:             {}", self.online)?;
        writeln!(f, "  offline max:        {}", self.offline_max)?;
        writeln!(f, "  offline min:        {}", self.offline_min)?;
        writeln!(f, "  initial:            {}", self.initial)?;
        write!(f, "  current:            {}", self.current)
    }
}
