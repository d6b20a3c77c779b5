//! # Population
//!
//! A `Population` owns a collection of [`Individual`]s and two orderings over
//! them: one by raw score and one by scaled fitness. Both orderings are index
//! permutations over the same storage vector, so they always describe the same
//! set of individuals.
//!
//! Everything derived from the members is computed lazily and cached behind a
//! dirty flag: the two sorted views, raw and fitness statistics, scaled fitness
//! values, the diversity matrix and the selection scheme's sampling tables.
//! Structural operations (`add`, `remove`, `replace`, `resize`) and mutable
//! access to a member invalidate exactly the caches they affect; the next read
//! recomputes them.
//!
//! ## Example
//!
//! ```rust
//! use evopop::genome::{Genome, Individual};
//! use evopop::population::{Population, Position, SortBasis};
//! use evopop::rng::RandomNumberGenerator;
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
//! let members = [3.0, 1.0, 4.0, 1.5].iter().map(|v| Individual::new(Value(*v))).collect();
//! let mut pop = Population::from_individuals(members);
//! pop.evaluate(false).unwrap();
//!
//! assert_eq!(pop.best(0, SortBasis::Raw).unwrap().score(), 4.0);
//! assert_eq!(pop.worst(0, SortBasis::Raw).unwrap().score(), 1.0);
//!
//! let mut rng = RandomNumberGenerator::seeded(1);
//! let removed = pop.remove(Position::Worst, SortBasis::Raw, &mut rng).unwrap();
//! assert_eq!(removed.score(), 1.0);
//! assert_eq!(pop.len(), 3);
//! ```

mod sort;
mod stats;
mod view;

pub use stats::ScoreStats;
pub use view::PopulationView;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{GeneticError, Result};
use crate::genome::{CloneMode, Genome, Individual};
use crate::rng::RandomNumberGenerator;
use crate::scaling::{LinearScaling, ScalingScheme};
use crate::selection::{RouletteWheelSelector, SelectionScheme};

/// Which end of the score range is best.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    HighIsBest,
    LowIsBest,
}

impl SortOrder {
    /// Whether `a` is strictly better than `b` under this order.
    pub fn is_better(self, a: f64, b: f64) -> bool {
        match self {
            SortOrder::HighIsBest => a > b,
            SortOrder::LowIsBest => a < b,
        }
    }

    /// The better of `a` and `b`.
    pub fn best_of(self, a: f64, b: f64) -> f64 {
        if self.is_better(b, a) {
            b
        } else {
            a
        }
    }
}

/// Which value an ordering or statistic is based on.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBasis {
    /// The objective value.
    Raw,
    /// The fitness assigned by the scaling scheme.
    #[default]
    Scaled,
}

/// Addresses a member for [`Population::remove`] and [`Population::replace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Best,
    Worst,
    Random,
    /// A storage index.
    At(usize),
}

#[derive(Debug, Clone)]
pub struct Population<G: Genome> {
    members: Vec<Individual<G>>,
    raw_order: Vec<usize>,
    fit_order: Vec<usize>,
    order: SortOrder,

    raw_sorted: bool,
    fit_sorted: bool,
    evaluated: bool,
    statted: bool,
    scaled: bool,
    divved: bool,
    select_ready: bool,

    raw_stats: ScoreStats,
    fit_stats: ScoreStats,
    div_matrix: Vec<f64>,
    diversity: f64,
    evaluations: usize,

    scaling: Box<dyn ScalingScheme<G>>,
    selector: Box<dyn SelectionScheme<G>>,
}

impl<G: Genome> Population<G> {
    /// A population of `size` copies of `template`. The copies are not
    /// initialized; call [`initialize`](Self::initialize) to randomize them.
    pub fn new(template: &Individual<G>, size: usize) -> Self {
        let members = (0..size)
            .map(|_| template.clone_with(CloneMode::Contents))
            .collect();
        Self::from_individuals(members)
    }

    /// Wraps existing individuals. Linear scaling and roulette wheel selection
    /// are attached by default.
    pub fn from_individuals(members: Vec<Individual<G>>) -> Self {
        let n = members.len();
        Self {
            members,
            raw_order: (0..n).collect(),
            fit_order: (0..n).collect(),
            order: SortOrder::HighIsBest,
            raw_sorted: false,
            fit_sorted: false,
            evaluated: false,
            statted: false,
            scaled: false,
            divved: false,
            select_ready: false,
            raw_stats: ScoreStats::default(),
            fit_stats: ScoreStats::default(),
            div_matrix: Vec::new(),
            diversity: 0.0,
            evaluations: 0,
            scaling: Box::new(LinearScaling::default()),
            selector: Box::new(RouletteWheelSelector::default()),
        }
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.set_order(order);
        self
    }

    pub fn with_scaling<S: ScalingScheme<G>>(mut self, scaling: S) -> Self {
        self.set_scaling(scaling);
        self
    }

    pub fn with_selector<S: SelectionScheme<G>>(mut self, selector: S) -> Self {
        self.set_selector(selector);
        self
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn set_order(&mut self, order: SortOrder) {
        if order != self.order {
            self.order = order;
            self.raw_sorted = false;
            self.fit_sorted = false;
            self.scaled = false;
            self.select_ready = false;
        }
    }

    pub fn scaling(&self) -> &dyn ScalingScheme<G> {
        self.scaling.as_ref()
    }

    pub fn set_scaling<S: ScalingScheme<G>>(&mut self, scaling: S) {
        self.scaling = Box::new(scaling);
        self.scaled = false;
        self.fit_sorted = false;
        self.select_ready = false;
    }

    pub fn selector(&self) -> &dyn SelectionScheme<G> {
        self.selector.as_ref()
    }

    pub fn set_selector<S: SelectionScheme<G>>(&mut self, selector: S) {
        self.selector = Box::new(selector);
        self.select_ready = false;
    }

    /// Members in storage order.
    pub fn members(&self) -> &[Individual<G>] {
        &self.members
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Individual<G>> {
        self.members.iter()
    }

    pub fn member(&self, index: usize) -> Option<&Individual<G>> {
        self.members.get(index)
    }

    /// Mutable access to a member by storage index. Every derived cache is
    /// invalidated, since the caller may change the member's contents.
    pub fn member_mut(&mut self, index: usize) -> Option<&mut Individual<G>> {
        if index < self.members.len() {
            self.contents_changed();
        }
        self.members.get_mut(index)
    }

    /// Mutable access to every member at once. Every derived cache is
    /// invalidated.
    pub fn members_mut(&mut self) -> &mut [Individual<G>] {
        self.contents_changed();
        &mut self.members
    }

    /// The member at `rank` of the current `basis` view, without re-sorting.
    pub fn individual(&self, rank: usize, basis: SortBasis) -> Option<&Individual<G>> {
        let order = match basis {
            SortBasis::Raw => &self.raw_order,
            SortBasis::Scaled => &self.fit_order,
        };
        order.get(rank).map(|&i| &self.members[i])
    }

    /// Marks every derived cache stale.
    pub fn touch(&mut self) {
        self.contents_changed();
    }

    /// How many population-wide evaluation passes have run.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Initializes every member's genetic material.
    ///
    /// A missing initializer is reported as `MissingOperator` after every
    /// member has been visited. Any other failure leaves every member as it
    /// was.
    pub fn initialize(&mut self, rng: &mut RandomNumberGenerator) -> Result<()> {
        let mut members = self.members.clone();
        let mut first_error = None;
        for member in members.iter_mut() {
            if let Err(e) = member.initialize(rng) {
                if !e.is_misconfiguration() {
                    return Err(e);
                }
                first_error.get_or_insert(e);
            }
        }
        self.members = members;
        self.contents_changed();
        first_error.map_or(Ok(()), Err)
    }

    /// Evaluates every member whose cached score is stale and returns how many
    /// objective computations that took. Skipped entirely if nothing changed
    /// since the last pass, unless `force` is set.
    pub fn evaluate(&mut self, force: bool) -> Result<usize> {
        if self.evaluated && !force {
            return Ok(0);
        }

        let mut computed = 0;
        let mut first_error = None;
        for member in self.members.iter_mut() {
            let stale = !member.is_evaluated();
            match member.evaluate(false) {
                Ok(_) if stale => computed += 1,
                Ok(_) => {}
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        self.evaluations += 1;
        self.raw_sorted = false;
        self.fit_sorted = false;
        self.statted = false;
        self.scaled = false;
        self.select_ready = false;
        self.evaluated = first_error.is_none();

        first_error.map_or(Ok(computed), Err)
    }

    /// Raw-score statistics, recomputed if stale or if `force` is set.
    pub fn statistics(&mut self, force: bool) -> ScoreStats {
        if !self.statted || force {
            self.raw_stats = ScoreStats::from_values(self.members.iter().map(|m| m.score()));
            self.statted = true;
        }
        self.raw_stats
    }

    pub fn sum(&mut self) -> f64 {
        self.statistics(false).sum
    }

    pub fn mean(&mut self) -> f64 {
        self.statistics(false).mean
    }

    pub fn max(&mut self) -> f64 {
        self.statistics(false).max
    }

    pub fn min(&mut self) -> f64 {
        self.statistics(false).min
    }

    pub fn variance(&mut self) -> f64 {
        self.statistics(false).variance
    }

    pub fn stddev(&mut self) -> f64 {
        self.statistics(false).stddev
    }

    /// Fitness statistics; scales the population first if needed.
    pub fn fitness_stats(&mut self) -> Result<ScoreStats> {
        self.scale(false)?;
        Ok(self.fit_stats)
    }

    /// Runs the scaling scheme over the current raw scores.
    ///
    /// Fitness values are computed in full before any member is updated, so a
    /// failing scheme leaves the population untouched.
    pub fn scale(&mut self, force: bool) -> Result<()> {
        if self.scaled && !force {
            return Ok(());
        }
        self.statistics(false);

        let fitness = self.scaling.evaluate(&self.view())?;
        if fitness.len() != self.members.len() {
            return Err(GeneticError::Internal(format!(
                "scaling produced {} values for {} members",
                fitness.len(),
                self.members.len()
            )));
        }

        for (member, f) in self.members.iter_mut().zip(&fitness) {
            member.set_fitness(*f);
        }
        self.fit_stats = ScoreStats::from_values(fitness);
        self.scaled = true;
        self.fit_sorted = false;
        self.select_ready = false;
        Ok(())
    }

    /// Sorts the `basis` view best-first. Sorting by fitness scales first.
    pub fn sort(&mut self, force: bool, basis: SortBasis) -> Result<()> {
        let descending = self.order == SortOrder::HighIsBest;
        match basis {
            SortBasis::Raw => {
                if !self.raw_sorted || force {
                    let keys: Vec<f64> = self.members.iter().map(|m| m.score()).collect();
                    sort::quicksort(&mut self.raw_order, &keys, descending);
                    self.raw_sorted = true;
                }
            }
            SortBasis::Scaled => {
                self.scale(false)?;
                if !self.fit_sorted || force {
                    let keys: Vec<f64> = self.members.iter().map(|m| m.fitness()).collect();
                    sort::quicksort(&mut self.fit_order, &keys, descending);
                    self.fit_sorted = true;
                }
            }
        }
        Ok(())
    }

    /// Storage index of the member ranked `rank` from the best end of `basis`.
    pub fn best_index(&mut self, rank: usize, basis: SortBasis) -> Result<usize> {
        self.sort(false, basis)?;
        let len = self.members.len();
        let order = match basis {
            SortBasis::Raw => &self.raw_order,
            SortBasis::Scaled => &self.fit_order,
        };
        order
            .get(rank)
            .copied()
            .ok_or(GeneticError::IndexOutOfRange { index: rank, len })
    }

    /// Storage index of the member ranked `rank` from the worst end of `basis`.
    pub fn worst_index(&mut self, rank: usize, basis: SortBasis) -> Result<usize> {
        let len = self.members.len();
        if rank >= len {
            return Err(GeneticError::IndexOutOfRange { index: rank, len });
        }
        self.best_index(len - 1 - rank, basis)
    }

    pub fn best(&mut self, rank: usize, basis: SortBasis) -> Result<&Individual<G>> {
        let i = self.best_index(rank, basis)?;
        Ok(&self.members[i])
    }

    pub fn worst(&mut self, rank: usize, basis: SortBasis) -> Result<&Individual<G>> {
        let i = self.worst_index(rank, basis)?;
        Ok(&self.members[i])
    }

    /// Average pairwise distance between members, in `[0, 1]`. Quadratic in
    /// the comparator; computed only when asked for.
    pub fn diversity(&mut self) -> Result<f64> {
        if self.divved {
            return Ok(self.diversity);
        }

        let n = self.members.len();
        let mut matrix = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                matrix.push(self.members[i].compare(&self.members[j])?);
            }
        }

        self.diversity = if matrix.is_empty() {
            0.0
        } else {
            matrix.iter().sum::<f64>() / matrix.len() as f64
        };
        self.div_matrix = matrix;
        self.divved = true;
        Ok(self.diversity)
    }

    /// Distance between the members at storage indices `i` and `j`.
    pub fn individual_diversity(&mut self, i: usize, j: usize) -> Result<f64> {
        let n = self.members.len();
        for index in [i, j] {
            if index >= n {
                return Err(GeneticError::IndexOutOfRange { index, len: n });
            }
        }
        self.diversity()?;
        if i == j {
            return Ok(0.0);
        }
        let (a, b) = if i < j { (i, j) } else { (j, i) };
        Ok(self.div_matrix[a * (2 * n - a - 1) / 2 + (b - a - 1)])
    }

    /// Brings scaling, the selector's basis ordering and the selector's
    /// sampling tables up to date.
    pub fn prep_select(&mut self, force: bool, rng: &mut RandomNumberGenerator) -> Result<()> {
        if self.select_ready && !force {
            return Ok(());
        }
        if self.members.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }

        self.statistics(false);
        self.scale(false)?;
        let basis = self.selector.basis();
        self.sort(false, basis)?;

        let view = PopulationView {
            members: &self.members,
            raw_order: &self.raw_order,
            fit_order: &self.fit_order,
            order: self.order,
            raw_stats: &self.raw_stats,
            fit_stats: &self.fit_stats,
        };
        self.selector.update(&view, rng)?;
        trace!(size = self.members.len(), ?basis, "selection tables rebuilt");

        self.select_ready = true;
        Ok(())
    }

    /// Picks one member with the attached selection scheme and returns its
    /// storage index. The population itself is not modified.
    pub fn select(&mut self, rng: &mut RandomNumberGenerator) -> Result<usize> {
        self.prep_select(false, rng)?;
        let index = self.selector.select(&self.view(), rng)?;
        if index >= self.members.len() {
            return Err(GeneticError::Internal(format!(
                "selector returned index {} for a population of {}",
                index,
                self.members.len()
            )));
        }
        Ok(index)
    }

    /// Appends a member and returns its storage index.
    pub fn add(&mut self, individual: Individual<G>) -> usize {
        let index = self.members.len();
        self.members.push(individual);
        self.raw_order.push(index);
        self.fit_order.push(index);
        self.contents_changed();
        index
    }

    /// Removes and returns the member at `position`.
    pub fn remove(
        &mut self,
        position: Position,
        basis: SortBasis,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Individual<G>> {
        let index = self.resolve(position, basis, rng)?;
        let removed = self.members.remove(index);
        for order in [&mut self.raw_order, &mut self.fit_order] {
            order.retain(|&k| k != index);
            for k in order.iter_mut() {
                if *k > index {
                    *k -= 1;
                }
            }
        }
        self.members_removed();
        Ok(removed)
    }

    /// Puts `individual` in place of the member at `position` and returns the
    /// displaced member.
    pub fn replace(
        &mut self,
        individual: Individual<G>,
        position: Position,
        basis: SortBasis,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Individual<G>> {
        let index = self.resolve(position, basis, rng)?;
        self.set_member(index, individual)
    }

    /// Puts `individual` at storage `index` and returns the displaced member.
    pub fn set_member(&mut self, index: usize, individual: Individual<G>) -> Result<Individual<G>> {
        let len = self.members.len();
        let slot = self
            .members
            .get_mut(index)
            .ok_or(GeneticError::IndexOutOfRange { index, len })?;
        let old = std::mem::replace(slot, individual);
        self.contents_changed();
        Ok(old)
    }

    /// Changes the number of members.
    ///
    /// Growing appends copies of uniformly chosen existing members (their
    /// contents, not fresh initializations). Shrinking discards members from
    /// the worst end of `basis`.
    pub fn resize(
        &mut self,
        size: usize,
        basis: SortBasis,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        if size == 0 {
            return Err(GeneticError::InvalidArgument(
                "a population must keep at least one member".to_string(),
            ));
        }
        let len = self.members.len();
        if size == len {
            return Ok(());
        }

        if size > len {
            if len == 0 {
                return Err(GeneticError::EmptyPopulation);
            }
            for _ in len..size {
                let source = rng.random_index(len);
                let twin = self.members[source].clone_with(CloneMode::Contents);
                self.add(twin);
            }
        } else {
            self.sort(false, basis)?;
            let order = match basis {
                SortBasis::Raw => &self.raw_order,
                SortBasis::Scaled => &self.fit_order,
            };
            let doomed = order[size..].to_vec();
            self.remove_many(&doomed);
        }

        debug!(from = len, to = size, "population resized");
        Ok(())
    }

    /// Checks that both orderings are permutations of the storage indices.
    pub fn check_consistency(&self) -> Result<()> {
        let n = self.members.len();
        for (name, order) in [("raw", &self.raw_order), ("fitness", &self.fit_order)] {
            let mut seen = vec![false; n];
            if order.len() != n {
                return Err(GeneticError::Internal(format!(
                    "{} ordering holds {} entries for {} members",
                    name,
                    order.len(),
                    n
                )));
            }
            for &k in order.iter() {
                if k >= n || seen[k] {
                    return Err(GeneticError::Internal(format!(
                        "{} ordering is not a permutation",
                        name
                    )));
                }
                seen[k] = true;
            }
        }
        Ok(())
    }

    pub(crate) fn view(&self) -> PopulationView<'_, G> {
        PopulationView {
            members: &self.members,
            raw_order: &self.raw_order,
            fit_order: &self.fit_order,
            order: self.order,
            raw_stats: &self.raw_stats,
            fit_stats: &self.fit_stats,
        }
    }

    fn resolve(
        &mut self,
        position: Position,
        basis: SortBasis,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        let len = self.members.len();
        if len == 0 {
            return Err(GeneticError::EmptyPopulation);
        }
        match position {
            Position::Best => self.best_index(0, basis),
            Position::Worst => self.worst_index(0, basis),
            Position::Random => Ok(rng.random_index(len)),
            Position::At(index) if index < len => Ok(index),
            Position::At(index) => Err(GeneticError::IndexOutOfRange { index, len }),
        }
    }

    fn remove_many(&mut self, doomed: &[usize]) {
        let n = self.members.len();
        let mut keep = vec![true; n];
        for &i in doomed {
            keep[i] = false;
        }

        let mut remap = vec![usize::MAX; n];
        let mut next = 0;
        for (i, kept) in keep.iter().enumerate() {
            if *kept {
                remap[i] = next;
                next += 1;
            }
        }

        let members = std::mem::take(&mut self.members);
        self.members = members
            .into_iter()
            .zip(keep.iter())
            .filter_map(|(m, kept)| kept.then_some(m))
            .collect();
        for order in [&mut self.raw_order, &mut self.fit_order] {
            order.retain(|&k| keep[k]);
            for k in order.iter_mut() {
                *k = remap[*k];
            }
        }
        self.members_removed();
    }

    fn contents_changed(&mut self) {
        self.evaluated = false;
        self.raw_sorted = false;
        self.fit_sorted = false;
        self.statted = false;
        self.scaled = false;
        self.divved = false;
        self.select_ready = false;
    }

    // Removal keeps the relative raw order, but fitness depends on who is left.
    fn members_removed(&mut self) {
        self.fit_sorted = false;
        self.statted = false;
        self.scaled = false;
        self.divved = false;
        self.select_ready = false;
    }
}
