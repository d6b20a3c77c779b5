use std::fmt::Debug;

use crate::error::{GeneticError, Result};
use crate::genome::Genome;
use crate::population::{PopulationView, SortBasis, SortOrder};
use crate::rng::RandomNumberGenerator;

/// Trait for parent selection schemes.
///
/// A selection scheme picks one member of a population at a time. Schemes that
/// sample from a precomputed table (cumulative probabilities, expected-count
/// slots) rebuild it in [`update`](SelectionScheme::update); the population
/// calls `update` whenever its scores, fitness or membership changed since the
/// last call, after scaling and sorting the scheme's [`basis`](SelectionScheme::basis).
///
/// # Examples
///
/// ```
/// use evopop::genome::{Genome, Individual};
/// use evopop::population::Population;
/// use evopop::selection::TournamentSelector;
/// use evopop::rng::RandomNumberGenerator;
/// use evopop::error::Result;
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Value(f64);
///
/// impl Genome for Value {
///     fn evaluate(&self) -> Result<f64> {
///         Ok(self.0)
///     }
/// }
///
/// fn main() -> Result<()> {
///     let members = [1.0, 2.0, 3.0, 4.0].iter().map(|v| Individual::new(Value(*v))).collect();
///     let mut pop = Population::from_individuals(members).with_selector(TournamentSelector::default());
///     pop.evaluate(false)?;
///
///     let mut rng = RandomNumberGenerator::seeded(7);
///     let picked = pop.select(&mut rng)?;
///     assert!(picked < pop.len());
///
///     Ok(())
/// }
/// ```
pub trait SelectionScheme<G: Genome>: Debug + Send + Sync + 'static {
    /// Which ordering the scheme samples from.
    fn basis(&self) -> SortBasis {
        SortBasis::Scaled
    }

    /// Rebuilds any sampling table from the current state of `population`.
    fn update(
        &mut self,
        _population: &PopulationView<'_, G>,
        _rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        Ok(())
    }

    /// Picks one member and returns its storage index.
    ///
    /// # Errors
    ///
    /// Returns `EmptyPopulation` for an empty population, or an error if the
    /// table built by `update` does not match `population`.
    fn select(
        &self,
        population: &PopulationView<'_, G>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize>;

    /// Clones the scheme behind a box, so populations can be cloned.
    fn clone_box(&self) -> Box<dyn SelectionScheme<G>>;
}

impl<G: Genome> Clone for Box<dyn SelectionScheme<G>> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Non-negative selection weights in rank order (best first).
///
/// When high values are best the weight is the value itself; when low values
/// are best it is `max + min - value`, which mirrors the range. Values must be
/// non-negative; if they are all equal, every weight is 1.
pub(crate) fn rank_weights<G: Genome>(
    population: &PopulationView<'_, G>,
    basis: SortBasis,
    scheme: &str,
) -> Result<Vec<f64>> {
    let n = population.len();
    if n == 0 {
        return Err(GeneticError::EmptyPopulation);
    }
    let values: Vec<f64> = (0..n)
        .map(|rank| population.value(population.ranked(rank, basis), basis))
        .collect();
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);

    if max == min {
        return Ok(vec![1.0; n]);
    }
    if min < 0.0 {
        return Err(GeneticError::Configuration(format!(
            "{} selection needs non-negative values; scale the population or select on another basis",
            scheme
        )));
    }

    Ok(match population.order() {
        SortOrder::HighIsBest => values,
        SortOrder::LowIsBest => values.iter().map(|v| max + min - v).collect(),
    })
}

/// Expected number of copies of each rank under fitness-proportionate
/// sampling; sums to the population size.
pub(crate) fn expected_counts<G: Genome>(
    population: &PopulationView<'_, G>,
    basis: SortBasis,
    scheme: &str,
) -> Result<Vec<f64>> {
    let weights = rank_weights(population, basis, scheme)?;
    let n = weights.len() as f64;
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Ok(vec![1.0; weights.len()]);
    }
    Ok(weights.iter().map(|w| n * w / total).collect())
}

/// Storage index stored in a slot table, checked against the population.
pub(crate) fn checked_slot<G: Genome>(
    population: &PopulationView<'_, G>,
    slots: &[usize],
    slot: usize,
) -> Result<usize> {
    if slots.len() != population.len() {
        return Err(GeneticError::Internal(format!(
            "selection table holds {} entries for a population of {}",
            slots.len(),
            population.len()
        )));
    }
    Ok(slots[slot])
}
