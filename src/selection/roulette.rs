use super::selection_scheme::{checked_slot, rank_weights, SelectionScheme};
use crate::error::{GeneticError, Result};
use crate::genome::Genome;
use crate::population::{PopulationView, SortBasis};
use crate::rng::RandomNumberGenerator;

/// Roulette wheel (fitness-proportionate) selection.
///
/// `update` lays the members out in rank order on a wheel of cumulative
/// probabilities; `select` spins it once with a binary search. Under
/// [`SortOrder::LowIsBest`](crate::population::SortOrder::LowIsBest) the values
/// are mirrored around the range so the lowest gets the largest slice. When all
/// values are equal every member gets the same slice.
///
/// Values on the chosen basis must be non-negative.
#[derive(Debug, Clone, Default)]
pub struct RouletteWheelSelector {
    basis: SortBasis,
    psum: Vec<f64>,
    slots: Vec<usize>,
}

impl RouletteWheelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_basis(basis: SortBasis) -> Self {
        Self {
            basis,
            ..Self::default()
        }
    }

    /// Rebuilds the wheel. Shared with [`TournamentSelector`](super::TournamentSelector).
    pub(crate) fn build<G: Genome>(&mut self, population: &PopulationView<'_, G>) -> Result<()> {
        let weights = rank_weights(population, self.basis, "roulette wheel")?;
        let total: f64 = weights.iter().sum();
        let n = weights.len();

        self.psum.clear();
        if total > 0.0 {
            let mut running = 0.0;
            for w in &weights {
                running += w;
                self.psum.push(running / total);
            }
        } else {
            self.psum.extend((0..n).map(|i| (i + 1) as f64 / n as f64));
        }
        if let Some(last) = self.psum.last_mut() {
            *last = 1.0;
        }

        self.slots.clear();
        self.slots
            .extend((0..n).map(|rank| population.ranked(rank, self.basis)));
        Ok(())
    }

    /// One spin of the wheel.
    pub(crate) fn spin<G: Genome>(
        &self,
        population: &PopulationView<'_, G>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        if population.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }
        let n = self.psum.len();
        let cutoff = rng.random_float();
        let (mut lower, mut upper) = (0isize, n as isize - 1);
        while upper >= lower {
            let i = lower + (upper - lower) / 2;
            if self.psum[i as usize] > cutoff {
                upper = i - 1;
            } else {
                lower = i + 1;
            }
        }
        let rank = (lower.max(0) as usize).min(n.saturating_sub(1));
        checked_slot(population, &self.slots, rank)
    }
}

impl<G: Genome> SelectionScheme<G> for RouletteWheelSelector {
    fn basis(&self) -> SortBasis {
        self.basis
    }

    fn update(
        &mut self,
        population: &PopulationView<'_, G>,
        _rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        self.build(population)
    }

    fn select(
        &self,
        population: &PopulationView<'_, G>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        self.spin(population, rng)
    }

    fn clone_box(&self) -> Box<dyn SelectionScheme<G>> {
        Box::new(self.clone())
    }
}
