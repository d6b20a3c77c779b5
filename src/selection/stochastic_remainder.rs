use super::selection_scheme::{checked_slot, expected_counts, SelectionScheme};
use crate::error::{GeneticError, Result};
use crate::genome::Genome;
use crate::population::{PopulationView, SortBasis};
use crate::rng::RandomNumberGenerator;

/// Stochastic remainder sampling.
///
/// Each member's expected number of copies is `n * w / sum(w)`. `update`
/// fills a table of `n` slots: first the integer part of every expectation,
/// in rank order, then the remaining slots by sweeping the ranks repeatedly
/// and flipping a coin weighted by each member's fractional remainder. A
/// member wins at most one remainder slot. `select` returns a uniformly chosen
/// slot.
#[derive(Debug, Clone, Default)]
pub struct SrsSelector {
    basis: SortBasis,
    choices: Vec<usize>,
}

impl SrsSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_basis(basis: SortBasis) -> Self {
        Self {
            basis,
            ..Self::default()
        }
    }
}

impl<G: Genome> SelectionScheme<G> for SrsSelector {
    fn basis(&self) -> SortBasis {
        self.basis
    }

    fn update(
        &mut self,
        population: &PopulationView<'_, G>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        let expected = expected_counts(population, self.basis, "stochastic remainder")?;
        let n = expected.len();
        let mut fraction = Vec::with_capacity(n);

        self.choices.clear();
        for (rank, e) in expected.iter().enumerate() {
            let whole = e.floor();
            fraction.push(e - whole);
            let copies = (whole as usize).min(n - self.choices.len());
            self.choices
                .extend(std::iter::repeat(population.ranked(rank, self.basis)).take(copies));
        }

        let mut rank = 0;
        let mut idle_sweep = true;
        while self.choices.len() < n {
            if fraction[rank] > 0.0 {
                idle_sweep = false;
                if rng.flip_coin(fraction[rank]) {
                    self.choices.push(population.ranked(rank, self.basis));
                    fraction[rank] = 0.0;
                }
            }
            rank += 1;
            if rank == n {
                rank = 0;
                // Rounding can leave slots with no remainder left to claim them.
                if idle_sweep {
                    let best = population.ranked(0, self.basis);
                    self.choices.resize(n, best);
                }
                idle_sweep = true;
            }
        }
        Ok(())
    }

    fn select(
        &self,
        population: &PopulationView<'_, G>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        if population.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }
        checked_slot(population, &self.choices, rng.random_index(population.len()))
    }

    fn clone_box(&self) -> Box<dyn SelectionScheme<G>> {
        Box::new(self.clone())
    }
}
