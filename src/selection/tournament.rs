use super::roulette::RouletteWheelSelector;
use super::selection_scheme::SelectionScheme;
use crate::error::Result;
use crate::genome::Genome;
use crate::population::{PopulationView, SortBasis};
use crate::rng::RandomNumberGenerator;

/// Tournament selection: two independent roulette wheel draws, the better of
/// the two wins. On a tie the first draw wins.
#[derive(Debug, Clone, Default)]
pub struct TournamentSelector {
    wheel: RouletteWheelSelector,
}

impl TournamentSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_basis(basis: SortBasis) -> Self {
        Self {
            wheel: RouletteWheelSelector::with_basis(basis),
        }
    }
}

impl<G: Genome> SelectionScheme<G> for TournamentSelector {
    fn basis(&self) -> SortBasis {
        <RouletteWheelSelector as SelectionScheme<G>>::basis(&self.wheel)
    }

    fn update(
        &mut self,
        population: &PopulationView<'_, G>,
        _rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        self.wheel.build(population)
    }

    fn select(
        &self,
        population: &PopulationView<'_, G>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        let basis = <Self as SelectionScheme<G>>::basis(self);
        let first = self.wheel.spin(population, rng)?;
        let second = self.wheel.spin(population, rng)?;
        let better = population
            .order()
            .is_better(population.value(second, basis), population.value(first, basis));
        Ok(if better { second } else { first })
    }

    fn clone_box(&self) -> Box<dyn SelectionScheme<G>> {
        Box::new(self.clone())
    }
}
