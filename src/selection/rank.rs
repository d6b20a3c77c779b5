use super::selection_scheme::SelectionScheme;
use crate::error::{GeneticError, Result};
use crate::genome::Genome;
use crate::population::{PopulationView, SortBasis};
use crate::rng::RandomNumberGenerator;

/// Rank selection: returns the best member on its basis.
///
/// When several members share the best value, one of them is picked uniformly
/// so repeated selection does not always return the same storage slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankSelector {
    basis: SortBasis,
}

impl RankSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_basis(basis: SortBasis) -> Self {
        Self { basis }
    }
}

impl<G: Genome> SelectionScheme<G> for RankSelector {
    fn basis(&self) -> SortBasis {
        self.basis
    }

    fn select(
        &self,
        population: &PopulationView<'_, G>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        if population.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }
        let best = population.value(population.ranked(0, self.basis), self.basis);
        let ties = (1..population.len())
            .take_while(|&rank| population.value(population.ranked(rank, self.basis), self.basis) == best)
            .count();
        let rank = rng.random_int(0, ties);
        Ok(population.ranked(rank, self.basis))
    }

    fn clone_box(&self) -> Box<dyn SelectionScheme<G>> {
        Box::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::SortOrder;
    use crate::selection::test_support::{histogram, population};

    #[test]
    fn test_always_best() {
        let mut pop = population(&[0.3, 0.9, 0.2], SortOrder::HighIsBest);
        pop.set_selector(RankSelector::new());
        let mut rng = RandomNumberGenerator::seeded(1);
        assert_eq!(histogram(&mut pop, 50, &mut rng), vec![0, 50, 0]);

        pop.set_order(SortOrder::LowIsBest);
        assert_eq!(histogram(&mut pop, 50, &mut rng), vec![0, 0, 50]);
    }

    #[test]
    fn test_ties_share_picks() {
        let mut pop = population(&[0.9, 0.1, 0.9], SortOrder::HighIsBest);
        pop.set_selector(RankSelector::with_basis(SortBasis::Raw));
        let mut rng = RandomNumberGenerator::seeded(4);
        let counts = histogram(&mut pop, 200, &mut rng);
        assert_eq!(counts[1], 0);
        assert!(counts[0] > 0 && counts[2] > 0);
    }
}
