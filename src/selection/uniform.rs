use super::selection_scheme::SelectionScheme;
use crate::error::{GeneticError, Result};
use crate::genome::Genome;
use crate::population::PopulationView;
use crate::rng::RandomNumberGenerator;

/// Uniform selection: every member is equally likely, regardless of score.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformSelector;

impl<G: Genome> SelectionScheme<G> for UniformSelector {
    fn select(
        &self,
        population: &PopulationView<'_, G>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        if population.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }
        Ok(rng.random_index(population.len()))
    }

    fn clone_box(&self) -> Box<dyn SelectionScheme<G>> {
        Box::new(*self)
    }
}
