use super::{raw_scores, ScalingScheme};
use crate::error::Result;
use crate::genome::Genome;
use crate::population::PopulationView;

/// Fitness equals the raw score.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScaling;

impl<G: Genome> ScalingScheme<G> for NoScaling {
    fn evaluate(&self, population: &PopulationView<'_, G>) -> Result<Vec<f64>> {
        Ok(raw_scores(population))
    }

    fn clone_box(&self) -> Box<dyn ScalingScheme<G>> {
        Box::new(*self)
    }
}
