use super::{require_non_negative, ScalingScheme};
use crate::error::{GeneticError, Result};
use crate::genome::Genome;
use crate::population::{PopulationView, SortBasis};

/// Sigma truncation: `fitness = score - (mean - c * stddev)`, floored at zero.
///
/// Members more than `c` standard deviations below the mean get zero fitness.
/// Raw scores must be non-negative.
#[derive(Debug, Clone, Copy)]
pub struct SigmaTruncationScaling {
    c: f64,
}

impl SigmaTruncationScaling {
    pub const DEFAULT_MULTIPLIER: f64 = 2.0;

    pub fn new(c: f64) -> Result<Self> {
        if c < 0.0 || !c.is_finite() {
            return Err(GeneticError::InvalidArgument(format!(
                "sigma truncation multiplier must be non-negative, got {}",
                c
            )));
        }
        Ok(Self { c })
    }

    pub fn multiplier(&self) -> f64 {
        self.c
    }
}

impl Default for SigmaTruncationScaling {
    fn default() -> Self {
        Self {
            c: Self::DEFAULT_MULTIPLIER,
        }
    }
}

impl<G: Genome> ScalingScheme<G> for SigmaTruncationScaling {
    fn evaluate(&self, population: &PopulationView<'_, G>) -> Result<Vec<f64>> {
        require_non_negative(population, "sigma truncation")?;
        let stats = population.stats(SortBasis::Raw);
        let offset = stats.mean - self.c * stats.stddev;

        Ok(population
            .members()
            .iter()
            .map(|m| (m.score() - offset).max(0.0))
            .collect())
    }

    fn clone_box(&self) -> Box<dyn ScalingScheme<G>> {
        Box::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::testing::Real;
    use crate::genome::Individual;
    use crate::population::Population;

    fn population(values: &[f64], c: f64) -> Population<Real> {
        let members = values.iter().map(|v| Individual::new(Real(*v))).collect();
        let mut pop = Population::from_individuals(members)
            .with_scaling(SigmaTruncationScaling::new(c).unwrap());
        pop.evaluate(false).unwrap();
        pop
    }

    #[test]
    fn test_truncates_below_offset() {
        let mut pop = population(&[1.0, 2.0, 3.0], 0.0);
        pop.scale(false).unwrap();
        let fitness: Vec<f64> = pop.iter().map(|m| m.fitness()).collect();
        assert_eq!(fitness, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_shift_by_deviation() {
        let mut pop = population(&[1.0, 2.0, 3.0], 1.0);
        pop.scale(false).unwrap();
        // mean 2, stddev 1: offset 1
        let fitness: Vec<f64> = pop.iter().map(|m| m.fitness()).collect();
        assert_eq!(fitness, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_single_member() {
        let mut pop = population(&[4.0], 2.0);
        pop.scale(false).unwrap();
        assert_eq!(pop.member(0).unwrap().fitness(), 0.0);
    }

    #[test]
    fn test_negative_scores_rejected() {
        let mut pop = population(&[-0.5, 1.0], 2.0);
        assert!(matches!(pop.scale(false), Err(GeneticError::Scaling(_))));
        assert!(SigmaTruncationScaling::new(-1.0).is_err());
    }
}
