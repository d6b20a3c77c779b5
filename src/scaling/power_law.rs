use super::{require_non_negative, ScalingScheme};
use crate::error::{GeneticError, Result};
use crate::genome::Genome;
use crate::population::PopulationView;

/// Power law scaling: `fitness = score^k`. Raw scores must be non-negative.
#[derive(Debug, Clone, Copy)]
pub struct PowerLawScaling {
    k: f64,
}

impl PowerLawScaling {
    pub const DEFAULT_EXPONENT: f64 = 1.0005;

    pub fn new(k: f64) -> Result<Self> {
        if !k.is_finite() {
            return Err(GeneticError::InvalidArgument(format!(
                "power law exponent must be finite, got {}",
                k
            )));
        }
        Ok(Self { k })
    }

    pub fn exponent(&self) -> f64 {
        self.k
    }
}

impl Default for PowerLawScaling {
    fn default() -> Self {
        Self {
            k: Self::DEFAULT_EXPONENT,
        }
    }
}

impl<G: Genome> ScalingScheme<G> for PowerLawScaling {
    fn evaluate(&self, population: &PopulationView<'_, G>) -> Result<Vec<f64>> {
        require_non_negative(population, "power law")?;
        Ok(population
            .members()
            .iter()
            .map(|m| m.score().powf(self.k))
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

    #[test]
    fn test_power() {
        let members = [0.0, 2.0, 3.0].iter().map(|v| Individual::new(Real(*v))).collect();
        let mut pop =
            Population::from_individuals(members).with_scaling(PowerLawScaling::new(3.0).unwrap());
        pop.evaluate(false).unwrap();
        pop.scale(false).unwrap();
        let fitness: Vec<f64> = pop.iter().map(|m| m.fitness()).collect();
        assert_eq!(fitness, vec![0.0, 8.0, 27.0]);
    }

    #[test]
    fn test_negative_scores_leave_fitness_untouched() {
        let members = [-2.0, 3.0].iter().map(|v| Individual::new(Real(*v))).collect();
        let mut pop = Population::from_individuals(members).with_scaling(PowerLawScaling::default());
        pop.evaluate(false).unwrap();
        assert!(pop.scale(false).is_err());
        assert!(pop.iter().all(|m| m.fitness() == 0.0));
    }
}
