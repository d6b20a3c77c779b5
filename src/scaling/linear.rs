use tracing::debug;

use super::{require_non_negative, ScalingScheme};
use crate::error::{GeneticError, Result};
use crate::genome::Genome;
use crate::population::{PopulationView, SortBasis};

/// Linear fitness scaling: `fitness = a * score + b`.
///
/// `a` and `b` are chosen so the mean score maps to itself and the maximum
/// score maps to `multiplier` times the mean. When that would push the minimum
/// below zero, the line is pivoted instead so the minimum maps to zero. Any
/// value that still ends up negative is clamped to zero.
///
/// Raw scores must be non-negative.
#[derive(Debug, Clone, Copy)]
pub struct LinearScaling {
    multiplier: f64,
}

impl LinearScaling {
    pub const DEFAULT_MULTIPLIER: f64 = 1.2;

    /// Creates a linear scaling with the given multiplier, which must be
    /// greater than 1.
    pub fn new(multiplier: f64) -> Result<Self> {
        if multiplier <= 1.0 || !multiplier.is_finite() {
            return Err(GeneticError::InvalidArgument(format!(
                "linear scaling multiplier must be greater than 1, got {}",
                multiplier
            )));
        }
        Ok(Self { multiplier })
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Slope and intercept for the given score range.
    fn coefficients(&self, max: f64, min: f64, mean: f64) -> (f64, f64) {
        let m = self.multiplier;
        if min > (m * mean - max) / (m - 1.0) {
            let delta = max - mean;
            if delta == 0.0 {
                return (1.0, 0.0);
            }
            ((m - 1.0) * mean / delta, mean * (max - m * mean) / delta)
        } else {
            let delta = mean - min;
            if delta == 0.0 {
                return (1.0, 0.0);
            }
            (mean / delta, -min * mean / delta)
        }
    }
}

impl Default for LinearScaling {
    fn default() -> Self {
        Self {
            multiplier: Self::DEFAULT_MULTIPLIER,
        }
    }
}

impl<G: Genome> ScalingScheme<G> for LinearScaling {
    fn evaluate(&self, population: &PopulationView<'_, G>) -> Result<Vec<f64>> {
        require_non_negative(population, "linear")?;
        let stats = population.stats(SortBasis::Raw);
        let (a, b) = self.coefficients(stats.max, stats.min, stats.mean);
        if stats.max == stats.min {
            debug!("no score spread, linear scaling falls back to identity");
        }

        Ok(population
            .members()
            .iter()
            .map(|m| (a * m.score() + b).max(0.0))
            .collect())
    }

    fn clone_box(&self) -> Box<dyn ScalingScheme<G>> {
        Box::new(*self)
    }
}
