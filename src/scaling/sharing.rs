use tracing::debug;

use super::{raw_scores, ScalingScheme};
use crate::error::{GeneticError, Result};
use crate::genome::Genome;
use crate::population::{PopulationView, SortOrder};

/// Fitness sharing for niching.
///
/// Every member's niche count sums the kernel `1 - (d / sigma)^alpha` over all
/// members (itself included) whose distance `d` is below `sigma`, so the count
/// is at least 1. When high scores are best the score is divided by the niche
/// count; when low scores are best it is multiplied. Either way a member in a
/// crowded region ends up with worse fitness than an isolated member with the
/// same score.
///
/// Distances come from [`Individual::compare`](crate::genome::Individual::compare).
/// If the genome has no comparator, sharing is skipped and fitness equals score.
#[derive(Debug, Clone, Copy)]
pub struct SharingScaling {
    sigma: f64,
    alpha: f64,
}

impl SharingScaling {
    pub const DEFAULT_CUTOFF: f64 = 1.0;
    pub const DEFAULT_ALPHA: f64 = 1.0;

    pub fn new(sigma: f64, alpha: f64) -> Result<Self> {
        if sigma <= 0.0 || !sigma.is_finite() || alpha <= 0.0 || !alpha.is_finite() {
            return Err(GeneticError::InvalidArgument(format!(
                "sharing needs a positive cutoff and exponent, got sigma {} alpha {}",
                sigma, alpha
            )));
        }
        Ok(Self { sigma, alpha })
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    fn kernel(&self, d: f64) -> f64 {
        if d < self.sigma {
            1.0 - (d / self.sigma).powf(self.alpha)
        } else {
            0.0
        }
    }
}

impl Default for SharingScaling {
    fn default() -> Self {
        Self {
            sigma: Self::DEFAULT_CUTOFF,
            alpha: Self::DEFAULT_ALPHA,
        }
    }
}

impl<G: Genome> ScalingScheme<G> for SharingScaling {
    fn evaluate(&self, population: &PopulationView<'_, G>) -> Result<Vec<f64>> {
        let members = population.members();
        let n = members.len();
        let mut niche = vec![1.0; n];

        for i in 0..n {
            for j in (i + 1)..n {
                let d = match members[i].compare(&members[j]) {
                    Ok(d) => d,
                    Err(e) if e.is_misconfiguration() => {
                        debug!("no comparator available, sharing falls back to raw scores");
                        return Ok(raw_scores(population));
                    }
                    Err(e) => return Err(e),
                };
                let share = self.kernel(d);
                niche[i] += share;
                niche[j] += share;
            }
        }

        let shared = members.iter().zip(&niche).map(|(m, count)| match population.order() {
            SortOrder::HighIsBest => m.score() / count,
            SortOrder::LowIsBest => m.score() * count,
        });
        Ok(shared.collect())
    }

    fn clone_box(&self) -> Box<dyn ScalingScheme<G>> {
        Box::new(*self)
    }
}
