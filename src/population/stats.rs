#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Aggregate statistics over one basis (raw scores or fitness) of a population.
///
/// Variance uses the `n - 1` denominator and is zero for fewer than two
/// members.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreStats {
    pub sum: f64,
    pub mean: f64,
    pub variance: f64,
    pub stddev: f64,
    pub max: f64,
    pub min: f64,
}

impl ScoreStats {
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let sum: f64 = values.iter().sum();
        let mean = sum / n;
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let variance = if values.len() > 1 {
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)
        } else {
            0.0
        };

        Self {
            sum,
            mean,
            variance,
            stddev: variance.sqrt(),
            max,
            min,
        }
    }
}
