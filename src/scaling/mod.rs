//! # Scaling Schemes
//!
//! A scaling scheme turns the raw objective scores of a population into the
//! fitness values selection works with. Schemes are strategy objects attached to
//! one population at a time and cloned along with it.
//!
//! A scheme computes the fitness of every member from a read-only
//! [`PopulationView`] and returns them in storage order. The population commits
//! the values only when the whole computation succeeded.
//!
//! ## Example
//!
//! ```rust
//! use evopop::genome::{Genome, Individual};
//! use evopop::population::{Population, SortBasis};
//! use evopop::scaling::PowerLawScaling;
//! use evopop::error::Result;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Value(f64);
//!
//! impl Genome for Value {
//!     fn evaluate(&self) -> Result<f64> {
//!         Ok(self.0)
//!     }
//! }
//!
//! let members = [1.0, 2.0, 3.0].iter().map(|v| Individual::new(Value(*v))).collect();
//! let mut pop = Population::from_individuals(members)
//!     .with_scaling(PowerLawScaling::new(2.0).unwrap());
//! pop.evaluate(false).unwrap();
//!
//! assert_eq!(pop.best(0, SortBasis::Scaled).unwrap().fitness(), 9.0);
//! ```

pub mod linear;
pub mod no_scaling;
pub mod power_law;
pub mod sharing;
pub mod sigma_truncation;

use std::fmt::Debug;

use crate::error::{GeneticError, Result};
use crate::genome::Genome;
use crate::population::{PopulationView, SortBasis};

pub use linear::LinearScaling;
pub use no_scaling::NoScaling;
pub use power_law::PowerLawScaling;
pub use sharing::SharingScaling;
pub use sigma_truncation::SigmaTruncationScaling;

/// Trait for raw-score to fitness transforms.
///
/// Implementations must cope with empty and single-member populations without
/// dividing by zero.
pub trait ScalingScheme<G: Genome>: Debug + Send + Sync + 'static {
    /// The fitness of every member, in storage order.
    ///
    /// Raw statistics in `population` are up to date when this is called.
    fn evaluate(&self, population: &PopulationView<'_, G>) -> Result<Vec<f64>>;

    /// Clones the scheme behind a box, so populations can be cloned.
    fn clone_box(&self) -> Box<dyn ScalingScheme<G>>;
}

impl<G: Genome> Clone for Box<dyn ScalingScheme<G>> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

pub(crate) fn raw_scores<G: Genome>(population: &PopulationView<'_, G>) -> Vec<f64> {
    population.members().iter().map(|m| m.score()).collect()
}

pub(crate) fn require_non_negative<G: Genome>(
    population: &PopulationView<'_, G>,
    scheme: &str,
) -> Result<()> {
    if !population.is_empty() && population.stats(SortBasis::Raw).min < 0.0 {
        return Err(GeneticError::Scaling(format!(
            "{} scaling cannot handle negative objective scores",
            scheme
        )));
    }
    Ok(())
}
