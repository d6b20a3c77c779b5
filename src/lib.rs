//! Population-based genetic algorithms with pluggable scaling, selection and
//! replacement.
//!
//! A [`Genome`](genome::Genome) describes one candidate solution. A
//! [`Population`](population::Population) of them is scored, scaled and
//! sampled, and one of the engines in [`evolution`] drives it from generation
//! to generation while [`Statistics`](statistics::Statistics) keeps the
//! running record.

pub mod error;
pub mod evolution;
pub mod genome;
pub mod population;
pub mod rng;
pub mod scaling;
pub mod selection;
pub mod statistics;

// Re-export commonly used types for convenience
pub use error::{GeneticError, OptionExt, Result, ResultExt};
pub use evolution::{
    DemeGa, GaOptions, GeneticAlgorithm, Goal, IncrementalGa, SimpleGa, SteadyStateGa,
};
pub use genome::{Genome, Individual};
pub use population::{Population, SortBasis, SortOrder};
pub use rng::RandomNumberGenerator;
