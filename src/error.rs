//! # Error Types
//!
//! This module defines the error type shared by every part of the engine.
//! Errors fall into a few families:
//!
//! - **Misconfiguration**: an operator the engine needs (mutator, crossover,
//!   evaluator, comparator, initializer) was never attached to a genome. The
//!   engines recover from these by treating the call as a no-op and reporting
//!   it once through `tracing`.
//! - **Invalid arguments**: out-of-range indices, bad probabilities, resize
//!   bounds, scaling preconditions. The operation is aborted and the population
//!   is left exactly as it was.
//! - **Internal consistency failures**: a bug in the engine or the host, not
//!   in user input.
//!
//! ## Examples
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use evopop::error::{GeneticError, OptionExt};
//!
//! fn best_score(scores: &[f64]) -> evopop::error::Result<f64> {
//!     scores
//!         .iter()
//!         .cloned()
//!         .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.max(s))))
//!         .ok_or_else_genetic(|| GeneticError::EmptyPopulation)
//! }
//!
//! assert!(best_score(&[]).is_err());
//! assert_eq!(best_score(&[1.0, 3.0]).unwrap(), 3.0);
//! ```
//!
//! Using the `ResultExt` trait to add context to errors:
//!
//! ```rust
//! use evopop::error::{Result, ResultExt};
//! use std::fs::File;
//!
//! fn open_history(path: &str) -> Result<File> {
//!     File::open(path).context("Failed to open score history")
//! }
//!
//! assert!(open_history("/definitely/not/here.dat").is_err());
//! ```

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Represents errors that can occur while evolving a population.
#[derive(Error, Debug)]
pub enum GeneticError {
    /// A genome operator required by the caller was never configured.
    #[error("Missing operator: no {0} has been defined for this genome")]
    MissingOperator(&'static str),

    /// An argument was outside of its valid domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Error that occurs when an invalid configuration is provided.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An index did not address a member of the population.
    #[error("Index {index} is out of range for a population of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Error that occurs when an empty population is encountered.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// Error that occurs when a fitness calculation fails.
    #[error("Fitness calculation error: {0}")]
    FitnessCalculation(String),

    /// A scaling scheme could not be applied to the current raw scores.
    #[error("Scaling error: {0}")]
    Scaling(String),

    /// The engine detected a broken internal invariant.
    #[error("Internal consistency error: {0}")]
    Internal(String),

    /// Error that occurs when an I/O operation fails.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

impl GeneticError {
    /// Returns `true` for errors the engines recover from by treating the
    /// failed call as a no-op.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(self, GeneticError::MissingOperator(_))
    }
}

/// A specialized Result type for genetic algorithm operations.
pub type Result<T> = std::result::Result<T, GeneticError>;

/// Extension trait for Result to add context to errors.
pub trait ResultExt<T, E> {
    /// Converts the error to a `GeneticError::Other` prefixed with `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| GeneticError::Other(format!("{}: {}", context, e)))
    }
}

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, GeneticError>` using `err_fn`
    /// to build the error.
    fn ok_or_else_genetic<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_genetic<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError,
    {
        self.ok_or_else(err_fn)
    }
}

/// Validates that `value` is a probability in `[0, 1]`.
pub(crate) fn check_probability(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(GeneticError::InvalidArgument(format!(
            "{} must be in [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_misconfiguration_classification() {
        assert!(GeneticError::MissingOperator("mutator").is_misconfiguration());
        assert!(!GeneticError::EmptyPopulation.is_misconfiguration());
        assert!(!GeneticError::InvalidArgument("x".into()).is_misconfiguration());
    }

    #[test]
    fn test_display_messages() {
        let err = GeneticError::IndexOutOfRange { index: 7, len: 3 };
        assert_eq!(
            err.to_string(),
            "Index 7 is out of range for a population of 3"
        );
        let err = GeneticError::MissingOperator("crossover");
        assert!(err.to_string().contains("crossover"));
    }

    #[test]
    fn test_check_probability() {
        assert!(check_probability("p", 0.0).is_ok());
        assert!(check_probability("p", 1.0).is_ok());
        assert!(check_probability("p", 1.5).is_err());
        assert!(check_probability("p", -0.1).is_err());
        assert!(check_probability("p", f64::NAN).is_err());
    }

    #[test]
    fn test_io_conversion() {
        fn fails() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"))?;
            Ok(())
        }
        assert!(matches!(fails(), Err(GeneticError::Io(_))));
    }
}
