//! # Genome Trait
//!
//! The `Genome` trait is the capability contract every concrete solution
//! representation implements. The engine never looks inside a genome; it only
//! asks it to initialize, mutate, mate, compare and evaluate itself.
//!
//! Every operator has a default implementation that reports
//! [`GeneticError::MissingOperator`]. A representation only implements the
//! operators it supports, and the engines treat a missing operator as a no-op
//! instead of aborting the run.
//!
//! ## Example
//!
//! ```rust
//! use evopop::genome::Genome;
//! use evopop::rng::RandomNumberGenerator;
//! use evopop::error::Result;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Bits(Vec<bool>);
//!
//! impl Genome for Bits {
//!     fn initialize(&mut self, rng: &mut RandomNumberGenerator) -> Result<()> {
//!         self.0.iter_mut().for_each(|b| *b = rng.random_bit());
//!         Ok(())
//!     }
//!
//!     fn mutate(&mut self, probability: f64, rng: &mut RandomNumberGenerator) -> Result<usize> {
//!         let mut flipped = 0;
//!         for bit in self.0.iter_mut() {
//!             if rng.flip_coin(probability) {
//!                 *bit = !*bit;
//!                 flipped += 1;
//!             }
//!         }
//!         Ok(flipped)
//!     }
//!
//!     fn evaluate(&self) -> Result<f64> {
//!         Ok(self.0.iter().filter(|b| **b).count() as f64)
//!     }
//! }
//!
//! let mut rng = RandomNumberGenerator::seeded(3);
//! let mut bits = Bits(vec![false; 8]);
//! bits.initialize(&mut rng).unwrap();
//! assert!(bits.evaluate().unwrap() <= 8.0);
//! assert!(bits.compare(&bits).is_err()); // no comparator defined
//! ```

pub mod individual;
pub mod operators;

use std::fmt::Debug;

use crate::error::{GeneticError, Result};
use crate::rng::RandomNumberGenerator;

pub use individual::Individual;
pub use operators::{
    AsexualCrossover, Comparator, Initializer, Mutator, Operators, SexualCrossover,
};

/// How much of a genome [`Individual::clone_with`] duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneMode {
    /// Genetic material, operators and the last known score.
    Contents,
    /// Operators and shape only; the genetic material is whatever
    /// [`Genome::clone_attributes`] produces.
    Attributes,
}

/// Trait for types that represent one candidate solution.
///
/// Implementors must be `Clone`, `Debug`, `PartialEq` (the structural equality
/// test used by the best-of-all tracker), `Send` and `Sync`.
pub trait Genome: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Fills the genome with fresh (usually random) genetic material.
    fn initialize(&mut self, _rng: &mut RandomNumberGenerator) -> Result<()> {
        Err(GeneticError::MissingOperator("initializer"))
    }

    /// Mutates each gene with probability `probability` and returns the number
    /// of genes that changed.
    fn mutate(&mut self, _probability: f64, _rng: &mut RandomNumberGenerator) -> Result<usize> {
        Err(GeneticError::MissingOperator("mutator"))
    }

    /// Distance to `other` in `[0, 1]`: 0 for identical genomes, 1 for
    /// maximally different ones.
    fn compare(&self, _other: &Self) -> Result<f64> {
        Err(GeneticError::MissingOperator("comparator"))
    }

    /// The objective value of this genome.
    fn evaluate(&self) -> Result<f64> {
        Err(GeneticError::MissingOperator("evaluator"))
    }

    /// Sexual crossover: writes offspring of `mom` and `dad` into whichever of
    /// `sister` and `brother` are provided and returns how many were produced.
    fn crossover(
        _mom: &Self,
        _dad: &Self,
        _sister: Option<&mut Self>,
        _brother: Option<&mut Self>,
        _rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        Err(GeneticError::MissingOperator("sexual crossover"))
    }

    /// Asexual crossover: derives `child` from a single `parent`. Returns 0 or 1.
    fn asexual_crossover(
        _parent: &Self,
        _child: &mut Self,
        _rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        Err(GeneticError::MissingOperator("asexual crossover"))
    }

    /// A genome with the same shape and configuration but no meaningful
    /// contents. Defaults to a full clone.
    fn clone_attributes(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
pub(crate) mod testing;
