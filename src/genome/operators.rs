//! Per-instance operator overrides.
//!
//! An [`Operators`] set travels with an [`Individual`](super::Individual) and is
//! cloned along with it, so every member of a population created from a
//! template shares the template's overrides. Any slot left empty falls back to
//! the corresponding [`Genome`] trait method.

use std::fmt;
use std::sync::Arc;

use super::Genome;
use crate::error::Result;
use crate::evolution::challenge::Challenge;
use crate::rng::RandomNumberGenerator;

pub type Initializer<G> = Arc<dyn Fn(&mut G, &mut RandomNumberGenerator) -> Result<()> + Send + Sync>;

pub type Mutator<G> =
    Arc<dyn Fn(&mut G, f64, &mut RandomNumberGenerator) -> Result<usize> + Send + Sync>;

pub type Comparator<G> = Arc<dyn Fn(&G, &G) -> Result<f64> + Send + Sync>;

pub type SexualCrossover<G> = Arc<
    dyn Fn(&G, &G, Option<&mut G>, Option<&mut G>, &mut RandomNumberGenerator) -> Result<usize>
        + Send
        + Sync,
>;

pub type AsexualCrossover<G> =
    Arc<dyn Fn(&G, &mut G, &mut RandomNumberGenerator) -> Result<usize> + Send + Sync>;

/// Optional operator overrides for one individual.
pub struct Operators<G: Genome> {
    pub initializer: Option<Initializer<G>>,
    pub mutator: Option<Mutator<G>>,
    pub comparator: Option<Comparator<G>>,
    pub evaluator: Option<Arc<dyn Challenge<G>>>,
    pub crossover: Option<SexualCrossover<G>>,
    pub asexual_crossover: Option<AsexualCrossover<G>>,
}

impl<G: Genome> Operators<G> {
    /// An operator set with every slot empty.
    pub fn new() -> Self {
        Self {
            initializer: None,
            mutator: None,
            comparator: None,
            evaluator: None,
            crossover: None,
            asexual_crossover: None,
        }
    }

    pub fn with_evaluator<C>(mut self, challenge: C) -> Self
    where
        C: Challenge<G> + 'static,
    {
        self.evaluator = Some(Arc::new(challenge));
        self
    }

    pub fn with_initializer<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut G, &mut RandomNumberGenerator) -> Result<()> + Send + Sync + 'static,
    {
        self.initializer = Some(Arc::new(f));
        self
    }

    pub fn with_mutator<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut G, f64, &mut RandomNumberGenerator) -> Result<usize> + Send + Sync + 'static,
    {
        self.mutator = Some(Arc::new(f));
        self
    }

    pub fn with_comparator<F>(mut self, f: F) -> Self
    where
        F: Fn(&G, &G) -> Result<f64> + Send + Sync + 'static,
    {
        self.comparator = Some(Arc::new(f));
        self
    }

    pub fn with_crossover<F>(mut self, f: F) -> Self
    where
        F: Fn(&G, &G, Option<&mut G>, Option<&mut G>, &mut RandomNumberGenerator) -> Result<usize>
            + Send
            + Sync
            + 'static,
    {
        self.crossover = Some(Arc::new(f));
        self
    }

    pub fn with_asexual_crossover<F>(mut self, f: F) -> Self
    where
        F: Fn(&G, &mut G, &mut RandomNumberGenerator) -> Result<usize> + Send + Sync + 'static,
    {
        self.asexual_crossover = Some(Arc::new(f));
        self
    }
}

impl<G: Genome> Default for Operators<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Genome> Clone for Operators<G> {
    fn clone(&self) -> Self {
        Self {
            initializer: self.initializer.clone(),
            mutator: self.mutator.clone(),
            comparator: self.comparator.clone(),
            evaluator: self.evaluator.clone(),
            crossover: self.crossover.clone(),
            asexual_crossover: self.asexual_crossover.clone(),
        }
    }
}

impl<G: Genome> fmt::Debug for Operators<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operators")
            .field("initializer", &self.initializer.is_some())
            .field("mutator", &self.mutator.is_some())
            .field("comparator", &self.comparator.is_some())
            .field("evaluator", &self.evaluator.is_some())
            .field("crossover", &self.crossover.is_some())
            .field("asexual_crossover", &self.asexual_crossover.is_some())
            .finish()
    }
}
