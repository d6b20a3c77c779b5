use std::sync::Arc;

use super::{CloneMode, Genome, Operators};
use crate::error::{GeneticError, Result};
use crate::evolution::challenge::Challenge;
use crate::rng::RandomNumberGenerator;

/// A genome together with its evaluation state.
///
/// The raw score is memoized: [`evaluate`](Individual::evaluate) only calls the
/// objective when the individual has not been evaluated since its genetic
/// material last changed (or when forced). Mutation that changes at least one
/// gene, crossover output, [`copy_from`](Individual::copy_from),
/// [`clone_with`](Individual::clone_with) and mutable access to the genome all
/// clear the evaluated flag. A plain `clone()` is an exact snapshot and keeps it.
#[derive(Debug, Clone)]
pub struct Individual<G: Genome> {
    genome: G,
    score: f64,
    fitness: f64,
    evaluated: bool,
    evaluations: usize,
    operators: Operators<G>,
}

impl<G: Genome> Individual<G> {
    pub fn new(genome: G) -> Self {
        Self::with_operators(genome, Operators::new())
    }

    pub fn with_operators(genome: G, operators: Operators<G>) -> Self {
        Self {
            genome,
            score: 0.0,
            fitness: 0.0,
            evaluated: false,
            evaluations: 0,
            operators,
        }
    }

    /// Attaches an objective that takes precedence over [`Genome::evaluate`].
    pub fn with_evaluator<C>(mut self, challenge: C) -> Self
    where
        C: Challenge<G> + 'static,
    {
        self.set_evaluator(challenge);
        self
    }

    pub fn set_evaluator<C>(&mut self, challenge: C)
    where
        C: Challenge<G> + 'static,
    {
        self.operators.evaluator = Some(Arc::new(challenge));
        self.evaluated = false;
    }

    pub fn genome(&self) -> &G {
        &self.genome
    }

    /// Mutable access to the genetic material. The cached score is invalidated.
    pub fn genome_mut(&mut self) -> &mut G {
        self.evaluated = false;
        &mut self.genome
    }

    pub fn into_genome(self) -> G {
        self.genome
    }

    pub fn operators(&self) -> &Operators<G> {
        &self.operators
    }

    pub fn operators_mut(&mut self) -> &mut Operators<G> {
        self.evaluated = false;
        &mut self.operators
    }

    /// The last computed raw objective value. `0.0` until first evaluated.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// The value assigned by the population's scaling scheme.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    pub fn is_evaluated(&self) -> bool {
        self.evaluated
    }

    /// How many times the objective has actually been computed.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Returns the raw score, computing it only if the genome changed since the
    /// last evaluation or `force` is set.
    ///
    /// # Errors
    ///
    /// - `MissingOperator` if neither an evaluator override nor
    ///   [`Genome::evaluate`] is available. The cached score is left as is.
    /// - `FitnessCalculation` if the objective returns NaN or infinity.
    pub fn evaluate(&mut self, force: bool) -> Result<f64> {
        if self.evaluated && !force {
            return Ok(self.score);
        }

        let score = match &self.operators.evaluator {
            Some(challenge) => challenge.score(&self.genome),
            None => self.genome.evaluate()?,
        };

        if !score.is_finite() {
            return Err(GeneticError::FitnessCalculation(format!(
                "Non-finite fitness score encountered: {}",
                score
            )));
        }

        self.score = score;
        self.evaluations += 1;
        self.evaluated = true;
        Ok(score)
    }

    /// Re-initializes the genetic material and resets the evaluation counter.
    pub fn initialize(&mut self, rng: &mut RandomNumberGenerator) -> Result<()> {
        self.evaluated = false;
        self.evaluations = 0;
        match self.operators.initializer.clone() {
            Some(init) => init(&mut self.genome, rng),
            None => self.genome.initialize(rng),
        }
    }

    /// Mutates the genome and returns the number of changed genes.
    pub fn mutate(&mut self, probability: f64, rng: &mut RandomNumberGenerator) -> Result<usize> {
        let changed = match self.operators.mutator.clone() {
            Some(mutator) => mutator(&mut self.genome, probability, rng)?,
            None => self.genome.mutate(probability, rng)?,
        };
        if changed > 0 {
            self.evaluated = false;
        }
        Ok(changed)
    }

    /// Distance to `other`, clamped to `[0, 1]`. A NaN distance counts as
    /// maximally different.
    pub fn compare(&self, other: &Self) -> Result<f64> {
        let d = match &self.operators.comparator {
            Some(comparator) => comparator(&self.genome, &other.genome)?,
            None => self.genome.compare(&other.genome)?,
        };
        if d.is_nan() {
            return Ok(1.0);
        }
        Ok(d.clamp(0.0, 1.0))
    }

    /// Overwrites this individual with `other`'s genetic material, operators
    /// and last known score and fitness. The copy is marked unevaluated.
    pub fn copy_from(&mut self, other: &Self) {
        self.genome.clone_from(&other.genome);
        self.operators = other.operators.clone();
        self.score = other.score;
        self.fitness = other.fitness;
        self.evaluations = 0;
        self.evaluated = false;
    }

    /// Creates a new individual from this one.
    pub fn clone_with(&self, mode: CloneMode) -> Self {
        match mode {
            CloneMode::Contents => {
                let mut twin = Self::with_operators(self.genome.clone(), self.operators.clone());
                twin.score = self.score;
                twin.fitness = self.fitness;
                twin
            }
            CloneMode::Attributes => {
                Self::with_operators(self.genome.clone_attributes(), self.operators.clone())
            }
        }
    }

    /// Sexual crossover using `mom`'s crossover override or
    /// [`Genome::crossover`]. Every child slot passed in is marked unevaluated.
    pub fn crossover(
        mom: &Self,
        dad: &Self,
        sister: Option<&mut Self>,
        brother: Option<&mut Self>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        match mom.operators.crossover.clone() {
            Some(op) => Self::crossover_with(&op, mom, dad, sister, brother, rng),
            None => Self::mate(G::crossover, mom, dad, sister, brother, rng),
        }
    }

    /// Sexual crossover with an explicit operator.
    pub fn crossover_with(
        op: &super::SexualCrossover<G>,
        mom: &Self,
        dad: &Self,
        sister: Option<&mut Self>,
        brother: Option<&mut Self>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        Self::mate(|m, d, s, b, r| op(m, d, s, b, r), mom, dad, sister, brother, rng)
    }

    fn mate<F>(
        op: F,
        mom: &Self,
        dad: &Self,
        mut sister: Option<&mut Self>,
        mut brother: Option<&mut Self>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize>
    where
        F: FnOnce(&G, &G, Option<&mut G>, Option<&mut G>, &mut RandomNumberGenerator) -> Result<usize>,
    {
        let produced = op(
            &mom.genome,
            &dad.genome,
            sister.as_mut().map(|s| &mut s.genome),
            brother.as_mut().map(|b| &mut b.genome),
            rng,
        )?;
        for child in [sister, brother].into_iter().flatten() {
            child.evaluated = false;
        }
        Ok(produced)
    }

    /// Asexual crossover using `parent`'s override or [`Genome::asexual_crossover`].
    pub fn asexual_crossover(
        parent: &Self,
        child: &mut Self,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        let produced = match parent.operators.asexual_crossover.clone() {
            Some(op) => op(&parent.genome, &mut child.genome, rng)?,
            None => G::asexual_crossover(&parent.genome, &mut child.genome, rng)?,
        };
        child.evaluated = false;
        Ok(produced)
    }
}

impl<G: Genome> PartialEq for Individual<G> {
    fn eq(&self, other: &Self) -> bool {
        self.genome == other.genome
    }
}

impl<G: Genome> From<G> for Individual<G> {
    fn from(genome: G) -> Self {
        Self::new(genome)
    }
}
