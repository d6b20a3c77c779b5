//! Small genome kinds shared by the unit tests.

use super::Genome;
use crate::error::{GeneticError, Result};
use crate::rng::RandomNumberGenerator;

/// A fixed-length bit string scored by its number of set bits.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Bits {
    pub bits: Vec<bool>,
}

impl Bits {
    pub fn parse(s: &str) -> Self {
        Self {
            bits: s.chars().map(|c| c == '1').collect(),
        }
    }

    pub fn zeros(len: usize) -> Self {
        Self {
            bits: vec![false; len],
        }
    }
}

pub(crate) fn ones(g: &Bits) -> f64 {
    g.bits.iter().filter(|b| **b).count() as f64
}

impl Genome for Bits {
    fn initialize(&mut self, rng: &mut RandomNumberGenerator) -> Result<()> {
        self.bits.iter_mut().for_each(|b| *b = rng.random_bit());
        Ok(())
    }

    fn mutate(&mut self, probability: f64, rng: &mut RandomNumberGenerator) -> Result<usize> {
        let mut flipped = 0;
        for bit in self.bits.iter_mut() {
            if rng.flip_coin(probability) {
                *bit = !*bit;
                flipped += 1;
            }
        }
        Ok(flipped)
    }

    fn compare(&self, other: &Self) -> Result<f64> {
        if self.bits.len() != other.bits.len() {
            return Err(GeneticError::InvalidArgument(
                "bit strings of different lengths".to_string(),
            ));
        }
        if self.bits.is_empty() {
            return Ok(0.0);
        }
        let differing = self
            .bits
            .iter()
            .zip(&other.bits)
            .filter(|(a, b)| a != b)
            .count();
        Ok(differing as f64 / self.bits.len() as f64)
    }

    fn evaluate(&self) -> Result<f64> {
        Ok(ones(self))
    }

    fn crossover(
        mom: &Self,
        dad: &Self,
        mut sister: Option<&mut Self>,
        mut brother: Option<&mut Self>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        let len = mom.bits.len();
        if let Some(s) = sister.as_mut() {
            s.bits.resize(len, false);
        }
        if let Some(b) = brother.as_mut() {
            b.bits.resize(len, false);
        }
        for i in 0..len {
            let (first, second) = if rng.random_bit() {
                (mom.bits[i], dad.bits[i])
            } else {
                (dad.bits[i], mom.bits[i])
            };
            if let Some(s) = sister.as_mut() {
                s.bits[i] = first;
            }
            if let Some(b) = brother.as_mut() {
                b.bits[i] = second;
            }
        }
        Ok(usize::from(sister.is_some()) + usize::from(brother.is_some()))
    }
}

/// A single real value; distance is the absolute difference clamped to 1.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Real(pub f64);

impl Genome for Real {
    fn compare(&self, other: &Self) -> Result<f64> {
        Ok((self.0 - other.0).abs().min(1.0))
    }

    fn evaluate(&self) -> Result<f64> {
        Ok(self.0)
    }
}
