//! # Selection Schemes
//!
//! Strategies for choosing parents from a scored, scaled population.
//!
//! - [`RankSelector`]: always the best member (ties broken at random).
//! - [`RouletteWheelSelector`]: probability proportional to fitness.
//! - [`TournamentSelector`]: the better of two roulette draws.
//! - [`UniformSelector`]: every member equally likely.
//! - [`SrsSelector`]: stochastic remainder sampling.
//! - [`DsSelector`]: deterministic sampling.
//!
//! Every scheme samples on a [`SortBasis`](crate::population::SortBasis), by
//! default the scaled fitness.

pub mod deterministic;
pub mod rank;
pub mod roulette;
pub mod selection_scheme;
pub mod stochastic_remainder;
pub mod tournament;
pub mod uniform;

pub use deterministic::DsSelector;
pub use rank::RankSelector;
pub use roulette::RouletteWheelSelector;
pub use selection_scheme::SelectionScheme;
pub use stochastic_remainder::SrsSelector;
pub use tournament::TournamentSelector;
pub use uniform::UniformSelector;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::genome::testing::Real;
    use crate::genome::Individual;
    use crate::population::{Population, SortOrder};
    use crate::scaling::NoScaling;

    /// An evaluated, unscaled population of single-value genomes.
    pub fn population(values: &[f64], order: SortOrder) -> Population<Real> {
        let members = values.iter().map(|v| Individual::new(Real(*v))).collect();
        let mut pop = Population::from_individuals(members)
            .with_order(order)
            .with_scaling(NoScaling);
        pop.evaluate(false).unwrap();
        pop
    }

    /// How often each storage index is picked in `draws` selections.
    pub fn histogram(
        pop: &mut Population<Real>,
        draws: usize,
        rng: &mut crate::rng::RandomNumberGenerator,
    ) -> Vec<usize> {
        let mut counts = vec![0; pop.len()];
        for _ in 0..draws {
            counts[pop.select(rng).unwrap()] += 1;
        }
        counts
    }
}
