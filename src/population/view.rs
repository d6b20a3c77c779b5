use super::{ScoreStats, SortBasis, SortOrder};
use crate::genome::{Genome, Individual};

/// A read-only window onto a population, handed to scaling and selection
/// schemes.
///
/// Scaling schemes see up-to-date raw statistics and raw ordering state only;
/// selection schemes additionally see the fitness values and the sorted view of
/// their basis.
pub struct PopulationView<'a, G: Genome> {
    pub(crate) members: &'a [Individual<G>],
    pub(crate) raw_order: &'a [usize],
    pub(crate) fit_order: &'a [usize],
    pub(crate) order: SortOrder,
    pub(crate) raw_stats: &'a ScoreStats,
    pub(crate) fit_stats: &'a ScoreStats,
}

impl<'a, G: Genome> PopulationView<'a, G> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in storage order.
    pub fn members(&self) -> &'a [Individual<G>] {
        self.members
    }

    pub fn member(&self, index: usize) -> &'a Individual<G> {
        &self.members[index]
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn stats(&self, basis: SortBasis) -> &'a ScoreStats {
        match basis {
            SortBasis::Raw => self.raw_stats,
            SortBasis::Scaled => self.fit_stats,
        }
    }

    /// Storage index of the member at `rank` (0 = best) in `basis` order.
    pub fn ranked(&self, rank: usize, basis: SortBasis) -> usize {
        match basis {
            SortBasis::Raw => self.raw_order[rank],
            SortBasis::Scaled => self.fit_order[rank],
        }
    }

    /// The raw score or fitness of the member at storage `index`.
    pub fn value(&self, index: usize, basis: SortBasis) -> f64 {
        let member = &self.members[index];
        match basis {
            SortBasis::Raw => member.score(),
            SortBasis::Scaled => member.fitness(),
        }
    }
}
