//! # Termination
//!
//! A [`Terminator`] decides after each generation whether a run is finished.
//! It sees an [`EvolutionState`] snapshot rather than the engine itself, so any
//! closure over the snapshot works as a terminator:
//!
//! ```rust
//! use evopop::evolution::termination::{EvolutionState, Terminator, UponGeneration};
//! use evopop::evolution::options::Goal;
//!
//! let state = EvolutionState {
//!     generation: 40,
//!     num_generations: 40,
//!     convergence: 0.0,
//!     population_convergence: 0.5,
//!     p_convergence: 0.99,
//!     goal: Goal::Maximize,
//!     best_ever: 12.0,
//! };
//!
//! assert!(UponGeneration.done(&state));
//!
//! let good_enough = |s: &EvolutionState| s.best_ever >= 10.0;
//! assert!(good_enough.done(&state));
//! ```

use super::options::Goal;

/// What a terminator gets to look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvolutionState {
    pub generation: usize,
    pub num_generations: usize,
    /// See [`Statistics::convergence`](crate::statistics::Statistics::convergence).
    pub convergence: f64,
    /// See [`Statistics::population_convergence`](crate::statistics::Statistics::population_convergence).
    pub population_convergence: f64,
    pub p_convergence: f64,
    pub goal: Goal,
    pub best_ever: f64,
}

pub trait Terminator: Send + Sync {
    fn done(&self, state: &EvolutionState) -> bool;
}

impl<F> Terminator for F
where
    F: Fn(&EvolutionState) -> bool + Send + Sync,
{
    fn done(&self, state: &EvolutionState) -> bool {
        self(state)
    }
}

/// Stops once the configured number of generations has run.
#[derive(Debug, Clone, Copy, Default)]
pub struct UponGeneration;

impl Terminator for UponGeneration {
    fn done(&self, state: &EvolutionState) -> bool {
        state.generation >= state.num_generations
    }
}

/// Stops when the best score has stopped moving over the convergence window.
///
/// When maximizing, the ratio of the oldest to the current best score must
/// reach `p_convergence`. When minimizing, the inverse ratio must. Nothing
/// stops before the window has filled.
#[derive(Debug, Clone, Copy, Default)]
pub struct UponConvergence;

impl Terminator for UponConvergence {
    fn done(&self, state: &EvolutionState) -> bool {
        let c = state.convergence;
        if c == 0.0 {
            return false;
        }
        match state.goal {
            Goal::Maximize => c >= state.p_convergence,
            Goal::Minimize => 1.0 / c >= state.p_convergence,
        }
    }
}

/// Stops on the ratio of the current minimum to the current maximum score:
/// at or above `p_convergence` when maximizing, at or below it when
/// minimizing.
#[derive(Debug, Clone, Copy, Default)]
pub struct UponPopConvergence;

impl Terminator for UponPopConvergence {
    fn done(&self, state: &EvolutionState) -> bool {
        let ratio = state.population_convergence;
        if ratio == 0.0 {
            return false;
        }
        match state.goal {
            Goal::Maximize => ratio >= state.p_convergence,
            Goal::Minimize => ratio <= state.p_convergence,
        }
    }
}
