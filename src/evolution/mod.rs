pub mod challenge;
pub mod core;
pub mod deme;
pub mod incremental;
pub mod options;
pub mod simple;
pub mod steady_state;
pub mod termination;

pub use challenge::Challenge;
pub use self::core::{GaCore, GeneticAlgorithm};
pub use deme::DemeGa;
pub use incremental::{CustomReplacement, IncrementalGa};
pub use options::{GaOptions, GaOptionsBuilder, Goal, LogLevel, Replacement, ReplacementStrategy};
pub use simple::SimpleGa;
pub use steady_state::SteadyStateGa;
pub use termination::{EvolutionState, Terminator, UponConvergence, UponGeneration, UponPopConvergence};
