//! Generic evolutionary process: the generational loop, its options and natural selection.

pub mod evolver;
pub mod options;
pub mod process;
pub mod selection;

pub use evolver::{Evolver, FnEvolver};
pub use options::{
    terminate_after,
    terminate_after_n_generations,
    EvolutionConfig,
    LoadError,
    NaturalSelectionStrategy,
    Options,
    OptionsError,
    TerminationPredicate,
};
pub use process::{evolution, evolution_with_rng, EvolutionError, Generation};
pub use selection::{kill_precise_worst, kill_probabilistic_worst};
