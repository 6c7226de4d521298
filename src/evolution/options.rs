//! Configuration of an evolution run.

use std::fmt::{self, Debug, Display};
use std::fs::read_to_string;
use std::io::Error as IOError;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;


/// Predicate deciding whether an evolution run should stop.
///
/// Called exactly once per generation, starting with the initial one. Implementations may keep
/// state (e.g. count calls or record generations).
pub type TerminationPredicate<'a, T> = Box<dyn FnMut(&[T]) -> bool + 'a>;


/// Error that may occur when configuring an evolution run.
#[derive(Debug, Error, PartialEq)]
pub enum OptionsError {
    #[error("unknown natural selection strategy `{0}`")]
    UnknownStrategy(String),
    #[error("unknown natural selection strategy tag {0}")]
    UnknownStrategyTag(u8),
}


/// Error that may occur when trying to load an [`EvolutionConfig`] from a file.
#[derive(Debug, Error)]
#[error(transparent)]
pub enum LoadError {
    IO(#[from] IOError),
    Deserialization(#[from] serde_json::Error),
}


/// How the specimens surviving each generation are chosen.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NaturalSelectionStrategy {
    /// Kill specimens starting from the least fit until the generation size is reached.
    #[default]
    KillPreciseWorst = 0,

    /// Kill specimens until the generation size is reached. Less fit specimens are more likely to
    /// be killed, but no specimen is safe. Fitness values must be non-negative.
    KillProbabilisticWorst = 1,
}


impl NaturalSelectionStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::KillPreciseWorst => "kill_precise_worst",
            Self::KillProbabilisticWorst => "kill_probabilistic_worst",
        }
    }
}


impl Display for NaturalSelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}


impl FromStr for NaturalSelectionStrategy {
    type Err = OptionsError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "kill_precise_worst" => Ok(Self::KillPreciseWorst),
            "kill_probabilistic_worst" => Ok(Self::KillProbabilisticWorst),
            _ => Err(OptionsError::UnknownStrategy(name.to_owned())),
        }
    }
}


impl TryFrom<u8> for NaturalSelectionStrategy {
    type Error = OptionsError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::KillPreciseWorst),
            1 => Ok(Self::KillProbabilisticWorst),
            _ => Err(OptionsError::UnknownStrategyTag(tag)),
        }
    }
}


/// The serializable part of [`Options`].
///
/// Unknown strategy names are rejected while deserializing.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct EvolutionConfig {
    #[serde(default)]
    pub natural_selection_strategy: NaturalSelectionStrategy,

    /// The number of specimens kept in each generation.
    pub generation_size: usize,

    /// The number of children of each pair of parents.
    pub offspring_count: usize,
}


impl EvolutionConfig {
    /// Parses a config from a json string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Loads a config from a json file.
    ///
    /// # Arguments
    /// * `path` - path to the json file
    ///
    /// # Returns
    /// A new `EvolutionConfig` instance or a `LoadError`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        return Ok(Self::from_json(read_to_string(path)?.as_str())?);
    }
}


/// Options for a single evolution run.
pub struct Options<'a, T> {
    /// How natural selection works.
    pub natural_selection_strategy: NaturalSelectionStrategy,

    /// The number of specimens that are kept in each generation.
    pub generation_size: usize,

    /// A subset of the first generation.
    ///
    /// If shorter than `generation_size`, it is filled up with initial specimens from the evolver.
    /// If longer, the excess specimens at the end are dropped.
    pub starting_generation: Vec<T>,

    /// Evaluated exactly once per generation to determine whether the run should terminate.
    pub evolution_terminate: TerminationPredicate<'a, T>,

    /// The number of children of each pair of parents.
    pub offspring_count: usize,
}


impl<'a, T: 'a> Options<'a, T> {
    /// Constructs options with an empty starting generation that terminate right away.
    ///
    /// Use [`Options::with_termination`] to let the run actually evolve.
    pub fn new(
        natural_selection_strategy: NaturalSelectionStrategy,
        generation_size: usize,
        offspring_count: usize,
    ) -> Self {
        Self {
            natural_selection_strategy,
            generation_size,
            starting_generation: Vec::new(),
            evolution_terminate: Box::new(|_: &[T]| true),
            offspring_count,
        }
    }

    /// Constructs options from a config and a termination predicate.
    pub fn from_config(config: &EvolutionConfig, evolution_terminate: TerminationPredicate<'a, T>) -> Self {
        Self {
            evolution_terminate,
            ..Self::new(config.natural_selection_strategy, config.generation_size, config.offspring_count)
        }
    }

    pub fn with_starting_generation(mut self, starting_generation: Vec<T>) -> Self {
        self.starting_generation = starting_generation;
        self
    }

    pub fn with_termination(mut self, evolution_terminate: TerminationPredicate<'a, T>) -> Self {
        self.evolution_terminate = evolution_terminate;
        self
    }
}


impl<T> Debug for Options<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
         .field("natural_selection_strategy", &self.natural_selection_strategy)
         .field("generation_size", &self.generation_size)
         .field("starting_generation_len", &self.starting_generation.len())
         .field("offspring_count", &self.offspring_count)
         .finish_non_exhaustive()
    }
}


/// Builds a predicate that terminates after `n` generations or once `second_condition` holds.
///
/// `second_condition` is asked first on every call, even on the call that terminates because the
/// `n` generations are used up. A call on which it returns `true` does not count towards `n`.
/// Passing a generation logger as `second_condition` therefore sees every generation including
/// the last one, i.e. `n + 1` calls when it never returns `true`.
///
/// # Example
/// ```rust
/// use evoproc::evolution::terminate_after_n_generations;
///
/// let mut calls = 0;
/// let mut terminate = terminate_after_n_generations(1, |_: &[u8]| { calls += 1; false });
/// assert!(!terminate(&[]));
/// assert!(terminate(&[]));
/// drop(terminate);
/// assert_eq!(calls, 2);
/// ```
pub fn terminate_after_n_generations<'a, T, F>(n: usize, mut second_condition: F) -> TerminationPredicate<'a, T>
where
    T: 'a,
    F: FnMut(&[T]) -> bool + 'a,
{
    let mut remaining = n;
    Box::new(move |generation: &[T]| {
        if second_condition(generation) {
            return true;
        }
        if remaining == 0 {
            return true;
        }
        remaining -= 1;
        false
    })
}


/// Builds a predicate that terminates after `n` generations.
pub fn terminate_after<'a, T: 'a>(n: usize) -> TerminationPredicate<'a, T> {
    terminate_after_n_generations(n, |_| false)
}
