//! The generational loop driving an evolution run.

use log::{debug, info, trace};
use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

use crate::evolution::evolver::Evolver;
use crate::evolution::options::Options;
use crate::utils::random::{SharedGenerator, WeightError};


/// A generation of specimens. Natural selection leaves it ordered from fittest to least fit.
pub type Generation<T> = Vec<T>;


/// Error that may occur during an evolution run.
#[derive(Debug, Error, PartialEq)]
pub enum EvolutionError {
    #[error("invalid fitness value for probabilistic natural selection: {0}")]
    Weight(#[from] WeightError),
}


/// Runs a process of evolution and returns the final generation.
///
/// Randomness needed by natural selection is drawn from the process-wide [`SharedGenerator`].
/// See [`evolution_with_rng`] for details.
pub fn evolution<T, E, F>(
    evolver: &mut E,
    fitness_function: F,
    options: Options<'_, T>,
) -> Result<Generation<T>, EvolutionError>
where
    E: Evolver<T> + ?Sized,
    F: FnMut(&T) -> f64,
{
    evolution_with_rng(evolver, fitness_function, options, &mut SharedGenerator)
}


/// Runs a process of evolution with an explicit source of randomness.
///
/// 1. The first generation is the starting generation from the `options`, filled up with initial
///    specimens from the `evolver` or truncated to the generation size.
/// 2. As long as the termination predicate returns `false` for the current generation, every pair
///    of specimens produces `offspring_count` children (each mated, then mutated) and natural
///    selection culls those children down to the generation size. Parents do not survive into the
///    next generation.
/// 3. The generation for which the predicate returned `true` is returned.
///
/// The termination predicate is called exactly once per generation, starting with the first one.
/// A generation with fewer than two specimens produces no children; the resulting empty
/// generation is valid and evolution carries on with it.
///
/// # Arguments
/// * `evolver` - Creates, mates and mutates specimens.
/// * `fitness_function` - Rates specimens; higher is better. Must not return NaN. The
///   probabilistic strategy additionally requires non-negative values.
/// * `options` - Options of this run.
/// * `rng` - Source of randomness for natural selection.
///
/// # Errors
/// If probabilistic natural selection encounters a negative or non-finite fitness value.
pub fn evolution_with_rng<T, E, F, R>(
    evolver: &mut E,
    fitness_function: F,
    options: Options<'_, T>,
    rng: &mut R,
) -> Result<Generation<T>, EvolutionError>
where
    E: Evolver<T> + ?Sized,
    F: FnMut(&T) -> f64,
    R: Rng + ?Sized,
{
    Process { evolver, fitness_function, options, run_id: Uuid::new_v4() }.run(rng)
}


/// State of one evolution run.
struct Process<'a, 'e, T, E: ?Sized, F> {
    evolver: &'e mut E,
    fitness_function: F,
    options: Options<'a, T>,
    run_id: Uuid,
}


impl<T, E, F> Process<'_, '_, T, E, F>
where
    E: Evolver<T> + ?Sized,
    F: FnMut(&T) -> f64,
{
    fn run<R: Rng + ?Sized>(mut self, rng: &mut R) -> Result<Generation<T>, EvolutionError> {
        info!("evolution {} started with {:?}", self.run_id, self.options);
        let mut current_generation = self.initial_generation();
        let mut generation_number = 0usize;
        while !(self.options.evolution_terminate)(current_generation.as_slice()) {
            let offspring = self.evolve(&current_generation);
            current_generation = self.natural_selection(offspring, rng)?;
            generation_number += 1;
            debug!(
                "evolution {}: generation {} has {} specimens",
                self.run_id, generation_number, current_generation.len(),
            );
        }
        info!("evolution {} terminated after {} generations", self.run_id, generation_number);
        Ok(current_generation)
    }

    /// Constructs the first generation from the starting generation and initial specimens.
    fn initial_generation(&mut self) -> Generation<T> {
        let generation_size = self.options.generation_size;
        let mut generation = std::mem::take(&mut self.options.starting_generation);
        let missing = generation_size.saturating_sub(generation.len());
        generation.extend((0..missing).map(|_| self.evolver.initial_specimen()));
        generation.truncate(generation_size);
        trace!("evolution {}: {} initial specimens created", self.run_id, missing);
        generation
    }

    /// Mates all specimens with each other.
    fn evolve(&mut self, old_generation: &[T]) -> Generation<T> {
        let num_specimens = old_generation.len();
        let num_pairs = num_specimens * num_specimens.saturating_sub(1) / 2;
        let mut new_generation = Vec::with_capacity(num_pairs * self.options.offspring_count);
        for (idx, father) in old_generation.iter().enumerate() {
            for mother in &old_generation[idx + 1..] {
                self.mate(father, mother, &mut new_generation);
            }
        }
        trace!(
            "evolution {}: {} pairs produced {} children",
            self.run_id, num_pairs, new_generation.len(),
        );
        new_generation
    }

    /// Appends the offspring of two specimens to `offspring`.
    fn mate(&mut self, father: &T, mother: &T, offspring: &mut Generation<T>) {
        for _ in 0..self.options.offspring_count {
            let child = self.evolver.mate(father, mother);
            offspring.push(self.evolver.mutate(&child));
        }
    }

    /// Kills all weak specimens according to the configured strategy.
    fn natural_selection<R: Rng + ?Sized>(
        &mut self,
        mut generation: Generation<T>,
        rng: &mut R,
    ) -> Result<Generation<T>, EvolutionError> {
        self.options.natural_selection_strategy.apply(
            &mut generation,
            &mut self.fitness_function,
            self.options.generation_size,
            rng,
        )?;
        Ok(generation)
    }
}
