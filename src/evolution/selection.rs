use std::cmp::Reverse;

use log::trace;
use ordered_float::OrderedFloat;
use rand::Rng;

use crate::evolution::options::NaturalSelectionStrategy;
use crate::utils::random::{probabilistic_sort, WeightError};
use crate::utils::sort::sort_by_key_once;


impl NaturalSelectionStrategy {
    /// Culls `generation` down to at most `generation_size` specimens, fittest first.
    ///
    /// Dispatches to [`kill_precise_worst`] or [`kill_probabilistic_worst`].
    ///
    /// # Errors
    /// Only for [`NaturalSelectionStrategy::KillProbabilisticWorst`], if a fitness value is
    /// negative or not finite.
    pub fn apply<T, F, R>(
        &self,
        generation: &mut Vec<T>,
        fitness_function: F,
        generation_size: usize,
        rng: &mut R,
    ) -> Result<(), WeightError>
    where
        F: FnMut(&T) -> f64,
        R: Rng + ?Sized,
    {
        match self {
            Self::KillPreciseWorst => {
                kill_precise_worst(generation, fitness_function, generation_size);
                Ok(())
            },
            Self::KillProbabilisticWorst => {
                kill_probabilistic_worst(generation, fitness_function, generation_size, rng)
            },
        }
    }
}


/// Reference implementation of deterministic natural selection.
///
/// Sorts `generation` by descending fitness and keeps only the first `generation_size`
/// specimens. Specimens of equal fitness keep their relative order. The fitness function is
/// evaluated exactly once per specimen.
///
/// Fitness values must not be NaN.
pub fn kill_precise_worst<T, F>(generation: &mut Vec<T>, mut fitness_function: F, generation_size: usize)
where
    F: FnMut(&T) -> f64,
{
    sort_by_key_once(generation, |specimen| Reverse(OrderedFloat(fitness_function(specimen))));
    trace!("killing {} of {} specimens", generation.len().saturating_sub(generation_size), generation.len());
    generation.truncate(generation_size);
}


/// Reference implementation of probabilistic natural selection.
///
/// Orders `generation` randomly, such that a specimen is placed before the remaining ones with a
/// probability proportional to its fitness, and keeps only the first `generation_size` specimens.
///
/// # Errors
/// If any fitness value is negative or not finite. The generation is left untouched in that case.
/// Callers whose fitness can become negative need to offset it themselves.
pub fn kill_probabilistic_worst<T, F, R>(
    generation: &mut Vec<T>,
    fitness_function: F,
    generation_size: usize,
    rng: &mut R,
) -> Result<(), WeightError>
where
    F: FnMut(&T) -> f64,
    R: Rng + ?Sized,
{
    probabilistic_sort(generation, fitness_function, rng)?;
    trace!("killing {} of {} specimens", generation.len().saturating_sub(generation_size), generation.len());
    generation.truncate(generation_size);
    Ok(())
}


#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_kill_precise_worst_is_top_k() {
        let mut generation = vec![5, 1, 9, 3, 9, 7];
        let mut evaluations = 0;
        kill_precise_worst(&mut generation, |x| { evaluations += 1; *x as f64 }, 3);
        assert_eq!(generation, vec![9, 9, 7]);
        assert_eq!(evaluations, 6);
    }

    #[test]
    fn test_kill_precise_worst_ties_keep_order() {
        let mut generation = vec![("a", 1.), ("b", 2.), ("c", 1.), ("d", 2.), ("e", 1.)];
        kill_precise_worst(&mut generation, |(_, fitness)| *fitness, 4);
        let names: Vec<&str> = generation.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_kill_precise_worst_small_generation() {
        let mut generation = vec![2., 1.];
        kill_precise_worst(&mut generation, |x| *x, 5);
        assert_eq!(generation, vec![2., 1.]);
        let mut empty: Vec<f64> = vec![];
        kill_precise_worst(&mut empty, |x| *x, 5);
        assert!(empty.is_empty());
        let mut generation = vec![2., 1.];
        kill_precise_worst(&mut generation, |x| *x, 0);
        assert!(generation.is_empty());
    }

    #[test]
    fn test_kill_probabilistic_worst() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..100 {
            let mut generation = vec![0., 4., 0., 2., 0., 1.];
            kill_probabilistic_worst(&mut generation, |x| *x, 3, &mut rng).unwrap();
            assert_eq!(generation.len(), 3);
            // Zero fitness specimens can only survive once all others are placed.
            let mut survivors = generation.clone();
            survivors.sort_by(|lhs, rhs| lhs.total_cmp(rhs));
            assert_eq!(survivors, vec![1., 2., 4.]);
        }
    }

    #[test]
    fn test_kill_probabilistic_worst_rejects_negative_fitness() {
        let mut generation = vec![1., -3.];
        let result = kill_probabilistic_worst(&mut generation, |x| *x, 1, &mut StdRng::seed_from_u64(0));
        assert_eq!(result, Err(WeightError::Negative { index: 1, weight: -3. }));
        assert_eq!(generation.len(), 2);
    }

    #[test]
    fn test_apply_dispatch() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut generation = vec![1., 3., 2.];
        NaturalSelectionStrategy::KillPreciseWorst.apply(&mut generation, |x| *x, 2, &mut rng).unwrap();
        assert_eq!(generation, vec![3., 2.]);
        let mut generation = vec![1., 3., 2.];
        NaturalSelectionStrategy::KillProbabilisticWorst.apply(&mut generation, |x| *x, 2, &mut rng).unwrap();
        assert_eq!(generation.len(), 2);
    }
}
