//! Process-wide random number generation and weighted sampling.

pub mod probabilistic_sort;
pub mod weighted;

pub use probabilistic_sort::{probabilistic_sort, probabilistic_sort_by_value};
pub use weighted::{choose_weighted_key, WeightError, WeightedSampler};

use std::sync::{Mutex, MutexGuard, PoisonError};

use generic_singleton::get_or_init;
use rand::{Error as RandError, Rng, RngCore, SeedableRng};
use rand::rngs::StdRng;


/// Handle to the process-wide random number generator.
///
/// The generator itself is a [`StdRng`] seeded from operating system entropy. It is created lazily
/// the first time any `SharedGenerator` draws a number and lives until the process exits.
///
/// The handle is zero-sized and locks the generator only for the duration of a single draw.
/// It is therefore safe to use from multiple threads and from code that is itself called while
/// another `SharedGenerator` is in use (e.g. an `Evolver` drawing numbers during an evolution run).
///
/// Wherever reproducibility matters, pass an explicitly seeded generator instead.
#[derive(Clone, Copy, Debug, Default)]
pub struct SharedGenerator;


impl SharedGenerator {
    /// Returns a reference to the generator singleton, initializing it if necessary.
    fn get() -> &'static Mutex<StdRng> {
        get_or_init!(|| Mutex::new(StdRng::from_entropy()))
    }

    /// Locks the generator singleton.
    ///
    /// A poisoned lock is recovered, since no draw can leave the generator in an invalid state.
    fn lock() -> MutexGuard<'static, StdRng> {
        Self::get().lock().unwrap_or_else(PoisonError::into_inner)
    }
}


impl RngCore for SharedGenerator {
    fn next_u32(&mut self) -> u32 {
        Self::lock().next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        Self::lock().next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        Self::lock().fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), RandError> {
        Self::lock().try_fill_bytes(dest)
    }
}


/// Checks if a percentage roll passes.
///
/// A `percentage` of `0` never passes, a `percentage` of `1` (or more) always does.
pub fn roll_percentage<R: Rng + ?Sized>(rng: &mut R, percentage: f64) -> bool {
    if percentage <= 0. {
        return false;
    }
    rng.gen_range(0f64..=1f64) <= percentage
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_generator_draws() {
        let mut rng = SharedGenerator;
        let draws: Vec<u64> = (0..8).map(|_| rng.next_u64()).collect();
        // Eight identical 64 bit draws from an entropy-seeded generator do not happen.
        assert!(draws.windows(2).any(|pair| pair[0] != pair[1]));
    }

    #[test]
    fn test_shared_generator_nested_use() {
        let mut outer = SharedGenerator;
        let value: u32 = outer.gen_range(0..10);
        let mut inner = SharedGenerator;
        let other: u32 = inner.gen_range(0..10);
        assert!(value < 10 && other < 10);
    }

    #[test]
    fn test_roll_percentage() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!((0..1000).all(|_| !roll_percentage(&mut rng, 0.)));
        assert!((0..1000).all(|_| roll_percentage(&mut rng, 1.)));
        let passed = (0..10_000).filter(|_| roll_percentage(&mut rng, 0.25)).count();
        assert!((2_200..2_800).contains(&passed), "{passed} of 10000 rolls passed");
    }
}
