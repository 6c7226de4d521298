//! Definition of the [`Evolver`] trait.


/// Genetic operators for specimens of type `T`.
///
/// The evolutionary process never looks inside a specimen. It only creates, mates and mutates them
/// through this trait. Methods take `&mut self`, so implementations may keep state such as their
/// own random number generator or a counter.
pub trait Evolver<T> {
    /// Generates a new specimen. Usually this is a random instance of `T`.
    fn initial_specimen(&mut self) -> T;

    /// Constructs a new specimen from two parents.
    fn mate(&mut self, father: &T, mother: &T) -> T;

    /// Returns a randomly mutated copy of `specimen`.
    fn mutate(&mut self, specimen: &T) -> T;
}


/// [`Evolver`] assembled from three closures.
///
/// # Example
/// ```rust
/// use evoproc::evolution::{Evolver, FnEvolver};
///
/// let mut evolver = FnEvolver::new(|| 1, |a: &i32, b: &i32| a + b, |x: &i32| x - 1);
/// let child = evolver.mate(&2, &3);
/// assert_eq!(evolver.mutate(&child), 4);
/// ```
pub struct FnEvolver<I, M, U> {
    initial_specimen: I,
    mate: M,
    mutate: U,
}


impl<I, M, U> FnEvolver<I, M, U> {
    pub fn new(initial_specimen: I, mate: M, mutate: U) -> Self {
        Self { initial_specimen, mate, mutate }
    }
}


impl<T, I, M, U> Evolver<T> for FnEvolver<I, M, U>
where
    I: FnMut() -> T,
    M: FnMut(&T, &T) -> T,
    U: FnMut(&T) -> T,
{
    fn initial_specimen(&mut self) -> T {
        (self.initial_specimen)()
    }

    fn mate(&mut self, father: &T, mother: &T) -> T {
        (self.mate)(father, mother)
    }

    fn mutate(&mut self, specimen: &T) -> T {
        (self.mutate)(specimen)
    }
}
