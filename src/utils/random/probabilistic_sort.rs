use num_traits::ToPrimitive;
use rand::Rng;

use crate::utils::random::weighted::{WeightError, WeightedSampler};


/// Sorts a slice randomly, such that elements with higher weights tend to come first.
///
/// The first element is drawn from all elements with a probability proportional to its weight.
/// Every following position is filled the same way from the elements not placed yet
/// (i.e. weighted sampling without replacement).
///
/// `weigher` is called exactly once per element.
///
/// # Arguments
/// * `data` - The slice to sort in place.
/// * `weigher` - Maps each element to its non-negative, finite weight.
/// * `rng` - Source of randomness.
///
/// # Errors
/// If any weight is invalid (see [`WeightedSampler::new`]). `data` is left untouched in that case.
pub fn probabilistic_sort<E, F, R>(data: &mut [E], weigher: F, rng: &mut R) -> Result<(), WeightError>
where
    F: FnMut(&E) -> f64,
    R: Rng + ?Sized,
{
    let mut sampler = WeightedSampler::new(data.iter().map(weigher).collect())?;
    // The sampler's weights stay aligned with `data[position..]`.
    for position in 0..data.len() {
        let Some(drawn) = sampler.sample(rng) else { break };
        data[position..].swap(0, drawn);
        sampler.take(drawn);
    }
    Ok(())
}


/// Like [`probabilistic_sort`], with every element serving as its own weight.
///
/// # Errors
/// If an element is negative, not finite, or cannot be represented as `f64`.
pub fn probabilistic_sort_by_value<E, R>(data: &mut [E], rng: &mut R) -> Result<(), WeightError>
where
    E: ToPrimitive,
    R: Rng + ?Sized,
{
    probabilistic_sort(data, |element| element.to_f64().unwrap_or(f64::NAN), rng)
}
