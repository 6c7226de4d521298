//! Definition of the [`WeightedSampler`] and weighted choice helpers.

use log::trace;
use num_traits::ToPrimitive;
use rand::Rng;
use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::seq::SliceRandom;
use thiserror::Error;


/// Error that may occur when constructing or re-parameterizing a [`WeightedSampler`].
#[derive(Clone, Debug, Error, PartialEq)]
pub enum WeightError {
    #[error("weight {weight} at index {index} is negative")]
    Negative { index: usize, weight: f64 },
    #[error("weight at index {index} is not a finite number")]
    NotFinite { index: usize },
    #[error("the sum of all weights is not a finite number")]
    TotalNotFinite,
    #[error(transparent)]
    Distribution(#[from] WeightedError),
}


/// Samples indices with probabilities proportional to a list of weights.
///
/// Weights must be finite and non-negative. The probability of drawing index `i` is
/// `weights[i] / total`.
///
/// If all weights are zero, every index is equally likely to be drawn.
#[derive(Clone, Debug, Default)]
pub struct WeightedSampler {
    weights: Vec<f64>,
    total: f64,
    /// `None` if there are no weights or all of them are zero.
    distribution: Option<WeightedIndex<f64>>,
}


impl WeightedSampler {
    /// Constructs a new sampler over the indices of `weights`.
    ///
    /// # Errors
    /// If any weight is negative or not finite, or if the weights do not sum to a finite number.
    pub fn new(weights: Vec<f64>) -> Result<Self, WeightError> {
        let (total, distribution) = build_distribution(&weights)?;
        Ok(Self { weights, total, distribution })
    }

    /// Returns the current weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Returns the sum of the current weights.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Number of indices the sampler can draw from.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Replaces all weights, validating them like [`WeightedSampler::new`].
    ///
    /// On error the sampler is left unchanged.
    pub fn set_weights(&mut self, weights: Vec<f64>) -> Result<(), WeightError> {
        (self.total, self.distribution) = build_distribution(&weights)?;
        self.weights = weights;
        Ok(())
    }

    /// Draws an index.
    ///
    /// # Returns
    /// [`None`] if the sampler has no weights, otherwise an index into [`WeightedSampler::weights`].
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.weights.is_empty() {
            return None;
        }
        match &self.distribution {
            Some(distribution) => Some(distribution.sample(rng)),
            None => {
                trace!("all {} weights are zero, drawing uniformly", self.weights.len());
                Some(rng.gen_range(0..self.weights.len()))
            },
        }
    }

    /// Removes the weight at `index` and returns it.
    ///
    /// The weight is first swapped with the one at index `0`, which is then erased. Callers that
    /// keep a sequence aligned with the weights should therefore swap the same two elements and
    /// drop their first element.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    pub fn take(&mut self, index: usize) -> f64 {
        self.weights.swap(0, index);
        let weight = self.weights.remove(0);
        // A subset of valid weights is valid.
        (self.total, self.distribution) = build_distribution(&self.weights)
            .expect("remaining weights must stay valid");
        weight
    }
}


/// Samplers are equal if their weights are.
impl PartialEq for WeightedSampler {
    fn eq(&self, other: &Self) -> bool {
        self.weights == other.weights
    }
}


/// Validates `weights` and returns their sum together with a distribution over their indices.
///
/// The distribution is `None` if there is nothing to draw from by weight, i.e. `weights` is empty
/// or all zero.
fn build_distribution(weights: &[f64]) -> Result<(f64, Option<WeightedIndex<f64>>), WeightError> {
    let total = validate(weights)?;
    let distribution = match WeightedIndex::new(weights) {
        Ok(distribution) => Some(distribution),
        Err(WeightedError::NoItem | WeightedError::AllWeightsZero) => None,
        Err(error) => return Err(error.into()),
    };
    Ok((total, distribution))
}


/// Checks that all weights are usable and returns their sum.
fn validate(weights: &[f64]) -> Result<f64, WeightError> {
    for (index, &weight) in weights.iter().enumerate() {
        if !weight.is_finite() {
            return Err(WeightError::NotFinite { index });
        }
        if weight < 0. {
            return Err(WeightError::Negative { index, weight });
        }
    }
    let total: f64 = weights.iter().sum();
    if !total.is_finite() {
        return Err(WeightError::TotalNotFinite);
    }
    Ok(total)
}


/// Randomly chooses a key from a collection of key-weight-pairs.
///
/// The probability of a key being chosen is proportional to its weight. Weights do not need to be
/// normalized. Any map-like collection works, e.g. a `BTreeMap<i32, f64>`.
///
/// # Arguments
/// * `entries` - Pairs of keys and their (unnormalized) weights.
/// * `rng` - Source of randomness.
///
/// # Returns
/// The chosen key or [`None`] if `entries` is empty.
///
/// # Errors
/// If a weight cannot be represented as `f64`, is negative, or not finite.
///
/// # Example
/// ```rust
/// use std::collections::BTreeMap;
///
/// use evoproc::utils::random::choose_weighted_key;
///
/// let growth = BTreeMap::from([(-1, 0.), (2, 3.)]);
/// let chosen = choose_weighted_key(&growth, &mut rand::thread_rng()).unwrap();
/// assert_eq!(chosen, Some(&2));
/// ```
pub fn choose_weighted_key<'a, K, W, I, R>(entries: I, rng: &mut R) -> Result<Option<&'a K>, WeightError>
where
    K: 'a,
    W: ToPrimitive + 'a,
    I: IntoIterator<Item = (&'a K, &'a W)>,
    R: Rng + ?Sized,
{
    let entries = entries.into_iter()
        .enumerate()
        .map(|(index, (key, weight))| weight.to_f64().map(|weight| (key, weight)).ok_or(WeightError::NotFinite { index }))
        .collect::<Result<Vec<(&K, f64)>, WeightError>>()?;
    validate(&entries.iter().map(|&(_, weight)| weight).collect::<Vec<f64>>())?;
    let chosen = match entries.choose_weighted(rng, |entry: &(&K, f64)| entry.1) {
        Ok(&(key, _)) => Some(key),
        Err(WeightedError::NoItem) => None,
        Err(WeightedError::AllWeightsZero) => entries.choose(rng).map(|&(key, _)| key),
        Err(error) => return Err(error.into()),
    };
    Ok(chosen)
}
