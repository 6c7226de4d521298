//! Sorting by expensive keys.

use crate::utils::permute::{invert_permutation, permute};


/// Sorts a slice in ascending order of the keys returned by `key`.
///
/// Unlike [`slice::sort_by_key`], the key function is called exactly once per element. The keys
/// are collected into a companion vector, a vector of indices is sorted by comparing those keys,
/// and the resulting index permutation is then applied to `data` in place.
/// Use this whenever deriving the key is expensive, e.g. when it means evaluating a fitness
/// function.
///
/// The sort is stable: elements with equal keys keep their relative order.
///
/// # Arguments
/// * `data` - The slice to sort.
/// * `key` - Maps an element to something comparable.
///
/// # Example
/// ```rust
/// use evoproc::utils::sort::sort_by_key_once;
///
/// let mut words = vec!["banana", "fig", "cherry", "kiwi"];
/// sort_by_key_once(&mut words, |word| word.len());
/// assert_eq!(words, vec!["fig", "kiwi", "banana", "cherry"]);
/// ```
pub fn sort_by_key_once<E, K, F>(data: &mut [E], key: F)
where
    K: Ord,
    F: FnMut(&E) -> K,
{
    let keys: Vec<K> = data.iter().map(key).collect();
    // `sorted_indices[i]` is the index of the element that belongs at position `i`.
    let mut sorted_indices: Vec<usize> = (0..data.len()).collect();
    sorted_indices.sort_by(|&lhs, &rhs| keys[lhs].cmp(&keys[rhs]));
    // After inversion, `sorted_indices[j]` is the target position of the element at index `j`.
    invert_permutation(&mut sorted_indices);
    permute(data, &sorted_indices);
}
