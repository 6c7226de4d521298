//! In-place reordering of sequences through index permutations.
//!
//! A permutation is a slice of `usize` of length `N` that contains every index in `0..N` exactly
//! once. Throughout this module a permutation `p` is read as "the element at index `i` moves to
//! index `p[i]`".
//!
//! Passing a slice that is not a permutation to any function here is a programmer error and
//! results in a panic. It is never silently tolerated.


/// Checks whether `permutation` is a bijection over `0..permutation.len()`.
pub fn is_permutation(permutation: &[usize]) -> bool {
    let mut seen = vec![false; permutation.len()];
    permutation.iter().all(
        |&index| index < seen.len() && !std::mem::replace(&mut seen[index], true)
    )
}


/// Replaces a permutation with its inverse.
///
/// After the call `inverse[permutation[i]] == i` holds for every `i`.
///
/// # Example
/// ```rust
/// use evoproc::utils::permute::invert_permutation;
///
/// let mut permutation = vec![3, 0, 1, 2];
/// invert_permutation(&mut permutation);
/// assert_eq!(permutation, vec![1, 2, 3, 0]);
/// ```
///
/// # Panics
/// If `permutation` contains an index out of range or the same index twice.
pub fn invert_permutation(permutation: &mut [usize]) {
    let len = permutation.len();
    let mut inverse = vec![usize::MAX; len];
    for (position, &target) in permutation.iter().enumerate() {
        assert!(target < len, "index {target} is out of range for a permutation of length {len}");
        assert!(inverse[target] == usize::MAX, "index {target} appears twice in the permutation");
        inverse[target] = position;
    }
    permutation.copy_from_slice(&inverse);
}


/// Reorders `data` in place such that the element at index `i` ends up at index `permutation[i]`.
///
/// The permutation is applied cycle by cycle. Every cycle `[c0, c1, ..., ck]` is performed as the
/// transpositions `(c0, c1), (c0, c2), ..., (c0, ck)` from left to right (see
/// [`permutation_to_cycles`] and [`cycle_to_transpositions`]). This takes at most `N - 1` swaps and,
/// apart from one visited flag per index, no additional memory.
///
/// # Example
/// ```rust
/// use evoproc::utils::permute::permute;
///
/// let mut data = vec!['A', 'B', 'C', 'D'];
/// permute(&mut data, &[3, 0, 1, 2]);
/// assert_eq!(data, vec!['B', 'C', 'D', 'A']);
/// ```
///
/// # Panics
/// If the lengths of `data` and `permutation` differ or `permutation` is not a bijection.
pub fn permute<E>(data: &mut [E], permutation: &[usize]) {
    assert_eq!(data.len(), permutation.len(), "data and permutation must have the same length");
    let mut visited = vec![false; permutation.len()];
    for start in 0..permutation.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut next = permutation[start];
        while next != start {
            assert!(!visited[next], "index {next} appears twice in the permutation");
            visited[next] = true;
            data.swap(start, next);
            next = permutation[next];
        }
    }
}


/// Splits a permutation into its disjoint cycles.
///
/// Each cycle starts with its smallest index, followed by the indices it maps to in order.
/// Cycles are returned ordered by their first index. Fixed points form cycles of length one.
///
/// ```rust
/// use evoproc::utils::permute::permutation_to_cycles;
///
/// assert_eq!(permutation_to_cycles(&[0, 1, 3, 2]), vec![vec![0], vec![1], vec![2, 3]]);
/// ```
///
/// # Panics
/// If `permutation` is not a bijection.
pub fn permutation_to_cycles(permutation: &[usize]) -> Vec<Vec<usize>> {
    let mut visited = vec![false; permutation.len()];
    let mut cycles = Vec::new();
    for start in 0..permutation.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut cycle = vec![start];
        let mut next = permutation[start];
        while next != start {
            assert!(!visited[next], "index {next} appears twice in the permutation");
            visited[next] = true;
            cycle.push(next);
            next = permutation[next];
        }
        cycles.push(cycle);
    }
    cycles
}


/// Splits a cycle into transpositions anchored at its first element.
///
/// Applying the returned transpositions from left to right is equivalent to applying the cycle.
/// A cycle of length `k` yields `k - 1` transpositions; an empty or single element cycle yields none.
pub fn cycle_to_transpositions(cycle: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    cycle.split_first()
         .into_iter()
         .flat_map(|(&anchor, rest)| rest.iter().map(move |&index| (anchor, index)))
}
