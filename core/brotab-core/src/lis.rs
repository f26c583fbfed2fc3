//! Longest strictly increasing subsequence.
//!
//! Patience sorting in O(n log n): `tails[k]` holds the input position of
//! the smallest tail of any increasing run of length `k + 1`, and
//! `previous[i]` links each element to its predecessor in the best run that
//! ends at it. Comparison is strict, so equal values never extend a run.

/// Returns the values of a longest strictly increasing subsequence of
/// `sequence`, in their original order.
pub fn longest_increasing_subsequence<T: Ord + Clone>(sequence: &[T]) -> Vec<T> {
    longest_increasing_positions(sequence)
        .into_iter()
        .map(|position| sequence[position].clone())
        .collect()
}

/// Like [`longest_increasing_subsequence`], but returns input positions.
pub fn longest_increasing_positions<T: Ord>(sequence: &[T]) -> Vec<usize> {
    let mut tails: Vec<usize> = Vec::with_capacity(sequence.len());
    let mut previous: Vec<Option<usize>> = vec![None; sequence.len()];

    for (position, value) in sequence.iter().enumerate() {
        // First run whose tail is not below `value`.
        let length = tails.partition_point(|&tail| sequence[tail] < *value);
        if length > 0 {
            previous[position] = Some(tails[length - 1]);
        }
        if length == tails.len() {
            tails.push(position);
        } else {
            tails[length] = position;
        }
    }

    let mut positions = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(position) = cursor {
        positions.push(position);
        cursor = previous[position];
    }
    positions.reverse();
    positions
}
