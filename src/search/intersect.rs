//! Sorted id-list intersection used to AND the terms of a multi-word query.

use std::cmp::Ordering;

/// Two-pointer intersection of two ascending id lists.
///
/// Both inputs must be sorted. Equal runs emit a single id, so the output is
/// sorted and duplicate-free.
pub fn intersect_sorted(left: &[String], right: &[String]) -> Vec<String> {
    if left.is_empty() || right.is_empty() {
        return Vec::new();
    }
    let mut result = Vec::with_capacity(left.len().min(right.len()));
    let (mut i, mut j) = (0usize, 0usize);
    while i < left.len() && j < right.len() {
        match left[i].cmp(&right[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                if result.last() != Some(&left[i]) {
                    result.push(left[i].clone());
                }
                i += 1;
                j += 1;
            }
        }
    }
    result
}
