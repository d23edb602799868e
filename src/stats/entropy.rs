use std::hash::Hash;

use super::histogram::Histogram;

/// Shannon entropy, in bits, of the distribution given by a histogram's counts.
///
/// Only entries with a count of at least `occurrence_cutoff` take part; the
/// rest are dropped from the probability mass entirely rather than pooled.
/// An empty retained set has entropy 0.
///
/// # Examples
///
/// ```
/// use libdafsa::stats::{entropy, Histogram};
///
/// let histogram: Histogram<&str> = ["a", "a", "b", "b"].into_iter().collect();
/// assert_eq!(entropy(&histogram, 0), 1.0);
/// assert_eq!(entropy(&histogram, 3), 0.0);
/// ```
pub fn entropy<K: Eq + Hash>(histogram: &Histogram<K>, occurrence_cutoff: u64) -> f64 {
    entropy_of_counts(histogram.counts().filter(|&count| count >= occurrence_cutoff))
}

/// Shannon entropy, in bits, of raw occurrence counts. Zero counts are ignored.
pub fn entropy_of_counts(counts: impl Iterator<Item = u64> + Clone) -> f64 {
    let total: u64 = counts.clone().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    let h: f64 = counts
        .filter(|&count| count > 0)
        .map(|count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum();
    // A single retained entry yields -0.0.
    if h <= 0.0 {
        0.0
    } else {
        h
    }
}
