use std::hash::Hash;

use hashbrown::HashMap;
use serde::Serialize;

/// Occurrence counts keyed by a discrete value.
///
/// Counts are always positive; a key that was never recorded reads as 0.
/// Partial histograms built over disjoint shards can be combined with
/// [`merge`](Histogram::merge) in any order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Histogram<K: Eq + Hash> {
    counts: HashMap<K, u64>,
}

impl<K: Eq + Hash> Default for Histogram<K> {
    fn default() -> Self {
        Histogram {
            counts: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> Histogram<K> {
    /// Creates an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one occurrence of `key`.
    pub fn record(&mut self, key: K) {
        self.record_n(key, 1);
    }

    /// Adds `n` occurrences of `key`. Recording zero occurrences is a no-op.
    pub fn record_n(&mut self, key: K, n: u64) {
        if n > 0 {
            *self.counts.entry(key).or_insert(0) += n;
        }
    }

    /// Occurrences of `key`.
    pub fn get(&self, key: &K) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Iterates over `(key, count)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> + '_ {
        self.counts.iter().map(|(key, &count)| (key, count))
    }

    /// Iterates over the counts in unspecified order.
    pub fn counts(&self) -> impl Iterator<Item = u64> + Clone + '_ {
        self.counts.values().copied()
    }

    /// Adds every count of `other` into this histogram.
    pub fn merge(&mut self, other: Histogram<K>) {
        for (key, count) in other.counts {
            self.record_n(key, count);
        }
    }
}

impl<K: Eq + Hash + Ord> Histogram<K> {
    /// Entries ordered by descending count, ties broken by ascending key so
    /// reports are reproducible.
    pub fn sorted_desc(&self) -> Vec<(&K, u64)> {
        let mut entries: Vec<(&K, u64)> = self.iter().collect();
        entries.sort_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)));
        entries
    }
}

impl<K: Eq + Hash> FromIterator<K> for Histogram<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut histogram = Histogram::new();
        histogram.extend(iter);
        histogram
    }
}

impl<K: Eq + Hash> Extend<K> for Histogram<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.record(key);
        }
    }
}

/// The `(in-degree, out-degree)` pair of a vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DegreePair {
    /// Incoming edge count.
    pub in_degree: usize,
    /// Outgoing edge count.
    pub out_degree: usize,
}

impl DegreePair {
    /// Creates a degree pair.
    pub fn new(in_degree: usize, out_degree: usize) -> Self {
        DegreePair {
            in_degree,
            out_degree,
        }
    }
}
