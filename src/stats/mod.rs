//! Degree and label distributions, their entropy, and projected encoding cost.

/// Shannon entropy over histogram counts.
pub mod entropy;
/// Occurrence-count histograms.
pub mod histogram;
/// Codebook and total storage cost model.
pub mod storage;

pub use entropy::{entropy, entropy_of_counts};
pub use histogram::{DegreePair, Histogram};
pub use storage::{codebook_size, total_storage, StorageEstimate, StorageModel};

use crate::dafsa::{Automaton, Label, LabelChar};

/// Counts vertices by their `(in-degree, out-degree)` pair.
pub fn degree_histogram<C: LabelChar>(automaton: &Automaton<C>) -> Histogram<DegreePair> {
    automaton
        .vertices()
        .map(|v| DegreePair::new(automaton.in_degree(v), automaton.out_degree(v)))
        .collect()
}

/// Counts edges by their full label.
pub fn label_histogram<C: LabelChar>(automaton: &Automaton<C>) -> Histogram<Label<C>> {
    automaton.edges().iter().map(|e| e.label.clone()).collect()
}

/// A statistics snapshot of one automaton.
#[derive(Clone, Debug)]
pub struct AutomatonStats<C: LabelChar> {
    /// Number of vertices.
    pub vertices: usize,
    /// Number of edges.
    pub edges: usize,
    /// Vertices per degree pair.
    pub degree_histogram: Histogram<DegreePair>,
    /// Edges per label.
    pub label_histogram: Histogram<Label<C>>,
    /// Entropy of the degree distribution, in bits.
    pub degree_entropy: f64,
    /// Entropy of the label distribution, in bits.
    pub label_entropy: f64,
}

impl<C: LabelChar> AutomatonStats<C> {
    /// Computes the snapshot.
    pub fn collect(automaton: &Automaton<C>) -> Self {
        let degree_histogram = degree_histogram(automaton);
        let label_histogram = label_histogram(automaton);
        AutomatonStats {
            vertices: automaton.vertex_count(),
            edges: automaton.edge_count(),
            degree_entropy: entropy(&degree_histogram, 0),
            label_entropy: entropy(&label_histogram, 0),
            degree_histogram,
            label_histogram,
        }
    }

    /// Storage projection for this snapshot's labels and edge count.
    pub fn storage(&self, model: &StorageModel, occurrence_cutoff: u64) -> StorageEstimate {
        model.estimate(&self.label_histogram, self.edges, occurrence_cutoff)
    }
}
