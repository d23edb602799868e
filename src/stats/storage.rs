use serde::{Deserialize, Serialize};

use super::entropy::entropy;
use super::histogram::Histogram;
use crate::dafsa::{Label, LabelChar};

/// Parameters of the succinct-encoding cost model.
///
/// The defaults assume 7-bit symbols and a 3-bit structural overhead per edge.
/// Both are modeling choices, not derived constants. Integer bit counts
/// saturate at `u64::MAX` instead of overflowing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageModel {
    /// Bits per stored symbol; a label of length `n` costs `bits_per_symbol * (n + 1)`
    /// to account for its terminator.
    pub bits_per_symbol: u64,
    /// Fixed per-edge structural cost, independent of the label.
    pub bits_per_edge: u64,
}

impl Default for StorageModel {
    fn default() -> Self {
        StorageModel {
            bits_per_symbol: 7,
            bits_per_edge: 3,
        }
    }
}

/// Breakdown of a [`StorageModel::estimate`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StorageEstimate {
    /// Labels below the cutoff, stored literally once per occurrence.
    pub literal_bits: u64,
    /// Labels at or above the cutoff, coded against the codebook.
    pub coded_bits: f64,
    /// The codebook itself.
    pub codebook_bits: u64,
    /// Sum of the three parts.
    pub total_bits: f64,
}

/// `ceil(log2(n))`, with 0 for `n <= 1`.
fn ceil_log2(n: u64) -> u64 {
    if n <= 1 {
        0
    } else {
        u64::from(u64::BITS - (n - 1).leading_zeros())
    }
}

impl StorageModel {
    /// Literal cost of one label: its symbols plus a terminator.
    pub fn label_bits<C: LabelChar>(&self, label: &Label<C>) -> u64 {
        self.bits_per_symbol.saturating_mul(label.len() as u64 + 1)
    }

    /// Bits needed for a table of the distinct labels with fixed-width indices.
    ///
    /// Each distinct label is stored literally, and the index width
    /// `ceil(log2(L))` for `L` labels is itself stored in
    /// `ceil(log2(ceil(log2(L)) + 1))` bits per index bit. An empty histogram
    /// costs nothing.
    pub fn codebook_size<C: LabelChar>(&self, histogram: &Histogram<Label<C>>) -> u64 {
        let distinct = histogram.len() as u64;
        if distinct == 0 {
            return 0;
        }
        let label_bits = histogram
            .iter()
            .fold(0u64, |sum, (label, _)| sum.saturating_add(self.label_bits(label)));
        let index_bits = ceil_log2(distinct);
        let index_width = ceil_log2(index_bits + 1);
        label_bits.saturating_add(index_width * index_bits)
    }

    /// Itemized projected size of an edge-labeled automaton encoding.
    pub fn estimate<C: LabelChar>(
        &self,
        histogram: &Histogram<Label<C>>,
        num_edges: usize,
        occurrence_cutoff: u64,
    ) -> StorageEstimate {
        let literal_bits = histogram
            .iter()
            .filter(|&(_, count)| count < occurrence_cutoff)
            .fold(0u64, |sum, (label, count)| {
                sum.saturating_add(count.saturating_mul(self.label_bits(label)))
            });
        let coded_bits = entropy(histogram, occurrence_cutoff)
            * num_edges as f64
            * self.bits_per_edge as f64;
        let codebook_bits = self.codebook_size(histogram);
        StorageEstimate {
            literal_bits,
            coded_bits,
            codebook_bits,
            total_bits: literal_bits as f64 + coded_bits + codebook_bits as f64,
        }
    }

    /// Projected total bits: literal labels below the cutoff, entropy-coded
    /// labels at or above it, and the codebook.
    pub fn total_storage<C: LabelChar>(
        &self,
        histogram: &Histogram<Label<C>>,
        num_edges: usize,
        occurrence_cutoff: u64,
    ) -> f64 {
        self.estimate(histogram, num_edges, occurrence_cutoff).total_bits
    }
}

/// [`StorageModel::codebook_size`] with the default model.
pub fn codebook_size<C: LabelChar>(histogram: &Histogram<Label<C>>) -> u64 {
    StorageModel::default().codebook_size(histogram)
}

/// [`StorageModel::total_storage`] with the default model.
///
/// # Examples
///
/// ```
/// use libdafsa::dafsa::{IntoLabel, Label};
/// use libdafsa::stats::{total_storage, Histogram};
///
/// let mut histogram: Histogram<Label<char>> = Histogram::new();
/// histogram.record_n("a".collect_label(), 4);
/// histogram.record_n("b".collect_label(), 4);
/// // 1 bit of entropy * 8 edges * 3 bits + a 29-bit codebook
/// assert_eq!(total_storage(&histogram, 8, 0), 53.0);
/// ```
pub fn total_storage<C: LabelChar>(
    histogram: &Histogram<Label<C>>,
    num_edges: usize,
    occurrence_cutoff: u64,
) -> f64 {
    StorageModel::default().total_storage(histogram, num_edges, occurrence_cutoff)
}
