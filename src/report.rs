//! Before/after comparison reports, rendered as text or serialized as JSON.
//!
//! ```
//! use libdafsa::dafsa::{compress, Automaton};
//! use libdafsa::report::CompressionReport;
//! use libdafsa::stats::AutomatonStats;
//!
//! let automaton = Automaton::<char>::from_edges(4, [(0, 1, "a"), (1, 2, "b"), (2, 3, "c")]).unwrap();
//! let compressed = compress(&automaton).unwrap();
//! let report = CompressionReport::new(
//!     &AutomatonStats::collect(&automaton),
//!     &AutomatonStats::collect(&compressed),
//! );
//! assert_eq!(report.ratios.vertices, Some(0.5));
//! assert!(report.to_string().starts_with("States: 4 (2 compressed, ratio 0.50)"));
//! ```

use std::fmt::{self, Display};

use serde::Serialize;

use crate::dafsa::{CompressSummary, LabelChar};
use crate::stats::{AutomatonStats, StorageEstimate};

/// Vertices sharing one degree pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DegreeCount {
    /// Incoming edge count.
    pub in_degree: usize,
    /// Outgoing edge count.
    pub out_degree: usize,
    /// Number of vertices.
    pub count: u64,
}

/// Edges sharing one label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    /// The label text.
    pub label: String,
    /// Number of edges.
    pub count: u64,
}

/// Statistics of one automaton with histograms in report order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatsSummary {
    /// Vertex count.
    pub vertices: usize,
    /// Edge count.
    pub edges: usize,
    /// Degree entropy in bits.
    pub degree_entropy: f64,
    /// Label entropy in bits.
    pub label_entropy: f64,
    /// Degree histogram, descending by count.
    pub degree_histogram: Vec<DegreeCount>,
    /// Label histogram, descending by count.
    pub label_histogram: Vec<LabelCount>,
    /// Projected storage cost, if computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageEstimate>,
}

impl StatsSummary {
    /// Flattens a statistics snapshot. Histogram ties are ordered by key.
    pub fn new<C: LabelChar + Display>(stats: &AutomatonStats<C>) -> Self {
        StatsSummary {
            vertices: stats.vertices,
            edges: stats.edges,
            degree_entropy: stats.degree_entropy,
            label_entropy: stats.label_entropy,
            degree_histogram: stats
                .degree_histogram
                .sorted_desc()
                .into_iter()
                .map(|(pair, count)| DegreeCount {
                    in_degree: pair.in_degree,
                    out_degree: pair.out_degree,
                    count,
                })
                .collect(),
            label_histogram: stats
                .label_histogram
                .sorted_desc()
                .into_iter()
                .map(|(label, count)| LabelCount {
                    label: label.to_string(),
                    count,
                })
                .collect(),
            storage: None,
        }
    }

    /// Attaches a storage estimate.
    pub fn with_storage(mut self, storage: StorageEstimate) -> Self {
        self.storage = Some(storage);
        self
    }

    fn write_degrees(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.degree_histogram {
            writeln!(
                f,
                "{} in, {} out: {}",
                entry.in_degree, entry.out_degree, entry.count
            )?;
        }
        Ok(())
    }

    fn write_labels(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.label_histogram {
            writeln!(f, "{}: {}", entry.label, entry.count)?;
        }
        Ok(())
    }
}

fn write_storage(f: &mut fmt::Formatter<'_>, name: &str, storage: &StorageEstimate) -> fmt::Result {
    writeln!(
        f,
        "{name} storage: {:.2} bits (literal {}, coded {:.2}, codebook {})",
        storage.total_bits, storage.literal_bits, storage.coded_bits, storage.codebook_bits
    )
}

impl Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "States: {}", self.vertices)?;
        writeln!(f, "Edges: {}", self.edges)?;
        writeln!(f, "Degree entropy: {:.2} bits", self.degree_entropy)?;
        writeln!(f, "Label entropy: {:.2} bits", self.label_entropy)?;
        writeln!(f)?;
        writeln!(f, "Degree histogram:")?;
        self.write_degrees(f)?;
        writeln!(f)?;
        writeln!(f, "Label histogram:")?;
        self.write_labels(f)?;
        if let Some(storage) = &self.storage {
            writeln!(f)?;
            write_storage(f, "Projected", storage)?;
        }
        Ok(())
    }
}

/// `compressed / uncompressed`, or `None` when the uncompressed figure is zero.
pub fn ratio(compressed: f64, uncompressed: f64) -> Option<f64> {
    if uncompressed == 0.0 {
        None
    } else {
        Some(compressed / uncompressed)
    }
}

/// Compressed-to-uncompressed ratios of the headline figures.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Ratios {
    /// Vertex count ratio.
    pub vertices: Option<f64>,
    /// Edge count ratio.
    pub edges: Option<f64>,
    /// Degree entropy ratio.
    pub degree_entropy: Option<f64>,
    /// Label entropy ratio.
    pub label_entropy: Option<f64>,
    /// Total storage ratio, when both estimates are present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<f64>,
}

impl Ratios {
    fn between(before: &StatsSummary, after: &StatsSummary) -> Self {
        Ratios {
            vertices: ratio(after.vertices as f64, before.vertices as f64),
            edges: ratio(after.edges as f64, before.edges as f64),
            degree_entropy: ratio(after.degree_entropy, before.degree_entropy),
            label_entropy: ratio(after.label_entropy, before.label_entropy),
            storage: match (&before.storage, &after.storage) {
                (Some(b), Some(a)) => ratio(a.total_bits, b.total_bits),
                _ => None,
            },
        }
    }
}

/// Side-by-side statistics of an automaton and its compressed form.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompressionReport {
    /// The input automaton.
    pub uncompressed: StatsSummary,
    /// The compressed automaton.
    pub compressed: StatsSummary,
    /// Compressed over uncompressed figures.
    pub ratios: Ratios,
    /// What the compression pass did, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<CompressSummary>,
}

impl CompressionReport {
    /// Builds a report from the before and after snapshots.
    pub fn new<C: LabelChar + Display>(
        before: &AutomatonStats<C>,
        after: &AutomatonStats<C>,
    ) -> Self {
        Self::from_summaries(StatsSummary::new(before), StatsSummary::new(after))
    }

    /// Builds a report from already flattened summaries.
    pub fn from_summaries(uncompressed: StatsSummary, compressed: StatsSummary) -> Self {
        let ratios = Ratios::between(&uncompressed, &compressed);
        CompressionReport {
            uncompressed,
            compressed,
            ratios,
            summary: None,
        }
    }

    /// Adds storage estimates for both sides.
    pub fn with_storage(self, before: StorageEstimate, after: StorageEstimate) -> Self {
        let summary = self.summary;
        let mut report = Self::from_summaries(
            self.uncompressed.with_storage(before),
            self.compressed.with_storage(after),
        );
        report.summary = summary;
        report
    }

    /// Attaches the compression pass summary.
    pub fn with_summary(mut self, summary: CompressSummary) -> Self {
        self.summary = Some(summary);
        self
    }
}

struct Ratio(Option<f64>);

impl Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(r) => write!(f, "{r:.2}"),
            None => f.write_str("n/a"),
        }
    }
}

impl Display for CompressionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (before, after, ratios) = (&self.uncompressed, &self.compressed, &self.ratios);
        writeln!(
            f,
            "States: {} ({} compressed, ratio {})",
            before.vertices,
            after.vertices,
            Ratio(ratios.vertices)
        )?;
        writeln!(
            f,
            "Edges: {} ({} compressed, ratio {})",
            before.edges,
            after.edges,
            Ratio(ratios.edges)
        )?;
        writeln!(
            f,
            "Degree entropy: {:.2} bits ({:.2} compressed, ratio {})",
            before.degree_entropy,
            after.degree_entropy,
            Ratio(ratios.degree_entropy)
        )?;
        writeln!(
            f,
            "Label entropy: {:.2} bits ({:.2} compressed, ratio {})",
            before.label_entropy,
            after.label_entropy,
            Ratio(ratios.label_entropy)
        )?;

        writeln!(f, "\nUncompressed degree histogram:")?;
        before.write_degrees(f)?;
        writeln!(f, "\nCompressed degree histogram:")?;
        after.write_degrees(f)?;
        writeln!(f, "\nUncompressed label histogram:")?;
        before.write_labels(f)?;
        writeln!(f, "\nCompressed label histogram:")?;
        after.write_labels(f)?;

        if let (Some(b), Some(a)) = (&before.storage, &after.storage) {
            writeln!(f)?;
            write_storage(f, "Uncompressed", b)?;
            write_storage(f, "Compressed", a)?;
            writeln!(f, "Storage ratio: {}", Ratio(ratios.storage))?;
        }
        if let Some(summary) = &self.summary {
            if summary.terminals_dropped > 0 {
                writeln!(
                    f,
                    "\nWarning: {} terminal vertices were folded into edges",
                    summary.terminals_dropped
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dafsa::{compress, Automaton};
    use crate::stats::StorageModel;

    fn chain() -> Automaton<char> {
        Automaton::from_edges(4, [(0, 1, "a"), (1, 2, "b"), (2, 3, "c")]).unwrap()
    }

    fn chain_report() -> CompressionReport {
        let automaton = chain();
        let compressed = compress(&automaton).unwrap();
        CompressionReport::new(
            &AutomatonStats::collect(&automaton),
            &AutomatonStats::collect(&compressed),
        )
    }

    #[test]
    fn ratio_guards_zero_denominator() {
        assert_eq!(ratio(1.0, 2.0), Some(0.5));
        assert_eq!(ratio(0.0, 0.0), None);
        assert_eq!(ratio(3.0, 0.0), None);
    }

    #[test]
    fn chain_text_report() {
        let text = chain_report().to_string();
        let expected = "\
States: 4 (2 compressed, ratio 0.50)
Edges: 3 (1 compressed, ratio 0.33)
Degree entropy: 1.50 bits (1.00 compressed, ratio 0.67)
Label entropy: 1.58 bits (0.00 compressed, ratio 0.00)

Uncompressed degree histogram:
1 in, 1 out: 2
0 in, 1 out: 1
1 in, 0 out: 1

Compressed degree histogram:
0 in, 1 out: 1
1 in, 0 out: 1

Uncompressed label histogram:
a: 1
b: 1
c: 1

Compressed label histogram:
abc: 1
";
        assert_eq!(text, expected);
    }

    #[test]
    fn single_vertex_reports_undefined_ratios() {
        let automaton = Automaton::<char>::from_edges(1, Vec::<(u32, u32, &str)>::new()).unwrap();
        let stats = AutomatonStats::collect(&automaton);
        let report = CompressionReport::new(&stats, &stats);
        assert_eq!(report.ratios.vertices, Some(1.0));
        assert_eq!(report.ratios.edges, None);
        assert_eq!(report.ratios.degree_entropy, None);
        let text = report.to_string();
        assert!(text.contains("Edges: 0 (0 compressed, ratio n/a)"));
        assert!(text.contains("Label entropy: 0.00 bits (0.00 compressed, ratio n/a)"));
    }

    #[test]
    fn storage_section() {
        let automaton = chain();
        let compressed = compress(&automaton).unwrap();
        let before = AutomatonStats::collect(&automaton);
        let after = AutomatonStats::collect(&compressed);
        let model = StorageModel::default();
        let report = CompressionReport::new(&before, &after)
            .with_summary(CompressSummary::default())
            .with_storage(before.storage(&model, 0), after.storage(&model, 0));
        assert!(report.summary.is_some());
        // 3 labels of 14 bits, 2 index bits in 2 bits each; entropy log2(3) * 3 * 3
        let expected_before = 46.0 + 3f64.log2() * 9.0;
        let b = report.uncompressed.storage.unwrap();
        assert!((b.total_bits - expected_before).abs() < 1e-9);
        assert_eq!(report.compressed.storage.unwrap().total_bits, 28.0);
        assert!(report.ratios.storage.is_some());
        let text = report.to_string();
        assert!(text.contains("Compressed storage: 28.00 bits (literal 0, coded 0.00, codebook 28)"));
        assert!(text.contains("Storage ratio: "));
    }

    #[test]
    fn json_report() {
        let value = serde_json::to_value(chain_report()).unwrap();
        assert_eq!(value["uncompressed"]["vertices"], 4);
        assert_eq!(value["compressed"]["edges"], 1);
        assert_eq!(value["ratios"]["vertices"], 0.5);
        assert_eq!(
            value["compressed"]["label_histogram"][0],
            serde_json::json!({"label": "abc", "count": 1})
        );
        assert_eq!(
            value["uncompressed"]["degree_histogram"][0],
            serde_json::json!({"in_degree": 1, "out_degree": 1, "count": 2})
        );
        assert!(value.get("summary").is_none());
        assert!(value["compressed"].get("storage").is_none());
    }

    #[test]
    fn single_automaton_text() {
        let summary = StatsSummary::new(&AutomatonStats::collect(&chain()));
        let text = summary.to_string();
        assert!(text.starts_with("States: 4\nEdges: 3\n"));
        assert!(text.contains("Degree histogram:\n1 in, 1 out: 2\n"));
    }

    #[test]
    fn dropped_terminals_are_flagged() {
        let report = chain_report().with_summary(CompressSummary {
            terminals_dropped: 2,
            ..CompressSummary::default()
        });
        assert!(report
            .to_string()
            .ends_with("Warning: 2 terminal vertices were folded into edges\n"));
    }
}
