//! The automaton model and the transformations over it.

/// Vertex/edge storage, degree queries and lookups.
pub mod automaton;
/// Explicit-edge builder and single-pass trie / minimal-automaton builders.
pub mod builder;
/// Collapsing chains of pass-through vertices into multi-symbol edges.
pub mod compress;
/// Construction, build and compression errors.
pub mod error;
/// Edge-label symbols and label values.
pub mod label;

pub use automaton::{Automaton, Edge, EdgeId, OutEdges, VertexId, ROOT};
pub use builder::{build_dafsa, build_trie, AutomatonBuilder, DafsaBuilder};
pub use compress::{compress, CompressOptions, CompressSummary, Compressor};
pub use error::{BuildError, CompressError, MalformedAutomaton};
pub use label::{IntoLabel, Label, LabelChar};
