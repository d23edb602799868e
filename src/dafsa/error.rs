use thiserror::Error;

use super::automaton::VertexId;

/// Reasons an explicit vertex/edge description does not form a valid automaton.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedAutomaton {
    /// The description has no vertices at all.
    #[error("automaton has no vertices")]
    Empty,
    /// An edge names a vertex outside `0..vertex_count`.
    #[error("edge {source_id} -> {target} references a vertex outside 0..{vertex_count}")]
    UnknownVertex {
        /// Source endpoint of the offending edge.
        source_id: VertexId,
        /// Target endpoint of the offending edge.
        target: VertexId,
        /// Number of vertices declared.
        vertex_count: usize,
    },
    /// An edge carries an empty label.
    #[error("edge {source_id} -> {target} has an empty label")]
    EmptyLabel {
        /// Source endpoint of the offending edge.
        source_id: VertexId,
        /// Target endpoint of the offending edge.
        target: VertexId,
    },
    /// An edge leads from a vertex back to itself.
    #[error("vertex {0} has a self-loop")]
    SelfLoop(VertexId),
    /// Every vertex has at least one incoming edge.
    #[error("no vertex has in-degree 0")]
    NoRoot,
    /// More than one vertex has in-degree 0.
    #[error("{} vertices have in-degree 0: {:?}", .0.len(), .0)]
    MultipleRoots(Vec<VertexId>),
    /// Vertex 0 is the designated root but something points at it.
    #[error("designated root 0 has {0} incoming edge(s)")]
    RootHasIncomingEdges(usize),
    /// Two outgoing edges of one vertex start with the same symbol.
    #[error("vertex {0} has two outgoing edges starting with the same symbol")]
    NondeterministicEdges(VertexId),
    /// A vertex cannot be reached from the root.
    #[error("vertex {0} is not reachable from the root")]
    Unreachable(VertexId),
}

/// Errors raised while compressing an automaton.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompressError {
    /// The traversal reached a vertex that is already on the current path.
    #[error("cycle detected: vertex {0} revisited on the current path")]
    CycleDetected(VertexId),
    /// The compressed vertex/edge list failed validation.
    #[error(transparent)]
    Malformed(#[from] MalformedAutomaton),
}

/// Errors that can occur when building an automaton from a word list.
#[derive(Debug, PartialEq, Error)]
pub enum BuildError<C: std::fmt::Debug> {
    /// Words were not provided in strictly increasing lexicographic order.
    ///
    /// Contains the two words that were out of order (previous word, current word).
    #[error("OrderError - {0:?} came before {1:?}")]
    Order(Vec<C>, Vec<C>),
    /// The assembled automaton failed validation.
    #[error(transparent)]
    Malformed(#[from] MalformedAutomaton),
}
