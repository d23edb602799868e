use fixedbitset::FixedBitSet;
use smallvec::SmallVec;

use super::error::MalformedAutomaton;
use super::label::{IntoLabel, Label, LabelChar};

/// Index of a vertex in an [`Automaton`]'s arena.
pub type VertexId = u32;

/// Index of an edge in an [`Automaton`]'s edge list.
pub type EdgeId = u32;

/// The designated root of every automaton.
pub const ROOT: VertexId = 0;

/// A directed, labeled edge.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Edge<C: LabelChar> {
    /// Vertex the edge leaves.
    pub source: VertexId,
    /// Vertex the edge enters.
    pub target: VertexId,
    /// Non-empty symbol sequence read along the edge.
    pub label: Label<C>,
}

/// An acyclic, single-rooted, edge-labeled automaton.
///
/// Vertices are dense indices into per-vertex attribute arrays; degrees are
/// derived from the edge lists at construction time and never stored on the
/// vertices themselves. Vertex [`ROOT`] (0) is always the entry point.
///
/// Instances are immutable once built. Transformations such as
/// [`compress`](super::compress::compress) produce a fresh automaton and leave
/// the input untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Automaton<C: LabelChar> {
    edges: Vec<Edge<C>>,
    out_edges: Vec<SmallVec<[EdgeId; 2]>>,
    in_degrees: Vec<u32>,
    terminals: FixedBitSet,
    origin: Vec<VertexId>,
}

impl<C: LabelChar> Automaton<C> {
    /// Builds an automaton from an explicit vertex count and `(source, target, label)`
    /// triples, with vertex 0 as the root and no terminal vertices.
    ///
    /// # Errors
    ///
    /// Returns a [`MalformedAutomaton`] if the description has no vertices, an
    /// edge is out of range, empty or a self-loop, the root is not the unique
    /// in-degree-0 vertex, two outgoing labels of a vertex share their first
    /// symbol, or some vertex cannot be reached from the root.
    ///
    /// # Examples
    ///
    /// ```
    /// use libdafsa::dafsa::Automaton;
    ///
    /// let automaton = Automaton::<char>::from_edges(3, [(0, 1, "a"), (1, 2, "b")]).unwrap();
    /// assert_eq!(automaton.edge_count(), 2);
    /// assert_eq!(automaton.out_degree(1), 1);
    /// ```
    pub fn from_edges<L: IntoLabel<C>>(
        vertex_count: usize,
        edges: impl IntoIterator<Item = (VertexId, VertexId, L)>,
    ) -> Result<Self, MalformedAutomaton> {
        let edges = edges
            .into_iter()
            .map(|(source, target, label)| Edge {
                source,
                target,
                label: label.collect_label(),
            })
            .collect();
        Self::from_parts(vertex_count, edges, FixedBitSet::with_capacity(vertex_count), None)
    }

    /// Validates and assembles an automaton from owned parts.
    ///
    /// `origin` maps each vertex to the id it had in some earlier automaton;
    /// `None` means the identity mapping.
    pub(crate) fn from_parts(
        vertex_count: usize,
        edges: Vec<Edge<C>>,
        mut terminals: FixedBitSet,
        origin: Option<Vec<VertexId>>,
    ) -> Result<Self, MalformedAutomaton> {
        if vertex_count == 0 {
            return Err(MalformedAutomaton::Empty);
        }

        let mut out_edges: Vec<SmallVec<[EdgeId; 2]>> = vec![SmallVec::new(); vertex_count];
        let mut in_degrees = vec![0u32; vertex_count];
        for (id, edge) in edges.iter().enumerate() {
            let (source, target) = (edge.source, edge.target);
            if source as usize >= vertex_count || target as usize >= vertex_count {
                return Err(MalformedAutomaton::UnknownVertex {
                    source_id: source,
                    target,
                    vertex_count,
                });
            }
            if edge.label.is_empty() {
                return Err(MalformedAutomaton::EmptyLabel {
                    source_id: source,
                    target,
                });
            }
            if source == target {
                return Err(MalformedAutomaton::SelfLoop(source));
            }
            out_edges[source as usize].push(id as EdgeId);
            in_degrees[target as usize] += 1;
        }

        let roots: Vec<VertexId> = (0..vertex_count as VertexId)
            .filter(|&v| in_degrees[v as usize] == 0)
            .collect();
        match roots.len() {
            0 => return Err(MalformedAutomaton::NoRoot),
            1 if roots[0] != ROOT => {
                return Err(MalformedAutomaton::RootHasIncomingEdges(
                    in_degrees[ROOT as usize] as usize,
                ))
            }
            1 => {}
            _ => return Err(MalformedAutomaton::MultipleRoots(roots)),
        }

        for (vertex, ids) in out_edges.iter().enumerate() {
            let mut firsts: SmallVec<[C; 8]> = ids
                .iter()
                .filter_map(|&id| edges[id as usize].label.first())
                .collect();
            firsts.sort_unstable();
            if firsts.windows(2).any(|pair| pair[0] == pair[1]) {
                return Err(MalformedAutomaton::NondeterministicEdges(vertex as VertexId));
            }
        }

        let mut reached = FixedBitSet::with_capacity(vertex_count);
        let mut stack = vec![ROOT];
        reached.insert(ROOT as usize);
        while let Some(vertex) = stack.pop() {
            for &id in &out_edges[vertex as usize] {
                let target = edges[id as usize].target;
                if !reached.put(target as usize) {
                    stack.push(target);
                }
            }
        }
        if let Some(unreached) = (0..vertex_count).find(|&v| !reached.contains(v)) {
            return Err(MalformedAutomaton::Unreachable(unreached as VertexId));
        }

        terminals.grow(vertex_count);
        let origin = origin.unwrap_or_else(|| (0..vertex_count as VertexId).collect());
        debug_assert_eq!(origin.len(), vertex_count);

        Ok(Automaton {
            edges,
            out_edges,
            in_degrees,
            terminals,
            origin,
        })
    }

    /// Returns the root vertex. Always [`ROOT`].
    #[inline]
    pub fn root(&self) -> VertexId {
        ROOT
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.out_edges.len()
    }

    /// Number of edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterates over all vertex ids in ascending order.
    pub fn vertices(&self) -> impl ExactSizeIterator<Item = VertexId> {
        0..self.vertex_count() as VertexId
    }

    /// All edges in storage order.
    #[inline]
    pub fn edges(&self) -> &[Edge<C>] {
        &self.edges
    }

    /// The edge with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge<C> {
        &self.edges[id as usize]
    }

    /// Number of edges entering `vertex`.
    ///
    /// # Panics
    ///
    /// Panics if `vertex` is out of range.
    #[inline]
    pub fn in_degree(&self, vertex: VertexId) -> usize {
        self.in_degrees[vertex as usize] as usize
    }

    /// Number of edges leaving `vertex`.
    ///
    /// # Panics
    ///
    /// Panics if `vertex` is out of range.
    #[inline]
    pub fn out_degree(&self, vertex: VertexId) -> usize {
        self.out_edges[vertex as usize].len()
    }

    /// Ids of the edges leaving `vertex`, in insertion order.
    #[inline]
    pub fn out_edge_ids(&self, vertex: VertexId) -> &[EdgeId] {
        &self.out_edges[vertex as usize]
    }

    /// Returns an iterator over the edges leaving `vertex`, in insertion order.
    #[inline]
    pub fn out_edges(&self, vertex: VertexId) -> OutEdges<'_, C> {
        OutEdges {
            automaton: self,
            ids: self.out_edges[vertex as usize].iter(),
        }
    }

    /// Returns the outgoing edge of `vertex` whose label starts with `symbol`.
    pub fn get(&self, vertex: VertexId, symbol: C) -> Option<&Edge<C>> {
        self.out_edges(vertex)
            .find(|edge| edge.label.first() == Some(symbol))
    }

    /// True if `vertex` marks the end of a recognized string.
    #[inline]
    pub fn is_terminal(&self, vertex: VertexId) -> bool {
        self.terminals.contains(vertex as usize)
    }

    /// Iterates over the terminal vertices in ascending order.
    pub fn terminals(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.terminals.ones().map(|v| v as VertexId)
    }

    /// The id `vertex` had in the automaton this one was derived from.
    ///
    /// Freshly built automata map every vertex to itself.
    #[inline]
    pub fn origin(&self, vertex: VertexId) -> VertexId {
        self.origin[vertex as usize]
    }

    /// True if `word` spells a root-to-terminal path.
    ///
    /// Multi-symbol labels must be matched completely; a word that ends in the
    /// middle of a compressed edge is not accepted.
    pub fn accepts(&self, word: impl IntoLabel<C>) -> bool {
        let word = word.collect_label();
        let mut rest: &[C] = &word;
        let mut vertex = ROOT;
        while let Some(&symbol) = rest.first() {
            let Some(edge) = self.get(vertex, symbol) else {
                return false;
            };
            match rest.strip_prefix(edge.label.symbols()) {
                Some(tail) => rest = tail,
                None => return false,
            }
            vertex = edge.target;
        }
        self.is_terminal(vertex)
    }

    /// Enumerates the strings recognized at terminal vertices, in depth-first
    /// order over the out-edge lists.
    ///
    /// Paths longer than the edge count can only run around a cycle and are
    /// not followed, so the walk terminates on any input.
    pub fn language(&self) -> Vec<Vec<C>> {
        let mut words = Vec::new();
        let mut prefix: Vec<C> = Vec::new();
        // (vertex, prefix length before the entering edge, entering edge, path depth)
        let mut stack: Vec<(VertexId, usize, Option<EdgeId>, usize)> = vec![(ROOT, 0, None, 0)];
        while let Some((vertex, parent_len, entered_by, depth)) = stack.pop() {
            prefix.truncate(parent_len);
            if let Some(id) = entered_by {
                prefix.extend_from_slice(self.edge(id).label.symbols());
            }
            if self.is_terminal(vertex) {
                words.push(prefix.clone());
            }
            if depth >= self.edge_count() {
                continue;
            }
            for &id in self.out_edge_ids(vertex).iter().rev() {
                stack.push((self.edge(id).target, prefix.len(), Some(id), depth + 1));
            }
        }
        words
    }

    /// The edges as owned `(source, target, label)` triples in storage order.
    pub fn to_triples(&self) -> Vec<(VertexId, VertexId, Label<C>)> {
        self.edges
            .iter()
            .map(|edge| (edge.source, edge.target, edge.label.clone()))
            .collect()
    }
}

/// An iterator over the outgoing edges of a vertex.
#[derive(Clone)]
pub struct OutEdges<'a, C: LabelChar> {
    automaton: &'a Automaton<C>,
    ids: std::slice::Iter<'a, EdgeId>,
}

impl<'a, C: LabelChar> Iterator for OutEdges<'a, C> {
    type Item = &'a Edge<C>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.ids.next().map(|&id| self.automaton.edge(id))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl<C: LabelChar> DoubleEndedIterator for OutEdges<'_, C> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.ids.next_back().map(|&id| self.automaton.edge(id))
    }
}

impl<C: LabelChar> ExactSizeIterator for OutEdges<'_, C> {}

#[cfg(test)]
mod test {
    use super::*;

    fn chain() -> Automaton<char> {
        Automaton::from_edges(4, [(0, 1, "a"), (1, 2, "b"), (2, 3, "c")]).unwrap()
    }

    #[test]
    fn degrees_come_from_edges() {
        let automaton = chain();
        assert_eq!(automaton.root(), 0);
        assert_eq!(automaton.vertex_count(), 4);
        assert_eq!(automaton.edge_count(), 3);
        assert_eq!(automaton.in_degree(0), 0);
        assert_eq!(automaton.out_degree(0), 1);
        assert_eq!(automaton.in_degree(3), 1);
        assert_eq!(automaton.out_degree(3), 0);
        assert_eq!(automaton.vertices().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn out_edges_keep_insertion_order() {
        let automaton =
            Automaton::<char>::from_edges(4, [(0, 3, "z"), (0, 1, "a"), (0, 2, "m")]).unwrap();
        let labels: Vec<String> = automaton.out_edges(0).map(|e| e.label.to_string()).collect();
        assert_eq!(labels, ["z", "a", "m"]);
        assert_eq!(automaton.out_edges(0).len(), 3);
        assert_eq!(automaton.get(0, 'm').map(|e| e.target), Some(2));
        assert_eq!(automaton.get(0, 'q'), None);
    }

    #[test]
    fn empty_automaton_is_rejected() {
        let res = Automaton::<char>::from_edges(0, Vec::<(VertexId, VertexId, &str)>::new());
        assert_eq!(res.unwrap_err(), MalformedAutomaton::Empty);
    }

    #[test]
    fn out_of_range_edge_is_rejected() {
        let res = Automaton::<char>::from_edges(2, [(0, 2, "a")]);
        assert!(matches!(res, Err(MalformedAutomaton::UnknownVertex { target: 2, .. })));
    }

    #[test]
    fn two_roots_are_rejected() {
        let res = Automaton::<char>::from_edges(3, [(0, 2, "a"), (1, 2, "b")]);
        assert_eq!(res.unwrap_err(), MalformedAutomaton::MultipleRoots(vec![0, 1]));
    }

    #[test]
    fn root_must_be_vertex_zero() {
        let res = Automaton::<char>::from_edges(2, [(1, 0, "a")]);
        assert_eq!(res.unwrap_err(), MalformedAutomaton::RootHasIncomingEdges(1));
    }

    #[test]
    fn all_vertices_with_incoming_edges_is_rejected() {
        let res = Automaton::<char>::from_edges(2, [(0, 1, "a"), (1, 0, "b")]);
        assert_eq!(res.unwrap_err(), MalformedAutomaton::NoRoot);
    }

    #[test]
    fn shared_first_symbol_is_rejected() {
        let res = Automaton::<char>::from_edges(3, [(0, 1, "ab"), (0, 2, "ac")]);
        assert_eq!(res.unwrap_err(), MalformedAutomaton::NondeterministicEdges(0));
    }

    #[test]
    fn empty_label_and_self_loop_are_rejected() {
        let res = Automaton::<char>::from_edges(2, [(0, 1, "")]);
        assert!(matches!(res, Err(MalformedAutomaton::EmptyLabel { .. })));
        let res = Automaton::<char>::from_edges(2, [(0, 1, "a"), (1, 1, "b")]);
        assert_eq!(res.unwrap_err(), MalformedAutomaton::SelfLoop(1));
    }

    #[test]
    fn unreachable_cycle_is_rejected() {
        let res = Automaton::<char>::from_edges(3, [(1, 2, "a"), (2, 1, "b")]);
        assert_eq!(res.unwrap_err(), MalformedAutomaton::Unreachable(1));
    }

    #[test]
    fn accepts_needs_whole_labels_and_terminal() {
        let mut terminals = FixedBitSet::with_capacity(3);
        terminals.insert(2);
        let edges = vec![
            Edge { source: 0, target: 1, label: Label::from_iter("ex".chars()) },
            Edge { source: 1, target: 2, label: Label::from_iter("ample".chars()) },
        ];
        let automaton = Automaton::from_parts(3, edges, terminals, None).unwrap();
        assert!(automaton.accepts("example"));
        assert!(!automaton.accepts("exam"));
        assert!(!automaton.accepts("ex"));
        assert!(!automaton.accepts("examples"));
        assert_eq!(automaton.language(), vec!["example".chars().collect::<Vec<_>>()]);
    }

    #[test]
    fn language_of_cyclic_graph_terminates() {
        let mut terminals = FixedBitSet::with_capacity(3);
        terminals.insert(2);
        let edges = vec![
            Edge { source: 0, target: 1, label: Label::single('a') },
            Edge { source: 1, target: 2, label: Label::single('b') },
            Edge { source: 2, target: 1, label: Label::single('c') },
        ];
        let automaton = Automaton::from_parts(3, edges, terminals, None).unwrap();
        assert!(!automaton.language().is_empty());
    }
}
