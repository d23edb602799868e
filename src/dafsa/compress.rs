use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::automaton::{Automaton, Edge, EdgeId, VertexId, ROOT};
use super::error::CompressError;
use super::label::{Label, LabelChar};

/// Knobs for [`Compressor`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressOptions {
    /// Keep terminal vertices even when they have one incoming and one
    /// outgoing edge.
    ///
    /// Off by default, which collapses such vertices like any other and loses
    /// the information that their prefix is itself a recognized string. Turn it
    /// on to keep the recognized language intact.
    pub preserve_terminals: bool,
}

/// Counts describing what a compression pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CompressSummary {
    /// Vertices folded into compressed edges.
    pub vertices_removed: usize,
    /// Net reduction in edge count.
    pub edges_removed: usize,
    /// Number of chains replaced by a single edge.
    pub chains_collapsed: usize,
    /// Length of the longest label in the output.
    pub longest_label: usize,
    /// Terminal vertices that were folded away and no longer mark a string end.
    pub terminals_dropped: usize,
}

/// In/out-degree pair captured before any collapsing decision is made.
#[derive(Clone, Copy)]
struct Degrees {
    incoming: u32,
    outgoing: u32,
}

/// Collapses chains of pass-through vertices into multi-symbol edges.
///
/// A pass-through vertex is a non-root vertex with exactly one incoming and one
/// outgoing edge. Every maximal chain of them between two other vertices is
/// replaced by a single edge whose label concatenates the chain's labels.
/// Branch points, merge points, leaves and the root always survive.
#[derive(Clone, Copy, Debug, Default)]
pub struct Compressor {
    options: CompressOptions,
}

/// Scratch state for one compression pass.
struct Pass<'a, C: LabelChar> {
    automaton: &'a Automaton<C>,
    options: CompressOptions,
    degrees: Vec<Degrees>,
    removed_vertices: FixedBitSet,
    removed_edges: FixedBitSet,
    /// First edge of a collapsed chain -> (chain end, concatenated label).
    replacements: HashMap<EdgeId, (VertexId, Label<C>)>,
}

impl Compressor {
    /// Creates a compressor with the given options.
    pub fn new(options: CompressOptions) -> Self {
        Compressor { options }
    }

    /// The options this compressor runs with.
    pub fn options(&self) -> CompressOptions {
        self.options
    }

    /// Returns a new automaton with every maximal chain collapsed.
    ///
    /// # Errors
    ///
    /// Returns [`CompressError::CycleDetected`] if the traversal finds a cycle.
    pub fn compress<C: LabelChar>(
        &self,
        automaton: &Automaton<C>,
    ) -> Result<Automaton<C>, CompressError> {
        self.compress_with_summary(automaton).map(|(compressed, _)| compressed)
    }

    /// Like [`compress`](Compressor::compress), also reporting what changed.
    ///
    /// # Errors
    ///
    /// Returns [`CompressError::CycleDetected`] if the traversal finds a cycle.
    pub fn compress_with_summary<C: LabelChar>(
        &self,
        automaton: &Automaton<C>,
    ) -> Result<(Automaton<C>, CompressSummary), CompressError> {
        let mut pass = Pass::new(automaton, self.options);
        pass.traverse()?;
        let (compressed, summary) = pass.assemble()?;
        debug!(
            vertices_before = automaton.vertex_count(),
            vertices_after = compressed.vertex_count(),
            edges_before = automaton.edge_count(),
            edges_after = compressed.edge_count(),
            chains = summary.chains_collapsed,
            longest_label = summary.longest_label,
            "compressed automaton"
        );
        if summary.terminals_dropped > 0 {
            warn!(
                count = summary.terminals_dropped,
                "terminal vertices were collapsed; their prefixes are no longer marked as recognized"
            );
        }
        Ok((compressed, summary))
    }
}

/// Collapses every maximal chain of pass-through vertices with default options.
///
/// # Errors
///
/// Returns [`CompressError::CycleDetected`] if the traversal finds a cycle.
///
/// # Examples
///
/// ```
/// use libdafsa::dafsa::{compress, Automaton};
///
/// let automaton = Automaton::<char>::from_edges(4, [(0, 1, "a"), (1, 2, "b"), (2, 3, "c")]).unwrap();
/// let compressed = compress(&automaton).unwrap();
/// assert_eq!(compressed.vertex_count(), 2);
/// assert_eq!(compressed.edges()[0].label.to_string(), "abc");
/// ```
pub fn compress<C: LabelChar>(automaton: &Automaton<C>) -> Result<Automaton<C>, CompressError> {
    Compressor::default().compress(automaton)
}

impl<'a, C: LabelChar> Pass<'a, C> {
    fn new(automaton: &'a Automaton<C>, options: CompressOptions) -> Self {
        let degrees = automaton
            .vertices()
            .map(|v| Degrees {
                incoming: automaton.in_degree(v) as u32,
                outgoing: automaton.out_degree(v) as u32,
            })
            .collect();
        Pass {
            automaton,
            options,
            degrees,
            removed_vertices: FixedBitSet::with_capacity(automaton.vertex_count()),
            removed_edges: FixedBitSet::with_capacity(automaton.edge_count()),
            replacements: HashMap::new(),
        }
    }

    fn is_pass_through(&self, vertex: VertexId) -> bool {
        let Degrees { incoming, outgoing } = self.degrees[vertex as usize];
        vertex != ROOT
            && incoming == 1
            && outgoing == 1
            && !(self.options.preserve_terminals && self.automaton.is_terminal(vertex))
    }

    /// Depth-first walk from the root that visits every vertex once.
    fn traverse(&mut self) -> Result<(), CompressError> {
        let automaton = self.automaton;
        let n = automaton.vertex_count();
        let mut discovered = FixedBitSet::with_capacity(n);
        let mut on_path = FixedBitSet::with_capacity(n);
        let mut stack: Vec<(VertexId, usize)> = vec![(ROOT, 0)];
        discovered.insert(ROOT as usize);
        on_path.insert(ROOT as usize);
        self.discover(ROOT)?;

        while let Some((vertex, next)) = stack.last_mut() {
            let vertex = *vertex;
            match automaton.out_edge_ids(vertex).get(*next) {
                Some(&id) => {
                    *next += 1;
                    let target = automaton.edge(id).target;
                    if on_path.contains(target as usize) {
                        return Err(CompressError::CycleDetected(target));
                    }
                    if !discovered.put(target as usize) {
                        on_path.insert(target as usize);
                        self.discover(target)?;
                        stack.push((target, 0));
                    }
                }
                None => {
                    on_path.set(vertex as usize, false);
                    stack.pop();
                }
            }
        }
        Ok(())
    }

    fn discover(&mut self, vertex: VertexId) -> Result<(), CompressError> {
        if self.is_pass_through(vertex) {
            return Ok(());
        }
        let automaton = self.automaton;
        for &id in automaton.out_edge_ids(vertex) {
            self.follow_chain(id)?;
        }
        Ok(())
    }

    /// Walks forward from edge `first` through pass-through vertices,
    /// marking what gets folded into the chain's new edge.
    fn follow_chain(&mut self, first: EdgeId) -> Result<(), CompressError> {
        let automaton = self.automaton;
        let edge = automaton.edge(first);
        let mut label = edge.label.clone();
        let mut target = edge.target;
        let mut steps = 0;
        while self.is_pass_through(target) {
            steps += 1;
            // A chain longer than the edge list can only be going round a cycle.
            if steps > automaton.edge_count() {
                return Err(CompressError::CycleDetected(target));
            }
            self.removed_vertices.insert(target as usize);
            let next = automaton.out_edge_ids(target)[0];
            self.removed_edges.insert(next as usize);
            label.extend_from(&automaton.edge(next).label);
            target = automaton.edge(next).target;
        }
        if steps > 0 {
            trace!(source = edge.source, target, steps, "collapsing chain");
            self.replacements.insert(first, (target, label));
        }
        Ok(())
    }

    /// Lays out the surviving vertices densely, in ascending input order, and
    /// emits their edges grouped by source with each chain's new edge in place
    /// of its first edge.
    fn assemble(self) -> Result<(Automaton<C>, CompressSummary), CompressError> {
        let automaton = self.automaton;
        let mut renumber: Vec<Option<VertexId>> = vec![None; automaton.vertex_count()];
        let mut origin = Vec::with_capacity(automaton.vertex_count());
        for vertex in automaton.vertices() {
            if !self.removed_vertices.contains(vertex as usize) {
                renumber[vertex as usize] = Some(origin.len() as VertexId);
                origin.push(automaton.origin(vertex));
            }
        }
        let kept = origin.len();
        let new_id = |vertex: VertexId| renumber[vertex as usize].unwrap_or(VertexId::MAX);

        let mut edges = Vec::with_capacity(automaton.edge_count());
        for vertex in automaton.vertices() {
            if renumber[vertex as usize].is_none() {
                continue;
            }
            for &id in automaton.out_edge_ids(vertex) {
                if self.removed_edges.contains(id as usize) {
                    continue;
                }
                let edge = match self.replacements.get(&id) {
                    Some((target, label)) => Edge {
                        source: new_id(vertex),
                        target: new_id(*target),
                        label: label.clone(),
                    },
                    None => {
                        let original = automaton.edge(id);
                        Edge {
                            source: new_id(vertex),
                            target: new_id(original.target),
                            label: original.label.clone(),
                        }
                    }
                };
                edges.push(edge);
            }
        }

        let mut terminals = FixedBitSet::with_capacity(kept);
        let mut terminals_dropped = 0;
        for vertex in automaton.terminals() {
            match renumber[vertex as usize] {
                Some(id) => terminals.insert(id as usize),
                None => terminals_dropped += 1,
            }
        }

        let summary = CompressSummary {
            vertices_removed: automaton.vertex_count() - kept,
            edges_removed: automaton.edge_count() - edges.len(),
            chains_collapsed: self.replacements.len(),
            longest_label: edges.iter().map(|e| e.label.len()).max().unwrap_or(0),
            terminals_dropped,
        };
        let compressed = Automaton::from_parts(kept, edges, terminals, Some(origin))?;
        Ok((compressed, summary))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dafsa::builder::{build_dafsa, build_trie, AutomatonBuilder};

    fn triples(automaton: &Automaton<char>) -> Vec<(VertexId, VertexId, String)> {
        automaton
            .to_triples()
            .into_iter()
            .map(|(s, t, l)| (s, t, l.to_string()))
            .collect()
    }

    fn origins(automaton: &Automaton<char>) -> Vec<VertexId> {
        automaton.vertices().map(|v| automaton.origin(v)).collect()
    }

    #[test]
    fn straight_chain_collapses_to_one_edge() {
        let automaton =
            Automaton::<char>::from_edges(4, [(0, 1, "a"), (1, 2, "b"), (2, 3, "c")]).unwrap();
        let compressed = compress(&automaton).unwrap();
        assert_eq!(triples(&compressed), vec![(0, 1, "abc".to_string())]);
        assert_eq!(origins(&compressed), vec![0, 3]);
        // the input is untouched
        assert_eq!(automaton.edge_count(), 3);
    }

    #[test]
    fn automaton_without_pass_through_vertices_is_unchanged() {
        let automaton = Automaton::<char>::from_edges(
            4,
            [(0, 1, "a"), (0, 2, "b"), (1, 2, "c"), (1, 3, "d")],
        )
        .unwrap();
        let compressed = compress(&automaton).unwrap();
        assert_eq!(compressed, automaton);
    }

    #[test]
    fn diamond_arms_collapse_into_the_merge_point() {
        // 1 and 2 each have one incoming and one outgoing edge
        let automaton = Automaton::<char>::from_edges(
            4,
            [(0, 1, "a"), (0, 2, "b"), (1, 3, "x"), (2, 3, "y")],
        )
        .unwrap();
        let compressed = compress(&automaton).unwrap();
        assert_eq!(origins(&compressed), vec![0, 3]);
        assert_eq!(
            triples(&compressed),
            vec![(0, 1, "ax".to_string()), (0, 1, "by".to_string())]
        );
        assert_eq!(compressed.in_degree(1), 2);
    }

    #[test]
    fn branch_point_survives_and_both_arms_compress() {
        // 0 -a-> 1, 1 -b-> 2 -c-> 3, 1 -d-> 4 -e-> 5 -f-> 6
        let automaton = Automaton::<char>::from_edges(
            7,
            [
                (0, 1, "a"),
                (1, 2, "b"),
                (2, 3, "c"),
                (1, 4, "d"),
                (4, 5, "e"),
                (5, 6, "f"),
            ],
        )
        .unwrap();
        let compressed = compress(&automaton).unwrap();
        assert_eq!(origins(&compressed), vec![0, 1, 3, 6]);
        assert_eq!(
            triples(&compressed),
            vec![
                (0, 1, "a".to_string()),
                (1, 2, "bc".to_string()),
                (1, 3, "def".to_string()),
            ]
        );
    }

    #[test]
    fn merge_point_is_kept_and_chain_after_it_collapses() {
        let automaton = Automaton::<char>::from_edges(
            6,
            [
                (0, 1, "a"),
                (0, 2, "b"),
                (1, 3, "c"),
                (2, 3, "d"),
                (3, 4, "e"),
                (4, 5, "f"),
            ],
        )
        .unwrap();
        let (compressed, summary) = Compressor::default()
            .compress_with_summary(&automaton)
            .unwrap();
        assert_eq!(origins(&compressed), vec![0, 3, 5]);
        assert_eq!(
            triples(&compressed),
            vec![
                (0, 1, "ac".to_string()),
                (0, 1, "bd".to_string()),
                (1, 2, "ef".to_string()),
            ]
        );
        assert_eq!(summary.vertices_removed, 3);
        assert_eq!(summary.edges_removed, 3);
        assert_eq!(summary.chains_collapsed, 3);
        assert_eq!(summary.longest_label, 2);
    }

    #[test]
    fn root_with_single_edge_is_kept() {
        let automaton = Automaton::<char>::from_edges(2, [(0, 1, "a")]).unwrap();
        let compressed = compress(&automaton).unwrap();
        assert_eq!(compressed, automaton);
        assert_eq!(compressed.root(), 0);
    }

    #[test]
    fn single_vertex_automaton() {
        let automaton = Automaton::<char>::from_edges(1, Vec::<(u32, u32, &str)>::new()).unwrap();
        assert_eq!(compress(&automaton).unwrap(), automaton);
    }

    #[test]
    fn compression_is_idempotent() {
        let names = ["example.com", "example.net", "examples.org", "test.com", "tests.com"];
        for automaton in [build_trie(names).unwrap(), build_dafsa(names).unwrap()] {
            let once = compress(&automaton).unwrap();
            let twice = compress(&once).unwrap();
            assert_eq!(once, twice);
            assert!(once.vertex_count() <= automaton.vertex_count());
            assert!(once.edge_count() <= automaton.edge_count());
        }
    }

    #[test]
    fn no_pass_through_vertex_survives() {
        let automaton = build_trie(["alpha.com", "alpine.org", "beta.net"]).unwrap();
        let compressed = compress(&automaton).unwrap();
        for v in compressed.vertices().skip(1) {
            assert!(!(compressed.in_degree(v) == 1 && compressed.out_degree(v) == 1));
        }
    }

    #[test]
    fn cycle_is_detected() {
        // 1 -> 2 -> 1 is reachable from the root through 0 -> 1
        let automaton =
            Automaton::<char>::from_edges(3, [(0, 1, "a"), (1, 2, "b"), (2, 1, "c")]).unwrap();
        assert_eq!(compress(&automaton), Err(CompressError::CycleDetected(1)));
    }

    #[test]
    fn default_mode_drops_inner_terminals() {
        let automaton = build_trie(["ab", "abcd"]).unwrap();
        let (compressed, summary) = Compressor::default()
            .compress_with_summary(&automaton)
            .unwrap();
        assert_eq!(compressed.edge_count(), 1);
        assert_eq!(summary.terminals_dropped, 1);
        assert!(compressed.accepts("abcd"));
        assert!(!compressed.accepts("ab"));
    }

    #[test]
    fn preserving_terminals_keeps_the_language() {
        let names = ["ab", "abcd", "abcdef", "xyz"];
        let automaton = build_trie(names).unwrap();
        let compressor = Compressor::new(CompressOptions {
            preserve_terminals: true,
        });
        let compressed = compressor.compress(&automaton).unwrap();
        assert_eq!(compressed.language(), automaton.language());
        assert_eq!(
            triples(&compressed),
            vec![
                (0, 1, "ab".to_string()),
                (0, 4, "xyz".to_string()),
                (1, 2, "cd".to_string()),
                (2, 3, "ef".to_string()),
            ]
        );
        for name in names {
            assert!(compressed.accepts(name));
        }
    }

    #[test]
    fn terminal_on_builder_vertices() {
        let mut builder = AutomatonBuilder::<char>::with_vertices(3);
        builder.add_edge(0, 1, 'a');
        builder.add_edge(1, 2, 'b');
        builder.set_terminal(1);
        builder.set_terminal(2);
        let automaton = builder.build().unwrap();
        let compressed = Compressor::new(CompressOptions {
            preserve_terminals: true,
        })
        .compress(&automaton)
        .unwrap();
        assert_eq!(compressed, automaton);
    }
}
