use hashbrown::HashMap;
use mark_last::MarkLastIterator;
use smallvec::SmallVec;
use tracing::debug;

use fixedbitset::FixedBitSet;

use super::automaton::{Automaton, Edge, VertexId};
use super::error::{BuildError, MalformedAutomaton};
use super::label::{IntoLabel, Label, LabelChar};

/// Incremental builder for an [`Automaton`] given as explicit vertices and edges.
///
/// Vertex 0 is the root. Validation happens once, in [`build`](AutomatonBuilder::build).
///
/// # Examples
///
/// ```
/// use libdafsa::dafsa::AutomatonBuilder;
///
/// let mut builder = AutomatonBuilder::<char>::new();
/// let root = builder.add_vertex();
/// let leaf = builder.add_vertex();
/// builder.add_edge(root, leaf, "com");
/// builder.set_terminal(leaf);
/// let automaton = builder.build().unwrap();
/// assert!(automaton.accepts("com"));
/// ```
#[derive(Clone, Debug)]
pub struct AutomatonBuilder<C: LabelChar> {
    vertex_count: usize,
    edges: Vec<Edge<C>>,
    terminals: Vec<VertexId>,
}

impl<C: LabelChar> Default for AutomatonBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: LabelChar> AutomatonBuilder<C> {
    /// Creates a builder with no vertices.
    pub fn new() -> Self {
        AutomatonBuilder {
            vertex_count: 0,
            edges: Vec::new(),
            terminals: Vec::new(),
        }
    }

    /// Creates a builder with vertices `0..vertex_count` already declared.
    pub fn with_vertices(vertex_count: usize) -> Self {
        AutomatonBuilder {
            vertex_count,
            ..Self::new()
        }
    }

    /// Declares a new vertex and returns its id.
    pub fn add_vertex(&mut self) -> VertexId {
        let id = self.vertex_count as VertexId;
        self.vertex_count += 1;
        id
    }

    /// Adds an edge. Endpoints are checked when the automaton is built.
    pub fn add_edge(&mut self, source: VertexId, target: VertexId, label: impl IntoLabel<C>) {
        self.edges.push(Edge {
            source,
            target,
            label: label.collect_label(),
        });
    }

    /// Marks `vertex` as the end of a recognized string.
    pub fn set_terminal(&mut self, vertex: VertexId) {
        self.terminals.push(vertex);
    }

    /// Validates the collected vertices and edges and returns the automaton.
    ///
    /// # Errors
    ///
    /// Returns a [`MalformedAutomaton`] under the same conditions as
    /// [`Automaton::from_edges`]; a terminal mark on a vertex that was never
    /// declared is reported as [`MalformedAutomaton::UnknownVertex`].
    pub fn build(self) -> Result<Automaton<C>, MalformedAutomaton> {
        let mut terminals = FixedBitSet::with_capacity(self.vertex_count);
        for vertex in self.terminals {
            if vertex as usize >= self.vertex_count {
                return Err(MalformedAutomaton::UnknownVertex {
                    source_id: vertex,
                    target: vertex,
                    vertex_count: self.vertex_count,
                });
            }
            terminals.insert(vertex as usize);
        }
        Automaton::from_parts(self.vertex_count, self.edges, terminals, None)
    }
}

/// A state whose children are all final. Equality and hashing only look one
/// level down, since children are referenced by their canonical index.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct State<C: LabelChar> {
    terminal: bool,
    children: SmallVec<[(C, u32); 2]>,
}

impl<C: LabelChar> Default for State<C> {
    fn default() -> Self {
        State {
            terminal: false,
            children: SmallVec::new(),
        }
    }
}

struct BuildState<C: LabelChar> {
    // None only for the root entry.
    symbol: Option<C>,
    state: State<C>,
}

/// Builds tries and minimal acyclic automata from sorted word lists in a single pass.
///
/// Words must be added in strictly increasing lexicographic order. Each time a
/// word diverges from its predecessor, the predecessor's now-final suffix is
/// frozen bottom-up; with suffix sharing enabled, frozen states that are
/// equivalent to an already registered state are replaced by it, which yields
/// the minimal automaton (Daciuk et al., 2000).
pub struct DafsaBuilder<C: LabelChar> {
    build_state: Vec<BuildState<C>>,
    states: Vec<State<C>>,
    register: Option<HashMap<State<C>, u32>>,
    words: usize,
}

impl<C: LabelChar> Default for DafsaBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: LabelChar> DafsaBuilder<C> {
    /// Creates a builder for a minimal automaton with shared suffixes.
    pub fn new() -> Self {
        Self::with_register(Some(HashMap::new()))
    }

    /// Creates a builder for a plain prefix trie (no suffix sharing).
    pub fn trie() -> Self {
        Self::with_register(None)
    }

    fn with_register(register: Option<HashMap<State<C>, u32>>) -> Self {
        DafsaBuilder {
            build_state: vec![BuildState {
                symbol: None,
                state: State::default(),
            }],
            states: Vec::new(),
            register,
            words: 0,
        }
    }

    /// Adds a word. Empty words are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Order`] if the word is not strictly greater than
    /// the previously added word.
    pub fn add_word(&mut self, word: impl IntoLabel<C>) -> Result<(), BuildError<C>> {
        let word = word.collect_label();
        if word.is_empty() {
            return Ok(());
        }
        let prefix_length = self.prefix_length(&word)?;
        self.freeze_suffix(prefix_length);
        self.build_state.extend(
            word[prefix_length..]
                .iter()
                .copied()
                .mark_last()
                .map(|(last, symbol)| BuildState {
                    symbol: Some(symbol),
                    state: State {
                        terminal: last,
                        children: SmallVec::new(),
                    },
                }),
        );
        self.words += 1;
        Ok(())
    }

    fn prefix_length(&self, word: &[C]) -> Result<usize, BuildError<C>> {
        let mut prefix_len = 0;
        for (i, &symbol) in word.iter().enumerate() {
            let is_last = i == word.len() - 1;
            let Some(previous) = self.build_state.get(prefix_len + 1).and_then(|s| s.symbol) else {
                break;
            };
            if symbol > previous {
                break;
            }
            if symbol < previous || is_last {
                return Err(BuildError::Order(self.previous_word(), word.to_vec()));
            }
            prefix_len += 1;
        }
        Ok(prefix_len)
    }

    fn previous_word(&self) -> Vec<C> {
        self.build_state[1..].iter().filter_map(|s| s.symbol).collect()
    }

    /// Freezes build states until only the root and `target_length` symbols remain.
    fn freeze_suffix(&mut self, target_length: usize) {
        while self.build_state.len() > target_length + 1 {
            let Some(entry) = self.build_state.pop() else {
                break;
            };
            let child = self.canonicalize(entry.state);
            if let (Some(symbol), Some(parent)) = (entry.symbol, self.build_state.last_mut()) {
                parent.state.children.push((symbol, child));
            }
        }
    }

    fn canonicalize(&mut self, state: State<C>) -> u32 {
        if let Some(register) = &self.register {
            if let Some(&existing) = register.get(&state) {
                return existing;
            }
        }
        let id = self.states.len() as u32;
        if let Some(register) = &mut self.register {
            register.insert(state.clone(), id);
        }
        self.states.push(state);
        id
    }

    /// Finalizes construction and lays the states out as an [`Automaton`].
    ///
    /// Vertices are numbered in depth-first preorder from the root, and each
    /// vertex's edges appear in ascending symbol order.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Malformed`] if the assembled graph fails validation,
    /// which indicates a builder bug rather than bad input.
    pub fn build(mut self) -> Result<Automaton<C>, BuildError<C>> {
        self.freeze_suffix(0);
        let root_state = self
            .build_state
            .pop()
            .map(|entry| entry.state)
            .unwrap_or_default();
        // The root is never shared, so it bypasses the register.
        let root = self.states.len() as u32;
        self.states.push(root_state);

        let mut numbering: Vec<Option<VertexId>> = vec![None; self.states.len()];
        let mut order = Vec::with_capacity(self.states.len());
        let mut stack = vec![root];
        while let Some(state_idx) = stack.pop() {
            if numbering[state_idx as usize].is_some() {
                continue;
            }
            numbering[state_idx as usize] = Some(order.len() as VertexId);
            order.push(state_idx);
            let children = &self.states[state_idx as usize].children;
            stack.extend(children.iter().rev().map(|&(_, child)| child));
        }

        let vertex_count = order.len();
        let mut edges = Vec::new();
        let mut terminals = FixedBitSet::with_capacity(vertex_count);
        for (vertex, &state_idx) in order.iter().enumerate() {
            let state = &self.states[state_idx as usize];
            if state.terminal {
                terminals.insert(vertex);
            }
            for &(symbol, child) in &state.children {
                edges.push(Edge {
                    source: vertex as VertexId,
                    target: numbering[child as usize].unwrap_or_default(),
                    label: Label::single(symbol),
                });
            }
        }

        debug!(
            words = self.words,
            vertices = vertex_count,
            edges = edges.len(),
            shared = self.register.is_some(),
            "built automaton from word list"
        );
        Ok(Automaton::from_parts(vertex_count, edges, terminals, None)?)
    }
}

/// Builds a minimal acyclic automaton (shared prefixes and suffixes) from an
/// iterator of sorted words.
///
/// # Errors
///
/// Returns [`BuildError::Order`] if the words are not strictly increasing.
///
/// # Examples
///
/// ```
/// use libdafsa::dafsa::builder::build_dafsa;
///
/// let automaton = build_dafsa(["bake.com", "cake.com", "fake.com"]).unwrap();
/// assert!(automaton.accepts("cake.com"));
/// assert!(!automaton.accepts("ake.com"));
/// ```
pub fn build_dafsa<C, W>(words: impl IntoIterator<Item = W>) -> Result<Automaton<C>, BuildError<C>>
where
    C: LabelChar,
    W: IntoLabel<C>,
{
    let mut builder = DafsaBuilder::new();
    for word in words {
        builder.add_word(word)?;
    }
    builder.build()
}

/// Builds a prefix trie from an iterator of sorted words.
///
/// # Errors
///
/// Returns [`BuildError::Order`] if the words are not strictly increasing.
pub fn build_trie<C, W>(words: impl IntoIterator<Item = W>) -> Result<Automaton<C>, BuildError<C>>
where
    C: LabelChar,
    W: IntoLabel<C>,
{
    let mut builder = DafsaBuilder::trie();
    for word in words {
        builder.add_word(word)?;
    }
    builder.build()
}

#[cfg(test)]
mod test {
    use super::*;

    fn order_err(a: &str, b: &str) -> BuildError<char> {
        BuildError::Order(a.chars().collect(), b.chars().collect())
    }

    fn words(automaton: &Automaton<char>) -> Vec<String> {
        automaton
            .language()
            .into_iter()
            .map(|w| w.into_iter().collect())
            .collect()
    }

    #[test]
    fn single_word_is_a_chain() {
        let automaton = build_dafsa(["ABCDEF"]).unwrap();
        assert_eq!(automaton.vertex_count(), "ABCDEF".len() + 1);
        assert_eq!(automaton.edge_count(), "ABCDEF".len());
    }

    #[test]
    fn graph_shares_nodes() {
        let a = build_dafsa(["ABCDEF"]).unwrap();
        let b = build_dafsa(["ABCDEF", "ABDEF", "ABEF", "AF"]).unwrap();
        assert_eq!(a.vertex_count(), b.vertex_count());
    }

    #[test]
    fn graph_shares_nodes_unicode() {
        let a = build_dafsa(["授人以鱼不如授人以渔"]).unwrap();
        let b = build_dafsa(["授人以渔", "授人以鱼不如授人以渔"]).unwrap();
        assert_eq!(a.vertex_count(), b.vertex_count());
    }

    #[test]
    fn trie_does_not_share_suffixes() {
        let names = ["a.com", "b.com"];
        let trie = build_trie(names).unwrap();
        let dafsa = build_dafsa(names).unwrap();
        assert_eq!(trie.vertex_count(), 11);
        assert_eq!(dafsa.vertex_count(), 6);
        assert_eq!(words(&trie), words(&dafsa));
    }

    #[test]
    fn language_round_trips() {
        let names = ["example.com", "example.net", "examples.org", "test.com"];
        let automaton = build_dafsa(names).unwrap();
        assert_eq!(words(&automaton), names);
        for name in names {
            assert!(automaton.accepts(name));
        }
        assert!(!automaton.accepts("example"));
        assert!(!automaton.accepts("test.co"));
    }

    #[test]
    fn prefix_words_are_terminal() {
        let automaton = build_trie(["TEST", "TESTER", "WTEST"]).unwrap();
        assert!(automaton.accepts("TEST"));
        assert!(automaton.accepts("TESTER"));
        assert!(!automaton.accepts("TESTE"));
        assert!(!automaton.accepts("TES"));
    }

    #[test]
    fn empty_word_list_is_just_the_root() {
        let automaton = build_dafsa(Vec::<String>::new()).unwrap();
        assert_eq!(automaton.vertex_count(), 1);
        assert_eq!(automaton.edge_count(), 0);
    }

    #[test]
    fn empty_words_are_skipped() {
        let automaton = build_trie(["", "a"]).unwrap();
        assert_eq!(automaton.vertex_count(), 2);
        assert!(!automaton.is_terminal(automaton.root()));
    }

    #[test]
    fn unsorted_input_words_gives_error() {
        use itertools::Itertools;
        const SORTED_WORDS: [&str; 6] = ["ALFA", "BRAVO", "CHARLIE", "DELTA", "ECHO", "FOXTROT"];
        let mut sorted_count = 0;
        for wordlist in SORTED_WORDS.iter().cloned().permutations(SORTED_WORDS.len()) {
            let is_sorted = wordlist == SORTED_WORDS;
            assert_eq!(build_dafsa(&wordlist).is_ok(), is_sorted);
            sorted_count += is_sorted as i32;
        }
        assert_eq!(sorted_count, 1);
    }

    #[test]
    fn same_word_twice_gives_error() {
        let res = build_dafsa(["ALFA", "BRAVO", "CHARLIE", "CHARLIE"]);
        assert_eq!(res.unwrap_err(), order_err("CHARLIE", "CHARLIE"));
    }

    #[test]
    fn unsorted_words_are_reported() {
        let res = build_trie(["ALFA", "GOLF", "FOXTROT"]);
        assert_eq!(res.unwrap_err(), order_err("GOLF", "FOXTROT"));
        let res = build_dafsa(["ZULU", "ALFA"]);
        assert_eq!(res.unwrap_err(), order_err("ZULU", "ALFA"));
    }

    #[test]
    fn byte_words() {
        let words: Vec<Vec<u8>> = vec![vec![1, 2, 3], vec![1, 2, 4], vec![2, 3, 4]];
        let automaton = build_dafsa(words).unwrap();
        assert!(automaton.accepts([1u8, 2, 3]));
        assert!(!automaton.accepts([1u8, 2]));
        assert!(!automaton.accepts([1u8, 2, 5]));
    }

    #[test]
    fn explicit_builder_validates() {
        let mut builder = AutomatonBuilder::<char>::with_vertices(2);
        builder.add_edge(0, 1, 'a');
        builder.set_terminal(5);
        assert!(matches!(
            builder.build(),
            Err(MalformedAutomaton::UnknownVertex { .. })
        ));
    }
}
