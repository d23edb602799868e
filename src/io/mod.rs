//! Loading and writing automata and word lists.
//!
//! The triple-list document is the boundary format of the toolkit:
//!
//! ```json
//! { "vertices": 4, "edges": [[0, 1, "a"], [1, 2, "b"], [2, 3, "c"]], "terminals": [3] }
//! ```
//!
//! Vertex 0 is the root. `terminals` may be omitted.
//!
//! Graphviz DOT is read and written through [`read_dot`] and [`write_dot`].

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::dafsa::{Automaton, AutomatonBuilder, MalformedAutomaton, VertexId};

mod dot;

pub use dot::{read_dot, write_dot};

/// Errors reading or writing automata.
#[derive(Debug, Error)]
pub enum IoError {
    /// Underlying read or write failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The document is not a valid triple list.
    #[error("invalid triple list: {0}")]
    Json(#[from] serde_json::Error),
    /// The DOT input is outside the supported `digraph` subset.
    #[error("invalid DOT at line {line}: {message}")]
    Dot {
        /// 1-based line of the offending token.
        line: usize,
        /// What was wrong.
        message: String,
    },
    /// The document describes an invalid automaton.
    #[error("malformed automaton: {0}")]
    Malformed(#[from] MalformedAutomaton),
}

/// Serialized form of an automaton over `char` labels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripleList {
    /// Number of vertices; ids run from 0 to `vertices - 1`.
    pub vertices: usize,
    /// `(source, target, label)` triples.
    pub edges: Vec<(VertexId, VertexId, String)>,
    /// Terminal vertices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terminals: Vec<VertexId>,
}

impl TripleList {
    /// Captures an automaton's structure.
    pub fn from_automaton(automaton: &Automaton<char>) -> Self {
        TripleList {
            vertices: automaton.vertex_count(),
            edges: automaton
                .edges()
                .iter()
                .map(|e| (e.source, e.target, e.label.to_string()))
                .collect(),
            terminals: automaton.terminals().collect(),
        }
    }

    /// Validates the triples and builds the automaton.
    ///
    /// # Errors
    ///
    /// Returns a [`MalformedAutomaton`] if the triples do not form a valid automaton.
    pub fn into_automaton(self) -> Result<Automaton<char>, MalformedAutomaton> {
        let mut builder = AutomatonBuilder::with_vertices(self.vertices);
        for (source, target, label) in self.edges {
            builder.add_edge(source, target, label);
        }
        for vertex in self.terminals {
            builder.set_terminal(vertex);
        }
        builder.build()
    }
}

/// Reads a JSON triple list and builds the automaton it describes.
///
/// # Errors
///
/// Returns [`IoError`] on read failures, invalid JSON, or an invalid automaton.
pub fn read_triples(reader: impl BufRead) -> Result<Automaton<char>, IoError> {
    let document: TripleList = serde_json::from_reader(reader)?;
    debug!(
        vertices = document.vertices,
        edges = document.edges.len(),
        "read triple list"
    );
    Ok(document.into_automaton()?)
}

/// Writes an automaton as a JSON triple list.
///
/// # Errors
///
/// Returns [`IoError`] if serialization or the write fails.
pub fn write_triples(mut writer: impl Write, automaton: &Automaton<char>) -> Result<(), IoError> {
    serde_json::to_writer(&mut writer, &TripleList::from_automaton(automaton))?;
    writeln!(writer)?;
    Ok(())
}

/// Returns true if this line is a comment.
pub(crate) fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Reads a word list: one word per line, surrounding whitespace trimmed.
/// Empty lines and lines starting with `#` are skipped.
///
/// # Errors
///
/// Returns [`IoError::Io`] if reading fails.
pub fn read_word_list(mut reader: impl BufRead) -> Result<Vec<String>, IoError> {
    let mut words = Vec::new();
    // Reuse one buffer instead of allocating a new string for every line.
    let mut buf = String::with_capacity(80);
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        let word = buf.trim();
        if word.is_empty() || is_comment(word) {
            continue;
        }
        words.push(word.to_owned());
    }
    trace!(count = words.len(), "read word list");
    Ok(words)
}
