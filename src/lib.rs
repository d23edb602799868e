//! # libdafsa
//!
//! Path compression and information-theoretic storage estimates for
//! acyclic string automata: prefix tries and
//! [DAFSAs](https://en.wikipedia.org/wiki/Deterministic_acyclic_finite_state_automaton)
//! (Directed Acyclic Finite State Automata).
//!
//! A trie or DAFSA built one symbol per edge spends most of its vertices on
//! long non-branching runs. [`compress`](dafsa::compress) folds every maximal run of
//! pass-through vertices (in-degree 1, out-degree 1) into a single edge with a
//! multi-symbol label. The [`stats`] module then measures what that bought:
//! degree and label histograms, their Shannon entropy, and a projected size for
//! an entropy-coded encoding with a label codebook.
//!
//! ## Features
//!
//! - **Generic over symbol type**: labels are sequences of `char`, `u8`, `u16`, or any
//!   type implementing [`LabelChar`](dafsa::LabelChar)
//! - **Deterministic**: output numbering and report ordering depend only on the input
//! - **Idempotent**: compressing a compressed automaton changes nothing
//! - **Language preserving** on request, via
//!   [`CompressOptions::preserve_terminals`](dafsa::CompressOptions)
//!
//! ## Quick Start
//!
//! ```
//! use libdafsa::dafsa::{compress, Automaton};
//!
//! let automaton = Automaton::<char>::from_edges(
//!     4,
//!     [(0, 1, "a"), (1, 2, "b"), (2, 3, "c")],
//! ).unwrap();
//! let compressed = compress(&automaton).unwrap();
//!
//! assert_eq!(compressed.vertex_count(), 2);
//! assert_eq!(compressed.to_triples()[0].2.to_string(), "abc");
//! ```
//!
//! ## Building from words
//!
//! Word lists in sorted order build a trie or a minimal automaton:
//!
//! ```
//! use libdafsa::dafsa::{build_dafsa, build_trie, CompressOptions, Compressor};
//!
//! let words = ["bake", "cake", "fake", "lake", "make"];
//! let trie = build_trie::<char, _>(words).unwrap();
//! let dafsa = build_dafsa::<char, _>(words).unwrap();
//! assert!(dafsa.vertex_count() < trie.vertex_count());
//!
//! let compressor = Compressor::new(CompressOptions { preserve_terminals: true });
//! let compressed = compressor.compress(&dafsa).unwrap();
//! assert_eq!(compressed.language(), dafsa.language());
//! ```
//!
//! ## Statistics
//!
//! ```
//! use libdafsa::dafsa::{compress, build_trie};
//! use libdafsa::report::CompressionReport;
//! use libdafsa::stats::{AutomatonStats, StorageModel};
//!
//! let trie = build_trie::<char, _>(["a.com", "b.com"]).unwrap();
//! let before = AutomatonStats::collect(&trie);
//! let after = AutomatonStats::collect(&compress(&trie).unwrap());
//!
//! let model = StorageModel::default();
//! let report = CompressionReport::new(&before, &after)
//!     .with_storage(before.storage(&model, 0), after.storage(&model, 0));
//! println!("{report}");
//! ```

#![warn(missing_docs)]

/// CLI argument parsing for the `dafsa-report` binary.
pub mod cli;
/// Report settings, loadable from TOML.
pub mod config;
/// Automaton model, builders, and path compression.
pub mod dafsa;
/// Triple-list, word-list and DOT input/output.
pub mod io;
/// Before/after comparison reports.
pub mod report;
/// Histograms, entropy and storage estimates.
pub mod stats;

pub use config::Config;
