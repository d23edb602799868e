//! CLI argument parsing for dafsa-report

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::{Config, ConfigError};

/// How the input file is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// JSON triple list: `{"vertices": n, "edges": [[s, t, "label"], ...]}`
    Triples,
    /// One word per line; `#` lines and blank lines are skipped
    Words,
    /// Graphviz digraph with integer vertex ids and `label` attributes
    Dot,
}

/// Automaton built from a word list
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BuilderKind {
    /// Prefix trie, one vertex per distinct prefix
    Trie,
    /// Minimal automaton with shared suffixes
    Dafsa,
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    Text,
    /// JSON for machine parsing
    Json,
}

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "dafsa-report")]
#[command(version)]
#[command(
    about = "Compress non-branching chains of a string automaton and report entropy and storage statistics",
    long_about = None
)]
pub struct Cli {
    /// Input file (reads stdin when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Input format
    #[arg(long = "input-format", value_enum, default_value = "triples")]
    pub input_format: InputFormat,

    /// Automaton to build from a word list
    #[arg(long, value_enum, default_value = "dafsa")]
    pub builder: BuilderKind,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write the report here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write the compressed automaton as a JSON triple list
    #[arg(long = "write-compressed", value_name = "FILE")]
    pub write_compressed: Option<PathBuf>,

    /// Write the compressed automaton in Graphviz DOT syntax
    #[arg(long, value_name = "FILE")]
    pub dot: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Include projected storage cost in the report
    #[arg(long)]
    pub storage: bool,

    /// Bits per stored label symbol (overrides config)
    #[arg(long = "bits-per-symbol", value_name = "BITS")]
    pub bits_per_symbol: Option<u64>,

    /// Structural bits per edge (overrides config)
    #[arg(long = "bits-per-edge", value_name = "BITS")]
    pub bits_per_edge: Option<u64>,

    /// Labels seen fewer times than this are priced literally (overrides config)
    #[arg(long, value_name = "COUNT")]
    pub cutoff: Option<u64>,

    /// Report statistics of the input only, without compressing it
    #[arg(long = "no-compress", conflicts_with_all = ["write_compressed", "dot"])]
    pub no_compress: bool,

    /// Never fold terminal vertices into compressed edges; `=false` overrides the config
    #[arg(
        long = "preserve-terminals",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub preserve_terminals: Option<bool>,

    /// Enable debug tracing output (to stderr)
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Loads `--config` if given, then applies the command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the config file cannot be loaded.
    pub fn config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(bits) = self.bits_per_symbol {
            config.storage.bits_per_symbol = bits;
        }
        if let Some(bits) = self.bits_per_edge {
            config.storage.bits_per_edge = bits;
        }
        if let Some(cutoff) = self.cutoff {
            config.occurrence_cutoff = cutoff;
        }
        if let Some(preserve) = self.preserve_terminals {
            config.compress.preserve_terminals = preserve;
        }
        Ok(config)
    }
}
