//! Report configuration, loadable from TOML.
//!
//! ```toml
//! occurrence_cutoff = 2
//!
//! [storage]
//! bits_per_symbol = 7
//! bits_per_edge = 3
//!
//! [compress]
//! preserve_terminals = true
//! ```
//!
//! Every field is optional and falls back to its default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::dafsa::CompressOptions;
use crate::stats::StorageModel;

/// Settings shared by the library entry points and the CLI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Cost model parameters.
    pub storage: StorageModel,
    /// Labels seen fewer times than this are priced literally.
    pub occurrence_cutoff: u64,
    /// Path compression options.
    pub compress: CompressOptions,
}

/// Errors loading a [`Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not valid TOML for a [`Config`].
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on syntax errors or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }
}
