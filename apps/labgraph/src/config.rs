//! Configuration for the labgraph binary.
//!
//! Sources, highest priority first:
//! 1. Command-line flags (`-D`, `-B`)
//! 2. Environment variables (`LABGRAPH_DATABASE`, `LABGRAPH_BACKEND`)
//! 3. Configuration file (TOML, `--config` or `./labgraph.toml` if present)
//! 4. Built-in defaults
//!
//! # Example
//!
//! ```toml
//! database = "graph.db"
//! backend = "file"
//! key_attribute = "name"
//! ```

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "labgraph.toml";

/// Environment variable overriding the database path.
pub const ENV_DATABASE: &str = "LABGRAPH_DATABASE";

/// Environment variable overriding the storage backend.
pub const ENV_BACKEND: &str = "LABGRAPH_BACKEND";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown backend '{0}' (expected: redb, file)")]
    InvalidBackend(String),
}

/// Storage backend selected for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// ACID redb database, changes persist immediately.
    #[default]
    Redb,
    /// Binary snapshot file, rewritten after each mutating command.
    File,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redb => write!(f, "redb"),
            Self::File => write!(f, "file"),
        }
    }
}

impl std::str::FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redb" => Ok(Self::Redb),
            "file" => Ok(Self::File),
            _ => Err(ConfigError::InvalidBackend(s.to_string())),
        }
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the graph database (redb file or snapshot file).
    pub database: PathBuf,
    /// Storage backend.
    pub backend: Backend,
    /// Attribute that identifies nodes in `(label, key)` addressing.
    pub key_attribute: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from("labgraph.db"),
            backend: Backend::default(),
            key_attribute: labgraph_core::primitives::KEY_ATTRIBUTE.to_string(),
        }
    }
}

impl Config {
    /// Load the file layer, then apply environment overrides.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(explicit) => Self::from_file(explicit)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `LABGRAPH_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(database) = lookup(ENV_DATABASE).filter(|v| !v.is_empty()) {
            self.database = PathBuf::from(database);
        }
        if let Some(backend) = lookup(ENV_BACKEND).filter(|v| !v.is_empty()) {
            self.backend = backend.parse()?;
        }
        Ok(())
    }

    /// Apply command-line flags, which win over every other source.
    #[must_use]
    pub fn with_cli(mut self, database: Option<PathBuf>, backend: Option<Backend>) -> Self {
        if let Some(database) = database {
            self.database = database;
        }
        if let Some(backend) = backend {
            self.backend = backend;
        }
        self
    }
}
