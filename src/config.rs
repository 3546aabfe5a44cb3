//! Runtime configuration, loaded from an optional TOML file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use crate::types::StorageBackend;

/// Errors raised while reading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`LibraryConfig`].
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value parsed but is unusable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LibraryConfig {
    /// Shared secret for the librarian menu. Not a security boundary.
    pub librarian_password: String,
    /// Whole days a loan may stay open before it is overdue.
    pub overdue_threshold_days: u64,
    /// Rows shown by the top borrowers view.
    pub top_borrowers_limit: usize,
    /// Where and how the library is persisted.
    pub storage: StorageConfig,
    /// Logging output.
    pub log: LogConfig,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            librarian_password: "admin".to_string(),
            overdue_threshold_days: 14,
            top_borrowers_limit: 5,
            storage: StorageConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// `[storage]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// SQLite database or JSON document path.
    pub path: PathBuf,
    /// Storage format at `path`.
    pub backend: StorageBackend,
    /// Commit after every mutation. When off, the console commits on exit.
    pub auto_commit: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("library.db"),
            backend: StorageBackend::Sqlite,
            auto_commit: true,
        }
    }
}

/// `[log]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

impl LibraryConfig {
    /// Reads and validates a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&input)
    }

    /// Parses and validates TOML text.
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects a blank librarian password or an empty storage path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.librarian_password.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "librarian_password must not be empty".to_string(),
            ));
        }
        if self.storage.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("storage.path must not be empty".to_string()));
        }
        Ok(())
    }
}
