/// JSON document backend.
pub mod json;
/// SQLite backend.
pub mod sqlite;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{core::store::StoreSnapshotV1, types::StorageBackend};

/// Version number for serialized [`SnapshotEnvelope`] payloads.
pub const SNAPSHOT_FORMAT_VERSION: u16 = 1;

/// Errors raised while loading or saving snapshots.
#[derive(Debug, Error)]
pub enum PersistError {
    /// SQLite rejected a statement.
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Payload could not be encoded or decoded.
    #[error("serde: {0}")]
    Serde(#[from] serde_json::Error),
    /// Filesystem access failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    /// Decoded state violates a store invariant.
    #[error("store: {0}")]
    Store(#[from] crate::core::store::StoreError),
    /// Payload carries an unknown `format_version`.
    #[error("unsupported snapshot format version: {0}")]
    UnsupportedFormat(u16),
}

/// Result alias for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// Versioned wrapper for stable on-disk payload decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEnvelope {
    /// Payload format version.
    pub format_version: u16,
    /// Wrapped state.
    pub snapshot: StoreSnapshotV1,
}

impl SnapshotEnvelope {
    /// Constructs an envelope using [`SNAPSHOT_FORMAT_VERSION`].
    pub fn new(snapshot: StoreSnapshotV1) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            snapshot,
        }
    }

    /// Serializes the envelope as pretty-printed JSON.
    pub fn encode(&self) -> PersistResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Decodes a payload, rejecting unknown format versions.
    pub fn decode(payload: &[u8]) -> PersistResult<StoreSnapshotV1> {
        let env: Self = serde_json::from_slice(payload)?;
        if env.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(PersistError::UnsupportedFormat(env.format_version));
        }
        Ok(env.snapshot)
    }
}

/// Durable home of the full library state.
///
/// `load` returns `Ok(None)` when nothing has been stored yet. `save`
/// overwrites the previous state in full.
pub trait SnapshotSink {
    /// Reads the stored state, or `None` if nothing was saved.
    fn load(&mut self) -> PersistResult<Option<StoreSnapshotV1>>;
    /// Replaces the stored state with `snapshot`.
    fn save(&mut self, snapshot: &StoreSnapshotV1) -> PersistResult<()>;
    /// Human-readable location used in log lines.
    fn describe(&self) -> String {
        "snapshot sink".to_string()
    }
}

/// Opens the sink configured for `backend` at `path`.
pub fn open_sink(backend: StorageBackend, path: &Path) -> PersistResult<Box<dyn SnapshotSink>> {
    let sink: Box<dyn SnapshotSink> = match backend {
        StorageBackend::Sqlite => Box::new(sqlite::SqliteSnapshotSink::open(path)?),
        StorageBackend::Json => Box::new(json::JsonFileSink::new(path)),
    };
    Ok(sink)
}
