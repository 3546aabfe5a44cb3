//! SQLite-backed single-row snapshot sink.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};

use crate::core::store::{StoreSnapshotV1, now_ms};

use super::{PersistResult, SnapshotEnvelope, SnapshotSink};

/// SQLite implementation of [`crate::persist::SnapshotSink`].
///
/// The whole library lives in one row that is replaced on every save.
pub struct SqliteSnapshotSink {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteSnapshotSink {
    /// Opens or creates a SQLite-backed sink at `path`.
    ///
    /// Keeps the rollback journal (no WAL) so the database stays a single file,
    /// and sets `synchronous=FULL`.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        Self::init_connection(conn, Some(path.to_path_buf()))
    }

    /// Opens an in-memory SQLite sink.
    pub fn open_in_memory() -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn, None)
    }

    fn init_connection(conn: Connection, path: Option<PathBuf>) -> PersistResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "synchronous", "FULL")?;
        Ok(Self { conn, path })
    }

    /// Timestamp of the stored snapshot, if any.
    pub fn saved_at(&self) -> PersistResult<Option<u64>> {
        let ts: Option<i64> = self
            .conn
            .query_row("SELECT ts_ms FROM snapshot WHERE id = 1", [], |row| row.get(0))
            .optional()?;
        Ok(ts.map(|v| v as u64))
    }
}

impl SnapshotSink for SqliteSnapshotSink {
    fn load(&mut self) -> PersistResult<Option<StoreSnapshotV1>> {
        let payload: Option<Vec<u8>> = self
            .conn
            .query_row("SELECT payload FROM snapshot WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        let Some(payload) = payload else {
            return Ok(None);
        };
        SnapshotEnvelope::decode(&payload).map(Some)
    }

    fn save(&mut self, snapshot: &StoreSnapshotV1) -> PersistResult<()> {
        let payload = SnapshotEnvelope::new(snapshot.clone()).encode()?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO snapshot(id, ts_ms, payload) VALUES (1, ?1, ?2) \
             ON CONFLICT(id) DO UPDATE SET ts_ms = excluded.ts_ms, payload = excluded.payload",
            params![now_ms() as i64, payload],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(path) => format!("sqlite:{}", path.display()),
            None => "sqlite::memory:".to_string(),
        }
    }
}
