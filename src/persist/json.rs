//! Plain JSON document sink.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::core::store::StoreSnapshotV1;

use super::{PersistResult, SnapshotEnvelope, SnapshotSink};

/// Stores the snapshot envelope as a pretty-printed JSON file.
///
/// Saves go to a sibling temp file which is then renamed over the target.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    /// Sink for the JSON document at `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotSink for JsonFileSink {
    fn load(&mut self) -> PersistResult<Option<StoreSnapshotV1>> {
        let payload = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        SnapshotEnvelope::decode(&payload).map(Some)
    }

    fn save(&mut self, snapshot: &StoreSnapshotV1) -> PersistResult<()> {
        let payload = SnapshotEnvelope::new(snapshot.clone()).encode()?;
        let tmp = self.temp_path();
        fs::write(&tmp, payload)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}
