//! Shared primitive identifiers and enums.

use serde::{Deserialize, Serialize};

/// Opaque book identifier. Never validated as a real ISBN checksum.
pub type Isbn = String;
/// Opaque member identifier.
pub type MemberId = String;
/// Timestamp in milliseconds since the Unix epoch.
pub type TsMs = u64;

/// Clock used by the store to stamp borrow and return events.
pub type Clock = fn() -> TsMs;

/// Milliseconds in one whole day.
pub const MS_PER_DAY: u64 = 86_400_000;

/// On-disk representation used by a snapshot sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Single-row SQLite table holding the JSON snapshot.
    #[default]
    Sqlite,
    /// Pretty-printed JSON document.
    Json,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite => f.write_str("sqlite"),
            Self::Json => f.write_str("json"),
        }
    }
}
