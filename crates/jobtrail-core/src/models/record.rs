//! Record envelope shared by every collection

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// A unique identifier for a record, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Create a new unique record ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Collection-specific payload carried inside a [`Record`].
///
/// Implementations are flat structs whose fields serialize to a JSON object;
/// the store persists that object verbatim and the sync binding decodes it
/// back on every snapshot.
pub trait Payload:
    Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static
{
    /// Store collection this payload belongs to
    const COLLECTION: &'static str;

    /// CSV column order for export, matching the payload's field names
    const CSV_HEADERS: &'static [&'static str];

    /// Check domain rules (numeric ranges) before a write-through mutation.
    ///
    /// Enum-typed fields need no checking here; out-of-enum values are
    /// unrepresentable once parsed.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// A synced record: store-assigned envelope plus collection payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Record<P: Payload> {
    /// Unique identifier, assigned by the store exactly once
    pub id: RecordId,
    /// Owning user, set at creation, immutable
    pub owner_id: String,
    /// Creation timestamp (Unix ms), store-assigned
    pub created_at: i64,
    /// Last update timestamp (Unix ms), store-assigned
    pub updated_at: i64,
    /// Collection-specific fields
    pub payload: P,
}
