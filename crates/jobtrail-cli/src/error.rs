use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] jobtrail_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Record ID cannot be empty")]
    EmptyRecordId,
    #[error("Invalid record ID: {0}")]
    InvalidRecordId(String),
    #[error(
        "No owner configured. Pass --owner, set JOBTRAIL_OWNER, or run `jobtrail config init --owner <id>`."
    )]
    NoOwner,
    #[error(
        "Sync is not configured. Set JOBTRAIL_SYNC_URL and JOBTRAIL_SYNC_TOKEN or configure them in a profile."
    )]
    SyncNotConfigured,
    #[error("Unsupported collection for this operation: {0}")]
    UnsupportedCollection(String),
}
