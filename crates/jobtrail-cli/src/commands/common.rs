use std::env;
use std::path::PathBuf;

use jobtrail_core::models::RecordId;
use jobtrail_core::store::SyncConfig;
use jobtrail_core::StoreService;

use crate::cli::Cli;
use crate::config::{normalize_text_option, ProfilesConfig};
use crate::error::CliError;

/// Everything a command needs that comes from flags, env, and the profile
pub struct CliContext {
    pub owner: Option<String>,
    pub db_path: PathBuf,
    pub sync: Option<SyncConfig>,
}

impl CliContext {
    /// Resolve flags > environment > active profile > defaults
    pub fn resolve(cli: &Cli) -> Result<Self, CliError> {
        let config = ProfilesConfig::load().map_err(CliError::Config)?;
        let profile_name = config.resolve_profile_name(cli.profile.as_deref());
        let profile = config.profile(&profile_name).cloned().unwrap_or_default();

        let owner = normalize_text_option(cli.owner.clone())
            .or_else(|| normalize_text_option(env::var("JOBTRAIL_OWNER").ok()))
            .or_else(|| profile.owner_id());

        let db_path = cli
            .db_path
            .clone()
            .or_else(|| env::var_os("JOBTRAIL_DB_PATH").map(PathBuf::from))
            .or_else(|| profile.db_path())
            .unwrap_or_else(default_db_path);

        let sync_url = normalize_text_option(env::var("JOBTRAIL_SYNC_URL").ok())
            .or_else(|| profile.sync_url());
        let sync_token = normalize_text_option(env::var("JOBTRAIL_SYNC_TOKEN").ok())
            .or_else(|| profile.sync_auth_token());
        let sync = match (sync_url, sync_token) {
            (Some(url), Some(token)) => Some(SyncConfig::new(url, token)),
            _ => None,
        };

        Ok(Self {
            owner,
            db_path,
            sync,
        })
    }

    /// Owner id, required for anything that reads or writes records
    pub fn require_owner(&self) -> Result<&str, CliError> {
        self.owner.as_deref().ok_or(CliError::NoOwner)
    }

    pub async fn open_service(&self) -> Result<StoreService, CliError> {
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if let Some(sync_config) = self.sync.clone() {
            tracing::info!("Sync enabled for remote replica");
            Ok(StoreService::open_with_sync(&self.db_path, sync_config).await?)
        } else {
            Ok(StoreService::open(&self.db_path).await?)
        }
    }
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jobtrail")
        .join("jobtrail.db")
}

pub fn parse_record_id(id: &str) -> Result<RecordId, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(CliError::EmptyRecordId);
    }
    trimmed
        .parse::<RecordId>()
        .map_err(|_| CliError::InvalidRecordId(trimmed.to_string()))
}

pub fn short_id(id: RecordId) -> String {
    id.to_string().chars().take(13).collect()
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

/// Keep optional flag overlays in one place: a provided flag replaces the
/// current value, an omitted one leaves it alone.
pub fn overlay(target: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *target = value;
    }
}
