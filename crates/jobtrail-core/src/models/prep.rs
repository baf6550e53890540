//! Interview-prep session model

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::Payload;

/// Confidence self-rating bounds (inclusive)
pub const CONFIDENCE_MIN: i64 = 1;
pub const CONFIDENCE_MAX: i64 = 10;

/// One logged interview-prep session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepEntry {
    /// Session date as entered by the user (`YYYY-MM-DD`)
    #[serde(default)]
    pub date: String,
    pub topic: String,
    /// Problems or exercises worked through
    #[serde(default)]
    pub problems: String,
    /// Time spent, in minutes
    #[serde(default)]
    pub time_minutes: i64,
    /// Self-rated confidence, 1-10
    #[serde(default = "default_confidence")]
    pub confidence: i64,
    #[serde(default)]
    pub notes: String,
}

const fn default_confidence() -> i64 {
    CONFIDENCE_MIN
}

impl Default for PrepEntry {
    fn default() -> Self {
        Self {
            date: String::new(),
            topic: String::new(),
            problems: String::new(),
            time_minutes: 0,
            confidence: CONFIDENCE_MIN,
            notes: String::new(),
        }
    }
}

impl Payload for PrepEntry {
    const COLLECTION: &'static str = "prep_entries";
    const CSV_HEADERS: &'static [&'static str] =
        &["date", "topic", "problems", "time_minutes", "confidence", "notes"];

    fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(Error::InvalidInput(
                "prep entry topic cannot be empty".to_string(),
            ));
        }
        if self.time_minutes < 0 {
            return Err(Error::InvalidInput(
                "prep time cannot be negative".to_string(),
            ));
        }
        if !(CONFIDENCE_MIN..=CONFIDENCE_MAX).contains(&self.confidence) {
            return Err(Error::InvalidInput(format!(
                "confidence must be between {CONFIDENCE_MIN} and {CONFIDENCE_MAX}, got {}",
                self.confidence
            )));
        }
        Ok(())
    }
}
