//! STAR story model

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::Payload;

/// A behavioral-interview story in STAR form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarStory {
    pub title: String,
    #[serde(default)]
    pub situation: String,
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub result: String,
}

impl Payload for StarStory {
    const COLLECTION: &'static str = "stories";
    const CSV_HEADERS: &'static [&'static str] =
        &["title", "situation", "task", "action", "result"];

    fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidInput(
                "story title cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
