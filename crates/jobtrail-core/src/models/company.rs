//! Company research model

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::Payload;

/// Research notes about one target company
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyResearch {
    pub company: String,
    #[serde(default)]
    pub what_they_do: String,
    #[serde(default)]
    pub values: String,
    /// Why this company is interesting to the user
    #[serde(default)]
    pub why: String,
    /// Questions to ask in interviews
    #[serde(default)]
    pub questions: String,
    #[serde(default)]
    pub news: String,
}

impl Payload for CompanyResearch {
    const COLLECTION: &'static str = "companies";
    const CSV_HEADERS: &'static [&'static str] =
        &["company", "what_they_do", "values", "why", "questions", "news"];

    fn validate(&self) -> Result<()> {
        if self.company.trim().is_empty() {
            return Err(Error::InvalidInput(
                "company name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
