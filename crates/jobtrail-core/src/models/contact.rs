//! Networking contact model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Payload, Referral};

/// Outreach state for a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactStatus {
    ToReach,
    Reached,
    Responded,
    Meeting,
    Dormant,
}

impl ContactStatus {
    /// All states in outreach order
    pub const ALL: [Self; 5] = [
        Self::ToReach,
        Self::Reached,
        Self::Responded,
        Self::Meeting,
        Self::Dormant,
    ];

    /// Parse leniently, falling back to the first state
    #[must_use]
    pub fn from_loose(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl Default for ContactStatus {
    fn default() -> Self {
        Self::ToReach
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ToReach => "ToReach",
            Self::Reached => "Reached",
            Self::Responded => "Responded",
            Self::Meeting => "Meeting",
            Self::Dormant => "Dormant",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ContactStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "toreach" | "to-reach" | "to reach" => Ok(Self::ToReach),
            "reached" => Ok(Self::Reached),
            "responded" => Ok(Self::Responded),
            "meeting" => Ok(Self::Meeting),
            "dormant" => Ok(Self::Dormant),
            other => Err(Error::InvalidInput(format!(
                "unknown contact status: {other}"
            ))),
        }
    }
}

/// A networking contact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkingContact {
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub role: String,
    /// Last-touch date as entered by the user (`YYYY-MM-DD`)
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub status: ContactStatus,
    #[serde(default)]
    pub referral: Referral,
    #[serde(default)]
    pub notes: String,
}

impl Payload for NetworkingContact {
    const COLLECTION: &'static str = "contacts";
    const CSV_HEADERS: &'static [&'static str] =
        &["name", "company", "role", "date", "status", "referral", "notes"];

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput(
                "contact name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_accepts_spelling_variants() {
        assert_eq!(
            "to-reach".parse::<ContactStatus>().unwrap(),
            ContactStatus::ToReach
        );
        assert_eq!(
            "MEETING".parse::<ContactStatus>().unwrap(),
            ContactStatus::Meeting
        );
        assert!("friend".parse::<ContactStatus>().is_err());
    }

    #[test]
    fn test_status_loose_defaults_to_first_state() {
        assert_eq!(ContactStatus::from_loose("friend"), ContactStatus::ToReach);
    }
}
