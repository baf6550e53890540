//! Job application model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Payload, Referral};

/// Pipeline stage of an application, in fixed pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Saved,
    Applied,
    Screening,
    Interview,
    Offer,
    Rejected,
}

impl ApplicationStatus {
    /// All stages in pipeline order
    pub const ALL: [Self; 6] = [
        Self::Saved,
        Self::Applied,
        Self::Screening,
        Self::Interview,
        Self::Offer,
        Self::Rejected,
    ];

    /// Parse leniently, falling back to the first pipeline stage.
    ///
    /// This is the import-boundary coercion rule: unknown or missing status
    /// values default rather than fail.
    #[must_use]
    pub fn from_loose(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    /// Whether this stage means the company has responded
    #[must_use]
    pub const fn is_response(self) -> bool {
        matches!(
            self,
            Self::Screening | Self::Interview | Self::Offer | Self::Rejected
        )
    }
}

impl Default for ApplicationStatus {
    fn default() -> Self {
        Self::Saved
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Saved => "Saved",
            Self::Applied => "Applied",
            Self::Screening => "Screening",
            Self::Interview => "Interview",
            Self::Offer => "Offer",
            Self::Rejected => "Rejected",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ApplicationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "saved" => Ok(Self::Saved),
            "applied" => Ok(Self::Applied),
            "screening" => Ok(Self::Screening),
            "interview" => Ok(Self::Interview),
            "offer" => Ok(Self::Offer),
            "rejected" => Ok(Self::Rejected),
            other => Err(Error::InvalidInput(format!(
                "unknown application status: {other}"
            ))),
        }
    }
}

/// A tracked job application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub company: String,
    pub role: String,
    #[serde(default)]
    pub link: String,
    /// Application date as entered by the user (`YYYY-MM-DD`)
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub recruiter: String,
    #[serde(default)]
    pub referral: Referral,
    #[serde(default)]
    pub next_step: String,
    #[serde(default)]
    pub notes: String,
}

impl Payload for Application {
    const COLLECTION: &'static str = "applications";
    const CSV_HEADERS: &'static [&'static str] = &[
        "company",
        "role",
        "link",
        "date",
        "status",
        "location",
        "recruiter",
        "referral",
        "next_step",
        "notes",
    ];

    fn validate(&self) -> Result<()> {
        if self.company.trim().is_empty() {
            return Err(Error::InvalidInput(
                "application company cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_case_insensitive() {
        assert_eq!(
            "interview".parse::<ApplicationStatus>().unwrap(),
            ApplicationStatus::Interview
        );
        assert_eq!(
            " OFFER ".parse::<ApplicationStatus>().unwrap(),
            ApplicationStatus::Offer
        );
        assert!("ghosted".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn test_status_loose_defaults_to_first_stage() {
        assert_eq!(
            ApplicationStatus::from_loose("ghosted"),
            ApplicationStatus::Saved
        );
        assert_eq!(ApplicationStatus::from_loose(""), ApplicationStatus::Saved);
        assert_eq!(
            ApplicationStatus::from_loose("applied"),
            ApplicationStatus::Applied
        );
    }

    #[test]
    fn test_status_response_stages() {
        assert!(!ApplicationStatus::Saved.is_response());
        assert!(!ApplicationStatus::Applied.is_response());
        assert!(ApplicationStatus::Screening.is_response());
        assert!(ApplicationStatus::Rejected.is_response());
    }

    #[test]
    fn test_validate_requires_company() {
        let app = Application {
            role: "Engineer".to_string(),
            ..Application::default()
        };
        assert!(app.validate().is_err());

        let app = Application {
            company: "Acme".to_string(),
            ..app
        };
        assert!(app.validate().is_ok());
    }

    #[test]
    fn test_serde_roundtrip_keeps_status() {
        let app = Application {
            company: "Acme".to_string(),
            role: "Engineer".to_string(),
            status: ApplicationStatus::Interview,
            referral: Referral::Y,
            ..Application::default()
        };
        let value = serde_json::to_value(&app).unwrap();
        assert_eq!(value["status"], "Interview");
        assert_eq!(value["referral"], "Y");

        let back: Application = serde_json::from_value(value).unwrap();
        assert_eq!(back, app);
    }
}
