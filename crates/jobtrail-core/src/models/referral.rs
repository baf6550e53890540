//! Referral flag shared by applications and contacts

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Whether a referral is involved, stored as `Y`/`N`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Referral {
    Y,
    N,
}

impl Referral {
    /// Parse leniently, defaulting to `N` (import-boundary coercion rule)
    #[must_use]
    pub fn from_loose(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    #[must_use]
    pub const fn is_yes(self) -> bool {
        matches!(self, Self::Y)
    }
}

impl Default for Referral {
    fn default() -> Self {
        Self::N
    }
}

impl fmt::Display for Referral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Y => write!(f, "Y"),
            Self::N => write!(f, "N"),
        }
    }
}

impl FromStr for Referral {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" | "true" => Ok(Self::Y),
            "n" | "no" | "false" => Ok(Self::N),
            other => Err(Error::InvalidInput(format!(
                "unknown referral flag: {other}"
            ))),
        }
    }
}
