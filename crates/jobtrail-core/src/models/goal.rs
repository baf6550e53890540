//! Search goal model

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::Payload;

/// A weekly or milestone goal with a numeric target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub title: String,
    /// Target count to reach
    #[serde(default)]
    pub target: i64,
    /// Current progress toward the target
    #[serde(default)]
    pub progress: i64,
    /// Due date as entered by the user (`YYYY-MM-DD`)
    #[serde(default)]
    pub due: String,
    #[serde(default)]
    pub notes: String,
}

impl Goal {
    /// Whether progress has reached the target
    #[must_use]
    pub const fn is_met(&self) -> bool {
        self.target > 0 && self.progress >= self.target
    }
}

impl Payload for Goal {
    const COLLECTION: &'static str = "goals";
    const CSV_HEADERS: &'static [&'static str] =
        &["title", "target", "progress", "due", "notes"];

    fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidInput(
                "goal title cannot be empty".to_string(),
            ));
        }
        if self.target < 0 || self.progress < 0 {
            return Err(Error::InvalidInput(
                "goal target and progress cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_met() {
        let mut goal = Goal {
            title: "Apply to 5 roles".to_string(),
            target: 5,
            progress: 3,
            ..Goal::default()
        };
        assert!(!goal.is_met());
        goal.progress = 5;
        assert!(goal.is_met());
    }

    #[test]
    fn test_zero_target_is_never_met() {
        let goal = Goal {
            title: "placeholder".to_string(),
            ..Goal::default()
        };
        assert!(!goal.is_met());
    }
}
