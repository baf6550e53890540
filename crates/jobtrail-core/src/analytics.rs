//! Client-side aggregation over synced collections.
//!
//! Pure functions over record slices; no I/O. The lists are always small
//! enough (one user's job search) that linear passes are fine.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate};
use serde::Serialize;

use crate::models::{Application, ApplicationStatus, PrepEntry, Record};

/// Count of applications per pipeline stage, in pipeline order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunnelStage {
    pub status: ApplicationStatus,
    pub count: usize,
}

/// Pipeline funnel: one entry per stage, pipeline order, zero counts included
#[must_use]
pub fn status_funnel(applications: &[Record<Application>]) -> Vec<FunnelStage> {
    ApplicationStatus::ALL
        .into_iter()
        .map(|status| FunnelStage {
            status,
            count: applications
                .iter()
                .filter(|record| record.payload.status == status)
                .count(),
        })
        .collect()
}

/// `(iso_year, iso_week)` key for weekly buckets
pub type IsoWeek = (i32, u32);

/// Applications bucketed per ISO week, sorted by week.
///
/// The user-entered `date` field wins when it parses as `YYYY-MM-DD`;
/// otherwise the record's creation timestamp is used.
#[must_use]
pub fn applications_per_week(applications: &[Record<Application>]) -> BTreeMap<IsoWeek, usize> {
    let mut weeks = BTreeMap::new();
    for record in applications {
        if let Some(date) = activity_date(record) {
            let week = date.iso_week();
            *weeks.entry((week.year(), week.week())).or_insert(0) += 1;
        }
    }
    weeks
}

/// Share of submitted applications that got any response, in `0.0..=1.0`.
///
/// Saved applications have not been submitted and are excluded from the
/// denominator. Returns `None` when nothing has been submitted.
#[must_use]
pub fn response_rate(applications: &[Record<Application>]) -> Option<f64> {
    let submitted: Vec<_> = applications
        .iter()
        .filter(|record| record.payload.status != ApplicationStatus::Saved)
        .collect();
    if submitted.is_empty() {
        return None;
    }

    let responded = submitted
        .iter()
        .filter(|record| record.payload.status.is_response())
        .count();

    #[allow(clippy::cast_precision_loss)]
    let rate = responded as f64 / submitted.len() as f64;
    Some(rate)
}

/// Aggregate view of logged prep work
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrepSummary {
    pub sessions: usize,
    pub total_minutes: i64,
    /// Mean confidence across sessions; `None` when no sessions exist
    pub average_confidence: Option<f64>,
}

#[must_use]
pub fn prep_summary(entries: &[Record<PrepEntry>]) -> PrepSummary {
    let sessions = entries.len();
    let total_minutes = entries.iter().map(|r| r.payload.time_minutes).sum();
    let average_confidence = if sessions == 0 {
        None
    } else {
        let total: i64 = entries.iter().map(|r| r.payload.confidence).sum();
        #[allow(clippy::cast_precision_loss)]
        let average = total as f64 / sessions as f64;
        Some(average)
    };

    PrepSummary {
        sessions,
        total_minutes,
        average_confidence,
    }
}

/// Resolve the date an application belongs to for bucketing purposes
fn activity_date(record: &Record<Application>) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(&record.payload.date, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::from_timestamp_millis(record.created_at).map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordId;
    use pretty_assertions::assert_eq;

    fn app(status: ApplicationStatus, date: &str, created_at: i64) -> Record<Application> {
        Record {
            id: RecordId::new(),
            owner_id: "u1".to_string(),
            created_at,
            updated_at: created_at,
            payload: Application {
                company: "Acme".to_string(),
                role: "Engineer".to_string(),
                date: date.to_string(),
                status,
                ..Application::default()
            },
        }
    }

    fn prep(minutes: i64, confidence: i64) -> Record<PrepEntry> {
        Record {
            id: RecordId::new(),
            owner_id: "u1".to_string(),
            created_at: 0,
            updated_at: 0,
            payload: PrepEntry {
                topic: "graphs".to_string(),
                time_minutes: minutes,
                confidence,
                ..PrepEntry::default()
            },
        }
    }

    #[test]
    fn test_funnel_keeps_pipeline_order_and_zero_stages() {
        let apps = vec![
            app(ApplicationStatus::Applied, "", 0),
            app(ApplicationStatus::Applied, "", 0),
            app(ApplicationStatus::Offer, "", 0),
        ];
        let funnel = status_funnel(&apps);

        let statuses: Vec<_> = funnel.iter().map(|stage| stage.status).collect();
        assert_eq!(statuses, ApplicationStatus::ALL.to_vec());
        assert_eq!(funnel[1].count, 2); // Applied
        assert_eq!(funnel[2].count, 0); // Screening
        assert_eq!(funnel[4].count, 1); // Offer
    }

    #[test]
    fn test_applications_per_week_prefers_entered_date() {
        let apps = vec![
            app(ApplicationStatus::Applied, "2026-01-05", 0),
            app(ApplicationStatus::Applied, "2026-01-07", 0),
            app(ApplicationStatus::Applied, "2026-01-12", 0),
        ];
        let weeks = applications_per_week(&apps);

        assert_eq!(weeks.get(&(2026, 2)), Some(&2));
        assert_eq!(weeks.get(&(2026, 3)), Some(&1));
    }

    #[test]
    fn test_applications_per_week_falls_back_to_created_at() {
        // 2026-01-05 00:00:00 UTC, ISO week 2.
        let apps = vec![app(ApplicationStatus::Applied, "not a date", 1_767_571_200_000)];
        let weeks = applications_per_week(&apps);
        assert_eq!(weeks.get(&(2026, 2)), Some(&1));
    }

    #[test]
    fn test_response_rate_excludes_saved() {
        let apps = vec![
            app(ApplicationStatus::Saved, "", 0),
            app(ApplicationStatus::Applied, "", 0),
            app(ApplicationStatus::Screening, "", 0),
            app(ApplicationStatus::Rejected, "", 0),
            app(ApplicationStatus::Applied, "", 0),
        ];
        // 2 responses out of 4 submitted.
        assert_eq!(response_rate(&apps), Some(0.5));
    }

    #[test]
    fn test_response_rate_empty_pipeline() {
        assert_eq!(response_rate(&[]), None);
        let only_saved = vec![app(ApplicationStatus::Saved, "", 0)];
        assert_eq!(response_rate(&only_saved), None);
    }

    #[test]
    fn test_prep_summary() {
        let entries = vec![prep(30, 4), prep(60, 8)];
        let summary = prep_summary(&entries);
        assert_eq!(summary.sessions, 2);
        assert_eq!(summary.total_minutes, 90);
        assert_eq!(summary.average_confidence, Some(6.0));

        assert_eq!(prep_summary(&[]).average_confidence, None);
    }
}
