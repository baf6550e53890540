//! Aggregate reporting: pipeline stats, streaks, and badges.

use chrono::{DateTime, NaiveDate, Utc};
use jobtrail_core::analytics::{
    applications_per_week, prep_summary, response_rate, status_funnel,
};
use jobtrail_core::gamification::{earned_badges, streaks, ActivityStats, Streak};
use jobtrail_core::models::{Application, ApplicationStatus, PrepEntry, Record};
use serde_json::json;

use crate::commands::common::CliContext;
use crate::error::CliError;

pub async fn run_stats(as_json: bool, ctx: &CliContext) -> Result<(), CliError> {
    let owner = ctx.require_owner()?.to_string();
    let service = ctx.open_service().await?;

    let applications: Vec<Record<Application>> = service.list(&owner).await?;
    let prep_entries: Vec<Record<PrepEntry>> = service.list(&owner).await?;

    let funnel = status_funnel(&applications);
    let weekly = applications_per_week(&applications);
    let rate = response_rate(&applications);
    let prep = prep_summary(&prep_entries);

    if as_json {
        let weekly_json: Vec<_> = weekly
            .iter()
            .map(|((year, week), count)| json!({ "year": year, "week": week, "count": count }))
            .collect();
        let report = json!({
            "funnel": funnel,
            "weekly": weekly_json,
            "response_rate": rate,
            "prep": prep,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Pipeline");
    for stage in &funnel {
        println!("  {:<10} {}", stage.status.to_string(), stage.count);
    }

    if !weekly.is_empty() {
        println!("\nApplications per week");
        for ((year, week), count) in &weekly {
            println!("  {year}-W{week:02}  {count}");
        }
    }

    match rate {
        Some(rate) => println!("\nResponse rate: {:.0}%", rate * 100.0),
        None => println!("\nResponse rate: no submitted applications yet"),
    }

    println!(
        "\nPrep: {} sessions, {} minutes total{}",
        prep.sessions,
        prep.total_minutes,
        prep.average_confidence
            .map(|avg| format!(", avg confidence {avg:.1}"))
            .unwrap_or_default()
    );

    Ok(())
}

pub async fn run_streak(as_json: bool, ctx: &CliContext) -> Result<(), CliError> {
    let owner = ctx.require_owner()?.to_string();
    let service = ctx.open_service().await?;

    let applications: Vec<Record<Application>> = service.list(&owner).await?;
    let prep_entries: Vec<Record<PrepEntry>> = service.list(&owner).await?;

    let today = Utc::now().date_naive();
    let streak = compute_streak(&applications, &prep_entries, today);

    let stats = ActivityStats {
        applications_submitted: applications
            .iter()
            .filter(|record| record.payload.status != ApplicationStatus::Saved)
            .count(),
        prep_sessions: prep_entries.len(),
        longest_streak: streak.longest,
    };
    let badges = earned_badges(&stats);

    if as_json {
        let report = json!({
            "streak": streak,
            "badges": badges,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Current streak: {} days", streak.current);
    println!("Longest streak: {} days", streak.longest);

    if badges.is_empty() {
        println!("\nNo badges yet. Log an application or a prep session to get started.");
    } else {
        println!("\nBadges");
        for badge in badges {
            println!("  {:<12} {}", badge.name, badge.description);
        }
    }

    Ok(())
}

fn compute_streak(
    applications: &[Record<Application>],
    prep_entries: &[Record<PrepEntry>],
    today: NaiveDate,
) -> Streak {
    let mut dates: Vec<NaiveDate> = Vec::new();
    dates.extend(
        applications
            .iter()
            .filter_map(|record| entry_date(&record.payload.date, record.created_at)),
    );
    dates.extend(
        prep_entries
            .iter()
            .filter_map(|record| entry_date(&record.payload.date, record.created_at)),
    );
    streaks(&dates, today)
}

fn entry_date(entered: &str, created_at: i64) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(entered, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::from_timestamp_millis(created_at).map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobtrail_core::models::RecordId;
    use pretty_assertions::assert_eq;

    fn app_on(date: &str) -> Record<Application> {
        Record {
            id: RecordId::new(),
            owner_id: "u1".to_string(),
            created_at: 0,
            updated_at: 0,
            payload: Application {
                company: "Acme".to_string(),
                date: date.to_string(),
                ..Application::default()
            },
        }
    }

    fn prep_on(date: &str) -> Record<PrepEntry> {
        Record {
            id: RecordId::new(),
            owner_id: "u1".to_string(),
            created_at: 0,
            updated_at: 0,
            payload: PrepEntry {
                topic: "graphs".to_string(),
                date: date.to_string(),
                ..PrepEntry::default()
            },
        }
    }

    #[test]
    fn streak_mixes_applications_and_prep_days() {
        let apps = vec![app_on("2026-08-22")];
        let preps = vec![prep_on("2026-08-23"), prep_on("2026-08-24")];
        let today = "2026-08-24".parse().unwrap();

        let streak = compute_streak(&apps, &preps, today);
        assert_eq!(streak.current, 3);
    }

    #[test]
    fn unparsable_date_falls_back_to_created_at() {
        // 2026-01-05 00:00:00 UTC
        assert_eq!(
            entry_date("not a date", 1_767_571_200_000),
            Some("2026-01-05".parse().unwrap())
        );
        assert_eq!(
            entry_date("2026-02-01", 0),
            Some("2026-02-01".parse().unwrap())
        );
    }
}
