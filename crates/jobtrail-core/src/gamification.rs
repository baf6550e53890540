//! Streaks and badges over activity dates.
//!
//! Everything takes an explicit `today` so results are deterministic and the
//! day boundary is the caller's concern.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use serde::Serialize;

/// Consecutive-day activity streaks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Streak {
    /// Length of the run ending today or yesterday; 0 when the streak is dead
    pub current: u32,
    /// Longest run ever recorded
    pub longest: u32,
}

/// Compute streaks from the days that saw any activity.
///
/// Duplicate and unordered dates are fine. A streak counts as alive when the
/// most recent activity was today or yesterday, so a same-day check-in is not
/// required to keep it.
#[must_use]
pub fn streaks(activity_dates: &[NaiveDate], today: NaiveDate) -> Streak {
    let days: BTreeSet<NaiveDate> = activity_dates.iter().copied().collect();
    let Some(&last) = days.last() else {
        return Streak::default();
    };

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;
    let mut last_run = 0u32;
    for &day in &days {
        run = match previous {
            Some(prev) if prev.checked_add_days(Days::new(1)) == Some(day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
        last_run = run;
    }

    let yesterday = today.checked_sub_days(Days::new(1));
    let alive = last == today || Some(last) == yesterday;
    Streak {
        current: if alive { last_run } else { 0 },
        longest,
    }
}

/// Raw counts badges are awarded against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityStats {
    pub applications_submitted: usize,
    pub prep_sessions: usize,
    pub longest_streak: u32,
}

/// An earned achievement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub name: &'static str,
    pub description: &'static str,
}

const fn badge(name: &'static str, description: &'static str) -> Badge {
    Badge { name, description }
}

/// Threshold badges, applications then prep then streaks, easiest first
const BADGES: &[(Badge, fn(&ActivityStats) -> bool)] = &[
    (
        badge("First Step", "Submit your first application"),
        |s| s.applications_submitted >= 1,
    ),
    (
        badge("On a Roll", "Submit 10 applications"),
        |s| s.applications_submitted >= 10,
    ),
    (
        badge("Volume Game", "Submit 50 applications"),
        |s| s.applications_submitted >= 50,
    ),
    (
        badge("Warming Up", "Log your first prep session"),
        |s| s.prep_sessions >= 1,
    ),
    (
        badge("Grinder", "Log 25 prep sessions"),
        |s| s.prep_sessions >= 25,
    ),
    (
        badge("Consistent", "Keep a 7-day streak"),
        |s| s.longest_streak >= 7,
    ),
    (
        badge("Unstoppable", "Keep a 30-day streak"),
        |s| s.longest_streak >= 30,
    ),
];

/// Badges earned for the given stats, in award order
#[must_use]
pub fn earned_badges(stats: &ActivityStats) -> Vec<Badge> {
    BADGES
        .iter()
        .filter(|(_, earned)| earned(stats))
        .map(|(badge, _)| *badge)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_streak_alive_when_last_activity_today() {
        let days = [date("2026-08-22"), date("2026-08-23"), date("2026-08-24")];
        let streak = streaks(&days, date("2026-08-24"));
        assert_eq!(streak, Streak { current: 3, longest: 3 });
    }

    #[test]
    fn test_streak_survives_one_day_grace() {
        let days = [date("2026-08-22"), date("2026-08-23")];
        let streak = streaks(&days, date("2026-08-24"));
        assert_eq!(streak.current, 2);
    }

    #[test]
    fn test_streak_dies_after_two_quiet_days() {
        let days = [date("2026-08-20"), date("2026-08-21"), date("2026-08-22")];
        let streak = streaks(&days, date("2026-08-24"));
        assert_eq!(streak, Streak { current: 0, longest: 3 });
    }

    #[test]
    fn test_longest_tracks_past_runs() {
        let days = [
            date("2026-08-01"),
            date("2026-08-02"),
            date("2026-08-03"),
            date("2026-08-04"),
            // gap
            date("2026-08-23"),
            date("2026-08-24"),
        ];
        let streak = streaks(&days, date("2026-08-24"));
        assert_eq!(streak, Streak { current: 2, longest: 4 });
    }

    #[test]
    fn test_duplicates_and_order_do_not_matter() {
        let days = [date("2026-08-24"), date("2026-08-23"), date("2026-08-24")];
        let streak = streaks(&days, date("2026-08-24"));
        assert_eq!(streak.current, 2);
    }

    #[test]
    fn test_no_activity_means_no_streak() {
        assert_eq!(streaks(&[], date("2026-08-24")), Streak::default());
    }

    #[test]
    fn test_badges_award_in_order() {
        let stats = ActivityStats {
            applications_submitted: 12,
            prep_sessions: 1,
            longest_streak: 8,
        };
        let names: Vec<_> = earned_badges(&stats).iter().map(|b| b.name).collect();
        assert_eq!(
            names,
            vec!["First Step", "On a Roll", "Warming Up", "Consistent"]
        );
    }

    #[test]
    fn test_no_badges_for_empty_stats() {
        assert!(earned_badges(&ActivityStats::default()).is_empty());
    }
}
