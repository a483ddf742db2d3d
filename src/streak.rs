//! Reading streaks
//!
//! This module derives the current and longest runs of consecutive canonical
//! days with reading activity.
//! - Duplicate days count once
//! - The current streak survives only while the latest activity is today or yesterday
//! - Any gap larger than one day breaks a run

use crate::normalizer::days_between;
use crate::types::{ActivityDayKey, StreakSummary};
use std::collections::BTreeSet;
use tracing::debug;

/// Streak calculator over canonical activity days
pub struct StreakCalculator;

impl StreakCalculator {
    /// Compute current and longest streaks relative to `today`
    pub fn compute<I>(days: I, today: ActivityDayKey) -> StreakSummary
    where
        I: IntoIterator<Item = ActivityDayKey>,
    {
        let distinct: BTreeSet<ActivityDayKey> = days.into_iter().collect();
        if distinct.is_empty() {
            return StreakSummary::default();
        }

        // Most recent first
        let sorted: Vec<ActivityDayKey> = distinct.into_iter().rev().collect();

        let current = current_streak(&sorted, today);
        let longest = longest_streak(&sorted).max(current);

        debug!(days = sorted.len(), current, longest, "computed streaks");

        StreakSummary { current, longest }
    }
}

/// Compute streaks for a set of canonical days
pub fn compute_streaks<I>(days: I, today: ActivityDayKey) -> StreakSummary
where
    I: IntoIterator<Item = ActivityDayKey>,
{
    StreakCalculator::compute(days, today)
}

/// Run ending at the most recent day, if that day is today or yesterday
fn current_streak(sorted_desc: &[ActivityDayKey], today: ActivityDayKey) -> u32 {
    let Some(&most_recent) = sorted_desc.first() else {
        return 0;
    };

    let since_last = days_between(most_recent, today);
    if since_last != 0 && since_last != 1 {
        return 0;
    }

    let mut streak = 1;
    for pair in sorted_desc.windows(2) {
        if days_between(pair[1], pair[0]) == 1 {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// Longest run of consecutive days anywhere in the history
fn longest_streak(sorted_desc: &[ActivityDayKey]) -> u32 {
    if sorted_desc.is_empty() {
        return 0;
    }

    let mut longest = 1;
    let mut run = 1;
    for pair in sorted_desc.windows(2) {
        if days_between(pair[1], pair[0]) == 1 {
            run += 1;
        } else {
            run = 1;
        }
        longest = longest.max(run);
    }
    longest
}
