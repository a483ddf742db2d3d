//! Calendar heatmap
//!
//! This module lays out month grids from the anchor month through the current
//! month. Each grid starts with Sunday-based padding cells followed by one cell
//! per day, classified into an intensity bin by pages read.

use crate::normalizer::{month_start, to_canonical_day, ReferenceOffset};
use crate::types::{ActivityDay, ActivityDayKey, CalendarCell, CalendarDay, CalendarMonth, Intensity};
use chrono::{DateTime, Datelike, Months, Utc};
use std::collections::BTreeMap;
use tracing::debug;

/// Builder for heatmap month grids
pub struct CalendarBuilder;

impl CalendarBuilder {
    /// Build every month from `anchor`'s month through `today`'s month.
    ///
    /// An anchor after today collapses to today's month alone.
    pub fn build(
        activity: &[ActivityDay],
        anchor: ActivityDayKey,
        today: ActivityDayKey,
    ) -> Vec<CalendarMonth> {
        let pages_by_day = pages_by_day(activity);

        let last = month_start(today);
        let mut cursor = month_start(anchor.min(today));
        let mut months = Vec::new();

        while cursor <= last {
            months.push(build_month(cursor, &pages_by_day, anchor, today));
            match cursor.checked_add_months(Months::new(1)) {
                Some(next) => cursor = next,
                None => break,
            }
        }

        debug!(%anchor, %today, months = months.len(), "built calendar");
        months
    }
}

/// Build the heatmap for instants, bucketed in the reference timezone
pub fn build_calendar(
    activity: &[ActivityDay],
    anchor_start: DateTime<Utc>,
    now: DateTime<Utc>,
    offset: ReferenceOffset,
) -> Vec<CalendarMonth> {
    CalendarBuilder::build(
        activity,
        to_canonical_day(anchor_start, offset),
        to_canonical_day(now, offset),
    )
}

/// Pick the heatmap anchor: account creation, else earliest activity, else today
pub fn resolve_anchor(
    account_created_at: Option<DateTime<Utc>>,
    activity: &[ActivityDay],
    now: DateTime<Utc>,
    offset: ReferenceOffset,
) -> ActivityDayKey {
    if let Some(created) = account_created_at {
        return to_canonical_day(created, offset);
    }
    activity
        .iter()
        .map(|day| day.date)
        .min()
        .unwrap_or_else(|| to_canonical_day(now, offset))
}

fn pages_by_day(activity: &[ActivityDay]) -> BTreeMap<ActivityDayKey, u32> {
    let mut pages: BTreeMap<ActivityDayKey, u32> = BTreeMap::new();
    for day in activity {
        let entry = pages.entry(day.date).or_insert(0);
        *entry = entry.saturating_add(day.pages_read);
    }
    pages
}

fn build_month(
    first: ActivityDayKey,
    pages_by_day: &BTreeMap<ActivityDayKey, u32>,
    anchor: ActivityDayKey,
    today: ActivityDayKey,
) -> CalendarMonth {
    let padding = first.weekday().num_days_from_sunday() as usize;
    let mut cells = vec![CalendarCell::Empty; padding];

    for date in first.iter_days().take_while(|d| d.month() == first.month()) {
        let pages_read = pages_by_day.get(&date).copied().unwrap_or(0);
        cells.push(CalendarCell::Day(CalendarDay {
            date,
            pages_read,
            intensity: Intensity::from_pages(pages_read),
            is_future: date > today,
            is_before_account_start: date < anchor,
        }));
    }

    CalendarMonth {
        year: first.year(),
        month: first.month(),
        days: cells,
    }
}
