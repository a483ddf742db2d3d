//! Period aggregation
//!
//! This module counts completed books and sums pages over the week, month and
//! year windows anchored to canonical "today". Windows overlap: a book
//! finished today counts toward all three.

use crate::normalizer::{month_start, to_canonical_day, week_start, year_start, ReferenceOffset};
use crate::types::{ActivityDay, ActivityDayKey, BookRecord, Period, PeriodTotals};
use chrono::{DateTime, Days, Utc};
use tracing::{debug, trace, warn};

/// Default length of the trailing week window in days
pub const DEFAULT_WEEK_WINDOW_DAYS: u32 = 7;

/// Number of entries the backend `daily-stats` endpoint returns
pub const DAILY_STATS_WINDOW: usize = 7;

/// Window boundaries for one canonical "today"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindows {
    pub today: ActivityDayKey,
    pub week_start: ActivityDayKey,
    pub month_start: ActivityDayKey,
    pub year_start: ActivityDayKey,
}

impl PeriodWindows {
    pub fn anchored(today: ActivityDayKey, week_window_days: u32) -> Self {
        Self {
            today,
            week_start: week_start(today, week_window_days),
            month_start: month_start(today),
            year_start: year_start(today),
        }
    }

    pub fn start(&self, period: Period) -> ActivityDayKey {
        match period {
            Period::Week => self.week_start,
            Period::Month => self.month_start,
            Period::Year => self.year_start,
        }
    }

    /// Whether `day` falls inside the window, today inclusive
    pub fn contains(&self, period: Period, day: ActivityDayKey) -> bool {
        day >= self.start(period) && day <= self.today
    }
}

/// Aggregator for period-windowed counts and pages
pub struct PeriodAggregator;

impl PeriodAggregator {
    /// Aggregate completed books and per-day pages over every window
    pub fn aggregate(
        books: &[BookRecord],
        daily_pages: &[ActivityDay],
        windows: &PeriodWindows,
        offset: ReferenceOffset,
    ) -> PeriodTotals {
        let finished_days: Vec<ActivityDayKey> = books
            .iter()
            .filter_map(BookRecord::finished_at)
            .map(|finished_at| to_canonical_day(finished_at, offset))
            .collect();

        let mut totals = PeriodTotals::default();
        for period in Period::ALL {
            let books = finished_days
                .iter()
                .filter(|day| windows.contains(period, **day))
                .count() as u32;
            let pages: u64 = daily_pages
                .iter()
                .filter(|activity| windows.contains(period, activity.date))
                .map(|activity| u64::from(activity.pages_read))
                .sum();

            trace!(
                period = period.as_str(),
                start = %windows.start(period),
                books,
                pages,
                "period window"
            );
            totals.set(period, books, pages);
        }

        debug!(
            today = %windows.today,
            books_week = totals.books(Period::Week),
            books_month = totals.books(Period::Month),
            books_year = totals.books(Period::Year),
            pages_week = totals.pages(Period::Week),
            "aggregated periods"
        );

        totals
    }
}

/// Aggregate periods anchored to `now` in the reference timezone
pub fn aggregate(
    books: &[BookRecord],
    daily_pages: &[ActivityDay],
    now: DateTime<Utc>,
    offset: ReferenceOffset,
    week_window_days: u32,
) -> PeriodTotals {
    let today = to_canonical_day(now, offset);
    let windows = PeriodWindows::anchored(today, week_window_days);
    PeriodAggregator::aggregate(books, daily_pages, &windows, offset)
}

/// Trailing seven-day page series for display.
///
/// Uses the backend series when it is present and complete; otherwise
/// synthesizes seven zero-page days ending today.
pub fn resolve_daily_window(
    reported: Option<&[ActivityDay]>,
    today: ActivityDayKey,
) -> Vec<ActivityDay> {
    match reported {
        Some(series) if series.len() == DAILY_STATS_WINDOW => {
            let mut window = series.to_vec();
            window.sort();
            window
        }
        _ => {
            warn!(%today, "daily stats missing or malformed, using empty week");
            empty_week(today)
        }
    }
}

fn empty_week(today: ActivityDayKey) -> Vec<ActivityDay> {
    (0..DAILY_STATS_WINDOW as u64)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(ActivityDay::marker)
        .collect()
}
