//! Core types for the readpulse engine
//!
//! This module defines the data structures that flow through each stage of the
//! engine: raw book and activity records, the intermediate streak/period
//! summaries, and the derived stats and calendar grids handed to presentation.

use crate::error::{AnalyticsError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Canonical calendar day in the reference timezone
pub type ActivityDayKey = NaiveDate;

/// One canonical day of reading activity with the pages read that day.
///
/// Equality, ordering and hashing only look at the date, so a set of
/// `ActivityDay`s never holds the same day twice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDay {
    pub date: ActivityDayKey,
    pub pages_read: u32,
}

impl ActivityDay {
    pub fn new(date: ActivityDayKey, pages_read: u32) -> Self {
        Self { date, pages_read }
    }

    /// A day with recorded activity but no known page count
    pub fn marker(date: ActivityDayKey) -> Self {
        Self::new(date, 0)
    }
}

impl PartialEq for ActivityDay {
    fn eq(&self, other: &Self) -> bool {
        self.date == other.date
    }
}

impl Eq for ActivityDay {}

impl PartialOrd for ActivityDay {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ActivityDay {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date.cmp(&other.date)
    }
}

impl Hash for ActivityDay {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.date.hash(state);
    }
}

/// Reading status of a tracked book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookStatus {
    WantToRead,
    Reading,
    Finished,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::WantToRead => "WANT_TO_READ",
            BookStatus::Reading => "READING",
            BookStatus::Finished => "FINISHED",
        }
    }

    /// Parse the wire name used by the book API
    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "WANT_TO_READ" => Some(BookStatus::WantToRead),
            "READING" => Some(BookStatus::Reading),
            "FINISHED" => Some(BookStatus::Finished),
            _ => None,
        }
    }

    /// Whether a book in this status contributes to reading pace
    pub fn is_active(&self) -> bool {
        matches!(self, BookStatus::Reading | BookStatus::Finished)
    }
}

/// Read-only snapshot of one tracked book.
///
/// Construction enforces `total_pages > 0` and `pages_read <= total_pages`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    status: BookStatus,
    total_pages: u32,
    pages_read: u32,
    start_date: Option<DateTime<Utc>>,
    complete_date: Option<DateTime<Utc>>,
}

impl BookRecord {
    pub fn new(status: BookStatus, total_pages: u32, pages_read: u32) -> Result<Self> {
        if total_pages == 0 {
            return Err(AnalyticsError::InvalidBook(
                "total pages must be greater than zero".to_string(),
            ));
        }
        if pages_read > total_pages {
            return Err(AnalyticsError::InvalidBook(format!(
                "pages read ({pages_read}) exceeds total pages ({total_pages})"
            )));
        }

        Ok(Self {
            status,
            total_pages,
            pages_read,
            start_date: None,
            complete_date: None,
        })
    }

    pub fn with_start_date(mut self, start_date: DateTime<Utc>) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn with_complete_date(mut self, complete_date: DateTime<Utc>) -> Self {
        self.complete_date = Some(complete_date);
        self
    }

    pub fn status(&self) -> BookStatus {
        self.status
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn pages_read(&self) -> u32 {
        self.pages_read
    }

    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    pub fn complete_date(&self) -> Option<DateTime<Utc>> {
        self.complete_date
    }

    /// Completion instant, only for books that are actually finished
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        match self.status {
            BookStatus::Finished => self.complete_date,
            _ => None,
        }
    }
}

/// Aggregation window anchored to "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Trailing window of canonical days, inclusive of today
    Week,
    /// First of the current month through today
    Month,
    /// January 1 through today
    Year,
}

impl Period {
    pub const ALL: [Period; 3] = [Period::Week, Period::Month, Period::Year];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }
}

/// Current and longest run of consecutive active days
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub current: u32,
    pub longest: u32,
}

/// Pages per period as reported by the backend `period-stats` endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodPages {
    pub pages_this_week: u64,
    pub pages_this_month: u64,
    pub pages_this_year: u64,
}

/// Completed-book counts and pages for each period window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTotals {
    pub books_this_week: u32,
    pub books_this_month: u32,
    pub books_this_year: u32,
    pub pages_this_week: u64,
    pub pages_this_month: u64,
    pub pages_this_year: u64,
}

impl PeriodTotals {
    pub fn books(&self, period: Period) -> u32 {
        match period {
            Period::Week => self.books_this_week,
            Period::Month => self.books_this_month,
            Period::Year => self.books_this_year,
        }
    }

    pub fn pages(&self, period: Period) -> u64 {
        match period {
            Period::Week => self.pages_this_week,
            Period::Month => self.pages_this_month,
            Period::Year => self.pages_this_year,
        }
    }

    /// Store the completed-book count and pages of one window
    pub fn set(&mut self, period: Period, books: u32, pages: u64) {
        match period {
            Period::Week => {
                self.books_this_week = books;
                self.pages_this_week = pages;
            }
            Period::Month => {
                self.books_this_month = books;
                self.pages_this_month = pages;
            }
            Period::Year => {
                self.books_this_year = books;
                self.pages_this_year = pages;
            }
        }
    }

    /// Replace the locally summed pages with backend-reported figures
    pub fn with_reported_pages(mut self, reported: PeriodPages) -> Self {
        self.pages_this_week = reported.pages_this_week;
        self.pages_this_month = reported.pages_this_month;
        self.pages_this_year = reported.pages_this_year;
        self
    }
}

/// Yearly reading goal set by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingGoal {
    pub year: i32,
    pub target_books: u32,
}

/// Progress toward a reading goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub year: i32,
    pub target_books: u32,
    pub books_completed: u32,
    /// Capped at 100
    pub progress_percentage: f64,
    pub completed: bool,
}

/// Derived reading statistics consumed by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStats {
    pub completed_count: u32,
    pub reading_count: u32,
    pub total_pages_read: u64,
    pub books_this_week: u32,
    pub books_this_month: u32,
    pub books_this_year: u32,
    pub pages_this_week: u64,
    pub pages_this_month: u64,
    pub pages_this_year: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub avg_pages_per_book: u32,
    /// Pages per day; `None` when no book has a start date yet
    pub reading_pace: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<GoalProgress>,
}

/// Heatmap intensity bin (0-5)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Intensity(u8);

impl Intensity {
    pub const MAX: Intensity = Intensity(5);

    /// Classify a day's page count
    pub fn from_pages(pages: u32) -> Self {
        let bin = match pages {
            0 => 0,
            1..=2 => 1,
            3..=4 => 2,
            5..=9 => 3,
            10..=14 => 4,
            _ => 5,
        };
        Intensity(bin)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

/// One real day in a calendar month grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: ActivityDayKey,
    pub pages_read: u32,
    pub intensity: Intensity,
    pub is_future: bool,
    pub is_before_account_start: bool,
}

/// A calendar grid cell: leading padding or a real day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalendarCell {
    Empty,
    Day(CalendarDay),
}

impl CalendarCell {
    pub fn as_day(&self) -> Option<&CalendarDay> {
        match self {
            CalendarCell::Empty => None,
            CalendarCell::Day(day) => Some(day),
        }
    }
}

/// One month of the heatmap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub year: i32,
    /// 1-based month number
    pub month: u32,
    pub days: Vec<CalendarCell>,
}

impl CalendarMonth {
    /// Real days of the month, skipping padding cells
    pub fn days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.days.iter().filter_map(CalendarCell::as_day)
    }

    /// Number of leading padding cells
    pub fn padding(&self) -> usize {
        self.days
            .iter()
            .take_while(|cell| matches!(cell, CalendarCell::Empty))
            .count()
    }

    /// Days with at least one page read
    pub fn active_days(&self) -> usize {
        self.days().filter(|day| day.pages_read > 0).count()
    }

    pub fn total_pages(&self) -> u64 {
        self.days().map(|day| u64::from(day.pages_read)).sum()
    }
}

/// Internally consistent input snapshot supplied by the data-access layer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingSnapshot {
    pub books: Vec<BookRecord>,
    pub activity: Vec<ActivityDay>,
    pub account_created_at: Option<DateTime<Utc>>,
    /// Backend `period-stats` figures, preferred over local sums when present
    pub reported_period_pages: Option<PeriodPages>,
    /// Backend trailing `daily-stats` series, `None` when missing or malformed
    pub reported_daily_pages: Option<Vec<ActivityDay>>,
}

/// Everything the engine derives from one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsOutput {
    pub stats: DerivedStats,
    pub calendar: Vec<CalendarMonth>,
    /// Pages per day for the trailing seven days, oldest first
    pub daily_window: Vec<ActivityDay>,
}

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Envelope handed to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_for_day: ActivityDayKey,
    pub reference_offset_minutes: i32,
    pub snapshot_key: String,
    pub stats: DerivedStats,
    pub calendar: Vec<CalendarMonth>,
    pub daily_window: Vec<ActivityDay>,
}
