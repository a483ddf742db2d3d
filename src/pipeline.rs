//! Engine orchestration
//!
//! This module provides the public API for readpulse. It composes the stages
//! (day bucketing, streaks, periods, pace, calendar) into derived stats and
//! heatmap grids for one snapshot.
//!
//! Every free function here is pure: the same inputs and the same canonical
//! "today" always produce the same output. [`AnalyticsProcessor`] adds a
//! content-keyed cache on top for callers that recompute on every render.

use crate::cache::{snapshot_key, CacheStats, SnapshotCache};
use crate::calendar::{resolve_anchor, CalendarBuilder};
use crate::config::EngineConfig;
use crate::encoder::ReportEncoder;
use crate::error::{AnalyticsError, Result};
use crate::normalizer::{to_canonical_day, ReferenceOffset};
use crate::pace::compute_pace;
use crate::periods::{resolve_daily_window, PeriodAggregator, PeriodWindows};
use crate::schema::{SnapshotAdapter, SnapshotSources};
use crate::streak::StreakCalculator;
use crate::types::{
    ActivityDay, ActivityDayKey, AnalyticsOutput, AnalyticsReport, BookRecord, BookStatus,
    DerivedStats, GoalProgress, PeriodPages, ReadingGoal, ReadingSnapshot,
};
use chrono::{DateTime, Datelike, Utc};
use tracing::{debug, info_span};

/// Compute derived stats for a set of books and activity days.
///
/// Periods use pages summed from `activity`. Use [`analyze`] to prefer the
/// backend-reported period pages carried by a [`ReadingSnapshot`].
pub fn compute_derived_stats(
    books: &[BookRecord],
    activity: &[ActivityDay],
    goal: Option<&ReadingGoal>,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> DerivedStats {
    let today = config.bucketer().today(now);
    derive_for_day(books, activity, None, goal, today, config)
}

/// Assemble a snapshot from backend payloads and analyze it
pub fn analyze_sources(
    sources: SnapshotSources<'_>,
    goal: Option<&ReadingGoal>,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Result<AnalyticsOutput> {
    let snapshot = SnapshotAdapter::to_snapshot(sources, config.offset())?;
    Ok(analyze(&snapshot, goal, now, config))
}

/// Progress toward a yearly goal from the books finished in that year
pub fn goal_progress(
    books: &[BookRecord],
    goal: &ReadingGoal,
    offset: ReferenceOffset,
) -> GoalProgress {
    let books_completed = books
        .iter()
        .filter_map(BookRecord::finished_at)
        .filter(|finished_at| to_canonical_day(*finished_at, offset).year() == goal.year)
        .count() as u32;

    let progress_percentage = if goal.target_books == 0 {
        0.0
    } else {
        (f64::from(books_completed) * 100.0 / f64::from(goal.target_books)).min(100.0)
    };

    GoalProgress {
        year: goal.year,
        target_books: goal.target_books,
        books_completed,
        progress_percentage,
        completed: goal.target_books > 0 && books_completed >= goal.target_books,
    }
}

/// Run the full engine over a snapshot: stats, calendar months and the
/// trailing seven-day page series
pub fn analyze(
    snapshot: &ReadingSnapshot,
    goal: Option<&ReadingGoal>,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> AnalyticsOutput {
    let today = config.bucketer().today(now);
    let _span = info_span!("analyze", %today).entered();

    let stats = derive_for_day(
        &snapshot.books,
        &snapshot.activity,
        snapshot.reported_period_pages,
        goal,
        today,
        config,
    );

    let anchor = resolve_anchor(
        snapshot.account_created_at,
        &snapshot.activity,
        now,
        config.offset(),
    );
    let calendar = CalendarBuilder::build(&snapshot.activity, anchor, today);
    let daily_window = resolve_daily_window(snapshot.reported_daily_pages.as_deref(), today);

    AnalyticsOutput {
        stats,
        calendar,
        daily_window,
    }
}

fn derive_for_day(
    books: &[BookRecord],
    activity: &[ActivityDay],
    reported_pages: Option<PeriodPages>,
    goal: Option<&ReadingGoal>,
    today: ActivityDayKey,
    config: &EngineConfig,
) -> DerivedStats {
    let offset = config.offset();

    let completed_count = count_status(books, BookStatus::Finished);
    let reading_count = count_status(books, BookStatus::Reading);
    let total_pages_read: u64 = books.iter().map(|book| u64::from(book.pages_read())).sum();
    let avg_pages_per_book = if books.is_empty() {
        0
    } else {
        (total_pages_read as f64 / books.len() as f64).round() as u32
    };

    let streaks = StreakCalculator::compute(activity.iter().map(|day| day.date), today);

    let windows = PeriodWindows::anchored(today, config.week_window_days);
    let mut periods = PeriodAggregator::aggregate(books, activity, &windows, offset);
    if let Some(reported) = reported_pages {
        periods = periods.with_reported_pages(reported);
    }

    let reading_pace = compute_pace(books, today, offset);
    let goal = goal.map(|goal| goal_progress(books, goal, offset));

    debug!(
        books = books.len(),
        activity_days = activity.len(),
        completed_count,
        reading_count,
        "derived stats"
    );

    DerivedStats {
        completed_count,
        reading_count,
        total_pages_read,
        books_this_week: periods.books_this_week,
        books_this_month: periods.books_this_month,
        books_this_year: periods.books_this_year,
        pages_this_week: periods.pages_this_week,
        pages_this_month: periods.pages_this_month,
        pages_this_year: periods.pages_this_year,
        current_streak: streaks.current,
        longest_streak: streaks.longest,
        avg_pages_per_book,
        reading_pace,
        goal,
    }
}

fn count_status(books: &[BookRecord], status: BookStatus) -> u32 {
    books.iter().filter(|book| book.status() == status).count() as u32
}

/// Stateful processor that memoizes output per snapshot.
///
/// Use this when the same snapshot is analyzed repeatedly, e.g. on every
/// render of a dashboard.
pub struct AnalyticsProcessor {
    config: EngineConfig,
    cache: SnapshotCache,
    encoder: ReportEncoder,
}

impl Default for AnalyticsProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsProcessor {
    /// Create a new processor with default settings
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create a processor with a specific configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            cache: SnapshotCache::new(config.cache_capacity),
            encoder: ReportEncoder::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze a snapshot, reusing cached output for identical input on the same day
    pub fn analyze(
        &mut self,
        snapshot: &ReadingSnapshot,
        goal: Option<&ReadingGoal>,
        now: DateTime<Utc>,
    ) -> Result<AnalyticsOutput> {
        let today = self.config.bucketer().today(now);
        let key = snapshot_key(snapshot, goal, today, &self.config)?;
        Ok(self.analyze_keyed(key, snapshot, goal, now))
    }

    /// Analyze a snapshot and wrap the result in a report envelope
    pub fn report(
        &mut self,
        snapshot: &ReadingSnapshot,
        goal: Option<&ReadingGoal>,
        now: DateTime<Utc>,
    ) -> Result<AnalyticsReport> {
        let today = self.config.bucketer().today(now);
        let offset = self.config.offset();
        let key = snapshot_key(snapshot, goal, today, &self.config)?;
        let output = self.analyze_keyed(key.clone(), snapshot, goal, now);
        Ok(self.encoder.encode(&output, &key, today, offset))
    }

    /// Analyze a snapshot and encode the report as pretty JSON
    pub fn report_json(
        &mut self,
        snapshot: &ReadingSnapshot,
        goal: Option<&ReadingGoal>,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let report = self.report(snapshot, goal, now)?;
        serde_json::to_string_pretty(&report).map_err(|e| AnalyticsError::Encoding(e.to_string()))
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Load cache state from JSON, keeping this processor's capacity
    pub fn load_cache(&mut self, json: &str) -> Result<()> {
        let mut cache = SnapshotCache::from_json(json)?;
        cache.set_capacity(self.config.cache_capacity);
        self.cache = cache;
        Ok(())
    }

    /// Save cache state to JSON
    pub fn save_cache(&self) -> Result<String> {
        self.cache.to_json()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn analyze_keyed(
        &mut self,
        key: String,
        snapshot: &ReadingSnapshot,
        goal: Option<&ReadingGoal>,
        now: DateTime<Utc>,
    ) -> AnalyticsOutput {
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }
        let output = analyze(snapshot, goal, now, &self.config);
        self.cache.insert(key, output.clone());
        output
    }
}
