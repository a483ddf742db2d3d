//! Adapter from backend payloads to a [`ReadingSnapshot`]
//!
//! Books and activity dates are strict: a bad date or page count is an error.
//! Daily stats are supplementary and degrade gracefully: a malformed response
//! or entry is dropped with a warning instead of failing the snapshot.

use crate::error::{AnalyticsError, Result};
use crate::normalizer::{parse_day, parse_local_instant, ReferenceOffset};
use crate::schema::wire::*;
use crate::types::{ActivityDay, ActivityDayKey, BookRecord, ReadingSnapshot};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Raw payloads collected from the external collaborators
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotSources<'a> {
    pub books: &'a [BookPayload],
    pub activity_dates: Option<&'a ActivityDatesResponse>,
    pub daily_stats: Option<&'a DailyStatsResponse>,
    pub period_stats: Option<&'a PeriodStatsResponse>,
    pub account_created_at: Option<&'a str>,
}

/// Adapter for converting backend payloads into engine input
pub struct SnapshotAdapter;

impl SnapshotAdapter {
    /// Parse a JSON array of book DTOs
    pub fn parse_books(json: &str) -> Result<Vec<BookPayload>> {
        let books: Vec<BookPayload> = serde_json::from_str(json)?;
        Ok(books)
    }

    /// Parse the `activities/dates` response
    pub fn parse_activity_dates(json: &str) -> Result<ActivityDatesResponse> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse the `activities/daily-stats` response, `None` when malformed
    pub fn parse_daily_stats(json: &str) -> Option<DailyStatsResponse> {
        match serde_json::from_str(json) {
            Ok(response) => Some(response),
            Err(e) => {
                warn!(error = %e, "ignoring malformed daily stats response");
                None
            }
        }
    }

    /// Parse the `activities/period-stats` response
    pub fn parse_period_stats(json: &str) -> Result<PeriodStatsResponse> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate book payloads, failing on the first invalid one
    pub fn to_books(payloads: &[BookPayload], offset: ReferenceOffset) -> Result<Vec<BookRecord>> {
        payloads
            .iter()
            .enumerate()
            .map(|(index, payload)| {
                payload.validate(offset).map_err(|e| {
                    debug!(index, error = %e, "rejected book payload");
                    AnalyticsError::from(e)
                })
            })
            .collect()
    }

    /// Merge activity dates and daily page figures into distinct activity days.
    ///
    /// Every activity date becomes a day (pages 0 unless known). Daily stats
    /// entries only add a day when they carry pages, so a zero-filled series
    /// never invents activity.
    pub fn to_activity(
        dates: Option<&ActivityDatesResponse>,
        daily: Option<&DailyStatsResponse>,
        offset: ReferenceOffset,
    ) -> Result<Vec<ActivityDay>> {
        let mut pages_by_day: BTreeMap<ActivityDayKey, u32> = BTreeMap::new();

        for raw in dates.map(|d| d.activity_dates.as_slice()).unwrap_or_default() {
            let day = parse_day(raw, offset)?;
            pages_by_day.entry(day).or_insert(0);
        }

        let stats = daily
            .and_then(|d| d.daily_stats.as_deref())
            .unwrap_or_default();
        for stat in stats {
            let Ok(day) = parse_day(&stat.date, offset) else {
                warn!(date = %stat.date, "skipping daily stat with invalid date");
                continue;
            };
            match u32::try_from(stat.pages) {
                Ok(0) => {}
                Ok(pages) => {
                    pages_by_day.insert(day, pages);
                }
                Err(_) => warn!(date = %stat.date, pages = stat.pages, "skipping negative daily stat"),
            }
        }

        Ok(pages_by_day
            .into_iter()
            .map(|(date, pages)| ActivityDay::new(date, pages))
            .collect())
    }

    /// Parse the trailing daily-stats series as reported.
    ///
    /// Returns `None` when the series is missing or any entry has an invalid
    /// date or negative pages; the period stage then falls back to an empty
    /// week.
    pub fn to_daily_series(
        daily: Option<&DailyStatsResponse>,
        offset: ReferenceOffset,
    ) -> Option<Vec<ActivityDay>> {
        let stats = daily?.daily_stats.as_ref()?;
        let mut series = Vec::with_capacity(stats.len());
        for stat in stats {
            let parsed = (parse_day(&stat.date, offset), u32::try_from(stat.pages));
            let (Ok(date), Ok(pages)) = parsed else {
                warn!(date = %stat.date, pages = stat.pages, "discarding malformed daily series");
                return None;
            };
            series.push(ActivityDay::new(date, pages));
        }
        Some(series)
    }

    /// Assemble a snapshot from every collected payload
    pub fn to_snapshot(sources: SnapshotSources<'_>, offset: ReferenceOffset) -> Result<ReadingSnapshot> {
        let books = Self::to_books(sources.books, offset)?;
        let activity = Self::to_activity(sources.activity_dates, sources.daily_stats, offset)?;
        let account_created_at = sources
            .account_created_at
            .map(|raw| parse_local_instant(raw, offset))
            .transpose()?;

        debug!(
            books = books.len(),
            activity_days = activity.len(),
            "assembled reading snapshot"
        );

        Ok(ReadingSnapshot {
            books,
            activity,
            account_created_at,
            reported_period_pages: sources.period_stats.copied().map(Into::into),
            reported_daily_pages: Self::to_daily_series(sources.daily_stats, offset),
        })
    }
}
