//! Day bucketing
//!
//! This module maps instants onto canonical calendar days in a fixed reference
//! timezone. Every other stage works on these days, so "now" and historical
//! timestamps are always bucketed the same way.
//! - Instants are shifted by a fixed offset and truncated to a date
//! - Date-only strings are already canonical and are taken verbatim
//! - Unparseable values are rejected, never coerced

use crate::error::{AnalyticsError, Result};
use crate::types::ActivityDayKey;
use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Largest offset from UTC accepted for the reference timezone (UTC±14:00)
pub const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Default reference offset: UTC+5:30
pub const DEFAULT_OFFSET_MINUTES: i32 = 330;

const DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Fixed offset of the reference timezone, in minutes east of UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct ReferenceOffset(i32);

impl TryFrom<i32> for ReferenceOffset {
    type Error = AnalyticsError;

    fn try_from(minutes: i32) -> Result<Self> {
        ReferenceOffset::new(minutes)
    }
}

impl From<ReferenceOffset> for i32 {
    fn from(offset: ReferenceOffset) -> Self {
        offset.0
    }
}

impl Default for ReferenceOffset {
    fn default() -> Self {
        ReferenceOffset(DEFAULT_OFFSET_MINUTES)
    }
}

impl ReferenceOffset {
    pub fn new(minutes: i32) -> Result<Self> {
        if minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(AnalyticsError::Config(format!(
                "reference offset {minutes} minutes is outside ±{MAX_OFFSET_MINUTES}"
            )));
        }
        Ok(ReferenceOffset(minutes))
    }

    pub fn utc() -> Self {
        ReferenceOffset(0)
    }

    pub fn minutes(&self) -> i32 {
        self.0
    }
}

/// Buckets instants into canonical days for one reference offset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayBucketer {
    offset: ReferenceOffset,
}

impl DayBucketer {
    pub fn new(offset: ReferenceOffset) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> ReferenceOffset {
        self.offset
    }

    /// Canonical day of an instant
    pub fn canonical_day(&self, instant: DateTime<Utc>) -> ActivityDayKey {
        to_canonical_day(instant, self.offset)
    }

    /// Canonical "today" for the given "now"
    pub fn today(&self, now: DateTime<Utc>) -> ActivityDayKey {
        self.canonical_day(now)
    }

    /// Parse a raw date or timestamp straight to its canonical day
    pub fn parse_day(&self, raw: &str) -> Result<ActivityDayKey> {
        parse_day(raw, self.offset)
    }
}

/// Shift an instant by the reference offset and truncate to its date
pub fn to_canonical_day(instant: DateTime<Utc>, offset: ReferenceOffset) -> ActivityDayKey {
    let shifted = instant + Duration::minutes(i64::from(offset.minutes()));
    shifted.date_naive()
}

/// Start of the canonical day containing `instant`.
///
/// Alias of [`to_canonical_day`]; both "now" and stored timestamps go through
/// the same path.
pub fn start_of_day(instant: DateTime<Utc>, offset: ReferenceOffset) -> ActivityDayKey {
    to_canonical_day(instant, offset)
}

/// Parse an ISO-8601 instant.
///
/// Accepts RFC 3339, naive date-times (read as UTC) and bare dates (UTC
/// midnight).
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    let value = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
    }

    Err(AnalyticsError::InvalidTimestamp(raw.to_string()))
}

/// Parse an instant whose date-only form means local midnight in the reference
/// timezone, so the canonical day of the result is always that date.
///
/// Book dates arrive as plain dates; other forms behave as [`parse_instant`].
pub fn parse_local_instant(raw: &str, offset: ReferenceOffset) -> Result<DateTime<Utc>> {
    let value = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            let local = Utc.from_utc_datetime(&midnight);
            return Ok(local - Duration::minutes(i64::from(offset.minutes())));
        }
    }

    parse_instant(value)
}

/// Parse a raw value to a canonical day
pub fn parse_day(raw: &str, offset: ReferenceOffset) -> Result<ActivityDayKey> {
    let value = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Ok(date);
    }

    let instant = parse_instant(value)?;
    let day = to_canonical_day(instant, offset);
    trace!(raw = value, %day, "bucketed timestamp");
    Ok(day)
}

/// Whole days from `from` to `to` (negative when `to` is earlier)
pub fn days_between(from: ActivityDayKey, to: ActivityDayKey) -> i64 {
    (to - from).num_days()
}

/// First day of a trailing window of `window_days` days ending at `today`
pub fn week_start(today: ActivityDayKey, window_days: u32) -> ActivityDayKey {
    let back = u64::from(window_days.saturating_sub(1));
    today.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN)
}

pub fn month_start(day: ActivityDayKey) -> ActivityDayKey {
    day.with_day(1).unwrap_or(day)
}

pub fn year_start(day: ActivityDayKey) -> ActivityDayKey {
    NaiveDate::from_yo_opt(day.year(), 1).unwrap_or(day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn instant(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_offset_moves_late_utc_evening_to_next_day() {
        let ist = ReferenceOffset::default();
        // 20:00 UTC is 01:30 the next day at +5:30
        assert_eq!(
            to_canonical_day(instant("2024-03-01T20:00:00Z"), ist),
            day(2024, 3, 2)
        );
        assert_eq!(
            to_canonical_day(instant("2024-03-01T18:29:59Z"), ist),
            day(2024, 3, 1)
        );
        assert_eq!(
            to_canonical_day(instant("2024-03-01T20:00:00Z"), ReferenceOffset::utc()),
            day(2024, 3, 1)
        );
    }

    #[test]
    fn test_negative_offset() {
        let new_york = ReferenceOffset::new(-300).unwrap();
        assert_eq!(
            to_canonical_day(instant("2024-03-02T03:00:00Z"), new_york),
            day(2024, 3, 1)
        );
    }

    #[test]
    fn test_offset_bounds() {
        assert!(ReferenceOffset::new(840).is_ok());
        assert!(ReferenceOffset::new(-840).is_ok());
        assert!(ReferenceOffset::new(841).is_err());
    }

    #[test]
    fn test_offset_deserialization_is_validated() {
        let offset: ReferenceOffset = serde_json::from_str("-300").unwrap();
        assert_eq!(offset.minutes(), -300);
        assert!(serde_json::from_str::<ReferenceOffset>("900").is_err());
        assert_eq!(serde_json::to_string(&ReferenceOffset::default()).unwrap(), "330");
    }

    #[test]
    fn test_parse_instant_formats() {
        assert_eq!(
            parse_instant("2024-01-11T10:00:00+05:30").unwrap(),
            instant("2024-01-11T04:30:00Z")
        );
        assert_eq!(
            parse_instant("2024-01-11T10:00:00").unwrap(),
            instant("2024-01-11T10:00:00Z")
        );
        assert_eq!(
            parse_instant("2024-01-11 10:00:00.250").unwrap(),
            instant("2024-01-11T10:00:00.250Z")
        );
        assert_eq!(
            parse_instant(" 2024-01-11 ").unwrap(),
            instant("2024-01-11T00:00:00Z")
        );
    }

    #[test]
    fn test_invalid_timestamp_is_rejected() {
        match parse_instant("yesterday") {
            Err(AnalyticsError::InvalidTimestamp(raw)) => assert_eq!(raw, "yesterday"),
            other => panic!("expected InvalidTimestamp, got {other:?}"),
        }
        assert!(parse_day("2024-13-01", ReferenceOffset::default()).is_err());
    }

    #[test]
    fn test_date_only_values_are_canonical() {
        // A bare date never shifts, even for offsets west of UTC
        let west = ReferenceOffset::new(-480).unwrap();
        assert_eq!(parse_day("2024-03-01", west).unwrap(), day(2024, 3, 1));
        assert_eq!(
            parse_day("2024-03-01T20:00:00Z", ReferenceOffset::default()).unwrap(),
            day(2024, 3, 2)
        );
    }

    #[test]
    fn test_local_instant_keeps_date_only_values_on_their_day() {
        for minutes in [-720, -300, 0, 330, 840] {
            let offset = ReferenceOffset::new(minutes).unwrap();
            let instant = parse_local_instant("2024-01-01", offset).unwrap();
            assert_eq!(to_canonical_day(instant, offset), day(2024, 1, 1), "offset {minutes}");
        }
        assert_eq!(
            parse_local_instant("2024-01-01", ReferenceOffset::new(-300).unwrap()).unwrap(),
            instant("2024-01-01T05:00:00Z")
        );
        assert_eq!(
            parse_local_instant("2024-01-01T10:00:00Z", ReferenceOffset::new(-300).unwrap())
                .unwrap(),
            instant("2024-01-01T10:00:00Z")
        );
        assert!(parse_local_instant("soon", ReferenceOffset::default()).is_err());
    }

    #[test]
    fn test_bucketer_today_matches_historical_bucketing() {
        let bucketer = DayBucketer::default();
        let now = instant("2024-06-20T19:00:00Z");
        assert_eq!(bucketer.today(now), bucketer.canonical_day(now));
        assert_eq!(bucketer.today(now), day(2024, 6, 21));
        assert_eq!(start_of_day(now, bucketer.offset()), day(2024, 6, 21));
    }

    #[test]
    fn test_window_boundaries() {
        let today = day(2024, 6, 20);
        assert_eq!(week_start(today, 7), day(2024, 6, 14));
        assert_eq!(week_start(today, 1), today);
        assert_eq!(month_start(today), day(2024, 6, 1));
        assert_eq!(year_start(today), day(2024, 1, 1));
        assert_eq!(week_start(day(2024, 3, 3), 7), day(2024, 2, 26));
    }

    #[test]
    fn test_days_between() {
        assert_eq!(days_between(day(2024, 1, 1), day(2024, 1, 11)), 10);
        assert_eq!(days_between(day(2024, 1, 11), day(2024, 1, 1)), -10);
        assert_eq!(days_between(day(2024, 2, 28), day(2024, 3, 1)), 2);
    }
}
