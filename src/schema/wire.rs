//! Backend payload shapes
//!
//! Field names follow the JSON returned by the activity and book endpoints
//! (camelCase). Unknown fields are ignored so full book DTOs can be passed
//! through unchanged.

use crate::error::AnalyticsError;
use crate::normalizer::{parse_local_instant, ReferenceOffset};
use crate::types::{BookRecord, BookStatus, PeriodPages};
use serde::{Deserialize, Serialize};

/// `GET activities/dates`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDatesResponse {
    /// Distinct days with any reading activity
    #[serde(default)]
    pub activity_dates: Vec<String>,
}

/// `GET activities/daily-stats`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStatsResponse {
    #[serde(default)]
    pub daily_stats: Option<Vec<DailyStat>>,
}

/// One day of the trailing daily-stats series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: String,
    pub pages: i64,
}

/// `GET activities/period-stats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStatsResponse {
    #[serde(default)]
    pub pages_this_week: i64,
    #[serde(default)]
    pub pages_this_month: i64,
    #[serde(default)]
    pub pages_this_year: i64,
}

impl From<PeriodStatsResponse> for PeriodPages {
    fn from(response: PeriodStatsResponse) -> Self {
        let clamp = |pages: i64| u64::try_from(pages).unwrap_or(0);
        PeriodPages {
            pages_this_week: clamp(response.pages_this_week),
            pages_this_month: clamp(response.pages_this_month),
            pages_this_year: clamp(response.pages_this_year),
        }
    }
}

/// Book as returned by the book API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub status: String,
    pub total_pages: i64,
    #[serde(default)]
    pub pages_read: i64,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub complete_date: Option<String>,
}

impl BookPayload {
    /// Validate the payload and convert it into a [`BookRecord`].
    ///
    /// Date-only start and completion dates are local to `offset`.
    pub fn validate(&self, offset: ReferenceOffset) -> Result<BookRecord, ValidationError> {
        let status = BookStatus::from_wire(&self.status)
            .ok_or_else(|| ValidationError::UnknownStatus(self.status.clone()))?;

        let total_pages = u32::try_from(self.total_pages)
            .ok()
            .filter(|pages| *pages > 0)
            .ok_or(ValidationError::InvalidTotalPages(self.total_pages))?;

        let pages_read = u32::try_from(self.pages_read)
            .ok()
            .filter(|pages| *pages <= total_pages)
            .ok_or(ValidationError::InvalidPagesRead {
                pages_read: self.pages_read,
                total_pages: self.total_pages,
            })?;

        let mut record = BookRecord::new(status, total_pages, pages_read)
            .map_err(|e| ValidationError::Record(e.to_string()))?;

        if let Some(raw) = non_blank(self.start_date.as_deref()) {
            let start = parse_local_instant(raw, offset)
                .map_err(|_| ValidationError::InvalidDate(raw.to_string()))?;
            record = record.with_start_date(start);
        }
        if let Some(raw) = non_blank(self.complete_date.as_deref()) {
            let complete = parse_local_instant(raw, offset)
                .map_err(|_| ValidationError::InvalidDate(raw.to_string()))?;
            record = record.with_complete_date(complete);
        }

        Ok(record)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Validation errors for backend payloads
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Unknown book status: {0}")]
    UnknownStatus(String),

    #[error("Total pages must be positive, got {0}")]
    InvalidTotalPages(i64),

    #[error("Pages read {pages_read} outside 0..={total_pages}")]
    InvalidPagesRead { pages_read: i64, total_pages: i64 },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("{0}")]
    Record(String),
}

impl From<ValidationError> for AnalyticsError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::InvalidDate(raw) => AnalyticsError::InvalidTimestamp(raw),
            other => AnalyticsError::InvalidBook(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::to_canonical_day;
    use chrono::NaiveDate;

    fn payload(status: &str, total: i64, read: i64) -> BookPayload {
        BookPayload {
            status: status.to_string(),
            total_pages: total,
            pages_read: read,
            start_date: None,
            complete_date: None,
        }
    }

    #[test]
    fn test_deserialize_book_dto_ignores_extra_fields() {
        let json = r#"{
            "id": 42,
            "title": "Dune",
            "author": "Frank Herbert",
            "status": "FINISHED",
            "totalPages": 412,
            "pagesRead": 412,
            "startDate": "2024-01-02",
            "completeDate": "2024-02-10",
            "tags": ["scifi"]
        }"#;

        let book: BookPayload = serde_json::from_str(json).unwrap();
        let record = book.validate(ReferenceOffset::default()).unwrap();
        assert_eq!(record.status(), BookStatus::Finished);
        assert_eq!(record.total_pages(), 412);
        assert!(record.start_date().is_some());
        assert!(record.finished_at().is_some());
    }

    #[test]
    fn test_validation_failures() {
        assert_eq!(
            payload("PAUSED", 10, 0).validate(ReferenceOffset::default()),
            Err(ValidationError::UnknownStatus("PAUSED".to_string()))
        );
        assert_eq!(
            payload("READING", 0, 0).validate(ReferenceOffset::default()),
            Err(ValidationError::InvalidTotalPages(0))
        );
        assert!(matches!(
            payload("READING", 10, 11).validate(ReferenceOffset::default()),
            Err(ValidationError::InvalidPagesRead { .. })
        ));
        assert!(matches!(
            payload("READING", 10, -1).validate(ReferenceOffset::default()),
            Err(ValidationError::InvalidPagesRead { .. })
        ));

        let mut bad_date = payload("READING", 10, 1);
        bad_date.start_date = Some("last tuesday".to_string());
        let err: AnalyticsError = bad_date
            .validate(ReferenceOffset::default())
            .unwrap_err()
            .into();
        assert!(matches!(err, AnalyticsError::InvalidTimestamp(_)));
    }

    #[test]
    fn test_date_only_book_dates_stay_on_their_day_west_of_utc() {
        let new_york = ReferenceOffset::new(-300).unwrap();
        let mut book = payload("FINISHED", 10, 10);
        book.start_date = Some("2024-01-01".to_string());
        book.complete_date = Some("2024-06-01".to_string());

        let record = book.validate(new_york).unwrap();
        let start = record.start_date().unwrap();
        let finished = record.finished_at().unwrap();
        assert_eq!(to_canonical_day(start, new_york), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(
            to_canonical_day(finished, new_york),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
    }

    #[test]
    fn test_blank_dates_are_absent() {
        let mut book = payload("WANT_TO_READ", 10, 0);
        book.start_date = Some("  ".to_string());
        let record = book.validate(ReferenceOffset::default()).unwrap();
        assert_eq!(record.start_date(), None);
    }

    #[test]
    fn test_period_stats_clamps_negative_pages() {
        let response: PeriodStatsResponse =
            serde_json::from_str(r#"{"pagesThisWeek": 12, "pagesThisMonth": -4}"#).unwrap();
        let pages = PeriodPages::from(response);
        assert_eq!(pages.pages_this_week, 12);
        assert_eq!(pages.pages_this_month, 0);
        assert_eq!(pages.pages_this_year, 0);
    }
}
