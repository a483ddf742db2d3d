//! Reading pace
//!
//! Whole-library average of pages read per elapsed day since the earliest
//! start date of any book being read or already finished.

use crate::normalizer::{days_between, to_canonical_day, ReferenceOffset};
use crate::types::{ActivityDayKey, BookRecord};
use tracing::debug;

/// Compute pages per day, or `None` when no active book has a start date.
///
/// Elapsed time is measured between canonical days and never drops below one
/// day. Pages are summed across every book, not only the active ones.
pub fn compute_pace(
    books: &[BookRecord],
    today: ActivityDayKey,
    offset: ReferenceOffset,
) -> Option<u32> {
    let earliest_start = books
        .iter()
        .filter(|book| book.status().is_active())
        .filter_map(BookRecord::start_date)
        .map(|start| to_canonical_day(start, offset))
        .min()?;

    let elapsed_days = days_between(earliest_start, today).max(1);
    let total_pages: u64 = books.iter().map(|book| u64::from(book.pages_read())).sum();

    let pace = (total_pages as f64 / elapsed_days as f64).round() as u32;
    debug!(%earliest_start, elapsed_days, total_pages, pace, "computed reading pace");
    Some(pace)
}
