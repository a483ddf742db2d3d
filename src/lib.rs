//! readpulse - Reading activity analytics engine
//!
//! readpulse turns a snapshot of a reader's books and activity days into
//! dashboard statistics through a deterministic pipeline: payload adaptation →
//! day bucketing → streaks, periods and pace → calendar heatmap → report
//! encoding.
//!
//! ## Modules
//!
//! - **Engine**: [`pipeline::compute_derived_stats`] and [`pipeline::analyze`]
//!   are pure functions of their inputs and the supplied "now"
//! - **Schema**: [`schema::SnapshotAdapter`] turns backend JSON payloads into a
//!   [`types::ReadingSnapshot`]
//! - **Processor**: [`pipeline::AnalyticsProcessor`] memoizes output per
//!   snapshot and wraps it in an [`types::AnalyticsReport`]

pub mod cache;
pub mod calendar;
pub mod config;
pub mod encoder;
pub mod error;
pub mod logging;
pub mod normalizer;
pub mod pace;
pub mod periods;
pub mod pipeline;
pub mod schema;
pub mod streak;
pub mod types;

pub use config::{EngineConfig, LoggingConfig};
pub use error::{AnalyticsError, Result};
pub use normalizer::{to_canonical_day, DayBucketer, ReferenceOffset};
pub use pipeline::{analyze, analyze_sources, compute_derived_stats, goal_progress, AnalyticsProcessor};
pub use streak::compute_streaks;
pub use types::{
    ActivityDay, ActivityDayKey, AnalyticsOutput, AnalyticsReport, BookRecord, BookStatus,
    CalendarCell, CalendarDay, CalendarMonth, DerivedStats, GoalProgress, Intensity,
    ReadingGoal, ReadingSnapshot, StreakSummary,
};

// Schema exports
pub use schema::{SnapshotAdapter, SnapshotSources};

/// Engine version embedded in every report
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "readpulse";
