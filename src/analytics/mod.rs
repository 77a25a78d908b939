//! Practice analytics
//!
//! Pure functions over `&[JournalEntry]`:
//!
//! - **duration**: minutes from free-text durations
//! - **monthly**: per-day buckets, monthly totals, longest streak, calendar grid
//! - **heatmap**: color tier of a day from its total minutes
//!
//! Nothing here keeps state between calls; every call recomputes from the
//! entries it is given.

pub mod duration;
pub mod heatmap;
pub mod monthly;

pub use duration::parse_duration;
pub use heatmap::HeatmapTier;
pub use monthly::{aggregate_month, calendar_grid, DayBucket, DayHeat, MonthlyStats, ViewMonth};
