//! Core types, pipeline stages, and statistics for carbstat
//!
//! This crate turns raw Nightscout treatments into per-meal carbohydrate
//! statistics: normalization, window and event-type filtering, chronological
//! ordering, meal-period bucketing, daily aggregation, and summary statistics.
//! Fetching and rendering live in the `carbstat-source` and
//! `carbstat-terminal` crates.

pub mod aggregation;
pub mod error;
pub mod filters;
pub mod normalize;
pub mod report;
pub mod source;
pub mod statistics;
pub mod timezone;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{CarbstatError, Result};
pub use report::MealReport;
pub use types::{DailyDate, DateWindow, MealPeriod, MealTotals, RawTreatment, Treatment};
