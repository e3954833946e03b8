//! End-to-end meal report
//!
//! Chains the pipeline stages: normalize, filter by window and event type,
//! sort, aggregate per day and meal period, then summarize each period.
//!
//! # Examples
//!
//! ```
//! use carbstat_core::report::ReportBuilder;
//! use carbstat_core::timezone::TimezoneConfig;
//! use carbstat_core::types::{DateWindow, MealPeriod, RawTreatment};
//! use chrono::NaiveDate;
//!
//! let window = DateWindow::single_day(NaiveDate::from_ymd_opt(2018, 6, 29).unwrap());
//! let raw = vec![RawTreatment {
//!     event_type: "Meal Bolus".to_string(),
//!     created_at: "2018-06-29T08:12:40Z".to_string(),
//!     carbs: Some(15.0),
//!     insulin: Some(0.75),
//!     ..Default::default()
//! }];
//!
//! let report = ReportBuilder::new(window, TimezoneConfig::utc()).build(raw).unwrap();
//! assert_eq!(report.entries.len(), 1);
//! assert_eq!(report.statistics.get(MealPeriod::Breakfast).avg, 15.0);
//! assert!(report.statistics.get(MealPeriod::Lunch).is_empty());
//! ```

use crate::aggregation::{Aggregator, DaySummary, MealSeries};
use crate::error::Result;
use crate::filters::{TreatmentFilter, sort_chronologically};
use crate::normalize::{MalformedPolicy, Normalizer};
use crate::statistics::MealStatistics;
use crate::timezone::TimezoneConfig;
use crate::types::{DateWindow, MealPeriod, RawTreatment, Treatment};
use serde::Serialize;
use tracing::info;

/// Statistics for each meal period
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MealStatisticsSet {
    pub breakfast: MealStatistics,
    pub lunch: MealStatistics,
    pub dinner: MealStatistics,
}

impl MealStatisticsSet {
    /// Summarize every series
    pub fn from_series(series: &MealSeries) -> Self {
        Self {
            breakfast: MealStatistics::from_series(&series.breakfast),
            lunch: MealStatistics::from_series(&series.lunch),
            dinner: MealStatistics::from_series(&series.dinner),
        }
    }

    /// Statistics for one meal period
    pub fn get(&self, period: MealPeriod) -> &MealStatistics {
        match period {
            MealPeriod::Breakfast => &self.breakfast,
            MealPeriod::Lunch => &self.lunch,
            MealPeriod::Dinner => &self.dinner,
        }
    }
}

/// Complete result of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct MealReport {
    /// Window the report covers
    pub window: DateWindow,
    /// Name of the report timezone
    pub timezone: String,
    /// Filtered treatments in chronological order
    pub entries: Vec<Treatment>,
    /// Per-day meal totals, one per window day
    pub days: Vec<DaySummary>,
    /// Per-period carbohydrate series
    pub series: MealSeries,
    /// Per-period statistics
    pub statistics: MealStatisticsSet,
    /// Records dropped for malformed timestamps
    pub skipped: usize,
}

impl MealReport {
    /// Build a report from already normalized treatments
    pub fn from_treatments(
        treatments: Vec<Treatment>,
        filter: &TreatmentFilter,
        timezone: &TimezoneConfig,
    ) -> Self {
        let total = treatments.len();
        let entries = sort_chronologically(filter.apply(treatments));
        info!(
            "Kept {} of {} treatments between {} and {}",
            entries.len(),
            total,
            filter.window.start(),
            filter.window.end()
        );

        let aggregation = Aggregator::new(filter.window).aggregate(&entries);
        let statistics = MealStatisticsSet::from_series(&aggregation.series);

        Self {
            window: filter.window,
            timezone: timezone.display_name().to_string(),
            entries,
            days: aggregation.days,
            series: aggregation.series,
            statistics,
            skipped: 0,
        }
    }
}

/// Configures and runs the pipeline over raw records
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    filter: TreatmentFilter,
    timezone: TimezoneConfig,
    policy: MalformedPolicy,
}

impl ReportBuilder {
    /// Create a builder with the default meal allow-list and skip policy
    pub fn new(window: DateWindow, timezone: TimezoneConfig) -> Self {
        Self {
            filter: TreatmentFilter::new(window),
            timezone,
            policy: MalformedPolicy::default(),
        }
    }

    /// Set the malformed-timestamp policy
    pub fn with_policy(mut self, policy: MalformedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the event-type allow-list
    pub fn with_event_types<I, S>(mut self, event_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = self.filter.with_event_types(event_types);
        self
    }

    /// Get the window the report will cover
    pub fn window(&self) -> &DateWindow {
        &self.filter.window
    }

    /// Run the pipeline
    pub fn build(&self, raw: Vec<RawTreatment>) -> Result<MealReport> {
        let normalized = Normalizer::new(self.timezone.clone(), self.policy).normalize(raw)?;
        let mut report =
            MealReport::from_treatments(normalized.treatments, &self.filter, &self.timezone);
        report.skipped = normalized.skipped;
        Ok(report)
    }
}
