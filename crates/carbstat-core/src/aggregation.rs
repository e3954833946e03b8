//! Daily aggregation of treatments into meal-period totals
//!
//! For every calendar day of the report window and every meal period, sums
//! the carbohydrates and insulin of the treatments falling into that
//! (day, period) bucket. Days without treatments still produce an explicit
//! zero bucket, so every [`DailySeries`] has one value per window day.
//!
//! # Examples
//!
//! ```
//! use carbstat_core::aggregation::Aggregator;
//! use carbstat_core::types::{DateWindow, MealPeriod};
//! use chrono::NaiveDate;
//!
//! let window = DateWindow::new(
//!     NaiveDate::from_ymd_opt(2018, 6, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2018, 6, 7).unwrap(),
//! ).unwrap();
//!
//! let aggregation = Aggregator::new(window).aggregate(&[]);
//! assert_eq!(aggregation.days.len(), 7);
//! assert_eq!(aggregation.series.get(MealPeriod::Lunch).values, vec![0.0; 7]);
//! ```

use crate::types::{DailyDate, DateWindow, MealPeriod, MealTotals, Treatment};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Meal totals for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    /// Calendar day
    pub date: DailyDate,
    pub breakfast: MealTotals,
    pub lunch: MealTotals,
    pub dinner: MealTotals,
}

impl DaySummary {
    /// Totals for one meal period
    pub fn get(&self, period: MealPeriod) -> MealTotals {
        match period {
            MealPeriod::Breakfast => self.breakfast,
            MealPeriod::Lunch => self.lunch,
            MealPeriod::Dinner => self.dinner,
        }
    }
}

/// Per-day carbohydrate totals for one meal period, ascending by date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeries {
    /// Meal period the series belongs to
    pub period: MealPeriod,
    /// One carbohydrate total per window day, zeros included
    pub values: Vec<f64>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The three daily series of a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealSeries {
    pub breakfast: DailySeries,
    pub lunch: DailySeries,
    pub dinner: DailySeries,
}

impl MealSeries {
    /// Series for one meal period
    pub fn get(&self, period: MealPeriod) -> &DailySeries {
        match period {
            MealPeriod::Breakfast => &self.breakfast,
            MealPeriod::Lunch => &self.lunch,
            MealPeriod::Dinner => &self.dinner,
        }
    }
}

/// Output of the daily aggregation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAggregation {
    /// One summary per window day, ascending
    pub days: Vec<DaySummary>,
    /// Carbohydrate series per meal period
    pub series: MealSeries,
}

/// Accumulator for one day's buckets
#[derive(Default)]
struct DailyAccumulator {
    breakfast: MealTotals,
    lunch: MealTotals,
    dinner: MealTotals,
}

impl DailyAccumulator {
    fn add_treatment(&mut self, treatment: &Treatment) {
        let totals = treatment.totals();
        for period in treatment.meal_periods() {
            *self.bucket_mut(period) += totals;
        }
    }

    fn bucket_mut(&mut self, period: MealPeriod) -> &mut MealTotals {
        match period {
            MealPeriod::Breakfast => &mut self.breakfast,
            MealPeriod::Lunch => &mut self.lunch,
            MealPeriod::Dinner => &mut self.dinner,
        }
    }

    fn into_day_summary(self, date: DailyDate) -> DaySummary {
        DaySummary {
            date,
            breakfast: self.breakfast,
            lunch: self.lunch,
            dinner: self.dinner,
        }
    }
}

/// Daily aggregation engine
pub struct Aggregator {
    window: DateWindow,
}

impl Aggregator {
    /// Create a new Aggregator for a window
    pub fn new(window: DateWindow) -> Self {
        Self { window }
    }

    /// Get the window this aggregator covers
    pub fn window(&self) -> &DateWindow {
        &self.window
    }

    /// Bucket treatments by day and meal period
    ///
    /// Treatments dated outside the window are ignored; those outside every
    /// meal period add to no bucket.
    pub fn aggregate(&self, treatments: &[Treatment]) -> DailyAggregation {
        let mut daily_map: BTreeMap<DailyDate, DailyAccumulator> = BTreeMap::new();

        for treatment in treatments {
            let date = treatment.date();
            if !self.window.contains(date.inner()) {
                continue;
            }
            daily_map.entry(date).or_default().add_treatment(treatment);
        }

        debug!(
            "Aggregated {} treatments into {} active days of {}",
            treatments.len(),
            daily_map.len(),
            self.window.len_days()
        );

        let days: Vec<DaySummary> = self
            .window
            .days()
            .map(|date| {
                daily_map
                    .remove(&date)
                    .unwrap_or_default()
                    .into_day_summary(date)
            })
            .collect();

        let series_for = |period: MealPeriod| DailySeries {
            period,
            values: days.iter().map(|day| day.get(period).carbs).collect(),
        };

        let series = MealSeries {
            breakfast: series_for(MealPeriod::Breakfast),
            lunch: series_for(MealPeriod::Lunch),
            dinner: series_for(MealPeriod::Dinner),
        };

        DailyAggregation { days, series }
    }
}
