//! Descriptive statistics over daily meal totals
//!
//! Days with a zero total are treated as "no meal logged" rather than as a
//! true zero and are excluded before anything is computed.

use crate::aggregation::DailySeries;
use serde::Serialize;

/// Summary of one meal period's non-zero daily carbohydrate totals (grams)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MealStatistics {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub pct10: f64,
    pub pct20: f64,
    pub pct50: f64,
    pub pct90: f64,
}

impl MealStatistics {
    /// Compute statistics over a daily series
    pub fn from_series(series: &DailySeries) -> Self {
        Self::from_values(&series.values)
    }

    /// Compute statistics over raw daily totals
    ///
    /// # Examples
    /// ```
    /// use carbstat_core::statistics::MealStatistics;
    ///
    /// let stats = MealStatistics::from_values(&[20.0, 0.0, 40.0]);
    /// assert_eq!(stats.avg, 30.0);
    /// assert_eq!(stats.min, 20.0);
    /// assert_eq!(stats.pct50, 30.0);
    ///
    /// assert_eq!(MealStatistics::from_values(&[0.0, 0.0]), MealStatistics::default());
    /// ```
    pub fn from_values(values: &[f64]) -> Self {
        let mut non_zero: Vec<f64> = values.iter().copied().filter(|v| *v != 0.0).collect();
        if non_zero.is_empty() {
            return Self::default();
        }

        non_zero.sort_by(f64::total_cmp);
        let min = non_zero[0];
        let max = non_zero[non_zero.len() - 1];
        let sum: f64 = non_zero.iter().sum();

        Self {
            // Summation rounding can push the mean a ulp past the extremes
            avg: (sum / non_zero.len() as f64).clamp(min, max),
            min,
            max,
            pct10: percentile(&non_zero, 10.0),
            pct20: percentile(&non_zero, 20.0),
            pct50: percentile(&non_zero, 50.0),
            pct90: percentile(&non_zero, 90.0),
        }
    }

    /// Whether every field is zero (no qualifying days)
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Compute the `p`-th percentile of a **sorted** slice by linear
/// interpolation between closest ranks.
///
/// `p` is clamped to `0..=100`. Returns `0.0` for an empty slice.
///
/// # Examples
/// ```
/// use carbstat_core::statistics::percentile;
///
/// let sorted = [10.0, 20.0, 30.0, 40.0];
/// assert_eq!(percentile(&sorted, 50.0), 25.0);
/// assert_eq!(percentile(&sorted, 0.0), 10.0);
/// assert_eq!(percentile(&sorted, 100.0), 40.0);
/// ```
pub fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    if sorted_data.is_empty() {
        return 0.0;
    }
    let len = sorted_data.len();
    if len == 1 {
        return sorted_data[0];
    }
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (len as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted_data[lo];
    }
    let frac = rank - lo as f64;
    let value = sorted_data[lo] + frac * (sorted_data[hi] - sorted_data[lo]);
    value.clamp(sorted_data[lo], sorted_data[hi])
}
