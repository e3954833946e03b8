//! Core domain types for carbstat
//!
//! This module contains the fundamental types used throughout the pipeline:
//! the raw wire record, the normalized treatment, the reporting window,
//! meal periods and per-bucket totals.

use crate::error::{CarbstatError, Result};
use chrono::{DateTime, Days, NaiveDate, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::ops::{Add, AddAssign, RangeInclusive};

/// Event types that count as meals
pub const MEAL_EVENT_TYPES: &[&str] = &["Meal Bolus", "Combo Bolus", "Snack Bolus"];

/// Raw treatment object as served by the Nightscout treatments API
///
/// Numeric fields are optional because Nightscout omits them (or sends
/// `null`) for events that did not record them.
///
/// # Examples
/// ```
/// use carbstat_core::types::RawTreatment;
///
/// let raw: RawTreatment = serde_json::from_str(
///     r#"{"eventType":"Meal Bolus","created_at":"2018-06-29T00:12:40.422Z","carbs":15,"insulin":0.75}"#,
/// ).unwrap();
/// assert_eq!(raw.carbs, Some(15.0));
/// assert_eq!(raw.glucose, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTreatment {
    /// Nightscout document id
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Event type tag, e.g. "Meal Bolus"
    #[serde(rename = "eventType", default, deserialize_with = "null_as_empty")]
    pub event_type: String,
    /// ISO-8601 timestamp text, empty when the record has none
    #[serde(default, deserialize_with = "null_as_empty")]
    pub created_at: String,
    /// Carbohydrates in grams
    #[serde(default)]
    pub carbs: Option<f64>,
    /// Insulin in units
    #[serde(default)]
    pub insulin: Option<f64>,
    /// Who entered the record
    #[serde(rename = "enteredBy", default, skip_serializing_if = "Option::is_none")]
    pub entered_by: Option<String>,
    /// Blood glucose at entry time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glucose: Option<f64>,
    /// How glucose was measured ("Finger", "Sensor")
    #[serde(rename = "glucoseType", default, skip_serializing_if = "Option::is_none")]
    pub glucose_type: Option<String>,
    /// Free-text reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Free-text notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Glucose units ("mg/dl", "mmol")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    /// Duration in minutes (combo boluses)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// Read a missing-or-null string as empty so one bad record cannot fail the batch
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Descriptive fields carried through for display only
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TreatmentDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entered_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glucose: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glucose_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// A normalized treatment
///
/// The timestamp is already expressed in the report timezone, so its
/// calendar date and hour are the ones every later stage uses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Treatment {
    /// Point in time, in the report timezone
    pub timestamp: DateTime<Tz>,
    /// Event type tag
    pub event_type: String,
    /// Carbohydrates in grams (0 when absent)
    pub carbs: f64,
    /// Insulin in units (0 when absent)
    pub insulin: f64,
    /// Pass-through descriptive fields
    pub details: TreatmentDetails,
}

impl Treatment {
    /// Calendar date of the treatment in the report timezone
    pub fn date(&self) -> DailyDate {
        DailyDate::new(self.timestamp.date_naive())
    }

    /// Hour of day (0-23) in the report timezone
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    /// Meal periods this treatment falls into
    pub fn meal_periods(&self) -> SmallVec<[MealPeriod; 2]> {
        MealPeriod::classify(self.hour())
    }

    /// Quantities carried by this treatment
    pub fn totals(&self) -> MealTotals {
        MealTotals::new(self.carbs, self.insulin)
    }
}

/// Daily date for aggregation
///
/// Represents a calendar date without time information.
///
/// # Examples
/// ```
/// use carbstat_core::types::DailyDate;
/// use chrono::NaiveDate;
///
/// let daily = DailyDate::new(NaiveDate::from_ymd_opt(2018, 6, 29).unwrap());
/// assert_eq!(daily.format("%Y-%m-%d"), "2018-06-29");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DailyDate(NaiveDate);

impl DailyDate {
    /// Create a new DailyDate
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Get the inner NaiveDate
    pub fn inner(&self) -> &NaiveDate {
        &self.0
    }

    /// Format with a chrono format string
    pub fn format(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }
}

impl From<NaiveDate> for DailyDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

/// Inclusive range of calendar days a report covers
///
/// # Examples
/// ```
/// use carbstat_core::types::DateWindow;
/// use chrono::NaiveDate;
///
/// let window = DateWindow::new(
///     NaiveDate::from_ymd_opt(2018, 6, 29).unwrap(),
///     NaiveDate::from_ymd_opt(2018, 7, 1).unwrap(),
/// ).unwrap();
/// assert_eq!(window.len_days(), 3);
///
/// let (gte, lte) = window.query_bounds();
/// assert_eq!(gte.to_string(), "2018-06-28");
/// assert_eq!(lte.to_string(), "2018-07-03");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Create a window, rejecting one whose start is after its end
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(CarbstatError::EmptyWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// A window covering exactly one day
    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// First day (inclusive)
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day (inclusive)
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether a date falls inside the window, both ends included
    pub fn contains(&self, date: &NaiveDate) -> bool {
        *date >= self.start && *date <= self.end
    }

    /// Number of calendar days covered
    pub fn len_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// Every day of the window in ascending order
    pub fn days(&self) -> impl Iterator<Item = DailyDate> + use<> {
        let end = self.end;
        std::iter::successors(Some(self.start), |d| d.succ_opt())
            .take_while(move |d| *d <= end)
            .map(DailyDate::new)
    }

    /// Bounds for the remote query, widened to one day before the start and
    /// two days after the end so that records near midnight in any offset
    /// still arrive for local filtering.
    pub fn query_bounds(&self) -> (NaiveDate, NaiveDate) {
        let gte = self.start.checked_sub_days(Days::new(1)).unwrap_or(self.start);
        let lte = self.end.checked_add_days(Days::new(2)).unwrap_or(self.end);
        (gte, lte)
    }
}

/// Time-of-day meal bucket
///
/// Hour ranges are inclusive on both ends, so hour 11 belongs to both
/// breakfast and lunch.
///
/// # Examples
/// ```
/// use carbstat_core::types::MealPeriod;
///
/// assert_eq!(MealPeriod::classify(8).as_slice(), &[MealPeriod::Breakfast]);
/// assert_eq!(
///     MealPeriod::classify(11).as_slice(),
///     &[MealPeriod::Breakfast, MealPeriod::Lunch]
/// );
/// assert!(MealPeriod::classify(16).is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealPeriod {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealPeriod {
    /// All periods in report order
    pub const ALL: [MealPeriod; 3] = [MealPeriod::Breakfast, MealPeriod::Lunch, MealPeriod::Dinner];

    /// Inclusive hour-of-day range
    pub fn hours(&self) -> RangeInclusive<u32> {
        match self {
            Self::Breakfast => 7..=11,
            Self::Lunch => 11..=15,
            Self::Dinner => 17..=21,
        }
    }

    /// Whether the given hour falls into this period
    pub fn contains_hour(&self, hour: u32) -> bool {
        self.hours().contains(&hour)
    }

    /// Every period matching the given hour, in report order
    pub fn classify(hour: u32) -> SmallVec<[MealPeriod; 2]> {
        Self::ALL
            .iter()
            .copied()
            .filter(|period| period.contains_hour(hour))
            .collect()
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
        }
    }
}

impl fmt::Display for MealPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Carbohydrate and insulin sums for one bucket
///
/// # Examples
/// ```
/// use carbstat_core::types::MealTotals;
///
/// let mut totals = MealTotals::new(15.0, 0.75);
/// totals += MealTotals::new(20.0, 1.0);
/// assert_eq!(totals.carbs, 35.0);
/// assert_eq!(totals.insulin, 1.75);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct MealTotals {
    /// Carbohydrates in grams
    pub carbs: f64,
    /// Insulin in units
    pub insulin: f64,
}

impl MealTotals {
    /// Create new MealTotals
    pub fn new(carbs: f64, insulin: f64) -> Self {
        Self { carbs, insulin }
    }
}

impl Add for MealTotals {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            carbs: self.carbs + other.carbs,
            insulin: self.insulin + other.insulin,
        }
    }
}

impl AddAssign for MealTotals {
    fn add_assign(&mut self, other: Self) {
        self.carbs += other.carbs;
        self.insulin += other.insulin;
    }
}
