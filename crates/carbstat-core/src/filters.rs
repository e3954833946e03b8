//! Filtering and ordering of treatments
//!
//! Keeps treatments whose calendar date falls inside the report window and
//! whose event type is on the meal allow-list, then orders them
//! chronologically.
//!
//! # Examples
//!
//! ```
//! use carbstat_core::filters::TreatmentFilter;
//! use carbstat_core::types::DateWindow;
//! use chrono::NaiveDate;
//!
//! let window = DateWindow::new(
//!     NaiveDate::from_ymd_opt(2018, 5, 3).unwrap(),
//!     NaiveDate::from_ymd_opt(2018, 7, 3).unwrap(),
//! ).unwrap();
//!
//! // Meal, combo and snack boluses by default
//! let filter = TreatmentFilter::new(window);
//! assert!(filter.allows_event_type("Combo Bolus"));
//! assert!(!filter.allows_event_type("Correction Bolus"));
//! ```

use crate::types::{DateWindow, MEAL_EVENT_TYPES, Treatment};

/// Window and event-type filter for treatments
#[derive(Debug, Clone)]
pub struct TreatmentFilter {
    /// Inclusive date window
    pub window: DateWindow,
    /// Event types to keep
    pub event_types: Vec<String>,
}

impl TreatmentFilter {
    /// Create a filter for the window with the default meal allow-list
    pub fn new(window: DateWindow) -> Self {
        Self {
            window,
            event_types: MEAL_EVENT_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Replace the event-type allow-list
    pub fn with_event_types<I, S>(mut self, event_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.event_types = event_types.into_iter().map(Into::into).collect();
        self
    }

    /// Whether an event type is on the allow-list
    pub fn allows_event_type(&self, event_type: &str) -> bool {
        self.event_types.iter().any(|t| t == event_type)
    }

    /// Check if a treatment passes the filter
    pub fn matches(&self, treatment: &Treatment) -> bool {
        let date = treatment.date();
        self.window.contains(date.inner()) && self.allows_event_type(&treatment.event_type)
    }

    /// Keep matching treatments, preserving their relative order
    pub fn apply(&self, treatments: Vec<Treatment>) -> Vec<Treatment> {
        treatments.into_iter().filter(|t| self.matches(t)).collect()
    }
}

/// Order treatments by ascending timestamp; ties keep their input order
pub fn sort_chronologically(mut treatments: Vec<Treatment>) -> Vec<Treatment> {
    treatments.sort_by_key(|t| t.timestamp);
    treatments
}
