//! Common test utilities and helpers for carbstat tests
//!
//! Builders for raw treatments and helpers for windows and on-disk
//! treatment dumps.

#![allow(dead_code)]

use carbstat_core::types::{DateWindow, RawTreatment};
use chrono::NaiveDate;
use std::io::Write;
use tempfile::NamedTempFile;

/// Meal event types accepted by default
pub const MEAL_TYPES: &[&str] = &["Meal Bolus", "Combo Bolus", "Snack Bolus"];

/// Event types that never count as meals
pub const NON_MEAL_TYPES: &[&str] = &["Correction Bolus", "Temp Basal", "BG Check", "Note"];

/// Builder for creating test RawTreatment instances
pub struct RawTreatmentBuilder {
    raw: RawTreatment,
}

impl RawTreatmentBuilder {
    /// Create a new builder: a Meal Bolus at 2018-06-29T08:12:40Z with no quantities
    pub fn new() -> Self {
        Self {
            raw: RawTreatment {
                event_type: "Meal Bolus".to_string(),
                created_at: "2018-06-29T08:12:40.422Z".to_string(),
                ..Default::default()
            },
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.raw.id = Some(id.to_string());
        self
    }

    pub fn with_event_type(mut self, event_type: &str) -> Self {
        self.raw.event_type = event_type.to_string();
        self
    }

    pub fn with_created_at(mut self, created_at: &str) -> Self {
        self.raw.created_at = created_at.to_string();
        self
    }

    pub fn with_carbs(mut self, carbs: f64) -> Self {
        self.raw.carbs = Some(carbs);
        self
    }

    pub fn with_insulin(mut self, insulin: f64) -> Self {
        self.raw.insulin = Some(insulin);
        self
    }

    pub fn build(self) -> RawTreatment {
        self.raw
    }
}

impl Default for RawTreatmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for a meal-type treatment
pub fn meal(event_type: &str, created_at: &str, carbs: f64, insulin: f64) -> RawTreatment {
    RawTreatmentBuilder::new()
        .with_event_type(event_type)
        .with_created_at(created_at)
        .with_carbs(carbs)
        .with_insulin(insulin)
        .build()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Inclusive window from two `(y, m, d)` tuples
pub fn window(start: (i32, u32, u32), end: (i32, u32, u32)) -> DateWindow {
    DateWindow::new(date(start.0, start.1, start.2), date(end.0, end.1, end.2)).unwrap()
}

/// Write treatments to a temporary JSON file
pub fn write_treatments_file(treatments: &[RawTreatment]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    let json = serde_json::to_string(treatments).unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Two months of treatments as Nightscout returns them
///
/// Every day from 2018-05-03 to 2018-07-03 gets a 30 g breakfast and a 60 g
/// dinner; every third day also gets a correction bolus.
pub fn two_month_dump() -> Vec<RawTreatment> {
    let window = window((2018, 5, 3), (2018, 7, 3));
    let mut treatments = Vec::new();
    for (i, day) in window.days().enumerate() {
        let stamp = day.format("%Y-%m-%d");
        treatments.push(meal("Meal Bolus", &format!("{stamp}T08:00:00.000Z"), 30.0, 2.0));
        treatments.push(meal("Combo Bolus", &format!("{stamp}T19:30:00.000Z"), 60.0, 4.5));
        if i % 3 == 0 {
            treatments.push(
                RawTreatmentBuilder::new()
                    .with_event_type("Correction Bolus")
                    .with_created_at(&format!("{stamp}T13:00:00.000Z"))
                    .with_insulin(1.0)
                    .build(),
            );
        }
    }
    treatments
}
