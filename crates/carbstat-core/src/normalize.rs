//! Treatment normalization
//!
//! Converts [`RawTreatment`]s into typed [`Treatment`]s: the timestamp text
//! is parsed into a point in time in the report timezone and missing
//! quantities default to zero.
//!
//! # Examples
//!
//! ```
//! use carbstat_core::normalize::{MalformedPolicy, Normalizer};
//! use carbstat_core::timezone::TimezoneConfig;
//! use carbstat_core::types::RawTreatment;
//!
//! let normalizer = Normalizer::new(TimezoneConfig::utc(), MalformedPolicy::Skip);
//! let raw = RawTreatment {
//!     event_type: "Meal Bolus".to_string(),
//!     created_at: "2018-06-29T08:12:40Z".to_string(),
//!     carbs: Some(15.0),
//!     ..Default::default()
//! };
//!
//! let outcome = normalizer.normalize(vec![raw]).unwrap();
//! assert_eq!(outcome.treatments[0].hour(), 8);
//! assert_eq!(outcome.treatments[0].insulin, 0.0);
//! ```

use crate::error::{CarbstatError, Result};
use crate::timezone::TimezoneConfig;
use crate::types::{RawTreatment, Treatment, TreatmentDetails};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use tracing::{debug, warn};

/// Naive date-time layouts, interpreted in the report timezone
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// What to do with a record whose timestamp cannot be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Drop the record and log a warning
    #[default]
    Skip,
    /// Fail the whole batch
    Abort,
}

/// Result of normalizing a batch
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    /// Successfully normalized treatments, in input order
    pub treatments: Vec<Treatment>,
    /// Number of records dropped for malformed timestamps
    pub skipped: usize,
}

/// Converts raw records into treatments in the report timezone
#[derive(Debug, Clone)]
pub struct Normalizer {
    timezone: TimezoneConfig,
    policy: MalformedPolicy,
}

impl Normalizer {
    /// Create a new Normalizer
    pub fn new(timezone: TimezoneConfig, policy: MalformedPolicy) -> Self {
        Self { timezone, policy }
    }

    /// Normalize a batch of raw records
    pub fn normalize(&self, raw: Vec<RawTreatment>) -> Result<Normalized> {
        let mut outcome = Normalized {
            treatments: Vec::with_capacity(raw.len()),
            skipped: 0,
        };

        for (index, record) in raw.into_iter().enumerate() {
            match self.normalize_one(record, index) {
                Ok(treatment) => outcome.treatments.push(treatment),
                Err(CarbstatError::MalformedTimestamp { id, value })
                    if self.policy == MalformedPolicy::Skip =>
                {
                    warn!("Skipping treatment {} with malformed timestamp '{}'", id, value);
                    outcome.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        debug!(
            "Normalized {} treatments ({} skipped)",
            outcome.treatments.len(),
            outcome.skipped
        );
        Ok(outcome)
    }

    /// Normalize a single record; `index` identifies records without an id
    pub fn normalize_one(&self, raw: RawTreatment, index: usize) -> Result<Treatment> {
        let timestamp = parse_timestamp(&raw.created_at, &self.timezone.tz).ok_or_else(|| {
            CarbstatError::MalformedTimestamp {
                id: raw.id.clone().unwrap_or_else(|| format!("#{index}")),
                value: raw.created_at.clone(),
            }
        })?;

        Ok(Treatment {
            timestamp,
            event_type: raw.event_type,
            carbs: raw.carbs.unwrap_or(0.0),
            insulin: raw.insulin.unwrap_or(0.0),
            details: TreatmentDetails {
                id: raw.id,
                entered_by: raw.entered_by,
                glucose: raw.glucose,
                glucose_type: raw.glucose_type,
                reason: raw.reason,
                notes: raw.notes,
                units: raw.units,
                duration: raw.duration,
            },
        })
    }
}

/// Parse a timestamp string into the given timezone
///
/// Offset-carrying timestamps keep their instant; naive ones are read as
/// wall-clock time in `tz`. Returns `None` when nothing matches or when the
/// wall-clock time does not exist in `tz`.
pub fn parse_timestamp(value: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(tz));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(tz));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })?;

    tz.from_local_datetime(&naive).earliest()
}
