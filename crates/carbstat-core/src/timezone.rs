//! Report timezone resolution
//!
//! Every calendar-date and hour-of-day decision in the pipeline is made in a
//! single report timezone, picked once per run in this order: `--utc`,
//! `--timezone`, the `TZ` environment variable, the operating system zone,
//! and finally UTC.

use crate::error::{CarbstatError, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::debug;

/// Where the report timezone came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneOrigin {
    /// `--utc`, or UTC requested programmatically
    Utc,
    /// `--timezone <NAME>`
    Explicit,
    /// The `TZ` environment variable
    Environment,
    /// The operating system setting
    System,
    /// Nothing usable was found
    Fallback,
}

/// The single timezone a report is computed in
#[derive(Debug, Clone)]
pub struct TimezoneConfig {
    /// Zone used for parsing naive timestamps, day membership and hours
    pub tz: Tz,
    /// How the zone was chosen
    pub origin: ZoneOrigin,
}

impl TimezoneConfig {
    /// Report in an explicitly named zone
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            origin: ZoneOrigin::Explicit,
        }
    }

    /// Report in UTC
    pub fn utc() -> Self {
        Self {
            tz: Tz::UTC,
            origin: ZoneOrigin::Utc,
        }
    }

    /// Report in the local zone of this machine
    pub fn local() -> Self {
        let (tz, origin) = get_local_timezone();
        Self { tz, origin }
    }

    /// Resolve the report zone from the `--timezone` and `--utc` flags
    pub fn from_cli(timezone: Option<&str>, use_utc: bool) -> Result<Self> {
        match (use_utc, timezone) {
            (true, _) => Ok(Self::utc()),
            (false, Some(name)) => name.parse::<Tz>().map(Self::new).map_err(|_| {
                CarbstatError::InvalidTimezone(format!(
                    "'{name}'. Use an IANA name like 'America/New_York', 'Europe/Berlin', or 'UTC'"
                ))
            }),
            (false, None) => Ok(Self::local()),
        }
    }

    /// IANA name of the report zone
    pub fn display_name(&self) -> &str {
        self.tz.name()
    }

    /// Current calendar date in the report zone
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }
}

/// Detect the local zone: `TZ` first, then the operating system, then UTC
pub fn get_local_timezone() -> (Tz, ZoneOrigin) {
    let from_env = std::env::var("TZ")
        .ok()
        .and_then(|name| known_zone(&name, ZoneOrigin::Environment));
    let from_system = || {
        iana_time_zone::get_timezone()
            .ok()
            .and_then(|name| known_zone(&name, ZoneOrigin::System))
    };

    from_env.or_else(from_system).unwrap_or_else(|| {
        debug!("No usable local timezone found, reporting in UTC");
        (Tz::UTC, ZoneOrigin::Fallback)
    })
}

fn known_zone(name: &str, origin: ZoneOrigin) -> Option<(Tz, ZoneOrigin)> {
    match name.parse::<Tz>() {
        Ok(tz) => {
            debug!("Report timezone {} ({:?})", name, origin);
            Some((tz, origin))
        }
        Err(_) => {
            debug!("Ignoring unknown timezone '{}' ({:?})", name, origin);
            None
        }
    }
}
