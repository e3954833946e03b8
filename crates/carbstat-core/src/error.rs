//! Error types for carbstat
//!
//! This module defines the error types used throughout the carbstat crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use carbstat_core::error::{CarbstatError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to CarbstatError
//!     let _file = std::fs::read_to_string("nonexistent.json")?;
//!     Ok(())
//! }
//! ```

use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for carbstat operations
///
/// Statistical degenerate cases (no qualifying events, all-zero days) are
/// never errors; they produce zeroed statistics instead.
#[derive(Error, Debug)]
pub enum CarbstatError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Request to {url} failed with HTTP status {status}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// A treatment timestamp could not be parsed
    #[error("Malformed timestamp '{value}' in treatment {id}")]
    MalformedTimestamp {
        /// Record identifier (or its position when the record has no id)
        id: String,
        /// The unparseable timestamp text
        value: String,
    },

    /// Window start is after its end
    #[error("Empty date window: start {start} is after end {end}")]
    EmptyWindow {
        /// Requested first day
        start: NaiveDate,
        /// Requested last day
        end: NaiveDate,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience type alias for Results in carbstat
///
/// # Example
///
/// ```
/// use carbstat_core::Result;
///
/// fn process_data() -> Result<String> {
///     Ok("Processed successfully".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, CarbstatError>;
