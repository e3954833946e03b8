//! Shared test utilities for unit tests
//!
//! Integration tests in the root `tests/` directory keep their own helpers
//! in `tests/common/mod.rs`; this module is only compiled for unit tests.

use once_cell::sync::Lazy;
use std::env;

// Serializes environment variable modifications across tests
pub static ENV_MUTEX: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

/// RAII guard restoring environment variables on drop, panics included
pub struct EnvVarGuard {
    vars: Vec<(String, Option<String>)>,
}

impl EnvVarGuard {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    /// Set an environment variable, remembering its original value
    pub fn set(&mut self, key: &str, value: &str) {
        let original = env::var(key).ok();
        self.vars.push((key.to_string(), original));
        // env::set_var is unsafe since Rust 1.82 (not thread-safe)
        unsafe {
            env::set_var(key, value);
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.vars.iter().rev() {
            unsafe {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

impl Default for EnvVarGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a UTC-timestamped treatment for pipeline tests
pub fn treatment(event_type: &str, rfc3339: &str, carbs: f64, insulin: f64) -> crate::types::Treatment {
    let timestamp = chrono::DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&chrono_tz::Tz::UTC);
    crate::types::Treatment {
        timestamp,
        event_type: event_type.to_string(),
        carbs,
        insulin,
        details: Default::default(),
    }
}
