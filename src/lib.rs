//! carbstat - Per-meal carbohydrate statistics from Nightscout treatment logs
//!
//! This library provides functionality to:
//! - Parse command-line flags into a validated run configuration
//! - Fetch treatments from a Nightscout site or a local JSON dump
//! - Build a meal report and render it as text, tables or JSON
//!
//! The pipeline itself lives in `carbstat-core`; sources and formatters in
//! `carbstat-source` and `carbstat-terminal`.
//!
//! # Examples
//!
//! ```no_run
//! use carbstat::app::generate_report;
//! use carbstat::cli::Cli;
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() -> carbstat::Result<()> {
//!     let config = Cli::parse().into_run_config()?;
//!     let output = generate_report(&config, false).await?;
//!     println!("{output}");
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod cli;

// Re-export commonly used types
pub use carbstat_core::{CarbstatError, MealReport, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
