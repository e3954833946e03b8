//! Terminal output formatting for carbstat
//!
//! This crate provides the text, table and JSON report formatters along
//! with the ordinal date helpers the text layout uses.

pub mod dates;
pub mod output;

pub use output::{
    JsonFormatter, OutputFormat, OutputFormatter, TableFormatter, TextFormatter, get_formatter,
};
