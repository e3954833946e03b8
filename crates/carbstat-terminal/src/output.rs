//! Output formatting module for carbstat
//!
//! This module provides formatters for displaying meal reports in different formats:
//! - Text format reproducing the classic line-oriented report
//! - Table format for a compact terminal overview
//! - JSON format for machine-readable output and integration with other tools
//!
//! # Examples
//!
//! ```
//! use carbstat_core::report::ReportBuilder;
//! use carbstat_core::timezone::TimezoneConfig;
//! use carbstat_core::types::DateWindow;
//! use carbstat_terminal::output::{OutputFormat, get_formatter};
//! use chrono::NaiveDate;
//!
//! let window = DateWindow::single_day(NaiveDate::from_ymd_opt(2018, 6, 29).unwrap());
//! let report = ReportBuilder::new(window, TimezoneConfig::utc()).build(vec![]).unwrap();
//!
//! let text = get_formatter(OutputFormat::Text, false).format_report(&report);
//! assert!(text.contains("Found 0 entries between June 29th 2018 and June 29th 2018"));
//!
//! let json = get_formatter(OutputFormat::Json, false).format_report(&report);
//! assert!(json.contains("\"statistics\""));
//! ```

use crate::dates::{long_date, long_datetime};
use carbstat_core::report::MealReport;
use carbstat_core::statistics::MealStatistics;
use carbstat_core::types::{MealPeriod, Treatment};
use colored::*;
use prettytable::{Table, format, row};

/// Trait for output formatters
///
/// Implementations render a complete [`MealReport`] into a string ready to
/// be printed on stdout.
pub trait OutputFormatter {
    /// Format a meal report
    fn format_report(&self, report: &MealReport) -> String;
}

/// Selectable report layouts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Table,
    Json,
}

/// `Meal Bolus: 0.75 units for 15g at Friday, June 29th 2018, 8:12:40 am`
pub fn format_entry_line(entry: &Treatment) -> String {
    format!(
        "{}: {} units for {}g at {}",
        entry.event_type,
        entry.insulin,
        entry.carbs,
        long_datetime(&entry.timestamp)
    )
}

/// `Breakfast: 15 g`
pub fn format_meal_summary(period: MealPeriod, carbs: f64) -> String {
    format!("{}: {} g", period, carbs)
}

/// Two-decimal average with ties rounded up (`12.125` -> `12.13`)
///
/// # Examples
/// ```
/// use carbstat_terminal::output::format_average;
///
/// assert_eq!(format_average(15.0), "15.00");
/// assert_eq!(format_average(0.125), "0.13");
/// ```
pub fn format_average(avg: f64) -> String {
    format!("{:.2}", (avg * 100.0).round() / 100.0)
}

/// Statistics block for one meal period
///
/// The average is rounded to two decimals; every other value is printed
/// as is.
///
/// # Examples
/// ```
/// use carbstat_core::statistics::MealStatistics;
/// use carbstat_core::types::MealPeriod;
/// use carbstat_terminal::output::format_meal_stats;
///
/// let stats = MealStatistics::from_values(&[15.0]);
/// let block = format_meal_stats(MealPeriod::Breakfast, &stats);
/// assert!(block.starts_with("Breakfast:\n  Average: 15.00 g\n  Min: 15 g"));
/// ```
pub fn format_meal_stats(period: MealPeriod, stats: &MealStatistics) -> String {
    format!(
        "{}:\n  Average: {} g\n  Min: {} g\n  Max: {} g\n  Median: {} g\n  \
         10th Percentile: {} g\n  20th Percentile: {} g\n  90th Percentile: {} g",
        period,
        format_average(stats.avg),
        stats.min,
        stats.max,
        stats.pct50,
        stats.pct10,
        stats.pct20,
        stats.pct90
    )
}

/// Line-oriented formatter matching the classic report layout
pub struct TextFormatter {
    /// Whether headings are highlighted
    pub color: bool,
}

impl TextFormatter {
    /// Create a new TextFormatter
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format_report(&self, report: &MealReport) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "\nFound {} entries between {} and {}: \n",
            report.entries.len(),
            long_date(&report.window.start()),
            long_date(&report.window.end())
        ));

        for entry in &report.entries {
            lines.push(format_entry_line(entry));
        }

        for day in &report.days {
            lines.push(self.heading(&format!("{}:", long_date(day.date.inner()))));
            for period in MealPeriod::ALL {
                lines.push(format_meal_summary(period, day.get(period).carbs));
            }
        }

        lines.push(self.heading("\nSTATS"));
        for period in MealPeriod::ALL {
            lines.push(format_meal_stats(period, report.statistics.get(period)));
        }

        if report.skipped > 0 {
            lines.push(format!(
                "\n{} treatments skipped (malformed timestamps)",
                report.skipped
            ));
        }

        let mut output = lines.join("\n");
        output.push('\n');
        output
    }
}

/// Table formatter for human-readable output
pub struct TableFormatter;

impl TableFormatter {
    fn entries_table(entries: &[Treatment]) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "Time",
            b -> "Event",
            b -> "Carbs (g)",
            b -> "Insulin (U)"
        ]);

        for entry in entries {
            table.add_row(row![
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.event_type,
                r -> entry.carbs,
                r -> entry.insulin
            ]);
        }
        table
    }

    fn daily_table(report: &MealReport) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "Date",
            b -> "Breakfast (g)",
            b -> "Breakfast (U)",
            b -> "Lunch (g)",
            b -> "Lunch (U)",
            b -> "Dinner (g)",
            b -> "Dinner (U)"
        ]);

        for day in &report.days {
            table.add_row(row![
                day.date.format("%Y-%m-%d"),
                r -> day.breakfast.carbs,
                r -> day.breakfast.insulin,
                r -> day.lunch.carbs,
                r -> day.lunch.insulin,
                r -> day.dinner.carbs,
                r -> day.dinner.insulin
            ]);
        }
        table
    }

    fn statistics_table(report: &MealReport) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "Meal",
            b -> "Average",
            b -> "Min",
            b -> "Max",
            b -> "P10",
            b -> "P20",
            b -> "Median",
            b -> "P90"
        ]);

        for period in MealPeriod::ALL {
            let stats = report.statistics.get(period);
            table.add_row(row![
                period.label(),
                r -> format_average(stats.avg),
                r -> stats.min,
                r -> stats.max,
                r -> stats.pct10,
                r -> stats.pct20,
                r -> stats.pct50,
                r -> stats.pct90
            ]);
        }
        table
    }
}

impl OutputFormatter for TableFormatter {
    fn format_report(&self, report: &MealReport) -> String {
        let mut output = format!(
            "{} entries between {} and {} ({})\n\n",
            report.entries.len(),
            report.window.start(),
            report.window.end(),
            report.timezone
        );

        if !report.entries.is_empty() {
            output.push_str(&Self::entries_table(&report.entries).to_string());
            output.push('\n');
        }
        output.push_str(&Self::daily_table(report).to_string());
        output.push('\n');
        output.push_str(&Self::statistics_table(report).to_string());

        if report.skipped > 0 {
            output.push_str(&format!(
                "\n{} treatments skipped (malformed timestamps)\n",
                report.skipped
            ));
        }
        output
    }
}

/// JSON formatter for machine-readable output
///
/// Emits the serialized report: window, entries, days, series and
/// statistics.
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &MealReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|e| {
            serde_json::json!({ "error": format!("Failed to serialize report: {e}") }).to_string()
        })
    }
}

/// Get the formatter for an output format
///
/// `color` only affects the text layout.
pub fn get_formatter(format: OutputFormat, color: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(color)),
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}
