//! CLI interface for carbstat
//!
//! This module defines the command-line interface using clap and turns the
//! parsed flags into a validated [`RunConfig`].
//!
//! # Example
//!
//! ```bash
//! # Statistics for May and June 2018 from a Nightscout site
//! carbstat --url https://my-site.herokuapp.com --since 2018-05-03 --until 2018-07-03
//!
//! # Same report from a saved treatments dump, as JSON
//! carbstat --input treatments.json --since 2018-05 --json
//! ```

use carbstat_core::error::{CarbstatError, Result};
use carbstat_core::normalize::MalformedPolicy;
use carbstat_core::timezone::TimezoneConfig;
use carbstat_core::types::DateWindow;
use carbstat_source::nightscout::DEFAULT_COUNT;
use carbstat_terminal::output::OutputFormat;
use chrono::NaiveDate;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Days covered by the default window, `--until` included
const DEFAULT_WINDOW_DAYS: u64 = 30;

/// Per-meal carbohydrate statistics from Nightscout treatment logs
#[derive(Parser, Debug, Clone)]
#[command(name = "carbstat")]
#[command(version, about, long_about = None)]
#[command(group(ArgGroup::new("source").required(true).multiple(true).args(["url", "input"])))]
pub struct Cli {
    /// Nightscout site root (e.g. https://my-site.herokuapp.com)
    #[arg(long, env = "NIGHTSCOUT_URL")]
    pub url: Option<String>,

    /// Nightscout access token
    #[arg(long, env = "NIGHTSCOUT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Read treatments from a JSON file instead of Nightscout (takes precedence over --url)
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// First day of the report (YYYY-MM-DD or YYYY-MM)
    #[arg(long)]
    pub since: Option<String>,

    /// Last day of the report (YYYY-MM-DD or YYYY-MM)
    #[arg(long)]
    pub until: Option<String>,

    /// Maximum number of treatments requested from Nightscout
    #[arg(long, default_value_t = DEFAULT_COUNT)]
    pub count: usize,

    /// Timezone for dates and meal hours (e.g. "America/New_York", "UTC")
    /// If not specified, uses the system's local timezone
    #[arg(long, short = 'z')]
    pub timezone: Option<String>,

    /// Use UTC for dates and meal hours (overrides --timezone)
    #[arg(long)]
    pub utc: bool,

    /// Fail on the first treatment with an unparseable timestamp
    #[arg(long)]
    pub strict: bool,

    /// Output as JSON
    #[arg(long, conflicts_with = "table")]
    pub json: bool,

    /// Output as tables
    #[arg(long)]
    pub table: bool,

    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

/// Where treatments come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Nightscout {
        url: String,
        token: Option<String>,
        count: usize,
    },
    File(PathBuf),
}

/// Validated settings for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: SourceConfig,
    pub window: DateWindow,
    pub timezone: TimezoneConfig,
    pub policy: MalformedPolicy,
    pub format: OutputFormat,
}

impl Cli {
    /// Output format selected by the flags
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.table {
            OutputFormat::Table
        } else {
            OutputFormat::Text
        }
    }

    /// Resolve the timezone, window and source into a [`RunConfig`]
    pub fn into_run_config(self) -> Result<RunConfig> {
        let timezone = TimezoneConfig::from_cli(self.timezone.as_deref(), self.utc)?;
        let since = self.since.as_deref().map(parse_date_filter).transpose()?;
        let until = self.until.as_deref().map(parse_date_filter).transpose()?;
        let window = resolve_window(since, until, timezone.today())?;

        let format = self.output_format();
        let policy = if self.strict {
            MalformedPolicy::Abort
        } else {
            MalformedPolicy::Skip
        };

        let source = match (self.url, self.input) {
            (_, Some(path)) => SourceConfig::File(path),
            (Some(url), None) => SourceConfig::Nightscout {
                url,
                token: self.token,
                count: self.count,
            },
            (None, None) => {
                return Err(CarbstatError::Config(
                    "Either --url (or NIGHTSCOUT_URL) or --input is required".to_string(),
                ));
            }
        };

        Ok(RunConfig {
            source,
            window,
            timezone,
            policy,
            format,
        })
    }
}

/// Build the report window from optional bounds
///
/// A missing `until` means `today`; a missing `since` means 29 days before
/// `until`.
pub fn resolve_window(
    since: Option<NaiveDate>,
    until: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<DateWindow> {
    let end = until.unwrap_or(today);
    let start = match since {
        Some(start) => start,
        None => end
            .checked_sub_days(chrono::Days::new(DEFAULT_WINDOW_DAYS - 1))
            .ok_or_else(|| CarbstatError::InvalidDate(format!("No default start before {end}")))?,
    };
    DateWindow::new(start, end)
}

/// Parse a date filter string
///
/// Accepts `YYYY-MM-DD`, or `YYYY-MM` for the first day of that month.
///
/// # Examples
/// ```
/// use carbstat::cli::parse_date_filter;
/// use chrono::Datelike;
///
/// let date = parse_date_filter("2018-06-29").unwrap();
/// assert_eq!(date.day(), 29);
///
/// let date = parse_date_filter("2018-05").unwrap();
/// assert_eq!(date.month(), 5);
/// assert_eq!(date.day(), 1);
/// ```
pub fn parse_date_filter(date_str: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        return Ok(date);
    }

    let parts: Vec<&str> = date_str.split('-').collect();
    if parts.len() == 2 {
        let year = parts[0]
            .parse::<i32>()
            .map_err(|_| CarbstatError::InvalidDate(format!("Invalid year in '{date_str}'")))?;
        let month = parts[1]
            .parse::<u32>()
            .map_err(|_| CarbstatError::InvalidDate(format!("Invalid month in '{date_str}'")))?;

        if !(1..=12).contains(&month) {
            return Err(CarbstatError::InvalidDate(format!(
                "Month must be between 1-12, got {month}"
            )));
        }

        NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| CarbstatError::InvalidDate(format!("Invalid date: {date_str}")))
    } else {
        Err(CarbstatError::InvalidDate(format!(
            "Invalid date format '{date_str}', expected YYYY-MM-DD or YYYY-MM"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use once_cell::sync::Lazy;
    use std::env;

    // Serializes environment variable modifications across tests
    static ENV_MUTEX: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

    /// Restores environment variables on drop
    struct EnvVarGuard {
        vars: Vec<(String, Option<String>)>,
    }

    impl EnvVarGuard {
        fn new() -> Self {
            Self { vars: Vec::new() }
        }

        fn remember(&mut self, key: &str) {
            self.vars.push((key.to_string(), env::var(key).ok()));
        }

        fn set(&mut self, key: &str, value: &str) {
            self.remember(key);
            unsafe { env::set_var(key, value) }
        }

        fn remove(&mut self, key: &str) {
            self.remember(key);
            unsafe { env::remove_var(key) }
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

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "carbstat",
            "--url",
            "https://ns.example.org",
            "--since",
            "2018-05-03",
            "--until",
            "2018-07-03",
            "--utc",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.url.as_deref(), Some("https://ns.example.org"));
        assert_eq!(cli.count, DEFAULT_COUNT);
        assert!(cli.utc);
        assert_eq!(cli.output_format(), OutputFormat::Json);
    }

    #[tokio::test]
    async fn test_source_is_required() {
        let _lock = ENV_MUTEX.lock().await;
        let mut guard = EnvVarGuard::new();
        guard.remove("NIGHTSCOUT_URL");

        assert!(Cli::try_parse_from(["carbstat", "--utc"]).is_err());
    }

    #[tokio::test]
    async fn test_url_from_environment() {
        let _lock = ENV_MUTEX.lock().await;
        let mut guard = EnvVarGuard::new();
        guard.set("NIGHTSCOUT_URL", "https://ns.example.org");

        let cli = Cli::try_parse_from(["carbstat", "--utc"]).unwrap();
        assert_eq!(cli.url.as_deref(), Some("https://ns.example.org"));
    }

    #[tokio::test]
    async fn test_input_wins_over_environment_url() {
        let _lock = ENV_MUTEX.lock().await;
        let mut guard = EnvVarGuard::new();
        guard.set("NIGHTSCOUT_URL", "https://ns.example.org");

        let cli = Cli::try_parse_from(["carbstat", "--input", "t.json", "--utc"]).unwrap();
        let config = cli.into_run_config().unwrap();
        assert_eq!(config.source, SourceConfig::File(PathBuf::from("t.json")));
    }

    #[test]
    fn test_input_wins_over_url_flag() {
        let cli = Cli::try_parse_from([
            "carbstat",
            "--url",
            "https://ns.example.org",
            "--input",
            "treatments.json",
            "--utc",
        ])
        .unwrap();
        let config = cli.into_run_config().unwrap();
        assert_eq!(config.source, SourceConfig::File(PathBuf::from("treatments.json")));
    }

    #[test]
    fn test_json_and_table_conflict() {
        let result = Cli::try_parse_from(["carbstat", "--input", "t.json", "--json", "--table"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_into_run_config() {
        let cli = Cli::try_parse_from([
            "carbstat",
            "--input",
            "treatments.json",
            "--since",
            "2018-05",
            "--until",
            "2018-07-03",
            "--timezone",
            "America/New_York",
            "--strict",
            "--table",
        ])
        .unwrap();
        let config = cli.into_run_config().unwrap();

        assert_eq!(config.source, SourceConfig::File(PathBuf::from("treatments.json")));
        assert_eq!(config.window.start(), date(2018, 5, 1));
        assert_eq!(config.window.end(), date(2018, 7, 3));
        assert_eq!(config.timezone.display_name(), "America/New_York");
        assert_eq!(config.policy, MalformedPolicy::Abort);
        assert_eq!(config.format, OutputFormat::Table);
    }

    #[test]
    fn test_nightscout_source_config() {
        let cli = Cli::try_parse_from([
            "carbstat",
            "--url",
            "https://ns.example.org",
            "--token",
            "reader-abc",
            "--count",
            "250",
            "--since",
            "2018-06-01",
            "--until",
            "2018-06-30",
            "--utc",
        ])
        .unwrap();
        let config = cli.into_run_config().unwrap();

        assert_eq!(
            config.source,
            SourceConfig::Nightscout {
                url: "https://ns.example.org".to_string(),
                token: Some("reader-abc".to_string()),
                count: 250,
            }
        );
        assert_eq!(config.policy, MalformedPolicy::Skip);
        assert_eq!(config.format, OutputFormat::Text);
    }

    #[test]
    fn test_reversed_window_is_rejected() {
        let cli = Cli::try_parse_from([
            "carbstat",
            "--input",
            "t.json",
            "--since",
            "2018-07-03",
            "--until",
            "2018-05-03",
            "--utc",
        ])
        .unwrap();
        assert!(matches!(
            cli.into_run_config(),
            Err(CarbstatError::EmptyWindow { .. })
        ));
    }

    #[test]
    fn test_invalid_timezone_is_rejected() {
        let cli = Cli::try_parse_from(["carbstat", "--input", "t.json", "-z", "Mars/Olympus"])
            .unwrap();
        assert!(matches!(
            cli.into_run_config(),
            Err(CarbstatError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn test_resolve_window_defaults() {
        let today = date(2018, 7, 3);

        let window = resolve_window(None, None, today).unwrap();
        assert_eq!(window.end(), today);
        assert_eq!(window.start(), date(2018, 6, 4));
        assert_eq!(window.len_days(), 30);

        let window = resolve_window(None, Some(date(2018, 6, 30)), today).unwrap();
        assert_eq!(window.start(), date(2018, 6, 1));

        let window = resolve_window(Some(date(2018, 5, 3)), None, today).unwrap();
        assert_eq!(window.len_days(), 62);
    }

    #[test]
    fn test_parse_date_filter() {
        let date = parse_date_filter("2018-06-29").unwrap();
        assert_eq!(date.year(), 2018);
        assert_eq!(date.month(), 6);
        assert_eq!(date.day(), 29);

        let date = parse_date_filter("2018-05").unwrap();
        assert_eq!(date.month(), 5);
        assert_eq!(date.day(), 1);

        assert!(parse_date_filter("invalid").is_err());
        assert!(parse_date_filter("2018-13").is_err());
        assert!(parse_date_filter("2018").is_err());
        assert!(parse_date_filter("2018-02-30").is_err());
    }
}
