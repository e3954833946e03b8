//! Run orchestration
//!
//! Connects a [`RunConfig`] to the pipeline: picks the treatment source,
//! fetches, builds the report and renders it.

use crate::cli::{RunConfig, SourceConfig};
use carbstat_core::error::Result;
use carbstat_core::report::{MealReport, ReportBuilder};
use carbstat_core::source::TreatmentSource;
use carbstat_source::{FileSource, NightscoutClient};
use carbstat_terminal::output::{OutputFormat, get_formatter};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::info;

/// Instantiate the configured treatment source
pub fn build_source(config: &SourceConfig) -> Box<dyn TreatmentSource> {
    match config {
        SourceConfig::Nightscout { url, token, count } => Box::new(
            NightscoutClient::new(url.clone())
                .with_token(token.clone())
                .with_count(*count),
        ),
        SourceConfig::File(path) => Box::new(FileSource::new(path.clone())),
    }
}

fn fetch_spinner(description: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]")
    {
        pb.set_style(style);
    }
    pb.set_message(format!("Fetching treatments from {description}"));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Fetch treatments and build the report
pub async fn build_report(config: &RunConfig, show_progress: bool) -> Result<MealReport> {
    info!("Using timezone: {}", config.timezone.display_name());

    let source = build_source(&config.source);
    let progress = show_progress.then(|| fetch_spinner(&source.describe()));
    let fetched = source.fetch(&config.window).await;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    let raw = fetched?;
    info!("Received {} treatments from {}", raw.len(), source.describe());

    ReportBuilder::new(config.window, config.timezone.clone())
        .with_policy(config.policy)
        .build(raw)
}

/// Fetch, build and render the report
///
/// `interactive` enables the fetch spinner (except for JSON output) and
/// highlighted headings.
pub async fn generate_report(config: &RunConfig, interactive: bool) -> Result<String> {
    let show_progress = interactive && config.format != OutputFormat::Json;
    let report = build_report(config, show_progress).await?;
    Ok(get_formatter(config.format, interactive).format_report(&report))
}
