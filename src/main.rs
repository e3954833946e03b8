//! carbstat - Per-meal carbohydrate statistics from Nightscout treatment logs

use carbstat::{Result, app::generate_report, cli::Cli};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            tracing_subscriber::EnvFilter::new("carbstat=info,carbstat_core=info,carbstat_source=info")
        } else {
            tracing_subscriber::EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.into_run_config()?;
    info!(
        "Building meal report for {} to {}",
        config.window.start(),
        config.window.end()
    );

    let interactive = is_terminal::is_terminal(std::io::stdout());
    let output = generate_report(&config, interactive).await?;
    println!("{output}");

    Ok(())
}
