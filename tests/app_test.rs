//! Run-level tests: CLI flags through sources to rendered output

mod common;

use carbstat::app::{build_report, generate_report};
use carbstat::cli::{Cli, RunConfig, SourceConfig};
use carbstat_core::error::CarbstatError;
use carbstat_core::normalize::MalformedPolicy;
use carbstat_core::timezone::TimezoneConfig;
use carbstat_terminal::output::OutputFormat;
use clap::Parser;
use common::{meal, two_month_dump, window, write_treatments_file};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn file_config(path: &std::path::Path, format: OutputFormat) -> RunConfig {
    RunConfig {
        source: SourceConfig::File(path.to_path_buf()),
        window: window((2018, 6, 29), (2018, 6, 29)),
        timezone: TimezoneConfig::utc(),
        policy: MalformedPolicy::Skip,
        format,
    }
}

#[tokio::test]
async fn test_text_report_from_file() {
    let file = write_treatments_file(&[
        meal("Meal Bolus", "2018-06-29T08:12:40.422Z", 15.0, 0.75),
        meal("Correction Bolus", "2018-06-29T09:00:00.000Z", 0.0, 1.0),
    ]);

    let output = generate_report(&file_config(file.path(), OutputFormat::Text), false)
        .await
        .unwrap();

    assert!(output.contains("Found 1 entries between June 29th 2018 and June 29th 2018: "));
    assert!(output.contains("Meal Bolus: 0.75 units for 15g at Friday, June 29th 2018, 8:12:40 am"));
    assert!(output.contains("June 29th 2018:\nBreakfast: 15 g\nLunch: 0 g\nDinner: 0 g"));
    assert!(output.contains("Breakfast:\n  Average: 15.00 g\n  Min: 15 g\n  Max: 15 g"));
    assert!(output.contains("Dinner:\n  Average: 0.00 g"));
}

#[tokio::test]
async fn test_json_report_from_file() {
    let file = write_treatments_file(&[meal("Combo Bolus", "2018-06-29T18:00:00Z", 70.0, 5.0)]);

    let output = generate_report(&file_config(file.path(), OutputFormat::Json), false)
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(value["statistics"]["dinner"]["max"], 70.0);
    assert_eq!(value["days"].as_array().unwrap().len(), 1);
    assert_eq!(value["window"]["start"], "2018-06-29");
}

#[tokio::test]
async fn test_record_without_timestamp_is_skipped() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(
        &mut file,
        br#"[{"eventType":"Meal Bolus","carbs":40,"insulin":2},
             {"eventType":"Meal Bolus","created_at":"2018-06-29T12:30:00Z","carbs":25,"insulin":1}]"#,
    )
    .unwrap();

    let report = build_report(&file_config(file.path(), OutputFormat::Text), false)
        .await
        .unwrap();
    assert_eq!(report.skipped, 1);
    assert_eq!(report.series.lunch.values, vec![25.0]);
}

#[tokio::test]
async fn test_missing_input_file() {
    let config = file_config(std::path::Path::new("/nonexistent/carbstat.json"), OutputFormat::Text);
    assert!(matches!(
        build_report(&config, false).await,
        Err(CarbstatError::Io(_))
    ));
}

#[tokio::test]
async fn test_strict_policy_from_cli() {
    let file = write_treatments_file(&[meal("Meal Bolus", "yesterday", 15.0, 0.75)]);
    let path = file.path().to_string_lossy().to_string();

    let cli = Cli::try_parse_from([
        "carbstat", "--input", path.as_str(), "--since", "2018-06-29", "--until", "2018-06-29", "--utc",
        "--strict",
    ])
    .unwrap();
    let config = cli.into_run_config().unwrap();

    assert!(matches!(
        build_report(&config, false).await,
        Err(CarbstatError::MalformedTimestamp { .. })
    ));
}

#[tokio::test]
async fn test_nightscout_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/treatments"))
        .and(query_param("find[created_at][$gte]", "2018-05-02"))
        .and(query_param("find[created_at][$lte]", "2018-07-05"))
        .and(query_param("token", "reader-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(two_month_dump())))
        .expect(2)
        .mount(&server)
        .await;

    let config = RunConfig {
        source: SourceConfig::Nightscout {
            url: server.uri(),
            token: Some("reader-abc".to_string()),
            count: 10_000,
        },
        window: window((2018, 5, 3), (2018, 7, 3)),
        timezone: TimezoneConfig::utc(),
        policy: MalformedPolicy::Skip,
        format: OutputFormat::Table,
    };

    let report = build_report(&config, false).await.unwrap();
    assert_eq!(report.days.len(), 62);
    assert_eq!(report.statistics.breakfast.avg, 30.0);
    assert_eq!(report.statistics.dinner.avg, 60.0);

    let output = generate_report(&config, false).await;
    assert!(output.unwrap().contains("2018-07-03"));
}

#[tokio::test]
async fn test_nightscout_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/treatments"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = RunConfig {
        source: SourceConfig::Nightscout {
            url: server.uri(),
            token: None,
            count: 10_000,
        },
        window: window((2018, 6, 29), (2018, 6, 29)),
        timezone: TimezoneConfig::utc(),
        policy: MalformedPolicy::Skip,
        format: OutputFormat::Text,
    };

    assert!(matches!(
        build_report(&config, false).await,
        Err(CarbstatError::Http { status: 503, .. })
    ));
}
