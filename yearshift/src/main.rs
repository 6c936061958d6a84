//! yearshift - time-series year-shift backfill
//!
//! Queries one metric's series for a date range from the time-series
//! service, copies every sample forward by 1..=N calendar years and inserts
//! the generated series back.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yearshift::cli::Args;
use yearshift::{run_backfill, BackfillPlan, HttpSeriesClient};
use yearshift_common::config::{load_toml_config, Settings};
use yearshift_common::time::format_timestamp;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config file is read before tracing starts so its log level can apply
    let (toml_config, config_source) =
        load_toml_config(args.config.as_deref()).context("Failed to load config file")?;

    let log_level = toml_config.log_level(args.log_level.as_deref());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("yearshift={0},yearshift_common={0}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting yearshift v{}", env!("CARGO_PKG_VERSION"));

    match &config_source {
        Some(path) => info!("Config file: {}", path.display()),
        None => warn!("No config file found, using command line, environment and defaults"),
    }

    let settings =
        Settings::resolve(&args.overrides(), &toml_config).context("Invalid configuration")?;

    let query = &settings.backfill.query;
    info!(
        url = %settings.connection.url,
        metric = %query.series.metric,
        entity = %query.entity.pattern,
        start = %format_timestamp(&query.date.start),
        end = %format_timestamp(&query.date.end),
        years = settings.backfill.years,
        "Backfill configured"
    );

    let client = HttpSeriesClient::new(&settings.connection)
        .context("Failed to create time-series client")?;

    let plan = BackfillPlan::from_settings(&settings.backfill, args.dry_run);
    let summary = run_backfill(&client, &plan)
        .await
        .context("Backfill failed")?;

    info!(
        series = summary.series_processed,
        inserted = summary.series_inserted,
        source_samples = summary.source_samples,
        generated_samples = summary.generated_samples,
        skipped_dates = summary.skipped_dates,
        "Backfill complete"
    );

    Ok(())
}
