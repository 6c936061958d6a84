//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;
use yearshift_common::config::ConfigOverrides;

/// Command-line arguments for yearshift
///
/// Every option is optional here; unset values fall back to the environment,
/// the TOML config file and compiled defaults, in that order.
#[derive(Parser, Debug, Default)]
#[command(name = "yearshift")]
#[command(about = "Copy time-series samples forward by whole calendar years")]
#[command(version)]
pub struct Args {
    /// TOML config file
    #[arg(short, long, env = "YEARSHIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the time-series service
    #[arg(long)]
    pub url: Option<String>,

    /// Username for basic authentication
    #[arg(short, long)]
    pub username: Option<String>,

    /// Password for basic authentication
    #[arg(short, long)]
    pub password: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Metric to backfill
    #[arg(short, long)]
    pub metric: Option<String>,

    /// Entity name or wildcard pattern (`*` = all entities)
    #[arg(short, long)]
    pub entity: Option<String>,

    /// Range start, ISO-8601 (inclusive)
    #[arg(long)]
    pub start: Option<String>,

    /// Range end, ISO-8601 (exclusive)
    #[arg(long)]
    pub end: Option<String>,

    /// Number of years to copy each sample forward
    #[arg(short, long)]
    pub years: Option<u32>,

    /// Query and transform only; do not insert
    #[arg(long)]
    pub dry_run: bool,

    /// Log level (overridden by RUST_LOG)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            url: self.url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            timeout_secs: self.timeout_secs,
            metric: self.metric.clone(),
            entity: self.entity.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
            years: self.years,
            log_level: self.log_level.clone(),
        }
    }
}
