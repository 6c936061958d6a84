//! Configuration loading and resolution
//!
//! Every setting is resolved independently, highest priority first:
//! 1. Command-line argument
//! 2. Environment variable (`YEARSHIFT_*`)
//! 3. TOML config file
//! 4. Compiled default
//!
//! A missing default config file is not an error; the caller logs a warning
//! and carries on with defaults. A config file that exists but does not
//! parse is an error.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::filter::{DateFilter, EntityFilter, SeriesFilter, SeriesQuery};
use crate::time::parse_timestamp;
use crate::{Error, Result};

pub const ENV_URL: &str = "YEARSHIFT_URL";
pub const ENV_USERNAME: &str = "YEARSHIFT_USERNAME";
pub const ENV_PASSWORD: &str = "YEARSHIFT_PASSWORD";
pub const ENV_METRIC: &str = "YEARSHIFT_METRIC";
pub const ENV_ENTITY: &str = "YEARSHIFT_ENTITY";
pub const ENV_START: &str = "YEARSHIFT_START";
pub const ENV_END: &str = "YEARSHIFT_END";
pub const ENV_YEARS: &str = "YEARSHIFT_YEARS";

pub const DEFAULT_URL: &str = "http://localhost:8088";
pub const DEFAULT_ENTITY: &str = "*";
pub const DEFAULT_YEARS: u32 = 1;
/// Largest accepted year count; chrono dates end near year 262143
pub const MAX_YEARS: u32 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// `[connection]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSection {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// `[backfill]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackfillSection {
    pub metric: Option<String>,
    pub entity: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub years: Option<u32>,
}

/// `[logging]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

/// On-disk TOML configuration; every field is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub connection: ConnectionSection,
    pub backfill: BackfillSection,
    pub logging: LoggingConfig,
}

impl TomlConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Log level from the command line, else `[logging] level`, else the default
    pub fn log_level(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| self.logging.level.clone())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
    pub metric: Option<String>,
    pub entity: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub years: Option<u32>,
    pub log_level: Option<String>,
}

/// Where and how to reach the remote service
#[derive(Clone)]
pub struct ConnectionSettings {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// What to backfill
#[derive(Debug, Clone)]
pub struct BackfillSettings {
    pub query: SeriesQuery,
    pub years: u32,
}

/// Fully resolved and validated settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub connection: ConnectionSettings,
    pub backfill: BackfillSettings,
    pub log_level: String,
}

impl Settings {
    /// Resolve every setting across CLI, environment, TOML and defaults,
    /// then validate the result.
    pub fn resolve(overrides: &ConfigOverrides, toml: &TomlConfig) -> Result<Self> {
        let url = pick(overrides.url.as_ref(), ENV_URL, toml.connection.url.as_ref())
            .unwrap_or_else(|| DEFAULT_URL.to_string());
        if url.trim().is_empty() {
            return Err(Error::Config("connection url must not be empty".to_string()));
        }

        let username = pick(
            overrides.username.as_ref(),
            ENV_USERNAME,
            toml.connection.username.as_ref(),
        );
        let password = pick(
            overrides.password.as_ref(),
            ENV_PASSWORD,
            toml.connection.password.as_ref(),
        );

        let timeout_secs = overrides
            .timeout_secs
            .or(toml.connection.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than zero".to_string()));
        }

        let metric = pick(overrides.metric.as_ref(), ENV_METRIC, toml.backfill.metric.as_ref())
            .ok_or_else(|| {
                Error::Config(format!(
                    "metric not configured. Set one of:\n\
                     1. Command line: --metric <name>\n\
                     2. Environment: {}=<name>\n\
                     3. TOML config: [backfill] metric = \"<name>\"",
                    ENV_METRIC
                ))
            })?;

        let entity = pick(overrides.entity.as_ref(), ENV_ENTITY, toml.backfill.entity.as_ref())
            .unwrap_or_else(|| DEFAULT_ENTITY.to_string());

        let start = pick(overrides.start.as_ref(), ENV_START, toml.backfill.start.as_ref())
            .ok_or_else(|| Error::Config("start date not configured".to_string()))?;
        let end = pick(overrides.end.as_ref(), ENV_END, toml.backfill.end.as_ref())
            .ok_or_else(|| Error::Config("end date not configured".to_string()))?;

        let years = match overrides.years {
            Some(years) => years,
            None => match env_value(ENV_YEARS) {
                Some(raw) => raw.trim().parse::<u32>().map_err(|e| {
                    Error::Config(format!("{} must be a positive integer: {}", ENV_YEARS, e))
                })?,
                None => toml.backfill.years.unwrap_or(DEFAULT_YEARS),
            },
        };
        if years == 0 {
            return Err(Error::Config("years must be at least 1".to_string()));
        }
        if years > MAX_YEARS {
            return Err(Error::Config(format!(
                "years must be at most {}, got {}",
                MAX_YEARS, years
            )));
        }

        let query = SeriesQuery::new(
            SeriesFilter::new(metric)?,
            EntityFilter::new(entity)?,
            DateFilter::new(parse_timestamp(&start)?, parse_timestamp(&end)?)?,
        );

        let log_level = toml.log_level(overrides.log_level.as_deref());

        Ok(Self {
            connection: ConnectionSettings {
                url: url.trim_end_matches('/').to_string(),
                username,
                password,
                timeout: Duration::from_secs(timeout_secs),
            },
            backfill: BackfillSettings { query, years },
            log_level,
        })
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// CLI value, else environment variable, else TOML value
fn pick(cli: Option<&String>, env_var: &str, toml: Option<&String>) -> Option<String> {
    if let Some(value) = cli {
        return Some(value.clone());
    }
    if let Some(value) = env_value(env_var) {
        debug!(variable = env_var, "Using value from environment");
        return Some(value);
    }
    toml.cloned()
}

/// Candidate config file locations, most specific first
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("yearshift").join("config.toml"));
    }
    if cfg!(unix) {
        paths.push(PathBuf::from("/etc/yearshift/config.toml"));
    }
    paths
}

/// Load the TOML config, returning it with the path it came from.
///
/// An explicitly requested file must exist. Without one, the first existing
/// default location is used; if none exists the result is an empty config
/// and no path.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<(TomlConfig, Option<PathBuf>)> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return Ok((TomlConfig::from_file(path)?, Some(path.to_path_buf())));
    }

    match default_config_paths().into_iter().find(|p| p.exists()) {
        Some(path) => Ok((TomlConfig::from_file(&path)?, Some(path))),
        None => Ok((TomlConfig::default(), None)),
    }
}
