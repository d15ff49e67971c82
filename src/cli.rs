//! Command-line interface parsing
//!
//! Parses CLI flags (with `DAILY_CONTENT_*` environment fallbacks) into a
//! validated [`ServerConfig`].

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveTime;
use clap::Parser;
use thiserror::Error;

use crate::refresh::RefreshConfig;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// A refresh time was not in HH:MM form
    #[error("Invalid refresh time: '{0}'. Expected HH:MM (24-hour, UTC)")]
    InvalidRefreshTime(String),

    /// Source timeout of zero seconds
    #[error("Source timeout must be at least 1 second")]
    ZeroTimeout,
}

/// Daily content API - serves a daily quote and good deed over HTTP
#[derive(Parser, Debug)]
#[command(name = "daily-content")]
#[command(about = "Serves daily inspirational quotes and good deeds over HTTP")]
#[command(version)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "DAILY_CONTENT_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(long, short, env = "DAILY_CONTENT_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Per-source fetch timeout in seconds
    #[arg(long, env = "DAILY_CONTENT_SOURCE_TIMEOUT", default_value_t = 10)]
    pub source_timeout_secs: u64,

    /// Time of day (UTC, HH:MM) for scheduled refresh; repeat for several
    ///
    /// Examples:
    ///   daily-content --refresh-at 00:00 --refresh-at 12:00
    ///   daily-content --refresh-at 06:00,18:00
    #[arg(
        long = "refresh-at",
        env = "DAILY_CONTENT_REFRESH_AT",
        value_name = "HH:MM",
        value_delimiter = ',',
        default_values = ["00:00", "12:00"]
    )]
    pub refresh_at: Vec<String>,

    /// Disable scheduled refresh
    #[arg(long, env = "DAILY_CONTENT_NO_SCHEDULE")]
    pub no_schedule: bool,

    /// Don't cache scraped pages on disk
    #[arg(long, env = "DAILY_CONTENT_NO_DISK_CACHE")]
    pub no_disk_cache: bool,

    /// Directory for the on-disk page cache (defaults to the XDG cache dir)
    #[arg(long, env = "DAILY_CONTENT_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Where the on-disk page cache lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiskCache {
    Disabled,
    /// Platform cache directory
    Default,
    Dir(PathBuf),
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub source_timeout: Duration,
    pub refresh: RefreshConfig,
    pub disk_cache: DiskCache,
}

/// Parses a `HH:MM` refresh time
pub fn parse_refresh_time(s: &str) -> Result<NaiveTime, CliError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|_| CliError::InvalidRefreshTime(s.to_string()))
}

impl ServerConfig {
    /// Validates parsed CLI arguments
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.source_timeout_secs == 0 {
            return Err(CliError::ZeroTimeout);
        }

        let mut times = cli
            .refresh_at
            .iter()
            .map(|s| parse_refresh_time(s))
            .collect::<Result<Vec<_>, _>>()?;
        times.sort();
        times.dedup();

        let disk_cache = match (&cli.cache_dir, cli.no_disk_cache) {
            (_, true) => DiskCache::Disabled,
            (Some(dir), false) => DiskCache::Dir(dir.clone()),
            (None, false) => DiskCache::Default,
        };

        Ok(Self {
            addr: SocketAddr::new(cli.bind, cli.port),
            source_timeout: Duration::from_secs(cli.source_timeout_secs),
            refresh: RefreshConfig {
                times,
                enabled: !cli.no_schedule,
            },
            disk_cache,
        })
    }
}
