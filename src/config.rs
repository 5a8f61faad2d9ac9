//! Command line and configuration file.
//!
//! Settings come from `~/.config/f1viewer/config.toml` (or `--config`),
//! created with defaults on first run.  Flags given on the command line win
//! over the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::f1::DEFAULT_API_BASE;

/// Terminal viewer for F1 schedules, standings and results.
#[derive(Debug, Parser)]
#[command(name = "f1viewer", version)]
#[command(about = "Live F1 schedules, standings and results in the terminal", long_about = None)]
pub struct Cli {
    /// Read settings from this file instead of the XDG config location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Season to show (e.g. 2024).  Defaults to the config file, then the
    /// current year.
    #[arg(long, global = true)]
    pub season: Option<i32>,

    /// Seconds between refreshes.
    #[arg(long, global = true)]
    pub interval: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Interactive tabbed viewer (default).
    Tui,
    /// Poll every feed on a timer and log what changed, without a UI.
    Watch,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Tui)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the Ergast-compatible API, without a trailing slash.
    pub api_base: String,
    pub poll_interval_secs: u64,
    /// Per-request timeout for every fetch.
    pub request_timeout_secs: u64,
    /// Season to open on; the current year when unset.
    pub season: Option<i32>,
    pub use_24h_clock: bool,
    /// `tracing` filter directive, e.g. `info,f1viewer=trace`.  `RUST_LOG`
    /// takes precedence.
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            poll_interval_secs: 60,
            request_timeout_secs: 15,
            season: None,
            use_24h_clock: false,
            log_filter: None,
        }
    }
}

impl Config {
    /// Apply command line overrides.
    pub fn merge_cli(mut self, cli: &Cli) -> Self {
        if let Some(season) = cli.season {
            self.season = Some(season);
        }
        if let Some(secs) = cli.interval {
            self.poll_interval_secs = secs;
        }
        self
    }

    /// Polling period, never shorter than one second.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn season_or(&self, current_year: i32) -> i32 {
        self.season.unwrap_or(current_year)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("f1viewer")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from `path` (or the XDG location), writing a default
/// file if none exists.  The second value is the path of a newly written
/// default, for the caller to log once logging is up.
pub fn load_or_init(path: Option<&Path>) -> Result<(Config, Option<PathBuf>)> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };

    if !path.exists() {
        let default_cfg = Config::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)
            .with_context(|| format!("writing default config to {}", path.display()))?;
        return Ok((default_cfg, Some(path)));
    }

    let data =
        fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let cfg: Config =
        toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    Ok((cfg, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = Config::default();
        assert_eq!(cfg.api_base, "https://api.jolpi.ca/ergast/f1");
        assert_eq!(cfg.poll_interval_secs, 60);
        assert_eq!(cfg.request_timeout_secs, 15);
        assert!(cfg.season.is_none());
        assert!(!cfg.use_24h_clock);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            season = 2023
            use_24h_clock = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.season, Some(2023));
        assert!(cfg.use_24h_clock);
        assert_eq!(cfg.poll_interval_secs, 60);
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn cli_overrides_file() {
        let cli = Cli::parse_from(["f1viewer", "--season", "2021", "--interval", "5", "watch"]);
        assert_eq!(cli.command(), Command::Watch);

        let cfg = Config {
            season: Some(2023),
            ..Config::default()
        }
        .merge_cli(&cli);
        assert_eq!(cfg.season, Some(2021));
        assert_eq!(cfg.poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn tui_is_default_command() {
        let cli = Cli::parse_from(["f1viewer"]);
        assert_eq!(cli.command(), Command::Tui);
        let cfg = Config::default().merge_cli(&cli);
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.season_or(2025), 2025);
    }

    #[test]
    fn zero_interval_is_clamped() {
        let cfg = Config {
            poll_interval_secs: 0,
            ..Config::default()
        };
        assert_eq!(cfg.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn load_or_init_writes_then_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let (first, created) = load_or_init(Some(&path)).unwrap();
        assert_eq!(first, Config::default());
        assert_eq!(created.as_deref(), Some(path.as_path()));
        assert!(path.exists());

        fs::write(&path, "poll_interval_secs = 30\n").unwrap();
        let (second, created) = load_or_init(Some(&path)).unwrap();
        assert_eq!(second.poll_interval_secs, 30);
        assert_eq!(created, None);
    }

    #[test]
    fn load_reports_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "poll_interval_secs = \"soon\"").unwrap();

        let err = load_or_init(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));
    }
}
