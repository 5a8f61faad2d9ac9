use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,f1viewer=debug";

/// Initialize structured logging to `~/.local/state/f1viewer/f1viewer.log`.
///
/// The terminal belongs to the UI in TUI mode, so nothing goes to stderr.
/// Returns the log file path so it can be shown in the status bar.
pub fn init_logging(configured: Option<&str>) -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("f1viewer")?;
    let (file, log_file_path) = open_log_file(&xdg_dirs.get_state_home())?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(configured))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))?;

    tracing::info!("f1viewer logging initialized at {}", log_file_path.display());
    Ok(log_file_path)
}

/// Initialize logging to stderr, for headless mode.
pub fn init_logging_stderr(configured: Option<&str>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(configured))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))
}

fn open_log_file(dir: &Path) -> Result<(File, PathBuf)> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join("f1viewer.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;
    Ok((file, path))
}

/// `RUST_LOG` first, then the config file, then the built-in default.
fn env_filter(configured: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(filter_directive(configured))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    })
}

fn filter_directive(configured: Option<&str>) -> &str {
    configured
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_filter_wins_over_default() {
        assert_eq!(filter_directive(Some("warn")), "warn");
        assert_eq!(filter_directive(Some("  ")), DEFAULT_FILTER);
        assert_eq!(filter_directive(None), DEFAULT_FILTER);
    }

    #[test]
    fn log_file_is_created_and_appended() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state");

        let (_, path) = open_log_file(&state).unwrap();
        assert_eq!(path, state.join("f1viewer.log"));
        fs::write(&path, "first\n").unwrap();

        let (mut file, _) = open_log_file(&state).unwrap();
        std::io::Write::write_all(&mut file, b"second\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
