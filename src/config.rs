//! Startup settings read from the environment. Only the log location and
//! filter are configurable; the catalog itself is never persisted.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".lending-library";
/// Log file written inside the data directory while the TUI owns the terminal.
const LOG_FILE_NAME: &str = "lending-library.log";
/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "LENDING_LIBRARY_HOME";
/// Environment variable holding a `tracing_subscriber::EnvFilter` directive.
pub const LOG_ENV: &str = "LENDING_LIBRARY_LOG";
/// Filter used when `LENDING_LIBRARY_LOG` is unset or blank.
const DEFAULT_LOG_FILTER: &str = "info";

/// Startup settings. Nothing here is persisted; the catalog always starts
/// empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the log file.
    pub data_dir: PathBuf,
    /// `tracing_subscriber::EnvFilter` directive string.
    pub log_filter: String,
}

impl Config {
    /// Resolve settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::resolve(env::var(HOME_ENV).ok(), env::var(LOG_ENV).ok())
    }

    /// Build a config from optional overrides, falling back to the user's
    /// home directory and the default filter.
    pub fn resolve(home_override: Option<String>, filter: Option<String>) -> Result<Self> {
        let data_dir = match home_override.filter(|value| !value.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };
        let log_filter = filter
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            data_dir,
            log_filter,
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }

    /// Make sure the data directory exists so the log file can be opened.
    pub fn ensure_data_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).context("failed to create data directory")
    }
}

/// Resolve `~/.lending-library` inside the user's home.
fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win() {
        let config = Config::resolve(Some("/tmp/shelf".into()), Some(" debug ".into())).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/shelf"));
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.log_path(), PathBuf::from("/tmp/shelf/lending-library.log"));
    }

    #[test]
    fn blank_filter_falls_back_to_default() {
        let config = Config::resolve(Some("/tmp/shelf".into()), Some("   ".into())).unwrap();
        assert_eq!(config.log_filter, "info");
    }
}
