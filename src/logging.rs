//! File-backed tracing. The terminal belongs to the menu, so log lines go to
//! `lending-library.log` in the data directory instead of stderr.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Route `tracing` events to the log file named by `config`. The TUI draws on
/// stdout, so nothing is ever written to the terminal.
pub fn init(config: &Config) -> Result<()> {
    config.ensure_data_dir()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_path())
        .context("failed to open log file")?;

    let filter = EnvFilter::try_new(&config.log_filter).context("invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
        .context("failed to install log subscriber")
}
