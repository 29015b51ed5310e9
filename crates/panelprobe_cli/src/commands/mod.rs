//! CLI commands.

pub mod init;
pub mod migrate;
pub mod run;
pub mod sequences;

use anyhow::{Context, Result};
use console::style;
use panelprobe_core::{Config, ProbeError};
use std::path::Path;
use tracing::debug;

/// Load the config file, then apply PANELPROBE_* environment overrides.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = Config::load(path)
        .map_err(report_hint)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    config.apply_env().map_err(report_hint)?;
    debug!(path = %path.display(), base_url = %config.target.base_url, "loaded configuration");
    Ok(config)
}

/// Print the recovery hint for a core error and pass it on.
pub fn report_hint(err: ProbeError) -> ProbeError {
    if let Some(hint) = err.recovery_suggestion() {
        eprintln!("{} {}", style("hint:").cyan(), hint);
    }
    err
}
