//! Write a default configuration file.

use anyhow::{bail, Context, Result};
use console::style;
use panelprobe_core::{Config, ENV_BASE_URL, ENV_PASSWORD, ENV_TIMEOUT_SECS, ENV_USERNAME};
use std::path::Path;
use std::process::ExitCode;

pub fn run(path: &Path, force: bool) -> Result<ExitCode> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    Config::default()
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("{} Wrote {}", style("✓").green(), path.display());
    println!();
    println!("Environment overrides:");
    println!("  {:<24} - API base URL", ENV_BASE_URL);
    println!("  {:<24} - super admin username", ENV_USERNAME);
    println!("  {:<24} - super admin password", ENV_PASSWORD);
    println!("  {:<24} - request timeout in seconds", ENV_TIMEOUT_SECS);

    Ok(ExitCode::SUCCESS)
}
