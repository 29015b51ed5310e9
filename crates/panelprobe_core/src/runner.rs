//! Drives a whole run and packages its outcome.

use crate::context::RunContext;
use crate::error::{ProbeError, Result};
use crate::report::{Summary, TestResult};
use crate::sequences::{self, SequenceKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Everything a run produced, ready to print or serialize.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub base_url: String,
    pub sequences: Vec<SequenceKind>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub summary: Summary,
    pub results: Vec<TestResult>,
}

impl RunReport {
    /// Write the report as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let report_error = |reason: String| ProbeError::Report {
            path: path.to_path_buf(),
            reason,
        };
        let content = serde_json::to_string_pretty(self).map_err(|e| report_error(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| report_error(e.to_string()))?;
        }
        fs::write(path, content).map_err(|e| report_error(e.to_string()))
    }
}

/// Run every selected sequence and summarize. Cleanup is left to the caller
/// so the summary can be shown before teardown starts.
pub fn run(ctx: &mut RunContext) -> RunReport {
    let started_at = Utc::now();
    let selected = ctx.config.selected_sequences();
    info!(base_url = ctx.client.base_url(), sequences = selected.len(), "starting run");

    sequences::run_sequences(ctx);

    let summary = ctx.reporter.summary();
    info!(
        total = summary.total,
        passed = summary.passed,
        failed = summary.failed,
        "run finished"
    );

    RunReport {
        base_url: ctx.client.base_url().to_string(),
        sequences: selected,
        started_at,
        finished_at: Utc::now(),
        summary,
        results: ctx.reporter.results().to_vec(),
    }
}
