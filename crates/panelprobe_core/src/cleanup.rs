//! Best-effort removal of everything a run created.
//!
//! Cleanup never records test results. Its outcome is a separate
//! [`CleanupReport`] so teardown problems cannot change the verdict.

use crate::context::{Fixture, RunContext};
use serde::Serialize;
use tracing::{info, warn};

/// A fixture that could not be deleted.
#[derive(Debug, Clone, Serialize)]
pub struct CleanupFailure {
    pub fixture: Fixture,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupReport {
    pub attempted: usize,
    pub deleted: usize,
    pub failures: Vec<CleanupFailure>,
}

impl CleanupReport {
    /// Fixtures still present on the panel.
    pub fn leftovers(&self) -> impl Iterator<Item = &Fixture> {
        self.failures.iter().map(|f| &f.fixture)
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Delete every tracked fixture, newest first, with the super-admin session.
///
/// Each delete is independent: a failure is logged and the rest still run.
/// `on_progress` is called before each attempt with the fixture about to go.
pub fn cleanup<F>(ctx: &mut RunContext, mut on_progress: F) -> CleanupReport
where
    F: FnMut(&Fixture),
{
    let pending: Vec<Fixture> = ctx.fixtures().iter().rev().cloned().collect();
    let mut report = CleanupReport {
        attempted: pending.len(),
        ..CleanupReport::default()
    };

    if pending.is_empty() {
        return report;
    }

    if ctx.super_token().is_none() {
        warn!(count = pending.len(), "no session for cleanup; fixtures left in place");
        report.failures = pending
            .into_iter()
            .map(|fixture| CleanupFailure {
                fixture,
                reason: "no authenticated session".to_string(),
            })
            .collect();
        return report;
    }

    for fixture in pending {
        on_progress(&fixture);
        let response = ctx.delete_fixture(fixture.kind, &fixture.id);
        if response.success {
            report.deleted += 1;
        } else {
            let reason = response.describe();
            warn!(kind = %fixture.kind, id = %fixture.id, %reason, "cleanup delete failed");
            report.failures.push(CleanupFailure { fixture, reason });
        }
    }

    info!(
        attempted = report.attempted,
        deleted = report.deleted,
        failed = report.failures.len(),
        "cleanup finished"
    );
    report
}
