use anyhow::{anyhow, bail, Result};
use panelprobe_core::{legacy_skill_count, CleanupReport, MigrationReport, RunReport, TestResult};

use super::fake_panel::PanelState;

/// Declarative expectations on a scenario's outcome
pub enum Assertion {
    // Results of the last probe
    Passed(String),
    Failed(String),
    Skipped(String),
    NotRecorded(String),
    MessageContains { name: String, text: String },
    AllPassed,
    FailedCount(usize),
    ExitCode(i32),

    // Cleanup
    CleanupClean,
    Leftovers(usize),
    ResultsUnchangedByCleanup,

    // Panel state
    PanelCleaned,
    ContactRestored,
    LegacySkills(usize),
    RequestSeen(String),

    // Migration
    MigrationClean,
    MigrationRemaining(usize),

    // Custom check against the panel
    Custom(Box<dyn Fn(&PanelState) -> Result<()> + Send + Sync>),
}

impl std::fmt::Debug for Assertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed(name) => write!(f, "Passed({:?})", name),
            Self::Failed(name) => write!(f, "Failed({:?})", name),
            Self::Skipped(name) => write!(f, "Skipped({:?})", name),
            Self::NotRecorded(name) => write!(f, "NotRecorded({:?})", name),
            Self::MessageContains { name, text } => {
                write!(f, "MessageContains {{ name: {:?}, text: {:?} }}", name, text)
            }
            Self::AllPassed => write!(f, "AllPassed"),
            Self::FailedCount(n) => write!(f, "FailedCount({})", n),
            Self::ExitCode(code) => write!(f, "ExitCode({})", code),
            Self::CleanupClean => write!(f, "CleanupClean"),
            Self::Leftovers(n) => write!(f, "Leftovers({})", n),
            Self::ResultsUnchangedByCleanup => write!(f, "ResultsUnchangedByCleanup"),
            Self::PanelCleaned => write!(f, "PanelCleaned"),
            Self::ContactRestored => write!(f, "ContactRestored"),
            Self::LegacySkills(n) => write!(f, "LegacySkills({})", n),
            Self::RequestSeen(request) => write!(f, "RequestSeen({:?})", request),
            Self::MigrationClean => write!(f, "MigrationClean"),
            Self::MigrationRemaining(n) => write!(f, "MigrationRemaining({})", n),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// What the assertions can look at
pub struct Outcome<'a> {
    pub report: Option<&'a RunReport>,
    pub cleanup: Option<&'a CleanupReport>,
    pub migration: Option<&'a MigrationReport>,
    /// Result count recorded by the live context after cleanup ran
    pub results_after_cleanup: Option<usize>,
    pub panel: Option<&'a PanelState>,
}

impl Outcome<'_> {
    fn report(&self) -> Result<&RunReport> {
        self.report.ok_or_else(|| anyhow!("no probe has run"))
    }

    fn result(&self, name: &str) -> Result<&TestResult> {
        let report = self.report()?;
        report
            .results
            .iter()
            .rev()
            .find(|r| r.name == name)
            .ok_or_else(|| {
                let names: Vec<&str> = report.results.iter().map(|r| r.name.as_str()).collect();
                anyhow!("no result named {:?}; recorded: {:?}", name, names)
            })
    }

    fn cleanup(&self) -> Result<&CleanupReport> {
        self.cleanup.ok_or_else(|| anyhow!("cleanup has not run"))
    }

    fn migration(&self) -> Result<&MigrationReport> {
        self.migration.ok_or_else(|| anyhow!("migration has not run"))
    }

    fn panel(&self) -> Result<&PanelState> {
        self.panel.ok_or_else(|| anyhow!("panel is not running"))
    }
}

impl Assertion {
    /// Check the assertion, describing the mismatch on failure
    pub fn check(&self, outcome: &Outcome<'_>) -> Result<()> {
        match self {
            Self::Passed(name) => {
                let result = outcome.result(name)?;
                if !result.passed {
                    bail!("{:?} failed: {:?}", name, result.message);
                }
            }
            Self::Failed(name) => {
                let result = outcome.result(name)?;
                if result.passed {
                    bail!("{:?} passed: {:?}", name, result.message);
                }
            }
            Self::Skipped(name) => {
                let result = outcome.result(name)?;
                if result.passed || !result.skipped {
                    bail!("{:?} was not a skip: {:?}", name, result);
                }
            }
            Self::NotRecorded(name) => {
                if outcome.report()?.results.iter().any(|r| r.name == *name) {
                    bail!("{:?} was recorded", name);
                }
            }
            Self::MessageContains { name, text } => {
                let result = outcome.result(name)?;
                let message = result.message.as_deref().unwrap_or_default();
                if !message.contains(text.as_str()) {
                    bail!("{:?} message {:?} lacks {:?}", name, message, text);
                }
            }
            Self::AllPassed => {
                let report = outcome.report()?;
                if !report.summary.failures.is_empty() {
                    let failures: Vec<String> = report
                        .summary
                        .failures
                        .iter()
                        .map(|f| format!("{}: {}", f.name, f.message.as_deref().unwrap_or("")))
                        .collect();
                    bail!("{} failures:\n  {}", failures.len(), failures.join("\n  "));
                }
            }
            Self::FailedCount(expected) => {
                let failed = outcome.report()?.summary.failed;
                if failed != *expected {
                    bail!("expected {} failures, got {}", expected, failed);
                }
            }
            Self::ExitCode(expected) => {
                let code = outcome.report()?.summary.exit_code();
                if code != *expected {
                    bail!("expected exit code {}, got {}", expected, code);
                }
            }
            Self::CleanupClean => {
                let cleanup = outcome.cleanup()?;
                if !cleanup.is_clean() {
                    bail!("cleanup left fixtures behind: {:?}", cleanup.failures);
                }
            }
            Self::Leftovers(expected) => {
                let leftovers = outcome.cleanup()?.leftovers().count();
                if leftovers != *expected {
                    bail!("expected {} leftovers, got {}", expected, leftovers);
                }
            }
            Self::ResultsUnchangedByCleanup => {
                let before = outcome.report()?.results.len();
                let after = outcome
                    .results_after_cleanup
                    .ok_or_else(|| anyhow!("cleanup has not run"))?;
                if before != after {
                    bail!("cleanup changed the result log: {} -> {}", before, after);
                }
            }
            Self::PanelCleaned => {
                let panel = outcome.panel()?;
                let admins = panel.admin_usernames();
                if admins.len() != 1 {
                    bail!("expected only the super admin, found {:?}", admins);
                }
                let left = (panel.storage_count(), panel.project_count(), panel.service_count());
                if left != (0, 0, 0) {
                    bail!("storage/projects/services left behind: {:?}", left);
                }
            }
            Self::ContactRestored => {
                let email = outcome.panel()?.contact()["email"].clone();
                if email != "hello@example.com" {
                    bail!("contact email not restored: {}", email);
                }
            }
            Self::LegacySkills(expected) => {
                let count = legacy_skill_count(outcome.panel()?.skills());
                if count != *expected {
                    bail!("expected {} legacy skills on the panel, got {}", expected, count);
                }
            }
            Self::RequestSeen(request) => {
                let panel = outcome.panel()?;
                if !panel.requests().iter().any(|r| r == request) {
                    bail!("panel never saw {:?}", request);
                }
            }
            Self::MigrationClean => {
                let migration = outcome.migration()?;
                if !migration.is_clean() {
                    bail!(
                        "migration not clean: {} failed, {} remaining",
                        migration.failed(),
                        migration.remaining.len()
                    );
                }
            }
            Self::MigrationRemaining(expected) => {
                let remaining = outcome.migration()?.remaining.len();
                if remaining != *expected {
                    bail!("expected {} remaining legacy skills, got {}", expected, remaining);
                }
            }
            Self::Custom(check) => check(outcome.panel()?)?,
        }
        Ok(())
    }
}
