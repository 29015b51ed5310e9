//! Result log and summary.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

/// One assertion outcome. Immutable once recorded.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    /// Set when the assertion could not be attempted at all.
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Offending response body, kept for failures only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

/// Receives results as they are recorded.
///
/// The CLI renders them to the terminal; tests use [`SilentSink`].
pub trait ReportSink {
    /// Called when a sequence starts.
    fn on_sequence(&mut self, _title: &str) {}

    /// Called once per recorded result.
    fn on_result(&mut self, _result: &TestResult) {}
}

/// Sink that drops everything.
#[derive(Debug, Default)]
pub struct SilentSink;

impl ReportSink for SilentSink {}

/// Ordered log of every assertion in a run.
pub struct Reporter {
    results: Vec<TestResult>,
    sink: Box<dyn ReportSink>,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(Box::new(SilentSink))
    }
}

impl Reporter {
    pub fn new(sink: Box<dyn ReportSink>) -> Self {
        Self {
            results: Vec::new(),
            sink,
        }
    }

    /// Announce the start of a sequence.
    pub fn begin_sequence(&mut self, title: &str) {
        info!(sequence = title, "starting sequence");
        self.sink.on_sequence(title);
    }

    /// Record an outcome and return it, so callers can branch on it.
    pub fn record(&mut self, name: &str, passed: bool, message: impl Into<String>) -> bool {
        self.push(name, passed, false, message.into(), None)
    }

    /// Record an outcome, keeping `payload` when it failed.
    pub fn record_with_payload(
        &mut self,
        name: &str,
        passed: bool,
        message: impl Into<String>,
        payload: &Value,
    ) -> bool {
        let payload = (!passed).then(|| payload.clone());
        self.push(name, passed, false, message.into(), payload)
    }

    /// Record that an assertion or a whole sequence could not run. Skips count
    /// as failures.
    pub fn skip(&mut self, name: &str, reason: impl Into<String>) {
        self.push(name, false, true, reason.into(), None);
    }

    fn push(
        &mut self,
        name: &str,
        passed: bool,
        skipped: bool,
        message: String,
        payload: Option<Value>,
    ) -> bool {
        debug!(test = name, passed, skipped, "recorded result");
        let result = TestResult {
            name: name.to_string(),
            passed,
            skipped,
            message: (!message.is_empty()).then_some(message),
            payload,
            timestamp: Utc::now(),
        };
        self.sink.on_result(&result);
        self.results.push(result);
        passed
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    /// Look up the most recent result with this name.
    pub fn find(&self, name: &str) -> Option<&TestResult> {
        self.results.iter().rev().find(|r| r.name == name)
    }

    pub fn summary(&self) -> Summary {
        Summary::from_results(&self.results)
    }
}

/// Aggregate counts for a run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Failures that were skips.
    pub skipped: usize,
    /// Percentage of passed results, 0.0 for an empty run.
    pub success_rate: f64,
    pub failures: Vec<TestResult>,
}

impl Summary {
    pub fn from_results(results: &[TestResult]) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let failures: Vec<TestResult> = results.iter().filter(|r| !r.passed).cloned().collect();
        let skipped = failures.iter().filter(|r| r.skipped).count();
        let success_rate = if total == 0 {
            0.0
        } else {
            passed as f64 / total as f64 * 100.0
        };

        Self {
            total,
            passed,
            failed: total - passed,
            skipped,
            success_rate,
            failures,
        }
    }

    /// A run succeeds only when nothing failed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Process exit code for this run.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}
