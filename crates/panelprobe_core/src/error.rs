//! Error types for panelprobe_core operations.
//!
//! Assertion outcomes against the panel are never errors; they are recorded as
//! [`TestResult`](crate::TestResult)s. This type covers the harness's own
//! failures: configuration, report output and the migration command.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for panelprobe_core operations.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Configuration error (loading, parsing, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// A sequence name did not match any known sequence.
    #[error("unknown sequence: {0}")]
    InvalidSequence(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// Writing the JSON report failed.
    #[error("failed to write report to {}: {}", path.display(), reason)]
    Report {
        /// Destination of the report
        path: PathBuf,
        /// Description of the failure
        reason: String,
    },

    /// The skills migration could not proceed or did not converge.
    #[error("migration error: {0}")]
    Migration(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Config(_) => Some(
                "Check panelprobe.toml or the PANELPROBE_* environment variables. \
                 Run 'panelprobe init-config' to write a fresh default file.",
            ),
            Self::InvalidSequence(_) => Some("Run 'panelprobe sequences' to list valid names."),
            Self::Migration(_) => Some(
                "Re-run with '--strategy recreate' if the server merges updates \
                 instead of replacing records.",
            ),
            _ => None,
        }
    }
}

/// Convenience Result type for panelprobe_core operations.
pub type Result<T> = std::result::Result<T, ProbeError>;
