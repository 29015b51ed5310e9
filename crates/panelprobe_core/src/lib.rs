//! PanelProbe Core Library
//!
//! A black-box conformance harness for an admin-panel HTTP API, providing:
//! - A blocking JSON/multipart client that never fails a run on transport errors
//! - Named sessions with the permission snapshot issued at login
//! - Ordered feature sequences with fixture tracking and cleanup
//! - A result log, summary and JSON report
//!
//! # Quick Start
//!
//! ```no_run
//! use panelprobe_core::{cleanup, runner, Config, RunContext, SilentSink};
//!
//! let mut config = Config::default();
//! config.target.base_url = "http://localhost:3000/api".into();
//!
//! let mut ctx = RunContext::new(config, Box::new(SilentSink)).unwrap();
//! let report = runner::run(&mut ctx);
//! let teardown = cleanup::cleanup(&mut ctx, |_| {});
//!
//! println!("{} of {} passed", report.summary.passed, report.summary.total);
//! println!("{} fixtures deleted", teardown.deleted);
//! std::process::exit(report.summary.exit_code());
//! ```
//!
//! # Selecting sequences
//!
//! Authentication always runs; everything else can be narrowed:
//!
//! ```
//! use panelprobe_core::{Config, SequenceKind};
//!
//! let mut config = Config::default();
//! config.restrict_to(&[SequenceKind::Chat]);
//! assert_eq!(config.selected_sequences(), vec![SequenceKind::Auth, SequenceKind::Chat]);
//! ```

pub mod cleanup;
mod client;
mod config;
mod context;
mod error;
pub mod migrate;
mod report;
pub mod runner;
mod sequences;
mod session;

pub use cleanup::{CleanupFailure, CleanupReport};
pub use client::{
    ApiClient, ApiRequest, ApiResponse, FilePayload, Method, TRANSPORT_FAILURE_STATUS,
};
pub use config::{
    Config, CredentialsConfig, RunConfig, TargetConfig, DEFAULT_CONFIG_FILE, ENV_BASE_URL,
    ENV_PASSWORD, ENV_TIMEOUT_SECS, ENV_USERNAME,
};
pub use context::{Fixture, FixtureKind, ManagedAdmin, RunContext, RESTRICTED_SESSION};
pub use error::{ProbeError, Result};
pub use migrate::{legacy_skill_count, MigrationReport, MigrationStrategy, SkillMigrator};
pub use report::{ReportSink, Reporter, SilentSink, Summary, TestResult};
pub use runner::RunReport;
pub use sequences::{run_sequences, SequenceKind};
pub use session::{
    login, AdminIdentity, Permissions, Session, Sessions, SUPER_ADMIN_ROLE, SUPER_SESSION,
};
