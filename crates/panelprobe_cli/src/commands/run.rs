//! The conformance run.

use super::{load_config, report_hint};
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use panelprobe_core::{
    cleanup, runner, CleanupReport, ReportSink, RunContext, RunReport, SequenceKind, Summary,
    TestResult,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

pub struct RunArgs {
    pub config_path: PathBuf,
    pub base_url: Option<String>,
    pub only: Vec<SequenceKind>,
    pub skip: Vec<SequenceKind>,
    pub report: Option<PathBuf>,
    pub cleanup: bool,
}

/// Prints each result as it is recorded.
struct ConsoleSink;

impl ReportSink for ConsoleSink {
    fn on_sequence(&mut self, title: &str) {
        println!();
        println!("{}", style(format!("=== {} ===", title)).bold());
    }

    fn on_result(&mut self, result: &TestResult) {
        let badge = if result.passed {
            style("PASS").green().bold()
        } else if result.skipped {
            style("SKIP").yellow().bold()
        } else {
            style("FAIL").red().bold()
        };
        match &result.message {
            Some(message) => println!("  {} {}: {}", badge, result.name, style(message).dim()),
            None => println!("  {} {}", badge, result.name),
        }
    }
}

pub fn run(args: RunArgs) -> Result<ExitCode> {
    let mut config = load_config(&args.config_path)?;
    if let Some(base_url) = args.base_url {
        config.target.base_url = base_url;
    }
    if !args.only.is_empty() {
        config.restrict_to(&args.only);
    }
    config.exclude(&args.skip);

    let mut ctx = RunContext::new(config, Box::new(ConsoleSink))
        .map_err(report_hint)
        .context("Invalid run configuration")?;

    println!(
        "{} Testing {} (run {})",
        style("→").cyan(),
        style(ctx.client.base_url()).bold(),
        ctx.run_tag()
    );

    let report = runner::run(&mut ctx);
    print_summary(&report.summary);

    if let Some(path) = &args.report {
        report.write_json(path).map_err(report_hint)?;
        println!("{} Report written to {}", style("✓").green(), path.display());
    }

    if args.cleanup {
        let cleanup_report = run_cleanup(&mut ctx)?;
        print_cleanup(&cleanup_report);
    } else if !ctx.fixtures().is_empty() {
        println!(
            "{} Cleanup disabled, {} fixtures left in place",
            style("⚠").yellow(),
            ctx.fixtures().len()
        );
    }

    Ok(exit_code(&report))
}

fn exit_code(report: &RunReport) -> ExitCode {
    if report.summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_summary(summary: &Summary) {
    println!();
    println!("{}", style("Summary:").bold());
    println!("  Total:   {}", summary.total);
    println!("  Passed:  {}", style(summary.passed).green());
    println!(
        "  Failed:  {}",
        if summary.failed > 0 {
            style(summary.failed).red()
        } else {
            style(summary.failed).green()
        }
    );
    if summary.skipped > 0 {
        println!("  Skipped: {}", style(summary.skipped).yellow());
    }
    println!("  Success: {:.1}%", summary.success_rate);

    if !summary.failures.is_empty() {
        println!();
        println!("{}", style("Failures:").red().bold());
        for failure in &summary.failures {
            println!(
                "  {} {}: {}",
                style("✗").red(),
                failure.name,
                failure.message.as_deref().unwrap_or("no detail")
            );
            if let Some(payload) = &failure.payload {
                println!("      {}", style(payload.to_string()).dim());
            }
        }
    }
}

fn run_cleanup(ctx: &mut RunContext) -> Result<CleanupReport> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Cleaning up test data...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let spinner = pb.clone();
    let report = cleanup::cleanup(ctx, move |fixture| {
        spinner.set_message(format!("Deleting {} {}", fixture.kind, fixture.label));
    });

    pb.finish_and_clear();
    Ok(report)
}

fn print_cleanup(report: &CleanupReport) {
    if report.attempted == 0 {
        return;
    }
    println!();
    println!(
        "{} Cleanup: {} of {} fixtures deleted",
        if report.is_clean() {
            style("✓").green()
        } else {
            style("⚠").yellow()
        },
        report.deleted,
        report.attempted
    );
    for failure in &report.failures {
        println!(
            "  {} leftover {} {} ({}): {}",
            style("⚠").yellow(),
            failure.fixture.kind,
            failure.fixture.label,
            failure.fixture.id,
            failure.reason
        );
    }
}
