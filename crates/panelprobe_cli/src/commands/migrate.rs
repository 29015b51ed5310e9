//! Skills migration command.

use super::{load_config, report_hint};
use anyhow::{bail, Result};
use console::style;
use panelprobe_core::{
    login, ApiClient, MigrationReport, MigrationStrategy, Session, SkillMigrator,
};
use panelprobe_core::migrate::SkillOutcome;
use std::path::Path;
use std::process::ExitCode;

pub fn run(
    config_path: &Path,
    strategy: MigrationStrategy,
    dry_run: bool,
    verify_only: bool,
) -> Result<ExitCode> {
    let config = load_config(config_path)?;
    config.validate().map_err(report_hint)?;
    let client = ApiClient::new(&config.target.base_url, config.target.timeout())?;

    let response = login(
        &client,
        &config.credentials.username,
        &config.credentials.password,
    );
    let Some(session) = Session::from_login(&response) else {
        bail!("Login as {} failed: {}", config.credentials.username, response.describe());
    };
    let migrator = SkillMigrator::new(&client, &session.token);

    if verify_only {
        let remaining = migrator.verify().map_err(report_hint)?;
        if remaining.is_empty() {
            println!("{} No skill carries level or percentage", style("✓").green());
            return Ok(ExitCode::SUCCESS);
        }
        println!(
            "{} {} skills still carry legacy fields:",
            style("✗").red(),
            remaining.len()
        );
        for skill in &remaining {
            println!("  {} {:?}", skill.name, skill.fields);
        }
        return Ok(ExitCode::FAILURE);
    }

    let report = migrator.run(strategy, dry_run).map_err(report_hint)?;
    print_report(&report);

    Ok(if dry_run || report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_report(report: &MigrationReport) {
    if report.dry_run {
        println!(
            "{} Dry run: {} of {} skills carry legacy fields",
            style("→").cyan(),
            report.remaining.len(),
            report.total_skills
        );
        for skill in &report.remaining {
            println!("  {} ({}) {:?}", skill.name, skill.id, skill.fields);
        }
        return;
    }

    println!(
        "{} Migrated with strategy {}",
        style("→").cyan(),
        style(report.strategy).bold()
    );
    for (skill, outcome) in &report.outcomes {
        match outcome {
            SkillOutcome::Rewritten => println!("  {} {}", style("✓").green(), skill.name),
            SkillOutcome::Recreated { new_id } => {
                println!("  {} {} -> {}", style("✓").green(), skill.name, new_id)
            }
            SkillOutcome::Failed { reason } => {
                println!("  {} {}: {}", style("✗").red(), skill.name, reason)
            }
        }
    }

    if report.remaining.is_empty() {
        println!("{} All skills clean", style("✓").green());
    } else {
        println!(
            "{} {} skills still carry legacy fields after the update",
            style("⚠").yellow(),
            report.remaining.len()
        );
        if report.strategy == MigrationStrategy::Update {
            println!(
                "  {} the server may merge updates; try {}",
                style("Tip:").cyan(),
                style("--strategy recreate").cyan()
            );
        }
    }
}
