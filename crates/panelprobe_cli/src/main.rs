//! PanelProbe CLI - conformance runs against an admin-panel API.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use panelprobe_core::{MigrationStrategy, SequenceKind, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

#[derive(Parser)]
#[command(name = "panelprobe")]
#[command(about = "Black-box conformance tests for the admin panel API", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (missing file means defaults)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the conformance sequences and report
    Run {
        /// Override the API base URL
        #[arg(long)]
        base_url: Option<String>,
        /// Run only these sequences (comma-separated; auth always runs)
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
        /// Skip these sequences (comma-separated)
        #[arg(long, value_delimiter = ',')]
        skip: Vec<String>,
        /// Write results and summary as JSON
        #[arg(long)]
        report: Option<PathBuf>,
        /// Leave created fixtures in place
        #[arg(long)]
        no_cleanup: bool,
    },
    /// Write a default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Strip legacy level/percentage fields from stored skills
    MigrateSkills {
        /// Only list affected skills
        #[arg(long)]
        dry_run: bool,
        /// Only check whether any skill still has legacy fields
        #[arg(long, conflicts_with = "dry_run")]
        verify: bool,
        /// How to rewrite each skill
        #[arg(long, value_enum, default_value_t = StrategyArg::Update)]
        strategy: StrategyArg,
    },
    /// List available sequences in execution order
    Sequences,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Update,
    Recreate,
}

impl From<StrategyArg> for MigrationStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Update => MigrationStrategy::Update,
            StrategyArg::Recreate => MigrationStrategy::Recreate,
        }
    }
}

fn parse_sequences(names: &[String]) -> Result<Vec<SequenceKind>> {
    names
        .iter()
        .filter(|n| !n.trim().is_empty())
        .map(|n| n.parse::<SequenceKind>().map_err(anyhow::Error::from))
        .collect()
}

fn main() -> Result<ExitCode> {
    // Respects RUST_LOG (e.g., RUST_LOG=panelprobe_core=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            base_url,
            only,
            skip,
            report,
            no_cleanup,
        } => commands::run::run(commands::run::RunArgs {
            config_path: cli.config,
            base_url,
            only: parse_sequences(&only)?,
            skip: parse_sequences(&skip)?,
            report,
            cleanup: !no_cleanup,
        }),
        Commands::InitConfig { force } => commands::init::run(&cli.config, force),
        Commands::MigrateSkills {
            dry_run,
            verify,
            strategy,
        } => commands::migrate::run(&cli.config, strategy.into(), dry_run, verify),
        Commands::Sequences => commands::sequences::run(),
    }
}
