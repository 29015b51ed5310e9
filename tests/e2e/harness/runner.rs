use super::assertions::Outcome;
use super::fake_panel::{FakePanel, FakePanelBuilder};
use super::steps::ScenarioStep;
use anyhow::{anyhow, bail, Context, Result};
use panelprobe_core::{
    cleanup, login, runner, CleanupReport, Config, MigrationReport, MigrationStrategy,
    RunContext, RunReport, SequenceKind, Session, SilentSink, SkillMigrator,
};
use std::net::TcpListener;
use std::time::Duration;

/// Executes scenarios against a fake panel
pub struct ScenarioRunner {
    panel: Option<FakePanel>,
    config: Config,
    ctx: Option<RunContext>,
    report: Option<RunReport>,
    cleanup: Option<CleanupReport>,
    results_after_cleanup: Option<usize>,
    migration: Option<MigrationReport>,
    current_step: usize,
}

impl ScenarioRunner {
    /// Start the panel (unless `offline`) and point a config at it
    pub fn new(panel: Option<FakePanelBuilder>, mut config: Config) -> Result<Self> {
        let panel = panel.map(FakePanelBuilder::start);
        config.target.base_url = match &panel {
            Some(panel) => panel.base_url().to_string(),
            None => unused_base_url()?,
        };
        config.target.timeout_secs = config.target.timeout_secs.min(5);

        Ok(Self {
            panel,
            config,
            ctx: None,
            report: None,
            cleanup: None,
            results_after_cleanup: None,
            migration: None,
            current_step: 0,
        })
    }

    /// Get current step number
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Execute all steps in sequence
    pub fn execute(&mut self, steps: &[ScenarioStep]) -> Result<()> {
        for (i, step) in steps.iter().enumerate() {
            self.current_step = i;
            self.execute_step(step)
                .with_context(|| format!("Step {}: {:?}", i, step))?;
        }
        Ok(())
    }

    fn execute_step(&mut self, step: &ScenarioStep) -> Result<()> {
        match step {
            ScenarioStep::Probe { only, skip } => self.handle_probe(only, skip),
            ScenarioStep::Cleanup => self.handle_cleanup(),
            ScenarioStep::Migrate { strategy, dry_run } => self.handle_migrate(*strategy, *dry_run),
            ScenarioStep::StopPanel => {
                self.panel = None;
                Ok(())
            }
            ScenarioStep::Assert { assertion } => {
                let panel = self.panel.as_ref().map(FakePanel::state);
                let outcome = Outcome {
                    report: self.report.as_ref(),
                    cleanup: self.cleanup.as_ref(),
                    migration: self.migration.as_ref(),
                    results_after_cleanup: self.results_after_cleanup,
                    panel: panel.as_deref(),
                };
                assertion.check(&outcome)
            }
        }
    }

    fn handle_probe(&mut self, only: &[SequenceKind], skip: &[SequenceKind]) -> Result<()> {
        let mut config = self.config.clone();
        if !only.is_empty() {
            config.restrict_to(only);
        }
        config.exclude(skip);

        let mut ctx = RunContext::new(config, Box::new(SilentSink))?;
        self.report = Some(runner::run(&mut ctx));
        self.ctx = Some(ctx);
        self.cleanup = None;
        self.results_after_cleanup = None;
        Ok(())
    }

    fn handle_cleanup(&mut self) -> Result<()> {
        let ctx = self
            .ctx
            .as_mut()
            .ok_or_else(|| anyhow!("cleanup requested before any probe"))?;
        let report = cleanup::cleanup(ctx, |_| {});
        self.results_after_cleanup = Some(ctx.reporter.results().len());
        self.cleanup = Some(report);
        Ok(())
    }

    fn handle_migrate(&mut self, strategy: MigrationStrategy, dry_run: bool) -> Result<()> {
        let client = panelprobe_core::ApiClient::new(
            &self.config.target.base_url,
            Duration::from_secs(self.config.target.timeout_secs),
        )?;
        let response = login(
            &client,
            &self.config.credentials.username,
            &self.config.credentials.password,
        );
        let Some(session) = Session::from_login(&response) else {
            bail!("migration login failed: {}", response.describe());
        };
        let report = SkillMigrator::new(&client, &session.token).run(strategy, dry_run)?;
        self.migration = Some(report);
        Ok(())
    }
}

/// A base URL with nothing listening behind it.
fn unused_base_url() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{}/api", addr))
}
