use panelprobe_core::{MigrationStrategy, SequenceKind};

use super::assertions::Assertion;

/// Everything a scenario can do, in order
#[derive(Debug)]
pub enum ScenarioStep {
    /// Run the conformance sequences against the panel
    Probe {
        only: Vec<SequenceKind>,
        skip: Vec<SequenceKind>,
    },
    /// Tear down the fixtures of the last probe
    Cleanup,
    /// Run the skills migration
    Migrate {
        strategy: MigrationStrategy,
        dry_run: bool,
    },
    /// Shut the panel down; later requests find nothing listening
    StopPanel,
    /// Check an expectation
    Assert { assertion: Assertion },
}
