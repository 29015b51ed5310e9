use anyhow::Result;
use console::style;
use panelprobe_core::SequenceKind;
use std::process::ExitCode;

/// Print every sequence in execution order.
pub fn run() -> Result<ExitCode> {
    for kind in SequenceKind::ALL {
        let note = if kind.requires_session() {
            ""
        } else {
            " (always runs)"
        };
        println!(
            "  {:<10} {}{}",
            style(kind.name()).cyan(),
            kind.description(),
            style(note).dim()
        );
    }
    Ok(ExitCode::SUCCESS)
}
