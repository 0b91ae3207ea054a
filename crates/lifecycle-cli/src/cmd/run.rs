use crate::terminal::TerminalConsole;
use anyhow::Context;
use lifecycle_core::runner::{Outcome, RunRequest, Runner};
use lifecycle_core::shell::SystemShell;
use lifecycle_core::store::Store;
use std::path::Path;

pub fn run(root: &Path, request: &RunRequest, shell: &str) -> anyhow::Result<()> {
    let store = Store::at_root(root);
    let mut shell = SystemShell::detect(shell, root).context("cannot run component commands")?;
    let mut console = TerminalConsole::stdio();

    let report = Runner::new(&store, &mut shell, &mut console)
        .run(request)
        .map_err(|e| super::explain(e, &store))?;

    for run in &report.runs {
        if let Outcome::Completed { code } = run.outcome {
            tracing::debug!(component = %run.component, code = ?code, "component finished");
        }
    }
    if report.runs.is_empty() {
        tracing::warn!(command = %request.command, "no components matched the selection");
    }
    Ok(())
}
