//! One invocation of the tool: load, select, expand, initialize, execute.
//!
//! Components are processed strictly one at a time in registry order. The
//! first initialization failure aborts the whole run before the failing
//! component's command (or any later component) is attempted.

use crate::console::Console;
use crate::error::{LifecycleError, Result};
use crate::executor::{self, ExecOptions, ExecOutcome};
use crate::init::{InitOutcome, InitPolicy, InitTracker};
use crate::registry::Component;
use crate::selector;
use crate::shell::Shell;
use crate::store::Store;
use crate::template::{self, TemplateVars};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRequest {
    /// Command name looked up in each component's `commands`.
    pub command: String,
    /// Components to target; empty means all.
    pub components: Vec<String>,
    pub labels: Vec<String>,
    /// `-t KEY VALUE` pairs in the order given.
    pub template_vars: Vec<(String, String)>,
    /// Literal tokens appended to the expanded command.
    pub args: Vec<String>,
    pub init: InitPolicy,
    pub exec: ExecOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    MissingCommand,
    DryRun,
    Declined,
    Completed { code: Option<i32> },
}

impl From<ExecOutcome> for Outcome {
    fn from(outcome: ExecOutcome) -> Self {
        match outcome {
            ExecOutcome::DryRun => Outcome::DryRun,
            ExecOutcome::Declined => Outcome::Declined,
            ExecOutcome::Completed { code } => Outcome::Completed { code },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRun {
    pub component: String,
    /// The expanded command; `None` when the component lacks the command.
    pub command: Option<String>,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub runs: Vec<ComponentRun>,
}

impl RunReport {
    pub fn outcome(&self, component: &str) -> Option<&Outcome> {
        self.runs
            .iter()
            .find(|r| r.component == component)
            .map(|r| &r.outcome)
    }

    pub fn executed(&self) -> usize {
        self.runs
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Completed { .. }))
            .count()
    }
}

pub struct Runner<'a> {
    store: &'a Store,
    shell: &'a mut dyn Shell,
    console: &'a mut dyn Console,
}

impl<'a> Runner<'a> {
    pub fn new(store: &'a Store, shell: &'a mut dyn Shell, console: &'a mut dyn Console) -> Self {
        Self {
            store,
            shell,
            console,
        }
    }

    pub fn run(&mut self, request: &RunRequest) -> Result<RunReport> {
        let registry = self.store.load_registry()?;
        let selected = selector::select(&registry, &request.components, &request.labels)?;
        let vars = registry.template_vars(request.template_vars.iter().cloned());

        // Loaded on first use so dry runs never touch the lock file.
        let mut tracker: Option<InitTracker<'a>> = None;
        let mut report = RunReport::default();

        for component in selected {
            let run = self.run_component(component, request, &vars, &mut tracker)?;
            report.runs.push(run);
        }

        tracing::debug!(
            selected = report.runs.len(),
            executed = report.executed(),
            "run finished"
        );
        Ok(report)
    }

    fn run_component(
        &mut self,
        component: &Component,
        request: &RunRequest,
        vars: &TemplateVars,
        tracker: &mut Option<InitTracker<'a>>,
    ) -> Result<ComponentRun> {
        let Some(raw) = component.command(&request.command) else {
            self.console.warn(&format!(
                "Command '{}' does not exist for component '{}'",
                request.command, component.name
            ));
            return Ok(ComponentRun {
                component: component.name.clone(),
                command: None,
                outcome: Outcome::MissingCommand,
            });
        };

        template::warn_on_command_cycle(component, &request.command);
        let command = executor::append_args(&template::expand(raw, component, vars), &request.args);
        let leftover = template::unresolved_tokens(&command);
        if !leftover.is_empty() {
            tracing::debug!(component = %component.name, tokens = ?leftover, "unresolved placeholders");
        }

        if request.exec.verbose || request.exec.dry_run {
            self.console
                .info(&format!("Running the following command:\n  {command}"));
        }

        let outcome = if request.exec.dry_run {
            Outcome::DryRun
        } else {
            let tracker = match tracker {
                Some(t) => t,
                empty => empty.insert(InitTracker::load(self.store)?),
            };
            let init = tracker.prepare(
                component,
                vars,
                request.init,
                &mut *self.shell,
                &mut *self.console,
            )?;
            if let InitOutcome::Failed { stderr, .. } = init {
                return Err(LifecycleError::InitializationFailed {
                    component: component.name.clone(),
                    stderr: stderr.trim_end().to_string(),
                });
            }
            executor::execute(
                component,
                &command,
                &request.exec,
                &mut *self.shell,
                &mut *self.console,
            )?
            .into()
        };

        Ok(ComponentRun {
            component: component.name.clone(),
            command: Some(command),
            outcome,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
