use crate::console::Console;
use crate::error::Result;
use crate::registry::Component;
use crate::shell::{Invocation, Shell};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOptions {
    /// Echo each expanded command before running it.
    pub verbose: bool,
    /// Build and echo commands, never execute them.
    pub dry_run: bool,
    /// Ask for confirmation before each command.
    pub prompt: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    DryRun,
    Declined,
    /// The command ran. Its exit code is informational only.
    Completed { code: Option<i32> },
}

/// Append `args` to `command`, each separated by a single space.
pub fn append_args<S: AsRef<str>>(command: &str, args: &[S]) -> String {
    let mut out = command.to_string();
    for arg in args {
        out.push(' ');
        out.push_str(arg.as_ref());
    }
    out
}

/// Run the fully expanded `command` in `component`'s directory.
///
/// A non-zero exit is logged and reported in the outcome but is not an error.
pub fn execute(
    component: &Component,
    command: &str,
    options: &ExecOptions,
    shell: &mut dyn Shell,
    console: &mut dyn Console,
) -> Result<ExecOutcome> {
    let invocation = Invocation::new(component, command);
    if options.dry_run {
        return Ok(ExecOutcome::DryRun);
    }

    if options.prompt {
        let question = format!(
            "Confirm to run the following command: {}",
            invocation.script()
        );
        if !console.confirm(&question)? {
            tracing::info!(component = %component.name, "declined by user");
            return Ok(ExecOutcome::Declined);
        }
    }

    let code = shell.run(&invocation)?;
    if code != Some(0) {
        tracing::warn!(
            component = %component.name,
            code = ?code,
            "command exited unsuccessfully"
        );
    }
    Ok(ExecOutcome::Completed { code })
}
