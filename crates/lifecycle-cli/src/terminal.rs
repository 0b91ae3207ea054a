use lifecycle_core::console::Console;
use lifecycle_core::{LifecycleError, Result};
use std::io::{BufRead, Write};

const AFFIRM: &str = "y";
const DECLINE: &str = "n";

/// [`Console`] backed by the process's stdin/stdout/stderr.
pub struct TerminalConsole<R, O, E> {
    input: R,
    out: O,
    err: E,
}

impl TerminalConsole<std::io::StdinLock<'static>, std::io::Stdout, std::io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout(), std::io::stderr())
    }
}

impl<R: BufRead, O: Write, E: Write> TerminalConsole<R, O, E> {
    pub fn new(input: R, out: O, err: E) -> Self {
        Self { input, out, err }
    }
}

impl<R: BufRead, O: Write, E: Write> Console for TerminalConsole<R, O, E> {
    fn info(&mut self, message: &str) {
        let _ = writeln!(self.out, "{message}");
    }

    fn output(&mut self, text: &str) {
        let _ = write!(self.out, "{text}");
        let _ = self.out.flush();
    }

    fn warn(&mut self, message: &str) {
        let _ = writeln!(self.err, "warning: {message}");
    }

    /// Ask until the answer is exactly `y` or `n`.
    fn confirm(&mut self, question: &str) -> Result<bool> {
        loop {
            write!(self.out, "{question}\n[{AFFIRM}, {DECLINE}]: ")?;
            self.out.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(LifecycleError::Prompt(
                    "stdin closed before an answer was given".to_string(),
                ));
            }
            match line.trim_end_matches(['\r', '\n']) {
                AFFIRM => return Ok(true),
                DECLINE => return Ok(false),
                _ => writeln!(
                    self.out,
                    "Invalid option. Must provide one of the following: [{AFFIRM}, {DECLINE}]"
                )?,
            }
        }
    }
}
