use crate::error::Result;

/// User-facing side of a run: progress lines, captured output and the
/// confirmation prompt. The CLI prints to the terminal; tests record.
pub trait Console {
    /// An informational line (command echo, initialization banner).
    fn info(&mut self, message: &str);

    /// Output captured from a child process, passed through unchanged.
    fn output(&mut self, text: &str);

    /// A non-fatal problem, e.g. a component without the requested command.
    fn warn(&mut self, message: &str);

    /// Ask the user to confirm. `Ok(false)` means declined.
    fn confirm(&mut self, question: &str) -> Result<bool>;
}
