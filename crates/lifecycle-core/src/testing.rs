//! In-memory [`Shell`] and [`Console`] used by unit tests.

use crate::console::Console;
use crate::error::{LifecycleError, Result};
use crate::shell::{Captured, Invocation, Shell};
use std::collections::{HashMap, VecDeque};

/// Records every invocation. Captures succeed with empty output unless a
/// result was scripted for the command text.
#[derive(Debug)]
pub struct FakeShell {
    pub runs: Vec<Invocation>,
    pub captures: Vec<Invocation>,
    capture_results: HashMap<String, Captured>,
    run_code: Option<i32>,
}

impl Default for FakeShell {
    fn default() -> Self {
        Self {
            runs: Vec::new(),
            captures: Vec::new(),
            capture_results: HashMap::new(),
            run_code: Some(0),
        }
    }
}

impl FakeShell {
    pub fn with_capture(mut self, command: &str, result: Captured) -> Self {
        self.capture_results.insert(command.to_string(), result);
        self
    }

    pub fn with_run_code(mut self, code: Option<i32>) -> Self {
        self.run_code = code;
        self
    }

    pub fn spawned(&self) -> usize {
        self.runs.len() + self.captures.len()
    }
}

impl Shell for FakeShell {
    fn run(&mut self, invocation: &Invocation) -> Result<Option<i32>> {
        self.runs.push(invocation.clone());
        Ok(self.run_code)
    }

    fn capture(&mut self, invocation: &Invocation) -> Result<Captured> {
        self.captures.push(invocation.clone());
        Ok(self
            .capture_results
            .get(&invocation.command)
            .cloned()
            .unwrap_or(Captured {
                code: Some(0),
                ..Default::default()
            }))
    }
}

#[derive(Debug, Default)]
pub struct RecordingConsole {
    pub infos: Vec<String>,
    pub outputs: Vec<String>,
    pub warnings: Vec<String>,
    pub questions: Vec<String>,
    answers: VecDeque<bool>,
}

impl RecordingConsole {
    pub fn answering(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Default::default()
        }
    }
}

impl Console for RecordingConsole {
    fn info(&mut self, message: &str) {
        self.infos.push(message.to_string());
    }

    fn output(&mut self, text: &str) {
        self.outputs.push(text.to_string());
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.questions.push(question.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| LifecycleError::Prompt("no scripted answer".to_string()))
    }
}
