//! Lazy, run-once component initialization.
//!
//! A component's `initialize` command runs the first time the component is
//! selected for a real (non dry-run) command. Success is recorded in the lock
//! file so later invocations skip it; failure records nothing, so the next
//! invocation retries from scratch.

use crate::console::Console;
use crate::error::Result;
use crate::lock::LockState;
use crate::registry::{Component, INITIALIZE_COMMAND};
use crate::shell::{Invocation, Shell};
use crate::store::Store;
use crate::template::{self, TemplateVars};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    NeverInitialized,
    Initialized,
}

/// How a run treats initialization. The CLI flags `-i` and `-s` select
/// `Force` and `Skip`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InitPolicy {
    /// Initialize components not yet recorded in the lock file.
    #[default]
    Auto,
    /// Re-run `initialize` even for recorded components.
    Force,
    /// Never run `initialize`.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Skipped,
    /// The component has no `initialize` command.
    NotRequired,
    AlreadyInitialized,
    Initialized,
    Failed { code: Option<i32>, stderr: String },
}

impl InitOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, InitOutcome::Failed { .. })
    }
}

pub struct InitTracker<'s> {
    store: &'s Store,
    lock: LockState,
}

impl<'s> InitTracker<'s> {
    pub fn load(store: &'s Store) -> Result<Self> {
        let lock = store.load_lock()?;
        Ok(Self { store, lock })
    }

    pub fn state(&self, component: &Component) -> InitState {
        if self.lock.is_initialized(&component.name) {
            InitState::Initialized
        } else {
            InitState::NeverInitialized
        }
    }

    pub fn needs_initialization(&self, component: &Component, force: bool) -> bool {
        force || self.state(component) == InitState::NeverInitialized
    }

    /// Run `component`'s `initialize` command unless `skip` is set or the
    /// component has none. On success the name is added to the lock file.
    pub fn ensure_initialized(
        &mut self,
        component: &Component,
        vars: &TemplateVars,
        skip: bool,
        shell: &mut dyn Shell,
        console: &mut dyn Console,
    ) -> Result<InitOutcome> {
        if skip {
            return Ok(InitOutcome::Skipped);
        }
        let Some(init) = component.init_command() else {
            return Ok(InitOutcome::NotRequired);
        };

        template::warn_on_command_cycle(component, INITIALIZE_COMMAND);
        let command = template::expand(init, component, vars);
        console.info(&format!(
            "Initializing component '{}'. Running command: {}",
            component.name, command
        ));

        let captured = shell.capture(&Invocation::new(component, command))?;
        if !captured.stdout.is_empty() {
            console.output(&captured.stdout);
        }

        if !captured.success() {
            tracing::warn!(
                component = %component.name,
                code = ?captured.code,
                "initialization failed"
            );
            return Ok(InitOutcome::Failed {
                code: captured.code,
                stderr: captured.stderr,
            });
        }

        // Read-modify-write so the file, not our snapshot, is the base.
        let mut lock = self.store.load_lock()?;
        lock.record(component.name.clone());
        self.store.save_lock(&lock)?;
        self.lock = lock;

        Ok(InitOutcome::Initialized)
    }

    /// Apply `policy`: skip, leave recorded components alone, or initialize.
    pub fn prepare(
        &mut self,
        component: &Component,
        vars: &TemplateVars,
        policy: InitPolicy,
        shell: &mut dyn Shell,
        console: &mut dyn Console,
    ) -> Result<InitOutcome> {
        match policy {
            InitPolicy::Skip => self.ensure_initialized(component, vars, true, shell, console),
            InitPolicy::Auto if !self.needs_initialization(component, false) => {
                Ok(InitOutcome::AlreadyInitialized)
            }
            InitPolicy::Auto | InitPolicy::Force => {
                self.ensure_initialized(component, vars, false, shell, console)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::Captured;
    use crate::testing::{FakeShell, RecordingConsole};
    use tempfile::TempDir;

    fn api() -> Component {
        Component::new("api", "./api")
            .with_command("start", "node server.js")
            .with_command("initialize", "npm install --prefix {{ self.rootDir }} {{ flags }}")
    }

    fn vars() -> TemplateVars {
        [("flags".to_string(), "--silent".to_string())].into_iter().collect()
    }

    #[test]
    fn skip_has_no_side_effects() {
        let dir = TempDir::new().unwrap();
        let store = Store::at_root(dir.path());
        let mut tracker = InitTracker::load(&store).unwrap();
        let mut shell = FakeShell::default();
        let mut console = RecordingConsole::default();

        let outcome = tracker
            .ensure_initialized(&api(), &vars(), true, &mut shell, &mut console)
            .unwrap();
        assert_eq!(outcome, InitOutcome::Skipped);
        assert_eq!(shell.spawned(), 0);
        assert!(!store.lock_path().exists());
    }

    #[test]
    fn component_without_init_command_is_vacuously_initialized() {
        let dir = TempDir::new().unwrap();
        let store = Store::at_root(dir.path());
        let mut tracker = InitTracker::load(&store).unwrap();
        let mut shell = FakeShell::default();
        let mut console = RecordingConsole::default();
        let docs = Component::new("docs", "docs").with_command("build", "mkdocs build");

        for policy in [InitPolicy::Auto, InitPolicy::Force] {
            let outcome = tracker
                .prepare(&docs, &vars(), policy, &mut shell, &mut console)
                .unwrap();
            assert_eq!(outcome, InitOutcome::NotRequired);
            assert!(outcome.is_success());
        }
        assert_eq!(shell.spawned(), 0);
        assert!(!store.lock_path().exists());
        assert_eq!(tracker.state(&docs), InitState::NeverInitialized);
    }

    #[test]
    fn success_records_component_and_prints_stdout() {
        let dir = TempDir::new().unwrap();
        let store = Store::at_root(dir.path());
        let mut tracker = InitTracker::load(&store).unwrap();
        let mut shell = FakeShell::default().with_capture(
            "npm install --prefix ./api --silent",
            Captured {
                code: Some(0),
                stdout: "added 12 packages\n".to_string(),
                stderr: String::new(),
            },
        );
        let mut console = RecordingConsole::default();

        let outcome = tracker
            .ensure_initialized(&api(), &vars(), false, &mut shell, &mut console)
            .unwrap();
        assert_eq!(outcome, InitOutcome::Initialized);
        assert_eq!(shell.captures[0].root_dir, "./api");
        assert_eq!(shell.captures[0].command, "npm install --prefix ./api --silent");
        assert_eq!(console.outputs, vec!["added 12 packages\n"]);
        assert!(console.infos[0].contains("Initializing component 'api'"));

        assert_eq!(tracker.state(&api()), InitState::Initialized);
        assert!(store.load_lock().unwrap().is_initialized("api"));
    }

    #[test]
    fn failure_leaves_lock_untouched() {
        let dir = TempDir::new().unwrap();
        let store = Store::at_root(dir.path());
        let mut tracker = InitTracker::load(&store).unwrap();
        let mut shell = FakeShell::default().with_capture(
            "npm install --prefix ./api --silent",
            Captured {
                code: Some(1),
                stdout: String::new(),
                stderr: "ENOENT package.json\n".to_string(),
            },
        );
        let mut console = RecordingConsole::default();

        let outcome = tracker
            .ensure_initialized(&api(), &vars(), false, &mut shell, &mut console)
            .unwrap();
        assert_eq!(
            outcome,
            InitOutcome::Failed {
                code: Some(1),
                stderr: "ENOENT package.json\n".to_string()
            }
        );
        assert!(!outcome.is_success());
        assert!(console.outputs.is_empty());
        assert!(!store.lock_path().exists());
        assert_eq!(tracker.state(&api()), InitState::NeverInitialized);
    }

    #[test]
    fn repeated_forced_runs_record_name_once() {
        let dir = TempDir::new().unwrap();
        let store = Store::at_root(dir.path());
        let mut tracker = InitTracker::load(&store).unwrap();
        let mut shell = FakeShell::default();
        let mut console = RecordingConsole::default();

        for _ in 0..3 {
            let outcome = tracker
                .prepare(&api(), &vars(), InitPolicy::Force, &mut shell, &mut console)
                .unwrap();
            assert_eq!(outcome, InitOutcome::Initialized);
        }
        assert_eq!(shell.captures.len(), 3);

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.lock_path()).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({ "initialized": ["api"] }));
    }

    #[test]
    fn auto_policy_runs_once_across_trackers() {
        let dir = TempDir::new().unwrap();
        let store = Store::at_root(dir.path());
        let mut shell = FakeShell::default();
        let mut console = RecordingConsole::default();

        let mut first = InitTracker::load(&store).unwrap();
        let outcome = first
            .prepare(&api(), &vars(), InitPolicy::Auto, &mut shell, &mut console)
            .unwrap();
        assert_eq!(outcome, InitOutcome::Initialized);

        let mut second = InitTracker::load(&store).unwrap();
        let outcome = second
            .prepare(&api(), &vars(), InitPolicy::Auto, &mut shell, &mut console)
            .unwrap();
        assert_eq!(outcome, InitOutcome::AlreadyInitialized);
        assert_eq!(shell.captures.len(), 1);
    }

    #[test]
    fn skip_policy_ignores_uninitialized_components() {
        let dir = TempDir::new().unwrap();
        let store = Store::at_root(dir.path());
        let mut tracker = InitTracker::load(&store).unwrap();
        let mut shell = FakeShell::default();
        let mut console = RecordingConsole::default();

        let outcome = tracker
            .prepare(&api(), &vars(), InitPolicy::Skip, &mut shell, &mut console)
            .unwrap();
        assert_eq!(outcome, InitOutcome::Skipped);
        assert_eq!(shell.spawned(), 0);
    }

    #[test]
    fn self_referencing_init_command_expands_once() {
        let dir = TempDir::new().unwrap();
        let store = Store::at_root(dir.path());
        let mut tracker = InitTracker::load(&store).unwrap();
        let mut shell = FakeShell::default();
        let mut console = RecordingConsole::default();
        let looping = Component::new("api", "api")
            .with_command("initialize", "make deps {{ self.commands.initialize }}");

        let outcome = tracker
            .ensure_initialized(&looping, &vars(), false, &mut shell, &mut console)
            .unwrap();
        assert_eq!(outcome, InitOutcome::Initialized);
        assert_eq!(
            shell.captures[0].command,
            "make deps make deps {{ self.commands.initialize }}"
        );
    }

    #[test]
    fn success_keeps_names_recorded_by_others() {
        let dir = TempDir::new().unwrap();
        let store = Store::at_root(dir.path());
        let mut tracker = InitTracker::load(&store).unwrap();

        let mut other = LockState::default();
        other.record("web");
        store.save_lock(&other).unwrap();

        let mut shell = FakeShell::default();
        let mut console = RecordingConsole::default();
        tracker
            .ensure_initialized(&api(), &vars(), false, &mut shell, &mut console)
            .unwrap();

        let lock = store.load_lock().unwrap();
        assert!(lock.is_initialized("web"));
        assert!(lock.is_initialized("api"));
    }
}
