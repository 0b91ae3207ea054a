use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Contents of `components-lock.json`: which components finished initialization.
///
/// The set only grows. Names serialize sorted, so repeated saves of the same
/// state produce byte-identical files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockState {
    #[serde(default)]
    pub initialized: BTreeSet<String>,
}

impl LockState {
    pub fn is_initialized(&self, component: &str) -> bool {
        self.initialized.contains(component)
    }

    /// Record a successful initialization. Returns false if it was already recorded.
    pub fn record(&mut self, component: impl Into<String>) -> bool {
        self.initialized.insert(component.into())
    }
}
