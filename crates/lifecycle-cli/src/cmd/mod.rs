pub mod list;
pub mod run;

use lifecycle_core::store::Store;
use lifecycle_core::LifecycleError;

/// Attach a hint to errors the user can fix by pointing at the right project.
pub(crate) fn explain(err: LifecycleError, store: &Store) -> anyhow::Error {
    match err {
        LifecycleError::NotFound(ref path) if path == store.registry_path() => anyhow::anyhow!(
            "{err}\nRun from a directory containing components.json, or pass --root / set LIFECYCLE_ROOT"
        ),
        other => other.into(),
    }
}
