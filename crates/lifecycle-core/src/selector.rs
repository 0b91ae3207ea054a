use crate::error::{LifecycleError, Result};
use crate::registry::{Component, Registry};

/// Narrow the registry to the components a run should touch.
///
/// - Every name in `names` must exist, otherwise [`LifecycleError::UnknownComponent`].
/// - An empty `names` selects the whole registry.
/// - A non-empty `labels` keeps only components carrying all of them.
///
/// The result keeps registry order and may be empty.
pub fn select<'r, N, L>(registry: &'r Registry, names: &[N], labels: &[L]) -> Result<Vec<&'r Component>>
where
    N: AsRef<str>,
    L: AsRef<str>,
{
    for name in names {
        let name = name.as_ref();
        if registry.get(name).is_none() {
            return Err(LifecycleError::UnknownComponent {
                name: name.to_string(),
                valid: registry.component_names(),
            });
        }
    }

    let selected: Vec<&Component> = registry
        .components
        .iter()
        .filter(|c| names.is_empty() || names.iter().any(|n| n.as_ref() == c.name))
        .filter(|c| c.has_labels(labels))
        .collect();

    tracing::debug!(
        selected = ?selected.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        "components selected"
    );
    Ok(selected)
}
