use crate::output::print_table;
use lifecycle_core::store::Store;
use std::path::Path;

/// Print every registered component with its commands and init state.
pub fn run(root: &Path) -> anyhow::Result<()> {
    let store = Store::at_root(root);
    let registry = store
        .load_registry()
        .map_err(|e| super::explain(e, &store))?;
    let lock = store.load_lock()?;

    let rows: Vec<Vec<String>> = registry
        .components
        .iter()
        .map(|c| {
            let labels: Vec<&str> = c.labels.iter().map(String::as_str).collect();
            let commands: Vec<&str> = c.commands.keys().map(String::as_str).collect();
            let initialized = match (c.init_command(), lock.is_initialized(&c.name)) {
                (None, _) => "-",
                (Some(_), true) => "yes",
                (Some(_), false) => "no",
            };
            vec![
                c.name.clone(),
                c.root_dir.clone(),
                labels.join(","),
                commands.join(", "),
                initialized.to_string(),
            ]
        })
        .collect();

    print_table(
        &["NAME", "ROOT DIR", "LABELS", "COMMANDS", "INITIALIZED"],
        &rows,
    );
    Ok(())
}
