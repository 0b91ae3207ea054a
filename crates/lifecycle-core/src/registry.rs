use crate::error::{LifecycleError, Result};
use crate::template::TemplateVars;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Name of the command run once per component before its first real command.
pub const INITIALIZE_COMMAND: &str = "initialize";

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// A named unit of software with a root directory and invocable commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub name: String,
    pub root_dir: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub labels: BTreeSet<String>,
    /// Command name → shell command template.
    #[serde(default)]
    pub commands: BTreeMap<String, String>,
}

impl Component {
    pub fn new(name: impl Into<String>, root_dir: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root_dir: root_dir.into(),
            labels: BTreeSet::new(),
            commands: BTreeMap::new(),
        }
    }

    pub fn with_command(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.commands.insert(name.into(), template.into());
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Raw (unexpanded) template for `name`, if the component defines it.
    pub fn command(&self, name: &str) -> Option<&str> {
        self.commands.get(name).map(String::as_str)
    }

    pub fn init_command(&self) -> Option<&str> {
        self.command(INITIALIZE_COMMAND)
    }

    /// True when every label in `required` is carried by this component.
    pub fn has_labels<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required.iter().all(|l| self.labels.contains(l.as_ref()))
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Contents of `components.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_template_vars: TemplateVars,
}

impl Registry {
    pub fn new(components: Vec<Component>) -> Self {
        Self {
            components,
            default_template_vars: TemplateVars::new(),
        }
    }

    /// Reject registries the run loop cannot work with: no components, or two
    /// components sharing a name.
    pub fn validate(&self) -> Result<()> {
        if self.components.is_empty() {
            return Err(LifecycleError::InvalidRegistry(
                "the components property must be a non-empty array of 'component' objects"
                    .to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for component in &self.components {
            if !seen.insert(component.name.as_str()) {
                return Err(LifecycleError::InvalidRegistry(format!(
                    "duplicate component name '{}'",
                    component.name
                )));
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Component names in registry order.
    pub fn component_names(&self) -> Vec<String> {
        self.components.iter().map(|c| c.name.clone()).collect()
    }

    /// Merge `defaultTemplateVars` with caller-supplied pairs. Later pairs win.
    pub fn template_vars<I>(&self, overrides: I) -> TemplateVars
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut vars = self.default_template_vars.clone();
        vars.extend(overrides);
        vars
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_registry() {
        let json = r#"{
            "components": [
                {
                    "name": "api",
                    "rootDir": "./api",
                    "labels": ["backend"],
                    "commands": { "start": "node server.js", "initialize": "npm install" }
                }
            ],
            "defaultTemplateVars": { "env": "local" }
        }"#;
        let registry: Registry = serde_json::from_str(json).unwrap();
        assert_eq!(registry.components.len(), 1);
        let api = &registry.components[0];
        assert_eq!(api.root_dir, "./api");
        assert!(api.labels.contains("backend"));
        assert_eq!(api.command("start"), Some("node server.js"));
        assert_eq!(api.init_command(), Some("npm install"));
        assert_eq!(registry.default_template_vars["env"], "local");
    }

    #[test]
    fn labels_and_commands_are_optional() {
        let json = r#"{ "components": [ { "name": "docs", "rootDir": "docs" } ] }"#;
        let registry: Registry = serde_json::from_str(json).unwrap();
        let docs = &registry.components[0];
        assert!(docs.labels.is_empty());
        assert!(docs.commands.is_empty());
        assert!(docs.init_command().is_none());
        assert!(registry.default_template_vars.is_empty());
    }

    #[test]
    fn empty_registry_is_invalid() {
        let registry: Registry = serde_json::from_str("{}").unwrap();
        let err = registry.validate().unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidRegistry(_)));
        assert!(err.to_string().contains("non-empty array"));
    }

    #[test]
    fn duplicate_names_are_invalid() {
        let registry = Registry::new(vec![Component::new("api", "a"), Component::new("api", "b")]);
        let err = registry.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate component name 'api'"));
    }

    #[test]
    fn components_must_be_an_array() {
        let result = serde_json::from_str::<Registry>(r#"{ "components": {} }"#);
        assert!(result.is_err());
    }

    #[test]
    fn has_labels_requires_superset() {
        let c = Component::new("b", "b").with_labels(["x", "y"]);
        assert!(c.has_labels(&["x"]));
        assert!(c.has_labels(&["y", "x"]));
        assert!(c.has_labels::<&str>(&[]));
        assert!(!c.has_labels(&["x", "z"]));
    }

    #[test]
    fn user_vars_override_defaults() {
        let mut registry = Registry::new(vec![Component::new("api", "api")]);
        registry
            .default_template_vars
            .insert("env".to_string(), "local".to_string());
        registry
            .default_template_vars
            .insert("port".to_string(), "8080".to_string());

        let vars = registry.template_vars([
            ("env".to_string(), "staging".to_string()),
            ("env".to_string(), "prod".to_string()),
        ]);
        assert_eq!(vars["env"], "prod");
        assert_eq!(vars["port"], "8080");
    }

    #[test]
    fn component_names_keep_registry_order() {
        let registry = Registry::new(vec![
            Component::new("web", "web"),
            Component::new("api", "api"),
        ]);
        assert_eq!(registry.component_names(), vec!["web", "api"]);
        assert!(registry.get("api").is_some());
        assert!(registry.get("db").is_none());
    }
}
