use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read or write {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("invalid configuration file: {0}")]
    InvalidRegistry(String),

    #[error("invalid component. Expected one of: {}. Received: '{name}'", valid.join(", "))]
    UnknownComponent { name: String, valid: Vec<String> },

    #[error("there was an error initializing component '{component}': {stderr}")]
    InitializationFailed { component: String, stderr: String },

    #[error("shell '{0}' not found on PATH")]
    ShellUnavailable(String),

    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl LifecycleError {
    /// Wrap any read/parse/write failure for `path` as a fatal config error.
    pub fn config(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        LifecycleError::Config {
            path: path.into(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LifecycleError>;
