pub mod console;
pub mod error;
pub mod executor;
pub mod init;
pub mod io;
pub mod lock;
pub mod paths;
pub mod registry;
pub mod runner;
pub mod selector;
pub mod shell;
pub mod store;
pub mod template;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{LifecycleError, Result};
