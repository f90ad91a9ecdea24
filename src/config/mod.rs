//! Configuration loading and application.
mod apply;
mod loader;
mod run;
pub mod types;


pub use apply::resolve_run_config;
pub use loader::load_config;
pub use run::{MAX_WORKERS, RunConfig};

#[cfg(test)]
pub(crate) use loader::load_config_file;
