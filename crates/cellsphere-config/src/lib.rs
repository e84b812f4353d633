//! Configuration for the cell sphere renderer.
//!
//! Settings persist to disk as RON, can be overridden from the command line
//! via clap, and support change detection on reload. Unknown or missing
//! fields fall back to defaults so older files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, MeshConfig, RenderConfig, default_config_dir};
pub use error::ConfigError;
