//! CLI command handlers for Wallmatch.
//!
//! This module provides headless, scriptable access to the matching session
//! for automation, testing, and CI/CD integration.

pub mod catalog;
pub mod common;
pub mod config;
pub mod matching;
pub mod profiles;

// Re-export types used by main.rs and tests
pub use catalog::{LayersArgs, ProductsArgs};
pub use common::{CliError, CliResult, ExitCode, GlobalOptions};
pub use config::ConfigArgs;
pub use matching::MatchArgs;
pub use profiles::ProfilesArgs;
