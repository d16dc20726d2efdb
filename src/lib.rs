//! Wallmatch Library
//!
//! This library provides the filter and result-aggregation engine for matching
//! multi-layer wall buildups against a requirement profile: per-wall pre-filters
//! with draft/apply semantics, a global requirement profile with a named-profile
//! registry, and plot/table views over the matcher's classified results.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::Config;
pub use models::{ClassifiedResultSet, LayerSet, PreFilter, RequirementProfile};
pub use services::{CatalogClient, HttpCatalogClient, Orchestrator};
