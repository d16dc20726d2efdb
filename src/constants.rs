//! Application-wide constants.
//!
//! This module defines constants used throughout the application,
//! including the application name and reserved product identifiers.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "Wallmatch";

/// Product key that asks the matcher to evaluate every product of the current category.
pub const ALL_PRODUCTS: &str = "All";

/// Reserved subject of a pre-filter request meaning "clear the filters of every wall".
///
/// Consumed by [`crate::services::PreFilterStore::apply_request`] and never sent
/// to the catalog service. Assumes no catalog product is literally named `RESET_ALL`.
pub const RESET_ALL: &str = "RESET_ALL";

/// Default trailing-edge debounce window for requirement-profile edits.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Environment variable that overrides the configuration directory.
pub const CONFIG_DIR_ENV: &str = "WALLMATCH_CONFIG_DIR";
