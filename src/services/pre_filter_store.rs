//! Applied pre-filters of every wall in the session.

use std::collections::HashMap;

use tracing::debug;

use crate::constants::RESET_ALL;
use crate::models::{PreFilter, PreFilterRequest};

/// Authoritative per-wall applied pre-filter state.
///
/// A wall without an entry is unrestricted. Each stored filter is an
/// independent snapshot; writing one wall never touches another.
#[derive(Debug, Clone, Default)]
pub struct PreFilterStore {
    filters: HashMap<String, PreFilter>,
}

impl PreFilterStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applied filter of `wall`, if any.
    #[must_use]
    pub fn get(&self, wall: &str) -> Option<&PreFilter> {
        self.filters.get(wall)
    }

    /// Replaces the applied filter of exactly `wall`.
    pub fn set(&mut self, wall: impl Into<String>, filter: PreFilter) {
        let wall = wall.into();
        debug!("Storing pre-filter for '{wall}'");
        self.filters.insert(wall, filter);
    }

    /// Removes the entry of `wall`. Returns true if one existed.
    pub fn clear(&mut self, wall: &str) -> bool {
        self.filters.remove(wall).is_some()
    }

    /// Removes every entry.
    pub fn clear_all(&mut self) {
        self.filters.clear();
    }

    /// Number of walls with a stored filter.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns true if no wall has a stored filter.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Handles a pre-filter request from the layer editor.
    ///
    /// [`RESET_ALL`] clears every wall, an empty filter clears the addressed
    /// wall, and anything else replaces that wall's filter.
    pub fn apply_request(&mut self, request: PreFilterRequest) {
        if request.product == RESET_ALL {
            self.clear_all();
        } else if request.pre_filter.is_empty() {
            self.clear(&request.product);
        } else {
            self.set(request.product, request.pre_filter);
        }
    }
}
