//! Per-wall restriction of admissible variant indices.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::LayerSet;

/// Canonicalizes a variant-index selection for a layer with `variant_count` variants.
///
/// Indices are sorted and deduplicated, out-of-range indices are dropped, and a
/// selection covering every variant collapses to `None` ("unrestricted"). An
/// explicit list equal to all indices is never returned.
#[must_use]
pub fn canonical_selection(
    indices: impl IntoIterator<Item = usize>,
    variant_count: usize,
) -> Option<Vec<usize>> {
    let mut selected: Vec<usize> = indices.into_iter().filter(|&i| i < variant_count).collect();
    selected.sort_unstable();
    selected.dedup();

    if selected.len() == variant_count {
        None
    } else {
        Some(selected)
    }
}

/// Mapping from layer name to the selected variant indices of one wall.
///
/// `None` for a layer means every variant is admissible. Serializes to the wire
/// shape `{ "<layer>": [indices] | null }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreFilter {
    layers: IndexMap<String, Option<Vec<usize>>>,
}

impl PreFilter {
    /// Creates an empty pre-filter (no layer entries at all).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pre-filter with every layer of `layers` unrestricted.
    #[must_use]
    pub fn unrestricted(layers: &LayerSet) -> Self {
        Self {
            layers: layers.iter().map(|l| (l.name.clone(), None)).collect(),
        }
    }

    /// Selection for `layer`; `None` if unrestricted or not present.
    #[must_use]
    pub fn selection(&self, layer: &str) -> Option<&[usize]> {
        self.layers.get(layer).and_then(|s| s.as_deref())
    }

    /// Returns true if the filter has an entry for `layer` (restricted or not).
    #[must_use]
    pub fn contains_layer(&self, layer: &str) -> bool {
        self.layers.contains_key(layer)
    }

    /// Sets the selection of a layer, canonicalizing it against `variant_count`.
    pub fn set_selection(
        &mut self,
        layer: impl Into<String>,
        indices: impl IntoIterator<Item = usize>,
        variant_count: usize,
    ) {
        self.layers
            .insert(layer.into(), canonical_selection(indices, variant_count));
    }

    /// Marks a layer as unrestricted.
    pub fn clear_selection(&mut self, layer: impl Into<String>) {
        self.layers.insert(layer.into(), None);
    }

    /// Returns true if every layer is unrestricted (or there are no entries).
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.layers.values().all(Option::is_none)
    }

    /// Returns true if the filter carries no layer entries at all.
    ///
    /// An empty map is the "reset this wall" signal of a pre-filter request.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// First layer whose selection admits no variant, if any.
    #[must_use]
    pub fn empty_selection(&self) -> Option<&str> {
        self.layers
            .iter()
            .find(|(_, s)| s.as_ref().is_some_and(Vec::is_empty))
            .map(|(name, _)| name.as_str())
    }

    /// Iterates over `(layer, selection)` in layer order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&[usize]>)> {
        self.layers.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}

/// A pre-filter addressed to one wall, as emitted by the layer editor.
///
/// The subject may be the reserved [`crate::constants::RESET_ALL`] identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreFilterRequest {
    /// Wall the filter applies to
    pub product: String,
    /// Per-layer selection; empty means "reset"
    pub pre_filter: PreFilter,
}
