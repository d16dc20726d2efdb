//! Range-based editing of one wall's pre-filter.
//!
//! The editor shows a thickness interval per layer. Moving either bound
//! recomputes the draft selection of variant indices; the applied filter and
//! the [`PreFilterStore`] only change on [`PreFilterEditor::apply`] or a reset.

use anyhow::{bail, Result};
use indexmap::IndexMap;

use crate::models::{LayerSet, PreFilter, Staged, ThicknessRange};
use crate::services::PreFilterStore;

/// Which end of a thickness range is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Lower bound
    Min,
    /// Upper bound
    Max,
}

/// Lifecycle of the editor's draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    /// No restriction applied
    Unrestricted,
    /// Draft differs from what was last applied
    DraftModified,
    /// Draft has been applied
    Applied,
}

/// Per-layer `(min, max)` thickness of `layers`. Layers without variants have no range.
#[must_use]
pub fn derive_ranges(layers: &LayerSet) -> IndexMap<String, ThicknessRange> {
    layers
        .iter()
        .filter_map(|layer| layer.thickness_range().map(|r| (layer.name.clone(), r)))
        .collect()
}

/// Draft/applied pre-filter editor for a single wall.
#[derive(Debug, Clone)]
pub struct PreFilterEditor {
    wall: String,
    layers: LayerSet,
    ranges: IndexMap<String, ThicknessRange>,
    filter: Staged<PreFilter>,
    state: EditorState,
}

impl PreFilterEditor {
    /// Opens the editor for `wall` after its layers were loaded.
    ///
    /// With a stored filter, draft and applied start from it and each displayed
    /// range spans the selected variants; otherwise every layer is unrestricted.
    pub fn new(wall: impl Into<String>, layers: LayerSet, stored: Option<&PreFilter>) -> Self {
        let mut filter = PreFilter::unrestricted(&layers);
        let mut ranges = derive_ranges(&layers);

        if let Some(stored) = stored {
            for layer in layers.iter() {
                let Some(selection) = stored.selection(&layer.name) else {
                    continue;
                };
                filter.set_selection(&layer.name, selection.iter().copied(), layer.variant_count());
                let selected = selection.iter().filter_map(|&i| layer.thickness(i));
                if let Some(range) = ThicknessRange::spanning(selected) {
                    ranges.insert(layer.name.clone(), range);
                }
            }
        }

        let state = if filter.is_unrestricted() {
            EditorState::Unrestricted
        } else {
            EditorState::Applied
        };

        Self {
            wall: wall.into(),
            layers,
            ranges,
            filter: Staged::new(filter),
            state,
        }
    }

    /// Wall being edited.
    #[must_use]
    pub fn wall(&self) -> &str {
        &self.wall
    }

    /// Layers of the wall.
    #[must_use]
    pub const fn layers(&self) -> &LayerSet {
        &self.layers
    }

    /// Current draft range of `layer`; `None` for unknown or empty layers.
    #[must_use]
    pub fn range(&self, layer: &str) -> Option<ThicknessRange> {
        self.ranges.get(layer).copied()
    }

    /// Current draft ranges in layer order.
    #[must_use]
    pub const fn ranges(&self) -> &IndexMap<String, ThicknessRange> {
        &self.ranges
    }

    /// Draft filter.
    #[must_use]
    pub const fn draft(&self) -> &PreFilter {
        self.filter.draft()
    }

    /// Applied filter.
    #[must_use]
    pub const fn applied(&self) -> &PreFilter {
        self.filter.committed()
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> EditorState {
        self.state
    }

    /// Returns true if the draft has not been applied yet.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.filter.is_dirty()
    }

    /// Returns true if variant `index` of `layer` is inside the draft range.
    #[must_use]
    pub fn is_in_range(&self, layer: &str, index: usize) -> bool {
        let Some(range) = self.ranges.get(layer) else {
            return false;
        };
        self.layers
            .get(layer)
            .and_then(|l| l.thickness(index))
            .is_some_and(|t| range.contains(t))
    }

    /// Moves one bound of a layer's draft range and recomputes its draft selection.
    ///
    /// Returns false for unknown or empty layers, which are inert.
    pub fn on_range_change(&mut self, layer: &str, bound: Bound, value: f64) -> bool {
        let Some(entry) = self.layers.get(layer) else {
            return false;
        };
        let Some(range) = self.ranges.get_mut(layer) else {
            return false;
        };
        match bound {
            Bound::Min => range.min = value,
            Bound::Max => range.max = value,
        }
        let indices = entry.indices_within(range);
        let count = entry.variant_count();
        self.filter.draft_mut().set_selection(layer, indices, count);
        self.state = EditorState::DraftModified;
        true
    }

    /// Applies a manually typed bound on confirmation.
    ///
    /// The value is clamped to the layer's full thickness range; non-numeric
    /// input is ignored and the prior value kept.
    pub fn confirm_input(&mut self, layer: &str, bound: Bound, input: &str) -> bool {
        let Ok(value) = input.trim().parse::<f64>() else {
            return false;
        };
        if !value.is_finite() {
            return false;
        }
        let Some(full) = self.layers.get(layer).and_then(|l| l.thickness_range()) else {
            return false;
        };
        self.on_range_change(layer, bound, full.clamp(value))
    }

    /// Promotes the draft to applied and stores a snapshot for this wall.
    ///
    /// # Errors
    ///
    /// Returns an error if a layer's draft range selects no variant; nothing
    /// changes in that case.
    pub fn apply(&mut self, store: &mut PreFilterStore) -> Result<&PreFilter> {
        if let Some(layer) = self.filter.draft().empty_selection() {
            bail!(
                "No variant of layer '{layer}' lies within the selected range for '{}'",
                self.wall
            );
        }
        let applied = self.filter.apply().clone();
        store.set(self.wall.clone(), applied);
        self.state = EditorState::Applied;
        Ok(self.filter.committed())
    }

    /// Makes this wall unrestricted in draft, applied and store. Other walls are untouched.
    pub fn reset(&mut self, store: &mut PreFilterStore) {
        store.clear(&self.wall);
        self.reset_view();
    }

    /// Clears every wall's stored filter and resets this wall's view.
    pub fn reset_all(&mut self, store: &mut PreFilterStore) {
        store.clear_all();
        self.reset_view();
    }

    fn reset_view(&mut self) {
        self.ranges = derive_ranges(&self.layers);
        self.filter.replace(PreFilter::unrestricted(&self.layers));
        self.state = EditorState::Unrestricted;
    }
}
