//! Service layer for session logic.
//!
//! This module contains the stores, editors and result views of a matching
//! session, the catalog client and the orchestrator that wires them together.

pub mod aggregator;
pub mod catalog_client;
pub mod debounce;
pub mod orchestrator;
pub mod pre_filter_editor;
pub mod pre_filter_store;
pub mod requirement_store;
pub mod stats;

// Re-export commonly used types and functions
pub use aggregator::{
    build_product_table, flatten, group_by_product, merge_for_plot, MatchResultAggregator,
    PlotColors, PlotSeries, ProductSummary, ProductTable,
};
pub use catalog_client::{CatalogClient, HttpCatalogClient};
pub use debounce::Debouncer;
pub use orchestrator::{Orchestrator, RefreshOutcome, SessionOptions, SessionView};
pub use pre_filter_editor::{derive_ranges, Bound, EditorState, PreFilterEditor};
pub use pre_filter_store::PreFilterStore;
pub use requirement_store::{RequirementProfileStore, SaveOutcome};
pub use stats::{MatchStats, Summary};
