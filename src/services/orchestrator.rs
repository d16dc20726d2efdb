//! Session orchestration: wall selection, filters, profile edits and match requests.
//!
//! All session state lives behind one mutex that is never held across an
//! await. Every wall switch, profile commit and pre-filter change bumps a
//! generation counter; a response is only applied if the generation it was
//! requested under is still current. Layer loads are checked against a
//! separate wall counter so that profile and pre-filter edits made while a
//! wall loads do not discard its layers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::constants::{ALL_PRODUCTS, DEFAULT_DEBOUNCE_MS};
use crate::models::{
    LayerSet, LignumRecord, MatchRequest, PreFilter, PreFilterRequest, PriorityRanking,
    RankCriterion, RequirementProfile, Sampling, Staged,
};
use crate::services::aggregator::{
    MatchResultAggregator, PlotColors, PlotSeries, ProductSummary, ProductTable,
};
use crate::services::stats::MatchStats;
use crate::services::{
    CatalogClient, Debouncer, PreFilterEditor, PreFilterStore, RequirementProfileStore,
    SaveOutcome,
};

/// Result of a match refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Results were ingested
    Applied {
        /// Combinations across all buckets
        total: usize,
    },
    /// The response arrived after a newer trigger and was discarded
    Stale,
    /// A later edit inside the debounce window replaced this one
    Superseded,
    /// The request failed; results were cleared
    Failed,
    /// Nothing to do (no wall selected or no change)
    Skipped,
}

/// Startup settings of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    /// Category to browse
    pub bauteil_typ: String,
    /// Initial sampling mode
    pub sampling: Option<Sampling>,
    /// Debounce window for profile and sampling edits
    pub debounce: Duration,
    /// Initially active profile
    pub profile: RequirementProfile,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            bauteil_typ: "Aussenwand".to_string(),
            sampling: Some(Sampling::Horizontal),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            profile: RequirementProfile::default(),
        }
    }
}

#[derive(Debug)]
struct SessionState {
    bauteil_typ: String,
    products: Vec<String>,
    selected: Option<String>,
    editor: Option<PreFilterEditor>,
    filters: PreFilterStore,
    requirements: RequirementProfileStore,
    sampling: Staged<Option<Sampling>>,
    aggregator: MatchResultAggregator,
    lignum: Option<LignumRecord>,
    message: Option<String>,
    in_flight: usize,
}

/// Read-only copy of the session for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    /// Current category
    pub bauteil_typ: String,
    /// Products of the category
    pub products: Vec<String>,
    /// Selected wall or `"All"`
    pub selected: Option<String>,
    /// Product shown in the table
    pub active_product: Option<String>,
    /// Applied pre-filter of the selected wall
    pub pre_filter: Option<PreFilter>,
    /// Active requirement profile
    pub profile: RequirementProfile,
    /// Applied sampling mode
    pub sampling: Option<Sampling>,
    /// Committed ranking
    pub ranking: PriorityRanking,
    /// Exact plus tolerance matches
    pub total_matches: usize,
    /// Reference metadata of the selected wall
    pub lignum: Option<LignumRecord>,
    /// Last user-facing error
    pub message: Option<String>,
    /// True while a match request is in flight
    pub loading: bool,
}

/// Drives one interactive session against a [`CatalogClient`].
#[derive(Debug)]
pub struct Orchestrator<C: CatalogClient> {
    client: Arc<C>,
    state: Mutex<SessionState>,
    generation: AtomicU64,
    wall_seq: AtomicU64,
    debouncer: Debouncer,
}

impl<C: CatalogClient> Orchestrator<C> {
    /// Creates a session with empty state.
    pub fn new(client: Arc<C>, options: SessionOptions) -> Self {
        let state = SessionState {
            bauteil_typ: options.bauteil_typ,
            products: Vec::new(),
            selected: None,
            editor: None,
            filters: PreFilterStore::new(),
            requirements: RequirementProfileStore::with_profile(options.profile),
            sampling: Staged::new(options.sampling),
            aggregator: MatchResultAggregator::new(),
            lignum: None,
            message: None,
            in_flight: 0,
        };
        Self {
            client,
            state: Mutex::new(state),
            generation: AtomicU64::new(0),
            wall_seq: AtomicU64::new(0),
            debouncer: Debouncer::new(options.debounce),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Loads the product list of `bauteil_typ` (or the current category).
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be reached; the product list is
    /// left empty.
    pub async fn load_category(&self, bauteil_typ: Option<&str>) -> Result<Vec<String>> {
        let category = {
            let mut state = self.lock();
            if let Some(typ) = bauteil_typ {
                state.bauteil_typ = typ.to_string();
            }
            state.bauteil_typ.clone()
        };

        match self.client.list_products(&category).await {
            Ok(products) => {
                let mut state = self.lock();
                state.products.clone_from(&products);
                state.message = None;
                Ok(products)
            }
            Err(e) => {
                warn!("Failed to load products of '{category}': {e:#}");
                let mut state = self.lock();
                state.products.clear();
                state.message = Some(format!("Failed to load product types: {e}"));
                Err(e).with_context(|| format!("Failed to load products of '{category}'"))
            }
        }
    }

    /// Fetches layer names of every product concurrently for labels and tables.
    ///
    /// A wall whose fetch fails gets an empty list. Returns the number of walls
    /// that loaded.
    pub async fn prefetch_layer_names(&self) -> usize {
        let products = self.lock().products.clone();

        let mut tasks = JoinSet::new();
        for product in products {
            let client = Arc::clone(&self.client);
            tasks.spawn(async move {
                let result = client.fetch_layers(&product).await;
                (product, result)
            });
        }

        let mut loaded = 0;
        while let Some(joined) = tasks.join_next().await {
            let (product, names) = match joined {
                Ok((product, Ok(layers))) => {
                    loaded += 1;
                    (product, layers.names())
                }
                Ok((product, Err(e))) => {
                    warn!("Failed to fetch layers of '{product}': {e:#}");
                    (product, Vec::new())
                }
                Err(e) => {
                    warn!("Layer prefetch task failed: {e}");
                    continue;
                }
            };
            self.lock().aggregator.set_layer_names(product, names);
        }
        debug!("Prefetched layer names for {loaded} walls");
        loaded
    }

    /// Selects a wall (or `"All"`) and refreshes the results.
    pub async fn select_wall(&self, product: &str) -> RefreshOutcome {
        if !self.prepare_wall(product).await {
            return RefreshOutcome::Stale;
        }
        self.refresh().await
    }

    /// Selects a wall and loads its layers and reference metadata without
    /// requesting matches.
    ///
    /// Returns false if another selection superseded this one while loading.
    pub async fn prepare_wall(&self, product: &str) -> bool {
        self.bump();
        let ticket = self.wall_seq.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.lock();
            state.selected = Some(product.to_string());
            state.editor = None;
            state.lignum = None;
        }
        info!("Selected '{product}'");

        if product == ALL_PRODUCTS {
            return true;
        }

        let (layers, lignum) = tokio::join!(
            self.client.fetch_layers(product),
            self.client.fetch_lignum(product)
        );

        if self.wall_seq.load(Ordering::SeqCst) != ticket {
            debug!("Discarding stale layer load for '{product}'");
            return false;
        }

        let mut state = self.lock();
        let layers = layers.unwrap_or_else(|e| {
            warn!("Failed to fetch layers of '{product}': {e:#}");
            state.message = Some(format!("Failed to load layers of {product}"));
            LayerSet::default()
        });
        state.lignum = lignum
            .map_err(|e| debug!("No reference metadata for '{product}': {e:#}"))
            .ok();

        state
            .aggregator
            .set_layer_names(product, layers.names());
        let editor = PreFilterEditor::new(product, layers, state.filters.get(product));
        state.editor = Some(editor);
        true
    }

    /// Runs `f` on the pre-filter editor of the selected wall.
    ///
    /// Returns `None` if no single wall is selected.
    pub fn edit_pre_filter<R>(&self, f: impl FnOnce(&mut PreFilterEditor) -> R) -> Option<R> {
        self.lock().editor.as_mut().map(f)
    }

    /// Applies the draft pre-filter of the selected wall and refreshes.
    ///
    /// # Errors
    ///
    /// Returns an error if no wall is being edited or a layer's draft range
    /// selects no variant.
    pub async fn apply_pre_filter(&self) -> Result<RefreshOutcome> {
        {
            let mut state = self.lock();
            let SessionState {
                editor, filters, ..
            } = &mut *state;
            let editor = editor.as_mut().context("No wall selected for editing")?;
            editor.apply(filters)?;
        }
        self.bump();
        Ok(self.refresh().await)
    }

    /// Makes the selected wall unrestricted and refreshes.
    pub async fn reset_pre_filter(&self) -> RefreshOutcome {
        {
            let mut state = self.lock();
            let SessionState {
                editor, filters, ..
            } = &mut *state;
            match editor.as_mut() {
                Some(editor) => editor.reset(filters),
                None => return RefreshOutcome::Skipped,
            }
        }
        self.bump();
        self.refresh().await
    }

    /// Clears every wall's pre-filter and refreshes.
    pub async fn reset_all_pre_filters(&self) -> RefreshOutcome {
        {
            let mut state = self.lock();
            let SessionState {
                editor, filters, ..
            } = &mut *state;
            match editor.as_mut() {
                Some(editor) => editor.reset_all(filters),
                None => filters.clear_all(),
            }
        }
        self.bump();
        self.refresh().await
    }

    /// Handles a pre-filter request addressed by wall name and refreshes.
    pub async fn apply_pre_filter_request(&self, request: PreFilterRequest) -> RefreshOutcome {
        {
            let mut state = self.lock();
            state.filters.apply_request(request);
            if let Some(editor) = state.editor.take() {
                let wall = editor.wall().to_string();
                let reopened =
                    PreFilterEditor::new(wall.clone(), editor.layers().clone(), state.filters.get(&wall));
                state.editor = Some(reopened);
            }
        }
        self.bump();
        self.refresh().await
    }

    /// Edits the draft profile; the last edit inside the debounce window commits
    /// and refreshes.
    pub async fn edit_profile(&self, f: impl FnOnce(&mut RequirementProfile)) -> RefreshOutcome {
        self.debounced(|state| f(state.requirements.draft_mut())).await
    }

    /// Replaces the whole draft profile, debounced like single edits.
    pub async fn stage_profile(&self, profile: RequirementProfile) -> RefreshOutcome {
        self.debounced(|state| state.requirements.stage(profile)).await
    }

    /// Changes the sampling mode, debounced like profile edits.
    pub async fn set_sampling(&self, sampling: Option<Sampling>) -> RefreshOutcome {
        self.debounced(|state| state.sampling.stage(sampling)).await
    }

    async fn debounced(&self, edit: impl FnOnce(&mut SessionState)) -> RefreshOutcome {
        let ticket = {
            let mut state = self.lock();
            edit(&mut state);
            self.debouncer.touch()
        };
        if !self.debouncer.settled(ticket).await {
            return RefreshOutcome::Superseded;
        }
        self.commit_profile().await
    }

    /// Drops uncommitted profile and sampling edits.
    ///
    /// A pending debounced edit then commits nothing and reports `Skipped`.
    pub fn discard_profile_edits(&self) {
        let mut state = self.lock();
        state.requirements.reset_draft();
        state.sampling.reset();
    }

    /// Commits pending profile and sampling edits immediately and refreshes.
    pub async fn commit_profile(&self) -> RefreshOutcome {
        let changed = {
            let mut state = self.lock();
            let profile_changed = state.requirements.commit_draft();
            let sampling_changed = state.sampling.is_dirty();
            state.sampling.apply();
            profile_changed || sampling_changed
        };
        if !changed {
            return RefreshOutcome::Skipped;
        }
        self.bump();
        self.refresh().await
    }

    /// Activates a saved profile and refreshes.
    ///
    /// # Errors
    ///
    /// Returns an error if no profile has that name.
    pub async fn load_profile(&self, name: &str) -> Result<RefreshOutcome> {
        {
            let mut state = self.lock();
            let profile = state.requirements.load(name)?;
            state.requirements.commit(profile);
        }
        info!("Loaded requirement profile '{name}'");
        self.bump();
        Ok(self.refresh().await)
    }

    /// Saves the active profile under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is blank.
    pub fn save_profile(
        &self,
        name: &str,
        confirm_overwrite: impl FnOnce(&str) -> bool,
    ) -> Result<SaveOutcome> {
        let mut state = self.lock();
        let profile = *state.requirements.active();
        state.requirements.save(name, profile, confirm_overwrite)
    }

    /// Saved profiles in insertion order.
    pub fn list_profiles(&self) -> Vec<(String, RequirementProfile)> {
        self.lock()
            .requirements
            .entries()
            .map(|(name, profile)| (name.to_string(), *profile))
            .collect()
    }

    /// Sets a rank in the draft ranking.
    ///
    /// # Errors
    ///
    /// Returns an error if `rank` is outside `1..=5`.
    pub fn set_rank(&self, criterion: RankCriterion, rank: u8) -> Result<()> {
        self.lock().requirements.set_rank(criterion, rank)
    }

    /// Commits the draft ranking.
    pub fn commit_ranking(&self) -> PriorityRanking {
        self.lock().requirements.commit_ranking()
    }

    /// Discards draft ranking edits.
    pub fn reset_ranking(&self) {
        self.lock().requirements.reset_ranking();
    }

    /// Requests matches for the selected wall with the applied state.
    pub async fn refresh(&self) -> RefreshOutcome {
        let generation = self.generation();
        let request = {
            let mut state = self.lock();
            let Some(product) = state.selected.clone() else {
                return RefreshOutcome::Skipped;
            };
            let pre_filter = state.filters.get(&product).cloned();
            state.in_flight += 1;
            MatchRequest::new(
                &product,
                state.requirements.active(),
                *state.sampling.committed(),
                pre_filter,
            )
        };

        let result = self.client.apply_profile(&request).await;

        let mut state = self.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        if self.generation() != generation {
            debug!(
                "Discarding stale match response for '{}' (generation {generation})",
                request.product
            );
            return RefreshOutcome::Stale;
        }

        match result {
            Ok(results) => {
                let total = results.total();
                state.aggregator.ingest(results);
                state.message = None;
                info!("Match for '{}': {total} combinations", request.product);
                RefreshOutcome::Applied { total }
            }
            Err(e) => {
                warn!("Match request for '{}' failed: {e:#}", request.product);
                state.aggregator.clear();
                state.message = Some("Failed to load performance data".to_string());
                RefreshOutcome::Failed
            }
        }
    }

    /// Makes `product` the table's active product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product has no matches.
    pub fn select_product(&self, product: &str) -> Result<()> {
        self.lock().aggregator.select_product(product)
    }

    /// Plot series of the current results.
    pub fn plot(&self, colors: &PlotColors) -> Vec<PlotSeries> {
        self.lock().aggregator.plot(colors)
    }

    /// Table of the active product.
    pub fn table(&self) -> Option<ProductTable> {
        self.lock().aggregator.table()
    }

    /// Exact-match statistics of the active product.
    pub fn stats(&self) -> Option<MatchStats> {
        self.lock().aggregator.stats()
    }

    /// Per-product match counts.
    pub fn product_summaries(&self) -> Vec<ProductSummary> {
        self.lock().aggregator.product_summaries()
    }

    /// Layers of the selected wall, if loaded.
    pub fn layers(&self) -> Option<LayerSet> {
        self.lock().editor.as_ref().map(|e| e.layers().clone())
    }

    /// Copy of the session state for display.
    pub fn snapshot(&self) -> SessionView {
        let state = self.lock();
        SessionView {
            bauteil_typ: state.bauteil_typ.clone(),
            products: state.products.clone(),
            selected: state.selected.clone(),
            active_product: state.aggregator.active_product().map(str::to_string),
            pre_filter: state
                .selected
                .as_deref()
                .and_then(|wall| state.filters.get(wall))
                .cloned(),
            profile: *state.requirements.active(),
            sampling: *state.sampling.committed(),
            ranking: *state.requirements.ranking(),
            total_matches: state.aggregator.total_matches(),
            lignum: state.lignum.clone(),
            message: state.message.clone(),
            loading: state.in_flight > 0,
        }
    }
}
