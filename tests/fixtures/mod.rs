//! Shared test fixtures for session and client tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use indexmap::IndexMap;
use wallmatch::models::{
    ClassifiedResultSet, Layer, LayerSet, LignumRecord, MatchRequest, MatchResponse,
    RawCombination, Variant,
};
use wallmatch::services::{CatalogClient, Orchestrator, SessionOptions};

/// In-memory catalog with scripted latency and failures.
#[derive(Debug, Default)]
pub struct FakeCatalog {
    /// Products per category
    pub products: HashMap<String, Vec<String>>,
    /// Layers per product
    pub layers: HashMap<String, LayerSet>,
    /// Match response per requested product (`"All"` included)
    pub responses: HashMap<String, MatchResponse>,
    /// Artificial latency of match requests per product
    pub delays: HashMap<String, Duration>,
    /// Artificial latency of layer fetches per product
    pub layer_delays: HashMap<String, Duration>,
    /// Products whose layer fetch fails
    pub failing_layers: HashSet<String>,
    /// Products whose match request fails
    pub failing_matches: HashSet<String>,
    /// Every match request received, in arrival order
    pub requests: Mutex<Vec<MatchRequest>>,
}

impl FakeCatalog {
    /// Match requests received so far.
    pub fn requests(&self) -> Vec<MatchRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Forgets recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }
}

impl CatalogClient for FakeCatalog {
    async fn list_products(&self, bauteil_typ: &str) -> Result<Vec<String>> {
        self.products
            .get(bauteil_typ)
            .cloned()
            .ok_or_else(|| anyhow!("unknown category {bauteil_typ}"))
    }

    async fn fetch_layers(&self, product: &str) -> Result<LayerSet> {
        if let Some(delay) = self.layer_delays.get(product) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_layers.contains(product) {
            return Err(anyhow!("layers of {product} unavailable"));
        }
        Ok(self.layers.get(product).cloned().unwrap_or_default())
    }

    async fn fetch_lignum(&self, key: &str) -> Result<LignumRecord> {
        Err(anyhow!("no reference data for {key}"))
    }

    async fn apply_profile(&self, request: &MatchRequest) -> Result<ClassifiedResultSet> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delays.get(&request.product) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_matches.contains(&request.product) {
            return Err(anyhow!("matcher rejected {}", request.product));
        }
        Ok(self
            .responses
            .get(&request.product)
            .cloned()
            .unwrap_or_default()
            .into())
    }
}

/// Three-layer wall used throughout the session tests.
pub fn test_layers() -> LayerSet {
    LayerSet::new(vec![
        Layer::new("Putz", vec![Variant::new(10.0, 5.0)]),
        Layer::new(
            "Gipsfaser",
            vec![Variant::new(15.0, 20.0), Variant::new(18.0, 22.0)],
        ),
        Layer::new(
            "Daemmung",
            vec![
                Variant::new(120.0, 30.0),
                Variant::new(160.0, 40.0),
                Variant::new(200.0, 50.0),
            ],
        ),
    ])
}

/// A raw combination with the given performance.
pub fn combo(thickness: f64, price: f64, u_value: f64) -> RawCombination {
    RawCombination {
        thicknesses: vec![10.0, 15.0, thickness - 25.0],
        performances: [thickness, price, u_value].into(),
        color: None,
        soft_violation: None,
    }
}

/// A tolerance-style raw combination with a soft-violation score.
pub fn tolerance_combo(thickness: f64, price: f64, u_value: f64, score: f64) -> RawCombination {
    RawCombination {
        soft_violation: Some(score),
        ..combo(thickness, price, u_value)
    }
}

/// Match response with the given exact and tolerance entries.
pub fn response(
    exact: Vec<(&str, Vec<RawCombination>)>,
    tolerance: Vec<(&str, Vec<RawCombination>)>,
) -> MatchResponse {
    let to_map = |entries: Vec<(&str, Vec<RawCombination>)>| {
        entries
            .into_iter()
            .map(|(name, items)| (name.to_string(), items))
            .collect::<IndexMap<_, _>>()
    };
    MatchResponse {
        meets_req: to_map(exact),
        meets_req_with_tol: to_map(tolerance),
        fails_req: IndexMap::new(),
    }
}

/// Catalog with two walls in the `Aussenwand` category, each with one exact match.
pub fn two_wall_catalog() -> FakeCatalog {
    let walls = ["Aussenwand 1.1", "Aussenwand 2.1"];
    let mut catalog = FakeCatalog::default();
    catalog.products.insert(
        "Aussenwand".to_string(),
        walls.iter().map(ToString::to_string).collect(),
    );
    for wall in walls {
        catalog.layers.insert(wall.to_string(), test_layers());
        catalog.responses.insert(
            wall.to_string(),
            response(vec![(wall, vec![combo(345.0, 300.0, 0.14)])], vec![]),
        );
    }
    catalog
}

/// Session options with a short debounce window.
pub fn test_options() -> SessionOptions {
    SessionOptions {
        debounce: Duration::from_millis(300),
        ..SessionOptions::default()
    }
}

/// Orchestrator over `catalog`, returning both handles.
pub fn session(catalog: FakeCatalog) -> (Arc<FakeCatalog>, Orchestrator<FakeCatalog>) {
    let catalog = Arc::new(catalog);
    let session = Orchestrator::new(Arc::clone(&catalog), test_options());
    (catalog, session)
}
