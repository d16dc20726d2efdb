//! Remote catalog and matcher.
//!
//! [`CatalogClient`] describes the four endpoints the session needs. The
//! orchestrator is generic over it so tests can substitute an in-memory fake;
//! [`HttpCatalogClient`] talks to the real service.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::models::{
    bauteil_typ, ClassifiedResultSet, LayerSet, LayersResponse, LignumRecord, MatchRequest,
    MatchResponse,
};

/// Default service root.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api/v1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Catalog and matcher endpoints.
pub trait CatalogClient: Send + Sync + 'static {
    /// Product names of a category, in catalog order.
    fn list_products(&self, bauteil_typ: &str) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Ordered layers of a product.
    fn fetch_layers(&self, product: &str) -> impl Future<Output = Result<LayerSet>> + Send;

    /// Reference metadata of a product.
    fn fetch_lignum(&self, key: &str) -> impl Future<Output = Result<LignumRecord>> + Send;

    /// Evaluates combinations against a requirement profile.
    fn apply_profile(
        &self,
        request: &MatchRequest,
    ) -> impl Future<Output = Result<ClassifiedResultSet>> + Send;
}

/// [`CatalogClient`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    base_url: Url,
    client: Client,
}

impl HttpCatalogClient {
    /// Creates a client for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid API base URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("API base URL cannot carry a path: {base_url}");
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { base_url, client })
    }

    /// Service root.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("Request to {url} was rejected"))?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("Malformed response from {url}"))
    }
}

impl CatalogClient for HttpCatalogClient {
    async fn list_products(&self, bauteil_typ: &str) -> Result<Vec<String>> {
        let url = self.endpoint(&["buildups", bauteil_typ]);
        let products: Vec<String> = self.get_json(url).await?;
        info!("Category '{bauteil_typ}' has {} products", products.len());
        Ok(products)
    }

    async fn fetch_layers(&self, product: &str) -> Result<LayerSet> {
        let url = self.endpoint(&["buildups", bauteil_typ(product), product, "layers"]);
        let response: LayersResponse = self.get_json(url).await?;
        Ok(response.into())
    }

    async fn fetch_lignum(&self, key: &str) -> Result<LignumRecord> {
        let url = self.endpoint(&["lignum", key]);
        self.get_json(url).await
    }

    async fn apply_profile(&self, request: &MatchRequest) -> Result<ClassifiedResultSet> {
        let url = self.endpoint(&["requirement_profiles", "apply"]);
        debug!("POST {url} for '{}'", request.product);
        let response = self
            .client
            .post(url.clone())
            .json(request)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("Match request for '{}' was rejected", request.product))?;
        let body: MatchResponse = response
            .json()
            .await
            .with_context(|| format!("Malformed match response from {url}"))?;
        Ok(body.into())
    }
}
