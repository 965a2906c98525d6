//! HTTP client for the product feed.
//!
//! Fetches the whole catalog from a Fake Store-shaped JSON API and caches it
//! with `moka` (5-minute TTL) so repeated listing requests do not hammer the
//! upstream feed.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use bramble_core::{Product, ProductId};

use crate::config::StorefrontConfig;

/// Cache key for the full product feed (a single entry).
const PRODUCTS_CACHE_KEY: &str = "products";

/// Errors from the catalog feed.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The HTTP request failed or the body was not the expected JSON.
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The feed answered with a non-success status.
    #[error("catalog returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Client for the product feed API.
///
/// Cheaply cloneable; clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<&'static str, Arc<Vec<Product>>>,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                base_url: config.products_api_url.trim_end_matches('/').to_string(),
                cache,
            }),
        }
    }

    /// List every product in the feed.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the feed is unreachable or returns an
    /// unexpected payload. Cached results are served for 5 minutes.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Arc<Vec<Product>>, CatalogError> {
        if let Some(products) = self.inner.cache.get(PRODUCTS_CACHE_KEY).await {
            debug!("catalog cache hit");
            return Ok(products);
        }

        let url = format!("{}/products", self.inner.base_url);
        let response = self.inner.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status()));
        }

        let products: Vec<Product> = response.json().await?;
        debug!(count = products.len(), "catalog feed fetched");

        let products = Arc::new(products);
        self.inner
            .cache
            .insert(PRODUCTS_CACHE_KEY, Arc::clone(&products))
            .await;
        Ok(products)
    }

    /// Look up a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the feed cannot be read; an unknown ID is
    /// `Ok(None)`, not an error.
    pub async fn product(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        let products = self.list_products().await?;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }
}
