//! Product catalog snapshot and loading.
//!
//! [`Catalog`] is a pure in-memory snapshot with read accessors; it is
//! replaced wholesale on refresh. [`CatalogLoader`] owns the read path:
//! a short-TTL in-memory cache, then the remote fetch under the bounded
//! retry policy, then the durable cache as a last resort. Mutating
//! operations never flow through here.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument, warn};

use rosewater_core::ProductId;

use crate::api::CatalogApi;
use crate::api::types::Product;
use crate::cache::{LocalCache, keys};
use crate::error::ClientError;
use crate::retry::RetryPolicy;

const PRODUCTS_KEY: &str = "products";
const FRESH_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// In-memory snapshot of the product catalog.
#[derive(Debug, Default)]
pub struct Catalog {
    products: RwLock<Vec<Product>>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with a freshly loaded product list.
    pub fn replace(&self, products: Vec<Product>) {
        *self.write() = products;
    }

    /// All products in the snapshot.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.read().clone()
    }

    /// Number of products in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Look up a product by id.
    #[must_use]
    pub fn resolve(&self, product_id: &ProductId) -> Option<Product> {
        self.read()
            .iter()
            .find(|product| &product.id == product_id)
            .cloned()
    }

    /// Products in the given category.
    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<Product> {
        self.read()
            .iter()
            .filter(|product| product.category == category)
            .cloned()
            .collect()
    }

    /// Products in the given sub-category.
    #[must_use]
    pub fn by_sub_category(&self, sub_category: &str) -> Vec<Product> {
        self.read()
            .iter()
            .filter(|product| product.sub_category == sub_category)
            .cloned()
            .collect()
    }

    /// Products flagged as bestsellers.
    #[must_use]
    pub fn bestsellers(&self) -> Vec<Product> {
        self.read()
            .iter()
            .filter(|product| product.bestseller)
            .cloned()
            .collect()
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        distinct(self.read().iter().map(|product| &product.category))
    }

    /// Distinct sub-categories in first-seen order.
    #[must_use]
    pub fn sub_categories(&self) -> Vec<String> {
        distinct(self.read().iter().map(|product| &product.sub_category))
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Product>> {
        self.products.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Product>> {
        self.products
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !value.is_empty() && !seen.iter().any(|existing| existing == value) {
            seen.push(value.clone());
        }
    }
    seen
}

/// Read path for the catalog: fresh cache -> remote with retry -> durable
/// cache fallback.
pub struct CatalogLoader {
    api: Arc<dyn CatalogApi>,
    fresh: Cache<&'static str, Arc<Vec<Product>>>,
    cache: Arc<LocalCache>,
    retry: RetryPolicy,
}

impl CatalogLoader {
    /// Create a loader over the given backend and durable cache.
    #[must_use]
    pub fn new(api: Arc<dyn CatalogApi>, cache: Arc<LocalCache>, retry: RetryPolicy) -> Self {
        let fresh = Cache::builder()
            .max_capacity(8)
            .time_to_live(FRESH_TTL)
            .build();
        Self {
            api,
            fresh,
            cache,
            retry,
        }
    }

    /// Load the product list.
    ///
    /// # Errors
    ///
    /// Fails only when the remote fetch is exhausted *and* no cached
    /// snapshot exists - cached data is preferred over an error.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Vec<Product>, ClientError> {
        if let Some(products) = self.fresh.get(PRODUCTS_KEY).await {
            debug!("cache hit for catalog");
            return Ok(products.as_ref().clone());
        }

        let api = Arc::clone(&self.api);
        let fetched = self
            .retry
            .run(move || {
                let api = Arc::clone(&api);
                async move { api.list_products().await }
            })
            .await;

        match fetched {
            Ok(products) => {
                self.fresh
                    .insert(PRODUCTS_KEY, Arc::new(products.clone()))
                    .await;
                self.cache.store(keys::CATALOG, &products);
                Ok(products)
            }
            Err(e) => {
                warn!("catalog fetch failed, falling back to cached snapshot: {e}");
                self.cache.load::<Vec<Product>>(keys::CATALOG).ok_or(e)
            }
        }
    }

    /// Drop the fresh-cache entry so the next load refetches.
    pub async fn invalidate(&self) {
        self.fresh.invalidate(PRODUCTS_KEY).await;
    }
}
