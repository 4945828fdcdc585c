//! Client-authoritative wishlist.
//!
//! Membership is a toggle per product, not a quantity, and there is no
//! remote store: the durable cache entry is written directly by each
//! action. Shares the cache with the cart but under its own key - no
//! cross-feature mutation.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rosewater_core::ProductId;

use crate::cache::{LocalCache, keys};

/// A wishlisted product with the time it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    pub product_id: ProductId,
    pub added_at: DateTime<Utc>,
}

/// Toggle-membership wishlist persisted to the local cache.
pub struct Wishlist {
    entries: Mutex<Vec<WishlistEntry>>,
    cache: Arc<LocalCache>,
}

impl Wishlist {
    /// Create an empty wishlist over the given cache.
    #[must_use]
    pub fn new(cache: Arc<LocalCache>) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            cache,
        }
    }

    /// Restore entries from the durable cache. Absence means empty.
    pub fn load_cached(&self) {
        if let Some(entries) = self.cache.load::<Vec<WishlistEntry>>(keys::WISHLIST) {
            *self.lock() = entries;
        }
    }

    /// Toggle a product's membership. Returns `true` if the product is in
    /// the wishlist after the call.
    pub fn toggle(&self, product_id: &ProductId) -> bool {
        let mut entries = self.lock();
        let now_present = if entries
            .iter()
            .any(|entry| &entry.product_id == product_id)
        {
            entries.retain(|entry| &entry.product_id != product_id);
            false
        } else {
            entries.push(WishlistEntry {
                product_id: product_id.clone(),
                added_at: Utc::now(),
            });
            true
        };
        self.cache.store(keys::WISHLIST, &*entries);
        now_present
    }

    /// Whether a product is wishlisted.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.lock().iter().any(|entry| &entry.product_id == product_id)
    }

    /// Snapshot of the current entries.
    #[must_use]
    pub fn entries(&self) -> Vec<WishlistEntry> {
        self.lock().clone()
    }

    /// Number of wishlisted products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the wishlist is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Empty the in-memory list only. Used by session teardown.
    pub(crate) fn reset(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<WishlistEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
