//! Cart synchronization between the local cache and the remote cart store.
//!
//! Mutations are confirm-then-render: nothing visible changes until the
//! backend has answered, and on success the local state is replaced
//! wholesale with the server's authoritative item list (reconciliation) -
//! it is never patched locally, so it cannot drift. On failure the local
//! state is untouched and remains the last-known-good view.
//!
//! Mutations against the same cart are serialized through a single-flight
//! mutex held across the request/reconcile cycle; concurrent callers queue
//! in arrival order instead of racing at the remote store.
//!
//! Add semantics are overwrite, not increment: adding a (product, size)
//! pair that is already in the cart replaces its quantity.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::instrument;

use rosewater_core::{Price, ProductId};

use crate::api::CartApi;
use crate::api::types::{CartItem, CartItemRequest};
use crate::cache::{LocalCache, keys};
use crate::catalog::Catalog;
use crate::error::ClientError;

/// Keeps local and remote cart state consistent under UI-triggered
/// mutations.
pub struct CartSynchronizer {
    api: Arc<dyn CartApi>,
    catalog: Arc<Catalog>,
    cache: Arc<LocalCache>,
    items: Mutex<Vec<CartItem>>,
    flight: tokio::sync::Mutex<()>,
}

impl CartSynchronizer {
    /// Create a synchronizer starting from an empty in-memory cart.
    #[must_use]
    pub fn new(api: Arc<dyn CartApi>, catalog: Arc<Catalog>, cache: Arc<LocalCache>) -> Self {
        Self {
            api,
            catalog,
            cache,
            items: Mutex::new(Vec::new()),
            flight: tokio::sync::Mutex::new(()),
        }
    }

    /// Restore the last reconciled item list from the durable cache for
    /// instant paint. Absence means an empty cart.
    pub fn load_cached(&self) {
        if let Some(items) = self.cache.load::<Vec<CartItem>>(keys::CART) {
            *self.lock_items() = items;
        }
    }

    /// Fetch the authoritative cart and reconcile local state with it.
    ///
    /// # Errors
    ///
    /// On failure the local state is preserved as last-known-good.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let _flight = self.flight.lock().await;
        let items = self.api.fetch_cart().await?;
        self.reconcile(items);
        Ok(())
    }

    /// Add an item, or replace the quantity of the existing
    /// (product, size) line.
    ///
    /// # Errors
    ///
    /// Rejects a quantity below 1 or a product id that does not resolve in
    /// the current catalog snapshot, before any remote call is made.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_item(
        &self,
        product_id: &ProductId,
        quantity: u32,
        size: &str,
    ) -> Result<(), ClientError> {
        if quantity < 1 {
            return Err(ClientError::Rejected(
                "quantity must be at least 1".to_string(),
            ));
        }
        if self.catalog.resolve(product_id).is_none() {
            return Err(ClientError::NotFound(format!("product {product_id}")));
        }

        let request = CartItemRequest {
            product_id: product_id.clone(),
            quantity,
            size: size.to_string(),
        };

        let _flight = self.flight.lock().await;
        let items = self.api.upsert_item(request).await?;
        self.reconcile(items);
        Ok(())
    }

    /// Set the quantity of an existing (product, size) line.
    ///
    /// A quantity below 1 means "remove" and is forwarded to
    /// [`remove_item`](Self::remove_item).
    ///
    /// # Errors
    ///
    /// Surfaces the remote failure; local state is preserved.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_quantity(
        &self,
        product_id: &ProductId,
        quantity: u32,
        size: &str,
    ) -> Result<(), ClientError> {
        if quantity < 1 {
            return self.remove_item(product_id).await;
        }

        let request = CartItemRequest {
            product_id: product_id.clone(),
            quantity,
            size: size.to_string(),
        };

        let _flight = self.flight.lock().await;
        let items = self.api.update_item(request).await?;
        self.reconcile(items);
        Ok(())
    }

    /// Remove every size variant of a product from the cart.
    ///
    /// # Errors
    ///
    /// Surfaces the remote failure; local state is preserved.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_item(&self, product_id: &ProductId) -> Result<(), ClientError> {
        let _flight = self.flight.lock().await;
        let items = self.api.remove_item(product_id).await?;
        self.reconcile(items);
        Ok(())
    }

    /// Empty the remote cart and the local state unconditionally.
    ///
    /// # Errors
    ///
    /// Surfaces the remote failure; local state is preserved.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), ClientError> {
        let _flight = self.flight.lock().await;
        self.api.clear_cart().await?;
        self.clear_local();
        Ok(())
    }

    /// Total quantity across all items.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.lock_items().iter().map(|item| item.quantity).sum()
    }

    /// Cart total at current catalog prices.
    ///
    /// An item whose product no longer resolves contributes zero - a stale
    /// line must not poison the total.
    #[must_use]
    pub fn amount(&self) -> Price {
        self.lock_items()
            .iter()
            .map(|item| {
                self.catalog
                    .resolve(&item.product_id)
                    .map_or(Price::ZERO, |product| product.price.times(item.quantity))
            })
            .sum()
    }

    /// Snapshot of the current item list.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.lock_items().clone()
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_items().is_empty()
    }

    /// Empty the in-memory list and the durable entry. Used after a
    /// successful order and by explicit clears.
    pub(crate) fn clear_local(&self) {
        self.lock_items().clear();
        self.cache.remove(keys::CART);
    }

    /// Empty the in-memory list only. Used by session teardown: the
    /// durable entry stays as last-known-good until the next
    /// reconciliation.
    pub(crate) fn reset(&self) {
        self.lock_items().clear();
    }

    /// Replace local state wholesale with the server's item list.
    fn reconcile(&self, items: Vec<CartItem>) {
        self.cache.store(keys::CART, &items);
        *self.lock_items() = items;
    }

    fn lock_items(&self) -> std::sync::MutexGuard<'_, Vec<CartItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
