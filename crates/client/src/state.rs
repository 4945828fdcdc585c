//! Application state shared across storefront features.
//!
//! [`Shop`] replaces ambient global state with an explicit context: it owns
//! the cache, session, catalog, cart, checkout, and wishlist, and is passed
//! to consumers rather than looked up. Lifecycle: [`Shop::init`] on startup
//! restores cached state for instant paint and then synchronizes with the
//! backend; [`Shop::logout`] (or any authentication-invalid response) runs
//! a single idempotent teardown.
//!
//! Every operation wrapper routes its result through the session guard, so
//! an expired credential detected on *any* collaborator call clears the
//! credential and the in-memory user/cart/wishlist state exactly once.

use std::sync::{Arc, Mutex, PoisonError};

use secrecy::SecretString;
use tracing::{info, warn};

use rosewater_core::{OrderId, PaymentMethod, ProductId};

use crate::api::types::{Order, UserProfile};
use crate::api::{AccountApi, ApiClient, CartApi, CatalogApi, OrderApi};
use crate::cache::{LocalCache, keys};
use crate::cart::CartSynchronizer;
use crate::catalog::{Catalog, CatalogLoader};
use crate::checkout::{
    CheckoutError, CheckoutOrchestrator, CheckoutOutcome, ShippingAddress, VerifyOutcome,
};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::SessionManager;
use crate::wishlist::Wishlist;

/// The storefront application context.
pub struct Shop {
    cache: Arc<LocalCache>,
    session: SessionManager,
    catalog: Arc<Catalog>,
    loader: CatalogLoader,
    cart: Arc<CartSynchronizer>,
    checkout: CheckoutOrchestrator,
    wishlist: Wishlist,
    account: Arc<dyn AccountApi>,
    orders: Arc<dyn OrderApi>,
    user: Mutex<Option<UserProfile>>,
}

impl Shop {
    /// Build a shop against the real backend described by `config`.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        let session = SessionManager::new();
        let api = Arc::new(ApiClient::new(&config.api_url, session.clone()));
        Self::from_parts(config, session, api)
    }

    /// Build a shop over an injected backend. Used by tests and anywhere
    /// the remote collaborators need substituting.
    #[must_use]
    pub fn with_backend<A>(config: &ClientConfig, backend: Arc<A>) -> Self
    where
        A: CartApi + OrderApi + CatalogApi + AccountApi + 'static,
    {
        Self::from_parts(config, SessionManager::new(), backend)
    }

    fn from_parts<A>(config: &ClientConfig, session: SessionManager, backend: Arc<A>) -> Self
    where
        A: CartApi + OrderApi + CatalogApi + AccountApi + 'static,
    {
        let cache = Arc::new(LocalCache::open(&config.cache_dir));
        let catalog = Arc::new(Catalog::new());

        let catalog_api: Arc<dyn CatalogApi> = backend.clone();
        let cart_api: Arc<dyn CartApi> = backend.clone();
        let order_api: Arc<dyn OrderApi> = backend.clone();
        let account: Arc<dyn AccountApi> = backend;

        let loader = CatalogLoader::new(catalog_api, cache.clone(), config.catalog_retry);
        let cart = Arc::new(CartSynchronizer::new(
            cart_api,
            catalog.clone(),
            cache.clone(),
        ));
        let checkout =
            CheckoutOrchestrator::new(order_api.clone(), catalog.clone(), cart.clone());

        Self {
            wishlist: Wishlist::new(cache.clone()),
            cache,
            session,
            catalog,
            loader,
            cart,
            checkout,
            account,
            orders: order_api,
            user: Mutex::new(None),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start up: restore cached state for instant paint, refresh the
    /// catalog (bounded retry, cache fallback), and - when a credential
    /// survived the last run - synchronize profile and cart.
    ///
    /// Never fails: startup degrades to cached or empty state with a
    /// warning.
    pub async fn init(&self) {
        self.cart.load_cached();
        self.wishlist.load_cached();
        if let Some(token) = self.cache.load::<String>(keys::TOKEN) {
            self.session.set_credential(SecretString::from(token));
        }

        match self.loader.load().await {
            Ok(products) => self.catalog.replace(products),
            Err(e) => warn!("catalog unavailable, starting empty: {e}"),
        }

        if self.session.is_authenticated() {
            match self.guard(self.account.fetch_profile().await) {
                Ok(user) => *self.lock_user() = Some(user),
                Err(e) => warn!("profile fetch failed: {e}"),
            }
            if self.session.is_authenticated()
                && let Err(e) = self.guard(self.cart.refresh().await)
            {
                warn!("cart refresh failed, keeping cached view: {e}");
            }
        }
    }

    /// Log in and synchronize profile and cart.
    ///
    /// # Errors
    ///
    /// Surfaces the login failure; profile/cart sync failures after a
    /// successful login degrade with a warning.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ClientError> {
        let token = self.account.login(email, password).await?;
        self.cache.store(keys::TOKEN, &token);
        self.session.set_credential(SecretString::from(token));
        info!("logged in");

        match self.guard(self.account.fetch_profile().await) {
            Ok(user) => *self.lock_user() = Some(user),
            Err(e) => warn!("profile fetch failed: {e}"),
        }
        if let Err(e) = self.guard(self.cart.refresh().await) {
            warn!("cart refresh failed: {e}");
        }
        Ok(())
    }

    /// Log out, clearing the credential and in-memory state.
    pub fn logout(&self) {
        if self.teardown() {
            info!("logged out");
        }
    }

    /// Single idempotent teardown: clear the credential (memory and cached
    /// token) and the in-memory user/cart/wishlist state. Only the call
    /// that actually invalidated a live credential does the work.
    fn teardown(&self) -> bool {
        if self.session.invalidate() {
            self.cache.remove(keys::TOKEN);
            self.cart.reset();
            self.wishlist.reset();
            *self.lock_user() = None;
            true
        } else {
            false
        }
    }

    /// Route an operation result through session teardown: an
    /// authentication-invalid error clears the session exactly once and is
    /// then surfaced to the caller as the "log in again" condition.
    fn guard<T>(&self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(e) = &result
            && e.is_session_expired()
            && self.teardown()
        {
            warn!("session expired, cleared local session state");
        }
        result
    }

    // =========================================================================
    // Cart operations
    // =========================================================================

    /// Add an item (overwrite semantics per (product, size)).
    ///
    /// # Errors
    ///
    /// See [`CartSynchronizer::add_item`]; an expired session also tears
    /// down local session state.
    pub async fn add_to_cart(
        &self,
        product_id: &ProductId,
        quantity: u32,
        size: &str,
    ) -> Result<(), ClientError> {
        self.guard(self.cart.add_item(product_id, quantity, size).await)
    }

    /// Set an item's quantity; below 1 removes it.
    ///
    /// # Errors
    ///
    /// See [`CartSynchronizer::update_quantity`].
    pub async fn update_cart_quantity(
        &self,
        product_id: &ProductId,
        quantity: u32,
        size: &str,
    ) -> Result<(), ClientError> {
        self.guard(self.cart.update_quantity(product_id, quantity, size).await)
    }

    /// Remove all size variants of a product.
    ///
    /// # Errors
    ///
    /// See [`CartSynchronizer::remove_item`].
    pub async fn remove_from_cart(&self, product_id: &ProductId) -> Result<(), ClientError> {
        self.guard(self.cart.remove_item(product_id).await)
    }

    /// Empty the cart remotely and locally.
    ///
    /// # Errors
    ///
    /// See [`CartSynchronizer::clear`].
    pub async fn clear_cart(&self) -> Result<(), ClientError> {
        self.guard(self.cart.clear().await)
    }

    // =========================================================================
    // Checkout operations
    // =========================================================================

    /// Submit the current cart as an order via the chosen payment method.
    ///
    /// # Errors
    ///
    /// See [`CheckoutOrchestrator::submit`].
    pub async fn place_order(
        &self,
        address: &ShippingAddress,
        method: PaymentMethod,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let result = self.checkout.submit(address, method).await;
        if let Err(CheckoutError::Client(e)) = &result
            && e.is_session_expired()
            && self.teardown()
        {
            warn!("session expired, cleared local session state");
        }
        result
    }

    /// Verify a hosted payment after the gateway redirect returns.
    ///
    /// # Errors
    ///
    /// See [`CheckoutOrchestrator::verify`].
    pub async fn verify_payment(
        &self,
        order_id: &OrderId,
        indicated_success: bool,
    ) -> Result<VerifyOutcome, ClientError> {
        self.guard(self.checkout.verify(order_id, indicated_success).await)
    }

    /// Fetch the user's order history.
    ///
    /// # Errors
    ///
    /// Surfaces the remote failure; an expired session tears down local
    /// session state.
    pub async fn order_history(&self) -> Result<Vec<Order>, ClientError> {
        self.guard(self.orders.list_orders().await)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The cart synchronizer.
    #[must_use]
    pub fn cart(&self) -> &CartSynchronizer {
        &self.cart
    }

    /// The catalog snapshot.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The wishlist.
    #[must_use]
    pub fn wishlist(&self) -> &Wishlist {
        &self.wishlist
    }

    /// The session manager.
    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// The logged-in user's profile, if any.
    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.lock_user().clone()
    }

    fn lock_user(&self) -> std::sync::MutexGuard<'_, Option<UserProfile>> {
        self.user.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
