//! REST API client for the Rosewater backend.
//!
//! # Architecture
//!
//! - The backend is the source of truth for cart and order state - no local
//!   sync protocol, direct calls per operation.
//! - One shared `reqwest::Client` behind an `Arc`'d inner struct; the
//!   bearer credential is read from the [`SessionManager`] per request.
//! - Components depend on the narrow traits ([`CartApi`], [`OrderApi`],
//!   [`CatalogApi`], [`AccountApi`]) rather than the concrete client, so
//!   tests can substitute an in-memory backend.
//!
//! An HTTP 401 from any call maps to [`ClientError::SessionExpired`], the
//! signal that drives session teardown upstream.

pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use rosewater_core::{OrderId, ProductId};

use crate::error::ClientError;
use crate::session::SessionManager;
use types::{
    CartEnvelope, CartItem, CartItemRequest, LoginEnvelope, Order, OrderEnvelope, OrderRequest,
    OrdersEnvelope, PaymentSessionEnvelope, Product, ProductsEnvelope, ProfileEnvelope,
    StatusEnvelope, UserProfile,
};

// =============================================================================
// Backend traits
// =============================================================================

/// Remote cart store operations. All are safe to repeat.
#[async_trait]
pub trait CartApi: Send + Sync {
    /// Fetch the authoritative cart item list.
    async fn fetch_cart(&self) -> Result<Vec<CartItem>, ClientError>;

    /// Add a line, or replace the quantity of an existing (product, size)
    /// line. Returns the authoritative item list after the change.
    async fn upsert_item(&self, request: CartItemRequest) -> Result<Vec<CartItem>, ClientError>;

    /// Update the quantity of an existing line.
    async fn update_item(&self, request: CartItemRequest) -> Result<Vec<CartItem>, ClientError>;

    /// Remove every size variant of a product.
    async fn remove_item(&self, product_id: &ProductId) -> Result<Vec<CartItem>, ClientError>;

    /// Empty the cart.
    async fn clear_cart(&self) -> Result<(), ClientError>;
}

/// Product catalog reads. Unauthenticated and idempotent.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch the full product list.
    async fn list_products(&self) -> Result<Vec<Product>, ClientError>;
}

/// Order placement, hosted payment, and history.
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Place a pay-on-delivery order.
    async fn place_order(&self, request: OrderRequest) -> Result<Order, ClientError>;

    /// Create a hosted-payment order; returns the redirect URL.
    async fn create_payment_session(&self, request: OrderRequest) -> Result<String, ClientError>;

    /// Confirm a hosted payment after the redirect returns.
    ///
    /// `Ok(false)` means the gateway reported the payment as not completed;
    /// errors are reserved for transport and session failures.
    async fn verify_payment(
        &self,
        order_id: &OrderId,
        indicated_success: bool,
    ) -> Result<bool, ClientError>;

    /// Fetch the user's order history, newest first.
    async fn list_orders(&self) -> Result<Vec<Order>, ClientError>;
}

/// Account operations.
#[async_trait]
pub trait AccountApi: Send + Sync {
    /// Exchange credentials for a bearer token.
    async fn login(&self, email: &str, password: &str) -> Result<String, ClientError>;

    /// Fetch the authenticated user's profile.
    async fn fetch_profile(&self) -> Result<UserProfile, ClientError>;
}

// =============================================================================
// ApiClient
// =============================================================================

/// HTTP client for the Rosewater backend.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: String,
    session: SessionManager,
}

impl ApiClient {
    /// Create a new API client against `base_url`, attaching credentials
    /// from `session`.
    #[must_use]
    pub fn new(base_url: &Url, session: SessionManager) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                http: reqwest::Client::new(),
                base_url: base_url.as_str().trim_end_matches('/').to_string(),
                session,
            }),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    fn bearer(&self) -> Result<SecretString, ClientError> {
        self.inner
            .session
            .credential()
            .ok_or(ClientError::NotAuthenticated)
    }

    /// Send a request and decode the response body.
    ///
    /// Status mapping: 401 is the session-expired signal, 404 a not-found,
    /// any other non-success status a rejection carrying the backend's
    /// message when one is present.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::SessionExpired);
        }

        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<StatusEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or_else(|| format!("HTTP {status}"));
            if status == StatusCode::NOT_FOUND {
                return Err(ClientError::NotFound(message));
            }
            return Err(ClientError::Rejected(message));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Map a `success: false` body to a rejection carrying its message.
fn ensure_success(success: bool, message: Option<String>) -> Result<(), ClientError> {
    if success {
        Ok(())
    } else {
        Err(ClientError::Rejected(
            message.unwrap_or_else(|| "request failed".to_string()),
        ))
    }
}

fn into_items(envelope: CartEnvelope) -> Result<Vec<CartItem>, ClientError> {
    ensure_success(envelope.success, envelope.message)?;
    Ok(envelope
        .cart
        .map(|cart| cart.items)
        .unwrap_or_default()
        .into_iter()
        .map(CartItem::from)
        .collect())
}

#[async_trait]
impl CartApi for ApiClient {
    #[instrument(skip(self))]
    async fn fetch_cart(&self) -> Result<Vec<CartItem>, ClientError> {
        let request = self
            .inner
            .http
            .get(self.endpoint("/api/cart"))
            .bearer_auth(self.bearer()?.expose_secret());
        into_items(self.execute(request).await?)
    }

    #[instrument(skip(self, request), fields(product_id = %request.product_id))]
    async fn upsert_item(&self, request: CartItemRequest) -> Result<Vec<CartItem>, ClientError> {
        let request = self
            .inner
            .http
            .post(self.endpoint("/api/cart/items"))
            .bearer_auth(self.bearer()?.expose_secret())
            .json(&request);
        into_items(self.execute(request).await?)
    }

    #[instrument(skip(self, request), fields(product_id = %request.product_id))]
    async fn update_item(&self, request: CartItemRequest) -> Result<Vec<CartItem>, ClientError> {
        let request = self
            .inner
            .http
            .put(self.endpoint("/api/cart"))
            .bearer_auth(self.bearer()?.expose_secret())
            .json(&request);
        into_items(self.execute(request).await?)
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn remove_item(&self, product_id: &ProductId) -> Result<Vec<CartItem>, ClientError> {
        let request = self
            .inner
            .http
            .delete(self.endpoint(&format!("/api/cart/{product_id}")))
            .bearer_auth(self.bearer()?.expose_secret());
        into_items(self.execute(request).await?)
    }

    #[instrument(skip(self))]
    async fn clear_cart(&self) -> Result<(), ClientError> {
        let request = self
            .inner
            .http
            .delete(self.endpoint("/api/cart"))
            .bearer_auth(self.bearer()?.expose_secret());
        let envelope: StatusEnvelope = self.execute(request).await?;
        ensure_success(envelope.success, envelope.message)
    }
}

#[async_trait]
impl CatalogApi for ApiClient {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, ClientError> {
        let request = self.inner.http.get(self.endpoint("/api/product/list"));
        let envelope: ProductsEnvelope = self.execute(request).await?;
        ensure_success(envelope.success, envelope.message)?;
        Ok(envelope.products)
    }
}

#[async_trait]
impl OrderApi for ApiClient {
    #[instrument(skip(self, request))]
    async fn place_order(&self, request: OrderRequest) -> Result<Order, ClientError> {
        let request = self
            .inner
            .http
            .post(self.endpoint("/api/order/place"))
            .bearer_auth(self.bearer()?.expose_secret())
            .json(&request);
        let envelope: OrderEnvelope = self.execute(request).await?;
        ensure_success(envelope.success, envelope.message)?;
        envelope
            .order
            .ok_or_else(|| ClientError::Rejected("no order in response".to_string()))
    }

    #[instrument(skip(self, request))]
    async fn create_payment_session(&self, request: OrderRequest) -> Result<String, ClientError> {
        let request = self
            .inner
            .http
            .post(self.endpoint("/api/order/stripe"))
            .bearer_auth(self.bearer()?.expose_secret())
            .json(&request);
        let envelope: PaymentSessionEnvelope = self.execute(request).await?;
        ensure_success(envelope.success, envelope.message)?;
        envelope
            .session_url
            .ok_or_else(|| ClientError::Rejected("no payment session in response".to_string()))
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    async fn verify_payment(
        &self,
        order_id: &OrderId,
        indicated_success: bool,
    ) -> Result<bool, ClientError> {
        let request = self
            .inner
            .http
            .get(self.endpoint("/api/order/stripe/verify"))
            .query(&[
                ("orderId", order_id.as_str()),
                ("success", if indicated_success { "true" } else { "false" }),
            ])
            .bearer_auth(self.bearer()?.expose_secret());
        match self.execute::<StatusEnvelope>(request).await {
            Ok(envelope) => Ok(envelope.success),
            // The gateway reports an unsettled payment as a rejection, not
            // a transport failure.
            Err(ClientError::Rejected(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn list_orders(&self) -> Result<Vec<Order>, ClientError> {
        let request = self
            .inner
            .http
            .get(self.endpoint("/api/order/userorder"))
            .bearer_auth(self.bearer()?.expose_secret());
        let envelope: OrdersEnvelope = self.execute(request).await?;
        ensure_success(envelope.success, envelope.message)?;
        Ok(envelope.orders)
    }
}

#[async_trait]
impl AccountApi for ApiClient {
    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> Result<String, ClientError> {
        let request = self
            .inner
            .http
            .post(self.endpoint("/api/user/login"))
            .json(&serde_json::json!({"email": email, "password": password}));
        let envelope: LoginEnvelope = self.execute(request).await?;
        ensure_success(envelope.success, envelope.message)?;
        envelope
            .token
            .ok_or_else(|| ClientError::Rejected("no token in response".to_string()))
    }

    #[instrument(skip(self))]
    async fn fetch_profile(&self) -> Result<UserProfile, ClientError> {
        let request = self
            .inner
            .http
            .get(self.endpoint("/api/user/profile"))
            .bearer_auth(self.bearer()?.expose_secret());
        let envelope: ProfileEnvelope = self.execute(request).await?;
        ensure_success(envelope.success, envelope.message)?;
        envelope
            .user
            .ok_or_else(|| ClientError::Rejected("no user in response".to_string()))
    }
}
