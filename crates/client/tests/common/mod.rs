//! Shared in-memory backend for scenario tests.
//!
//! Implements the backend contract the way the real one behaves: cart
//! lines keyed by (product, size) with replace-on-add quantities, orders
//! created as immutable snapshots, hosted payments settled only through
//! the verify call.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use rosewater_client::api::types::{
    CartItem, CartItemRequest, Order, OrderRequest, Product, UserProfile,
};
use rosewater_client::api::{AccountApi, CartApi, CatalogApi, OrderApi};
use rosewater_client::config::ClientConfig;
use rosewater_client::error::ClientError;
use rosewater_client::retry::RetryPolicy;
use rosewater_client::state::Shop;
use rosewater_core::{OrderId, OrderStatus, PaymentMethod, Price, ProductId, UserId};

/// How the fake backend fails calls while engaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Authentication-invalid signal (HTTP 401 equivalent).
    Expired,
    /// Recoverable transport-style failure.
    Transient,
}

pub struct FakeBackend {
    pub products: Vec<Product>,
    pub lines: Mutex<Vec<CartItem>>,
    pub orders: Mutex<Vec<Order>>,
    pub failure: Mutex<Option<Failure>>,
    order_counter: AtomicU32,
}

impl FakeBackend {
    pub fn new(products: Vec<Product>) -> Arc<Self> {
        Arc::new(Self {
            products,
            lines: Mutex::new(Vec::new()),
            orders: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            order_counter: AtomicU32::new(0),
        })
    }

    /// Make every authenticated call fail until cleared.
    pub fn set_failure(&self, failure: Option<Failure>) {
        *self.failure.lock().expect("lock") = failure;
    }

    pub fn cart_snapshot(&self) -> Vec<CartItem> {
        self.lines.lock().expect("lock").clone()
    }

    pub fn order_count(&self) -> usize {
        self.orders.lock().expect("lock").len()
    }

    pub fn last_order(&self) -> Option<Order> {
        self.orders.lock().expect("lock").last().cloned()
    }

    fn check_failure(&self) -> Result<(), ClientError> {
        match *self.failure.lock().expect("lock") {
            Some(Failure::Expired) => Err(ClientError::SessionExpired),
            Some(Failure::Transient) => Err(ClientError::Rejected("backend down".to_string())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CartApi for FakeBackend {
    async fn fetch_cart(&self) -> Result<Vec<CartItem>, ClientError> {
        self.check_failure()?;
        Ok(self.cart_snapshot())
    }

    async fn upsert_item(&self, request: CartItemRequest) -> Result<Vec<CartItem>, ClientError> {
        self.check_failure()?;
        let mut lines = self.lines.lock().expect("lock");
        if let Some(line) = lines
            .iter_mut()
            .find(|line| line.product_id == request.product_id && line.size == request.size)
        {
            line.quantity = request.quantity;
        } else {
            lines.push(CartItem::new(
                request.product_id,
                request.quantity,
                &request.size,
            ));
        }
        Ok(lines.clone())
    }

    async fn update_item(&self, request: CartItemRequest) -> Result<Vec<CartItem>, ClientError> {
        self.upsert_item(request).await
    }

    async fn remove_item(&self, product_id: &ProductId) -> Result<Vec<CartItem>, ClientError> {
        self.check_failure()?;
        let mut lines = self.lines.lock().expect("lock");
        lines.retain(|line| &line.product_id != product_id);
        Ok(lines.clone())
    }

    async fn clear_cart(&self) -> Result<(), ClientError> {
        self.check_failure()?;
        self.lines.lock().expect("lock").clear();
        Ok(())
    }
}

#[async_trait]
impl CatalogApi for FakeBackend {
    async fn list_products(&self) -> Result<Vec<Product>, ClientError> {
        Ok(self.products.clone())
    }
}

#[async_trait]
impl OrderApi for FakeBackend {
    async fn place_order(&self, request: OrderRequest) -> Result<Order, ClientError> {
        self.check_failure()?;
        let order = self.record_order(request, PaymentMethod::Cod);
        Ok(order)
    }

    async fn create_payment_session(&self, request: OrderRequest) -> Result<String, ClientError> {
        self.check_failure()?;
        let order = self.record_order(request, PaymentMethod::Stripe);
        Ok(format!("https://pay.example.com/session/{}", order.id))
    }

    async fn verify_payment(
        &self,
        order_id: &OrderId,
        indicated_success: bool,
    ) -> Result<bool, ClientError> {
        self.check_failure()?;
        if !indicated_success {
            return Ok(false);
        }
        let mut orders = self.orders.lock().expect("lock");
        match orders.iter_mut().find(|order| &order.id == order_id) {
            Some(order) => {
                order.payment = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_orders(&self) -> Result<Vec<Order>, ClientError> {
        self.check_failure()?;
        let mut orders = self.orders.lock().expect("lock").clone();
        orders.reverse();
        Ok(orders)
    }
}

#[async_trait]
impl AccountApi for FakeBackend {
    async fn login(&self, email: &str, password: &str) -> Result<String, ClientError> {
        if password.is_empty() {
            return Err(ClientError::Rejected("Invalid Credentials".to_string()));
        }
        Ok(format!("token-for-{email}"))
    }

    async fn fetch_profile(&self) -> Result<UserProfile, ClientError> {
        self.check_failure()?;
        Ok(UserProfile {
            id: UserId::new("u1"),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        })
    }
}

impl FakeBackend {
    fn record_order(&self, request: OrderRequest, method: PaymentMethod) -> Order {
        let n = self.order_counter.fetch_add(1, Ordering::SeqCst);
        let order = Order {
            id: OrderId::new(format!("order-{n}")),
            items: request.items,
            amount: request.amount,
            address: Some(request.address),
            status: OrderStatus::default(),
            payment_method: method,
            payment: false,
            date: Some(Utc::now()),
        };
        self.orders.lock().expect("lock").push(order.clone());
        order
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn product(id: &str, name: &str, cents: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        description: String::new(),
        price: Price::new(Decimal::new(cents, 2)),
        category: "Face".to_string(),
        sub_category: "Serums".to_string(),
        image: vec![format!("{id}.jpg")],
        sizes: vec!["S".to_string(), "M".to_string(), "L".to_string()],
        bestseller: false,
        date: None,
    }
}

pub fn two_product_catalog() -> Vec<Product> {
    vec![
        product("p1", "Rose Serum", 1000),  // $10.00
        product("p2", "Silk Blush", 450),   // $4.50
    ]
}

pub struct TestShop {
    pub backend: Arc<FakeBackend>,
    pub shop: Shop,
    dir: tempfile::TempDir,
}

impl TestShop {
    /// The cache directory backing this shop, for restart scenarios.
    pub fn cache_dir(&self) -> std::path::PathBuf {
        self.dir.path().to_path_buf()
    }
}

/// Build an initialized, logged-in shop over a fresh fake backend.
pub async fn logged_in_shop(products: Vec<Product>) -> TestShop {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = ClientConfig {
        api_url: "http://localhost:4000".parse().expect("valid url"),
        cache_dir: dir.path().to_path_buf(),
        catalog_retry: RetryPolicy::none(),
    };
    let backend = FakeBackend::new(products);
    let shop = Shop::with_backend(&config, backend.clone());
    shop.init().await;
    shop.login("ada@example.com", "correct-horse").await.expect("login");
    TestShop { backend, shop, dir }
}
