//! Wire types for the backend REST API.
//!
//! Every response carries a `success` flag and an optional `message`; the
//! client maps `success: false` to an error at the call site. Cart lines on
//! the wire may carry the product as a bare id or as an embedded object
//! (the backend populates it on some paths) - both collapse to the
//! canonical [`CartItem`] at this boundary, so nothing above the API layer
//! sees the legacy shape.

use chrono::{DateTime, Utc};
use rosewater_core::{OrderId, OrderStatus, PaymentMethod, Price, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::checkout::ShippingAddress;

/// Size applied when a cart line does not specify one.
pub const DEFAULT_SIZE: &str = "M";

fn default_size() -> String {
    DEFAULT_SIZE.to_string()
}

// =============================================================================
// Catalog
// =============================================================================

/// A catalog product. Read-only from the cart's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub sub_category: String,
    /// Ordered image references; some backend paths say `images`.
    #[serde(default, alias = "images")]
    pub image: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub bestseller: bool,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

// =============================================================================
// Cart
// =============================================================================

/// Canonical cart line: one entry per (product, size) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default = "default_size")]
    pub size: String,
}

impl CartItem {
    /// Create a cart line, falling back to the default size when empty.
    #[must_use]
    pub fn new(product_id: ProductId, quantity: u32, size: &str) -> Self {
        Self {
            product_id,
            quantity,
            size: if size.is_empty() {
                default_size()
            } else {
                size.to_string()
            },
        }
    }
}

/// A cart line as the backend sends it.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CartLineWire {
    pub product: ProductRef,
    pub quantity: u32,
    #[serde(default = "default_size")]
    pub size: String,
}

impl From<CartLineWire> for CartItem {
    fn from(line: CartLineWire) -> Self {
        Self {
            product_id: line.product.into_id(),
            quantity: line.quantity,
            size: line.size,
        }
    }
}

/// The `product` field of a cart line: populated object or bare id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ProductRef {
    Embedded(EmbeddedProduct),
    Id(ProductId),
}

impl ProductRef {
    fn into_id(self) -> ProductId {
        match self {
            Self::Embedded(product) => product.id,
            Self::Id(id) => id,
        }
    }
}

/// The subset of product fields the backend embeds into cart lines.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EmbeddedProduct {
    #[serde(rename = "_id")]
    pub id: ProductId,
}

/// Body for add (`POST`) and update (`PUT`) cart calls.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
    pub size: String,
}

// =============================================================================
// Orders
// =============================================================================

/// An order line: a snapshot of the product at order time, not a live
/// reference - prices may change after the order is placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub item_id: ProductId,
    #[serde(default)]
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: Vec<String>,
    #[serde(default = "default_size")]
    pub size: String,
    pub quantity: u32,
}

/// Body for order-creation calls (both payment paths).
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub address: ShippingAddress,
    pub items: Vec<OrderLine>,
    pub amount: Price,
}

/// An order as returned by the backend. Immutable snapshot apart from the
/// status and payment fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(default)]
    pub amount: Price,
    #[serde(default)]
    pub address: Option<ShippingAddress>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment: bool,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

// =============================================================================
// Account
// =============================================================================

/// The authenticated user's profile.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

// =============================================================================
// Response envelopes
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct StatusEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CartEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub cart: Option<CartPayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CartPayload {
    #[serde(default)]
    pub items: Vec<CartLineWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductsEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub order: Option<Order>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrdersEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PaymentSessionEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub session_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_line_with_bare_id() {
        let line: CartLineWire =
            serde_json::from_str(r#"{"product": "p1", "quantity": 2, "size": "L"}"#)
                .expect("deserialize");
        let item = CartItem::from(line);
        assert_eq!(item.product_id, ProductId::new("p1"));
        assert_eq!(item.quantity, 2);
        assert_eq!(item.size, "L");
    }

    #[test]
    fn test_cart_line_with_embedded_product() {
        let json = r#"{"product": {"_id": "p1", "name": "Silk Blush", "price": 12.5}, "quantity": 1}"#;
        let line: CartLineWire = serde_json::from_str(json).expect("deserialize");
        let item = CartItem::from(line);
        assert_eq!(item.product_id, ProductId::new("p1"));
        // Missing size falls back to the default.
        assert_eq!(item.size, DEFAULT_SIZE);
    }

    #[test]
    fn test_product_accepts_images_alias() {
        let json = r#"{"_id": "p1", "name": "Rose Serum", "price": 30,
                       "images": ["a.jpg", "b.jpg"]}"#;
        let product: Product = serde_json::from_str(json).expect("deserialize");
        assert_eq!(product.image, vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_order_defaults() {
        let json = r#"{"_id": "o1", "items": [{"itemId": "p1", "price": 10, "quantity": 2}]}"#;
        let order: Order = serde_json::from_str(json).expect("deserialize");
        assert_eq!(order.status, OrderStatus::OrderPlaced);
        assert!(!order.payment);
        assert_eq!(order.items.len(), 1);
        let line = order.items.first().expect("line");
        assert_eq!(line.size, DEFAULT_SIZE);
    }

    #[test]
    fn test_cart_item_request_wire_shape() {
        let request = CartItemRequest {
            product_id: ProductId::new("p1"),
            quantity: 3,
            size: "S".to_string(),
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"productId": "p1", "quantity": 3, "size": "S"})
        );
    }
}
