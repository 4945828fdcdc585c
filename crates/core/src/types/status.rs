//! Status enums for orders and payments.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Orders progress `Order Placed` -> `Processing`/`Shipped` -> `Delivered`,
/// or divert to `Cancelled` from any non-terminal state. The serde forms
/// match the backend's stored strings exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Order Placed")]
    OrderPlaced,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether the order has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether `next` is a valid transition from this status.
    ///
    /// Item list, address, and amount are frozen at creation; only the
    /// status field moves, and only forward (or to `Cancelled`).
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match self {
            Self::OrderPlaced => matches!(
                next,
                Self::Processing | Self::Shipped | Self::Delivered | Self::Cancelled
            ),
            Self::Processing => matches!(next, Self::Shipped | Self::Delivered | Self::Cancelled),
            Self::Shipped => matches!(next, Self::Delivered | Self::Cancelled),
            Self::Delivered | Self::Cancelled => false,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrderPlaced => write!(f, "Order Placed"),
            Self::Processing => write!(f, "Processing"),
            Self::Shipped => write!(f, "Shipped"),
            Self::Delivered => write!(f, "Delivered"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Supported payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    /// Cash on delivery - settled at the door, no gateway involved.
    #[default]
    #[serde(rename = "COD")]
    Cod,
    /// Hosted card payment via a Stripe Checkout redirect.
    Stripe,
}

impl PaymentMethod {
    /// Whether this method settles through a hosted payment redirect.
    #[must_use]
    pub const fn is_hosted(self) -> bool {
        matches!(self, Self::Stripe)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cod => write!(f, "COD"),
            Self::Stripe => write!(f, "Stripe"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cod" => Ok(Self::Cod),
            "stripe" => Ok(Self::Stripe),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}
