//! Checkout orchestration: shipping validation, order assembly, and the
//! two payment paths.
//!
//! Pay-on-delivery settles in one round trip: place the order, clear the
//! local cart, done. Hosted payment detours out of process - the backend
//! returns a redirect URL, the user pays on the gateway's page, and the
//! gateway's callback drives [`CheckoutOrchestrator::verify`]. The local
//! cart is cleared only once a payment path has actually completed.
//!
//! Validation is collected per field, not fail-fast, so a form can
//! highlight every invalid field at once.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use rosewater_core::{Email, OrderId, PaymentMethod, Price};

use crate::api::OrderApi;
use crate::api::types::{Order, OrderLine, OrderRequest};
use crate::cart::CartSynchronizer;
use crate::catalog::Catalog;
use crate::error::ClientError;

/// Flat delivery fee added to every order total.
#[must_use]
pub fn delivery_fee() -> Price {
    Price::from(10)
}

/// Shipping form fields. Wire names are the backend's `camelCase` keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zipcode: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub phone: String,
}

/// Field name -> message, keyed by the form's wire field names.
pub type ValidationErrors = BTreeMap<String, String>;

/// Validate a shipping form, collecting every failure.
///
/// Returns an empty map for a fully valid form.
#[must_use]
pub fn validate_address(address: &ShippingAddress) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    let mut require = |field: &str, value: &str, message: &str| {
        if value.trim().is_empty() {
            errors.insert(field.to_string(), message.to_string());
        }
    };

    require("firstName", &address.first_name, "First name is required");
    require("lastName", &address.last_name, "Last name is required");
    require("street", &address.street, "Street address is required");
    require("city", &address.city, "City is required");
    require("state", &address.state, "State is required");
    require("zipcode", &address.zipcode, "Zip code is required");
    require("country", &address.country, "Country is required");

    if address.email.trim().is_empty() {
        errors.insert("email".to_string(), "Email is required".to_string());
    } else if Email::parse(address.email.trim()).is_err() {
        errors.insert("email".to_string(), "Email is invalid".to_string());
    }

    if address.phone.trim().is_empty() {
        errors.insert("phone".to_string(), "Phone number is required".to_string());
    } else {
        let digits = address.phone.chars().filter(char::is_ascii_digit).count();
        if !(10..=15).contains(&digits) {
            errors.insert(
                "phone".to_string(),
                "Please enter a valid phone number".to_string(),
            );
        }
    }

    errors
}

/// Errors surfaced by checkout submission.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart holds nothing to order; the caller should return to the
    /// cart view.
    #[error("your cart is empty")]
    EmptyCart,

    /// One or more shipping fields failed validation. Nothing reached the
    /// network.
    #[error("please correct the highlighted fields")]
    Invalid(ValidationErrors),

    /// The order call itself failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Terminal result of a checkout submission.
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// Pay-on-delivery order placed; the local cart has been cleared.
    Placed(Order),
    /// Hosted payment: redirect the user to the gateway. The cart stays
    /// intact until [`CheckoutOrchestrator::verify`] confirms payment.
    Redirect {
        /// Hosted payment page URL (opaque to the client).
        url: String,
    },
}

/// Result of post-redirect payment verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Payment settled; the local cart has been cleared.
    Confirmed,
    /// Payment did not settle. The cart is untouched; the caller should
    /// return the user to the cart view with the failure notice.
    Rejected,
}

/// Converts the current cart plus a shipping form into an order, driving
/// one of the two payment paths to completion.
pub struct CheckoutOrchestrator {
    api: Arc<dyn OrderApi>,
    catalog: Arc<Catalog>,
    cart: Arc<CartSynchronizer>,
}

impl CheckoutOrchestrator {
    /// Create an orchestrator over the given collaborators.
    #[must_use]
    pub fn new(
        api: Arc<dyn OrderApi>,
        catalog: Arc<Catalog>,
        cart: Arc<CartSynchronizer>,
    ) -> Self {
        Self { api, catalog, cart }
    }

    /// Submit the current cart as an order.
    ///
    /// Preconditions are checked before anything reaches the network: the
    /// cart must be non-empty and the shipping form valid.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::EmptyCart`], [`CheckoutError::Invalid`] with the
    /// per-field map, or the underlying [`ClientError`].
    #[instrument(skip(self, address), fields(method = %method))]
    pub async fn submit(
        &self,
        address: &ShippingAddress,
        method: PaymentMethod,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        if self.cart.count() == 0 {
            return Err(CheckoutError::EmptyCart);
        }

        let errors = validate_address(address);
        if !errors.is_empty() {
            return Err(CheckoutError::Invalid(errors));
        }

        let request = OrderRequest {
            address: address.clone(),
            items: self.order_lines(),
            amount: self.cart.amount() + delivery_fee(),
        };

        match method {
            PaymentMethod::Cod => {
                let order = self.api.place_order(request).await?;
                self.cart.clear_local();
                Ok(CheckoutOutcome::Placed(order))
            }
            PaymentMethod::Stripe => {
                let url = self.api.create_payment_session(request).await?;
                Ok(CheckoutOutcome::Redirect { url })
            }
        }
    }

    /// Verify a hosted payment after the gateway redirects back.
    ///
    /// # Errors
    ///
    /// Surfaces transport and session failures; an unsettled payment is
    /// the [`VerifyOutcome::Rejected`] outcome, not an error.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn verify(
        &self,
        order_id: &OrderId,
        indicated_success: bool,
    ) -> Result<VerifyOutcome, ClientError> {
        if self.api.verify_payment(order_id, indicated_success).await? {
            self.cart.clear_local();
            Ok(VerifyOutcome::Confirmed)
        } else {
            Ok(VerifyOutcome::Rejected)
        }
    }

    /// Snapshot the cart into order lines at current catalog prices.
    ///
    /// Lines whose product no longer resolves are dropped - they carry no
    /// price and would corrupt the order total.
    fn order_lines(&self) -> Vec<OrderLine> {
        self.cart
            .items()
            .into_iter()
            .filter_map(|item| {
                self.catalog.resolve(&item.product_id).map(|product| OrderLine {
                    item_id: item.product_id,
                    name: product.name,
                    price: product.price,
                    image: product.image,
                    size: item.size,
                    quantity: item.quantity,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_address() -> ShippingAddress {
        ShippingAddress {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            street: "12 Analytical Way".to_string(),
            city: "London".to_string(),
            state: "LDN".to_string(),
            zipcode: "EC1A".to_string(),
            country: "UK".to_string(),
            phone: "+44 (0)20 7946 0958".to_string(),
        }
    }

    #[test]
    fn test_valid_form_has_no_errors() {
        assert!(validate_address(&valid_address()).is_empty());
    }

    #[test]
    fn test_missing_email_and_bad_phone_exact_keys() {
        let address = ShippingAddress {
            email: String::new(),
            phone: "123".to_string(),
            ..valid_address()
        };
        let errors = validate_address(&address);
        assert_eq!(
            errors.keys().collect::<Vec<_>>(),
            vec!["email", "phone"],
            "no other fields may be flagged"
        );
        assert_eq!(errors.get("email").map(String::as_str), Some("Email is required"));
        assert_eq!(
            errors.get("phone").map(String::as_str),
            Some("Please enter a valid phone number")
        );
    }

    #[test]
    fn test_invalid_email_pattern() {
        let address = ShippingAddress {
            email: "not-an-email".to_string(),
            ..valid_address()
        };
        let errors = validate_address(&address);
        assert_eq!(errors.get("email").map(String::as_str), Some("Email is invalid"));
    }

    #[test]
    fn test_phone_digits_counted_after_stripping() {
        // 11 digits spread across punctuation is fine.
        let address = ShippingAddress {
            phone: "(555) 123-4567 x1".to_string(),
            ..valid_address()
        };
        assert!(validate_address(&address).is_empty());

        // 16 digits is too many.
        let address = ShippingAddress {
            phone: "1234567890123456".to_string(),
            ..valid_address()
        };
        assert!(validate_address(&address).contains_key("phone"));
    }

    #[test]
    fn test_empty_form_flags_every_field() {
        let errors = validate_address(&ShippingAddress::default());
        assert_eq!(errors.len(), 9);
    }

    #[test]
    fn test_whitespace_only_fields_are_missing() {
        let address = ShippingAddress {
            city: "   ".to_string(),
            ..valid_address()
        };
        let errors = validate_address(&address);
        assert_eq!(errors.get("city").map(String::as_str), Some("City is required"));
    }

    #[test]
    fn test_address_wire_shape() {
        let json = serde_json::to_value(valid_address()).expect("serialize");
        assert!(json.get("firstName").is_some());
        assert!(json.get("zipcode").is_some());
    }
}
