//! Command implementations over the storefront client.

use std::error::Error;

use rosewater_client::checkout::{CheckoutError, CheckoutOutcome, ShippingAddress, VerifyOutcome};
use rosewater_client::state::Shop;
use rosewater_core::{OrderId, PaymentMethod, ProductId};

use crate::CheckoutArgs;

pub fn catalog_list(shop: &Shop, category: Option<&str>, bestsellers: bool) {
    let products = match category {
        Some(category) => shop.catalog().by_category(category),
        None if bestsellers => shop.catalog().bestsellers(),
        None => shop.catalog().products(),
    };

    if products.is_empty() {
        println!("No products available.");
        return;
    }

    for product in products {
        println!(
            "{}  {:<32} {:>8}  {}",
            product.id, product.name, product.price.to_string(), product.category
        );
    }
}

pub fn cart_show(shop: &Shop) {
    let items = shop.cart().items();
    if items.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for item in &items {
        let (name, line_total) = shop.catalog().resolve(&item.product_id).map_or_else(
            || ("<unavailable>".to_string(), rosewater_core::Price::ZERO),
            |product| (product.name.clone(), product.price.times(item.quantity)),
        );
        println!(
            "{}  {:<32} size {:<3} x{:<3} {:>8}",
            item.product_id,
            name,
            item.size,
            item.quantity,
            line_total.to_string()
        );
    }
    println!(
        "{} item(s), subtotal {}",
        shop.cart().count(),
        shop.cart().amount()
    );
}

pub async fn cart_add(
    shop: &Shop,
    product_id: &str,
    quantity: u32,
    size: &str,
) -> Result<(), Box<dyn Error>> {
    shop.add_to_cart(&ProductId::new(product_id), quantity, size)
        .await?;
    println!("Added. Cart now holds {} item(s).", shop.cart().count());
    Ok(())
}

pub async fn cart_update(
    shop: &Shop,
    product_id: &str,
    quantity: u32,
    size: &str,
) -> Result<(), Box<dyn Error>> {
    shop.update_cart_quantity(&ProductId::new(product_id), quantity, size)
        .await?;
    println!("Updated. Cart now holds {} item(s).", shop.cart().count());
    Ok(())
}

pub async fn cart_remove(shop: &Shop, product_id: &str) -> Result<(), Box<dyn Error>> {
    shop.remove_from_cart(&ProductId::new(product_id)).await?;
    println!("Removed. Cart now holds {} item(s).", shop.cart().count());
    Ok(())
}

pub async fn cart_clear(shop: &Shop) -> Result<(), Box<dyn Error>> {
    shop.clear_cart().await?;
    println!("Cart cleared.");
    Ok(())
}

pub fn wishlist_toggle(shop: &Shop, product_id: &str) {
    let id = ProductId::new(product_id);
    if shop.wishlist().toggle(&id) {
        println!("Added to wishlist.");
    } else {
        println!("Removed from wishlist.");
    }
}

pub fn wishlist_show(shop: &Shop) {
    let entries = shop.wishlist().entries();
    if entries.is_empty() {
        println!("Your wishlist is empty.");
        return;
    }
    for entry in entries {
        let name = shop
            .catalog()
            .resolve(&entry.product_id)
            .map_or_else(|| "<unavailable>".to_string(), |product| product.name);
        println!("{}  {:<32} added {}", entry.product_id, name, entry.added_at);
    }
}

pub async fn login(shop: &Shop, email: &str, password: &str) -> Result<(), Box<dyn Error>> {
    shop.login(email, password).await?;
    match shop.user() {
        Some(user) => println!("Logged in as {} <{}>.", user.name, user.email),
        None => println!("Logged in."),
    }
    Ok(())
}

pub fn logout(shop: &Shop) {
    shop.logout();
    println!("Logged out.");
}

pub async fn orders(shop: &Shop) -> Result<(), Box<dyn Error>> {
    let orders = shop.order_history().await?;
    if orders.is_empty() {
        println!("No orders yet.");
        return Ok(());
    }

    for order in orders {
        let paid = if order.payment { "paid" } else { "unpaid" };
        println!(
            "{}  {:<14} {:>8}  {} ({paid})",
            order.id,
            order.status.to_string(),
            order.amount.to_string(),
            order.payment_method
        );
    }
    Ok(())
}

pub async fn checkout(shop: &Shop, args: &CheckoutArgs) -> Result<(), Box<dyn Error>> {
    let method: PaymentMethod = args.method.parse()?;
    let address = ShippingAddress {
        first_name: args.first_name.clone(),
        last_name: args.last_name.clone(),
        email: args.email.clone(),
        street: args.street.clone(),
        city: args.city.clone(),
        state: args.state.clone(),
        zipcode: args.zipcode.clone(),
        country: args.country.clone(),
        phone: args.phone.clone(),
    };

    match shop.place_order(&address, method).await {
        Ok(CheckoutOutcome::Placed(order)) => {
            println!(
                "Order {} placed ({}), total {}.",
                order.id, order.status, order.amount
            );
        }
        Ok(CheckoutOutcome::Redirect { url }) => {
            println!("Complete your payment at:\n  {url}");
            println!("Then run: rw-cli verify --order-id <id> [--success]");
        }
        Err(CheckoutError::Invalid(errors)) => {
            println!("Please correct the following fields:");
            for (field, message) in errors {
                println!("  {field}: {message}");
            }
        }
        Err(CheckoutError::EmptyCart) => {
            println!("Your cart is empty - add something first.");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub async fn verify(shop: &Shop, order_id: &str, success: bool) -> Result<(), Box<dyn Error>> {
    match shop
        .verify_payment(&OrderId::new(order_id), success)
        .await?
    {
        VerifyOutcome::Confirmed => println!("Payment verified - order placed."),
        VerifyOutcome::Rejected => {
            println!("Payment failed. Your cart is untouched:");
            cart_show(shop);
        }
    }
    Ok(())
}
