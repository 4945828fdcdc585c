//! Rosewater CLI - storefront front-end for the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! rw-cli catalog list
//! rw-cli catalog list --category Face
//!
//! # Log in, fill the cart, check out
//! rw-cli login -e ada@example.com -p <password>
//! rw-cli cart add --product-id 665... --quantity 2 --size M
//! rw-cli checkout --method cod --first-name Ada --last-name Lovelace ...
//!
//! # After a hosted-payment redirect returns
//! rw-cli verify --order-id 665... --success
//! ```
//!
//! Session and cart state persist between invocations in the cache
//! directory (`ROSEWATER_CACHE_DIR`).

#![cfg_attr(not(test), forbid(unsafe_code))]
// CLI output belongs on stdout
#![allow(clippy::print_stdout)]

use clap::{Args, Parser, Subcommand};

use rosewater_client::config::ClientConfig;
use rosewater_client::state::Shop;

mod commands;

#[derive(Parser)]
#[command(name = "rw-cli")]
#[command(author, version, about = "Rosewater storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Inspect and mutate the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Toggle or list wishlist entries
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Log in with email and password
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Log out and clear local session state
    Logout,
    /// Show order history
    Orders,
    /// Place an order from the current cart
    Checkout(CheckoutArgs),
    /// Verify a hosted payment after the gateway redirect
    Verify {
        /// Order id from the redirect callback
        #[arg(long)]
        order_id: String,

        /// Present when the gateway reported the payment as successful
        #[arg(long)]
        success: bool,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products
    List {
        /// Filter by category
        #[arg(long)]
        category: Option<String>,

        /// Show bestsellers only
        #[arg(long)]
        bestsellers: bool,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart with line totals
    Show,
    /// Add a product (replaces the quantity of an existing line)
    Add {
        #[arg(long)]
        product_id: String,

        #[arg(long, default_value_t = 1)]
        quantity: u32,

        #[arg(long, default_value = "M")]
        size: String,
    },
    /// Set the quantity of a line (0 removes it)
    Update {
        #[arg(long)]
        product_id: String,

        #[arg(long)]
        quantity: u32,

        #[arg(long, default_value = "M")]
        size: String,
    },
    /// Remove every size variant of a product
    Remove {
        #[arg(long)]
        product_id: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Toggle a product in or out of the wishlist
    Toggle {
        #[arg(long)]
        product_id: String,
    },
    /// List wishlist entries
    Show,
}

/// Shipping details and payment method for checkout.
#[derive(Args)]
struct CheckoutArgs {
    /// Payment method: `cod` or `stripe`
    #[arg(long, default_value = "cod")]
    method: String,

    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    street: String,

    #[arg(long)]
    city: String,

    #[arg(long)]
    state: String,

    #[arg(long)]
    zipcode: String,

    #[arg(long)]
    country: String,

    #[arg(long)]
    phone: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let shop = Shop::new(&config);
    shop.init().await;

    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::List {
                category,
                bestsellers,
            } => commands::catalog_list(&shop, category.as_deref(), bestsellers),
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart_show(&shop),
            CartAction::Add {
                product_id,
                quantity,
                size,
            } => commands::cart_add(&shop, &product_id, quantity, &size).await?,
            CartAction::Update {
                product_id,
                quantity,
                size,
            } => commands::cart_update(&shop, &product_id, quantity, &size).await?,
            CartAction::Remove { product_id } => {
                commands::cart_remove(&shop, &product_id).await?;
            }
            CartAction::Clear => commands::cart_clear(&shop).await?,
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Toggle { product_id } => {
                commands::wishlist_toggle(&shop, &product_id);
            }
            WishlistAction::Show => commands::wishlist_show(&shop),
        },
        Commands::Login { email, password } => commands::login(&shop, &email, &password).await?,
        Commands::Logout => commands::logout(&shop),
        Commands::Orders => commands::orders(&shop).await?,
        Commands::Checkout(args) => commands::checkout(&shop, &args).await?,
        Commands::Verify { order_id, success } => {
            commands::verify(&shop, &order_id, success).await?;
        }
    }
    Ok(())
}
