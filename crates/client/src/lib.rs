//! Rosewater storefront client library.
//!
//! Mediates between a remote commerce backend (REST + JSON) and durable
//! on-device state: a cart synchronizer with confirm-then-render mutations,
//! a checkout orchestrator with COD and hosted-payment paths, a catalog
//! snapshot with retrying reads, a client-authoritative wishlist, and a
//! bearer-token session.
//!
//! # Architecture
//!
//! - The backend is the source of truth for the cart: every mutation is a
//!   single request/response cycle, and the local cache is replaced
//!   wholesale with the server's item list on success (reconciliation).
//! - Remote collaborators sit behind the [`api`] traits and are injected
//!   through constructors; [`state::Shop`] wires the production
//!   [`api::ApiClient`] together with the cache, session, and components.
//! - Mutations against the same cart are serialized through a single-flight
//!   queue; idempotent catalog reads get bounded retry with cache fallback.
//!
//! # Example
//!
//! ```rust,ignore
//! use rosewater_client::{config::ClientConfig, state::Shop};
//!
//! let shop = Shop::new(&ClientConfig::from_env()?);
//! shop.init().await;
//! shop.add_to_cart(&product_id, 2, "M").await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cache;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod retry;
pub mod session;
pub mod state;
pub mod wishlist;
