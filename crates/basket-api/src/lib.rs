//! Basket API — HTTP surface for the cart engine.
//!
//! Exposes each session's cart as a small set of command endpoints plus a
//! read endpoint. Sessions are held in memory by [`sessions::CartSessions`]
//! and persisted through whatever [`CartStore`](basket_core::store::CartStore)
//! the binary wires in.

pub mod config;
pub mod error;
pub mod routes;
pub mod sessions;
pub mod state;
