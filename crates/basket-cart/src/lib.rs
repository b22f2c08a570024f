//! Basket — cart aggregation and pricing.
//!
//! Owns the line items of one shopping session, merges repeated additions of
//! the same variant, derives item count and subtotal on every read, and keeps
//! a snapshot of the cart in a [`CartStore`](basket_core::store::CartStore)
//! so it survives across sessions.

pub mod application;
pub mod domain;
