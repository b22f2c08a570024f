//! PostgreSQL-backed storage for cart snapshots.

pub mod pg_cart_store;
