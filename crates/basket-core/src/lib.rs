//! Basket Core — shared domain abstractions.
//!
//! This crate defines the traits and types the cart engine, its storage
//! backends and the HTTP layer agree on. It contains no infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod store;
