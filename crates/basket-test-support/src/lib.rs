//! Shared test doubles and utilities for the Basket cart engine.

mod clock;
mod store;

pub use clock::FixedClock;
pub use store::{
    EmptyCartStore, FailingCartStore, GatedCartStore, MemoryCartStore, RecordingCartStore,
    StalledLoadCartStore,
};
