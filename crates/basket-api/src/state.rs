//! Shared application state.

use std::sync::Arc;

use basket_core::clock::Clock;
use basket_core::store::CartStore;

use crate::sessions::CartSessions;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Open cart sessions, keyed by session key.
    pub sessions: Arc<CartSessions>,
}

impl AppState {
    /// Create new application state backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn CartStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Arc::new(CartSessions::new(store, clock)),
        }
    }

    /// Create application state that keeps about `max_open_carts` sessions
    /// in memory.
    #[must_use]
    pub fn with_capacity(
        store: Arc<dyn CartStore>,
        clock: Arc<dyn Clock>,
        max_open_carts: usize,
    ) -> Self {
        Self {
            sessions: Arc::new(CartSessions::with_capacity(store, clock, max_open_carts)),
        }
    }
}
