//! Route modules.

use axum::Router;

use crate::state::AppState;

pub mod carts;
pub mod health;

/// Returns the full application router: health check plus the cart API.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/carts", carts::router())
}
