//! Basket API server entry point.

use std::sync::Arc;

use basket_api::config::Config;
use basket_api::error::AppError;
use basket_api::routes;
use basket_api::state::AppState;
use basket_core::clock::SystemClock;
use basket_store::pg_cart_store::PgCartStore;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Basket API server");

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    let store = PgCartStore::new(pool);
    store.run_migrations().await?;

    let app_state = AppState::with_capacity(
        Arc::new(store),
        Arc::new(SystemClock),
        config.max_open_carts,
    );

    // TODO: Replace CorsLayer::permissive() with the storefront and POS origins.
    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app).await?;

    Ok(())
}
