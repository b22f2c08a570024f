//! Routes for shopping carts.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use basket_cart::application::command_handlers::{self, CartCommandResult};
use basket_cart::application::query_handlers::{self, CartView};
use basket_cart::application::session::{CartSession, PersistenceStatus};
use basket_cart::domain::commands;
use basket_cart::domain::events::ClearReason;
use basket_cart::domain::line_item::LineItemInput;
use basket_core::error::DomainError;
use basket_core::store::SessionKey;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

fn default_quantity() -> i64 {
    1
}

/// Request body for POST /{session_key}/add-item.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    /// The variant, its price and display fields.
    #[serde(flatten)]
    pub item: LineItemInput,
    /// Units to add (default 1).
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

/// Request body for POST /{session_key}/remove-item.
#[derive(Debug, Deserialize)]
pub struct RemoveItemRequest {
    /// The variant to remove.
    pub variant_id: String,
}

/// Request body for POST /{session_key}/update-quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    /// The variant to update.
    pub variant_id: String,
    /// The new quantity; zero or less removes the line.
    pub quantity: i64,
}

/// Optional request body for POST /{session_key}/clear.
#[derive(Debug, Deserialize)]
pub struct ClearRequest {
    /// Why the cart is emptied (default `user_requested`).
    #[serde(default)]
    pub reason: Option<ClearReason>,
}

/// Response body returned after a command is handled.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// The cart the command applied to.
    pub cart_id: Uuid,
    /// IDs of the domain events the command recorded.
    pub event_ids: Vec<Uuid>,
    /// Total units after the command.
    pub item_count: u64,
    /// Subtotal after the command.
    pub subtotal: Decimal,
    /// Aggregate version after the command.
    pub version: i64,
    /// Most recent storage problem for this cart, if any. The cart itself is
    /// unaffected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_warning: Option<String>,
}

impl CommandResponse {
    fn new(result: CartCommandResult, session: &CartSession) -> Self {
        Self {
            cart_id: result.cart_id,
            event_ids: result.events.iter().map(|e| e.metadata.event_id).collect(),
            item_count: result.item_count,
            subtotal: result.subtotal,
            version: result.version,
            persistence_warning: persistence_warning(session),
        }
    }
}

fn persistence_warning(session: &CartSession) -> Option<String> {
    match session.persistence_status() {
        PersistenceStatus::Failed { message, .. } => Some(message),
        PersistenceStatus::Idle => session.restore_warning().map(ToString::to_string),
        PersistenceStatus::Saved { .. } => None,
    }
}

/// Looks up (or opens) the session and runs `handle` against it.
async fn run_command<F>(
    state: &AppState,
    session_key: &SessionKey,
    handle: F,
) -> Result<Json<CommandResponse>, ApiError>
where
    F: FnOnce(&mut CartSession) -> Result<CartCommandResult, DomainError>,
{
    let mut session = state.sessions.lock(session_key).await;
    let result = handle(&mut *session)?;
    Ok(Json(CommandResponse::new(result, &session)))
}

/// GET /{session_key}
#[instrument(skip_all, fields(session_key = %raw_key))]
async fn get_cart(
    State(state): State<AppState>,
    Path(raw_key): Path<String>,
) -> Result<Json<CartView>, ApiError> {
    let session_key = SessionKey::parse(raw_key)?;
    let session = state.sessions.lock(&session_key).await;
    Ok(Json(query_handlers::get_cart(&session)))
}

/// POST /{session_key}/add-item
#[instrument(skip_all, fields(session_key = %raw_key))]
async fn add_item(
    State(state): State<AppState>,
    Path(raw_key): Path<String>,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::AddItem {
        correlation_id: Uuid::new_v4(),
        session_key: SessionKey::parse(raw_key)?,
        item: request.item,
        quantity: request.quantity,
    };

    info!(correlation_id = %command.correlation_id, "handling add_item command");

    run_command(&state, &command.session_key, |session| {
        command_handlers::handle_add_item(&command, session)
    })
    .await
}

/// POST /{session_key}/remove-item
#[instrument(skip_all, fields(session_key = %raw_key))]
async fn remove_item(
    State(state): State<AppState>,
    Path(raw_key): Path<String>,
    Json(request): Json<RemoveItemRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::RemoveItem {
        correlation_id: Uuid::new_v4(),
        session_key: SessionKey::parse(raw_key)?,
        variant_id: request.variant_id,
    };

    info!(correlation_id = %command.correlation_id, "handling remove_item command");

    run_command(&state, &command.session_key, |session| {
        command_handlers::handle_remove_item(&command, session)
    })
    .await
}

/// POST /{session_key}/update-quantity
#[instrument(skip_all, fields(session_key = %raw_key))]
async fn update_quantity(
    State(state): State<AppState>,
    Path(raw_key): Path<String>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::UpdateQuantity {
        correlation_id: Uuid::new_v4(),
        session_key: SessionKey::parse(raw_key)?,
        variant_id: request.variant_id,
        quantity: request.quantity,
    };

    info!(correlation_id = %command.correlation_id, "handling update_quantity command");

    run_command(&state, &command.session_key, |session| {
        command_handlers::handle_update_quantity(&command, session)
    })
    .await
}

/// POST /{session_key}/clear
#[instrument(skip_all, fields(session_key = %raw_key))]
async fn clear(
    State(state): State<AppState>,
    Path(raw_key): Path<String>,
    request: Option<Json<ClearRequest>>,
) -> Result<Json<CommandResponse>, ApiError> {
    let reason = request
        .and_then(|Json(request)| request.reason)
        .unwrap_or(ClearReason::UserRequested);
    let command = commands::ClearCart {
        correlation_id: Uuid::new_v4(),
        session_key: SessionKey::parse(raw_key)?,
        reason,
    };

    info!(
        correlation_id = %command.correlation_id,
        reason = ?command.reason,
        "handling clear_cart command"
    );

    run_command(&state, &command.session_key, |session| {
        command_handlers::handle_clear_cart(&command, session)
    })
    .await
}

/// DELETE /{session_key}
#[instrument(skip_all, fields(session_key = %raw_key))]
async fn discard(
    State(state): State<AppState>,
    Path(raw_key): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session_key = SessionKey::parse(raw_key)?;
    state.sessions.discard(&session_key).await?;
    info!("discarded cart session");
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for carts.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{session_key}", get(get_cart).delete(discard))
        .route("/{session_key}/add-item", post(add_item))
        .route("/{session_key}/remove-item", post(remove_item))
        .route("/{session_key}/update-quantity", post(update_quantity))
        .route("/{session_key}/clear", post(clear))
}
