//! Command handlers for the cart.
//!
//! Each handler checks that the command targets the session it is given,
//! applies the mutation through the session (which notifies subscribers and
//! queues persistence) and reports the recorded events with the new totals.

use basket_core::command::Command;
use basket_core::error::DomainError;
use rust_decimal::Decimal;
use tracing::instrument;
use uuid::Uuid;

use crate::application::session::{CartChange, CartSession};
use crate::domain::commands::{AddItem, ClearCart, RemoveItem, UpdateQuantity};
use crate::domain::events::CartEvent;

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct CartCommandResult {
    /// The cart affected by the command.
    pub cart_id: Uuid,
    /// Events recorded by the command; empty when it was a no-op.
    pub events: Vec<CartEvent>,
    /// Total units after the command.
    pub item_count: u64,
    /// Subtotal after the command.
    pub subtotal: Decimal,
    /// Aggregate version after the command.
    pub version: i64,
}

impl CartCommandResult {
    fn new(session: &CartSession, change: CartChange) -> Self {
        Self {
            cart_id: session.cart().id,
            events: change.events,
            item_count: change.totals.item_count,
            subtotal: change.totals.subtotal,
            version: change.totals.version,
        }
    }
}

fn ensure_same_session(command: &dyn Command, session: &CartSession) -> Result<(), DomainError> {
    if command.session_key() == session.key() {
        return Ok(());
    }
    Err(DomainError::Validation(format!(
        "{} targets session {} but was routed to session {}",
        command.command_type(),
        command.session_key(),
        session.key()
    )))
}

/// Handles the `AddItem` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the command belongs to another
/// session, the item input is malformed or the totals would overflow, and
/// `DomainError::NotFound` if the session was discarded.
#[instrument(skip_all, fields(session_key = %command.session_key, correlation_id = %command.correlation_id))]
pub fn handle_add_item(
    command: &AddItem,
    session: &mut CartSession,
) -> Result<CartCommandResult, DomainError> {
    ensure_same_session(command, session)?;
    let change = session.add_item(
        command.item.clone(),
        command.quantity,
        command.correlation_id,
    )?;
    Ok(CartCommandResult::new(session, change))
}

/// Handles the `RemoveItem` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the command belongs to another
/// session, and `DomainError::NotFound` if the session was discarded.
#[instrument(skip_all, fields(session_key = %command.session_key, correlation_id = %command.correlation_id))]
pub fn handle_remove_item(
    command: &RemoveItem,
    session: &mut CartSession,
) -> Result<CartCommandResult, DomainError> {
    ensure_same_session(command, session)?;
    let change = session.remove_item(&command.variant_id, command.correlation_id)?;
    Ok(CartCommandResult::new(session, change))
}

/// Handles the `UpdateQuantity` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the command belongs to another
/// session or the new totals would overflow, and `DomainError::NotFound` if
/// the session was discarded.
#[instrument(skip_all, fields(session_key = %command.session_key, correlation_id = %command.correlation_id))]
pub fn handle_update_quantity(
    command: &UpdateQuantity,
    session: &mut CartSession,
) -> Result<CartCommandResult, DomainError> {
    ensure_same_session(command, session)?;
    let change = session.update_quantity(
        &command.variant_id,
        command.quantity,
        command.correlation_id,
    )?;
    Ok(CartCommandResult::new(session, change))
}

/// Handles the `ClearCart` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the command belongs to another
/// session, and `DomainError::NotFound` if the session was discarded.
#[instrument(skip_all, fields(session_key = %command.session_key, correlation_id = %command.correlation_id))]
pub fn handle_clear_cart(
    command: &ClearCart,
    session: &mut CartSession,
) -> Result<CartCommandResult, DomainError> {
    ensure_same_session(command, session)?;
    let change = session.clear(command.reason, command.correlation_id)?;
    Ok(CartCommandResult::new(session, change))
}
