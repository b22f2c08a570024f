//! Commands for the cart.

use basket_core::command::Command;
use basket_core::store::SessionKey;
use uuid::Uuid;

use super::events::ClearReason;
use super::line_item::LineItemInput;

/// Command to add units of a variant to a cart.
#[derive(Debug, Clone)]
pub struct AddItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session whose cart is targeted.
    pub session_key: SessionKey,
    /// The variant and its price snapshot.
    pub item: LineItemInput,
    /// Units to add; values below 1 count as 1.
    pub quantity: i64,
}

/// Command to remove a variant's line from a cart.
#[derive(Debug, Clone)]
pub struct RemoveItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session whose cart is targeted.
    pub session_key: SessionKey,
    /// The variant to remove.
    pub variant_id: String,
}

/// Command to set the quantity of a variant's line.
#[derive(Debug, Clone)]
pub struct UpdateQuantity {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session whose cart is targeted.
    pub session_key: SessionKey,
    /// The variant to update.
    pub variant_id: String,
    /// The new quantity; zero or less removes the line.
    pub quantity: i64,
}

/// Command to empty a cart.
#[derive(Debug, Clone)]
pub struct ClearCart {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session whose cart is targeted.
    pub session_key: SessionKey,
    /// Why the cart is being emptied.
    pub reason: ClearReason,
}

impl Command for AddItem {
    fn command_type(&self) -> &'static str {
        "cart.add_item"
    }

    fn session_key(&self) -> &SessionKey {
        &self.session_key
    }
}

impl Command for RemoveItem {
    fn command_type(&self) -> &'static str {
        "cart.remove_item"
    }

    fn session_key(&self) -> &SessionKey {
        &self.session_key
    }
}

impl Command for UpdateQuantity {
    fn command_type(&self) -> &'static str {
        "cart.update_quantity"
    }

    fn session_key(&self) -> &SessionKey {
        &self.session_key
    }
}

impl Command for ClearCart {
    fn command_type(&self) -> &'static str {
        "cart.clear"
    }

    fn session_key(&self) -> &SessionKey {
        &self.session_key
    }
}
