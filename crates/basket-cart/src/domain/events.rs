//! Domain events for the cart.

use basket_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::line_item::{LineItem, VariantId};

/// Event type name for [`ItemAdded`].
pub const ITEM_ADDED_EVENT_TYPE: &str = "cart.item_added";
/// Event type name for [`ItemQuantityIncreased`].
pub const ITEM_QUANTITY_INCREASED_EVENT_TYPE: &str = "cart.item_quantity_increased";
/// Event type name for [`ItemQuantitySet`].
pub const ITEM_QUANTITY_SET_EVENT_TYPE: &str = "cart.item_quantity_set";
/// Event type name for [`ItemRemoved`].
pub const ITEM_REMOVED_EVENT_TYPE: &str = "cart.item_removed";
/// Event type name for [`CartCleared`].
pub const CART_CLEARED_EVENT_TYPE: &str = "cart.cleared";

/// Emitted when a variant not yet in the cart is appended as a new line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    /// The cart identifier.
    pub cart_id: Uuid,
    /// The new line, price snapshot included.
    pub item: LineItem,
}

/// Emitted when an add merges into an existing line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemQuantityIncreased {
    /// The cart identifier.
    pub cart_id: Uuid,
    /// The merged variant.
    pub variant_id: VariantId,
    /// Units added to the line.
    pub added: u32,
}

/// Emitted when a line's quantity is set to an absolute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemQuantitySet {
    /// The cart identifier.
    pub cart_id: Uuid,
    /// The updated variant.
    pub variant_id: VariantId,
    /// The new quantity (at least 1).
    pub quantity: u32,
}

/// Emitted when a line is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemoved {
    /// The cart identifier.
    pub cart_id: Uuid,
    /// The removed variant.
    pub variant_id: VariantId,
}

/// Why a cart was emptied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearReason {
    /// The shopper emptied the cart.
    UserRequested,
    /// An order was placed from the cart.
    CheckoutCompleted,
}

/// Emitted when every line is removed at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCleared {
    /// The cart identifier.
    pub cart_id: Uuid,
    /// Why the cart was emptied.
    pub reason: ClearReason,
}

/// Event payload variants for the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartEventKind {
    /// A new line was appended.
    ItemAdded(ItemAdded),
    /// An existing line absorbed another add.
    ItemQuantityIncreased(ItemQuantityIncreased),
    /// A line's quantity was overwritten.
    ItemQuantitySet(ItemQuantitySet),
    /// A line was removed.
    ItemRemoved(ItemRemoved),
    /// All lines were removed.
    CartCleared(CartCleared),
}

/// Domain event envelope for the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: CartEventKind,
}

impl CartEventKind {
    /// Returns the event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ItemAdded(_) => ITEM_ADDED_EVENT_TYPE,
            Self::ItemQuantityIncreased(_) => ITEM_QUANTITY_INCREASED_EVENT_TYPE,
            Self::ItemQuantitySet(_) => ITEM_QUANTITY_SET_EVENT_TYPE,
            Self::ItemRemoved(_) => ITEM_REMOVED_EVENT_TYPE,
            Self::CartCleared(_) => CART_CLEARED_EVENT_TYPE,
        }
    }
}

impl DomainEvent for CartEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
