//! Query handlers for the cart.
//!
//! Read-only views handed to presentation code. Totals are derived from the
//! aggregate at the moment the view is built.

use basket_core::aggregate::AggregateRoot;
use basket_core::store::SessionKey;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::application::session::CartSession;
use crate::domain::aggregates::Cart;
use crate::domain::line_item::LineItem;

/// One line of a [`CartView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineView {
    /// The variant identifier.
    pub variant_id: String,
    /// Owning product, if known.
    pub product_id: Option<String>,
    /// Product name, if known.
    pub product_name: Option<String>,
    /// Variant label, if known.
    pub variant_name: Option<String>,
    /// Product image, if known.
    pub image_url: Option<String>,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Units in the cart.
    pub quantity: u32,
    /// `unit_price × quantity`.
    pub line_total: Decimal,
}

impl From<&LineItem> for CartLineView {
    fn from(line: &LineItem) -> Self {
        Self {
            variant_id: line.variant_id.as_str().to_owned(),
            product_id: line.product_id.clone(),
            product_name: line.product_name.clone(),
            variant_name: line.variant_name.clone(),
            image_url: line.image_url.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            line_total: line.line_total(),
        }
    }
}

/// Read-only view of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    /// The cart identifier.
    pub cart_id: Uuid,
    /// The session the cart belongs to.
    pub session_key: SessionKey,
    /// Lines in cart order.
    pub items: Vec<CartLineView>,
    /// Total units.
    pub item_count: u64,
    /// Sum of line totals.
    pub subtotal: Decimal,
    /// Aggregate version.
    pub version: i64,
}

impl CartView {
    /// Builds a view of `cart` for `session_key`.
    #[must_use]
    pub fn of(session_key: &SessionKey, cart: &Cart) -> Self {
        Self {
            cart_id: cart.id,
            session_key: session_key.clone(),
            items: cart.items().iter().map(CartLineView::from).collect(),
            item_count: cart.item_count(),
            subtotal: cart.subtotal(),
            version: cart.version(),
        }
    }
}

/// Returns the current view of the session's cart.
#[must_use]
pub fn get_cart(session: &CartSession) -> CartView {
    CartView::of(session.key(), session.cart())
}
