//! Aggregate root for the cart.

use basket_core::aggregate::AggregateRoot;
use basket_core::clock::Clock;
use basket_core::error::DomainError;
use basket_core::event::EventMetadata;
use basket_core::store::CartSnapshot;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::events::{
    CartCleared, CartEvent, CartEventKind, ClearReason, ItemAdded, ItemQuantityIncreased,
    ItemQuantitySet, ItemRemoved,
};
use super::line_item::{LineItem, LineItemInput, VariantId};

/// The aggregate root for one shopping session's cart.
///
/// Lines are unique by variant and keep insertion order. Item count and
/// subtotal are computed from the lines on every call and never cached.
#[derive(Debug, Clone)]
pub struct Cart {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (state-changing events applied).
    pub(crate) version: i64,
    /// Lines in the order they were first added.
    items: Vec<LineItem>,
    /// Events recorded since they were last drained.
    uncommitted_events: Vec<CartEvent>,
}

/// Converts a caller-supplied quantity to a line quantity of at least 1.
fn clamp_quantity(quantity: i64) -> u32 {
    u32::try_from(quantity.clamp(1, i64::from(u32::MAX))).unwrap_or(u32::MAX)
}

impl Cart {
    /// Creates a new, empty cart.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            items: Vec::new(),
            uncommitted_events: Vec::new(),
        }
    }

    /// Restores a cart from a stored snapshot.
    ///
    /// Lines with a zero quantity are dropped and duplicate variants are
    /// merged, so a hand-edited or legacy snapshot still yields a cart that
    /// upholds the one-line-per-variant rule.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the items cannot be
    /// deserialized or their totals do not fit in a `Decimal`.
    pub fn from_snapshot(snapshot: &CartSnapshot) -> Result<Self, DomainError> {
        let stored: Vec<LineItem> = serde_json::from_value(snapshot.items.clone())?;
        let mut cart = Self::new(snapshot.cart_id);
        cart.version = snapshot.version;
        for line in stored.into_iter().filter(|line| line.quantity > 0) {
            match cart.position(line.variant_id.as_str()) {
                Some(index) => {
                    let existing = &mut cart.items[index];
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => cart.items.push(line),
            }
        }
        if cart.checked_subtotal().is_none() {
            return Err(DomainError::Infrastructure(format!(
                "stored cart {} has totals that overflow",
                snapshot.cart_id
            )));
        }
        Ok(cart)
    }

    /// Captures the current lines as a storable snapshot.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the lines cannot be
    /// serialized.
    pub fn to_snapshot(&self, saved_at: DateTime<Utc>) -> Result<CartSnapshot, DomainError> {
        Ok(CartSnapshot {
            cart_id: self.id,
            version: self.version,
            items: serde_json::to_value(&self.items)?,
            saved_at,
        })
    }

    /// Returns the lines in cart order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Returns the line for `variant_id`, if present.
    #[must_use]
    pub fn line(&self, variant_id: &str) -> Option<&LineItem> {
        self.items.iter().find(|line| line.variant_id == *variant_id)
    }

    /// Returns `true` when the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of `unit_price × quantity` across all lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.checked_subtotal().unwrap_or(Decimal::MAX)
    }

    fn checked_subtotal(&self) -> Option<Decimal> {
        self.items.iter().try_fold(Decimal::ZERO, |sum, line| {
            sum.checked_add(line.checked_line_total()?)
        })
    }

    /// Rejects a change that would leave `variant_id` with `quantity` units
    /// at `unit_price` if any line total or the subtotal would overflow.
    fn ensure_totals_fit(
        &self,
        variant_id: &VariantId,
        unit_price: Decimal,
        quantity: u32,
    ) -> Result<(), DomainError> {
        let subtotal = unit_price
            .checked_mul(Decimal::from(quantity))
            .and_then(|line_total| {
                self.items
                    .iter()
                    .filter(|line| line.variant_id != *variant_id)
                    .try_fold(line_total, |sum, line| {
                        sum.checked_add(line.checked_line_total()?)
                    })
            });
        match subtotal {
            Some(_) => Ok(()),
            None => Err(DomainError::Validation(format!(
                "{quantity} units of variant {variant_id} at {unit_price} exceed the largest supported cart total"
            ))),
        }
    }

    fn position(&self, variant_id: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|line| line.variant_id == *variant_id)
    }

    /// Builds an event for `kind`, applies it, and keeps it as uncommitted.
    fn record(&mut self, kind: CartEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = CartEvent {
            metadata: EventMetadata {
                event_id: Uuid::now_v7(),
                event_type: kind.event_type().to_owned(),
                aggregate_id: self.id,
                sequence_number: self.version + 1,
                correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };
        self.apply(&event);
        self.uncommitted_events.push(event);
    }

    /// Adds `quantity` units of a variant.
    ///
    /// An existing line for the same variant absorbs the units and keeps its
    /// original price and display fields. A quantity below 1 counts as 1.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the variant id is blank, the
    /// price is negative, or the resulting quantity or totals are too large.
    /// The cart is left untouched in that case.
    pub fn add_item(
        &mut self,
        input: LineItemInput,
        quantity: i64,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let quantity = clamp_quantity(quantity);
        let item = input.into_line_item(quantity)?;

        let existing = self.line(item.variant_id.as_str());
        let (unit_price, resulting) = match existing {
            Some(line) => {
                let resulting = line.quantity.checked_add(quantity).ok_or_else(|| {
                    DomainError::Validation(format!(
                        "variant {} cannot hold more than {} units",
                        item.variant_id,
                        u32::MAX
                    ))
                })?;
                (line.unit_price, resulting)
            }
            None => (item.unit_price, quantity),
        };
        self.ensure_totals_fit(&item.variant_id, unit_price, resulting)?;

        let kind = if existing.is_some() {
            CartEventKind::ItemQuantityIncreased(ItemQuantityIncreased {
                cart_id: self.id,
                variant_id: item.variant_id,
                added: quantity,
            })
        } else {
            CartEventKind::ItemAdded(ItemAdded {
                cart_id: self.id,
                item,
            })
        };
        self.record(kind, correlation_id, clock);
        Ok(())
    }

    /// Removes the line for `variant_id`. Absent variants are a no-op.
    pub fn remove_item(&mut self, variant_id: &str, correlation_id: Uuid, clock: &dyn Clock) {
        let Some(index) = self.position(variant_id) else {
            return;
        };
        let variant_id = self.items[index].variant_id.clone();
        self.record(
            CartEventKind::ItemRemoved(ItemRemoved {
                cart_id: self.id,
                variant_id,
            }),
            correlation_id,
            clock,
        );
    }

    /// Sets the quantity of the line for `variant_id`.
    ///
    /// A quantity of zero or less removes the line. Absent variants and
    /// unchanged quantities are a no-op.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the new line total or subtotal
    /// would be too large. The cart is left untouched in that case.
    pub fn update_quantity(
        &mut self,
        variant_id: &str,
        quantity: i64,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if quantity <= 0 {
            self.remove_item(variant_id, correlation_id, clock);
            return Ok(());
        }
        let Some(index) = self.position(variant_id) else {
            return Ok(());
        };
        let quantity = clamp_quantity(quantity);
        let line = &self.items[index];
        if line.quantity == quantity {
            return Ok(());
        }
        let variant_id = line.variant_id.clone();
        self.ensure_totals_fit(&variant_id, line.unit_price, quantity)?;
        self.record(
            CartEventKind::ItemQuantitySet(ItemQuantitySet {
                cart_id: self.id,
                variant_id,
                quantity,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Removes every line. Clearing an empty cart is a no-op.
    pub fn clear(&mut self, reason: ClearReason, correlation_id: Uuid, clock: &dyn Clock) {
        if self.items.is_empty() {
            return;
        }
        self.record(
            CartEventKind::CartCleared(CartCleared {
                cart_id: self.id,
                reason,
            }),
            correlation_id,
            clock,
        );
    }
}

impl AggregateRoot for Cart {
    type Event = CartEvent;

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            CartEventKind::ItemAdded(payload) => {
                match self.position(payload.item.variant_id.as_str()) {
                    Some(index) => {
                        let line = &mut self.items[index];
                        line.quantity = line.quantity.saturating_add(payload.item.quantity);
                    }
                    None => self.items.push(payload.item.clone()),
                }
            }
            CartEventKind::ItemQuantityIncreased(payload) => {
                if let Some(index) = self.position(payload.variant_id.as_str()) {
                    let line = &mut self.items[index];
                    line.quantity = line.quantity.saturating_add(payload.added);
                }
            }
            CartEventKind::ItemQuantitySet(payload) => {
                if let Some(index) = self.position(payload.variant_id.as_str()) {
                    self.items[index].quantity = payload.quantity.max(1);
                }
            }
            CartEventKind::ItemRemoved(payload) => {
                self.items.retain(|line| line.variant_id != payload.variant_id);
            }
            CartEventKind::CartCleared(_) => self.items.clear(),
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
