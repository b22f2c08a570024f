//! Single-owner cart session.
//!
//! A `CartSession` owns one [`Cart`] for one session key. Mutations apply to
//! the in-memory cart synchronously and return the new totals at once; the
//! resulting snapshot is handed to a background persister task over an
//! unbounded channel. The persister writes only the newest queued snapshot,
//! so a burst of mutations costs one store write.
//!
//! Storage is best-effort. A failed save is logged and reported through
//! [`CartSession::persistence_status`] and [`CartSession::flush`]; it never
//! rolls back or blocks the in-memory cart.
//!
//! Once [`CartSession::discard`] has run, the session is closed: its
//! persister has stopped and every further mutation or reload fails with
//! `DomainError::NotFound`.

use std::sync::Arc;

use basket_core::aggregate::AggregateRoot;
use basket_core::clock::Clock;
use basket_core::error::DomainError;
use basket_core::store::{CartSnapshot, CartStore, SessionKey};
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::query_handlers::CartView;
use crate::domain::aggregates::Cart;
use crate::domain::events::{CartEvent, ClearReason};
use crate::domain::line_item::LineItemInput;

/// Outcome of the most recent persistence attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceStatus {
    /// Nothing has been written since the session opened.
    Idle,
    /// The snapshot at `version` was written.
    Saved {
        /// Aggregate version of the written snapshot.
        version: i64,
    },
    /// Writing the snapshot at `version` failed.
    Failed {
        /// Aggregate version of the snapshot that was not written.
        version: i64,
        /// Storage error message.
        message: String,
    },
}

/// Non-fatal storage problem. The in-memory cart is still authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cart {session_key} was not persisted at version {version}: {message}")]
pub struct PersistenceWarning {
    /// The affected session.
    pub session_key: SessionKey,
    /// Aggregate version that could not be read or written.
    pub version: i64,
    /// Storage error message.
    pub message: String,
}

/// Derived totals after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    /// Total units.
    pub item_count: u64,
    /// Sum of line totals.
    pub subtotal: Decimal,
    /// Aggregate version.
    pub version: i64,
}

/// What a single mutation did.
#[derive(Debug, Clone)]
pub struct CartChange {
    /// Events recorded by the mutation. Empty for a no-op.
    pub events: Vec<CartEvent>,
    /// Totals after the mutation.
    pub totals: CartTotals,
}

/// A snapshot queued for the persister, tagged with a monotonically
/// increasing ticket so `flush` can tell when it has been handled.
#[derive(Debug)]
struct PendingWrite {
    ticket: u64,
    snapshot: CartSnapshot,
}

#[derive(Debug, Clone)]
struct PersisterState {
    ticket: u64,
    status: PersistenceStatus,
}

/// The single logical owner of one session's cart.
pub struct CartSession {
    key: SessionKey,
    cart: Cart,
    clock: Arc<dyn Clock>,
    store: Arc<dyn CartStore>,
    views: watch::Sender<CartView>,
    writes: Option<mpsc::UnboundedSender<PendingWrite>>,
    persister_state: watch::Receiver<PersisterState>,
    persister: Option<JoinHandle<()>>,
    next_ticket: u64,
    restore_warning: Option<PersistenceWarning>,
}

impl std::fmt::Debug for CartSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartSession")
            .field("key", &self.key)
            .field("cart", &self.cart)
            .field("next_ticket", &self.next_ticket)
            .field("discarded", &self.is_discarded())
            .finish_non_exhaustive()
    }
}

impl CartSession {
    /// Opens the session for `key`, restoring the stored cart if there is one.
    ///
    /// A load failure or an unreadable snapshot does not fail the open: the
    /// session starts with an empty cart and the problem is available from
    /// [`restore_warning`](Self::restore_warning).
    ///
    /// Must be called from within a tokio runtime; the persister runs as a
    /// spawned task for the lifetime of the session.
    pub async fn open(key: SessionKey, store: Arc<dyn CartStore>, clock: Arc<dyn Clock>) -> Self {
        let (cart, restore_warning) = match restore(&key, store.as_ref()).await {
            Ok(Some(cart)) => (cart, None),
            Ok(None) => (Cart::new(Uuid::now_v7()), None),
            Err(err) => {
                warn!(session_key = %key, error = %err, "failed to restore cart, starting empty");
                let warning = PersistenceWarning {
                    session_key: key.clone(),
                    version: 0,
                    message: err.to_string(),
                };
                (Cart::new(Uuid::now_v7()), Some(warning))
            }
        };

        let (views, _) = watch::channel(CartView::of(&key, &cart));
        let (writes, queue) = mpsc::unbounded_channel();
        let (state_tx, persister_state) = watch::channel(PersisterState {
            ticket: 0,
            status: PersistenceStatus::Idle,
        });
        let persister = tokio::spawn(run_persister(
            key.clone(),
            Arc::clone(&store),
            queue,
            state_tx,
        ));

        Self {
            key,
            cart,
            clock,
            store,
            views,
            writes: Some(writes),
            persister_state,
            persister: Some(persister),
            next_ticket: 0,
            restore_warning,
        }
    }

    /// Returns the session key.
    #[must_use]
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Returns the in-memory cart.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Returns the problem encountered while restoring, if any.
    #[must_use]
    pub fn restore_warning(&self) -> Option<&PersistenceWarning> {
        self.restore_warning.as_ref()
    }

    /// Subscribes to cart views. The receiver sees a new view after every
    /// state-changing mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartView> {
        self.views.subscribe()
    }

    /// Returns the outcome of the most recent persistence attempt.
    #[must_use]
    pub fn persistence_status(&self) -> PersistenceStatus {
        self.persister_state.borrow().status.clone()
    }

    /// Returns `true` once [`discard`](Self::discard) has closed the session.
    #[must_use]
    pub fn is_discarded(&self) -> bool {
        self.writes.is_none()
    }

    /// Returns `true` when storage holds everything this session knows:
    /// every queued snapshot has been handled and the latest write did not
    /// fail.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        let state = self.persister_state.borrow();
        state.ticket >= self.next_ticket
            && !matches!(state.status, PersistenceStatus::Failed { .. })
    }

    /// Adds `quantity` units of a variant, merging into an existing line.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a blank variant id, a negative
    /// price or totals that would overflow, and `DomainError::NotFound` if
    /// the session was discarded. Nothing is changed in either case.
    pub fn add_item(
        &mut self,
        input: LineItemInput,
        quantity: i64,
        correlation_id: Uuid,
    ) -> Result<CartChange, DomainError> {
        self.ensure_open()?;
        self.cart
            .add_item(input, quantity, correlation_id, self.clock.as_ref())?;
        Ok(self.commit())
    }

    /// Removes a variant's line. Absent variants are a no-op.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the session was discarded.
    pub fn remove_item(
        &mut self,
        variant_id: &str,
        correlation_id: Uuid,
    ) -> Result<CartChange, DomainError> {
        self.ensure_open()?;
        self.cart
            .remove_item(variant_id, correlation_id, self.clock.as_ref());
        Ok(self.commit())
    }

    /// Sets a variant's quantity; zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the new totals would overflow,
    /// and `DomainError::NotFound` if the session was discarded.
    pub fn update_quantity(
        &mut self,
        variant_id: &str,
        quantity: i64,
        correlation_id: Uuid,
    ) -> Result<CartChange, DomainError> {
        self.ensure_open()?;
        self.cart
            .update_quantity(variant_id, quantity, correlation_id, self.clock.as_ref())?;
        Ok(self.commit())
    }

    /// Empties the cart.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the session was discarded.
    pub fn clear(
        &mut self,
        reason: ClearReason,
        correlation_id: Uuid,
    ) -> Result<CartChange, DomainError> {
        self.ensure_open()?;
        self.cart.clear(reason, correlation_id, self.clock.as_ref());
        Ok(self.commit())
    }

    /// Waits until every snapshot queued so far has been handled by the
    /// persister.
    ///
    /// # Errors
    ///
    /// Returns a `PersistenceWarning` if the latest write failed or the
    /// persister is no longer running.
    pub async fn flush(&mut self) -> Result<(), PersistenceWarning> {
        let target = self.next_ticket;
        let outcome = self
            .persister_state
            .wait_for(|state| state.ticket >= target)
            .await
            .map(|state| state.status.clone());
        match outcome {
            Ok(PersistenceStatus::Failed { version, message }) => {
                Err(self.warning(version, message))
            }
            Ok(PersistenceStatus::Idle | PersistenceStatus::Saved { .. }) => Ok(()),
            Err(_) => Err(self.warning(self.cart.version(), "persister stopped".to_owned())),
        }
    }

    /// Replaces the in-memory cart with whatever storage currently holds
    /// (last writer wins). Used when another writer may have changed the
    /// stored cart.
    ///
    /// This session's queued writes land first, so storage never ends up
    /// newer than the reloaded cart.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if storage cannot be read; the
    /// in-memory cart is kept in that case. Returns `DomainError::NotFound`
    /// if the session was discarded.
    pub async fn reload(&mut self) -> Result<CartView, DomainError> {
        self.ensure_open()?;
        if let Err(warning) = self.flush().await {
            warn!(session_key = %self.key, error = %warning, "reloading over unsaved changes");
        }
        let cart = restore(&self.key, self.store.as_ref())
            .await?
            .unwrap_or_else(|| Cart::new(self.cart.id));
        debug!(session_key = %self.key, version = cart.version(), "reloaded cart from storage");
        self.cart = cart;
        let view = CartView::of(&self.key, &self.cart);
        self.views.send_replace(view.clone());
        Ok(view)
    }

    /// Closes the session and deletes its stored snapshot.
    ///
    /// Queued writes are drained before the delete so a late save cannot
    /// resurrect the cart. Later mutations on this session are rejected.
    /// Discarding a closed session only repeats the delete.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the delete fails.
    pub async fn discard(&mut self) -> Result<(), DomainError> {
        self.writes = None;
        if let Some(persister) = self.persister.take() {
            if let Err(err) = persister.await {
                warn!(session_key = %self.key, error = %err, "cart persister ended abnormally");
            }
        }
        self.store.delete(&self.key).await
    }

    fn ensure_open(&self) -> Result<(), DomainError> {
        if self.is_discarded() {
            return Err(DomainError::NotFound(format!(
                "cart session {} was discarded",
                self.key
            )));
        }
        Ok(())
    }

    /// Publishes the mutation's effects: drains recorded events, notifies
    /// subscribers and queues a snapshot. No-op mutations publish nothing.
    fn commit(&mut self) -> CartChange {
        let events = self.cart.uncommitted_events().to_vec();
        self.cart.clear_uncommitted_events();
        let totals = CartTotals {
            item_count: self.cart.item_count(),
            subtotal: self.cart.subtotal(),
            version: self.cart.version(),
        };
        if events.is_empty() {
            return CartChange { events, totals };
        }

        self.views.send_replace(CartView::of(&self.key, &self.cart));
        self.enqueue_snapshot();

        CartChange { events, totals }
    }

    fn enqueue_snapshot(&mut self) {
        let snapshot = match self.cart.to_snapshot(self.clock.now()) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(session_key = %self.key, error = %err, "failed to snapshot cart");
                return;
            }
        };
        let Some(writes) = &self.writes else {
            return;
        };
        let write = PendingWrite {
            ticket: self.next_ticket + 1,
            snapshot,
        };
        if writes.send(write).is_err() {
            warn!(session_key = %self.key, "cart persister is not running, snapshot dropped");
            return;
        }
        self.next_ticket += 1;
    }

    fn warning(&self, version: i64, message: String) -> PersistenceWarning {
        PersistenceWarning {
            session_key: self.key.clone(),
            version,
            message,
        }
    }
}

/// Loads and restores the cart stored under `key`.
async fn restore(key: &SessionKey, store: &dyn CartStore) -> Result<Option<Cart>, DomainError> {
    match store.load(key).await? {
        Some(snapshot) => Cart::from_snapshot(&snapshot).map(Some),
        None => Ok(None),
    }
}

/// Drains queued snapshots and writes the newest one of each burst.
async fn run_persister(
    key: SessionKey,
    store: Arc<dyn CartStore>,
    mut queue: mpsc::UnboundedReceiver<PendingWrite>,
    state: watch::Sender<PersisterState>,
) {
    while let Some(mut write) = queue.recv().await {
        while let Ok(newer) = queue.try_recv() {
            write = newer;
        }
        let version = write.snapshot.version;
        let status = match store.save(&key, &write.snapshot).await {
            Ok(()) => {
                debug!(session_key = %key, version, "persisted cart snapshot");
                PersistenceStatus::Saved { version }
            }
            Err(err) => {
                warn!(session_key = %key, version, error = %err, "failed to persist cart snapshot");
                PersistenceStatus::Failed {
                    version,
                    message: err.to_string(),
                }
            }
        };
        state.send_replace(PersisterState {
            ticket: write.ticket,
            status,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use basket_core::error::DomainError;
    use basket_core::store::{CartStore, SessionKey};
    use basket_test_support::{
        EmptyCartStore, FailingCartStore, FixedClock, GatedCartStore, MemoryCartStore,
        RecordingCartStore,
    };
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::{CartSession, PersistenceStatus};
    use crate::domain::events::ClearReason;
    use crate::domain::line_item::LineItemInput;

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        ))
    }

    fn key(raw: &str) -> SessionKey {
        SessionKey::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_mutation_returns_totals_and_persists_snapshot() {
        // Arrange
        let store = Arc::new(MemoryCartStore::default());
        let mut session = CartSession::open(key("web-1"), store.clone(), clock()).await;

        // Act
        let change = session
            .add_item(LineItemInput::new("A", Decimal::TEN), 2, Uuid::new_v4())
            .unwrap();
        session.flush().await.unwrap();

        // Assert
        assert_eq!(change.events.len(), 1);
        assert_eq!(change.totals.item_count, 2);
        assert_eq!(change.totals.subtotal, Decimal::from(20));
        assert_eq!(change.totals.version, 1);
        assert_eq!(
            session.persistence_status(),
            PersistenceStatus::Saved { version: 1 }
        );

        let stored = store.load(&key("web-1")).await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.cart_id, session.cart().id);
    }

    #[tokio::test]
    async fn test_open_restores_previous_session() {
        let store = Arc::new(MemoryCartStore::default());
        let mut first = CartSession::open(key("pos-1"), store.clone(), clock()).await;
        first
            .add_item(LineItemInput::new("B", Decimal::new(1550, 2)), 1, Uuid::new_v4())
            .unwrap();
        first
            .add_item(LineItemInput::new("C", Decimal::new(425, 2)), 4, Uuid::new_v4())
            .unwrap();
        first.flush().await.unwrap();
        let cart_id = first.cart().id;
        drop(first);

        let second = CartSession::open(key("pos-1"), store, clock()).await;

        assert!(second.restore_warning().is_none());
        assert_eq!(second.cart().id, cart_id);
        assert_eq!(second.cart().item_count(), 5);
        assert_eq!(second.cart().subtotal(), Decimal::new(3250, 2));
    }

    #[tokio::test]
    async fn test_save_failure_keeps_in_memory_cart_and_reports_warning() {
        // Arrange
        let mut session =
            CartSession::open(key("web-2"), Arc::new(FailingCartStore), clock()).await;

        // Act
        let change = session
            .add_item(LineItemInput::new("A", Decimal::TEN), 3, Uuid::new_v4())
            .unwrap();
        let flushed = session.flush().await;

        // Assert
        assert_eq!(change.totals.item_count, 3);
        assert_eq!(session.cart().item_count(), 3);
        let warning = flushed.unwrap_err();
        assert_eq!(warning.session_key, key("web-2"));
        assert_eq!(warning.version, 1);
        assert!(warning.message.contains("connection refused"));
        assert!(matches!(
            session.persistence_status(),
            PersistenceStatus::Failed { version: 1, .. }
        ));
    }

    #[tokio::test]
    async fn test_open_with_failing_store_starts_empty_with_warning() {
        let session = CartSession::open(key("web-3"), Arc::new(FailingCartStore), clock()).await;

        assert!(session.cart().is_empty());
        let warning = session.restore_warning().unwrap();
        assert!(warning.message.contains("connection refused"));
        assert_eq!(session.persistence_status(), PersistenceStatus::Idle);
    }

    #[tokio::test]
    async fn test_noop_mutation_publishes_nothing() {
        let store = Arc::new(RecordingCartStore::default());
        let mut session = CartSession::open(key("web-4"), store.clone(), clock()).await;
        let mut views = session.subscribe();
        views.borrow_and_update();

        let change = session.remove_item("missing", Uuid::new_v4()).unwrap();
        let cleared = session
            .clear(ClearReason::UserRequested, Uuid::new_v4())
            .unwrap();
        session.flush().await.unwrap();

        assert!(change.events.is_empty());
        assert!(cleared.events.is_empty());
        assert!(!views.has_changed().unwrap());
        assert!(store.saved_snapshots().is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_every_change() {
        let mut session =
            CartSession::open(key("web-5"), Arc::new(EmptyCartStore), clock()).await;
        let mut views = session.subscribe();

        session
            .add_item(LineItemInput::new("A", Decimal::TEN), 5, Uuid::new_v4())
            .unwrap();
        assert!(views.has_changed().unwrap());
        assert_eq!(views.borrow_and_update().item_count, 5);

        session.update_quantity("A", 1, Uuid::new_v4()).unwrap();
        assert_eq!(views.borrow_and_update().subtotal, Decimal::TEN);

        session.update_quantity("A", 0, Uuid::new_v4()).unwrap();
        let view = views.borrow_and_update().clone();
        assert!(view.items.is_empty());
        assert_eq!(view.subtotal, Decimal::ZERO);
        assert_eq!(view.version, 3);
    }

    #[tokio::test]
    async fn test_burst_behind_busy_write_is_coalesced_into_one_save() {
        // Arrange
        let store = Arc::new(GatedCartStore::default());
        let mut session = CartSession::open(key("web-6"), store.clone(), clock()).await;
        session
            .add_item(LineItemInput::new("A", Decimal::ONE), 1, Uuid::new_v4())
            .unwrap();
        store.wait_for_first_save().await;

        // Act
        for _ in 0..9 {
            session
                .add_item(LineItemInput::new("A", Decimal::ONE), 1, Uuid::new_v4())
                .unwrap();
        }
        store.release();
        session.flush().await.unwrap();

        // Assert
        let versions: Vec<i64> = store
            .saved_snapshots()
            .iter()
            .map(|(_, snapshot)| snapshot.version)
            .collect();
        assert_eq!(versions, vec![1, 10]);
        assert!(session.is_settled());
    }

    #[tokio::test]
    async fn test_reload_adopts_stored_cart() {
        let store = Arc::new(MemoryCartStore::default());
        let mut tab_a = CartSession::open(key("shared"), store.clone(), clock()).await;
        let mut tab_b = CartSession::open(key("shared"), store.clone(), clock()).await;

        tab_b
            .add_item(LineItemInput::new("Z", Decimal::TWO), 3, Uuid::new_v4())
            .unwrap();
        tab_b.flush().await.unwrap();
        let view = tab_a.reload().await.unwrap();

        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal, Decimal::from(6));
        assert_eq!(tab_a.cart().id, tab_b.cart().id);
    }

    #[tokio::test]
    async fn test_reload_with_failing_store_keeps_cart() {
        let mut session =
            CartSession::open(key("web-7"), Arc::new(FailingCartStore), clock()).await;
        session
            .add_item(LineItemInput::new("A", Decimal::ONE), 2, Uuid::new_v4())
            .unwrap();

        let result = session.reload().await;

        assert!(result.is_err());
        assert_eq!(session.cart().item_count(), 2);
    }

    #[tokio::test]
    async fn test_discard_removes_stored_snapshot() {
        let store = Arc::new(MemoryCartStore::default());
        let mut session = CartSession::open(key("web-8"), store.clone(), clock()).await;
        session
            .add_item(LineItemInput::new("A", Decimal::ONE), 1, Uuid::new_v4())
            .unwrap();

        session.discard().await.unwrap();

        assert!(store.load(&key("web-8")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_discard_drains_writes_before_delete() {
        let store = Arc::new(RecordingCartStore::default());
        let mut session = CartSession::open(key("web-9"), store.clone(), clock()).await;
        session
            .add_item(LineItemInput::new("A", Decimal::ONE), 1, Uuid::new_v4())
            .unwrap();

        session.discard().await.unwrap();

        assert_eq!(store.saved_snapshots().len(), 1);
        assert_eq!(store.deleted_keys(), vec![key("web-9")]);
    }

    #[tokio::test]
    async fn test_open_restores_from_configured_snapshot() {
        let cart_id = Uuid::new_v4();
        let snapshot = basket_core::store::CartSnapshot {
            cart_id,
            version: 4,
            items: serde_json::json!([
                { "variant_id": "A", "product_id": "p-1", "product_name": "Mug",
                  "unit_price": "12.00", "quantity": 2, "image_url": null, "variant_name": null }
            ]),
            saved_at: Utc::now(),
        };
        let store = Arc::new(RecordingCartStore::with_snapshot(snapshot));

        let session = CartSession::open(key("pos-9"), store, clock()).await;

        assert_eq!(session.cart().id, cart_id);
        assert_eq!(session.cart().subtotal(), Decimal::from(24));
        assert_eq!(session.subscribe().borrow().version, 4);
    }

    #[tokio::test]
    async fn test_reload_right_after_mutation_keeps_the_mutation() {
        // Arrange
        let store = Arc::new(MemoryCartStore::default());
        let mut session = CartSession::open(key("web-10"), store.clone(), clock()).await;
        session
            .add_item(LineItemInput::new("A", Decimal::TEN), 2, Uuid::new_v4())
            .unwrap();

        // Act
        let view = session.reload().await.unwrap();

        // Assert
        assert_eq!(view.item_count, 2);
        assert_eq!(view.version, 1);
        let stored = store.load(&key("web-10")).await.unwrap().unwrap();
        assert_eq!(stored.version, view.version);
    }

    #[tokio::test]
    async fn test_discarded_session_rejects_mutations_and_stays_deleted() {
        // Arrange
        let store = Arc::new(MemoryCartStore::default());
        let mut session = CartSession::open(key("web-11"), store.clone(), clock()).await;
        session
            .add_item(LineItemInput::new("A", Decimal::ONE), 1, Uuid::new_v4())
            .unwrap();
        session.discard().await.unwrap();

        // Act
        let added = session.add_item(LineItemInput::new("B", Decimal::ONE), 1, Uuid::new_v4());
        let cleared = session.clear(ClearReason::UserRequested, Uuid::new_v4());
        let reloaded = session.reload().await;
        session.flush().await.unwrap();

        // Assert
        assert!(session.is_discarded());
        assert!(matches!(added, Err(DomainError::NotFound(_))));
        assert!(matches!(cleared, Err(DomainError::NotFound(_))));
        assert!(matches!(reloaded, Err(DomainError::NotFound(_))));
        assert!(store.load(&key("web-11")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_session_unsettled() {
        let mut session =
            CartSession::open(key("web-12"), Arc::new(FailingCartStore), clock()).await;
        assert!(session.is_settled());

        session
            .add_item(LineItemInput::new("A", Decimal::ONE), 1, Uuid::new_v4())
            .unwrap();
        let _ = session.flush().await;

        assert!(!session.is_settled());
    }
}
