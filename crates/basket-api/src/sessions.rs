//! Registry of open cart sessions.
//!
//! Each session key maps to one `CartSession` behind a `tokio::sync::Mutex`,
//! so requests for the same cart are applied one at a time while different
//! carts proceed independently. Sessions are restored outside the registry
//! lock, so a slow load only delays requests for that one key.
//!
//! The registry holds at most `capacity` sessions when it can. Opening a new
//! key past that bound evicts the least recently used session that nobody
//! holds and whose snapshots are all stored; it is restored from storage
//! the next time it is asked for.

use std::collections::HashMap;
use std::sync::Arc;

use basket_cart::application::session::CartSession;
use basket_core::clock::Clock;
use basket_core::error::DomainError;
use basket_core::store::{CartStore, SessionKey};
use tokio::sync::{Mutex, OnceCell, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::config::DEFAULT_MAX_OPEN_CARTS;

/// A shared handle to one open session.
pub type SharedSession = Arc<Mutex<CartSession>>;

/// Exclusive access to one open session.
pub type SessionGuard = OwnedMutexGuard<CartSession>;

struct Slot {
    session: Arc<OnceCell<SharedSession>>,
    last_used: u64,
}

impl Slot {
    /// A slot can go when only the registry refers to it and its session,
    /// if restored, is unlocked with nothing left to write.
    fn is_evictable(&self) -> bool {
        if Arc::strong_count(&self.session) > 1 {
            return false;
        }
        match self.session.get() {
            None => true,
            Some(session) => {
                Arc::strong_count(session) == 1
                    && session.try_lock().is_ok_and(|session| session.is_settled())
            }
        }
    }
}

#[derive(Default)]
struct Registry {
    slots: HashMap<SessionKey, Slot>,
    tick: u64,
}

impl Registry {
    fn evict_beyond(&mut self, capacity: usize, keep: &SessionKey) {
        while self.slots.len() > capacity {
            let oldest = self
                .slots
                .iter()
                .filter(|(key, slot)| *key != keep && slot.is_evictable())
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(key, _)| key.clone());
            let Some(key) = oldest else {
                warn!(
                    open_sessions = self.slots.len(),
                    capacity, "cart session registry is over capacity with every session in use"
                );
                return;
            };
            self.slots.remove(&key);
            debug!(session_key = %key, "evicted idle cart session");
        }
    }
}

/// Open sessions plus the store and clock new sessions are built with.
pub struct CartSessions {
    store: Arc<dyn CartStore>,
    clock: Arc<dyn Clock>,
    capacity: usize,
    registry: Mutex<Registry>,
}

impl CartSessions {
    /// Creates an empty registry with the default capacity.
    #[must_use]
    pub fn new(store: Arc<dyn CartStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_capacity(store, clock, DEFAULT_MAX_OPEN_CARTS)
    }

    /// Creates an empty registry that keeps about `capacity` sessions open.
    #[must_use]
    pub fn with_capacity(
        store: Arc<dyn CartStore>,
        clock: Arc<dyn Clock>,
        capacity: usize,
    ) -> Self {
        Self {
            store,
            clock,
            capacity: capacity.max(1),
            registry: Mutex::new(Registry::default()),
        }
    }

    /// Returns the open session for `key`, restoring it from storage on
    /// first use.
    ///
    /// The returned handle may outlive a [`discard`](Self::discard) of the
    /// same key, after which its mutations fail. Request handlers should
    /// use [`lock`](Self::lock).
    pub async fn get_or_open(&self, key: &SessionKey) -> SharedSession {
        let cell = {
            let mut registry = self.registry.lock().await;
            registry.tick += 1;
            let now = registry.tick;
            let inserted = !registry.slots.contains_key(key);
            let slot = registry.slots.entry(key.clone()).or_insert_with(|| Slot {
                session: Arc::new(OnceCell::new()),
                last_used: now,
            });
            slot.last_used = now;
            let cell = Arc::clone(&slot.session);
            if inserted {
                registry.evict_beyond(self.capacity, key);
            }
            cell
        };
        let session = cell
            .get_or_init(|| async {
                let session = CartSession::open(
                    key.clone(),
                    Arc::clone(&self.store),
                    Arc::clone(&self.clock),
                )
                .await;
                info!(
                    session_key = %key,
                    item_count = session.cart().item_count(),
                    "opened cart session"
                );
                Arc::new(Mutex::new(session))
            })
            .await;
        Arc::clone(session)
    }

    /// Locks the live session for `key`, opening a fresh one if the session
    /// found was discarded while this request waited for it.
    pub async fn lock(&self, key: &SessionKey) -> SessionGuard {
        self.acquire(key).await.1
    }

    /// Closes the session for `key` and deletes its stored cart.
    ///
    /// Queued writes are drained before the delete. Handles to the old
    /// session reject further mutations, and the next request for `key`
    /// starts an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the stored cart cannot be
    /// deleted.
    pub async fn discard(&self, key: &SessionKey) -> Result<(), DomainError> {
        let (shared, mut session) = self.acquire(key).await;
        let result = session.discard().await;
        drop(session);
        self.forget(key, &shared).await;
        result
    }

    /// Returns the number of open sessions.
    pub async fn len(&self) -> usize {
        self.registry.lock().await.slots.len()
    }

    /// Returns `true` when no session is open.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn acquire(&self, key: &SessionKey) -> (SharedSession, SessionGuard) {
        loop {
            let shared = self.get_or_open(key).await;
            let session = Arc::clone(&shared).lock_owned().await;
            if !session.is_discarded() {
                return (shared, session);
            }
            drop(session);
            self.forget(key, &shared).await;
        }
    }

    /// Drops the slot for `key` if it still holds `session`.
    async fn forget(&self, key: &SessionKey, session: &SharedSession) {
        let mut registry = self.registry.lock().await;
        let holds_session = registry
            .slots
            .get(key)
            .and_then(|slot| slot.session.get())
            .is_some_and(|current| Arc::ptr_eq(current, session));
        if holds_session {
            registry.slots.remove(key);
        }
    }
}
