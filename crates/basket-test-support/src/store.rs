//! Test stores — `CartStore` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use basket_core::error::DomainError;
use basket_core::store::{CartSnapshot, CartStore, SessionKey};
use tokio::sync::Notify;

/// An in-memory store that behaves like a real key-value backend.
#[derive(Debug, Default)]
pub struct MemoryCartStore {
    snapshots: Mutex<HashMap<SessionKey, CartSnapshot>>,
}

impl MemoryCartStore {
    /// Returns the number of stored carts.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn len(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    /// Returns `true` when nothing is stored.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn load(&self, key: &SessionKey) -> Result<Option<CartSnapshot>, DomainError> {
        Ok(self.snapshots.lock().unwrap().get(key).cloned())
    }

    async fn save(&self, key: &SessionKey, snapshot: &CartSnapshot) -> Result<(), DomainError> {
        self.snapshots
            .lock()
            .unwrap()
            .insert(key.clone(), snapshot.clone());
        Ok(())
    }

    async fn delete(&self, key: &SessionKey) -> Result<(), DomainError> {
        self.snapshots.lock().unwrap().remove(key);
        Ok(())
    }
}

/// A store that records every `save` and `delete` call. Loads return the
/// snapshot configured with [`RecordingCartStore::with_snapshot`], or nothing.
#[derive(Debug, Default)]
pub struct RecordingCartStore {
    load_result: Mutex<Option<CartSnapshot>>,
    saved: Mutex<Vec<(SessionKey, CartSnapshot)>>,
    deleted: Mutex<Vec<SessionKey>>,
}

impl RecordingCartStore {
    /// Create a recording store whose `load` returns `snapshot` for any key.
    #[must_use]
    pub fn with_snapshot(snapshot: CartSnapshot) -> Self {
        Self {
            load_result: Mutex::new(Some(snapshot)),
            ..Self::default()
        }
    }

    /// Returns every snapshot passed to `save`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn saved_snapshots(&self) -> Vec<(SessionKey, CartSnapshot)> {
        self.saved.lock().unwrap().clone()
    }

    /// Returns every key passed to `delete`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn deleted_keys(&self) -> Vec<SessionKey> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl CartStore for RecordingCartStore {
    async fn load(&self, _key: &SessionKey) -> Result<Option<CartSnapshot>, DomainError> {
        Ok(self.load_result.lock().unwrap().clone())
    }

    async fn save(&self, key: &SessionKey, snapshot: &CartSnapshot) -> Result<(), DomainError> {
        self.saved
            .lock()
            .unwrap()
            .push((key.clone(), snapshot.clone()));
        Ok(())
    }

    async fn delete(&self, key: &SessionKey) -> Result<(), DomainError> {
        self.deleted.lock().unwrap().push(key.clone());
        Ok(())
    }
}

/// A store that holds nothing and silently accepts writes. Useful when a
/// test only cares about in-memory behavior.
#[derive(Debug)]
pub struct EmptyCartStore;

#[async_trait]
impl CartStore for EmptyCartStore {
    async fn load(&self, _key: &SessionKey) -> Result<Option<CartSnapshot>, DomainError> {
        Ok(None)
    }

    async fn save(&self, _key: &SessionKey, _snapshot: &CartSnapshot) -> Result<(), DomainError> {
        Ok(())
    }

    async fn delete(&self, _key: &SessionKey) -> Result<(), DomainError> {
        Ok(())
    }
}

/// A store that always returns an infrastructure error. Useful for testing
/// that storage failures stay non-fatal.
#[derive(Debug)]
pub struct FailingCartStore;

#[async_trait]
impl CartStore for FailingCartStore {
    async fn load(&self, _key: &SessionKey) -> Result<Option<CartSnapshot>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn save(&self, _key: &SessionKey, _snapshot: &CartSnapshot) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn delete(&self, _key: &SessionKey) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

/// A recording store whose first `save` blocks until [`release`] is called.
/// Lets a test queue writes while the persister is known to be busy.
///
/// [`release`]: GatedCartStore::release
#[derive(Debug, Default)]
pub struct GatedCartStore {
    recording: RecordingCartStore,
    first_save_taken: AtomicBool,
    first_save_started: Notify,
    first_save_released: Notify,
}

impl GatedCartStore {
    /// Waits until the first `save` call has started and is blocked.
    pub async fn wait_for_first_save(&self) {
        self.first_save_started.notified().await;
    }

    /// Lets the blocked first `save` complete.
    pub fn release(&self) {
        self.first_save_released.notify_one();
    }

    /// Returns every completed save, in call order.
    pub fn saved_snapshots(&self) -> Vec<(SessionKey, CartSnapshot)> {
        self.recording.saved_snapshots()
    }
}

#[async_trait]
impl CartStore for GatedCartStore {
    async fn load(&self, key: &SessionKey) -> Result<Option<CartSnapshot>, DomainError> {
        self.recording.load(key).await
    }

    async fn save(&self, key: &SessionKey, snapshot: &CartSnapshot) -> Result<(), DomainError> {
        if !self.first_save_taken.swap(true, Ordering::SeqCst) {
            self.first_save_started.notify_one();
            self.first_save_released.notified().await;
        }
        self.recording.save(key, snapshot).await
    }

    async fn delete(&self, key: &SessionKey) -> Result<(), DomainError> {
        self.recording.delete(key).await
    }
}

/// An in-memory store whose `load` never completes for one key. Other keys
/// behave like [`MemoryCartStore`].
#[derive(Debug)]
pub struct StalledLoadCartStore {
    stalled: SessionKey,
    inner: MemoryCartStore,
}

impl StalledLoadCartStore {
    /// Create a store that stalls loads of `stalled`.
    #[must_use]
    pub fn new(stalled: SessionKey) -> Self {
        Self {
            stalled,
            inner: MemoryCartStore::default(),
        }
    }
}

#[async_trait]
impl CartStore for StalledLoadCartStore {
    async fn load(&self, key: &SessionKey) -> Result<Option<CartSnapshot>, DomainError> {
        if *key == self.stalled {
            std::future::pending::<()>().await;
        }
        self.inner.load(key).await
    }

    async fn save(&self, key: &SessionKey, snapshot: &CartSnapshot) -> Result<(), DomainError> {
        self.inner.save(key, snapshot).await
    }

    async fn delete(&self, key: &SessionKey) -> Result<(), DomainError> {
        self.inner.delete(key).await
    }
}
