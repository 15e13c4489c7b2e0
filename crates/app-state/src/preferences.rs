//! Preference store with change notification
//!
//! [`PreferenceStore`] owns the current [`Preferences`], persists every
//! mutation through a [`KeyValueBackend`], and calls subscribed listeners
//! synchronously, in registration order, after each committed change.
//! Listeners see changes in commit order even when several threads update
//! the store. A listener may read the store but must not call
//! [`update`](PreferenceStore::update) or [`reset`](PreferenceStore::reset)
//! from inside the callback.

use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use storage::{KeyValueBackend, KvError, Preferences, PreferencesUpdate, PREFERENCES_KEY};
use thiserror::Error;

/// Preference store errors
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// Backend read/write failed
    #[error("Storage error: {0}")]
    Storage(#[from] KvError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for preference operations
pub type Result<T> = std::result::Result<T, PreferenceError>;

type Listener = Arc<dyn Fn(&Preferences) + Send + Sync>;

struct Inner {
    storage: Arc<dyn KeyValueBackend>,
    current: RwLock<Preferences>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
    // Held from read-merge through notification
    write_lock: Mutex<()>,
}

/// Persisted, observable user preferences
///
/// Cloning is cheap; clones share state and listeners.
///
/// # Examples
/// ```
/// use app_state::preferences::PreferenceStore;
/// use storage::{MemoryStore, PreferencesUpdate};
///
/// let store = PreferenceStore::new(MemoryStore::new());
/// store.load();
///
/// let _subscription = store.subscribe(|prefs| println!("country is now {}", prefs.country));
/// let prefs = store.update(PreferencesUpdate::new().country("us")).unwrap();
/// assert_eq!(prefs.country, "us");
/// ```
#[derive(Clone)]
pub struct PreferenceStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("current", &*self.inner.current.read())
            .field("listeners", &self.inner.listeners.lock().len())
            .finish()
    }
}

impl PreferenceStore {
    /// Create a store over a backend. Holds defaults until [`load`](Self::load).
    pub fn new(storage: impl KeyValueBackend + 'static) -> Self {
        Self::with_backend(Arc::new(storage))
    }

    /// Create a store over a shared backend
    pub fn with_backend(storage: Arc<dyn KeyValueBackend>) -> Self {
        Self {
            inner: Arc::new(Inner {
                storage,
                current: RwLock::new(Preferences::default()),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(1),
                write_lock: Mutex::new(()),
            }),
        }
    }

    /// Load persisted preferences, falling back to defaults.
    ///
    /// Absent, unreadable, or malformed data yields defaults and is left
    /// untouched. A stored document without a usable country is backfilled
    /// and written back. Listeners are notified if the value changed.
    pub fn load(&self) -> Preferences {
        let guard = self.inner.write_lock.lock();

        let loaded = match self.inner.storage.read(PREFERENCES_KEY) {
            Ok(Some(text)) => match Preferences::from_json(&text) {
                Some(mut prefs) => {
                    let backfilled = prefs.backfill_country();
                    prefs.normalize();
                    if backfilled {
                        tracing::info!(country = %prefs.country, "Backfilled missing country");
                        if let Err(e) = self.persist(&prefs) {
                            tracing::warn!("Failed to write backfilled preferences: {}", e);
                        }
                    }
                    prefs
                }
                None => Preferences::default(),
            },
            Ok(None) => Preferences::default(),
            Err(e) => {
                tracing::warn!("Failed to read stored preferences: {}", e);
                Preferences::default()
            }
        };

        let changed = {
            let mut current = self.inner.current.write();
            let changed = *current != loaded;
            *current = loaded.clone();
            changed
        };

        if changed {
            self.notify(&loaded);
        }
        drop(guard);
        loaded
    }

    /// Get the current preferences
    pub fn current(&self) -> Preferences {
        self.inner.current.read().clone()
    }

    /// Merge a partial update, persist it, then commit and notify.
    ///
    /// On a persistence failure the current value is unchanged and no
    /// listener is called.
    pub fn update(&self, update: PreferencesUpdate) -> Result<Preferences> {
        let guard = self.inner.write_lock.lock();

        let next = self.current().merged(update);
        self.persist(&next)?;
        *self.inner.current.write() = next.clone();

        tracing::debug!(country = %next.country, categories = next.categories.len(), "Preferences updated");
        self.notify(&next);
        drop(guard);
        Ok(next)
    }

    /// Remove the stored document and restore defaults
    pub fn reset(&self) -> Result<Preferences> {
        let guard = self.inner.write_lock.lock();

        self.inner.storage.remove(PREFERENCES_KEY)?;
        let defaults = Preferences::default();
        *self.inner.current.write() = defaults.clone();

        tracing::debug!("Preferences reset to defaults");
        self.notify(&defaults);
        drop(guard);
        Ok(defaults)
    }

    /// Register a listener called with the new value after every change.
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// unsubscribed or dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Preferences) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));

        Subscription { id, store: Arc::downgrade(&self.inner) }
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    fn persist(&self, prefs: &Preferences) -> Result<()> {
        let text = prefs.to_json()?;
        self.inner.storage.write(PREFERENCES_KEY, &text)?;
        Ok(())
    }

    /// Caller holds `write_lock`
    fn notify(&self, prefs: &Preferences) {
        // Snapshot so listeners may subscribe or read the store re-entrantly
        let listeners: Vec<Listener> =
            self.inner.listeners.lock().iter().map(|(_, l)| l.clone()).collect();

        for listener in listeners {
            listener(prefs);
        }
    }
}

/// Handle keeping a preference listener registered
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    id: u64,
    store: Weak<Inner>,
}

impl Subscription {
    /// Remove the listener
    pub fn unsubscribe(self) {
        // Drop does the work
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner.listeners.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
