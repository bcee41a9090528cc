//! # Cart store
//!
//! Owns the cart for a session and mirrors it to a [`KeyValueStore`].
//!
//! ## Mutation and persistence
//! ```text
//!   add_to_cart / increment / decrement / clear
//!        │  synchronous, visible immediately, bumps the revision
//!        ▼
//!   committed { cart, revision }  ◄──── latest state, shared lock
//!        │
//!   persist()  ── async, one writer at a time ──►  storage.set(key, json)
//!        │
//!        └─ writes whatever is committed when it gets the writer lock,
//!           skips if that revision is already on disk
//! ```
//!
//! Issuing several mutations back to back and awaiting their `persist()`
//! futures in any order always leaves the latest cart in storage.
//!
//! Reads take the same writer lock and report the revision on disk, so a
//! fetched cart is only applied while memory holds nothing newer.

use crate::{Cart, CartError, CartItem, CartTotals, Change, NewCartItem, codec};
use iced_kv_store::KeyValueStore;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Outcome of a successful [`CartStore::persist`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persisted {
    /// The cart at `revision` was written
    Written { revision: u64 },
    /// Storage already held `revision`, nothing was written
    UpToDate { revision: u64 },
}

/// Persisted cart as read by [`CartStore::fetch`]
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    /// Decoded lines, `None` when nothing usable was stored
    pub items: Option<Vec<CartItem>>,
    /// Revision storage held when it was read
    pub revision: u64,
}

#[derive(Debug, Default)]
struct Committed {
    cart: Cart,
    revision: u64,
}

/// Session cart backed by key-value storage
///
/// Clones share the same cart, so a clone can be moved into a persistence
/// task while the original keeps serving the UI.
pub struct CartStore<S> {
    storage: Arc<S>,
    key: Arc<str>,
    committed: Arc<Mutex<Committed>>,
    /// Last revision known to be in storage. Holding the lock makes a writer
    /// exclusive.
    written: Arc<tokio::sync::Mutex<u64>>,
}

impl<S> Clone for CartStore<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            key: Arc::clone(&self.key),
            committed: Arc::clone(&self.committed),
            written: Arc::clone(&self.written),
        }
    }
}

impl<S> std::fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let committed = self.committed.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("revision", &committed.revision)
            .field("items", &committed.cart.len())
            .finish()
    }
}

impl<S: KeyValueStore> CartStore<S> {
    /// Empty cart persisted under `key`
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self::with_shared(Arc::new(storage), key)
    }

    /// Like [`CartStore::new`] for storage that is already shared
    pub fn with_shared(storage: Arc<S>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: Arc::from(key.into()),
            committed: Arc::default(),
            written: Arc::default(),
        }
    }

    /// Create the store and load the persisted cart
    pub async fn open(storage: S, key: impl Into<String>) -> Self {
        let store = Self::new(storage, key);
        store.load().await;
        store
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn committed(&self) -> MutexGuard<'_, Committed> {
        self.committed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with read access to the cart
    pub fn with_cart<R>(&self, f: impl FnOnce(&Cart) -> R) -> R {
        f(&self.committed().cart)
    }

    /// Snapshot of the cart lines
    pub fn items(&self) -> Vec<CartItem> {
        self.with_cart(|cart| cart.items().to_vec())
    }

    pub fn totals(&self) -> CartTotals {
        self.with_cart(Cart::totals)
    }

    /// Number of changing mutations applied since the store was created
    pub fn revision(&self) -> u64 {
        self.committed().revision
    }

    fn mutate(&self, f: impl FnOnce(&mut Cart) -> Change) -> Change {
        let mut committed = self.committed();
        let change = f(&mut committed.cart);
        if change.is_change() {
            committed.revision += 1;
        }
        change
    }

    /// Add a product, or bump its quantity if it is already in the cart
    pub fn add_to_cart(&self, item: NewCartItem) -> Change {
        self.mutate(|cart| cart.add(item))
    }

    pub fn increment(&self, id: &str) -> Change {
        self.mutate(|cart| cart.increment(id))
    }

    /// Remove one unit of `id`; the line disappears when it reaches zero
    pub fn decrement(&self, id: &str) -> Change {
        self.mutate(|cart| cart.decrement(id))
    }

    pub fn clear(&self) -> Change {
        self.mutate(Cart::clear)
    }

    /// Replace the cart with lines read from storage
    ///
    /// Does not bump the revision: the lines came from storage, so there is
    /// nothing new to write back.
    pub fn replace(&self, items: Vec<CartItem>) -> Change {
        self.committed().cart.replace(items)
    }

    /// Read and decode the persisted cart without touching the in-memory one
    ///
    /// The read waits for any write in flight, so the result is tagged with
    /// the revision storage held at that moment. `items` is `None` when
    /// nothing usable is stored: the key is absent, storage could not be
    /// read, or the payload is malformed. The last two are logged.
    pub fn fetch(&self) -> impl Future<Output = Fetched> + Send + 'static {
        let storage = Arc::clone(&self.storage);
        let key = Arc::clone(&self.key);
        let written = Arc::clone(&self.written);

        async move {
            let written = written.lock().await;
            let items = match storage.get(&key).await {
                Ok(Some(payload)) => match codec::decode(&payload) {
                    Ok(items) => Some(items),
                    Err(error) => {
                        warn!(key = %key, %error, "ignoring malformed persisted cart");
                        None
                    }
                },
                Ok(None) => {
                    debug!(key = %key, "no persisted cart");
                    None
                }
                Err(error) => {
                    warn!(key = %key, %error, "could not read persisted cart");
                    None
                }
            };

            Fetched {
                items,
                revision: *written,
            }
        }
    }

    /// Replace the cart with a fetched one, unless the cart moved on
    ///
    /// Returns `None` and keeps the in-memory cart when it has changes that
    /// storage did not hold at read time, either made after the read or not
    /// yet written.
    pub fn apply(&self, fetched: Fetched) -> Option<Change> {
        let mut committed = self.committed();
        if committed.revision != fetched.revision {
            return None;
        }

        Some(match fetched.items {
            Some(items) => committed.cart.replace(items),
            None => Change::Unchanged,
        })
    }

    /// Replace the in-memory cart with the persisted one, if any
    pub async fn load(&self) -> Change {
        let fetched = self.fetch().await;
        let found = fetched.items.is_some();

        match self.apply(fetched) {
            Some(change) => {
                if found {
                    info!(key = %self.key, items = self.with_cart(Cart::len), "cart loaded");
                }
                change
            }
            None => {
                warn!(
                    key = %self.key,
                    revision = self.revision(),
                    "cart has unsaved changes, persisted cart ignored"
                );
                Change::Unchanged
            }
        }
    }

    /// Write the latest committed cart to storage
    ///
    /// The returned future is independent of `self`. Writers run one at a
    /// time and each writes the cart as it is when its turn comes, so a
    /// stale snapshot can never overwrite a newer one. A failed write leaves
    /// the stored revision untouched and the next call retries with the
    /// latest cart.
    pub fn persist(&self) -> impl Future<Output = Result<Persisted, CartError>> + Send + 'static {
        let store = self.clone();
        async move { store.write_latest().await }
    }

    async fn write_latest(&self) -> Result<Persisted, CartError> {
        let mut written = self.written.lock().await;

        let (revision, payload) = self.encode_committed()?;
        if revision <= *written {
            return Ok(Persisted::UpToDate { revision });
        }

        self.storage.set(&self.key, payload).await?;
        *written = revision;

        debug!(key = %self.key, revision, "cart persisted");
        Ok(Persisted::Written { revision })
    }

    fn encode_committed(&self) -> Result<(u64, String), CartError> {
        let committed = self.committed();
        Ok((committed.revision, codec::encode(committed.cart.items())?))
    }
}
