use crate::{KeyValueStore, StoreError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Inner {
    entries: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

/// In-memory key-value store
///
/// Nothing survives the process. Clones share the same map, which makes it
/// handy for ephemeral sessions and for inspecting what a plugin wrote.
/// Reads and writes can be made to fail to exercise error paths.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `key` with `value`
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries().insert(key.into(), value.into());
        self
    }

    /// Read `key` without going through the async API
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    /// Number of successful `set` calls so far
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_reads()?;
        Ok(self.peek(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.check_writes()?;
        self.entries().insert(key.to_string(), value);
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        self.check_writes()?;
        Ok(self.entries().remove(key).is_some())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.check_writes()?;
        self.entries().clear();
        Ok(())
    }
}
