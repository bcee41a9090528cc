use crate::StoreError;
use std::future::Future;

/// String-keyed blob storage
///
/// Values are opaque strings; callers serialize their own payloads.
/// Implementations must be cheap to share: plugins hold them behind an `Arc`
/// and call them from tasks running on the Iced executor.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read the value stored under `key`, `None` if absent
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: String)
    -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove `key`, returning whether it was present
    fn remove(&self, key: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Remove every key
    fn clear(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
