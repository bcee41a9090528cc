use iced_kv_store::StoreError;
use thiserror::Error;

/// Failures of cart persistence
///
/// None of these reach the UI: the plugin logs them and keeps the in-memory
/// cart authoritative for the rest of the session.
#[derive(Debug, Error)]
pub enum CartError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode cart: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("persisted cart is malformed: {0}")]
    Decode(#[source] serde_json::Error),
}
