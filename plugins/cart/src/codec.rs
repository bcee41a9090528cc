//! Persisted cart payload

use crate::{CartError, CartItem};
use serde_json::Value;
use tracing::warn;

/// Serialize the cart lines as a JSON array
pub fn encode(items: &[CartItem]) -> Result<String, CartError> {
    serde_json::to_string(items).map_err(CartError::Encode)
}

/// Parse a JSON array of cart lines
///
/// The payload must be an array, but each line is decoded on its own: a line
/// with missing or mistyped fields is dropped with a warning and the rest are
/// kept. Invariants are enforced when the items are applied to a
/// [`Cart`](crate::Cart).
pub fn decode(payload: &str) -> Result<Vec<CartItem>, CartError> {
    let lines: Vec<Value> = serde_json::from_str(payload).map_err(CartError::Decode)?;

    Ok(lines
        .into_iter()
        .enumerate()
        .filter_map(|(index, line)| match serde_json::from_value(line) {
            Ok(item) => Some(item),
            Err(error) => {
                warn!(index, %error, "dropping undecodable cart line");
                None
            }
        })
        .collect())
}
