//! Message types for the cart plugin

use crate::{CartItem, Change, Fetched, NewCartItem, Persisted};

/// Commands that UI code dispatches to the cart plugin
///
/// # Example
///
/// ```ignore
/// use iced_cart_plugin::{CartInput, NewCartItem};
///
/// let task = cart_handle.dispatch(CartInput::add(NewCartItem::new("p1", "Shirt", "u", 29.9)));
/// ```
#[derive(Clone, Debug)]
pub enum CartInput {
    /// Add a product, or bump its quantity if present
    AddToCart(NewCartItem),
    /// Bump the quantity of a product already in the cart
    Increment(String),
    /// Lower the quantity of a product, removing it at zero
    Decrement(String),
    /// Empty the cart
    Clear,
    /// Read the persisted cart again and replace the in-memory one
    Reload,
}

impl CartInput {
    pub fn add(item: NewCartItem) -> Self {
        Self::AddToCart(item)
    }

    pub fn increment(id: impl Into<String>) -> Self {
        Self::Increment(id.into())
    }

    pub fn decrement(id: impl Into<String>) -> Self {
        Self::Decrement(id.into())
    }
}

/// Internal messages that the cart plugin handles
///
/// Note: applications should dispatch [`CartInput`] instead.
#[derive(Clone, Debug)]
pub enum CartMessage {
    AddToCart(NewCartItem),
    Increment(String),
    Decrement(String),
    Clear,
    Reload,
    /// Result of reading storage
    Loaded(Fetched),
    /// Result of a persistence write
    Persisted(Result<Persisted, String>),
}

impl From<CartInput> for CartMessage {
    fn from(input: CartInput) -> Self {
        match input {
            CartInput::AddToCart(item) => CartMessage::AddToCart(item),
            CartInput::Increment(id) => CartMessage::Increment(id),
            CartInput::Decrement(id) => CartMessage::Decrement(id),
            CartInput::Clear => CartMessage::Clear,
            CartInput::Reload => CartMessage::Reload,
        }
    }
}

/// Outputs published to listeners of the cart plugin
///
/// Every output carries the full list of lines, so a view can simply replace
/// what it shows.
#[derive(Clone, Debug)]
pub enum CartOutput {
    /// The persisted cart was read (or found missing) and applied
    Loaded { items: Vec<CartItem> },
    /// An input changed the cart
    Changed { change: Change, items: Vec<CartItem> },
}

impl CartOutput {
    /// Current cart lines
    pub fn items(&self) -> &[CartItem] {
        match self {
            CartOutput::Loaded { items } | CartOutput::Changed { items, .. } => items,
        }
    }
}
