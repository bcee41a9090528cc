//! # Cart
//!
//! The ordered list of cart lines and the operations that change it.
//!
//! ## Invariants
//! - Lines are unique by `id`; adding a present product bumps its quantity
//! - Every line has `quantity >= 1`; a line that would reach 0 is removed
//! - New lines are appended, so display order is insertion order

use crate::{CartItem, NewCartItem};
use tracing::warn;

/// What an operation did to the cart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// A new line was appended
    Added,
    /// An existing line gained one unit
    Incremented,
    /// An existing line lost one unit
    Decremented,
    /// A line with a single unit was decremented and removed
    Removed,
    /// All lines were removed
    Cleared,
    /// The lines were replaced wholesale (loading from storage)
    Replaced,
    /// The operation was a no-op
    Unchanged,
}

impl Change {
    /// Whether the cart content differs from before the operation
    pub fn is_change(self) -> bool {
        !matches!(self, Change::Unchanged)
    }
}

/// The shopping cart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in insertion order
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Quantity of `id`, 0 when absent
    pub fn quantity_of(&self, id: &str) -> u32 {
        self.get(id).map_or(0, |item| item.quantity)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds a product or bumps its quantity if already present.
    ///
    /// ## Behavior
    /// - Product already in cart: same as [`Cart::increment`]
    /// - Product not in cart: appended with quantity 1
    /// - Empty id or non-finite price: ignored
    pub fn add(&mut self, item: NewCartItem) -> Change {
        if item.id.is_empty() {
            warn!(title = %item.title, "ignoring cart item without an id");
            return Change::Unchanged;
        }
        if !item.price.is_finite() {
            warn!(id = %item.id, price = item.price, "ignoring cart item with a non-finite price");
            return Change::Unchanged;
        }

        if self.get(&item.id).is_some() {
            return self.increment(&item.id);
        }

        self.items.push(item.into());
        Change::Added
    }

    /// Raises the quantity of `id` by one. Unknown ids are a no-op.
    pub fn increment(&mut self, id: &str) -> Change {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1);
                Change::Incremented
            }
            None => Change::Unchanged,
        }
    }

    /// Lowers the quantity of `id` by one, removing the line when it reaches 0.
    /// Unknown ids are a no-op.
    pub fn decrement(&mut self, id: &str) -> Change {
        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            return Change::Unchanged;
        };

        let item = &mut self.items[index];
        if item.quantity <= 1 {
            self.items.remove(index);
            Change::Removed
        } else {
            item.quantity -= 1;
            Change::Decremented
        }
    }

    /// Removes every line
    pub fn clear(&mut self) -> Change {
        if self.items.is_empty() {
            return Change::Unchanged;
        }
        self.items.clear();
        Change::Cleared
    }

    /// Replaces the lines with `items`, typically read back from storage.
    ///
    /// Lines that would break the invariants are dropped: empty ids, zero
    /// quantities, non-finite prices and repeated ids after their first
    /// occurrence.
    pub fn replace(&mut self, items: Vec<CartItem>) -> Change {
        let mut kept: Vec<CartItem> = Vec::with_capacity(items.len());

        for item in items {
            if item.id.is_empty() || item.quantity == 0 || !item.price.is_finite() {
                warn!(id = %item.id, quantity = item.quantity, "dropping invalid cart line");
                continue;
            }
            if kept.iter().any(|existing| existing.id == item.id) {
                warn!(id = %item.id, "dropping duplicated cart line");
                continue;
            }
            kept.push(item);
        }

        if kept == self.items {
            return Change::Unchanged;
        }
        self.items = kept;
        Change::Replaced
    }

    /// Summary figures for display
    pub fn totals(&self) -> CartTotals {
        CartTotals::from(self)
    }
}

/// Cart summary for the UI
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CartTotals {
    /// Number of distinct lines
    pub item_count: usize,
    /// Sum of all quantities
    pub total_quantity: u64,
    /// Sum of price × quantity over all lines
    pub subtotal: f64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.len(),
            total_quantity: cart.items.iter().map(|i| u64::from(i.quantity)).sum(),
            subtotal: cart.items.iter().map(CartItem::line_total).sum(),
        }
    }
}
