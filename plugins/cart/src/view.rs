use crate::{CartItem, CartPlugin, CartStore, CartTotals};
use iced_kv_store::{FileStore, KeyValueStore};
use iced_marketplace::{PluginError, PluginManager};

/// Read-only access to the cart for view code
///
/// A view can only be built from a manager that has the cart plugin
/// installed, so a missing plugin shows up where the view is constructed
/// instead of as an empty cart.
///
/// # Example
///
/// ```ignore
/// let cart = CartView::new(&self.plugins)?;
/// let badge = text(format!("{} items", cart.totals().total_quantity));
/// ```
pub struct CartView<S = FileStore> {
    store: CartStore<S>,
}

impl<S: KeyValueStore> CartView<S> {
    /// # Errors
    ///
    /// Returns [`PluginError::NotInstalled`] when no `CartPlugin<S>` is installed.
    pub fn new(plugins: &PluginManager) -> Result<Self, PluginError> {
        let state = plugins.state::<CartPlugin<S>>()?;
        Ok(Self {
            store: state.store().clone(),
        })
    }

    pub fn items(&self) -> Vec<CartItem> {
        self.store.items()
    }

    pub fn totals(&self) -> CartTotals {
        self.store.totals()
    }

    pub fn is_empty(&self) -> bool {
        self.store.with_cart(|cart| cart.is_empty())
    }

    pub fn quantity_of(&self, id: &str) -> u32 {
        self.store.with_cart(|cart| cart.quantity_of(id))
    }
}

impl<S> Clone for CartView<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S> std::fmt::Debug for CartView<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartView").field("store", &self.store).finish()
    }
}
