//! Plugin implementation for the Iced framework

use crate::messages::{CartInput, CartMessage, CartOutput};
use crate::{CartConfig, CartItem, CartStore, CartTotals, Change, Fetched};
use iced::Task;
use iced_kv_store::{AppName, FileStore, KeyValueStore};
use iced_marketplace::Plugin;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The plugin state held by the PluginManager
#[derive(Debug)]
pub struct CartState<S> {
    store: CartStore<S>,
    /// Whether the persisted cart has been read at least once
    loaded: bool,
}

impl<S: KeyValueStore> CartState<S> {
    pub fn store(&self) -> &CartStore<S> {
        &self.store
    }

    pub fn items(&self) -> Vec<CartItem> {
        self.store.items()
    }

    pub fn totals(&self) -> CartTotals {
        self.store.totals()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

/// Cart plugin that keeps the session cart and mirrors it to storage
///
/// The persisted cart is read once at startup. Every input that changes the
/// cart publishes [`CartOutput::Changed`] right away and schedules a
/// background write; failed writes are logged and never reach the UI.
///
/// # Example
///
/// ```ignore
/// use iced_cart_plugin::{CartInput, CartPlugin, NewCartItem};
/// use iced_kv_store::AppName;
/// use iced_marketplace::PluginManagerBuilder;
///
/// let mut builder = PluginManagerBuilder::new();
/// let cart = builder.install(CartPlugin::new(AppName::new("com", "example", "shop")));
/// let (plugins, init_task) = builder.build();
///
/// let task = cart.dispatch(CartInput::add(NewCartItem::new("p1", "Shirt", "u", 29.9)));
/// ```
pub struct CartPlugin<S = FileStore> {
    storage: Arc<S>,
    key: String,
}

impl CartPlugin<FileStore> {
    /// Cart stored on disk under the default group and key
    pub fn new(app_name: AppName) -> Self {
        Self::from_config(&CartConfig::new(app_name))
    }

    pub fn from_config(config: &CartConfig) -> Self {
        Self::with_store(config.file_store(), config.key.clone())
    }
}

impl<S: KeyValueStore> CartPlugin<S> {
    /// Cart persisted under `key` in any key-value store
    pub fn with_store(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage: Arc::new(storage),
            key: key.into(),
        }
    }

    fn changed(state: &CartState<S>, change: Change) -> (Task<CartMessage>, Option<CartOutput>) {
        if !change.is_change() {
            return (Task::none(), None);
        }

        let task = Task::perform(state.store.persist(), |result| {
            CartMessage::Persisted(result.map_err(|error| error.to_string()))
        });
        let output = CartOutput::Changed {
            change,
            items: state.store.items(),
        };
        (task, Some(output))
    }

    fn loaded(state: &mut CartState<S>, fetched: Fetched) -> CartOutput {
        state.loaded = true;
        let found = fetched.items.is_some();

        match state.store.apply(fetched) {
            // Inputs that storage had not seen when it was read win over it
            None => {
                warn!(
                    revision = state.store.revision(),
                    "cart changed while the persisted cart was read, keeping the in-memory one"
                );
            }
            Some(_) if !found => debug!("no persisted cart to apply"),
            Some(change) => {
                info!(?change, items = state.store.with_cart(|cart| cart.len()), "cart loaded");
            }
        }

        CartOutput::Loaded {
            items: state.store.items(),
        }
    }
}

impl<S: KeyValueStore> Plugin for CartPlugin<S> {
    type Input = CartInput;
    type Message = CartMessage;
    type State = CartState<S>;
    type Output = CartOutput;

    fn name(&self) -> &'static str {
        "cart"
    }

    fn init(&self) -> (Self::State, Task<Self::Message>) {
        let store = CartStore::with_shared(Arc::clone(&self.storage), self.key.clone());
        let load = Task::perform(store.fetch(), CartMessage::Loaded);

        (
            CartState {
                store,
                loaded: false,
            },
            load,
        )
    }

    fn update(
        &self,
        state: &mut Self::State,
        message: Self::Message,
    ) -> (Task<Self::Message>, Option<Self::Output>) {
        match message {
            CartMessage::AddToCart(item) => {
                let change = state.store.add_to_cart(item);
                Self::changed(state, change)
            }

            CartMessage::Increment(id) => {
                let change = state.store.increment(&id);
                Self::changed(state, change)
            }

            CartMessage::Decrement(id) => {
                let change = state.store.decrement(&id);
                Self::changed(state, change)
            }

            CartMessage::Clear => {
                let change = state.store.clear();
                Self::changed(state, change)
            }

            CartMessage::Reload => (
                Task::perform(state.store.fetch(), CartMessage::Loaded),
                None,
            ),

            CartMessage::Loaded(items) => (Task::none(), Some(Self::loaded(state, items))),

            CartMessage::Persisted(Ok(persisted)) => {
                debug!(?persisted, "cart write finished");
                (Task::none(), None)
            }

            CartMessage::Persisted(Err(error)) => {
                warn!(%error, "cart was not persisted, in-memory cart stays current");
                (Task::none(), None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NewCartItem, Persisted, codec};
    use iced_kv_store::MemoryStore;

    const KEY: &str = "@GoMarketplace:Products";

    fn plugin(storage: &MemoryStore) -> CartPlugin<MemoryStore> {
        CartPlugin::with_store(storage.clone(), KEY)
    }

    fn shirt() -> NewCartItem {
        NewCartItem::new("p1", "Shirt", "u", 29.9)
    }

    fn send(
        plugin: &CartPlugin<MemoryStore>,
        state: &mut CartState<MemoryStore>,
        input: CartInput,
    ) -> Option<CartOutput> {
        plugin.update(state, input.into()).1
    }

    #[test]
    fn add_publishes_the_new_cart() {
        let storage = MemoryStore::new();
        let plugin = plugin(&storage);
        let (mut state, _load) = plugin.init();

        let output = send(&plugin, &mut state, CartInput::add(shirt())).expect("cart changed");

        let CartOutput::Changed { change, items } = output else {
            panic!("expected a change");
        };
        assert_eq!(change, Change::Added);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 1);
        assert_eq!(state.items(), items);
    }

    #[test]
    fn no_op_inputs_publish_nothing() {
        let storage = MemoryStore::new();
        let plugin = plugin(&storage);
        let (mut state, _load) = plugin.init();

        assert!(send(&plugin, &mut state, CartInput::increment("missing-id")).is_none());
        assert!(send(&plugin, &mut state, CartInput::decrement("missing-id")).is_none());
        assert!(send(&plugin, &mut state, CartInput::Clear).is_none());
        assert!(state.items().is_empty());
    }

    #[test]
    fn increment_and_decrement_through_the_plugin() {
        let storage = MemoryStore::new();
        let plugin = plugin(&storage);
        let (mut state, _load) = plugin.init();

        send(&plugin, &mut state, CartInput::add(shirt()));
        send(&plugin, &mut state, CartInput::increment("p1"));
        assert_eq!(state.store().with_cart(|cart| cart.quantity_of("p1")), 2);

        send(&plugin, &mut state, CartInput::decrement("p1"));
        let output = send(&plugin, &mut state, CartInput::decrement("p1")).expect("removed");
        assert!(matches!(output, CartOutput::Changed { change: Change::Removed, .. }));
        assert!(output.items().is_empty());
    }

    fn stored(items: Vec<CartItem>, revision: u64) -> CartMessage {
        CartMessage::Loaded(Fetched {
            items: Some(items),
            revision,
        })
    }

    #[test]
    fn startup_load_replaces_untouched_cart() {
        let storage = MemoryStore::new();
        let plugin = plugin(&storage);
        let (mut state, _load) = plugin.init();
        let persisted = vec![CartItem::from(shirt())];

        let output = plugin
            .update(&mut state, stored(persisted.clone(), 0))
            .1
            .expect("loaded output");

        assert!(matches!(output, CartOutput::Loaded { .. }));
        assert_eq!(output.items(), persisted.as_slice());
        assert!(state.is_loaded());
        assert_eq!(state.store().revision(), 0);
    }

    #[test]
    fn startup_load_keeps_earlier_inputs() {
        let storage = MemoryStore::new();
        let plugin = plugin(&storage);
        let (mut state, _load) = plugin.init();

        send(&plugin, &mut state, CartInput::add(NewCartItem::new("new", "New", "", 1.0)));
        let output = plugin
            .update(&mut state, stored(vec![shirt().into()], 0))
            .1
            .expect("loaded output");

        assert_eq!(output.items().len(), 1);
        assert_eq!(output.items()[0].id, "new");
    }

    #[tokio::test]
    async fn reload_after_startup_replaces_saved_cart() {
        let storage = MemoryStore::new();
        let plugin = plugin(&storage);
        let (mut state, _load) = plugin.init();
        let fetched = state.store().fetch().await;
        let _ = plugin.update(&mut state, CartMessage::Loaded(fetched));

        send(&plugin, &mut state, CartInput::add(NewCartItem::new("new", "New", "", 1.0)));
        state.store().persist().await.unwrap();

        // Storage changed by someone else since the write
        storage
            .set(KEY, codec::encode(&[CartItem::from(shirt())]).unwrap())
            .await
            .unwrap();
        let _ = plugin.update(&mut state, CartInput::Reload.into());
        let fetched = state.store().fetch().await;
        let _ = plugin.update(&mut state, CartMessage::Loaded(fetched));

        assert_eq!(state.items(), vec![CartItem::from(shirt())]);
    }

    #[tokio::test]
    async fn reload_does_not_undo_an_unsaved_change() {
        let storage = MemoryStore::new().with_entry(
            KEY,
            codec::encode(&[CartItem::from(shirt())]).unwrap(),
        );
        let plugin = plugin(&storage);
        let (mut state, _load) = plugin.init();
        let fetched = state.store().fetch().await;
        let _ = plugin.update(&mut state, CartMessage::Loaded(fetched));

        send(&plugin, &mut state, CartInput::increment("p1"));
        let pending = state.store().persist();

        // Reload reads storage before the write above lands
        let fetched = state.store().fetch().await;
        let output = plugin
            .update(&mut state, CartMessage::Loaded(fetched))
            .1
            .expect("loaded output");

        assert_eq!(output.items()[0].quantity, 2);
        assert_eq!(state.store().with_cart(|cart| cart.quantity_of("p1")), 2);

        pending.await.unwrap();
        let saved = codec::decode(&storage.peek(KEY).expect("cart persisted")).unwrap();
        assert_eq!(saved[0].quantity, 2);
    }

    #[test]
    fn missing_persisted_cart_publishes_empty_load() {
        let storage = MemoryStore::new();
        let plugin = plugin(&storage);
        let (mut state, _load) = plugin.init();

        let output = plugin
            .update(
                &mut state,
                CartMessage::Loaded(Fetched {
                    items: None,
                    revision: 0,
                }),
            )
            .1;

        assert!(matches!(output, Some(CartOutput::Loaded { ref items }) if items.is_empty()));
    }

    #[test]
    fn persistence_results_are_not_published() {
        let storage = MemoryStore::new();
        let plugin = plugin(&storage);
        let (mut state, _load) = plugin.init();

        let ok = CartMessage::Persisted(Ok(Persisted::Written { revision: 1 }));
        let failed = CartMessage::Persisted(Err("disk full".to_string()));

        assert!(plugin.update(&mut state, ok).1.is_none());
        assert!(plugin.update(&mut state, failed).1.is_none());
    }

    #[tokio::test]
    async fn fetch_feeds_the_loaded_message() {
        let storage = MemoryStore::new().with_entry(
            KEY,
            codec::encode(&[CartItem::from(shirt())]).unwrap(),
        );
        let plugin = plugin(&storage);
        let (mut state, _load) = plugin.init();

        let fetched = state.store().fetch().await;
        let _ = plugin.update(&mut state, CartMessage::Loaded(fetched));

        assert_eq!(state.store().with_cart(|cart| cart.quantity_of("p1")), 1);
    }
}
