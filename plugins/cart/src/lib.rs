//! Cart Plugin for Iced
//!
//! Keeps the shopping cart of a session in memory and mirrors it to a
//! key-value store so it survives restarts.
//!
//! # Features
//!
//! - Add, increment and decrement products; a line reaching zero is removed
//! - Changes are visible immediately and published to listeners
//! - Persistence runs in the background, one write at a time, always writing
//!   the latest cart
//! - Missing, unreadable or malformed persisted data starts an empty cart
//!
//! # Example
//!
//! ```ignore
//! use iced_cart_plugin::{CartInput, CartOutput, CartPlugin, NewCartItem};
//! use iced_kv_store::AppName;
//! use iced_marketplace::PluginManagerBuilder;
//!
//! let mut builder = PluginManagerBuilder::new();
//! let cart = builder.install(CartPlugin::new(AppName::new("com", "example", "shop")));
//! let (plugins, init_task) = builder.build();
//!
//! // In update:
//! let task = cart.dispatch(CartInput::add(NewCartItem::new("p1", "Shirt", "u", 29.9)));
//!
//! // In subscription:
//! let outputs = cart.listen(); // Subscription<CartOutput>
//! ```

mod cart;
mod config;
mod error;
mod item;
mod messages;
mod plugin;
mod store;
mod view;

pub mod codec;

pub use cart::{Cart, CartTotals, Change};
pub use config::{CartConfig, DEFAULT_GROUP, DEFAULT_STORAGE_KEY};
pub use error::CartError;
pub use item::{CartItem, NewCartItem};
pub use messages::{CartInput, CartMessage, CartOutput};
pub use plugin::{CartPlugin, CartState};
pub use store::{CartStore, Fetched, Persisted};
pub use view::CartView;
