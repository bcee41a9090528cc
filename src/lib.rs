//! Plugin host for the marketplace Iced client
//!
//! Plugins own a piece of application state, handle their own messages and
//! publish outputs that UI code can subscribe to. The application builds a
//! [`PluginManager`] once at startup and passes typed [`PluginHandle`]s to
//! whatever needs to talk to a plugin.
//!
//! # Example
//!
//! ```ignore
//! use iced_marketplace::{PluginHandle, PluginManager, PluginManagerBuilder, PluginMessage};
//!
//! struct App {
//!     plugins: PluginManager,
//!     cart: PluginHandle<CartPlugin>,
//! }
//!
//! fn new() -> (App, Task<PluginMessage>) {
//!     let mut builder = PluginManagerBuilder::new();
//!     let cart = builder.install(CartPlugin::new(app_name));
//!     let (plugins, init_task) = builder.build();
//!     (App { plugins, cart }, init_task)
//! }
//! ```

mod error;
mod handle;
mod manager;
mod plugin;

pub use error::PluginError;
pub use handle::{PluginHandle, PluginMessage, PluginOutput};
pub use manager::{PluginManager, PluginManagerBuilder};
pub use plugin::Plugin;
