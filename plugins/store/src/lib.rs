//! Key-value storage for the marketplace plugins
//!
//! Plugins persist their state as opaque strings under fixed keys. This crate
//! provides the [`KeyValueStore`] contract plus two backends:
//!
//! - [`FileStore`]: one pretty-printed JSON file per group, under the
//!   platform configuration directory of the application
//! - [`MemoryStore`]: a shared in-memory map with failure injection
//!
//! # Example
//!
//! ```ignore
//! use iced_kv_store::{AppName, FileStore, KeyValueStore};
//!
//! async fn roundtrip() -> Result<(), iced_kv_store::StoreError> {
//!     let app_name = AppName::new("com", "example", "myapp");
//!     let store = FileStore::new(&app_name, "cart");
//!
//!     store.set("@GoMarketplace:Products", "[]".to_string()).await?;
//!     let payload = store.get("@GoMarketplace:Products").await?;
//!     assert_eq!(payload.as_deref(), Some("[]"));
//!     Ok(())
//! }
//! ```

mod app_name;
mod error;
mod file;
mod kv;
mod memory;

pub use app_name::AppName;
pub use error::StoreError;
pub use file::FileStore;
pub use kv::KeyValueStore;
pub use memory::MemoryStore;
