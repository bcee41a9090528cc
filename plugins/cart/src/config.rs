use iced_kv_store::{AppName, FileStore};

/// Storage key holding the serialized cart
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarketplace:Products";

/// Group file the cart lives in when stored on disk
pub const DEFAULT_GROUP: &str = "cart";

/// Where the cart plugin persists its lines
///
/// # Example
///
/// ```
/// use iced_cart_plugin::CartConfig;
/// use iced_kv_store::AppName;
///
/// let config = CartConfig::new(AppName::new("com", "example", "shop")).with_group("session");
/// assert_eq!(config.key, "@GoMarketplace:Products");
/// assert!(config.file_store().path().ends_with("session.json"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartConfig {
    pub app_name: AppName,
    /// Group file name, without extension
    pub group: String,
    /// Key inside the group
    pub key: String,
}

impl CartConfig {
    pub fn new(app_name: AppName) -> Self {
        Self {
            app_name,
            group: DEFAULT_GROUP.to_string(),
            key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// File-backed store for this configuration
    pub fn file_store(&self) -> FileStore {
        FileStore::new(&self.app_name, &self.group)
    }
}
