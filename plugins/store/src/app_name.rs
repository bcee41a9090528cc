//! Application identity used to locate on-disk storage

use std::path::PathBuf;

/// Application identifier used to determine storage location
///
/// The store follows the [XDG Base Directory Specification](https://specifications.freedesktop.org/basedir-spec/basedir-spec-latest.html)
/// on Linux and the matching conventions on other platforms.
///
/// # Example
///
/// ```
/// use iced_kv_store::AppName;
///
/// let app_name = AppName::new("com", "rocketseat", "gomarketplace");
/// assert!(app_name.storage_dir().ends_with("store"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AppName {
    pub qualifier: String,
    pub organization: String,
    pub application: String,
}

impl AppName {
    /// Create a new application name
    ///
    /// * `qualifier` - Typically a reverse domain name (e.g., "com", "org")
    /// * `organization` - Your organization or username
    /// * `application` - The application name
    pub fn new(
        qualifier: impl Into<String>,
        organization: impl Into<String>,
        application: impl Into<String>,
    ) -> Self {
        Self {
            qualifier: qualifier.into(),
            organization: organization.into(),
            application: application.into(),
        }
    }

    /// Directory holding this application's group files
    ///
    /// - Linux: `$XDG_CONFIG_HOME/<app>/store` or `~/.config/<app>/store`
    /// - macOS: `~/Library/Application Support/<qualifier>.<org>.<app>/store`
    /// - Windows: `%LOCALAPPDATA%\<org>\<app>\config\store`
    ///
    /// Falls back to `./store` when no home directory can be determined.
    pub fn storage_dir(&self) -> PathBuf {
        directories::ProjectDirs::from(&self.qualifier, &self.organization, &self.application)
            .map(|dirs| dirs.config_local_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
            .join("store")
    }
}
