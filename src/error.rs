//! Errors raised by the plugin host

use thiserror::Error;

/// Wiring errors reported when plugins are installed or looked up
///
/// These indicate a programming mistake in how the application composes its
/// plugins, so they are returned when a consumer is constructed rather than
/// surfacing later during `update`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginError {
    /// No plugin of the requested type was installed into the manager
    #[error("plugin `{plugin}` is not installed; install it before building its consumers")]
    NotInstalled { plugin: &'static str },

    /// A plugin of the same type was already installed
    #[error("plugin `{plugin}` is already installed")]
    AlreadyInstalled { plugin: &'static str },
}
