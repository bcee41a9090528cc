use iced::{Subscription, Task};

/// Core trait that all plugins must implement.
/// Plugins own their state and respond to messages routed by the
/// [`PluginManager`](crate::PluginManager).
pub trait Plugin: Send + Sync {
    /// Public commands that application code dispatches through a
    /// [`PluginHandle`](crate::PluginHandle)
    type Input: Clone + Send + Sync + 'static;

    /// Every message the plugin handles, including its internal ones
    type Message: Clone + Send + Sync + From<Self::Input> + 'static;

    /// The state type for this plugin
    type State: Send + 'static;

    /// The output message type this plugin can emit
    /// These can be subscribed to by application code
    type Output: Clone + Send + Sync + 'static;

    /// Returns the unique name/identifier for this plugin
    fn name(&self) -> &'static str;

    /// Initialize the plugin and return its initial state along with a
    /// startup task
    fn init(&self) -> (Self::State, Task<Self::Message>);

    /// Update the plugin state based on a message
    /// Returns a Task that can produce more messages and an optional output message
    fn update(
        &self,
        state: &mut Self::State,
        message: Self::Message,
    ) -> (Task<Self::Message>, Option<Self::Output>);

    /// Subscribe to external events
    fn subscription(&self, _state: &Self::State) -> Subscription<Self::Message> {
        Subscription::none()
    }
}
