use crate::handle::OutputRegistry;
use crate::{Plugin, PluginError, PluginHandle, PluginMessage, PluginOutput};
use iced::{Subscription, Task};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

type AnyRef = dyn Any + Send + Sync;
type AnyMessage = Arc<dyn Any + Send + Sync>;
type UpdateFn =
    Box<dyn Fn(&mut dyn Any, &AnyMessage) -> (Task<PluginMessage>, Option<PluginOutput>) + Send + Sync>;
type SubscriptionFn = fn(&dyn Any, &AnyRef, usize) -> Subscription<PluginMessage>;

/// Non-capturing function pointer for plugin subscriptions
fn plugin_subscription_fn<P: Plugin + 'static>(
    state: &dyn Any,
    plugin: &AnyRef,
    plugin_index: usize,
) -> Subscription<PluginMessage> {
    let (Some(state), Some(plugin)) = (state.downcast_ref::<P::State>(), plugin.downcast_ref::<P>())
    else {
        return Subscription::none();
    };

    plugin
        .subscription(state)
        .with(plugin_index)
        .map(|(plugin_index, msg)| PluginMessage::new(plugin_index, msg))
}

/// Holds a single plugin instance with its state and behavior
struct PluginEntry {
    name: &'static str,
    plugin_type_id: TypeId,
    message_type_id: TypeId,
    state: Box<dyn Any + Send>,
    plugin: Arc<AnyRef>,
    plugin_index: usize,
    update_fn: UpdateFn,
    subscription_fn: SubscriptionFn,
}

impl std::fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginEntry")
            .field("name", &self.name)
            .field("plugin_index", &self.plugin_index)
            .finish_non_exhaustive()
    }
}

/// Holds every installed plugin and its state.
/// Embed it in the application state and route [`PluginMessage`]s to it.
///
/// # Example
/// ```ignore
/// struct App {
///     plugins: PluginManager,
///     cart: PluginHandle<CartPlugin>,
/// }
/// ```
#[derive(Debug)]
pub struct PluginManager {
    plugins: Vec<PluginEntry>,
    output_registry: OutputRegistry,
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginManager {
    /// Create a new empty plugin manager
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            output_registry: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn position<P: Plugin + 'static>(&self) -> Option<usize> {
        let plugin_type_id = TypeId::of::<P>();
        self.plugins
            .iter()
            .position(|entry| entry.plugin_type_id == plugin_type_id)
    }

    /// Installs a plugin that is known not to be present yet
    fn insert<P: Plugin + 'static>(&mut self, plugin: P) -> (PluginHandle<P>, Task<PluginMessage>) {
        let name = plugin.name();
        let plugin = Arc::new(plugin);
        let (state, init_task) = plugin.init();
        let plugin_index = self.plugins.len();

        let plugin_for_update = Arc::clone(&plugin);
        let update_fn: UpdateFn = Box::new(move |state: &mut dyn Any, message: &AnyMessage| {
            if let Some(msg) = message.downcast_ref::<P::Message>()
                && let Some(typed_state) = state.downcast_mut::<P::State>()
            {
                let (task, output) = plugin_for_update.update(typed_state, msg.clone());
                let task = task.map(move |plugin_msg| PluginMessage::new(plugin_index, plugin_msg));
                let output = output.map(|o| PluginOutput::new(plugin_index, o));
                (task, output)
            } else {
                (Task::none(), None)
            }
        });

        self.plugins.push(PluginEntry {
            name,
            plugin_type_id: TypeId::of::<P>(),
            message_type_id: TypeId::of::<P::Message>(),
            state: Box::new(state),
            plugin,
            plugin_index,
            update_fn,
            subscription_fn: plugin_subscription_fn::<P>,
        });
        debug!(plugin = name, plugin_index, "plugin installed");

        let init_task = init_task.map(move |msg| PluginMessage::new(plugin_index, msg));
        (
            PluginHandle::new(plugin_index, Arc::clone(&self.output_registry)),
            init_task,
        )
    }

    /// Update the plugin manager with a plugin message.
    /// The message is routed to the plugin it was created for and any output
    /// is published to that plugin's listeners.
    ///
    /// # Example
    /// ```ignore
    /// match message {
    ///     Message::Plugin(plugin_msg) => {
    ///         return self.plugins.update(plugin_msg).map(Message::Plugin);
    ///     }
    ///     // ... other messages
    /// }
    /// ```
    pub fn update(&mut self, message: PluginMessage) -> Task<PluginMessage> {
        let Some(entry) = self.plugins.get_mut(message.plugin_index) else {
            warn!(plugin_index = message.plugin_index, "message for unknown plugin dropped");
            return Task::none();
        };

        if entry.message_type_id != message.type_id {
            warn!(plugin = entry.name, "message of the wrong type dropped");
            return Task::none();
        }

        let (task, output) = (entry.update_fn)(entry.state.as_mut(), &message.message);

        if let Some(output) = output {
            let mut registry = self
                .output_registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(senders) = registry.get_mut(&entry.plugin_index) {
                // Disconnected listeners are pruned here
                senders.retain(|sender| sender.unbounded_send(output.clone()).is_ok());
            }
        }

        task
    }

    /// Collect all subscriptions from installed plugins
    /// Call this from your application's subscription method
    pub fn subscriptions(&self) -> Subscription<PluginMessage> {
        Subscription::batch(self.plugins.iter().map(|entry| {
            (entry.subscription_fn)(
                entry.state.as_ref(),
                entry.plugin.as_ref(),
                entry.plugin_index,
            )
        }))
    }

    /// Get the number of installed plugins
    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Get a list of all installed plugin names in order
    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name).collect()
    }

    /// Look up the handle of an installed plugin
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NotInstalled`] if no plugin of type `P` was installed.
    pub fn handle<P: Plugin + 'static>(&self) -> Result<PluginHandle<P>, PluginError> {
        self.position::<P>()
            .map(|index| PluginHandle::new(index, Arc::clone(&self.output_registry)))
            .ok_or_else(not_installed::<P>)
    }

    /// Borrow the state of an installed plugin
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NotInstalled`] if no plugin of type `P` was installed.
    pub fn state<P: Plugin + 'static>(&self) -> Result<&P::State, PluginError> {
        self.position::<P>()
            .and_then(|index| self.plugins.get(index))
            .and_then(|entry| entry.state.downcast_ref::<P::State>())
            .ok_or_else(not_installed::<P>)
    }

    /// Mutably borrow the state of an installed plugin
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NotInstalled`] if no plugin of type `P` was installed.
    pub fn state_mut<P: Plugin + 'static>(&mut self) -> Result<&mut P::State, PluginError> {
        let index = self.position::<P>().ok_or_else(not_installed::<P>)?;
        self.plugins
            .get_mut(index)
            .and_then(|entry| entry.state.downcast_mut::<P::State>())
            .ok_or_else(not_installed::<P>)
    }
}

fn not_installed<P: 'static>() -> PluginError {
    PluginError::NotInstalled {
        plugin: std::any::type_name::<P>(),
    }
}

/// Builder that installs plugins and collects their startup tasks
///
/// # Example
/// ```ignore
/// let mut builder = PluginManagerBuilder::new();
/// let cart = builder.install(CartPlugin::new(app_name));
/// let (plugins, init_task) = builder.build();
/// ```
#[derive(Default)]
pub struct PluginManagerBuilder {
    manager: PluginManager,
    init_tasks: Vec<Task<PluginMessage>>,
}

impl PluginManagerBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a plugin and return its handle.
    /// Installing a plugin type twice keeps the first instance.
    pub fn install<P: Plugin + 'static>(&mut self, plugin: P) -> PluginHandle<P> {
        if let Some(index) = self.manager.position::<P>() {
            warn!(plugin = plugin.name(), "plugin already installed, keeping the first one");
            return PluginHandle::new(index, Arc::clone(&self.manager.output_registry));
        }

        let (handle, init_task) = self.manager.insert(plugin);
        self.init_tasks.push(init_task);
        handle
    }

    /// Install a plugin, rejecting a second plugin of the same type
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::AlreadyInstalled`] if a plugin of type `P` is present.
    pub fn try_install<P: Plugin + 'static>(
        &mut self,
        plugin: P,
    ) -> Result<PluginHandle<P>, PluginError> {
        if self.manager.position::<P>().is_some() {
            return Err(PluginError::AlreadyInstalled {
                plugin: plugin.name(),
            });
        }

        let (handle, init_task) = self.manager.insert(plugin);
        self.init_tasks.push(init_task);
        Ok(handle)
    }

    /// Add a plugin without keeping its handle
    pub fn with_plugin<P: Plugin + 'static>(mut self, plugin: P) -> Self {
        let _ = self.install(plugin);
        self
    }

    /// Build the plugin manager and the batched startup task of every plugin
    pub fn build(self) -> (PluginManager, Task<PluginMessage>) {
        (self.manager, Task::batch(self.init_tasks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced::futures::channel::mpsc;

    #[derive(Clone, Debug)]
    enum TallyInput {
        Add(u32),
        Reset,
    }

    #[derive(Clone, Debug)]
    enum TallyMessage {
        Input(TallyInput),
    }

    impl From<TallyInput> for TallyMessage {
        fn from(input: TallyInput) -> Self {
            Self::Input(input)
        }
    }

    #[derive(Debug)]
    struct TallyState {
        total: u32,
    }

    struct TallyPlugin;

    impl Plugin for TallyPlugin {
        type Input = TallyInput;
        type Message = TallyMessage;
        type State = TallyState;
        type Output = u32;

        fn name(&self) -> &'static str {
            "tally"
        }

        fn init(&self) -> (Self::State, Task<Self::Message>) {
            (TallyState { total: 0 }, Task::none())
        }

        fn update(
            &self,
            state: &mut Self::State,
            message: Self::Message,
        ) -> (Task<Self::Message>, Option<Self::Output>) {
            match message {
                TallyMessage::Input(TallyInput::Add(n)) => state.total += n,
                TallyMessage::Input(TallyInput::Reset) => state.total = 0,
            }
            (Task::none(), Some(state.total))
        }
    }

    struct IdlePlugin;

    impl Plugin for IdlePlugin {
        type Input = ();
        type Message = ();
        type State = ();
        type Output = ();

        fn name(&self) -> &'static str {
            "idle"
        }

        fn init(&self) -> (Self::State, Task<Self::Message>) {
            ((), Task::none())
        }

        fn update(
            &self,
            _state: &mut Self::State,
            _message: Self::Message,
        ) -> (Task<Self::Message>, Option<Self::Output>) {
            (Task::none(), None)
        }
    }

    #[test]
    fn installs_plugins_in_order() {
        let mut builder = PluginManagerBuilder::new();
        let tally = builder.install(TallyPlugin);
        let idle = builder.install(IdlePlugin);
        let (plugins, _init) = builder.build();

        assert_eq!(plugins.plugin_names(), vec!["tally", "idle"]);
        assert_eq!(plugins.plugin_count(), 2);
        assert_eq!(tally.message(TallyInput::Reset).plugin_index(), 0);
        assert_eq!(idle.message(()).plugin_index(), 1);
    }

    #[test]
    fn routes_messages_to_plugin_state() {
        let mut builder = PluginManagerBuilder::new();
        let tally = builder.install(TallyPlugin);
        let (mut plugins, _init) = builder.build();

        let _ = plugins.update(tally.message(TallyInput::Add(2)));
        let _ = plugins.update(tally.message(TallyInput::Add(3)));

        let state = plugins.state::<TallyPlugin>().expect("tally installed");
        assert_eq!(state.total, 5);
    }

    #[test]
    fn drops_messages_of_the_wrong_type() {
        let mut builder = PluginManagerBuilder::new();
        builder.install(TallyPlugin);
        let (mut plugins, _init) = builder.build();

        let _ = plugins.update(PluginMessage::new(0, "not a tally message"));
        let _ = plugins.update(PluginMessage::new(7, TallyMessage::Input(TallyInput::Add(1))));

        assert_eq!(plugins.state::<TallyPlugin>().expect("tally installed").total, 0);
    }

    #[test]
    fn lookup_of_missing_plugin_fails() {
        let (plugins, _init) = PluginManagerBuilder::new().with_plugin(IdlePlugin).build();

        let err = plugins.handle::<TallyPlugin>().expect_err("tally not installed");
        assert!(matches!(err, PluginError::NotInstalled { plugin } if plugin.ends_with("TallyPlugin")));
        assert!(plugins.state::<TallyPlugin>().is_err());
        assert!(plugins.handle::<IdlePlugin>().is_ok());
    }

    #[test]
    fn second_install_of_same_type_is_rejected() {
        let mut builder = PluginManagerBuilder::new();
        let first = builder.install(TallyPlugin);

        let err = builder.try_install(TallyPlugin).expect_err("duplicate");
        assert_eq!(err, PluginError::AlreadyInstalled { plugin: "tally" });

        let again = builder.install(TallyPlugin);
        assert_eq!(
            again.message(TallyInput::Reset).plugin_index(),
            first.message(TallyInput::Reset).plugin_index()
        );
        let (plugins, _init) = builder.build();
        assert_eq!(plugins.plugin_count(), 1);
    }

    #[test]
    fn state_mut_edits_in_place() {
        let (mut plugins, _init) = PluginManagerBuilder::new().with_plugin(TallyPlugin).build();

        plugins
            .state_mut::<TallyPlugin>()
            .expect("tally installed")
            .total = 9;

        assert_eq!(plugins.state::<TallyPlugin>().expect("tally installed").total, 9);
    }

    #[test]
    fn outputs_reach_listeners_and_dead_listeners_are_pruned() {
        let mut builder = PluginManagerBuilder::new();
        let tally = builder.install(TallyPlugin);
        builder.install(IdlePlugin);
        let (mut plugins, _init) = builder.build();

        let (live, mut outputs) = mpsc::unbounded();
        let (dead, closed) = mpsc::unbounded();
        drop(closed);
        let (other, mut other_outputs) = mpsc::unbounded();
        {
            let mut registry = plugins.output_registry.lock().unwrap();
            registry.entry(0).or_default().extend([live, dead]);
            registry.entry(1).or_default().push(other);
        }

        let _ = plugins.update(tally.message(TallyInput::Add(2)));

        let output = outputs
            .try_next()
            .expect("output published")
            .expect("listener open");
        assert_eq!(output.downcast::<u32>(), Some(&2));
        assert!(other_outputs.try_next().is_err());

        let registry = plugins.output_registry.lock().unwrap();
        assert_eq!(registry[&0].len(), 1);
        assert_eq!(registry[&1].len(), 1);
    }
}
