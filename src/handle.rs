use crate::Plugin;
use iced::futures::channel::mpsc;
use iced::{Subscription, Task};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};

/// Shared registry of output subscribers, keyed by plugin index
pub(crate) type OutputRegistry =
    Arc<Mutex<HashMap<usize, Vec<mpsc::UnboundedSender<PluginOutput>>>>>;

/// Creates a stream that forwards the outputs of one plugin
fn output_listener<O: Clone + Send + Sync + 'static>(
    plugin_index: usize,
    registry: OutputRegistry,
) -> impl iced::futures::Stream<Item = O> {
    use iced::futures::{SinkExt, StreamExt};

    iced::stream::channel(100, move |mut output_sender: mpsc::Sender<O>| async move {
        let (sender, mut receiver) = mpsc::unbounded();

        registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(plugin_index)
            .or_default()
            .push(sender);

        while let Some(output) = receiver.next().await {
            let Some(typed) = output.downcast::<O>() else {
                continue;
            };
            if output_sender.send(typed.clone()).await.is_err() {
                break;
            }
        }

        // The dropped receiver makes the registered sender fail on the next
        // publish, which prunes it in PluginManager::update.
    })
}

/// Typed access to an installed plugin
///
/// A handle is only obtainable from the [`PluginManagerBuilder`] that
/// installed the plugin or from [`PluginManager::handle`], so holding one
/// proves the plugin is wired into the application.
///
/// [`PluginManagerBuilder`]: crate::PluginManagerBuilder
/// [`PluginManager::handle`]: crate::PluginManager::handle
pub struct PluginHandle<P: Plugin> {
    plugin_index: usize,
    output_registry: OutputRegistry,
    _phantom: PhantomData<fn() -> P>,
}

impl<P: Plugin> Clone for PluginHandle<P> {
    fn clone(&self) -> Self {
        Self {
            plugin_index: self.plugin_index,
            output_registry: Arc::clone(&self.output_registry),
            _phantom: PhantomData,
        }
    }
}

impl<P: Plugin> std::fmt::Debug for PluginHandle<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginHandle")
            .field("plugin", &std::any::type_name::<P>())
            .field("plugin_index", &self.plugin_index)
            .finish()
    }
}

impl<P: Plugin + 'static> PluginHandle<P> {
    pub(crate) fn new(plugin_index: usize, output_registry: OutputRegistry) -> Self {
        Self {
            plugin_index,
            output_registry,
            _phantom: PhantomData,
        }
    }

    /// Create a task that dispatches an input to this plugin
    ///
    /// # Example
    /// ```ignore
    /// let task = cart_handle.dispatch(CartInput::increment("p1"));
    /// ```
    pub fn dispatch(&self, input: P::Input) -> Task<PluginMessage> {
        Task::done(self.message(input))
    }

    /// Wrap an input into a routable [`PluginMessage`]
    pub fn message(&self, input: P::Input) -> PluginMessage {
        PluginMessage::new(self.plugin_index, P::Message::from(input))
    }

    /// Subscribe to outputs from this plugin
    ///
    /// # Example
    /// ```ignore
    /// fn subscription(&self) -> Subscription<Message> {
    ///     Subscription::batch([
    ///         self.plugins.subscriptions().map(Message::Plugin),
    ///         self.cart.listen().map(Message::Cart),
    ///     ])
    /// }
    /// ```
    pub fn listen(&self) -> Subscription<P::Output> {
        struct Listener<O> {
            plugin_index: usize,
            registry: OutputRegistry,
            _phantom: PhantomData<fn() -> O>,
        }

        impl<O> std::hash::Hash for Listener<O> {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.plugin_index.hash(state);
                std::any::type_name::<O>().hash(state);
            }
        }

        impl<O> Clone for Listener<O> {
            fn clone(&self) -> Self {
                Self {
                    plugin_index: self.plugin_index,
                    registry: Arc::clone(&self.registry),
                    _phantom: PhantomData,
                }
            }
        }

        fn create_stream<O: Clone + Send + Sync + 'static>(
            listener: &Listener<O>,
        ) -> iced::futures::stream::BoxStream<'static, O> {
            Box::pin(output_listener::<O>(
                listener.plugin_index,
                Arc::clone(&listener.registry),
            ))
        }

        let listener = Listener::<P::Output> {
            plugin_index: self.plugin_index,
            registry: Arc::clone(&self.output_registry),
            _phantom: PhantomData,
        };

        Subscription::run_with(listener, create_stream::<P::Output>)
    }
}

/// A type-erased plugin message that can be routed automatically
#[derive(Clone, Debug)]
pub struct PluginMessage {
    pub(crate) plugin_index: usize,
    pub(crate) message: Arc<dyn Any + Send + Sync>,
    pub(crate) type_id: TypeId,
}

impl PluginMessage {
    pub(crate) fn new<M: Send + Sync + 'static>(plugin_index: usize, message: M) -> Self {
        Self {
            plugin_index,
            type_id: TypeId::of::<M>(),
            message: Arc::new(message),
        }
    }

    /// Get the plugin index this message is for
    pub fn plugin_index(&self) -> usize {
        self.plugin_index
    }
}

/// Type-erased output message from a plugin
#[derive(Clone)]
pub struct PluginOutput {
    plugin_index: usize,
    output: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
}

impl PluginOutput {
    pub(crate) fn new<O: Send + Sync + 'static>(plugin_index: usize, output: O) -> Self {
        Self {
            plugin_index,
            type_id: TypeId::of::<O>(),
            output: Arc::new(output),
        }
    }

    /// Get the plugin index this output is from
    pub fn plugin_index(&self) -> usize {
        self.plugin_index
    }

    /// Try to downcast the output to a specific type
    pub fn downcast<O: 'static>(&self) -> Option<&O> {
        if self.type_id == TypeId::of::<O>() {
            self.output.downcast_ref::<O>()
        } else {
            None
        }
    }
}

impl std::fmt::Debug for PluginOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PluginOutput {{ plugin_index: {}, type_id: {:?} }}",
            self.plugin_index, self.type_id
        )
    }
}
