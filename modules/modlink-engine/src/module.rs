//! Module identity, composition, and lifecycle.

use std::fmt;
use std::sync::Arc;

use modlink_events::{EventKind, EventPtr, EventVariant, HandlerRegistry, RegistryError};
use tracing::debug;

use crate::dispatcher::Dispatcher;

pub type ModuleId = usize;

/// State every module owns: identity, its registry, and the dispatcher it
/// sends through. Identity is fixed at construction.
pub struct ModuleCore {
    id: ModuleId,
    name: String,
    registry: HandlerRegistry,
    dispatcher: Arc<dyn Dispatcher>,
}

impl ModuleCore {
    pub fn new(id: ModuleId, name: impl Into<String>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self::with_registry(id, name, HandlerRegistry::new(), dispatcher)
    }

    /// Build around a preconfigured registry (e.g. a non-default collision policy).
    pub fn with_registry(
        id: ModuleId,
        name: impl Into<String>,
        registry: HandlerRegistry,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            registry,
            dispatcher,
        }
    }

    pub fn id(&self) -> ModuleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.registry
    }

    pub fn dispatcher(&self) -> &Arc<dyn Dispatcher> {
        &self.dispatcher
    }

    pub fn subscribe<V, F>(&mut self, handler: F)
    where
        V: EventVariant,
        F: FnMut(Arc<V>) + Send + 'static,
    {
        self.registry.subscribe::<V, F>(handler);
    }

    pub fn unsubscribe(&mut self, kind: EventKind) -> bool {
        self.registry.unsubscribe(kind)
    }

    pub fn process_event(&mut self, event: &EventPtr) -> Result<bool, RegistryError> {
        self.registry.process_event(event)
    }

    pub fn clear_subscriptions(&mut self) {
        self.registry.clear_subscriptions();
    }

    /// Hand `event` to the dispatcher. Returns whether it was accepted.
    pub fn send(&self, event: EventPtr) -> bool {
        debug!(
            module = %self.name,
            module_id = self.id,
            event = %event.render(),
            "Sending event"
        );
        let accepted = self.dispatcher.deliver(event, self.id);
        if !accepted {
            debug!(module = %self.name, module_id = self.id, "Dispatcher rejected event");
        }
        accepted
    }
}

impl fmt::Debug for ModuleCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleCore")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// A component that subscribes to events and sends its own.
///
/// Implementors embed a `ModuleCore` and declare their subscriptions in
/// `init_subscribes`. The owner calls `init_subscribes` once after
/// construction; until then every dispatch reports "no handler". Calling it
/// again re-registers the same handlers.
///
/// Handlers cannot borrow the module that owns them. State they update is
/// kept in shared cells cloned into each closure.
pub trait Module {
    fn core(&self) -> &ModuleCore;

    fn core_mut(&mut self) -> &mut ModuleCore;

    fn init_subscribes(&mut self);

    fn id(&self) -> ModuleId {
        self.core().id()
    }

    fn name(&self) -> &str {
        self.core().name()
    }

    fn send(&self, event: EventPtr) -> bool {
        self.core().send(event)
    }

    fn subscribe<V, F>(&mut self, handler: F)
    where
        Self: Sized,
        V: EventVariant,
        F: FnMut(Arc<V>) + Send + 'static,
    {
        self.core_mut().subscribe::<V, F>(handler);
    }

    fn unsubscribe(&mut self, kind: EventKind) -> bool {
        self.core_mut().unsubscribe(kind)
    }

    fn process_event(&mut self, event: &EventPtr) -> Result<bool, RegistryError> {
        self.core_mut().process_event(event)
    }

    fn clear_subscriptions(&mut self) {
        self.core_mut().clear_subscriptions();
    }
}
