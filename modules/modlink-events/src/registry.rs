//! HandlerRegistry: kind tag to type-checked callback.
//!
//! One handler per kind, last writer wins. Dispatch is synchronous and
//! invokes at most one callback per event.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{CollisionPolicy, RegistryConfig};
use crate::error::RegistryError;
use crate::event::{downcast_arc, EventKind, EventPtr, EventVariant};

/// Type-erased callback. Returns false if the event was not the expected type.
type ErasedHandler = Box<dyn FnMut(&EventPtr) -> bool + Send>;

struct Subscription {
    type_id: TypeId,
    type_name: &'static str,
    handler: ErasedHandler,
}

/// Per-owner table of event handlers.
///
/// Not synchronised: every operation that touches the table takes `&mut self`.
/// Wrap it in a `SharedRegistry` if several threads need it.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<EventKind, Subscription>,
    config: RegistryConfig,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            handlers: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> RegistryConfig {
        self.config
    }

    /// Register `handler` for events of type `V`, replacing whatever was
    /// registered for `V::KIND` before.
    pub fn subscribe<V, F>(&mut self, mut handler: F)
    where
        V: EventVariant,
        F: FnMut(Arc<V>) + Send + 'static,
    {
        let kind = V::KIND;
        let subscription = Subscription {
            type_id: TypeId::of::<V>(),
            type_name: type_name::<V>(),
            handler: Box::new(move |event: &EventPtr| match downcast_arc::<V>(event) {
                Some(typed) => {
                    handler(typed);
                    true
                }
                None => false,
            }),
        };

        match self.handlers.insert(kind, subscription) {
            Some(previous) if previous.type_id != TypeId::of::<V>() => {
                warn!(
                    kind,
                    replaced = previous.type_name,
                    event_type = type_name::<V>(),
                    "Handler replaced by a different event type; kinds may collide"
                );
            }
            Some(_) => debug!(kind, event_type = type_name::<V>(), "Handler replaced"),
            None => debug!(kind, event_type = type_name::<V>(), "Subscribed"),
        }
    }

    /// Remove the handler for `kind`. Returns whether one was registered.
    pub fn unsubscribe(&mut self, kind: EventKind) -> bool {
        let removed = self.handlers.remove(&kind).is_some();
        if removed {
            debug!(kind, "Unsubscribed");
        }
        removed
    }

    /// Dispatch `event` to the handler registered for its kind.
    ///
    /// `Ok(false)` if nothing is registered. `Ok(true)` once the handler has
    /// run. If the registered handler expects a different concrete type the
    /// handler is not run, and the outcome follows the collision policy.
    pub fn process_event(&mut self, event: &EventPtr) -> Result<bool, RegistryError> {
        let kind = event.kind();
        let Some(subscription) = self.handlers.get_mut(&kind) else {
            debug!(kind, event = %event.render(), "No handler for event kind");
            return Ok(false);
        };

        if (subscription.handler)(event) {
            return Ok(true);
        }

        let expected = subscription.type_name;
        let actual = event.type_name();
        match self.config.collision_policy {
            CollisionPolicy::Strict => Err(RegistryError::KindCollision {
                kind,
                expected,
                actual,
            }),
            CollisionPolicy::Skip => {
                warn!(kind, expected, actual, "Kind collision, handler skipped");
                Ok(true)
            }
        }
    }

    /// Remove every handler.
    pub fn clear_subscriptions(&mut self) {
        if !self.handlers.is_empty() {
            debug!(count = self.handlers.len(), "Clearing subscriptions");
        }
        self.handlers.clear();
    }

    pub fn is_subscribed(&self, kind: EventKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Registered kinds, ascending.
    pub fn kinds(&self) -> Vec<EventKind> {
        let mut kinds: Vec<EventKind> = self.handlers.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<(EventKind, &'static str)> = self
            .handlers
            .iter()
            .map(|(kind, sub)| (*kind, sub.type_name))
            .collect();
        entries.sort_unstable_by_key(|(kind, _)| *kind);
        f.debug_struct("HandlerRegistry")
            .field("handlers", &entries)
            .field("config", &self.config)
            .finish()
    }
}
