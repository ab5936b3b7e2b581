//! SharedRegistry: a HandlerRegistry behind a mutex.
//!
//! Every access is serialised. The lock is held while a handler runs, so a
//! handler must never call back into the registry that is dispatching it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::event::{EventKind, EventPtr, EventVariant};
use crate::registry::HandlerRegistry;

#[derive(Debug, Default)]
pub struct SharedRegistry {
    inner: Mutex<HandlerRegistry>,
}

impl SharedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self::from(HandlerRegistry::with_config(config))
    }

    pub fn subscribe<V, F>(&self, handler: F)
    where
        V: EventVariant,
        F: FnMut(Arc<V>) + Send + 'static,
    {
        self.lock().subscribe::<V, F>(handler);
    }

    pub fn unsubscribe(&self, kind: EventKind) -> bool {
        self.lock().unsubscribe(kind)
    }

    pub fn process_event(&self, event: &EventPtr) -> Result<bool, RegistryError> {
        self.lock().process_event(event)
    }

    pub fn clear_subscriptions(&self) {
        self.lock().clear_subscriptions();
    }

    pub fn is_subscribed(&self, kind: EventKind) -> bool {
        self.lock().is_subscribed(kind)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Unwrap back into the plain registry.
    pub fn into_inner(self) -> HandlerRegistry {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    // A panicking handler leaves the table itself intact, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, HandlerRegistry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<HandlerRegistry> for SharedRegistry {
    fn from(registry: HandlerRegistry) -> Self {
        Self {
            inner: Mutex::new(registry),
        }
    }
}
