//! Outbound delivery contract and in-tree implementations.

use std::sync::{Arc, Mutex, PoisonError};

use modlink_events::EventPtr;
use tracing::info;

use crate::module::ModuleId;

/// Moves events between modules.
///
/// Owns addressing, queuing and cross-module delivery. Returns whether the
/// event was accepted; acceptance does not mean it has been handled yet.
pub trait Dispatcher: Send + Sync {
    fn deliver(&self, event: EventPtr, from: ModuleId) -> bool;
}

// ---------------------------------------------------------------------------
// LogDispatcher (placeholder, no routing yet)
// ---------------------------------------------------------------------------

/// Announces every event and accepts it. Nothing is delivered.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDispatcher;

impl Dispatcher for LogDispatcher {
    fn deliver(&self, event: EventPtr, from: ModuleId) -> bool {
        info!(
            from,
            kind = event.kind(),
            event = %event.render(),
            "Event sent"
        );
        true
    }
}

// ---------------------------------------------------------------------------
// MemoryDispatcher (tests: records instead of routing)
// ---------------------------------------------------------------------------

/// One recorded `deliver` call.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub from: ModuleId,
    pub event: EventPtr,
}

/// Records every delivery and answers with a fixed acceptance. Thread-safe.
#[derive(Debug)]
pub struct MemoryDispatcher {
    accept: bool,
    deliveries: Mutex<Vec<Delivery>>,
}

impl MemoryDispatcher {
    pub fn accepting() -> Self {
        Self::new(true)
    }

    pub fn rejecting() -> Self {
        Self::new(false)
    }

    fn new(accept: bool) -> Self {
        Self {
            accept,
            deliveries: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of everything delivered so far, oldest first.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Delivery>> {
        self.deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryDispatcher {
    fn default() -> Self {
        Self::accepting()
    }
}

impl Dispatcher for MemoryDispatcher {
    fn deliver(&self, event: EventPtr, from: ModuleId) -> bool {
        self.lock().push(Delivery { from, event });
        self.accept
    }
}

// ---------------------------------------------------------------------------
// Arc<D> blanket: lets tests share the dispatcher for assertions
// ---------------------------------------------------------------------------

impl<D: Dispatcher + ?Sized> Dispatcher for Arc<D> {
    fn deliver(&self, event: EventPtr, from: ModuleId) -> bool {
        (**self).deliver(event, from)
    }
}
