//! The event protocol. Domain-agnostic.
//!
//! Authors implement `EventVariant` on a concrete type. Every such type is an
//! `Event`, and shared handles (`EventPtr`) expose its kind, rendering and
//! downcasts through inherent methods on `dyn Event`.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// Numeric tag identifying an event's concrete type.
pub type EventKind = u16;

/// Shared, immutable handle to an event. Cloning shares the same payload.
pub type EventPtr = Arc<dyn Event>;

/// A concrete event type.
///
/// `KIND` is the only source of an event's tag: the registry subscribes under
/// it and dispatches by it. Uniqueness of kinds across types is a convention;
/// the registry detects collisions when it dispatches.
pub trait EventVariant: Any + Send + Sync + fmt::Debug {
    const KIND: EventKind;

    /// Human-readable description. Must not fail.
    fn render(&self) -> String;
}

mod sealed {
    use std::any::Any;
    use std::sync::Arc;

    use super::EventKind;

    /// Object-safe view of an `EventVariant`. Only implemented through the
    /// blanket impl, so a handle type can never stand in for its payload.
    pub trait ErasedEvent: Any + Send + Sync {
        fn erased_kind(&self) -> EventKind;

        fn erased_render(&self) -> String;

        fn erased_type_name(&self) -> &'static str;

        fn as_any(&self) -> &dyn Any;

        fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
    }
}

use sealed::ErasedEvent;

impl<T: EventVariant> ErasedEvent for T {
    fn erased_kind(&self) -> EventKind {
        T::KIND
    }

    fn erased_render(&self) -> String {
        EventVariant::render(self)
    }

    fn erased_type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A self-describing event, as seen through a shared handle.
///
/// Implemented for every `EventVariant`; cannot be implemented directly.
pub trait Event: ErasedEvent + fmt::Debug {}

impl<T: EventVariant> Event for T {}

impl dyn Event {
    /// The concrete type's `KIND`.
    pub fn kind(&self) -> EventKind {
        self.erased_kind()
    }

    pub fn render(&self) -> String {
        self.erased_render()
    }

    /// Concrete Rust type name, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.erased_type_name()
    }

    /// Borrow the event as `V` if that is its concrete type.
    pub fn downcast_ref<V: EventVariant>(&self) -> Option<&V> {
        self.as_any().downcast_ref::<V>()
    }

    pub fn is<V: EventVariant>(&self) -> bool {
        self.as_any().is::<V>()
    }
}

/// Recover the concrete `Arc<V>` from a shared event handle.
///
/// Returns `None` (and drops the extra reference) if `event` is not a `V`.
pub fn downcast_arc<V: EventVariant>(event: &EventPtr) -> Option<Arc<V>> {
    Arc::clone(event).into_any_arc().downcast::<V>().ok()
}
