//! Self-describing events and the per-owner handler registry.
//!
//! An event carries a numeric kind tag and a human-readable rendering.
//! A `HandlerRegistry` maps each kind to one type-checked callback and
//! dispatches shared events to it synchronously.
//!
//! No transport, no persistence. Routing events between owners is the
//! job of a dispatcher built on top of this crate.

pub mod config;
pub mod error;
pub mod event;
pub mod registry;
pub mod shared;

pub use config::{CollisionPolicy, RegistryConfig};
pub use error::RegistryError;
pub use event::{Event, EventKind, EventPtr, EventVariant};
pub use registry::HandlerRegistry;
pub use shared::SharedRegistry;
