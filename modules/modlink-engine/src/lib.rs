//! Modules: identified owners of a handler registry.
//!
//! A module declares its subscriptions in `init_subscribes`, receives events
//! through its registry, and hands outbound events to an injected
//! `Dispatcher`. The dispatcher decides delivery; this crate only defines the
//! contract and two simple implementations.

pub mod dispatcher;
pub mod module;

pub use dispatcher::{Delivery, Dispatcher, LogDispatcher, MemoryDispatcher};
pub use module::{Module, ModuleCore, ModuleId};
