//! imgpost_ui - event routing primitives for DOM-like hosts
//!
//! This crate provides the pieces a form controller needs to react to user
//! input without owning the host: events that bubble through a target tree,
//! a listener registry, and listener scopes that detach everything they
//! attached when dropped.

mod event;
mod listener;
mod target;

pub use event::{Event, EventKind, Key};
pub use listener::{ListenerId, ListenerRegistry, ListenerScope, Listeners, Route};
pub use target::Target;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::event::{Event, EventKind, Key};
    pub use crate::listener::{ListenerId, ListenerScope, Listeners};
    pub use crate::target::Target;
}
