//! Listener registry and scoped activation.
//!
//! The registry is the single source of truth for which handlers are live.
//! A host forwards every raw event to its controller, which asks the
//! registry for the [`Route`] of that event and runs only the handlers
//! found there.
//!
//! [`ListenerScope`] pairs every attach with exactly one detach: whatever a
//! scope attached is removed when the scope is dropped, so a component that
//! keeps its listeners in a scope cannot leak them across activations.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::{Event, EventKind, Target};

/// Identifies one attached listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Debug, Clone)]
struct Entry<T, H> {
    id: ListenerId,
    target: T,
    kind: EventKind,
    handler: H,
}

/// Flat list of attached listeners in attach order.
#[derive(Debug, Clone)]
pub struct ListenerRegistry<T, H> {
    entries: Vec<Entry<T, H>>,
    next_id: u64,
}

impl<T, H> Default for ListenerRegistry<T, H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T: Target, H: Copy + fmt::Debug> ListenerRegistry<T, H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `handler` for `kind` events reaching `target`.
    ///
    /// Attaching the same triple twice registers two listeners; callers are
    /// expected to pair each attach with its own detach.
    pub fn attach(&mut self, target: T, kind: EventKind, handler: H) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        log::trace!("attach {:?} {:?} on {:?} as {:?}", handler, kind, target, id);
        self.entries.push(Entry {
            id,
            target,
            kind,
            handler,
        });
        id
    }

    /// Remove a listener. Returns false if it was not attached.
    pub fn detach(&mut self, id: ListenerId) -> bool {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                let entry = self.entries.remove(index);
                log::trace!(
                    "detach {:?} {:?} on {:?} ({:?})",
                    entry.handler,
                    entry.kind,
                    entry.target,
                    id
                );
                true
            }
            None => false,
        }
    }

    pub fn is_attached(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Total number of attached listeners.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of listeners attached to a single target.
    pub fn count_on(&self, target: T) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.target == target)
            .count()
    }

    /// Listeners that will see `event`, innermost target first.
    pub fn route(&self, event: &Event<T>) -> Route<T, H> {
        let mut hops = Vec::new();
        for node in event.target().bubble_path() {
            hops.extend(
                self.entries
                    .iter()
                    .filter(|entry| entry.target == node && entry.kind == event.kind())
                    .map(|entry| (node, entry.id, entry.handler)),
            );
        }
        Route { hops }
    }
}

/// Snapshot of the listeners an event will visit.
///
/// The snapshot is taken before any handler runs. Handlers may detach
/// listeners further along the route, so callers should check
/// [`Listeners::is_attached`] before invoking each hop.
#[derive(Debug, Clone)]
pub struct Route<T, H> {
    hops: Vec<(T, ListenerId, H)>,
}

impl<T, H> Route<T, H> {
    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }
}

impl<T, H> IntoIterator for Route<T, H> {
    type Item = (T, ListenerId, H);
    type IntoIter = std::vec::IntoIter<(T, ListenerId, H)>;

    fn into_iter(self) -> Self::IntoIter {
        self.hops.into_iter()
    }
}

/// Shared handle to a listener registry.
///
/// Cloning the handle shares the registry; components receive a clone so
/// they can open their own scopes.
pub struct Listeners<T, H> {
    inner: Rc<RefCell<ListenerRegistry<T, H>>>,
}

impl<T, H> Clone for Listeners<T, H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T, H> Default for Listeners<T, H> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ListenerRegistry::default())),
        }
    }
}

impl<T: Target, H: Copy + fmt::Debug> Listeners<T, H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an empty scope on this registry.
    pub fn scope(&self) -> ListenerScope<T, H> {
        ListenerScope {
            registry: self.clone(),
            ids: Vec::new(),
        }
    }

    /// Attach a listener outside any scope. The caller owns the detach.
    pub fn attach(&self, target: T, kind: EventKind, handler: H) -> ListenerId {
        self.inner.borrow_mut().attach(target, kind, handler)
    }

    pub fn detach(&self, id: ListenerId) -> bool {
        self.inner.borrow_mut().detach(id)
    }

    pub fn is_attached(&self, id: ListenerId) -> bool {
        self.inner.borrow().is_attached(id)
    }

    /// Total number of attached listeners.
    pub fn active_count(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn count_on(&self, target: T) -> usize {
        self.inner.borrow().count_on(target)
    }

    pub fn route(&self, event: &Event<T>) -> Route<T, H> {
        self.inner.borrow().route(event)
    }
}

impl<T, H> fmt::Debug for Listeners<T, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let active = self.inner.try_borrow().map(|r| r.entries.len()).ok();
        f.debug_struct("Listeners").field("active", &active).finish()
    }
}

/// Listeners attached for the lifetime of one activation.
///
/// Dropping the scope detaches every listener it attached, in reverse order.
pub struct ListenerScope<T: Target, H: Copy + fmt::Debug> {
    registry: Listeners<T, H>,
    ids: Vec<ListenerId>,
}

impl<T: Target, H: Copy + fmt::Debug> ListenerScope<T, H> {
    /// Attach a listener owned by this scope.
    pub fn listen(&mut self, target: T, kind: EventKind, handler: H) -> ListenerId {
        let id = self.registry.attach(target, kind, handler);
        self.ids.push(id);
        id
    }

    /// Number of listeners owned by this scope.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Detach everything now. Equivalent to dropping the scope.
    pub fn release(self) {}
}

impl<T: Target, H: Copy + fmt::Debug> Drop for ListenerScope<T, H> {
    fn drop(&mut self) {
        for id in self.ids.drain(..).rev() {
            if !self.registry.detach(id) {
                log::warn!("Listener {:?} was already detached", id);
            }
        }
    }
}

impl<T: Target, H: Copy + fmt::Debug> fmt::Debug for ListenerScope<T, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerScope")
            .field("ids", &self.ids)
            .finish()
    }
}
