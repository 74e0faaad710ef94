use std::fmt::Debug;
use std::hash::Hash;

/// Upper bound on tree depth when walking towards the root.
const MAX_DEPTH: usize = 64;

/// A node events can be dispatched to.
///
/// Targets form a tree; events bubble from the target through each parent
/// until the root (the node with no parent).
pub trait Target: Copy + Eq + Hash + Debug {
    fn parent(&self) -> Option<Self>;

    /// Nodes visited while bubbling, starting with `self`.
    fn bubble_path(self) -> Vec<Self> {
        let mut path = vec![self];
        let mut current = self;
        while let Some(parent) = current.parent() {
            if path.len() >= MAX_DEPTH || path.contains(&parent) {
                log::warn!("Target tree cycle or depth overflow at {:?}", parent);
                break;
            }
            path.push(parent);
            current = parent;
        }
        path
    }
}
