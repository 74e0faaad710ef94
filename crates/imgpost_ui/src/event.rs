//! Events dispatched to listeners.

use crate::Target;

/// Kind of event, mirroring the DOM event types the form reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Value of a control was committed (file chosen, radio switched).
    Change,
    /// Value of a control changed while editing (slider drag).
    Input,
    /// Pointer activation of a control.
    Click,
    /// Form submission.
    Submit,
    /// Keyboard key pressed.
    KeyDown,
}

/// Keyboard keys (simplified set for now).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    Space,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value to a key.
    ///
    /// Older browsers report `"Esc"` for the escape key.
    pub fn from_dom(name: &str) -> Option<Key> {
        let key = match name {
            "Escape" | "Esc" => Key::Escape,
            "Enter" => Key::Enter,
            "Backspace" => Key::Backspace,
            "Delete" => Key::Delete,
            "Tab" => Key::Tab,
            " " | "Spacebar" => Key::Space,
            "ArrowUp" => Key::Up,
            "ArrowDown" => Key::Down,
            "ArrowLeft" => Key::Left,
            "ArrowRight" => Key::Right,
            "Home" => Key::Home,
            "End" => Key::End,
            "PageUp" => Key::PageUp,
            "PageDown" => Key::PageDown,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

/// An event travelling from its target up to the root of the target tree.
///
/// Handlers can stop propagation to keep outer listeners from seeing the
/// event, and prevent the host's default action.
#[derive(Debug, Clone)]
pub struct Event<T> {
    target: T,
    kind: EventKind,
    key: Option<Key>,
    value: Option<String>,
    propagation_stopped: bool,
    default_prevented: bool,
}

impl<T: Target> Event<T> {
    /// Create a bare event of the given kind.
    pub fn new(target: T, kind: EventKind) -> Self {
        Self {
            target,
            kind,
            key: None,
            value: None,
            propagation_stopped: false,
            default_prevented: false,
        }
    }

    pub fn click(target: T) -> Self {
        Self::new(target, EventKind::Click)
    }

    pub fn change(target: T) -> Self {
        Self::new(target, EventKind::Change)
    }

    pub fn submit(target: T) -> Self {
        Self::new(target, EventKind::Submit)
    }

    /// Slider or text input carrying the control's new value.
    pub fn input(target: T, value: impl Into<String>) -> Self {
        Self::new(target, EventKind::Input).with_value(value)
    }

    pub fn key_down(target: T, key: Key) -> Self {
        let mut event = Self::new(target, EventKind::KeyDown);
        event.key = Some(key);
        event
    }

    /// Attach the control's value (checked radio, slider position).
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn target(&self) -> T {
        self.target
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn key(&self) -> Option<Key> {
        self.key
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// True for a key-down of the escape key.
    pub fn is_escape(&self) -> bool {
        self.kind == EventKind::KeyDown && self.key == Some(Key::Escape)
    }

    /// Keep listeners on ancestor targets from receiving this event.
    /// Remaining listeners on the current target still run.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Suppress the host's default action (navigation on submit).
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}
