//! Toolkit-independent key events and a registry for global shortcuts.
//!
//! Components subscribe a handler while mounted; the returned [`Subscription`]
//! removes it again when dropped.

use serde::Deserialize;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    ArrowUp,
    ArrowDown,
    Tab,
    Char(char),
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Enter" => Key::Enter,
            "Escape" | "Esc" => Key::Escape,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "Tab" => Key::Tab,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => Key::Other,
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
}

impl KeyPress {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            shift: false,
            ctrl: false,
            meta: false,
            alt: false,
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Ctrl+K on most platforms, Cmd+K on macOS.
    pub fn is_command_palette(&self) -> bool {
        (self.ctrl || self.meta) && matches!(self.key, Key::Char('k') | Key::Char('K'))
    }
}

/// The fields of a DOM `KeyboardEvent` forwarded from a document-level
/// listener.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomKeyEvent {
    pub key: String,
    #[serde(default)]
    pub shift_key: bool,
    #[serde(default)]
    pub ctrl_key: bool,
    #[serde(default)]
    pub meta_key: bool,
    #[serde(default)]
    pub alt_key: bool,
}

impl From<DomKeyEvent> for KeyPress {
    fn from(event: DomKeyEvent) -> Self {
        Self {
            key: Key::from_name(&event.key),
            shift: event.shift_key,
            ctrl: event.ctrl_key,
            meta: event.meta_key,
            alt: event.alt_key,
        }
    }
}

/// Returns `true` when it consumed the event.
pub type KeyHandler = Rc<dyn Fn(&KeyPress) -> bool>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: Vec<(u64, KeyHandler)>,
}

/// Shared list of global key handlers. Cloning shares the registry.
#[derive(Clone, Default)]
pub struct KeyDispatcher {
    registry: Rc<RefCell<Registry>>,
}

impl KeyDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: impl Fn(&KeyPress) -> bool + 'static) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.handlers.push((id, Rc::new(handler)));
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Offer the event to handlers, newest first, until one consumes it.
    pub fn dispatch(&self, press: &KeyPress) -> bool {
        // Snapshot so handlers may subscribe or unsubscribe while running.
        let handlers: Vec<KeyHandler> = self
            .registry
            .borrow()
            .handlers
            .iter()
            .rev()
            .map(|(_, handler)| handler.clone())
            .collect();
        handlers.iter().any(|handler| handler(press))
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keeps a handler registered until dropped.
#[must_use = "dropping a subscription unregisters its handler"]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .handlers
                .retain(|(id, _)| *id != self.id);
        }
    }
}
