//! Input events and document-level listeners.
//!
//! Pointer and key events arrive already normalized. A gesture or hotkey
//! handler only receives them while it holds a `ListenerGuard` for the
//! event kind; dropping the guard deregisters it, so a handler can never
//! outlive the session that registered it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// The platform command key: `ctrl` elsewhere, `meta` (⌘) on macOS.
    pub fn cmd(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer position in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A key press. `key` is the `KeyboardEvent.key` value (`"z"`, `"Backspace"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    pub fn plain(key: impl Into<String>) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

// ─── Document listeners ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    PointerMove,
    PointerUp,
    KeyDown,
}

#[derive(Debug, Default)]
struct Registry {
    next_token: u64,
    active: Vec<(u64, ListenerKind)>,
}

impl Registry {
    fn count(&self, kind: ListenerKind) -> usize {
        self.active.iter().filter(|(_, k)| *k == kind).count()
    }
}

/// Registry of listeners attached at document level. Cloning yields
/// another handle to the same registry.
#[derive(Debug, Clone, Default)]
pub struct DocumentListeners {
    inner: Rc<RefCell<Registry>>,
}

impl DocumentListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, kind: ListenerKind) -> ListenerGuard {
        let mut registry = self.inner.borrow_mut();
        let token = registry.next_token;
        registry.next_token += 1;
        registry.active.push((token, kind));
        ListenerGuard {
            registry: Rc::downgrade(&self.inner),
            token,
            kind,
        }
    }

    /// Like `subscribe`, but refused while another listener of the same
    /// kind is registered.
    pub fn subscribe_exclusive(&self, kind: ListenerKind) -> Option<ListenerGuard> {
        if self.inner.borrow().count(kind) > 0 {
            log::warn!("refused second {kind:?} listener");
            return None;
        }
        Some(self.subscribe(kind))
    }

    pub fn count(&self, kind: ListenerKind) -> usize {
        self.inner.borrow().count(kind)
    }

    pub fn is_listening(&self, kind: ListenerKind) -> bool {
        self.count(kind) > 0
    }

    /// Listeners of every kind.
    pub fn total(&self) -> usize {
        self.inner.borrow().active.len()
    }
}

/// Registration handle. Dropping it removes the listener.
#[derive(Debug)]
pub struct ListenerGuard {
    registry: Weak<RefCell<Registry>>,
    token: u64,
    kind: ListenerKind,
}

impl ListenerGuard {
    pub fn kind(&self) -> ListenerKind {
        self.kind
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        match registry.try_borrow_mut() {
            Ok(mut registry) => registry.active.retain(|(t, _)| *t != self.token),
            Err(_) => log::error!("listener {} leaked: registry busy", self.token),
        }
    }
}
