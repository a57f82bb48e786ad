//! Configurable hotkeys for delete, undo and redo.
//!
//! Bindings are written as `"ctrl+shift+z"`, `"cmd+y"` or a bare key name
//! like `"Backspace"`. `ctrl`, `cmd` and `meta` all mean the platform
//! command key, matching either Ctrl or ⌘. A combo with modifiers needs
//! exactly those modifiers, so `ctrl+z` never fires on Ctrl+Shift+Z. A bare
//! key fires whatever modifiers are held: Shift+Backspace still deletes.

use crate::error::{EditorError, Result};
use crate::host::HostRuntime;
use crate::input::{DocumentListeners, KeyEvent, ListenerGuard, ListenerKind};
use crate::selection::SelectionTracker;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use winnow::ascii::space0;
use winnow::combinator::{delimited, separated};
use winnow::prelude::*;
use winnow::token::take_while;

// ─── Key combinations ────────────────────────────────────────────────────

/// A key plus required modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    key: String,
    cmd: bool,
    shift: bool,
    alt: bool,
}

fn combo_part<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    delimited(
        space0,
        take_while(1.., |c: char| c != '+' && !c.is_whitespace()),
        space0,
    )
    .parse_next(input)
}

fn combo_parts<'a>(input: &mut &'a str) -> ModalResult<Vec<&'a str>> {
    separated(1.., combo_part, '+').parse_next(input)
}

impl KeyCombo {
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: String| EditorError::KeyCombo {
            input: input.to_string(),
            reason,
        };
        let parts = combo_parts.parse(input).map_err(|e| invalid(e.to_string()))?;

        let mut combo = Self {
            key: String::new(),
            cmd: false,
            shift: false,
            alt: false,
        };
        for part in parts {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" | "cmd" | "command" | "meta" | "mod" => combo.cmd = true,
                "shift" => combo.shift = true,
                "alt" | "option" => combo.alt = true,
                _ if !combo.key.is_empty() => {
                    return Err(invalid(format!("more than one key (`{}`, `{part}`)", combo.key)));
                }
                "del" => combo.key = "Delete".into(),
                "esc" => combo.key = "Escape".into(),
                _ => combo.key = part.to_string(),
            }
        }
        if combo.key.is_empty() {
            return Err(invalid("no key, only modifiers".into()));
        }
        Ok(combo)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn is_bare(&self) -> bool {
        !(self.cmd || self.shift || self.alt)
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        if !event.key.eq_ignore_ascii_case(&self.key) {
            return false;
        }
        self.is_bare()
            || (event.modifiers.cmd() == self.cmd
                && event.modifiers.shift == self.shift
                && event.modifiers.alt == self.alt)
    }
}

impl FromStr for KeyCombo {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cmd {
            f.write_str("ctrl+")?;
        }
        if self.alt {
            f.write_str("alt+")?;
        }
        if self.shift {
            f.write_str("shift+")?;
        }
        f.write_str(&self.key)
    }
}

impl Serialize for KeyCombo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeyCombo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(<D::Error as DeError>::custom)
    }
}

// ─── Bindings ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    Delete,
    Undo,
    Redo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyBindings {
    pub delete: KeyCombo,
    pub undo: KeyCombo,
    pub redo: KeyCombo,
}

impl Default for HotkeyBindings {
    fn default() -> Self {
        let combo = |key: &str, cmd: bool, shift: bool| KeyCombo {
            key: key.to_string(),
            cmd,
            shift,
            alt: false,
        };
        Self {
            delete: combo("Backspace", false, false),
            undo: combo("z", true, false),
            redo: combo("z", true, true),
        }
    }
}

impl HotkeyBindings {
    /// Key the bindings are persisted under.
    pub const STORE_KEY: &'static str = "customHotkeys";

    /// Stored bindings, or the defaults when nothing usable is stored.
    pub fn load(store: &dyn BindingStore) -> Self {
        let text = match store.read(Self::STORE_KEY) {
            Ok(Some(text)) => text,
            Ok(None) => return Self::default(),
            Err(err) => {
                log::warn!("hotkeys unreadable, using defaults: {err}");
                return Self::default();
            }
        };
        serde_json::from_str(&text).unwrap_or_else(|err| {
            log::warn!("stored hotkeys are corrupt, using defaults: {err}");
            Self::default()
        })
    }

    pub fn save(&self, store: &mut dyn BindingStore) -> Result<()> {
        store.write(Self::STORE_KEY, &serde_json::to_string(self)?)
    }

    /// First action bound to `event`, checked in delete, undo, redo order.
    pub fn resolve(&self, event: &KeyEvent) -> Option<HotkeyAction> {
        [
            (&self.delete, HotkeyAction::Delete),
            (&self.undo, HotkeyAction::Undo),
            (&self.redo, HotkeyAction::Redo),
        ]
        .into_iter()
        .find(|(combo, _)| combo.matches(event))
        .map(|(_, action)| action)
    }
}

// ─── Durable storage ─────────────────────────────────────────────────────

/// A small local key-value store.
pub trait BindingStore {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BindingStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl BindingStore for JsonFileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(EditorError::io(path, e)),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| EditorError::io(&self.dir, e))?;
        let path = self.path_for(key);
        std::fs::write(&path, value).map_err(|e| EditorError::io(path, e))
    }
}

// ─── Dispatcher ──────────────────────────────────────────────────────────

/// Result of offering a key press to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The action ran; default handling should be suppressed.
    Handled(HotkeyAction),
    /// Not ours; let the key through.
    PassThrough,
}

/// Routes key presses to delete / undo / redo. Only a mounted dispatcher
/// reacts, and at most one dispatcher can be mounted per document.
#[derive(Debug)]
pub struct HotkeyDispatcher {
    bindings: HotkeyBindings,
    listener: Option<ListenerGuard>,
}

impl HotkeyDispatcher {
    pub fn new(bindings: HotkeyBindings) -> Self {
        Self {
            bindings,
            listener: None,
        }
    }

    pub fn bindings(&self) -> &HotkeyBindings {
        &self.bindings
    }

    pub fn set_bindings(&mut self, bindings: HotkeyBindings) {
        self.bindings = bindings;
    }

    /// Register the document-level key listener. Refused while another
    /// dispatcher holds it.
    pub fn mount(&mut self, listeners: &DocumentListeners) -> bool {
        if self.listener.is_some() {
            return true;
        }
        self.listener = listeners.subscribe_exclusive(ListenerKind::KeyDown);
        self.listener.is_some()
    }

    pub fn unmount(&mut self) {
        self.listener = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.listener.is_some()
    }

    pub fn handle_key<H: HostRuntime>(
        &self,
        host: &mut H,
        selection: &mut SelectionTracker,
        event: &KeyEvent,
    ) -> KeyOutcome {
        if !self.is_mounted() {
            return KeyOutcome::PassThrough;
        }
        let Some(action) = self.bindings.resolve(event) else {
            return KeyOutcome::PassThrough;
        };

        match action {
            HotkeyAction::Delete => {
                let target = selection.selected_id(&*host).or_else(|| host.selected());
                match target {
                    Some(id) if host.is_deletable(id) => {
                        host.delete(id);
                        selection.on_node_deleted(id);
                        log::debug!("deleted {id} via hotkey");
                        KeyOutcome::Handled(action)
                    }
                    _ => KeyOutcome::PassThrough,
                }
            }
            HotkeyAction::Undo => {
                host.undo();
                KeyOutcome::Handled(action)
            }
            HotkeyAction::Redo => {
                host.redo();
                KeyOutcome::Handled(action)
            }
        }
    }
}
