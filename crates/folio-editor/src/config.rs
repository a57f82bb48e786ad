use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Editor configuration. Every field has a default, so a partial JSON
/// document (or `{}`) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Quiet period after the last tree change before the active page is
    /// saved. Default: **1000**.
    pub autosave_debounce_ms: u64,

    /// Undo steps kept by the in-memory host. Default: **200**.
    pub history_depth: usize,

    /// Directory for persisted hotkey bindings. `None` keeps them in
    /// memory for the session only.
    pub hotkey_store_dir: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_debounce_ms: 1000,
            history_depth: 200,
            hotkey_store_dir: None,
        }
    }
}

impl EditorConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}
