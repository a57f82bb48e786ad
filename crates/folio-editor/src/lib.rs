pub mod bridge;
pub mod config;
pub mod editor;
pub mod error;
pub mod gesture;
pub mod hotkeys;
pub mod host;
pub mod input;
pub mod media;
pub mod selection;

pub use bridge::SerializationBridge;
pub use config::EditorConfig;
pub use editor::Editor;
pub use error::{EditorError, Result};
pub use gesture::{GestureController, GestureSession};
pub use hotkeys::{
    BindingStore, HotkeyAction, HotkeyBindings, HotkeyDispatcher, JsonFileStore, KeyCombo,
    KeyOutcome, MemoryStore,
};
pub use host::{History, HostRuntime, MemoryHost, NodeSnapshot, TreeMutator, TreeQuery};
pub use input::{DocumentListeners, KeyEvent, ListenerGuard, ListenerKind, Modifiers, PointerEvent};
pub use media::MediaUpload;
pub use selection::{ComponentProperties, SelectionCause, SelectionTracker};
