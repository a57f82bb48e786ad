//! The editor facade.
//!
//! `Editor` owns one document and one host runtime and is the only place
//! the controllers meet: input lands here, is routed to the gesture
//! controller or hotkey dispatcher, and every tree-changing action is
//! reported to the serialization bridge with the caller's timestamp.

use crate::bridge::SerializationBridge;
use crate::config::EditorConfig;
use crate::error::Result;
use crate::gesture::GestureController;
use crate::hotkeys::{BindingStore, HotkeyBindings, HotkeyDispatcher, JsonFileStore, KeyOutcome, MemoryStore};
use crate::host::{HostRuntime, MemoryHost};
use crate::input::{DocumentListeners, KeyEvent, ListenerKind, PointerEvent};
use crate::media::{self, MediaUpload};
use crate::selection::{ComponentProperties, SelectionCause, SelectionTracker};
use folio_core::{DocumentStore, NodeId, PageId, PropValue, ResizeHandle, Size};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub struct Editor<H: HostRuntime> {
    config: EditorConfig,
    store: DocumentStore,
    host: H,
    listeners: DocumentListeners,
    selection: SelectionTracker,
    gestures: GestureController,
    bridge: SerializationBridge,
    hotkeys: HotkeyDispatcher,
    binding_store: Box<dyn BindingStore>,
}

impl Editor<MemoryHost> {
    /// An editor over an in-memory host sized from `config`.
    pub fn headless(config: EditorConfig) -> Self {
        let host = MemoryHost::new(config.history_depth);
        Self::new(host, config)
    }
}

impl<H: HostRuntime> Editor<H> {
    /// A fresh document on `host`. Hotkeys come from the configured
    /// directory when there is one.
    pub fn new(host: H, config: EditorConfig) -> Self {
        let binding_store: Box<dyn BindingStore> = match &config.hotkey_store_dir {
            Some(dir) => Box::new(JsonFileStore::new(dir)),
            None => Box::new(MemoryStore::new()),
        };
        Self::with_parts(host, config, DocumentStore::new(), binding_store)
    }

    /// An editor over an existing document. The active page is loaded
    /// into the host immediately; if it cannot be decoded the editor opens
    /// on the host's current canvas and that page is never autosaved.
    pub fn with_parts(
        host: H,
        config: EditorConfig,
        store: DocumentStore,
        binding_store: Box<dyn BindingStore>,
    ) -> Self {
        let listeners = DocumentListeners::new();
        let mut hotkeys = HotkeyDispatcher::new(HotkeyBindings::load(binding_store.as_ref()));
        hotkeys.mount(&listeners);

        let mut editor = Self {
            bridge: SerializationBridge::new(config.autosave_debounce()),
            gestures: GestureController::new(listeners.clone()),
            config,
            store,
            host,
            listeners,
            selection: SelectionTracker::new(),
            hotkeys,
            binding_store,
        };
        if let Err(err) = editor.bridge.sync_active_page(&mut editor.store, &mut editor.host) {
            log::warn!("opened without loading page {}: {err}", editor.store.current_page_id());
        }
        editor
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Direct host access for host-driven edits (toolbox drops). Report
    /// them with `content_changed`.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn listeners(&self) -> &DocumentListeners {
        &self.listeners
    }

    pub fn bridge(&self) -> &SerializationBridge {
        &self.bridge
    }

    pub fn is_resizing(&self) -> bool {
        self.gestures.is_active()
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn selected_id(&mut self) -> Option<NodeId> {
        self.selection.selected_id(&self.host)
    }

    pub fn is_component_selected(&mut self, id: NodeId) -> bool {
        self.selection.is_component_selected(&self.host, id)
    }

    pub fn select_component(&mut self, id: NodeId) -> bool {
        self.selection.select_component(&mut self.host, id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear_selection(&mut self.host);
    }

    /// Click on the canvas: a node, or empty space (`None`).
    pub fn canvas_click(&mut self, target: Option<NodeId>) {
        self.selection
            .observe_host_event(&mut self.host, target, SelectionCause::UserCanvasClick);
    }

    pub fn host_selection_event(&mut self, id: Option<NodeId>, cause: SelectionCause) {
        self.selection.observe_host_event(&mut self.host, id, cause);
    }

    pub fn component_properties(&mut self, id: Option<NodeId>) -> Option<ComponentProperties> {
        self.selection.get_component_properties(&self.host, id)
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    pub fn pointer_down_on_handle(
        &mut self,
        node: NodeId,
        handle: ResizeHandle,
        event: &PointerEvent,
    ) -> bool {
        self.gestures.begin_resize(&mut self.host, node, handle, event)
    }

    pub fn pointer_move(&mut self, event: &PointerEvent, now: Instant) -> Option<Size> {
        if !self.listeners.is_listening(ListenerKind::PointerMove) {
            return None;
        }
        let size = self.gestures.on_pointer_move(&mut self.host, event)?;
        self.bridge.notify_tree_changed(now);
        Some(size)
    }

    pub fn pointer_up(&mut self) -> bool {
        if !self.listeners.is_listening(ListenerKind::PointerUp) {
            return false;
        }
        self.gestures.end_resize(&mut self.host)
    }

    /// The pointer left the window mid-drag.
    pub fn pointer_leave(&mut self) -> bool {
        self.gestures.cancel(&mut self.host)
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    pub fn key_down(&mut self, event: &KeyEvent, now: Instant) -> KeyOutcome {
        let outcome = self
            .hotkeys
            .handle_key(&mut self.host, &mut self.selection, event);
        if matches!(outcome, KeyOutcome::Handled(_)) {
            self.bridge.notify_tree_changed(now);
        }
        outcome
    }

    pub fn hotkeys(&self) -> &HotkeyBindings {
        self.hotkeys.bindings()
    }

    /// Replace the bindings and persist them.
    pub fn set_hotkeys(&mut self, bindings: HotkeyBindings) -> Result<()> {
        bindings.save(self.binding_store.as_mut())?;
        self.hotkeys.set_bindings(bindings);
        Ok(())
    }

    pub fn mount_hotkeys(&mut self) -> bool {
        self.hotkeys.mount(&self.listeners)
    }

    pub fn unmount_hotkeys(&mut self) {
        self.hotkeys.unmount();
    }

    // ─── Node edits ──────────────────────────────────────────────────────

    /// The host changed the tree on its own (drag-and-drop insertion).
    pub fn content_changed(&mut self, now: Instant) {
        self.bridge.notify_tree_changed(now);
    }

    pub fn set_prop(&mut self, id: NodeId, key: &str, value: PropValue, now: Instant) -> bool {
        let changed = self
            .host
            .set_prop(id, &mut |props| props.set(key, value.clone()));
        if changed {
            self.bridge.notify_tree_changed(now);
        }
        changed
    }

    pub fn set_hidden(&mut self, id: NodeId, hidden: bool, now: Instant) -> bool {
        let changed = self.host.set_hidden(id, hidden);
        if changed {
            self.bridge.notify_tree_changed(now);
        }
        changed
    }

    /// Delete a node, if its `deletable` flag allows it.
    pub fn delete_node(&mut self, id: NodeId, now: Instant) -> bool {
        if !self.host.is_deletable(id) || !self.host.delete(id) {
            return false;
        }
        self.selection.on_node_deleted(id);
        self.bridge.notify_tree_changed(now);
        true
    }

    pub fn undo(&mut self, now: Instant) -> bool {
        let undone = self.host.undo();
        if undone {
            self.bridge.notify_tree_changed(now);
        }
        undone
    }

    pub fn redo(&mut self, now: Instant) -> bool {
        let redone = self.host.redo();
        if redone {
            self.bridge.notify_tree_changed(now);
        }
        redone
    }

    /// A media file read finished for `node`.
    pub fn complete_media_upload(
        &mut self,
        node: NodeId,
        upload: &MediaUpload,
        now: Instant,
    ) -> Result<bool> {
        let applied = media::complete_upload(&mut self.host, node, upload)?;
        if applied {
            self.bridge.notify_tree_changed(now);
        }
        Ok(applied)
    }

    pub fn clear_media(&mut self, node: NodeId, now: Instant) -> bool {
        let cleared = media::clear_media(&mut self.host, node);
        if cleared {
            self.bridge.notify_tree_changed(now);
        }
        cleared
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Drive the autosave clock. True when a save was written.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.bridge.tick(&mut self.store, &self.host, now)
    }

    /// Write any pending save immediately.
    pub fn save_now(&mut self) -> bool {
        self.bridge.flush(&mut self.store, &self.host)
    }

    pub fn export_page(&self) -> String {
        self.bridge.export_blob(&self.host)
    }

    pub fn import_page(&mut self, text: &str) -> Result<()> {
        self.gestures.cancel(&mut self.host);
        self.bridge.import_blob(&mut self.store, &mut self.host, text)?;
        self.selection.reset();
        Ok(())
    }

    pub fn export_page_to_file(&self, path: &Path) -> Result<PathBuf> {
        self.bridge.export_to_file(&self.host, path)
    }

    pub fn import_page_from_file(&mut self, path: &Path) -> Result<()> {
        self.gestures.cancel(&mut self.host);
        self.bridge
            .import_from_file(&mut self.store, &mut self.host, path)?;
        self.selection.reset();
        Ok(())
    }

    // ─── Pages ───────────────────────────────────────────────────────────

    /// Load the active page if it changed. Ends any drag and drops the
    /// selection, which belonged to the previous tree.
    fn sync(&mut self) -> Result<bool> {
        if self.bridge.loaded_page() == Some(self.store.current_page_id()) {
            return Ok(false);
        }
        self.gestures.cancel(&mut self.host);
        self.selection.reset();
        self.bridge.sync_active_page(&mut self.store, &mut self.host)
    }

    pub fn add_page(&mut self, title: Option<&str>) -> Result<PageId> {
        let id = self.store.add_page(title);
        self.sync()?;
        Ok(id)
    }

    /// Delete a page. Unsaved edits of the deleted page are dropped with
    /// it; a refused delete keeps them.
    pub fn delete_page(&mut self, id: &PageId) -> Result<bool> {
        if !self.store.delete_page(id) {
            return Ok(false);
        }
        self.bridge.discard_pending_for(id);
        self.sync()?;
        Ok(true)
    }

    /// Duplicate a page, including edits not yet autosaved.
    pub fn duplicate_page(&mut self, id: &PageId) -> Result<Option<PageId>> {
        self.save_now();
        let Some(copy) = self.store.duplicate_page(id) else {
            return Ok(None);
        };
        self.sync()?;
        Ok(Some(copy))
    }

    pub fn set_current_page(&mut self, id: &PageId) -> Result<bool> {
        if !self.store.set_current_page(id) {
            return Ok(false);
        }
        self.sync()
    }

    pub fn next_page(&mut self) -> Result<bool> {
        if !self.store.next_page() {
            return Ok(false);
        }
        self.sync()
    }

    pub fn prev_page(&mut self) -> Result<bool> {
        if !self.store.prev_page() {
            return Ok(false);
        }
        self.sync()
    }

    pub fn rename_page(&mut self, id: &PageId, title: &str) -> bool {
        self.store.rename_page(id, title)
    }

    pub fn reorder_pages(&mut self, from: usize, to: usize) -> bool {
        self.store.reorder_pages(from, to)
    }
}
