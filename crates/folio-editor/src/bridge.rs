//! Moves page content between the document store and the host runtime.
//!
//! Loading happens once per change of the active page id. Saving is
//! debounced: every tree change pushes the deadline out by the debounce
//! window, and only the state at the deadline is written. Time is always
//! passed in, so callers (and tests) drive the clock.

use crate::error::{EditorError, Result};
use crate::host::HostRuntime;
use folio_core::{DocumentStore, PageId, PageUpdate};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct PendingSave {
    page: PageId,
    due: Instant,
}

#[derive(Debug)]
pub struct SerializationBridge {
    debounce: Duration,
    /// Page whose content the host currently holds (or last tried to load).
    loaded: Option<PageId>,
    /// The last load failed; the host does not hold `loaded`'s content,
    /// so nothing may be saved under its id.
    load_failed: bool,
    pending: Option<PendingSave>,
    saves: u64,
}

impl SerializationBridge {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            loaded: None,
            load_failed: false,
            pending: None,
            saves: 0,
        }
    }

    pub fn loaded_page(&self) -> Option<&PageId> {
        self.loaded.as_ref()
    }

    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    pub fn has_pending_save(&self) -> bool {
        self.pending.is_some()
    }

    /// Saves written so far.
    pub fn save_count(&self) -> u64 {
        self.saves
    }

    /// Load the active page into the host if it changed since the last
    /// call. A pending save for the previous page is flushed first. On a
    /// decode failure the host keeps its tree and the error is returned;
    /// the transition still counts, so it is not retried.
    pub fn sync_active_page<H: HostRuntime>(
        &mut self,
        store: &mut DocumentStore,
        host: &mut H,
    ) -> Result<bool> {
        let active = store.current_page_id().clone();
        if self.loaded.as_ref() == Some(&active) {
            return Ok(false);
        }
        self.flush(store, host);
        self.loaded = Some(active.clone());

        let content = store
            .page(&active)
            .map(|p| p.content.clone())
            .ok_or_else(|| EditorError::PageNotFound(active.clone()))?;
        match host.deserialize(&content) {
            Ok(()) => {
                self.load_failed = false;
                log::debug!("loaded page {active}");
                Ok(true)
            }
            Err(err) => {
                self.load_failed = true;
                log::error!("failed to load page {active}: {err}");
                Err(err.into())
            }
        }
    }

    /// Record a tree change at `now`. Restarts the debounce window.
    pub fn notify_tree_changed(&mut self, now: Instant) {
        let Some(page) = self.loaded.clone() else {
            return;
        };
        if self.load_failed {
            log::warn!("change on page {page} ignored: its content never loaded");
            return;
        }
        self.pending = Some(PendingSave {
            page,
            due: now + self.debounce,
        });
    }

    /// Write the pending save if its window has elapsed.
    pub fn tick<H: HostRuntime>(&mut self, store: &mut DocumentStore, host: &H, now: Instant) -> bool {
        let due = self.pending.as_ref().is_some_and(|p| now >= p.due);
        due && self.flush(store, host)
    }

    /// Write the pending save now, if any.
    pub fn flush<H: HostRuntime>(&mut self, store: &mut DocumentStore, host: &H) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        let written = store.update_page(&pending.page, PageUpdate::content(host.serialize()));
        if written {
            self.saves += 1;
            log::debug!("saved page {}", pending.page);
        }
        written
    }

    /// Drop a pending save for `page` (the page is being deleted).
    pub fn discard_pending_for(&mut self, page: &PageId) {
        if self.pending.as_ref().is_some_and(|p| &p.page == page) {
            self.pending = None;
        }
    }

    // ─── Export / import ─────────────────────────────────────────────────

    /// The host's current tree, exactly as the host serializes it.
    pub fn export_blob<H: HostRuntime>(&self, host: &H) -> String {
        host.serialize()
    }

    /// Replace the active page with `text`: the host loads it, then the
    /// store records `text` as given. Any pending save is superseded.
    pub fn import_blob<H: HostRuntime>(
        &mut self,
        store: &mut DocumentStore,
        host: &mut H,
        text: &str,
    ) -> Result<()> {
        host.deserialize(text)?;

        let active = store.current_page_id().clone();
        self.pending = None;
        self.loaded = Some(active.clone());
        self.load_failed = false;
        store.update_page(&active, PageUpdate::content(text));
        log::debug!("imported content into page {active}");
        Ok(())
    }

    /// Write the host's tree to `path`, adding a `.json` extension when it
    /// has none. Returns the path written.
    pub fn export_to_file<H: HostRuntime>(&self, host: &H, path: &Path) -> Result<PathBuf> {
        let path = if path.extension().is_none() {
            path.with_extension("json")
        } else {
            path.to_path_buf()
        };
        let text = self.export_blob(host);
        std::fs::write(&path, text).map_err(|e| EditorError::io(&path, e))?;
        Ok(path)
    }

    pub fn import_from_file<H: HostRuntime>(
        &mut self,
        store: &mut DocumentStore,
        host: &mut H,
        path: &Path,
    ) -> Result<()> {
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if !is_json {
            return Err(EditorError::NotJson(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|e| EditorError::io(path, e))?;
        self.import_blob(store, host, &text)
    }
}
