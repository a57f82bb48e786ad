//! The multi-page document store.
//!
//! Holds the ordered page list and the active page pointer. Two invariants
//! hold after every operation: at least one page exists, and the active id
//! names one of them. Operations that would break either are no-ops.

use crate::id::PageId;
use crate::page::{Page, PageUpdate};

#[derive(Debug, Clone)]
pub struct DocumentStore {
    pages: Vec<Page>,
    current: PageId,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    /// Id of the page every new document starts with.
    pub const FIRST_PAGE_ID: &'static str = "page-1";

    /// A document with a single "Introduction" page.
    pub fn new() -> Self {
        let first = Page::new(PageId::new(Self::FIRST_PAGE_ID), "Introduction");
        Self {
            current: first.id.clone(),
            pages: vec![first],
        }
    }

    /// A document from existing pages. `None` when `pages` is empty.
    pub fn from_pages(pages: Vec<Page>) -> Option<Self> {
        let current = pages.first()?.id.clone();
        Some(Self { pages, current })
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn page(&self, id: &PageId) -> Option<&Page> {
        self.pages.iter().find(|p| &p.id == id)
    }

    pub fn current_page_id(&self) -> &PageId {
        &self.current
    }

    pub fn current_index(&self) -> usize {
        self.index_of(&self.current).unwrap_or(0)
    }

    pub fn current_page(&self) -> &Page {
        &self.pages[self.current_index()]
    }

    pub fn can_go_next(&self) -> bool {
        self.current_index() + 1 < self.pages.len()
    }

    pub fn can_go_prev(&self) -> bool {
        self.current_index() > 0
    }

    fn index_of(&self, id: &PageId) -> Option<usize> {
        self.pages.iter().position(|p| &p.id == id)
    }

    /// Append a page with default content and make it active. The default
    /// title is `Page {n}`, n being its 1-based position.
    pub fn add_page(&mut self, title: Option<&str>) -> PageId {
        let title = match title {
            Some(t) if !t.trim().is_empty() => t.to_string(),
            _ => format!("Page {}", self.pages.len() + 1),
        };
        let page = Page::new(PageId::fresh(), title);
        let id = page.id.clone();
        log::debug!("add page {id} \"{}\"", page.title);
        self.pages.push(page);
        self.current = id.clone();
        id
    }

    /// Delete a page. Refused when it is the last one. If the active page
    /// goes, the page after it (by its old index) becomes active, else the
    /// one before.
    pub fn delete_page(&mut self, id: &PageId) -> bool {
        if self.pages.len() <= 1 {
            return false;
        }
        let Some(index) = self.index_of(id) else {
            return false;
        };

        if &self.current == id {
            let fallback = self
                .pages
                .get(index + 1)
                .or_else(|| index.checked_sub(1).and_then(|i| self.pages.get(i)));
            if let Some(next) = fallback {
                self.current = next.id.clone();
            }
        }
        let removed = self.pages.remove(index);
        log::debug!("deleted page {} \"{}\"", removed.id, removed.title);
        true
    }

    /// Merge `update` into the page. Unknown ids are ignored.
    pub fn update_page(&mut self, id: &PageId, update: PageUpdate) -> bool {
        match self.pages.iter_mut().find(|p| &p.id == id) {
            Some(page) => {
                page.apply(update);
                true
            }
            None => {
                log::warn!("update for unknown page {id} ignored");
                false
            }
        }
    }

    /// Rename from the pages panel. Titles are trimmed; blank ones ignored.
    pub fn rename_page(&mut self, id: &PageId, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        self.update_page(id, PageUpdate::title(title))
    }

    /// Append a copy of the page with a fresh id and make it active.
    pub fn duplicate_page(&mut self, id: &PageId) -> Option<PageId> {
        let source = self.page(id)?;
        let mut copy = Page::new(PageId::fresh(), format!("{} (Copy)", source.title));
        copy.content = source.content.clone();
        let new_id = copy.id.clone();
        self.pages.push(copy);
        self.current = new_id.clone();
        Some(new_id)
    }

    pub fn set_current_page(&mut self, id: &PageId) -> bool {
        if self.index_of(id).is_none() {
            log::warn!("cannot activate unknown page {id}");
            return false;
        }
        self.current = id.clone();
        true
    }

    pub fn next_page(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }
        self.current = self.pages[self.current_index() + 1].id.clone();
        true
    }

    pub fn prev_page(&mut self) -> bool {
        if !self.can_go_prev() {
            return false;
        }
        self.current = self.pages[self.current_index() - 1].id.clone();
        true
    }

    /// Move the page at `from` so it ends up at `to`. The active page stays
    /// the same page.
    pub fn reorder_pages(&mut self, from: usize, to: usize) -> bool {
        let len = self.pages.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let page = self.pages.remove(from);
        self.pages.insert(to, page);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn titles(store: &DocumentStore) -> Vec<&str> {
        store.pages().iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn starts_with_introduction() {
        let store = DocumentStore::new();
        assert_eq!(titles(&store), vec!["Introduction"]);
        assert_eq!(store.current_page_id().as_str(), "page-1");
        assert!(!store.can_go_next());
        assert!(!store.can_go_prev());
    }

    #[test]
    fn add_page_defaults_title_and_activates() {
        let mut store = DocumentStore::new();
        let id = store.add_page(None);
        assert_eq!(store.current_page_id(), &id);
        assert_eq!(store.current_page().title, "Page 2");
        store.add_page(Some("Pricing"));
        assert_eq!(titles(&store), vec!["Introduction", "Page 2", "Pricing"]);
    }

    #[test]
    fn last_page_cannot_be_deleted() {
        let mut store = DocumentStore::new();
        let only = store.current_page_id().clone();
        assert!(!store.delete_page(&only));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn deleting_active_prefers_next_then_previous() {
        let mut store = DocumentStore::new();
        let first = store.current_page_id().clone();
        let second = store.add_page(None);
        let third = store.add_page(None);

        store.set_current_page(&second);
        assert!(store.delete_page(&second));
        assert_eq!(store.current_page_id(), &third);

        assert!(store.delete_page(&third));
        assert_eq!(store.current_page_id(), &first);
    }

    #[test]
    fn deleting_inactive_keeps_active() {
        let mut store = DocumentStore::new();
        let first = store.current_page_id().clone();
        let second = store.add_page(None);
        assert!(store.delete_page(&first));
        assert_eq!(store.current_page_id(), &second);
        assert_eq!(store.current_index(), 0);
    }

    #[test]
    fn update_stale_id_is_noop() {
        let mut store = DocumentStore::new();
        assert!(!store.update_page(&PageId::new("gone"), PageUpdate::title("x")));
        assert_eq!(titles(&store), vec!["Introduction"]);
    }

    #[test]
    fn duplicate_copies_content() {
        let mut store = DocumentStore::new();
        let first = store.current_page_id().clone();
        // Not decodable: the copy must not care.
        let content = r#"{ "ROOT": { "type": "Container", "nodes": [ "#;
        store.update_page(&first, PageUpdate::content(content));

        let copy = store.duplicate_page(&first).unwrap();
        assert_ne!(copy, first);
        assert_eq!(store.current_page_id(), &copy);
        assert_eq!(store.current_page().title, "Introduction (Copy)");
        assert_eq!(store.current_page().content, content);
        assert!(store.duplicate_page(&PageId::new("gone")).is_none());
    }

    #[test]
    fn navigation_is_boundary_safe() {
        let mut store = DocumentStore::new();
        let first = store.current_page_id().clone();
        let second = store.add_page(None);

        assert!(!store.next_page());
        assert!(store.prev_page());
        assert_eq!(store.current_page_id(), &first);
        assert!(!store.prev_page());
        assert!(store.next_page());
        assert_eq!(store.current_page_id(), &second);
        assert!(!store.set_current_page(&PageId::new("gone")));
        assert_eq!(store.current_page_id(), &second);
    }

    #[test]
    fn reorder_moves_page_and_keeps_active() {
        let mut store = DocumentStore::new();
        store.add_page(Some("B"));
        let c = store.add_page(Some("C"));
        assert!(store.reorder_pages(2, 0));
        assert_eq!(titles(&store), vec!["C", "Introduction", "B"]);
        assert_eq!(store.current_page_id(), &c);
        assert!(!store.can_go_prev());
        assert!(!store.reorder_pages(0, 3));
    }

    #[test]
    fn rename_trims_and_ignores_blank() {
        let mut store = DocumentStore::new();
        let id = store.current_page_id().clone();
        assert!(!store.rename_page(&id, "   "));
        assert!(store.rename_page(&id, "  Welcome "));
        assert_eq!(store.current_page().title, "Welcome");
    }
}
