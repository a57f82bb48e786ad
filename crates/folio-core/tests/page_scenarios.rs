//! Integration tests: multi-page document sequences.
//!
//! After every operation at least one page exists and the active page id
//! names one of them.

use folio_core::{DocumentStore, NodeTree, PageId, PageUpdate, default_page_content};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn assert_invariants(store: &DocumentStore) {
    assert!(!store.pages().is_empty(), "store lost its last page");
    assert!(
        store.page(store.current_page_id()).is_some(),
        "active page {} does not exist",
        store.current_page_id()
    );
}

fn titles(store: &DocumentStore) -> Vec<String> {
    store.pages().iter().map(|p| p.title.clone()).collect()
}

// ─── Introduction / Page 2 / Page 2 (Copy) ───────────────────────────────

#[test]
fn introduction_scenario() {
    let mut store = DocumentStore::new();
    let page2 = store.add_page(None);
    assert_invariants(&store);
    let copy = store.duplicate_page(&page2).unwrap();
    assert_invariants(&store);

    assert_eq!(titles(&store), vec!["Introduction", "Page 2", "Page 2 (Copy)"]);
    assert_eq!(store.current_page_id(), &copy);
    assert_eq!(store.current_index(), 2);
    assert!(store.can_go_prev());
    assert!(!store.can_go_next());

    // Deleting an inactive page leaves the active one alone.
    let intro = store.pages()[0].id.clone();
    assert!(store.delete_page(&intro));
    assert_invariants(&store);
    assert_eq!(store.len(), 2);
    assert!(!titles(&store).contains(&"Introduction".to_string()));
    assert_eq!(store.current_page_id(), &copy);
    assert_eq!(store.current_index(), 1);
}

#[test]
fn deleting_the_active_last_page_falls_back_to_previous() {
    let mut store = DocumentStore::new();
    let page2 = store.add_page(None);
    let copy = store.duplicate_page(&page2).unwrap();
    assert!(store.delete_page(&copy));
    assert_eq!(store.current_page_id(), &page2);
    assert_invariants(&store);
}

#[test]
fn new_pages_hold_a_decodable_root() {
    let mut store = DocumentStore::new();
    let id = store.add_page(Some("Blank"));
    let page = store.page(&id).unwrap();
    assert_eq!(page.content, default_page_content());

    let tree = NodeTree::from_blob_str(&page.content).unwrap();
    assert_eq!(tree.len(), 1);
}

// ─── Invariant sequences ─────────────────────────────────────────────────

#[test]
fn deleting_down_to_one_page() {
    let mut store = DocumentStore::new();
    let ids: Vec<PageId> = (0..4).map(|_| store.add_page(None)).collect();
    store.set_current_page(&ids[1]);

    let mut all: Vec<PageId> = store.pages().iter().map(|p| p.id.clone()).collect();
    while let Some(id) = all.pop() {
        store.delete_page(&id);
        assert_invariants(&store);
    }
    assert_eq!(store.len(), 1);
    let last = store.current_page_id().clone();
    assert!(!store.delete_page(&last));
}

#[test]
fn mixed_operations_keep_invariants() {
    let mut store = DocumentStore::new();
    let intro = store.current_page_id().clone();
    let b = store.add_page(Some("B"));
    store.duplicate_page(&intro);
    store.reorder_pages(0, 2);
    assert_invariants(&store);
    store.prev_page();
    store.prev_page();
    store.prev_page();
    assert_invariants(&store);
    assert_eq!(store.current_index(), 0);

    store.delete_page(&b);
    store.update_page(&b, PageUpdate::title("ghost"));
    store.next_page();
    store.next_page();
    assert_invariants(&store);
    assert!(!titles(&store).contains(&"ghost".to_string()));
}

// ─── Random sequences ────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Add,
    /// Delete the page at this position (modulo the page count).
    Delete(usize),
    Duplicate(usize),
    Select(usize),
    Next,
    Prev,
    Reorder(usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Add),
        any::<usize>().prop_map(Op::Delete),
        any::<usize>().prop_map(Op::Duplicate),
        any::<usize>().prop_map(Op::Select),
        Just(Op::Next),
        Just(Op::Prev),
        (0usize..8, 0usize..8).prop_map(|(a, b)| Op::Reorder(a, b)),
    ]
}

fn id_at(store: &DocumentStore, n: usize) -> PageId {
    store.pages()[n % store.len()].id.clone()
}

proptest! {
    #[test]
    fn any_op_sequence_keeps_a_valid_active_page(ops in prop::collection::vec(op(), 1..64)) {
        let mut store = DocumentStore::new();
        for op in ops {
            let before = store.len();
            match op {
                Op::Add => {
                    store.add_page(None);
                    prop_assert_eq!(store.len(), before + 1);
                }
                Op::Delete(n) => {
                    let id = id_at(&store, n);
                    let deleted = store.delete_page(&id);
                    prop_assert_eq!(deleted, before > 1);
                }
                Op::Duplicate(n) => {
                    let id = id_at(&store, n);
                    let copy = store.duplicate_page(&id);
                    prop_assert_eq!(copy.as_ref(), Some(store.current_page_id()));
                }
                Op::Select(n) => {
                    let id = id_at(&store, n);
                    prop_assert!(store.set_current_page(&id));
                }
                Op::Next => {
                    store.next_page();
                }
                Op::Prev => {
                    store.prev_page();
                }
                Op::Reorder(from, to) => {
                    let active = store.current_page_id().clone();
                    store.reorder_pages(from, to);
                    prop_assert_eq!(store.current_page_id(), &active);
                }
            }
            prop_assert!(!store.pages().is_empty());
            prop_assert!(store.page(store.current_page_id()).is_some());
            prop_assert!(store.current_index() < store.len());
        }
    }
}
