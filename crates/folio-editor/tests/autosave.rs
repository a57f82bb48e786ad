//! Integration tests: debounced autosave and page switching.
//!
//! The clock is driven by hand; nothing here sleeps.

use folio_core::{ElementType, Node, NodeId, NodeTree, PropValue};
use folio_editor::{Editor, EditorConfig, MemoryHost, TreeQuery};
use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn editor_with_text(name: &str) -> (Editor<MemoryHost>, NodeId) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut editor = Editor::headless(EditorConfig::default());
    let id = editor
        .host_mut()
        .insert(NodeId::root(), Node::new(NodeId::intern(name), ElementType::Text))
        .unwrap();
    (editor, id)
}

fn saved_text(editor: &Editor<MemoryHost>, id: NodeId) -> Option<String> {
    let tree = NodeTree::from_blob_str(&editor.store().current_page().content).ok()?;
    tree.get(id)?.props.get("text")?.as_str().map(str::to_string)
}

// ─── Coalescing ──────────────────────────────────────────────────────────

#[test]
fn five_quick_edits_make_one_save() {
    let (mut editor, id) = editor_with_text("auto_text");
    let t0 = Instant::now();

    for i in 0..5u64 {
        let now = t0 + ms(i * 50);
        let text = PropValue::Text(format!("draft {}", i + 1));
        assert!(editor.set_prop(id, "text", text, now));
        assert!(!editor.tick(now));
    }
    // The last edit landed at 200 ms; quiet period ends at 1200 ms.
    assert!(!editor.tick(t0 + ms(1199)));
    assert!(editor.tick(t0 + ms(1200)));
    assert!(!editor.tick(t0 + ms(5000)));

    assert_eq!(editor.bridge().save_count(), 1);
    assert_eq!(saved_text(&editor, id), Some("draft 5".to_string()));
}

#[test]
fn configured_window_is_used() {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = EditorConfig::from_json(r#"{ "autosave_debounce_ms": 100 }"#).unwrap();
    let mut editor = Editor::headless(config);
    let t0 = Instant::now();
    editor.set_hidden(NodeId::root(), true, t0);
    assert!(!editor.tick(t0 + ms(99)));
    assert!(editor.tick(t0 + ms(100)));
}

#[test]
fn save_now_flushes_immediately() {
    let (mut editor, id) = editor_with_text("auto_now");
    editor.set_prop(id, "text", PropValue::Text("kept".into()), Instant::now());
    assert!(editor.save_now());
    assert!(!editor.bridge().has_pending_save());
    assert_eq!(saved_text(&editor, id), Some("kept".to_string()));
}

// ─── Page switching ──────────────────────────────────────────────────────

#[test]
fn switching_pages_flushes_then_loads() {
    let (mut editor, id) = editor_with_text("auto_switch");
    let first = editor.store().current_page_id().clone();
    editor.set_prop(id, "text", PropValue::Text("before switch".into()), Instant::now());

    let second = editor.add_page(None).unwrap();
    assert_eq!(editor.store().current_page_id(), &second);
    assert!(!editor.host().exists(id));
    assert_eq!(editor.host().serialize(), editor.store().current_page().content);

    assert!(editor.set_current_page(&first).unwrap());
    assert!(editor.host().exists(id));
    let text = editor.host().node(id).unwrap().props.get("text").cloned();
    assert_eq!(text, Some(PropValue::Text("before switch".into())));
}

#[test]
fn duplicate_includes_unsaved_edits() {
    let (mut editor, id) = editor_with_text("auto_dup");
    let first = editor.store().current_page_id().clone();
    editor.content_changed(Instant::now());

    let copy = editor.duplicate_page(&first).unwrap().unwrap();
    assert_eq!(editor.store().current_page_id(), &copy);
    assert_eq!(editor.store().current_page().title, "Introduction (Copy)");
    assert!(editor.host().exists(id));
}

#[test]
fn deleting_active_page_loads_neighbour_without_saving_into_it() {
    let (mut editor, id) = editor_with_text("auto_delete");
    let first = editor.store().current_page_id().clone();
    editor.content_changed(Instant::now());
    let second = editor.add_page(Some("Second")).unwrap();

    editor.set_hidden(NodeId::root(), true, Instant::now());
    assert!(editor.delete_page(&second).unwrap());
    assert_eq!(editor.store().current_page_id(), &first);
    assert!(!editor.bridge().has_pending_save());
    assert!(editor.host().exists(id));
    assert!(!editor.host().node(NodeId::root()).unwrap().hidden);
}

#[test]
fn refused_delete_of_only_page_keeps_unsaved_edits() {
    let (mut editor, id) = editor_with_text("auto_only_page");
    let t0 = Instant::now();
    let only = editor.store().current_page_id().clone();
    editor.set_prop(id, "text", PropValue::Text("unsaved".into()), t0);

    assert!(!editor.delete_page(&only).unwrap());
    assert!(editor.bridge().has_pending_save());
    assert!(editor.tick(t0 + ms(2000)));
    assert_eq!(saved_text(&editor, id), Some("unsaved".to_string()));
}

#[test]
fn deleting_an_inactive_page_keeps_active_edits() {
    let (mut editor, id) = editor_with_text("auto_inactive_delete");
    let t0 = Instant::now();
    let first = editor.store().current_page_id().clone();
    editor.content_changed(t0);
    editor.add_page(Some("Other")).unwrap();
    editor.set_current_page(&first).unwrap();
    let other = editor.store().pages()[1].id.clone();

    editor.set_prop(id, "text", PropValue::Text("still pending".into()), t0);
    assert!(editor.delete_page(&other).unwrap());
    assert!(editor.bridge().has_pending_save());
    assert!(editor.tick(t0 + ms(1000)));
    assert_eq!(saved_text(&editor, id), Some("still pending".to_string()));
}

#[test]
fn hex_looking_text_survives_save_and_reload() {
    let (mut editor, id) = editor_with_text("auto_hashtag");
    let t0 = Instant::now();
    let first = editor.store().current_page_id().clone();
    editor.set_prop(id, "text", PropValue::Text("#2024".into()), t0);
    assert!(editor.tick(t0 + ms(2000)));
    assert_eq!(saved_text(&editor, id), Some("#2024".to_string()));

    editor.add_page(None).unwrap();
    editor.set_current_page(&first).unwrap();
    let text = editor.host().node(id).unwrap().props.get("text").cloned();
    assert_eq!(text, Some(PropValue::Text("#2024".into())));
}

#[test]
fn navigation_reloads_only_on_change() {
    let (mut editor, _) = editor_with_text("auto_nav");
    editor.add_page(None).unwrap();
    assert!(!editor.next_page().unwrap());
    assert!(editor.prev_page().unwrap());
    assert!(!editor.prev_page().unwrap());
}
