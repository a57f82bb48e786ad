//! The host editing runtime.
//!
//! The live node tree, its history, and node mutation primitives belong to
//! the host. The editor reaches them only through these narrow traits, so
//! the same controllers run against a browser-side runtime or against
//! `MemoryHost`.
//!
//! `MemoryHost` keeps undo history as whole-tree snapshots. A batch (one
//! resize drag) captures the tree once at the start and once at the end,
//! so the whole gesture is a single undo step.

use folio_core::{ElementType, Node, NodeId, NodeTree, PropertyBag, TreeError};
use serde_json::Value;
use smallvec::SmallVec;

/// Read model of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub element_type: ElementType,
    pub display_name: String,
    pub props: PropertyBag,
    pub parent: Option<NodeId>,
    pub children: SmallVec<[NodeId; 8]>,
    pub hidden: bool,
    pub locked: bool,
    pub deletable: bool,
}

pub trait TreeQuery {
    fn exists(&self, id: NodeId) -> bool;

    fn node(&self, id: NodeId) -> Option<NodeSnapshot>;

    /// Whether `id` may be deleted. False for unknown ids and the root.
    fn is_deletable(&self, id: NodeId) -> bool;

    /// The most recent selection the host reported.
    fn selected(&self) -> Option<NodeId>;

    /// The whole tree as an opaque page blob.
    fn serialize(&self) -> String;
}

pub trait TreeMutator {
    /// Replace the whole tree. On error the current tree is untouched.
    fn deserialize(&mut self, blob: &str) -> Result<(), TreeError>;

    /// Select a node, or clear the selection with `None`.
    fn select_node(&mut self, id: Option<NodeId>);

    /// Run `mutate` over the node's props. False if the node is gone.
    fn set_prop(&mut self, id: NodeId, mutate: &mut dyn FnMut(&mut PropertyBag)) -> bool;

    /// Delete a node and its subtree. False if the node is gone or is the root.
    fn delete(&mut self, id: NodeId) -> bool;

    fn set_hidden(&mut self, id: NodeId, hidden: bool) -> bool;
}

pub trait History {
    /// Step back. Refused while a batch is open.
    fn undo(&mut self) -> bool;
    fn redo(&mut self) -> bool;
    fn can_undo(&self) -> bool;
    fn can_redo(&self) -> bool;

    /// Group the following mutations into one undo step. Nests.
    fn begin_batch(&mut self);
    fn end_batch(&mut self);
}

/// A complete host runtime.
pub trait HostRuntime: TreeQuery + TreeMutator + History {}

impl<T: TreeQuery + TreeMutator + History> HostRuntime for T {}

// ─── In-memory host ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Snapshot {
    before: Value,
    after: Value,
}

/// In-memory host over a `NodeTree`.
#[derive(Debug)]
pub struct MemoryHost {
    tree: NodeTree,
    selected: Option<NodeId>,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    batch_before: Option<Value>,
    batch_dirty: bool,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new(200)
    }
}

impl MemoryHost {
    pub fn new(max_depth: usize) -> Self {
        Self {
            tree: NodeTree::new(),
            selected: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            batch_depth: 0,
            batch_before: None,
            batch_dirty: false,
        }
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    /// Drop-in insertion from the toolbox. Recorded in history.
    pub fn insert(&mut self, parent: NodeId, node: Node) -> Result<NodeId, TreeError> {
        let before = self.tree.to_blob();
        let id = self.tree.insert(parent, node)?;
        self.record(before);
        Ok(id)
    }

    /// Report a selection event without going through the editor, the way
    /// the host's own canvas does (including transient `None`s).
    pub fn inject_selection(&mut self, id: Option<NodeId>) {
        self.selected = id;
    }

    /// Apply `edit` to the tree and record one undo step if it succeeded.
    fn edit<T>(&mut self, edit: impl FnOnce(&mut NodeTree) -> Option<T>) -> Option<T> {
        let before = (self.batch_depth == 0).then(|| self.tree.to_blob());
        let out = edit(&mut self.tree)?;
        match before {
            Some(before) => self.record(before),
            None => self.batch_dirty = true,
        }
        Some(out)
    }

    fn record(&mut self, before: Value) {
        if self.batch_depth > 0 {
            self.batch_dirty = true;
            return;
        }
        let after = self.tree.to_blob();
        self.push_undo(Snapshot { before, after });
    }

    fn push_undo(&mut self, snapshot: Snapshot) {
        if snapshot.before == snapshot.after {
            return;
        }
        self.undo_stack.push(snapshot);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    fn restore(&mut self, blob: &Value) -> bool {
        match NodeTree::from_blob(blob) {
            Ok(tree) => {
                self.tree = tree;
                if self.selected.is_some_and(|id| !self.tree.contains(id)) {
                    self.selected = None;
                }
                true
            }
            Err(err) => {
                log::error!("history snapshot failed to restore: {err}");
                false
            }
        }
    }
}

impl TreeQuery for MemoryHost {
    fn exists(&self, id: NodeId) -> bool {
        self.tree.contains(id)
    }

    fn node(&self, id: NodeId) -> Option<NodeSnapshot> {
        let node = self.tree.get(id)?;
        Some(NodeSnapshot {
            id,
            element_type: node.element_type,
            display_name: node.display_name.clone(),
            props: node.props.clone(),
            parent: self.tree.parent_of(id),
            children: self.tree.children(id),
            hidden: node.hidden,
            locked: node.locked,
            deletable: node.deletable,
        })
    }

    fn is_deletable(&self, id: NodeId) -> bool {
        !id.is_root() && self.tree.get(id).is_some_and(|n| n.deletable)
    }

    fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    fn serialize(&self) -> String {
        self.tree.to_blob_string()
    }
}

impl TreeMutator for MemoryHost {
    fn deserialize(&mut self, blob: &str) -> Result<(), TreeError> {
        self.tree = NodeTree::from_blob_str(blob)?;
        self.selected = None;
        // History belongs to the tree it was recorded on.
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch_before = None;
        self.batch_dirty = false;
        Ok(())
    }

    fn select_node(&mut self, id: Option<NodeId>) {
        self.selected = id.filter(|id| self.tree.contains(*id));
    }

    fn set_prop(&mut self, id: NodeId, mutate: &mut dyn FnMut(&mut PropertyBag)) -> bool {
        self.edit(|tree| {
            let node = tree.get_mut(id)?;
            mutate(&mut node.props);
            Some(())
        })
        .is_some()
    }

    fn delete(&mut self, id: NodeId) -> bool {
        let removed = self.edit(|tree| tree.remove(id).ok());
        match removed {
            Some(nodes) => {
                if self.selected.is_some_and(|s| nodes.iter().any(|n| n.id == s)) {
                    self.selected = None;
                }
                true
            }
            None => false,
        }
    }

    fn set_hidden(&mut self, id: NodeId, hidden: bool) -> bool {
        self.edit(|tree| {
            tree.get_mut(id)?.hidden = hidden;
            Some(())
        })
        .is_some()
    }
}

impl History for MemoryHost {
    fn undo(&mut self) -> bool {
        if self.batch_depth > 0 {
            log::debug!("undo refused while a batch is open");
            return false;
        }
        let Some(snapshot) = self.undo_stack.pop() else {
            return false;
        };
        let restored = self.restore(&snapshot.before);
        self.redo_stack.push(snapshot);
        restored
    }

    fn redo(&mut self) -> bool {
        if self.batch_depth > 0 {
            log::debug!("redo refused while a batch is open");
            return false;
        }
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        let restored = self.restore(&snapshot.after);
        self.undo_stack.push(snapshot);
        restored
    }

    fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn begin_batch(&mut self) {
        if self.batch_depth == 0 {
            self.batch_before = Some(self.tree.to_blob());
            self.batch_dirty = false;
        }
        self.batch_depth += 1;
    }

    fn end_batch(&mut self) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return;
        }
        if let Some(before) = self.batch_before.take()
            && self.batch_dirty
        {
            let after = self.tree.to_blob();
            self.push_undo(Snapshot { before, after });
        }
        self.batch_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn host_with_button() -> (MemoryHost, NodeId) {
        let mut host = MemoryHost::default();
        let id = host
            .insert(NodeId::root(), Node::new(NodeId::intern("host_btn"), ElementType::Button))
            .unwrap();
        (host, id)
    }

    fn width(host: &MemoryHost, id: NodeId) -> Option<f64> {
        host.node(id)?.props.number("width")
    }

    #[test]
    fn set_prop_then_undo_redo() {
        let (mut host, id) = host_with_button();
        assert!(host.set_prop(id, &mut |p| p.set("width", 300.0)));
        assert_eq!(width(&host, id), Some(300.0));

        assert!(host.undo());
        assert_eq!(width(&host, id), Some(120.0));
        assert!(host.redo());
        assert_eq!(width(&host, id), Some(300.0));
    }

    #[test]
    fn new_action_clears_redo() {
        let (mut host, id) = host_with_button();
        host.set_prop(id, &mut |p| p.set("width", 300.0));
        host.undo();
        assert!(host.can_redo());
        host.set_hidden(id, true);
        assert!(!host.can_redo());
    }

    #[test]
    fn batch_is_one_undo_step() {
        let (mut host, id) = host_with_button();
        host.begin_batch();
        for w in [130.0, 140.0, 150.0] {
            host.set_prop(id, &mut |p| p.set("width", w));
        }
        host.end_batch();

        assert!(host.undo());
        assert_eq!(width(&host, id), Some(120.0));
        // The insertion is the next step back.
        assert!(host.undo());
        assert!(!host.exists(id));
        assert!(!host.can_undo());
    }

    #[test]
    fn history_is_frozen_while_batching() {
        let (mut host, id) = host_with_button();
        host.set_prop(id, &mut |p| p.set("width", 200.0));
        host.undo();
        assert!(host.can_redo());

        host.begin_batch();
        assert!(!host.undo());
        assert!(!host.redo());
        host.end_batch();

        assert!(host.redo());
        assert_eq!(width(&host, id), Some(200.0));
    }

    #[test]
    fn empty_batch_records_nothing() {
        let mut host = MemoryHost::default();
        host.begin_batch();
        host.end_batch();
        assert!(!host.can_undo());
    }

    #[test]
    fn depth_is_bounded() {
        let mut host = MemoryHost::new(2);
        let id = host
            .insert(NodeId::root(), Node::new(NodeId::intern("host_depth"), ElementType::Text))
            .unwrap();
        for w in [60.0, 70.0, 80.0] {
            host.set_prop(id, &mut |p| p.set("width", w));
        }
        assert!(host.undo());
        assert!(host.undo());
        assert!(!host.undo());
        assert_eq!(width(&host, id), Some(60.0));
    }

    #[test]
    fn root_is_never_deletable() {
        let (mut host, id) = host_with_button();
        assert!(!host.is_deletable(NodeId::root()));
        assert!(!host.delete(NodeId::root()));
        assert!(host.is_deletable(id));
    }

    #[test]
    fn deleting_selected_node_clears_host_selection() {
        let (mut host, id) = host_with_button();
        host.select_node(Some(id));
        assert_eq!(host.selected(), Some(id));
        assert!(host.delete(id));
        assert_eq!(host.selected(), None);
    }

    #[test]
    fn failed_deserialize_keeps_tree() {
        let (mut host, id) = host_with_button();
        assert!(host.deserialize(r#"{ "nope": {} }"#).is_err());
        assert!(host.deserialize("not json at all").is_err());
        assert!(host.exists(id));
    }

    #[test]
    fn deserialize_resets_history() {
        let (mut host, _) = host_with_button();
        assert!(host.can_undo());
        host.deserialize(&folio_core::default_page_content()).unwrap();
        assert!(!host.can_undo());
        assert_eq!(host.tree().len(), 1);
    }
}
