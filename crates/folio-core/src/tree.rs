//! The element tree of one page.
//!
//! A page's content is a tree of typed elements rooted at `ROOT`. It is
//! persisted as a flat JSON object keyed by node id, where each entry lists
//! its children by id:
//!
//! ```text
//! {"ROOT": {"type": {"resolvedName": "Container"}, "isCanvas": true,
//!           "props": {..}, "displayName": "Container", "custom": {},
//!           "hidden": false, "nodes": ["node_1"], "linkedNodes": {}},
//!  "node_1": {.., "parent": "ROOT"}}
//! ```
//!
//! In memory the tree lives in a `StableDiGraph` with parent → child edges
//! and an id index, so removing a subtree never invalidates other indices.

use crate::catalog::ElementType;
use crate::id::NodeId;
use crate::value::{Color, PropValue, PropertyBag};
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use serde_json::{Map, Value, json};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Structural or decoding failure of a page blob.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("page content is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("page content must be a JSON object keyed by node id")]
    NotAnObject,

    #[error("page content has no ROOT node")]
    MissingRoot,

    #[error("node `{id}` is malformed: {reason}")]
    Malformed { id: String, reason: String },

    #[error("node `{id}` has unknown element type `{name}`")]
    UnknownElementType { id: String, name: String },

    #[error("node `{parent}` references missing child `{child}`")]
    DanglingChild { parent: String, child: String },

    #[error("node `{0}` is reachable more than once (cycle or shared child)")]
    Cycle(String),

    #[error("node `{0}` already exists")]
    DuplicateId(String),

    #[error("node `{0}` does not exist")]
    NotFound(String),

    #[error("the ROOT node cannot be removed")]
    RootRemoval,
}

/// How a child hangs off its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Ordinary child listed in `nodes`.
    Child,
    /// Named slot listed in `linkedNodes`.
    Linked(String),
}

/// One element.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub element_type: ElementType,
    pub display_name: String,
    pub props: PropertyBag,
    /// Whether the element accepts dropped children.
    pub is_canvas: bool,
    /// Opaque per-node data the host stores alongside props.
    pub custom: Map<String, Value>,
    pub hidden: bool,
    pub locked: bool,
    pub deletable: bool,
}

impl Node {
    /// A fresh element with the type's default props.
    pub fn new(id: NodeId, element_type: ElementType) -> Self {
        Self {
            id,
            element_type,
            display_name: element_type.display_name().to_string(),
            props: element_type.default_props(),
            is_canvas: element_type == ElementType::Container,
            custom: Map::new(),
            hidden: false,
            locked: false,
            deletable: true,
        }
    }

    /// A fresh element with a generated id.
    pub fn of_type(element_type: ElementType) -> Self {
        let prefix = element_type.resolved_name().to_ascii_lowercase();
        Self::new(NodeId::with_prefix(&prefix), element_type)
    }

    pub fn with_props(mut self, props: PropertyBag) -> Self {
        self.props.merge(&props);
        self
    }

    /// The container every new page starts with.
    pub fn page_root() -> Self {
        let props = PropertyBag::new()
            .with("background", Color::rgba(1.0, 1.0, 1.0, 1.0))
            .with("padding", vec![PropValue::Number(40.0); 4])
            .with("minHeight", 600.0);
        Self {
            props,
            deletable: false,
            ..Self::new(NodeId::root(), ElementType::Container)
        }
    }
}

/// Blob of the single-container tree every new page starts with.
pub fn default_page_content() -> String {
    NodeTree::new().to_blob_string()
}

/// The element tree of a page.
#[derive(Debug, Clone)]
pub struct NodeTree {
    graph: StableDiGraph<Node, Slot>,
    root: NodeIndex,
    id_index: HashMap<NodeId, NodeIndex>,
    /// Order of `Slot::Child` children, which the graph does not keep.
    child_order: HashMap<NodeIndex, Vec<NodeIndex>>,
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTree {
    /// A tree holding only the default page root.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root(Node::page_root())
    }

    /// A tree with the given root. Its id is forced to `ROOT`.
    pub fn with_root(mut root: Node) -> Self {
        root.id = NodeId::root();
        let mut graph = StableDiGraph::new();
        let idx = graph.add_node(root);
        let mut id_index = HashMap::new();
        id_index.insert(NodeId::root(), idx);
        Self {
            graph,
            root: idx,
            id_index,
            child_order: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Node {
        &self.graph[self.root]
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.id_index.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.id_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }

    /// Append `node` as the last ordinary child of `parent`.
    pub fn insert(&mut self, parent: NodeId, node: Node) -> Result<NodeId, TreeError> {
        let at = self.children(parent).len();
        self.insert_at(parent, at, node)
    }

    /// Insert `node` as an ordinary child of `parent` at `index` (clamped).
    pub fn insert_at(
        &mut self,
        parent: NodeId,
        index: usize,
        node: Node,
    ) -> Result<NodeId, TreeError> {
        let parent_idx = self.index_of(parent)?;
        let idx = self.attach(parent_idx, node, Slot::Child)?;
        let order = self.child_order.entry(parent_idx).or_default();
        let index = index.min(order.len());
        order.insert(index, idx);
        Ok(self.graph[idx].id)
    }

    /// Attach `node` to `parent` under the named slot.
    pub fn link(&mut self, parent: NodeId, slot: &str, node: Node) -> Result<NodeId, TreeError> {
        let parent_idx = self.index_of(parent)?;
        let idx = self.attach(parent_idx, node, Slot::Linked(slot.to_string()))?;
        Ok(self.graph[idx].id)
    }

    fn attach(&mut self, parent: NodeIndex, node: Node, slot: Slot) -> Result<NodeIndex, TreeError> {
        let id = node.id;
        if self.id_index.contains_key(&id) {
            return Err(TreeError::DuplicateId(id.to_string()));
        }
        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, slot);
        self.id_index.insert(id, idx);
        Ok(idx)
    }

    /// Remove a node and its whole subtree. Returns the removed nodes,
    /// the requested node first.
    pub fn remove(&mut self, id: NodeId) -> Result<Vec<Node>, TreeError> {
        let idx = self.index_of(id)?;
        if idx == self.root {
            return Err(TreeError::RootRemoval);
        }
        if let Some(parent) = self.parent_index(idx)
            && let Some(order) = self.child_order.get_mut(&parent)
        {
            order.retain(|c| *c != idx);
        }

        let doomed = self.preorder(idx);
        let mut removed = Vec::with_capacity(doomed.len());
        for d in doomed {
            self.child_order.remove(&d);
            if let Some(node) = self.graph.remove_node(d) {
                self.id_index.remove(&node.id);
                removed.push(node);
            }
        }
        Ok(removed)
    }

    /// Ordinary children in document order. Unknown ids have none.
    pub fn children(&self, id: NodeId) -> SmallVec<[NodeId; 8]> {
        self.id_index
            .get(&id)
            .and_then(|idx| self.child_order.get(idx))
            .map(|order| order.iter().map(|c| self.graph[*c].id).collect())
            .unwrap_or_default()
    }

    /// Named-slot children, sorted by slot name.
    pub fn linked_nodes(&self, id: NodeId) -> Vec<(String, NodeId)> {
        let Some(&idx) = self.id_index.get(&id) else {
            return Vec::new();
        };
        let mut linked: Vec<(String, NodeId)> = self
            .graph
            .edges_directed(idx, petgraph::Direction::Outgoing)
            .filter_map(|e| match e.weight() {
                Slot::Linked(name) => Some((name.clone(), self.graph[e.target()].id)),
                Slot::Child => None,
            })
            .collect();
        linked.sort();
        linked
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        let idx = *self.id_index.get(&id)?;
        self.parent_index(idx).map(|p| self.graph[p].id)
    }

    /// Every node id, parents before children, children in document order.
    pub fn ids(&self) -> Vec<NodeId> {
        self.preorder(self.root)
            .into_iter()
            .map(|idx| self.graph[idx].id)
            .collect()
    }

    /// Whether `ancestor` is a strict ancestor of `descendant`.
    pub fn is_ancestor_of(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        let mut current = self.parent_of(descendant);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent_of(id);
        }
        false
    }

    fn index_of(&self, id: NodeId) -> Result<NodeIndex, TreeError> {
        self.id_index
            .get(&id)
            .copied()
            .ok_or_else(|| TreeError::NotFound(id.to_string()))
    }

    fn parent_index(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// Subtree of `start` in preorder: ordinary children, then linked ones.
    fn preorder(&self, start: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            out.push(idx);
            let node_id = self.graph[idx].id;
            let mut next: Vec<NodeIndex> = self
                .linked_nodes(node_id)
                .into_iter()
                .filter_map(|(_, id)| self.id_index.get(&id).copied())
                .collect();
            next.reverse();
            if let Some(order) = self.child_order.get(&idx) {
                next.extend(order.iter().rev().copied());
            }
            stack.extend(next);
        }
        out
    }

    // ─── Blob codec ──────────────────────────────────────────────────────

    /// Encode as the flat, id-keyed blob. `ROOT` comes first, then every
    /// other node in preorder.
    pub fn to_blob(&self) -> Value {
        let mut map = Map::new();
        for idx in self.preorder(self.root) {
            let node = &self.graph[idx];
            map.insert(node.id.to_string(), self.encode_node(idx));
        }
        Value::Object(map)
    }

    pub fn to_blob_string(&self) -> String {
        self.to_blob().to_string()
    }

    fn encode_node(&self, idx: NodeIndex) -> Value {
        let node = &self.graph[idx];
        let nodes: Vec<Value> = self
            .children(node.id)
            .iter()
            .map(|c| Value::String(c.to_string()))
            .collect();
        let linked: Map<String, Value> = self
            .linked_nodes(node.id)
            .into_iter()
            .map(|(slot, id)| (slot, Value::String(id.to_string())))
            .collect();

        let mut out = Map::new();
        out.insert(
            "type".into(),
            json!({ "resolvedName": node.element_type.resolved_name() }),
        );
        out.insert("isCanvas".into(), Value::Bool(node.is_canvas));
        out.insert("props".into(), Value::Object(node.props.to_json_map()));
        out.insert("displayName".into(), Value::String(node.display_name.clone()));
        out.insert("custom".into(), Value::Object(node.custom.clone()));
        out.insert("hidden".into(), Value::Bool(node.hidden));
        out.insert("nodes".into(), Value::Array(nodes));
        out.insert("linkedNodes".into(), Value::Object(linked));
        if let Some(parent) = self.parent_index(idx) {
            out.insert("parent".into(), Value::String(self.graph[parent].id.to_string()));
        }
        if node.locked {
            out.insert("locked".into(), Value::Bool(true));
        }
        if !node.deletable && idx != self.root {
            out.insert("deletable".into(), Value::Bool(false));
        }
        Value::Object(out)
    }

    pub fn from_blob_str(text: &str) -> Result<Self, TreeError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_blob(&value)
    }

    /// Decode a blob. Structure is derived from `nodes` / `linkedNodes`
    /// walked from `ROOT`; stored `parent` fields are ignored and entries
    /// unreachable from `ROOT` are dropped.
    pub fn from_blob(blob: &Value) -> Result<Self, TreeError> {
        let entries = blob.as_object().ok_or(TreeError::NotAnObject)?;
        let root_entry = entries
            .get(NodeId::ROOT_KEY)
            .ok_or(TreeError::MissingRoot)?;

        let mut root = decode_node(NodeId::ROOT_KEY, root_entry)?;
        root.deletable = false;
        let mut tree = Self::with_root(root);

        let mut seen: HashSet<String> = HashSet::from([NodeId::ROOT_KEY.to_string()]);
        let mut pending: Vec<Pending> = Vec::new();
        queue_children(NodeId::root(), NodeId::ROOT_KEY, root_entry, &mut pending)?;
        pending.reverse();

        while let Some(Pending { parent, slot, child }) = pending.pop() {
            let child_key = child.as_str();
            if !seen.insert(child_key.to_string()) {
                return Err(TreeError::Cycle(child_key.to_string()));
            }
            let entry = entries.get(child_key).ok_or_else(|| TreeError::DanglingChild {
                parent: parent.to_string(),
                child: child_key.to_string(),
            })?;
            let node = decode_node(child_key, entry)?;
            let id = match slot {
                Some(name) => tree.link(parent, &name, node)?,
                None => tree.insert(parent, node)?,
            };

            let mut grandchildren = Vec::new();
            queue_children(id, child_key, entry, &mut grandchildren)?;
            grandchildren.reverse();
            pending.extend(grandchildren);
        }

        let orphans = entries.len() - seen.len();
        if orphans > 0 {
            log::warn!("dropped {orphans} node(s) unreachable from ROOT");
        }
        Ok(tree)
    }
}

/// A child reference waiting to be decoded.
struct Pending {
    parent: NodeId,
    slot: Option<String>,
    child: String,
}

fn queue_children(
    parent: NodeId,
    key: &str,
    entry: &Value,
    out: &mut Vec<Pending>,
) -> Result<(), TreeError> {
    let malformed = |reason: &str| TreeError::Malformed {
        id: key.to_string(),
        reason: reason.to_string(),
    };

    if let Some(nodes) = entry.get("nodes") {
        let nodes = nodes.as_array().ok_or_else(|| malformed("`nodes` is not an array"))?;
        for child in nodes {
            let child = child
                .as_str()
                .ok_or_else(|| malformed("`nodes` holds a non-string id"))?;
            out.push(Pending {
                parent,
                slot: None,
                child: child.to_string(),
            });
        }
    }
    if let Some(linked) = entry.get("linkedNodes") {
        let linked = linked
            .as_object()
            .ok_or_else(|| malformed("`linkedNodes` is not an object"))?;
        for (slot, child) in linked {
            let child = child
                .as_str()
                .ok_or_else(|| malformed("`linkedNodes` holds a non-string id"))?;
            out.push(Pending {
                parent,
                slot: Some(slot.clone()),
                child: child.to_string(),
            });
        }
    }
    Ok(())
}

fn decode_node(key: &str, entry: &Value) -> Result<Node, TreeError> {
    let malformed = |reason: &str| TreeError::Malformed {
        id: key.to_string(),
        reason: reason.to_string(),
    };
    let obj = entry
        .as_object()
        .ok_or_else(|| malformed("entry is not an object"))?;

    let type_name = match obj.get("type") {
        Some(Value::Object(t)) => t.get("resolvedName").and_then(Value::as_str),
        Some(Value::String(s)) => Some(s.as_str()),
        _ => None,
    }
    .ok_or_else(|| malformed("missing `type.resolvedName`"))?;
    let element_type =
        ElementType::from_resolved_name(type_name).ok_or_else(|| TreeError::UnknownElementType {
            id: key.to_string(),
            name: type_name.to_string(),
        })?;

    let props = match obj.get("props") {
        None | Some(Value::Null) => PropertyBag::new(),
        Some(Value::Object(map)) => PropertyBag::from_json_map(map),
        Some(_) => return Err(malformed("`props` is not an object")),
    };
    let flag = |name: &str, default: bool| obj.get(name).and_then(Value::as_bool).unwrap_or(default);

    Ok(Node {
        id: NodeId::intern(key),
        element_type,
        display_name: obj
            .get("displayName")
            .and_then(Value::as_str)
            .unwrap_or(element_type.display_name())
            .to_string(),
        props,
        is_canvas: flag("isCanvas", false),
        custom: obj
            .get("custom")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default(),
        hidden: flag("hidden", false),
        locked: flag("locked", false),
        deletable: flag("deletable", true),
    })
}
