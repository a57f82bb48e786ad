//! Persistent selection.
//!
//! The host runtime reports selection changes freely, including transient
//! `None`s while it re-renders or while a property panel takes focus. The
//! tracker treats those reports as advisory: a selection is set only on a
//! live node and cleared only by an explicit user action or once the node
//! turns out to be gone.

use crate::host::{HostRuntime, TreeQuery};
use folio_core::{ElementType, NodeId, PropertyBag};

/// Why the host reported a selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionCause {
    /// The user clicked the canvas (on a node or on empty space).
    UserCanvasClick,
    /// Selection requested by editor UI (layers panel, keyboard).
    Explicit,
    /// Host bookkeeping: re-render, focus moves, drag-and-drop.
    Transient,
}

/// What a property panel shows for a node.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentProperties {
    pub id: NodeId,
    pub name: String,
    pub element_type: ElementType,
    pub props: PropertyBag,
    pub hidden: bool,
    pub locked: bool,
}

#[derive(Debug, Default)]
pub struct SelectionTracker {
    selected: Option<NodeId>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a live node. Dead ids are refused and leave the selection as is.
    pub fn select_component<H: HostRuntime>(&mut self, host: &mut H, id: NodeId) -> bool {
        if !host.exists(id) {
            log::warn!("cannot select missing node {id}");
            return false;
        }
        host.select_node(Some(id));
        self.selected = Some(id);
        true
    }

    pub fn clear_selection<H: HostRuntime>(&mut self, host: &mut H) {
        host.select_node(None);
        self.selected = None;
    }

    /// Feed a host selection event through the tracker's own entry points.
    pub fn observe_host_event<H: HostRuntime>(
        &mut self,
        host: &mut H,
        id: Option<NodeId>,
        cause: SelectionCause,
    ) {
        match (id, cause) {
            (Some(id), _) if Some(id) != self.selected => {
                self.select_component(host, id);
            }
            (Some(_), _) => {}
            (None, SelectionCause::UserCanvasClick | SelectionCause::Explicit) => {
                self.clear_selection(host);
            }
            (None, SelectionCause::Transient) => {
                log::trace!("ignored transient deselect");
            }
        }
    }

    /// The selected node, if it still exists. A dead selection is cleared
    /// here rather than when the node goes.
    pub fn selected_id<Q: TreeQuery + ?Sized>(&mut self, host: &Q) -> Option<NodeId> {
        let id = self.selected?;
        if host.exists(id) {
            Some(id)
        } else {
            log::debug!("selected node {id} is gone; clearing selection");
            self.selected = None;
            None
        }
    }

    pub fn is_component_selected<Q: TreeQuery + ?Sized>(&mut self, host: &Q, id: NodeId) -> bool {
        self.selected_id(host) == Some(id)
    }

    /// Forget the selection if it was `id` (or nothing is live any more).
    pub fn on_node_deleted(&mut self, id: NodeId) {
        if self.selected == Some(id) {
            self.selected = None;
        }
    }

    /// Drop the selection without telling the host; used when the whole
    /// tree is replaced.
    pub fn reset(&mut self) {
        self.selected = None;
    }

    /// Properties of `id`, or of the selection when `id` is `None`.
    pub fn get_component_properties<Q: TreeQuery + ?Sized>(
        &mut self,
        host: &Q,
        id: Option<NodeId>,
    ) -> Option<ComponentProperties> {
        let id = match id {
            Some(id) => id,
            None => self.selected_id(host)?,
        };
        let node = host.node(id)?;
        let name = if node.display_name.is_empty() {
            node.element_type.display_name().to_string()
        } else {
            node.display_name
        };
        Some(ComponentProperties {
            id,
            name,
            element_type: node.element_type,
            props: node.props,
            hidden: node.hidden,
            locked: node.locked,
        })
    }
}
