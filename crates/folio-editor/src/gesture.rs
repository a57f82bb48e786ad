//! Resize gestures.
//!
//! One controller serves every element type; the type only contributes its
//! allowed handles and size floors through `ResizeSpec`.
//!
//! ## Modifier behaviors
//!
//! | Modifier | Resize |
//! |----------|--------|
//! | **Shift** | Keep the aspect ratio the drag started with |

use crate::host::HostRuntime;
use crate::input::{DocumentListeners, ListenerGuard, ListenerKind, PointerEvent};
use folio_core::{NodeId, ResizeHandle, ResizeSpec, Size};

/// State of one drag, from pointer-down on a handle to pointer-up.
#[derive(Debug)]
pub struct GestureSession {
    pub node: NodeId,
    pub handle: ResizeHandle,
    pub start_pointer: (f64, f64),
    pub start_size: Size,
    spec: ResizeSpec,
    _move_listener: ListenerGuard,
    _up_listener: ListenerGuard,
}

impl GestureSession {
    /// Size for the pointer at `event`, floored per element type.
    pub fn size_at(&self, event: &PointerEvent) -> Size {
        let dx = event.x - self.start_pointer.0;
        let dy = event.y - self.start_pointer.1;
        let Size {
            width: start_w,
            height: start_h,
        } = self.start_size;

        let mut width = start_w
            + if self.handle.has_east() {
                dx
            } else if self.handle.has_west() {
                -dx
            } else {
                0.0
            };
        let mut height = start_h
            + if self.handle.has_south() {
                dy
            } else if self.handle.has_north() {
                -dy
            } else {
                0.0
            };

        if event.modifiers.shift && start_w > 0.0 && start_h > 0.0 {
            let ratio = start_w / start_h;
            let horizontal = self.handle.has_east() || self.handle.has_west();
            let vertical = self.handle.has_north() || self.handle.has_south();
            // The axis that moved further (relative to its start) leads.
            let width_leads = match (horizontal, vertical) {
                (true, true) => (width - start_w).abs() / start_w >= (height - start_h).abs() / start_h,
                (h, _) => h,
            };
            if width_leads {
                height = width / ratio;
            } else {
                width = height * ratio;
            }
        }

        Size::new(
            width.max(self.spec.min_width),
            height.max(self.spec.min_height),
        )
    }
}

/// Turns pointer drags on resize handles into `width`/`height` mutations.
#[derive(Debug)]
pub struct GestureController {
    listeners: DocumentListeners,
    session: Option<GestureSession>,
}

impl GestureController {
    pub fn new(listeners: DocumentListeners) -> Self {
        Self {
            listeners,
            session: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    /// Start a drag. Refused when the node is gone, has no geometry, or
    /// its type does not offer `handle`. A drag already in progress is
    /// ended first.
    pub fn begin_resize<H: HostRuntime>(
        &mut self,
        host: &mut H,
        node: NodeId,
        handle: ResizeHandle,
        event: &PointerEvent,
    ) -> bool {
        if self.session.is_some() {
            self.end_resize(host);
        }
        let Some(snapshot) = host.node(node) else {
            log::warn!("resize on missing node {node}");
            return false;
        };
        let Some(start_size) = snapshot.props.size() else {
            log::warn!("resize on {node} without numeric width/height");
            return false;
        };
        let spec = snapshot.element_type.resize_spec();
        if !spec.allows(handle) {
            log::debug!("{} has no {handle} handle", snapshot.element_type);
            return false;
        }

        host.begin_batch();
        log::debug!("resize {node} from {handle} at {}x{}", start_size.width, start_size.height);
        self.session = Some(GestureSession {
            node,
            handle,
            start_pointer: (event.x, event.y),
            start_size,
            spec,
            _move_listener: self.listeners.subscribe(ListenerKind::PointerMove),
            _up_listener: self.listeners.subscribe(ListenerKind::PointerUp),
        });
        true
    }

    /// Apply one pointer move. Every move issues exactly one mutation;
    /// `None` when no drag is active or the node has disappeared.
    pub fn on_pointer_move<H: HostRuntime>(
        &mut self,
        host: &mut H,
        event: &PointerEvent,
    ) -> Option<Size> {
        let session = self.session.as_ref()?;
        let size = session.size_at(event);
        let moves_width = session.handle.has_east()
            || session.handle.has_west()
            || event.modifiers.shift;
        let moves_height = session.handle.has_north()
            || session.handle.has_south()
            || event.modifiers.shift;

        let applied = host.set_prop(session.node, &mut |props| {
            if moves_width {
                props.set("width", size.width);
            }
            if moves_height {
                props.set("height", size.height);
            }
        });
        if !applied {
            log::trace!("dropped move for vanished node {}", session.node);
            return None;
        }
        log::trace!("resize {} -> {}x{}", session.node, size.width, size.height);
        Some(size)
    }

    /// Finish the drag. The session and its listeners go unconditionally.
    pub fn end_resize<H: HostRuntime>(&mut self, host: &mut H) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        host.end_batch();
        log::debug!("resize {} ended", session.node);
        true
    }

    /// Abnormal termination (pointer left the window, page switch). Moves
    /// already applied stay applied.
    pub fn cancel<H: HostRuntime>(&mut self, host: &mut H) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        host.end_batch();
        log::debug!("resize {} cancelled", session.node);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{History, MemoryHost, TreeMutator, TreeQuery};
    use crate::input::Modifiers;
    use folio_core::{ElementType, Node};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn setup(element_type: ElementType, name: &str) -> (MemoryHost, GestureController, DocumentListeners, NodeId) {
        let mut host = MemoryHost::default();
        let id = host
            .insert(NodeId::root(), Node::new(NodeId::intern(name), element_type))
            .unwrap();
        let listeners = DocumentListeners::new();
        (host, GestureController::new(listeners.clone()), listeners, id)
    }

    fn size_of(host: &MemoryHost, id: NodeId) -> Option<Size> {
        host.node(id)?.props.size()
    }

    #[test]
    fn east_handle_grows_width_only() {
        let (mut host, mut gc, _, id) = setup(ElementType::Button, "g_east");
        assert!(gc.begin_resize(&mut host, id, ResizeHandle::E, &PointerEvent::at(100.0, 100.0)));
        let size = gc.on_pointer_move(&mut host, &PointerEvent::at(180.0, 140.0));
        assert_eq!(size, Some(Size::new(200.0, 40.0)));
        assert_eq!(size_of(&host, id), Some(Size::new(200.0, 40.0)));
    }

    #[test]
    fn floors_are_never_crossed() {
        let (mut host, mut gc, _, id) = setup(ElementType::Button, "g_floor");
        gc.begin_resize(&mut host, id, ResizeHandle::Se, &PointerEvent::at(0.0, 0.0));
        let size = gc.on_pointer_move(&mut host, &PointerEvent::at(-1000.0, -1000.0));
        assert_eq!(size, Some(Size::new(50.0, 30.0)));
    }

    #[test]
    fn west_and_north_invert_the_delta() {
        let (mut host, mut gc, _, id) = setup(ElementType::Shape, "g_nw");
        gc.begin_resize(&mut host, id, ResizeHandle::Nw, &PointerEvent::at(50.0, 50.0));
        let size = gc.on_pointer_move(&mut host, &PointerEvent::at(30.0, 20.0));
        assert_eq!(size, Some(Size::new(120.0, 130.0)));
    }

    #[test]
    fn handle_outside_type_set_is_refused() {
        let (mut host, mut gc, listeners, id) = setup(ElementType::Container, "g_edge");
        assert!(!gc.begin_resize(&mut host, id, ResizeHandle::E, &PointerEvent::at(0.0, 0.0)));
        assert!(!gc.is_active());
        assert_eq!(listeners.total(), 0);
    }

    #[test]
    fn shift_keeps_aspect_ratio() {
        let (mut host, mut gc, _, id) = setup(ElementType::Image, "g_shift");
        gc.begin_resize(&mut host, id, ResizeHandle::E, &PointerEvent::at(0.0, 0.0));
        let shifted = PointerEvent::at(150.0, 0.0).with_modifiers(Modifiers::shift());
        let size = gc.on_pointer_move(&mut host, &shifted);
        // 300x200 widened to 450 keeps 3:2.
        assert_eq!(size, Some(Size::new(450.0, 300.0)));
        assert_eq!(size_of(&host, id), Some(Size::new(450.0, 300.0)));
    }

    #[test]
    fn listeners_live_exactly_as_long_as_the_session() {
        let (mut host, mut gc, listeners, id) = setup(ElementType::Video, "g_listen");
        gc.begin_resize(&mut host, id, ResizeHandle::Se, &PointerEvent::at(0.0, 0.0));
        assert!(listeners.is_listening(ListenerKind::PointerMove));
        assert!(listeners.is_listening(ListenerKind::PointerUp));
        assert!(gc.cancel(&mut host));
        assert_eq!(listeners.total(), 0);
        assert!(!gc.end_resize(&mut host));
    }

    #[test]
    fn move_after_node_deleted_is_dropped() {
        let (mut host, mut gc, _, id) = setup(ElementType::Audio, "g_gone");
        gc.begin_resize(&mut host, id, ResizeHandle::S, &PointerEvent::at(0.0, 0.0));
        host.delete(id);
        assert_eq!(gc.on_pointer_move(&mut host, &PointerEvent::at(0.0, 50.0)), None);
        assert!(gc.end_resize(&mut host));
    }

    #[test]
    fn one_drag_is_one_undo_step() {
        let (mut host, mut gc, _, id) = setup(ElementType::Text, "g_undo");
        gc.begin_resize(&mut host, id, ResizeHandle::Se, &PointerEvent::at(0.0, 0.0));
        for step in 1..=5 {
            let d = f64::from(step) * 10.0;
            gc.on_pointer_move(&mut host, &PointerEvent::at(d, d));
        }
        gc.end_resize(&mut host);
        assert_eq!(size_of(&host, id), Some(Size::new(250.0, 100.0)));

        assert!(host.undo());
        assert_eq!(size_of(&host, id), Some(Size::new(200.0, 50.0)));
    }

    proptest! {
        #[test]
        fn no_drag_goes_below_the_floor(
            element_type in prop::sample::select(ElementType::ALL.to_vec()),
            handle in any::<prop::sample::Index>(),
            moves in prop::collection::vec((-1.0e7f64..1.0e7, -1.0e7f64..1.0e7, any::<bool>()), 1..8),
        ) {
            let mut host = MemoryHost::default();
            let id = host.insert(NodeId::root(), Node::of_type(element_type)).unwrap();
            let mut gc = GestureController::new(DocumentListeners::new());
            let spec = element_type.resize_spec();
            let handle = *handle.get(spec.handles);

            prop_assert!(gc.begin_resize(&mut host, id, handle, &PointerEvent::at(0.0, 0.0)));
            for (x, y, shift) in moves {
                let modifiers = if shift { Modifiers::shift() } else { Modifiers::NONE };
                let event = PointerEvent::at(x, y).with_modifiers(modifiers);
                let size = gc.on_pointer_move(&mut host, &event).unwrap();
                prop_assert!(size.width >= spec.min_width);
                prop_assert!(size.height >= spec.min_height);

                let stored = size_of(&host, id).unwrap();
                prop_assert!(stored.width >= spec.min_width);
                prop_assert!(stored.height >= spec.min_height);
            }
            prop_assert!(gc.end_resize(&mut host));
        }
    }
}
