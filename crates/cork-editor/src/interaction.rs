//! Interaction controller: pointer and keyboard input → store changes.
//!
//! A small state machine. Pointer-down picks the gesture from what it hits;
//! pointer-move previews; pointer-up commits through `History` or discards.
//!
//! | Pointer-down on                | Gesture          |
//! |--------------------------------|------------------|
//! | anchor handle                  | `ConnectingEdge` |
//! | resize grip (resizable kinds)  | `ResizingNode`   |
//! | node body                      | `DraggingNodes`  |
//! | edge                           | select edge      |
//! | empty canvas + **Shift**       | `BoxSelecting`   |
//! | empty canvas, or middle button | `Panning`        |
//!
//! Drag and resize previews write straight to the store without history.
//! On release the preview is reverted and one command records the final
//! state, so undo always lands on the exact pre-gesture geometry (snapping
//! included). Escape cancels whatever is in flight.

use crate::history::History;
use crate::hit::{self, Hit, Tolerance};
use crate::input::{InputEvent, Modifiers, PointerButton};
use crate::mutation::Mutation;
use crate::shortcuts::ShortcutMap;
use cork_core::{
    BoardConfig, Edge, GraphStore, Handle, NodeId, NodePatch, Point, Position, Rect, Result, Selection,
    Size,
};
use smallvec::SmallVec;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    DraggingNodes {
        /// Canvas point where the drag started.
        origin: Point,
        starts: SmallVec<[(NodeId, Position); 8]>,
        moved: bool,
    },
    ResizingNode {
        id: NodeId,
        origin: Point,
        /// Effective size when the gesture began.
        base: Size,
        /// Explicit size when the gesture began (restored on revert).
        start: Option<Size>,
    },
    ConnectingEdge {
        source: NodeId,
        handle: Handle,
        /// Provisional canvas endpoint.
        cursor: Point,
    },
    BoxSelecting {
        origin: Point,
        current: Point,
        additive: bool,
    },
    Panning {
        /// Last screen point.
        last: Point,
        moved: bool,
        /// Started on empty canvas: a click without movement deselects.
        clears_selection: bool,
    },
}

/// Transient decoration for the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Overlay {
    Marquee(Rect),
    Connection { from: Point, to: Point },
}

#[derive(Debug, Default)]
pub struct InteractionController {
    state: InteractionState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, InteractionState::Idle)
    }

    /// Drop any gesture without touching the store (the store was replaced).
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// Handle one event. Returns the dispatcher command a keyboard shortcut
    /// resolved to, if any. On error the gesture is abandoned and its
    /// preview reverted.
    pub fn handle(
        &mut self,
        event: &InputEvent,
        store: &mut GraphStore,
        history: &mut History,
        config: &BoardConfig,
    ) -> Result<Option<&'static str>> {
        match event {
            InputEvent::PointerDown {
                x,
                y,
                button,
                modifiers,
            } => {
                self.pointer_down(Point::new(*x, *y), *button, *modifiers, store, config);
                Ok(None)
            }
            InputEvent::PointerMove { x, y, .. } => {
                if let Err(err) = self.pointer_move(Point::new(*x, *y), store, config) {
                    self.cancel(store);
                    return Err(err);
                }
                Ok(None)
            }
            InputEvent::PointerUp { x, y, .. } => {
                self.pointer_up(Point::new(*x, *y), store, history, config)?;
                Ok(None)
            }
            InputEvent::Wheel { x, y, delta_y, .. } => {
                let factor = if *delta_y < 0.0 {
                    config.zoom_step
                } else if *delta_y > 0.0 {
                    1.0 / config.zoom_step
                } else {
                    return Ok(None);
                };
                store.zoom_at(Point::new(*x, *y), factor);
                Ok(None)
            }
            InputEvent::Key { key, modifiers } => {
                if !self.is_idle() {
                    if key == "Escape" {
                        self.cancel(store);
                    }
                    return Ok(None);
                }
                Ok(ShortcutMap::resolve(key, *modifiers).map(|a| a.command_name()))
            }
        }
    }

    /// Abandon the current gesture, reverting any preview.
    pub fn cancel(&mut self, store: &mut GraphStore) {
        let state = std::mem::take(&mut self.state);
        let reverted = match &state {
            InteractionState::DraggingNodes { starts, .. } => store.set_positions(starts).map(|_| ()),
            InteractionState::ResizingNode { id, start, .. } => {
                store.update_node(*id, NodePatch::size(*start)).map(|_| ())
            }
            _ => Ok(()),
        };
        if let Err(err) = reverted {
            log::warn!("could not revert cancelled gesture: {err}");
        }
        log::trace!("gesture cancelled");
    }

    /// Marquee rectangle or provisional connection line, in canvas space.
    pub fn overlay(&self, store: &GraphStore) -> Option<Overlay> {
        match &self.state {
            InteractionState::BoxSelecting { origin, current, .. } => {
                Some(Overlay::Marquee(Rect::from_points(*origin, *current)))
            }
            InteractionState::ConnectingEdge {
                source,
                handle,
                cursor,
            } => store.node(*source).map(|node| Overlay::Connection {
                from: node.anchor(*handle),
                to: *cursor,
            }),
            _ => None,
        }
    }

    // ─── Pointer down ────────────────────────────────────────────────────

    fn pointer_down(
        &mut self,
        screen: Point,
        button: PointerButton,
        modifiers: Modifiers,
        store: &mut GraphStore,
        config: &BoardConfig,
    ) {
        if !self.is_idle() {
            return;
        }
        match button {
            PointerButton::Middle => {
                self.state = InteractionState::Panning {
                    last: screen,
                    moved: false,
                    clears_selection: false,
                };
                return;
            }
            // Context menus belong to the host.
            PointerButton::Secondary => return,
            PointerButton::Primary => {}
        }

        let viewport = store.viewport();
        let p = viewport.to_canvas(screen);
        let tol = Tolerance::scaled(config.handle_radius, config.edge_tolerance, viewport.zoom);

        self.state = match hit::hit_test(store, p, tol) {
            Hit::Handle { node, handle } => InteractionState::ConnectingEdge {
                source: node,
                handle,
                cursor: p,
            },
            Hit::ResizeGrip(id) => {
                if !store.selection().contains_node(id) {
                    store.set_selection(Selection::from_nodes([id]));
                }
                match store.node(id) {
                    Some(node) => InteractionState::ResizingNode {
                        id,
                        origin: p,
                        base: node.effective_size(),
                        start: node.size,
                    },
                    None => InteractionState::Idle,
                }
            }
            Hit::Node(id) => {
                let mut sel = store.selection().clone();
                if modifiers.shift {
                    sel.toggle_node(id);
                } else if !sel.contains_node(id) {
                    // Click on unselected node: replace selection
                    sel = Selection::from_nodes([id]);
                }
                store.set_selection(sel);

                if store.selection().contains_node(id) {
                    let starts = store
                        .selection()
                        .nodes()
                        .iter()
                        .filter_map(|n| store.node(*n).map(|node| (*n, node.position)))
                        .collect();
                    InteractionState::DraggingNodes {
                        origin: p,
                        starts,
                        moved: false,
                    }
                } else {
                    InteractionState::Idle
                }
            }
            Hit::Edge(id) => {
                let mut sel = if modifiers.shift {
                    store.selection().clone()
                } else {
                    Selection::new()
                };
                if !sel.remove_edge(id) {
                    sel.insert_edge(id);
                }
                store.set_selection(sel);
                InteractionState::Idle
            }
            Hit::Canvas if modifiers.shift => InteractionState::BoxSelecting {
                origin: p,
                current: p,
                additive: modifiers.command(),
            },
            Hit::Canvas => InteractionState::Panning {
                last: screen,
                moved: false,
                clears_selection: true,
            },
        };
        log::trace!("pointer down → {:?}", self.state);
    }

    // ─── Pointer move ────────────────────────────────────────────────────

    fn pointer_move(&mut self, screen: Point, store: &mut GraphStore, config: &BoardConfig) -> Result<()> {
        let p = store.viewport().to_canvas(screen);
        match &mut self.state {
            InteractionState::Idle => {}
            InteractionState::DraggingNodes { origin, starts, moved } => {
                let d = p - *origin;
                if d.x != 0.0 || d.y != 0.0 {
                    *moved = true;
                }
                let preview: Vec<_> = starts.iter().map(|(id, s)| (*id, s.offset(d.x, d.y))).collect();
                store.set_positions(&preview)?;
            }
            InteractionState::ResizingNode { id, origin, base, .. } => {
                let size = resized(*base, p - *origin, config.min_node_size);
                store.update_node(*id, NodePatch::size(Some(size)))?;
            }
            InteractionState::ConnectingEdge { cursor, .. } => *cursor = p,
            InteractionState::BoxSelecting { current, .. } => *current = p,
            InteractionState::Panning { last, moved, .. } => {
                let (dx, dy) = (screen.x - last.x, screen.y - last.y);
                if dx != 0.0 || dy != 0.0 {
                    store.pan_by(dx, dy);
                    *last = screen;
                    *moved = true;
                }
            }
        }
        Ok(())
    }

    // ─── Pointer up ──────────────────────────────────────────────────────

    fn pointer_up(
        &mut self,
        screen: Point,
        store: &mut GraphStore,
        history: &mut History,
        config: &BoardConfig,
    ) -> Result<()> {
        let viewport = store.viewport();
        let p = viewport.to_canvas(screen);
        let state = std::mem::take(&mut self.state);
        log::trace!("pointer up ← {state:?}");

        match state {
            InteractionState::Idle => Ok(()),
            InteractionState::DraggingNodes { origin, starts, moved } => {
                store.set_positions(&starts)?;
                if !moved {
                    return Ok(());
                }
                let d = p - origin;
                let moves: Vec<(NodeId, Position)> = starts
                    .iter()
                    .map(|(id, s)| {
                        let mut to = s.offset(d.x, d.y);
                        if config.snap_to_grid {
                            to = to.snapped(config.grid_size);
                        }
                        (*id, to)
                    })
                    .filter(|(id, to)| starts.iter().any(|(sid, s)| sid == id && s != to))
                    .collect();
                if moves.is_empty() {
                    return Ok(());
                }
                let description = match moves.len() {
                    1 => "Move node".to_string(),
                    n => format!("Move {n} nodes"),
                };
                history.execute(store, Mutation::SetPositions { moves }, &description)
            }
            InteractionState::ResizingNode {
                id,
                origin,
                base,
                start,
            } => {
                store.update_node(id, NodePatch::size(start))?;
                let size = resized(base, p - origin, config.min_node_size);
                if size == base {
                    return Ok(());
                }
                history.execute(
                    store,
                    Mutation::UpdateNode {
                        id,
                        patch: NodePatch::size(Some(size)),
                    },
                    "Resize node",
                )
            }
            InteractionState::ConnectingEdge { source, handle, .. } => {
                let tol = Tolerance::scaled(config.handle_radius, config.edge_tolerance, viewport.zoom);
                match hit::handle_at(store, p, tol.handle, Some(source)) {
                    Some((target, target_handle)) if !store.has_connection(source, handle, target, target_handle) => {
                        let edge = Edge::new(store.fresh_edge_id("edge"), source, target)
                            .with_handles(handle, target_handle)
                            .with_style(config.edge_style.clone());
                        history.execute(store, Mutation::add_edge(edge), "Connect nodes")
                    }
                    _ => {
                        log::trace!("connection from {source} discarded");
                        Ok(())
                    }
                }
            }
            InteractionState::BoxSelecting { origin, additive, .. } => {
                let ids = hit::nodes_in_rect(store, Rect::from_points(origin, p));
                let mut sel = if additive {
                    store.selection().clone()
                } else {
                    Selection::new()
                };
                for id in ids {
                    sel.insert_node(id);
                }
                store.set_selection(sel);
                Ok(())
            }
            InteractionState::Panning {
                moved,
                clears_selection,
                ..
            } => {
                if !moved && clears_selection {
                    store.clear_selection();
                }
                Ok(())
            }
        }
    }
}

fn resized(base: Size, delta: kurbo::Vec2, min: f64) -> Size {
    Size::new((base.width + delta.x).max(min), (base.height + delta.y).max(min))
}
