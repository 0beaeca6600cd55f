//! Hit testing: canvas point → what the pointer is over.
//!
//! Nodes are visited topmost first, and within a node the first match wins:
//! an anchor handle, then the resize grip of a resizable node, then the
//! body. A node drawn on top therefore shadows the handles and grip of the
//! nodes under it. Only when no node claims the point are edge paths
//! tried, and after them the empty canvas.
//!
//! Tolerances are given in screen pixels and divided by the zoom, so
//! handles keep their on-screen size at every zoom level.

use cork_core::scene::edge_path;
use cork_core::{EdgeId, GraphStore, Handle, Node, NodeId, Point, Rect};
use kurbo::ParamCurveNearest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Handle { node: NodeId, handle: Handle },
    ResizeGrip(NodeId),
    Node(NodeId),
    Edge(EdgeId),
    Canvas,
}

/// Screen-space tolerances, already scaled to canvas units.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    pub handle: f64,
    pub edge: f64,
}

impl Tolerance {
    pub fn scaled(handle_px: f64, edge_px: f64, zoom: f64) -> Self {
        let zoom = if zoom > 0.0 { zoom } else { 1.0 };
        Self {
            handle: handle_px / zoom,
            edge: edge_px / zoom,
        }
    }
}

pub fn hit_test(store: &GraphStore, p: Point, tol: Tolerance) -> Hit {
    // Walk nodes in reverse (last painted = topmost)
    for node in store.nodes().rev() {
        if let Some(handle) = nearest_handle(node, p, tol.handle) {
            return Hit::Handle { node: node.id, handle };
        }
        if node.kind().is_resizable() && grip_rect(node, tol.handle).contains(p) {
            return Hit::ResizeGrip(node.id);
        }
        if contains_inclusive(node.bounds(), p) {
            return Hit::Node(node.id);
        }
    }
    if let Some(edge) = edge_at(store, p, tol.edge) {
        return Hit::Edge(edge);
    }
    Hit::Canvas
}

fn nearest_handle(node: &Node, p: Point, radius: f64) -> Option<Handle> {
    Handle::ALL
        .into_iter()
        .map(|handle| (node.anchor(handle).distance(p), handle))
        .filter(|(d, _)| *d <= radius)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, handle)| handle)
}

/// Closest handle of any node within `radius` of `p`, skipping `exclude`'s
/// handles. Used to find connection targets, where stacking doesn't matter.
pub fn handle_at(store: &GraphStore, p: Point, radius: f64, exclude: Option<NodeId>) -> Option<(NodeId, Handle)> {
    let mut best: Option<(f64, NodeId, Handle)> = None;
    for node in store.nodes().rev() {
        if Some(node.id) == exclude {
            continue;
        }
        for handle in Handle::ALL {
            let d = node.anchor(handle).distance(p);
            if d <= radius && best.is_none_or(|(bd, _, _)| d < bd) {
                best = Some((d, node.id, handle));
            }
        }
    }
    best.map(|(_, node, handle)| (node, handle))
}

/// Last-drawn edge whose path passes within `tolerance` of `p`.
pub fn edge_at(store: &GraphStore, p: Point, tolerance: f64) -> Option<EdgeId> {
    let limit = tolerance * tolerance;
    let edges: Vec<_> = store.edges().collect();
    edges.into_iter().rev().find_map(|edge| {
        let source = store.node(edge.source_id)?;
        let target = store.node(edge.target_id)?;
        let path = edge_path(edge, source, target);
        let near = path
            .segments()
            .map(|seg| seg.nearest(p, 1e-3).distance_sq)
            .fold(f64::INFINITY, f64::min);
        (near <= limit).then_some(edge.id)
    })
}

/// All nodes whose bounds intersect `rect` (edges touching count), in z-order.
pub fn nodes_in_rect(store: &GraphStore, rect: Rect) -> Vec<NodeId> {
    let rect = rect.abs();
    store
        .nodes()
        .filter(|n| touches(n.bounds(), rect))
        .map(|n| n.id)
        .collect()
}

/// Square grip centred on the bottom-right corner.
pub fn grip_rect(node: &Node, half: f64) -> Rect {
    let b = node.bounds();
    Rect::new(b.x1 - half, b.y1 - half, b.x1 + half, b.y1 + half)
}

/// Positive-area overlap.
pub fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

fn touches(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

fn contains_inclusive(r: Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
}
