//! The Graph Store: canonical owner of nodes, edges, selection and viewport.
//!
//! Nodes live in a `StableDiGraph` whose edge weights are the board's edges,
//! so connectivity queries come straight from petgraph. Two explicit order
//! lists sit beside it: `z_order` (paint and hit order of nodes) and
//! `edge_order`. Those lists, not petgraph's index order, define every
//! iteration the store exposes, which keeps snapshots and layout
//! deterministic even after slots are reused.
//!
//! Every mutating call validates first and only then commits, so a rejected
//! call leaves the store exactly as it was.

use crate::error::{BoardError, Result};
use crate::id::{EdgeId, NodeId};
use crate::model::*;
use kurbo::{Point, Rect};
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

/// Pending notifications beyond this count collapse into one `Replaced`.
const MAX_PENDING_CHANGES: usize = 4096;

// ─── Change notifications ─────────────────────────────────────────────────

/// What changed in the store. Drained by the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreChange {
    NodeAdded(NodeId),
    NodeUpdated(NodeId),
    NodeRemoved(NodeId),
    EdgeAdded(EdgeId),
    EdgeUpdated(EdgeId),
    EdgeRemoved(EdgeId),
    SelectionChanged,
    ViewportChanged,
    /// The whole graph was swapped out.
    Replaced,
}

// ─── Selection ────────────────────────────────────────────────────────────

/// Selected nodes and edges, in selection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    nodes: Vec<NodeId>,
    edges: Vec<EdgeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(ids: impl IntoIterator<Item = NodeId>) -> Self {
        let mut sel = Self::new();
        for id in ids {
            sel.insert_node(id);
        }
        sel
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edges.contains(&id)
    }

    pub fn insert_node(&mut self, id: NodeId) {
        if !self.nodes.contains(&id) {
            self.nodes.push(id);
        }
    }

    pub fn insert_edge(&mut self, id: EdgeId) {
        if !self.edges.contains(&id) {
            self.edges.push(id);
        }
    }

    /// Add the node if absent, remove it if present.
    pub fn toggle_node(&mut self, id: NodeId) {
        if let Some(pos) = self.nodes.iter().position(|n| *n == id) {
            self.nodes.remove(pos);
        } else {
            self.nodes.push(id);
        }
    }

    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| *n != id);
        before != self.nodes.len()
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| *e != id);
        before != self.edges.len()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }
}

// ─── Removal record ───────────────────────────────────────────────────────

/// Everything `remove_node` took out, enough for `restore_node` to put it
/// back exactly: the node, its z-order slot, and its incident edges with
/// their edge-order slots (ascending).
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedNode {
    pub node: Node,
    pub slot: usize,
    pub edges: SmallVec<[(usize, Edge); 4]>,
}

// ─── Store ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GraphStore {
    graph: StableDiGraph<Node, Edge>,
    node_index: HashMap<NodeId, NodeIndex>,
    edge_index: HashMap<EdgeId, EdgeIndex>,
    z_order: Vec<NodeId>,
    edge_order: Vec<EdgeId>,
    selection: Selection,
    viewport: Viewport,
    zoom_limits: ZoomLimits,
    changes: Vec<StoreChange>,
    revision: u64,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_zoom_limits(ZoomLimits::default())
    }

    #[must_use]
    pub fn with_zoom_limits(zoom_limits: ZoomLimits) -> Self {
        Self {
            graph: StableDiGraph::new(),
            node_index: HashMap::new(),
            edge_index: HashMap::new(),
            z_order: Vec::new(),
            edge_order: Vec::new(),
            selection: Selection::new(),
            viewport: Viewport::default(),
            zoom_limits: zoom_limits.normalized(),
            changes: Vec::new(),
            revision: 0,
        }
    }

    // ─── Node mutations ──────────────────────────────────────────────────

    /// Add a node on top of the z-order.
    pub fn add_node(&mut self, node: Node) -> Result<NodeId> {
        let slot = self.z_order.len();
        self.insert_node(node, slot)
    }

    /// Add a node at a z-order slot (clamped to the end).
    pub fn insert_node(&mut self, node: Node, slot: usize) -> Result<NodeId> {
        if self.node_index.contains_key(&node.id) {
            return Err(BoardError::DuplicateId(node.id.to_string()));
        }
        validate_node(&node)?;

        let id = node.id;
        let idx = self.graph.add_node(node);
        self.node_index.insert(id, idx);
        let slot = slot.min(self.z_order.len());
        self.z_order.insert(slot, id);
        self.notify(StoreChange::NodeAdded(id));
        Ok(id)
    }

    /// Apply a patch; returns the patch that undoes it.
    pub fn update_node(&mut self, id: NodeId, patch: NodePatch) -> Result<NodePatch> {
        let idx = self.index_of(id)?;
        let node = &self.graph[idx];

        if let Some(payload) = &patch.payload
            && payload.kind() != node.kind()
        {
            return Err(BoardError::KindMismatch {
                id,
                expected: node.kind(),
                found: payload.kind(),
            });
        }
        if let Some(pos) = &patch.position
            && !pos.is_finite()
        {
            return Err(BoardError::InvalidGeometry {
                id,
                reason: "position is not finite",
            });
        }
        if let Some(Some(size)) = &patch.size
            && !size.is_valid()
        {
            return Err(BoardError::InvalidGeometry {
                id,
                reason: "size must be finite and positive",
            });
        }
        if patch.is_empty() {
            return Ok(NodePatch::default());
        }

        let node = &mut self.graph[idx];
        let mut inverse = NodePatch::default();
        if let Some(position) = patch.position {
            inverse.position = Some(std::mem::replace(&mut node.position, position));
        }
        if let Some(size) = patch.size {
            inverse.size = Some(std::mem::replace(&mut node.size, size));
        }
        if let Some(payload) = patch.payload {
            inverse.payload = Some(std::mem::replace(&mut node.payload, payload));
        }
        if let Some(color) = patch.color {
            inverse.color = Some(std::mem::replace(&mut node.color, color));
        }
        self.notify(StoreChange::NodeUpdated(id));
        Ok(inverse)
    }

    /// Move several nodes at once. All-or-nothing; returns the previous
    /// positions in the same order.
    pub fn set_positions(&mut self, moves: &[(NodeId, Position)]) -> Result<Vec<(NodeId, Position)>> {
        let mut resolved = Vec::with_capacity(moves.len());
        for (id, pos) in moves {
            let idx = self.index_of(*id)?;
            if !pos.is_finite() {
                return Err(BoardError::InvalidGeometry {
                    id: *id,
                    reason: "position is not finite",
                });
            }
            resolved.push((idx, *id, *pos));
        }

        let mut previous = Vec::with_capacity(resolved.len());
        for (idx, id, pos) in resolved {
            let old = std::mem::replace(&mut self.graph[idx].position, pos);
            previous.push((id, old));
            self.notify(StoreChange::NodeUpdated(id));
        }
        Ok(previous)
    }

    /// Remove a node and every edge touching it. Selection entries for the
    /// node and those edges are dropped.
    pub fn remove_node(&mut self, id: NodeId) -> Result<RemovedNode> {
        let idx = self.index_of(id)?;

        let mut incident: Vec<EdgeId> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .chain(self.graph.edges_directed(idx, Direction::Incoming))
            .map(|e| e.weight().id)
            .collect();
        incident.sort_by_key(|e| e.as_str().to_owned());
        incident.dedup();

        let mut edges: SmallVec<[(usize, Edge); 4]> = SmallVec::new();
        for (slot, edge_id) in self.edge_order.iter().enumerate() {
            if incident.contains(edge_id)
                && let Some(eidx) = self.edge_index.get(edge_id)
                && let Some(edge) = self.graph.edge_weight(*eidx)
            {
                edges.push((slot, edge.clone()));
            }
        }

        for (_, edge) in &edges {
            if let Some(eidx) = self.edge_index.remove(&edge.id) {
                self.graph.remove_edge(eidx);
            }
        }
        self.edge_order.retain(|e| !incident.contains(e));

        let slot = self.z_order.iter().position(|n| *n == id).unwrap_or(0);
        self.z_order.remove(slot);
        self.node_index.remove(&id);
        let node = self
            .graph
            .remove_node(idx)
            .ok_or(BoardError::NodeNotFound(id))?;

        let mut selection_changed = self.selection.remove_node(id);
        for (_, edge) in &edges {
            selection_changed |= self.selection.remove_edge(edge.id);
            self.notify(StoreChange::EdgeRemoved(edge.id));
        }
        self.notify(StoreChange::NodeRemoved(id));
        if selection_changed {
            self.notify(StoreChange::SelectionChanged);
        }

        Ok(RemovedNode { node, slot, edges })
    }

    /// Put back what `remove_node` took out.
    pub fn restore_node(&mut self, removed: RemovedNode) -> Result<()> {
        let id = removed.node.id;
        if self.node_index.contains_key(&id) {
            return Err(BoardError::DuplicateId(id.to_string()));
        }
        validate_node(&removed.node)?;
        for (_, edge) in &removed.edges {
            if self.edge_index.contains_key(&edge.id) {
                return Err(BoardError::DuplicateId(edge.id.to_string()));
            }
            for end in [edge.source_id, edge.target_id] {
                if end != id && !self.node_index.contains_key(&end) {
                    return Err(BoardError::InvalidEndpoint {
                        edge: edge.id,
                        reason: format!("node {end} does not exist"),
                    });
                }
            }
        }

        self.insert_node(removed.node, removed.slot)?;
        for (slot, edge) in removed.edges {
            self.insert_edge(edge, slot)?;
        }
        Ok(())
    }

    // ─── Edge mutations ──────────────────────────────────────────────────

    pub fn add_edge(&mut self, edge: Edge) -> Result<EdgeId> {
        let slot = self.edge_order.len();
        self.insert_edge(edge, slot)
    }

    /// Add an edge at an edge-order slot (clamped to the end).
    pub fn insert_edge(&mut self, edge: Edge, slot: usize) -> Result<EdgeId> {
        if self.edge_index.contains_key(&edge.id) {
            return Err(BoardError::DuplicateId(edge.id.to_string()));
        }
        let (from, to) = self.endpoints_of(&edge)?;

        let id = edge.id;
        let eidx = self.graph.add_edge(from, to, edge);
        self.edge_index.insert(id, eidx);
        let slot = slot.min(self.edge_order.len());
        self.edge_order.insert(slot, id);
        self.notify(StoreChange::EdgeAdded(id));
        Ok(id)
    }

    /// Replace an edge's style; returns the previous one.
    pub fn update_edge_style(&mut self, id: EdgeId, style: EdgeStyle) -> Result<EdgeStyle> {
        let eidx = *self.edge_index.get(&id).ok_or(BoardError::EdgeNotFound(id))?;
        let edge = self
            .graph
            .edge_weight_mut(eidx)
            .ok_or(BoardError::EdgeNotFound(id))?;
        let old = std::mem::replace(&mut edge.style, style);
        self.notify(StoreChange::EdgeUpdated(id));
        Ok(old)
    }

    /// Remove an edge; returns its edge-order slot and the edge itself.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<(usize, Edge)> {
        let eidx = self.edge_index.remove(&id).ok_or(BoardError::EdgeNotFound(id))?;
        let edge = self
            .graph
            .remove_edge(eidx)
            .ok_or(BoardError::EdgeNotFound(id))?;
        let slot = self.edge_order.iter().position(|e| *e == id).unwrap_or(0);
        self.edge_order.remove(slot);

        self.notify(StoreChange::EdgeRemoved(id));
        if self.selection.remove_edge(id) {
            self.notify(StoreChange::SelectionChanged);
        }
        Ok((slot, edge))
    }

    // ─── Bulk replace ────────────────────────────────────────────────────

    /// Atomically swap the whole graph. The candidate set is validated as a
    /// unit first; on failure nothing changes. Selection is cleared.
    pub fn replace_all(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) -> Result<()> {
        let mut node_ids = HashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !node_ids.insert(node.id) {
                return Err(BoardError::DuplicateId(node.id.to_string()));
            }
            validate_node(node)?;
        }
        let mut edge_ids = HashSet::with_capacity(edges.len());
        for edge in &edges {
            if !edge_ids.insert(edge.id) {
                return Err(BoardError::DuplicateId(edge.id.to_string()));
            }
            if edge.source_id == edge.target_id {
                return Err(self_loop(edge));
            }
            for end in [edge.source_id, edge.target_id] {
                if !node_ids.contains(&end) {
                    return Err(BoardError::InvalidEndpoint {
                        edge: edge.id,
                        reason: format!("node {end} does not exist"),
                    });
                }
            }
        }

        let mut graph = StableDiGraph::with_capacity(nodes.len(), edges.len());
        let mut node_index = HashMap::with_capacity(nodes.len());
        let mut z_order = Vec::with_capacity(nodes.len());
        for node in nodes {
            let id = node.id;
            node_index.insert(id, graph.add_node(node));
            z_order.push(id);
        }
        let mut edge_index = HashMap::with_capacity(edges.len());
        let mut edge_order = Vec::with_capacity(edges.len());
        for edge in edges {
            let id = edge.id;
            let from = node_index[&edge.source_id];
            let to = node_index[&edge.target_id];
            edge_index.insert(id, graph.add_edge(from, to, edge));
            edge_order.push(id);
        }

        self.graph = graph;
        self.node_index = node_index;
        self.edge_index = edge_index;
        self.z_order = z_order;
        self.edge_order = edge_order;
        self.selection.clear();
        self.changes.clear();
        self.notify(StoreChange::Replaced);
        Ok(())
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edge_index
            .get(&id)
            .and_then(|eidx| self.graph.edge_weight(*eidx))
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edge_index.contains_key(&id)
    }

    /// Nodes in z-order (bottom first).
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = &Node> + '_ {
        self.z_order
            .iter()
            .filter_map(|id| self.node_index.get(id).map(|idx| &self.graph[*idx]))
    }

    /// Edges in creation order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edge_order.iter().filter_map(|id| self.edge(*id))
    }

    pub fn node_ids(&self) -> &[NodeId] {
        &self.z_order
    }

    pub fn node_count(&self) -> usize {
        self.z_order.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z_order.is_empty()
    }

    /// Edges whose source or target is `id`, in edge order.
    pub fn incident_edges(&self, id: NodeId) -> Vec<&Edge> {
        self.edges().filter(|e| e.touches(id)).collect()
    }

    /// Whether an edge already joins these two anchors in this direction.
    pub fn has_connection(
        &self,
        source: NodeId,
        source_handle: Handle,
        target: NodeId,
        target_handle: Handle,
    ) -> bool {
        let (Some(from), Some(to)) = (self.node_index.get(&source), self.node_index.get(&target))
        else {
            return false;
        };
        self.graph
            .edges_directed(*from, Direction::Outgoing)
            .filter(|e| e.target() == *to)
            .map(|e| e.weight())
            .any(|e| e.source_anchor() == source_handle && e.target_anchor() == target_handle)
    }

    /// The first `media` node carrying `reference`, in z-order.
    pub fn find_media(&self, reference: &str) -> Option<NodeId> {
        self.nodes()
            .find(|n| n.payload.media_ref() == Some(reference))
            .map(|n| n.id)
    }

    pub fn node_bounds(&self, id: NodeId) -> Option<Rect> {
        self.node(id).map(Node::bounds)
    }

    /// Union of all node bounds, or `None` on an empty board.
    pub fn content_bounds(&self) -> Option<Rect> {
        self.nodes().map(Node::bounds).reduce(|acc, b| acc.union(b))
    }

    /// A fresh node id with the given prefix, guaranteed unused here.
    pub fn fresh_node_id(&self, prefix: &str) -> NodeId {
        loop {
            let id = NodeId::with_prefix(prefix);
            if !self.node_index.contains_key(&id) {
                return id;
            }
        }
    }

    /// A fresh edge id with the given prefix, guaranteed unused here.
    pub fn fresh_edge_id(&self, prefix: &str) -> EdgeId {
        loop {
            let id = EdgeId::with_prefix(prefix);
            if !self.edge_index.contains_key(&id) {
                return id;
            }
        }
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Replace the selection. Ids that don't resolve to live entities are dropped.
    pub fn set_selection(&mut self, selection: Selection) {
        let mut next = Selection::new();
        for id in selection.nodes() {
            if self.contains_node(*id) {
                next.insert_node(*id);
            }
        }
        for id in selection.edges() {
            if self.contains_edge(*id) {
                next.insert_edge(*id);
            }
        }
        if next != self.selection {
            self.selection = next;
            self.notify(StoreChange::SelectionChanged);
        }
    }

    pub fn select_all(&mut self) {
        let mut all = Selection::from_nodes(self.z_order.iter().copied());
        for id in &self.edge_order {
            all.insert_edge(*id);
        }
        self.set_selection(all);
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(Selection::new());
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn zoom_limits(&self) -> ZoomLimits {
        self.zoom_limits
    }

    pub fn set_zoom_limits(&mut self, limits: ZoomLimits) {
        self.zoom_limits = limits.normalized();
        let vp = self.viewport;
        self.set_viewport(vp);
    }

    /// Set the viewport, clamping zoom. Non-finite offsets are ignored.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if !viewport.offset_x.is_finite() || !viewport.offset_y.is_finite() {
            log::warn!("ignoring non-finite viewport offset {viewport:?}");
            return;
        }
        let next = Viewport {
            zoom: self.zoom_limits.clamp(viewport.zoom),
            ..viewport
        };
        if next != self.viewport {
            self.viewport = next;
            self.notify(StoreChange::ViewportChanged);
        }
    }

    /// Pan by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let vp = self.viewport.panned(dx, dy);
        self.set_viewport(vp);
    }

    /// Zoom by `factor` around a screen-space anchor.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
        let vp = self.viewport.zoomed_at(anchor, factor, self.zoom_limits);
        self.set_viewport(vp);
    }

    // ─── Change tracking ─────────────────────────────────────────────────

    /// Monotonic counter bumped by every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Drain pending change notifications.
    pub fn take_changes(&mut self) -> Vec<StoreChange> {
        std::mem::take(&mut self.changes)
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn index_of(&self, id: NodeId) -> Result<NodeIndex> {
        self.node_index
            .get(&id)
            .copied()
            .ok_or(BoardError::NodeNotFound(id))
    }

    fn endpoints_of(&self, edge: &Edge) -> Result<(NodeIndex, NodeIndex)> {
        if edge.source_id == edge.target_id {
            return Err(self_loop(edge));
        }
        let lookup = |end: NodeId| {
            self.node_index
                .get(&end)
                .copied()
                .ok_or_else(|| BoardError::InvalidEndpoint {
                    edge: edge.id,
                    reason: format!("node {end} does not exist"),
                })
        };
        Ok((lookup(edge.source_id)?, lookup(edge.target_id)?))
    }

    fn notify(&mut self, change: StoreChange) {
        self.revision += 1;
        if self.changes.len() >= MAX_PENDING_CHANGES {
            self.changes.clear();
            self.changes.push(StoreChange::Replaced);
        }
        if self.changes.last() != Some(&StoreChange::Replaced) || change != StoreChange::Replaced {
            self.changes.push(change);
        }
    }
}

fn validate_node(node: &Node) -> Result<()> {
    if !node.position.is_finite() {
        return Err(BoardError::InvalidGeometry {
            id: node.id,
            reason: "position is not finite",
        });
    }
    if let Some(size) = node.size
        && !size.is_valid()
    {
        return Err(BoardError::InvalidGeometry {
            id: node.id,
            reason: "size must be finite and positive",
        });
    }
    Ok(())
}

fn self_loop(edge: &Edge) -> BoardError {
    BoardError::InvalidEndpoint {
        edge: edge.id,
        reason: format!("self-loop on {}", edge.source_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn card(id: &str, x: f64, y: f64) -> Node {
        Node::new(NodeId::intern(id), Position::new(x, y), NodePayload::card(id))
    }

    fn edge(id: &str, from: &str, to: &str) -> Edge {
        Edge::new(EdgeId::intern(id), NodeId::intern(from), NodeId::intern(to))
    }

    fn triangle() -> GraphStore {
        let mut store = GraphStore::new();
        store.add_node(card("st_a", 0.0, 0.0)).unwrap();
        store.add_node(card("st_b", 300.0, 0.0)).unwrap();
        store.add_node(card("st_c", 0.0, 300.0)).unwrap();
        store.add_edge(edge("st_ab", "st_a", "st_b")).unwrap();
        store.add_edge(edge("st_bc", "st_b", "st_c")).unwrap();
        store.add_edge(edge("st_ca", "st_c", "st_a")).unwrap();
        store
    }

    #[test]
    fn duplicate_node_id_is_rejected() {
        let mut store = GraphStore::new();
        store.add_node(card("dup", 0.0, 0.0)).unwrap();
        let err = store.add_node(card("dup", 10.0, 10.0)).unwrap_err();
        assert!(matches!(err, BoardError::DuplicateId(_)));
        assert_eq!(store.node_count(), 1);
        assert_eq!(store.node(NodeId::intern("dup")).unwrap().position, Position::new(0.0, 0.0));
    }

    #[test]
    fn edge_endpoints_must_exist_and_differ() {
        let mut store = GraphStore::new();
        store.add_node(card("ep_a", 0.0, 0.0)).unwrap();

        let err = store.add_edge(edge("ep_missing", "ep_a", "ep_nope")).unwrap_err();
        assert!(matches!(err, BoardError::InvalidEndpoint { .. }));

        let err = store.add_edge(edge("ep_loop", "ep_a", "ep_a")).unwrap_err();
        assert!(matches!(err, BoardError::InvalidEndpoint { .. }));
        assert_eq!(store.edge_count(), 0);
    }

    #[test]
    fn remove_node_cascades_to_incident_edges() {
        let mut store = triangle();
        let removed = store.remove_node(NodeId::intern("st_b")).unwrap();

        assert_eq!(removed.edges.len(), 2);
        assert_eq!(store.edge_count(), 1);
        assert!(store.edges().all(|e| !e.touches(NodeId::intern("st_b"))));
    }

    #[test]
    fn restore_node_reinstates_order() {
        let mut store = triangle();
        let before_nodes: Vec<NodeId> = store.node_ids().to_vec();
        let before_edges: Vec<EdgeId> = store.edges().map(|e| e.id).collect();

        let removed = store.remove_node(NodeId::intern("st_b")).unwrap();
        store.restore_node(removed).unwrap();

        assert_eq!(store.node_ids().to_vec(), before_nodes);
        assert_eq!(store.edges().map(|e| e.id).collect::<Vec<_>>(), before_edges);
    }

    #[test]
    fn removal_clears_selection_references() {
        let mut store = triangle();
        let mut sel = Selection::from_nodes([NodeId::intern("st_a"), NodeId::intern("st_c")]);
        sel.insert_edge(EdgeId::intern("st_ca"));
        store.set_selection(sel);

        store.remove_node(NodeId::intern("st_a")).unwrap();
        assert_eq!(store.selection().nodes(), &[NodeId::intern("st_c")]);
        assert!(store.selection().edges().is_empty());
    }

    #[test]
    fn update_rejects_foreign_payload_kind() {
        let mut store = triangle();
        let before = store.node(NodeId::intern("st_a")).cloned();
        let err = store
            .update_node(NodeId::intern("st_a"), NodePatch::payload(NodePayload::sticky("x")))
            .unwrap_err();
        assert!(matches!(err, BoardError::KindMismatch { .. }));
        assert_eq!(store.node(NodeId::intern("st_a")).cloned(), before);
    }

    #[test]
    fn update_returns_inverse_patch() {
        let mut store = triangle();
        let id = NodeId::intern("st_a");
        let inverse = store
            .update_node(
                id,
                NodePatch {
                    position: Some(Position::new(5.0, 5.0)),
                    color: Some(Some("#ff0000".into())),
                    ..NodePatch::default()
                },
            )
            .unwrap();
        assert_eq!(inverse.position, Some(Position::new(0.0, 0.0)));
        assert_eq!(inverse.color, Some(None));

        store.update_node(id, inverse).unwrap();
        let node = store.node(id).unwrap();
        assert_eq!(node.position, Position::new(0.0, 0.0));
        assert_eq!(node.color, None);
    }

    #[test]
    fn set_positions_is_all_or_nothing() {
        let mut store = triangle();
        let err = store
            .set_positions(&[
                (NodeId::intern("st_a"), Position::new(1.0, 1.0)),
                (NodeId::intern("st_ghost"), Position::new(2.0, 2.0)),
            ])
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.node(NodeId::intern("st_a")).unwrap().position, Position::new(0.0, 0.0));
    }

    #[test]
    fn replace_all_rejects_dangling_edges_without_touching_store() {
        let mut store = triangle();
        let rev = store.revision();
        let err = store
            .replace_all(vec![card("ra_x", 0.0, 0.0)], vec![edge("ra_e", "ra_x", "ra_y")])
            .unwrap_err();
        assert!(matches!(err, BoardError::InvalidEndpoint { .. }));
        assert_eq!(store.node_count(), 3);
        assert_eq!(store.revision(), rev);
    }

    #[test]
    fn has_connection_compares_resolved_handles() {
        let store = triangle();
        let (a, b) = (NodeId::intern("st_a"), NodeId::intern("st_b"));
        assert!(store.has_connection(a, Handle::Bottom, b, Handle::Top));
        assert!(!store.has_connection(a, Handle::Right, b, Handle::Left));
        assert!(!store.has_connection(b, Handle::Bottom, a, Handle::Top));
    }

    #[test]
    fn changes_are_queued_and_drained() {
        let mut store = GraphStore::new();
        store.add_node(card("ch_a", 0.0, 0.0)).unwrap();
        store.pan_by(10.0, 0.0);
        assert_eq!(
            store.take_changes(),
            vec![
                StoreChange::NodeAdded(NodeId::intern("ch_a")),
                StoreChange::ViewportChanged
            ]
        );
        assert!(store.take_changes().is_empty());
    }

    #[test]
    fn viewport_zoom_is_clamped() {
        let mut store = GraphStore::with_zoom_limits(ZoomLimits { min: 0.5, max: 2.0 });
        store.zoom_at(Point::new(0.0, 0.0), 100.0);
        assert_eq!(store.viewport().zoom, 2.0);
        store.zoom_at(Point::new(0.0, 0.0), 0.0001);
        assert_eq!(store.viewport().zoom, 0.5);
    }

    #[test]
    fn fresh_ids_skip_existing() {
        let store = triangle();
        let id = store.fresh_node_id("st");
        assert!(!store.contains_node(id));
    }
}
