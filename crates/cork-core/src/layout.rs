//! Hierarchical (layered) auto-layout.
//!
//! Rearranges the board into a tree-like stack of ranks:
//!
//! 1. Back-edges are found with an iterative depth-first search using
//!    explicit white/grey/black marks over node indices. An edge that
//!    reaches a node still on the DFS stack completes a cycle and is
//!    ignored for ranking.
//! 2. Every node's rank is its longest-path distance from a source over the
//!    remaining acyclic graph (topological order, O(N + E)). Isolated nodes
//!    land on rank 0.
//! 3. Nodes inside a rank are ordered by the barycenter of their
//!    predecessors' in-rank positions; ties fall back to z-order.
//! 4. Ranks are stacked along the primary axis (max footprint + `rank_gap`),
//!    nodes inside a rank along the secondary axis (footprint + `node_gap`),
//!    each rank centred on the secondary axis. A node's footprint is the
//!    size it is drawn and hit-tested with (`Node::effective_size`).
//! 5. Centres are converted to top-left positions.
//!
//! All iteration follows store order, so identical input gives identical
//! output, bit for bit.

use crate::id::{EdgeId, NodeId};
use crate::model::{Position, Size};
use crate::store::GraphStore;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which way ranks grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutDirection {
    #[default]
    TopToBottom,
    LeftToRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOptions {
    /// Gap between consecutive ranks.
    pub rank_gap: f64,
    /// Gap between neighbours inside a rank.
    pub node_gap: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            rank_gap: 50.0,
            node_gap: 50.0,
        }
    }
}

/// Output of a layout pass. `positions` and `ranks` follow z-order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResult {
    pub positions: Vec<(NodeId, Position)>,
    pub ranks: Vec<(NodeId, usize)>,
    /// Edges ignored for ranking because they closed a cycle.
    pub back_edges: Vec<EdgeId>,
}

impl LayoutResult {
    pub fn position_of(&self, id: NodeId) -> Option<Position> {
        self.positions.iter().find(|(n, _)| *n == id).map(|(_, p)| *p)
    }

    pub fn rank_of(&self, id: NodeId) -> Option<usize> {
        self.ranks.iter().find(|(n, _)| *n == id).map(|(_, r)| *r)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    White,
    Grey,
    Black,
}

/// Lay out every node of the store. The laid-out block keeps the top-left
/// corner of the board's current content, so the board doesn't jump away
/// from where the user was looking.
pub fn auto_layout(store: &GraphStore, direction: LayoutDirection, options: &LayoutOptions) -> LayoutResult {
    let mut graph: DiGraph<NodeId, EdgeId> = DiGraph::with_capacity(store.node_count(), store.edge_count());
    let mut index: HashMap<NodeId, NodeIndex> = HashMap::with_capacity(store.node_count());
    let mut footprints = Vec::with_capacity(store.node_count());
    for node in store.nodes() {
        index.insert(node.id, graph.add_node(node.id));
        footprints.push(node.effective_size());
    }
    for edge in store.edges() {
        if let (Some(s), Some(t)) = (index.get(&edge.source_id), index.get(&edge.target_id)) {
            graph.add_edge(*s, *t, edge.id);
        }
    }

    let mut result = layout_graph(&graph, &footprints, direction, options);

    if let Some(origin) = store.content_bounds().map(|b| b.origin()) {
        let (min_x, min_y) = result
            .positions
            .iter()
            .fold((f64::INFINITY, f64::INFINITY), |(mx, my), (_, p)| (mx.min(p.x), my.min(p.y)));
        let (dx, dy) = (origin.x - min_x, origin.y - min_y);
        for (_, p) in &mut result.positions {
            *p = p.offset(dx, dy);
        }
    }
    result
}

/// Lay out a prepared graph. Node weights are ids; `footprints[i]` belongs
/// to node index `i`. Edge indices define traversal order.
pub fn layout_graph(
    graph: &DiGraph<NodeId, EdgeId>,
    footprints: &[Size],
    direction: LayoutDirection,
    options: &LayoutOptions,
) -> LayoutResult {
    let n = graph.node_count();
    if n == 0 {
        return LayoutResult::default();
    }

    // Outgoing adjacency in edge-index order: (target, edge index).
    let mut outgoing: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
    let mut in_degree = vec![0usize; n];
    for (e, edge) in graph.raw_edges().iter().enumerate() {
        outgoing[edge.source().index()].push((edge.target().index(), e));
        in_degree[edge.target().index()] += 1;
    }

    let back = find_back_edges(&outgoing, &in_degree);
    let back_edges: Vec<EdgeId> = back
        .iter()
        .enumerate()
        .filter(|(_, is_back)| **is_back)
        .map(|(e, _)| graph.raw_edges()[e].weight)
        .collect();
    if !back_edges.is_empty() {
        log::debug!("layout: ignoring {} back-edge(s) {:?}", back_edges.len(), back_edges);
    }

    let ranks = assign_ranks(graph, &back);
    let layers = order_layers(graph, &ranks, &back);
    let centres = place_centres(&layers, footprints, direction, options);

    let positions = (0..n)
        .map(|i| {
            let (cx, cy) = centres[i];
            let fp = footprints[i];
            (graph[NodeIndex::new(i)], Position::new(cx - fp.width / 2.0, cy - fp.height / 2.0))
        })
        .collect();
    let ranks = (0..n).map(|i| (graph[NodeIndex::new(i)], ranks[i])).collect();

    LayoutResult {
        positions,
        ranks,
        back_edges,
    }
}

/// Iterative DFS; returns a per-edge flag marking back-edges. Roots are the
/// sources in index order, then any node left unvisited (pure cycles).
fn find_back_edges(outgoing: &[Vec<(usize, usize)>], in_degree: &[usize]) -> Vec<bool> {
    let n = outgoing.len();
    let edge_count: usize = outgoing.iter().map(Vec::len).sum();
    let mut back = vec![false; edge_count];
    let mut mark = vec![Mark::White; n];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    let sources = (0..n).filter(|v| in_degree[*v] == 0);
    for root in sources.chain(0..n) {
        if mark[root] != Mark::White {
            continue;
        }
        mark[root] = Mark::Grey;
        stack.push((root, 0));

        while let Some(&(v, cursor)) = stack.last() {
            match outgoing[v].get(cursor) {
                Some(&(t, e)) => {
                    if let Some(top) = stack.last_mut() {
                        top.1 += 1;
                    }
                    match mark[t] {
                        Mark::White => {
                            mark[t] = Mark::Grey;
                            stack.push((t, 0));
                        }
                        Mark::Grey => back[e] = true,
                        Mark::Black => {}
                    }
                }
                None => {
                    mark[v] = Mark::Black;
                    stack.pop();
                }
            }
        }
    }
    back
}

/// Longest-path ranks over the graph minus back-edges.
fn assign_ranks(graph: &DiGraph<NodeId, EdgeId>, back: &[bool]) -> Vec<usize> {
    let dag = graph.filter_map(|_, id| Some(*id), |e, id| (!back[e.index()]).then_some(*id));
    let mut rank = vec![0usize; graph.node_count()];

    match toposort(&dag, None) {
        Ok(order) => {
            for v in order {
                let r = rank[v.index()];
                for e in dag.edges(v) {
                    let t = e.target().index();
                    rank[t] = rank[t].max(r + 1);
                }
            }
        }
        Err(cycle) => {
            log::warn!("layout: residual cycle at {:?}; flattening to rank 0", dag[cycle.node_id()]);
        }
    }
    rank
}

/// Group nodes by rank and order each rank by predecessor barycenter.
fn order_layers(graph: &DiGraph<NodeId, EdgeId>, rank: &[usize], back: &[bool]) -> Vec<Vec<usize>> {
    let n = rank.len();
    let depth = rank.iter().copied().max().unwrap_or(0) + 1;
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); depth];
    for (v, r) in rank.iter().enumerate() {
        layers[*r].push(v);
    }

    let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (e, edge) in graph.raw_edges().iter().enumerate() {
        if !back[e] {
            incoming[edge.target().index()].push(edge.source().index());
        }
    }

    let mut slot = vec![0usize; n];
    for layer in &mut layers {
        let mut keyed: Vec<(f64, usize)> = layer
            .iter()
            .map(|&v| {
                let preds = &incoming[v];
                let key = if preds.is_empty() {
                    v as f64
                } else {
                    preds.iter().map(|u| slot[*u] as f64).sum::<f64>() / preds.len() as f64
                };
                (key, v)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        *layer = keyed.into_iter().map(|(_, v)| v).collect();
        for (i, v) in layer.iter().enumerate() {
            slot[*v] = i;
        }
    }
    layers
}

/// Centre of every node as `(x, y)`.
fn place_centres(
    layers: &[Vec<usize>],
    footprints: &[Size],
    direction: LayoutDirection,
    options: &LayoutOptions,
) -> Vec<(f64, f64)> {
    // (primary extent, secondary extent)
    let extent = |v: usize| {
        let fp = footprints[v];
        match direction {
            LayoutDirection::TopToBottom => (fp.height, fp.width),
            LayoutDirection::LeftToRight => (fp.width, fp.height),
        }
    };

    let mut centres = vec![(0.0, 0.0); footprints.len()];
    let mut primary = 0.0;
    for layer in layers {
        let depth = layer.iter().map(|v| extent(*v).0).fold(0.0, f64::max);
        let span: f64 = layer.iter().map(|v| extent(*v).1).sum::<f64>()
            + options.node_gap * layer.len().saturating_sub(1) as f64;

        let mut secondary = -span / 2.0;
        for &v in layer {
            let width = extent(v).1;
            let (p, s) = (primary + depth / 2.0, secondary + width / 2.0);
            centres[v] = match direction {
                LayoutDirection::TopToBottom => (s, p),
                LayoutDirection::LeftToRight => (p, s),
            };
            secondary += width + options.node_gap;
        }
        primary += depth + options.rank_gap;
    }
    centres
}
