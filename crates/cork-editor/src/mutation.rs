//! Invertible store mutations.
//!
//! A `Mutation` is plain data. Applying it to a `GraphStore` returns the
//! mutation that undoes it, so history never has to guess at inverses:
//! they are captured from the store at the moment of application.

use cork_core::{Edge, EdgeId, EdgeStyle, GraphStore, Node, NodeId, NodePatch, Position, RemovedNode, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Add a node on top of the z-order, or at `index`.
    AddNode {
        node: Box<Node>,
        index: Option<usize>,
    },
    /// Remove a node together with its incident edges.
    RemoveNode {
        id: NodeId,
    },
    /// Put back a node removed by `RemoveNode`.
    RestoreNode(Box<RemovedNode>),
    UpdateNode {
        id: NodeId,
        patch: NodePatch,
    },
    SetPositions {
        moves: Vec<(NodeId, Position)>,
    },
    AddEdge {
        edge: Box<Edge>,
        index: Option<usize>,
    },
    RemoveEdge {
        id: EdgeId,
    },
    UpdateEdgeStyle {
        id: EdgeId,
        style: EdgeStyle,
    },
}

impl Mutation {
    pub fn add_node(node: Node) -> Self {
        Self::AddNode {
            node: Box::new(node),
            index: None,
        }
    }

    pub fn add_edge(edge: Edge) -> Self {
        Self::AddEdge {
            edge: Box::new(edge),
            index: None,
        }
    }

    /// Apply to the store; returns the inverse. A failing mutation leaves
    /// the store unchanged.
    pub fn apply(&self, store: &mut GraphStore) -> Result<Mutation> {
        match self {
            Self::AddNode { node, index } => {
                let slot = index.unwrap_or(store.node_count());
                let id = store.insert_node((**node).clone(), slot)?;
                Ok(Self::RemoveNode { id })
            }
            Self::RemoveNode { id } => {
                let removed = store.remove_node(*id)?;
                Ok(Self::RestoreNode(Box::new(removed)))
            }
            Self::RestoreNode(removed) => {
                let id = removed.node.id;
                store.restore_node((**removed).clone())?;
                Ok(Self::RemoveNode { id })
            }
            Self::UpdateNode { id, patch } => {
                let inverse = store.update_node(*id, patch.clone())?;
                Ok(Self::UpdateNode {
                    id: *id,
                    patch: inverse,
                })
            }
            Self::SetPositions { moves } => {
                let previous = store.set_positions(moves)?;
                Ok(Self::SetPositions { moves: previous })
            }
            Self::AddEdge { edge, index } => {
                let slot = index.unwrap_or(store.edge_count());
                let id = store.insert_edge((**edge).clone(), slot)?;
                Ok(Self::RemoveEdge { id })
            }
            Self::RemoveEdge { id } => {
                let (slot, edge) = store.remove_edge(*id)?;
                Ok(Self::AddEdge {
                    edge: Box::new(edge),
                    index: Some(slot),
                })
            }
            Self::UpdateEdgeStyle { id, style } => {
                let previous = store.update_edge_style(*id, style.clone())?;
                Ok(Self::UpdateEdgeStyle {
                    id: *id,
                    style: previous,
                })
            }
        }
    }
}

/// Apply a batch all-or-nothing. On success returns the inverse batch (in
/// application order); on failure everything already applied is rolled
/// back and the store, selection included, is as it was.
pub fn apply_all(store: &mut GraphStore, mutations: &[Mutation]) -> Result<Vec<Mutation>> {
    let selection = store.selection().clone();
    let mut inverses = Vec::with_capacity(mutations.len());
    for mutation in mutations {
        match mutation.apply(store) {
            Ok(inverse) => inverses.push(inverse),
            Err(err) => {
                rollback(store, inverses);
                store.set_selection(selection);
                return Err(err);
            }
        }
    }
    inverses.reverse();
    Ok(inverses)
}

fn rollback(store: &mut GraphStore, applied_inverses: Vec<Mutation>) {
    for inverse in applied_inverses.into_iter().rev() {
        if let Err(err) = inverse.apply(store) {
            log::warn!("rollback step failed: {err}");
        }
    }
}
