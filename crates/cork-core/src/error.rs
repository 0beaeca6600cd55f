//! Error taxonomy shared by every board component.
//!
//! All store failures are local: the rejected call leaves the store
//! untouched, and callers abort only the current gesture or batch.

use crate::id::{EdgeId, NodeId};
use crate::model::NodeKind;

pub type Result<T> = std::result::Result<T, BoardError>;

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("edge not found: {0}")]
    EdgeNotFound(EdgeId),

    #[error("duplicate id: {0}")]
    DuplicateId(String),

    #[error("invalid edge endpoint for {edge}: {reason}")]
    InvalidEndpoint { edge: EdgeId, reason: String },

    #[error("payload kind {found} does not match node kind {expected} on {id}")]
    KindMismatch {
        id: NodeId,
        expected: NodeKind,
        found: NodeKind,
    },

    #[error("invalid geometry on {id}: {reason}")]
    InvalidGeometry { id: NodeId, reason: &'static str },

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("{0} is not attached")]
    Unavailable(&'static str),

    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("snapshot decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

impl BoardError {
    /// True for the "operation references a missing node/edge" class.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NodeNotFound(_) | Self::EdgeNotFound(_))
    }
}
