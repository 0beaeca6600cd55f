//! Persisted board shape.
//!
//! A `Snapshot` is the stable form handed to whatever storage the host
//! picks: nodes in z-order, edges in edge order, and an optional viewport
//! hint. JSON is the interchange form; MessagePack (named fields) is the
//! compact form for local caches.

use crate::error::Result;
use crate::model::{Edge, Node, Viewport};
use crate::store::GraphStore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport_hint: Option<Viewport>,
}

impl Snapshot {
    /// Capture the store's graph and viewport.
    pub fn capture(store: &GraphStore) -> Self {
        Self {
            nodes: store.nodes().cloned().collect(),
            edges: store.edges().cloned().collect(),
            viewport_hint: Some(store.viewport()),
        }
    }

    /// Replace the store's graph with this snapshot (atomic; see
    /// `GraphStore::replace_all`). The viewport hint, if any, is applied
    /// only after the graph swap succeeded.
    pub fn restore_into(self, store: &mut GraphStore) -> Result<()> {
        let viewport = self.viewport_hint;
        store.replace_all(self.nodes, self.edges)?;
        if let Some(vp) = viewport {
            store.set_viewport(vp);
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// MessagePack with field names, so optional fields may be omitted.
    pub fn to_msgpack(&self) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
