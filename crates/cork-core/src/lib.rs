pub mod config;
pub mod error;
pub mod id;
pub mod layout;
pub mod model;
pub mod scene;
pub mod snapshot;
pub mod store;

pub use config::BoardConfig;
pub use error::{BoardError, Result};
pub use id::{EdgeId, NodeId};
pub use layout::{LayoutDirection, LayoutOptions, LayoutResult, auto_layout};
pub use model::*;
pub use scene::{SceneView, Theme};
pub use snapshot::Snapshot;
pub use store::{GraphStore, RemovedNode, Selection, StoreChange};

// Geometry types appear in public signatures; re-export so downstream crates
// can name them without a direct dependency.
pub use kurbo::{Point, Rect};
