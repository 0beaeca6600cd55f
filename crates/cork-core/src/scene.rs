//! Read-only scene projection handed to the renderer each redraw.
//!
//! The store stays the only owner of board state; a `SceneView` is a
//! throwaway, serializable picture of it with every colour, bound and edge
//! path already resolved. Light/dark is an explicit `Theme` argument.

use crate::id::{EdgeId, NodeId};
use crate::model::*;
use crate::store::GraphStore;
use kurbo::{BezPath, Point, Vec2};
use serde::Serialize;

// ─── Colors ───────────────────────────────────────────────────────────────

/// 8-bit RGBA colour used to derive shades from stored hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Rgba {
    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let bytes = hex.strip_prefix('#').unwrap_or(hex).as_bytes();
        let pair = |i: usize| -> Option<u8> { Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) };
        match bytes.len() {
            3 => Some(Self {
                r: hex_val(bytes[0])? * 17,
                g: hex_val(bytes[1])? * 17,
                b: hex_val(bytes[2])? * 17,
                a: 255,
            }),
            6 => Some(Self {
                r: pair(0)?,
                g: pair(2)?,
                b: pair(4)?,
                a: 255,
            }),
            8 => Some(Self {
                r: pair(0)?,
                g: pair(2)?,
                b: pair(4)?,
                a: pair(6)?,
            }),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Scale RGB towards black by `amount` (0 = unchanged, 1 = black).
    pub fn darken(self, amount: f64) -> Self {
        let k = 1.0 - amount.clamp(0.0, 1.0);
        let scale = |c: u8| (c as f64 * k).round() as u8;
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
            a: self.a,
        }
    }
}

// ─── Theme ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub background: &'static str,
    pub grid: &'static str,
    pub card_fill: &'static str,
    pub web_fill: &'static str,
    pub media_fill: &'static str,
    pub text: &'static str,
    pub node_border: &'static str,
    pub selection: &'static str,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            background: "#f8fafc",
            grid: "rgba(15, 23, 42, 0.06)",
            card_fill: "#ffffff",
            web_fill: "#eff6ff",
            media_fill: "#0f172a",
            text: "#0f172a",
            node_border: "#cbd5e1",
            selection: "#3b82f6",
        }
    }

    pub fn dark() -> Self {
        Self {
            background: "#0b1120",
            grid: "rgba(248, 250, 252, 0.05)",
            card_fill: "#1e293b",
            web_fill: "#172554",
            media_fill: "#020617",
            text: "#e2e8f0",
            node_border: "#334155",
            selection: "#60a5fa",
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

// ─── Views ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub id: NodeId,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: String,
    /// Colour of the folded corner on sticky notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fold: Option<String>,
    pub caption: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    pub resizable: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeView {
    pub id: EdgeId,
    pub source_id: NodeId,
    pub target_id: NodeId,
    /// SVG path data from source anchor to target anchor.
    pub path: String,
    pub stroke: String,
    pub selected: bool,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneView {
    pub viewport: Viewport,
    pub background: &'static str,
    pub grid: &'static str,
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
}

impl SceneView {
    pub fn build(store: &GraphStore, theme: &Theme) -> Self {
        let selection = store.selection();
        let nodes = store
            .nodes()
            .map(|node| node_view(node, theme, selection.contains_node(node.id)))
            .collect();

        let edges = store
            .edges()
            .filter_map(|edge| {
                let source = store.node(edge.source_id)?;
                let target = store.node(edge.target_id)?;
                Some(EdgeView {
                    id: edge.id,
                    source_id: edge.source_id,
                    target_id: edge.target_id,
                    path: edge_path(edge, source, target).to_svg(),
                    stroke: edge.style.stroke_color.clone(),
                    selected: selection.contains_edge(edge.id),
                })
            })
            .collect();

        Self {
            viewport: store.viewport(),
            background: theme.background,
            grid: theme.grid,
            nodes,
            edges,
        }
    }
}

fn node_view(node: &Node, theme: &Theme, selected: bool) -> NodeView {
    let size = node.effective_size();
    let base_fill = match &node.payload {
        NodePayload::Card { .. } => theme.card_fill.to_string(),
        NodePayload::Sticky { color, .. } => color.clone(),
        NodePayload::Web { .. } => theme.web_fill.to_string(),
        NodePayload::Media { .. } => theme.media_fill.to_string(),
    };
    let fill = node.color.clone().unwrap_or(base_fill);
    let fold = match node.payload {
        NodePayload::Sticky { .. } => Some(
            Rgba::from_hex(&fill)
                .map(|c| c.darken(0.15).to_hex())
                .unwrap_or_else(|| fill.clone()),
        ),
        _ => None,
    };
    let (url, poster_url) = match &node.payload {
        NodePayload::Web { url, .. } => (Some(url.clone()), None),
        NodePayload::Media {
            cached_poster_url, ..
        } => (None, cached_poster_url.clone()),
        _ => (None, None),
    };

    NodeView {
        id: node.id,
        kind: node.kind(),
        x: node.position.x,
        y: node.position.y,
        width: size.width,
        height: size.height,
        fill,
        fold,
        caption: node.payload.caption().to_string(),
        url,
        poster_url,
        resizable: node.kind().is_resizable(),
        selected,
    }
}

fn handle_normal(handle: Handle) -> Vec2 {
    match handle {
        Handle::Top => Vec2::new(0.0, -1.0),
        Handle::Right => Vec2::new(1.0, 0.0),
        Handle::Bottom => Vec2::new(0.0, 1.0),
        Handle::Left => Vec2::new(-1.0, 0.0),
    }
}

/// Straight segment or a cubic leaving/entering along each handle's normal.
pub fn edge_path(edge: &Edge, source: &Node, target: &Node) -> BezPath {
    let (sh, th) = (edge.source_anchor(), edge.target_anchor());
    let from = source.anchor(sh);
    let to = target.anchor(th);

    let mut path = BezPath::new();
    path.move_to(from);
    match edge.style.curve_kind {
        CurveKind::Straight => path.line_to(to),
        CurveKind::Smooth => {
            let reach = (from.distance(to) / 2.0).clamp(24.0, 160.0);
            let c1: Point = from + handle_normal(sh) * reach;
            let c2: Point = to + handle_normal(th) * reach;
            path.curve_to(c1, c2, to);
        }
    }
    path
}
