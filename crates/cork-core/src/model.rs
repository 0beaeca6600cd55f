//! Core data model for a board: nodes, edges, viewport.
//!
//! Nodes are cards placed freely on an infinite canvas. Each node carries a
//! payload whose variant is its kind (card, sticky, web link, media item).
//! Edges are directed connections between two nodes' anchor handles.
//! Positions are top-left anchored in canvas space; the viewport maps canvas
//! space onto the screen and is never part of undo history.

use crate::id::{EdgeId, NodeId};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Geometry ────────────────────────────────────────────────────────────

/// A point in canvas coordinates (origin arbitrary, not tied to the viewport).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Round both coordinates to the nearest multiple of `grid`.
    pub fn snapped(self, grid: f64) -> Self {
        if grid <= 0.0 {
            return self;
        }
        Self::new((self.x / grid).round() * grid, (self.y / grid).round() * grid)
    }

    pub fn to_point(self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl From<Point> for Position {
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y)
    }
}

/// Explicit node footprint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Finite and strictly positive in both dimensions.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

// ─── Node kinds & payloads ───────────────────────────────────────────────

/// Variant discriminator of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Card,
    Sticky,
    Web,
    Media,
}

impl NodeKind {
    pub const ALL: [NodeKind; 4] = [Self::Card, Self::Sticky, Self::Web, Self::Media];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Sticky => "sticky",
            Self::Web => "web",
            Self::Media => "media",
        }
    }

    /// Footprint used when a node has no explicit size.
    pub fn default_size(self) -> Size {
        match self {
            Self::Card => Size::new(200.0, 100.0),
            Self::Sticky => Size::new(200.0, 200.0),
            Self::Web => Size::new(280.0, 120.0),
            Self::Media => Size::new(160.0, 240.0),
        }
    }

    /// Media cards keep their poster footprint; everything else resizes.
    pub fn is_resizable(self) -> bool {
        !matches!(self, Self::Media)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default sticky-note colour (pale yellow).
pub const DEFAULT_STICKY_COLOR: &str = "#fef08a";

/// Variant-specific node data. One shape per kind; the variant *is* the kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "kind",
    content = "payload",
    rename_all = "lowercase",
    rename_all_fields = "camelCase"
)]
pub enum NodePayload {
    Card {
        label: String,
    },
    Sticky {
        text: String,
        color: String,
    },
    Web {
        url: String,
        label: String,
    },
    Media {
        media_ref_id: String,
        cached_title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cached_poster_url: Option<String>,
    },
}

impl NodePayload {
    pub fn card(label: impl Into<String>) -> Self {
        Self::Card {
            label: label.into(),
        }
    }

    pub fn sticky(text: impl Into<String>) -> Self {
        Self::Sticky {
            text: text.into(),
            color: DEFAULT_STICKY_COLOR.to_string(),
        }
    }

    pub fn web(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self::Web {
            url: url.into(),
            label: label.into(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Card { .. } => NodeKind::Card,
            Self::Sticky { .. } => NodeKind::Sticky,
            Self::Web { .. } => NodeKind::Web,
            Self::Media { .. } => NodeKind::Media,
        }
    }

    /// The primary human-readable text of the payload.
    pub fn caption(&self) -> &str {
        match self {
            Self::Card { label } | Self::Web { label, .. } => label,
            Self::Sticky { text, .. } => text,
            Self::Media { cached_title, .. } => cached_title,
        }
    }

    /// Library reference carried by media payloads.
    pub fn media_ref(&self) -> Option<&str> {
        match self {
            Self::Media { media_ref_id, .. } => Some(media_ref_id),
            _ => None,
        }
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// A positioned visual unit on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(flatten)]
    pub payload: NodePayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Node {
    pub fn new(id: NodeId, position: Position, payload: NodePayload) -> Self {
        Self {
            id,
            position,
            size: None,
            payload,
            color: None,
        }
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.payload.kind()
    }

    /// Explicit size, or the kind's default.
    pub fn effective_size(&self) -> Size {
        self.size.unwrap_or_else(|| self.kind().default_size())
    }

    /// Canvas-space bounding box.
    pub fn bounds(&self) -> Rect {
        let size = self.effective_size();
        Rect::from_origin_size(self.position.to_point(), (size.width, size.height))
    }

    /// Canvas-space location of an anchor handle (midpoint of a side).
    pub fn anchor(&self, handle: Handle) -> Point {
        let b = self.bounds();
        match handle {
            Handle::Top => Point::new(b.center().x, b.y0),
            Handle::Right => Point::new(b.x1, b.center().y),
            Handle::Bottom => Point::new(b.center().x, b.y1),
            Handle::Left => Point::new(b.x0, b.center().y),
        }
    }
}

/// Partial update of a node. `None` leaves a field alone; for the optional
/// fields, `Some(None)` clears the value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodePatch {
    pub position: Option<Position>,
    pub size: Option<Option<Size>>,
    pub payload: Option<NodePayload>,
    pub color: Option<Option<String>>,
}

impl NodePatch {
    pub fn position(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn size(size: Option<Size>) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    pub fn payload(payload: NodePayload) -> Self {
        Self {
            payload: Some(payload),
            ..Self::default()
        }
    }

    pub fn color(color: Option<String>) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.size.is_none()
            && self.payload.is_none()
            && self.color.is_none()
    }
}

// ─── Edges ───────────────────────────────────────────────────────────────

/// Anchor position on a node's border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    Top,
    Right,
    Bottom,
    Left,
}

impl Handle {
    pub const ALL: [Handle; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    /// Handle used when an edge leaves its source without an explicit one.
    pub const DEFAULT_SOURCE: Handle = Handle::Bottom;
    /// Handle used when an edge enters its target without an explicit one.
    pub const DEFAULT_TARGET: Handle = Handle::Top;
}

/// How the edge path is drawn between its anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveKind {
    #[default]
    Smooth,
    Straight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke_color: String,
    pub curve_kind: CurveKind,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            stroke_color: "#94a3b8".to_string(),
            curve_kind: CurveKind::Smooth,
        }
    }
}

/// A directed connection between two node anchor points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source_id: NodeId,
    pub target_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<Handle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<Handle>,
    #[serde(default)]
    pub style: EdgeStyle,
}

impl Edge {
    pub fn new(id: EdgeId, source_id: NodeId, target_id: NodeId) -> Self {
        Self {
            id,
            source_id,
            target_id,
            source_handle: None,
            target_handle: None,
            style: EdgeStyle::default(),
        }
    }

    pub fn with_handles(mut self, source: Handle, target: Handle) -> Self {
        self.source_handle = Some(source);
        self.target_handle = Some(target);
        self
    }

    pub fn with_style(mut self, style: EdgeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn source_anchor(&self) -> Handle {
        self.source_handle.unwrap_or(Handle::DEFAULT_SOURCE)
    }

    pub fn target_anchor(&self) -> Handle {
        self.target_handle.unwrap_or(Handle::DEFAULT_TARGET)
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.source_id == node || self.target_id == node
    }
}

// ─── Viewport ────────────────────────────────────────────────────────────

/// Allowed zoom range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
}

impl ZoomLimits {
    /// Whether the range is positive, finite and not inverted.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min > 0.0 && self.min <= self.max
    }

    /// The range itself when valid, otherwise the default range.
    #[must_use]
    pub fn normalized(self) -> Self {
        if self.is_valid() { self } else { Self::default() }
    }

    /// Clamp `zoom` into the range. Non-finite zoom maps to 1.0 first.
    pub fn clamp(&self, zoom: f64) -> f64 {
        let Self { min, max } = self.normalized();
        let zoom = if zoom.is_finite() { zoom } else { 1.0 };
        zoom.clamp(min, max)
    }
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self { min: 0.1, max: 4.0 }
    }
}

/// Canvas → screen mapping: `screen = canvas * zoom + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub offset_x: f64,
    pub offset_y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn to_canvas(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.offset_x) / self.zoom,
            (screen.y - self.offset_y) / self.zoom,
        )
    }

    pub fn to_screen(&self, canvas: Point) -> Point {
        Point::new(
            canvas.x * self.zoom + self.offset_x,
            canvas.y * self.zoom + self.offset_y,
        )
    }

    pub fn panned(self, dx: f64, dy: f64) -> Self {
        Self {
            offset_x: self.offset_x + dx,
            offset_y: self.offset_y + dy,
            ..self
        }
    }

    /// Scale by `factor`, keeping the canvas point under `anchor` (screen
    /// coordinates) fixed on screen.
    pub fn zoomed_at(self, anchor: Point, factor: f64, limits: ZoomLimits) -> Self {
        let zoom = limits.clamp(self.zoom * factor);
        let canvas = self.to_canvas(anchor);
        Self {
            offset_x: anchor.x - canvas.x * zoom,
            offset_y: anchor.y - canvas.y * zoom,
            zoom,
        }
    }

    /// Viewport that shows `content` centred in a `screen` of the given size,
    /// leaving `padding` screen pixels on every side.
    pub fn fitting(content: Rect, screen: Size, padding: f64, limits: ZoomLimits) -> Self {
        let avail_w = (screen.width - 2.0 * padding).max(1.0);
        let avail_h = (screen.height - 2.0 * padding).max(1.0);
        let zoom = if content.width() > 0.0 && content.height() > 0.0 {
            limits.clamp((avail_w / content.width()).min(avail_h / content.height()))
        } else {
            limits.clamp(1.0)
        };
        let c = content.center();
        Self {
            offset_x: screen.width / 2.0 - c.x * zoom,
            offset_y: screen.height / 2.0 - c.y * zoom,
            zoom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_kind_matches_variant() {
        assert_eq!(NodePayload::card("a").kind(), NodeKind::Card);
        assert_eq!(NodePayload::sticky("b").kind(), NodeKind::Sticky);
        assert_eq!(NodePayload::web("https://x.dev", "x").kind(), NodeKind::Web);
    }

    #[test]
    fn node_serializes_kind_and_payload_side_by_side() {
        let node = Node::new(
            NodeId::intern("n_json"),
            Position::new(10.0, 20.0),
            NodePayload::card("Hello"),
        );
        let v = serde_json::to_value(&node).unwrap();
        assert_eq!(v["kind"], "card");
        assert_eq!(v["payload"]["label"], "Hello");
        assert_eq!(v["position"]["x"], 10.0);
        assert!(v.get("size").is_none());
        assert!(v.get("color").is_none());

        let back: Node = serde_json::from_value(v).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn media_payload_uses_camel_case_fields() {
        let payload = NodePayload::Media {
            media_ref_id: "tt0133093".into(),
            cached_title: "The Matrix".into(),
            cached_poster_url: None,
        };
        let v = serde_json::to_value(&payload).unwrap();
        assert_eq!(v["kind"], "media");
        assert_eq!(v["payload"]["mediaRefId"], "tt0133093");
        assert_eq!(v["payload"]["cachedTitle"], "The Matrix");
    }

    #[test]
    fn effective_size_falls_back_to_kind_default() {
        let node = Node::new(NodeId::intern("n_sz"), Position::default(), NodePayload::sticky(""));
        assert_eq!(node.effective_size(), NodeKind::Sticky.default_size());
        let node = node.with_size(Size::new(50.0, 60.0));
        assert_eq!(node.effective_size(), Size::new(50.0, 60.0));
    }

    #[test]
    fn anchors_sit_on_side_midpoints() {
        let node = Node::new(NodeId::intern("n_anchor"), Position::new(0.0, 0.0), NodePayload::card(""))
            .with_size(Size::new(100.0, 40.0));
        assert_eq!(node.anchor(Handle::Top), Point::new(50.0, 0.0));
        assert_eq!(node.anchor(Handle::Right), Point::new(100.0, 20.0));
        assert_eq!(node.anchor(Handle::Bottom), Point::new(50.0, 40.0));
        assert_eq!(node.anchor(Handle::Left), Point::new(0.0, 20.0));
    }

    #[test]
    fn snapping_rounds_to_grid() {
        let p = Position::new(23.0, -7.0).snapped(20.0);
        assert_eq!(p, Position::new(20.0, 0.0));
        let p = Position::new(31.0, 49.0).snapped(20.0);
        assert_eq!(p, Position::new(40.0, 40.0));
    }

    #[test]
    fn viewport_roundtrips_points() {
        let vp = Viewport {
            offset_x: 30.0,
            offset_y: -10.0,
            zoom: 2.0,
        };
        let canvas = Point::new(5.0, 7.0);
        let screen = vp.to_screen(canvas);
        assert_eq!(screen, Point::new(40.0, 4.0));
        assert_eq!(vp.to_canvas(screen), canvas);
    }

    #[test]
    fn zoom_keeps_anchor_fixed_and_clamps() {
        let limits = ZoomLimits { min: 0.5, max: 2.0 };
        let vp = Viewport::default();
        let anchor = Point::new(100.0, 100.0);
        let before = vp.to_canvas(anchor);
        let zoomed = vp.zoomed_at(anchor, 10.0, limits);
        assert_eq!(zoomed.zoom, 2.0);
        let after = zoomed.to_canvas(anchor);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn unusable_limits_clamp_with_the_default_range() {
        for limits in [
            ZoomLimits { min: 5.0, max: 1.0 },
            ZoomLimits { min: 0.0, max: 2.0 },
            ZoomLimits { min: f64::NAN, max: 2.0 },
        ] {
            assert!(!limits.is_valid());
            assert_eq!(limits.clamp(100.0), 4.0);
            assert_eq!(limits.clamp(f64::INFINITY), 1.0);
            let zoomed = Viewport::default().zoomed_at(Point::new(5.0, 5.0), 0.001, limits);
            assert_eq!(zoomed.zoom, 0.1);
        }
    }

    #[test]
    fn fitting_centres_content() {
        let content = Rect::new(0.0, 0.0, 200.0, 100.0);
        let vp = Viewport::fitting(content, Size::new(400.0, 400.0), 0.0, ZoomLimits::default());
        assert_eq!(vp.zoom, 2.0);
        let centre = vp.to_screen(content.center());
        assert!((centre.x - 200.0).abs() < 1e-9);
        assert!((centre.y - 200.0).abs() < 1e-9);
    }
}
