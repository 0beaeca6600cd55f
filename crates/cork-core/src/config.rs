//! Board configuration.
//!
//! Every field has a default, so a partial JSON object (or an empty
//! settings store) yields a usable config.

use crate::error::Result;
use crate::layout::LayoutOptions;
use crate::model::{EdgeStyle, ZoomLimits};
use serde::{Deserialize, Serialize};

// ─── Setting keys ─────────────────────────────────────────────────────────

pub const KEY_SNAP_TO_GRID: &str = "canvas.snapToGrid";
pub const KEY_GRID_SIZE: &str = "canvas.gridSize";
pub const KEY_MIN_ZOOM: &str = "canvas.minZoom";
pub const KEY_MAX_ZOOM: &str = "canvas.maxZoom";
pub const KEY_HISTORY_DEPTH: &str = "canvas.historyDepth";

// ─── Config ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoardConfig {
    /// Round committed drag positions to `grid_size`. Default: **false**.
    pub snap_to_grid: bool,

    /// Grid pitch in canvas units. Default: 20.
    pub grid_size: f64,

    pub zoom: ZoomLimits,

    /// Maximum undo depth. Default: 200.
    pub history_depth: usize,

    pub layout: LayoutOptions,

    /// Style given to edges created by a connect gesture.
    pub edge_style: EdgeStyle,

    /// Screen-space radius (px) within which an anchor handle is hit.
    pub handle_radius: f64,

    /// Screen-space tolerance (px) for hitting an edge line.
    pub edge_tolerance: f64,

    /// Smallest size a resize gesture may commit.
    pub min_node_size: f64,

    /// Canvas offset applied to duplicated nodes.
    pub duplicate_offset: f64,

    /// Gap between imported media cards.
    pub import_gap: f64,

    /// Zoom factor applied by the zoom-in / zoom-out commands.
    pub zoom_step: f64,

    /// Screen padding kept around content by zoom-to-fit.
    pub fit_padding: f64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            snap_to_grid: false,
            grid_size: 20.0,
            zoom: ZoomLimits::default(),
            history_depth: 200,
            layout: LayoutOptions::default(),
            edge_style: EdgeStyle::default(),
            handle_radius: 8.0,
            edge_tolerance: 6.0,
            min_node_size: 40.0,
            duplicate_offset: 20.0,
            import_gap: 24.0,
            zoom_step: 1.2,
            fit_padding: 48.0,
        }
    }
}

impl BoardConfig {
    /// Parse a (possibly partial) JSON config object.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        if !config.zoom.is_valid() {
            log::warn!("ignoring invalid zoom range {}..{}", config.zoom.min, config.zoom.max);
            config.zoom = ZoomLimits::default();
        }
        Ok(config)
    }

    /// Build a config from a key/value setting lookup. Missing or
    /// unparsable values keep their defaults.
    pub fn from_settings(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(v) = parse_setting::<bool>(&get, KEY_SNAP_TO_GRID) {
            config.snap_to_grid = v;
        }
        if let Some(v) = parse_setting::<f64>(&get, KEY_GRID_SIZE).filter(|g| *g > 0.0) {
            config.grid_size = v;
        }
        if let Some(v) = parse_setting::<f64>(&get, KEY_MIN_ZOOM).filter(|z| *z > 0.0) {
            config.zoom.min = v;
        }
        if let Some(v) = parse_setting::<f64>(&get, KEY_MAX_ZOOM).filter(|z| *z > 0.0) {
            config.zoom.max = v;
        }
        if !config.zoom.is_valid() {
            log::warn!(
                "ignoring invalid zoom range {}..{}",
                config.zoom.min,
                config.zoom.max
            );
            config.zoom = ZoomLimits::default();
        }
        if let Some(v) = parse_setting::<usize>(&get, KEY_HISTORY_DEPTH).filter(|d| *d > 0) {
            config.history_depth = v;
        }
        config
    }
}

fn parse_setting<T: std::str::FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = get(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("ignoring unparsable setting {key}={raw:?}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = BoardConfig::from_json(r#"{"snapToGrid": true, "gridSize": 10}"#).unwrap();
        assert!(config.snap_to_grid);
        assert_eq!(config.grid_size, 10.0);
        assert_eq!(config.history_depth, 200);
    }

    #[test]
    fn settings_override_defaults() {
        let settings: HashMap<&str, &str> = HashMap::from([
            (KEY_SNAP_TO_GRID, "true"),
            (KEY_GRID_SIZE, "16"),
            (KEY_MAX_ZOOM, "3"),
            (KEY_HISTORY_DEPTH, "nope"),
        ]);
        let config = BoardConfig::from_settings(|k| settings.get(k).map(|v| v.to_string()));
        assert!(config.snap_to_grid);
        assert_eq!(config.grid_size, 16.0);
        assert_eq!(config.zoom.max, 3.0);
        assert_eq!(config.history_depth, 200);
    }

    #[test]
    fn inverted_zoom_range_falls_back() {
        let config = BoardConfig::from_settings(|k| match k {
            KEY_MIN_ZOOM => Some("5".into()),
            KEY_MAX_ZOOM => Some("2".into()),
            _ => None,
        });
        assert_eq!(config.zoom, ZoomLimits::default());
    }

    #[test]
    fn inverted_zoom_range_in_json_falls_back() {
        let config = BoardConfig::from_json(r#"{"zoom": {"min": 5.0, "max": 1.0}}"#).unwrap();
        assert_eq!(config.zoom, ZoomLimits::default());

        let mut store = crate::GraphStore::new();
        store.set_zoom_limits(config.zoom);
        store.zoom_at(kurbo::Point::new(10.0, 10.0), 100.0);
        assert_eq!(store.viewport().zoom, 4.0);
    }
}
