//! The board: store, history, interaction and collaborators in one place.
//!
//! `Board` is what the dispatcher and host bridges talk to. Every document
//! change it makes goes through `History`; viewport changes do not. Gesture
//! and batch failures become `Notice`s for the host to show, and are
//! logged; they never abort the session.

use crate::history::History;
use crate::import;
use crate::input::InputEvent;
use crate::interaction::{InteractionController, Overlay};
use crate::library::{Library, SettingsStore, SnapshotStore, config_from_settings};
use crate::mutation::Mutation;
use cork_core::{
    BoardConfig, BoardError, Edge, GraphStore, LayoutDirection, LayoutResult, Node, NodeId, NodePayload, Point,
    Position, Result, SceneView, Selection, Size, Snapshot, Theme, Viewport, layout,
};
use std::collections::HashMap;
use std::fmt;

/// A non-blocking message for the host (toast, status bar…).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub struct Board {
    pub store: GraphStore,
    pub history: History,
    pub config: BoardConfig,
    controller: InteractionController,
    screen: Size,
    library: Option<Box<dyn Library>>,
    snapshots: Option<Box<dyn SnapshotStore>>,
    notices: Vec<Notice>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

impl Board {
    pub fn new(config: BoardConfig) -> Self {
        Self {
            store: GraphStore::with_zoom_limits(config.zoom),
            history: History::new(config.history_depth),
            config,
            controller: InteractionController::new(),
            screen: Size::new(1280.0, 800.0),
            library: None,
            snapshots: None,
            notices: Vec::new(),
        }
    }

    pub fn with_settings(settings: &dyn SettingsStore) -> Self {
        Self::new(config_from_settings(settings))
    }

    pub fn attach_library(&mut self, library: Box<dyn Library>) {
        self.library = Some(library);
    }

    pub fn attach_snapshots(&mut self, snapshots: Box<dyn SnapshotStore>) {
        self.snapshots = Some(snapshots);
    }

    /// Swap in a new config; zoom limits and history depth take effect now.
    pub fn apply_config(&mut self, config: BoardConfig) {
        self.store.set_zoom_limits(config.zoom);
        self.history.set_max_depth(config.history_depth);
        self.config = config;
    }

    pub fn set_screen_size(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.screen = Size::new(width, height);
        }
    }

    pub fn screen_size(&self) -> Size {
        self.screen
    }

    /// Canvas point under the middle of the screen.
    pub fn viewport_centre(&self) -> Point {
        self.store
            .viewport()
            .to_canvas(Point::new(self.screen.width / 2.0, self.screen.height / 2.0))
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Feed one input event. Returns the dispatcher command a shortcut
    /// resolved to; a failed gesture becomes a notice.
    pub fn handle_input(&mut self, event: &InputEvent) -> Option<&'static str> {
        match self
            .controller
            .handle(event, &mut self.store, &mut self.history, &self.config)
        {
            Ok(command) => command,
            Err(err) => {
                self.notice(format!("Gesture discarded: {err}"));
                None
            }
        }
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn overlay(&self) -> Option<Overlay> {
        self.controller.overlay(&self.store)
    }

    pub fn scene(&self, theme: &Theme) -> SceneView {
        SceneView::build(&self.store, theme)
    }

    // ─── Create / delete ─────────────────────────────────────────────────

    /// Add a node centred in the view and select it. Nodes added in a row
    /// cascade by `duplicate_offset` instead of stacking.
    pub fn add_node_at_centre(&mut self, payload: NodePayload) -> Result<NodeId> {
        let kind = payload.kind();
        let size = kind.default_size();
        let c = self.viewport_centre();
        let mut pos = Position::new(c.x - size.width / 2.0, c.y - size.height / 2.0);
        if self.config.snap_to_grid {
            pos = pos.snapped(self.config.grid_size);
        }
        let step = self.config.duplicate_offset;
        while step > 0.0 && self.store.nodes().any(|n| n.position == pos) {
            pos = pos.offset(step, step);
        }

        let id = self.store.fresh_node_id(kind.as_str());
        let result = self.history.execute(
            &mut self.store,
            Mutation::add_node(Node::new(id, pos, payload)),
            &format!("Add {kind}"),
        );
        self.noted(result)?;
        self.store.set_selection(Selection::from_nodes([id]));
        Ok(id)
    }

    /// Delete selected nodes and edges as one command. Returns how many
    /// entities were named for deletion (cascaded edges not counted).
    pub fn delete_selection(&mut self) -> Result<usize> {
        let sel = self.store.selection().clone();
        let mut mutations: Vec<Mutation> = sel
            .edges()
            .iter()
            .filter(|id| {
                self.store
                    .edge(**id)
                    .is_some_and(|e| !sel.contains_node(e.source_id) && !sel.contains_node(e.target_id))
            })
            .map(|id| Mutation::RemoveEdge { id: *id })
            .collect();
        mutations.extend(sel.nodes().iter().map(|id| Mutation::RemoveNode { id: *id }));

        let count = mutations.len();
        if count == 0 {
            return Ok(0);
        }
        let description = match count {
            1 => "Delete 1 item".to_string(),
            n => format!("Delete {n} items"),
        };
        let result = self.history.execute_batch(&mut self.store, mutations, &description);
        self.noted(result)?;
        Ok(count)
    }

    /// Copy the selected nodes (and edges running between them) with an
    /// offset, then select the copies.
    pub fn duplicate_selection(&mut self) -> Result<Vec<NodeId>> {
        let offset = self.config.duplicate_offset;
        let mut copies: HashMap<NodeId, NodeId> = HashMap::new();
        let mut mutations = Vec::new();
        for node in self.store.nodes() {
            if !self.store.selection().contains_node(node.id) {
                continue;
            }
            let mut copy = node.clone();
            copy.id = self.store.fresh_node_id(node.kind().as_str());
            copy.position = node.position.offset(offset, offset);
            copies.insert(node.id, copy.id);
            mutations.push(Mutation::add_node(copy));
        }
        if mutations.is_empty() {
            return Ok(Vec::new());
        }
        for edge in self.store.edges() {
            if let (Some(s), Some(t)) = (copies.get(&edge.source_id), copies.get(&edge.target_id)) {
                let copy = Edge {
                    id: self.store.fresh_edge_id("edge"),
                    source_id: *s,
                    target_id: *t,
                    ..edge.clone()
                };
                mutations.push(Mutation::add_edge(copy));
            }
        }

        let ids: Vec<NodeId> = mutations
            .iter()
            .filter_map(|m| match m {
                Mutation::AddNode { node, .. } => Some(node.id),
                _ => None,
            })
            .collect();
        let description = match ids.len() {
            1 => "Duplicate node".to_string(),
            n => format!("Duplicate {n} nodes"),
        };
        let result = self.history.execute_batch(&mut self.store, mutations, &description);
        self.noted(result)?;
        self.store.set_selection(Selection::from_nodes(ids.iter().copied()));
        Ok(ids)
    }

    pub fn select_all(&mut self) {
        self.store.select_all();
    }

    pub fn deselect(&mut self) {
        self.store.clear_selection();
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> Result<Option<String>> {
        let result = self.history.undo(&mut self.store);
        self.noted(result)
    }

    pub fn redo(&mut self) -> Result<Option<String>> {
        let result = self.history.redo(&mut self.store);
        self.noted(result)
    }

    // ─── Layout & import ─────────────────────────────────────────────────

    /// Re-flow the board as one undoable move.
    pub fn auto_layout(&mut self, direction: LayoutDirection) -> Result<LayoutResult> {
        let result = layout::auto_layout(&self.store, direction, &self.config.layout);
        let moves: Vec<(NodeId, Position)> = result
            .positions
            .iter()
            .filter(|(id, p)| self.store.node(*id).is_some_and(|n| n.position != *p))
            .copied()
            .collect();
        if !moves.is_empty() {
            let result = self
                .history
                .execute(&mut self.store, Mutation::SetPositions { moves }, "Auto layout");
            self.noted(result)?;
        }
        Ok(result)
    }

    /// Import every new library entity around the view centre as one
    /// command, then select what was added.
    pub fn import_from_library(&mut self) -> Result<Vec<NodeId>> {
        let library = self
            .library
            .as_ref()
            .ok_or(BoardError::Unavailable("media library"))?;
        let candidates = library.list_entities();
        let plan = import::reconcile(&self.store, &candidates, &self.config, self.viewport_centre());

        if let Some(command) = plan.command {
            let result = self.history.perform(&mut self.store, command);
            self.noted(result)?;
            self.store.set_selection(Selection::from_nodes(plan.added.iter().copied()));
        }
        Ok(plan.added)
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    pub fn serialize(&self) -> Snapshot {
        Snapshot::capture(&self.store)
    }

    /// Replace the whole board. History is cleared on success; on failure
    /// nothing changes.
    pub fn deserialize(&mut self, snapshot: Snapshot) -> Result<()> {
        self.controller.cancel(&mut self.store);
        let result = snapshot.restore_into(&mut self.store);
        self.noted(result)?;
        self.history.clear();
        Ok(())
    }

    /// Write the board to the attached snapshot store. Failures are
    /// reported as notices too.
    pub fn save(&mut self) -> Result<()> {
        let snapshot = Snapshot::capture(&self.store);
        let result = match self.snapshots.as_mut() {
            Some(store) => store.save(&snapshot),
            None => Err(BoardError::Unavailable("snapshot store")),
        };
        self.noted(result)
    }

    /// Load the saved board, if any. Returns whether one was found.
    pub fn load(&mut self) -> Result<bool> {
        let saved = match self.snapshots.as_ref() {
            Some(store) => store.load(),
            None => Err(BoardError::Unavailable("snapshot store")),
        };
        match self.noted(saved)? {
            Some(snapshot) => {
                self.deserialize(snapshot)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) {
        self.zoom_by(self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(1.0 / self.config.zoom_step);
    }

    fn zoom_by(&mut self, factor: f64) {
        let anchor = Point::new(self.screen.width / 2.0, self.screen.height / 2.0);
        self.store.zoom_at(anchor, factor);
    }

    /// Fit all content on screen; an empty board resets the view.
    pub fn zoom_to_fit(&mut self) {
        let viewport = match self.store.content_bounds() {
            Some(content) => Viewport::fitting(
                content,
                self.screen,
                self.config.fit_padding,
                self.store.zoom_limits(),
            ),
            None => Viewport::default(),
        };
        self.store.set_viewport(viewport);
    }

    pub fn toggle_snap(&mut self) -> bool {
        self.config.snap_to_grid = !self.config.snap_to_grid;
        self.config.snap_to_grid
    }

    // ─── Notices ─────────────────────────────────────────────────────────

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notice(&mut self, message: String) {
        log::warn!("{message}");
        self.notices.push(Notice { message });
    }

    fn noted<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.notice(err.to_string());
        }
        result
    }
}
