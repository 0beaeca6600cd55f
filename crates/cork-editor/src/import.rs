//! Import reconciler: merges library entities into the board as media cards.
//!
//! First writer wins. A candidate whose reference id already sits on a
//! media node (or appeared earlier in the same batch) is skipped, so a user
//! who moved or recoloured a card never has it overwritten, and re-running
//! an import is a no-op. The reconciler only ever adds.
//!
//! New cards go on a grid that spirals outward from a centre point, one
//! media footprint plus `import_gap` per cell, skipping cells that overlap
//! anything already on the board or placed earlier in the batch.

use crate::history::Command;
use crate::library::LibraryEntity;
use crate::mutation::Mutation;
use cork_core::{BoardConfig, GraphStore, Node, NodeId, NodeKind, NodePayload, Point, Position, Rect};
use std::collections::HashSet;

/// Rings searched before falling back to a row under the existing content.
const MAX_RINGS: i64 = 256;

/// What an import would do. Nothing is applied until `command` is performed.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportPlan {
    /// One composite command adding every new card; `None` when nothing is new.
    pub command: Option<Command>,
    pub added: Vec<NodeId>,
    /// Reference ids left alone (already present or repeated in the batch).
    pub skipped: Vec<String>,
}

pub fn reconcile(
    store: &GraphStore,
    candidates: &[LibraryEntity],
    config: &BoardConfig,
    centre: Point,
) -> ImportPlan {
    let mut seen: HashSet<&str> = store.nodes().filter_map(|n| n.payload.media_ref()).collect();
    let mut grid = SpiralGrid::new(store, config, centre);

    let mut mutations = Vec::new();
    let mut added = Vec::new();
    let mut skipped = Vec::new();
    for entity in candidates {
        let reference = entity.reference_id.as_str();
        if reference.is_empty() {
            log::warn!("import: skipping {:?} without a reference id", entity.title);
            skipped.push(String::new());
            continue;
        }
        if !seen.insert(reference) {
            skipped.push(entity.reference_id.clone());
            continue;
        }

        let id = store.fresh_node_id("media");
        let payload = NodePayload::Media {
            media_ref_id: entity.reference_id.clone(),
            cached_title: entity.title.clone(),
            cached_poster_url: entity.poster_url.clone(),
        };
        mutations.push(Mutation::add_node(Node::new(id, grid.next_free(), payload)));
        added.push(id);
    }

    log::debug!(
        "import: {} candidate(s), {} new, {} skipped",
        candidates.len(),
        added.len(),
        skipped.len()
    );
    let command = (!mutations.is_empty()).then(|| {
        let description = match mutations.len() {
            1 => "Import 1 item".to_string(),
            n => format!("Import {n} items"),
        };
        Command::new(description, mutations)
    });
    ImportPlan {
        command,
        added,
        skipped,
    }
}

/// Cell walker over square rings around the centre.
struct SpiralGrid {
    centre: Point,
    cell_w: f64,
    cell_h: f64,
    card_w: f64,
    card_h: f64,
    occupied: Vec<Rect>,
    content: Option<Rect>,
    ring: i64,
    cursor: usize,
    cells: Vec<(i64, i64)>,
    overflow: usize,
}

impl SpiralGrid {
    fn new(store: &GraphStore, config: &BoardConfig, centre: Point) -> Self {
        let card = NodeKind::Media.default_size();
        Self {
            centre,
            cell_w: card.width + config.import_gap,
            cell_h: card.height + config.import_gap,
            card_w: card.width,
            card_h: card.height,
            occupied: store.nodes().map(Node::bounds).collect(),
            content: store.content_bounds(),
            ring: 0,
            cursor: 0,
            cells: ring_cells(0),
            overflow: 0,
        }
    }

    /// Top-left of the next free cell; marks it occupied.
    fn next_free(&mut self) -> Position {
        while self.ring <= MAX_RINGS {
            while let Some(&(i, j)) = self.cells.get(self.cursor) {
                self.cursor += 1;
                let x = self.centre.x + i as f64 * self.cell_w - self.card_w / 2.0;
                let y = self.centre.y + j as f64 * self.cell_h - self.card_h / 2.0;
                let rect = Rect::new(x, y, x + self.card_w, y + self.card_h);
                if !self.occupied.iter().any(|o| crate::hit::overlaps(*o, rect)) {
                    self.occupied.push(rect);
                    return Position::new(x, y);
                }
            }
            self.ring += 1;
            self.cursor = 0;
            self.cells = ring_cells(self.ring);
        }

        // Pathologically crowded board: line up under everything.
        let below = self.content.unwrap_or_default();
        let x = below.x0 + self.overflow as f64 * self.cell_w;
        let y = below.y1 + self.cell_h - self.card_h;
        self.overflow += 1;
        Position::new(x, y)
    }
}

/// Cells with Chebyshev distance `r` from the origin: top row left to
/// right, right column down, bottom row right to left, left column up.
fn ring_cells(r: i64) -> Vec<(i64, i64)> {
    if r == 0 {
        return vec![(0, 0)];
    }
    let mut cells = Vec::with_capacity(8 * r as usize);
    for i in -r..r {
        cells.push((i, -r));
    }
    for j in -r..r {
        cells.push((r, j));
    }
    for i in (-r + 1..=r).rev() {
        cells.push((i, r));
    }
    for j in (-r + 1..=r).rev() {
        cells.push((-r, j));
    }
    cells
}
