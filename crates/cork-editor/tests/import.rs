//! Integration tests: library import reconciliation (cork-editor).

use cork_core::{NodeId, NodeKind, NodePayload, Position};
use cork_editor::hit::overlaps;
use cork_editor::{Board, LibraryEntity, MemoryLibrary};
use pretty_assertions::assert_eq;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn library(refs: &[&str]) -> MemoryLibrary {
    MemoryLibrary::new(
        refs.iter()
            .map(|r| LibraryEntity::new(*r, format!("Title {r}")))
            .collect(),
    )
}

fn media_refs(board: &Board) -> Vec<String> {
    board
        .store
        .nodes()
        .filter_map(|n| n.payload.media_ref().map(str::to_string))
        .collect()
}

#[test]
fn only_new_entities_are_added() {
    init();
    let mut board = Board::default();
    // M = 2 already on the board, one of them moved by the user.
    for (i, r) in ["tt01", "tt03"].iter().enumerate() {
        board
            .store
            .add_node(cork_core::Node::new(
                NodeId::intern(&format!("im_existing_{i}")),
                Position::new(-900.0, 300.0 * i as f64),
                NodePayload::Media {
                    media_ref_id: r.to_string(),
                    cached_title: "kept".into(),
                    cached_poster_url: None,
                },
            ))
            .unwrap();
    }
    board.attach_library(Box::new(library(&["tt01", "tt02", "tt03", "tt04", "tt05"])));

    let added = board.import_from_library().unwrap();
    assert_eq!(added.len(), 5 - 2);
    assert_eq!(board.store.node_count(), 5);
    assert_eq!(
        board.store.node(NodeId::intern("im_existing_0")).unwrap().position,
        Position::new(-900.0, 0.0)
    );
    let mut refs = media_refs(&board);
    refs.sort();
    assert_eq!(refs, ["tt01", "tt02", "tt03", "tt04", "tt05"]);
    assert_eq!(board.store.selection().nodes(), added.as_slice());
}

#[test]
fn reimport_is_idempotent() {
    init();
    let mut board = Board::default();
    board.attach_library(Box::new(library(&["a", "b", "c"])));

    assert_eq!(board.import_from_library().unwrap().len(), 3);
    let undo_len = board.history.undo_len();

    assert!(board.import_from_library().unwrap().is_empty());
    assert_eq!(board.store.node_count(), 3);
    assert_eq!(board.history.undo_len(), undo_len);
}

#[test]
fn imported_cards_do_not_overlap_anything() {
    init();
    let mut board = Board::default();
    board.add_node_at_centre(NodePayload::sticky("in the way")).unwrap();
    let refs: Vec<String> = (0..12).map(|i| format!("ov{i}")).collect();
    let refs: Vec<&str> = refs.iter().map(String::as_str).collect();
    board.attach_library(Box::new(library(&refs)));

    board.import_from_library().unwrap();
    let bounds: Vec<_> = board.store.nodes().map(|n| n.bounds()).collect();
    assert_eq!(bounds.len(), 13);
    for (i, a) in bounds.iter().enumerate() {
        for b in &bounds[i + 1..] {
            assert!(!overlaps(*a, *b), "{a:?} overlaps {b:?}");
        }
    }
}

#[test]
fn import_is_one_undo_step() {
    init();
    let mut board = Board::default();
    board.attach_library(Box::new(library(&["u1", "u2"])));
    board.import_from_library().unwrap();
    assert_eq!(board.history.undo_description(), Some("Import 2 items"));

    board.undo().unwrap();
    assert!(board.store.is_empty());
    board.redo().unwrap();
    assert!(board.store.nodes().all(|n| n.kind() == NodeKind::Media));
    assert_eq!(board.store.node_count(), 2);
}

#[test]
fn import_without_library_changes_nothing() {
    init();
    let mut board = Board::default();
    assert!(board.import_from_library().is_err());
    assert!(board.store.is_empty());
    assert!(!board.history.can_undo());
}
