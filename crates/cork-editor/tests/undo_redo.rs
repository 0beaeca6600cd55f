//! Integration tests: history round trips through the board (cork-editor).
//!
//! Every document change made by gestures and commands must undo back to
//! the exact prior graph.

use cork_core::{LayoutDirection, Node, NodeId, NodePayload, Position, Snapshot};
use cork_editor::{Board, CommandDispatcher, InputEvent, Mutation};
use pretty_assertions::assert_eq;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn card(id: &str, x: f64, y: f64) -> Node {
    Node::new(NodeId::intern(id), Position::new(x, y), NodePayload::card(id))
}

fn position(board: &Board, id: &str) -> Position {
    board.store.node(NodeId::intern(id)).unwrap().position
}

/// Graph only; the viewport is not part of history.
fn graph(board: &Board) -> Snapshot {
    Snapshot {
        viewport_hint: None,
        ..board.serialize()
    }
}

#[test]
fn drag_then_undo_restores_origin() {
    init();
    let mut board = Board::default();
    board
        .history
        .execute(&mut board.store, Mutation::add_node(card("ur_n1", 0.0, 0.0)), "Add card")
        .unwrap();

    board.handle_input(&InputEvent::down(100.0, 50.0));
    board.handle_input(&InputEvent::moved(130.0, 80.0));
    board.handle_input(&InputEvent::moved(150.0, 100.0));
    board.handle_input(&InputEvent::up(150.0, 100.0));
    assert_eq!(position(&board, "ur_n1"), Position::new(50.0, 50.0));
    assert_eq!(board.history.undo_description(), Some("Move node"));

    board.undo().unwrap();
    assert_eq!(position(&board, "ur_n1"), Position::new(0.0, 0.0));

    board.redo().unwrap();
    assert_eq!(position(&board, "ur_n1"), Position::new(50.0, 50.0));
}

#[test]
fn snapped_drag_undoes_to_unsnapped_origin() {
    init();
    let mut board = Board::default();
    board.config.snap_to_grid = true;
    board
        .history
        .execute(&mut board.store, Mutation::add_node(card("ur_snap", 3.0, 7.0)), "Add card")
        .unwrap();

    board.handle_input(&InputEvent::down(103.0, 57.0));
    board.handle_input(&InputEvent::moved(134.0, 86.0));
    board.handle_input(&InputEvent::up(134.0, 86.0));
    assert_eq!(position(&board, "ur_snap"), Position::new(40.0, 40.0));

    board.undo().unwrap();
    assert_eq!(position(&board, "ur_snap"), Position::new(3.0, 7.0));
}

#[test]
fn click_without_movement_records_nothing() {
    init();
    let mut board = Board::default();
    board.store.add_node(card("ur_still", 0.0, 0.0)).unwrap();

    board.handle_input(&InputEvent::down(100.0, 50.0));
    board.handle_input(&InputEvent::up(100.0, 50.0));
    assert!(!board.history.can_undo());
    assert_eq!(board.store.selection().nodes(), &[NodeId::intern("ur_still")]);
}

#[test]
fn n_commands_then_n_undos_restore_the_graph() {
    init();
    let d = CommandDispatcher::new();
    let mut board = Board::default();
    board.store.add_node(card("ur_a", 0.0, 0.0)).unwrap();
    board.store.add_node(card("ur_b", 400.0, 300.0)).unwrap();
    board
        .store
        .add_edge(cork_core::Edge::new(
            cork_core::EdgeId::intern("ur_ab"),
            NodeId::intern("ur_a"),
            NodeId::intern("ur_b"),
        ))
        .unwrap();
    let before = graph(&board);

    for name in [
        "add-card",
        "add-sticky",
        "select-all",
        "duplicate-selection",
        "layout-horizontal",
        "delete-selection",
        "add-web",
        "layout-vertical",
    ] {
        d.dispatch(&mut board, name).unwrap();
    }
    assert_ne!(graph(&board), before);

    while board.history.can_undo() {
        board.undo().unwrap();
    }
    assert_eq!(graph(&board), before);
    assert!(board.take_notices().is_empty());
}

#[test]
fn redo_replays_a_composite_delete() {
    init();
    let mut board = Board::default();
    board.store.add_node(card("ur_x", 0.0, 0.0)).unwrap();
    board.store.add_node(card("ur_y", 0.0, 300.0)).unwrap();
    board
        .store
        .add_edge(cork_core::Edge::new(
            cork_core::EdgeId::intern("ur_xy"),
            NodeId::intern("ur_x"),
            NodeId::intern("ur_y"),
        ))
        .unwrap();
    board.select_all();

    assert_eq!(board.delete_selection().unwrap(), 2);
    assert!(board.store.is_empty());
    assert_eq!(board.undo().unwrap().as_deref(), Some("Delete 2 items"));
    assert_eq!(board.store.node_count(), 2);
    assert_eq!(board.store.edge_count(), 1);

    board.redo().unwrap();
    assert!(board.store.is_empty());
    assert!(!board.history.can_redo());
}

#[test]
fn history_depth_drops_oldest() {
    init();
    let mut board = Board::new(cork_core::BoardConfig {
        history_depth: 3,
        ..Default::default()
    });
    for _ in 0..5 {
        board.add_node_at_centre(NodePayload::card("c")).unwrap();
    }
    assert_eq!(board.history.undo_len(), 3);
    while board.history.can_undo() {
        board.undo().unwrap();
    }
    assert_eq!(board.store.node_count(), 2);
}

#[test]
fn layout_is_one_undo_step() {
    init();
    let mut board = Board::default();
    board.store.add_node(card("ur_l1", 0.0, 0.0)).unwrap();
    board.store.add_node(card("ur_l2", 200.0, 0.0)).unwrap();
    board
        .store
        .add_edge(cork_core::Edge::new(
            cork_core::EdgeId::intern("ur_l12"),
            NodeId::intern("ur_l1"),
            NodeId::intern("ur_l2"),
        ))
        .unwrap();

    board.auto_layout(LayoutDirection::TopToBottom).unwrap();
    assert!(position(&board, "ur_l1").y < position(&board, "ur_l2").y);
    assert_eq!(board.history.undo_len(), 1);

    board.undo().unwrap();
    assert_eq!(position(&board, "ur_l2"), Position::new(200.0, 0.0));
}
