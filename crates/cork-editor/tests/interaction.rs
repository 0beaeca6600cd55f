//! Integration tests: pointer gestures driven through the board (cork-editor).

use cork_core::{Edge, EdgeId, Handle, Node, NodeId, NodePayload, Position, Selection};
use cork_editor::{Board, InputEvent, Modifiers, PointerButton};
use pretty_assertions::assert_eq;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn board_with(cards: &[(&str, f64, f64)]) -> Board {
    let mut board = Board::default();
    for (id, x, y) in cards {
        board
            .store
            .add_node(Node::new(NodeId::intern(id), Position::new(*x, *y), NodePayload::card(*id)))
            .unwrap();
    }
    board
}

fn down_with(x: f64, y: f64, modifiers: Modifiers) -> InputEvent {
    InputEvent::PointerDown {
        x,
        y,
        button: PointerButton::Primary,
        modifiers,
    }
}

#[test]
fn box_select_takes_exactly_the_enclosed_nodes() {
    init();
    let mut board = board_with(&[("bx_a", 0.0, 0.0), ("bx_b", 300.0, 0.0), ("bx_c", 0.0, 400.0)]);

    board.handle_input(&down_with(-20.0, -20.0, Modifiers::SHIFT));
    board.handle_input(&InputEvent::moved(520.0, 120.0));
    assert!(board.overlay().is_some());
    board.handle_input(&InputEvent::up(520.0, 120.0));

    assert_eq!(
        board.store.selection().nodes(),
        &[NodeId::intern("bx_a"), NodeId::intern("bx_b")]
    );
    assert!(board.controller().is_idle());
    assert!(!board.history.can_undo());
}

#[test]
fn additive_box_select_keeps_existing_selection() {
    init();
    let mut board = board_with(&[("ax_a", 0.0, 0.0), ("ax_b", 300.0, 0.0), ("ax_c", 0.0, 400.0)]);
    board.store.set_selection(Selection::from_nodes([NodeId::intern("ax_c")]));

    let additive = Modifiers {
        shift: true,
        ctrl: true,
        ..Modifiers::NONE
    };
    board.handle_input(&down_with(-20.0, -20.0, additive));
    board.handle_input(&InputEvent::moved(220.0, 120.0));
    board.handle_input(&InputEvent::up(220.0, 120.0));

    let sel = board.store.selection();
    assert!(sel.contains_node(NodeId::intern("ax_a")));
    assert!(sel.contains_node(NodeId::intern("ax_c")));
    assert!(!sel.contains_node(NodeId::intern("ax_b")));
}

#[test]
fn dragging_handle_to_handle_connects_once() {
    init();
    let mut board = board_with(&[("cn_a", 0.0, 0.0), ("cn_b", 0.0, 300.0)]);

    // Bottom handle of A to top handle of B.
    let connect = |board: &mut Board| {
        board.handle_input(&InputEvent::down(100.0, 100.0));
        board.handle_input(&InputEvent::moved(100.0, 200.0));
        board.handle_input(&InputEvent::moved(101.0, 302.0));
        board.handle_input(&InputEvent::up(101.0, 302.0));
    };
    connect(&mut board);

    assert_eq!(board.store.edge_count(), 1);
    let edge = board.store.edges().next().unwrap().clone();
    assert_eq!(edge.source_id, NodeId::intern("cn_a"));
    assert_eq!(edge.target_id, NodeId::intern("cn_b"));
    assert_eq!(edge.source_handle, Some(Handle::Bottom));
    assert_eq!(edge.target_handle, Some(Handle::Top));
    assert_eq!(board.history.undo_description(), Some("Connect nodes"));

    // Same handles again: no duplicate edge, no history entry.
    connect(&mut board);
    assert_eq!(board.store.edge_count(), 1);
    assert_eq!(board.history.undo_len(), 1);

    board.undo().unwrap();
    assert_eq!(board.store.edge_count(), 0);
}

#[test]
fn connection_dropped_on_canvas_is_discarded() {
    init();
    let mut board = board_with(&[("cd_a", 0.0, 0.0)]);
    board.handle_input(&InputEvent::down(200.0, 50.0));
    board.handle_input(&InputEvent::moved(600.0, 600.0));
    board.handle_input(&InputEvent::up(600.0, 600.0));
    assert_eq!(board.store.edge_count(), 0);
    assert!(!board.history.can_undo());
}

#[test]
fn dragging_a_selected_group_moves_all_members() {
    init();
    let mut board = board_with(&[("gp_a", 0.0, 0.0), ("gp_b", 300.0, 0.0)]);
    board.select_all();

    board.handle_input(&InputEvent::down(100.0, 50.0));
    board.handle_input(&InputEvent::moved(110.0, 70.0));
    board.handle_input(&InputEvent::up(110.0, 70.0));

    assert_eq!(board.store.node(NodeId::intern("gp_a")).unwrap().position, Position::new(10.0, 20.0));
    assert_eq!(board.store.node(NodeId::intern("gp_b")).unwrap().position, Position::new(310.0, 20.0));
    assert_eq!(board.history.undo_description(), Some("Move 2 nodes"));
}

#[test]
fn clicking_an_edge_selects_it() {
    init();
    let mut board = board_with(&[("ed_a", 0.0, 0.0), ("ed_b", 0.0, 300.0)]);
    board
        .store
        .add_edge(Edge::new(EdgeId::intern("ed_ab"), NodeId::intern("ed_a"), NodeId::intern("ed_b")))
        .unwrap();

    // Midway down the vertical connector.
    board.handle_input(&InputEvent::down(101.0, 200.0));
    board.handle_input(&InputEvent::up(101.0, 200.0));
    assert_eq!(board.store.selection().edges(), &[EdgeId::intern("ed_ab")]);
    assert!(board.store.selection().nodes().is_empty());
}

#[test]
fn clicking_empty_canvas_clears_selection() {
    init();
    let mut board = board_with(&[("cl_a", 0.0, 0.0)]);
    board.select_all();
    board.handle_input(&InputEvent::down(700.0, 700.0));
    board.handle_input(&InputEvent::up(700.0, 700.0));
    assert!(board.store.selection().is_empty());
}

#[test]
fn panning_moves_the_viewport_not_the_nodes() {
    init();
    let mut board = board_with(&[("pn_a", 0.0, 0.0)]);
    board.select_all();
    board.handle_input(&InputEvent::down(700.0, 700.0));
    board.handle_input(&InputEvent::moved(650.0, 680.0));
    board.handle_input(&InputEvent::up(650.0, 680.0));

    let vp = board.store.viewport();
    assert_eq!((vp.offset_x, vp.offset_y), (-50.0, -20.0));
    assert_eq!(board.store.node(NodeId::intern("pn_a")).unwrap().position, Position::new(0.0, 0.0));
    assert!(!board.store.selection().is_empty());
    assert!(!board.history.can_undo());
}

#[test]
fn failed_gesture_becomes_a_notice() {
    init();
    let mut board = board_with(&[("fg_a", 0.0, 0.0)]);
    board.handle_input(&InputEvent::down(100.0, 50.0));

    // Something outside the gesture removes the node mid-drag.
    board.store.remove_node(NodeId::intern("fg_a")).unwrap();
    board.handle_input(&InputEvent::moved(140.0, 90.0));

    let notices = board.take_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].message.starts_with("Gesture discarded"));
    assert!(board.controller().is_idle());
    assert!(board.take_notices().is_empty());
}
