//! Named board commands.
//!
//! Menus, shortcuts and host bridges all end up here: a command is a name
//! mapped to a handler over `&mut Board`. The dispatcher starts with the
//! built-in set and accepts host-registered extras.
//!
//! | Name                  | Effect                                   |
//! |-----------------------|------------------------------------------|
//! | `add-card`            | new card at the view centre              |
//! | `add-sticky`          | new sticky note at the view centre       |
//! | `add-web`             | new web link at the view centre          |
//! | `delete-selection`    | remove selected nodes and edges          |
//! | `duplicate-selection` | copy selection with offset               |
//! | `select-all`          | select every node                        |
//! | `deselect`            | clear selection                          |
//! | `undo` / `redo`       | walk history                             |
//! | `save` / `load`       | snapshot store round trip                |
//! | `zoom-in` / `zoom-out`| zoom around the screen centre            |
//! | `zoom-to-fit`         | frame all content                        |
//! | `layout-vertical`     | auto layout, top to bottom               |
//! | `layout-horizontal`   | auto layout, left to right               |
//! | `import-library`      | add new library entities                 |
//! | `toggle-snap`         | flip snap-to-grid                        |

use crate::board::Board;
use crate::input::InputEvent;
use cork_core::{BoardError, LayoutDirection, NodePayload, Result};

pub type Handler = Box<dyn Fn(&mut Board) -> Result<()>>;

pub struct CommandDispatcher {
    handlers: Vec<(String, Handler)>,
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandDispatcher {
    /// A dispatcher with every built-in command registered.
    pub fn new() -> Self {
        let mut d = Self::empty();
        d.register("add-card", |b| b.add_node_at_centre(NodePayload::card("New card")).map(drop));
        d.register("add-sticky", |b| b.add_node_at_centre(NodePayload::sticky("")).map(drop));
        d.register("add-web", |b| {
            b.add_node_at_centre(NodePayload::web("https://", "New link")).map(drop)
        });
        d.register("delete-selection", |b| b.delete_selection().map(drop));
        d.register("duplicate-selection", |b| b.duplicate_selection().map(drop));
        d.register("select-all", |b| {
            b.select_all();
            Ok(())
        });
        d.register("deselect", |b| {
            b.deselect();
            Ok(())
        });
        d.register("undo", |b| b.undo().map(drop));
        d.register("redo", |b| b.redo().map(drop));
        d.register("save", Board::save);
        d.register("load", |b| b.load().map(drop));
        d.register("zoom-in", |b| {
            b.zoom_in();
            Ok(())
        });
        d.register("zoom-out", |b| {
            b.zoom_out();
            Ok(())
        });
        d.register("zoom-to-fit", |b| {
            b.zoom_to_fit();
            Ok(())
        });
        d.register("layout-vertical", |b| {
            b.auto_layout(LayoutDirection::TopToBottom).map(drop)
        });
        d.register("layout-horizontal", |b| {
            b.auto_layout(LayoutDirection::LeftToRight).map(drop)
        });
        d.register("import-library", |b| b.import_from_library().map(drop));
        d.register("toggle-snap", |b| {
            b.toggle_snap();
            Ok(())
        });
        d
    }

    /// A dispatcher with no commands at all.
    pub fn empty() -> Self {
        Self { handlers: Vec::new() }
    }

    /// Register `name`, replacing any handler already bound to it.
    pub fn register<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&mut Board) -> Result<()> + 'static,
    {
        let handler: Handler = Box::new(handler);
        match self.handlers.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = handler,
            None => self.handlers.push((name.to_string(), handler)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.iter().any(|(n, _)| n == name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.handlers.iter().map(|(n, _)| n.as_str())
    }

    pub fn dispatch(&self, board: &mut Board, name: &str) -> Result<()> {
        let (_, handler) = self
            .handlers
            .iter()
            .find(|(n, _)| n == name)
            .ok_or_else(|| BoardError::UnknownCommand(name.to_string()))?;
        log::debug!("dispatch {name}");
        handler(board)
    }

    /// Feed an input event to the board and run whatever shortcut it
    /// resolved to.
    pub fn handle_input(&self, board: &mut Board, event: &InputEvent) -> Result<Option<&'static str>> {
        match board.handle_input(event) {
            Some(name) => {
                self.dispatch(board, name)?;
                Ok(Some(name))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_shortcut_has_a_handler() {
        let d = CommandDispatcher::new();
        for action in crate::shortcuts::ShortcutAction::ALL {
            assert!(d.contains(action.command_name()), "{}", action.command_name());
        }
        assert_eq!(d.names().count(), 18);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let d = CommandDispatcher::new();
        let mut board = Board::default();
        let err = d.dispatch(&mut board, "fly-to-moon").unwrap_err();
        assert!(matches!(err, BoardError::UnknownCommand(ref n) if n == "fly-to-moon"));
    }

    #[test]
    fn register_replaces_existing() {
        let mut d = CommandDispatcher::new();
        d.register("add-card", |_| Err(BoardError::Unavailable("nope")));
        assert_eq!(d.names().count(), 18);
        let mut board = Board::default();
        assert!(d.dispatch(&mut board, "add-card").is_err());
        assert!(board.store.is_empty());
    }

    #[test]
    fn add_card_then_undo() {
        let d = CommandDispatcher::new();
        let mut board = Board::default();
        d.dispatch(&mut board, "add-card").unwrap();
        assert_eq!(board.store.node_count(), 1);
        assert_eq!(board.store.selection().nodes().len(), 1);
        d.dispatch(&mut board, "undo").unwrap();
        assert!(board.store.is_empty());
        d.dispatch(&mut board, "redo").unwrap();
        assert_eq!(board.store.node_count(), 1);
    }

    #[test]
    fn import_without_library_is_unavailable() {
        let d = CommandDispatcher::new();
        let mut board = Board::default();
        let err = d.dispatch(&mut board, "import-library").unwrap_err();
        assert!(matches!(err, BoardError::Unavailable(_)));
    }
}
