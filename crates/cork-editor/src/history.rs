//! Undo/Redo history.
//!
//! Every document change goes through a `Command`: one or more mutations
//! applied as a unit. Performing a command captures the inverse batch from
//! the store; undoing applies it and captures the forward batch afresh, so
//! redo reproduces exactly the state undo left.
//!
//! Bulk operations (layout, multi-node drag, import, delete of a
//! selection) are single composite commands: one undo reverses the batch.

use crate::mutation::{Mutation, apply_all};
use cork_core::{GraphStore, Result};

/// A reversible unit of work.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub description: String,
    pub forward: Vec<Mutation>,
    /// Filled in when the command is performed.
    pub inverse: Vec<Mutation>,
}

impl Command {
    pub fn new(description: impl Into<String>, forward: Vec<Mutation>) -> Self {
        Self {
            description: description.into(),
            forward,
            inverse: Vec::new(),
        }
    }

    pub fn single(description: impl Into<String>, mutation: Mutation) -> Self {
        Self::new(description, vec![mutation])
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

/// Undo and redo stacks over a `GraphStore`.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    /// Maximum undo depth.
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(200)
    }
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth.min(64)),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Apply the command, push it, and clear the redo stack. A command that
    /// fails to apply leaves store and history untouched.
    pub fn perform(&mut self, store: &mut GraphStore, mut command: Command) -> Result<()> {
        if command.is_empty() {
            return Ok(());
        }
        command.inverse = apply_all(store, &command.forward)?;
        log::trace!("perform: {}", command.description);

        self.undo_stack.push(command);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        // Clear redo stack on new action
        self.redo_stack.clear();
        Ok(())
    }

    pub fn execute(&mut self, store: &mut GraphStore, mutation: Mutation, description: &str) -> Result<()> {
        self.perform(store, Command::single(description, mutation))
    }

    /// Perform several mutations as one composite command.
    pub fn execute_batch(
        &mut self,
        store: &mut GraphStore,
        mutations: Vec<Mutation>,
        description: &str,
    ) -> Result<()> {
        self.perform(store, Command::new(description, mutations))
    }

    /// Undo the last command. `Ok(None)` means there was nothing to undo.
    pub fn undo(&mut self, store: &mut GraphStore) -> Result<Option<String>> {
        let Some(mut cmd) = self.undo_stack.pop() else {
            return Ok(None);
        };
        match apply_all(store, &cmd.inverse) {
            Ok(forward) => {
                cmd.forward = forward;
                let desc = cmd.description.clone();
                self.redo_stack.push(cmd);
                Ok(Some(desc))
            }
            Err(err) => {
                self.undo_stack.push(cmd);
                Err(err)
            }
        }
    }

    /// Redo the last undone command. `Ok(None)` means there was nothing to redo.
    pub fn redo(&mut self, store: &mut GraphStore) -> Result<Option<String>> {
        let Some(mut cmd) = self.redo_stack.pop() else {
            return Ok(None);
        };
        match apply_all(store, &cmd.forward) {
            Ok(inverse) => {
                cmd.inverse = inverse;
                let desc = cmd.description.clone();
                self.undo_stack.push(cmd);
                Ok(Some(desc))
            }
            Err(err) => {
                self.redo_stack.push(cmd);
                Err(err)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Description of the command `undo` would reverse.
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|c| c.description.as_str())
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Change the depth limit, dropping the oldest entries if needed.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth.max(1);
        let excess = self.undo_stack.len().saturating_sub(self.max_depth);
        self.undo_stack.drain(..excess);
    }

    /// Forget everything, e.g. after loading a different board.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cork_core::{Node, NodeId, NodePatch, NodePayload, Position, Snapshot};
    use pretty_assertions::assert_eq;

    fn card(id: &str) -> Node {
        Node::new(NodeId::intern(id), Position::default(), NodePayload::card(id))
    }

    #[test]
    fn empty_stacks_report_nothing() {
        let mut store = GraphStore::new();
        let mut history = History::new(10);
        assert_eq!(history.undo(&mut store).unwrap(), None);
        assert_eq!(history.redo(&mut store).unwrap(), None);
    }

    #[test]
    fn new_action_clears_redo() {
        let mut store = GraphStore::new();
        let mut history = History::new(10);
        history.execute(&mut store, Mutation::add_node(card("h_a")), "Add a").unwrap();
        history.undo(&mut store).unwrap();
        assert!(history.can_redo());

        history.execute(&mut store, Mutation::add_node(card("h_b")), "Add b").unwrap();
        assert!(!history.can_redo());
    }

    #[test]
    fn depth_limit_drops_oldest() {
        let mut store = GraphStore::new();
        let mut history = History::new(2);
        for id in ["hd_1", "hd_2", "hd_3"] {
            history.execute(&mut store, Mutation::add_node(card(id)), id).unwrap();
        }
        assert_eq!(history.undo_len(), 2);
        assert_eq!(history.undo(&mut store).unwrap().as_deref(), Some("hd_3"));
        assert_eq!(history.undo(&mut store).unwrap().as_deref(), Some("hd_2"));
        assert_eq!(history.undo(&mut store).unwrap(), None);
        assert!(store.contains_node(NodeId::intern("hd_1")));
    }

    #[test]
    fn failed_perform_records_nothing() {
        let mut store = GraphStore::new();
        let mut history = History::new(10);
        let err = history.execute(
            &mut store,
            Mutation::UpdateNode {
                id: NodeId::intern("h_ghost"),
                patch: NodePatch::position(Position::new(1.0, 1.0)),
            },
            "Move ghost",
        );
        assert!(err.is_err());
        assert!(!history.can_undo());
    }

    #[test]
    fn redo_after_undo_restores_identical_state() {
        let mut store = GraphStore::new();
        let mut history = History::new(10);
        history
            .execute_batch(
                &mut store,
                vec![Mutation::add_node(card("hr_a")), Mutation::add_node(card("hr_b"))],
                "Add two",
            )
            .unwrap();
        let after = Snapshot::capture(&store);

        history.undo(&mut store).unwrap();
        assert!(store.is_empty());
        history.redo(&mut store).unwrap();
        assert_eq!(Snapshot::capture(&store), after);
    }
}
