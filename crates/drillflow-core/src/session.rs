//! Editor session
//!
//! Bundles the store and the command history for one editing session.
//! Collaborators (roster, catalog, persistence) are injected into the
//! components that need them rather than looked up from any global
//! registry; dropping the session drops everything it owns.

use crate::command::{CommandHistory, EditorCommand};
use crate::store::FormationStore;

/// One editing session over one active chart.
#[derive(Default)]
pub struct EditorSession {
    store: FormationStore,
    history: CommandHistory,
}

impl EditorSession {
    /// Create a session with an empty store and fresh history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the store.
    pub fn store(&self) -> &FormationStore {
        &self.store
    }

    /// Direct mutable access to the store, for programmatic edits that
    /// should not be undoable (imports, batch generation).
    pub fn store_mut(&mut self) -> &mut FormationStore {
        &mut self.store
    }

    /// The command history.
    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// Run a user edit through the history so it can be undone.
    pub fn execute(&mut self, command: Box<dyn EditorCommand>) {
        self.history.execute(command, &mut self.store);
    }

    /// Undo the last edit. Returns whether anything was undone.
    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.store)
    }

    /// Redo the last undone edit. Returns whether anything was redone.
    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.store)
    }
}
