use super::memento::Snapshot;

/// Undo and redo stacks of history snapshots, most recent last.
#[derive(Debug, Default)]
pub struct UndoManager {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl UndoManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the state before a forward action. Any redo chain is dropped.
    pub fn save_state(&mut self, state: Snapshot) {
        self.undo_stack.push(state);
        self.redo_stack.clear();
    }

    /// Returns the state to restore, moving `current` onto the redo stack.
    /// Nothing changes when there is nothing to undo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
impl UndoManager {
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::models::{Calculation, OperationKind};
    use rust_decimal::Decimal;

    fn snapshot_of(results: &[i64]) -> Snapshot {
        Snapshot::new(
            results
                .iter()
                .map(|&n| {
                    Calculation::new(OperationKind::Add, Decimal::from(n), Decimal::ZERO).unwrap()
                })
                .collect(),
        )
    }

    #[test]
    fn test_undo_on_empty_stack_changes_nothing() {
        let mut manager = UndoManager::new();
        assert!(manager.undo(snapshot_of(&[1])).is_none());
        assert_eq!(manager.redo_depth(), 0);
        assert!(manager.redo(snapshot_of(&[1])).is_none());
        assert_eq!(manager.undo_depth(), 0);
    }

    #[test]
    fn test_undo_then_redo_moves_states_between_stacks() {
        let mut manager = UndoManager::new();
        manager.save_state(snapshot_of(&[]));

        let restored = manager.undo(snapshot_of(&[1])).unwrap();
        assert!(restored.entries().is_empty());
        assert!(!manager.can_undo());
        assert!(manager.can_redo());

        let restored = manager.redo(snapshot_of(&[])).unwrap();
        assert_eq!(restored.entries().len(), 1);
        assert!(manager.can_undo());
        assert!(!manager.can_redo());
    }

    #[test]
    fn test_save_state_clears_redo() {
        let mut manager = UndoManager::new();
        manager.save_state(snapshot_of(&[]));
        manager.undo(snapshot_of(&[1])).unwrap();
        assert!(manager.can_redo());

        manager.save_state(snapshot_of(&[]));
        assert!(!manager.can_redo());
        assert_eq!(manager.undo_depth(), 1);
    }

    #[test]
    fn test_reset() {
        let mut manager = UndoManager::new();
        manager.save_state(snapshot_of(&[]));
        manager.save_state(snapshot_of(&[1]));
        manager.undo(snapshot_of(&[1, 2])).unwrap();

        manager.reset();
        assert!(!manager.can_undo());
        assert!(!manager.can_redo());
    }
}
