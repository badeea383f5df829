use super::error::{CalculatorError, Result};
use super::history::{HistoryObserver, HistoryStore, ObserverFailure, ObserverId};
use super::memento::Snapshot;
use super::models::Calculation;
use super::operations;
use super::persistence::HistoryPersistence;
use super::undo::UndoManager;
use crate::config::Config;
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Runs operations against the history and keeps the undo/redo stacks.
///
/// Every mutating command pushes the pre-mutation snapshot onto the undo
/// stack. A failed command leaves history and both stacks untouched.
pub struct Calculator {
    config: Config,
    history: HistoryStore,
    undo_manager: UndoManager,
    persistence: Box<dyn HistoryPersistence>,
    observer_failures: Vec<ObserverFailure>,
}

impl Calculator {
    pub fn new(config: Config, persistence: Box<dyn HistoryPersistence>) -> Self {
        info!(
            max_history_size = config.max_history_size,
            auto_save = config.auto_save,
            precision = config.precision,
            "Calculator initialized with configuration"
        );
        Self {
            history: HistoryStore::new(config.max_history_size),
            undo_manager: UndoManager::new(),
            config,
            persistence,
            observer_failures: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn execute(&mut self, operation_id: &str, a: Decimal, b: Decimal) -> Result<Calculation> {
        self.validate_operand(a)?;
        self.validate_operand(b)?;

        let (kind, function) = operations::resolve(operation_id)?;
        let result = function(a, b)?;
        debug!(operation = %kind, %a, %b, %result, "operation computed");
        let calculation = Calculation::computed(kind, a, b, result);

        self.undo_manager.save_state(self.history.snapshot());
        let failures = self.history.append(calculation.clone());
        self.observer_failures.extend(failures);

        Ok(calculation)
    }

    fn validate_operand(&self, value: Decimal) -> Result<()> {
        let max = self.config.max_input_value;
        if value.abs() > max {
            return Err(CalculatorError::InputOutOfRange { value, max });
        }
        Ok(())
    }

    pub fn undo(&mut self) -> Result<()> {
        let previous = self
            .undo_manager
            .undo(self.history.snapshot())
            .ok_or(CalculatorError::NothingToUndo)?;
        self.history.restore(previous);
        Ok(())
    }

    pub fn redo(&mut self) -> Result<()> {
        let next = self
            .undo_manager
            .redo(self.history.snapshot())
            .ok_or(CalculatorError::NothingToRedo)?;
        self.history.restore(next);
        Ok(())
    }

    /// Clearing is itself undoable.
    pub fn clear_history(&mut self) {
        self.undo_manager.save_state(self.history.snapshot());
        self.history.clear();
        info!("History cleared");
    }

    pub fn history(&self) -> &[Calculation] {
        self.history.entries()
    }

    pub fn register_observer(&mut self, observer: Box<dyn HistoryObserver>) -> ObserverId {
        self.history.register_observer(observer)
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> Option<Box<dyn HistoryObserver>> {
        self.history.remove_observer(id)
    }

    /// Failures reported by observers since the last call.
    pub fn take_observer_failures(&mut self) -> Vec<ObserverFailure> {
        std::mem::take(&mut self.observer_failures)
    }

    pub fn save_history(&self) -> Result<()> {
        self.persistence.save_history(self.history.entries())?;
        info!(entries = self.history.len(), "History saved");
        Ok(())
    }

    /// Replaces the history with the persisted one. Undoable like any other
    /// mutation; nothing changes when loading fails.
    pub fn load_history(&mut self) -> Result<usize> {
        let entries = self.persistence.load_history()?;
        self.undo_manager.save_state(self.history.snapshot());
        self.history.restore(Snapshot::new(entries));
        info!(entries = self.history.len(), "History loaded");
        Ok(self.history.len())
    }

    pub fn reset_undo_redo(&mut self) {
        self.undo_manager.reset();
    }
}

#[cfg(test)]
impl Calculator {
    pub fn can_undo(&self) -> bool {
        self.undo_manager.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo_manager.can_redo()
    }
}
