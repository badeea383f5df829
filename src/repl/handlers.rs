use crate::calc::error::{CalculatorError, Result};
use crate::calc::models::OperationKind;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplAction {
    Calculate(OperationKind),
    History,
    Clear,
    Undo,
    Redo,
    Save,
    Load,
    Help,
    Exit,
    None,
    Unknown(String),
}

pub struct CommandHandler;

impl CommandHandler {
    pub fn parse(line: &str) -> ReplAction {
        let command = line.trim().to_ascii_lowercase();
        match command.as_str() {
            "" => ReplAction::None,
            "history" => ReplAction::History,
            "clear" => ReplAction::Clear,
            "undo" => ReplAction::Undo,
            "redo" => ReplAction::Redo,
            "save" => ReplAction::Save,
            "load" => ReplAction::Load,
            "help" => ReplAction::Help,
            "exit" | "quit" => ReplAction::Exit,
            other => OperationKind::ALL
                .into_iter()
                .find(|kind| kind.id() == other)
                .map(ReplAction::Calculate)
                .unwrap_or_else(|| ReplAction::Unknown(other.to_string())),
        }
    }

    pub fn is_cancel(input: &str) -> bool {
        input.trim().eq_ignore_ascii_case("cancel")
    }
}

/// Accepts plain decimals (`-3.14`) and scientific notation (`2e5`).
pub fn parse_operand(input: &str) -> Result<Decimal> {
    let trimmed = input.trim();
    trimmed
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| CalculatorError::InvalidInput(trimmed.to_string()))
}
