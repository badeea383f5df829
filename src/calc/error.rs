use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CalculatorError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculatorError {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Division by zero is not allowed")]
    DivisionByZero,

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Value exceeds maximum allowed: {max}")]
    InputOutOfRange { value: Decimal, max: Decimal },

    #[error("Invalid number format: {0}")]
    InvalidInput(String),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("History persistence failed: {0}")]
    PersistenceFailure(String),
}

impl CalculatorError {
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    #[must_use]
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::PersistenceFailure(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_stable() {
        assert_eq!(
            CalculatorError::DivisionByZero.to_string(),
            "Division by zero is not allowed"
        );
        assert_eq!(
            CalculatorError::UnknownOperation("sqrt".to_string()).to_string(),
            "Unknown operation: sqrt"
        );
        assert_eq!(CalculatorError::NothingToUndo.to_string(), "Nothing to undo");
        assert_eq!(CalculatorError::NothingToRedo.to_string(), "Nothing to redo");
    }

    #[test]
    fn test_out_of_range_reports_limit() {
        let error = CalculatorError::InputOutOfRange {
            value: Decimal::from(5000),
            max: Decimal::from(1000),
        };
        assert_eq!(error.to_string(), "Value exceeds maximum allowed: 1000");
    }

    #[test]
    fn test_constructors() {
        assert_eq!(
            CalculatorError::invalid("Zero root is undefined").to_string(),
            "Invalid operation: Zero root is undefined"
        );
        assert_eq!(
            CalculatorError::persistence("disk full").to_string(),
            "History persistence failed: disk full"
        );
    }
}
