use super::error::{CalculatorError, Result};
use super::operations;
use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Root,
    Modulus,
    IntDivide,
    Percentage,
    AbsDiff,
}

impl OperationKind {
    pub const ALL: [OperationKind; 10] = [
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::Power,
        Self::Root,
        Self::Modulus,
        Self::IntDivide,
        Self::Percentage,
        Self::AbsDiff,
    ];

    /// The command identifier typed at the prompt.
    pub fn id(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::Power => "power",
            Self::Root => "root",
            Self::Modulus => "modulus",
            Self::IntDivide => "intdiv",
            Self::Percentage => "percentage",
            Self::AbsDiff => "absdiff",
        }
    }

    /// The name used when rendering and persisting a calculation.
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "Addition",
            Self::Subtract => "Subtraction",
            Self::Multiply => "Multiplication",
            Self::Divide => "Division",
            Self::Power => "Power",
            Self::Root => "Root",
            Self::Modulus => "Modulus",
            Self::IntDivide => "IntegerDivision",
            Self::Percentage => "Percentage",
            Self::AbsDiff => "AbsoluteDifference",
        }
    }

    pub fn is_division_family(self) -> bool {
        matches!(
            self,
            Self::Divide | Self::Modulus | Self::IntDivide | Self::Percentage
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OperationKind {
    type Err = CalculatorError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| {
                kind.id().eq_ignore_ascii_case(wanted) || kind.name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| CalculatorError::UnknownOperation(wanted.to_string()))
    }
}

/// One completed operation. Immutable once built: the result is computed
/// in the constructor and never again.
#[derive(Debug, Clone)]
pub struct Calculation {
    operation: OperationKind,
    operand_a: Decimal,
    operand_b: Decimal,
    result: Decimal,
    timestamp: DateTime<Local>,
}

impl Calculation {
    pub fn new(operation: OperationKind, operand_a: Decimal, operand_b: Decimal) -> Result<Self> {
        let result = operations::function_for(operation)(operand_a, operand_b)?;
        Ok(Self::computed(operation, operand_a, operand_b, result))
    }

    /// Builds a record around a result the registry has already produced.
    pub(super) fn computed(
        operation: OperationKind,
        operand_a: Decimal,
        operand_b: Decimal,
        result: Decimal,
    ) -> Self {
        Self {
            operation,
            operand_a,
            operand_b,
            result,
            timestamp: Local::now(),
        }
    }

    /// Keeps the original creation time of a record read back from disk.
    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    pub fn operand_a(&self) -> Decimal {
        self.operand_a
    }

    pub fn operand_b(&self) -> Decimal {
        self.operand_b
    }

    pub fn result(&self) -> Decimal {
        self.result
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn format_result(&self, precision: u32) -> String {
        format_decimal(self.result, precision)
    }
}

// Timestamps are bookkeeping; two records are the same calculation when
// operation, operands and result agree.
impl PartialEq for Calculation {
    fn eq(&self, other: &Self) -> bool {
        self.operation == other.operation
            && self.operand_a == other.operand_a
            && self.operand_b == other.operand_b
            && self.result == other.result
    }
}

impl Eq for Calculation {}

impl fmt::Display for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}, {}) = {}",
            self.operation,
            self.operand_a.normalize(),
            self.operand_b.normalize(),
            self.result.normalize()
        )
    }
}

pub fn format_decimal(value: Decimal, precision: u32) -> String {
    value.round_dp(precision).normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_addition_computes_result() {
        let calc = Calculation::new(OperationKind::Add, dec("2"), dec("3")).unwrap();
        assert_eq!(calc.result(), dec("5"));
        assert_eq!(calc.operation(), OperationKind::Add);
    }

    #[test]
    fn test_division_by_zero_is_rejected() {
        let error = Calculation::new(OperationKind::Divide, dec("8"), dec("0")).unwrap_err();
        assert_eq!(error, CalculatorError::DivisionByZero);
    }

    #[test]
    fn test_display() {
        let calc = Calculation::new(OperationKind::Add, dec("2"), dec("3")).unwrap();
        assert_eq!(calc.to_string(), "Addition(2, 3) = 5");

        let calc = Calculation::new(OperationKind::Multiply, dec("2.50"), dec("4")).unwrap();
        assert_eq!(calc.to_string(), "Multiplication(2.5, 4) = 10");
    }

    #[test]
    fn test_equality_ignores_timestamp() {
        let first = Calculation::new(OperationKind::Add, dec("2"), dec("3")).unwrap();
        let second = Calculation::new(OperationKind::Add, dec("2"), dec("3"))
            .unwrap()
            .with_timestamp(Local::now() - chrono::Duration::hours(1));
        let other = Calculation::new(OperationKind::Subtract, dec("5"), dec("3")).unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[test]
    fn test_format_result_rounds_for_display_only() {
        let calc = Calculation::new(OperationKind::Divide, dec("1"), dec("3")).unwrap();
        assert_eq!(calc.format_result(2), "0.33");
        assert_eq!(calc.format_result(10), "0.3333333333");
        assert!(calc.result() != dec("0.33"));
    }

    #[test]
    fn test_format_result_trims_trailing_zeros() {
        let calc = Calculation::new(OperationKind::Divide, dec("10"), dec("4")).unwrap();
        assert_eq!(calc.format_result(10), "2.5");
    }

    #[test]
    fn test_operation_kind_from_id_and_name() {
        assert_eq!("add".parse::<OperationKind>().unwrap(), OperationKind::Add);
        assert_eq!("Addition".parse::<OperationKind>().unwrap(), OperationKind::Add);
        assert_eq!("INTDIV".parse::<OperationKind>().unwrap(), OperationKind::IntDivide);
        assert_eq!(
            "AbsoluteDifference".parse::<OperationKind>().unwrap(),
            OperationKind::AbsDiff
        );
        assert_eq!(
            "sqrt".parse::<OperationKind>().unwrap_err(),
            CalculatorError::UnknownOperation("sqrt".to_string())
        );
    }

    #[test]
    fn test_every_kind_round_trips_through_its_name() {
        for kind in OperationKind::ALL {
            assert_eq!(kind.name().parse::<OperationKind>().unwrap(), kind);
            assert_eq!(kind.id().parse::<OperationKind>().unwrap(), kind);
        }
    }
}
