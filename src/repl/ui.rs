use crate::calc::models::format_decimal;
use crate::calc::{Calculation, OperationKind};
use crossterm::style::Stylize;

const RULE_WIDTH: usize = 60;

/// Colors status lines unless color is turned off.
#[derive(Clone, Copy, Debug)]
pub struct Painter {
    color: bool,
}

impl Painter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    #[cfg(test)]
    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn success(&self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn error(&self, text: &str) -> String {
        if self.color {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn warning(&self, text: &str) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn heading(&self, text: &str) -> String {
        if self.color {
            text.cyan().bold().to_string()
        } else {
            text.to_string()
        }
    }
}

pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

pub fn help_lines(painter: &Painter) -> Vec<String> {
    let mut lines = vec![rule(), painter.heading("Available commands:"), String::new()];

    lines.push(painter.heading("Operations:"));
    for kind in OperationKind::ALL {
        lines.push(format!("  {:<12}{}", kind.id(), operation_summary(kind)));
    }

    lines.push(String::new());
    lines.push(painter.heading("Session management:"));
    for (command, summary) in [
        ("history", "Show calculation history"),
        ("clear", "Clear calculation history"),
        ("undo", "Undo the last change to the history"),
        ("redo", "Redo the last undone change"),
        ("save", "Save calculation history to file"),
        ("load", "Load calculation history from file"),
        ("help", "Show this help"),
        ("exit", "Save history and exit the calculator"),
    ] {
        lines.push(format!("  {:<12}{}", command, summary));
    }
    lines.push(rule());
    lines
}

fn operation_summary(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Add => "a + b",
        OperationKind::Subtract => "a - b",
        OperationKind::Multiply => "a * b",
        OperationKind::Divide => "a / b",
        OperationKind::Power => "a raised to the power b",
        OperationKind::Root => "b-th root of a",
        OperationKind::Modulus => "remainder of a / b",
        OperationKind::IntDivide => "a / b truncated toward zero",
        OperationKind::Percentage => "a as a percentage of b",
        OperationKind::AbsDiff => "|a - b|",
    }
}

/// Like the record's own `Display`, with the result rounded for display.
pub fn render_calculation(calculation: &Calculation, precision: u32) -> String {
    format!(
        "{}({}, {}) = {}",
        calculation.operation(),
        calculation.operand_a().normalize(),
        calculation.operand_b().normalize(),
        calculation.format_result(precision)
    )
}

pub fn render_history(history: &[Calculation], precision: u32) -> Vec<String> {
    history
        .iter()
        .enumerate()
        .map(|(i, calculation)| format!("{}. {}", i + 1, render_calculation(calculation, precision)))
        .collect()
}

pub fn render_result(calculation: &Calculation, precision: u32) -> String {
    format!("Result: {}", format_decimal(calculation.result(), precision))
}
