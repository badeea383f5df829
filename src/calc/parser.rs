use super::models::{Calculation, OperationKind};
use super::writer::HistoryRow;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Reads a history file. A missing or empty file is an empty history.
pub fn parse_history_file(path: &Path) -> Result<Vec<Calculation>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file: {}", path.display()))?;

    parse_history(&content)
        .with_context(|| format!("Failed to load history from {}", path.display()))
}

pub fn parse_history(content: &str) -> Result<Vec<Calculation>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let mut calculations = Vec::new();

    for (index, row) in reader.deserialize::<HistoryRow>().enumerate() {
        // Header is line 1.
        let line = index + 2;
        let row = row.with_context(|| format!("Invalid calculation data on line {}", line))?;
        calculations.push(
            parse_row(row).with_context(|| format!("Invalid calculation data on line {}", line))?,
        );
    }

    Ok(calculations)
}

fn parse_row(row: HistoryRow) -> Result<Calculation> {
    let kind: OperationKind = row.operation.parse()?;
    let mut calculation = Calculation::new(kind, row.operand1, row.operand2)?;

    if calculation.result() != row.result {
        warn!(
            "Loaded calculation result {} differs from computed result {}",
            row.result.normalize(),
            calculation.result().normalize()
        );
    }
    if let Some(timestamp) = row.timestamp {
        calculation = calculation.with_timestamp(timestamp);
    }

    Ok(calculation)
}
