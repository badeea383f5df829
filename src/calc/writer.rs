use super::models::Calculation;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const HEADER: [&str; 5] = ["operation", "operand1", "operand2", "result", "timestamp"];

/// One line of the history file.
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryRow {
    pub operation: String,
    pub operand1: Decimal,
    pub operand2: Decimal,
    pub result: Decimal,
    #[serde(default)]
    pub timestamp: Option<DateTime<Local>>,
}

impl From<&Calculation> for HistoryRow {
    fn from(calculation: &Calculation) -> Self {
        Self {
            operation: calculation.operation().name().to_string(),
            operand1: calculation.operand_a(),
            operand2: calculation.operand_b(),
            result: calculation.result(),
            timestamp: Some(calculation.timestamp()),
        }
    }
}

pub fn write_history_file(path: &Path, entries: &[Calculation]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create history directory: {}", parent.display()))?;
    }

    let content = serialize_history(entries)?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write history file: {}", path.display()))?;
    Ok(())
}

/// The header is always written, so an empty history still produces a
/// well-formed file.
pub fn serialize_history(entries: &[Calculation]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for calculation in entries {
        writer.serialize(HistoryRow::from(calculation))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush history: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::models::OperationKind;

    #[test]
    fn test_serialize_empty_history() {
        let result = serialize_history(&[]).unwrap();
        assert_eq!(result, "operation,operand1,operand2,result,timestamp\n");
    }

    #[test]
    fn test_serialize_single_calculation() {
        let calculation =
            Calculation::new(OperationKind::Add, Decimal::from(2), Decimal::from(3)).unwrap();
        let result = serialize_history(&[calculation]).unwrap();

        let mut lines = result.lines();
        assert_eq!(lines.next(), Some("operation,operand1,operand2,result,timestamp"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("Addition,2,3,5,"));
        assert_eq!(row.split(',').count(), 5);
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_serialize_uses_display_names() {
        let entries = vec![
            Calculation::new(OperationKind::IntDivide, Decimal::from(7), Decimal::from(2)).unwrap(),
            Calculation::new(OperationKind::AbsDiff, Decimal::from(3), Decimal::from(9)).unwrap(),
        ];
        let result = serialize_history(&entries).unwrap();

        assert!(result.contains("\nIntegerDivision,7,2,3,"));
        assert!(result.contains("\nAbsoluteDifference,3,9,6,"));
    }

    #[test]
    fn test_write_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.csv");

        write_history_file(&path, &[]).unwrap();
        assert!(path.exists());
    }
}
