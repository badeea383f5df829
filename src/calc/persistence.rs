use super::error::{CalculatorError, Result};
use super::models::Calculation;
use super::{parser, writer};
use std::path::PathBuf;

pub trait HistoryPersistence {
    fn save_history(&self, entries: &[Calculation]) -> Result<()>;
    fn load_history(&self) -> Result<Vec<Calculation>>;
}

/// History kept as a CSV file, one row per calculation.
#[derive(Clone, Debug)]
pub struct CsvHistoryFile {
    path: PathBuf,
}

impl CsvHistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HistoryPersistence for CsvHistoryFile {
    fn save_history(&self, entries: &[Calculation]) -> Result<()> {
        writer::write_history_file(&self.path, entries)
            .map_err(|e| CalculatorError::persistence(format!("{:#}", e)))
    }

    fn load_history(&self) -> Result<Vec<Calculation>> {
        parser::parse_history_file(&self.path)
            .map_err(|e| CalculatorError::persistence(format!("{:#}", e)))
    }
}
