use super::history::HistoryObserver;
use super::models::Calculation;
use super::persistence::HistoryPersistence;
use anyhow::{Context, Result};
use chrono::SecondsFormat;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Appends one line per calculation to an audit log.
pub struct AuditLogObserver {
    sink: Box<dyn Write>,
}

impl AuditLogObserver {
    pub fn new(sink: Box<dyn Write>) -> Self {
        Self { sink }
    }

    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open audit log: {}", path.display()))?;
        Ok(Self::new(Box::new(file)))
    }
}

pub fn audit_line(calculation: &Calculation) -> String {
    format!(
        "{} INFO Calculation performed: {} ({}, {}) = {}",
        calculation
            .timestamp()
            .to_rfc3339_opts(SecondsFormat::Secs, false),
        calculation.operation(),
        calculation.operand_a().normalize(),
        calculation.operand_b().normalize(),
        calculation.result().normalize()
    )
}

impl HistoryObserver for AuditLogObserver {
    fn name(&self) -> &str {
        "audit-log"
    }

    fn update(&mut self, calculation: &Calculation, _history: &[Calculation]) -> Result<()> {
        info!(
            operation = %calculation.operation(),
            operand_a = %calculation.operand_a(),
            operand_b = %calculation.operand_b(),
            result = %calculation.result(),
            "Calculation performed"
        );
        writeln!(self.sink, "{}", audit_line(calculation)).context("Failed to write audit log")?;
        self.sink.flush().context("Failed to flush audit log")?;
        Ok(())
    }
}

/// Saves the whole history after every calculation when enabled.
pub struct AutoSaveObserver {
    enabled: bool,
    persistence: Box<dyn HistoryPersistence>,
}

impl AutoSaveObserver {
    pub fn new(enabled: bool, persistence: Box<dyn HistoryPersistence>) -> Self {
        Self {
            enabled,
            persistence,
        }
    }
}

impl HistoryObserver for AutoSaveObserver {
    fn name(&self) -> &str {
        "auto-save"
    }

    fn update(&mut self, _calculation: &Calculation, history: &[Calculation]) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        self.persistence
            .save_history(history)
            .context("Auto-save failed")?;
        debug!(entries = history.len(), "History auto-saved");
        Ok(())
    }
}
