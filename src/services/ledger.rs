//! Result ledger.
//!
//! Responsibilities:
//! - Accumulate one `ProcessedRow` per attempted record, in order
//! - Persist the full sequence as a dated JSON artifact at run end
//!
//! The ledger is the run state: created by the scheduler, appended to while
//! the loop runs, returned when it finishes. Append-only — entries are never
//! removed or reordered. Write-once per run, read never (within the run).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

/// Ledger status for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    Success,
    Failed,
}

/// One per-record outcome entry.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedRow {
    /// Row number in the operator's sheet: start offset + position within
    /// the batch + header offset.
    pub row: usize,
    pub name: String,
    pub status: RowStatus,
}

/// Accumulated state for one run.
#[derive(Debug, Default)]
pub struct RunLedger {
    rows: Vec<ProcessedRow>,
    success_count: usize,
    failure_count: usize,
}

impl RunLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record's outcome.
    pub fn record(&mut self, source_row: usize, label: impl Into<String>, status: RowStatus) {
        match status {
            RowStatus::Success => self.success_count += 1,
            RowStatus::Failed => self.failure_count += 1,
        }
        self.rows.push(ProcessedRow {
            row: source_row,
            name: label.into(),
            status,
        });
    }

    pub fn rows(&self) -> &[ProcessedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn failure_count(&self) -> usize {
        self.failure_count
    }

    /// Persist the ordered row sequence as `results_YYYY-MM-DD.json` under
    /// `dir`, returning the artifact path.
    pub fn finalize(&self, dir: &str) -> Result<PathBuf> {
        let dir = Path::new(dir);
        if !dir.exists() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create results dir {}", dir.display()))?;
        }

        let filename = format!("results_{}.json", chrono::Local::now().format("%Y-%m-%d"));
        let path = dir.join(filename);

        let json = serde_json::to_string_pretty(&self.rows)?;
        fs::write(&path, json)
            .with_context(|| format!("failed to write results to {}", path.display()))?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_track_statuses() {
        let mut ledger = RunLedger::new();
        ledger.record(2, "Jane Doe", RowStatus::Success);
        ledger.record(3, "John Roe", RowStatus::Failed);
        ledger.record(4, "Ann Poe", RowStatus::Success);

        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.success_count(), 2);
        assert_eq!(ledger.failure_count(), 1);
    }

    #[test]
    fn rows_keep_append_order() {
        let mut ledger = RunLedger::new();
        for row in [5, 6, 7] {
            ledger.record(row, "x", RowStatus::Success);
        }

        let rows: Vec<usize> = ledger.rows().iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![5, 6, 7]);
        assert!(rows.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn finalize_writes_dated_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = RunLedger::new();
        ledger.record(2, "Jane Doe", RowStatus::Success);
        ledger.record(3, "John Roe", RowStatus::Failed);

        let path = ledger.finalize(dir.path().to_str().unwrap()).unwrap();
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("results_"));
        assert!(name.ends_with(".json"));

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        let rows = parsed.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["row"], 2);
        assert_eq!(rows[0]["name"], "Jane Doe");
        assert_eq!(rows[0]["status"], "success");
        assert_eq!(rows[1]["status"], "failed");
    }

    #[test]
    fn finalize_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("results");
        let ledger = RunLedger::new();

        let path = ledger.finalize(nested.to_str().unwrap()).unwrap();
        assert!(path.exists());
    }
}
