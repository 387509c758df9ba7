//! Lead processing context.
//!
//! Captures "which record am I working on" for logs and the ledger.

use std::fmt::Display;

/// Context for one submission attempt.
#[derive(Debug, Clone)]
pub struct LeadCtx {
    /// Row number in the operator's sheet (offset + position + header).
    pub source_row: usize,

    /// 1-based position within the selected sub-sequence (log display only).
    pub lead_index: usize,

    /// Size of the selected sub-sequence (log display only).
    pub total: usize,

    /// Human-readable lead label ("First Last").
    pub label: String,
}

impl LeadCtx {
    pub fn new(source_row: usize, lead_index: usize, total: usize, label: String) -> Self {
        Self {
            source_row,
            lead_index,
            total,
            label,
        }
    }
}

impl Display for LeadCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[lead {}/{} row#{} {}]",
            self.lead_index, self.total, self.source_row, self.label
        )
    }
}
