//! Lead record model.

use std::collections::HashMap;

/// One input row describing a person/property to be submitted into the
/// target form.
///
/// Immutable after load; identified by its 0-based position in the source
/// sequence. Missing fields are not an error anywhere downstream — the
/// field mapper degrades them to empty/default values.
#[derive(Debug, Clone)]
pub struct LeadRecord {
    /// 0-based position in the source sequence.
    pub index: usize,
    fields: HashMap<String, String>,
}

impl LeadRecord {
    pub fn new(index: usize, fields: HashMap<String, String>) -> Self {
        Self { index, fields }
    }

    /// Field value by source column name, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Field value or empty string.
    pub fn get_or_empty(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    /// Human-readable label for logs and the ledger ("First Last").
    pub fn label(&self) -> String {
        format!(
            "{} {}",
            self.get_or_empty("First Name"),
            self.get_or_empty("Last Name")
        )
        .trim()
        .to_string()
    }
}
