//! Lead-file loader.
//!
//! The lead file is a TOML document with one `[[leads]]` table per record.
//! Column values may arrive as strings, integers, floats or booleans
//! depending on how the sheet was exported; everything is normalized to a
//! string on load so the rest of the pipeline deals in one shape.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tokio::fs;
use tracing::info;

use crate::error::SourceError;
use crate::models::lead::LeadRecord;

#[derive(Debug, Deserialize)]
struct LeadFile {
    #[serde(default)]
    leads: Vec<toml::Table>,
}

/// Load the ordered lead sequence from a TOML file.
pub async fn load_leads(path: &str) -> Result<Vec<LeadRecord>, SourceError> {
    if !Path::new(path).exists() {
        return Err(SourceError::NotFound {
            path: path.to_string(),
        });
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| SourceError::ReadFailed {
            path: path.to_string(),
            source: e,
        })?;

    let file: LeadFile = toml::from_str(&content).map_err(|e| SourceError::ParseFailed {
        path: path.to_string(),
        source: e,
    })?;

    let records = file
        .leads
        .into_iter()
        .enumerate()
        .map(|(index, table)| LeadRecord::new(index, normalize_fields(table)))
        .collect::<Vec<_>>();

    info!("✓ Loaded {} lead record(s) from {}", records.len(), path);

    Ok(records)
}

fn normalize_fields(table: toml::Table) -> HashMap<String, String> {
    table
        .into_iter()
        .map(|(key, value)| (key, value_to_string(value)))
        .collect()
}

fn value_to_string(value: toml::Value) -> String {
    match value {
        toml::Value::String(s) => s,
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(d) => d.to_string(),
        // Nested structures are not meaningful lead columns; keep their
        // serialized form rather than dropping the key.
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_a_typed_error() {
        let err = load_leads("no_such_leads.toml").await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound { .. }));
    }

    #[test]
    fn scalar_values_normalize_to_strings() {
        let table: toml::Table = toml::from_str(
            r#"
            "First Name" = "Jane"
            "Zip Code" = 90001
            "Fico" = 742.0
            "Veteran" = false
            "#,
        )
        .unwrap();

        let fields = normalize_fields(table);
        assert_eq!(fields["First Name"], "Jane");
        assert_eq!(fields["Zip Code"], "90001");
        assert_eq!(fields["Fico"], "742");
        assert_eq!(fields["Veteran"], "false");
    }

    #[tokio::test]
    async fn loads_ordered_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.toml");
        std::fs::write(
            &path,
            r#"
            [[leads]]
            "First Name" = "Jane"
            "Last Name" = "Doe"

            [[leads]]
            "First Name" = "John"
            "Last Name" = "Roe"
            "#,
        )
        .unwrap();

        let records = load_leads(path.to_str().unwrap()).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].index, 0);
        assert_eq!(records[0].label(), "Jane Doe");
        assert_eq!(records[1].index, 1);
        assert_eq!(records[1].label(), "John Roe");
    }
}
