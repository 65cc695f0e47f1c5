//! CSV output of the final records

use crate::core::InstrumentRecord;
use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Every field name that appears in any record, in first seen order.
///
/// Records that failed enrichment carry fewer fields than enriched ones, so the header
/// cannot be taken from a single record.
pub fn columns(records: &[InstrumentRecord]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for (key, _) in record.fields() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Writes a header row and one row per record. Absent fields are empty cells.
pub fn write_records<W: Write>(writer: W, records: &[InstrumentRecord]) -> Result<()> {
    let columns = columns(records);
    if columns.is_empty() {
        return Ok(());
    }
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&columns)?;
    for record in records {
        wtr.write_record(columns.iter().map(|c| cell(record.get(c))))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv(path: &Path, records: &[InstrumentRecord]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    write_records(file, records)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    info!(rows = records.len(), path = %path.display(), "Output written");
    Ok(())
}
