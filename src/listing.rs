//! Bulk instrument list: download, persistence and candidate filtering

use crate::core::{InstrumentRecord, InstrumentSource};
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

const CANDIDATE_TYPES: [&str; 2] = ["stock", "etf"];
const CANDIDATE_EXCHANGES: [&str; 2] = ["AMEX", "NASDAQ"];

/// Downloads the full instrument list and writes it to `path` for inspection and reuse.
///
/// Returns the number of entries written.
pub async fn download_list(source: &dyn InstrumentSource, path: &Path) -> Result<usize> {
    let items = source
        .fetch_instruments()
        .await
        .context("Failed to download instrument list")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&items)?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write instrument list to {}", path.display()))?;

    info!(count = items.len(), path = %path.display(), "Instrument list written");
    Ok(items.len())
}

/// Reads a list written by [`download_list`]. Entries without a string symbol are dropped.
pub fn load_list(path: &Path) -> Result<Vec<InstrumentRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read instrument list: {}", path.display()))?;
    let items: Vec<Value> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse instrument list: {}", path.display()))?;

    let total = items.len();
    let records: Vec<InstrumentRecord> = items
        .into_iter()
        .filter_map(InstrumentRecord::from_value)
        .collect();
    if records.len() < total {
        warn!(
            skipped = total - records.len(),
            "Ignoring list entries without a symbol"
        );
    }
    Ok(records)
}

/// Stocks and ETFs listed on AMEX or NASDAQ, in input order.
pub fn filter_candidates(records: Vec<InstrumentRecord>) -> Vec<InstrumentRecord> {
    records.into_iter().filter(is_candidate).collect()
}

fn is_candidate(record: &InstrumentRecord) -> bool {
    let type_ok = record
        .get_str("type")
        .is_some_and(|t| CANDIDATE_TYPES.contains(&t.to_lowercase().as_str()));
    let exchange_ok = record
        .get_str("exchangeShortName")
        .is_some_and(|e| CANDIDATE_EXCHANGES.contains(&e));
    type_ok && exchange_ok
}
