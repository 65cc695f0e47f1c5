//! Profile enrichment stage.
//!
//! Fetches a company profile for every symbol in a [`RecordCollection`] with at most
//! `concurrency` requests in flight, merging each result as soon as it completes.
//! Failures never abort the stage: the affected record keeps only its listing fields.

use crate::core::{CompanyProfile, FetchError, ProfileProvider, RecordCollection};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

/// Outcome counts of one enrichment pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichStats {
    /// Records that received profile fields.
    pub enriched: usize,
    /// The remote had no profile for the symbol.
    pub missing: usize,
    /// Transport errors, non-success statuses and malformed profiles.
    pub failed: usize,
}

/// Enriches every record in `records` in place.
///
/// `on_done` is called once per symbol after its result has been merged.
pub async fn enrich_profiles(
    records: &mut RecordCollection,
    provider: &dyn ProfileProvider,
    concurrency: usize,
    on_done: &(dyn Fn() + Sync),
) -> EnrichStats {
    let mut stats = EnrichStats::default();
    let symbols = records.symbols();
    if symbols.is_empty() {
        return stats;
    }

    info!(
        count = symbols.len(),
        concurrency, "Fetching company profiles"
    );

    let mut completions = stream::iter(symbols)
        .map(|symbol| async move {
            let result = provider.fetch_profile(&symbol).await;
            (symbol, result)
        })
        .buffer_unordered(concurrency.max(1));

    while let Some((symbol, result)) = completions.next().await {
        merge_profile(records, &symbol, result, &mut stats);
        on_done();
    }

    info!(
        enriched = stats.enriched,
        missing = stats.missing,
        failed = stats.failed,
        "Profile enrichment finished"
    );
    stats
}

fn merge_profile(
    records: &mut RecordCollection,
    symbol: &str,
    result: Result<Option<CompanyProfile>, FetchError>,
    stats: &mut EnrichStats,
) {
    match result {
        Ok(Some(profile)) => match records.get_mut(symbol) {
            Some(record) => {
                record.apply_profile(&profile);
                debug!(%symbol, "Enriched with profile");
                stats.enriched += 1;
            }
            None => warn!(%symbol, "Profile for unknown symbol"),
        },
        Ok(None) => {
            debug!(%symbol, "No profile available");
            stats.missing += 1;
        }
        Err(e) => {
            warn!(%symbol, error = %e, "Failed to fetch profile");
            stats.failed += 1;
        }
    }
}
