//! Description rewrite stage

use crate::core::{DescriptionRewriter, RecordCollection};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    pub rewritten: usize,
    pub failed: usize,
    /// Records without a description to rewrite.
    pub skipped: usize,
}

/// Rewrites the description of every record that has one, attaching the result as
/// `description-new`. A failed rewrite leaves the field absent.
pub async fn rewrite_descriptions(
    records: &mut RecordCollection,
    rewriter: &dyn DescriptionRewriter,
    concurrency: usize,
    on_done: &(dyn Fn() + Sync),
) -> RewriteStats {
    let pending: Vec<(String, String)> = records
        .iter()
        .filter_map(|r| {
            r.description()
                .map(|d| (r.symbol().to_string(), d.to_string()))
        })
        .collect();

    let mut stats = RewriteStats {
        skipped: records.len() - pending.len(),
        ..Default::default()
    };
    if pending.is_empty() {
        return stats;
    }

    info!(count = pending.len(), "Rewriting descriptions");

    let mut completions = stream::iter(pending)
        .map(|(symbol, description)| async move {
            let result = rewriter.rewrite(&description).await;
            (symbol, result)
        })
        .buffer_unordered(concurrency.max(1));

    while let Some((symbol, result)) = completions.next().await {
        match result {
            Ok(text) => {
                if let Some(record) = records.get_mut(&symbol) {
                    debug!(%symbol, "Description rewritten");
                    record.set_rewritten_description(text);
                    stats.rewritten += 1;
                }
            }
            Err(e) => {
                warn!(%symbol, error = %e, "Failed to rewrite description");
                stats.failed += 1;
            }
        }
        on_done();
    }

    info!(
        rewritten = stats.rewritten,
        failed = stats.failed,
        skipped = stats.skipped,
        "Description rewrite finished"
    );
    stats
}
