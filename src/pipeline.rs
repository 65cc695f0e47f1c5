//! Run orchestration: listing, filtering, enrichment, rewriting and output.

use crate::core::config::AppConfig;
use crate::core::{
    DescriptionRewriter, InstrumentRecord, ProfileProvider, RecordCollection, RewriteBackend,
};
use crate::enrich::{EnrichStats, enrich_profiles};
use crate::listing;
use crate::output;
use crate::providers::{build_rewriter, fmp::FmpProvider, http::HttpExecutor};
use crate::rewrite::{RewriteStats, rewrite_descriptions};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Profiles,
    Rewrites,
}

/// Receives progress notifications while the fan out stages run.
pub trait StageObserver: Sync {
    fn stage_started(&self, _stage: Stage, _total: usize) {}
    fn item_done(&self) {}
    fn stage_finished(&self, _stage: Stage) {}
}

pub struct NoProgress;

impl StageObserver for NoProgress {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Reuse the list file from an earlier run instead of downloading it again.
    pub skip_download: bool,
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub backend: RewriteBackend,
    pub listed: usize,
    pub candidates: usize,
    pub enrich: EnrichStats,
    pub rewrite: RewriteStats,
    pub output_path: PathBuf,
}

/// Enriches and rewrites the filtered candidates, returning every record in listing order.
pub async fn process_candidates(
    candidates: Vec<InstrumentRecord>,
    profiles: &dyn ProfileProvider,
    rewriter: &dyn DescriptionRewriter,
    concurrency: usize,
    observer: &dyn StageObserver,
) -> (Vec<InstrumentRecord>, EnrichStats, RewriteStats) {
    let mut records: RecordCollection = candidates.into_iter().collect();

    observer.stage_started(Stage::Profiles, records.len());
    let enrich_stats =
        enrich_profiles(&mut records, profiles, concurrency, &|| observer.item_done()).await;
    observer.stage_finished(Stage::Profiles);

    let rewritable = records.iter().filter(|r| r.description().is_some()).count();
    observer.stage_started(Stage::Rewrites, rewritable);
    let rewrite_stats =
        rewrite_descriptions(&mut records, rewriter, concurrency, &|| observer.item_done()).await;
    observer.stage_finished(Stage::Rewrites);

    (records.into_records(), enrich_stats, rewrite_stats)
}

/// Runs the whole pipeline described by `config`.
///
/// An invalid rewrite backend fails the run before any request is sent. Per instrument
/// failures only leave fields empty in the output.
pub async fn run(
    config: &AppConfig,
    options: RunOptions,
    observer: &dyn StageObserver,
) -> Result<PipelineReport> {
    let backend = config.rewrite_backend()?;
    info!(%backend, "Starting enrichment run");

    let executor = HttpExecutor::new(config.request_timeout())?;
    let fmp = FmpProvider::new(config.fmp_url(), &config.api_key, executor.clone())?;
    let rewriter = build_rewriter(backend, config, executor);

    let list_path = Path::new(&config.list_path);
    if options.skip_download {
        info!(path = %list_path.display(), "Reusing existing instrument list");
    } else {
        listing::download_list(&fmp, list_path).await?;
    }

    let listed = listing::load_list(list_path)?;
    let listed_count = listed.len();
    let candidates = listing::filter_candidates(listed);
    let candidate_count = candidates.len();
    info!(
        listed = listed_count,
        candidates = candidate_count,
        "Filtered instrument list"
    );

    let (records, enrich, rewrite) = process_candidates(
        candidates,
        &fmp,
        rewriter.as_ref(),
        config.concurrency(),
        observer,
    )
    .await;

    let output_path = PathBuf::from(&config.output_path);
    output::write_csv(&output_path, &records)?;

    Ok(PipelineReport {
        backend,
        listed: listed_count,
        candidates: candidate_count,
        enrich,
        rewrite,
        output_path,
    })
}
