use crate::core::config::AppConfig;
use crate::listing;
use crate::providers::{fmp::FmpProvider, http::HttpExecutor};
use anyhow::Result;
use std::path::Path;

/// Downloads the tradable instrument list without running the rest of the pipeline.
pub async fn run(config: &AppConfig) -> Result<()> {
    let executor = HttpExecutor::new(config.request_timeout())?;
    let fmp = FmpProvider::new(config.fmp_url(), &config.api_key, executor)?;
    let path = Path::new(&config.list_path);

    let count = listing::download_list(&fmp, path).await?;
    let candidates = listing::filter_candidates(listing::load_list(path)?).len();

    println!(
        "Wrote {count} instruments to {} ({candidates} candidates)",
        path.display()
    );
    Ok(())
}
