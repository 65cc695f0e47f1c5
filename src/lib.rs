pub mod cli;
pub mod core;
pub mod enrich;
pub mod listing;
pub mod output;
pub mod pipeline;
pub mod providers;
pub mod rewrite;

use anyhow::Result;
use tracing::{debug, info};

pub use pipeline::RunOptions;

pub enum AppCommand {
    /// Download and store the instrument list only.
    List,
    /// Run the full enrichment pipeline.
    Run(RunOptions),
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fmpr starting...");

    let config = match config_path {
        Some(path) => core::config::AppConfig::load_from_path(path)?,
        None => core::config::AppConfig::load()?,
    };
    debug!(
        rewrite_api = %config.rewrite_api,
        concurrency = config.concurrency(),
        "Loaded config"
    );

    match command {
        AppCommand::List => cli::list::run(&config).await,
        AppCommand::Run(options) => cli::run::run(&config, options).await,
    }
}
