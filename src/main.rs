use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fmpr::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fmpr::AppCommand {
    fn from(cmd: Commands) -> fmpr::AppCommand {
        match cmd {
            Commands::List => fmpr::AppCommand::List,
            Commands::Run { skip_download } => {
                fmpr::AppCommand::Run(fmpr::RunOptions { skip_download })
            }
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Download the tradable instrument list
    List,
    /// Enrich instruments with profiles and rewritten descriptions
    Run {
        /// Reuse the previously downloaded instrument list
        #[arg(long)]
        skip_download: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => fmpr::cli::setup::setup_at_path(path),
            None => fmpr::cli::setup::setup(),
        },
        Some(cmd) => fmpr::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
