use anyhow::Result;
use clap::Parser;
use maratron_cli::commands::Cli;

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging; a bad engine setting is reported by the command that needs it
    let engine = maratron::EngineConfig::from_env().unwrap_or_default();
    maratron::logging::init(maratron::logging::startup_level(cli.verbose, &engine));

    // Initialize tokio runtime
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async { cli.execute().await })
}
