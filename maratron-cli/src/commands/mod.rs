mod config_cmd;
mod onboarding;
mod paces;
mod plan;
mod runs;
mod stats;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use maratron::models::TrainingPlan;
use maratron::services::{PlanEventBus, PlanSession, PlanSyncService};
use maratron::store::PlanStore;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::storage::SledStore;

pub use paces::PacesCommand;
pub use plan::PlanSubcommands;
pub use runs::RunsSubcommands;
pub use stats::StatsCommand;

#[derive(Parser)]
#[command(name = "maratron")]
#[command(about = "Training plan scheduling and pace zones for runners", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "MARATRON_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show training paces for a fitness score
    Paces(PacesCommand),

    /// Manage the active training plan
    #[command(subcommand)]
    Plan(PlanSubcommands),

    /// Manage the run log
    #[command(subcommand)]
    Runs(RunsSubcommands),

    /// Show weekly and monthly statistics
    Stats(StatsCommand),

    /// Track signup progress
    #[command(subcommand)]
    Onboarding(OnboardingSubcommands),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigSubcommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum OnboardingSubcommands {
    /// Show completed and pending signup steps
    Status,

    /// Complete a signup step
    Complete {
        /// Step name (account, profile, training, preferences)
        step: String,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show current configuration
    Show,

    /// Initialize configuration with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

/// Everything a storage-backed command needs
pub struct AppContext {
    pub config: Config,
    pub store: Arc<SledStore>,
    pub service: Arc<PlanSyncService<SledStore, SledStore>>,
}

impl AppContext {
    pub fn open(config: Config) -> Result<Self> {
        let store = Arc::new(SledStore::init(&config)?);
        let service = Arc::new(PlanSyncService::new(
            store.clone(),
            store.clone(),
            PlanEventBus::new(),
        ));
        Ok(Self {
            config,
            store,
            service,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.config.profile.user_id
    }

    pub async fn active_plan(&self) -> Result<TrainingPlan> {
        self.store
            .active_plan(self.user_id())
            .await?
            .context("No active plan. Import one with: maratron plan import <file>")
    }

    pub async fn plan_session(&self) -> Result<PlanSession<SledStore, SledStore>> {
        let plan = self.active_plan().await?;
        Ok(PlanSession::new(self.service.clone(), plan))
    }
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        if self.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        let config_path = self.config.as_deref();
        match self.command {
            Commands::Paces(cmd) => cmd.execute(&Config::load(config_path)?),
            Commands::Plan(subcmd) => {
                let ctx = AppContext::open(Config::load(config_path)?)?;
                plan::execute(subcmd, &ctx).await
            }
            Commands::Runs(subcmd) => {
                let ctx = AppContext::open(Config::load(config_path)?)?;
                runs::execute(subcmd, &ctx).await
            }
            Commands::Stats(cmd) => {
                let ctx = AppContext::open(Config::load(config_path)?)?;
                cmd.execute(&ctx).await
            }
            Commands::Onboarding(subcmd) => {
                let ctx = AppContext::open(Config::load(config_path)?)?;
                match subcmd {
                    OnboardingSubcommands::Status => onboarding::show_status(&ctx),
                    OnboardingSubcommands::Complete { step } => onboarding::complete_step(&ctx, &step),
                }
            }
            Commands::Config(subcmd) => match subcmd {
                ConfigSubcommands::Show => config_cmd::show_config(config_path),
                ConfigSubcommands::Init { force } => config_cmd::init_config(config_path, force),
            },
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
