use anyhow::{Context, Result};
use chrono::Local;
use clap::Subcommand;
use maratron::models::run_log::parse_run_timestamp;
use maratron::models::RunLogEntry;
use maratron::services::run_stats_service::entry_pace;
use maratron::store::RunStore;
use std::fs;
use std::path::PathBuf;

use super::AppContext;

#[derive(Subcommand)]
pub enum RunsSubcommands {
    /// Import run log entries from a JSON array
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// List logged runs, most recent first
    List {
        /// Number of runs to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

pub async fn execute(subcmd: RunsSubcommands, ctx: &AppContext) -> Result<()> {
    match subcmd {
        RunsSubcommands::Import { file } => import_runs(ctx, &file).await,
        RunsSubcommands::List { limit } => list_runs(ctx, limit).await,
    }
}

async fn import_runs(ctx: &AppContext, file: &PathBuf) -> Result<()> {
    let contents = fs::read_to_string(file)
        .with_context(|| format!("Failed to read run file {}", file.display()))?;
    let entries: Vec<RunLogEntry> =
        serde_json::from_str(&contents).context("Failed to parse run log entries")?;

    let mut imported = 0;
    for mut entry in entries {
        entry.user_id = Some(ctx.user_id().to_string());
        ctx.store.create_run(entry).await?;
        imported += 1;
    }

    println!("✓ Imported {} runs", imported);
    Ok(())
}

async fn list_runs(ctx: &AppContext, limit: usize) -> Result<()> {
    let mut entries = ctx.store.list_runs(ctx.user_id()).await?;
    let tz = Local;
    entries.sort_by_key(|e| std::cmp::Reverse(parse_run_timestamp(&e.date, &tz)));

    println!("Recent Runs");
    println!("────────────────────────────────");
    if entries.is_empty() {
        println!("No runs logged yet");
        return Ok(());
    }

    for entry in entries.iter().take(limit) {
        println!(
            "  {:<12} {:<16} {:>6.1} {:<3} {:>9}  {} /{}",
            entry.date.get(..10).unwrap_or(&entry.date),
            entry.name.as_deref().unwrap_or("Run"),
            entry.distance,
            entry.distance_unit.short_label(),
            entry.duration,
            entry_pace(entry),
            entry.distance_unit.short_label()
        );
    }
    Ok(())
}
