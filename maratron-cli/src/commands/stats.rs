use anyhow::Result;
use chrono::Local;
use clap::Args;
use colored::Colorize;
use maratron::services::compute_stats;
use maratron::store::RunStore;

use super::AppContext;

#[derive(Args)]
pub struct StatsCommand {
    /// Monthly goal in miles (overrides the configured goal)
    #[arg(long)]
    goal: Option<f64>,
}

impl StatsCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let engine = ctx.config.engine_config()?;
        let goal = self.goal.unwrap_or(engine.monthly_goal_miles);
        let runs = ctx.store.list_runs(ctx.user_id()).await?;
        let stats = compute_stats(&runs, &Local::now(), goal);

        println!("Training Statistics");
        println!("────────────────────────────────");
        println!("This week:   {:.1} mi over {} runs", stats.weekly_miles, stats.weekly_runs);
        println!("This month:  {:.1} mi over {} runs", stats.monthly_miles, stats.monthly_runs);
        println!(
            "Goal:        {}% of {:.0} mi ({})",
            stats.goal_progress_percent,
            stats.monthly_goal_miles,
            stats.goal_status.to_string().bold()
        );
        println!("Streak:      {} days", stats.streak_days);
        println!("All time:    {:.1} mi over {} runs", stats.total_miles, stats.total_runs);

        Ok(())
    }
}
