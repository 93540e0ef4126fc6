use anyhow::{bail, Context, Result};
use chrono::{Duration, Local, NaiveDate};
use clap::Subcommand;
use colored::Colorize;
use maratron::models::{DayOfWeek, TrainingPlan};
use maratron::services::plan_ingest;
use maratron::services::week_calendar::current_plan_week;
use maratron::services::{DateChangeDecision, DateRange, LogSync, RescheduleOutcome};
use std::fs;
use std::path::PathBuf;

use super::AppContext;

#[derive(Subcommand)]
pub enum PlanSubcommands {
    /// Import a plan from a JSON file and make it active
    Import {
        /// Path to the plan JSON
        file: PathBuf,
    },

    /// Show the active plan
    Show {
        /// Only show this week
        #[arg(short, long)]
        week: Option<u32>,
    },

    /// Assign calendar dates to every run
    Assign,

    /// Set or clear a run's preferred day
    SetDay {
        /// Week number (1-based)
        #[arg(short, long)]
        week: u32,

        /// Run position within the week (0-based)
        #[arg(short, long)]
        run: usize,

        /// Day of week, e.g. tuesday
        #[arg(short, long, conflicts_with = "clear")]
        day: Option<String>,

        /// Remove the preferred day
        #[arg(long)]
        clear: bool,
    },

    /// Mark a run as done
    Complete {
        #[arg(short, long)]
        week: u32,

        #[arg(short, long)]
        run: usize,
    },

    /// Mark a run as not done
    Reopen {
        #[arg(short, long)]
        week: u32,

        #[arg(short, long)]
        run: usize,
    },

    /// Move the plan to a new date range
    Reschedule {
        /// New start date (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// New end date (YYYY-MM-DD); defaults to keeping the plan length
        #[arg(long)]
        end: Option<NaiveDate>,
    },
}

pub async fn execute(subcmd: PlanSubcommands, ctx: &AppContext) -> Result<()> {
    match subcmd {
        PlanSubcommands::Import { file } => import_plan(ctx, &file).await,
        PlanSubcommands::Show { week } => show_plan(ctx, week).await,
        PlanSubcommands::Assign => assign_plan(ctx).await,
        PlanSubcommands::SetDay {
            week,
            run,
            day,
            clear,
        } => set_day(ctx, week, run, day, clear).await,
        PlanSubcommands::Complete { week, run } => set_completion(ctx, week, run, true).await,
        PlanSubcommands::Reopen { week, run } => set_completion(ctx, week, run, false).await,
        PlanSubcommands::Reschedule { start, end } => reschedule(ctx, start, end).await,
    }
}

async fn import_plan(ctx: &AppContext, file: &PathBuf) -> Result<()> {
    let contents = fs::read_to_string(file)
        .with_context(|| format!("Failed to read plan file {}", file.display()))?;
    let mut plan = plan_ingest::parse_plan(&contents).context("Failed to parse plan")?;
    if plan.user_id.is_empty() {
        plan.user_id = ctx.user_id().to_string();
    }

    let plan = ctx.service.activate_plan(plan).await?;
    println!("✓ Imported plan {} ({} weeks, {} runs)", plan.id, plan.weeks, plan.total_runs());

    if plan.start_date.is_some() {
        match ctx.service.assign_and_persist(&plan).await {
            Ok((_, report)) => println!("✓ Dated {} runs", report.runs_dated),
            Err(e) => println!("{} Dates not assigned: {}", "!".yellow(), e),
        }
    } else {
        println!("Plan has no start date; set one with: maratron plan reschedule --start <date>");
    }

    Ok(())
}

async fn show_plan(ctx: &AppContext, only_week: Option<u32>) -> Result<()> {
    let plan = ctx.active_plan().await?;
    let today = Local::now().date_naive();
    let current = plan
        .start_date
        .and_then(|start| current_plan_week(start, today, plan.weeks));

    print_header(&plan);
    if let Some(week) = current {
        println!("Current week: {}", week);
    }
    println!();

    for week in &plan.schedule {
        if only_week.is_some_and(|w| w != week.week_number) {
            continue;
        }

        let marker = if week.done { "✓".green().to_string() } else { " ".to_string() };
        let mut title = format!("Week {}", week.week_number);
        if let Some(phase) = &week.phase {
            title.push_str(&format!(" ({})", phase));
        }
        if Some(week.week_number) == current {
            title = title.bold().to_string();
        }
        println!("{} {}", marker, title);

        for (idx, run) in week.runs.iter().enumerate() {
            let date = run
                .date
                .map(|d| d.format("%a %Y-%m-%d").to_string())
                .unwrap_or_else(|| "undated".to_string());
            let pace = run
                .target_pace
                .as_ref()
                .map(|p| p.to_string())
                .unwrap_or_default();
            println!(
                "   [{}] {} {:<14} {:>5.1} {:<3} {:<14} {}",
                idx,
                if run.done { "✓" } else { "·" },
                date,
                run.mileage,
                run.unit.short_label(),
                run.run_type.display_name(),
                pace
            );
        }
    }

    Ok(())
}

async fn assign_plan(ctx: &AppContext) -> Result<()> {
    let session = ctx.plan_session().await?;
    match session.assign_dates().await {
        Ok(report) => {
            println!(
                "✓ Dated {} runs ({} changed)",
                report.runs_dated, report.runs_changed
            );
            Ok(())
        }
        Err(e) if e.requires_regeneration() => {
            bail!("{}. Rebuild the plan for the new dates and import it again", e)
        }
        Err(e) => Err(e.into()),
    }
}

async fn set_day(
    ctx: &AppContext,
    week: u32,
    run: usize,
    day: Option<String>,
    clear: bool,
) -> Result<()> {
    let day: Option<DayOfWeek> = match (day, clear) {
        (Some(raw), false) => Some(raw.parse()?),
        (None, true) => None,
        _ => bail!("Pass either --day <day> or --clear"),
    };

    let session = ctx.plan_session().await?;
    let plan = session.change_run_day(week, run, day).await?;
    let date = plan
        .run(week, run)
        .and_then(|r| r.date)
        .context("Run has no date after reassignment")?;

    match day {
        Some(day) => println!("✓ Week {} run {} moved to {} ({})", week, run, day, date),
        None => println!("✓ Week {} run {} has no preferred day ({})", week, run, date),
    }
    Ok(())
}

async fn set_completion(ctx: &AppContext, week: u32, run: usize, done: bool) -> Result<()> {
    let session = ctx.plan_session().await?;
    let today = Local::now().date_naive();
    let outcome = session.set_run_completion(week, run, done, today).await?;

    let verb = if done { "done" } else { "not done" };
    println!("✓ Week {} run {} marked {}", week, run, verb);
    if outcome.week_done {
        println!("✓ Week {} complete!", week);
    }

    match outcome.log_sync {
        LogSync::Created(entry) => println!(
            "  Logged {} on {}",
            entry.name.unwrap_or_default(),
            entry.date
        ),
        LogSync::Deleted(id) => println!("  Removed log entry {}", id),
        LogSync::Skipped => {}
        LogSync::Failed(e) => println!(
            "{} Plan saved but the run log was not updated: {}",
            "!".yellow(),
            e
        ),
    }
    Ok(())
}

async fn reschedule(ctx: &AppContext, start: NaiveDate, end: Option<NaiveDate>) -> Result<()> {
    let session = ctx.plan_session().await?;
    let plan = session.snapshot().await;

    if plan.start_date.is_none() || plan.end_date.is_none() {
        let (plan, report) = session.set_start_date(start).await?;
        println!(
            "✓ Plan scheduled {} to {}, {} runs dated",
            fmt_date(plan.start_date),
            fmt_date(plan.end_date),
            report.runs_dated
        );
        return Ok(());
    }

    let end = end.unwrap_or(start + Duration::days(i64::from(plan.weeks) * 7));
    let outcome = session.reschedule(DateRange::new(start, end)).await?;

    match outcome {
        RescheduleOutcome::Rescheduled { plan, report } => {
            println!(
                "✓ Plan now runs {} to {}",
                fmt_date(plan.start_date),
                fmt_date(plan.end_date)
            );
            println!("✓ {} runs re-dated", report.runs_changed);
        }
        RescheduleOutcome::RegenerationRequired(decision) => {
            let (from, to) = match decision {
                DateChangeDecision::Regenerate {
                    original_weeks,
                    new_weeks,
                } => (original_weeks, new_weeks),
                DateChangeDecision::Reschedule {
                    original_weeks,
                    new_weeks,
                } => (Some(original_weeks), Some(new_weeks)),
            };
            println!(
                "{} The new dates change the plan length ({} -> {} weeks).",
                "!".yellow(),
                from.map(|w| w.to_string()).unwrap_or_else(|| "?".to_string()),
                to.map(|w| w.to_string()).unwrap_or_else(|| "?".to_string())
            );
            println!("  Build a new plan for this range and import it.");
        }
    }
    Ok(())
}

fn print_header(plan: &TrainingPlan) {
    let name = if plan.name.is_empty() { &plan.id } else { &plan.name };
    println!("{}", name.bold());
    println!("────────────────────────────────");
    println!(
        "{} weeks, {} to {}, {}/{} runs done",
        plan.weeks,
        fmt_date(plan.start_date),
        fmt_date(plan.end_date),
        plan.completed_runs(),
        plan.total_runs()
    );
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "?".to_string())
}
