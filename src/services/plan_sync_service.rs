//! Workflows that edit a plan and keep the stores in step.
//!
//! Every workflow edits a copy of the plan and hands back the stored result,
//! so a failed write never leaves a half-applied plan in the caller's hands.

use chrono::NaiveDate;
use std::cmp::Reverse;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::errors::{EngineResult, ScheduleError, StoreError};
use crate::models::training_plan::parse_plan_date;
use crate::models::{DayOfWeek, PlanEvent, PlannedRun, RunLogEntry, RunType, TrainingPlan};
use crate::services::plan_events::PlanEventBus;
use crate::services::plan_schedule_service::{assign_dates, reassign_run_day, AssignmentReport};
use crate::services::regeneration_service::{
    apply_reschedule, evaluate_date_change, DateChangeDecision, DateRange,
};
use crate::store::{PlanPatch, PlanStore, RunStore};

/// What happened to the run log after a completion toggle
#[derive(Debug, Clone, PartialEq)]
pub enum LogSync {
    Created(RunLogEntry),
    Deleted(String),
    /// Nothing to do: rest day, no matching entry, or the flag did not change
    Skipped,
    /// The plan was saved but the log could not be updated
    Failed(StoreError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOutcome {
    pub plan: TrainingPlan,
    pub week_done: bool,
    pub log_sync: LogSync,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RescheduleOutcome {
    Rescheduled {
        plan: TrainingPlan,
        report: AssignmentReport,
    },
    /// Nothing was written; the plan must be rebuilt for the new range
    RegenerationRequired(DateChangeDecision),
}

pub struct PlanSyncService<P, R> {
    plans: Arc<P>,
    runs: Arc<R>,
    events: PlanEventBus,
}

impl<P: PlanStore, R: RunStore> PlanSyncService<P, R> {
    pub fn new(plans: Arc<P>, runs: Arc<R>, events: PlanEventBus) -> Self {
        Self {
            plans,
            runs,
            events,
        }
    }

    pub fn events(&self) -> &PlanEventBus {
        &self.events
    }

    /// Store `plan` as the user's active plan
    pub async fn activate_plan(&self, mut plan: TrainingPlan) -> EngineResult<TrainingPlan> {
        plan.active = true;
        plan.recompute_done_flags();
        let saved = self.plans.save_plan(plan).await?;

        info!("Activated plan {} for user {}", saved.id, saved.user_id);
        self.events.publish(PlanEvent::ActivePlanChanged {
            user_id: saved.user_id.clone(),
            plan_id: Some(saved.id.clone()),
        });
        Ok(saved)
    }

    /// Date every run and persist the schedule
    pub async fn assign_and_persist(&self, plan: &TrainingPlan) -> EngineResult<(TrainingPlan, AssignmentReport)> {
        let mut edited = plan.clone();
        let report = assign_dates(&mut edited)?;
        let saved = self
            .plans
            .update_running_plan(&plan.id, PlanPatch::schedule(edited.schedule))
            .await?;

        self.publish_schedule(&saved);
        Ok((saved, report))
    }

    /// Mark a run done or not done.
    ///
    /// The plan is persisted first. Marking done then logs the run; marking
    /// not done removes the most recent log entry with the run's name and
    /// date. A log failure after the plan is saved comes back as
    /// [`LogSync::Failed`] rather than an error.
    pub async fn set_run_completion(
        &self,
        plan: &TrainingPlan,
        week_number: u32,
        run_index: usize,
        done: bool,
        today: NaiveDate,
    ) -> EngineResult<CompletionOutcome> {
        let run = plan
            .run(week_number, run_index)
            .ok_or(ScheduleError::RunNotFound {
                week_number,
                run_index,
            })?
            .clone();

        if run.done == done {
            debug!("Run {} of week {} already done={}", run_index, week_number, done);
            return Ok(CompletionOutcome {
                week_done: plan.week(week_number).map(|w| w.done).unwrap_or(false),
                plan: plan.clone(),
                log_sync: LogSync::Skipped,
            });
        }

        let mut edited = plan.clone();
        let mut week_done = false;
        if let Some(week) = edited.week_mut(week_number) {
            week.runs[run_index].done = done;
            week.recompute_done();
            week_done = week.done;
        }

        let saved = self
            .plans
            .update_running_plan(&plan.id, PlanPatch::schedule(edited.schedule))
            .await?;

        info!(
            "Run {} of week {} in plan {} marked done={}",
            run_index, week_number, saved.id, done
        );
        self.events.publish(PlanEvent::RunCompletionChanged {
            plan_id: saved.id.clone(),
            week_number,
            run_index,
            done,
            week_done,
        });

        let log_sync = if run.run_type == RunType::Rest {
            LogSync::Skipped
        } else if done {
            self.log_completed_run(&saved.user_id, &run, today).await
        } else {
            self.remove_logged_run(&saved.user_id, &run, today).await
        };

        Ok(CompletionOutcome {
            plan: saved,
            week_done,
            log_sync,
        })
    }

    /// Set or clear one run's preferred day and persist its new date
    pub async fn change_run_day(
        &self,
        plan: &TrainingPlan,
        week_number: u32,
        run_index: usize,
        day: Option<DayOfWeek>,
    ) -> EngineResult<TrainingPlan> {
        let mut edited = plan.clone();
        reassign_run_day(&mut edited, week_number, run_index, day)?;

        let saved = self
            .plans
            .update_running_plan(&plan.id, PlanPatch::schedule(edited.schedule))
            .await?;
        self.publish_schedule(&saved);
        Ok(saved)
    }

    /// Move the plan to a new date range, or report that it must be rebuilt
    pub async fn reschedule(&self, plan: &TrainingPlan, new_range: DateRange) -> EngineResult<RescheduleOutcome> {
        let decision = evaluate_date_change(DateRange::of_plan(plan), new_range);
        let new_start = match (decision, new_range.start) {
            (DateChangeDecision::Reschedule { .. }, Some(start)) => start,
            _ => {
                info!("Plan {} needs regeneration: {:?}", plan.id, decision);
                return Ok(RescheduleOutcome::RegenerationRequired(decision));
            }
        };

        let (saved, report) = self.set_start_date(plan, new_start).await?;
        if new_range.end != saved.end_date {
            debug!(
                "Requested end {:?} adjusted to {:?} to keep {} weeks",
                new_range.end, saved.end_date, saved.weeks
            );
        }

        Ok(RescheduleOutcome::Rescheduled {
            plan: saved,
            report,
        })
    }

    /// Start the plan on `new_start`, keep its length, re-date and persist.
    ///
    /// Used directly for plans that have no date range yet.
    pub async fn set_start_date(
        &self,
        plan: &TrainingPlan,
        new_start: NaiveDate,
    ) -> EngineResult<(TrainingPlan, AssignmentReport)> {
        let mut edited = plan.clone();
        let report = apply_reschedule(&mut edited, new_start)?;

        let saved = self
            .plans
            .update_running_plan(&plan.id, PlanPatch::dated(&edited))
            .await?;
        info!(
            "Plan {} scheduled from {} ({} runs re-dated)",
            saved.id, new_start, report.runs_changed
        );
        self.publish_schedule(&saved);
        Ok((saved, report))
    }

    async fn log_completed_run(&self, user_id: &str, run: &PlannedRun, today: NaiveDate) -> LogSync {
        let entry = completion_entry(user_id, run, today);
        match self.runs.create_run(entry).await {
            Ok(created) => LogSync::Created(created),
            Err(e) => {
                warn!("Run marked done but log entry was not created: {}", e);
                LogSync::Failed(e)
            }
        }
    }

    async fn remove_logged_run(&self, user_id: &str, run: &PlannedRun, today: NaiveDate) -> LogSync {
        let name = run.run_type.display_name();
        let date = run.date.unwrap_or(today);

        let entries = match self.runs.list_runs(user_id).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Run reopened but log could not be read: {}", e);
                return LogSync::Failed(e);
            }
        };

        let mut matches: Vec<RunLogEntry> = entries
            .into_iter()
            .filter(|e| e.name.as_deref() == Some(name.as_str()))
            .filter(|e| parse_plan_date(&e.date) == Some(date))
            .collect();
        matches.sort_by_key(|e| Reverse(e.created_at));

        let Some(id) = matches.into_iter().find_map(|e| e.id) else {
            debug!("No log entry named {} on {}", name, date);
            return LogSync::Skipped;
        };

        match self.runs.delete_run(&id).await {
            Ok(()) => LogSync::Deleted(id),
            Err(e) => {
                warn!("Run reopened but log entry {} was not deleted: {}", id, e);
                LogSync::Failed(e)
            }
        }
    }

    fn publish_schedule(&self, plan: &TrainingPlan) {
        self.events.publish(PlanEvent::ScheduleUpdated {
            plan_id: plan.id.clone(),
            start_date: plan.start_date,
            end_date: plan.end_date,
        });
    }
}

/// Log entry recorded when a planned run is marked done
pub fn completion_entry(user_id: &str, run: &PlannedRun, today: NaiveDate) -> RunLogEntry {
    let duration = run
        .target_pace
        .as_ref()
        .and_then(|p| p.seconds_per_unit().map(|secs| (secs, p.unit)))
        .filter(|_| run.mileage.is_finite() && run.mileage > 0.0)
        .map(|(secs, pace_unit)| {
            let distance = pace_unit.from_miles(run.unit.to_miles(run.mileage));
            (secs as f64 * distance).round() as u32
        })
        .unwrap_or(0);

    let mut entry = RunLogEntry::new(
        run.date.unwrap_or(today),
        run.mileage,
        run.unit,
        format!(
            "{:02}:{:02}:{:02}",
            duration / 3600,
            (duration % 3600) / 60,
            duration % 60
        ),
    );
    entry.user_id = Some(user_id.to_string());
    entry.name = Some(run.run_type.display_name());
    entry.pace = run.target_pace.clone();
    entry
}

/// A plan guarded for one editor at a time.
///
/// The lock is held across the store round trip, so two edits through the
/// same session never interleave. The held plan only changes when a write
/// succeeds.
pub struct PlanSession<P, R> {
    service: Arc<PlanSyncService<P, R>>,
    plan: Mutex<TrainingPlan>,
}

impl<P: PlanStore, R: RunStore> PlanSession<P, R> {
    pub fn new(service: Arc<PlanSyncService<P, R>>, plan: TrainingPlan) -> Self {
        Self {
            service,
            plan: Mutex::new(plan),
        }
    }

    pub async fn snapshot(&self) -> TrainingPlan {
        self.plan.lock().await.clone()
    }

    pub async fn assign_dates(&self) -> EngineResult<AssignmentReport> {
        let mut plan = self.plan.lock().await;
        let (saved, report) = self.service.assign_and_persist(&plan).await?;
        *plan = saved;
        Ok(report)
    }

    pub async fn set_run_completion(
        &self,
        week_number: u32,
        run_index: usize,
        done: bool,
        today: NaiveDate,
    ) -> EngineResult<CompletionOutcome> {
        let mut plan = self.plan.lock().await;
        let outcome = self
            .service
            .set_run_completion(&plan, week_number, run_index, done, today)
            .await?;
        *plan = outcome.plan.clone();
        Ok(outcome)
    }

    pub async fn change_run_day(
        &self,
        week_number: u32,
        run_index: usize,
        day: Option<DayOfWeek>,
    ) -> EngineResult<TrainingPlan> {
        let mut plan = self.plan.lock().await;
        let saved = self
            .service
            .change_run_day(&plan, week_number, run_index, day)
            .await?;
        *plan = saved.clone();
        Ok(saved)
    }

    pub async fn set_start_date(&self, new_start: NaiveDate) -> EngineResult<(TrainingPlan, AssignmentReport)> {
        let mut plan = self.plan.lock().await;
        let (saved, report) = self.service.set_start_date(&plan, new_start).await?;
        *plan = saved.clone();
        Ok((saved, report))
    }

    pub async fn reschedule(&self, new_range: DateRange) -> EngineResult<RescheduleOutcome> {
        let mut plan = self.plan.lock().await;
        let outcome = self.service.reschedule(&plan, new_range).await?;
        if let RescheduleOutcome::Rescheduled { plan: saved, .. } = &outcome {
            *plan = saved.clone();
        }
        Ok(outcome)
    }
}
