// Engine services

pub mod pace_zone_service;
pub mod plan_events;
pub mod plan_ingest;
pub mod plan_schedule_service;
pub mod plan_sync_service;
pub mod regeneration_service;
pub mod run_stats_service;
pub mod week_calendar;

pub use pace_zone_service::{calculate_pace, predict_race_time, PaceTable, PaceZoneCalculator, ZonePace};
pub use plan_events::PlanEventBus;
pub use plan_schedule_service::{assign_dates, reassign_run_day, AssignmentReport};
pub use plan_sync_service::{CompletionOutcome, LogSync, PlanSession, PlanSyncService, RescheduleOutcome};
pub use regeneration_service::{evaluate_date_change, should_regenerate, DateChangeDecision, DateRange};
pub use run_stats_service::{compute_stats, GoalStatus, RunStats};
