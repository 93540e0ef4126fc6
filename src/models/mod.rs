pub mod event;
pub mod onboarding;
pub mod pace;
pub mod race;
pub mod run_log;
pub mod training_plan;

pub use event::PlanEvent;
pub use onboarding::{SignupFlow, SignupStep};
pub use pace::{Pace, PaceZone};
pub use race::RaceDistance;
pub use run_log::{DistanceUnit, RunLogEntry, MILES_PER_KILOMETER};
pub use training_plan::{DayOfWeek, PlannedRun, RunType, TrainingPlan, WeekSchedule};
