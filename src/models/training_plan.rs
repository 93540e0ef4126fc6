use chrono::{DateTime, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::pace::{Pace, RawPace};
use super::run_log::DistanceUnit;

/// A multi-week training plan owned by one user.
///
/// The engine never creates plans; it re-dates them and toggles run
/// completion. Fields it does not understand are kept in `extra` so the
/// stored document round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPlan {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "user_id")]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "totalWeeks")]
    pub weeks: u32,
    #[serde(
        default,
        alias = "start_date",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_plan_date"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(
        default,
        alias = "end_date",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_plan_date"
    )]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub active: bool,
    #[serde(default, alias = "planData", alias = "weeksData")]
    pub schedule: Vec<WeekSchedule>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TrainingPlan {
    pub fn week(&self, week_number: u32) -> Option<&WeekSchedule> {
        self.schedule.iter().find(|w| w.week_number == week_number)
    }

    pub fn week_mut(&mut self, week_number: u32) -> Option<&mut WeekSchedule> {
        self.schedule
            .iter_mut()
            .find(|w| w.week_number == week_number)
    }

    pub fn run(&self, week_number: u32, run_index: usize) -> Option<&PlannedRun> {
        self.week(week_number)?.runs.get(run_index)
    }

    pub fn total_runs(&self) -> usize {
        self.schedule.iter().map(|w| w.runs.len()).sum()
    }

    pub fn completed_runs(&self) -> usize {
        self.schedule
            .iter()
            .flat_map(|w| w.runs.iter())
            .filter(|r| r.done)
            .count()
    }

    /// Recompute every week's derived `done` flag
    pub fn recompute_done_flags(&mut self) {
        for week in &mut self.schedule {
            week.recompute_done();
        }
    }
}

/// One week of a plan. `done` is derived from the runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekSchedule {
    #[serde(default, alias = "week", alias = "week_number")]
    pub week_number: u32,
    #[serde(
        default,
        alias = "mileage",
        alias = "weeklyVolume",
        skip_serializing_if = "Option::is_none"
    )]
    pub weekly_mileage: Option<f64>,
    #[serde(default, alias = "distanceUnit", alias = "units")]
    pub unit: DistanceUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, alias = "workouts")]
    pub runs: Vec<PlannedRun>,
    #[serde(default)]
    pub done: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WeekSchedule {
    /// A week is done when it has runs and all of them are done
    pub fn is_complete(&self) -> bool {
        !self.runs.is_empty() && self.runs.iter().all(|r| r.done)
    }

    /// Recompute `done`; returns true if the flag changed
    pub fn recompute_done(&mut self) -> bool {
        let done = self.is_complete();
        let changed = self.done != done;
        self.done = done;
        changed
    }
}

/// A single workout inside a week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "PlannedRunRecord")]
pub struct PlannedRun {
    #[serde(rename = "type")]
    pub run_type: RunType,
    pub mileage: f64,
    pub unit: DistanceUnit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_pace: Option<Pace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<DayOfWeek>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Fields the engine does not model. An unreadable `date` is parked here
    /// under its own key until the run is dated again.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wire shape of a run as stores and imports send it
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlannedRunRecord {
    #[serde(rename = "type", alias = "workoutType", alias = "runType")]
    run_type: RunType,
    #[serde(default, alias = "distance")]
    mileage: f64,
    #[serde(default, alias = "distanceUnit", alias = "units")]
    unit: DistanceUnit,
    #[serde(default, alias = "pace")]
    target_pace: Option<RawPace>,
    #[serde(default, alias = "dayOfWeek")]
    day: Option<DayOfWeek>,
    #[serde(default)]
    date: Option<Value>,
    #[serde(default, alias = "completed")]
    done: bool,
    #[serde(default, alias = "description")]
    notes: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<PlannedRunRecord> for PlannedRun {
    fn from(record: PlannedRunRecord) -> Self {
        let mut extra = record.extra;
        let date = match record.date {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(raw) => {
                let parsed = raw.as_str().and_then(parse_plan_date);
                if parsed.is_none() {
                    tracing::warn!("Treating run with unreadable date {} as undated", raw);
                    extra.insert(RAW_DATE_KEY.to_string(), raw);
                }
                parsed
            }
        };

        Self {
            run_type: record.run_type,
            mileage: record.mileage,
            unit: record.unit,
            // A pace without its own unit is per unit of the run's distance
            target_pace: record.target_pace.map(|p| p.into_pace(record.unit)),
            day: record.day,
            date,
            done: record.done,
            notes: record.notes,
            extra,
        }
    }
}

const RAW_DATE_KEY: &str = "date";

impl PlannedRun {
    pub fn new(run_type: RunType, mileage: f64, unit: DistanceUnit) -> Self {
        Self {
            run_type,
            mileage,
            unit,
            target_pace: None,
            day: None,
            date: None,
            done: false,
            notes: None,
            extra: Map::new(),
        }
    }

    /// Set the run's date, dropping any unreadable value kept from the store
    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = Some(date);
        self.extra.remove(RAW_DATE_KEY);
    }

    pub fn with_day(mut self, day: DayOfWeek) -> Self {
        self.day = Some(day);
        self
    }

    pub fn with_target_pace(mut self, pace: Pace) -> Self {
        self.target_pace = Some(pace);
        self
    }
}

/// Workout category. Unrecognised labels are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunType {
    Easy,
    Long,
    Tempo,
    Interval,
    Race,
    Marathon,
    Rest,
    Recovery,
    Speed,
    Other(String),
}

impl RunType {
    pub fn as_str(&self) -> &str {
        match self {
            RunType::Easy => "easy",
            RunType::Long => "long",
            RunType::Tempo => "tempo",
            RunType::Interval => "interval",
            RunType::Race => "race",
            RunType::Marathon => "marathon",
            RunType::Rest => "rest",
            RunType::Recovery => "recovery",
            RunType::Speed => "speed",
            RunType::Other(label) => label,
        }
    }

    /// Human-readable name used for run-log entries, e.g. "Tempo Run"
    pub fn display_name(&self) -> String {
        let label = self.as_str();
        let mut chars = label.chars();
        let title = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::from("Unnamed"),
        };
        format!("{} Run", title)
    }
}

impl From<String> for RunType {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "easy" => RunType::Easy,
            "long" => RunType::Long,
            "tempo" => RunType::Tempo,
            "interval" | "intervals" => RunType::Interval,
            "race" => RunType::Race,
            "marathon" => RunType::Marathon,
            "rest" => RunType::Rest,
            "recovery" => RunType::Recovery,
            "speed" => RunType::Speed,
            _ => RunType::Other(value),
        }
    }
}

impl From<RunType> for String {
    fn from(value: RunType) -> Self {
        match value {
            RunType::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for RunType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Preferred weekday for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayOfWeek {
    #[serde(alias = "monday", alias = "Mon", alias = "mon")]
    Monday,
    #[serde(alias = "tuesday", alias = "Tue", alias = "tue")]
    Tuesday,
    #[serde(alias = "wednesday", alias = "Wed", alias = "wed")]
    Wednesday,
    #[serde(alias = "thursday", alias = "Thu", alias = "thu")]
    Thursday,
    #[serde(alias = "friday", alias = "Fri", alias = "fri")]
    Friday,
    #[serde(alias = "saturday", alias = "Sat", alias = "sat")]
    Saturday,
    #[serde(alias = "sunday", alias = "Sun", alias = "sun")]
    Sunday,
}

impl DayOfWeek {
    pub fn to_weekday(self) -> Weekday {
        match self {
            DayOfWeek::Monday => Weekday::Mon,
            DayOfWeek::Tuesday => Weekday::Tue,
            DayOfWeek::Wednesday => Weekday::Wed,
            DayOfWeek::Thursday => Weekday::Thu,
            DayOfWeek::Friday => Weekday::Fri,
            DayOfWeek::Saturday => Weekday::Sat,
            DayOfWeek::Sunday => Weekday::Sun,
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(value: Weekday) -> Self {
        match value {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for DayOfWeek {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Weekday>()
            .map(DayOfWeek::from)
            .map_err(|_| anyhow::anyhow!("Invalid day of week: {}", s))
    }
}

/// Parse a stored plan date. Accepts `YYYY-MM-DD` or a full RFC 3339
/// timestamp, which is reduced to its UTC calendar date.
pub fn parse_plan_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.naive_utc().date())
}

fn deserialize_plan_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_plan_date(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid plan date: {}", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_type_keeps_unknown_labels() {
        let known: RunType = serde_json::from_str("\"Tempo\"").unwrap();
        assert_eq!(known, RunType::Tempo);
        assert_eq!(serde_json::to_string(&known).unwrap(), "\"tempo\"");

        let other: RunType = serde_json::from_str("\"fartlek\"").unwrap();
        assert_eq!(other, RunType::Other("fartlek".to_string()));
        assert_eq!(serde_json::to_string(&other).unwrap(), "\"fartlek\"");
    }

    #[test]
    fn test_week_done_requires_all_runs() {
        let mut week = WeekSchedule {
            week_number: 1,
            weekly_mileage: Some(10.0),
            unit: DistanceUnit::Miles,
            phase: None,
            runs: vec![
                PlannedRun::new(RunType::Easy, 4.0, DistanceUnit::Miles),
                PlannedRun::new(RunType::Long, 6.0, DistanceUnit::Miles),
            ],
            done: false,
            extra: Map::new(),
        };

        week.runs[0].done = true;
        assert!(!week.recompute_done());
        assert!(!week.done);

        week.runs[1].done = true;
        assert!(week.recompute_done());
        assert!(week.done);

        week.runs.clear();
        week.recompute_done();
        assert!(!week.done);
    }

    #[test]
    fn test_unreadable_run_date_degrades_to_undated() {
        let plan: TrainingPlan = serde_json::from_value(serde_json::json!({
            "id": "p",
            "weeks": 1,
            "schedule": [{
                "weekNumber": 1,
                "runs": [
                    { "type": "easy", "mileage": 3, "date": "TBD" },
                    { "type": "long", "mileage": 8, "date": "2024-03-10" }
                ]
            }]
        }))
        .unwrap();

        let runs = &plan.schedule[0].runs;
        assert_eq!(runs[0].date, None);
        assert_eq!(runs[1].date, NaiveDate::from_ymd_opt(2024, 3, 10));

        let stored = serde_json::to_value(&plan.schedule[0].runs[0]).unwrap();
        assert_eq!(stored["date"], "TBD");
    }

    #[test]
    fn test_dating_a_run_replaces_unreadable_value() {
        let mut run: PlannedRun =
            serde_json::from_value(serde_json::json!({ "type": "easy", "date": "soon" })).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        run.set_date(date);

        let stored = serde_json::to_value(&run).unwrap();
        assert_eq!(stored["date"], "2024-03-05");
        assert!(!run.extra.contains_key("date"));
    }

    #[test]
    fn test_bare_pace_follows_run_unit() {
        let run: PlannedRun = serde_json::from_value(serde_json::json!({
            "type": "tempo", "mileage": 8, "unit": "km", "targetPace": "4:10"
        }))
        .unwrap();
        assert_eq!(run.target_pace, Some(Pace::new(DistanceUnit::Kilometers, "4:10")));

        let explicit: PlannedRun = serde_json::from_value(serde_json::json!({
            "type": "tempo", "mileage": 8, "unit": "km",
            "targetPace": { "unit": "miles", "pace": "6:40" }
        }))
        .unwrap();
        assert_eq!(explicit.target_pace, Some(Pace::new(DistanceUnit::Miles, "6:40")));
    }

    #[test]
    fn test_plan_date_accepts_timestamps() {
        assert_eq!(
            parse_plan_date("2024-03-04T00:00:00.000Z"),
            NaiveDate::from_ymd_opt(2024, 3, 4)
        );
        assert_eq!(parse_plan_date("2024-03-04"), NaiveDate::from_ymd_opt(2024, 3, 4));
        assert_eq!(parse_plan_date("next tuesday"), None);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(RunType::Long.display_name(), "Long Run");
        assert_eq!(RunType::Other("hill repeats".into()).display_name(), "Hill repeats Run");
    }
}
