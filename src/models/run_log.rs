use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::pace::Pace;

/// Miles in one kilometer
pub const MILES_PER_KILOMETER: f64 = 0.621371;

/// Distance unit attached to plans, runs and paces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    #[serde(alias = "mi", alias = "mile", alias = "Miles")]
    Miles,
    #[serde(
        alias = "km",
        alias = "kilometer",
        alias = "kilometres",
        alias = "Kilometers"
    )]
    Kilometers,
}

impl DistanceUnit {
    /// Convert a distance in this unit to miles
    pub fn to_miles(self, distance: f64) -> f64 {
        match self {
            DistanceUnit::Miles => distance,
            DistanceUnit::Kilometers => distance * MILES_PER_KILOMETER,
        }
    }

    /// Convert a distance in miles to this unit
    pub fn from_miles(self, miles: f64) -> f64 {
        match self {
            DistanceUnit::Miles => miles,
            DistanceUnit::Kilometers => miles / MILES_PER_KILOMETER,
        }
    }

    /// Meters in one unit
    pub fn meters(self) -> f64 {
        match self {
            DistanceUnit::Miles => 1609.344,
            DistanceUnit::Kilometers => 1000.0,
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            DistanceUnit::Miles => "mi",
            DistanceUnit::Kilometers => "km",
        }
    }
}

impl std::fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistanceUnit::Miles => write!(f, "miles"),
            DistanceUnit::Kilometers => write!(f, "kilometers"),
        }
    }
}

impl std::str::FromStr for DistanceUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mi" | "mile" | "miles" => Ok(DistanceUnit::Miles),
            "km" | "kilometer" | "kilometers" | "kilometres" => Ok(DistanceUnit::Kilometers),
            _ => Err(anyhow::anyhow!("Invalid distance unit: {}", s)),
        }
    }
}

/// A completed run as stored by the run-log collaborator.
///
/// `date` stays the raw string the store returned; parsing happens at use
/// sites so a single bad record only drops out of the statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunLogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub date: String,
    pub distance: f64,
    #[serde(default, alias = "unit")]
    pub distance_unit: DistanceUnit,
    #[serde(default)]
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<Pace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl RunLogEntry {
    pub fn new(date: NaiveDate, distance: f64, distance_unit: DistanceUnit, duration: String) -> Self {
        Self {
            id: None,
            user_id: None,
            name: None,
            date: date.format("%Y-%m-%d").to_string(),
            distance,
            distance_unit,
            duration,
            pace: None,
            created_at: None,
        }
    }

    /// Distance normalised to miles
    pub fn distance_miles(&self) -> f64 {
        if self.distance.is_finite() {
            self.distance_unit.to_miles(self.distance)
        } else {
            0.0
        }
    }

    /// Wall-clock time of the run in the given zone, if the date parses
    pub fn local_timestamp<Tz: TimeZone>(&self, tz: &Tz) -> Option<NaiveDateTime> {
        parse_run_timestamp(&self.date, tz)
    }

    /// Calendar day of the run in UTC, if the date parses
    pub fn utc_date(&self) -> Option<NaiveDate> {
        self.local_timestamp(&Utc).map(|ts| ts.date())
    }
}

/// Parse a run date into local wall-clock time.
///
/// Offsets in RFC 3339 timestamps are converted into `tz`; naive timestamps
/// and bare dates are taken as already local.
pub fn parse_run_timestamp<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(tz).naive_local());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}
