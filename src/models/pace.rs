use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::run_log::DistanceUnit;

/// Placeholder shown when a pace cannot be derived
pub const PACE_UNAVAILABLE: &str = "N/A";

/// A pace as `M:SS` per unit, e.g. `{ "unit": "miles", "pace": "8:30" }`.
///
/// Payloads sometimes carry a bare `"8:30"` string instead of the object;
/// both forms deserialize, and the object form is always written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPace")]
pub struct Pace {
    pub unit: DistanceUnit,
    pub pace: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum RawPace {
    Structured {
        #[serde(default, alias = "distanceUnit")]
        unit: Option<DistanceUnit>,
        #[serde(alias = "value")]
        pace: String,
    },
    Bare(String),
}

impl RawPace {
    /// Resolve the pace, taking `fallback_unit` when the payload names none
    pub(crate) fn into_pace(self, fallback_unit: DistanceUnit) -> Pace {
        match self {
            RawPace::Structured { unit, pace } => Pace {
                unit: unit.unwrap_or(fallback_unit),
                pace,
            },
            RawPace::Bare(pace) => Pace {
                unit: fallback_unit,
                pace,
            },
        }
    }
}

impl From<RawPace> for Pace {
    fn from(raw: RawPace) -> Self {
        raw.into_pace(DistanceUnit::default())
    }
}

impl Pace {
    pub fn new(unit: DistanceUnit, pace: impl Into<String>) -> Self {
        Self {
            unit,
            pace: pace.into(),
        }
    }

    /// Seconds per unit, if the pace string is well formed
    pub fn seconds_per_unit(&self) -> Option<u32> {
        parse_clock(&self.pace)
    }

    /// Seconds per mile, converting from kilometers if needed
    pub fn seconds_per_mile(&self) -> Option<f64> {
        let secs = self.seconds_per_unit()? as f64;
        Some(match self.unit {
            DistanceUnit::Miles => secs,
            DistanceUnit::Kilometers => secs / crate::models::run_log::MILES_PER_KILOMETER,
        })
    }
}

impl std::fmt::Display for Pace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} /{}", self.pace, self.unit.short_label())
    }
}

/// Training intensity, from slowest to fastest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PaceZone {
    /// Easy
    E,
    /// Marathon / goal race
    M,
    /// Threshold (tempo)
    T,
    /// Interval
    I,
    /// Repetition
    R,
}

impl PaceZone {
    /// Fastest first
    pub const FASTEST_FIRST: [PaceZone; 5] =
        [PaceZone::R, PaceZone::I, PaceZone::T, PaceZone::M, PaceZone::E];

    pub fn name(self) -> &'static str {
        match self {
            PaceZone::E => "Easy",
            PaceZone::M => "Marathon",
            PaceZone::T => "Threshold",
            PaceZone::I => "Interval",
            PaceZone::R => "Repetition",
        }
    }
}

impl std::fmt::Display for PaceZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            PaceZone::E => "E",
            PaceZone::M => "M",
            PaceZone::T => "T",
            PaceZone::I => "I",
            PaceZone::R => "R",
        };
        write!(f, "{}", tag)
    }
}

impl std::str::FromStr for PaceZone {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "e" | "easy" => Ok(PaceZone::E),
            "m" | "marathon" => Ok(PaceZone::M),
            "t" | "threshold" | "tempo" => Ok(PaceZone::T),
            "i" | "interval" => Ok(PaceZone::I),
            "r" | "repetition" | "rep" => Ok(PaceZone::R),
            _ => Err(anyhow::anyhow!("Invalid pace zone: {}", s)),
        }
    }
}

fn clock_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:(\d{1,3}):)?(\d{1,2}):(\d{2})$").expect("clock pattern is valid")
    })
}

/// Parse `MM:SS` or `HH:MM:SS` into seconds.
///
/// Minutes and seconds above 59 are rejected when an hour field is present;
/// a bare `MM:SS` may carry any minute count.
pub fn parse_clock(raw: &str) -> Option<u32> {
    let caps = clock_pattern().captures(raw.trim())?;
    let seconds: u32 = caps.get(3)?.as_str().parse().ok()?;
    let minutes: u32 = caps.get(2)?.as_str().parse().ok()?;
    if seconds > 59 {
        return None;
    }

    match caps.get(1) {
        Some(hours) => {
            if minutes > 59 {
                return None;
            }
            let hours: u32 = hours.as_str().parse().ok()?;
            Some(hours * 3600 + minutes * 60 + seconds)
        }
        None => Some(minutes * 60 + seconds),
    }
}

/// Format seconds per unit as `M:SS`
pub fn format_pace(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Format a duration as `H:MM:SS`, or `M:SS` under an hour
pub fn format_duration(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("8:30"), Some(510));
        assert_eq!(parse_clock("45:00"), Some(2700));
        assert_eq!(parse_clock("1:05:09"), Some(3909));
        assert_eq!(parse_clock("75:10"), Some(4510));
        assert_eq!(parse_clock("8:75"), None);
        assert_eq!(parse_clock("1:75:00"), None);
        assert_eq!(parse_clock("abc"), None);
        assert_eq!(parse_clock(""), None);
        assert_eq!(parse_clock("8"), None);
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_pace(510), "8:30");
        assert_eq!(format_pace(65), "1:05");
        assert_eq!(format_duration(3909), "1:05:09");
        assert_eq!(format_duration(1199), "19:59");
    }

    #[test]
    fn test_pace_accepts_bare_string() {
        let pace: Pace = serde_json::from_str("\"7:45\"").unwrap();
        assert_eq!(pace, Pace::new(DistanceUnit::Miles, "7:45"));

        let pace: Pace = serde_json::from_str(r#"{"unit":"km","pace":"4:50"}"#).unwrap();
        assert_eq!(pace.unit, DistanceUnit::Kilometers);
        assert_eq!(
            serde_json::to_string(&pace).unwrap(),
            r#"{"unit":"kilometers","pace":"4:50"}"#
        );
    }

    #[test]
    fn test_zone_parsing() {
        assert_eq!("tempo".parse::<PaceZone>().unwrap(), PaceZone::T);
        assert_eq!("R".parse::<PaceZone>().unwrap(), PaceZone::R);
        assert!("z5".parse::<PaceZone>().is_err());
    }
}
