//! Training pace zones from a VDOT fitness score.
//!
//! Uses Jack Daniels' oxygen-cost curve,
//! `VO2 = -4.60 + 0.182258·v + 0.000104·v²` (v in meters per minute).
//! Each zone runs at a fixed fraction of VO2max; solving the curve for that
//! oxygen cost gives the zone's velocity. The Marathon zone uses the race
//! fraction of the target distance, so it doubles as goal race pace.

use serde::Serialize;

use crate::config::EngineConfig;
use crate::models::pace::format_pace;
use crate::models::{DistanceUnit, PaceZone, RaceDistance, MILES_PER_KILOMETER};

/// Lowest supported fitness score; lower inputs are clamped up
pub const MIN_VDOT: f64 = 20.0;

/// Highest supported fitness score; higher inputs are clamped down
pub const MAX_VDOT: f64 = 85.0;

/// Minimum spacing between adjacent zones, in seconds per mile
pub const MIN_ZONE_GAP_SECS_PER_MILE: u32 = 10;

const DANIELS_A: f64 = 0.000_104;
const DANIELS_B: f64 = 0.182_258;
const DANIELS_C: f64 = -4.60;

// Fractions of VO2max for the fixed zones
const EASY_FRACTION: f64 = 0.70;
const THRESHOLD_FRACTION: f64 = 0.88;
const INTERVAL_FRACTION: f64 = 0.975;
const REPETITION_FRACTION: f64 = 1.05;

/// Pace for one zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZonePace {
    pub zone: PaceZone,
    pub seconds_per_unit: u32,
    pub pace: String,
}

/// All five zones for one fitness score, fastest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaceTable {
    pub vdot: f64,
    pub target_distance_meters: f64,
    pub unit: DistanceUnit,
    pub zones: [ZonePace; 5],
}

impl PaceTable {
    pub fn get(&self, zone: PaceZone) -> &ZonePace {
        &self.zones[fastest_first_index(zone)]
    }

    pub fn seconds(&self, zone: PaceZone) -> u32 {
        self.get(zone).seconds_per_unit
    }

    pub fn pace(&self, zone: PaceZone) -> &str {
        &self.get(zone).pace
    }
}

#[derive(Debug, Clone)]
pub struct PaceZoneCalculator {
    min_zone_gap_secs_per_mile: u32,
}

impl Default for PaceZoneCalculator {
    fn default() -> Self {
        Self::new(MIN_ZONE_GAP_SECS_PER_MILE)
    }
}

impl PaceZoneCalculator {
    pub fn new(min_zone_gap_secs_per_mile: u32) -> Self {
        Self {
            min_zone_gap_secs_per_mile: min_zone_gap_secs_per_mile.max(1),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.min_zone_gap_secs_per_mile)
    }

    /// Pace string (`M:SS` per `unit`) for one zone
    pub fn pace(&self, target_distance_meters: f64, vdot: f64, zone: PaceZone, unit: DistanceUnit) -> String {
        self.pace_table(target_distance_meters, vdot, unit)
            .pace(zone)
            .to_string()
    }

    pub fn pace_seconds(&self, target_distance_meters: f64, vdot: f64, zone: PaceZone, unit: DistanceUnit) -> u32 {
        self.pace_table(target_distance_meters, vdot, unit).seconds(zone)
    }

    /// Compute every zone at once.
    ///
    /// Zones are built fastest first and each one is held at least the
    /// minimum gap slower than the zone before it, so the table is strictly
    /// ordered R < I < T < M < E even where the curve alone would not be.
    pub fn pace_table(&self, target_distance_meters: f64, vdot: f64, unit: DistanceUnit) -> PaceTable {
        let vdot = clamp_vdot(vdot);
        let target = sanitize_distance(target_distance_meters);
        let gap = self.gap_for_unit(unit);

        let mut previous: Option<u32> = None;
        let zones = PaceZone::FASTEST_FIRST.map(|zone| {
            let velocity = velocity_for_vo2(vdot * zone_fraction(zone, target));
            let mut seconds = (unit.meters() / velocity * 60.0).round() as u32;

            if let Some(prev) = previous {
                if seconds < prev.saturating_add(gap) {
                    tracing::debug!(
                        "Zone {} pace {}s/{} held {}s behind {}s",
                        zone,
                        seconds,
                        unit.short_label(),
                        gap,
                        prev
                    );
                    seconds = prev.saturating_add(gap);
                }
            }
            previous = Some(seconds);

            ZonePace {
                zone,
                seconds_per_unit: seconds,
                pace: format_pace(seconds),
            }
        });

        PaceTable {
            vdot,
            target_distance_meters: target,
            unit,
            zones,
        }
    }

    fn gap_for_unit(&self, unit: DistanceUnit) -> u32 {
        match unit {
            DistanceUnit::Miles => self.min_zone_gap_secs_per_mile,
            DistanceUnit::Kilometers => {
                ((self.min_zone_gap_secs_per_mile as f64 * MILES_PER_KILOMETER).round() as u32).max(1)
            }
        }
    }
}

/// Pace for one zone with the default zone gap
pub fn calculate_pace(target_distance_meters: f64, vdot: f64, zone: PaceZone, unit: DistanceUnit) -> String {
    PaceZoneCalculator::default().pace(target_distance_meters, vdot, zone, unit)
}

/// Predicted finishing time in seconds for a race distance
pub fn predict_race_time(vdot: f64, distance_meters: f64) -> u32 {
    let vdot = clamp_vdot(vdot);
    let distance = sanitize_distance(distance_meters);
    let velocity = velocity_for_vo2(vdot * race_fraction(distance));
    (distance / velocity * 60.0).round() as u32
}

/// Velocity (m/min) whose oxygen cost equals `vo2`
fn velocity_for_vo2(vo2: f64) -> f64 {
    // Positive root of A·v² + B·v + (C - vo2) = 0
    let discriminant = DANIELS_B.mul_add(DANIELS_B, -4.0 * DANIELS_A * (DANIELS_C - vo2));
    (-DANIELS_B + discriminant.sqrt()) / (2.0 * DANIELS_A)
}

fn zone_fraction(zone: PaceZone, target_distance_meters: f64) -> f64 {
    match zone {
        PaceZone::E => EASY_FRACTION,
        PaceZone::M => race_fraction(target_distance_meters),
        PaceZone::T => THRESHOLD_FRACTION,
        PaceZone::I => INTERVAL_FRACTION,
        PaceZone::R => REPETITION_FRACTION,
    }
}

/// Share of VO2max sustainable over a race distance
fn race_fraction(distance_meters: f64) -> f64 {
    if distance_meters <= RaceDistance::FiveK.meters() {
        0.975
    } else if distance_meters <= RaceDistance::TenK.meters() {
        0.92
    } else if distance_meters <= RaceDistance::Half.meters() {
        0.85
    } else if distance_meters <= RaceDistance::Marathon.meters() {
        0.81
    } else {
        0.75
    }
}

fn clamp_vdot(vdot: f64) -> f64 {
    if !vdot.is_finite() {
        tracing::warn!("Non-finite fitness score, using {}", MIN_VDOT);
        return MIN_VDOT;
    }
    if !(MIN_VDOT..=MAX_VDOT).contains(&vdot) {
        tracing::warn!("Fitness score {:.1} outside {}-{}, clamping", vdot, MIN_VDOT, MAX_VDOT);
    }
    vdot.clamp(MIN_VDOT, MAX_VDOT)
}

fn sanitize_distance(distance_meters: f64) -> f64 {
    if distance_meters.is_finite() && distance_meters > 0.0 {
        distance_meters
    } else {
        tracing::warn!("Invalid target distance {}, using marathon", distance_meters);
        RaceDistance::Marathon.meters()
    }
}

fn fastest_first_index(zone: PaceZone) -> usize {
    match zone {
        PaceZone::R => 0,
        PaceZone::I => 1,
        PaceZone::T => 2,
        PaceZone::M => 3,
        PaceZone::E => 4,
    }
}
