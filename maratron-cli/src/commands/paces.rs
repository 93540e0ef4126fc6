use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use maratron::models::pace::format_duration;
use maratron::models::{DistanceUnit, PaceZone, RaceDistance};
use maratron::services::{predict_race_time, PaceZoneCalculator};

use crate::config::Config;

#[derive(Args)]
pub struct PacesCommand {
    /// Fitness score (defaults to profile.vdot)
    #[arg(long)]
    vdot: Option<f64>,

    /// Target race: 5k, 10k, half, marathon, or a distance in meters
    #[arg(short, long)]
    distance: Option<String>,

    /// Pace unit: mi or km
    #[arg(short, long)]
    unit: Option<String>,
}

impl PacesCommand {
    pub fn execute(self, config: &Config) -> Result<()> {
        let vdot = self.vdot.unwrap_or(config.profile.vdot);
        let unit: DistanceUnit = match &self.unit {
            Some(raw) => raw.parse()?,
            None => config.default_unit()?,
        };
        let (meters, label) = match &self.distance {
            Some(raw) => parse_target(raw)?,
            None => {
                let race = config.race_distance()?;
                (race.meters(), race.label().to_string())
            }
        };

        let calculator = PaceZoneCalculator::from_config(&config.engine_config()?);
        let table = calculator.pace_table(meters, vdot, unit);

        println!("Training Paces (VDOT {:.1}, {} target)", table.vdot, label);
        println!("────────────────────────────────");
        for zone in PaceZone::FASTEST_FIRST.iter().rev() {
            let pace = table.get(*zone);
            println!(
                "  {}  {:<11} {:>6} /{}",
                zone.to_string().bold(),
                zone.name(),
                pace.pace,
                unit.short_label()
            );
        }

        println!();
        println!("Race Predictions");
        println!("────────────────────────────────");
        for race in [
            RaceDistance::FiveK,
            RaceDistance::TenK,
            RaceDistance::Half,
            RaceDistance::Marathon,
        ] {
            let seconds = predict_race_time(table.vdot, race.meters());
            println!("  {:<14} {:>8}", race.label(), format_duration(seconds));
        }

        Ok(())
    }
}

/// A race name or a positive distance in meters
fn parse_target(raw: &str) -> Result<(f64, String)> {
    if let Ok(race) = raw.parse::<RaceDistance>() {
        return Ok((race.meters(), race.label().to_string()));
    }
    match raw.trim().parse::<f64>() {
        Ok(meters) if meters.is_finite() && meters > 0.0 => Ok((meters, format!("{:.0} m", meters))),
        _ => bail!("Invalid target distance: {} (use 5k, 10k, half, marathon or meters)", raw),
    }
}
