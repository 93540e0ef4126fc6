use serde::{Deserialize, Serialize};

/// Standard road race distances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaceDistance {
    #[serde(rename = "5k")]
    FiveK,
    #[serde(rename = "10k")]
    TenK,
    Half,
    Marathon,
}

// Upper bounds (miles, inclusive) for classifying a distance
const FIVE_K_MAX_MILES: f64 = 3.2;
const TEN_K_MAX_MILES: f64 = 6.5;
const HALF_MAX_MILES: f64 = 13.2;

impl RaceDistance {
    /// Classify a distance in miles into the nearest race category
    pub fn classify(miles: f64) -> Self {
        if miles <= FIVE_K_MAX_MILES {
            RaceDistance::FiveK
        } else if miles <= TEN_K_MAX_MILES {
            RaceDistance::TenK
        } else if miles <= HALF_MAX_MILES {
            RaceDistance::Half
        } else {
            RaceDistance::Marathon
        }
    }

    pub fn meters(self) -> f64 {
        match self {
            RaceDistance::FiveK => 5_000.0,
            RaceDistance::TenK => 10_000.0,
            RaceDistance::Half => 21_097.5,
            RaceDistance::Marathon => 42_195.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RaceDistance::FiveK => "5K",
            RaceDistance::TenK => "10K",
            RaceDistance::Half => "Half Marathon",
            RaceDistance::Marathon => "Marathon",
        }
    }
}

impl std::fmt::Display for RaceDistance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for RaceDistance {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "5k" => Ok(RaceDistance::FiveK),
            "10k" => Ok(RaceDistance::TenK),
            "half" | "half marathon" | "half-marathon" => Ok(RaceDistance::Half),
            "marathon" | "full" => Ok(RaceDistance::Marathon),
            _ => Err(anyhow::anyhow!("Invalid race distance: {}", s)),
        }
    }
}
