//! Per-station defaults maintained by admins

use chrono::{DateTime, Utc};
use fuelops_types::Direction;
use serde::{Deserialize, Serialize};

use super::checkpoint::LedgerField;

/// Defaults a station applies for one direction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectionDefaults {
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub liters: Option<f64>,
    /// Allocation formula, validated but never evaluated here
    #[serde(default)]
    pub formula: Option<String>,
    /// Target column for stations outside the built-in table
    #[serde(default)]
    pub custom_field: Option<LedgerField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationConfig {
    pub name: String,
    #[serde(default)]
    pub going: DirectionDefaults,
    #[serde(default)]
    pub returning: DirectionDefaults,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl StationConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_uppercase(),
            going: DirectionDefaults::default(),
            returning: DirectionDefaults::default(),
            active: true,
            updated_at: None,
        }
    }

    pub fn defaults(&self, direction: Direction) -> &DirectionDefaults {
        match direction {
            Direction::Going => &self.going,
            Direction::Returning => &self.returning,
        }
    }

    pub fn defaults_mut(&mut self, direction: Direction) -> &mut DirectionDefaults {
        match direction {
            Direction::Going => &mut self.going,
            Direction::Returning => &mut self.returning,
        }
    }
}
