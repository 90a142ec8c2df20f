//! Station Service - the configuration collaborator
//!
//! Validates admin input before it reaches the station store and builds the
//! checkpoint catalog from the stored custom mappings.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use fuelops_domain::service::{
    normalize_station, unknown_identifiers, validate_formula, CheckpointCatalog, FormulaValidation,
    LedgerColumn,
};
use fuelops_domain::{LedgerField, StationConfig, StationRepository};
use fuelops_infra::{load_stations, FileStationRepository};
use fuelops_types::{Direction, Error, Result};
use serde::Serialize;
use tracing::{info, warn};

/// Changes to one direction of a station; `None` leaves a value as is
#[derive(Debug, Clone, Default)]
pub struct StationUpdate {
    pub rate: Option<f64>,
    pub liters: Option<f64>,
    pub formula: Option<String>,
    pub custom_field: Option<LedgerField>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormulaCheck {
    #[serde(flatten)]
    pub validation: FormulaValidation,
    pub unknown_identifiers: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedStation {
    pub station: StationConfig,
    pub warnings: Vec<String>,
}

pub struct StationService {
    repo: Arc<dyn StationRepository>,
}

impl StationService {
    pub fn new(repo: Arc<dyn StationRepository>) -> Self {
        Self { repo }
    }

    pub fn open(data_dir: &Path) -> Result<Self> {
        Ok(Self::new(Arc::new(FileStationRepository::open(data_dir)?)))
    }

    /// Built-in catalog extended with every active custom mapping
    pub fn catalog(&self) -> Result<CheckpointCatalog> {
        CheckpointCatalog::builtin().with_custom_stations(&self.repo.list()?)
    }

    pub fn list(&self) -> Result<Vec<StationConfig>> {
        self.repo.list()
    }

    pub fn find(&self, name: &str) -> Result<Option<StationConfig>> {
        self.repo.find(&normalize_station(name))
    }

    pub fn columns(direction: Direction) -> Vec<LedgerColumn> {
        CheckpointCatalog::columns_for(direction)
    }

    pub fn check_formula(formula: &str) -> FormulaCheck {
        let validation = validate_formula(formula);
        let unknown_identifiers = if validation.valid {
            unknown_identifiers(formula)
        } else {
            Vec::new()
        };
        FormulaCheck {
            validation,
            unknown_identifiers,
        }
    }

    /// Apply `update` to one direction of a station, creating it if needed
    pub fn set(&self, name: &str, direction: Direction, update: StationUpdate) -> Result<SavedStation> {
        let name = normalize_station(name);
        let mut station = self
            .repo
            .find(&name)?
            .unwrap_or_else(|| StationConfig::new(name.as_str()));

        let defaults = station.defaults_mut(direction);
        if let Some(rate) = update.rate {
            defaults.rate = Some(rate);
        }
        if let Some(liters) = update.liters {
            defaults.liters = Some(liters);
        }
        if let Some(formula) = update.formula {
            let formula = formula.trim();
            defaults.formula = (!formula.is_empty()).then(|| formula.to_string());
        }
        if let Some(field) = update.custom_field {
            defaults.custom_field = Some(field);
        }
        if let Some(active) = update.active {
            station.active = active;
        }

        self.save(station)
    }

    /// Load stations from CSV and save each one; stops at the first invalid row
    pub fn import_csv(&self, path: &Path) -> Result<Vec<SavedStation>> {
        let stations = load_stations(path)?;
        let mut saved = Vec::with_capacity(stations.len());
        for station in stations {
            saved.push(self.save(station)?);
        }
        info!(count = saved.len(), path = %path.display(), "stations imported");
        Ok(saved)
    }

    fn save(&self, mut station: StationConfig) -> Result<SavedStation> {
        station.name = normalize_station(&station.name);
        if station.name.is_empty() {
            return Err(Error::validation("station name is required"));
        }
        let warnings = validate_station(&station)?;
        for warning in &warnings {
            warn!(station = %station.name, "{warning}");
        }
        station.updated_at = Some(Utc::now());
        self.repo.upsert(&station)?;
        info!(station = %station.name, active = station.active, "station saved");
        Ok(SavedStation { station, warnings })
    }
}

/// Reject invalid formulas, wrong-direction fields and bad numbers; return
/// warnings for formulas that use variables the evaluator does not supply.
fn validate_station(station: &StationConfig) -> Result<Vec<String>> {
    let mut warnings = Vec::new();
    for direction in Direction::ALL {
        let defaults = station.defaults(direction);

        for (what, value) in [("rate", defaults.rate), ("liters", defaults.liters)] {
            if let Some(value) = value {
                if !(value.is_finite() && value >= 0.0) {
                    return Err(Error::validation(format!(
                        "{} {direction} {what} must be a non-negative number, got {value}",
                        station.name
                    )));
                }
            }
        }

        if let Some(field) = defaults.custom_field {
            if field.direction() != direction {
                return Err(Error::validation(format!(
                    "{} {direction} cannot write to {field}, a {} column",
                    station.name,
                    field.direction()
                )));
            }
        }

        if let Some(formula) = &defaults.formula {
            let check = StationService::check_formula(formula);
            if let Some(error) = check.validation.error {
                return Err(Error::validation(format!(
                    "{} {direction} formula: {error}",
                    station.name
                )));
            }
            if !check.unknown_identifiers.is_empty() {
                warnings.push(format!(
                    "{direction} formula uses unknown variables: {}",
                    check.unknown_identifiers.join(", ")
                ));
            }
        }
    }
    Ok(warnings)
}
