//! Station name to checkpoint resolution
//!
//! Resolution is total: any string in either direction yields a checkpoint.
//! Lookup order is custom station mappings, the built-in exact table, the
//! CASH default, substring heuristics, then the direction's fallback.

use std::collections::HashMap;

use fuelops_types::{Direction, Error, Result};
use serde::Serialize;
use tracing::{debug, warn};

use crate::model::{Checkpoint, LedgerField, StationConfig};

/// Station name used for cash purchases outside any contracted station
pub const CASH_STATION: &str = "CASH";

const GOING_STATIONS: &[(&str, Checkpoint)] = &[
    ("MMSA YARD", Checkpoint::MmsaYard),
    ("MOMBASA YARD", Checkpoint::MmsaYard),
    ("TANGA YARD", Checkpoint::TangaYard),
    ("DAR YARD", Checkpoint::DarYard),
    ("GBP DAR", Checkpoint::DarGoing),
    ("GBP MOROGORO", Checkpoint::MoroGoing),
    ("INFINITY", Checkpoint::MbeyaGoing),
    ("LAKE TUNDUMA", Checkpoint::TdmGoing),
    ("LAKE NDOLA", Checkpoint::ZambiaGoing),
    ("LAKE KAPIRI", Checkpoint::ZambiaGoing),
    ("LAKE CHILABOMBWE", Checkpoint::ZambiaGoing),
    ("LAKE KITWE", Checkpoint::ZambiaGoing),
    ("LAKE LUBUMBASHI", Checkpoint::CongoGoing),
    ("LAKE LIKASI", Checkpoint::CongoGoing),
    ("LAKE KOLWEZI", Checkpoint::CongoGoing),
];

// Ndola and Kapiri are left to the heuristics so they land on their sub-stops.
const RETURNING_STATIONS: &[(&str, Checkpoint)] = &[
    ("LAKE CHILABOMBWE", Checkpoint::ZambiaReturn),
    ("LAKE KITWE", Checkpoint::ZambiaReturn),
    ("LAKE TUNDUMA", Checkpoint::TdmReturn),
    ("INFINITY", Checkpoint::MbeyaReturn),
    ("GBP MOROGORO", Checkpoint::MoroReturn),
    ("GBP DAR", Checkpoint::DarReturn),
    ("GBP TANGA", Checkpoint::TangaReturn),
    ("GBP KANGE", Checkpoint::TangaReturn),
];

const ZAMBIA_TOWNS: &[&str] = &["NDOLA", "KAPIRI", "KITWE", "CHILABOMBWE", "ZAMBIA"];
const CONGO_TOWNS: &[&str] = &["LUBUMBASHI", "LIKASI", "KOLWEZI", "CONGO", "DRC"];

/// How a checkpoint was found
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Custom,
    Exact,
    CashDefault,
    Heuristic,
    Fallback,
}

impl ResolutionSource {
    /// Anything other than a table hit is worth a second look
    pub fn is_degraded(self) -> bool {
        matches!(self, ResolutionSource::Heuristic | ResolutionSource::Fallback)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub checkpoint: Checkpoint,
    pub source: ResolutionSource,
}

/// A ledger column offered to admins when mapping a custom station
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LedgerColumn {
    pub field: LedgerField,
    pub label: &'static str,
}

#[derive(Debug, Clone, Default)]
struct DirectionTable {
    exact: HashMap<String, Checkpoint>,
    custom: HashMap<String, Checkpoint>,
}

impl DirectionTable {
    fn from_pairs(pairs: &[(&str, Checkpoint)]) -> Self {
        Self {
            exact: pairs
                .iter()
                .map(|(name, checkpoint)| (name.to_string(), *checkpoint))
                .collect(),
            custom: HashMap::new(),
        }
    }
}

/// Read-only station registry, built once and passed by reference
#[derive(Debug, Clone)]
pub struct CheckpointCatalog {
    going: DirectionTable,
    returning: DirectionTable,
}

impl Default for CheckpointCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CheckpointCatalog {
    pub fn builtin() -> Self {
        Self {
            going: DirectionTable::from_pairs(GOING_STATIONS),
            returning: DirectionTable::from_pairs(RETURNING_STATIONS),
        }
    }

    /// Add the custom field mappings of every active station
    pub fn with_custom_stations(mut self, stations: &[StationConfig]) -> Result<Self> {
        for station in stations.iter().filter(|s| s.active) {
            for direction in Direction::ALL {
                if let Some(field) = station.defaults(direction).custom_field {
                    self = self.with_station(&station.name, direction, field)?;
                }
            }
        }
        Ok(self)
    }

    /// Map one station name to a field for one direction
    pub fn with_station(mut self, name: &str, direction: Direction, field: LedgerField) -> Result<Self> {
        let key = normalize_station(name);
        if key.is_empty() {
            return Err(Error::validation("station name is required"));
        }
        if field.direction() != direction {
            return Err(Error::validation(format!(
                "field {field} belongs to the {} direction, not {direction}",
                field.direction()
            )));
        }
        self.table_mut(direction)
            .custom
            .insert(key, field.canonical_checkpoint());
        Ok(self)
    }

    pub fn resolve(&self, station: &str, direction: Direction) -> Checkpoint {
        self.resolve_with_source(station, direction).checkpoint
    }

    pub fn resolve_with_source(&self, station: &str, direction: Direction) -> Resolution {
        let name = normalize_station(station);
        let table = self.table(direction);

        let resolution = if let Some(checkpoint) = table.custom.get(&name) {
            Resolution {
                checkpoint: *checkpoint,
                source: ResolutionSource::Custom,
            }
        } else if let Some(checkpoint) = table.exact.get(&name) {
            Resolution {
                checkpoint: *checkpoint,
                source: ResolutionSource::Exact,
            }
        } else if name == CASH_STATION {
            Resolution {
                checkpoint: Self::default_for(direction),
                source: ResolutionSource::CashDefault,
            }
        } else if let Some(checkpoint) = heuristic(&name, direction) {
            Resolution {
                checkpoint,
                source: ResolutionSource::Heuristic,
            }
        } else {
            Resolution {
                checkpoint: Self::default_for(direction),
                source: ResolutionSource::Fallback,
            }
        };

        if resolution.source.is_degraded() {
            warn!(
                station = %name,
                %direction,
                checkpoint = resolution.checkpoint.code(),
                source = ?resolution.source,
                "station resolved without a table match"
            );
        } else {
            debug!(station = %name, %direction, checkpoint = resolution.checkpoint.code(), "station resolved");
        }
        resolution
    }

    pub fn field_for(checkpoint: Checkpoint) -> LedgerField {
        checkpoint.field()
    }

    /// Ledger columns of one direction, in route order
    pub fn columns_for(direction: Direction) -> Vec<LedgerColumn> {
        LedgerField::ALL
            .into_iter()
            .filter(|field| field.direction() == direction)
            .map(|field| LedgerColumn {
                field,
                label: field.label(),
            })
            .collect()
    }

    /// The Zambia checkpoint of the direction.
    ///
    /// CASH and unmatched station names both land here on purpose: cash
    /// diversions are bought in Zambia, and a station nobody has configured
    /// is treated the same way until it is saved with its own mapping.
    pub fn default_for(direction: Direction) -> Checkpoint {
        match direction {
            Direction::Going => Checkpoint::ZambiaGoing,
            Direction::Returning => Checkpoint::ZambiaReturn,
        }
    }

    fn table(&self, direction: Direction) -> &DirectionTable {
        match direction {
            Direction::Going => &self.going,
            Direction::Returning => &self.returning,
        }
    }

    fn table_mut(&mut self, direction: Direction) -> &mut DirectionTable {
        match direction {
            Direction::Going => &mut self.going,
            Direction::Returning => &mut self.returning,
        }
    }
}

/// Trim, uppercase and collapse internal whitespace
pub fn normalize_station(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

fn heuristic(name: &str, direction: Direction) -> Option<Checkpoint> {
    let has = |fragment: &str| name.contains(fragment);
    let any = |fragments: &[&str]| fragments.iter().any(|f| name.contains(f));

    match direction {
        Direction::Returning => {
            if has("NDOLA") {
                return Some(Checkpoint::ZambiaNdola);
            }
            if has("KAPIRI") {
                return Some(Checkpoint::ZambiaKapiri);
            }
            if any(ZAMBIA_TOWNS) {
                return Some(Checkpoint::ZambiaReturn);
            }
        }
        Direction::Going => {
            if any(ZAMBIA_TOWNS) {
                return Some(Checkpoint::ZambiaGoing);
            }
            if any(CONGO_TOWNS) {
                return Some(Checkpoint::CongoGoing);
            }
        }
    }

    let going = direction == Direction::Going;
    if any(&["INFINITY", "MBEYA"]) {
        return Some(if going { Checkpoint::MbeyaGoing } else { Checkpoint::MbeyaReturn });
    }
    if any(&["GBP", "GPB"]) && has("MORO") {
        return Some(if going { Checkpoint::MoroGoing } else { Checkpoint::MoroReturn });
    }
    if any(&["TUNDUMA", "TDM"]) {
        return Some(if going { Checkpoint::TdmGoing } else { Checkpoint::TdmReturn });
    }
    if going && has("DAR") && has("YARD") {
        return Some(Checkpoint::DarYard);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cash_uses_the_direction_default() {
        let catalog = CheckpointCatalog::builtin();
        assert_eq!(catalog.resolve("cash", Direction::Going), Checkpoint::ZambiaGoing);
        assert_eq!(catalog.resolve(" CASH ", Direction::Returning), Checkpoint::ZambiaReturn);
        assert_eq!(
            catalog.resolve_with_source("Cash", Direction::Going).source,
            ResolutionSource::CashDefault
        );
    }

    #[test]
    fn lake_kapiri_returning_lands_on_zambia_return_field() {
        let catalog = CheckpointCatalog::builtin();
        let checkpoint = catalog.resolve("LAKE KAPIRI", Direction::Returning);
        assert_eq!(checkpoint, Checkpoint::ZambiaKapiri);
        assert_eq!(checkpoint.direction(), Direction::Returning);
        assert_eq!(CheckpointCatalog::field_for(checkpoint), LedgerField::ZambiaReturn);

        assert_eq!(catalog.resolve("lake   ndola", Direction::Returning), Checkpoint::ZambiaNdola);
        assert_eq!(catalog.resolve("LAKE KAPIRI", Direction::Going), Checkpoint::ZambiaGoing);
    }

    #[test]
    fn exact_table_matches_after_normalization() {
        let catalog = CheckpointCatalog::builtin();
        let resolution = catalog.resolve_with_source("  gbp   morogoro ", Direction::Going);
        assert_eq!(resolution.checkpoint, Checkpoint::MoroGoing);
        assert_eq!(resolution.source, ResolutionSource::Exact);
        assert_eq!(catalog.resolve("GBP KANGE", Direction::Returning), Checkpoint::TangaReturn);
        assert_eq!(catalog.resolve("LAKE LIKASI", Direction::Going), Checkpoint::CongoGoing);
    }

    #[test]
    fn unknown_stations_share_the_cash_checkpoint() {
        let catalog = CheckpointCatalog::builtin();
        for direction in Direction::ALL {
            let cash = catalog.resolve_with_source("CASH", direction);
            let unknown = catalog.resolve_with_source("NOWHERE FUEL", direction);
            assert_eq!(cash.checkpoint, unknown.checkpoint);
            assert_eq!(unknown.checkpoint, CheckpointCatalog::default_for(direction));
            assert_eq!(cash.source, ResolutionSource::CashDefault);
            assert_eq!(unknown.source, ResolutionSource::Fallback);
        }
    }

    #[test]
    fn heuristics_cover_partial_names() {
        let catalog = CheckpointCatalog::builtin();
        assert_eq!(catalog.resolve("Mbeya Total", Direction::Returning), Checkpoint::MbeyaReturn);
        assert_eq!(catalog.resolve("GPB moro station", Direction::Going), Checkpoint::MoroGoing);
        assert_eq!(catalog.resolve("TDM border", Direction::Going), Checkpoint::TdmGoing);
        assert_eq!(catalog.resolve("Kolwezi depot", Direction::Going), Checkpoint::CongoGoing);
        assert_eq!(catalog.resolve("Kitwe Puma", Direction::Returning), Checkpoint::ZambiaReturn);
        assert_eq!(catalog.resolve("dar port yard", Direction::Going), Checkpoint::DarYard);
    }

    #[test]
    fn resolution_is_total_and_direction_consistent() {
        let catalog = CheckpointCatalog::builtin();
        for name in ["", "   ", "???", "LAKE", "MORO", "DRC", "Ünïcode ☃", "GBP DAR"] {
            for direction in Direction::ALL {
                let checkpoint = catalog.resolve(name, direction);
                assert_eq!(checkpoint.direction(), direction, "{name:?} {direction}");
            }
        }
        assert_eq!(
            catalog.resolve_with_source("nowhere", Direction::Going).source,
            ResolutionSource::Fallback
        );
    }

    #[test]
    fn custom_stations_take_precedence() {
        let mut station = StationConfig::new("lake kitwe");
        station.going.custom_field = Some(LedgerField::TdmGoing);
        let mut inactive = StationConfig::new("GBP DAR");
        inactive.going.custom_field = Some(LedgerField::MbeyaGoing);
        inactive.active = false;

        let catalog = CheckpointCatalog::builtin()
            .with_custom_stations(&[station, inactive])
            .unwrap();
        let resolution = catalog.resolve_with_source("LAKE KITWE", Direction::Going);
        assert_eq!(resolution.checkpoint, Checkpoint::TdmGoing);
        assert_eq!(resolution.source, ResolutionSource::Custom);
        assert_eq!(catalog.resolve("LAKE KITWE", Direction::Returning), Checkpoint::ZambiaReturn);
        assert_eq!(catalog.resolve("GBP DAR", Direction::Going), Checkpoint::DarGoing);
    }

    #[test]
    fn custom_field_of_the_wrong_direction_is_rejected() {
        let mut station = StationConfig::new("NEW STOP");
        station.returning.custom_field = Some(LedgerField::DarGoing);
        let err = CheckpointCatalog::builtin()
            .with_custom_stations(&[station])
            .unwrap_err();
        assert_eq!(err.kind(), fuelops_types::ErrorKind::Validation);
    }

    #[test]
    fn columns_follow_route_order() {
        let going: Vec<_> = CheckpointCatalog::columns_for(Direction::Going)
            .into_iter()
            .map(|c| c.field)
            .collect();
        assert_eq!(going.first(), Some(&LedgerField::MmsaYard));
        assert_eq!(going.last(), Some(&LedgerField::CongoFuel));
        assert_eq!(going.len(), 9);

        let returning = CheckpointCatalog::columns_for(Direction::Returning);
        assert_eq!(returning.len(), 6);
        assert_eq!(returning[0].label, "Zambia Return");
    }
}
