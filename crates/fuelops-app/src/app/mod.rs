//! Application use cases

pub mod fuel_service;
pub mod station_service;

pub use fuel_service::{Allocation, Diversion, FuelService, IssueOutcome, IssueRequest, JourneyRef};
pub use station_service::{FormulaCheck, SavedStation, StationService, StationUpdate};
