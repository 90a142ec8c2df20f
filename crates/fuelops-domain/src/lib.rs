//! Fuel ledger domain: models, repository traits and the allocation engine
//!
//! Persistence is behind the traits in [`repository`]; implementations live
//! in `fuelops-infra`.

pub mod audit;
pub mod model;
pub mod repository;
pub mod service;

pub use audit::{AuditSink, LedgerEvent, MemoryAuditSink, NoopAuditSink};
pub use model::*;
pub use repository::{DriverAccountRepository, LedgerRepository, LpoRepository, StationRepository};
