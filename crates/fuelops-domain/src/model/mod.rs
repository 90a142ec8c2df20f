//! Domain model types

pub mod checkpoint;
pub mod driver_account;
pub mod ledger_record;
pub mod lpo;
pub mod station;

pub use checkpoint::{Checkpoint, LedgerField};
pub use driver_account::{DriverAccountEntry, DriverAccountStatus, PaymentMode};
pub use ledger_record::{normalize_truck_no, FuelLedgerRecord, JourneyMeta};
pub use lpo::{CancellationInfo, EntryState, LpoDocument, LpoEntry, Posting};
pub use station::{DirectionDefaults, StationConfig};
