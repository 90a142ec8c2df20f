//! Persistent JSON stores for the fuel ledger
//!
//! Each store owns one file under the data directory and rewrites it on
//! every change. `sync` takes a cross-process file lock and reloads the
//! file; `fuelops-infra` holds it, together with an in-process `Mutex`,
//! around every repository call.

mod collection;
mod driver_account_store;
mod file_lock;
mod ledger_store;
mod lpo_store;
mod station_store;

pub use collection::{Collection, Keyed};
pub use driver_account_store::DriverAccountStore;
pub use file_lock::StoreLock;
pub use ledger_store::LedgerStore;
pub use lpo_store::LpoStore;
pub use station_store::StationStore;
