//! Persistence implementations
//!
//! File-backed implementations of the domain repository traits. Each
//! repository guards its store with a `Mutex` for threads of this process
//! and the store's file lock for other processes. Every trait method takes
//! both, reloads the file, and does its read-check-write before releasing.

mod file_driver_account_repo;
mod file_ledger_repo;
mod file_lpo_repo;
mod file_station_repo;

use std::sync::{Mutex, MutexGuard};

pub use file_driver_account_repo::FileDriverAccountRepository;
pub use file_ledger_repo::FileLedgerRepository;
pub use file_lpo_repo::FileLpoRepository;
pub use file_station_repo::FileStationRepository;

/// A poisoned lock still guards consistent data: stores only change
/// through `put`, which rolls back on failure.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
