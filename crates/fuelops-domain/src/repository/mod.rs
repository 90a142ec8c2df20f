//! Repository trait definitions for data persistence
//!
//! Implementations must be safe to share across threads. Every method that
//! mutates a record or document performs its read-check-write under a single
//! lock acquisition, so callers never observe a partial update.

use chrono::{DateTime, Utc};
use fuelops_types::Result;

use crate::model::{
    DriverAccountEntry, FuelLedgerRecord, LedgerField, LpoDocument, LpoEntry, StationConfig,
};

/// Persistence for fuel ledger records
pub trait LedgerRepository: Send + Sync {
    /// Insert a new OPEN record.
    ///
    /// Fails with `Conflict` when the truck already has an OPEN record. The
    /// check and the insert are one atomic unit.
    fn create_open(&self, record: FuelLedgerRecord) -> Result<FuelLedgerRecord>;

    fn find_by_id(&self, id: &str) -> Result<Option<FuelLedgerRecord>>;

    /// All non-deleted records of a truck, newest first
    fn find_by_truck(&self, truck_no: &str) -> Result<Vec<FuelLedgerRecord>>;

    fn find_open_by_truck(&self, truck_no: &str) -> Result<Option<FuelLedgerRecord>>;

    /// Non-deleted record whose going or return order is `order_ref`
    fn find_by_order_ref(&self, order_ref: &str) -> Result<Option<FuelLedgerRecord>>;

    /// Debit `liters` on `field` and persist field and balance together
    fn apply_allocation(
        &self,
        id: &str,
        field: LedgerField,
        liters: f64,
        at: DateTime<Utc>,
    ) -> Result<FuelLedgerRecord>;

    fn add_extra(&self, id: &str, liters: f64, at: DateTime<Utc>) -> Result<FuelLedgerRecord>;

    fn attach_return(&self, id: &str, return_do: &str, at: DateTime<Utc>)
        -> Result<FuelLedgerRecord>;

    fn soft_delete(&self, id: &str, at: DateTime<Utc>) -> Result<FuelLedgerRecord>;

    /// Undo a soft delete; `Conflict` if the truck has opened another journey since
    fn restore(&self, id: &str, at: DateTime<Utc>) -> Result<FuelLedgerRecord>;
}

/// Persistence for LPO documents
pub trait LpoRepository: Send + Sync {
    fn find(&self, lpo_no: &str) -> Result<Option<LpoDocument>>;

    /// Insert or replace a whole document
    fn save(&self, lpo: &LpoDocument) -> Result<()>;

    fn list(&self) -> Result<Vec<LpoDocument>>;

    /// Hand the stored document, if any, to `change` and persist the
    /// document it returns, all under one lock.
    ///
    /// Nothing is written when `change` fails.
    fn modify(
        &self,
        lpo_no: &str,
        change: &mut dyn FnMut(Option<LpoDocument>) -> Result<LpoDocument>,
    ) -> Result<LpoDocument>;

    /// Apply `change` to one entry and persist the owning document.
    ///
    /// Nothing is written when `change` fails.
    fn update_entry(
        &self,
        lpo_no: &str,
        index: usize,
        change: &mut dyn FnMut(&mut LpoEntry) -> Result<()>,
    ) -> Result<LpoDocument>;
}

/// Persistence for driver's account entries
pub trait DriverAccountRepository: Send + Sync {
    fn save(&self, entry: &DriverAccountEntry) -> Result<()>;

    fn find(&self, id: &str) -> Result<Option<DriverAccountEntry>>;

    /// Entries, newest first, optionally limited to one truck
    fn list(&self, truck_no: Option<&str>) -> Result<Vec<DriverAccountEntry>>;

    fn update(
        &self,
        id: &str,
        change: &mut dyn FnMut(&mut DriverAccountEntry) -> Result<()>,
    ) -> Result<DriverAccountEntry>;
}

/// Persistence for station configuration
pub trait StationRepository: Send + Sync {
    fn upsert(&self, station: &StationConfig) -> Result<()>;

    fn find(&self, name: &str) -> Result<Option<StationConfig>>;

    /// All stations sorted by name
    fn list(&self) -> Result<Vec<StationConfig>>;
}
