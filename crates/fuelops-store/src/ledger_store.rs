//! Ledger records, keyed by record id

use std::path::Path;

use fuelops_domain::FuelLedgerRecord;
use fuelops_types::Result;

use crate::collection::{Collection, Keyed};
use crate::file_lock::StoreLock;

impl Keyed for FuelLedgerRecord {
    fn key(&self) -> String {
        self.id.clone()
    }
}

/// Persistent store for fuel ledger records (`ledger.json`)
pub struct LedgerStore {
    records: Collection<FuelLedgerRecord>,
}

impl LedgerStore {
    pub fn open(store_dir: &Path) -> Result<Self> {
        Ok(Self {
            records: Collection::open(store_dir, "ledger.json")?,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            records: Collection::in_memory(),
        }
    }

    /// Lock the store file and reload it; see [`Collection::sync`]
    pub fn sync(&mut self) -> Result<StoreLock> {
        self.records.sync()
    }

    pub fn get(&self, id: &str) -> Option<&FuelLedgerRecord> {
        self.records.get(id)
    }

    pub fn put(&mut self, record: FuelLedgerRecord) -> Result<()> {
        self.records.upsert(record)
    }

    /// The OPEN record of a truck, if any
    pub fn open_for_truck(&self, truck_no: &str) -> Option<&FuelLedgerRecord> {
        self.records
            .values()
            .find(|r| r.truck_no == truck_no && r.is_open())
    }

    /// Non-deleted records of a truck, newest first
    pub fn by_truck(&self, truck_no: &str) -> Vec<&FuelLedgerRecord> {
        let mut records: Vec<_> = self
            .records
            .values()
            .filter(|r| r.truck_no == truck_no && !r.is_deleted())
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        records
    }

    /// Most recent non-deleted record carrying `order_ref`
    pub fn by_order_ref(&self, order_ref: &str) -> Option<&FuelLedgerRecord> {
        self.records
            .values()
            .filter(|r| !r.is_deleted() && r.matches_order_ref(order_ref))
            .max_by(|a, b| a.created_at.cmp(&b.created_at))
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }
}
