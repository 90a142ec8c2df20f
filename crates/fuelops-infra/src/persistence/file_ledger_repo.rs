//! File-based implementation of LedgerRepository

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use fuelops_domain::{FuelLedgerRecord, LedgerField, LedgerRepository};
use fuelops_store::LedgerStore;
use fuelops_types::{Error, Result};

use super::lock;

pub struct FileLedgerRepository {
    store: Mutex<LedgerStore>,
}

impl FileLedgerRepository {
    pub fn open(store_dir: &Path) -> Result<Self> {
        Ok(Self::with_store(LedgerStore::open(store_dir)?))
    }

    pub fn in_memory() -> Self {
        Self::with_store(LedgerStore::in_memory())
    }

    pub fn with_store(store: LedgerStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// Apply `change` to a live record and persist it
    fn update(
        &self,
        id: &str,
        change: impl FnOnce(&mut FuelLedgerRecord) -> Result<()>,
    ) -> Result<FuelLedgerRecord> {
        let mut store = lock(&self.store);
        let _sync = store.sync()?;
        let mut record = store
            .get(id)
            .filter(|r| !r.is_deleted())
            .cloned()
            .ok_or_else(|| Error::not_found(format!("ledger record {id}")))?;
        change(&mut record)?;
        store.put(record.clone())?;
        Ok(record)
    }
}

impl LedgerRepository for FileLedgerRepository {
    fn create_open(&self, record: FuelLedgerRecord) -> Result<FuelLedgerRecord> {
        let mut store = lock(&self.store);
        let _sync = store.sync()?;
        if let Some(open) = store.open_for_truck(&record.truck_no) {
            return Err(Error::conflict(format!(
                "truck {} already has an open journey ({})",
                open.truck_no, open.going_do
            )));
        }
        store.put(record.clone())?;
        Ok(record)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<FuelLedgerRecord>> {
        let mut store = lock(&self.store);
        let _sync = store.sync()?;
        Ok(store.get(id).cloned())
    }

    fn find_by_truck(&self, truck_no: &str) -> Result<Vec<FuelLedgerRecord>> {
        let mut store = lock(&self.store);
        let _sync = store.sync()?;
        Ok(store.by_truck(truck_no).into_iter().cloned().collect())
    }

    fn find_open_by_truck(&self, truck_no: &str) -> Result<Option<FuelLedgerRecord>> {
        let mut store = lock(&self.store);
        let _sync = store.sync()?;
        Ok(store.open_for_truck(truck_no).cloned())
    }

    fn find_by_order_ref(&self, order_ref: &str) -> Result<Option<FuelLedgerRecord>> {
        let mut store = lock(&self.store);
        let _sync = store.sync()?;
        Ok(store.by_order_ref(order_ref).cloned())
    }

    fn apply_allocation(
        &self,
        id: &str,
        field: LedgerField,
        liters: f64,
        at: DateTime<Utc>,
    ) -> Result<FuelLedgerRecord> {
        self.update(id, |record| record.debit(field, liters, at).map(|_| ()))
    }

    fn add_extra(&self, id: &str, liters: f64, at: DateTime<Utc>) -> Result<FuelLedgerRecord> {
        self.update(id, |record| record.add_extra(liters, at).map(|_| ()))
    }

    fn attach_return(
        &self,
        id: &str,
        return_do: &str,
        at: DateTime<Utc>,
    ) -> Result<FuelLedgerRecord> {
        self.update(id, |record| record.close(return_do, at))
    }

    fn soft_delete(&self, id: &str, at: DateTime<Utc>) -> Result<FuelLedgerRecord> {
        self.update(id, |record| record.mark_deleted(at))
    }

    fn restore(&self, id: &str, at: DateTime<Utc>) -> Result<FuelLedgerRecord> {
        let mut store = lock(&self.store);
        let _sync = store.sync()?;
        let mut record = store
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("ledger record {id}")))?;
        record.restore(at)?;
        if record.is_open() {
            if let Some(open) = store.open_for_truck(&record.truck_no) {
                return Err(Error::conflict(format!(
                    "truck {} has opened journey {} since this record was deleted",
                    open.truck_no, open.going_do
                )));
            }
        }
        store.put(record.clone())?;
        Ok(record)
    }
}
