//! Driver's account entries, keyed by entry id

use std::path::Path;

use fuelops_domain::DriverAccountEntry;
use fuelops_types::Result;

use crate::collection::{Collection, Keyed};
use crate::file_lock::StoreLock;

impl Keyed for DriverAccountEntry {
    fn key(&self) -> String {
        self.id.clone()
    }
}

/// Persistent store for driver's account entries (`driver_accounts.json`)
pub struct DriverAccountStore {
    entries: Collection<DriverAccountEntry>,
}

impl DriverAccountStore {
    pub fn open(store_dir: &Path) -> Result<Self> {
        Ok(Self {
            entries: Collection::open(store_dir, "driver_accounts.json")?,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            entries: Collection::in_memory(),
        }
    }

    /// Lock the store file and reload it; see [`Collection::sync`]
    pub fn sync(&mut self) -> Result<StoreLock> {
        self.entries.sync()
    }

    pub fn get(&self, id: &str) -> Option<&DriverAccountEntry> {
        self.entries.get(id)
    }

    pub fn put(&mut self, entry: DriverAccountEntry) -> Result<()> {
        self.entries.upsert(entry)
    }

    /// Entries newest first, optionally for one truck
    pub fn list(&self, truck_no: Option<&str>) -> Vec<&DriverAccountEntry> {
        let mut entries: Vec<_> = self
            .entries
            .values()
            .filter(|e| truck_no.map_or(true, |t| e.truck_no == t))
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries
    }
}
