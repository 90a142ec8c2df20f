//! File-based implementation of DriverAccountRepository

use std::path::Path;
use std::sync::Mutex;

use fuelops_domain::{DriverAccountEntry, DriverAccountRepository};
use fuelops_store::DriverAccountStore;
use fuelops_types::{Error, Result};

use super::lock;

pub struct FileDriverAccountRepository {
    store: Mutex<DriverAccountStore>,
}

impl FileDriverAccountRepository {
    pub fn open(store_dir: &Path) -> Result<Self> {
        Ok(Self::with_store(DriverAccountStore::open(store_dir)?))
    }

    pub fn in_memory() -> Self {
        Self::with_store(DriverAccountStore::in_memory())
    }

    pub fn with_store(store: DriverAccountStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }
}

impl DriverAccountRepository for FileDriverAccountRepository {
    fn save(&self, entry: &DriverAccountEntry) -> Result<()> {
        let mut store = lock(&self.store);
        let _sync = store.sync()?;
        store.put(entry.clone())
    }

    fn find(&self, id: &str) -> Result<Option<DriverAccountEntry>> {
        let mut store = lock(&self.store);
        let _sync = store.sync()?;
        Ok(store.get(id).cloned())
    }

    fn list(&self, truck_no: Option<&str>) -> Result<Vec<DriverAccountEntry>> {
        let mut store = lock(&self.store);
        let _sync = store.sync()?;
        Ok(store.list(truck_no).into_iter().cloned().collect())
    }

    fn update(
        &self,
        id: &str,
        change: &mut dyn FnMut(&mut DriverAccountEntry) -> Result<()>,
    ) -> Result<DriverAccountEntry> {
        let mut store = lock(&self.store);
        let _sync = store.sync()?;
        let mut entry = store
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("driver account entry {id}")))?;
        change(&mut entry)?;
        store.put(entry.clone())?;
        Ok(entry)
    }
}
