//! File-based implementation of StationRepository

use std::path::Path;
use std::sync::Mutex;

use fuelops_domain::{StationConfig, StationRepository};
use fuelops_store::StationStore;
use fuelops_types::Result;

use super::lock;

pub struct FileStationRepository {
    store: Mutex<StationStore>,
}

impl FileStationRepository {
    pub fn open(store_dir: &Path) -> Result<Self> {
        Ok(Self::with_store(StationStore::open(store_dir)?))
    }

    pub fn in_memory() -> Self {
        Self::with_store(StationStore::in_memory())
    }

    pub fn with_store(store: StationStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }
}

impl StationRepository for FileStationRepository {
    fn upsert(&self, station: &StationConfig) -> Result<()> {
        let mut store = lock(&self.store);
        let _sync = store.sync()?;
        store.put(station.clone())
    }

    fn find(&self, name: &str) -> Result<Option<StationConfig>> {
        let mut store = lock(&self.store);
        let _sync = store.sync()?;
        Ok(store.get(name).cloned())
    }

    fn list(&self) -> Result<Vec<StationConfig>> {
        let mut store = lock(&self.store);
        let _sync = store.sync()?;
        Ok(store.all().into_iter().cloned().collect())
    }
}
