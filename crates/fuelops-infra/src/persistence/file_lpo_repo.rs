//! File-based implementation of LpoRepository

use std::path::Path;
use std::sync::Mutex;

use fuelops_domain::{LpoDocument, LpoEntry, LpoRepository};
use fuelops_store::LpoStore;
use fuelops_types::{Error, Result};

use super::lock;

pub struct FileLpoRepository {
    store: Mutex<LpoStore>,
}

impl FileLpoRepository {
    pub fn open(store_dir: &Path) -> Result<Self> {
        Ok(Self::with_store(LpoStore::open(store_dir)?))
    }

    pub fn in_memory() -> Self {
        Self::with_store(LpoStore::in_memory())
    }

    pub fn with_store(store: LpoStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }
}

impl LpoRepository for FileLpoRepository {
    fn find(&self, lpo_no: &str) -> Result<Option<LpoDocument>> {
        let mut store = lock(&self.store);
        let _sync = store.sync()?;
        Ok(store.get(lpo_no).cloned())
    }

    fn save(&self, lpo: &LpoDocument) -> Result<()> {
        if lpo.lpo_no.is_empty() {
            return Err(Error::validation("LPO number is required"));
        }
        let mut store = lock(&self.store);
        let _sync = store.sync()?;
        store.put(lpo.clone())
    }

    fn list(&self) -> Result<Vec<LpoDocument>> {
        let mut store = lock(&self.store);
        let _sync = store.sync()?;
        Ok(store.all().into_iter().cloned().collect())
    }

    fn modify(
        &self,
        lpo_no: &str,
        change: &mut dyn FnMut(Option<LpoDocument>) -> Result<LpoDocument>,
    ) -> Result<LpoDocument> {
        let mut store = lock(&self.store);
        let _sync = store.sync()?;
        let lpo = change(store.get(lpo_no).cloned())?;
        if lpo.lpo_no != lpo_no {
            return Err(Error::validation(format!(
                "LPO {lpo_no} cannot be saved as {}",
                lpo.lpo_no
            )));
        }
        store.put(lpo.clone())?;
        Ok(lpo)
    }

    fn update_entry(
        &self,
        lpo_no: &str,
        index: usize,
        change: &mut dyn FnMut(&mut LpoEntry) -> Result<()>,
    ) -> Result<LpoDocument> {
        let mut store = lock(&self.store);
        let _sync = store.sync()?;
        let mut lpo = store
            .get(lpo_no)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("LPO {lpo_no}")))?;
        let entry = lpo.entries.get_mut(index).ok_or_else(|| {
            Error::not_found(format!("entry {index} of LPO {lpo_no}"))
        })?;
        change(entry)?;
        store.put(lpo.clone())?;
        Ok(lpo)
    }
}
