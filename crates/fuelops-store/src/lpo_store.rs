//! LPO documents, keyed by LPO number

use std::path::Path;

use fuelops_domain::LpoDocument;
use fuelops_types::Result;

use crate::collection::{Collection, Keyed};
use crate::file_lock::StoreLock;

impl Keyed for LpoDocument {
    fn key(&self) -> String {
        self.lpo_no.clone()
    }
}

/// Persistent store for LPO documents (`lpos.json`)
pub struct LpoStore {
    documents: Collection<LpoDocument>,
}

impl LpoStore {
    pub fn open(store_dir: &Path) -> Result<Self> {
        Ok(Self {
            documents: Collection::open(store_dir, "lpos.json")?,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            documents: Collection::in_memory(),
        }
    }

    /// Lock the store file and reload it; see [`Collection::sync`]
    pub fn sync(&mut self) -> Result<StoreLock> {
        self.documents.sync()
    }

    pub fn get(&self, lpo_no: &str) -> Option<&LpoDocument> {
        self.documents.get(lpo_no.trim())
    }

    pub fn put(&mut self, lpo: LpoDocument) -> Result<()> {
        self.documents.upsert(lpo)
    }

    /// All documents by date, then LPO number
    pub fn all(&self) -> Vec<&LpoDocument> {
        let mut documents: Vec<_> = self.documents.values().collect();
        documents.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.lpo_no.cmp(&b.lpo_no)));
        documents
    }

    pub fn count(&self) -> usize {
        self.documents.len()
    }
}
