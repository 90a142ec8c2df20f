//! Keyed collection persisted as one pretty-printed JSON object

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use fuelops_types::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::file_lock::StoreLock;

/// Items stored in a [`Collection`] know their own key
pub trait Keyed {
    fn key(&self) -> String;
}

pub struct Collection<V> {
    store_path: Option<PathBuf>,
    items: HashMap<String, V>,
}

impl<V> Collection<V>
where
    V: Keyed + Serialize + DeserializeOwned,
{
    /// Load `file_name` from `store_dir`, creating the directory if needed.
    ///
    /// A missing file is an empty collection; a corrupt one is an error.
    pub fn open(store_dir: &Path, file_name: &str) -> Result<Self> {
        fs::create_dir_all(store_dir)?;
        let store_path = store_dir.join(file_name);
        let items: HashMap<String, V> = load(&store_path)?;
        debug!(path = %store_path.display(), count = items.len(), "store loaded");

        Ok(Self {
            store_path: Some(store_path),
            items,
        })
    }

    /// Take the cross-process lock and reload what other processes wrote.
    ///
    /// Hold the returned guard across a whole check-then-write so that no
    /// other process can interleave its own write.
    pub fn sync(&mut self) -> Result<StoreLock> {
        let Some(store_path) = &self.store_path else {
            return Ok(StoreLock::unlocked());
        };
        let guard = StoreLock::exclusive(&store_path.with_extension("json.lock"))?;
        self.items = load(store_path)?;
        Ok(guard)
    }

    /// Collection that is never written to disk
    pub fn in_memory() -> Self {
        Self {
            store_path: None,
            items: HashMap::new(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.store_path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.items.get(key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Insert or replace an item and persist.
    ///
    /// The in-memory state is rolled back when the write fails.
    pub fn upsert(&mut self, item: V) -> Result<()> {
        let key = item.key();
        let previous = self.items.insert(key.clone(), item);
        if let Err(err) = self.save() {
            match previous {
                Some(previous) => self.items.insert(key, previous),
                None => self.items.remove(&key),
            };
            return Err(err);
        }
        Ok(())
    }

    /// Write to a temporary sibling, then rename over the store file
    fn save(&self) -> Result<()> {
        let Some(store_path) = &self.store_path else {
            return Ok(());
        };
        let tmp_path = store_path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &self.items)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, store_path)?;
        Ok(())
    }
}

fn load<V: DeserializeOwned>(store_path: &Path) -> Result<HashMap<String, V>> {
    if !store_path.exists() {
        return Ok(HashMap::new());
    }
    let file = File::open(store_path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}
