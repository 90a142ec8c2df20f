//! Station configuration, keyed by normalized station name

use std::path::Path;

use fuelops_domain::StationConfig;
use fuelops_types::Result;

use crate::collection::{Collection, Keyed};
use crate::file_lock::StoreLock;

impl Keyed for StationConfig {
    fn key(&self) -> String {
        self.name.clone()
    }
}

/// Persistent store for station configuration (`stations.json`)
pub struct StationStore {
    stations: Collection<StationConfig>,
}

impl StationStore {
    pub fn open(store_dir: &Path) -> Result<Self> {
        Ok(Self {
            stations: Collection::open(store_dir, "stations.json")?,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            stations: Collection::in_memory(),
        }
    }

    /// Lock the store file and reload it; see [`Collection::sync`]
    pub fn sync(&mut self) -> Result<StoreLock> {
        self.stations.sync()
    }

    pub fn get(&self, name: &str) -> Option<&StationConfig> {
        self.stations.get(name)
    }

    pub fn put(&mut self, station: StationConfig) -> Result<()> {
        self.stations.upsert(station)
    }

    /// All stations sorted by name
    pub fn all(&self) -> Vec<&StationConfig> {
        let mut stations: Vec<_> = self.stations.values().collect();
        stations.sort_by(|a, b| a.name.cmp(&b.name));
        stations
    }
}
