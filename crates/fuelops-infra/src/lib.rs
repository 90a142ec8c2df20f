//! Infrastructure layer: file-backed repositories and loaders

pub mod persistence;
pub mod station_csv_loader;

pub use persistence::{
    FileDriverAccountRepository, FileLedgerRepository, FileLpoRepository, FileStationRepository,
};
pub use station_csv_loader::{load_stations, parse_stations, CsvLoaderError};
