//! Application service layer - use cases, config, logging

pub mod app;
pub mod audit;
pub mod config;
pub mod logging;

pub use app::{FuelService, StationService};
pub use audit::TracingAuditSink;
pub use config::Config;
pub use logging::init_tracing;
