//! Audit sink that forwards ledger events to `tracing`

use fuelops_domain::{AuditSink, LedgerEvent};
use tracing::{info, warn};

/// Logs every event at info level under the `fuelops::audit` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn notify(&self, event: &LedgerEvent) {
        match serde_json::to_string(event) {
            Ok(payload) => info!(target: "fuelops::audit", event = event.name(), %payload),
            Err(err) => warn!(target: "fuelops::audit", event = event.name(), error = %err, "unserializable audit event"),
        }
    }
}
