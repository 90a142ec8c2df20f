//! Audit notifications emitted by the engine
//!
//! Sinks are fire-and-forget: `notify` cannot fail and the engine never
//! waits on persistence of the audit trail.

use std::sync::Mutex;

use serde::Serialize;

use crate::model::{Checkpoint, DriverAccountStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    JourneyOpened {
        record_id: String,
        truck_no: String,
        going_do: String,
        balance: f64,
    },
    AllocationApplied {
        record_id: String,
        truck_no: String,
        checkpoint: Checkpoint,
        liters: f64,
        balance: f64,
    },
    ExtraLitersAdded {
        record_id: String,
        truck_no: String,
        liters: f64,
        balance: f64,
    },
    JourneyClosed {
        record_id: String,
        truck_no: String,
        return_do: String,
    },
    RecordDeleted {
        record_id: String,
        truck_no: String,
    },
    RecordRestored {
        record_id: String,
        truck_no: String,
    },
    EntryCancelled {
        lpo_no: String,
        truck_no: String,
        checkpoint: Checkpoint,
        cancelled_by: String,
        cash_lpo: Option<String>,
    },
    DriverAccountCreated {
        entry_id: String,
        truck_no: String,
        liters: f64,
        amount: f64,
    },
    DriverAccountStatusChanged {
        entry_id: String,
        status: DriverAccountStatus,
    },
}

impl LedgerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::JourneyOpened { .. } => "journey_opened",
            LedgerEvent::AllocationApplied { .. } => "allocation_applied",
            LedgerEvent::ExtraLitersAdded { .. } => "extra_liters_added",
            LedgerEvent::JourneyClosed { .. } => "journey_closed",
            LedgerEvent::RecordDeleted { .. } => "record_deleted",
            LedgerEvent::RecordRestored { .. } => "record_restored",
            LedgerEvent::EntryCancelled { .. } => "entry_cancelled",
            LedgerEvent::DriverAccountCreated { .. } => "driver_account_created",
            LedgerEvent::DriverAccountStatusChanged { .. } => "driver_account_status_changed",
        }
    }
}

pub trait AuditSink: Send + Sync {
    fn notify(&self, event: &LedgerEvent);
}

/// Discards every event
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn notify(&self, _event: &LedgerEvent) {}
}

/// Keeps events in memory, for tests and dry runs
#[derive(Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<LedgerEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(LedgerEvent::name).collect()
    }
}

impl AuditSink for MemoryAuditSink {
    fn notify(&self, event: &LedgerEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}
