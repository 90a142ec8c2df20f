//! Journey record lifecycle: open, allocate, top up, close, delete, restore

use chrono::{DateTime, Utc};
use fuelops_types::{Error, Result};
use tracing::{debug, info};

use crate::audit::{AuditSink, LedgerEvent};
use crate::model::{normalize_truck_no, Checkpoint, FuelLedgerRecord, JourneyMeta};
use crate::repository::LedgerRepository;

/// Owns every mutation of a [`FuelLedgerRecord`].
///
/// Atomicity lives in the repository; this type validates, logs and emits
/// audit events.
pub struct LedgerLifecycle<'a> {
    repo: &'a dyn LedgerRepository,
    audit: &'a dyn AuditSink,
}

impl<'a> LedgerLifecycle<'a> {
    pub fn new(repo: &'a dyn LedgerRepository, audit: &'a dyn AuditSink) -> Self {
        Self { repo, audit }
    }

    /// Open a journey; `Conflict` if the truck already has an OPEN record
    pub fn open_journey(
        &self,
        truck_no: &str,
        going_do: &str,
        meta: JourneyMeta,
        at: DateTime<Utc>,
    ) -> Result<FuelLedgerRecord> {
        let record = FuelLedgerRecord::open(truck_no, going_do, meta, at)?;
        let record = self.repo.create_open(record)?;
        info!(
            record_id = %record.id,
            truck_no = %record.truck_no,
            going_do = %record.going_do,
            balance = record.balance(),
            "journey opened"
        );
        self.audit.notify(&LedgerEvent::JourneyOpened {
            record_id: record.id.clone(),
            truck_no: record.truck_no.clone(),
            going_do: record.going_do.clone(),
            balance: record.balance(),
        });
        Ok(record)
    }

    /// Debit `liters` at `checkpoint` and return the new balance
    pub fn apply_allocation(
        &self,
        record_id: &str,
        checkpoint: Checkpoint,
        liters: f64,
        at: DateTime<Utc>,
    ) -> Result<f64> {
        let record = self
            .repo
            .apply_allocation(record_id, checkpoint.field(), liters, at)?;
        debug!(
            record_id,
            checkpoint = checkpoint.code(),
            field = checkpoint.field().name(),
            liters,
            balance = record.balance(),
            "allocation applied"
        );
        self.audit.notify(&LedgerEvent::AllocationApplied {
            record_id: record.id.clone(),
            truck_no: record.truck_no.clone(),
            checkpoint,
            liters,
            balance: record.balance(),
        });
        Ok(record.balance())
    }

    pub fn add_extra_liters(&self, record_id: &str, liters: f64, at: DateTime<Utc>) -> Result<f64> {
        let record = self.repo.add_extra(record_id, liters, at)?;
        info!(record_id, liters, balance = record.balance(), "extra liters granted");
        self.audit.notify(&LedgerEvent::ExtraLitersAdded {
            record_id: record.id.clone(),
            truck_no: record.truck_no.clone(),
            liters,
            balance: record.balance(),
        });
        Ok(record.balance())
    }

    pub fn attach_return(
        &self,
        record_id: &str,
        return_do: &str,
        at: DateTime<Utc>,
    ) -> Result<FuelLedgerRecord> {
        let record = self.repo.attach_return(record_id, return_do, at)?;
        let return_do = record.return_do().unwrap_or_default().to_string();
        info!(record_id, truck_no = %record.truck_no, %return_do, "journey closed");
        self.audit.notify(&LedgerEvent::JourneyClosed {
            record_id: record.id.clone(),
            truck_no: record.truck_no.clone(),
            return_do,
        });
        Ok(record)
    }

    pub fn find(&self, record_id: &str) -> Result<FuelLedgerRecord> {
        self.repo
            .find_by_id(record_id)?
            .ok_or_else(|| Error::not_found(format!("ledger record {record_id}")))
    }

    pub fn find_open_by_truck(&self, truck_no: &str) -> Result<Option<FuelLedgerRecord>> {
        self.repo.find_open_by_truck(&normalize_truck_no(truck_no))
    }

    pub fn find_by_order_ref(&self, order_ref: &str) -> Result<Option<FuelLedgerRecord>> {
        self.repo.find_by_order_ref(order_ref.trim())
    }

    pub fn history_for_truck(&self, truck_no: &str) -> Result<Vec<FuelLedgerRecord>> {
        self.repo.find_by_truck(&normalize_truck_no(truck_no))
    }

    pub fn soft_delete(&self, record_id: &str, at: DateTime<Utc>) -> Result<FuelLedgerRecord> {
        let record = self.repo.soft_delete(record_id, at)?;
        info!(record_id, truck_no = %record.truck_no, "record soft-deleted");
        self.audit.notify(&LedgerEvent::RecordDeleted {
            record_id: record.id.clone(),
            truck_no: record.truck_no.clone(),
        });
        Ok(record)
    }

    pub fn restore(&self, record_id: &str, at: DateTime<Utc>) -> Result<FuelLedgerRecord> {
        let record = self.repo.restore(record_id, at)?;
        info!(record_id, truck_no = %record.truck_no, "record restored");
        self.audit.notify(&LedgerEvent::RecordRestored {
            record_id: record.id.clone(),
            truck_no: record.truck_no.clone(),
        });
        Ok(record)
    }
}
