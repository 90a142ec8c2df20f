//! Fuel Service - ledger and LPO use cases
//!
//! Ties the checkpoint catalog, the ledger lifecycle and the cancellation
//! engine to the repositories:
//! 1. Resolve the LPO station to a checkpoint
//! 2. Record the entry on its LPO document as a plan
//! 3. Post the allocation when the fuel is dispensed, or record the
//!    cancellation or diversion instead
//! 4. Notify the audit sink

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use fuelops_domain::service::{
    cancel_entry, create_driver_account_entry, display_rows, post_entry, report_for, statement_for,
    CancellationReport, CancellationRequest, CheckpointCatalog, DriverAccountRequest,
    EntryDisplay, LedgerLifecycle, Resolution, ResolutionSource, CASH_STATION,
};
use fuelops_domain::{
    AuditSink, CancellationInfo, Checkpoint, DriverAccountEntry, DriverAccountRepository,
    EntryState, FuelLedgerRecord, JourneyMeta, LedgerEvent, LedgerField, LedgerRepository,
    LpoDocument, LpoEntry, LpoRepository, PaymentMode,
};
use fuelops_infra::{FileDriverAccountRepository, FileLedgerRepository, FileLpoRepository};
use fuelops_types::{Direction, Error, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::audit::TracingAuditSink;

/// How a command names a journey record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JourneyRef {
    Id(String),
    /// Going or return delivery order
    OrderRef(String),
    /// The truck's OPEN record
    Truck(String),
}

/// Outcome of a dispense applied to the ledger
#[derive(Debug, Clone, Serialize)]
pub struct Allocation {
    pub record_id: String,
    pub truck_no: String,
    pub checkpoint: Checkpoint,
    pub field: LedgerField,
    pub resolution: Resolution,
    pub liters: f64,
    pub balance: f64,
}

/// Where a diverted entry's fuel was actually paid for
#[derive(Debug, Clone)]
pub enum Diversion {
    /// Bought for cash; the cash purchase is issued as its own LPO
    Cash {
        cash_lpo: Option<String>,
        reason: Option<String>,
    },
    /// Charged to the driver's internal account
    DriverAccount {
        payment_mode: PaymentMode,
        driver_name: Option<String>,
        notes: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct IssueRequest {
    pub lpo_no: String,
    pub station: String,
    pub direction: Direction,
    pub date: NaiveDate,
    pub truck_no: String,
    pub order_ref: String,
    pub destination: String,
    pub liters: f64,
    pub rate: f64,
    pub actor: String,
    pub diversion: Option<Diversion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssueOutcome {
    pub lpo: LpoDocument,
    pub entry_index: usize,
    pub driver_account: Option<DriverAccountEntry>,
}

pub struct FuelService {
    ledger: Arc<dyn LedgerRepository>,
    lpos: Arc<dyn LpoRepository>,
    accounts: Arc<dyn DriverAccountRepository>,
    audit: Arc<dyn AuditSink>,
    catalog: CheckpointCatalog,
}

impl FuelService {
    pub fn new(
        ledger: Arc<dyn LedgerRepository>,
        lpos: Arc<dyn LpoRepository>,
        accounts: Arc<dyn DriverAccountRepository>,
        audit: Arc<dyn AuditSink>,
        catalog: CheckpointCatalog,
    ) -> Self {
        Self {
            ledger,
            lpos,
            accounts,
            audit,
            catalog,
        }
    }

    /// File-backed service over `data_dir`, auditing through `tracing`
    pub fn open(data_dir: &Path, catalog: CheckpointCatalog) -> Result<Self> {
        Ok(Self::new(
            Arc::new(FileLedgerRepository::open(data_dir)?),
            Arc::new(FileLpoRepository::open(data_dir)?),
            Arc::new(FileDriverAccountRepository::open(data_dir)?),
            Arc::new(TracingAuditSink),
            catalog,
        ))
    }

    pub fn catalog(&self) -> &CheckpointCatalog {
        &self.catalog
    }

    fn lifecycle(&self) -> LedgerLifecycle<'_> {
        LedgerLifecycle::new(self.ledger.as_ref(), self.audit.as_ref())
    }

    // ---- journeys ----

    pub fn open_journey(
        &self,
        truck_no: &str,
        going_do: &str,
        meta: JourneyMeta,
    ) -> Result<FuelLedgerRecord> {
        self.lifecycle().open_journey(truck_no, going_do, meta, Utc::now())
    }

    pub fn find_journey(&self, journey: &JourneyRef) -> Result<FuelLedgerRecord> {
        let lifecycle = self.lifecycle();
        let found = match journey {
            JourneyRef::Id(id) => Some(lifecycle.find(id)?),
            JourneyRef::OrderRef(order_ref) => lifecycle.find_by_order_ref(order_ref)?,
            JourneyRef::Truck(truck_no) => lifecycle.find_open_by_truck(truck_no)?,
        };
        found.ok_or_else(|| match journey {
            JourneyRef::Id(id) => Error::not_found(format!("ledger record {id}")),
            JourneyRef::OrderRef(order_ref) => {
                Error::not_found(format!("journey with order {order_ref}"))
            }
            JourneyRef::Truck(truck_no) => {
                Error::not_found(format!("open journey for truck {truck_no}"))
            }
        })
    }

    pub fn history(&self, truck_no: &str) -> Result<Vec<FuelLedgerRecord>> {
        self.lifecycle().history_for_truck(truck_no)
    }

    /// Resolve `station` and debit `liters` on the journey
    pub fn allocate(
        &self,
        journey: &JourneyRef,
        station: &str,
        direction: Direction,
        liters: f64,
    ) -> Result<Allocation> {
        let record = self.find_journey(journey)?;
        let resolution = self.catalog.resolve_with_source(station, direction);
        self.apply(&record, resolution, liters, Utc::now())
    }

    /// Debit at an explicit checkpoint, bypassing station resolution
    pub fn allocate_at(
        &self,
        journey: &JourneyRef,
        checkpoint: Checkpoint,
        liters: f64,
    ) -> Result<Allocation> {
        let record = self.find_journey(journey)?;
        let resolution = Resolution {
            checkpoint,
            source: ResolutionSource::Exact,
        };
        self.apply(&record, resolution, liters, Utc::now())
    }

    fn apply(
        &self,
        record: &FuelLedgerRecord,
        resolution: Resolution,
        liters: f64,
        at: DateTime<Utc>,
    ) -> Result<Allocation> {
        let checkpoint = resolution.checkpoint;
        let balance = self
            .lifecycle()
            .apply_allocation(&record.id, checkpoint, liters, at)?;
        if balance < 0.0 {
            warn!(truck_no = %record.truck_no, balance, "journey balance is negative");
        }
        Ok(Allocation {
            record_id: record.id.clone(),
            truck_no: record.truck_no.clone(),
            checkpoint,
            field: checkpoint.field(),
            resolution,
            liters,
            balance,
        })
    }

    pub fn top_up(&self, journey: &JourneyRef, liters: f64) -> Result<FuelLedgerRecord> {
        let record = self.find_journey(journey)?;
        let lifecycle = self.lifecycle();
        lifecycle.add_extra_liters(&record.id, liters, Utc::now())?;
        lifecycle.find(&record.id)
    }

    pub fn close_journey(&self, journey: &JourneyRef, return_do: &str) -> Result<FuelLedgerRecord> {
        let record = self.find_journey(journey)?;
        self.lifecycle().attach_return(&record.id, return_do, Utc::now())
    }

    pub fn delete_journey(&self, record_id: &str) -> Result<FuelLedgerRecord> {
        self.lifecycle().soft_delete(record_id, Utc::now())
    }

    pub fn restore_journey(&self, record_id: &str) -> Result<FuelLedgerRecord> {
        self.lifecycle().restore(record_id, Utc::now())
    }

    // ---- LPOs ----

    /// Add one truck entry to an LPO, creating the document on first use.
    ///
    /// Issuing never writes the ledger. An active entry is posted later by
    /// [`FuelService::fulfill`]; diverted entries are never posted.
    pub fn issue(&self, request: IssueRequest) -> Result<IssueOutcome> {
        let now = Utc::now();
        let actor = request.actor.trim().to_string();
        if actor.is_empty() {
            return Err(Error::validation("acting user is required"));
        }
        if !(request.liters.is_finite() && request.liters > 0.0) {
            return Err(Error::validation(format!(
                "liters must be positive, got {}",
                request.liters
            )));
        }
        if !(request.rate.is_finite() && request.rate >= 0.0) {
            return Err(Error::validation(format!(
                "rate must not be negative, got {}",
                request.rate
            )));
        }

        let lpo_no = request.lpo_no.trim();
        if lpo_no.is_empty() {
            return Err(Error::validation("LPO number is required"));
        }

        let mut issued = None;
        let lpo = self.lpos.modify(lpo_no, &mut |existing| {
            let mut lpo = document_for(existing, lpo_no, &request, &actor)?;
            let (entry, driver_account, cancelled) =
                self.prepare_entry(&lpo, &request, &actor, now)?;
            lpo.entries.push(entry);
            issued = Some((lpo.entries.len() - 1, driver_account, cancelled));
            Ok(lpo)
        })?;
        let (entry_index, driver_account, cancelled) =
            issued.ok_or_else(|| Error::not_found(format!("LPO {lpo_no}")))?;

        info!(lpo_no = %lpo.lpo_no, station = %lpo.station, entry_index, "LPO entry issued");
        if let Some(account) = &driver_account {
            self.audit.notify(&LedgerEvent::DriverAccountCreated {
                entry_id: account.id.clone(),
                truck_no: account.truck_no.clone(),
                liters: account.liters,
                amount: account.amount,
            });
        }
        if let Some(info) = &cancelled {
            self.notify_cancelled(&lpo.lpo_no, &lpo.entries[entry_index].truck_no, info);
        }

        Ok(IssueOutcome {
            lpo,
            entry_index,
            driver_account,
        })
    }

    /// Build the entry for `request`; a driver's account entry is saved here
    fn prepare_entry(
        &self,
        lpo: &LpoDocument,
        request: &IssueRequest,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<(LpoEntry, Option<DriverAccountEntry>, Option<CancellationInfo>)> {
        let mut entry = LpoEntry::active(
            &request.truck_no,
            request.order_ref.trim(),
            request.destination.trim(),
            request.liters,
            request.rate,
        );

        match &request.diversion {
            None => {
                self.journey_for(&entry)?;
                Ok((entry, None, None))
            }
            Some(Diversion::Cash { cash_lpo, reason }) => {
                let checkpoint = self.catalog.resolve(&lpo.station, lpo.direction);
                let info = cancel_entry(
                    &entry,
                    checkpoint,
                    &CancellationRequest {
                        station: CASH_STATION.to_string(),
                        actor: actor.to_string(),
                        original_lpo: Some(lpo.lpo_no.clone()),
                        cash_lpo: cash_lpo.clone(),
                        reason: reason.clone(),
                    },
                    now,
                )?;
                entry.state = EntryState::Cancelled(info.clone());
                Ok((entry, None, Some(info)))
            }
            Some(Diversion::DriverAccount {
                payment_mode,
                driver_name,
                notes,
            }) => {
                let account = create_driver_account_entry(
                    DriverAccountRequest {
                        truck_no: entry.truck_no.clone(),
                        reference_do: entry.order_ref.clone(),
                        liters: entry.liters,
                        rate: entry.rate,
                        station: lpo.station.clone(),
                        lpo_no: lpo.lpo_no.clone(),
                        actor: actor.to_string(),
                        payment_mode: *payment_mode,
                        driver_name: driver_name.clone(),
                        notes: notes.clone(),
                    },
                    now,
                )?;
                self.accounts.save(&account)?;
                info!(entry_id = %account.id, truck_no = %account.truck_no, amount = account.amount, "driver's account entry created");
                entry.state = EntryState::DriverAccount {
                    account_entry_id: account.id.clone(),
                };
                Ok((entry, Some(account), None))
            }
        }
    }

    /// Journey an entry is issued against; its truck must match
    fn journey_for(&self, entry: &LpoEntry) -> Result<FuelLedgerRecord> {
        let record = self.find_journey(&JourneyRef::OrderRef(entry.order_ref.clone()))?;
        if record.truck_no != entry.truck_no {
            return Err(Error::validation(format!(
                "order {} belongs to truck {}, not {}",
                entry.order_ref, record.truck_no, entry.truck_no
            )));
        }
        Ok(record)
    }

    /// Post a truck's active entry to the ledger once its fuel is dispensed.
    ///
    /// The ledger write happens inside the document update, after every
    /// check on the entry has passed; when it fails the entry stays unposted.
    pub fn fulfill(&self, lpo_no: &str, truck_no: &str) -> Result<(LpoDocument, Allocation)> {
        let lpo = self.lpo(lpo_no)?;
        let index = lpo.entry_index(truck_no).ok_or_else(|| {
            Error::not_found(format!("truck {truck_no} on LPO {}", lpo.lpo_no))
        })?;
        let resolution = self
            .catalog
            .resolve_with_source(&lpo.station, lpo.direction);

        let now = Utc::now();
        let mut applied = None;
        let updated = self.lpos.update_entry(&lpo.lpo_no, index, &mut |entry| {
            let record = self.journey_for(entry)?;
            let posting = post_entry(entry, &record.id, resolution.checkpoint, now)?;
            let allocation = self.apply(&record, resolution, entry.liters, now)?;
            entry.posting = Some(posting);
            applied = Some(allocation);
            Ok(())
        })?;
        let allocation =
            applied.ok_or_else(|| Error::not_found(format!("entry {index} of LPO {lpo_no}")))?;

        info!(lpo_no = %updated.lpo_no, truck_no = %allocation.truck_no, liters = allocation.liters, "LPO entry fulfilled");
        Ok((updated, allocation))
    }

    /// Cancel the planned fulfillment of one truck's entry.
    ///
    /// Only unposted entries qualify, so the ledger is never written; the
    /// document is updated atomically.
    pub fn cancel(
        &self,
        lpo_no: &str,
        truck_no: &str,
        mut request: CancellationRequest,
    ) -> Result<(LpoDocument, CancellationInfo)> {
        let lpo = self.lpo(lpo_no)?;
        let index = lpo.entry_index(truck_no).ok_or_else(|| {
            Error::not_found(format!("truck {truck_no} on LPO {}", lpo.lpo_no))
        })?;
        let checkpoint = self.catalog.resolve(&lpo.station, lpo.direction);
        if request.original_lpo.is_none() {
            request.original_lpo = Some(lpo.lpo_no.clone());
        }

        let now = Utc::now();
        let mut stamped = None;
        let updated = self.lpos.update_entry(&lpo.lpo_no, index, &mut |entry| {
            let info = cancel_entry(entry, checkpoint, &request, now)?;
            entry.state = EntryState::Cancelled(info.clone());
            stamped = Some(info);
            Ok(())
        })?;
        let info = stamped.ok_or_else(|| Error::not_found(format!("entry {index} of LPO {lpo_no}")))?;

        info!(lpo_no = %updated.lpo_no, truck_no, checkpoint = checkpoint.code(), "LPO entry cancelled");
        self.notify_cancelled(&updated.lpo_no, &updated.entries[index].truck_no, &info);
        Ok((updated, info))
    }

    fn notify_cancelled(&self, lpo_no: &str, truck_no: &str, info: &CancellationInfo) {
        self.audit.notify(&LedgerEvent::EntryCancelled {
            lpo_no: lpo_no.to_string(),
            truck_no: truck_no.to_string(),
            checkpoint: info.checkpoint,
            cancelled_by: info.cancelled_by.clone(),
            cash_lpo: info.cash_lpo.clone(),
        });
    }

    pub fn lpo(&self, lpo_no: &str) -> Result<LpoDocument> {
        self.lpos
            .find(lpo_no.trim())?
            .ok_or_else(|| Error::not_found(format!("LPO {}", lpo_no.trim())))
    }

    pub fn lpos(&self) -> Result<Vec<LpoDocument>> {
        self.lpos.list()
    }

    /// Document with every entry rendered for display
    pub fn lpo_rows(&self, lpo_no: &str) -> Result<(LpoDocument, Vec<EntryDisplay>)> {
        let lpo = self.lpo(lpo_no)?;
        let rows = display_rows(&lpo);
        Ok((lpo, rows))
    }

    pub fn report(&self, lpo_no: &str) -> Result<CancellationReport> {
        Ok(report_for(&self.lpo(lpo_no)?))
    }

    /// Statement over the given LPOs in order, or over every LPO when empty
    pub fn statement(&self, lpo_nos: &[String]) -> Result<String> {
        let documents = if lpo_nos.is_empty() {
            self.lpos.list()?
        } else {
            lpo_nos
                .iter()
                .map(|no| self.lpo(no))
                .collect::<Result<Vec<_>>>()?
        };
        let reports: Vec<_> = documents.iter().map(report_for).collect();
        Ok(statement_for(&reports))
    }

    // ---- driver's account ----

    pub fn driver_accounts(&self, truck_no: Option<&str>) -> Result<Vec<DriverAccountEntry>> {
        let truck_no = truck_no.map(fuelops_domain::normalize_truck_no);
        self.accounts.list(truck_no.as_deref())
    }

    pub fn settle_driver_account(&self, id: &str, approver: &str) -> Result<DriverAccountEntry> {
        let now = Utc::now();
        let entry = self
            .accounts
            .update(id, &mut |entry| entry.settle(approver, now))?;
        self.notify_status(&entry);
        Ok(entry)
    }

    pub fn dispute_driver_account(&self, id: &str, note: Option<&str>) -> Result<DriverAccountEntry> {
        let now = Utc::now();
        let entry = self
            .accounts
            .update(id, &mut |entry| entry.dispute(note, now))?;
        self.notify_status(&entry);
        Ok(entry)
    }

    fn notify_status(&self, entry: &DriverAccountEntry) {
        info!(entry_id = %entry.id, status = %entry.status, "driver's account entry updated");
        self.audit.notify(&LedgerEvent::DriverAccountStatusChanged {
            entry_id: entry.id.clone(),
            status: entry.status,
        });
    }
}

/// The stored document, or a new one when `lpo_no` is first used; an
/// existing document must match the request's station and direction
fn document_for(
    existing: Option<LpoDocument>,
    lpo_no: &str,
    request: &IssueRequest,
    actor: &str,
) -> Result<LpoDocument> {
    match existing {
        Some(existing) => {
            let same_station = existing
                .station
                .eq_ignore_ascii_case(request.station.trim());
            if !same_station || existing.direction != request.direction {
                return Err(Error::validation(format!(
                    "LPO {lpo_no} was issued to {} ({}), not {} ({})",
                    existing.station,
                    existing.direction,
                    request.station.trim(),
                    request.direction
                )));
            }
            Ok(existing)
        }
        None => {
            if request.station.trim().is_empty() {
                return Err(Error::validation("station is required"));
            }
            Ok(LpoDocument::new(
                lpo_no,
                request.station.trim(),
                request.direction,
                request.date,
                actor,
            ))
        }
    }
}
