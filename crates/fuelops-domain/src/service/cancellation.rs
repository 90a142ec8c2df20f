//! Cancellation and diversion of planned LPO fulfillments
//!
//! An active entry is a plan until its fuel is dispensed and posted to the
//! ledger. Only unposted entries can be cancelled, so cancelling never
//! touches the ledger: callers persist the returned metadata and do not
//! apply the allocation for it.

use chrono::{DateTime, Utc};
use fuelops_types::{Error, Result};
use serde::Serialize;

use crate::model::{
    normalize_truck_no, CancellationInfo, Checkpoint, DriverAccountEntry, DriverAccountStatus,
    EntryState, LpoDocument, LpoEntry, PaymentMode, Posting,
};

pub const DEFAULT_CANCELLATION_REASON: &str = "Entry cancelled - fuel allocation reverted";

/// Order reference shown for cancelled entries
pub const CANCELLED_MARKER: &str = "CANCELLED";

/// Placeholder shown for driver's account entries
pub const NIL_MARKER: &str = "NIL";

#[derive(Debug, Clone, Default)]
pub struct CancellationRequest {
    /// Where the fuel was actually taken
    pub station: String,
    pub actor: String,
    pub original_lpo: Option<String>,
    pub cash_lpo: Option<String>,
    pub reason: Option<String>,
}

/// Build the metadata for cancelling `entry` at `checkpoint`.
///
/// Pure: the entry itself is not modified.
pub fn cancel_entry(
    entry: &LpoEntry,
    checkpoint: Checkpoint,
    request: &CancellationRequest,
    at: DateTime<Utc>,
) -> Result<CancellationInfo> {
    match &entry.state {
        EntryState::Active => {
            if let Some(posting) = &entry.posting {
                return Err(Error::conflict(format!(
                    "entry for truck {} was dispensed at {} on {} and cannot be cancelled",
                    entry.truck_no,
                    posting.checkpoint.label(),
                    posting.posted_at.format("%Y-%m-%d %H:%M")
                )));
            }
        }
        EntryState::Cancelled(info) => {
            return Err(Error::conflict(format!(
                "entry for truck {} was already cancelled by {} at {}",
                entry.truck_no,
                info.cancelled_by,
                info.cancelled_at.format("%Y-%m-%d %H:%M")
            )));
        }
        EntryState::DriverAccount { .. } => {
            return Err(Error::conflict(format!(
                "entry for truck {} is a driver's account entry and cannot be cancelled",
                entry.truck_no
            )));
        }
    }

    let station = required("cancellation station", &request.station)?;
    let actor = required("acting user", &request.actor)?;
    let reason = request
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_CANCELLATION_REASON);

    Ok(CancellationInfo {
        checkpoint,
        station,
        cancelled_at: at,
        cancelled_by: actor,
        reason: reason.to_string(),
        original_lpo: trimmed(request.original_lpo.as_deref()),
        cash_lpo: trimmed(request.cash_lpo.as_deref()),
    })
}

/// Build the posting that records `entry`'s fuel as dispensed on `record_id`.
///
/// Only an active, unposted entry can be posted. Pure: the caller writes the
/// ledger and stores the posting on the entry under one document update.
pub fn post_entry(
    entry: &LpoEntry,
    record_id: &str,
    checkpoint: Checkpoint,
    at: DateTime<Utc>,
) -> Result<Posting> {
    match &entry.state {
        EntryState::Active => {}
        EntryState::Cancelled(_) => {
            return Err(Error::conflict(format!(
                "entry for truck {} is cancelled and cannot be dispensed",
                entry.truck_no
            )));
        }
        EntryState::DriverAccount { .. } => {
            return Err(Error::conflict(format!(
                "entry for truck {} is charged to the driver's account",
                entry.truck_no
            )));
        }
    }
    if let Some(posting) = &entry.posting {
        return Err(Error::conflict(format!(
            "entry for truck {} was already dispensed on {}",
            entry.truck_no,
            posting.posted_at.format("%Y-%m-%d %H:%M")
        )));
    }

    Ok(Posting {
        record_id: record_id.to_string(),
        checkpoint,
        liters: entry.liters,
        posted_at: at,
    })
}

#[derive(Debug, Clone, Default)]
pub struct DriverAccountRequest {
    pub truck_no: String,
    /// Kept for the internal trail; never displayed
    pub reference_do: String,
    pub liters: f64,
    pub rate: f64,
    pub station: String,
    pub lpo_no: String,
    pub actor: String,
    pub payment_mode: PaymentMode,
    pub driver_name: Option<String>,
    pub notes: Option<String>,
}

pub fn create_driver_account_entry(
    request: DriverAccountRequest,
    at: DateTime<Utc>,
) -> Result<DriverAccountEntry> {
    if !(request.liters.is_finite() && request.liters > 0.0) {
        return Err(Error::validation(format!(
            "driver's account liters must be positive, got {}",
            request.liters
        )));
    }
    if !(request.rate.is_finite() && request.rate >= 0.0) {
        return Err(Error::validation(format!(
            "driver's account rate must not be negative, got {}",
            request.rate
        )));
    }
    let truck_no = normalize_truck_no(&request.truck_no);
    if truck_no.is_empty() {
        return Err(Error::validation("truck number is required"));
    }
    let actor = required("acting user", &request.actor)?;

    Ok(DriverAccountEntry {
        id: uuid::Uuid::new_v4().to_string(),
        truck_no,
        liters: request.liters,
        rate: request.rate,
        amount: request.liters * request.rate,
        station: request.station.trim().to_string(),
        reference_do: request.reference_do.trim().to_string(),
        lpo_no: request.lpo_no.trim().to_string(),
        payment_mode: request.payment_mode,
        approved_by: None,
        driver_name: trimmed(request.driver_name.as_deref()),
        notes: trimmed(request.notes.as_deref()),
        created_by: actor,
        created_at: at,
        status: DriverAccountStatus::Pending,
        resolved_at: None,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayClass {
    Normal,
    /// Rendered struck through
    Cancelled,
    DriverAccount,
}

/// An entry as it may be shown outside the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryDisplay {
    pub truck_no: String,
    pub order_ref: String,
    pub destination: String,
    pub liters: f64,
    pub rate: f64,
    pub amount: f64,
    pub display_class: DisplayClass,
    /// Fuel dispensed and on the ledger
    pub posted: bool,
}

pub fn format_for_display(entry: &LpoEntry) -> EntryDisplay {
    let (order_ref, destination, display_class) = match &entry.state {
        EntryState::Active => (
            entry.order_ref.clone(),
            entry.destination.clone(),
            DisplayClass::Normal,
        ),
        EntryState::Cancelled(_) => (
            CANCELLED_MARKER.to_string(),
            entry.destination.clone(),
            DisplayClass::Cancelled,
        ),
        EntryState::DriverAccount { .. } => (
            NIL_MARKER.to_string(),
            NIL_MARKER.to_string(),
            DisplayClass::DriverAccount,
        ),
    };
    EntryDisplay {
        truck_no: entry.truck_no.clone(),
        order_ref,
        destination,
        liters: entry.liters,
        rate: entry.rate,
        amount: entry.amount(),
        display_class,
        posted: entry.is_posted(),
    }
}

pub fn display_rows(lpo: &LpoDocument) -> Vec<EntryDisplay> {
    lpo.entries.iter().map(format_for_display).collect()
}

fn required(what: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        Err(Error::validation(format!("{what} is required")))
    } else {
        Ok(value.to_string())
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CancellationRequest {
        CancellationRequest {
            station: "Cash at Kapiri".to_string(),
            actor: "fuel.clerk".to_string(),
            original_lpo: Some("2356".to_string()),
            cash_lpo: Some(" C-88 ".to_string()),
            reason: None,
        }
    }

    fn entry() -> LpoEntry {
        LpoEntry::active("T705 DXY", "DO-1001", "LUBUMBASHI", 350.0, 1.45)
    }

    #[test]
    fn cancel_builds_metadata_with_default_reason() {
        let at = Utc::now();
        let info = cancel_entry(&entry(), Checkpoint::ZambiaGoing, &request(), at).unwrap();
        assert_eq!(info.reason, DEFAULT_CANCELLATION_REASON);
        assert_eq!(info.cancelled_by, "fuel.clerk");
        assert_eq!(info.cash_lpo.as_deref(), Some("C-88"));
        assert_eq!(info.checkpoint, Checkpoint::ZambiaGoing);
        assert_eq!(info.cancelled_at, at);
    }

    #[test]
    fn second_cancellation_is_a_conflict() {
        let mut entry = entry();
        let info = cancel_entry(&entry, Checkpoint::ZambiaGoing, &request(), Utc::now()).unwrap();
        entry.state = EntryState::Cancelled(info);

        let err = cancel_entry(&entry, Checkpoint::ZambiaGoing, &request(), Utc::now()).unwrap_err();
        assert_eq!(err.kind(), fuelops_types::ErrorKind::Conflict);
    }

    #[test]
    fn posted_entries_cannot_be_cancelled() {
        let mut entry = entry();
        let posting = post_entry(&entry, "rec-1", Checkpoint::ZambiaGoing, Utc::now()).unwrap();
        assert_eq!(posting.liters, 350.0);
        entry.posting = Some(posting);

        let err = cancel_entry(&entry, Checkpoint::ZambiaGoing, &request(), Utc::now()).unwrap_err();
        assert_eq!(err.kind(), fuelops_types::ErrorKind::Conflict);
        assert!(entry.is_active());
    }

    #[test]
    fn only_active_unposted_entries_can_be_posted() {
        let mut entry = entry();
        entry.posting =
            Some(post_entry(&entry, "rec-1", Checkpoint::ZambiaGoing, Utc::now()).unwrap());
        let err = post_entry(&entry, "rec-1", Checkpoint::ZambiaGoing, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), fuelops_types::ErrorKind::Conflict);

        let mut cancelled = self::entry();
        cancelled.state = EntryState::Cancelled(
            cancel_entry(&cancelled, Checkpoint::ZambiaGoing, &request(), Utc::now()).unwrap(),
        );
        let err = post_entry(&cancelled, "rec-1", Checkpoint::ZambiaGoing, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), fuelops_types::ErrorKind::Conflict);
    }

    #[test]
    fn driver_account_entries_cannot_be_cancelled() {
        let mut entry = entry();
        entry.state = EntryState::DriverAccount {
            account_entry_id: "abc".to_string(),
        };
        let err = cancel_entry(&entry, Checkpoint::ZambiaGoing, &request(), Utc::now()).unwrap_err();
        assert_eq!(err.kind(), fuelops_types::ErrorKind::Conflict);
    }

    #[test]
    fn blank_station_or_actor_is_rejected() {
        let mut req = request();
        req.station = "  ".to_string();
        assert!(cancel_entry(&entry(), Checkpoint::ZambiaGoing, &req, Utc::now()).is_err());

        let mut req = request();
        req.actor = String::new();
        let err = cancel_entry(&entry(), Checkpoint::ZambiaGoing, &req, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), fuelops_types::ErrorKind::Validation);
    }

    #[test]
    fn driver_account_amount_is_liters_times_rate() {
        let created = create_driver_account_entry(
            DriverAccountRequest {
                truck_no: "t705 dxy".to_string(),
                reference_do: "DO-1001".to_string(),
                liters: 200.0,
                rate: 1.5,
                station: "LAKE NDOLA".to_string(),
                lpo_no: "2356".to_string(),
                actor: "ops".to_string(),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(created.amount, 300.0);
        assert_eq!(created.truck_no, "T705 DXY");
        assert_eq!(created.status, DriverAccountStatus::Pending);
    }

    #[test]
    fn driver_account_rejects_bad_quantities() {
        let base = DriverAccountRequest {
            truck_no: "T1".to_string(),
            actor: "ops".to_string(),
            liters: 10.0,
            rate: 1.0,
            ..Default::default()
        };
        let zero = DriverAccountRequest {
            liters: 0.0,
            ..base.clone()
        };
        let negative_rate = DriverAccountRequest {
            rate: -0.5,
            ..base.clone()
        };
        assert!(create_driver_account_entry(zero, Utc::now()).is_err());
        assert!(create_driver_account_entry(negative_rate, Utc::now()).is_err());
        assert!(create_driver_account_entry(base, Utc::now()).is_ok());
    }

    #[test]
    fn display_hides_driver_account_references() {
        let mut entry = entry();
        entry.state = EntryState::DriverAccount {
            account_entry_id: "abc".to_string(),
        };
        let shown = format_for_display(&entry);
        assert_eq!(shown.order_ref, "NIL");
        assert_eq!(shown.destination, "NIL");
        assert_eq!(shown.display_class, DisplayClass::DriverAccount);
    }

    #[test]
    fn display_marks_cancelled_and_passes_active_through() {
        let active = entry();
        let mut cancelled = entry();
        cancelled.state = EntryState::Cancelled(
            cancel_entry(&active, Checkpoint::ZambiaGoing, &request(), Utc::now()).unwrap(),
        );

        let shown = format_for_display(&active);
        assert_eq!(shown.order_ref, "DO-1001");
        assert_eq!(shown.display_class, DisplayClass::Normal);

        let shown = format_for_display(&cancelled);
        assert_eq!(shown.order_ref, "CANCELLED");
        assert_eq!(shown.destination, "LUBUMBASHI");
        assert_eq!(shown.display_class, DisplayClass::Cancelled);
    }
}
