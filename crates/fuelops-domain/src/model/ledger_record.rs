//! Per-truck journey record with a running fuel balance

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use fuelops_types::{Error, Result};
use serde::{Deserialize, Serialize};

use super::checkpoint::LedgerField;

/// Normalize a truck number for comparison ("t705  dxy" -> "T705 DXY")
pub fn normalize_truck_no(truck_no: &str) -> String {
    truck_no
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Journey details supplied when a record is opened
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JourneyMeta {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    /// Liters allotted for the whole round trip
    pub total_liters: f64,
    /// Extra liters granted on top of the allotment
    #[serde(default)]
    pub extra_liters: f64,
}

impl JourneyMeta {
    pub fn new(total_liters: f64, extra_liters: f64) -> Self {
        Self {
            total_liters,
            extra_liters,
            ..Default::default()
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_route(mut self, origin: impl Into<String>, destination: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self.destination = Some(destination.into());
        self
    }
}

/// One truck journey.
///
/// `balance` always equals `total_liters + extra_liters + Σ allocations`, and
/// every allocation is stored as a non-positive amount. The fuel fields are
/// private; the only writers are the methods below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelLedgerRecord {
    pub id: String,
    pub truck_no: String,
    pub going_do: String,
    #[serde(default)]
    return_do: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    total_liters: f64,
    extra_liters: f64,
    #[serde(default)]
    allocations: BTreeMap<LedgerField, f64>,
    balance: f64,
    #[serde(default)]
    is_deleted: bool,
    #[serde(default)]
    deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FuelLedgerRecord {
    /// Build a fresh zero-allocation record.
    pub fn open(
        truck_no: &str,
        going_do: &str,
        meta: JourneyMeta,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let truck_no = normalize_truck_no(truck_no);
        if truck_no.is_empty() {
            return Err(Error::validation("truck number is required"));
        }
        let going_do = going_do.trim();
        if going_do.is_empty() {
            return Err(Error::validation("going order reference is required"));
        }
        check_liters("total liters", meta.total_liters)?;
        check_liters("extra liters", meta.extra_liters)?;

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            truck_no,
            going_do: going_do.to_string(),
            return_do: None,
            date: meta.date,
            origin: meta.origin,
            destination: meta.destination,
            total_liters: meta.total_liters,
            extra_liters: meta.extra_liters,
            allocations: BTreeMap::new(),
            balance: meta.total_liters + meta.extra_liters,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn return_do(&self) -> Option<&str> {
        self.return_do.as_deref()
    }

    pub fn total_liters(&self) -> f64 {
        self.total_liters
    }

    pub fn extra_liters(&self) -> f64 {
        self.extra_liters
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// OPEN = no return order attached and not soft-deleted
    pub fn is_open(&self) -> bool {
        self.return_do.is_none() && !self.is_deleted
    }

    /// Stored (non-positive) amount for a field; zero when untouched
    pub fn allocation(&self, field: LedgerField) -> f64 {
        self.allocations.get(&field).copied().unwrap_or(0.0)
    }

    pub fn allocations(&self) -> &BTreeMap<LedgerField, f64> {
        &self.allocations
    }

    /// Liters dispensed so far across all checkpoints
    pub fn consumed(&self) -> f64 {
        -self.allocations.values().sum::<f64>()
    }

    /// Whether `order_ref` is this record's going or return order
    pub fn matches_order_ref(&self, order_ref: &str) -> bool {
        let order_ref = order_ref.trim();
        self.going_do.eq_ignore_ascii_case(order_ref)
            || self
                .return_do
                .as_deref()
                .is_some_and(|r| r.eq_ignore_ascii_case(order_ref))
    }

    /// Record `liters` dispensed at `field` and return the new balance.
    ///
    /// The amount is accumulated as a negative delta, so sub-stops that
    /// share a field add up.
    pub fn debit(&mut self, field: LedgerField, liters: f64, now: DateTime<Utc>) -> Result<f64> {
        if !(liters.is_finite() && liters > 0.0) {
            return Err(Error::validation(format!(
                "dispensed liters must be a positive number, got {liters}"
            )));
        }
        *self.allocations.entry(field).or_insert(0.0) -= liters;
        self.recompute(now);
        Ok(self.balance)
    }

    /// Grant additional liters for the journey and return the new balance
    pub fn add_extra(&mut self, liters: f64, now: DateTime<Utc>) -> Result<f64> {
        if !(liters.is_finite() && liters > 0.0) {
            return Err(Error::validation(format!(
                "extra liters must be a positive number, got {liters}"
            )));
        }
        self.extra_liters += liters;
        self.recompute(now);
        Ok(self.balance)
    }

    /// Attach the return order, taking the record out of OPEN state
    pub fn close(&mut self, return_do: &str, now: DateTime<Utc>) -> Result<()> {
        let return_do = return_do.trim();
        if return_do.is_empty() {
            return Err(Error::validation("return order reference is required"));
        }
        if let Some(existing) = &self.return_do {
            return Err(Error::conflict(format!(
                "journey {} of truck {} already has return order {}",
                self.going_do, self.truck_no, existing
            )));
        }
        self.return_do = Some(return_do.to_string());
        self.updated_at = now;
        Ok(())
    }

    pub fn mark_deleted(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.is_deleted {
            return Err(Error::conflict(format!(
                "record {} is already deleted",
                self.id
            )));
        }
        self.is_deleted = true;
        self.deleted_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    pub fn restore(&mut self, now: DateTime<Utc>) -> Result<()> {
        if !self.is_deleted {
            return Err(Error::conflict(format!("record {} is not deleted", self.id)));
        }
        self.is_deleted = false;
        self.deleted_at = None;
        self.updated_at = now;
        Ok(())
    }

    fn recompute(&mut self, now: DateTime<Utc>) {
        self.balance = self.total_liters + self.extra_liters + self.allocations.values().sum::<f64>();
        self.updated_at = now;
    }
}

fn check_liters(what: &str, liters: f64) -> Result<()> {
    if liters.is_finite() && liters >= 0.0 {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "{what} must be a non-negative number, got {liters}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(total: f64, extra: f64) -> FuelLedgerRecord {
        FuelLedgerRecord::open("T705 DXY", "DO-1001", JourneyMeta::new(total, extra), Utc::now())
            .unwrap()
    }

    #[test]
    fn opens_with_full_balance_and_no_allocations() {
        let record = record(2200.0, 100.0);
        assert_eq!(record.balance(), 2300.0);
        assert!(record.allocations().is_empty());
        assert!(record.is_open());
    }

    #[test]
    fn debit_stores_negative_and_recomputes_balance() {
        let mut record = record(2200.0, 100.0);
        record.debit(LedgerField::DarGoing, 550.0, Utc::now()).unwrap();
        let balance = record.debit(LedgerField::MbeyaGoing, 450.0, Utc::now()).unwrap();

        assert_eq!(balance, 1300.0);
        assert_eq!(record.allocation(LedgerField::DarGoing), -550.0);
        assert_eq!(record.allocation(LedgerField::MbeyaGoing), -450.0);
        assert_eq!(record.consumed(), 1000.0);
    }

    #[test]
    fn debits_on_the_same_field_accumulate() {
        let mut record = record(2000.0, 0.0);
        record.debit(LedgerField::ZambiaReturn, 120.0, Utc::now()).unwrap();
        record.debit(LedgerField::ZambiaReturn, 80.0, Utc::now()).unwrap();
        assert_eq!(record.allocation(LedgerField::ZambiaReturn), -200.0);
        assert_eq!(record.balance(), 1800.0);
    }

    #[test]
    fn rejects_non_positive_dispense() {
        let mut record = record(2000.0, 0.0);
        for liters in [0.0, -10.0, f64::NAN] {
            let err = record.debit(LedgerField::DarGoing, liters, Utc::now()).unwrap_err();
            assert_eq!(err.kind(), fuelops_types::ErrorKind::Validation);
        }
        assert_eq!(record.balance(), 2000.0);
    }

    #[test]
    fn open_normalizes_truck_and_rejects_blank_fields() {
        let record = FuelLedgerRecord::open(" t705   dxy ", "DO-1", JourneyMeta::new(1.0, 0.0), Utc::now())
            .unwrap();
        assert_eq!(record.truck_no, "T705 DXY");

        assert!(FuelLedgerRecord::open("  ", "DO-1", JourneyMeta::default(), Utc::now()).is_err());
        assert!(FuelLedgerRecord::open("T1", " ", JourneyMeta::default(), Utc::now()).is_err());
        assert!(
            FuelLedgerRecord::open("T1", "DO-1", JourneyMeta::new(-5.0, 0.0), Utc::now()).is_err()
        );
    }

    #[test]
    fn close_is_one_shot_and_keeps_both_references() {
        let mut record = record(2000.0, 0.0);
        record.close("RD-77", Utc::now()).unwrap();
        assert!(!record.is_open());
        assert!(record.matches_order_ref("do-1001"));
        assert!(record.matches_order_ref("RD-77"));

        let err = record.close("RD-78", Utc::now()).unwrap_err();
        assert_eq!(err.kind(), fuelops_types::ErrorKind::Conflict);
    }

    #[test]
    fn delete_and_restore_toggle_open_state() {
        let mut record = record(2000.0, 0.0);
        record.mark_deleted(Utc::now()).unwrap();
        assert!(!record.is_open());
        assert!(record.mark_deleted(Utc::now()).is_err());
        record.restore(Utc::now()).unwrap();
        assert!(record.is_open());
    }

    #[test]
    fn serializes_allocations_by_column_name() {
        let mut record = record(1000.0, 0.0);
        record.debit(LedgerField::TdmGoing, 300.0, Utc::now()).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["allocations"]["tdmGoing"], -300.0);

        let back: FuelLedgerRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
