//! LPO documents and their per-truck entries

use chrono::{DateTime, NaiveDate, Utc};
use fuelops_types::Direction;
use serde::{Deserialize, Serialize};

use super::checkpoint::Checkpoint;
use super::ledger_record::normalize_truck_no;

/// Metadata stamped on an entry when its planned fulfillment is cancelled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationInfo {
    /// Checkpoint whose fulfillment was cancelled
    pub checkpoint: Checkpoint,
    /// Where the fuel was actually taken (free text)
    pub station: String,
    pub cancelled_at: DateTime<Utc>,
    pub cancelled_by: String,
    pub reason: String,
    #[serde(default)]
    pub original_lpo: Option<String>,
    /// Replacement cash / driver-account LPO
    #[serde(default)]
    pub cash_lpo: Option<String>,
}

/// Ledger write made when an active entry's fuel was dispensed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub record_id: String,
    pub checkpoint: Checkpoint,
    pub liters: f64,
    pub posted_at: DateTime<Utc>,
}

/// Lifecycle state of an entry. Each variant carries only what it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryState {
    Active,
    Cancelled(CancellationInfo),
    DriverAccount { account_entry_id: String },
}

/// One truck's line within an LPO document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LpoEntry {
    pub truck_no: String,
    /// Delivery order the fuel is issued against
    pub order_ref: String,
    pub destination: String,
    pub liters: f64,
    pub rate: f64,
    pub state: EntryState,
    /// Set once the entry's allocation is on the ledger; a posted entry
    /// can no longer be cancelled
    #[serde(default)]
    pub posting: Option<Posting>,
}

impl LpoEntry {
    pub fn active(
        truck_no: &str,
        order_ref: impl Into<String>,
        destination: impl Into<String>,
        liters: f64,
        rate: f64,
    ) -> Self {
        Self {
            truck_no: normalize_truck_no(truck_no),
            order_ref: order_ref.into(),
            destination: destination.into(),
            liters,
            rate,
            state: EntryState::Active,
            posting: None,
        }
    }

    pub fn amount(&self) -> f64 {
        self.liters * self.rate
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, EntryState::Active)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.state, EntryState::Cancelled(_))
    }

    pub fn is_driver_account(&self) -> bool {
        matches!(self.state, EntryState::DriverAccount { .. })
    }

    pub fn is_posted(&self) -> bool {
        self.posting.is_some()
    }

    pub fn cancellation(&self) -> Option<&CancellationInfo> {
        match &self.state {
            EntryState::Cancelled(info) => Some(info),
            _ => None,
        }
    }
}

/// A fuel purchase order issued to one station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LpoDocument {
    pub lpo_no: String,
    pub station: String,
    pub direction: Direction,
    pub date: NaiveDate,
    #[serde(default)]
    pub entries: Vec<LpoEntry>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl LpoDocument {
    pub fn new(
        lpo_no: impl Into<String>,
        station: impl Into<String>,
        direction: Direction,
        date: NaiveDate,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            lpo_no: lpo_no.into().trim().to_string(),
            station: station.into().trim().to_string(),
            direction,
            date,
            entries: Vec::new(),
            created_by: created_by.into(),
            created_at: Utc::now(),
        }
    }

    pub fn with_entry(mut self, entry: LpoEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Index of the entry for `truck_no`, preferring an active one
    pub fn entry_index(&self, truck_no: &str) -> Option<usize> {
        let truck_no = normalize_truck_no(truck_no);
        let mut candidates = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.truck_no == truck_no);
        let first = candidates.next()?;
        if first.1.is_active() {
            return Some(first.0);
        }
        candidates
            .find(|(_, e)| e.is_active())
            .map(|(i, _)| i)
            .or(Some(first.0))
    }

    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_active()).count()
    }

    pub fn cancelled_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_cancelled()).count()
    }

    /// Amount payable to the station: active entries only
    pub fn total_amount(&self) -> f64 {
        self.entries
            .iter()
            .filter(|e| e.is_active())
            .map(LpoEntry::amount)
            .sum()
    }

    pub fn total_liters(&self) -> f64 {
        self.entries
            .iter()
            .filter(|e| e.is_active())
            .map(|e| e.liters)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cancelled(truck: &str) -> LpoEntry {
        let mut entry = LpoEntry::active(truck, "DO-1", "LUBUMBASHI", 100.0, 1.2);
        entry.state = EntryState::Cancelled(CancellationInfo {
            checkpoint: Checkpoint::ZambiaGoing,
            station: "CASH".to_string(),
            cancelled_at: Utc::now(),
            cancelled_by: "ops".to_string(),
            reason: "diverted".to_string(),
            original_lpo: None,
            cash_lpo: Some("C-9".to_string()),
        });
        entry
    }

    #[test]
    fn entry_index_prefers_active_entry() {
        let lpo = LpoDocument::new("2356", "LAKE NDOLA", Direction::Going, NaiveDate::MIN, "ops")
            .with_entry(cancelled("T1 AAA"))
            .with_entry(LpoEntry::active("t1 aaa", "DO-2", "NDOLA", 200.0, 1.2));
        assert_eq!(lpo.entry_index("T1  AAA"), Some(1));
        assert_eq!(lpo.entry_index("T9"), None);
    }

    #[test]
    fn totals_skip_cancelled_entries() {
        let lpo = LpoDocument::new("2356", "LAKE NDOLA", Direction::Going, NaiveDate::MIN, "ops")
            .with_entry(cancelled("T1 AAA"))
            .with_entry(LpoEntry::active("T2 BBB", "DO-2", "NDOLA", 200.0, 1.5));
        assert_eq!(lpo.active_count(), 1);
        assert_eq!(lpo.cancelled_count(), 1);
        assert_eq!(lpo.total_amount(), 300.0);
        assert_eq!(lpo.total_liters(), 200.0);
    }

    #[test]
    fn state_serializes_with_a_status_tag() {
        let json = serde_json::to_value(cancelled("T1 AAA")).unwrap();
        assert_eq!(json["state"]["status"], "cancelled");
        assert_eq!(json["state"]["checkpoint"], "ZAMBIA_GOING");

        let back: LpoEntry = serde_json::from_value(json).unwrap();
        assert!(back.is_cancelled());
    }
}
