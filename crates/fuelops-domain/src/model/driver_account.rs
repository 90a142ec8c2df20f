//! Driver's account: fuel issued outside normal route allocations

use chrono::{DateTime, Utc};
use fuelops_types::{Error, Result};
use serde::{Deserialize, Serialize};

/// How the driver's account charge is recovered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    #[default]
    Cash,
    MobileMoney,
    BankTransfer,
    SalaryDeduction,
}

impl PaymentMode {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::MobileMoney => "Mobile money",
            PaymentMode::BankTransfer => "Bank transfer",
            PaymentMode::SalaryDeduction => "Salary deduction",
        }
    }
}

impl std::str::FromStr for PaymentMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "cash" => Ok(PaymentMode::Cash),
            "mobile_money" | "mobile" => Ok(PaymentMode::MobileMoney),
            "bank_transfer" | "bank" => Ok(PaymentMode::BankTransfer),
            "salary_deduction" | "deduction" => Ok(PaymentMode::SalaryDeduction),
            other => Err(Error::validation(format!("unknown payment mode: {other}"))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverAccountStatus {
    #[default]
    Pending,
    Settled,
    Disputed,
}

impl std::fmt::Display for DriverAccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverAccountStatus::Pending => write!(f, "pending"),
            DriverAccountStatus::Settled => write!(f, "settled"),
            DriverAccountStatus::Disputed => write!(f, "disputed"),
        }
    }
}

/// Fuel charged to a driver rather than to the route allocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverAccountEntry {
    pub id: String,
    pub truck_no: String,
    pub liters: f64,
    pub rate: f64,
    /// liters × rate
    pub amount: f64,
    pub station: String,
    /// Internal audit trail only; never rendered
    pub reference_do: String,
    pub lpo_no: String,
    #[serde(default)]
    pub payment_mode: PaymentMode,
    #[serde(default)]
    pub approved_by: Option<String>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status: DriverAccountStatus,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl DriverAccountEntry {
    /// pending -> settled, disputed -> settled
    pub fn settle(&mut self, approver: &str, now: DateTime<Utc>) -> Result<()> {
        let approver = approver.trim();
        if approver.is_empty() {
            return Err(Error::validation("an approver is required to settle"));
        }
        if self.status == DriverAccountStatus::Settled {
            return Err(Error::conflict(format!(
                "driver account entry {} is already settled",
                self.id
            )));
        }
        self.status = DriverAccountStatus::Settled;
        self.approved_by = Some(approver.to_string());
        self.resolved_at = Some(now);
        Ok(())
    }

    /// pending -> disputed
    pub fn dispute(&mut self, note: Option<&str>, now: DateTime<Utc>) -> Result<()> {
        if self.status != DriverAccountStatus::Pending {
            return Err(Error::conflict(format!(
                "driver account entry {} is {}, only pending entries can be disputed",
                self.id, self.status
            )));
        }
        self.status = DriverAccountStatus::Disputed;
        if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
            self.notes = Some(match self.notes.take() {
                Some(existing) => format!("{existing}\n{note}"),
                None => note.to_string(),
            });
        }
        self.resolved_at = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> DriverAccountEntry {
        DriverAccountEntry {
            id: "da-1".to_string(),
            truck_no: "T705 DXY".to_string(),
            liters: 100.0,
            rate: 1.5,
            amount: 150.0,
            station: "LAKE NDOLA".to_string(),
            reference_do: "DO-1".to_string(),
            lpo_no: "2356".to_string(),
            payment_mode: PaymentMode::Cash,
            approved_by: None,
            driver_name: None,
            notes: None,
            created_by: "ops".to_string(),
            created_at: Utc::now(),
            status: DriverAccountStatus::Pending,
            resolved_at: None,
        }
    }

    #[test]
    fn disputed_entries_can_still_be_settled() {
        let mut entry = entry();
        entry.dispute(Some("driver denies the fill"), Utc::now()).unwrap();
        assert_eq!(entry.status, DriverAccountStatus::Disputed);
        assert_eq!(entry.notes.as_deref(), Some("driver denies the fill"));

        entry.settle("manager", Utc::now()).unwrap();
        assert_eq!(entry.status, DriverAccountStatus::Settled);
        assert_eq!(entry.approved_by.as_deref(), Some("manager"));
    }

    #[test]
    fn settled_is_terminal() {
        let mut entry = entry();
        entry.settle("manager", Utc::now()).unwrap();
        assert_eq!(
            entry.settle("manager", Utc::now()).unwrap_err().kind(),
            fuelops_types::ErrorKind::Conflict
        );
        assert!(entry.dispute(None, Utc::now()).is_err());
    }

    #[test]
    fn settle_requires_an_approver() {
        let mut entry = entry();
        assert!(entry.settle("  ", Utc::now()).is_err());
        assert_eq!(entry.status, DriverAccountStatus::Pending);
    }

    #[test]
    fn payment_mode_parses_loose_spellings() {
        assert_eq!("Mobile Money".parse::<PaymentMode>().unwrap(), PaymentMode::MobileMoney);
        assert_eq!("bank-transfer".parse::<PaymentMode>().unwrap(), PaymentMode::BankTransfer);
        assert!("barter".parse::<PaymentMode>().is_err());
    }
}
