//! Cancellation reports for LPO documents

use serde::Serialize;

use crate::model::LpoDocument;

/// One cancelled truck line of a partially cancelled LPO
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CancelledLine {
    pub truck_no: String,
    pub checkpoint_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CancellationReport {
    pub lpo_no: String,
    pub active_count: usize,
    pub cancelled_count: usize,
    pub is_fully_cancelled: bool,
    pub cancelled: Vec<CancelledLine>,
    pub text: String,
}

impl CancellationReport {
    pub fn is_partially_cancelled(&self) -> bool {
        !self.is_fully_cancelled && self.cancelled_count > 0
    }

    fn lines(&self) -> String {
        self.cancelled
            .iter()
            .map(|line| format!("{} @ {}", line.truck_no, line.checkpoint_label))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Summarize one document snapshot
pub fn report_for(lpo: &LpoDocument) -> CancellationReport {
    let cancelled: Vec<CancelledLine> = lpo
        .entries
        .iter()
        .filter_map(|entry| {
            entry.cancellation().map(|info| CancelledLine {
                truck_no: entry.truck_no.clone(),
                checkpoint_label: info.checkpoint.label().to_string(),
            })
        })
        .collect();
    let active_count = lpo.active_count();
    let cancelled_count = cancelled.len();
    let is_fully_cancelled = active_count == 0 && cancelled_count > 0;

    let mut report = CancellationReport {
        lpo_no: lpo.lpo_no.clone(),
        active_count,
        cancelled_count,
        is_fully_cancelled,
        cancelled,
        text: String::new(),
    };
    report.text = if is_fully_cancelled {
        let noun = if cancelled_count == 1 { "entry" } else { "entries" };
        format!(
            "LPO {} fully cancelled: {} {} cancelled",
            report.lpo_no, cancelled_count, noun
        )
    } else if cancelled_count > 0 {
        format!("LPO {} partially cancelled: {}", report.lpo_no, report.lines())
    } else {
        format!("LPO {} has no cancellations", report.lpo_no)
    };
    report
}

/// Combine reports into a statement, keeping the supplied order
pub fn statement_for(reports: &[CancellationReport]) -> String {
    let fully: Vec<&str> = reports
        .iter()
        .filter(|r| r.is_fully_cancelled)
        .map(|r| r.lpo_no.as_str())
        .collect();

    let mut lines = Vec::new();
    if !fully.is_empty() {
        lines.push(format!("Fully cancelled LPOs: {}", fully.join(", ")));
    }
    for report in reports.iter().filter(|r| r.is_partially_cancelled()) {
        lines.push(format!("LPO {}: {}", report.lpo_no, report.lines()));
    }

    if lines.is_empty() {
        "No cancellations".to_string()
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use fuelops_types::Direction;
    use similar_asserts::assert_eq;

    use super::*;
    use crate::model::{CancellationInfo, Checkpoint, EntryState, LpoEntry};

    fn entry(truck: &str, cancelled_at: Option<Checkpoint>) -> LpoEntry {
        let mut entry = LpoEntry::active(truck, "DO-1", "NDOLA", 300.0, 1.4);
        if let Some(checkpoint) = cancelled_at {
            entry.state = EntryState::Cancelled(CancellationInfo {
                checkpoint,
                station: "CASH".to_string(),
                cancelled_at: Utc::now(),
                cancelled_by: "ops".to_string(),
                reason: "diverted".to_string(),
                original_lpo: None,
                cash_lpo: None,
            });
        }
        entry
    }

    fn lpo(no: &str, entries: Vec<LpoEntry>) -> LpoDocument {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let mut lpo = LpoDocument::new(no, "LAKE KAPIRI", Direction::Going, date, "ops");
        lpo.entries = entries;
        lpo
    }

    #[test]
    fn three_cancelled_entries_make_a_full_cancellation() {
        let report = report_for(&lpo(
            "2356",
            vec![
                entry("T1 AAA", Some(Checkpoint::ZambiaGoing)),
                entry("T2 BBB", Some(Checkpoint::ZambiaGoing)),
                entry("T3 CCC", Some(Checkpoint::ZambiaGoing)),
            ],
        ));
        assert!(report.is_fully_cancelled);
        assert_eq!(report.text, "LPO 2356 fully cancelled: 3 entries cancelled");
    }

    #[test]
    fn single_cancelled_entry_uses_singular() {
        let report = report_for(&lpo("7", vec![entry("T1 AAA", Some(Checkpoint::TdmReturn))]));
        assert_eq!(report.text, "LPO 7 fully cancelled: 1 entry cancelled");
    }

    #[test]
    fn partial_cancellation_names_truck_and_checkpoint() {
        let report = report_for(&lpo(
            "2357",
            vec![
                entry("T1 AAA", None),
                entry("T2 BBB", Some(Checkpoint::ZambiaGoing)),
                entry("T3 CCC", None),
            ],
        ));
        assert!(!report.is_fully_cancelled);
        assert_eq!(report.text, "LPO 2357 partially cancelled: T2 BBB @ Zambia Going");
    }

    #[test]
    fn empty_and_active_documents_have_no_cancellations() {
        assert_eq!(report_for(&lpo("1", vec![])).text, "LPO 1 has no cancellations");
        assert_eq!(
            report_for(&lpo("2", vec![entry("T1", None)])).text,
            "LPO 2 has no cancellations"
        );
    }

    #[test]
    fn statement_lists_full_then_partial_in_order() {
        let reports = vec![
            report_for(&lpo("10", vec![entry("T1 AAA", None), entry("T2 BBB", Some(Checkpoint::MbeyaGoing))])),
            report_for(&lpo("11", vec![entry("T3 CCC", Some(Checkpoint::ZambiaGoing))])),
            report_for(&lpo("12", vec![entry("T4 DDD", None)])),
            report_for(&lpo("13", vec![entry("T5 EEE", Some(Checkpoint::TdmGoing))])),
        ];
        assert_eq!(
            statement_for(&reports),
            "Fully cancelled LPOs: 11, 13\nLPO 10: T2 BBB @ Mbeya Going"
        );
    }

    #[test]
    fn statement_without_cancellations() {
        let reports = vec![report_for(&lpo("12", vec![entry("T4 DDD", None)]))];
        assert_eq!(statement_for(&reports), "No cancellations");
        assert_eq!(statement_for(&[]), "No cancellations");
    }
}
