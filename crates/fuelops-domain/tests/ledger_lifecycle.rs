use std::sync::Mutex;

use chrono::{DateTime, Utc};
use fuelops_domain::service::{CheckpointCatalog, LedgerLifecycle};
use fuelops_domain::{
    Checkpoint, FuelLedgerRecord, JourneyMeta, LedgerField, LedgerRepository, MemoryAuditSink,
};
use fuelops_types::{Direction, Error, ErrorKind, Result};

/// Vec-backed repository with the same locking contract as the file repos
#[derive(Default)]
struct InMemoryLedger {
    records: Mutex<Vec<FuelLedgerRecord>>,
}

impl InMemoryLedger {
    fn mutate(
        &self,
        id: &str,
        change: impl FnOnce(&mut FuelLedgerRecord) -> Result<()>,
    ) -> Result<FuelLedgerRecord> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id && !r.is_deleted())
            .ok_or_else(|| Error::not_found(format!("ledger record {id}")))?;
        let mut updated = record.clone();
        change(&mut updated)?;
        *record = updated.clone();
        Ok(updated)
    }
}

impl LedgerRepository for InMemoryLedger {
    fn create_open(&self, record: FuelLedgerRecord) -> Result<FuelLedgerRecord> {
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.truck_no == record.truck_no && r.is_open()) {
            return Err(Error::conflict(format!("{} already open", record.truck_no)));
        }
        records.push(record.clone());
        Ok(record)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<FuelLedgerRecord>> {
        Ok(self.records.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    fn find_by_truck(&self, truck_no: &str) -> Result<Vec<FuelLedgerRecord>> {
        let mut found: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.truck_no == truck_no && !r.is_deleted())
            .cloned()
            .collect();
        found.reverse();
        Ok(found)
    }

    fn find_open_by_truck(&self, truck_no: &str) -> Result<Option<FuelLedgerRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.truck_no == truck_no && r.is_open())
            .cloned())
    }

    fn find_by_order_ref(&self, order_ref: &str) -> Result<Option<FuelLedgerRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| !r.is_deleted() && r.matches_order_ref(order_ref))
            .cloned())
    }

    fn apply_allocation(
        &self,
        id: &str,
        field: LedgerField,
        liters: f64,
        at: DateTime<Utc>,
    ) -> Result<FuelLedgerRecord> {
        self.mutate(id, |r| r.debit(field, liters, at).map(|_| ()))
    }

    fn add_extra(&self, id: &str, liters: f64, at: DateTime<Utc>) -> Result<FuelLedgerRecord> {
        self.mutate(id, |r| r.add_extra(liters, at).map(|_| ()))
    }

    fn attach_return(&self, id: &str, return_do: &str, at: DateTime<Utc>) -> Result<FuelLedgerRecord> {
        self.mutate(id, |r| r.close(return_do, at))
    }

    fn soft_delete(&self, id: &str, at: DateTime<Utc>) -> Result<FuelLedgerRecord> {
        self.mutate(id, |r| r.mark_deleted(at))
    }

    fn restore(&self, id: &str, at: DateTime<Utc>) -> Result<FuelLedgerRecord> {
        let mut records = self.records.lock().unwrap();
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Error::not_found(id.to_string()))?;
        let truck_no = records[index].truck_no.clone();
        if records.iter().any(|r| r.truck_no == truck_no && r.is_open()) {
            return Err(Error::conflict(format!("{truck_no} already open")));
        }
        records[index].restore(at)?;
        Ok(records[index].clone())
    }
}

fn meta() -> JourneyMeta {
    JourneyMeta::new(2200.0, 100.0)
}

#[test_log::test]
fn scenario_balance_after_two_allocations() {
    let repo = InMemoryLedger::default();
    let audit = MemoryAuditSink::new();
    let ledger = LedgerLifecycle::new(&repo, &audit);

    let record = ledger
        .open_journey("T705 DXY", "DO-1001", meta(), Utc::now())
        .unwrap();
    assert_eq!(record.balance(), 2300.0);

    ledger
        .apply_allocation(&record.id, Checkpoint::DarGoing, 550.0, Utc::now())
        .unwrap();
    let balance = ledger
        .apply_allocation(&record.id, Checkpoint::MbeyaGoing, 450.0, Utc::now())
        .unwrap();
    assert_eq!(balance, 1300.0);

    let stored = ledger.find(&record.id).unwrap();
    let sum: f64 = stored.allocations().values().sum();
    assert_eq!(stored.balance(), stored.total_liters() + stored.extra_liters() + sum);
    assert!(stored.allocations().values().all(|v| *v <= 0.0));
    assert_eq!(
        audit.names(),
        vec!["journey_opened", "allocation_applied", "allocation_applied"]
    );
}

#[test]
fn second_open_journey_for_the_same_truck_conflicts() {
    let repo = InMemoryLedger::default();
    let audit = MemoryAuditSink::new();
    let ledger = LedgerLifecycle::new(&repo, &audit);

    ledger.open_journey("T705 DXY", "DO-1", meta(), Utc::now()).unwrap();
    let err = ledger
        .open_journey("t705  dxy", "DO-2", meta(), Utc::now())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    ledger.open_journey("T706 DXY", "DO-3", meta(), Utc::now()).unwrap();
}

#[test]
fn closing_frees_the_truck_and_keeps_both_references_findable() {
    let repo = InMemoryLedger::default();
    let audit = MemoryAuditSink::new();
    let ledger = LedgerLifecycle::new(&repo, &audit);

    let first = ledger.open_journey("T705 DXY", "DO-1", meta(), Utc::now()).unwrap();
    ledger.attach_return(&first.id, "RD-1", Utc::now()).unwrap();
    assert!(ledger.find_open_by_truck("T705 DXY").unwrap().is_none());
    assert_eq!(ledger.find_by_order_ref("rd-1").unwrap().unwrap().id, first.id);
    assert_eq!(ledger.find_by_order_ref("DO-1").unwrap().unwrap().id, first.id);

    let err = ledger.attach_return(&first.id, "RD-2", Utc::now()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let second = ledger.open_journey("T705 DXY", "DO-2", meta(), Utc::now()).unwrap();
    let history = ledger.history_for_truck("t705 dxy").unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, second.id);
}

#[test]
fn restore_refuses_a_second_open_record() {
    let repo = InMemoryLedger::default();
    let audit = MemoryAuditSink::new();
    let ledger = LedgerLifecycle::new(&repo, &audit);

    let first = ledger.open_journey("T705 DXY", "DO-1", meta(), Utc::now()).unwrap();
    ledger.soft_delete(&first.id, Utc::now()).unwrap();
    let err = ledger
        .apply_allocation(&first.id, Checkpoint::DarGoing, 10.0, Utc::now())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let second = ledger.open_journey("T705 DXY", "DO-2", meta(), Utc::now()).unwrap();
    let err = ledger.restore(&first.id, Utc::now()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    ledger.soft_delete(&second.id, Utc::now()).unwrap();
    let restored = ledger.restore(&first.id, Utc::now()).unwrap();
    assert!(restored.is_open());
}

#[test]
fn top_up_and_sub_stops_accumulate_on_one_field() {
    let repo = InMemoryLedger::default();
    let audit = MemoryAuditSink::new();
    let ledger = LedgerLifecycle::new(&repo, &audit);
    let catalog = CheckpointCatalog::builtin();

    let record = ledger
        .open_journey("T705 DXY", "DO-1", JourneyMeta::new(2000.0, 0.0), Utc::now())
        .unwrap();
    let ndola = catalog.resolve("LAKE NDOLA", Direction::Returning);
    let kapiri = catalog.resolve("LAKE KAPIRI", Direction::Returning);
    ledger.apply_allocation(&record.id, ndola, 120.0, Utc::now()).unwrap();
    ledger.apply_allocation(&record.id, kapiri, 80.0, Utc::now()).unwrap();
    let balance = ledger.add_extra_liters(&record.id, 50.0, Utc::now()).unwrap();

    let stored = ledger.find(&record.id).unwrap();
    assert_eq!(stored.allocation(LedgerField::ZambiaReturn), -200.0);
    assert_eq!(balance, 1850.0);
    assert!(ledger
        .apply_allocation(&record.id, kapiri, -5.0, Utc::now())
        .is_err());
}
