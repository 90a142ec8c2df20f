//! Output formatting module

use fuelops_app::app::{Allocation, FormulaCheck, IssueOutcome, SavedStation};
use fuelops_domain::service::{
    CancellationReport, DisplayClass, EntryDisplay, LedgerColumn, Resolution,
};
use fuelops_domain::{
    CancellationInfo, DriverAccountEntry, FuelLedgerRecord, LedgerField, LpoDocument,
    StationConfig,
};
use fuelops_types::{Direction, OutputFormat, Result};
use serde::Serialize;

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    println!("{}", content);
    Ok(())
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let truncated: String = s.chars().take(max_len.saturating_sub(2)).collect();
        format!("{}..", truncated)
    } else {
        s.to_string()
    }
}

pub fn output_record(output_format: OutputFormat, record: &FuelLedgerRecord) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(record);
    }

    println!("\nJourney {}", record.id);
    println!("========================================");
    println!("Truck:          {}", record.truck_no);
    println!("Going order:    {}", record.going_do);
    println!("Return order:   {}", record.return_do().unwrap_or("-"));
    if let Some(date) = record.date {
        println!("Date:           {}", date);
    }
    if let (Some(origin), Some(destination)) = (&record.origin, &record.destination) {
        println!("Route:          {} -> {}", origin, destination);
    }
    let status = if record.is_deleted() {
        "deleted"
    } else if record.is_open() {
        "open"
    } else {
        "closed"
    };
    println!("Status:         {}", status);
    println!("Total liters:   {:.1}", record.total_liters());
    println!("Extra liters:   {:.1}", record.extra_liters());

    for direction in Direction::ALL {
        let fields: Vec<_> = LedgerField::ALL
            .into_iter()
            .filter(|f| f.direction() == direction && record.allocation(*f) != 0.0)
            .collect();
        if fields.is_empty() {
            continue;
        }
        println!("\n--- {} ---", direction.label());
        for field in fields {
            println!("{:<16}{:>10.1}", field.label(), record.allocation(field));
        }
    }
    println!("----------------------------------------");
    println!("Balance:        {:.1}", record.balance());
    Ok(())
}

pub fn output_history(output_format: OutputFormat, records: &[FuelLedgerRecord]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(records);
    }
    if records.is_empty() {
        println!("No journeys found");
        return Ok(());
    }

    println!(
        "{:<38} {:<12} {:<12} {:<12} {:>10}",
        "Id", "Truck", "Going DO", "Return DO", "Balance"
    );
    println!("{}", "-".repeat(88));
    for record in records {
        println!(
            "{:<38} {:<12} {:<12} {:<12} {:>10.1}",
            record.id,
            truncate_str(&record.truck_no, 11),
            truncate_str(&record.going_do, 11),
            truncate_str(record.return_do().unwrap_or("-"), 11),
            record.balance()
        );
    }
    Ok(())
}

pub fn output_allocation(output_format: OutputFormat, allocation: &Allocation) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(allocation);
    }
    println!(
        "{} {:.1} L at {} ({}), balance {:.1}",
        allocation.truck_no,
        allocation.liters,
        allocation.checkpoint.label(),
        allocation.field,
        allocation.balance
    );
    if allocation.resolution.source.is_degraded() {
        println!("Note: station matched by {:?} rule", allocation.resolution.source);
    }
    Ok(())
}

pub fn output_resolution(
    output_format: OutputFormat,
    station: &str,
    direction: Direction,
    resolution: &Resolution,
) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(resolution);
    }
    println!("Station:     {}", station);
    println!("Direction:   {}", direction);
    println!("Checkpoint:  {} ({})", resolution.checkpoint.label(), resolution.checkpoint.code());
    println!("Field:       {}", resolution.checkpoint.field());
    println!("Matched by:  {:?}", resolution.source);
    Ok(())
}

fn print_entries(rows: &[EntryDisplay]) {
    println!(
        "{:<3} {:<12} {:<12} {:<14} {:>9} {:>7} {:>11}  {}",
        "#", "Truck", "DO", "Destination", "Liters", "Rate", "Amount", "State"
    );
    println!("{}", "-".repeat(86));
    for (i, row) in rows.iter().enumerate() {
        let state = match row.display_class {
            DisplayClass::Normal if row.posted => "Dispensed",
            DisplayClass::Normal => "Planned",
            DisplayClass::Cancelled => "Cancelled",
            DisplayClass::DriverAccount => "Driver's account",
        };
        println!(
            "{:<3} {:<12} {:<12} {:<14} {:>9.1} {:>7.3} {:>11.2}  {}",
            i,
            truncate_str(&row.truck_no, 11),
            truncate_str(&row.order_ref, 11),
            truncate_str(&row.destination, 13),
            row.liters,
            row.rate,
            row.amount,
            state
        );
    }
}

#[derive(Serialize)]
struct LpoView<'a> {
    lpo_no: &'a str,
    station: &'a str,
    direction: Direction,
    date: chrono::NaiveDate,
    created_by: &'a str,
    total_liters: f64,
    total_amount: f64,
    entries: &'a [EntryDisplay],
}

/// Entries are always rendered through their display form
pub fn output_lpo(output_format: OutputFormat, lpo: &LpoDocument, rows: &[EntryDisplay]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(&LpoView {
            lpo_no: &lpo.lpo_no,
            station: &lpo.station,
            direction: lpo.direction,
            date: lpo.date,
            created_by: &lpo.created_by,
            total_liters: lpo.total_liters(),
            total_amount: lpo.total_amount(),
            entries: rows,
        });
    }

    println!("\nLPO {}  {}  ({}, {})", lpo.lpo_no, lpo.station, lpo.direction, lpo.date);
    println!("{}", "=".repeat(86));
    print_entries(rows);
    println!("{}", "-".repeat(86));
    println!(
        "Payable: {:.1} L, {:.2} ({} active, {} cancelled)",
        lpo.total_liters(),
        lpo.total_amount(),
        lpo.active_count(),
        lpo.cancelled_count()
    );
    Ok(())
}

pub fn output_lpo_list(output_format: OutputFormat, lpos: &[LpoDocument]) -> Result<()> {
    if output_format == OutputFormat::Json {
        let summary: Vec<_> = lpos
            .iter()
            .map(|l| {
                serde_json::json!({
                    "lpo_no": l.lpo_no,
                    "station": l.station,
                    "direction": l.direction,
                    "date": l.date,
                    "entries": l.entries.len(),
                    "active": l.active_count(),
                    "cancelled": l.cancelled_count(),
                    "total_amount": l.total_amount(),
                })
            })
            .collect();
        return print_json(&summary);
    }
    if lpos.is_empty() {
        println!("No LPOs found");
        return Ok(());
    }

    println!(
        "{:<10} {:<20} {:<10} {:<11} {:>7} {:>9} {:>12}",
        "LPO", "Station", "Direction", "Date", "Active", "Cancelled", "Amount"
    );
    println!("{}", "-".repeat(85));
    for lpo in lpos {
        println!(
            "{:<10} {:<20} {:<10} {:<11} {:>7} {:>9} {:>12.2}",
            truncate_str(&lpo.lpo_no, 9),
            truncate_str(&lpo.station, 19),
            lpo.direction,
            lpo.date,
            lpo.active_count(),
            lpo.cancelled_count(),
            lpo.total_amount()
        );
    }
    Ok(())
}

pub fn output_issue(output_format: OutputFormat, outcome: &IssueOutcome, rows: &[EntryDisplay]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "lpo_no": outcome.lpo.lpo_no,
            "entry_index": outcome.entry_index,
            "entry": rows.get(outcome.entry_index),
            "driver_account_id": outcome.driver_account.as_ref().map(|a| a.id.as_str()),
        }));
    }
    println!("LPO {} entry {} recorded", outcome.lpo.lpo_no, outcome.entry_index);
    match &outcome.driver_account {
        Some(account) => println!(
            "Charged to driver's account {} ({:.2})",
            account.id, account.amount
        ),
        None if outcome.lpo.entries[outcome.entry_index].is_cancelled() => {
            println!("Diverted to cash; ledger not changed")
        }
        None => println!("Planned; run `lpo fulfill` once the fuel is dispensed"),
    }
    Ok(())
}

pub fn output_cancellation(output_format: OutputFormat, lpo_no: &str, truck_no: &str, info: &CancellationInfo) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(info);
    }
    println!("Cancelled {} on LPO {} at {}", truck_no, lpo_no, info.checkpoint.label());
    println!("Station:   {}", info.station);
    println!("Reason:    {}", info.reason);
    if let Some(cash_lpo) = &info.cash_lpo {
        println!("Cash LPO:  {}", cash_lpo);
    }
    Ok(())
}

pub fn output_report(output_format: OutputFormat, report: &CancellationReport) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(report);
    }
    println!("{}", report.text);
    Ok(())
}

pub fn output_statement(output_format: OutputFormat, statement: &str) -> Result<()> {
    if output_format == OutputFormat::Json {
        let lines: Vec<_> = statement.lines().collect();
        return print_json(&serde_json::json!({ "statement": lines }));
    }
    println!("{}", statement);
    Ok(())
}

pub fn output_driver_accounts(output_format: OutputFormat, entries: &[DriverAccountEntry]) -> Result<()> {
    if output_format == OutputFormat::Json {
        // The reference order is internal and never leaves the store
        let shown: Vec<_> = entries
            .iter()
            .map(|e| {
                serde_json::json!({
                    "id": e.id,
                    "truck_no": e.truck_no,
                    "liters": e.liters,
                    "rate": e.rate,
                    "amount": e.amount,
                    "station": e.station,
                    "lpo_no": e.lpo_no,
                    "payment_mode": e.payment_mode,
                    "driver_name": e.driver_name,
                    "status": e.status,
                    "created_at": e.created_at,
                })
            })
            .collect();
        return print_json(&shown);
    }
    if entries.is_empty() {
        println!("No driver's account entries");
        return Ok(());
    }

    println!(
        "{:<38} {:<12} {:>8} {:>10} {:<16} {:<9}",
        "Id", "Truck", "Liters", "Amount", "Payment", "Status"
    );
    println!("{}", "-".repeat(98));
    for e in entries {
        println!(
            "{:<38} {:<12} {:>8.1} {:>10.2} {:<16} {:<9}",
            e.id,
            truncate_str(&e.truck_no, 11),
            e.liters,
            e.amount,
            e.payment_mode.label(),
            e.status
        );
    }
    Ok(())
}

pub fn output_stations(output_format: OutputFormat, stations: &[StationConfig]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(stations);
    }
    if stations.is_empty() {
        println!("No stations configured");
        return Ok(());
    }

    println!(
        "{:<22} {:<7} {:>8} {:>8} {:<14} {:<14}",
        "Station", "Active", "Go rate", "Ret rate", "Go field", "Ret field"
    );
    println!("{}", "-".repeat(78));
    let rate = |r: Option<f64>| r.map(|r| format!("{r:.3}")).unwrap_or_else(|| "-".to_string());
    let field = |f: Option<LedgerField>| f.map(|f| f.name()).unwrap_or("-");
    for s in stations {
        println!(
            "{:<22} {:<7} {:>8} {:>8} {:<14} {:<14}",
            truncate_str(&s.name, 21),
            if s.active { "yes" } else { "no" },
            rate(s.going.rate),
            rate(s.returning.rate),
            field(s.going.custom_field),
            field(s.returning.custom_field)
        );
    }
    Ok(())
}

pub fn output_saved_stations(output_format: OutputFormat, saved: &[SavedStation]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(saved);
    }
    for s in saved {
        println!("Saved station {}", s.station.name);
        for warning in &s.warnings {
            println!("  Warning: {}", warning);
        }
    }
    Ok(())
}

pub fn output_columns(output_format: OutputFormat, direction: Direction, columns: &[LedgerColumn]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(columns);
    }
    println!("{} columns", direction.label());
    for column in columns {
        println!("  {:<14} {}", column.field.name(), column.label);
    }
    Ok(())
}

pub fn output_formula(output_format: OutputFormat, check: &FormulaCheck) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(check);
    }
    match &check.validation.error {
        None => println!("Formula is valid"),
        Some(error) => println!("Invalid formula: {}", error),
    }
    if !check.unknown_identifiers.is_empty() {
        println!("Unknown variables: {}", check.unknown_identifiers.join(", "));
    }
    Ok(())
}
