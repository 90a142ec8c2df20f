//! End-to-end runs of the fuelops binary against a temporary data directory

use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::tempdir;

fn fuelops(home: &Path, args: &[&str]) -> Output {
    let data_dir = home.join("data");
    Command::new(env!("CARGO_BIN_EXE_fuelops"))
        .args(args)
        .arg("--data-dir")
        .arg(&data_dir)
        .args(["--format", "json", "--actor", "clerk"])
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run fuelops")
}

fn json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "fuelops failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn journey_allocations_flow_through_the_binary() {
    let home = tempdir().unwrap();
    let opened = json(&fuelops(
        home.path(),
        &["journey", "open", "T705 DXY", "--do", "DO-1001", "--total-liters", "2200", "--extra-liters", "100"],
    ));
    assert_eq!(opened["balance"], 2300.0);

    let allocation = json(&fuelops(
        home.path(),
        &["journey", "allocate", "--truck", "t705 dxy", "--station", "LAKE NDOLA", "--liters", "550"],
    ));
    assert_eq!(allocation["balance"], 1750.0);

    let issued = json(&fuelops(
        home.path(),
        &[
            "lpo", "issue", "2356", "--station", "LAKE NDOLA", "--truck", "T705 DXY",
            "--do", "DO-1001", "--liters", "450", "--rate", "1.45",
        ],
    ));
    assert_eq!(issued["entry"]["display_class"], "normal");

    let fulfilled = json(&fuelops(
        home.path(),
        &["lpo", "fulfill", "2356", "--truck", "T705 DXY"],
    ));
    assert_eq!(fulfilled["balance"], 1300.0);

    let shown = json(&fuelops(home.path(), &["journey", "show", "--do", "DO-1001"]));
    assert_eq!(shown["balance"], 1300.0);
}

#[test]
fn cancellation_shows_in_the_report() {
    let home = tempdir().unwrap();
    json(&fuelops(
        home.path(),
        &["journey", "open", "T1 AAA", "--do", "DO-1", "--total-liters", "2000"],
    ));
    json(&fuelops(
        home.path(),
        &[
            "lpo", "issue", "2400", "--station", "LAKE NDOLA", "--truck", "T1 AAA",
            "--do", "DO-1", "--liters", "300", "--rate", "1.4",
        ],
    ));

    let info = json(&fuelops(home.path(), &["lpo", "cancel", "2400", "--truck", "T1 AAA"]));
    assert_eq!(info["cancelled_by"], "clerk");
    assert_eq!(info["station"], "CASH");

    let report = json(&fuelops(home.path(), &["lpo", "report", "2400"]));
    assert_eq!(report["is_fully_cancelled"], true);
    assert_eq!(report["cancelled_count"], 1);

    let again = fuelops(home.path(), &["lpo", "cancel", "2400", "--truck", "T1 AAA"]);
    assert!(!again.status.success());
    let error: Value = serde_json::from_slice(&again.stdout).unwrap();
    assert_eq!(error["kind"], "conflict");
}

#[test]
fn resolve_reports_how_the_station_matched() {
    let home = tempdir().unwrap();
    let resolution = json(&fuelops(
        home.path(),
        &["resolve", "LAKE KAPIRI", "--direction", "returning"],
    ));
    assert_eq!(resolution["checkpoint"], "ZAMBIA_KAPIRI");
    assert_eq!(resolution["source"], "heuristic");
}
