use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[test]
fn test_malformed_csv_handling() {
    let output_path = std::path::PathBuf::from("robustness_test.csv");
    let mut wtr = csv::Writer::from_path(&output_path).unwrap();
    wtr.write_record(common::EVENT_HEADER).unwrap();

    // Valid listing and request
    wtr.write_record(["list_item", "10", "", "1", "6.0", "", "", "", "tools", "", "Drill"])
        .unwrap();
    wtr.write_record([
        "request",
        "20",
        "100",
        "1",
        "",
        "3",
        "2025-03-01",
        "",
        "",
        "",
        "",
    ])
    .unwrap();
    // Unknown event type
    wtr.write_record(["teleport", "20", "100", "", "", "", "", "", "", "", ""])
        .unwrap();
    // Non-numeric actor
    wtr.write_record(["accept", "abc", "100", "", "", "", "", "", "", "", ""])
        .unwrap();
    // Valid acceptance after the bad rows
    wtr.write_record(["accept", "10", "100", "", "", "", "", "", "", "", ""])
        .unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let mut cmd = Command::new(cargo_bin!("campuslend"));
    cmd.arg(&output_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading event"))
        .stdout(predicate::str::contains("100,1,20,10,accepted,6,3,18,false"));

    std::fs::remove_file(output_path).ok();
}

#[test]
fn test_invalid_field_values() {
    let output_path = std::path::PathBuf::from("invalid_values_test.csv");
    let mut wtr = csv::Writer::from_path(&output_path).unwrap();
    wtr.write_record(common::EVENT_HEADER).unwrap();

    wtr.write_record(["list_item", "10", "", "1", "6.0", "", "", "", "tools", "", "Drill"])
        .unwrap();
    wtr.write_record([
        "request",
        "20",
        "100",
        "1",
        "",
        "3",
        "2025-03-01",
        "",
        "",
        "",
        "",
    ])
    .unwrap();
    // Zero rate listing is rejected by validation
    wtr.write_record(["list_item", "10", "", "2", "0.0", "", "", "", "", "", "Freebie"])
        .unwrap();
    // Offer with a missing amount is rejected by validation
    wtr.write_record(["offer", "10", "100", "", "", "4", "", "", "", "", ""])
        .unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let mut cmd = Command::new(cargo_bin!("campuslend"));
    cmd.arg(&output_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error processing event"))
        .stdout(predicate::str::contains("100,1,20,10,pending,6,3,18,false"));

    std::fs::remove_file(output_path).ok();
}

#[test]
fn test_out_of_range_rating() {
    let output_path = std::path::PathBuf::from("rating_test.csv");
    let mut wtr = csv::Writer::from_path(&output_path).unwrap();
    wtr.write_record(common::EVENT_HEADER).unwrap();

    wtr.write_record(["list_item", "10", "", "1", "6.0", "", "", "", "tools", "", "Drill"])
        .unwrap();
    wtr.write_record([
        "request",
        "20",
        "100",
        "1",
        "",
        "3",
        "2025-03-01",
        "",
        "",
        "",
        "",
    ])
    .unwrap();
    wtr.write_record(["accept", "10", "100", "", "", "", "", "", "", "", ""])
        .unwrap();
    wtr.write_record(["pay", "20", "100", "", "", "", "", "", "", "", ""])
        .unwrap();
    wtr.write_record(["complete", "20", "100", "", "", "", "2025-03-04", "", "", "", ""])
        .unwrap();
    wtr.write_record(["review", "10", "100", "", "", "", "", "9", "", "", ""])
        .unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let mut cmd = Command::new(cargo_bin!("campuslend"));
    cmd.arg(&output_path).args(["--report", "profiles"]);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error processing event"))
        .stdout(predicate::str::contains("20,member-20,,0"));

    std::fs::remove_file(output_path).ok();
}
