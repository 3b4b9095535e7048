//! Integration tests for the settle CLI.
//!
//! These tests run the actual binary and verify output against expected CSV files.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

/// Get path to test data file
fn test_data_path(filename: &str) -> String {
    format!("tests/data/{}", filename)
}

/// Run the binary with the given arguments and return stdout
fn run_settle(args: &[&str]) -> String {
    let mut cmd = Command::cargo_bin("settle").unwrap();
    let assert = cmd.args(args).assert().success();
    String::from_utf8(assert.get_output().stdout.clone()).unwrap()
}

/// Trim lines and drop blanks; transfer order is significant and kept.
fn normalize_csv(csv: &str) -> Vec<String> {
    csv.lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

#[test]
fn test_sample_a_peer_netting() {
    let output = run_settle(&[&test_data_path("sample_a_peer.csv")]);
    let expected = fs::read_to_string(test_data_path("expected_a.csv")).unwrap();

    assert_eq!(normalize_csv(&output), normalize_csv(&expected));
}

#[test]
fn test_sample_b_bank_reconciliation() {
    let output = run_settle(&[&test_data_path("sample_b_bank.csv")]);
    let expected = fs::read_to_string(test_data_path("expected_b.csv")).unwrap();

    assert_eq!(normalize_csv(&output), normalize_csv(&expected));
}

#[test]
fn test_sample_c_incomplete_session() {
    let mut cmd = Command::cargo_bin("settle").unwrap();
    cmd.arg(test_data_path("sample_c_incomplete.csv"))
        .assert()
        .success()
        .stdout("from,to,amount\n")
        .stderr(predicate::str::contains("Waiting for all players to cash out").and(
            predicate::str::contains("still open: 2"),
        ));
}

#[test]
fn test_sample_d_shortfall_policies() {
    let clamped = run_settle(&[&test_data_path("sample_d_short_pool.csv")]);
    assert_eq!(normalize_csv(&clamped), vec!["from,to,amount", "Bank,d,50.00"]);

    let overpaid = run_settle(&[
        &test_data_path("sample_d_short_pool.csv"),
        "--shortfall",
        "overpay",
    ]);
    assert_eq!(normalize_csv(&overpaid), vec!["from,to,amount", "Bank,d,80.00"]);
}

#[test]
fn test_sample_d_reports_unresolved() {
    let mut cmd = Command::cargo_bin("settle").unwrap();
    cmd.arg(test_data_path("sample_d_short_pool.csv"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Settlement unresolved"));
}

#[test]
fn test_sample_e_no_transactions_needed() {
    let mut cmd = Command::cargo_bin("settle").unwrap();
    cmd.arg(test_data_path("sample_e_even.csv"))
        .assert()
        .success()
        .stdout("from,to,amount\n")
        .stderr(predicate::str::contains("No transactions needed"));
}

#[test]
fn test_sample_f_validation_error() {
    let mut cmd = Command::cargo_bin("settle").unwrap();
    cmd.arg(test_data_path("sample_f_invalid.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cash-out references unknown player 9"));
}

#[test]
fn test_unparseable_row_names_row() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "type,player,id,amount,source,stack,timestamp,name").unwrap();
    writeln!(file, "player,1,,,,,,Alice").unwrap();
    writeln!(file, "buyin,1,b1,lots,cash,,,").unwrap();

    let mut cmd = Command::cargo_bin("settle").unwrap();
    cmd.arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid record at row 3"));
}

#[test]
fn test_player_named_bank_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "type,player,id,amount,source,stack,timestamp,name").unwrap();
    writeln!(file, "player,Bank,,,,,,Mallory").unwrap();
    writeln!(file, "buyin,Bank,b1,100,cash,,,").unwrap();
    writeln!(file, "cashout,Bank,,100,,,,").unwrap();

    let mut cmd = Command::cargo_bin("settle").unwrap();
    cmd.arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Player id Bank is reserved for the bank"));
}

#[test]
fn test_missing_file_error() {
    let mut cmd = Command::cargo_bin("settle").unwrap();
    cmd.arg("nonexistent.csv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_missing_argument_error() {
    let mut cmd = Command::cargo_bin("settle").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Missing input file"));
}

#[test]
fn test_unknown_shortfall_policy_error() {
    let mut cmd = Command::cargo_bin("settle").unwrap();
    cmd.args([test_data_path("sample_a_peer.csv").as_str(), "--shortfall", "split"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown shortfall policy"));
}

#[test]
fn test_amounts_have_two_decimal_places() {
    let output = run_settle(&[&test_data_path("sample_b_bank.csv")]);

    for line in output.lines().skip(1) {
        let amount = line.rsplit(',').next().unwrap();
        let dot_pos = amount.find('.').expect("amount has a decimal point");
        assert_eq!(amount.len() - dot_pos - 1, 2, "Expected 2 decimal places in: {}", amount);
    }
}
