// Integration tests for the aa-download binary

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

// Nothing listens on the discard port locally
const UNREACHABLE_URL: &str = "http://127.0.0.1:9/criteo_sample.csv";

#[test]
fn test_existing_file_kept_without_overwrite() {
    let tmp_dir = TempDir::new().unwrap();
    let output = tmp_dir.path().join("criteo_sample.csv");
    fs::write(&output, "impression_id,user_id,click\n").unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("aa-download");
    cmd.arg("--url").arg(UNREACHABLE_URL).arg("--output").arg(&output);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Keeping existing file"));

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "impression_id,user_id,click\n"
    );
}

#[test]
fn test_network_failure_exits_non_zero() {
    let tmp_dir = TempDir::new().unwrap();
    let output = tmp_dir.path().join("raw/criteo_sample.csv");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("aa-download");
    cmd.arg("--url").arg(UNREACHABLE_URL).arg("--output").arg(&output);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to fetch"));

    assert!(!output.exists());
}

#[test]
fn test_overwrite_attempts_download() {
    let tmp_dir = TempDir::new().unwrap();
    let output = tmp_dir.path().join("criteo_sample.csv");
    fs::write(&output, "old").unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("aa-download");
    cmd.arg("--url")
        .arg(UNREACHABLE_URL)
        .arg("--output")
        .arg(&output)
        .arg("--overwrite");

    cmd.assert().failure();
    assert_eq!(fs::read_to_string(&output).unwrap(), "old");
}
