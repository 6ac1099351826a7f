//! CLI smoke tests driving the binary end to end

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SECRET: &str = "cli test secret";

fn write_input(dir: &TempDir, name: &str, json: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, json).unwrap();
    path
}

fn valid_input(dir: &TempDir) -> std::path::PathBuf {
    write_input(
        dir,
        "input.json",
        r#"{
            "full_name": "Jordan Avery",
            "dob": "03/14/1975",
            "ssn": "856-45-6789",
            "citizenship": "US Citizen",
            "residential_address": "12 Harbor Lane",
            "mobile_phone": "6035550142",
            "employment_status": "Unemployed",
            "electronic_delivery_consent": "Yes"
        }"#,
    )
}

fn cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("magnus-intake").unwrap();
    cmd.env("MAGNUS_INTAKE_AUDIT_LOG", dir.path().join("audit.log"));
    cmd.env("MAGNUS_INTAKE_SECRET", SECRET);
    cmd
}

#[test]
fn test_validate_valid_input() {
    let dir = TempDir::new().unwrap();
    let input = valid_input(&dir);

    cmd(&dir)
        .arg("validate")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Input is valid."));
}

#[test]
fn test_validate_reports_all_violations() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "bad.json",
        r#"{
            "full_name": "Jordan Avery",
            "dob": "03/14/1975",
            "ssn": "12-345",
            "citizenship": "US Citizen",
            "residential_address": "12 Harbor Lane",
            "mobile_phone": "6035550142",
            "employment_status": "Unemployed"
        }"#,
    );

    cmd(&dir)
        .arg("validate")
        .arg(&input)
        .assert()
        .failure()
        .stdout(predicate::str::contains("SSN must be 9 digits"))
        .stdout(predicate::str::contains("electronic_delivery_consent"));
}

#[test]
fn test_seal_unseal_round_trip() {
    let dir = TempDir::new().unwrap();
    let input = valid_input(&dir);
    let rec = dir.path().join("client.rec");

    cmd(&dir)
        .arg("seal")
        .arg(&input)
        .arg("--output")
        .arg(&rec)
        .assert()
        .success()
        .stdout(predicate::str::contains("Sealed"));

    assert!(rec.exists());
    let on_disk = std::fs::read_to_string(&rec).unwrap();
    assert!(!on_disk.contains("856456789"));

    cmd(&dir)
        .arg("unseal")
        .arg(&rec)
        .assert()
        .success()
        .stdout(predicate::str::contains("856456789"))
        .stdout(predicate::str::contains("Jordan Avery"));
}

#[test]
fn test_unseal_wrong_secret_fails() {
    let dir = TempDir::new().unwrap();
    let input = valid_input(&dir);
    let rec = dir.path().join("client.rec");

    cmd(&dir)
        .arg("seal")
        .arg(&input)
        .arg("--output")
        .arg(&rec)
        .assert()
        .success();

    let mut wrong = Command::cargo_bin("magnus-intake").unwrap();
    wrong.env("MAGNUS_INTAKE_AUDIT_LOG", dir.path().join("audit.log"));
    wrong.env("MAGNUS_INTAKE_SECRET", "not the secret");
    wrong
        .arg("unseal")
        .arg(&rec)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Authentication failed"));
}

#[test]
fn test_seal_refuses_invalid_input() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "bad.json", r#"{"full_name": "Jordan Avery"}"#);
    let rec = dir.path().join("client.rec");

    cmd(&dir)
        .arg("seal")
        .arg(&input)
        .arg("--output")
        .arg(&rec)
        .assert()
        .failure()
        .stdout(predicate::str::contains("violation"));

    assert!(!rec.exists());
}

#[test]
fn test_render_produces_pdf() {
    let dir = TempDir::new().unwrap();
    let input = valid_input(&dir);
    let rec = dir.path().join("client.rec");
    let pdf = dir.path().join("report.pdf");

    cmd(&dir)
        .arg("seal")
        .arg(&input)
        .arg("--output")
        .arg(&rec)
        .assert()
        .success();

    cmd(&dir)
        .arg("render")
        .arg(&rec)
        .arg("--output")
        .arg(&pdf)
        .assert()
        .success()
        .stdout(predicate::str::contains("Rendered"));

    let bytes = std::fs::read(&pdf).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_render_protected_pdf() {
    let dir = TempDir::new().unwrap();
    let input = valid_input(&dir);
    let rec = dir.path().join("client.rec");
    let pdf = dir.path().join("report.pdf");

    cmd(&dir)
        .arg("seal")
        .arg(&input)
        .arg("--output")
        .arg(&rec)
        .assert()
        .success();

    cmd(&dir)
        .arg("render")
        .arg(&rec)
        .arg("--output")
        .arg(&pdf)
        .arg("--protect")
        .env("MAGNUS_INTAKE_DOC_PASSWORD", "open sesame")
        .assert()
        .success()
        .stdout(predicate::str::contains("password protected"));

    let bytes = std::fs::read(&pdf).unwrap();
    let has = |s: &str| bytes.windows(s.len()).any(|w| w == s.as_bytes());
    assert!(has("/Encrypt"));
    assert!(!has("Jordan Avery"));
}

#[test]
fn test_shred_removes_record() {
    let dir = TempDir::new().unwrap();
    let input = valid_input(&dir);
    let rec = dir.path().join("client.rec");

    cmd(&dir)
        .arg("seal")
        .arg(&input)
        .arg("--output")
        .arg(&rec)
        .assert()
        .success();
    assert!(rec.exists());

    cmd(&dir)
        .arg("shred")
        .arg(&rec)
        .assert()
        .success()
        .stdout(predicate::str::contains("Shredded"));
    assert!(!rec.exists());
}

#[test]
fn test_audit_log_records_operations() {
    let dir = TempDir::new().unwrap();
    let input = valid_input(&dir);
    let rec = dir.path().join("client.rec");

    cmd(&dir).arg("validate").arg(&input).assert().success();
    cmd(&dir)
        .arg("seal")
        .arg(&input)
        .arg("--output")
        .arg(&rec)
        .assert()
        .success();

    cmd(&dir)
        .arg("audit")
        .assert()
        .success()
        .stdout(predicate::str::contains("VALIDATED"))
        .stdout(predicate::str::contains("SEALED"));

    // The audit log itself must never hold field values
    let log = std::fs::read_to_string(dir.path().join("audit.log")).unwrap();
    assert!(!log.contains("856456789"));
    assert!(!log.contains("Jordan Avery"));
    assert!(!log.contains(SECRET));
}
