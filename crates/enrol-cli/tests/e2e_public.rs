//! E2E CLI tests for the visitor-facing commands:
//! - `enrol init` skeleton and seeding
//! - `enrol programs` filters, facets and output modes
//! - `enrol apply` validation and persistence
//! - `enrol contact` link building
//! - `enrol check` on healthy and damaged data
//!
//! Each test runs the binary as a subprocess in an isolated temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

const KTU_MECHATRONICS: &str = "Kaunas%20University%20of%20Technology---Mechatronics%20Engineering";

/// Build a Command targeting the enrol binary, rooted in `dir`.
fn enrol_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("enrol"));
    cmd.current_dir(dir);
    cmd.env("ENROL_LOG", "error");
    cmd.env("HOME", dir);
    cmd.env("XDG_CONFIG_HOME", dir.join(".config"));
    cmd.env_remove("FORMAT");
    cmd
}

fn init_project(dir: &Path) {
    enrol_cmd(dir).arg("init").assert().success();
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("command should not crash");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

/// First JSON document on stderr.
fn stderr_json(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("command should not crash");
    assert!(!output.status.success(), "command unexpectedly succeeded");
    serde_json::Deserializer::from_slice(&output.stderr)
        .into_iter::<Value>()
        .next()
        .expect("stderr should start with JSON")
        .expect("valid JSON")
}

fn data_file(dir: &Path, key: &str) -> std::path::PathBuf {
    dir.join(".enrol").join("data").join(format!("{key}.json"))
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[test]
fn init_seeds_both_collections() {
    let dir = TempDir::new().expect("tempdir");
    let report = stdout_json(enrol_cmd(dir.path()).args(["init", "--json"]));
    assert_eq!(report["universities"], "seeded");
    assert_eq!(report["applications"], "seeded");

    let stored: Value = serde_json::from_str(
        &std::fs::read_to_string(data_file(dir.path(), "universities")).expect("read"),
    )
    .expect("json");
    assert_eq!(stored.as_array().map(Vec::len), Some(4));
}

#[test]
fn commands_outside_a_project_fail_with_code() {
    let dir = TempDir::new().expect("tempdir");
    let err = stderr_json(enrol_cmd(dir.path()).args(["programs", "--json"]));
    assert_eq!(err["error"]["error_code"], "E1001");
}

#[test]
fn init_twice_without_force_fails() {
    let dir = TempDir::new().expect("tempdir");
    init_project(dir.path());
    enrol_cmd(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

// ---------------------------------------------------------------------------
// programs
// ---------------------------------------------------------------------------

#[test]
fn programs_lists_every_seeded_program() {
    let dir = TempDir::new().expect("tempdir");
    init_project(dir.path());
    let listing = stdout_json(enrol_cmd(dir.path()).args(["programs", "--json"]));
    let rows = listing.as_array().expect("array");
    assert_eq!(rows.len(), 20);
    assert!(rows.iter().any(|r| r["id"] == KTU_MECHATRONICS));
    assert_eq!(rows[0]["universityName"], "EKA University of Applied Sciences");
}

#[test]
fn programs_filters_combine() {
    let dir = TempDir::new().expect("tempdir");
    init_project(dir.path());
    let listing = stdout_json(enrol_cmd(dir.path()).args([
        "programs",
        "--country",
        "Lithuania",
        "--search",
        "ENGINEERING",
        "--json",
    ]));
    let rows = listing.as_array().expect("array");
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|r| r["country"] == "Lithuania"));
    assert!(rows.iter().all(|r| {
        let title = r["title"].as_str().unwrap_or_default().to_lowercase();
        let uni = r["universityName"].as_str().unwrap_or_default().to_lowercase();
        title.contains("engineering") || uni.contains("engineering")
    }));

    let none = stdout_json(enrol_cmd(dir.path()).args(["programs", "--language", "Klingon", "--json"]));
    assert_eq!(none, serde_json::json!([]));
}

#[test]
fn programs_text_output_has_header() {
    let dir = TempDir::new().expect("tempdir");
    init_project(dir.path());
    enrol_cmd(dir.path())
        .args(["programs", "--format", "text", "--country", "Latvia"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ID\tTITLE\tUNIVERSITY\t"));
}

#[test]
fn programs_facets_are_sorted() {
    let dir = TempDir::new().expect("tempdir");
    init_project(dir.path());
    let facets = stdout_json(enrol_cmd(dir.path()).args(["programs", "--facets", "--json"]));
    assert_eq!(facets["countries"], serde_json::json!(["Latvia", "Lithuania"]));
    assert_eq!(facets["languages"], serde_json::json!(["English"]));
}

// ---------------------------------------------------------------------------
// apply
// ---------------------------------------------------------------------------

#[test]
fn apply_appends_pending_application() {
    let dir = TempDir::new().expect("tempdir");
    init_project(dir.path());

    let app = stdout_json(enrol_cmd(dir.path()).args([
        "apply",
        KTU_MECHATRONICS,
        "--name",
        "Ana Berzina",
        "--email",
        "ana@example.com",
        "--phone",
        "+371 20000000",
        "--document",
        "/somewhere/passport.pdf",
        "--json",
    ]));
    assert_eq!(app["status"], "pending");
    assert_eq!(app["university"], "Kaunas University of Technology");
    assert_eq!(app["program"], "Mechatronics Engineering");
    assert_eq!(app["documents"][0]["name"], "passport.pdf");
    assert_eq!(app["documents"][0]["url"], "#");

    let stored: Value = serde_json::from_str(
        &std::fs::read_to_string(data_file(dir.path(), "applications")).expect("read"),
    )
    .expect("json");
    let stored = stored.as_array().expect("array");
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[2]["id"], app["id"]);
    assert_eq!(stored[2]["studentName"], "Ana Berzina");
}

#[test]
fn apply_reports_every_invalid_field() {
    let dir = TempDir::new().expect("tempdir");
    init_project(dir.path());
    let before = std::fs::read_to_string(data_file(dir.path(), "applications")).expect("read");

    let err = stderr_json(enrol_cmd(dir.path()).args([
        "apply",
        KTU_MECHATRONICS,
        "--name",
        " ",
        "--email",
        "not-an-email",
        "--phone",
        "call me",
        "--json",
    ]));
    let fields = &err["error"]["fields"];
    assert_eq!(fields["studentName"], "Full name is required");
    assert_eq!(fields["email"], "Invalid email format");
    assert!(fields["phone"].is_string());
    assert_eq!(fields["documents"], "At least one document is required");

    let after = std::fs::read_to_string(data_file(dir.path(), "applications")).expect("read");
    assert_eq!(before, after);
}

#[test]
fn apply_to_unknown_program_fails() {
    let dir = TempDir::new().expect("tempdir");
    init_project(dir.path());
    let err = stderr_json(enrol_cmd(dir.path()).args([
        "apply",
        "Nowhere---Nothing",
        "--name",
        "Ana",
        "--email",
        "ana@example.com",
        "--phone",
        "+37120000000",
        "-d",
        "cv.pdf",
        "--json",
    ]));
    assert!(
        err["error"]["message"]
            .as_str()
            .is_some_and(|m| m.contains("program not found"))
    );
}

// ---------------------------------------------------------------------------
// contact
// ---------------------------------------------------------------------------

#[test]
fn contact_prints_encoded_link() {
    let dir = TempDir::new().expect("tempdir");
    init_project(dir.path());
    let out = stdout_json(enrol_cmd(dir.path()).args([
        "contact",
        "--name",
        "Ana Berzina",
        "--email",
        "ana@example.com",
        "--phone",
        "+371 20000000",
        "--json",
    ]));
    let link = out["link"].as_str().expect("link");
    assert!(link.starts_with("https://wa.me/37127333527?text="));
    assert!(link.contains("Name%3A%20Ana%20Berzina"));
    assert!(link.contains("%0AEmail%3A%20ana%40example.com"));
}

#[test]
fn contact_rejects_bad_email() {
    let dir = TempDir::new().expect("tempdir");
    init_project(dir.path());
    enrol_cmd(dir.path())
        .args([
            "contact",
            "--name",
            "Ana",
            "--email",
            "ana@",
            "--phone",
            "+37120000000",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("email: Invalid email format"));
}

#[test]
fn failures_are_reported_once() {
    let dir = TempDir::new().expect("tempdir");
    init_project(dir.path());
    let args = ["contact", "--name", "Ana", "--email", "ana@", "--phone", "+37120000000"];

    let output = enrol_cmd(dir.path())
        .args(args)
        .arg("--json")
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let err: Value = serde_json::from_slice(&output.stderr).expect("stderr is one JSON document");
    assert_eq!(err["error"]["message"], "invalid contact details");

    let output = enrol_cmd(dir.path()).args(args).output().expect("run");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("invalid contact details").count(), 1, "{stderr}");
    assert!(!stderr.contains("Error:"), "{stderr}");
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_reports_healed_shape() {
    let dir = TempDir::new().expect("tempdir");
    init_project(dir.path());
    std::fs::write(data_file(dir.path(), "universities"), r#"{"not":"an array"}"#).expect("write");

    let report = stdout_json(enrol_cmd(dir.path()).args(["check", "--json"]));
    assert_eq!(report[0]["key"], "universities");
    assert_eq!(report[0]["outcome"], "healed");
    assert_eq!(report[0]["records"], 4);
    assert_eq!(report[1]["outcome"], "loaded");
}

#[test]
fn unreadable_collection_fails_check_and_blocks_writes() {
    let dir = TempDir::new().expect("tempdir");
    init_project(dir.path());
    let path = data_file(dir.path(), "applications");
    std::fs::write(&path, "[{").expect("write");

    enrol_cmd(dir.path())
        .args(["check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("enrol check --repair"));

    enrol_cmd(dir.path())
        .args([
            "apply",
            KTU_MECHATRONICS,
            "--name",
            "Ana",
            "--email",
            "ana@example.com",
            "--phone",
            "+37120000000",
            "-d",
            "cv.pdf",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to overwrite"));
    assert_eq!(std::fs::read_to_string(&path).expect("read"), "[{");

    enrol_cmd(dir.path()).args(["check", "--repair"]).assert().success();
    enrol_cmd(dir.path()).args(["check"]).assert().success();
}
