//! E2E CLI tests for the admin surface:
//! - login/logout/whoami and the session gate
//! - `enrol university` add/edit/delete/import/export
//! - `enrol application` review workflow and orphan report
//!
//! Each test runs the binary as a subprocess in an isolated temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

fn enrol_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("enrol"));
    cmd.current_dir(dir);
    cmd.env("ENROL_LOG", "error");
    cmd.env("HOME", dir);
    cmd.env("XDG_CONFIG_HOME", dir.join(".config"));
    cmd.env_remove("FORMAT");
    cmd
}

/// Initialized project with an active admin session.
fn admin_project() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    enrol_cmd(dir.path()).arg("init").assert().success();
    enrol_cmd(dir.path())
        .args(["login", "--username", "admin", "--password", "admin"])
        .assert()
        .success();
    dir
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

fn stderr_json(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("command should not crash");
    assert!(!output.status.success(), "command unexpectedly succeeded");
    serde_json::Deserializer::from_slice(&output.stderr)
        .into_iter::<Value>()
        .next()
        .expect("stderr should start with JSON")
        .expect("valid JSON")
}

fn university_names(dir: &Path) -> Vec<String> {
    let list = stdout_json(enrol_cmd(dir).args(["university", "list", "--json"]));
    list.as_array()
        .expect("array")
        .iter()
        .map(|u| u["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Session gate
// ---------------------------------------------------------------------------

#[test]
fn admin_commands_require_login() {
    let dir = TempDir::new().expect("tempdir");
    enrol_cmd(dir.path()).arg("init").assert().success();

    let err = stderr_json(enrol_cmd(dir.path()).args(["university", "list", "--json"]));
    assert_eq!(err["error"]["error_code"], "E4001");

    enrol_cmd(dir.path())
        .args(["application", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("enrol login"));
}

#[test]
fn wrong_password_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    enrol_cmd(dir.path()).arg("init").assert().success();
    let err = stderr_json(enrol_cmd(dir.path()).args([
        "login", "-u", "admin", "-p", "hunter2", "--json",
    ]));
    assert_eq!(err["error"]["error_code"], "E4001");
    enrol_cmd(dir.path()).arg("whoami").assert().failure();
}

#[test]
fn login_whoami_logout_cycle() {
    let dir = admin_project();
    let session = stdout_json(enrol_cmd(dir.path()).args(["whoami", "--json"]));
    assert_eq!(session["username"], "admin");
    assert!(session["expires_at"].is_string());

    let out = stdout_json(enrol_cmd(dir.path()).args(["logout", "--json"]));
    assert_eq!(out["message"], "Logged out");
    enrol_cmd(dir.path()).arg("whoami").assert().failure();
    enrol_cmd(dir.path())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("No active session"));
}

#[test]
fn tampered_session_is_refused() {
    let dir = admin_project();
    let token = dir.path().join(".enrol/data/admin_session.json");
    std::fs::write(&token, "4102444800.0.admin.deadbeef").expect("tamper");

    let err = stderr_json(enrol_cmd(dir.path()).args(["whoami", "--json"]));
    assert_eq!(err["error"]["error_code"], "E4003");
}

// ---------------------------------------------------------------------------
// University management
// ---------------------------------------------------------------------------

#[test]
fn add_show_and_delete_university() {
    let dir = admin_project();
    enrol_cmd(dir.path())
        .args([
            "university",
            "add",
            "--name",
            "Riga Technical University",
            "--logo",
            "https://example.com/rtu.png",
            "--description",
            "Oldest technical university in the Baltics",
            "--location",
            "Riga, Latvia",
            "--country",
            "Latvia",
            "--program",
            "Computer Science|3 years|English|€4,000/year|September",
            "--feature",
            "Modern campus",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added university id 'uni-"));

    assert_eq!(university_names(dir.path()).len(), 5);

    let shown = stdout_json(enrol_cmd(dir.path()).args([
        "university",
        "show",
        "Riga Technical University",
        "--json",
    ]));
    assert_eq!(shown["programs"][0]["tuition"], "€4,000/year");
    let id = shown["id"].as_str().expect("id").to_string();
    assert!(id.starts_with("uni-"));

    let programs = stdout_json(enrol_cmd(dir.path()).args(["programs", "--search", "riga technical", "--json"]));
    assert_eq!(programs.as_array().map(Vec::len), Some(1));

    enrol_cmd(dir.path())
        .args(["university", "delete", &id, "--force"])
        .assert()
        .success();
    assert_eq!(university_names(dir.path()).len(), 4);
}

#[test]
fn invalid_university_lists_field_errors() {
    let dir = admin_project();
    let err = stderr_json(enrol_cmd(dir.path()).args([
        "university",
        "add",
        "--name",
        "Half Done",
        "--json",
    ]));
    let fields = &err["error"]["fields"];
    assert_eq!(fields["location"], "Location is required");
    assert_eq!(fields["programs"], "At least one program is required");
    assert!(fields.get("name").is_none());

    enrol_cmd(dir.path())
        .args([
            "university",
            "add",
            "--name",
            "Half Done",
            "--location",
            "X",
            "--country",
            "Y",
            "--description",
            "Z",
            "--program",
            "|2 years|English|€1|May",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("programs[0].title: Program title is required"));
    assert_eq!(university_names(dir.path()).len(), 4);
}

#[test]
fn duplicate_names_are_rejected() {
    let dir = admin_project();
    enrol_cmd(dir.path())
        .args(["university", "edit", "uni-ktu", "--name", "Vilnius Tech University"])
        .assert()
        .failure();
    assert!(university_names(dir.path()).contains(&"Kaunas University of Technology".to_string()));
}

#[test]
fn rename_keeps_position_and_orphans_old_applications() {
    let dir = admin_project();
    enrol_cmd(dir.path())
        .args(["university", "edit", "uni-eka", "--name", "EKA"])
        .assert()
        .success();

    let names = university_names(dir.path());
    assert_eq!(names[0], "EKA");
    assert_eq!(names.len(), 4);

    let orphans = stdout_json(enrol_cmd(dir.path()).args(["application", "orphans", "--json"]));
    assert_eq!(
        orphans,
        json!([{
            "id": "1",
            "student_name": "John Smith",
            "university": "EKA University of Applied Sciences",
            "program": "Business Administration and Digital Innovation",
            "reason": "university_missing"
        }])
    );
}

#[test]
fn edit_adds_and_removes_programs() {
    let dir = admin_project();
    enrol_cmd(dir.path())
        .args([
            "university",
            "edit",
            "uni-ktu",
            "--add-program",
            "Robotics|2 years|English|€5,000/year|September",
            "--remove-program",
            "Mechatronics Engineering",
        ])
        .assert()
        .success();

    let shown = stdout_json(enrol_cmd(dir.path()).args(["university", "show", "uni-ktu", "--json"]));
    let titles: Vec<&str> = shown["programs"]
        .as_array()
        .expect("programs")
        .iter()
        .filter_map(|p| p["title"].as_str())
        .collect();
    assert_eq!(titles.len(), 5);
    assert_eq!(titles.last(), Some(&"Robotics"));
    assert!(!titles.contains(&"Mechatronics Engineering"));
}

#[test]
fn export_import_round_trip_and_bad_import_changes_nothing() {
    let dir = admin_project();
    let export = dir.path().join("catalog.json");
    enrol_cmd(dir.path())
        .args(["university", "export", "--output"])
        .arg(&export)
        .assert()
        .success();

    let bad = dir.path().join("bad.json");
    std::fs::write(
        &bad,
        json!([
            {"name": "Same", "programs": [{"title": "A"}]},
            {"name": "Same", "programs": [{"title": "B"}]}
        ])
        .to_string(),
    )
    .expect("write");
    enrol_cmd(dir.path())
        .args(["university", "import"])
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("import rejected"));
    assert_eq!(university_names(dir.path()).len(), 4);

    let mut trimmed: Value =
        serde_json::from_str(&std::fs::read_to_string(&export).expect("read")).expect("json");
    trimmed.as_array_mut().expect("array").truncate(2);
    std::fs::write(&export, trimmed.to_string()).expect("write");
    enrol_cmd(dir.path())
        .args(["university", "import"])
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 universities"));
    assert_eq!(
        university_names(dir.path()),
        ["EKA University of Applied Sciences", "Transport and Telecommunication Institute"]
    );
}

// ---------------------------------------------------------------------------
// Application review
// ---------------------------------------------------------------------------

#[test]
fn review_workflow() {
    let dir = admin_project();

    let pending = stdout_json(enrol_cmd(dir.path()).args([
        "application",
        "list",
        "--status",
        "pending",
        "--json",
    ]));
    assert_eq!(pending.as_array().map(Vec::len), Some(1));
    assert_eq!(pending[0]["id"], "2");

    let accepted = stdout_json(enrol_cmd(dir.path()).args([
        "application",
        "status",
        "2",
        "accepted",
        "--json",
    ]));
    assert_eq!(accepted["status"], "accepted");

    let noted = stdout_json(enrol_cmd(dir.path()).args([
        "application",
        "note",
        "1",
        "Transcript verified",
        "--json",
    ]));
    assert_eq!(
        noted["notes"],
        "Candidate has strong academic background\nTranscript verified"
    );

    enrol_cmd(dir.path())
        .args(["application", "note", "1", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("note must not be empty"));

    let err = stderr_json(enrol_cmd(dir.path()).args(["application", "show", "99", "--json"]));
    assert_eq!(err["error"]["error_code"], "E2001");

    let search = stdout_json(enrol_cmd(dir.path()).args([
        "application",
        "list",
        "--search",
        "MARIA",
        "--json",
    ]));
    assert_eq!(search[0]["status"], "accepted");
}

#[test]
fn deleting_university_orphans_its_applications() {
    let dir = admin_project();
    enrol_cmd(dir.path())
        .args(["university", "delete", "uni-tti", "--force"])
        .assert()
        .success();

    let orphans = stdout_json(enrol_cmd(dir.path()).args(["application", "orphans", "--json"]));
    assert_eq!(orphans.as_array().map(Vec::len), Some(1));
    assert_eq!(orphans[0]["id"], "2");

    let all = stdout_json(enrol_cmd(dir.path()).args(["application", "list", "--json"]));
    assert_eq!(all.as_array().map(Vec::len), Some(2));
}
