use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn projstore(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("projstore").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("PROJSTORE_HOME")
        .arg("--data-dir")
        .arg(home);
    cmd
}

#[test]
fn test_create_get_list() {
    let temp_dir = tempfile::tempdir().unwrap();

    projstore(temp_dir.path())
        .args(["create", r#"{"name":"Apollo"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project created: 100001"));

    projstore(temp_dir.path())
        .args(["get", "100001"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""name": "Apollo""#));

    projstore(temp_dir.path())
        .arg("ls")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""id": "100001""#));

    assert!(temp_dir.path().join("projects/100001.json").exists());
}

#[test]
fn test_create_help_matches_output() {
    let temp_dir = tempfile::tempdir().unwrap();

    projstore(temp_dir.path())
        .args(["create", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project created: <id>"));
}

#[test]
fn test_create_reads_stdin() {
    let temp_dir = tempfile::tempdir().unwrap();

    projstore(temp_dir.path())
        .arg("new")
        .write_stdin(r#"{"name":"from stdin"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("Project created: 100001"));

    projstore(temp_dir.path())
        .args(["get", "100001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from stdin"));
}

#[test]
fn test_get_missing_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    projstore(temp_dir.path())
        .args(["get", "100001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_update_rejects_bad_payload() {
    let temp_dir = tempfile::tempdir().unwrap();

    projstore(temp_dir.path())
        .args(["create", "{}"])
        .assert()
        .success();

    projstore(temp_dir.path())
        .args(["update", "{ not json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));

    projstore(temp_dir.path())
        .args(["update", r#"{"id":"100001","name":"renamed"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project updated."));

    projstore(temp_dir.path())
        .args(["get", "100001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("renamed"));
}

#[test]
fn test_delete_twice_warns() {
    let temp_dir = tempfile::tempdir().unwrap();

    projstore(temp_dir.path())
        .args(["create", "{}"])
        .assert()
        .success();

    projstore(temp_dir.path())
        .args(["rm", "100001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project deleted: 100001"));

    projstore(temp_dir.path())
        .args(["rm", "100001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing deleted"));
}

#[test]
fn test_config_set_and_get() {
    let temp_dir = tempfile::tempdir().unwrap();

    projstore(temp_dir.path())
        .args(["config", "id-offset", "500"])
        .assert()
        .success()
        .stdout(predicate::str::contains("id-offset set to 500"));

    projstore(temp_dir.path())
        .args(["config", "id-offset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("id-offset = 500"));

    projstore(temp_dir.path())
        .args(["config", "no-such-key"])
        .assert()
        .failure();

    // The new offset seeds the first id.
    projstore(temp_dir.path())
        .args(["create", "{}"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project created: 501"));
}

#[test]
fn test_init_and_doctor() {
    let temp_dir = tempfile::tempdir().unwrap();

    projstore(temp_dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized store"));
    assert!(temp_dir.path().join("projects").is_dir());
    assert!(temp_dir.path().join("config.json").is_file());

    std::fs::write(
        temp_dir.path().join("projects/999999.json"),
        r#"{"id":"100007","name":"stranded"}"#,
    )
    .unwrap();

    projstore(temp_dir.path())
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("Recovered 1 project(s)"));

    projstore(temp_dir.path())
        .args(["get", "100007"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stranded"));
}
