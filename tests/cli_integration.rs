use assert_cmd::Command;
use predicates::prelude::*;

fn lexflow() -> Command {
    Command::cargo_bin("lexflow").unwrap()
}

#[test]
fn help_lists_subcommands() {
    lexflow()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("resume"))
        .stdout(predicate::str::contains("review"))
        .stdout(predicate::str::contains("schema"));
}

#[test]
fn init_writes_starter_config() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("lexflow.yaml");

    lexflow()
        .args(["init", "--config"])
        .arg(&config_path)
        .assert()
        .success();

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("specialists:"));
    assert!(content.contains("general_counsel"));

    // Second init without --force must refuse to clobber
    lexflow()
        .args(["init", "--config"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn schema_outputs_valid_json() {
    let output = lexflow().arg("schema").assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let schema: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(schema.get("properties").is_some());
}

#[test]
fn run_without_text_fails() {
    let dir = tempfile::tempdir().unwrap();
    lexflow()
        .current_dir(dir.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("intake text"));
}

#[test]
fn review_list_empty_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    lexflow()
        .current_dir(dir.path())
        .args(["review", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No pending review requests"));
}
