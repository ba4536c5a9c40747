use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn connector_certify() -> Command {
    assert_cmd::cargo::cargo_bin_cmd!("connector-certify")
}

const GITIGNORE: &str = "*.class\n*.jar\n*.war\ntarget/\n.classpath\n.settings/\n.project\n.factorypath\n.idea/\n*.iml\n*.ipr\n*.iws\n.DS_Store\n";

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn clean_component() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), ".gitignore", GITIGNORE);
    write(dir.path(), "README.md", "# CRM\n");
    write(
        dir.path(),
        "descriptor.toml",
        "artifact-id = \"crm-connector\"\nversion = \"1.0.0-SNAPSHOT\"\n",
    );
    dir
}

#[test]
fn certify_clean_component_passes() {
    let dir = clean_component();
    connector_certify()
        .arg("certify")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"passed\""))
        .stdout(predicate::str::contains("\"component\": \"crm-connector\""));
}

#[test]
fn certify_component_with_issues_fails() {
    let dir = clean_component();
    std::fs::remove_file(dir.path().join(".gitignore")).unwrap();
    connector_certify()
        .arg("certify")
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"passed\": false"))
        .stdout(predicate::str::contains("Missing .gitignore file in project root."));
}

#[test]
fn certify_writes_report_to_file() {
    let dir = clean_component();
    let out = tempfile::tempdir().unwrap();
    let report = out.path().join("report.json");
    connector_certify()
        .arg("certify")
        .arg(dir.path())
        .arg("--output")
        .arg(&report)
        .assert()
        .success()
        .stderr(predicate::str::contains("Output written to"));
    let content = std::fs::read_to_string(&report).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json["status"], "passed");
}

#[test]
fn certify_with_config_disabling_checks() {
    let dir = clean_component();
    std::fs::remove_file(dir.path().join("README.md")).unwrap();
    let config = dir.path().join("custom.toml");
    std::fs::write(&config, "[checks]\nreadme-present = false\n").unwrap();
    connector_certify()
        .arg("certify")
        .arg(dir.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .success();
}

#[test]
fn certify_nonexistent_path_exits_2() {
    connector_certify()
        .args(["certify", "tests/fixtures/does-not-exist"])
        .assert()
        .code(2);
}

#[test]
fn certify_missing_config_exits_2() {
    let dir = clean_component();
    connector_certify()
        .arg("certify")
        .arg(dir.path())
        .args(["--config", "no-such-certify.toml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn certify_malformed_descriptor_exits_2() {
    let dir = clean_component();
    write(dir.path(), "descriptor.toml", "version = [");
    connector_certify()
        .arg("certify")
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to load descriptor"));
}

#[test]
fn list_rules_shows_rules() {
    connector_certify()
        .args(["list-rules"])
        .assert()
        .success()
        .stdout(predicate::str::contains("license-by-category"))
        .stdout(predicate::str::contains("gitignore-exist"))
        .stdout(predicate::str::contains("snapshot-artifact-mandatory"));
}

#[test]
fn explain_known_rule() {
    connector_certify()
        .args(["explain", "functional-test-per-processor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Context:"))
        .stdout(predicate::str::contains("tree"));
}

#[test]
fn explain_configured_layout_rule() {
    connector_certify()
        .args(["explain", "readme-present"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configured directory layout"))
        .stdout(predicate::str::contains("README.md"));
}

#[test]
fn explain_unknown_rule_exits_2() {
    connector_certify()
        .args(["explain", "no-such-rule"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown rule"));
}
