use std::path::Path;

use connector_certify::certify::{certify_dir, run_certification, Component, Inputs};
use connector_certify::checks::ignore_file::RequiredFileCheck;
use connector_certify::checks::{all_checks, all_rules, find_rule, Check};
use connector_certify::config::{Config, IgnoreFileConfig};
use connector_certify::context::{DescriptorModel, FsRoot, ResourceRoot, SourceModel};
use connector_certify::error::CollaboratorFault;
use connector_certify::issue::CertificationStatus;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const GITIGNORE: &str = "*.class\n*.jar\n*.war\ntarget/\n.classpath\n.settings/\n.project\n.factorypath\n.idea/\n*.iml\n*.ipr\n*.iws\n.DS_Store\n";

const DESCRIPTOR: &str = r#"
artifact-id = "crm-connector"
version = "1.0.0-SNAPSHOT"
parent-version = "3.9.0"

[properties]
category = "Community"
"#;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn clean_component(root: &Path) {
    write(root, ".gitignore", GITIGNORE);
    write(root, "README.md", "# CRM connector\n");
    write(root, "descriptor.toml", DESCRIPTOR);
}

/// Fails every filesystem access.
struct BrokenRoot;

impl ResourceRoot for BrokenRoot {
    fn base_dir(&self) -> &Path {
        Path::new("/unavailable")
    }

    fn list_files(&self, dir: &str, _: &str, _: bool) -> Result<Vec<String>, CollaboratorFault> {
        Err(CollaboratorFault::Io {
            path: Path::new(dir).to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        })
    }

    fn read_lines(&self, path: &str) -> Result<Vec<String>, CollaboratorFault> {
        self.list_files(path, "*", false)
    }
}

// ---------------------------------------------------------------------------
// Check registration
// ---------------------------------------------------------------------------

#[test]
fn default_config_registers_every_check_but_latest_version() {
    let keys: Vec<String> = all_checks(&Config::default())
        .iter()
        .map(|c| c.key().to_string())
        .collect();
    assert_eq!(
        keys,
        vec![
            "license-by-category",
            "test-suite-annotations",
            "functional-test-suite-coverage",
            "functional-test-per-metadata-category",
            "functional-test-per-processor",
            "gitignore-exist",
            "scope-provided-in-mule-dependencies",
            "snapshot-artifact-mandatory",
            "readme-present",
        ]
    );
}

#[test]
fn latest_version_check_registered_when_configured() {
    let mut config = Config::default();
    config.descriptor.latest_devkit_version = Some("3.9.0".to_string());
    assert!(all_checks(&config).iter().any(|c| c.key() == "devkit-latest-version"));
}

#[test]
fn disabled_checks_are_skipped() {
    let mut config = Config::default();
    config.checks.insert("gitignore-exist".to_string(), false);
    config.checks.insert("readme-present".to_string(), false);
    let checks = all_checks(&config);
    assert!(!checks.iter().any(|c| c.key() == "gitignore-exist"));
    assert!(!checks.iter().any(|c| c.key() == "readme-present"));
}

#[test]
fn directory_layout_toggle_disables_every_layout_rule() {
    let mut config = Config::default();
    config.checks.insert("directory-layout".to_string(), false);
    assert!(!all_checks(&config).iter().any(|c| c.key() == "readme-present"));
}

#[test]
fn layout_entry_keys_resolve_to_layout_catalogue_entry() {
    let config = Config::default();
    let rule = find_rule(&config, "readme-present").unwrap();
    assert_eq!(rule.key, "directory-layout");
    assert_eq!(find_rule(&config, "gitignore-exist").unwrap().key, "gitignore-exist");
    assert!(find_rule(&config, "no-such-rule").is_none());
}

#[test]
fn rule_catalogue_keys_are_unique() {
    let rules = all_rules();
    let mut keys: Vec<&str> = rules.iter().map(|r| r.key).collect();
    keys.sort_unstable();
    keys.dedup();
    assert_eq!(keys.len(), rules.len());
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[test]
fn collaborator_fault_makes_run_incomplete() {
    let tree = SourceModel::default();
    let descriptor = DescriptorModel::default();
    let component = Component {
        name: "crm",
        tree: &tree,
        descriptor: &descriptor,
        resources: &BrokenRoot,
    };
    let checks = vec![Check::resource(RequiredFileCheck::from_config(
        &IgnoreFileConfig::default(),
    ))];

    let report = run_certification(&component, &checks, &[]);
    assert_eq!(report.status, CertificationStatus::Incomplete);
    assert!(!report.passed);
    assert!(report.rule_results[0].error.is_some());
    assert!(report.issues.is_empty());
}

#[test]
fn results_follow_registration_order() {
    let dir = tempfile::tempdir().unwrap();
    let tree = SourceModel::default();
    let descriptor = DescriptorModel::default();
    let resources = FsRoot::new(dir.path());
    let component = Component {
        name: "crm",
        tree: &tree,
        descriptor: &descriptor,
        resources: &resources,
    };
    let checks = all_checks(&Config::default());

    let report = run_certification(&component, &checks, &[]);
    let keys: Vec<&str> = report.rule_results.iter().map(|r| r.rule_key.as_str()).collect();
    let expected: Vec<&str> = checks.iter().map(|c| c.key()).collect();
    assert_eq!(keys, expected);
    assert_eq!(report.status, CertificationStatus::Failed);
}

#[test]
fn clean_component_directory_passes() {
    let dir = tempfile::tempdir().unwrap();
    clean_component(dir.path());

    let report = certify_dir(dir.path(), &Config::default(), &Inputs::default()).unwrap();
    assert_eq!(report.component, "crm-connector");
    assert!(report.passed, "unexpected issues: {:?}", report.issues);
}

#[test]
fn suppression_file_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    clean_component(dir.path());
    std::fs::remove_file(dir.path().join("README.md")).unwrap();
    write(
        dir.path(),
        ".certify-ignore",
        r#"
[[suppress]]
rule = "readme-present"
file = ""
reason = "Documentation lives in the wiki"
"#,
    );

    let report = certify_dir(dir.path(), &Config::default(), &Inputs::default()).unwrap();
    assert!(report.passed);
    assert_eq!(report.suppressed.len(), 1);
}

#[test]
fn source_model_drives_tree_checks() {
    let dir = tempfile::tempdir().unwrap();
    clean_component(dir.path());
    let model = dir.path().join("model.json");
    write(
        dir.path(),
        "model.json",
        r#"{
  "classes": [
    {
      "kind": "class",
      "name": "CrmTestSuite",
      "file": "src/test/java/org/mule/modules/crm/automation/CrmTestSuite.java",
      "line": 12,
      "markers": [
        { "name": "RunWith", "arguments": [ { "value": { "type": "class_ref", "name": "Parameterized" } } ] }
      ]
    }
  ]
}"#,
    );

    let inputs = Inputs {
        tree: Some(model),
        descriptor: None,
    };
    let report = certify_dir(dir.path(), &Config::default(), &inputs).unwrap();
    let keys: Vec<&str> = report.issues.iter().map(|i| i.rule_key()).collect();
    assert_eq!(
        keys,
        vec!["test-suite-annotations", "functional-test-suite-coverage"]
    );
}

#[test]
fn unreadable_explicit_model_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = Inputs {
        tree: Some(dir.path().join("missing.json")),
        descriptor: None,
    };
    assert!(certify_dir(dir.path(), &Config::default(), &inputs).is_err());
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn config_loads_kebab_case_sections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("certify.toml");
    std::fs::write(
        &path,
        r#"
[checks]
snapshot-artifact-mandatory = false

[descriptor]
latest-devkit-version = "3.9.0"

[ignore-file]
line-match = "exact"
required = ["target/"]

[tests]
forbid-stray-processor-tests = true

[[layout]]
key = "license-file"
template = "LICENSE.md"
"#,
    )
    .unwrap();

    let config = Config::load(Some(path.as_path())).unwrap();
    assert!(!config.is_check_enabled("snapshot-artifact-mandatory"));
    assert_eq!(config.descriptor.latest_devkit_version.as_deref(), Some("3.9.0"));
    assert_eq!(config.descriptor.exempt_scopes, vec!["test"]);
    assert_eq!(config.ignore_file.required, vec!["target/"]);
    assert_eq!(config.ignore_file.file_name, ".gitignore");
    assert!(config.tests.forbid_stray_processor_tests);
    assert_eq!(config.tests.test_root, "src/test/java");
    assert_eq!(config.layout.len(), 1);
    assert_eq!(config.layout[0].key, "license-file");
}

#[test]
fn config_missing_explicit_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(Config::load(Some(missing.as_path())).is_err());
}

#[test]
fn config_with_invalid_toml_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("certify.toml");
    std::fs::write(&path, "[checks\n").unwrap();
    assert!(Config::load(Some(path.as_path())).is_err());
}
