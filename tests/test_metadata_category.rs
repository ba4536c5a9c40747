use std::path::Path;

use connector_certify::checks::metadata_category::{category_of, MetadataCategoryTestCheck};
use connector_certify::checks::{TreeCheck, TreeContext};
use connector_certify::context::{DescriptorModel, FsRoot, Marker, Node, SourceModel};
use connector_certify::issue::Issue;

const FUNCTIONAL_DIR: &str = "src/test/java/org/mule/modules/.../automation/functional";
const FUNCTIONAL: &str = "src/test/java/org/mule/modules/crm/automation/functional";

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, "").unwrap();
}

fn metadata_class(name: &str) -> Node {
    Node::class(name, format!("src/main/java/org/mule/modules/crm/{name}.java"), 7)
        .with_marker(Marker::new("MetaDataCategory"))
}

fn evaluate(root: &Path, classes: Vec<Node>) -> Vec<Issue> {
    let tree = SourceModel::new(classes);
    let descriptor = DescriptorModel::default();
    let resources = FsRoot::new(root);
    MetadataCategoryTestCheck::new("src/test/java", FUNCTIONAL_DIR)
        .evaluate(&TreeContext {
            tree: &tree,
            descriptor: &descriptor,
            resources: &resources,
        })
        .unwrap()
}

#[test]
fn category_strips_metadata_from_class_name() {
    assert_eq!(category_of("AccountMetaData"), "Account");
    assert_eq!(category_of("ContactMetadata"), "Contact");
    assert_eq!(category_of("Plain"), "Plain");
}

#[test]
fn one_test_in_functional_dir_passes() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), &format!("{FUNCTIONAL}/AccountMetaDataTestCases.java"));
    let issues = evaluate(dir.path(), vec![metadata_class("AccountMetaData")]);
    assert!(issues.is_empty(), "{issues:?}");
}

#[test]
fn missing_test_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let issues = evaluate(dir.path(), vec![metadata_class("AccountMetaData")]);
    assert_eq!(issues.len(), 1);
    assert_eq!(
        issues[0].message(),
        "There should be one functional test per metadata category. Add test 'AccountMetaDataTestCases' for category 'Account'."
    );
    assert_eq!(issues[0].location().and_then(|l| l.line), Some(7));
}

#[test]
fn duplicated_test_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), &format!("{FUNCTIONAL}/AccountMetaDataTestCases.java"));
    touch(dir.path(), "src/test/java/legacy/AccountMetaDataTestCases.java");
    let issues = evaluate(dir.path(), vec![metadata_class("AccountMetaData")]);
    assert_eq!(issues.len(), 1);
    assert!(issues[0].message().starts_with("There should be one functional test"));
}

#[test]
fn misplaced_test_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "src/test/java/org/mule/modules/crm/AccountMetaDataTestCases.java");
    let issues = evaluate(dir.path(), vec![metadata_class("AccountMetaData")]);
    assert_eq!(issues.len(), 1);
    assert_eq!(
        issues[0].message(),
        format!("'AccountMetaDataTestCases' must be placed under directory '{FUNCTIONAL_DIR}'.")
    );
}

#[test]
fn classes_without_marker_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let plain = Node::class("AccountMetaData", "src/main/java/AccountMetaData.java", 1);
    assert!(evaluate(dir.path(), vec![plain]).is_empty());
}
