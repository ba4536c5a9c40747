//! One functional test per metadata category.
//!
//! A class carrying `MetaDataCategory` named `AccountMetaData` belongs to
//! category `Account` and must be covered by exactly one
//! `AccountMetaDataTestCases.java`, placed in the functional test directory.

use crate::checks::{RuleInfo, TreeCheck, TreeContext};
use crate::context::{Node, NodeKind};
use crate::error::{CollaboratorFault, TemplateError};
use crate::issue::{Issue, IssueSink};
use crate::template::{reconcile, Bindings, MatchMode, PathTemplate, ReconcileOptions};
use std::collections::BTreeSet;

pub const KEY: &str = "functional-test-per-metadata-category";

const METADATA_CATEGORY: &str = "MetaDataCategory";
const TEST_SUFFIX: &str = "MetaDataTestCases";

/// Category named by a metadata class: the class name without its
/// `MetaData` (or `Metadata`) part.
///
/// ```
/// use connector_certify::checks::metadata_category::category_of;
///
/// assert_eq!(category_of("AccountMetaData"), "Account");
/// assert_eq!(category_of("InvoiceMetadataCategory"), "InvoiceCategory");
/// ```
pub fn category_of(class_name: &str) -> String {
    class_name.replace("MetaData", "").replace("Metadata", "")
}

#[derive(Debug)]
pub struct MetadataCategoryTestCheck {
    test_root: String,
    functional_dir: String,
    template: Result<PathTemplate, TemplateError>,
}

impl MetadataCategoryTestCheck {
    pub fn new(test_root: &str, functional_dir: &str) -> Self {
        MetadataCategoryTestCheck {
            test_root: test_root.to_string(),
            functional_dir: functional_dir.to_string(),
            template: PathTemplate::parse(&format!(
                "{functional_dir}/{{category*}}{TEST_SUFFIX}.java"
            )),
        }
    }

    /// Checks placement of a single test file found for `category`.
    fn check_placement(
        &self,
        sink: &mut IssueSink<'_>,
        class: &Node,
        category: &str,
        found: String,
    ) {
        let template = match self.template {
            Ok(ref t) => t,
            Err(ref e) => {
                sink.invalid_configuration(e.to_string(), Some(class.location()));
                return;
            }
        };
        let actual = BTreeSet::from([found]);
        let placed = template
            .expand(&Bindings::new().many("category", [category]))
            .and_then(|expected| {
                reconcile(&expected, &actual, &ReconcileOptions::new(MatchMode::Pattern))
            });
        match placed {
            Ok(result) if result.missing.is_empty() => {}
            Ok(_) => sink.violation(
                format!(
                    "'{category}{TEST_SUFFIX}' must be placed under directory '{}'.",
                    self.functional_dir
                ),
                Some(class.location()),
            ),
            Err(e) => sink.invalid_configuration(e.to_string(), Some(class.location())),
        }
    }
}

impl TreeCheck for MetadataCategoryTestCheck {
    fn key(&self) -> &str {
        KEY
    }

    fn evaluate(&self, ctx: &TreeContext<'_>) -> Result<Vec<Issue>, CollaboratorFault> {
        let mut sink = IssueSink::new(KEY);
        let classes = ctx
            .tree
            .nodes_of_kind(NodeKind::Class)
            .into_iter()
            .filter(|c| c.has_marker(METADATA_CATEGORY));

        for class in classes {
            let category = category_of(&class.name);
            let test = format!("{category}{TEST_SUFFIX}");
            let mut found = ctx
                .resources
                .list_files(&self.test_root, &format!("{test}.java"), true)?;
            tracing::debug!(rule = KEY, category = %category, found = found.len(), "metadata category tests");

            match found.pop() {
                Some(file) if found.is_empty() => {
                    self.check_placement(&mut sink, class, &category, file)
                }
                _ => sink.violation(
                    format!(
                        "There should be one functional test per metadata category. Add test '{test}' for category '{category}'."
                    ),
                    Some(class.location()),
                ),
            }
        }

        Ok(sink.finish())
    }
}

pub fn rules() -> Vec<RuleInfo> {
    vec![RuleInfo {
        key: KEY,
        priority: "major",
        context: "tree",
        name: "One functional test per metadata category",
        description: "Each @MetaDataCategory class needs exactly one '<Category>MetaDataTestCases.java' under 'src/test/java/.../automation/functional'.",
    }]
}
