//! Certification checks.
//!
//! Every check implements exactly one of three traits, depending on the
//! context it evaluates:
//!
//! - [`TreeCheck`]: visits the parsed source tree: [`license`],
//!   [`suite`], [`metadata_category`], [`processor_tests`].
//! - [`DescriptorCheck`]: inspects build metadata: [`descriptor`].
//! - [`ResourceCheck`]: inspects the component's files: [`ignore_file`],
//!   [`layout`].
//!
//! [`Check`] wraps the three so a host can hold them in one list. Use
//! [`all_checks`] to build the enabled set from a [`Config`] and
//! [`all_rules`] to list the catalogue.

pub mod descriptor;
pub mod ignore_file;
pub mod layout;
pub mod license;
pub mod metadata_category;
pub mod suite;

use crate::certify::Component;
use crate::config::Config;
use crate::context::{Descriptor, ResourceRoot, SourceTree};
use crate::error::CollaboratorFault;
use crate::issue::Issue;

/// What a [`TreeCheck`] may look at.
///
/// The tree is the subject; the descriptor and resources are consulted for
/// configuration (for example the license tier) and cross-references (for
/// example test files named after annotated classes).
#[derive(Clone, Copy)]
pub struct TreeContext<'a> {
    pub tree: &'a dyn SourceTree,
    pub descriptor: &'a dyn Descriptor,
    pub resources: &'a dyn ResourceRoot,
}

/// A check over the parsed source tree.
///
/// Implementers **must** be [`Send`] + [`Sync`]: the host evaluates checks
/// in parallel via [rayon].
pub trait TreeCheck: Send + Sync {
    fn key(&self) -> &str;

    /// Visits the tree and returns one issue per failing target node, in
    /// traversal order.
    ///
    /// # Errors
    ///
    /// Only [`CollaboratorFault`]s; convention problems are issues.
    fn evaluate(&self, ctx: &TreeContext<'_>) -> Result<Vec<Issue>, CollaboratorFault>;
}

/// A check over build metadata.
pub trait DescriptorCheck: Send + Sync {
    fn key(&self) -> &str;

    fn evaluate(&self, descriptor: &dyn Descriptor) -> Vec<Issue>;
}

/// A check over the files of a component.
pub trait ResourceCheck: Send + Sync {
    fn key(&self) -> &str;

    /// # Errors
    ///
    /// Only [`CollaboratorFault`]s raised by `root`.
    fn evaluate(&self, root: &dyn ResourceRoot) -> Result<Vec<Issue>, CollaboratorFault>;
}

/// Any check, tagged with the context it needs.
pub enum Check {
    Tree(Box<dyn TreeCheck>),
    Descriptor(Box<dyn DescriptorCheck>),
    Resource(Box<dyn ResourceCheck>),
}

impl Check {
    pub fn tree(check: impl TreeCheck + 'static) -> Self {
        Check::Tree(Box::new(check))
    }

    pub fn descriptor(check: impl DescriptorCheck + 'static) -> Self {
        Check::Descriptor(Box::new(check))
    }

    pub fn resource(check: impl ResourceCheck + 'static) -> Self {
        Check::Resource(Box::new(check))
    }

    pub fn key(&self) -> &str {
        match self {
            Check::Tree(c) => c.key(),
            Check::Descriptor(c) => c.key(),
            Check::Resource(c) => c.key(),
        }
    }

    /// Feeds the check the part of `component` it evaluates.
    ///
    /// # Errors
    ///
    /// Propagates the check's [`CollaboratorFault`].
    pub fn evaluate(&self, component: &Component<'_>) -> Result<Vec<Issue>, CollaboratorFault> {
        match self {
            Check::Tree(c) => c.evaluate(&TreeContext {
                tree: component.tree,
                descriptor: component.descriptor,
                resources: component.resources,
            }),
            Check::Descriptor(c) => Ok(c.evaluate(component.descriptor)),
            Check::Resource(c) => c.evaluate(component.resources),
        }
    }
}

impl std::fmt::Debug for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let variant = match self {
            Check::Tree(_) => "Tree",
            Check::Descriptor(_) => "Descriptor",
            Check::Resource(_) => "Resource",
        };
        write!(f, "Check::{variant}({})", self.key())
    }
}

/// Builds every enabled check from `config`, in catalogue order.
///
/// The latest-version check is only registered when a latest known version
/// is configured; each `[[layout]]` entry becomes one layout check, and
/// disabling `directory-layout` turns all of them off.
pub fn all_checks(config: &Config) -> Vec<Check> {
    let mut checks = vec![
        Check::tree(license::LicenseByCategoryCheck::new()),
        Check::tree(suite::SuiteRunnerCheck),
        Check::tree(suite::SuiteCoverageCheck::new(
            &config.tests.test_root,
            &config.tests.functional_dir,
        )),
        Check::tree(metadata_category::MetadataCategoryTestCheck::new(
            &config.tests.test_root,
            &config.tests.functional_dir,
        )),
        Check::tree(processor_tests::ProcessorTestCheck::new(
            &config.tests.processor_test_template,
            config.tests.forbid_stray_processor_tests,
        )),
        Check::resource(ignore_file::RequiredFileCheck::from_config(&config.ignore_file)),
        Check::descriptor(descriptor::ProvidedScopeCheck::new(
            config.descriptor.provided_group_prefixes.clone(),
            config.descriptor.exempt_scopes.clone(),
        )),
        Check::descriptor(descriptor::SnapshotVersionCheck),
    ];

    if let Some(ref latest) = config.descriptor.latest_devkit_version {
        checks.push(Check::descriptor(descriptor::LatestParentVersionCheck::new(
            latest,
        )));
    }

    if config.is_check_enabled(layout::KEY) {
        checks.extend(
            config
                .layout
                .iter()
                .map(|rule| Check::resource(layout::LayoutCheck::from_config(rule))),
        );
    }

    checks
        .into_iter()
        .filter(|c| config.is_check_enabled(c.key()))
        .collect()
}

/// Catalogue entry for a rule.
///
/// Returned by [`all_rules`] and used by the `list-rules` and `explain`
/// commands.
pub struct RuleInfo {
    pub key: &'static str,
    /// `"critical"`, `"major"` or `"minor"`.
    pub priority: &'static str,
    /// Context the rule evaluates: `"tree"`, `"descriptor"` or `"resource"`.
    pub context: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// Aggregates [`RuleInfo`] from every check module.
pub fn all_rules() -> Vec<RuleInfo> {
    let mut rules = Vec::new();
    rules.extend(license::rules());
    rules.extend(suite::rules());
    rules.extend(metadata_category::rules());
    rules.extend(processor_tests::rules());
    rules.extend(ignore_file::rules());
    rules.extend(layout::rules());
    rules.extend(descriptor::rules());
    rules
}

/// Looks a rule up by key. A key declared by a `[[layout]]` entry resolves
/// to the layout catalogue entry.
pub fn find_rule(config: &Config, key: &str) -> Option<RuleInfo> {
    let mut rules = all_rules();
    let key = if config.layout.iter().any(|rule| rule.key == key) {
        layout::KEY
    } else {
        key
    };
    let index = rules.iter().position(|r| r.key == key)?;
    Some(rules.swap_remove(index))
}
