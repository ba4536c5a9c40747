//! Certification orchestration.
//!
//! [`run_certification`] evaluates a set of [`Check`]s against one
//! [`Component`] in parallel via [rayon], collects their results in
//! registration order and builds the [`CertificationReport`].
//! [`certify_dir`] is the convenience entry point used by the binary: it
//! assembles the component from a directory and applies its suppressions.

use crate::checks::{self, Check};
use crate::config::{self, Config, Suppression};
use crate::context::{Descriptor, DescriptorModel, FsRoot, ResourceRoot, SourceModel, SourceTree};
use crate::error::CollaboratorFault;
use crate::issue::{CertificationReport, RuleResult};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Descriptor file looked up in the component directory.
pub const DESCRIPTOR_FILE: &str = "descriptor.toml";

/// Everything the checks of one run may look at.
///
/// All three contexts are shared read-only across the parallel checks.
#[derive(Clone, Copy)]
pub struct Component<'a> {
    pub name: &'a str,
    pub tree: &'a dyn SourceTree,
    pub descriptor: &'a dyn Descriptor,
    pub resources: &'a dyn ResourceRoot,
}

/// Runs `checks` against `component`.
///
/// A check failing with a [`CollaboratorFault`] is logged, recorded on its
/// [`RuleResult`] and does not stop the others; such a run can never be
/// reported as passed.
///
/// ```rust,no_run
/// use connector_certify::certify::{run_certification, Component};
/// use connector_certify::checks::all_checks;
/// use connector_certify::config::Config;
/// use connector_certify::context::{DescriptorModel, FsRoot, SourceModel};
///
/// let tree = SourceModel::default();
/// let descriptor = DescriptorModel::default();
/// let resources = FsRoot::new("./my-connector");
/// let component = Component {
///     name: "my-connector",
///     tree: &tree,
///     descriptor: &descriptor,
///     resources: &resources,
/// };
/// let report = run_certification(&component, &all_checks(&Config::default()), &[]);
/// std::process::exit(if report.passed { 0 } else { 1 });
/// ```
pub fn run_certification(
    component: &Component<'_>,
    checks: &[Check],
    suppressions: &[Suppression],
) -> CertificationReport {
    let results: Vec<RuleResult> = checks
        .par_iter()
        .map(|check| evaluate(check, component))
        .collect();

    let report = CertificationReport::from_results(component.name, results, suppressions);
    tracing::info!(
        component = component.name,
        status = ?report.status,
        issues = report.issues.len(),
        suppressed = report.suppressed.len(),
        "certification finished"
    );
    report
}

fn evaluate(check: &Check, component: &Component<'_>) -> RuleResult {
    let started = Instant::now();
    let outcome = check.evaluate(component);
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    match outcome {
        Ok(issues) => {
            tracing::debug!(rule = check.key(), issues = issues.len(), duration_ms, "check evaluated");
            RuleResult {
                rule_key: check.key().to_string(),
                issues,
                error: None,
                duration_ms,
            }
        }
        Err(fault) => {
            tracing::warn!(rule = check.key(), "check could not run: {fault}");
            RuleResult {
                rule_key: check.key().to_string(),
                issues: vec![],
                error: Some(fault.to_string()),
                duration_ms,
            }
        }
    }
}

/// Inputs for [`certify_dir`] beyond the component directory itself.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    /// JSON source model; an empty tree when absent.
    pub tree: Option<PathBuf>,
    /// Descriptor file; `descriptor.toml` in the component directory when absent.
    pub descriptor: Option<PathBuf>,
}

/// Certifies the component rooted at `path` with every check enabled in
/// `config`, applying the suppressions found in the directory.
///
/// # Errors
///
/// Returns a [`CollaboratorFault`] when an explicitly given source model or
/// descriptor cannot be loaded. A missing default descriptor is not an
/// error: the run proceeds with an empty one and the descriptor checks
/// report what is missing.
pub fn certify_dir(
    path: &Path,
    config: &Config,
    inputs: &Inputs,
) -> Result<CertificationReport, CollaboratorFault> {
    let tree = match inputs.tree {
        Some(ref model) => SourceModel::load(model)?,
        None => SourceModel::default(),
    };
    let descriptor = match inputs.descriptor {
        Some(ref file) => DescriptorModel::load(file)?,
        None => {
            let default = path.join(DESCRIPTOR_FILE);
            if default.exists() {
                DescriptorModel::load(&default)?
            } else {
                tracing::warn!(path = %path.display(), "no {DESCRIPTOR_FILE} found, using an empty descriptor");
                DescriptorModel::default()
            }
        }
    };
    let resources = FsRoot::new(path);

    let name = component_name(path, &descriptor);
    let component = Component {
        name: &name,
        tree: &tree,
        descriptor: &descriptor,
        resources: &resources,
    };
    let checks = checks::all_checks(config);
    let suppressions = config::load_suppressions(path);
    Ok(run_certification(&component, &checks, &suppressions))
}

/// The descriptor's artifact id, else the last path component, else
/// `"unknown"`.
fn component_name(path: &Path, descriptor: &DescriptorModel) -> String {
    descriptor
        .artifact_id()
        .map(str::to_string)
        .or_else(|| path.file_name().map(|n| n.to_string_lossy().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}
