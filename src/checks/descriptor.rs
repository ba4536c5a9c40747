//! Build descriptor checks.
//!
//! | Key | What it checks |
//! |-----|----------------|
//! | `scope-provided-in-mule-dependencies` | runtime dependencies are `provided` |
//! | `snapshot-artifact-mandatory` | the artifact version is a snapshot |
//! | `devkit-latest-version` | the parent version is the latest known release |

use crate::checks::{DescriptorCheck, RuleInfo};
use crate::context::Descriptor;
use crate::issue::{Issue, IssueSink};

pub const PROVIDED_SCOPE_KEY: &str = "scope-provided-in-mule-dependencies";
pub const SNAPSHOT_KEY: &str = "snapshot-artifact-mandatory";
pub const LATEST_VERSION_KEY: &str = "devkit-latest-version";

const PROVIDED: &str = "provided";
/// Scope assumed when a dependency declares none.
const DEFAULT_SCOPE: &str = "compile";
const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Dependencies whose group starts with one of `group_prefixes` must be
/// declared `provided`, unless their scope is exempt.
#[derive(Debug)]
pub struct ProvidedScopeCheck {
    group_prefixes: Vec<String>,
    exempt_scopes: Vec<String>,
}

impl ProvidedScopeCheck {
    pub fn new(group_prefixes: Vec<String>, exempt_scopes: Vec<String>) -> Self {
        ProvidedScopeCheck {
            group_prefixes,
            exempt_scopes,
        }
    }

    fn governs(&self, group_id: &str) -> bool {
        self.group_prefixes.iter().any(|p| group_id.starts_with(p.as_str()))
    }
}

impl DescriptorCheck for ProvidedScopeCheck {
    fn key(&self) -> &str {
        PROVIDED_SCOPE_KEY
    }

    fn evaluate(&self, descriptor: &dyn Descriptor) -> Vec<Issue> {
        let mut sink = IssueSink::new(PROVIDED_SCOPE_KEY);
        for dependency in descriptor.dependencies() {
            if !self.governs(&dependency.group_id) {
                continue;
            }
            let scope = dependency.scope.as_deref().unwrap_or(DEFAULT_SCOPE);
            if scope == PROVIDED || self.exempt_scopes.iter().any(|s| s == scope) {
                continue;
            }
            sink.violation(
                format!(
                    "Dependency '{}' must have scope '{PROVIDED}'. Current scope is '{scope}'.",
                    dependency.coordinates()
                ),
                None,
            );
        }
        sink.finish()
    }
}

/// The artifact under development must carry a snapshot version.
#[derive(Debug, Default)]
pub struct SnapshotVersionCheck;

impl DescriptorCheck for SnapshotVersionCheck {
    fn key(&self) -> &str {
        SNAPSHOT_KEY
    }

    fn evaluate(&self, descriptor: &dyn Descriptor) -> Vec<Issue> {
        let mut sink = IssueSink::new(SNAPSHOT_KEY);
        let Some(version) = descriptor.version() else {
            sink.invalid_configuration("Descriptor does not declare the artifact version", None);
            return sink.finish();
        };
        if !version.ends_with(SNAPSHOT_SUFFIX) {
            let artifact = descriptor.artifact_id().unwrap_or("unknown");
            sink.violation(
                format!(
                    "Project artifact ({artifact}) MUST have a SNAPSHOT. Current version is ({version}) but it should be ({version}{SNAPSHOT_SUFFIX})."
                ),
                None,
            );
        }
        sink.finish()
    }
}

/// The parent (framework) version must equal the latest known release.
#[derive(Debug)]
pub struct LatestParentVersionCheck {
    latest: String,
}

impl LatestParentVersionCheck {
    pub fn new(latest: &str) -> Self {
        LatestParentVersionCheck {
            latest: latest.to_string(),
        }
    }
}

impl DescriptorCheck for LatestParentVersionCheck {
    fn key(&self) -> &str {
        LATEST_VERSION_KEY
    }

    fn evaluate(&self, descriptor: &dyn Descriptor) -> Vec<Issue> {
        let mut sink = IssueSink::new(LATEST_VERSION_KEY);
        match descriptor.parent_version() {
            None => sink.invalid_configuration("Descriptor does not declare a parent version", None),
            Some(current) if current.trim() != self.latest => sink.violation(
                format!(
                    "Current connector Devkit version '{current}' is not the latest stable version. If feasible, use version '{}'.",
                    self.latest
                ),
                None,
            ),
            Some(_) => {}
        }
        sink.finish()
    }
}

pub fn rules() -> Vec<RuleInfo> {
    vec![
        RuleInfo {
            key: PROVIDED_SCOPE_KEY,
            priority: "critical",
            context: "descriptor",
            name: "Mule dependencies must be declared with 'provided' scope",
            description: "Dependencies whose group id starts with a configured prefix (org.mule, com.mulesoft) are supplied by the runtime and must use scope 'provided'. Exempt scopes (default: test) are allowed; a missing scope counts as 'compile'.",
        },
        RuleInfo {
            key: SNAPSHOT_KEY,
            priority: "major",
            context: "descriptor",
            name: "Connector artifact version must be a SNAPSHOT",
            description: "The artifact version in the descriptor must end with '-SNAPSHOT'.",
        },
        RuleInfo {
            key: LATEST_VERSION_KEY,
            priority: "minor",
            context: "descriptor",
            name: "Connector should use the latest stable Devkit version",
            description: "Compares the descriptor's parent version with [descriptor] latest-devkit-version from certify.toml. Only runs when that setting is present.",
        },
    ]
}
