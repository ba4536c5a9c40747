//! Build descriptor abstraction.

use crate::error::CollaboratorFault;
use std::collections::BTreeMap;
use std::path::Path;

/// A declared dependency of the component.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Dependency {
    pub group_id: String,
    pub artifact_id: String,
    /// `None` when the descriptor leaves the scope to its default.
    #[serde(default)]
    pub scope: Option<String>,
}

impl Dependency {
    pub fn new(group_id: &str, artifact_id: &str, scope: Option<&str>) -> Self {
        Dependency {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            scope: scope.map(str::to_string),
        }
    }

    /// `group:artifact` coordinates.
    pub fn coordinates(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

/// Read access to the component's build metadata.
pub trait Descriptor: Send + Sync {
    fn property(&self, key: &str) -> Option<&str>;

    fn dependencies(&self) -> &[Dependency];

    fn parent_version(&self) -> Option<&str>;

    fn artifact_id(&self) -> Option<&str>;

    fn version(&self) -> Option<&str>;
}

/// Descriptor snapshot, usually loaded from `descriptor.toml`.
///
/// ```toml
/// artifact-id = "salesforce-connector"
/// version = "1.0.0-SNAPSHOT"
/// parent-version = "3.9.0"
///
/// [properties]
/// category = "Premium"
///
/// [[dependencies]]
/// group-id = "org.mule.modules"
/// artifact-id = "mule-module-spring-config"
/// scope = "provided"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DescriptorModel {
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub parent_version: Option<String>,
    pub properties: BTreeMap<String, String>,
    pub dependencies: Vec<Dependency>,
}

impl DescriptorModel {
    /// Parses a TOML descriptor snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorFault::Descriptor`] on unreadable or malformed input.
    pub fn load(path: &Path) -> Result<DescriptorModel, CollaboratorFault> {
        let content = std::fs::read_to_string(path).map_err(|e| CollaboratorFault::Descriptor {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| CollaboratorFault::Descriptor {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }
}

impl Descriptor for DescriptorModel {
    fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    fn parent_version(&self) -> Option<&str> {
        self.parent_version.as_deref()
    }

    fn artifact_id(&self) -> Option<&str> {
        self.artifact_id.as_deref()
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}
