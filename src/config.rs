//! Configuration loading and management.
//!
//! Provides types for the TOML-based configuration file and for issue
//! suppression rules stored in `.certify-ignore` files.
//!
//! # Configuration file
//!
//! The default configuration file is `certify.toml` in the current working
//! directory. Use [`Config::load`] to read it:
//!
//! ```rust,no_run
//! use connector_certify::config::Config;
//!
//! let config = Config::load(None).expect("failed to load config");
//! assert!(config.is_check_enabled("license-by-category"));
//! ```
//!
//! # Suppression files
//!
//! Place a `.certify-ignore` file at the root of a component to suppress
//! specific issues. See [`Suppression`] for the format and
//! [`load_suppressions`] for loading.

use crate::checks::ignore_file::{LineMatch, DEFAULT_REQUIRED};
use crate::checks::processor_tests;
use crate::error::ConfigError;
use crate::template::{Bindings, MatchMode};
use std::collections::BTreeMap;
use std::path::Path;

/// File name looked up in the working directory when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "certify.toml";

/// Suppression file looked up in the component root.
pub const IGNORE_FILE: &str = ".certify-ignore";

/// Main configuration for certification runs.
///
/// All fields carry defaults so the config file can be omitted entirely.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Per-check on/off toggles keyed by rule key. Absent keys are enabled.
    ///
    /// ```toml
    /// [checks]
    /// devkit-latest-version = false
    /// ```
    pub checks: BTreeMap<String, bool>,
    pub descriptor: DescriptorConfig,
    pub ignore_file: IgnoreFileConfig,
    pub tests: TestsConfig,
    /// Directory layout rules; each entry becomes its own check. Declaring
    /// any `[[layout]]` replaces the default `readme-present` rule.
    pub layout: Vec<LayoutRule>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            checks: BTreeMap::new(),
            descriptor: DescriptorConfig::default(),
            ignore_file: IgnoreFileConfig::default(),
            tests: TestsConfig::default(),
            layout: default_layout(),
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DescriptorConfig {
    /// Latest released parent version. The latest-version check only runs
    /// when this is set.
    pub latest_devkit_version: Option<String>,
    /// Dependency groups supplied by the runtime.
    pub provided_group_prefixes: Vec<String>,
    /// Scopes accepted in place of `provided`.
    pub exempt_scopes: Vec<String>,
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        DescriptorConfig {
            latest_devkit_version: None,
            provided_group_prefixes: vec!["org.mule".to_string(), "com.mulesoft".to_string()],
            exempt_scopes: vec!["test".to_string()],
        }
    }
}

/// Settings for the required ignore file check.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IgnoreFileConfig {
    pub file_name: String,
    pub line_match: LineMatch,
    /// Entries that must match at least one line. `re:` marks a regex.
    pub required: Vec<String>,
    /// Entries that must match no line.
    pub forbidden: Vec<String>,
}

impl Default for IgnoreFileConfig {
    fn default() -> Self {
        IgnoreFileConfig {
            file_name: ".gitignore".to_string(),
            line_match: LineMatch::default(),
            required: DEFAULT_REQUIRED.iter().map(|s| s.to_string()).collect(),
            forbidden: vec![],
        }
    }
}

/// Where functional tests live.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TestsConfig {
    /// Root searched for test files.
    pub test_root: String,
    /// Template of the functional test directory; `...` stands for any
    /// directories.
    pub functional_dir: String,
    pub processor_test_template: String,
    /// Report `*TestCases.java` files that match no processor.
    pub forbid_stray_processor_tests: bool,
}

impl Default for TestsConfig {
    fn default() -> Self {
        TestsConfig {
            test_root: "src/test/java".to_string(),
            functional_dir: "src/test/java/org/mule/modules/.../automation/functional".to_string(),
            processor_test_template: processor_tests::DEFAULT_TEMPLATE.to_string(),
            forbid_stray_processor_tests: false,
        }
    }
}

/// One `[[layout]]` entry.
///
/// ```toml
/// [[layout]]
/// key = "icons-per-size"
/// template = "icons/{connector}-{size*}.png"
/// match-mode = "exact"
/// forbid-stray = true
/// [layout.bindings]
/// connector = "salesforce"
/// size = ["24x16", "48x32"]
/// ```
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LayoutRule {
    /// Rule key reported on issues; also the `[checks]` toggle name.
    pub key: String,
    pub template: String,
    #[serde(default)]
    pub match_mode: MatchMode,
    #[serde(default)]
    pub forbid_stray: bool,
    #[serde(default)]
    pub bindings: Bindings,
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// Resolution order:
    /// 1. If `path` is `Some`, load from that file (error if missing).
    /// 2. If `path` is `None`, try `certify.toml` in the current directory.
    /// 3. If that file does not exist either, return [`Config::default()`].
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when the explicit path does not exist, or the file
    /// cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let config_path = match path {
            Some(p) if p.exists() => Some(p.to_path_buf()),
            Some(p) => return Err(ConfigError::NotFound(p.to_path_buf())),
            None => Some(Path::new(DEFAULT_CONFIG_FILE).to_path_buf()).filter(|p| p.exists()),
        };

        let Some(path) = config_path else {
            tracing::debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
            return Ok(Config::default());
        };
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Returns `true` unless the check is switched off under `[checks]`.
    ///
    /// ```
    /// use connector_certify::config::Config;
    ///
    /// let mut config = Config::default();
    /// config.checks.insert("gitignore-exist".to_string(), false);
    /// assert!(!config.is_check_enabled("gitignore-exist"));
    /// assert!(config.is_check_enabled("snapshot-artifact-mandatory"));
    /// ```
    pub fn is_check_enabled(&self, key: &str) -> bool {
        self.checks.get(key).copied().unwrap_or(true)
    }
}

impl Default for LayoutRule {
    fn default() -> Self {
        LayoutRule {
            key: "readme-present".to_string(),
            template: "README.md".to_string(),
            match_mode: MatchMode::Exact,
            forbid_stray: false,
            bindings: Bindings::new(),
        }
    }
}

/// Layout rules applied when the configuration declares none.
pub fn default_layout() -> Vec<LayoutRule> {
    vec![LayoutRule::default()]
}

/// Root structure of a `.certify-ignore` TOML file.
///
/// ```toml
/// [[suppress]]
/// rule = "functional-test-per-processor"
/// file = "src/main/java/org/mule/modules/crm/CrmConnector.java"
/// lines = "40-60"
/// reason = "Deprecated processors are covered by the legacy suite"
/// ticket = "CERT-112"
/// ```
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct SuppressionFile {
    pub suppress: Vec<Suppression>,
}

/// Silences a specific issue.
///
/// A suppression matches an [`Issue`](crate::issue::Issue) when:
/// - `rule` equals the issue's rule key.
/// - `file` is a trailing path of the issue's file (empty string acts as a
///   wildcard, and is the only value matching issues without a location).
/// - `lines` (if set) contains the issue's line number.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Suppression {
    pub rule: String,
    #[serde(default)]
    pub file: String,
    /// Line range (`"10-20"`) or single line (`"15"`).
    pub lines: Option<String>,
    pub reason: String,
    pub ticket: Option<String>,
}

/// Loads suppression rules from `.certify-ignore` in `component_dir`.
///
/// Returns an empty vector when the file is absent; an unreadable or
/// malformed file is logged and ignored.
pub fn load_suppressions(component_dir: &Path) -> Vec<Suppression> {
    let ignore_path = component_dir.join(IGNORE_FILE);
    if !ignore_path.exists() {
        return vec![];
    }

    let content = match std::fs::read_to_string(&ignore_path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(path = %ignore_path.display(), "failed to read {IGNORE_FILE}: {e}");
            return vec![];
        }
    };

    match toml::from_str::<SuppressionFile>(&content) {
        Ok(file) => file.suppress,
        Err(e) => {
            tracing::warn!(path = %ignore_path.display(), "failed to parse {IGNORE_FILE}: {e}");
            vec![]
        }
    }
}
