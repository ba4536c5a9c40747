//! Issue model and certification report.
//!
//! An [`Issue`] is the only thing a rule produces. The host collects every
//! rule's [`RuleResult`] into a [`CertificationReport`], which also applies
//! the component's suppressions.

use crate::error::IssueError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where an issue was detected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Location {
    pub file: PathBuf,
    pub line: Option<usize>,
}

impl Location {
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Location {
            file: file.into(),
            line: Some(line),
        }
    }

    /// A location naming a whole file.
    pub fn file(file: impl Into<PathBuf>) -> Self {
        Location {
            file: file.into(),
            line: None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.file.display(), line),
            None => write!(f, "{}", self.file.display()),
        }
    }
}

/// Distinguishes ordinary convention violations from rules that could not
/// evaluate their own inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    #[default]
    Violation,
    InvalidConfiguration,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::Violation => write!(f, "violation"),
            IssueKind::InvalidConfiguration => write!(f, "invalid configuration"),
        }
    }
}

/// A single detected problem. Immutable once created.
///
/// Deserializing goes through the same checks as [`Issue::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawIssue")]
pub struct Issue {
    rule_key: String,
    message: String,
    location: Option<Location>,
    kind: IssueKind,
}

#[derive(serde::Deserialize)]
struct RawIssue {
    rule_key: String,
    message: String,
    location: Option<Location>,
    #[serde(default)]
    kind: IssueKind,
}

impl TryFrom<RawIssue> for Issue {
    type Error = IssueError;

    fn try_from(raw: RawIssue) -> Result<Self, Self::Error> {
        Issue::with_kind(raw.rule_key, raw.message, raw.location, raw.kind)
    }
}

impl Issue {
    /// Creates a violation issue.
    ///
    /// # Errors
    ///
    /// Returns [`IssueError`] when `rule_key` or `message` is blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use connector_certify::issue::{Issue, Location};
    ///
    /// let issue = Issue::new("gitignore-exist", "missing .gitignore", None).unwrap();
    /// assert_eq!(issue.rule_key(), "gitignore-exist");
    /// assert!(Issue::new("", "message", None).is_err());
    /// # let _ = Location::file(".gitignore");
    /// ```
    pub fn new(
        rule_key: impl Into<String>,
        message: impl Into<String>,
        location: Option<Location>,
    ) -> Result<Issue, IssueError> {
        Self::with_kind(rule_key, message, location, IssueKind::Violation)
    }

    /// Creates an issue carrying the invalid-configuration marker.
    ///
    /// # Errors
    ///
    /// Returns [`IssueError`] when `rule_key` or `message` is blank.
    pub fn invalid_configuration(
        rule_key: impl Into<String>,
        message: impl Into<String>,
        location: Option<Location>,
    ) -> Result<Issue, IssueError> {
        Self::with_kind(rule_key, message, location, IssueKind::InvalidConfiguration)
    }

    fn with_kind(
        rule_key: impl Into<String>,
        message: impl Into<String>,
        location: Option<Location>,
        kind: IssueKind,
    ) -> Result<Issue, IssueError> {
        let rule_key = rule_key.into();
        let message = message.into();
        if rule_key.trim().is_empty() {
            return Err(IssueError::EmptyRuleKey);
        }
        if message.trim().is_empty() {
            return Err(IssueError::EmptyMessage { rule_key });
        }
        Ok(Issue {
            rule_key,
            message,
            location,
            kind,
        })
    }

    pub fn rule_key(&self) -> &str {
        &self.rule_key
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn kind(&self) -> IssueKind {
        self.kind
    }

    pub fn is_invalid_configuration(&self) -> bool {
        self.kind == IssueKind::InvalidConfiguration
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == IssueKind::InvalidConfiguration {
            write!(f, "[{}] ({}) {}", self.rule_key, self.kind, self.message)?;
        } else {
            write!(f, "[{}] {}", self.rule_key, self.message)?;
        }
        if let Some(ref location) = self.location {
            write!(f, " at {location}")?;
        }
        Ok(())
    }
}

/// Collects issues for one rule evaluation.
///
/// Rule keys and messages built inside the crate are never blank, so a
/// rejected issue is dropped with a log line rather than aborting the rule.
#[derive(Debug)]
pub(crate) struct IssueSink<'k> {
    rule_key: &'k str,
    issues: Vec<Issue>,
}

impl<'k> IssueSink<'k> {
    pub(crate) fn new(rule_key: &'k str) -> Self {
        IssueSink {
            rule_key,
            issues: Vec::new(),
        }
    }

    pub(crate) fn violation(&mut self, message: impl Into<String>, location: Option<Location>) {
        self.push(Issue::new(self.rule_key, message, location));
    }

    pub(crate) fn invalid_configuration(
        &mut self,
        message: impl Into<String>,
        location: Option<Location>,
    ) {
        self.push(Issue::invalid_configuration(self.rule_key, message, location));
    }

    fn push(&mut self, issue: Result<Issue, IssueError>) {
        match issue {
            Ok(issue) => self.issues.push(issue),
            Err(e) => tracing::error!(rule = self.rule_key, "dropping malformed issue: {e}"),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub(crate) fn finish(self) -> Vec<Issue> {
        self.issues
    }
}

/// Outcome of evaluating a single rule.
#[derive(Debug, serde::Serialize)]
pub struct RuleResult {
    pub rule_key: String,
    pub issues: Vec<Issue>,
    /// Collaborator fault that stopped the rule, if any.
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// Overall certification verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificationStatus {
    Passed,
    Failed,
    /// No active issues, but at least one rule could not run.
    Incomplete,
}

/// An issue that was silenced, with the reason taken from the suppression.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SuppressedIssue {
    pub issue: Issue,
    pub reason: String,
    pub ticket: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct CertificationReport {
    pub component: String,
    pub certified_at: String,
    pub status: CertificationStatus,
    pub rule_results: Vec<RuleResult>,
    pub issues: Vec<Issue>,
    pub suppressed: Vec<SuppressedIssue>,
    pub passed: bool,
}

impl CertificationReport {
    /// Concatenates rule results in the order given and applies suppressions.
    pub fn from_results(
        component: &str,
        results: Vec<RuleResult>,
        suppressions: &[crate::config::Suppression],
    ) -> Self {
        let mut active = Vec::new();
        let mut suppressed = Vec::new();

        for result in &results {
            for issue in &result.issues {
                match find_suppression(issue, suppressions) {
                    Some(s) => suppressed.push(SuppressedIssue {
                        issue: issue.clone(),
                        reason: s.reason.clone(),
                        ticket: s.ticket.clone(),
                    }),
                    None => active.push(issue.clone()),
                }
            }
        }

        let faulted = results.iter().any(|r| r.error.is_some());
        let status = if !active.is_empty() {
            CertificationStatus::Failed
        } else if faulted {
            CertificationStatus::Incomplete
        } else {
            CertificationStatus::Passed
        };

        CertificationReport {
            component: component.to_string(),
            certified_at: chrono::Utc::now().to_rfc3339(),
            status,
            rule_results: results,
            issues: active,
            suppressed,
            passed: status == CertificationStatus::Passed,
        }
    }

    /// Number of active issues carrying the invalid-configuration marker.
    pub fn invalid_configuration_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.is_invalid_configuration())
            .count()
    }

    /// Rules that failed with a collaborator fault, with the fault text.
    pub fn faults(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rule_results
            .iter()
            .filter_map(|r| r.error.as_deref().map(|e| (r.rule_key.as_str(), e)))
    }
}

fn find_suppression<'a>(
    issue: &Issue,
    suppressions: &'a [crate::config::Suppression],
) -> Option<&'a crate::config::Suppression> {
    suppressions.iter().find(|s| {
        if s.rule != issue.rule_key() {
            return false;
        }
        // Path::ends_with compares whole components, so "Test.java" does not
        // match "MyTest.java". An empty file entry is a wildcard.
        match issue.location() {
            Some(location) => {
                if !s.file.is_empty() && !location.file.ends_with(Path::new(&s.file)) {
                    return false;
                }
            }
            None => {
                if !s.file.is_empty() {
                    return false;
                }
            }
        }
        if let (Some(ref lines), Some(line)) = (&s.lines, issue.location().and_then(|l| l.line)) {
            match parse_line_range(lines) {
                Some((start, end)) if line >= start && line <= end => {}
                _ => return false,
            }
        }
        true
    })
}

fn parse_line_range(lines: &str) -> Option<(usize, usize)> {
    let parts: Vec<&str> = lines.split('-').collect();
    if parts.len() == 2 {
        let start = parts[0].trim().parse().ok()?;
        let end = parts[1].trim().parse().ok()?;
        if start > end {
            return None;
        }
        Some((start, end))
    } else if parts.len() == 1 {
        let line = parts[0].trim().parse().ok()?;
        Some((line, line))
    } else {
        None
    }
}
