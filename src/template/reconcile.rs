use super::path_matcher;
use crate::error::TemplateError;
use regex::Regex;
use std::collections::BTreeSet;

/// How an expected path is compared with actual paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// String equality.
    #[default]
    Exact,
    /// Expected paths are patterns: `*` matches within a segment and a `...`
    /// segment matches one or more directories.
    Pattern,
}

#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    pub mode: MatchMode,
    /// When set, actual paths matching this shape but no expected path are
    /// reported as unexpected. Left `None` by checks that tolerate stray files.
    pub stray_shape: Option<Regex>,
}

impl ReconcileOptions {
    pub fn new(mode: MatchMode) -> Self {
        ReconcileOptions {
            mode,
            stray_shape: None,
        }
    }

    pub fn forbid_stray(mut self, shape: Regex) -> Self {
        self.stray_shape = Some(shape);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Expected paths with no actual counterpart, in expected order.
    pub missing: Vec<String>,
    /// Stray actual paths, in sorted order.
    pub unexpected: Vec<String>,
}

impl Reconciliation {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }
}

/// Compares required paths against the paths that exist.
///
/// # Errors
///
/// [`TemplateError::Matcher`] if an expected path cannot be compiled in
/// [`MatchMode::Pattern`].
///
/// ```
/// use connector_certify::template::{reconcile, MatchMode, ReconcileOptions};
/// use std::collections::BTreeSet;
///
/// let expected = vec!["src/a.txt".to_string(), "src/b.txt".to_string()];
/// let actual: BTreeSet<String> = ["src/a.txt".to_string()].into();
/// let result = reconcile(&expected, &actual, &ReconcileOptions::new(MatchMode::Exact)).unwrap();
/// assert_eq!(result.missing, vec!["src/b.txt"]);
/// ```
pub fn reconcile(
    expected: &[String],
    actual: &BTreeSet<String>,
    options: &ReconcileOptions,
) -> Result<Reconciliation, TemplateError> {
    let matchers: Vec<Matcher<'_>> = match options.mode {
        MatchMode::Exact => expected.iter().map(|p| Matcher::Exact(p.as_str())).collect(),
        MatchMode::Pattern => expected
            .iter()
            .map(|p| path_matcher(p).map(Matcher::Pattern))
            .collect::<Result<_, _>>()?,
    };

    let missing = expected
        .iter()
        .zip(&matchers)
        .filter(|(_, m)| !actual.iter().any(|a| m.matches(a)))
        .map(|(p, _)| p.clone())
        .collect();

    let unexpected = match options.stray_shape {
        Some(ref shape) => actual
            .iter()
            .filter(|a| shape.is_match(a))
            .filter(|a| !matchers.iter().any(|m| m.matches(a)))
            .cloned()
            .collect(),
        None => vec![],
    };

    Ok(Reconciliation {
        missing,
        unexpected,
    })
}

enum Matcher<'a> {
    Exact(&'a str),
    Pattern(Regex),
}

impl Matcher<'_> {
    fn matches(&self, path: &str) -> bool {
        match self {
            Matcher::Exact(expected) => *expected == path,
            Matcher::Pattern(re) => re.is_match(path),
        }
    }
}
