//! Templated path verification.
//!
//! A [`PathTemplate`] is a `/`-separated path pattern with named
//! placeholders:
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `{name}` | single-valued placeholder, bound with [`Binding::One`] |
//! | `{name*}` | domain placeholder, bound with [`Binding::Many`] |
//! | `...` (whole segment) | one or more intermediate directories |
//!
//! [`PathTemplate::expand`] turns a template plus [`Bindings`] into every
//! concrete path the convention requires (the Cartesian product of all
//! domains), and [`reconcile`] compares those against the files that exist.
//!
//! ```
//! use connector_certify::template::{Bindings, PathTemplate};
//!
//! let template = PathTemplate::parse("src/test/{module}/{category*}TestCases.java").unwrap();
//! let bindings = Bindings::new()
//!     .one("module", "billing")
//!     .many("category", ["Auth", "Search"]);
//! assert_eq!(
//!     template.expand(&bindings).unwrap(),
//!     vec![
//!         "src/test/billing/AuthTestCases.java",
//!         "src/test/billing/SearchTestCases.java",
//!     ]
//! );
//! ```

mod reconcile;

pub use reconcile::{reconcile, MatchMode, ReconcileOptions, Reconciliation};

use crate::error::TemplateError;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

/// Segment standing for one or more directories.
pub const ANY_DIRS: &str = "...";

/// Whether a placeholder takes one value or a domain of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Single,
    Domain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Placeholder {
    name: String,
    role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(String),
    /// Index into `PathTemplate::placeholders`.
    Slot(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Pieces(Vec<Piece>),
    AnyDirs,
}

/// A parsed path pattern. Immutable; expansion is a pure function of the
/// template and its bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    pattern: String,
    segments: Vec<Segment>,
    /// Distinct placeholders in order of first appearance.
    placeholders: Vec<Placeholder>,
}

/// A value bound to a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Binding {
    One(String),
    Many(Vec<String>),
}

/// Placeholder name → binding.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Bindings(BTreeMap<String, Binding>);

impl Bindings {
    pub fn new() -> Self {
        Bindings::default()
    }

    pub fn one(mut self, name: &str, value: impl Into<String>) -> Self {
        self.0.insert(name.to_string(), Binding::One(value.into()));
        self
    }

    pub fn many<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.insert(
            name.to_string(),
            Binding::Many(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.0.get(name)
    }
}

/// One produced path together with the domain values that produced it,
/// one value per domain placeholder in order of first appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub values: Vec<String>,
    pub path: String,
}

impl PathTemplate {
    /// Parses `pattern`.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::Syntax`] for nested or unbalanced braces, empty or
    ///   invalid placeholder names and empty path segments.
    /// - [`TemplateError::RoleConflict`] when a name is used both as `{x}`
    ///   and `{x*}`.
    pub fn parse(pattern: &str) -> Result<PathTemplate, TemplateError> {
        let syntax = |reason: String| TemplateError::Syntax {
            pattern: pattern.to_string(),
            reason,
        };

        if pattern.trim().is_empty() {
            return Err(syntax("pattern is empty".to_string()));
        }

        let mut placeholders: Vec<Placeholder> = Vec::new();
        let mut segments = Vec::new();

        for (index, raw) in pattern.split('/').enumerate() {
            if raw.is_empty() {
                return Err(syntax(format!("empty path segment at position {}", index + 1)));
            }
            if raw == ANY_DIRS {
                segments.push(Segment::AnyDirs);
                continue;
            }

            let mut pieces = Vec::new();
            let mut text = String::new();
            let mut open: Option<String> = None;

            for c in raw.chars() {
                match c {
                    '{' if open.is_some() => {
                        return Err(syntax(format!("nested '{{' in segment '{raw}'")));
                    }
                    '{' => {
                        if !text.is_empty() {
                            pieces.push(Piece::Text(std::mem::take(&mut text)));
                        }
                        open = Some(String::new());
                    }
                    '}' => match open.take() {
                        Some(inner) => {
                            let slot = declare(pattern, &mut placeholders, &inner)?;
                            pieces.push(Piece::Slot(slot));
                        }
                        None => {
                            return Err(syntax(format!("unmatched '}}' in segment '{raw}'")));
                        }
                    },
                    c => match open.as_mut() {
                        Some(name) => name.push(c),
                        None => text.push(c),
                    },
                }
            }
            if open.is_some() {
                return Err(syntax(format!("unclosed '{{' in segment '{raw}'")));
            }
            if !text.is_empty() {
                pieces.push(Piece::Text(text));
            }
            segments.push(Segment::Pieces(pieces));
        }

        Ok(PathTemplate {
            pattern: pattern.to_string(),
            segments,
            placeholders,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Placeholder names with their roles, in order of first appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = (&str, Role)> {
        self.placeholders.iter().map(|p| (p.name.as_str(), p.role))
    }

    /// Expands the template into every required concrete path.
    ///
    /// The result holds exactly `d1 * ... * dk` paths for `k` domain
    /// placeholders of sizes `d1..dk`, ordered by binding tuple with the
    /// first domain varying slowest.
    ///
    /// # Errors
    ///
    /// [`TemplateError::Unbound`] or [`TemplateError::BindingMismatch`].
    pub fn expand(&self, bindings: &Bindings) -> Result<Vec<String>, TemplateError> {
        Ok(self
            .expand_tuples(bindings)?
            .into_iter()
            .map(|e| e.path)
            .collect())
    }

    /// Like [`expand`](Self::expand), keeping the domain values per path.
    pub fn expand_tuples(&self, bindings: &Bindings) -> Result<Vec<Expansion>, TemplateError> {
        let mut singles: Vec<Option<&str>> = vec![None; self.placeholders.len()];
        let mut domain_slots = Vec::new();
        let mut domains: Vec<Vec<&str>> = Vec::new();

        for (slot, placeholder) in self.placeholders.iter().enumerate() {
            let binding = bindings
                .get(&placeholder.name)
                .ok_or_else(|| TemplateError::Unbound {
                    name: placeholder.name.clone(),
                })?;
            match (placeholder.role, binding) {
                (Role::Single, Binding::One(value)) => singles[slot] = Some(value.as_str()),
                (Role::Domain, Binding::Many(values)) => {
                    domain_slots.push(slot);
                    domains.push(values.iter().map(String::as_str).collect());
                }
                (Role::Single, Binding::Many(_)) => {
                    return Err(TemplateError::BindingMismatch {
                        name: placeholder.name.clone(),
                        expected: "a single value",
                    });
                }
                (Role::Domain, Binding::One(_)) => {
                    return Err(TemplateError::BindingMismatch {
                        name: placeholder.name.clone(),
                        expected: "a list of values",
                    });
                }
            }
        }

        let expansions = permute(&domains)
            .into_iter()
            .map(|tuple| {
                let mut values = singles.clone();
                for (slot, value) in domain_slots.iter().zip(&tuple) {
                    values[*slot] = Some(*value);
                }
                Expansion {
                    path: self.render(|slot| values[slot].unwrap_or_default()),
                    values: tuple.into_iter().map(str::to_string).collect(),
                }
            })
            .collect();
        Ok(expansions)
    }

    /// Regex matching any path of this template's shape, with every
    /// placeholder wildcarded within its segment.
    ///
    /// # Errors
    ///
    /// [`TemplateError::Matcher`] if the generated expression is rejected.
    pub fn shape(&self) -> Result<Regex, TemplateError> {
        path_matcher(&self.render(|_| "*"))
    }

    /// Leading directory made only of literal segments (`""` when the first
    /// segment already varies). Every matching path lies below it.
    pub fn literal_dir(&self) -> String {
        self.literal_segments().join("/")
    }

    /// `true` when every matching path lies directly in
    /// [`literal_dir`](Self::literal_dir), so a listing need not recurse.
    pub fn is_flat(&self) -> bool {
        self.literal_segments().len() + 1 == self.segments.len()
    }

    /// `true` when the template contains a `...` segment. Such templates
    /// only match real paths in [`MatchMode::Pattern`](crate::template::MatchMode).
    pub fn has_any_dirs(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::AnyDirs))
    }

    fn literal_segments(&self) -> Vec<String> {
        let dirs = &self.segments[..self.segments.len().saturating_sub(1)];
        dirs.iter()
            .map_while(|segment| match segment {
                Segment::AnyDirs => None,
                Segment::Pieces(pieces) => pieces
                    .iter()
                    .map(|piece| match piece {
                        Piece::Text(text) => Some(text.as_str()),
                        Piece::Slot(_) => None,
                    })
                    .collect::<Option<String>>(),
            })
            .collect()
    }

    fn render<'v>(&self, value: impl Fn(usize) -> &'v str) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::AnyDirs => ANY_DIRS.to_string(),
                Segment::Pieces(pieces) => pieces
                    .iter()
                    .map(|piece| match piece {
                        Piece::Text(text) => text.as_str(),
                        Piece::Slot(slot) => value(*slot),
                    })
                    .collect(),
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

fn declare(
    pattern: &str,
    placeholders: &mut Vec<Placeholder>,
    inner: &str,
) -> Result<usize, TemplateError> {
    let (name, role) = match inner.strip_suffix('*') {
        Some(name) => (name, Role::Domain),
        None => (inner, Role::Single),
    };
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(TemplateError::Syntax {
            pattern: pattern.to_string(),
            reason: format!("invalid placeholder name '{{{inner}}}'"),
        });
    }

    if let Some(slot) = placeholders.iter().position(|p| p.name == name) {
        if placeholders[slot].role != role {
            return Err(TemplateError::RoleConflict {
                pattern: pattern.to_string(),
                name: name.to_string(),
            });
        }
        return Ok(slot);
    }
    placeholders.push(Placeholder {
        name: name.to_string(),
        role,
    });
    Ok(placeholders.len() - 1)
}

/// Cartesian product of `domains`, first domain varying slowest.
///
/// No domains yields a single empty tuple; any empty domain yields nothing.
/// Duplicate values are kept, so each position produces its own tuple.
///
/// ```
/// use connector_certify::template::permute;
///
/// let tuples = permute(&[vec!["a1", "a2"], vec!["b1"]]);
/// assert_eq!(tuples, vec![vec!["a1", "b1"], vec!["a2", "b1"]]);
/// ```
pub fn permute<T: Clone>(domains: &[Vec<T>]) -> Vec<Vec<T>> {
    domains.iter().fold(vec![Vec::new()], |acc, domain| {
        acc.iter()
            .flat_map(|prefix| {
                domain.iter().map(move |value| {
                    let mut tuple = prefix.clone();
                    tuple.push(value.clone());
                    tuple
                })
            })
            .collect()
    })
}

/// Anchored regex for a concrete path: `*` matches within one segment and a
/// `...` segment matches one or more directories; everything else is literal.
pub(crate) fn path_matcher(path: &str) -> Result<Regex, TemplateError> {
    let mut expr = String::from("^");
    let segments: Vec<&str> = path.split('/').collect();
    for (index, segment) in segments.iter().enumerate() {
        let last = index + 1 == segments.len();
        if *segment == ANY_DIRS {
            expr.push_str("(?:[^/]+/)+");
            continue;
        }
        let parts: Vec<String> = segment.split('*').map(regex::escape).collect();
        expr.push_str(&parts.join("[^/]*"));
        if !last {
            expr.push('/');
        }
    }
    expr.push('$');
    Regex::new(&expr).map_err(|e| TemplateError::Matcher {
        path: path.to_string(),
        reason: e.to_string(),
    })
}
