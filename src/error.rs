//! Error types.
//!
//! Only two of these ever cross the public evaluation boundary:
//! [`CollaboratorFault`] (an input abstraction failed and the rule could not
//! run) and [`ConfigError`] (the host could not load its own settings).
//! [`IssueError`] and [`TemplateError`] are raised by constructors and the
//! template engine; checks convert them into invalid-configuration issues.

use std::path::PathBuf;

/// An [`Issue`](crate::issue::Issue) could not be constructed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IssueError {
    #[error("issue rule key must not be empty")]
    EmptyRuleKey,

    #[error("issue message must not be empty (rule '{rule_key}')")]
    EmptyMessage { rule_key: String },
}

/// A path template could not be parsed or expanded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// The pattern string is malformed (delimiter nesting, empty names).
    #[error("invalid path template '{pattern}': {reason}")]
    Syntax { pattern: String, reason: String },

    /// The same placeholder is declared both single-valued and multi-valued.
    #[error("placeholder '{name}' in '{pattern}' is declared both as {{{name}}} and {{{name}*}}")]
    RoleConflict { pattern: String, name: String },

    /// No binding was supplied for a placeholder.
    #[error("no value bound for placeholder '{name}'")]
    Unbound { name: String },

    /// A single value was bound to a domain placeholder or vice versa.
    #[error("placeholder '{name}' expects {expected}")]
    BindingMismatch { name: String, expected: &'static str },

    /// An expanded path could not be turned into a matcher.
    #[error("cannot build matcher for '{path}': {reason}")]
    Matcher { path: String, reason: String },
}

/// A collaborator (filesystem, descriptor loader, tree loader) failed.
///
/// Never converted into an issue: a rule that hits one of these reports the
/// fault to the host instead of claiming the component is clean.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorFault {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list files under {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("invalid file name pattern '{pattern}': {reason}")]
    NamePattern { pattern: String, reason: String },

    #[error("failed to load descriptor {}: {reason}", .path.display())]
    Descriptor { path: PathBuf, reason: String },

    #[error("failed to load source model {}: {reason}", .path.display())]
    SourceModel { path: PathBuf, reason: String },
}

/// The host configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },
}
