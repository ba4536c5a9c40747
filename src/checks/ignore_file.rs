//! Required ignore file.
//!
//! Exactly one ignore file (`.gitignore` by default) must exist, at the
//! component root, and its lines must cover a configured set of entries.
//! Content is only inspected once existence and uniqueness hold.

use crate::checks::{ResourceCheck, RuleInfo};
use crate::config::IgnoreFileConfig;
use crate::context::ResourceRoot;
use crate::error::CollaboratorFault;
use crate::issue::{Issue, IssueSink, Location};
use regex::Regex;

pub const KEY: &str = "gitignore-exist";

/// Entries starting with this prefix are regexes taken as written.
pub const REGEX_PREFIX: &str = "re:";

/// Entries every ignore file must contain by default.
pub const DEFAULT_REQUIRED: &[&str] = &[
    "*.class",
    "*.jar",
    "*.war",
    "target/",
    ".classpath",
    ".settings/",
    ".project",
    ".factorypath",
    ".idea/",
    "*.iml",
    "*.ipr",
    "*.iws",
    ".DS_Store",
];

/// How a configured entry is compared with the lines of the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineMatch {
    /// The trimmed line equals the entry.
    Exact,
    /// The line matches the entry's regex. Entries are literal and matched
    /// with optional surrounding whitespace, unless written as `re:regex`.
    #[default]
    Regex,
}

/// A configured entry and its compiled matcher.
#[derive(Debug)]
struct Entry {
    label: String,
    matcher: Result<Matcher, String>,
}

#[derive(Debug)]
enum Matcher {
    Exact(String),
    Regex(Regex),
}

impl Entry {
    fn new(label: &str, mode: LineMatch) -> Self {
        let matcher = match mode {
            LineMatch::Exact => Ok(Matcher::Exact(label.trim().to_string())),
            LineMatch::Regex => entry_regex(label)
                .map(Matcher::Regex)
                .map_err(|e| format!("Invalid pattern '{label}': {e}")),
        };
        Entry {
            label: label.to_string(),
            matcher,
        }
    }
}

/// Regex for one entry: `re:expr` is taken as written, anything else
/// (including gitignore paths such as `/target/`) is escaped and anchored.
fn entry_regex(label: &str) -> Result<Regex, regex::Error> {
    match label.strip_prefix(REGEX_PREFIX) {
        Some(expr) => Regex::new(expr),
        None => Regex::new(&format!(r"^\s*{}\s*$", regex::escape(label.trim()))),
    }
}

impl Matcher {
    fn matches(&self, line: &str) -> bool {
        match self {
            Matcher::Exact(entry) => line.trim() == entry,
            Matcher::Regex(re) => re.is_match(line),
        }
    }
}

#[derive(Debug)]
pub struct RequiredFileCheck {
    file_name: String,
    required: Vec<Entry>,
    forbidden: Vec<Entry>,
}

impl RequiredFileCheck {
    pub fn new(file_name: &str, mode: LineMatch, required: &[String], forbidden: &[String]) -> Self {
        RequiredFileCheck {
            file_name: file_name.to_string(),
            required: required.iter().map(|e| Entry::new(e, mode)).collect(),
            forbidden: forbidden.iter().map(|e| Entry::new(e, mode)).collect(),
        }
    }

    pub fn from_config(config: &IgnoreFileConfig) -> Self {
        RequiredFileCheck::new(
            &config.file_name,
            config.line_match,
            &config.required,
            &config.forbidden,
        )
    }

    /// Labels of `entries` for which `hit` holds, reporting broken patterns.
    fn select<'e>(
        &self,
        entries: &'e [Entry],
        lines: &[String],
        sink: &mut IssueSink<'_>,
        hit: impl Fn(bool) -> bool,
    ) -> Vec<&'e str> {
        let mut selected = Vec::new();
        for entry in entries {
            match entry.matcher {
                Ok(ref m) => {
                    if hit(lines.iter().any(|l| m.matches(l))) {
                        selected.push(entry.label.as_str());
                    }
                }
                Err(ref reason) => {
                    sink.invalid_configuration(reason.as_str(), Some(Location::file(&self.file_name)))
                }
            }
        }
        selected
    }
}

impl ResourceCheck for RequiredFileCheck {
    fn key(&self) -> &str {
        KEY
    }

    fn evaluate(&self, root: &dyn ResourceRoot) -> Result<Vec<Issue>, CollaboratorFault> {
        let mut sink = IssueSink::new(KEY);
        let found = root.list_files("", &glob::Pattern::escape(&self.file_name), true)?;
        tracing::debug!(rule = KEY, file = %self.file_name, count = found.len(), "ignore files found");

        if !found.iter().any(|f| *f == self.file_name) {
            sink.violation(
                format!("Missing {} file in project root.", self.file_name),
                None,
            );
        }
        if found.len() > 1 {
            sink.violation(
                format!("More than one {} file in project.", self.file_name),
                None,
            );
        }
        if !sink.is_empty() {
            return Ok(sink.finish());
        }

        let lines = root.read_lines(&self.file_name)?;
        let missing = self.select(&self.required, &lines, &mut sink, |present| !present);
        let present = self.select(&self.forbidden, &lines, &mut sink, |present| present);

        if !missing.is_empty() {
            sink.violation(
                format!(
                    "{} file in project is missing the following exclusions:  '{}'.",
                    self.file_name,
                    missing.join(", ")
                ),
                Some(Location::file(&self.file_name)),
            );
        }
        if !present.is_empty() {
            sink.violation(
                format!(
                    "{} file in project must not contain the following entries: '{}'.",
                    self.file_name,
                    present.join(", ")
                ),
                Some(Location::file(&self.file_name)),
            );
        }
        Ok(sink.finish())
    }
}

pub fn rules() -> Vec<RuleInfo> {
    vec![RuleInfo {
        key: KEY,
        priority: "minor",
        context: "resource",
        name: "A single .gitignore file must exist in the project root",
        description: "Exactly one ignore file must exist and it must be at the project root. It must exclude build output and IDE files (*.class, *.jar, target/, .idea/, ...). Required and forbidden entries are configurable; an entry prefixed with 're:' is a regex.",
    }]
}
