//! Configurable directory layout rules.
//!
//! Each `[[layout]]` entry in the configuration becomes one [`LayoutCheck`]:
//! its template is expanded with the entry's bindings, every produced path
//! must exist, and, when `forbid-stray` is set, files of the template's
//! shape that no expansion accounts for are reported too.

use crate::checks::{ResourceCheck, RuleInfo};
use crate::config::LayoutRule;
use crate::context::ResourceRoot;
use crate::error::{CollaboratorFault, TemplateError};
use crate::issue::{Issue, IssueSink, Location};
use crate::template::{reconcile, Bindings, MatchMode, PathTemplate, ReconcileOptions};
use std::collections::BTreeSet;

/// Catalogue key standing for every configured layout rule.
pub const KEY: &str = "directory-layout";

#[derive(Debug)]
pub struct LayoutCheck {
    key: String,
    pattern: String,
    template: Result<PathTemplate, TemplateError>,
    bindings: Bindings,
    mode: MatchMode,
    forbid_stray: bool,
}

impl LayoutCheck {
    pub fn new(key: &str, template: &str, bindings: Bindings, mode: MatchMode) -> Self {
        LayoutCheck {
            key: key.to_string(),
            pattern: template.to_string(),
            template: PathTemplate::parse(template),
            bindings,
            mode,
            forbid_stray: false,
        }
    }

    pub fn forbid_stray(mut self, forbid: bool) -> Self {
        self.forbid_stray = forbid;
        self
    }

    pub fn from_config(rule: &LayoutRule) -> Self {
        LayoutCheck::new(&rule.key, &rule.template, rule.bindings.clone(), rule.match_mode)
            .forbid_stray(rule.forbid_stray)
    }

    fn options(&self, template: &PathTemplate) -> Result<ReconcileOptions, TemplateError> {
        let options = ReconcileOptions::new(self.mode);
        Ok(if self.forbid_stray {
            options.forbid_stray(template.shape()?)
        } else {
            options
        })
    }
}

impl ResourceCheck for LayoutCheck {
    fn key(&self) -> &str {
        &self.key
    }

    fn evaluate(&self, root: &dyn ResourceRoot) -> Result<Vec<Issue>, CollaboratorFault> {
        let mut sink = IssueSink::new(&self.key);
        let template = match self.template {
            Ok(ref t) => t,
            Err(ref e) => {
                sink.invalid_configuration(e.to_string(), None);
                return Ok(sink.finish());
            }
        };
        if self.mode == MatchMode::Exact && template.has_any_dirs() {
            sink.invalid_configuration(
                format!(
                    "Layout '{}' uses '...' and needs match-mode = \"pattern\".",
                    self.pattern
                ),
                None,
            );
            return Ok(sink.finish());
        }
        let prepared = template
            .expand(&self.bindings)
            .and_then(|expected| self.options(template).map(|options| (expected, options)));
        let (expected, options) = match prepared {
            Ok(p) => p,
            Err(e) => {
                sink.invalid_configuration(e.to_string(), None);
                return Ok(sink.finish());
            }
        };

        let actual: BTreeSet<String> = root
            .list_files(&template.literal_dir(), "*", !template.is_flat())?
            .into_iter()
            .collect();
        tracing::debug!(
            rule = %self.key,
            expected = expected.len(),
            actual = actual.len(),
            "reconciling layout"
        );

        match reconcile(&expected, &actual, &options) {
            Ok(result) => {
                for path in result.missing {
                    sink.violation(
                        format!("Required path '{path}' does not exist (layout '{}').", self.pattern),
                        None,
                    );
                }
                for path in result.unexpected {
                    sink.violation(
                        format!(
                            "Path '{path}' matches layout '{}' but none of its bindings.",
                            self.pattern
                        ),
                        Some(Location::file(path.as_str())),
                    );
                }
            }
            Err(e) => sink.invalid_configuration(e.to_string(), None),
        }
        Ok(sink.finish())
    }
}

pub fn rules() -> Vec<RuleInfo> {
    vec![RuleInfo {
        key: KEY,
        priority: "major",
        context: "resource",
        name: "Configured directory layout",
        description: "Each [[layout]] entry in certify.toml declares a path template (with {single} and {domain*} placeholders and '...' for any directories) plus bindings. Every expanded path must exist; with forbid-stray, files of the same shape matching no binding are reported. The entry's own key is used as the rule key; the default entry is 'readme-present'. Disabling 'directory-layout' turns every entry off.",
    }]
}
