//! Test suite classes.
//!
//! Any class whose name ends in `TestSuite` is a suite. Two rules apply:
//!
//! | Key | What it checks |
//! |-----|----------------|
//! | `test-suite-annotations` | the suite is annotated `@RunWith(Suite.class)` |
//! | `functional-test-suite-coverage` | every class listed in `@SuiteClasses` ends in `TestCases` and exists under the functional test directory |

use crate::checks::{RuleInfo, TreeCheck, TreeContext};
use crate::context::tree::simple_name;
use crate::context::{ArgValue, Marker, Node, NodeKind};
use crate::error::{CollaboratorFault, TemplateError};
use crate::issue::{Issue, IssueSink, Location};
use crate::template::{reconcile, Bindings, MatchMode, PathTemplate, ReconcileOptions};
use std::collections::{BTreeSet, HashSet};

pub const RUNNER_KEY: &str = "test-suite-annotations";
pub const COVERAGE_KEY: &str = "functional-test-suite-coverage";

const SUITE_SUFFIX: &str = "TestSuite";
const TEST_CASES_SUFFIX: &str = "TestCases";
const RUN_WITH: &str = "RunWith";
const SUITE_CLASSES: &str = "SuiteClasses";
const SUITE_RUNNER: &str = "Suite";

fn suites<'t>(ctx: &TreeContext<'t>) -> Vec<&'t Node> {
    ctx.tree
        .nodes_of_kind(NodeKind::Class)
        .into_iter()
        .filter(|c| c.name.ends_with(SUITE_SUFFIX))
        .collect()
}

/// Suites must run with the `Suite` runner.
#[derive(Debug, Default)]
pub struct SuiteRunnerCheck;

impl TreeCheck for SuiteRunnerCheck {
    fn key(&self) -> &str {
        RUNNER_KEY
    }

    fn evaluate(&self, ctx: &TreeContext<'_>) -> Result<Vec<Issue>, CollaboratorFault> {
        let mut sink = IssueSink::new(RUNNER_KEY);
        for suite in suites(ctx) {
            let Some(run_with) = suite.marker(RUN_WITH) else {
                sink.violation(
                    format!("Missing @RunWith annotation on Test Suite class '{}'.", suite.name),
                    Some(suite.location()),
                );
                continue;
            };
            match run_with.positional().next() {
                None => sink.violation(
                    format!(
                        "Found @RunWith annotation on Test Suite class '{}', but no runner specified. It should be {SUITE_RUNNER}.class.",
                        suite.name
                    ),
                    Some(suite.location()),
                ),
                Some(ArgValue::ClassRef { name, .. }) if simple_name(name) != SUITE_RUNNER => {
                    sink.violation(
                        format!(
                            "Found @RunWith annotation on Test Suite class '{}', but different runner specified ({}.class instead of {SUITE_RUNNER}.class).",
                            suite.name,
                            simple_name(name)
                        ),
                        Some(suite.location()),
                    )
                }
                Some(_) => {}
            }
        }
        Ok(sink.finish())
    }
}

/// Classes listed in `@SuiteClasses` must be functional test cases that
/// exist on disk.
#[derive(Debug)]
pub struct SuiteCoverageCheck {
    test_root: String,
    functional_dir: String,
    template: Result<PathTemplate, TemplateError>,
}

impl SuiteCoverageCheck {
    /// `functional_dir` is a template (usually containing `...`) for the
    /// directory test cases must live in; files are searched under `test_root`.
    pub fn new(test_root: &str, functional_dir: &str) -> Self {
        SuiteCoverageCheck {
            test_root: test_root.to_string(),
            functional_dir: functional_dir.to_string(),
            template: PathTemplate::parse(&format!("{functional_dir}/{{test*}}.java")),
        }
    }
}

/// A class reference listed in `@SuiteClasses`.
struct ListedTest<'n> {
    name: &'n str,
    location: Location,
}

fn listed_tests<'n>(suite: &'n Node, suite_classes: &'n Marker) -> Vec<ListedTest<'n>> {
    suite_classes
        .positional()
        .flat_map(ArgValue::class_refs)
        .filter_map(|r| match r {
            ArgValue::ClassRef { name, line, .. } => Some(ListedTest {
                name: simple_name(name),
                location: Location::new(&suite.file, line.unwrap_or(suite.line)),
            }),
            _ => None,
        })
        .collect()
}

impl TreeCheck for SuiteCoverageCheck {
    fn key(&self) -> &str {
        COVERAGE_KEY
    }

    fn evaluate(&self, ctx: &TreeContext<'_>) -> Result<Vec<Issue>, CollaboratorFault> {
        let mut sink = IssueSink::new(COVERAGE_KEY);
        let suites = suites(ctx);
        if suites.is_empty() {
            return Ok(sink.finish());
        }
        let template = match self.template {
            Ok(ref t) => t,
            Err(ref e) => {
                sink.invalid_configuration(e.to_string(), None);
                return Ok(sink.finish());
            }
        };

        let actual: BTreeSet<String> = ctx
            .resources
            .list_files(&self.test_root, "*TestCases.java", true)?
            .into_iter()
            .collect();

        for suite in suites {
            let Some(suite_classes) = suite.marker(SUITE_CLASSES) else {
                sink.violation(
                    format!("Missing @SuiteClasses annotation on Test Suite class '{}'.", suite.name),
                    Some(suite.location()),
                );
                continue;
            };
            let listed = listed_tests(suite, suite_classes);
            if listed.is_empty() {
                sink.violation(
                    "No tests have been declared under @SuiteClasses.",
                    Some(suite.location()),
                );
                continue;
            }

            let test_cases: Vec<&str> = listed
                .iter()
                .map(|t| t.name)
                .filter(|n| n.ends_with(TEST_CASES_SUFFIX))
                .collect();
            let missing = match missing_tests(template, &test_cases, &actual) {
                Ok(missing) => missing,
                Err(e) => {
                    sink.invalid_configuration(e.to_string(), Some(suite.location()));
                    continue;
                }
            };

            for test in listed {
                if !test.name.ends_with(TEST_CASES_SUFFIX) {
                    sink.violation(
                        format!(
                            "Functional test classes must end with '{TEST_CASES_SUFFIX}'. Rename '{}.java' accordingly.",
                            test.name
                        ),
                        Some(test.location),
                    );
                } else if missing.contains(test.name) {
                    sink.violation(
                        format!(
                            "A file named '{}.java' must exist in directory '{}'.",
                            test.name, self.functional_dir
                        ),
                        Some(test.location),
                    );
                }
            }
        }

        tracing::debug!(rule = COVERAGE_KEY, files = actual.len(), "suite coverage evaluated");
        Ok(sink.finish())
    }
}

/// Names from `tests` with no file under the functional directory.
fn missing_tests(
    template: &PathTemplate,
    tests: &[&str],
    actual: &BTreeSet<String>,
) -> Result<HashSet<String>, TemplateError> {
    let expansions = template.expand_tuples(&Bindings::new().many("test", tests.iter().copied()))?;
    let expected: Vec<String> = expansions.iter().map(|e| e.path.clone()).collect();
    let result = reconcile(&expected, actual, &ReconcileOptions::new(MatchMode::Pattern))?;
    let missing: HashSet<&String> = result.missing.iter().collect();
    Ok(expansions
        .into_iter()
        .filter(|e| missing.contains(&e.path))
        .filter_map(|e| e.values.into_iter().next())
        .collect())
}

pub fn rules() -> Vec<RuleInfo> {
    vec![
        RuleInfo {
            key: RUNNER_KEY,
            priority: "major",
            context: "tree",
            name: "Test Suite classes need to be annotated with @RunWith(Suite.class)",
            description: "Every class whose name ends in 'TestSuite' must carry @RunWith with Suite.class as its runner.",
        },
        RuleInfo {
            key: COVERAGE_KEY,
            priority: "critical",
            context: "tree",
            name: "Functional test coverage",
            description: "Every class listed in a Test Suite's @SuiteClasses must end with 'TestCases' and exist under 'src/test/java/.../automation/functional'.",
        },
    ]
}
