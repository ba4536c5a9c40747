use std::collections::BTreeSet;

use connector_certify::error::TemplateError;
use connector_certify::template::{
    permute, reconcile, Bindings, MatchMode, PathTemplate, ReconcileOptions, Role,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn template(pattern: &str) -> PathTemplate {
    PathTemplate::parse(pattern).unwrap()
}

fn set(paths: &[&str]) -> BTreeSet<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

fn exact() -> ReconcileOptions {
    ReconcileOptions::new(MatchMode::Exact)
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[test]
fn parse_reports_placeholders_in_order_of_appearance() {
    let t = template("icons/{connector}/{size*}/{connector}-{size*}.png");
    let placeholders: Vec<(&str, Role)> = t.placeholders().collect();
    assert_eq!(
        placeholders,
        vec![("connector", Role::Single), ("size", Role::Domain)]
    );
    assert_eq!(t.pattern(), "icons/{connector}/{size*}/{connector}-{size*}.png");
    assert_eq!(t.to_string(), t.pattern());
}

#[test]
fn parse_rejects_malformed_patterns() {
    for pattern in [
        "",
        "src//main",
        "src/{a{b}}",
        "src/a}",
        "src/{open",
        "src/{}",
        "src/{*}",
        "src/{bad name}",
    ] {
        match PathTemplate::parse(pattern) {
            Err(TemplateError::Syntax { .. }) => {}
            other => panic!("expected syntax error for {pattern:?}, got {other:?}"),
        }
    }
}

#[test]
fn parse_rejects_role_conflict() {
    let err = PathTemplate::parse("src/{name}/{name*}.txt").unwrap_err();
    assert_eq!(
        err,
        TemplateError::RoleConflict {
            pattern: "src/{name}/{name*}.txt".to_string(),
            name: "name".to_string(),
        }
    );
}

// ---------------------------------------------------------------------------
// Expansion
// ---------------------------------------------------------------------------

#[test]
fn expand_without_placeholders_yields_the_literal_path() {
    let t = template("README.md");
    assert_eq!(t.expand(&Bindings::new()).unwrap(), vec!["README.md"]);
}

#[test]
fn expand_produces_the_product_of_domain_sizes() {
    let t = template("{a*}/{b*}/{c*}.txt");
    let bindings = Bindings::new()
        .many("a", ["a1", "a2"])
        .many("b", ["b1", "b2", "b3"])
        .many("c", ["c1", "c2"]);
    let paths = t.expand(&bindings).unwrap();
    assert_eq!(paths.len(), 2 * 3 * 2);
    let distinct: BTreeSet<&String> = paths.iter().collect();
    assert_eq!(distinct.len(), paths.len());
}

#[test]
fn expand_orders_paths_with_first_domain_slowest() {
    let t = template("{a*}-{b*}");
    let bindings = Bindings::new().many("a", ["x", "y"]).many("b", ["1", "2"]);
    assert_eq!(t.expand(&bindings).unwrap(), vec!["x-1", "x-2", "y-1", "y-2"]);
}

#[test]
fn expand_with_empty_domain_yields_nothing() {
    let t = template("src/{module}/{test*}.java");
    let bindings = Bindings::new()
        .one("module", "crm")
        .many("test", Vec::<String>::new());
    assert!(t.expand(&bindings).unwrap().is_empty());
}

#[test]
fn expand_keeps_duplicate_domain_values_as_distinct_paths() {
    let t = template("{a*}/{b*}.txt");
    let bindings = Bindings::new().many("a", ["x", "x"]).many("b", ["1"]);
    assert_eq!(t.expand(&bindings).unwrap(), vec!["x/1.txt", "x/1.txt"]);
}

#[test]
fn expand_tuples_keeps_domain_values() {
    let t = template("src/{module}/{processor*}TestCases.java");
    let bindings = Bindings::new()
        .one("module", "crm")
        .many("processor", ["Create", "Delete"]);
    let expansions = t.expand_tuples(&bindings).unwrap();
    assert_eq!(expansions[1].values, vec!["Delete"]);
    assert_eq!(expansions[1].path, "src/crm/DeleteTestCases.java");
}

#[test]
fn expand_reports_unbound_placeholder() {
    let t = template("src/{module}/{test*}.java");
    let err = t.expand(&Bindings::new().one("module", "crm")).unwrap_err();
    assert_eq!(
        err,
        TemplateError::Unbound {
            name: "test".to_string()
        }
    );
}

#[test]
fn expand_reports_binding_mismatch() {
    let t = template("src/{module}/{test*}.java");
    let single_as_many = Bindings::new().many("module", ["a"]).many("test", ["T"]);
    assert!(matches!(
        t.expand(&single_as_many),
        Err(TemplateError::BindingMismatch { ref name, .. }) if name == "module"
    ));

    let many_as_single = Bindings::new().one("module", "a").one("test", "T");
    assert!(matches!(
        t.expand(&many_as_single),
        Err(TemplateError::BindingMismatch { ref name, .. }) if name == "test"
    ));
}

#[test]
fn permute_follows_odometer_order() {
    let tuples = permute(&[vec!["a1"], vec!["b1"], vec!["c1", "c2"]]);
    assert_eq!(
        tuples,
        vec![vec!["a1", "b1", "c1"], vec!["a1", "b1", "c2"]]
    );
    assert_eq!(permute::<&str>(&[]), vec![Vec::<&str>::new()]);
}

#[test]
fn literal_dir_stops_at_first_varying_segment() {
    assert_eq!(template("src/test/.../{a*}.java").literal_dir(), "src/test");
    assert_eq!(template("icons/{size*}/logo.png").literal_dir(), "icons");
    assert_eq!(template("README.md").literal_dir(), "");
    assert!(template("icons/{size*}.png").is_flat());
    assert!(!template("icons/{size*}/logo.png").is_flat());
    assert!(!template("src/.../x.java").is_flat());
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[test]
fn reconcile_round_trip_is_clean() {
    let t = template("src/{module}/{category*}TestCases.java");
    let expected = t
        .expand(&Bindings::new().one("module", "crm").many("category", ["Auth", "Search", "Sync"]))
        .unwrap();
    let actual: BTreeSet<String> = expected.iter().cloned().collect();
    let result = reconcile(&expected, &actual, &exact()).unwrap();
    assert!(result.is_clean());
}

#[test]
fn reconcile_reports_removed_path_as_missing() {
    let expected = vec![
        "src/AuthTestCases.java".to_string(),
        "src/SearchTestCases.java".to_string(),
        "src/SyncTestCases.java".to_string(),
    ];
    let actual = set(&["src/AuthTestCases.java", "src/SyncTestCases.java"]);
    let result = reconcile(&expected, &actual, &exact()).unwrap();
    assert_eq!(result.missing, vec!["src/SearchTestCases.java"]);
    assert!(result.unexpected.is_empty());
}

#[test]
fn reconcile_reports_stray_path_only_when_forbidden() {
    let t = template("src/{category*}TestCases.java");
    let expected = t.expand(&Bindings::new().many("category", ["Auth"])).unwrap();
    let actual = set(&["src/AuthTestCases.java", "src/LegacyTestCases.java", "src/Other.java"]);

    let tolerant = reconcile(&expected, &actual, &exact()).unwrap();
    assert!(tolerant.is_clean());

    let strict = reconcile(&expected, &actual, &exact().forbid_stray(t.shape().unwrap())).unwrap();
    assert!(strict.missing.is_empty());
    assert_eq!(strict.unexpected, vec!["src/LegacyTestCases.java"]);
}

#[test]
fn pattern_mode_matches_any_intermediate_directories() {
    let t = template("src/test/.../{category*}TestCases.java");
    let expected = t
        .expand(&Bindings::new().many("category", ["Auth", "Search"]))
        .unwrap();
    let actual = set(&[
        "src/test/org/mule/AuthTestCases.java",
        "src/test/org/mule/SearchTestCases.java",
        "src/test/org/mule/LegacyTestCases.java",
    ]);
    let result = reconcile(&expected, &actual, &ReconcileOptions::new(MatchMode::Pattern)).unwrap();
    assert_eq!(result.missing, Vec::<String>::new());
    assert!(result.unexpected.is_empty());
}

#[test]
fn pattern_mode_reports_the_single_missing_category() {
    let t = template("src/test/.../{category*}TestCases.java");
    let expected = t
        .expand(&Bindings::new().many("category", ["Auth", "Search"]))
        .unwrap();
    let actual = set(&["src/test/org/mule/AuthTestCases.java"]);
    let result = reconcile(&expected, &actual, &ReconcileOptions::new(MatchMode::Pattern)).unwrap();
    assert_eq!(result.missing, vec!["src/test/.../SearchTestCases.java"]);
}

#[test]
fn pattern_mode_requires_at_least_one_directory_for_any_dirs() {
    let expected = vec!["src/.../A.java".to_string()];
    let actual = set(&["src/A.java"]);
    let result = reconcile(&expected, &actual, &ReconcileOptions::new(MatchMode::Pattern)).unwrap();
    assert_eq!(result.missing, expected);
}

#[test]
fn shape_wildcards_placeholders_within_their_segment() {
    let shape = template("icons/{connector}-{size*}.png").shape().unwrap();
    assert!(shape.is_match("icons/crm-24x16.png"));
    assert!(!shape.is_match("icons/nested/crm-24x16.png"));
    assert!(!shape.is_match("icons/crm-24x16.svg"));
}
