//! Integration tests for the divergence engine.
//!
//! Trees are written in the canonical format to keep the shapes readable.

use cctdb::diff::{
    compare_trees, find_divergences, generate_report, render_terminal_report, Divergence,
    DivergenceReason,
};
use cctdb::model::CallTree;
use cctdb::parser::tree_from_json;
use pretty_assertions::assert_eq;

fn tree(document: &str) -> CallTree {
    tree_from_json(document).unwrap()
}

/// Names along the stack of each finding, with its reason
fn describe(tree: &CallTree, divergences: &[Divergence]) -> Vec<(String, DivergenceReason)> {
    divergences
        .iter()
        .map(|d| (tree.call_name_stack(d.call).join(";"), d.reason))
        .collect()
}

#[test]
fn test_extra_leaf() {
    let a = tree(r#"[{"name":"fn1","calls":[{"name":"fn3"}]},{"name":"fn2"}]"#);
    let b = tree(
        r#"[{"name":"fn1","calls":[{"name":"fn3","calls":[{"name":"newFn"}]}]},{"name":"fn2"}]"#,
    );

    assert!(find_divergences(&a, &b).is_empty());
    assert_eq!(
        describe(&b, &find_divergences(&b, &a)),
        vec![("fn1;fn3;newFn".to_string(), DivergenceReason::StackNotFound)]
    );
}

#[test]
fn test_duplicate_sibling_shortfall() {
    let a = tree(r#"[{"name":"fn1","calls":[{"name":"fn3"}]}]"#);
    let b = tree(r#"[{"name":"fn1","calls":[{"name":"fn3"},{"name":"fn3"}]}]"#);

    assert!(find_divergences(&a, &b).is_empty());

    // Both fn3 calls under the same fn1 share the shortfall
    let divergences = find_divergences(&b, &a);
    assert!(!divergences.is_empty());
    assert_eq!(divergences.len(), 2);
    assert!(divergences
        .iter()
        .all(|d| d.reason == DivergenceReason::InsufficientCallCount));
    assert!(divergences.iter().all(|d| b.name(d.call) == Some("fn3")));

    // The shortfall is a single finding once grouped by call site
    let report = generate_report((&a, "a"), (&b, "b"));
    let groups = &report.target_divergences.groups;
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "fn3");
    assert_eq!(groups[0].caller.as_deref(), Some("fn1"));
    assert_eq!(groups[0].insufficient_calls, divergences.len());
    assert!(report.baseline_divergences.groups.is_empty());
}

#[test]
fn test_asymmetric_call_count_restructuring() {
    let a = tree(r#"[{"name":"fn1","calls":[{"name":"fn2"},{"name":"fn3"}]}]"#);
    let b = tree(
        r#"[{"name":"fn1","calls":[{"name":"fn2"}]},{"name":"fn1","calls":[{"name":"fn3"}]}]"#,
    );

    assert!(find_divergences(&a, &b).is_empty());

    let divergences = find_divergences(&b, &a);
    assert_eq!(divergences.len(), 2);
    assert_eq!(
        divergences.iter().map(|d| d.call).collect::<Vec<_>>(),
        b.children(b.root()).to_vec()
    );
    assert!(divergences
        .iter()
        .all(|d| d.reason == DivergenceReason::InsufficientCallCount));
}

#[test]
fn test_reflexivity() {
    let documents = [
        "[]",
        r#"[{"name":"fn1","calls":[{"name":"fn3"}]},{"name":"fn2"}]"#,
        r#"[{"name":"main","calls":[{"name":"sort","calls":[{"name":"swap"},{"name":"swap"},{"name":"sort","calls":[{"name":"swap"}]}]}]},{"name":"main"}]"#,
    ];

    for document in documents {
        let t = tree(document);
        assert!(find_divergences(&t, &t).is_empty(), "{}", document);
        assert!(compare_trees(&t, &t).is_identical());
    }
}

#[test]
fn test_embedding_is_monotone() {
    let small = tree(r#"[{"name":"main","calls":[{"name":"a"},{"name":"b"}]}]"#);
    let large = tree(
        r#"[{"name":"init"},{"name":"main","calls":[{"name":"b","calls":[{"name":"c"}]},{"name":"a"},{"name":"a"}]}]"#,
    );

    let comparison = compare_trees(&small, &large);
    assert!(comparison.baseline_divergences.is_empty());
    assert_eq!(
        describe(&large, &comparison.target_divergences),
        vec![
            ("init".to_string(), DivergenceReason::StackNotFound),
            ("main;b;c".to_string(), DivergenceReason::StackNotFound),
            ("main;a".to_string(), DivergenceReason::InsufficientCallCount),
            ("main;a".to_string(), DivergenceReason::InsufficientCallCount),
        ]
    );
}

#[test]
fn test_sibling_order_is_ignored() {
    let a = tree(
        r#"[{"name":"fn1","calls":[{"name":"fn3"}]},{"name":"fn2"},{"name":"fn1","calls":[{"name":"fn3"},{"name":"fn4"}]}]"#,
    );
    let b = tree(
        r#"[{"name":"fn1","calls":[{"name":"fn4"},{"name":"fn3"}]},{"name":"fn2"},{"name":"fn1","calls":[{"name":"fn3"}]}]"#,
    );

    assert!(compare_trees(&a, &b).is_identical());
}

#[test]
fn test_report_text_and_json() {
    let good = tree(
        r#"[{"name":"main","calls":[{"name":"quicksort(int*, int, int)","calls":[{"name":"swap(int*, int, int)"}]}]}]"#,
    );
    let bad = tree(
        r#"[{"name":"main","calls":[{"name":"quicksort(int*, int, int)","calls":[{"name":"swap(int*, int, int)"},{"name":"swap(int*, int, int)"}]}]},{"name":"abort"}]"#,
    );

    let report = generate_report((&good, "good.json"), (&bad, "bad.json"));
    assert_eq!(report.summary.status, "DIVERGED");
    assert_eq!(report.summary.total_divergences, 3);
    assert_eq!(report.target_divergences.divergence_count, 3);
    assert_eq!(report.baseline_divergences.divergence_count, 0);

    let text = render_terminal_report(&report, 50);
    assert!(text.contains("in 3 places:"));
    assert!(text.contains("which was called by quicksort(int*, int, int) (x2)"));
    assert!(text.contains("at the top level"));
    assert!(text.contains("Equivalent stack was not found."));

    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["summary"]["status"], "DIVERGED");
    assert_eq!(json["target"]["label"], "bad.json");
    assert_eq!(
        json["target_divergences"]["groups"][0]["example_stack"],
        "main;quicksort(int*, int, int);swap(int*, int, int)"
    );
    assert!(json["target_divergences"]["groups"][1]
        .get("caller")
        .is_none());
}
