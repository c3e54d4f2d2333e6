//! Core divergence engine.
//!
//! A call of the source tree is matched in the other tree by its call stack:
//! starting at the other root, follow same-named children level by level.
//! Sibling order is ignored, so every same-named sibling is explored. A match
//! is sufficient when the matched caller in the other tree makes at least as
//! many calls to the function as the call's own caller in the source tree.
//!
//! All walks use explicit work stacks, so recording depth never touches the
//! host call stack.

use super::schema::{
    Comparison, DirectionReport, Divergence, DivergenceGroup, DivergenceReason,
    DivergenceReport, RecordingMetadata, ReportSummary, StackMatch,
};
use crate::aggregator::tree_shape;
use crate::model::{CallId, CallTree};
use crate::utils::config::REPORT_VERSION;
use chrono::Utc;
use log::{debug, info};
use std::collections::HashMap;

/// Search `other` for the call stack of `call`
///
/// **Public** - building block of `find_divergences`
///
/// # Returns
/// Whether any same-named chain exists and whether any such chain ends
/// under a caller with enough same-named calls. The search stops at the
/// first sufficient chain.
pub fn find_stack(source: &CallTree, call: CallId, other: &CallTree) -> StackMatch {
    let names = source.call_name_stack(call);
    let Some((&last, _)) = names.split_last() else {
        return StackMatch::default();
    };

    // Detached calls have no caller to count against
    let required = source
        .parent(call)
        .map(|caller| source.call_count(caller, last))
        .unwrap_or(1);
    let last_level = names.len() - 1;

    let mut found = false;
    let mut pending: Vec<(CallId, usize)> = vec![(other.root(), 0)];

    while let Some((node, level)) = pending.pop() {
        let name = names[level];
        let available = other.call_count(node, name);
        if available == 0 {
            continue;
        }

        if level == last_level {
            found = true;
            if available >= required {
                return StackMatch {
                    found: true,
                    sufficient: true,
                };
            }
            continue;
        }

        pending.extend(
            other
                .children(node)
                .iter()
                .copied()
                .filter(|&child| other.name(child) == Some(name))
                .map(|child| (child, level + 1)),
        );
    }

    StackMatch {
        found,
        sufficient: false,
    }
}

/// Find every call of `source` whose calling context has no counterpart in `other`
///
/// **Public** - main entry point of the engine
///
/// # Algorithm
/// 1. No stack match: record `StackNotFound` and skip the call's subtree
/// 2. Stack match without enough calls: record `InsufficientCallCount`
///    and keep descending
/// 3. Sufficient match: record nothing and keep descending
///
/// Findings come out in pre-order of `source`. The relation is asymmetric;
/// run it in both directions to compare two recordings.
pub fn find_divergences(source: &CallTree, other: &CallTree) -> Vec<Divergence> {
    let mut divergences = Vec::new();
    let mut pending: Vec<CallId> = source.children(source.root()).iter().rev().copied().collect();

    while let Some(call) = pending.pop() {
        let matched = find_stack(source, call, other);

        if !matched.found {
            divergences.push(Divergence {
                call,
                reason: DivergenceReason::StackNotFound,
            });
            continue;
        }

        if !matched.sufficient {
            divergences.push(Divergence {
                call,
                reason: DivergenceReason::InsufficientCallCount,
            });
        }

        pending.extend(source.children(call).iter().rev().copied());
    }

    debug!("Found {} divergences", divergences.len());
    divergences
}

/// Run both directional passes in parallel
pub fn compare_trees(baseline: &CallTree, target: &CallTree) -> Comparison {
    let (baseline_divergences, target_divergences) = rayon::join(
        || find_divergences(baseline, target),
        || find_divergences(target, baseline),
    );

    Comparison {
        baseline_divergences,
        target_divergences,
    }
}

/// Collapse divergences sharing a function name and caller name
///
/// Groups keep the order in which their first member was found.
pub fn group_divergences(source: &CallTree, divergences: &[Divergence]) -> Vec<DivergenceGroup> {
    let mut groups: Vec<DivergenceGroup> = Vec::new();
    let mut index: HashMap<(&str, Option<&str>), usize> = HashMap::new();

    for divergence in divergences {
        let name = source.name(divergence.call).unwrap_or_default();
        let caller = source
            .parent(divergence.call)
            .and_then(|caller| source.name(caller));

        let slot = *index.entry((name, caller)).or_insert_with(|| {
            groups.push(DivergenceGroup {
                name: name.to_string(),
                caller: caller.map(str::to_string),
                occurrences: 0,
                stack_not_found: 0,
                insufficient_calls: 0,
                example_stack: source.call_name_stack(divergence.call).join(";"),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.occurrences += 1;
        match divergence.reason {
            DivergenceReason::StackNotFound => group.stack_not_found += 1,
            DivergenceReason::InsufficientCallCount => group.insufficient_calls += 1,
        }
    }

    groups
}

/// Compare two recordings and build a complete report
///
/// # Arguments
/// * `baseline` - The known-good recording and its label
/// * `target` - The recording under investigation and its label
///
/// # Example
/// ```ignore
/// let report = generate_report((&good, "good.json"), (&bad, "bad.json"));
/// println!("{}", render_terminal_report(&report, 50));
/// ```
pub fn generate_report(
    baseline: (&CallTree, &str),
    target: (&CallTree, &str),
) -> DivergenceReport {
    let (baseline_tree, baseline_label) = baseline;
    let (target_tree, target_label) = target;

    let comparison = compare_trees(baseline_tree, target_tree);

    let target_divergences = DirectionReport {
        source: target_label.to_string(),
        other: baseline_label.to_string(),
        divergence_count: comparison.target_divergences.len(),
        groups: group_divergences(target_tree, &comparison.target_divergences),
    };
    let baseline_divergences = DirectionReport {
        source: baseline_label.to_string(),
        other: target_label.to_string(),
        divergence_count: comparison.baseline_divergences.len(),
        groups: group_divergences(baseline_tree, &comparison.baseline_divergences),
    };

    let total_divergences =
        target_divergences.divergence_count + baseline_divergences.divergence_count;
    let status = if total_divergences == 0 {
        "IDENTICAL"
    } else {
        "DIVERGED"
    };

    info!(
        "{} diverged from {} in {} places; {} diverged from {} in {} places",
        target_label,
        baseline_label,
        target_divergences.divergence_count,
        baseline_label,
        target_label,
        baseline_divergences.divergence_count
    );

    DivergenceReport {
        report_version: REPORT_VERSION.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        baseline: recording_metadata(baseline_tree, baseline_label),
        target: recording_metadata(target_tree, target_label),
        target_divergences,
        baseline_divergences,
        summary: ReportSummary {
            status: status.to_string(),
            total_divergences,
        },
    }
}

fn recording_metadata(tree: &CallTree, label: &str) -> RecordingMetadata {
    let shape = tree_shape(tree);
    RecordingMetadata {
        label: label.to_string(),
        call_count: shape.call_count,
        unique_names: shape.unique_names,
        max_depth: shape.max_depth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root -> [fn1 -> [fn3], fn2]
    fn simple_tree() -> CallTree {
        let mut tree = CallTree::new();
        let root = tree.root();
        let fn1 = tree.add_call(root, "fn1").unwrap();
        tree.add_call(root, "fn2").unwrap();
        tree.add_call(fn1, "fn3").unwrap();
        tree
    }

    #[test]
    fn test_find_stack() {
        let mut tree = simple_tree();
        let other = simple_tree();
        let root = tree.root();
        let fn1 = tree.children(root)[0];
        let fn3 = tree.children(fn1)[0];

        let matched = find_stack(&tree, fn1, &other);
        assert!(matched.found && matched.sufficient);
        let matched = find_stack(&tree, fn3, &other);
        assert!(matched.found && matched.sufficient);

        let fn4 = tree.new_call("fn4");
        assert_eq!(find_stack(&tree, fn4, &other), StackMatch::default());
        assert_eq!(find_stack(&tree, fn4, &tree), StackMatch::default());

        tree.attach(fn3, fn4).unwrap();
        assert_eq!(find_stack(&tree, fn4, &other), StackMatch::default());
        let matched = find_stack(&tree, fn4, &tree);
        assert!(matched.found && matched.sufficient);
    }

    #[test]
    fn test_find_stack_of_root() {
        let tree = simple_tree();
        assert_eq!(find_stack(&tree, tree.root(), &tree), StackMatch::default());
    }

    #[test]
    fn test_sufficiency_tries_every_sibling() {
        // Source: one fn1 calling fn3 twice
        let mut source = CallTree::new();
        let root = source.root();
        let fn1 = source.add_call(root, "fn1").unwrap();
        let fn3 = source.add_call(fn1, "fn3").unwrap();
        source.add_call(fn1, "fn3").unwrap();

        // Other: first fn1 calls fn3 once, second fn1 calls it twice
        let mut other = CallTree::new();
        let root = other.root();
        let first = other.add_call(root, "fn1").unwrap();
        other.add_call(first, "fn3").unwrap();
        let second = other.add_call(root, "fn1").unwrap();
        other.add_call(second, "fn3").unwrap();
        other.add_call(second, "fn3").unwrap();

        let matched = find_stack(&source, fn3, &other);
        assert!(matched.found && matched.sufficient);
    }

    #[test]
    fn test_out_of_order_iteration() {
        // A: fn1 -> [fn3], fn2, fn1 -> [fn3, fn4]
        let mut a = CallTree::new();
        let root = a.root();
        let first = a.add_call(root, "fn1").unwrap();
        a.add_call(first, "fn3").unwrap();
        a.add_call(root, "fn2").unwrap();
        let second = a.add_call(root, "fn1").unwrap();
        a.add_call(second, "fn3").unwrap();
        a.add_call(second, "fn4").unwrap();

        // B: fn1 -> [fn3, fn4], fn2, fn1 -> [fn3]
        let mut b = CallTree::new();
        let root = b.root();
        let first = b.add_call(root, "fn1").unwrap();
        let b_fn3 = b.add_call(first, "fn3").unwrap();
        b.add_call(first, "fn4").unwrap();
        b.add_call(root, "fn2").unwrap();
        let second = b.add_call(root, "fn1").unwrap();
        b.add_call(second, "fn3").unwrap();

        assert!(find_divergences(&a, &b).is_empty());
        assert!(find_divergences(&b, &a).is_empty());

        let fn5 = b.add_call(b_fn3, "fn5").unwrap();
        assert!(find_divergences(&a, &b).is_empty());
        assert_eq!(
            find_divergences(&b, &a),
            vec![Divergence {
                call: fn5,
                reason: DivergenceReason::StackNotFound
            }]
        );
    }

    #[test]
    fn test_pre_order_findings_below_count_shortfall() {
        // A: fn1 -> [fn2, fn3]
        let mut a = CallTree::new();
        let root = a.root();
        let fn1 = a.add_call(root, "fn1").unwrap();
        a.add_call(fn1, "fn2").unwrap();
        a.add_call(fn1, "fn3").unwrap();

        // B: fn1 -> [fn2, newFn], fn1 -> [fn3]
        let mut b = CallTree::new();
        let root = b.root();
        let first = b.add_call(root, "fn1").unwrap();
        b.add_call(first, "fn2").unwrap();
        let new_fn = b.add_call(first, "newFn").unwrap();
        let second = b.add_call(root, "fn1").unwrap();
        b.add_call(second, "fn3").unwrap();

        assert!(find_divergences(&a, &b).is_empty());
        assert_eq!(
            find_divergences(&b, &a),
            vec![
                Divergence {
                    call: first,
                    reason: DivergenceReason::InsufficientCallCount
                },
                Divergence {
                    call: new_fn,
                    reason: DivergenceReason::StackNotFound
                },
                Divergence {
                    call: second,
                    reason: DivergenceReason::InsufficientCallCount
                },
            ]
        );
    }

    #[test]
    fn test_missing_subtree_is_reported_once() {
        let a = simple_tree();
        let mut b = simple_tree();
        let root = b.root();
        let extra = b.add_call(root, "extra").unwrap();
        b.add_call(extra, "deeper").unwrap();

        assert_eq!(
            find_divergences(&b, &a),
            vec![Divergence {
                call: extra,
                reason: DivergenceReason::StackNotFound
            }]
        );
    }

    #[test]
    fn test_group_divergences() {
        let a = simple_tree();
        let mut b = simple_tree();
        let root = b.root();
        let fn1 = b.children(root)[0];
        b.add_call(fn1, "fn3").unwrap();
        b.add_call(fn1, "fn3").unwrap();
        b.add_call(root, "fn9").unwrap();

        let divergences = find_divergences(&b, &a);
        assert_eq!(divergences.len(), 4);

        let groups = group_divergences(&b, &divergences);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "fn3");
        assert_eq!(groups[0].caller.as_deref(), Some("fn1"));
        assert_eq!(groups[0].occurrences, 3);
        assert_eq!(groups[0].insufficient_calls, 3);
        assert_eq!(groups[0].example_stack, "fn1;fn3");
        assert_eq!(groups[1].name, "fn9");
        assert_eq!(groups[1].caller, None);
        assert_eq!(groups[1].stack_not_found, 1);
    }

    #[test]
    fn test_generate_report_status() {
        let a = simple_tree();
        let report = generate_report((&a, "a.json"), (&a, "b.json"));
        assert_eq!(report.summary.status, "IDENTICAL");
        assert!(!report.has_divergences());
        assert_eq!(report.baseline.call_count, 3);
        assert_eq!(report.target.max_depth, 2);

        let mut b = simple_tree();
        let root = b.root();
        b.add_call(root, "fn9").unwrap();
        let report = generate_report((&a, "a.json"), (&b, "b.json"));
        assert_eq!(report.summary.status, "DIVERGED");
        assert_eq!(report.summary.total_divergences, 1);
        assert_eq!(report.target_divergences.source, "b.json");
        assert_eq!(report.target_divergences.groups[0].name, "fn9");
        assert!(report.baseline_divergences.groups.is_empty());
    }
}
