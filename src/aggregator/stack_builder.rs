//! Build collapsed stack format from a calling context tree.
//!
//! Collapsed stacks are the input format of common flamegraph tools.
//! Format: "parent;child;grandchild weight"
//!
//! Example: "main;quicksort;swap 12"
//! This means: main called quicksort which called swap, 12 times along that path.

use crate::model::{CallId, CallTree};
use log::debug;
use std::collections::HashMap;

/// A single collapsed stack entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string
    pub stack: String,

    /// Number of calls recorded with exactly this stack
    pub weight: u64,
}

impl CollapsedStack {
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    /// Format as one line of collapsed stack output
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Build collapsed stacks from a recording
///
/// **Public** - used by `stats --collapsed`
///
/// # Returns
/// One entry per distinct name path, sorted by weight (descending) and
/// then by stack.
///
/// # Algorithm
/// 1. Walk the tree with an explicit stack, carrying each call's path
/// 2. Count every call under its path string
pub fn build_collapsed_stacks(tree: &CallTree) -> Vec<CollapsedStack> {
    let mut stack_map: HashMap<String, u64> = HashMap::new();
    let mut pending: Vec<(CallId, String)> = Vec::new();

    push_children(tree, tree.root(), "", &mut pending);

    while let Some((id, path)) = pending.pop() {
        push_children(tree, id, &path, &mut pending);
        *stack_map.entry(path).or_insert(0) += 1;
    }

    let mut stacks: Vec<CollapsedStack> = stack_map
        .into_iter()
        .map(|(stack, weight)| CollapsedStack::new(stack, weight))
        .collect();

    stacks.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.stack.cmp(&b.stack)));

    debug!("Built {} unique collapsed stacks", stacks.len());

    stacks
}

fn push_children(tree: &CallTree, id: CallId, path: &str, pending: &mut Vec<(CallId, String)>) {
    for &child in tree.children(id) {
        let name = tree.name(child).unwrap_or_default();
        let child_path = if path.is_empty() {
            name.to_string()
        } else {
            format!("{};{}", path, name)
        };
        pending.push((child, child_path));
    }
}
