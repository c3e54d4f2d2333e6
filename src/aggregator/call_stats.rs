//! Call frequency statistics over a single recording.

use crate::model::CallTree;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Count every call of every function, root excluded
///
/// A function called from several places is counted once per call.
pub fn count_call_names(tree: &CallTree) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut pending = vec![tree.root()];

    // Each node already knows how often it calls each name
    while let Some(id) = pending.pop() {
        for name in tree.unique_call_names(id) {
            *counts.entry(name.to_string()).or_insert(0) += tree.call_count(id, name);
        }
        pending.extend_from_slice(tree.children(id));
    }

    counts
}

/// The `n` most called functions as `(count, name)` pairs
///
/// **Public** - used by the stats command
///
/// # Returns
/// Pairs sorted by count descending. Equal counts are ordered by name
/// descending.
pub fn top_called(tree: &CallTree, n: usize) -> Vec<(usize, String)> {
    let mut ranked: Vec<(usize, String)> = count_call_names(tree)
        .into_iter()
        .map(|(name, count)| (count, name))
        .collect();

    ranked.sort_unstable_by(|a, b| b.cmp(a));
    ranked.truncate(n);

    debug!("Selected top {} of called functions", ranked.len());
    ranked
}

/// Overall shape of a recording
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeShape {
    /// Number of calls, root excluded
    pub call_count: usize,

    /// Number of distinct function names
    pub unique_names: usize,

    /// Number of calls made directly by the root
    pub top_level_calls: usize,

    /// Deepest frame depth (0 for an empty recording)
    pub max_depth: usize,
}

impl TreeShape {
    /// One-line description, e.g. "12 calls, 4 distinct functions, 2 top-level, max depth 5"
    pub fn summary(&self) -> String {
        format!(
            "{} calls, {} distinct functions, {} top-level, max depth {}",
            self.call_count, self.unique_names, self.top_level_calls, self.max_depth
        )
    }
}

/// Measure the shape of `tree` in a single walk
pub fn tree_shape(tree: &CallTree) -> TreeShape {
    let root = tree.root();
    let mut shape = TreeShape {
        top_level_calls: tree.children(root).len(),
        ..Default::default()
    };
    let mut names = std::collections::HashSet::new();
    let mut pending: Vec<(_, usize)> = tree.children(root).iter().map(|&id| (id, 1)).collect();

    while let Some((id, depth)) = pending.pop() {
        shape.call_count += 1;
        shape.max_depth = shape.max_depth.max(depth);
        if let Some(name) = tree.name(id) {
            names.insert(name);
        }
        pending.extend(tree.children(id).iter().map(|&child| (child, depth + 1)));
    }

    shape.unique_names = names.len();
    shape
}

#[cfg(test)]
mod tests {
    use super::*;

    /// fn1 -> [fn2, fn1 -> [fn3]], fn1
    fn repeated_tree() -> CallTree {
        let mut tree = CallTree::new();
        let root = tree.root();
        let outer = tree.add_call(root, "fn1").unwrap();
        tree.add_call(outer, "fn2").unwrap();
        let inner = tree.add_call(outer, "fn1").unwrap();
        tree.add_call(inner, "fn3").unwrap();
        tree.add_call(root, "fn1").unwrap();
        tree
    }

    #[test]
    fn test_count_call_names() {
        let counts = count_call_names(&repeated_tree());
        assert_eq!(counts.len(), 3);
        assert_eq!(counts["fn1"], 3);
        assert_eq!(counts["fn2"], 1);
        assert_eq!(counts["fn3"], 1);
    }

    #[test]
    fn test_top_called_tie_break() {
        let tree = repeated_tree();
        assert_eq!(
            top_called(&tree, 2),
            vec![(3, "fn1".to_string()), (1, "fn3".to_string())]
        );
        assert_eq!(top_called(&tree, 10).len(), 3);
        assert!(top_called(&CallTree::new(), 5).is_empty());
    }

    #[test]
    fn test_tree_shape() {
        let shape = tree_shape(&repeated_tree());
        assert_eq!(
            shape,
            TreeShape {
                call_count: 5,
                unique_names: 3,
                top_level_calls: 2,
                max_depth: 3,
            }
        );
        assert_eq!(
            shape.summary(),
            "5 calls, 3 distinct functions, 2 top-level, max depth 3"
        );
        assert_eq!(tree_shape(&CallTree::new()), TreeShape::default());
    }
}
