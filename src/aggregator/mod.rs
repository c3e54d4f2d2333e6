//! Aggregation of a single recording into statistics.
//!
//! This module summarizes one calling context tree as:
//! - Call frequencies (most called functions)
//! - Overall tree shape (size, distinct names, depth)
//! - Collapsed stacks (for external flamegraph tooling)

pub mod call_stats;
pub mod stack_builder;

// Re-export main types and functions
pub use call_stats::{count_call_names, top_called, tree_shape, TreeShape};
pub use stack_builder::{build_collapsed_stacks, CollapsedStack};
