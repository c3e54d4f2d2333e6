//! Schema definitions for divergence reports.
//!
//! Defines the structures that describe where two recordings diverge.

use crate::model::CallId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a call could not be matched in the other tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivergenceReason {
    /// No chain of same-named calls leads to this call in the other tree
    StackNotFound,
    /// The chain exists but no match has as many same-named siblings
    InsufficientCallCount,
}

impl DivergenceReason {
    /// Human-readable explanation for a call named `name`
    pub fn describe(self, name: &str) -> String {
        match self {
            DivergenceReason::StackNotFound => "Equivalent stack was not found.".to_string(),
            DivergenceReason::InsufficientCallCount => {
                format!("Did not find sufficient calls to {}.", name)
            }
        }
    }
}

impl fmt::Display for DivergenceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DivergenceReason::StackNotFound => write!(f, "stack not found"),
            DivergenceReason::InsufficientCallCount => write!(f, "insufficient calls"),
        }
    }
}

/// A single diverging call of the source tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Divergence {
    /// The call in the source tree
    pub call: CallId,

    /// Why it has no counterpart in the other tree
    pub reason: DivergenceReason,
}

/// Result of a stack search for one call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StackMatch {
    /// Some same-named chain of calls exists
    pub found: bool,

    /// Some matching chain also has enough same-named siblings
    pub sufficient: bool,
}

/// Both directional passes over a pair of trees
#[derive(Debug, Clone, Default)]
pub struct Comparison {
    /// Calls of the baseline with no counterpart in the target
    pub baseline_divergences: Vec<Divergence>,

    /// Calls of the target with no counterpart in the baseline
    pub target_divergences: Vec<Divergence>,
}

impl Comparison {
    pub fn is_identical(&self) -> bool {
        self.baseline_divergences.is_empty() && self.target_divergences.is_empty()
    }
}

/// Divergences sharing a function name and caller name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivergenceGroup {
    /// Name of the diverging function
    pub name: String,

    /// Name of its caller, `None` for top-level calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,

    /// Number of diverging calls collapsed into this group
    pub occurrences: usize,

    /// How many of them had no matching stack
    pub stack_not_found: usize,

    /// How many of them had too few same-named siblings
    pub insufficient_calls: usize,

    /// Collapsed stack of the first occurrence (e.g. "main;quicksort;swap")
    pub example_stack: String,
}

/// Findings of one direction: calls of `source` missing from `other`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionReport {
    /// Label of the tree whose calls were checked
    pub source: String,

    /// Label of the tree searched for counterparts
    pub other: String,

    /// Total number of diverging calls before grouping
    pub divergence_count: usize,

    /// Grouped findings in first-seen (pre-order) order
    pub groups: Vec<DivergenceGroup>,
}

/// Metadata describing one compared recording
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RecordingMetadata {
    /// File path or other label
    pub label: String,

    /// Number of calls, root excluded
    pub call_count: usize,

    /// Number of distinct function names
    pub unique_names: usize,

    /// Deepest observed call stack
    pub max_depth: usize,
}

/// Complete comparison report for two recordings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivergenceReport {
    /// Schema version for the report format
    pub report_version: String,

    /// Timestamp when the report was generated
    pub generated_at: String,

    /// Metadata of the baseline ("good") recording
    pub baseline: RecordingMetadata,

    /// Metadata of the target ("bad") recording
    pub target: RecordingMetadata,

    /// Target calls with no counterpart in the baseline
    pub target_divergences: DirectionReport,

    /// Baseline calls with no counterpart in the target
    pub baseline_divergences: DirectionReport,

    /// Summary of the comparison
    pub summary: ReportSummary,
}

/// Summary of comparison results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Overall status: "IDENTICAL" or "DIVERGED"
    pub status: String,

    /// Diverging calls across both directions
    pub total_divergences: usize,
}

impl DivergenceReport {
    pub fn has_divergences(&self) -> bool {
        self.summary.total_divergences > 0
    }
}
