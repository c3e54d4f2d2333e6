//! Divergence detection between two calling context trees.
//!
//! This module finds calls of one recording whose calling context cannot be
//! matched in another one, groups the findings by call site and renders them.
//! Sibling order is ignored; sibling multiplicity is not.
//!
//! # Example
//! ```ignore
//! use cctdb::diff::{generate_report, render_terminal_report};
//! use cctdb::output::json::read_recording;
//!
//! let good = read_recording("good.json")?;
//! let bad = read_recording("bad.json")?;
//! let report = generate_report((&good, "good.json"), (&bad, "bad.json"));
//! println!("{}", render_terminal_report(&report, 50));
//! ```

mod engine;
mod output;
mod schema;

// Public API exports
pub use engine::{
    compare_trees, find_divergences, find_stack, generate_report, group_divergences,
};
pub use output::render_terminal_report;
pub use schema::{
    Comparison, DirectionReport, Divergence, DivergenceGroup, DivergenceReason,
    DivergenceReport, RecordingMetadata, ReportSummary, StackMatch,
};
