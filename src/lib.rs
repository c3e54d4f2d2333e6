//! cctdb
//!
//! Calling context tree recording, comparison and divergence analysis for
//! differential debugging.
//!
//! Two recordings of the same program ("good" and "bad" runs) are loaded
//! into [model::CallTree]s and compared call by call. Every call whose chain
//! of callers, or whose number of same-named siblings, cannot be matched in
//! the other recording is reported as a divergence. Sibling order is ignored.
//!
//! This crate provides the core implementation for the `cctdb` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! cctdb compare good.json bad.json
//! cctdb stats good.json --top 20
//! cctdb --help
//! ```

pub mod aggregator;
pub mod commands;
pub mod diff;
pub mod model;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod utils;
