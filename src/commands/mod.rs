//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod compare;
pub mod convert;
pub mod models;
pub mod stats;
pub mod utils;

// Re-export main command functions
pub use compare::{execute_compare, validate_compare_args};
pub use convert::execute_convert;
pub use models::{CompareArgs, ConvertArgs, StatsArgs};
pub use stats::{execute_stats, validate_stats_args};
pub use utils::{display_version, load_recording, resolve_transform, validate_recording_file};
