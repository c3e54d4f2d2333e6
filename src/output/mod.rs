//! File input and output.
//!
//! This module handles moving data to and from disk:
//! - Recordings (either ingest format in, canonical tree JSON out)
//! - Divergence reports (pretty JSON)
//! - Collapsed stacks (text)

pub mod collapsed;
pub mod json;

// Re-export main functions
pub use collapsed::write_collapsed_stacks;
pub use json::{
    read_recording, recording_from_str, write_recording, write_report, RecordingFormat,
};
