//! Recording ingest.
//!
//! This module handles:
//! - Parsing the textual enter/exit record protocol (multi-thread aware)
//! - Decoding and encoding the canonical tree format
//! - Defining the on-disk schema

pub mod record;
pub mod schema;
pub mod tree_json;

// Re-export main types
pub use record::{parse_record, parse_record_line, EventKind, RecordEvent};
pub use schema::RecordedCall;
pub use tree_json::{
    from_recorded_calls, to_recorded_calls, tree_from_json, tree_to_json, tree_to_json_pretty,
};
