//! Canonical tree format schema definitions.
//!
//! This module defines the structure of recording JSON files on disk.
//! A recording is an ordered array of the root's calls:
//!
//! ```json
//! [{"name":"fn1","calls":[{"name":"fn3"}]},{"name":"fn2"}]
//! ```

use serde::{Deserialize, Serialize};

/// One call in the canonical tree format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedCall {
    /// Function name
    pub name: String,

    /// Calls made by this function; omitted (not empty) when there are none
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calls: Vec<RecordedCall>,
}

impl RecordedCall {
    /// Create a call that made no further calls
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calls: Vec::new(),
        }
    }

    /// Create a call with the given direct calls
    pub fn with_calls(name: impl Into<String>, calls: Vec<RecordedCall>) -> Self {
        Self {
            name: name.into(),
            calls,
        }
    }
}

// Deep recordings would overflow the stack with the derived recursive drop
impl Drop for RecordedCall {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.calls);
        while let Some(mut call) = pending.pop() {
            pending.append(&mut call.calls);
        }
    }
}
