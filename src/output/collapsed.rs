//! Collapsed stack output writer.

use super::json::write_text;
use crate::aggregator::CollapsedStack;
use crate::utils::error::OutputError;
use std::path::Path;

/// Write collapsed stacks, one `stack weight` line each
///
/// The file can be fed to flamegraph tools that read the collapsed format.
pub fn write_collapsed_stacks(
    stacks: &[CollapsedStack],
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let mut content = String::new();
    for stack in stacks {
        content.push_str(&stack.to_line());
        content.push('\n');
    }

    write_text(&content, output_path.as_ref())
}
