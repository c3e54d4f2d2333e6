//! Recording and report files.
//!
//! Reads recordings in either ingest format and writes canonical tree JSON
//! and divergence reports.

use crate::diff::DivergenceReport;
use crate::model::CallTree;
use crate::parser::{parse_record, tree_from_json, tree_to_json, tree_to_json_pretty};
use crate::utils::error::{OutputError, ParseError};
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// On-disk format of a recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingFormat {
    /// Nested `[{"name": .., "calls": [..]}]` document
    Tree,
    /// Line-oriented `entering` / `exiting` events
    Record,
}

impl RecordingFormat {
    /// Guess the format from file contents
    ///
    /// A document whose first non-whitespace character is `[` is a tree;
    /// anything else (including an empty file) is a record.
    pub fn detect(contents: &str) -> Self {
        if contents.trim_start().starts_with('[') {
            RecordingFormat::Tree
        } else {
            RecordingFormat::Record
        }
    }
}

/// Parse a recording held in memory, autodetecting its format
pub fn recording_from_str(contents: &str) -> Result<CallTree, ParseError> {
    match RecordingFormat::detect(contents) {
        RecordingFormat::Tree => tree_from_json(contents),
        RecordingFormat::Record => parse_record(contents),
    }
}

/// Read a recording from disk
///
/// **Public** - main entry point for file ingest
///
/// # Errors
/// * `OutputError::NotFound` - The file does not exist
/// * `OutputError::ReadFailed` - I/O error during read
/// * `OutputError::InvalidRecording` - Contents are malformed
pub fn read_recording(input_path: impl AsRef<Path>) -> Result<CallTree, OutputError> {
    let input_path = input_path.as_ref();

    if !input_path.exists() {
        return Err(OutputError::NotFound(input_path.to_path_buf()));
    }

    debug!("Reading recording from: {}", input_path.display());

    let contents = std::fs::read_to_string(input_path).map_err(OutputError::ReadFailed)?;

    let tree = recording_from_str(&contents).map_err(|source| OutputError::InvalidRecording {
        path: input_path.to_path_buf(),
        source,
    })?;

    debug!(
        "Recording loaded: {} ({:?} format, {} nodes)",
        input_path.display(),
        RecordingFormat::detect(&contents),
        tree.len()
    );

    Ok(tree)
}

/// Write a recording in the canonical tree format
///
/// Compact output is the canonical form; `pretty` indents it for humans.
///
/// # Example
/// ```ignore
/// let tree = read_recording("run.log")?;
/// write_recording(&tree, "run.json", false)?;
/// ```
pub fn write_recording(
    tree: &CallTree,
    output_path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), OutputError> {
    let encoded = if pretty {
        tree_to_json_pretty(tree)?
    } else {
        tree_to_json(tree)?
    };

    write_text(&encoded, output_path.as_ref())
}

/// Write a divergence report as pretty JSON
pub fn write_report(
    report: &DivergenceReport,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let encoded = serde_json::to_string_pretty(report)?;
    write_text(&encoded, output_path.as_ref())
}

/// Write `content` to `output_path`, creating parent directories
pub(crate) fn write_text(content: &str, output_path: &Path) -> Result<(), OutputError> {
    info!("Writing to: {}", output_path.display());

    validate_output_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);

    writer
        .write_all(content.as_bytes())
        .map_err(OutputError::WriteFailed)?;
    writer.flush().map_err(OutputError::WriteFailed)?;

    info!("Written successfully ({} bytes)", content.len());

    Ok(())
}

/// Validate that output path is writable
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const TREE: &str = r#"[{"name":"fn1","calls":[{"name":"fn3"}]},{"name":"fn2"}]"#;

    #[test]
    fn test_detect_format() {
        assert_eq!(RecordingFormat::detect(TREE), RecordingFormat::Tree);
        assert_eq!(RecordingFormat::detect("\n  []"), RecordingFormat::Tree);
        assert_eq!(
            RecordingFormat::detect("entering main\nexiting main\n"),
            RecordingFormat::Record
        );
        assert_eq!(RecordingFormat::detect(""), RecordingFormat::Record);
    }

    #[test]
    fn test_write_and_read_recording() {
        let tree = recording_from_str(TREE).unwrap();
        let temp_file = NamedTempFile::new().unwrap();

        write_recording(&tree, temp_file.path(), false).unwrap();
        assert_eq!(std::fs::read_to_string(temp_file.path()).unwrap(), TREE);

        let loaded = read_recording(temp_file.path()).unwrap();
        assert_eq!(tree_to_json(&loaded).unwrap(), TREE);
    }

    #[test]
    fn test_read_missing_recording() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing.json");
        assert!(matches!(
            read_recording(&missing),
            Err(OutputError::NotFound(path)) if path == missing
        ));
    }

    #[test]
    fn test_read_malformed_recording() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "entering main").unwrap();
        assert!(matches!(
            read_recording(temp_file.path()),
            Err(OutputError::InvalidRecording { .. })
        ));
    }

    #[test]
    fn test_validate_output_path() {
        assert!(validate_output_path(Path::new("")).is_err());
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(validate_output_path(temp_dir.path()).is_err());
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/recording.json");

        write_recording(&CallTree::new(), &nested_path, true).unwrap();

        assert!(nested_path.exists());
    }
}
