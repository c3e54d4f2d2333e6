use crate::aggregator::tree_shape;
use crate::model::CallTree;
use crate::normalize::{normalize_names, ExternalCommand};
use crate::output::read_recording;
use crate::utils::config::{CctdbConfig, REPORT_VERSION};
use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

/// Read a recording and run it through the name transform, if any
pub fn load_recording(path: &Path, normalize: Option<&ExternalCommand>) -> Result<CallTree> {
    let mut tree = read_recording(path)?;

    if let Some(command) = normalize {
        let distinct = normalize_names(&mut tree, command).with_context(|| {
            format!(
                "Failed to normalize names of {} with '{}'",
                path.display(),
                command.program()
            )
        })?;
        info!("Normalized {} names in {}", distinct, path.display());
    }

    Ok(tree)
}

/// Pick the name transform from CLI flags, falling back to the config file
///
/// `--demangle` wins over `--transform`, which wins over `normalize.command`.
pub fn resolve_transform(
    demangle: bool,
    transform: Option<&str>,
    config: &CctdbConfig,
) -> Result<Option<ExternalCommand>> {
    if demangle {
        return Ok(Some(ExternalCommand::demangler()));
    }

    match transform.or(config.normalize.command.as_deref()) {
        Some(command_line) => ExternalCommand::parse(command_line)
            .map(Some)
            .ok_or_else(|| anyhow::anyhow!("Name transform command cannot be empty")),
        None => Ok(None),
    }
}

/// Validate a recording file
pub fn validate_recording_file(file_path: PathBuf) -> Result<()> {
    println!("Validating recording: {}", file_path.display());

    let tree = read_recording(&file_path)?;
    let shape = tree_shape(&tree);

    println!("✓ Valid recording");
    println!("  Calls: {}", shape.call_count);
    println!("  Distinct functions: {}", shape.unique_names);
    println!("  Top-level calls: {}", shape.top_level_calls);
    println!("  Max depth: {}", shape.max_depth);

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("cctdb v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", REPORT_VERSION);
    println!();
    println!("Calling context tree comparison for differential debugging.");
}
