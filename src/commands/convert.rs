//! Convert command implementation.
//! Rewrites a recording of either format as canonical tree JSON.

use super::models::ConvertArgs;
use super::utils::load_recording;
use crate::output::write_recording;
use anyhow::{Context, Result};
use colored::*;

/// Execute the convert command
pub fn execute_convert(args: ConvertArgs) -> Result<()> {
    if args.input == args.output {
        anyhow::bail!("Input and output must be different files");
    }

    let tree =
        load_recording(&args.input, args.normalize.as_ref()).context("Failed to load recording")?;

    write_recording(&tree, &args.output, args.pretty).context("Failed to write recording")?;

    println!(
        "Recording written to {}",
        args.output.display().to_string().cyan()
    );

    Ok(())
}
