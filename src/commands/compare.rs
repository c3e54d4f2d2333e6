//! Compare command implementation.
//!
//! The compare command:
//! 1. Reads both recordings
//! 2. Normalizes names (optional)
//! 3. Finds divergences in both directions
//! 4. Writes the JSON report (optional) and prints the terminal summary

use super::models::CompareArgs;
use super::utils::load_recording;
use crate::diff::{generate_report, render_terminal_report};
use crate::output::write_report;
use anyhow::{Context, Result};
use colored::*;
use log::info;
use std::time::Instant;

/// Execute the compare command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Missing or malformed recordings
/// * Name transform failures
/// * Report write errors
/// * Divergences found while `fail_on_divergence` is set
pub fn execute_compare(args: CompareArgs) -> Result<()> {
    validate_compare_args(&args)?;
    let start = Instant::now();

    // Step 1: Load recordings
    let baseline = load_recording(&args.baseline, args.normalize.as_ref())
        .context("Failed to load baseline recording")?;
    let target = load_recording(&args.target, args.normalize.as_ref())
        .context("Failed to load target recording")?;

    // Step 2: Compare
    let baseline_label = args.baseline.display().to_string();
    let target_label = args.target.display().to_string();
    let report = generate_report(
        (&baseline, baseline_label.as_str()),
        (&target, target_label.as_str()),
    );

    info!("Comparison finished in {:.2?}", start.elapsed());

    // Step 3: Write output if requested
    if let Some(path) = &args.output {
        write_report(&report, path).context("Failed to write divergence report JSON")?;
        println!(
            "Divergence report written to {}",
            path.display().to_string().cyan()
        );
    }

    // Step 4: Terminal summary
    println!("{}", render_terminal_report(&report, args.max_groups));

    if args.fail_on_divergence && report.has_divergences() {
        anyhow::bail!(
            "Recordings diverge in {} places",
            report.summary.total_divergences
        );
    }

    Ok(())
}

/// Validate compare arguments
pub fn validate_compare_args(args: &CompareArgs) -> Result<()> {
    if args.max_groups == 0 {
        anyhow::bail!("max_groups must be greater than 0");
    }

    Ok(())
}
