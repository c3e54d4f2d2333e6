//! Stats command implementation.
//!
//! Prints the shape of one recording and its most called functions, and
//! optionally exports collapsed stacks.

use super::models::StatsArgs;
use super::utils::load_recording;
use crate::aggregator::{build_collapsed_stacks, top_called, tree_shape};
use crate::output::write_collapsed_stacks;
use anyhow::{Context, Result};
use colored::*;

/// Execute the stats command
pub fn execute_stats(args: StatsArgs) -> Result<()> {
    validate_stats_args(&args)?;

    let tree = load_recording(&args.recording, args.normalize.as_ref())
        .context("Failed to load recording")?;

    let shape = tree_shape(&tree);
    println!("{}", args.recording.display().to_string().bold());
    println!("  {}", shape.summary());
    println!();

    let ranked = top_called(&tree, args.top);
    println!("Top {} called functions:", ranked.len());
    let width = ranked
        .first()
        .map(|(count, _)| count.to_string().len())
        .unwrap_or(1);
    for (count, name) in &ranked {
        println!("  {:>width$}  {}", count, name, width = width);
    }

    if let Some(path) = &args.collapsed {
        let stacks = build_collapsed_stacks(&tree);
        write_collapsed_stacks(&stacks, path).context("Failed to write collapsed stacks")?;
        println!(
            "\n{} collapsed stacks written to {}",
            stacks.len(),
            path.display().to_string().cyan()
        );
    }

    Ok(())
}

/// Validate stats arguments
pub fn validate_stats_args(args: &StatsArgs) -> Result<()> {
    if args.top == 0 {
        anyhow::bail!("top must be greater than 0");
    }

    Ok(())
}
