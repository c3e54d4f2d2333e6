//! cctdb CLI
//!
//! Compares calling context tree recordings of two program runs and
//! reports where they diverge.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use cctdb::commands::{
    display_version, execute_compare, execute_convert, execute_stats, resolve_transform,
    validate_recording_file, CompareArgs, ConvertArgs, StatsArgs,
};
use cctdb::normalize::ExternalCommand;
use cctdb::utils::config::{load_config, CctdbConfig};

/// cctdb - Differential debugging with calling context trees
#[derive(Parser, Debug)]
#[command(name = "cctdb")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a cctdb.toml configuration file
    #[arg(short, long, global = true, env = "CCTDB_CONFIG")]
    config: Option<PathBuf>,
}

/// Name transform flags shared by every command that loads recordings
#[derive(Args, Debug)]
struct NormalizeFlags {
    /// Demangle symbol names with c++filt
    #[arg(short, long)]
    demangle: bool,

    /// External name transform command, e.g. "c++filt -n"
    #[arg(long, conflicts_with = "demangle")]
    transform: Option<String>,
}

impl NormalizeFlags {
    fn resolve(&self, config: &CctdbConfig) -> Result<Option<ExternalCommand>> {
        resolve_transform(self.demangle, self.transform.as_deref(), config)
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare two recordings and report where they diverge
    Compare {
        /// Known-good recording
        baseline: PathBuf,

        /// Recording under investigation
        target: PathBuf,

        #[command(flatten)]
        normalize: NormalizeFlags,

        /// Output path for the JSON report
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum grouped findings printed per direction
        #[arg(long)]
        max_groups: Option<usize>,

        /// Exit with an error when the recordings diverge
        #[arg(long)]
        fail_on_divergence: bool,
    },

    /// Print call statistics of one recording
    Stats {
        /// Recording to summarize
        recording: PathBuf,

        #[command(flatten)]
        normalize: NormalizeFlags,

        /// Number of most-called functions to print
        #[arg(long)]
        top: Option<usize>,

        /// Write collapsed stacks to this file
        #[arg(long)]
        collapsed: Option<PathBuf>,
    },

    /// Convert a recording to canonical tree JSON
    Convert {
        /// Recording in either format
        input: PathBuf,

        /// Destination file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        normalize: NormalizeFlags,

        /// Indent the output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a recording file
    Validate {
        /// Path to recording file
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => CctdbConfig::default(),
    };

    // Execute command
    match cli.command {
        Commands::Compare {
            baseline,
            target,
            normalize,
            output,
            max_groups,
            fail_on_divergence,
        } => {
            let args = CompareArgs {
                baseline,
                target,
                normalize: normalize.resolve(&config)?,
                output,
                max_groups: max_groups.unwrap_or(config.report.max_groups),
                fail_on_divergence: fail_on_divergence || config.report.fail_on_divergence,
            };

            execute_compare(args)?;
        }

        Commands::Stats {
            recording,
            normalize,
            top,
            collapsed,
        } => {
            let args = StatsArgs {
                recording,
                top: top.unwrap_or(config.stats.top),
                normalize: normalize.resolve(&config)?,
                collapsed,
            };

            execute_stats(args)?;
        }

        Commands::Convert {
            input,
            output,
            normalize,
            pretty,
        } => {
            let args = ConvertArgs {
                input,
                output,
                normalize: normalize.resolve(&config)?,
                pretty,
            };

            execute_convert(args)?;
        }

        Commands::Validate { file } => {
            validate_recording_file(file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
