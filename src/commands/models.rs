use crate::normalize::ExternalCommand;
use crate::utils::config::{DEFAULT_MAX_GROUPS, DEFAULT_TOP_CALLED};
use std::path::PathBuf;

/// Arguments for the compare command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct CompareArgs {
    /// Known-good recording
    pub baseline: PathBuf,

    /// Recording under investigation
    pub target: PathBuf,

    /// Name transform applied to both recordings before comparing
    pub normalize: Option<ExternalCommand>,

    /// Output path for the JSON report (optional)
    pub output: Option<PathBuf>,

    /// Maximum grouped findings printed per direction
    pub max_groups: usize,

    /// Return an error when the recordings diverge
    pub fail_on_divergence: bool,
}

impl Default for CompareArgs {
    fn default() -> Self {
        Self {
            baseline: PathBuf::from("good.json"),
            target: PathBuf::from("bad.json"),
            normalize: None,
            output: None,
            max_groups: DEFAULT_MAX_GROUPS,
            fail_on_divergence: false,
        }
    }
}

/// Arguments for the stats command
#[derive(Debug, Clone)]
pub struct StatsArgs {
    /// Recording to summarize
    pub recording: PathBuf,

    /// Number of most-called functions to print
    pub top: usize,

    /// Name transform applied before counting
    pub normalize: Option<ExternalCommand>,

    /// Output path for collapsed stacks (optional)
    pub collapsed: Option<PathBuf>,
}

impl Default for StatsArgs {
    fn default() -> Self {
        Self {
            recording: PathBuf::from("recording.json"),
            top: DEFAULT_TOP_CALLED,
            normalize: None,
            collapsed: None,
        }
    }
}

/// Arguments for the convert command
#[derive(Debug, Clone)]
pub struct ConvertArgs {
    /// Recording in either format
    pub input: PathBuf,

    /// Destination of the canonical tree JSON
    pub output: PathBuf,

    /// Name transform applied before writing
    pub normalize: Option<ExternalCommand>,

    /// Indent the output
    pub pretty: bool,
}
