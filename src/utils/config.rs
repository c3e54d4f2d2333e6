//! Configuration and constants for the CLI.
//!
//! Constants live here alongside the optional `cctdb.toml` file format.
//! Values from the file act as defaults that command-line flags override.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current divergence report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Keyword that opens a call in the textual record protocol
pub const ENTERING_KEYWORD: &str = "entering";

/// Keyword that closes a call in the textual record protocol
pub const EXITING_KEYWORD: &str = "exiting";

/// External demangler used by `--demangle`
pub const DEFAULT_DEMANGLER: &str = "c++filt";

/// Number of names printed by `stats` when nothing else is configured
pub const DEFAULT_TOP_CALLED: usize = 100;

/// Number of grouped divergences printed per direction by default
pub const DEFAULT_MAX_GROUPS: usize = 50;

/// Complete tool configuration (`cctdb.toml`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CctdbConfig {
    /// Name normalization settings
    #[serde(default)]
    pub normalize: NormalizeSettings,

    /// Comparison report settings
    #[serde(default)]
    pub report: ReportSettings,

    /// Statistics settings
    #[serde(default)]
    pub stats: StatsSettings,
}

/// Name normalization settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NormalizeSettings {
    /// Command line of the name transform, e.g. "c++filt -n"
    pub command: Option<String>,
}

/// Comparison report settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportSettings {
    /// Maximum grouped findings printed per direction
    #[serde(default = "default_max_groups")]
    pub max_groups: usize,

    /// Return a failure when the recordings diverge
    #[serde(default)]
    pub fail_on_divergence: bool,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            max_groups: DEFAULT_MAX_GROUPS,
            fail_on_divergence: false,
        }
    }
}

/// Statistics settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatsSettings {
    /// Number of most-called names to print
    #[serde(default = "default_top_called")]
    pub top: usize,
}

impl Default for StatsSettings {
    fn default() -> Self {
        Self {
            top: DEFAULT_TOP_CALLED,
        }
    }
}

fn default_max_groups() -> usize {
    DEFAULT_MAX_GROUPS
}

fn default_top_called() -> usize {
    DEFAULT_TOP_CALLED
}

/// Load configuration from a TOML file
///
/// # Errors
/// * `ConfigError::IoError` - If file cannot be read
/// * `ConfigError::ParseFailed` - If TOML is invalid
/// * `ConfigError::Invalid` - If a value is out of range
pub fn load_config(path: impl AsRef<Path>) -> Result<CctdbConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse configuration from TOML text
pub fn parse_config(contents: &str) -> Result<CctdbConfig, ConfigError> {
    let config: CctdbConfig = toml::from_str(contents)?;

    if config.report.max_groups == 0 {
        return Err(ConfigError::Invalid(
            "report.max_groups must be greater than 0".to_string(),
        ));
    }
    if config.stats.top == 0 {
        return Err(ConfigError::Invalid(
            "stats.top must be greater than 0".to_string(),
        ));
    }
    if let Some(command) = &config.normalize.command {
        if command.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "normalize.command must not be empty".to_string(),
            ));
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert!(config.normalize.command.is_none());
        assert_eq!(config.report.max_groups, DEFAULT_MAX_GROUPS);
        assert!(!config.report.fail_on_divergence);
        assert_eq!(config.stats.top, DEFAULT_TOP_CALLED);
    }

    #[test]
    fn test_full_config() {
        let config = parse_config(
            r#"
[normalize]
command = "c++filt -n"

[report]
max_groups = 10
fail_on_divergence = true

[stats]
top = 5
"#,
        )
        .unwrap();

        assert_eq!(config.normalize.command.as_deref(), Some("c++filt -n"));
        assert_eq!(config.report.max_groups, 10);
        assert!(config.report.fail_on_divergence);
        assert_eq!(config.stats.top, 5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(parse_config("[report]\nmax_groups = 0\n").is_err());
        assert!(parse_config("[stats]\ntop = 0\n").is_err());
        assert!(parse_config("[normalize]\ncommand = \"  \"\n").is_err());
        assert!(parse_config("[report\n").is_err());
    }
}
