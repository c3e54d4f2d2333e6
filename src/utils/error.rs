//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised when a call is attached to a calling context tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttachError {
    #[error("Function '{0}' is already called by an existing function")]
    AlreadyAttached(String),

    #[error("Function cannot be added without a name")]
    Unnamed,

    #[error("Attaching '{0}' would make it its own caller")]
    Cycle(String),
}

/// Nesting violations in the textual enter/exit record protocol
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedRecordError {
    #[error("Line {line_number}: expected '[thread] entering|exiting <function>', found '{line}'")]
    InvalidLine { line_number: usize, line: String },

    #[error(
        "Line {}: exiting '{}' without a matching entering{}",
        .line_number,
        .function,
        thread_suffix(.thread)
    )]
    UnmatchedExit {
        line_number: usize,
        thread: Option<String>,
        function: String,
    },

    #[error(
        "Line {}: exiting '{}' but the current call is '{}'{}",
        .line_number,
        .function,
        .current,
        thread_suffix(.thread)
    )]
    MismatchedExit {
        line_number: usize,
        thread: Option<String>,
        function: String,
        current: String,
    },

    #[error("Function '{}' was never exited{}", .function, thread_suffix(.thread))]
    UnexitedCall {
        thread: Option<String>,
        function: String,
    },
}

fn thread_suffix(thread: &Option<String>) -> String {
    match thread {
        Some(thread) => format!(" (thread {})", thread),
        None => String::new(),
    }
}

/// Errors that can occur while ingesting a recording
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Malformed record: {0}")]
    MalformedRecord(#[from] MalformedRecordError),

    #[error("Invalid call tree: {0}")]
    Attach(#[from] AttachError),
}

/// Errors that can occur while rewriting call names
#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Failed to run name transform '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Name transform '{program}' reported an error: {message}")]
    TransformFailed { program: String, message: String },

    #[error("Name transform returned {actual} names for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Name transform returned an empty name for '{name}'")]
    EmptyReplacement { name: String },
}

/// Errors that can occur during file input and output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Recording not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read file: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),

    #[error("Failed to parse recording {path}: {source}")]
    InvalidRecording {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// Errors that can occur while loading the TOML configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config TOML parse error: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
