//! Name transforms backed by an external process.
//!
//! The process receives every name on stdin, one per line, and must answer
//! with exactly one line per name on stdout. `c++filt` behaves this way.

use super::NameTransform;
use crate::utils::config::DEFAULT_DEMANGLER;
use crate::utils::error::NormalizeError;
use log::debug;
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

/// A name transform that shells out to an external program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    program: String,
    args: Vec<String>,
}

impl ExternalCommand {
    /// Create a transform running `program` with `args`
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Symbol demangler used by `--demangle`
    pub fn demangler() -> Self {
        Self::new(DEFAULT_DEMANGLER, Vec::new())
    }

    /// Parse a whitespace-separated command line such as `"c++filt -n"`
    ///
    /// Returns `None` for a blank command line.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn failed(&self, message: impl Into<String>) -> NormalizeError {
        NormalizeError::TransformFailed {
            program: self.program.clone(),
            message: message.into(),
        }
    }
}

impl NameTransform for ExternalCommand {
    fn transform(&self, names: &[String]) -> Result<Vec<String>, NormalizeError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            "Running name transform '{}' over {} names",
            self.program,
            names.len()
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| NormalizeError::SpawnFailed {
                program: self.program.clone(),
                source,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| self.failed("stdin was not captured"))?;

        // Feed stdin from its own thread so a full stdout pipe cannot block us
        let mut input = names.join("\n");
        input.push('\n');
        let writer = thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child
            .wait_with_output()
            .map_err(|source| NormalizeError::SpawnFailed {
                program: self.program.clone(),
                source,
            })?;

        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(self.failed(format!("failed to write names: {}", e))),
            Err(_) => return Err(self.failed("stdin writer panicked")),
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            return Err(self.failed(stderr.trim()));
        }
        if !output.status.success() {
            return Err(self.failed(format!("exited with {}", output.status)));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect())
    }
}
