//! Parser for the textual enter/exit record protocol.
//!
//! Each line is one event: `[thread ]entering <function>` or
//! `[thread ]exiting <function>`. Example recording from two threads:
//!
//! ```text
//! tid1 entering main
//! tid1 entering worker()
//! tid2 entering worker()
//! tid1 exiting worker()
//! tid2 exiting worker()
//! tid1 exiting main
//! ```
//!
//! Every thread keeps its own current call, all starting at the shared root,
//! so interleaved stacks are rebuilt without explicit call identifiers.

use crate::model::{CallId, CallTree};
use crate::utils::config::{ENTERING_KEYWORD, EXITING_KEYWORD};
use crate::utils::error::{MalformedRecordError, ParseError};
use log::debug;
use std::collections::HashMap;

/// Direction of a record event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Entering,
    Exiting,
}

/// One parsed line of a recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEvent<'a> {
    /// Opaque thread token, absent for single-threaded recordings
    pub thread: Option<&'a str>,
    pub kind: EventKind,
    pub function: &'a str,
}

/// Parse a single record line
///
/// **Public** - used by `parse_record` and tests
///
/// # Returns
/// `Ok(None)` for blank lines, the event otherwise
///
/// # Errors
/// * `MalformedRecordError::InvalidLine` - No keyword or no function name
pub fn parse_record_line(
    line: &str,
    line_number: usize,
) -> Result<Option<RecordEvent<'_>>, MalformedRecordError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let invalid = || MalformedRecordError::InvalidLine {
        line_number,
        line: trimmed.to_string(),
    };

    let (first, rest) = split_token(trimmed);
    let (thread, kind, function) = match keyword(first) {
        Some(kind) => (None, kind, rest),
        None => {
            let (second, rest) = split_token(rest);
            let kind = keyword(second).ok_or_else(invalid)?;
            (Some(first), kind, rest)
        }
    };

    if function.is_empty() {
        return Err(invalid());
    }

    Ok(Some(RecordEvent {
        thread,
        kind,
        function,
    }))
}

/// Split off the first whitespace-delimited token, trimming the remainder
fn split_token(text: &str) -> (&str, &str) {
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], text[end..].trim()),
        None => (text, ""),
    }
}

fn keyword(token: &str) -> Option<EventKind> {
    match token {
        ENTERING_KEYWORD => Some(EventKind::Entering),
        EXITING_KEYWORD => Some(EventKind::Exiting),
        _ => None,
    }
}

/// Build a calling context tree from a textual recording
///
/// **Public** - main entry point for the record protocol
///
/// # Errors
/// * `ParseError::MalformedRecord` - Bad line, exit without a matching enter,
///   exit naming a different function, or a call left open at end of input
///
/// # Example
/// ```ignore
/// let tree = parse_record("entering a\nentering b\nexiting b\nexiting a\n")?;
/// assert_eq!(tree.calls().count(), 2);
/// ```
pub fn parse_record(input: &str) -> Result<CallTree, ParseError> {
    let mut tree = CallTree::new();
    let root = tree.root();

    // Current call per thread, threads kept in first-seen order
    let mut current: HashMap<Option<&str>, CallId> = HashMap::new();
    let mut threads: Vec<Option<&str>> = Vec::new();
    let mut event_count = 0usize;

    for (index, line) in input.lines().enumerate() {
        let line_number = index + 1;
        let Some(event) = parse_record_line(line, line_number)? else {
            continue;
        };
        event_count += 1;

        let cursor = current.entry(event.thread).or_insert_with(|| {
            threads.push(event.thread);
            root
        });

        match event.kind {
            EventKind::Entering => {
                *cursor = tree.add_call(*cursor, event.function)?;
            }
            EventKind::Exiting => {
                let thread = event.thread.map(str::to_string);
                let Some(caller) = tree.parent(*cursor) else {
                    return Err(MalformedRecordError::UnmatchedExit {
                        line_number,
                        thread,
                        function: event.function.to_string(),
                    }
                    .into());
                };

                let open = tree.name(*cursor).unwrap_or_default();
                if open != event.function {
                    return Err(MalformedRecordError::MismatchedExit {
                        line_number,
                        thread,
                        function: event.function.to_string(),
                        current: open.to_string(),
                    }
                    .into());
                }

                *cursor = caller;
            }
        }
    }

    for thread in &threads {
        let open = current[thread];
        if open != root {
            return Err(MalformedRecordError::UnexitedCall {
                thread: thread.map(str::to_string),
                function: tree.name(open).unwrap_or_default().to_string(),
            }
            .into());
        }
    }

    debug!(
        "Parsed {} record events from {} thread(s) into {} calls",
        event_count,
        threads.len(),
        tree.calls().count()
    );

    Ok(tree)
}
