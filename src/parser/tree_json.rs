//! Conversion between a [CallTree] and the canonical tree format.
//!
//! Deserialization is the exact inverse of serialization: reading a document
//! written by [tree_to_json] and writing it again yields the same bytes.
//!
//! Recordings of recursive programs nest thousands of levels deep. Encoding
//! walks the tree with an explicit work stack and drives `serde_json`'s
//! formatters directly. Decoding lifts `serde_json`'s nesting limit and runs
//! under `serde_stacker`, which moves the recursion onto heap-allocated stack
//! segments.

use super::schema::RecordedCall;
use crate::model::{CallId, CallTree};
use crate::utils::error::{AttachError, ParseError};
use log::debug;
use serde::Deserialize;
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use std::io::{self, Write};

/// Parse a canonical tree document into a calling context tree
///
/// **Public** - main entry point for the canonical format
///
/// # Errors
/// * `ParseError::JsonError` - Not a JSON array of call objects
/// * `ParseError::Attach` - A call without a name
pub fn tree_from_json(input: &str) -> Result<CallTree, ParseError> {
    let mut deserializer = serde_json::Deserializer::from_str(input);
    deserializer.disable_recursion_limit();

    let calls = Vec::<RecordedCall>::deserialize(serde_stacker::Deserializer::new(
        &mut deserializer,
    ))?;
    deserializer.end()?;

    let tree = from_recorded_calls(calls)?;
    debug!("Decoded canonical tree with {} calls", tree.calls().count());
    Ok(tree)
}

/// Serialize a calling context tree to the compact canonical form
pub fn tree_to_json(tree: &CallTree) -> Result<String, serde_json::Error> {
    encode(tree, CompactFormatter)
}

/// Serialize a calling context tree with indentation, for humans
pub fn tree_to_json_pretty(tree: &CallTree) -> Result<String, serde_json::Error> {
    encode(tree, PrettyFormatter::new())
}

fn encode<F: Formatter>(
    tree: &CallTree,
    mut formatter: F,
) -> Result<String, serde_json::Error> {
    let mut out = Vec::with_capacity(tree.len() * 16);
    write_calls(tree, &mut out, &mut formatter).map_err(serde_json::Error::io)?;
    String::from_utf8(out)
        .map_err(|e| serde_json::Error::io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Calls of one caller still being written
struct OpenCalls<'a> {
    calls: &'a [CallId],
    next: usize,
}

/// Emit the root's calls with the same formatter events `serde_json` uses
/// for `Vec<RecordedCall>`, so the output is byte-identical to it.
fn write_calls<W: Write, F: Formatter>(
    tree: &CallTree,
    writer: &mut W,
    formatter: &mut F,
) -> io::Result<()> {
    formatter.begin_array(writer)?;
    let mut open = vec![OpenCalls {
        calls: tree.children(tree.root()),
        next: 0,
    }];

    while let Some(level) = open.last_mut() {
        let Some(&id) = level.calls.get(level.next) else {
            formatter.end_array(writer)?;
            open.pop();
            // Every array but the root's is the `calls` value of an object
            if !open.is_empty() {
                formatter.end_object_value(writer)?;
                formatter.end_object(writer)?;
                formatter.end_array_value(writer)?;
            }
            continue;
        };

        formatter.begin_array_value(writer, level.next == 0)?;
        level.next += 1;

        formatter.begin_object(writer)?;
        write_key(writer, formatter, "name", true)?;
        serde_json::to_writer(&mut *writer, tree.name(id).unwrap_or_default())?;
        formatter.end_object_value(writer)?;

        let calls = tree.children(id);
        if calls.is_empty() {
            formatter.end_object(writer)?;
            formatter.end_array_value(writer)?;
        } else {
            write_key(writer, formatter, "calls", false)?;
            formatter.begin_array(writer)?;
            open.push(OpenCalls { calls, next: 0 });
        }
    }

    Ok(())
}

fn write_key<W: Write, F: Formatter>(
    writer: &mut W,
    formatter: &mut F,
    key: &str,
    first: bool,
) -> io::Result<()> {
    formatter.begin_object_key(writer, first)?;
    serde_json::to_writer(&mut *writer, key)?;
    formatter.end_object_key(writer)?;
    formatter.begin_object_value(writer)
}

/// Build the serializable form of the root's calls
///
/// Calls are converted children-first by walking the pre-order sequence
/// backwards, so no recursion over the tree depth is needed.
pub fn to_recorded_calls(tree: &CallTree) -> Vec<RecordedCall> {
    let order: Vec<CallId> = tree.calls().collect();
    let mut built: Vec<Option<RecordedCall>> = vec![None; tree.len()];

    for &id in order.iter().rev() {
        let calls = take_children(tree, id, &mut built);
        let name = tree.name(id).unwrap_or_default();
        built[id.index()] = Some(RecordedCall::with_calls(name, calls));
    }

    take_children(tree, tree.root(), &mut built)
}

fn take_children(
    tree: &CallTree,
    id: CallId,
    built: &mut [Option<RecordedCall>],
) -> Vec<RecordedCall> {
    tree.children(id)
        .iter()
        .filter_map(|child| built[child.index()].take())
        .collect()
}

/// Build a calling context tree from the root's calls
///
/// # Errors
/// * `AttachError::Unnamed` - A call has an empty name
pub fn from_recorded_calls(calls: Vec<RecordedCall>) -> Result<CallTree, AttachError> {
    let mut tree = CallTree::new();

    // Children are pushed in reverse so each caller receives them in order
    let mut pending: Vec<(CallId, RecordedCall)> =
        calls.into_iter().rev().map(|call| (tree.root(), call)).collect();

    while let Some((parent, mut call)) = pending.pop() {
        let id = tree.add_call(parent, std::mem::take(&mut call.name))?;
        let calls = std::mem::take(&mut call.calls);
        pending.extend(calls.into_iter().rev().map(|child| (id, child)));
    }

    Ok(tree)
}
