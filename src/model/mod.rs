//! Calling context tree model.
//!
//! The tree is built once during ingestion and treated as immutable by
//! every analysis afterwards.

pub mod call_tree;

pub use call_tree::{CallId, CallNode, CallTree, PreOrder};
