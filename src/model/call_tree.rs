//! Calling context tree (CCT) representation.
//!
//! A calling context tree has a single root, the program entry point, which
//! contains the top-level calls. Every call can make further calls of its own.
//!
//! Calls are stored in an arena and referenced by [CallId]. Children are owned
//! by their caller through the arena; the parent link is only a back-reference
//! used to reconstruct call stacks.

use crate::utils::error::AttachError;
use std::collections::HashMap;
use std::ops::Index;

/// Index of a call in a [CallTree] (arena).
///
/// An id is only meaningful for the tree that created it.
///
/// # Panics
/// Tree queries and `tree[id]` panic when given an id that is out of range
/// for that tree. An id from another tree that happens to be in range
/// silently refers to an unrelated call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallId(usize);

impl CallId {
    /// Position of this call in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// The root is always the first vertex of the arena.
const ROOT: CallId = CallId(0);

/// One function invocation.
#[derive(Debug, Clone)]
pub struct CallNode {
    /// Function name; `None` only for the root
    name: Option<String>,

    /// Caller, set once on attach
    parent: Option<CallId>,

    /// Calls made directly by this invocation, in recorded order
    children: Vec<CallId>,

    /// Number of direct children per name, kept in step with `children`
    call_counts: HashMap<String, usize>,
}

impl CallNode {
    fn new(name: Option<String>) -> Self {
        Self {
            name,
            parent: None,
            children: Vec::new(),
            call_counts: HashMap::new(),
        }
    }

    /// Function name, `None` for the root
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Caller of this invocation
    pub fn parent(&self) -> Option<CallId> {
        self.parent
    }

    /// Direct calls in recorded order
    pub fn children(&self) -> &[CallId] {
        &self.children
    }

    /// Number of direct calls named `name`
    pub fn call_count(&self, name: &str) -> usize {
        self.call_counts.get(name).copied().unwrap_or(0)
    }
}

/// A calling context tree stored with the arena pattern.
///
/// # Invariants
/// - Every call has at most one caller, and the caller never changes.
/// - Attached calls are named; only the root is unnamed.
/// - Per-name child counts always equal the number of direct children with
///   that name.
/// - No call is its own ancestor.
///
/// Calls created with [CallTree::new_call] are detached until attached. Only
/// calls reachable from the root take part in traversal and analysis.
#[derive(Debug, Clone)]
pub struct CallTree {
    /// All calls of this tree, the root first
    nodes: Vec<CallNode>,
}

impl Default for CallTree {
    fn default() -> Self {
        Self::new()
    }
}

/// # Panics
/// Panics if `id` was not created by this tree and is out of range.
impl Index<CallId> for CallTree {
    type Output = CallNode;

    fn index(&self, id: CallId) -> &CallNode {
        &self.nodes[id.0]
    }
}

// ============================================================================
// Construction
// ============================================================================
impl CallTree {
    /// Creates a tree holding only the program entry point.
    pub fn new() -> Self {
        Self {
            nodes: vec![CallNode::new(None)],
        }
    }

    /// The program entry point.
    pub fn root(&self) -> CallId {
        ROOT
    }

    /// Creates a detached call named `name` and returns its index.
    pub fn new_call(&mut self, name: impl Into<String>) -> CallId {
        let id = CallId(self.nodes.len());
        self.nodes.push(CallNode::new(Some(name.into())));
        id
    }

    /// Records `child` as a call made by `parent`.
    ///
    /// # Errors
    /// * `AttachError::AlreadyAttached` - `child` already has a caller
    /// * `AttachError::Unnamed` - `child` has no name (this includes the root)
    /// * `AttachError::Cycle` - `child` is `parent` or one of its ancestors
    pub fn attach(&mut self, parent: CallId, child: CallId) -> Result<(), AttachError> {
        let name = match self[child].name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(AttachError::Unnamed),
        };

        if self[child].parent.is_some() {
            return Err(AttachError::AlreadyAttached(name));
        }

        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(AttachError::Cycle(name));
            }
            cursor = self[id].parent;
        }

        let caller = &mut self.nodes[parent.0];
        caller.children.push(child);
        *caller.call_counts.entry(name).or_insert(0) += 1;
        self.nodes[child.0].parent = Some(parent);

        Ok(())
    }

    /// Creates a call named `name` and attaches it to `parent`.
    pub fn add_call(
        &mut self,
        parent: CallId,
        name: impl Into<String>,
    ) -> Result<CallId, AttachError> {
        let child = self.new_call(name);
        self.attach(parent, child)?;
        Ok(child)
    }

    /// Rewrites every name through `mapping` and rebuilds the per-name counts.
    ///
    /// Names missing from `mapping` are kept. Counts of names that map to the
    /// same replacement are summed.
    pub(crate) fn rename_calls(&mut self, mapping: &HashMap<String, String>) {
        for node in &mut self.nodes {
            if let Some(name) = node.name.as_mut() {
                if let Some(replacement) = mapping.get(name.as_str()) {
                    *name = replacement.clone();
                }
            }

            let mut renamed: HashMap<String, usize> = HashMap::with_capacity(node.call_counts.len());
            for (name, count) in node.call_counts.drain() {
                let key = mapping.get(&name).cloned().unwrap_or(name);
                *renamed.entry(key).or_insert(0) += count;
            }
            node.call_counts = renamed;
        }
    }
}

// ============================================================================
// Queries
// ============================================================================
impl CallTree {
    /// Number of calls in the arena, root and detached calls included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the tree holds nothing but the root.
    pub fn is_empty(&self) -> bool {
        self[ROOT].children.is_empty()
    }

    pub fn name(&self, id: CallId) -> Option<&str> {
        self[id].name()
    }

    pub fn parent(&self, id: CallId) -> Option<CallId> {
        self[id].parent
    }

    pub fn children(&self, id: CallId) -> &[CallId] {
        &self[id].children
    }

    /// Number of direct calls from `id` to functions named `name`, 0 if none.
    pub fn call_count(&self, id: CallId, name: &str) -> usize {
        self[id].call_count(name)
    }

    /// Distinct names of the direct calls made by `id`, in no particular order.
    pub fn unique_call_names(&self, id: CallId) -> impl Iterator<Item = &str> {
        self[id].call_counts.keys().map(String::as_str)
    }

    /// Chain of calls from the top-level call down to `id`, inclusive.
    ///
    /// The root is never part of a call stack, so the root's stack is empty.
    pub fn call_stack(&self, id: CallId) -> Vec<CallId> {
        let mut stack = Vec::new();
        let mut cursor = Some(id);
        while let Some(call) = cursor {
            if call == ROOT {
                break;
            }
            stack.push(call);
            cursor = self[call].parent;
        }
        stack.reverse();
        stack
    }

    /// Names along [CallTree::call_stack].
    pub fn call_name_stack(&self, id: CallId) -> Vec<&str> {
        self.call_stack(id)
            .into_iter()
            .filter_map(|call| self.name(call))
            .collect()
    }

    /// Frame depth: number of calls on the stack of `id`, 0 for the root.
    pub fn depth(&self, id: CallId) -> usize {
        self.call_stack(id).len()
    }

    /// Pre-order iterator over every call reachable from the root.
    pub fn calls(&self) -> PreOrder<'_> {
        self.calls_below(ROOT)
    }

    /// Pre-order iterator over every call below `id`, `id` itself excluded.
    pub fn calls_below(&self, id: CallId) -> PreOrder<'_> {
        let mut stack: Vec<CallId> = self[id].children.clone();
        stack.reverse();
        PreOrder { tree: self, stack }
    }
}

/// Depth-first pre-order walk using an explicit work stack.
pub struct PreOrder<'a> {
    tree: &'a CallTree,
    stack: Vec<CallId>,
}

impl Iterator for PreOrder<'_> {
    type Item = CallId;

    fn next(&mut self) -> Option<CallId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree[id].children.iter().rev().copied());
        Some(id)
    }
}
