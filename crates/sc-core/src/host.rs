//! Host boundary: the design-tool side of the conversion.
//!
//! The normalizer never talks to the host directly — everything it needs
//! (subtree exports, variable names, styled text runs) comes through the
//! [`SceneHost`] trait. This keeps the pipeline pure and testable.

use crate::error::HostError;
use crate::id::NodeId;
use crate::raw::TextRun;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

// ─── Selection handles ───────────────────────────────────────────────────

/// A lightweight handle to a selected host node.
///
/// Handles carry just enough structure to count nodes before any export
/// happens; the full document for a subtree arrives later through
/// [`SceneHost::export_raw_tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostNode {
    pub id: NodeId,
    pub name: String,
    pub kind: String,
    pub children: Vec<HostNode>,
}

impl HostNode {
    pub fn new(id: &str, name: &str, kind: &str) -> Self {
        Self {
            id: NodeId::intern(id),
            name: name.to_string(),
            kind: kind.to_string(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<HostNode>) -> Self {
        self.children = children;
        self
    }

    /// This node plus all descendants.
    pub fn subtree_size(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(HostNode::subtree_size)
            .sum::<usize>()
    }
}

// ─── Host trait ──────────────────────────────────────────────────────────

/// Host-side calls the conversion depends on.
///
/// Implemented differently by each environment:
/// - plugin runtime: bridges to the tool's async node API
/// - tests: [`MemoryHost`] backed by fixtures
pub trait SceneHost {
    /// Export the raw JSON document for a node's subtree.
    fn export_raw_tree(
        &self,
        node: &HostNode,
    ) -> impl Future<Output = Result<serde_json::Value, HostError>> + Send;

    /// Resolve a design-system variable id to its human name.
    /// Returns `Ok(None)` when the id no longer resolves.
    fn variable_name(
        &self,
        variable_id: &str,
    ) -> impl Future<Output = Result<Option<String>, HostError>> + Send;

    /// Fetch the styled runs of a text node, one per style change.
    fn styled_text_runs(
        &self,
        node_id: NodeId,
    ) -> impl Future<Output = Result<Vec<TextRun>, HostError>> + Send;
}

// ─── In-memory host ──────────────────────────────────────────────────────

/// Fixture-backed host for tests and examples.
///
/// Exports, variables, and text runs are keyed up front; lookups are
/// counted so memoization behavior can be asserted.
#[derive(Debug, Default)]
pub struct MemoryHost {
    exports: HashMap<NodeId, serde_json::Value>,
    variables: HashMap<String, String>,
    runs: HashMap<NodeId, Vec<TextRun>>,
    fail_exports: HashSet<NodeId>,
    variable_lookups: AtomicUsize,
}

impl MemoryHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_export(mut self, id: &str, document: serde_json::Value) -> Self {
        self.exports.insert(NodeId::intern(id), document);
        self
    }

    #[must_use]
    pub fn with_variable(mut self, variable_id: &str, name: &str) -> Self {
        self.variables
            .insert(variable_id.to_string(), name.to_string());
        self
    }

    #[must_use]
    pub fn with_runs(mut self, id: &str, runs: Vec<TextRun>) -> Self {
        self.runs.insert(NodeId::intern(id), runs);
        self
    }

    /// Make `export_raw_tree` fail for this node.
    #[must_use]
    pub fn with_failing_export(mut self, id: &str) -> Self {
        self.fail_exports.insert(NodeId::intern(id));
        self
    }

    /// How many variable-name lookups reached the host.
    pub fn variable_lookups(&self) -> usize {
        self.variable_lookups.load(Ordering::Relaxed)
    }
}

impl SceneHost for MemoryHost {
    async fn export_raw_tree(&self, node: &HostNode) -> Result<serde_json::Value, HostError> {
        if self.fail_exports.contains(&node.id) {
            return Err(HostError::new(format!("export failed for {}", node.id)));
        }
        self.exports
            .get(&node.id)
            .cloned()
            .ok_or_else(|| HostError::new(format!("no export registered for {}", node.id)))
    }

    async fn variable_name(&self, variable_id: &str) -> Result<Option<String>, HostError> {
        self.variable_lookups.fetch_add(1, Ordering::Relaxed);
        Ok(self.variables.get(variable_id).cloned())
    }

    async fn styled_text_runs(&self, node_id: NodeId) -> Result<Vec<TextRun>, HostError> {
        Ok(self.runs.get(&node_id).cloned().unwrap_or_default())
    }
}
