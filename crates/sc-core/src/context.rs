//! Per-run conversion state.
//!
//! One [`ConversionContext`] is created per conversion and threaded through
//! every stage: the node budget, name deduplication counters, the variable
//! name memo, accumulated warnings, and the bookkeeping that lets a failed
//! top-level node roll back cleanly. Nothing here is global; two runs never
//! share state.

use crate::settings::ConversionSettings;
use crate::warnings::{ConversionWarning, WarningKind};
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

/// Hard cap on processed nodes per run. Counted against every admitted
/// node, including the second pass of an empty-container downgrade.
pub const NODE_LIMIT: usize = 500;

pub(crate) fn node_budget_message() -> String {
    format!(
        "Too many nodes selected (over {NODE_LIMIT}). \
         Please select a smaller part of your design to avoid memory issues."
    )
}

#[derive(Debug)]
pub struct ConversionContext {
    pub settings: ConversionSettings,

    /// Nodes admitted so far, across all top-level selections.
    pub(crate) nodes_visited: usize,
    /// Set once the budget warning has fired; it never fires twice.
    pub(crate) budget_exhausted: bool,

    /// Times each trimmed layer name has been seen.
    pub(crate) name_counters: HashMap<String, usize>,

    /// Variable id → resolved name memo. Misses are cached too, so a
    /// dangling id costs one host call per run, not one per use.
    pub(crate) variable_names: HashMap<String, Option<String>>,

    pub(crate) warnings: Vec<ConversionWarning>,

    /// Flattenable nodes waiting for the deferred mapping-collection pass.
    pub(crate) pending_mappings: Vec<NodeIndex>,

    /// Nodes inserted while processing the current top-level selection,
    /// removed again if that selection fails partway.
    pub(crate) inserted: Vec<NodeIndex>,
}

impl ConversionContext {
    #[must_use]
    pub fn new(settings: ConversionSettings) -> Self {
        Self {
            settings,
            nodes_visited: 0,
            budget_exhausted: false,
            name_counters: HashMap::new(),
            variable_names: HashMap::new(),
            warnings: Vec::new(),
            pending_mappings: Vec::new(),
            inserted: Vec::new(),
        }
    }

    // ─── Node budget ─────────────────────────────────────────────────────

    /// Mark the budget as blown and emit the warning, once per run.
    pub fn exhaust_budget(&mut self) {
        if !self.budget_exhausted {
            self.budget_exhausted = true;
            self.warn(WarningKind::NodeBudget, node_budget_message());
        }
    }

    /// Try to admit one more node. Returns `false` (and warns, the first
    /// time) once the limit is reached; the caller skips the subtree.
    pub fn admit_node(&mut self) -> bool {
        if self.budget_exhausted || self.nodes_visited >= NODE_LIMIT {
            self.exhaust_budget();
            return false;
        }
        self.nodes_visited += 1;
        true
    }

    // ─── Name deduplication ──────────────────────────────────────────────

    /// Deduplicate a layer name. The first occurrence passes through
    /// trimmed; repeats get a two-digit suffix starting at `_01`.
    pub fn unique_name(&mut self, name: &str) -> String {
        let trimmed = name.trim();
        let count = self.name_counters.entry(trimmed.to_string()).or_insert(0);
        let unique = if *count == 0 {
            trimmed.to_string()
        } else {
            format!("{trimmed}_{:02}", *count)
        };
        *count += 1;
        unique
    }

    // ─── Warnings ────────────────────────────────────────────────────────

    /// Record a warning, dropping exact duplicates.
    pub fn warn(&mut self, kind: WarningKind, message: impl Into<String>) {
        let message = message.into();
        if self
            .warnings
            .iter()
            .any(|w| w.kind == kind && w.message == message)
        {
            return;
        }
        log::debug!("WARN {kind:?} {message}");
        self.warnings.push(ConversionWarning::new(kind, message));
    }

    pub fn take_warnings(&mut self) -> Vec<ConversionWarning> {
        std::mem::take(&mut self.warnings)
    }

    // ─── Variable memo ───────────────────────────────────────────────────

    /// Memoized resolution result for a variable id, if one exists.
    /// `Some(None)` means the id was looked up and did not resolve.
    pub fn cached_variable(&self, variable_id: &str) -> Option<Option<String>> {
        self.variable_names.get(variable_id).cloned()
    }

    pub fn cache_variable(&mut self, variable_id: &str, name: Option<String>) {
        self.variable_names.insert(variable_id.to_string(), name);
    }

    // ─── Rollback bookkeeping ────────────────────────────────────────────

    /// Queue a flattenable node for the deferred mapping-collection pass.
    pub fn tag_for_mapping(&mut self, idx: NodeIndex) {
        self.pending_mappings.push(idx);
    }

    pub fn mapping_watermark(&self) -> usize {
        self.pending_mappings.len()
    }

    pub fn rollback_mappings(&mut self, watermark: usize) {
        self.pending_mappings.truncate(watermark);
    }

    pub fn record_insert(&mut self, idx: NodeIndex) {
        self.inserted.push(idx);
    }

    /// Drain the inserted-node list for the current top-level selection.
    pub fn take_inserted(&mut self) -> Vec<NodeIndex> {
        std::mem::take(&mut self.inserted)
    }
}
