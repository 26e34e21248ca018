//! User-visible conversion warnings.
//!
//! Warnings are structured values accumulated in order during a run and
//! carried inside transport payloads, so the display side can render them
//! without parsing prose. Duplicate messages are collapsed by the context
//! (the accumulator behaves like an ordered set).

use serde::{Deserialize, Serialize};

/// Broad category of a warning, for display grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WarningKind {
    /// The per-run node ceiling was hit; remaining nodes were skipped.
    NodeBudget,
    /// One top-level selection node failed and was dropped.
    NodeFailed,
    /// A text fill carried a blend mode the generator cannot express.
    UnsupportedBlendMode,
}

/// One warning produced during a conversion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionWarning {
    pub kind: WarningKind,
    pub message: String,
}

impl ConversionWarning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
