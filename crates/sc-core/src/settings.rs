//! Conversion preferences.
//!
//! Mirrors the host plugin's persisted settings: the subset consumed by this
//! crate drives the vector-asset classifier and the color-variable resolver;
//! the rest rides along inside transport payloads so the display side can
//! show the active configuration.

use serde::{Deserialize, Serialize};

/// Target language of the downstream generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    #[default]
    Html,
    Jsx,
    Svelte,
    StyledComponents,
}

/// Configuration for one conversion run.
///
/// Serialized with camelCase field names — the same shape the display side
/// stores and echoes back on preference changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionSettings {
    /// Emit layer names as comments/attributes in generated output.
    /// Default: **false**.
    pub show_layer_names: bool,

    /// Resolve design-system variables bound to paints into stable names.
    /// Default: **true**.
    pub use_color_variables: bool,

    /// Inline image fills into the generated output. Default: **false**.
    pub embed_images: bool,

    /// Flatten icon-like subtrees into embedded vector assets using the
    /// icon-likeness heuristic. Default: **false** (conservative mode).
    pub embed_vectors: bool,

    /// Maximum pixel size (either axis) a subtree may have and still be
    /// considered for flattening. Default: **64.0**.
    pub embed_vectors_max_size: f32,

    /// Output language of the downstream generator. Default: **html**.
    pub output_mode: OutputMode,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            show_layer_names: false,
            use_color_variables: true,
            embed_images: false,
            embed_vectors: false,
            embed_vectors_max_size: 64.0,
            output_mode: OutputMode::Html,
        }
    }
}
