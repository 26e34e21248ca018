pub mod context;
pub mod error;
pub mod flatten;
pub mod geometry;
pub mod host;
pub mod id;
pub mod model;
pub mod normalize;
pub mod raw;
pub mod settings;
pub mod variables;
pub mod warnings;

pub use context::{ConversionContext, NODE_LIMIT};
pub use error::{ConvertError, ConvertResult, HostError};
pub use flatten::flatten_eligibility;
pub use geometry::{BoundingBox, Rect, degrees_from_host_radians, project_rectangle};
pub use host::{HostNode, MemoryHost, SceneHost};
pub use id::NodeId;
pub use model::*;
pub use normalize::{Conversion, convert_selection};
pub use raw::{RawDocument, RawNode, RawNodeKind, TextRun};
pub use settings::{ConversionSettings, OutputMode};
pub use variables::{collect_subtree_mappings, resolve_node_variables, sanitize_variable_name};
pub use warnings::{ConversionWarning, WarningKind};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
