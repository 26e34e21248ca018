//! Raw host document shapes.
//!
//! These structs mirror the JSON the host exports for a node subtree,
//! loosely typed and camelCase on the wire. Everything is defaulted so a
//! sparse export still decodes; the normalizer decides what is missing
//! versus meaningful.

use crate::geometry::BoundingBox;
use crate::id::NodeId;
use crate::model::{
    default_true, AxisAlign, BlendMode, Effect, FontName, Hyperlink, LayoutMode,
    LayoutPositioning, LayoutSizing, MetricUnit, Paint, ScaledMetric, StrokeWeights,
    TextAutoResize, TextCase, TextDecoration, TextStyle,
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Top-level envelope of a host subtree export.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawDocument {
    pub document: RawNode,
}

/// Host node type tag.
///
/// The wire value is a plain string, so the catch-all cannot use
/// `#[serde(other)]`; deserialization is manual and maps anything
/// unrecognized to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawNodeKind {
    Frame,
    Group,
    Component,
    ComponentSet,
    Instance,
    Section,
    Rectangle,
    Ellipse,
    Vector,
    BooleanOperation,
    Star,
    Polygon,
    Line,
    Text,
    Slice,
    #[default]
    Unknown,
}

impl RawNodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RawNodeKind::Frame => "FRAME",
            RawNodeKind::Group => "GROUP",
            RawNodeKind::Component => "COMPONENT",
            RawNodeKind::ComponentSet => "COMPONENT_SET",
            RawNodeKind::Instance => "INSTANCE",
            RawNodeKind::Section => "SECTION",
            RawNodeKind::Rectangle => "RECTANGLE",
            RawNodeKind::Ellipse => "ELLIPSE",
            RawNodeKind::Vector => "VECTOR",
            RawNodeKind::BooleanOperation => "BOOLEAN_OPERATION",
            RawNodeKind::Star => "STAR",
            RawNodeKind::Polygon => "POLYGON",
            RawNodeKind::Line => "LINE",
            RawNodeKind::Text => "TEXT",
            RawNodeKind::Slice => "SLICE",
            RawNodeKind::Unknown => "UNKNOWN",
        }
    }

    /// Container kinds that take part in the empty-container fallback.
    /// Groups are excluded: an empty group exports no geometry at all.
    pub fn is_reframable_container(&self) -> bool {
        matches!(
            self,
            RawNodeKind::Frame
                | RawNodeKind::Component
                | RawNodeKind::ComponentSet
                | RawNodeKind::Instance
        )
    }

    /// Kinds that draw vector geometry directly.
    pub fn is_vector_like(&self) -> bool {
        matches!(
            self,
            RawNodeKind::Vector
                | RawNodeKind::BooleanOperation
                | RawNodeKind::Star
                | RawNodeKind::Polygon
                | RawNodeKind::Line
        )
    }
}

impl Serialize for RawNodeKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RawNodeKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "FRAME" => RawNodeKind::Frame,
            "GROUP" => RawNodeKind::Group,
            "COMPONENT" => RawNodeKind::Component,
            "COMPONENT_SET" => RawNodeKind::ComponentSet,
            "INSTANCE" => RawNodeKind::Instance,
            "SECTION" => RawNodeKind::Section,
            "RECTANGLE" => RawNodeKind::Rectangle,
            "ELLIPSE" => RawNodeKind::Ellipse,
            "VECTOR" => RawNodeKind::Vector,
            "BOOLEAN_OPERATION" => RawNodeKind::BooleanOperation,
            "STAR" => RawNodeKind::Star,
            "POLYGON" => RawNodeKind::Polygon,
            "LINE" => RawNodeKind::Line,
            "TEXT" => RawNodeKind::Text,
            "SLICE" => RawNodeKind::Slice,
            _ => RawNodeKind::Unknown,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSetting {
    #[serde(default)]
    pub format: String,
}

/// Node-level text style as the host exports it (pixel metrics, split
/// line-height fields).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTextStyle {
    pub font_family: Option<String>,
    pub font_style: Option<String>,
    pub italic: Option<bool>,
    pub font_weight: Option<f32>,
    pub font_size: Option<f32>,
    pub text_case: Option<TextCase>,
    pub text_decoration: Option<TextDecoration>,
    pub letter_spacing: Option<f32>,
    pub line_height_px: Option<f32>,
    pub line_height_percent_font_size: Option<f32>,
    pub line_height_unit: Option<String>,
}

impl RawTextStyle {
    /// Fold the host's split metric fields into the normalized style.
    pub fn to_text_style(&self) -> TextStyle {
        let font_style = self
            .font_style
            .clone()
            .or_else(|| self.italic.and_then(|i| i.then(|| "Italic".to_string())));
        let line_height = match self.line_height_unit.as_deref() {
            Some("PIXELS") => self.line_height_px.map(|v| ScaledMetric {
                unit: MetricUnit::Pixels,
                value: v,
            }),
            Some("FONT_SIZE_%") => self.line_height_percent_font_size.map(|v| ScaledMetric {
                unit: MetricUnit::Percent,
                value: v,
            }),
            Some("INTRINSIC_%") => Some(ScaledMetric {
                unit: MetricUnit::Auto,
                value: 0.0,
            }),
            _ => None,
        };
        TextStyle {
            font_family: self.font_family.clone(),
            font_style,
            font_weight: self.font_weight,
            font_size: self.font_size,
            text_case: self.text_case,
            text_decoration: self.text_decoration,
            letter_spacing: self.letter_spacing.map(|v| ScaledMetric {
                unit: MetricUnit::Pixels,
                value: v,
            }),
            line_height,
        }
    }
}

/// One styled run of a text node, as returned by the host's run
/// segmentation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    pub characters: String,
    #[serde(default)]
    pub font_name: Option<FontName>,
    #[serde(default)]
    pub font_weight: Option<f32>,
    #[serde(default)]
    pub font_size: Option<f32>,
    #[serde(default)]
    pub fills: SmallVec<[Paint; 2]>,
    #[serde(default)]
    pub text_case: Option<TextCase>,
    #[serde(default)]
    pub text_decoration: Option<TextDecoration>,
    #[serde(default)]
    pub letter_spacing: Option<ScaledMetric>,
    #[serde(default)]
    pub line_height: Option<ScaledMetric>,
    #[serde(default)]
    pub hyperlink: Option<Hyperlink>,
}

impl TextRun {
    pub fn to_style(&self) -> TextStyle {
        TextStyle {
            font_family: self.font_name.as_ref().map(|f| f.family.clone()),
            font_style: self.font_name.as_ref().map(|f| f.style.clone()),
            font_weight: self.font_weight,
            font_size: self.font_size,
            text_case: self.text_case,
            text_decoration: self.text_decoration,
            letter_spacing: self.letter_spacing,
            line_height: self.line_height,
        }
    }
}

/// One node of the raw host export.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawNode {
    pub id: Option<NodeId>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RawNodeKind,
    #[serde(default = "default_true")]
    pub visible: bool,

    /// Rotation in radians, host sign convention (counterclockwise).
    pub rotation: Option<f32>,
    pub absolute_bounding_box: Option<BoundingBox>,
    pub opacity: Option<f32>,

    pub fills: SmallVec<[Paint; 2]>,
    pub strokes: SmallVec<[Paint; 2]>,
    pub effects: SmallVec<[Effect; 2]>,
    pub stroke_weight: Option<f32>,
    pub individual_stroke_weights: Option<StrokeWeights>,
    pub corner_radius: Option<f32>,
    pub blend_mode: Option<BlendMode>,

    pub clips_content: Option<bool>,
    pub layout_mode: Option<LayoutMode>,
    pub primary_axis_align_items: Option<AxisAlign>,
    pub counter_axis_align_items: Option<AxisAlign>,
    pub item_spacing: Option<f32>,
    pub padding_left: Option<f32>,
    pub padding_right: Option<f32>,
    pub padding_top: Option<f32>,
    pub padding_bottom: Option<f32>,
    pub item_reverse_z_index: Option<bool>,

    pub layout_grow: Option<f32>,
    pub layout_sizing_horizontal: Option<LayoutSizing>,
    pub layout_sizing_vertical: Option<LayoutSizing>,
    pub layout_positioning: Option<LayoutPositioning>,

    pub characters: Option<String>,
    pub style: Option<RawTextStyle>,
    pub text_auto_resize: Option<TextAutoResize>,

    pub export_settings: Vec<ExportSetting>,
    pub children: Vec<RawNode>,
}

impl RawNode {
    /// An explicit SVG export marker on the node itself.
    pub fn has_svg_export(&self) -> bool {
        self.export_settings.iter().any(|s| s.format == "SVG")
    }

    /// Count of this node plus all descendants, visibility ignored.
    pub fn subtree_size(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(RawNode::subtree_size)
            .sum::<usize>()
    }
}
