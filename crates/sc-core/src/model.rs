//! Normalized scene-tree data model.
//!
//! The tree is an arena: nodes live in a `StableDiGraph` and edges run
//! parent → child. The parent back-reference every consumer needs is the
//! incoming edge, resolved through [`NormalizedTree::parent`] — never an
//! owning pointer. Node payloads are a closed tagged union
//! ([`NodeKind`]): group/component/instance semantics normalize into
//! `Frame`, vector-drawing leaves fold into `Vector` with a sub-kind, and
//! "is this field present" probing becomes a pattern match.

use crate::geometry::BoundingBox;
use crate::id::NodeId;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap};

// ─── Colors & Paint ──────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0], the host's wire shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "default_alpha")]
    pub a: f32,
}

fn default_alpha() -> f32 {
    1.0
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    fn channels_u8(&self) -> (u8, u8, u8) {
        (
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
        )
    }

    /// Lowercase `#rrggbb` form, alpha excluded — the key form used by
    /// color-variable mappings.
    pub fn to_hex_rgb(&self) -> String {
        let (r, g, b) = self.channels_u8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    pub fn is_white(&self) -> bool {
        self.channels_u8() == (255, 255, 255)
    }

    pub fn is_black(&self) -> bool {
        self.channels_u8() == (0, 0, 0)
    }
}

/// Reference to a design-system variable bound to a color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableAlias {
    pub id: String,
}

/// The host's per-field variable bindings; only color bindings matter here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundVariables {
    #[serde(default)]
    pub color: Option<VariableAlias>,
}

/// Layer blend mode, as enumerated by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlendMode {
    PassThrough,
    Normal,
    Darken,
    Multiply,
    LinearBurn,
    ColorBurn,
    Lighten,
    Screen,
    LinearDodge,
    ColorDodge,
    Overlay,
    SoftLight,
    HardLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl BlendMode {
    /// Text fills only survive generation under these two modes.
    pub fn is_supported_for_text(&self) -> bool {
        matches!(self, BlendMode::PassThrough | BlendMode::Normal)
    }
}

/// A solid paint, optionally bound to a design-system variable.
///
/// `variable_color_name` is absent on the wire; the resolver writes it
/// during normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolidPaint {
    pub color: Color,
    #[serde(default)]
    pub opacity: Option<f32>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub blend_mode: Option<BlendMode>,
    #[serde(default)]
    pub bound_variables: Option<BoundVariables>,
    #[serde(default)]
    pub variable_color_name: Option<String>,
}

pub(crate) fn default_true() -> bool {
    true
}

/// One gradient stop; stops carry their own variable bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientStop {
    pub position: f32,
    pub color: Color,
    #[serde(default)]
    pub bound_variables: Option<BoundVariables>,
    #[serde(default)]
    pub variable_color_name: Option<String>,
}

/// Shared payload of the four gradient paint kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientPaint {
    #[serde(default)]
    pub gradient_stops: SmallVec<[GradientStop; 4]>,
    #[serde(default)]
    pub opacity: Option<f32>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub blend_mode: Option<BlendMode>,
}

/// An image fill. Carried through untouched; image embedding is the
/// generator's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePaint {
    #[serde(default)]
    pub scale_mode: Option<String>,
    #[serde(default)]
    pub image_ref: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub blend_mode: Option<BlendMode>,
}

/// Fill or stroke paint, tagged exactly as the host tags it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Paint {
    #[serde(rename = "SOLID")]
    Solid(SolidPaint),
    #[serde(rename = "GRADIENT_LINEAR")]
    GradientLinear(GradientPaint),
    #[serde(rename = "GRADIENT_RADIAL")]
    GradientRadial(GradientPaint),
    #[serde(rename = "GRADIENT_ANGULAR")]
    GradientAngular(GradientPaint),
    #[serde(rename = "GRADIENT_DIAMOND")]
    GradientDiamond(GradientPaint),
    #[serde(rename = "IMAGE")]
    Image(ImagePaint),
    /// Paint kinds this pipeline does not interpret (video, patterns).
    #[serde(other)]
    Unsupported,
}

impl Paint {
    /// Mutable view of the gradient payload, for any of the four kinds.
    pub fn as_gradient_mut(&mut self) -> Option<&mut GradientPaint> {
        match self {
            Paint::GradientLinear(g)
            | Paint::GradientRadial(g)
            | Paint::GradientAngular(g)
            | Paint::GradientDiamond(g) => Some(g),
            _ => None,
        }
    }

    /// Blend mode of any paint kind that carries one.
    pub fn blend_mode(&self) -> Option<BlendMode> {
        match self {
            Paint::Solid(solid) => solid.blend_mode,
            Paint::GradientLinear(g)
            | Paint::GradientRadial(g)
            | Paint::GradientAngular(g)
            | Paint::GradientDiamond(g) => g.blend_mode,
            Paint::Image(image) => image.blend_mode,
            Paint::Unsupported => None,
        }
    }
}

// ─── Effects ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

/// Drop or inner shadow; the only effects that can bind color variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowEffect {
    pub color: Color,
    #[serde(default)]
    pub offset: Vector2,
    #[serde(default)]
    pub radius: f32,
    #[serde(default)]
    pub spread: Option<f32>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub bound_variables: Option<BoundVariables>,
    #[serde(default)]
    pub variable_color_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlurEffect {
    #[serde(default)]
    pub radius: f32,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Effect {
    #[serde(rename = "DROP_SHADOW")]
    DropShadow(ShadowEffect),
    #[serde(rename = "INNER_SHADOW")]
    InnerShadow(ShadowEffect),
    #[serde(rename = "LAYER_BLUR")]
    LayerBlur(BlurEffect),
    #[serde(rename = "BACKGROUND_BLUR")]
    BackgroundBlur(BlurEffect),
    #[serde(other)]
    Unsupported,
}

impl Effect {
    pub fn as_shadow_mut(&mut self) -> Option<&mut ShadowEffect> {
        match self {
            Effect::DropShadow(s) | Effect::InnerShadow(s) => Some(s),
            _ => None,
        }
    }
}

// ─── Layout ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutMode {
    #[default]
    None,
    Horizontal,
    Vertical,
    Grid,
}

impl LayoutMode {
    /// Flow layout (anything but free-form placement).
    pub fn is_flow(&self) -> bool {
        *self != LayoutMode::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutSizing {
    #[default]
    Fixed,
    Hug,
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AxisAlign {
    #[default]
    Min,
    Center,
    Max,
    SpaceBetween,
    Baseline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutPositioning {
    #[default]
    Auto,
    Absolute,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Padding {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Container-side auto-layout configuration (frames only).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoLayout {
    pub mode: LayoutMode,
    pub primary_axis_align_items: AxisAlign,
    pub counter_axis_align_items: AxisAlign,
    pub item_spacing: f32,
    pub padding: Padding,
    pub item_reverse_z_index: bool,
}

/// Child-side layout participation, carried by every node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildLayout {
    pub grow: f32,
    pub sizing_horizontal: LayoutSizing,
    pub sizing_vertical: LayoutSizing,
    pub positioning: LayoutPositioning,
}

/// Per-side stroke weights, when the host reports them individually.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StrokeWeights {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

// ─── Text ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextCase {
    Original,
    Upper,
    Lower,
    Title,
    SmallCaps,
    SmallCapsForced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextDecoration {
    None,
    Underline,
    Strikethrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextAutoResize {
    #[default]
    None,
    WidthAndHeight,
    Height,
    Truncate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontName {
    pub family: String,
    pub style: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricUnit {
    Pixels,
    Percent,
    Auto,
}

/// A unit-tagged typographic metric (letter spacing, line height).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledMetric {
    pub unit: MetricUnit,
    #[serde(default)]
    pub value: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hyperlink {
    #[serde(default)]
    pub value: Option<String>,
}

/// Typographic style, on the node for single-run text and on every segment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_style: Option<String>,
    pub font_weight: Option<f32>,
    pub font_size: Option<f32>,
    pub text_case: Option<TextCase>,
    pub text_decoration: Option<TextDecoration>,
    pub letter_spacing: Option<ScaledMetric>,
    pub line_height: Option<ScaledMetric>,
}

impl TextStyle {
    /// Copy every populated field of `other` over this style.
    pub fn overlay(&mut self, other: &TextStyle) {
        macro_rules! take {
            ($field:ident) => {
                if other.$field.is_some() {
                    self.$field = other.$field.clone();
                }
            };
        }
        take!(font_family);
        take!(font_style);
        take!(font_weight);
        take!(font_size);
        take!(text_case);
        take!(text_decoration);
        take!(letter_spacing);
        take!(line_height);
    }
}

/// One styled run of a text node, with its derived stable identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSegment {
    pub unique_id: String,
    pub characters: String,
    pub style: TextStyle,
    #[serde(default)]
    pub fills: SmallVec<[Paint; 2]>,
    #[serde(default)]
    pub hyperlink: Option<Hyperlink>,
}

// ─── Node kinds ──────────────────────────────────────────────────────────

/// Vector-drawing leaf sub-kind; all of them flatten identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VectorKind {
    Path,
    BooleanOperation,
    Star,
    Polygon,
    Line,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameProps {
    pub layout: AutoLayout,
    /// Children are positioned absolutely rather than flowed. Set for
    /// converted groups and re-derived after children are processed.
    pub is_relative: bool,
    pub clips_content: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RectProps {
    pub corner_radius: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorProps {
    pub vector_kind: VectorKind,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextProps {
    pub characters: String,
    pub segments: Vec<TextSegment>,
    pub style: TextStyle,
    pub auto_resize: TextAutoResize,
}

/// Closed union of normalized node kinds. Each variant carries exactly the
/// fields valid for it; shared fields live on [`NormalizedNode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeKind {
    Frame(FrameProps),
    Rect(RectProps),
    Ellipse,
    Text(TextProps),
    Vector(VectorProps),
}

impl NodeKind {
    pub fn as_frame(&self) -> Option<&FrameProps> {
        match self {
            NodeKind::Frame(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_frame_mut(&mut self) -> Option<&mut FrameProps> {
        match self {
            NodeKind::Frame(f) => Some(f),
            _ => None,
        }
    }
}

// ─── Color variable mappings ─────────────────────────────────────────────

/// Resolved variable behind one mapped color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorVariableRef {
    pub variable_id: String,
    pub variable_name: String,
}

/// Color representation → variable, keyed by lowercase hex plus the
/// named/functional aliases for pure white and black. BTreeMap keeps
/// snapshot serialization deterministic.
pub type ColorVariableMappings = BTreeMap<String, ColorVariableRef>;

// ─── Normalized node ─────────────────────────────────────────────────────

/// One node of the normalized tree.
///
/// Geometry is relative to the parent (roots are relative to the origin).
/// `rotation` is the node's own rotation in degrees after boundary folding;
/// `cumulative_rotation` is the inherited sum of ancestor boundary
/// contributions, excluding the node's own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedNode {
    pub id: NodeId,
    pub name: String,
    pub unique_name: String,
    #[serde(flatten)]
    pub kind: NodeKind,

    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
    pub cumulative_rotation: f32,

    pub opacity: f32,
    #[serde(default)]
    pub fills: SmallVec<[Paint; 2]>,
    #[serde(default)]
    pub strokes: SmallVec<[Paint; 2]>,
    #[serde(default)]
    pub effects: SmallVec<[Effect; 2]>,
    #[serde(default)]
    pub stroke_weight: Option<f32>,
    #[serde(default)]
    pub stroke_weights: Option<StrokeWeights>,

    #[serde(default)]
    pub child_layout: ChildLayout,

    pub can_be_flattened: bool,
    #[serde(default)]
    pub color_variable_mappings: Option<ColorVariableMappings>,
}

impl NormalizedNode {
    /// Bare node for tests and manual construction; the normalizer fills
    /// every field itself.
    pub fn new(id: NodeId, name: &str, kind: NodeKind) -> Self {
        Self {
            id,
            name: name.to_string(),
            unique_name: name.to_string(),
            kind,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            cumulative_rotation: 0.0,
            opacity: 1.0,
            fills: SmallVec::new(),
            strokes: SmallVec::new(),
            effects: SmallVec::new(),
            stroke_weight: None,
            stroke_weights: None,
            child_layout: ChildLayout::default(),
            can_be_flattened: false,
            color_variable_mappings: None,
        }
    }

    /// Absolute-space bounding box reconstruction is not kept; this is the
    /// parent-relative rect the projector produced.
    pub fn rect(&self) -> BoundingBox {
        BoundingBox {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

// ─── Normalized tree ─────────────────────────────────────────────────────

/// The output of one conversion run — a forest of normalized nodes.
///
/// Edges go from parent → child. A conversion over a multi-node selection
/// emits several roots. `sorted_child_order` overrides insertion order for
/// parents whose children were re-ordered by the z-index adjustment.
#[derive(Debug, Clone, Default)]
pub struct NormalizedTree {
    /// The underlying directed graph.
    pub graph: StableDiGraph<NormalizedNode, ()>,

    /// Top-level nodes, in selection order.
    pub roots: Vec<NodeIndex>,

    /// Index from NodeId → NodeIndex for fast lookup.
    pub id_index: HashMap<NodeId, NodeIndex>,

    /// Explicit child ordering set by the z-index adjustment.
    /// When present for a parent, `children()` returns this order
    /// instead of the default `NodeIndex` sort.
    pub sorted_child_order: HashMap<NodeIndex, Vec<NodeIndex>>,
}

impl NormalizedTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. With a parent an edge is added; without one the node
    /// becomes a root. Returns the new node's index.
    pub fn insert(&mut self, parent: Option<NodeIndex>, node: NormalizedNode) -> NodeIndex {
        let id = node.id;
        let idx = self.graph.add_node(node);
        match parent {
            Some(p) => {
                self.graph.add_edge(p, idx, ());
            }
            None => self.roots.push(idx),
        }
        self.id_index.insert(id, idx);
        idx
    }

    /// Remove a node, keeping the id index, child-order map, and root list
    /// synchronized. Used by the per-selection rollback.
    pub fn remove_node(&mut self, idx: NodeIndex) -> Option<NormalizedNode> {
        let removed = self.graph.remove_node(idx);
        if let Some(node) = &removed {
            self.id_index.remove(&node.id);
        }
        self.sorted_child_order.remove(&idx);
        for order in self.sorted_child_order.values_mut() {
            order.retain(|&c| c != idx);
        }
        self.roots.retain(|&r| r != idx);
        removed
    }

    /// Look up a node by its host-assigned id.
    pub fn get_by_id(&self, id: NodeId) -> Option<&NormalizedNode> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn get_by_id_mut(&mut self, id: NodeId) -> Option<&mut NormalizedNode> {
        self.id_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }

    pub fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    /// Get the parent index of a node; roots have none.
    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// Get children in document order.
    ///
    /// Sorts by `NodeIndex` (insertion order during normalization) so the
    /// result is deterministic regardless of how `petgraph` iterates its
    /// adjacency list, unless an explicit order was set.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        if let Some(order) = self.sorted_child_order.get(&idx) {
            return order.clone();
        }

        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .collect();
        children.sort();
        children
    }

    /// Record an explicit child order for `parent`.
    pub fn set_child_order(&mut self, parent: NodeIndex, order: Vec<NodeIndex>) {
        self.sorted_child_order.insert(parent, order);
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Serialize the forest as nested JSON, children inlined under a
    /// `children` key in document order. Snapshot/diagnostic form.
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        let roots = self
            .roots
            .iter()
            .map(|&r| self.node_value(r))
            .collect::<serde_json::Result<Vec<_>>>()?;
        Ok(serde_json::Value::Array(roots))
    }

    fn node_value(&self, idx: NodeIndex) -> serde_json::Result<serde_json::Value> {
        let mut value = serde_json::to_value(&self.graph[idx])?;
        let children = self
            .children(idx)
            .into_iter()
            .map(|c| self.node_value(c))
            .collect::<serde_json::Result<Vec<_>>>()?;
        if let serde_json::Value::Object(map) = &mut value {
            map.insert("children".into(), serde_json::Value::Array(children));
        }
        Ok(value)
    }
}
