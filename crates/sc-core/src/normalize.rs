//! Tree normalization: turns raw host exports into the normalized forest.
//!
//! One conversion run owns one [`ConversionContext`] and one
//! [`NormalizedTree`]. Top-level selections are processed strictly in
//! order; a failure inside one selection rolls back that selection's
//! nodes and records a warning, leaving the other selections intact.
//! Flattened subtrees are tagged during the walk and their color-variable
//! mappings are collected in a second pass once the whole tree exists.

use crate::context::{ConversionContext, NODE_LIMIT};
use crate::error::ConvertResult;
use crate::flatten::flatten_eligibility;
use crate::geometry::{degrees_from_host_radians, project_rectangle, BoundingBox, Rect};
use crate::host::{HostNode, SceneHost};
use crate::id::NodeId;
use crate::model::{
    AutoLayout, ChildLayout, FrameProps, LayoutPositioning, LayoutSizing, NodeKind,
    NormalizedNode, NormalizedTree, Padding, Paint, RectProps, TextProps, TextSegment,
    VectorKind, VectorProps,
};
use crate::raw::{RawDocument, RawNode, RawNodeKind, RawTextStyle};
use crate::settings::ConversionSettings;
use crate::variables::{collect_subtree_mappings, resolve_node_variables};
use crate::warnings::{ConversionWarning, WarningKind};
use futures::future::BoxFuture;
use futures::FutureExt;
use petgraph::graph::NodeIndex;
use smallvec::{smallvec, SmallVec};

/// Nodes emitted for one raw input node: none (filtered out), one, or
/// several (an expanding conversion).
type Emitted = SmallVec<[NodeIndex; 1]>;

/// State a node inherits from the walk above it.
#[derive(Debug, Clone, Copy, Default)]
struct Inherited {
    parent: Option<NodeIndex>,
    /// Absolute origin of the parent's bounding box; `None` for roots.
    parent_origin: Option<(f32, f32)>,
    /// Sum of ancestor rotation-boundary contributions, in degrees.
    cumulative_rotation: f32,
    /// Whether any ancestor was already marked flattenable.
    ancestor_flattened: bool,
}

/// The result of one conversion run.
#[derive(Debug, Default)]
pub struct Conversion {
    pub tree: NormalizedTree,
    pub warnings: Vec<ConversionWarning>,
}

/// Convert a host selection into a normalized forest.
///
/// The selection is pre-counted against the node budget before any export
/// happens; an oversized selection yields an empty tree plus the budget
/// warning. Each top-level node is then exported and walked; per-node
/// failures abort only that node's contribution.
pub async fn convert_selection<H: SceneHost + Sync>(
    host: &H,
    selection: &[HostNode],
    settings: &ConversionSettings,
) -> Conversion {
    let mut ctx = ConversionContext::new(settings.clone());
    let mut tree = NormalizedTree::new();

    let total: usize = selection.iter().map(HostNode::subtree_size).sum();
    if total > NODE_LIMIT {
        log::warn!("CONVERT selection holds {total} nodes, over the {NODE_LIMIT} limit");
        ctx.exhaust_budget();
        return Conversion {
            tree,
            warnings: ctx.take_warnings(),
        };
    }

    for node in selection {
        let watermark = ctx.mapping_watermark();
        let result = convert_root(&mut ctx, &mut tree, host, node).await;
        let inserted = ctx.take_inserted();
        if let Err(err) = result {
            log::warn!("CONVERT top-level node {} failed: {err}", node.id);
            for idx in inserted.into_iter().rev() {
                tree.remove_node(idx);
            }
            ctx.rollback_mappings(watermark);
            ctx.warn(
                WarningKind::NodeFailed,
                format!(
                    "Failed to process node \"{}\". It might be too complex or contain errors.",
                    node.name
                ),
            );
        }
    }

    // Deferred pass: collect color mappings for every flattened subtree,
    // now that the names written during normalization are all in place.
    let pending = std::mem::take(&mut ctx.pending_mappings);
    for idx in pending {
        let mappings = collect_subtree_mappings(&tree, idx);
        tree.graph[idx].color_variable_mappings = Some(mappings);
    }

    Conversion {
        tree,
        warnings: ctx.take_warnings(),
    }
}

async fn convert_root<H: SceneHost + Sync>(
    ctx: &mut ConversionContext,
    tree: &mut NormalizedTree,
    host: &H,
    node: &HostNode,
) -> ConvertResult<()> {
    log::debug!("CONVERT exporting {} \"{}\"", node.id, node.name);
    let raw_value = host.export_raw_tree(node).await?;
    let document: RawDocument = serde_json::from_value(raw_value)?;
    process_node(ctx, tree, host, node, document.document, Inherited::default()).await?;
    Ok(())
}

/// Process one raw node and recurse into its children.
fn process_node<'a, H: SceneHost + Sync>(
    ctx: &'a mut ConversionContext,
    tree: &'a mut NormalizedTree,
    host: &'a H,
    handle: &'a HostNode,
    mut raw: RawNode,
    inherited: Inherited,
) -> BoxFuture<'a, ConvertResult<Emitted>> {
    async move {
        if !ctx.admit_node() {
            return Ok(Emitted::new());
        }
        if !raw.visible {
            return Ok(Emitted::new());
        }
        let Some(id) = raw.id else {
            return Ok(Emitted::new());
        };

        // A childless container renders like a plain rectangle; downgrade
        // and run it through the pipeline once more.
        if raw.kind.is_reframable_container() && raw.children.is_empty() {
            log::trace!(
                "NORMALIZE childless {} {id} downgraded to rectangle",
                raw.kind.as_str()
            );
            let downgraded = RawNode {
                kind: RawNodeKind::Rectangle,
                ..raw
            };
            return process_node(ctx, tree, host, handle, downgraded, inherited).await;
        }

        // Unsupported kinds emit nothing, before a name is consumed.
        if matches!(
            raw.kind,
            RawNodeKind::Slice | RawNodeKind::Section | RawNodeKind::Unknown
        ) {
            log::trace!("NORMALIZE dropping {} node {id}", raw.kind.as_str());
            return Ok(Emitted::new());
        }

        // Rotation folding: a group is a rotation boundary. Its own
        // rotation is zeroed on the emitted node and handed to children
        // through their cumulative instead.
        let own_rotation = raw.rotation.map(degrees_from_host_radians).unwrap_or(0.0);
        let is_boundary = raw.kind == RawNodeKind::Group;
        let (node_rotation, child_cumulative) = if is_boundary {
            (0.0, inherited.cumulative_rotation + own_rotation)
        } else {
            (own_rotation, inherited.cumulative_rotation)
        };

        let unique_name = ctx.unique_name(&raw.name);

        let kind = match raw.kind {
            RawNodeKind::Text => {
                NodeKind::Text(enrich_text(ctx, host, &raw, id, &unique_name).await?)
            }
            RawNodeKind::Rectangle => NodeKind::Rect(RectProps {
                corner_radius: raw.corner_radius,
            }),
            RawNodeKind::Ellipse => NodeKind::Ellipse,
            RawNodeKind::Vector
            | RawNodeKind::BooleanOperation
            | RawNodeKind::Star
            | RawNodeKind::Polygon
            | RawNodeKind::Line => NodeKind::Vector(VectorProps {
                vector_kind: match raw.kind {
                    RawNodeKind::BooleanOperation => VectorKind::BooleanOperation,
                    RawNodeKind::Star => VectorKind::Star,
                    RawNodeKind::Polygon => VectorKind::Polygon,
                    RawNodeKind::Line => VectorKind::Line,
                    _ => VectorKind::Path,
                },
            }),
            RawNodeKind::Frame
            | RawNodeKind::Group
            | RawNodeKind::Component
            | RawNodeKind::ComponentSet
            | RawNodeKind::Instance => NodeKind::Frame(frame_props(&raw, is_boundary)),
            RawNodeKind::Slice | RawNodeKind::Section | RawNodeKind::Unknown => {
                return Ok(Emitted::new());
            }
        };

        // Geometry: project the absolute box into the parent's unrotated
        // local space. Roots keep their dimensions at the origin.
        let rect = match (raw.absolute_bounding_box, inherited.parent_origin) {
            (Some(b), Some((px, py))) => {
                let local = BoundingBox {
                    x: b.x - px,
                    y: b.y - py,
                    width: b.width,
                    height: b.height,
                };
                project_rectangle(&local, -(own_rotation + inherited.cumulative_rotation))
            }
            (Some(b), None) => Rect {
                left: 0.0,
                top: 0.0,
                width: b.width,
                height: b.height,
            },
            (None, _) => Rect::default(),
        };

        let can_be_flattened = flatten_eligibility(
            &raw,
            rect.width,
            rect.height,
            &ctx.settings,
            inherited.ancestor_flattened,
        );

        let mut fills = std::mem::take(&mut raw.fills);
        let mut strokes = std::mem::take(&mut raw.strokes);
        let mut effects = std::mem::take(&mut raw.effects);
        if ctx.settings.use_color_variables {
            resolve_node_variables(ctx, host, &mut fills, &mut strokes, &mut effects).await?;
        }

        let node = NormalizedNode {
            id,
            name: raw.name.clone(),
            unique_name,
            kind,
            x: rect.left,
            y: rect.top,
            width: rect.width,
            height: rect.height,
            rotation: node_rotation,
            cumulative_rotation: inherited.cumulative_rotation,
            opacity: raw.opacity.unwrap_or(1.0),
            fills,
            strokes,
            effects,
            stroke_weight: raw.stroke_weight,
            stroke_weights: raw.individual_stroke_weights,
            child_layout: derive_child_layout(&raw),
            can_be_flattened,
            color_variable_mappings: None,
        };
        let idx = tree.insert(inherited.parent, node);
        ctx.record_insert(idx);
        if can_be_flattened && ctx.settings.use_color_variables {
            ctx.tag_for_mapping(idx);
        }

        // Recurse. Raw children are matched against the host handles by
        // id; a raw child without a live counterpart is dropped.
        let raw_children = std::mem::take(&mut raw.children);
        let child_state = Inherited {
            parent: Some(idx),
            parent_origin: raw
                .absolute_bounding_box
                .map(|b| (b.x, b.y))
                .or(inherited.parent_origin),
            cumulative_rotation: child_cumulative,
            ancestor_flattened: inherited.ancestor_flattened || can_be_flattened,
        };
        let mut emitted_children: Vec<NodeIndex> = Vec::new();
        for raw_child in raw_children {
            let child_handle = raw_child
                .id
                .and_then(|cid| handle.children.iter().find(|h| h.id == cid));
            let Some(child_handle) = child_handle else {
                log::trace!("NORMALIZE no live handle for a child of {id}, dropping it");
                continue;
            };
            let emission =
                process_node(ctx, tree, host, child_handle, raw_child, child_state).await?;
            emitted_children.extend(emission);
        }

        finish_frame(tree, idx, &emitted_children);

        Ok(smallvec![idx])
    }
    .boxed()
}

/// Post-recursion fixups for containers: re-derive `isRelative` from the
/// surviving children and apply the reverse z-order adjustment. The
/// adjustment only applies to flow frames; a reverse flag without an
/// active layout is ignored.
fn finish_frame(tree: &mut NormalizedTree, idx: NodeIndex, children: &[NodeIndex]) {
    let Some(frame) = tree.graph[idx].kind.as_frame() else {
        return;
    };
    let reverse = frame.layout.item_reverse_z_index && frame.layout.mode.is_flow();

    let any_absolute = children.iter().any(|&c| {
        tree.graph[c].child_layout.positioning == LayoutPositioning::Absolute
    });
    if any_absolute && let Some(frame) = tree.graph[idx].kind.as_frame_mut() {
        frame.is_relative = true;
    }

    if reverse && !children.is_empty() {
        let (absolute, flow): (Vec<NodeIndex>, Vec<NodeIndex>) =
            children.iter().copied().partition(|&c| {
                tree.graph[c].child_layout.positioning == LayoutPositioning::Absolute
            });
        let mut order: Vec<NodeIndex> = absolute.into_iter().rev().collect();
        order.extend(flow);
        tree.set_child_order(idx, order);
    }
}

/// Container-side layout for frames. Groups convert to free-positioning
/// containers with no flow; frames without flow layout are relative too.
fn frame_props(raw: &RawNode, was_group: bool) -> FrameProps {
    let mode = raw.layout_mode.unwrap_or_default();
    let padding = if mode.is_flow() {
        Padding {
            left: raw.padding_left.unwrap_or(0.0),
            right: raw.padding_right.unwrap_or(0.0),
            top: raw.padding_top.unwrap_or(0.0),
            bottom: raw.padding_bottom.unwrap_or(0.0),
        }
    } else {
        Padding::default()
    };
    FrameProps {
        layout: AutoLayout {
            mode,
            primary_axis_align_items: raw.primary_axis_align_items.unwrap_or_default(),
            counter_axis_align_items: raw.counter_axis_align_items.unwrap_or_default(),
            item_spacing: raw.item_spacing.unwrap_or(0.0),
            padding,
            item_reverse_z_index: raw.item_reverse_z_index.unwrap_or(false),
        },
        is_relative: was_group || !mode.is_flow(),
        clips_content: raw.clips_content.unwrap_or(false),
    }
}

/// Child-side layout defaults. A hug-sized axis degrades to fixed when the
/// node has no children to hug.
fn derive_child_layout(raw: &RawNode) -> ChildLayout {
    let mut sizing_horizontal = raw.layout_sizing_horizontal.unwrap_or_default();
    let mut sizing_vertical = raw.layout_sizing_vertical.unwrap_or_default();
    if raw.children.is_empty() {
        if sizing_horizontal == LayoutSizing::Hug {
            sizing_horizontal = LayoutSizing::Fixed;
        }
        if sizing_vertical == LayoutSizing::Hug {
            sizing_vertical = LayoutSizing::Fixed;
        }
    }
    ChildLayout {
        grow: raw.layout_grow.unwrap_or(0.0),
        sizing_horizontal,
        sizing_vertical,
        positioning: raw.layout_positioning.unwrap_or_default(),
    }
}

// ─── Text enrichment ─────────────────────────────────────────────────────

async fn enrich_text<H: SceneHost + Sync>(
    ctx: &mut ConversionContext,
    host: &H,
    raw: &RawNode,
    id: NodeId,
    unique_name: &str,
) -> ConvertResult<TextProps> {
    let runs = host.styled_text_runs(id).await?;
    let base = span_id_base(unique_name);
    let multiple = runs.len() > 1;

    let mut segments = Vec::with_capacity(runs.len());
    for (i, run) in runs.into_iter().enumerate() {
        let unique_id = if multiple {
            format!("{base}_span_{:02}", i + 1)
        } else {
            format!("{base}_span")
        };
        let style = run.to_style();
        let mut fills = run.fills;
        if ctx.settings.use_color_variables {
            warn_unsupported_text_blends(ctx, &fills);
            resolve_node_variables(ctx, host, &mut fills, &mut [], &mut []).await?;
        }
        segments.push(TextSegment {
            unique_id,
            characters: run.characters,
            style,
            fills,
            hyperlink: run.hyperlink,
        });
    }

    // Single-run text carries its run's style on the node itself.
    let mut style = raw
        .style
        .as_ref()
        .map(RawTextStyle::to_text_style)
        .unwrap_or_default();
    if segments.len() == 1 {
        style.overlay(&segments[0].style);
    }

    Ok(TextProps {
        characters: raw.characters.clone().unwrap_or_default(),
        segments,
        style,
        auto_resize: raw.text_auto_resize.unwrap_or_default(),
    })
}

/// Span identifiers come from the deduplicated name: everything outside
/// `[a-zA-Z0-9_-]` is removed (not replaced), then lowercased.
fn span_id_base(unique_name: &str) -> String {
    unique_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase()
}

fn warn_unsupported_text_blends(ctx: &mut ConversionContext, fills: &[Paint]) {
    for paint in fills {
        if let Some(mode) = paint.blend_mode()
            && !mode.is_supported_for_text()
        {
            ctx.warn(
                WarningKind::UnsupportedBlendMode,
                "BlendMode is not supported in Text colors",
            );
        }
    }
}
