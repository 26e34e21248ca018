//! Vector-asset classification: should a subtree be emitted as one
//! embedded vector image instead of being decomposed further?
//!
//! Three policies, checked in order:
//! 1. a descendant of an already-flattened node never re-flattens
//! 2. an explicit SVG export marker on the node always flattens
//! 3. otherwise, either the icon heuristic (when vector embedding is
//!    enabled) or the conservative pure-vector-asset rule decides

use crate::raw::{RawNode, RawNodeKind};
use crate::settings::ConversionSettings;

/// Decide flatten eligibility for one node.
///
/// `width`/`height` are the node's projected dimensions; the size bound
/// applies to the candidate node only, not to its descendants.
pub fn flatten_eligibility(
    raw: &RawNode,
    width: f32,
    height: f32,
    settings: &ConversionSettings,
    ancestor_flattened: bool,
) -> bool {
    if ancestor_flattened {
        return false;
    }
    if raw.has_svg_export() {
        return true;
    }
    if settings.embed_vectors {
        return is_likely_icon(raw, width, height, settings.embed_vectors_max_size);
    }
    within_max_size(width, height, settings.embed_vectors_max_size) && is_pure_vector_asset(raw)
}

fn within_max_size(width: f32, height: f32, max: f32) -> bool {
    width > 0.0 && height > 0.0 && width <= max && height <= max
}

/// Conservative rule: vector-drawing leaves qualify outright; containers
/// qualify when every visible child qualifies recursively. An empty
/// container never qualifies, and invisible children are ignored.
fn is_pure_vector_asset(raw: &RawNode) -> bool {
    match raw.kind {
        RawNodeKind::Vector
        | RawNodeKind::BooleanOperation
        | RawNodeKind::Star
        | RawNodeKind::Polygon
        | RawNodeKind::Line
        | RawNodeKind::Rectangle
        | RawNodeKind::Ellipse => true,
        RawNodeKind::Frame
        | RawNodeKind::Group
        | RawNodeKind::Component
        | RawNodeKind::ComponentSet
        | RawNodeKind::Instance => {
            let mut visible = raw.children.iter().filter(|c| c.visible);
            let mut any = false;
            for child in &mut visible {
                if !is_pure_vector_asset(child) {
                    return false;
                }
                any = true;
            }
            any
        }
        _ => false,
    }
}

/// Icon heuristic: small, contains real vector geometry, and no visible
/// text anywhere in the subtree.
fn is_likely_icon(raw: &RawNode, width: f32, height: f32, max: f32) -> bool {
    within_max_size(width, height, max) && !has_visible_text(raw) && has_vector_content(raw)
}

fn has_visible_text(raw: &RawNode) -> bool {
    if !raw.visible {
        return false;
    }
    if raw.kind == RawNodeKind::Text {
        return true;
    }
    raw.children.iter().any(has_visible_text)
}

fn has_vector_content(raw: &RawNode) -> bool {
    if !raw.visible {
        return false;
    }
    if raw.kind.is_vector_like() {
        return true;
    }
    raw.children.iter().any(has_vector_content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::ExportSetting;
    use crate::settings::ConversionSettings;

    fn node(kind: RawNodeKind) -> RawNode {
        RawNode {
            kind,
            ..RawNode::default()
        }
    }

    fn with_children(kind: RawNodeKind, children: Vec<RawNode>) -> RawNode {
        RawNode {
            kind,
            children,
            ..RawNode::default()
        }
    }

    fn svg_export(mut raw: RawNode) -> RawNode {
        raw.export_settings.push(ExportSetting {
            format: "SVG".into(),
        });
        raw
    }

    fn conservative() -> ConversionSettings {
        ConversionSettings::default()
    }

    fn icon_mode() -> ConversionSettings {
        ConversionSettings {
            embed_vectors: true,
            ..ConversionSettings::default()
        }
    }

    #[test]
    fn explicit_svg_export_beats_every_heuristic() {
        let big_text_frame = svg_export(with_children(
            RawNodeKind::Frame,
            vec![node(RawNodeKind::Text)],
        ));
        assert!(flatten_eligibility(
            &big_text_frame,
            4000.0,
            4000.0,
            &icon_mode(),
            false
        ));
        assert!(flatten_eligibility(
            &big_text_frame,
            4000.0,
            4000.0,
            &conservative(),
            false
        ));
    }

    #[test]
    fn flattened_ancestor_suppresses_even_explicit_exports() {
        let marked = svg_export(node(RawNodeKind::Vector));
        assert!(!flatten_eligibility(
            &marked,
            16.0,
            16.0,
            &conservative(),
            true
        ));
    }

    #[test]
    fn conservative_mode_accepts_small_vector_leaves_and_compositions() {
        let leaf = node(RawNodeKind::Vector);
        assert!(flatten_eligibility(&leaf, 24.0, 24.0, &conservative(), false));
        assert!(
            !flatten_eligibility(&leaf, 24.0, 400.0, &conservative(), false),
            "size bound applies to both axes"
        );

        let composition = with_children(
            RawNodeKind::Group,
            vec![node(RawNodeKind::Vector), node(RawNodeKind::Ellipse)],
        );
        assert!(flatten_eligibility(
            &composition,
            32.0,
            32.0,
            &conservative(),
            false
        ));
    }

    #[test]
    fn conservative_mode_ignores_invisible_children() {
        let mut hidden_text = node(RawNodeKind::Text);
        hidden_text.visible = false;
        let composition = with_children(
            RawNodeKind::Frame,
            vec![node(RawNodeKind::Vector), hidden_text],
        );
        assert!(flatten_eligibility(
            &composition,
            32.0,
            32.0,
            &conservative(),
            false
        ));
    }

    #[test]
    fn conservative_mode_rejects_empty_containers_and_text() {
        let empty = with_children(RawNodeKind::Frame, vec![]);
        assert!(!flatten_eligibility(&empty, 16.0, 16.0, &conservative(), false));

        let with_text = with_children(
            RawNodeKind::Frame,
            vec![node(RawNodeKind::Vector), node(RawNodeKind::Text)],
        );
        assert!(!flatten_eligibility(
            &with_text,
            16.0,
            16.0,
            &conservative(),
            false
        ));
    }

    #[test]
    fn degenerate_dimensions_never_flatten() {
        let line = node(RawNodeKind::Line);
        assert!(
            !flatten_eligibility(&line, 40.0, 0.0, &conservative(), false),
            "zero-height geometry is not an embeddable asset"
        );
        assert!(!flatten_eligibility(&line, 40.0, 0.0, &icon_mode(), false));
        assert!(
            !flatten_eligibility(&node(RawNodeKind::Vector), 0.0, 0.0, &conservative(), false),
            "a missing bounding box projects as 0x0 and must stay unflattened"
        );
    }

    #[test]
    fn icon_heuristic_wants_vector_content_without_text() {
        let icon = with_children(
            RawNodeKind::Frame,
            vec![with_children(
                RawNodeKind::Group,
                vec![node(RawNodeKind::BooleanOperation)],
            )],
        );
        assert!(flatten_eligibility(&icon, 24.0, 24.0, &icon_mode(), false));
        assert!(
            !flatten_eligibility(&icon, 128.0, 24.0, &icon_mode(), false),
            "icons are bounded by the configured max size"
        );

        let labeled = with_children(
            RawNodeKind::Frame,
            vec![node(RawNodeKind::Vector), node(RawNodeKind::Text)],
        );
        assert!(!flatten_eligibility(&labeled, 24.0, 24.0, &icon_mode(), false));

        let plain_rects = with_children(RawNodeKind::Frame, vec![node(RawNodeKind::Rectangle)]);
        assert!(!flatten_eligibility(
            &plain_rects,
            24.0,
            24.0,
            &icon_mode(),
            false
        ));
    }
}
