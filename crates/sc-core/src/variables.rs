//! Color-variable resolution and mapping collection.
//!
//! Resolution is two-phase within a node: first every unresolved bound
//! color id across fills, strokes, and effects is gathered, then the
//! outstanding host lookups run concurrently and names are applied only
//! after all of them land. A failed lookup therefore never leaves a node
//! with half its names filled in.

use crate::context::ConversionContext;
use crate::error::HostError;
use crate::host::SceneHost;
use crate::model::{ColorVariableMappings, ColorVariableRef, Effect, NormalizedTree, Paint};
use futures::future::try_join_all;
use petgraph::graph::NodeIndex;
use std::collections::HashSet;

/// Replace every character outside `[A-Za-z0-9_-]` with `-`.
pub fn sanitize_variable_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Resolve variable names for every bound color on one node.
///
/// Lookups hit the host once per id per run; results (including misses)
/// are memoized on the context. An id the host no longer knows falls back
/// to its own sanitized, lowercased form so downstream mappings stay
/// usable.
pub async fn resolve_node_variables<H: SceneHost>(
    ctx: &mut ConversionContext,
    host: &H,
    fills: &mut [Paint],
    strokes: &mut [Paint],
    effects: &mut [Effect],
) -> Result<(), HostError> {
    let mut wanted: Vec<String> = Vec::new();
    {
        let mut seen: HashSet<String> = HashSet::new();
        let mut collect = |id: &str, name: &mut Option<String>| {
            if name.is_none() && ctx.cached_variable(id).is_none() && seen.insert(id.to_string()) {
                wanted.push(id.to_string());
            }
        };
        visit_bound_colors(fills, &mut collect);
        visit_bound_colors(strokes, &mut collect);
        visit_bound_shadow_colors(effects, &mut collect);
    }

    if !wanted.is_empty() {
        let fetched = try_join_all(wanted.iter().map(|id| host.variable_name(id))).await?;
        for (id, name) in wanted.into_iter().zip(fetched) {
            ctx.cache_variable(&id, name);
        }
    }

    let mut apply = |id: &str, name: &mut Option<String>| {
        if name.is_some() {
            return;
        }
        let resolved = match ctx.cached_variable(id) {
            Some(Some(host_name)) => sanitize_variable_name(&host_name),
            _ => sanitize_variable_name(&id.to_ascii_lowercase()),
        };
        *name = Some(resolved);
    };
    visit_bound_colors(fills, &mut apply);
    visit_bound_colors(strokes, &mut apply);
    visit_bound_shadow_colors(effects, &mut apply);
    Ok(())
}

fn visit_bound_colors(paints: &mut [Paint], visit: &mut impl FnMut(&str, &mut Option<String>)) {
    for paint in paints {
        match paint {
            Paint::Solid(solid) => {
                if let Some(alias) = solid.bound_variables.as_ref().and_then(|b| b.color.as_ref())
                {
                    visit(&alias.id, &mut solid.variable_color_name);
                }
            }
            other => {
                if let Some(gradient) = other.as_gradient_mut() {
                    for stop in &mut gradient.gradient_stops {
                        if let Some(alias) =
                            stop.bound_variables.as_ref().and_then(|b| b.color.as_ref())
                        {
                            visit(&alias.id, &mut stop.variable_color_name);
                        }
                    }
                }
            }
        }
    }
}

fn visit_bound_shadow_colors(
    effects: &mut [Effect],
    visit: &mut impl FnMut(&str, &mut Option<String>),
) {
    for effect in effects {
        if let Some(shadow) = effect.as_shadow_mut()
            && let Some(alias) = shadow.bound_variables.as_ref().and_then(|b| b.color.as_ref())
        {
            visit(&alias.id, &mut shadow.variable_color_name);
        }
    }
}

// ─── Deferred mapping collection ─────────────────────────────────────────

/// Walk a flattened subtree and collect color → variable mappings from
/// solid fills and strokes. Runs only after the subtree has finished
/// normalizing, since it reads the names written by
/// [`resolve_node_variables`].
///
/// Keys are lowercase hex; pure white and black also record their named
/// and functional CSS forms, which the markup generator may emit instead
/// of hex. A descendant's binding overwrites an ancestor's for the same
/// key.
pub fn collect_subtree_mappings(tree: &NormalizedTree, idx: NodeIndex) -> ColorVariableMappings {
    let mut mappings = ColorVariableMappings::new();
    collect_into(tree, idx, &mut mappings);
    mappings
}

fn collect_into(tree: &NormalizedTree, idx: NodeIndex, out: &mut ColorVariableMappings) {
    let node = &tree.graph[idx];
    record_solid_paints(&node.fills, out);
    record_solid_paints(&node.strokes, out);
    for child in tree.children(idx) {
        collect_into(tree, child, out);
    }
}

fn record_solid_paints(paints: &[Paint], out: &mut ColorVariableMappings) {
    for paint in paints {
        if let Paint::Solid(solid) = paint
            && let Some(alias) = solid.bound_variables.as_ref().and_then(|b| b.color.as_ref())
            && let Some(name) = &solid.variable_color_name
        {
            let entry = ColorVariableRef {
                variable_id: alias.id.clone(),
                variable_name: name.clone(),
            };
            out.insert(solid.color.to_hex_rgb(), entry.clone());
            if solid.color.is_white() {
                out.insert("white".into(), entry.clone());
                out.insert("rgb(255,255,255)".into(), entry);
            } else if solid.color.is_black() {
                out.insert("black".into(), entry.clone());
                out.insert("rgb(0,0,0)".into(), entry);
            }
        }
    }
}
