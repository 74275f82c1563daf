//! Reference resolution: `use` targets and clip references.

use std::collections::HashSet;
use std::sync::Arc;

use svgkit_style::{is_url, text_for_style_attribute, unquoted_string, AttributeMap};
use tracing::debug;

use crate::context::SvgContext;
use crate::definition::ElementDefinition;
use crate::node::{ClipGroupNode, ClipKind, GroupMode, GroupNode, Node, NodeKind, PlaceholderNode, Units};

/// Outcome of resolving a placeholder.
#[derive(Debug, Clone)]
pub enum Resolution {
    Resolved(Arc<Node>),
    /// No node has the target id.
    Missing,
    /// The target id was already visited in this call chain.
    Cycle,
}

/// Look up a placeholder's target.
///
/// `visited` holds the ids already resolved along the current call chain. A
/// found target is added to it; meeting one of them again is a cycle.
pub fn resolve_placeholder(
    placeholder: &PlaceholderNode,
    context: &dyn SvgContext,
    visited: &mut HashSet<String>,
) -> Resolution {
    let id = placeholder.target_id.as_str();
    let Some(node) = context.object_named(id) else {
        debug!(id, "use target not found");
        return Resolution::Missing;
    };
    if !visited.insert(id.to_string()) {
        debug!(id, "use reference cycle");
        return Resolution::Cycle;
    }
    Resolution::Resolved(node)
}

impl ClipGroupNode {
    /// Clip groups an element refers to through `clip-path` and `mask`, in
    /// that order. A literal `clip-path: path("...")` yields an anonymous
    /// user-space clip group. Other values, and references naming anything
    /// but a clip group of the matching kind, are ignored.
    pub fn clip_object_for_attributes(
        attributes: &AttributeMap,
        entity: Option<&str>,
        context: &dyn SvgContext,
    ) -> Vec<Arc<Node>> {
        [("clip-path", ClipKind::Clip), ("mask", ClipKind::Mask)]
            .into_iter()
            .filter_map(|(key, kind)| {
                let reference = text_for_style_attribute(key, attributes, entity, context.class_styles())?;
                if kind == ClipKind::Clip {
                    if let Some(literal) = literal_clip_path(&reference) {
                        return Some(literal);
                    }
                }
                if !is_url(&reference) {
                    return None;
                }
                let node = context.object_at_url(&reference);
                match node {
                    Some(node) if node.as_clip_group().is_some_and(|c| c.kind == kind) => Some(node),
                    _ => {
                        debug!(reference = %reference, "clip reference does not name a {:?} group", kind);
                        None
                    }
                }
            })
            .collect()
    }
}

/// `path("d")` as a one-shape clip group.
fn literal_clip_path(value: &str) -> Option<Arc<Node>> {
    let inner = value.trim().strip_prefix("path(")?.strip_suffix(')')?;
    let data = unquoted_string(inner);
    if data.is_empty() {
        return None;
    }
    let shape = ElementDefinition::new("path").attr("d", data);
    Some(Arc::new(Node::new(
        "clipPath",
        AttributeMap::new(),
        NodeKind::ClipGroup(ClipGroupNode {
            kind: ClipKind::Clip,
            units: Units::UserSpaceOnUse,
            group: GroupNode::new(GroupMode::Normal, vec![shape]),
        }),
    )))
}
