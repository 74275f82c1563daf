//! Scene graph nodes.
//!
//! A [`Node`] is one closed variant ([`NodeKind`]) plus what every node
//! carries: its element name, immutable attributes, local transform and id.
//! Group children start out as raw [`ElementDefinition`]s and are turned into
//! nodes the first time anything asks for them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use svgkit_geometry::{Path, Point, Rect, Transform};
use svgkit_style::{AttributeMap, AttributedNode, ClassStyles, Length};
use tracing::{debug, trace};

use crate::definition::ElementDefinition;
use crate::factory::NodeFactory;
use crate::gradient::GradientNode;

/// Registry of nodes by `id` / `xml:id`.
pub type NamedObjects = HashMap<String, Arc<Node>>;

/// Coordinate system for gradient and clip content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    UserSpaceOnUse,
    ObjectBoundingBox,
}

impl Units {
    pub fn parse(s: Option<&str>, default: Units) -> Units {
        match s.map(str::trim) {
            Some("userSpaceOnUse") => Units::UserSpaceOnUse,
            Some("objectBoundingBox") => Units::ObjectBoundingBox,
            _ => default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rect,
    Ellipse,
    Circle,
    Line,
    Path,
    Polyline,
    Polygon,
}

/// A basic shape or path, its geometry already in local user space.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeNode {
    pub kind: ShapeKind,
    pub geometry: Path,
    pub is_closed: bool,
    pub is_fillable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupMode {
    /// `g`, `svg`, `a`, `symbol`
    Normal,
    /// `defs`: holds referenced content, never painted itself
    Definitions,
    /// `switch`: paints the first child whose environment check passes
    Switch,
}

/// Container whose children are materialized on first access.
///
/// The pending definitions are consumed by materialization, so a group holds
/// either definitions or children, never both.
#[derive(Debug)]
pub struct GroupNode {
    mode: GroupMode,
    children: OnceLock<Vec<Arc<Node>>>,
    definitions: Mutex<Vec<ElementDefinition>>,
}

impl GroupNode {
    pub fn new(mode: GroupMode, definitions: Vec<ElementDefinition>) -> Self {
        Self {
            mode,
            children: OnceLock::new(),
            definitions: Mutex::new(definitions),
        }
    }

    pub fn mode(&self) -> GroupMode {
        self.mode
    }

    /// Children, building them from the pending definitions on the first call.
    ///
    /// Concurrent first calls block on one another; every caller observes the
    /// same complete list.
    pub fn materialize_children(&self, factory: &NodeFactory) -> &[Arc<Node>] {
        self.children.get_or_init(|| {
            let definitions = std::mem::take(
                &mut *self.definitions.lock().unwrap_or_else(PoisonError::into_inner),
            );
            trace!(count = definitions.len(), "materializing group children");
            definitions
                .iter()
                .map(|definition| Arc::new(factory.build(definition)))
                .collect()
        })
    }

    /// Children if they have been materialized.
    pub fn children(&self) -> Option<&[Arc<Node>]> {
        self.children.get().map(Vec::as_slice)
    }

    pub fn is_materialized(&self) -> bool {
        self.children.get().is_some()
    }

    /// Number of definitions still waiting to be materialized.
    pub fn pending_definitions(&self) -> usize {
        self.definitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// One run of character data with the attributes of the element holding it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Attributes of the `tspan` (or the text element for its own run).
    pub attributes: AttributeMap,
    /// Absolute start position, when the run sets one.
    pub x: Option<f32>,
    pub y: Option<f32>,
    /// Relative shift applied before the run.
    pub dx: f32,
    pub dy: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextLayoutMode {
    /// Runs follow one another along the baseline.
    Inline,
    /// Runs follow the referenced path, starting `start_offset` along it.
    OnPath { target_id: String, start_offset: Length },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub origin: Point,
    pub runs: Vec<TextRun>,
    pub layout_mode: TextLayoutMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageNode {
    /// `href` / `xlink:href`, handed to the sink as is.
    pub source_ref: String,
    pub bounds: Rect,
    pub preserve_aspect_ratio: String,
}

/// `solidColor` paint server.
#[derive(Debug, Clone, PartialEq)]
pub struct SolidColorNode {
    pub color_expr: String,
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipKind {
    Clip,
    Mask,
}

/// `clipPath` or `mask`: its children's geometry forms a clip region.
#[derive(Debug)]
pub struct ClipGroupNode {
    pub kind: ClipKind,
    pub units: Units,
    pub group: GroupNode,
}

/// `use`: a reference to another node by id.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderNode {
    /// Target id without the leading `#`.
    pub target_id: String,
    /// The `x`/`y` offset, already folded into the node transform.
    pub offset: Point,
}

#[derive(Debug)]
pub enum NodeKind {
    Shape(ShapeNode),
    Group(GroupNode),
    Text(TextNode),
    Image(ImageNode),
    SolidColor(SolidColorNode),
    Gradient(GradientNode),
    ClipGroup(ClipGroupNode),
    Placeholder(PlaceholderNode),
    Style(ClassStyles),
    /// Unknown element category; never painted.
    Inert,
}

/// A scene graph node.
#[derive(Debug)]
pub struct Node {
    name: String,
    attributes: AttributedNode,
    transform: Transform,
    id: Option<String>,
    kind: NodeKind,
}

impl Node {
    pub fn new(name: impl Into<String>, attributes: AttributeMap, kind: NodeKind) -> Self {
        let transform = attributes
            .get("transform")
            .and_then(|t| t.to_text().map(|t| Transform::parse(&t)))
            .unwrap_or_default();
        let id = ["id", "xml:id"]
            .iter()
            .find_map(|key| attributes.get(*key).and_then(|v| v.to_text()))
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        Self {
            name: name.into(),
            attributes: AttributedNode::new(attributes),
            transform,
            id,
            kind,
        }
    }

    /// Replace the local transform (builder).
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Element name the node was built from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &AttributedNode {
        &self.attributes
    }

    pub fn attribute_map(&self) -> &AttributeMap {
        self.attributes.attributes()
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The group part of a `Group` or `ClipGroup`.
    pub fn group(&self) -> Option<&GroupNode> {
        match &self.kind {
            NodeKind::Group(group) => Some(group),
            NodeKind::ClipGroup(clip) => Some(&clip.group),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<&ShapeNode> {
        match &self.kind {
            NodeKind::Shape(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn as_clip_group(&self) -> Option<&ClipGroupNode> {
        match &self.kind {
            NodeKind::ClipGroup(clip) => Some(clip),
            _ => None,
        }
    }

    pub fn as_gradient(&self) -> Option<&GradientNode> {
        match &self.kind {
            NodeKind::Gradient(gradient) => Some(gradient),
            _ => None,
        }
    }

    pub fn as_placeholder(&self) -> Option<&PlaceholderNode> {
        match &self.kind {
            NodeKind::Placeholder(placeholder) => Some(placeholder),
            _ => None,
        }
    }

    /// Register this node and everything below it by id.
    ///
    /// Group children are materialized on the way down. The first node to
    /// claim an id keeps it.
    pub fn add_named_objects(self: &Arc<Self>, factory: &NodeFactory, registry: &mut NamedObjects) {
        if let Some(id) = &self.id {
            if registry.contains_key(id) {
                debug!(id = %id, "duplicate id ignored");
            } else {
                registry.insert(id.clone(), Arc::clone(self));
            }
        }
        if let Some(group) = self.group() {
            for child in group.materialize_children(factory) {
                child.add_named_objects(factory, registry);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svgkit_style::attribute_map;

    fn factory() -> NodeFactory {
        NodeFactory::new(100.0, 100.0, 12.0)
    }

    fn group_definition() -> ElementDefinition {
        ElementDefinition::new("g")
            .attr("id", "outer")
            .child(ElementDefinition::new("rect").attr("id", "a").attr("width", "10").attr("height", "10"))
            .child(
                ElementDefinition::new("g")
                    .child(ElementDefinition::new("circle").attr("xml:id", "b").attr("r", "5")),
            )
    }

    #[test]
    fn test_node_reads_id_and_transform() {
        let node = Node::new(
            "rect",
            attribute_map([("xml:id", " r1 "), ("transform", "translate(5,6)")]),
            NodeKind::Inert,
        );
        assert_eq!(node.id(), Some("r1"));
        assert_eq!(*node.transform(), Transform::from_translate(5.0, 6.0));
    }

    #[test]
    fn test_materialization_is_idempotent() {
        let node = factory().build(&group_definition());
        let group = node.group().unwrap();
        assert!(!group.is_materialized());
        assert_eq!(group.pending_definitions(), 2);

        let first: Vec<Arc<Node>> = group.materialize_children(&factory()).to_vec();
        assert_eq!(group.pending_definitions(), 0);
        let second = group.materialize_children(&factory());
        assert_eq!(first.len(), 2);
        assert!(first.iter().zip(second).all(|(a, b)| Arc::ptr_eq(a, b)));
    }

    #[test]
    fn test_concurrent_materialization_builds_once() {
        let node = Arc::new(factory().build(&group_definition()));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let node = Arc::clone(&node);
                std::thread::spawn(move || {
                    let children = node.group().unwrap().materialize_children(&factory());
                    Arc::as_ptr(&children[0]) as usize
                })
            })
            .collect();
        let pointers: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(pointers.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_add_named_objects_recurses() {
        let root = Arc::new(factory().build(&group_definition()));
        let mut registry = NamedObjects::new();
        root.add_named_objects(&factory(), &mut registry);

        let mut ids: Vec<&str> = registry.keys().map(String::as_str).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["a", "b", "outer"]);
        assert_eq!(registry["b"].name(), "circle");
    }

    #[test]
    fn test_first_id_wins() {
        let definition = ElementDefinition::new("g")
            .child(ElementDefinition::new("rect").attr("id", "dup"))
            .child(ElementDefinition::new("circle").attr("id", "dup"));
        let root = Arc::new(factory().build(&definition));
        let mut registry = NamedObjects::new();
        root.add_named_objects(&factory(), &mut registry);
        assert_eq!(registry["dup"].name(), "rect");
    }
}
