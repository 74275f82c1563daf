//! Parsed documents.

use std::sync::Arc;

use svgkit_common::RenderConfig;
use svgkit_geometry::{Rect, Transform};
use svgkit_style::{extract_url_contents, fragment_id, ClassStyles, Length};
use tracing::debug;

use crate::definition::ElementDefinition;
use crate::error::SceneError;
use crate::factory::NodeFactory;
use crate::node::{NamedObjects, Node, NodeKind};

/// Default size of a document that gives neither `width`/`height` nor a
/// `viewBox`.
pub const DEFAULT_WIDTH: f32 = 300.0;
pub const DEFAULT_HEIGHT: f32 = 150.0;

/// SVG viewBox.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub min_x: f32,
    pub min_y: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewBox {
    /// Parse viewBox attribute. Non-positive sizes disable the view box.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<f32> = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|p| !p.is_empty())
            .map(|p| p.trim().parse().ok())
            .collect::<Option<_>>()?;

        match parts[..] {
            [min_x, min_y, width, height] if width > 0.0 && height > 0.0 => Some(ViewBox {
                min_x,
                min_y,
                width,
                height,
            }),
            _ => None,
        }
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.min_x, self.min_y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Min,
    Mid,
    Max,
}

/// `preserveAspectRatio`: `none`, or an alignment per axis plus meet/slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatio {
    align: Option<(Align, Align)>,
    slice: bool,
}

impl AspectRatio {
    pub fn parse(s: &str) -> Self {
        let mut words = s.split_whitespace();
        let align = match words.next() {
            Some("none") => None,
            Some(word) if word.len() == 8 => {
                let axis = |part: &str| match part {
                    "Min" => Some(Align::Min),
                    "Mid" => Some(Align::Mid),
                    "Max" => Some(Align::Max),
                    _ => None,
                };
                match (word.get(1..4).and_then(axis), word.get(5..8).and_then(axis)) {
                    (Some(x), Some(y)) => Some((x, y)),
                    _ => Some((Align::Mid, Align::Mid)),
                }
            }
            _ => Some((Align::Mid, Align::Mid)),
        };
        Self {
            align,
            slice: words.next() == Some("slice"),
        }
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self {
            align: Some((Align::Mid, Align::Mid)),
            slice: false,
        }
    }
}

/// A parsed document: root node, named-object registry, class rules and
/// sizing. Immutable once built and safe to share between render passes.
#[derive(Debug)]
pub struct Document {
    root: Arc<Node>,
    registry: NamedObjects,
    class_styles: ClassStyles,
    view_box: Option<ViewBox>,
    width: Option<Length>,
    height: Option<Length>,
    aspect_ratio: AspectRatio,
    factory: NodeFactory,
    config: RenderConfig,
}

impl Document {
    /// Build a document from its root element, which must be `svg`.
    ///
    /// Every group is materialized and every id registered here, so render
    /// passes only read.
    pub fn from_definition(root: &ElementDefinition, config: RenderConfig) -> Result<Self, SceneError> {
        if root.name != "svg" {
            return Err(SceneError::NotSvgRoot(root.name.clone()));
        }
        config.validate()?;

        let view_box = root.attribute_text("viewBox").and_then(|v| ViewBox::parse(&v));
        let width = root.attribute_text("width").and_then(|w| Length::parse(&w));
        let height = root.attribute_text("height").and_then(|h| Length::parse(&h));
        let aspect_ratio = root
            .attribute_text("preserveAspectRatio")
            .map(|p| AspectRatio::parse(&p))
            .unwrap_or_default();

        let mut document = Self {
            root: Arc::new(Node::new("svg", Default::default(), NodeKind::Inert)),
            registry: NamedObjects::new(),
            class_styles: ClassStyles::new(),
            view_box,
            width,
            height,
            aspect_ratio,
            factory: NodeFactory::new(0.0, 0.0, config.font.size),
            config,
        };
        let viewport = document.viewport();
        document.factory = NodeFactory::new(viewport.width, viewport.height, document.config.font.size);

        let root = Arc::new(document.factory.build(root));
        root.add_named_objects(&document.factory, &mut document.registry);
        collect_class_styles(&root, &mut document.class_styles);
        document.root = root;

        debug!(
            named_objects = document.registry.len(),
            class_rules = document.class_styles.rule_count(),
            width = viewport.width,
            height = viewport.height,
            "document constructed"
        );
        Ok(document)
    }

    pub fn root(&self) -> &Arc<Node> {
        &self.root
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn factory(&self) -> &NodeFactory {
        &self.factory
    }

    pub fn class_styles(&self) -> &ClassStyles {
        &self.class_styles
    }

    pub fn view_box(&self) -> Option<ViewBox> {
        self.view_box
    }

    pub fn object_named(&self, id: &str) -> Option<Arc<Node>> {
        self.registry.get(id).cloned()
    }

    /// Lookup for `url(#id)` or `#id`.
    pub fn object_at_url(&self, url: &str) -> Option<Arc<Node>> {
        extract_url_contents(url)
            .or_else(|| fragment_id(url))
            .and_then(|id| self.object_named(id))
    }

    pub fn named_object_count(&self) -> usize {
        self.registry.len()
    }

    /// Size from `width`/`height`, falling back to the view box and then to
    /// 300x150. Percentages resolve against the fallback.
    pub fn intrinsic_size(&self) -> (f32, f32) {
        let font_size = self.config.font.size;
        let fallback_width = self.view_box.map_or(DEFAULT_WIDTH, |vb| vb.width);
        let fallback_height = self.view_box.map_or(DEFAULT_HEIGHT, |vb| vb.height);
        let width = self
            .width
            .map(|w| w.to_user_units(fallback_width, font_size))
            .filter(|w| *w > 0.0)
            .unwrap_or(fallback_width);
        let height = self
            .height
            .map(|h| h.to_user_units(fallback_height, font_size))
            .filter(|h| *h > 0.0)
            .unwrap_or(fallback_height);
        (width, height)
    }

    /// User-space viewport: the view box, or the intrinsic size at the
    /// origin.
    pub fn viewport(&self) -> Rect {
        match self.view_box {
            Some(vb) => vb.to_rect(),
            None => {
                let (width, height) = self.intrinsic_size();
                Rect::new(0.0, 0.0, width, height)
            }
        }
    }

    /// Transform mapping user space into a `width` x `height` target,
    /// honouring `preserveAspectRatio` on the root.
    pub fn view_transform(&self, width: f32, height: f32) -> Transform {
        let viewport = self.viewport();
        if viewport.width <= 0.0 || viewport.height <= 0.0 {
            return Transform::IDENTITY;
        }
        let sx = width / viewport.width;
        let sy = height / viewport.height;

        let Some((align_x, align_y)) = self.aspect_ratio.align else {
            return Transform::from_scale(sx, sy).translate(-viewport.x, -viewport.y);
        };
        let scale = if self.aspect_ratio.slice { sx.max(sy) } else { sx.min(sy) };
        let offset = |align, available: f32, used: f32| match align {
            Align::Min => 0.0,
            Align::Mid => (available - used) / 2.0,
            Align::Max => available - used,
        };
        let tx = offset(align_x, width, viewport.width * scale);
        let ty = offset(align_y, height, viewport.height * scale);
        Transform::from_translate(tx, ty)
            .scale(scale, scale)
            .translate(-viewport.x, -viewport.y)
    }
}

/// Merge the rules of every `style` element in document order.
fn collect_class_styles(node: &Node, styles: &mut ClassStyles) {
    if let NodeKind::Style(rules) = node.kind() {
        styles.extend(rules);
    }
    if let Some(children) = node.group().and_then(|g| g.children()) {
        for child in children {
            collect_class_styles(child, styles);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svgkit_geometry::Point;

    fn svg() -> ElementDefinition {
        ElementDefinition::new("svg")
    }

    #[test]
    fn test_requires_svg_root() {
        let err = Document::from_definition(&ElementDefinition::new("g"), RenderConfig::default()).unwrap_err();
        assert!(matches!(err, SceneError::NotSvgRoot(name) if name == "g"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RenderConfig {
            explicit_line_scaling: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            Document::from_definition(&svg(), config),
            Err(SceneError::Config(_))
        ));
    }

    #[test]
    fn test_registration_and_class_styles() {
        let root = svg()
            .child(ElementDefinition::new("style").text(".a { fill: red }"))
            .child(
                ElementDefinition::new("defs")
                    .child(ElementDefinition::new("rect").attr("id", "r"))
                    .child(ElementDefinition::new("style").text("rect.a { stroke: blue }")),
            );
        let doc = Document::from_definition(&root, RenderConfig::default()).unwrap();
        assert_eq!(doc.named_object_count(), 1);
        assert!(doc.object_at_url("url(#r)").is_some());
        assert_eq!(doc.class_styles().rule_count(), 2);
        assert!(doc.root().group().unwrap().is_materialized());
    }

    #[test]
    fn test_intrinsic_size() {
        let doc = Document::from_definition(&svg(), RenderConfig::default()).unwrap();
        assert_eq!(doc.intrinsic_size(), (300.0, 150.0));

        let doc = Document::from_definition(
            &svg().attr("viewBox", "0 0 40 20").attr("width", "50%"),
            RenderConfig::default(),
        )
        .unwrap();
        assert_eq!(doc.intrinsic_size(), (20.0, 20.0));
        assert_eq!(doc.viewport(), Rect::new(0.0, 0.0, 40.0, 20.0));
    }

    #[test]
    fn test_view_transform_meet_centers() {
        let doc = Document::from_definition(&svg().attr("viewBox", "10 10 100 50"), RenderConfig::default()).unwrap();
        let t = doc.view_transform(200.0, 200.0);
        assert_eq!(t.apply(Point::new(10.0, 10.0)), Point::new(0.0, 50.0));
        assert_eq!(t.apply(Point::new(110.0, 60.0)), Point::new(200.0, 150.0));
    }

    #[test]
    fn test_view_transform_none_stretches() {
        let doc = Document::from_definition(
            &svg().attr("viewBox", "0 0 100 50").attr("preserveAspectRatio", "none"),
            RenderConfig::default(),
        )
        .unwrap();
        let t = doc.view_transform(200.0, 200.0);
        assert_eq!(t.apply(Point::new(100.0, 50.0)), Point::new(200.0, 200.0));
    }

    #[test]
    fn test_view_box_parse() {
        assert_eq!(
            ViewBox::parse("0,0 10 5"),
            Some(ViewBox { min_x: 0.0, min_y: 0.0, width: 10.0, height: 5.0 })
        );
        assert_eq!(ViewBox::parse("0 0 -1 5"), None);
        assert_eq!(ViewBox::parse("0 0 1"), None);
    }

    #[test]
    fn test_document_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Document>();
    }
}
