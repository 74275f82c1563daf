//! Building typed nodes from element definitions.

use svgkit_geometry::{parse_path_data, parse_points, Path, Point, Rect};
use svgkit_style::{fragment_id, parse_fraction, parse_length, text_for_style_attribute, ClassStyles, Length};
use svgkit_text::clean_xml_text;
use tracing::trace;

use crate::definition::ElementDefinition;
use crate::gradient::{GradientKind, GradientNode};
use crate::node::{
    ClipGroupNode, ClipKind, GroupMode, GroupNode, ImageNode, Node, NodeKind, PlaceholderNode,
    ShapeKind, ShapeNode, SolidColorNode, TextLayoutMode, TextNode, TextRun, Units,
};

/// Turns [`ElementDefinition`]s into [`Node`]s.
///
/// Percentages in shape geometry resolve against the viewport the factory
/// was created with; `em` lengths against its font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeFactory {
    viewport_width: f32,
    viewport_height: f32,
    font_size: f32,
}

impl NodeFactory {
    pub fn new(viewport_width: f32, viewport_height: f32, font_size: f32) -> Self {
        Self {
            viewport_width,
            viewport_height,
            font_size,
        }
    }

    /// Build the node for one element. Group-like children stay pending.
    pub fn build(&self, definition: &ElementDefinition) -> Node {
        let kind = match definition.name.as_str() {
            "rect" | "circle" | "ellipse" | "line" | "polyline" | "polygon" | "path" => {
                NodeKind::Shape(self.shape(definition))
            }
            "g" | "svg" | "a" | "symbol" => NodeKind::Group(self.group(GroupMode::Normal, definition)),
            "defs" => NodeKind::Group(self.group(GroupMode::Definitions, definition)),
            "switch" => NodeKind::Group(self.group(GroupMode::Switch, definition)),
            "text" => NodeKind::Text(self.text(definition)),
            "image" => NodeKind::Image(self.image(definition)),
            "solidColor" => NodeKind::SolidColor(solid_color(definition)),
            "linearGradient" => {
                NodeKind::Gradient(GradientNode::from_definition(GradientKind::Linear, definition))
            }
            "radialGradient" => {
                NodeKind::Gradient(GradientNode::from_definition(GradientKind::Radial, definition))
            }
            "clipPath" => NodeKind::ClipGroup(self.clip_group(ClipKind::Clip, definition)),
            "mask" => NodeKind::ClipGroup(self.clip_group(ClipKind::Mask, definition)),
            "use" => return self.placeholder(definition),
            "style" => NodeKind::Style(ClassStyles::parse(definition.text.as_deref().unwrap_or(""))),
            other => {
                trace!(element = other, "unsupported element, building inert node");
                NodeKind::Inert
            }
        };
        Node::new(definition.name.clone(), definition.attributes.clone(), kind)
    }

    fn length(&self, definition: &ElementDefinition, key: &str, reference: f32) -> f32 {
        definition
            .attribute_text(key)
            .map(|v| parse_length(&v, reference, self.font_size))
            .unwrap_or(0.0)
    }

    fn x(&self, definition: &ElementDefinition, key: &str) -> f32 {
        self.length(definition, key, self.viewport_width)
    }

    fn y(&self, definition: &ElementDefinition, key: &str) -> f32 {
        self.length(definition, key, self.viewport_height)
    }

    fn shape(&self, definition: &ElementDefinition) -> ShapeNode {
        let (kind, geometry) = match definition.name.as_str() {
            "rect" => (ShapeKind::Rect, self.rect_path(definition)),
            "circle" => {
                let diagonal = (self.viewport_width.powi(2) + self.viewport_height.powi(2)).sqrt()
                    / std::f32::consts::SQRT_2;
                let r = self.length(definition, "r", diagonal);
                let center = Point::new(self.x(definition, "cx"), self.y(definition, "cy"));
                let path = if r > 0.0 { Path::ellipse(center, r, r) } else { Path::new() };
                (ShapeKind::Circle, path)
            }
            "ellipse" => {
                let (rx, ry) = (self.x(definition, "rx"), self.y(definition, "ry"));
                let center = Point::new(self.x(definition, "cx"), self.y(definition, "cy"));
                let path = if rx > 0.0 && ry > 0.0 {
                    Path::ellipse(center, rx, ry)
                } else {
                    Path::new()
                };
                (ShapeKind::Ellipse, path)
            }
            "line" => {
                let from = Point::new(self.x(definition, "x1"), self.y(definition, "y1"));
                let to = Point::new(self.x(definition, "x2"), self.y(definition, "y2"));
                (ShapeKind::Line, Path::polyline(&[from, to], false))
            }
            "polyline" | "polygon" => {
                let points = definition
                    .attribute_text("points")
                    .map(|p| parse_points(&p))
                    .unwrap_or_default();
                if definition.name == "polygon" {
                    (ShapeKind::Polygon, Path::polyline(&points, true))
                } else {
                    (ShapeKind::Polyline, Path::polyline(&points, false))
                }
            }
            _ => {
                let path = definition
                    .attribute_text("d")
                    .map(|d| parse_path_data(&d))
                    .unwrap_or_default();
                (ShapeKind::Path, path)
            }
        };

        let is_closed = matches!(
            kind,
            ShapeKind::Rect | ShapeKind::Circle | ShapeKind::Ellipse | ShapeKind::Polygon
        );
        ShapeNode {
            kind,
            geometry,
            is_closed,
            is_fillable: !matches!(kind, ShapeKind::Line | ShapeKind::Polyline),
        }
    }

    fn rect_path(&self, definition: &ElementDefinition) -> Path {
        let bounds = Rect::new(
            self.x(definition, "x"),
            self.y(definition, "y"),
            self.x(definition, "width"),
            self.y(definition, "height"),
        );
        if bounds.width <= 0.0 || bounds.height <= 0.0 {
            return Path::new();
        }
        let rx = definition.attribute_text("rx").map(|_| self.x(definition, "rx"));
        let ry = definition.attribute_text("ry").map(|_| self.y(definition, "ry"));
        let (rx, ry) = match (rx, ry) {
            (Some(rx), Some(ry)) => (rx, ry),
            (Some(r), None) | (None, Some(r)) => (r, r),
            (None, None) => (0.0, 0.0),
        };
        Path::rect(bounds, rx, ry)
    }

    fn group(&self, mode: GroupMode, definition: &ElementDefinition) -> GroupNode {
        GroupNode::new(mode, definition.children.clone())
    }

    fn clip_group(&self, kind: ClipKind, definition: &ElementDefinition) -> ClipGroupNode {
        let (key, default) = match kind {
            ClipKind::Clip => ("clipPathUnits", Units::UserSpaceOnUse),
            ClipKind::Mask => ("maskContentUnits", Units::UserSpaceOnUse),
        };
        ClipGroupNode {
            kind,
            units: Units::parse(definition.attribute_text(key).as_deref(), default),
            group: GroupNode::new(GroupMode::Normal, definition.children.clone()),
        }
    }

    fn text(&self, definition: &ElementDefinition) -> TextNode {
        let origin = Point::new(self.x(definition, "x"), self.y(definition, "y"));
        let mut runs = Vec::new();
        let mut layout_mode = TextLayoutMode::Inline;

        let preserve = |d: &ElementDefinition| d.attribute_text("xml:space").as_deref() == Some("preserve");
        self.push_run(definition, preserve(definition), false, &mut runs);
        for child in &definition.children {
            match child.name.as_str() {
                "tspan" => self.push_run(child, preserve(child) || preserve(definition), true, &mut runs),
                "textPath" => {
                    let target = ["href", "xlink:href"]
                        .iter()
                        .find_map(|key| child.attribute_text(key))
                        .and_then(|h| fragment_id(&h).map(str::to_string));
                    if let Some(target_id) = target {
                        let start_offset = child
                            .attribute_text("startOffset")
                            .and_then(|o| Length::parse(&o))
                            .unwrap_or(Length::ZERO);
                        layout_mode = TextLayoutMode::OnPath {
                            target_id,
                            start_offset,
                        };
                    }
                    self.push_run(child, preserve(child) || preserve(definition), true, &mut runs);
                    for grandchild in child.children.iter().filter(|c| c.name == "tspan") {
                        self.push_run(grandchild, preserve(grandchild) || preserve(definition), true, &mut runs);
                    }
                }
                _ => {}
            }
        }

        TextNode {
            origin,
            runs,
            layout_mode,
        }
    }

    fn push_run(&self, definition: &ElementDefinition, preserve: bool, positioned: bool, runs: &mut Vec<TextRun>) {
        let Some(raw) = definition.text.as_deref() else {
            return;
        };
        let text = clean_xml_text(raw, preserve);
        if text.is_empty() {
            return;
        }
        let optional = |key: &str, reference: f32| {
            definition
                .attribute_text(key)
                .map(|v| parse_length(&v, reference, self.font_size))
        };
        runs.push(TextRun {
            text,
            attributes: if positioned {
                definition.attributes.clone()
            } else {
                Default::default()
            },
            x: optional("x", self.viewport_width).filter(|_| positioned),
            y: optional("y", self.viewport_height).filter(|_| positioned),
            dx: optional("dx", self.viewport_width).unwrap_or(0.0),
            dy: optional("dy", self.viewport_height).unwrap_or(0.0),
        });
    }

    fn image(&self, definition: &ElementDefinition) -> ImageNode {
        ImageNode {
            source_ref: ["href", "xlink:href"]
                .iter()
                .find_map(|key| definition.attribute_text(key))
                .unwrap_or_default(),
            bounds: Rect::new(
                self.x(definition, "x"),
                self.y(definition, "y"),
                self.x(definition, "width"),
                self.y(definition, "height"),
            ),
            preserve_aspect_ratio: definition
                .attribute_text("preserveAspectRatio")
                .unwrap_or_else(|| "xMidYMid meet".to_string()),
        }
    }

    /// `use`: transform is the element's own followed by its `x`/`y` offset.
    fn placeholder(&self, definition: &ElementDefinition) -> Node {
        let offset = Point::new(self.x(definition, "x"), self.y(definition, "y"));
        let target_id = ["href", "xlink:href"]
            .iter()
            .find_map(|key| definition.attribute_text(key))
            .and_then(|h| fragment_id(&h).map(str::to_string))
            .unwrap_or_default();
        let node = Node::new(
            definition.name.clone(),
            definition.attributes.clone(),
            NodeKind::Placeholder(PlaceholderNode { target_id, offset }),
        );
        let transform = node.transform().translate(offset.x, offset.y);
        node.with_transform(transform)
    }
}

fn solid_color(definition: &ElementDefinition) -> SolidColorNode {
    let attrs = &definition.attributes;
    SolidColorNode {
        color_expr: text_for_style_attribute("solid-color", attrs, None, None)
            .unwrap_or_else(|| "black".to_string()),
        opacity: text_for_style_attribute("solid-opacity", attrs, None, None)
            .map(|o| parse_fraction(&o, 1.0))
            .unwrap_or(1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svgkit_geometry::Transform;

    fn factory() -> NodeFactory {
        NodeFactory::new(200.0, 100.0, 10.0)
    }

    fn shape(definition: ElementDefinition) -> ShapeNode {
        match factory().build(&definition).kind() {
            NodeKind::Shape(shape) => shape.clone(),
            other => panic!("expected shape, got {:?}", other),
        }
    }

    #[test]
    fn test_rect_with_percentages() {
        let rect = shape(
            ElementDefinition::new("rect")
                .attr("x", "10%")
                .attr("y", "1em")
                .attr("width", "50%")
                .attr("height", "20"),
        );
        assert_eq!(rect.kind, ShapeKind::Rect);
        assert!(rect.is_closed && rect.is_fillable);
        assert_eq!(rect.geometry.bounding_box(), Some(Rect::new(20.0, 10.0, 100.0, 20.0)));
    }

    #[test]
    fn test_degenerate_shapes_are_empty() {
        assert!(shape(ElementDefinition::new("rect").attr("width", "0").attr("height", "5"))
            .geometry
            .is_empty());
        assert!(shape(ElementDefinition::new("circle").attr("r", "-1")).geometry.is_empty());
        assert!(shape(ElementDefinition::new("path").attr("d", "")).geometry.is_empty());
    }

    #[test]
    fn test_line_and_polyline_are_not_fillable() {
        let line = shape(ElementDefinition::new("line").attr("x2", "10"));
        assert!(!line.is_fillable && !line.is_closed);
        let polyline = shape(ElementDefinition::new("polyline").attr("points", "0,0 10,0 10,10"));
        assert!(!polyline.is_fillable);
        let polygon = shape(ElementDefinition::new("polygon").attr("points", "0,0 10,0 10,10"));
        assert!(polygon.is_fillable && polygon.is_closed);
    }

    #[test]
    fn test_unknown_element_is_inert() {
        let node = factory().build(&ElementDefinition::new("foreignObject").attr("id", "x"));
        assert!(matches!(node.kind(), NodeKind::Inert));
        assert_eq!(node.id(), Some("x"));
    }

    #[test]
    fn test_use_folds_offset_into_transform() {
        let node = factory().build(
            &ElementDefinition::new("use")
                .attr("href", "#target")
                .attr("x", "5")
                .attr("y", "7")
                .attr("transform", "scale(2)"),
        );
        let placeholder = node.as_placeholder().unwrap();
        assert_eq!(placeholder.target_id, "target");
        assert_eq!(
            *node.transform(),
            Transform::from_scale(2.0, 2.0).translate(5.0, 7.0)
        );
        assert_eq!(node.transform().apply(Point::ZERO), Point::new(10.0, 14.0));
    }

    #[test]
    fn test_text_runs_and_text_path() {
        let definition = ElementDefinition::new("text")
            .attr("x", "3")
            .attr("y", "4")
            .text("  Hello ")
            .child(ElementDefinition::new("tspan").attr("fill", "red").attr("dx", "2").text("red"))
            .child(
                ElementDefinition::new("textPath")
                    .attr("xlink:href", "#curve")
                    .attr("startOffset", "25%")
                    .text("along"),
            );
        let node = factory().build(&definition);
        let NodeKind::Text(text) = node.kind() else {
            panic!("expected text");
        };
        assert_eq!(text.origin, Point::new(3.0, 4.0));
        let words: Vec<&str> = text.runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(words, vec!["Hello", "red", "along"]);
        assert_eq!(text.runs[1].dx, 2.0);
        assert_eq!(text.runs[1].attributes.get("fill").and_then(|v| v.as_str()), Some("red"));
        assert_eq!(
            text.layout_mode,
            TextLayoutMode::OnPath {
                target_id: "curve".into(),
                start_offset: Length::parse("25%").unwrap(),
            }
        );
    }

    #[test]
    fn test_clip_and_mask_groups() {
        let clip = factory().build(
            &ElementDefinition::new("clipPath")
                .attr("clipPathUnits", "objectBoundingBox")
                .child(ElementDefinition::new("rect")),
        );
        let clip = clip.as_clip_group().unwrap();
        assert_eq!(clip.kind, ClipKind::Clip);
        assert_eq!(clip.units, Units::ObjectBoundingBox);
        assert_eq!(clip.group.pending_definitions(), 1);

        let mask = factory().build(&ElementDefinition::new("mask"));
        assert_eq!(mask.as_clip_group().map(|m| m.kind), Some(ClipKind::Mask));
    }
}
