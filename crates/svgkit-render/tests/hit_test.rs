//! Hit-testing against painted geometry.

use svgkit_common::RenderConfig;
use svgkit_geometry::Point;
use svgkit_render::Renderer;
use svgkit_scene::{Document, DocumentContext, ElementDefinition};

fn rect(x: &str, y: &str, w: &str, h: &str) -> ElementDefinition {
    ElementDefinition::new("rect")
        .attr("x", x)
        .attr("y", y)
        .attr("width", w)
        .attr("height", h)
}

fn hit(root: ElementDefinition, x: f32, y: f32) -> Option<String> {
    let doc = Document::from_definition(&root, RenderConfig::default()).unwrap();
    let mut context = DocumentContext::new(&doc);
    Renderer::default()
        .hit_test(&doc, Point::new(x, y), &mut context)
        .map(|node| node.id().unwrap_or(node.name()).to_string())
}

#[test]
fn test_empty_document_never_hits() {
    assert_eq!(hit(ElementDefinition::new("svg"), 10.0, 10.0), None);
}

#[test]
fn test_centroid_hits_rect() {
    let root = ElementDefinition::new("svg").child(rect("10", "10", "20", "20").attr("id", "r"));
    assert_eq!(hit(root.clone(), 20.0, 20.0).as_deref(), Some("r"));
    assert_eq!(hit(root, 40.0, 40.0), None);
}

#[test]
fn test_groups_never_match() {
    let root = ElementDefinition::new("svg").child(
        ElementDefinition::new("g")
            .attr("id", "group")
            .child(rect("0", "0", "10", "10").attr("id", "leaf")),
    );
    assert_eq!(hit(root, 5.0, 5.0).as_deref(), Some("leaf"));
}

#[test]
fn test_hit_through_transform() {
    let root = ElementDefinition::new("svg").child(
        ElementDefinition::new("g")
            .attr("transform", "translate(100,100) scale(2)")
            .child(rect("0", "0", "10", "10").attr("id", "moved")),
    );
    assert_eq!(hit(root.clone(), 115.0, 115.0).as_deref(), Some("moved"));
    assert_eq!(hit(root, 5.0, 5.0), None);
}

#[test]
fn test_unpainted_fill_is_transparent_to_hits() {
    let root = ElementDefinition::new("svg")
        .child(rect("0", "0", "10", "10").attr("id", "below"))
        .child(rect("0", "0", "10", "10").attr("id", "hollow").attr("fill", "none"));
    assert_eq!(hit(root, 5.0, 5.0).as_deref(), Some("below"));
}

#[test]
fn test_stroke_hits_use_stroke_width() {
    let root = ElementDefinition::new("svg").child(
        ElementDefinition::new("line")
            .attr("id", "l")
            .attr("x1", "0")
            .attr("y1", "0")
            .attr("x2", "100")
            .attr("y2", "0")
            .attr("stroke", "black")
            .attr("stroke-width", "4"),
    );
    assert_eq!(hit(root.clone(), 50.0, 1.5).as_deref(), Some("l"));
    assert_eq!(hit(root, 50.0, 10.0), None);
}

#[test]
fn test_clip_limits_hits() {
    let root = ElementDefinition::new("svg")
        .child(
            ElementDefinition::new("clipPath")
                .attr("id", "c")
                .child(rect("0", "0", "10", "10")),
        )
        .child(rect("0", "0", "100", "100").attr("id", "clipped").attr("clip-path", "url(#c)"));
    assert_eq!(hit(root.clone(), 5.0, 5.0).as_deref(), Some("clipped"));
    assert_eq!(hit(root, 50.0, 50.0), None);
}

#[test]
fn test_hidden_and_undisplayed_leaves_are_skipped() {
    let root = ElementDefinition::new("svg")
        .child(rect("0", "0", "10", "10").attr("id", "visible"))
        .child(rect("0", "0", "10", "10").attr("visibility", "hidden"))
        .child(rect("0", "0", "10", "10").attr("display", "none"));
    assert_eq!(hit(root, 5.0, 5.0).as_deref(), Some("visible"));
}

#[test]
fn test_hit_through_use() {
    let root = ElementDefinition::new("svg")
        .child(ElementDefinition::new("defs").child(rect("0", "0", "10", "10").attr("id", "shape")))
        .child(ElementDefinition::new("use").attr("href", "#shape").attr("x", "50"));
    assert_eq!(hit(root.clone(), 55.0, 5.0).as_deref(), Some("shape"));
    assert_eq!(hit(root, 5.0, 5.0), None);
}
