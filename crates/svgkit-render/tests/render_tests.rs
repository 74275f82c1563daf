//! End-to-end rendering tests: documents built from element trees, painted
//! into a recording display list.

use std::sync::Arc;

use svgkit_common::RenderConfig;
use svgkit_geometry::{Point, Rect};
use svgkit_render::{DisplayCommand, DisplayList, LineCap, RenderOptions, RenderReport, Renderer};
use svgkit_scene::{Document, DocumentContext, ElementDefinition, SpreadMethod};
use svgkit_style::Color;

const RED: Color = Color::from_rgb(255, 0, 0);
const BLUE: Color = Color::from_rgb(0, 0, 255);

fn rect(x: &str, y: &str, w: &str, h: &str) -> ElementDefinition {
    ElementDefinition::new("rect")
        .attr("x", x)
        .attr("y", y)
        .attr("width", w)
        .attr("height", h)
}

fn svg() -> ElementDefinition {
    ElementDefinition::new("svg")
}

fn build(root: ElementDefinition) -> Document {
    Document::from_definition(&root, RenderConfig::default()).unwrap()
}

fn render_with(doc: &Document, renderer: &Renderer) -> (DisplayList, RenderReport) {
    let mut list = DisplayList::new();
    let mut context = DocumentContext::new(doc);
    let report = renderer.render(doc, &mut list, &mut context);
    (list, report)
}

fn render(doc: &Document) -> (DisplayList, RenderReport) {
    render_with(doc, &Renderer::default())
}

fn fill_bounds(list: &DisplayList) -> Vec<Rect> {
    list.commands
        .iter()
        .filter_map(|c| match c {
            DisplayCommand::FillPath { path, .. } => path.bounding_box(),
            _ => None,
        })
        .collect()
}

fn approx_rect(a: Rect, b: Rect) -> bool {
    (a.x - b.x).abs() < 1e-3
        && (a.y - b.y).abs() < 1e-3
        && (a.width - b.width).abs() < 1e-3
        && (a.height - b.height).abs() < 1e-3
}

#[test]
fn test_solid_fill_in_document_order() {
    let doc = build(
        svg()
            .child(rect("0", "0", "10", "10").attr("fill", "red"))
            .child(rect("20", "0", "10", "10").attr("style", "fill: blue")),
    );
    let (list, report) = render(&doc);
    assert_eq!(list.fill_colors(), vec![RED, BLUE]);
    assert_eq!(report.leaves_drawn, 2);
    assert_eq!(report.unresolved_references, 0);
}

#[test]
fn test_transforms_compose_parent_first() {
    let doc = build(
        svg().child(
            ElementDefinition::new("g")
                .attr("transform", "translate(10,0)")
                .child(rect("0", "0", "5", "5").attr("transform", "scale(2)")),
        ),
    );
    let (list, _) = render(&doc);
    let bounds = fill_bounds(&list);
    assert_eq!(bounds.len(), 1);
    assert!(approx_rect(bounds[0], Rect::new(10.0, 0.0, 10.0, 10.0)));
}

#[test]
fn test_view_transform_as_base() {
    let doc = build(
        svg()
            .attr("viewBox", "0 0 10 10")
            .child(rect("0", "0", "10", "10")),
    );
    let renderer = Renderer::new(RenderOptions {
        base_transform: Some(doc.view_transform(100.0, 100.0)),
        ..Default::default()
    });
    let (list, _) = render_with(&doc, &renderer);
    assert!(approx_rect(fill_bounds(&list)[0], Rect::new(0.0, 0.0, 100.0, 100.0)));
}

#[test]
fn test_sibling_uses_render_the_same_target_twice() {
    let doc = build(
        svg()
            .child(ElementDefinition::new("defs").child(rect("0", "0", "10", "10").attr("id", "r")))
            .child(ElementDefinition::new("use").attr("href", "#r"))
            .child(ElementDefinition::new("use").attr("xlink:href", "#r").attr("x", "50")),
    );
    let (list, report) = render(&doc);
    let bounds = fill_bounds(&list);
    assert_eq!(bounds.len(), 2);
    assert!(approx_rect(bounds[0], Rect::new(0.0, 0.0, 10.0, 10.0)));
    assert!(approx_rect(bounds[1], Rect::new(50.0, 0.0, 10.0, 10.0)));
    assert_eq!(report.cycles, 0);
}

#[test]
fn test_use_passes_style_to_target() {
    let doc = build(
        svg()
            .child(ElementDefinition::new("defs").child(rect("0", "0", "10", "10").attr("id", "r")))
            .child(ElementDefinition::new("use").attr("href", "#r").attr("fill", "red")),
    );
    let (list, _) = render(&doc);
    assert_eq!(list.fill_colors(), vec![RED]);
}

#[test]
fn test_self_referencing_use_terminates() {
    let doc = build(
        svg().child(
            ElementDefinition::new("g")
                .attr("id", "loop")
                .child(rect("0", "0", "1", "1"))
                .child(ElementDefinition::new("use").attr("href", "#loop")),
        ),
    );
    let (list, report) = render(&doc);
    assert!(report.cycles >= 1);
    // Once directly, once through the reference before the cycle is cut.
    assert_eq!(list.fill_colors().len(), 2);
}

#[test]
fn test_symbol_only_through_use() {
    let doc = build(
        svg()
            .child(
                ElementDefinition::new("symbol")
                    .attr("id", "s")
                    .child(rect("0", "0", "10", "10")),
            )
            .child(ElementDefinition::new("use").attr("href", "#s")),
    );
    let (list, _) = render(&doc);
    assert_eq!(list.fill_colors().len(), 1);
}

#[test]
fn test_clip_path_wraps_subtree() {
    let doc = build(
        svg()
            .child(
                ElementDefinition::new("clipPath")
                    .attr("id", "c")
                    .child(rect("0", "0", "5", "5")),
            )
            .child(rect("0", "0", "10", "10").attr("clip-path", "url(#c)")),
    );
    let (list, _) = render(&doc);
    assert_eq!(list.commands.len(), 4);
    assert!(matches!(list.commands[0], DisplayCommand::Save));
    match &list.commands[1] {
        DisplayCommand::Clip { path, .. } => {
            assert!(approx_rect(path.bounding_box().unwrap(), Rect::new(0.0, 0.0, 5.0, 5.0)));
        }
        other => panic!("expected clip, got {other:?}"),
    }
    assert!(matches!(list.commands[2], DisplayCommand::FillPath { .. }));
    assert!(matches!(list.commands[3], DisplayCommand::Restore));
}

#[test]
fn test_literal_clip_path_under_transform() {
    let doc = build(
        svg().child(
            rect("0", "0", "10", "10")
                .attr("transform", "translate(5,5)")
                .attr("style", "clip-path: path('M0,0 H4 V4 H0 Z')"),
        ),
    );
    let (list, _) = render(&doc);
    let clip = list.commands.iter().find_map(|c| match c {
        DisplayCommand::Clip { path, .. } => path.bounding_box(),
        _ => None,
    });
    assert!(approx_rect(clip.unwrap(), Rect::new(5.0, 5.0, 4.0, 4.0)));
}

#[test]
fn test_bounding_box_clip_units() {
    let doc = build(
        svg()
            .child(
                ElementDefinition::new("clipPath")
                    .attr("id", "c")
                    .attr("clipPathUnits", "objectBoundingBox")
                    .child(rect("0", "0", "0.5", "1")),
            )
            .child(rect("10", "10", "20", "20").attr("clip-path", "url(#c)")),
    );
    let (list, _) = render(&doc);
    let clip = list.commands.iter().find_map(|c| match c {
        DisplayCommand::Clip { path, .. } => path.bounding_box(),
        _ => None,
    });
    assert!(approx_rect(clip.unwrap(), Rect::new(10.0, 10.0, 10.0, 20.0)));
}

#[test]
fn test_linear_gradient_fill() {
    let doc = build(
        svg()
            .child(
                ElementDefinition::new("defs").child(
                    ElementDefinition::new("linearGradient")
                        .attr("id", "g")
                        .attr("spreadMethod", "reflect")
                        .child(ElementDefinition::new("stop").attr("offset", "0").attr("stop-color", "red"))
                        .child(ElementDefinition::new("stop").attr("offset", "1").attr("stop-color", "blue")),
                ),
            )
            .child(rect("10", "10", "20", "40").attr("fill", "url(#g)")),
    );
    let (list, report) = render(&doc);
    assert_eq!(report.unresolved_references, 0);

    let painted: Vec<_> = list.paint_commands().collect();
    assert_eq!(painted.len(), 1);
    match painted[0] {
        DisplayCommand::LinearGradient {
            stops,
            start,
            end,
            spread,
            transform,
            ..
        } => {
            assert_eq!(stops.len(), 2);
            assert_eq!(stops[0].color, RED);
            assert_eq!(*spread, SpreadMethod::Reflect);
            assert!(transform.apply(*start).approx_eq(Point::new(10.0, 10.0), 1e-3));
            assert!(transform.apply(*end).approx_eq(Point::new(30.0, 10.0), 1e-3));
        }
        other => panic!("expected a linear gradient, got {other:?}"),
    }
    assert!(matches!(list.commands.first(), Some(DisplayCommand::Save)));
    assert!(matches!(list.commands.last(), Some(DisplayCommand::Restore)));
}

#[test]
fn test_missing_paint_uses_fallback() {
    let doc = build(
        svg()
            .child(rect("0", "0", "10", "10").attr("fill", "url(#nothing) red"))
            .child(rect("0", "0", "10", "10").attr("fill", "url(#nothing)")),
    );
    let (list, report) = render(&doc);
    assert_eq!(list.fill_colors(), vec![RED]);
    assert_eq!(report.unresolved_references, 2);
}

#[test]
fn test_solid_color_paint_server() {
    let doc = build(
        svg()
            .child(
                ElementDefinition::new("solidColor")
                    .attr("id", "sc")
                    .attr("solid-color", "blue")
                    .attr("solid-opacity", "0.5"),
            )
            .child(rect("0", "0", "10", "10").attr("fill", "url(#sc)")),
    );
    let (list, _) = render(&doc);
    assert_eq!(list.fill_colors(), vec![Color::new(0, 0, 255, 0.5)]);
}

#[test]
fn test_stroke_width_scales_unless_non_scaling() {
    let doc = build(
        svg()
            .child(
                rect("0", "0", "10", "10")
                    .attr("fill", "none")
                    .attr("stroke", "blue")
                    .attr("stroke-width", "2")
                    .attr("stroke-linecap", "round")
                    .attr("stroke-dasharray", "5")
                    .attr("transform", "scale(2)"),
            )
            .child(
                rect("0", "0", "10", "10")
                    .attr("fill", "none")
                    .attr("stroke", "blue")
                    .attr("stroke-width", "2")
                    .attr("vector-effect", "non-scaling-stroke")
                    .attr("transform", "scale(2)"),
            ),
    );
    let (list, _) = render(&doc);
    let states: Vec<_> = list
        .commands
        .iter()
        .filter_map(|c| match c {
            DisplayCommand::StrokePath { state, .. } => Some(state.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(states.len(), 2);
    assert!((states[0].line_width - 4.0).abs() < 1e-4);
    assert_eq!(states[0].stroke_color, BLUE);
    assert_eq!(states[0].line_cap, LineCap::Round);
    assert_eq!(states[0].dash, vec![10.0, 10.0]);
    assert!((states[1].line_width - 2.0).abs() < 1e-4);
    assert!(states[1].dash.is_empty());
}

#[test]
fn test_color_attribute_scopes_current_color() {
    let doc = build(
        svg()
            .child(
                ElementDefinition::new("g")
                    .attr("color", "blue")
                    .child(rect("0", "0", "10", "10").attr("fill", "currentColor")),
            )
            .child(rect("0", "0", "10", "10").attr("fill", "currentColor")),
    );
    let (list, _) = render(&doc);
    assert_eq!(list.fill_colors(), vec![BLUE, Color::BLACK]);
}

#[test]
fn test_switch_renders_first_matching_child() {
    let doc = build(
        svg().child(
            ElementDefinition::new("switch")
                .child(rect("0", "0", "1", "1").attr("systemLanguage", "fr").attr("fill", "red"))
                .child(rect("0", "0", "1", "1").attr("systemLanguage", "en-US, de").attr("fill", "blue"))
                .child(rect("0", "0", "1", "1").attr("fill", "green")),
        ),
    );
    let (list, _) = render(&doc);
    assert_eq!(list.fill_colors(), vec![BLUE]);

    let mut french = DisplayList::new();
    let mut context = DocumentContext::new(&doc).with_iso_language("fr");
    Renderer::default().render(&doc, &mut french, &mut context);
    assert_eq!(french.fill_colors(), vec![RED]);
}

#[test]
fn test_hidden_leaves_are_not_painted() {
    let doc = build(
        svg().child(
            ElementDefinition::new("g")
                .attr("visibility", "hidden")
                .child(rect("0", "0", "1", "1"))
                .child(rect("0", "0", "1", "1").attr("visibility", "visible")),
        ),
    );
    let (list, report) = render(&doc);
    assert_eq!(list.fill_colors().len(), 1);
    assert_eq!(report.leaves_drawn, 1);
}

#[test]
fn test_class_rules_apply() {
    let doc = build(
        svg()
            .child(ElementDefinition::new("style").text(".warm { fill: red } rect.cool { fill: blue }"))
            .child(rect("0", "0", "1", "1").attr("class", "warm"))
            .child(rect("0", "0", "1", "1").attr("class", "cool"))
            .child(rect("0", "0", "1", "1").attr("class", "warm").attr("fill", "blue")),
    );
    let (list, _) = render(&doc);
    assert_eq!(list.fill_colors(), vec![RED, BLUE, BLUE]);
}

#[test]
fn test_text_produces_glyph_runs() {
    let doc = build(
        svg().child(
            ElementDefinition::new("text")
                .attr("x", "0")
                .attr("y", "20")
                .attr("fill", "red")
                .attr("stroke", "blue")
                .text("hi"),
        ),
    );
    let (list, report) = render(&doc);
    let runs: Vec<_> = list
        .commands
        .iter()
        .filter_map(|c| match c {
            DisplayCommand::Glyphs { run, color, .. } => Some((run.glyphs.len(), run.mode, *color)),
            _ => None,
        })
        .collect();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].0, 2);
    assert_eq!(runs[0].2, RED);
    assert_eq!(runs[1].2, BLUE);
    assert_eq!(report.shaping_failures, 0);
}

#[test]
fn test_text_on_missing_path_is_unresolved() {
    let doc = build(
        svg().child(
            ElementDefinition::new("text").child(ElementDefinition::new("textPath").attr("href", "#nope").text("x")),
        ),
    );
    let (list, report) = render(&doc);
    assert_eq!(report.unresolved_references, 1);
    assert_eq!(list.paint_commands().count(), 0);
}

#[test]
fn test_image_is_forwarded() {
    let doc = build(
        svg().child(
            ElementDefinition::new("image")
                .attr("href", "photo.png")
                .attr("x", "5")
                .attr("y", "5")
                .attr("width", "20")
                .attr("height", "10"),
        ),
    );
    let (list, _) = render(&doc);
    match list.paint_commands().next() {
        Some(DisplayCommand::Image { source_ref, bounds, .. }) => {
            assert_eq!(source_ref, "photo.png");
            assert_eq!(*bounds, Rect::new(5.0, 5.0, 20.0, 10.0));
        }
        other => panic!("expected image, got {other:?}"),
    };
}

#[test]
fn test_render_node_subtree() {
    let doc = build(
        svg()
            .child(rect("0", "0", "1", "1").attr("fill", "red"))
            .child(
                ElementDefinition::new("g")
                    .attr("id", "part")
                    .child(rect("0", "0", "1", "1").attr("fill", "blue")),
            ),
    );
    let part = doc.object_named("part").unwrap();
    let mut list = DisplayList::new();
    let mut context = DocumentContext::new(&doc);
    let report = Renderer::default().render_node(&doc, &part, &mut list, &mut context);
    assert_eq!(list.fill_colors(), vec![BLUE]);
    assert_eq!(report.nodes_visited, 2);
}

#[test]
fn test_document_renders_from_many_threads() {
    let doc = Arc::new(build(
        svg().child(ElementDefinition::new("g").child(rect("0", "0", "1", "1").attr("fill", "red"))),
    ));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let doc = Arc::clone(&doc);
            std::thread::spawn(move || render(&doc).0.fill_colors())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), vec![RED]);
    }
}
