//! Laying out text nodes into styled glyph runs.

use svgkit_common::SvgKitError;
use svgkit_geometry::{total_path_length_with_step, Path, Point};
use svgkit_scene::{SvgContext, TextLayoutMode, TextNode};
use svgkit_style::{merge_style_attributes, presentation_attributes, AttributeMap, LengthUnit};
use svgkit_text::{layout_run, position_along_path, run_advance, translate_glyphs, FontDescriptor, GlyphRecord};
use tracing::warn;

use crate::paint::style_text;

/// Glyphs of one text run with the style they are painted with.
#[derive(Debug, Clone)]
pub(crate) struct StyledRun {
    pub style: AttributeMap,
    pub font: FontDescriptor,
    pub glyphs: Vec<GlyphRecord>,
}

#[derive(Debug, Default)]
pub(crate) struct TextLayout {
    pub runs: Vec<StyledRun>,
    pub shaping_failures: usize,
    /// Set when the referenced text path does not exist.
    pub missing_path: bool,
}

/// Lay out every run of `text` under the element style `style`.
pub(crate) fn layout_text(text: &TextNode, style: &AttributeMap, context: &dyn SvgContext) -> TextLayout {
    let mut layout = TextLayout::default();
    let base = context.font().clone();
    let start = match &text.layout_mode {
        TextLayoutMode::Inline => text.origin,
        TextLayoutMode::OnPath { .. } => Point::ZERO,
    };

    let mut pen = start;
    for run in &text.runs {
        let run_style = if run.attributes.is_empty() {
            style.clone()
        } else {
            let own = presentation_attributes(&run.attributes, Some("tspan"), context.class_styles());
            merge_style_attributes(style, &own)
        };
        if let Some(x) = run.x {
            pen.x = x;
        }
        if let Some(y) = run.y {
            pen.y = y;
        }
        pen = pen + Point::new(run.dx, run.dy);

        match layout_run(&run.text, &run_style, &base, context.text_shaper(), pen) {
            Ok(mut glyphs) => {
                // Offsets continue across runs so on-path placement is cumulative.
                let run_start = pen.x - start.x;
                for glyph in &mut glyphs {
                    glyph.offset += run_start;
                }
                pen.x += run_advance(&glyphs);
                layout.runs.push(StyledRun {
                    font: FontDescriptor::from_style(&run_style, &base),
                    style: run_style,
                    glyphs,
                });
            }
            Err(err) => {
                let err = SvgKitError::from(err);
                warn!(
                    error = %err,
                    category = err.category(),
                    cause = ?std::error::Error::source(&err).map(|e| e.to_string()),
                    "run skipped"
                );
                layout.shaping_failures += 1;
            }
        }
    }

    let advance = pen.x - start.x;
    let anchor_shift = match style_text(style, "text-anchor").as_deref() {
        Some("middle") => -advance / 2.0,
        Some("end") => -advance,
        _ => 0.0,
    };

    match &text.layout_mode {
        TextLayoutMode::Inline => {
            if anchor_shift != 0.0 {
                for run in &mut layout.runs {
                    translate_glyphs(&mut run.glyphs, Point::new(anchor_shift, 0.0));
                }
            }
        }
        TextLayoutMode::OnPath { target_id, start_offset } => {
            let Some(path) = text_path(target_id, context) else {
                layout.missing_path = true;
                layout.runs.clear();
                return layout;
            };
            let step = context.curve_step();
            let offset = match start_offset.unit {
                LengthUnit::Percent => start_offset.value / 100.0 * total_path_length_with_step(&path, step),
                _ => start_offset.to_user_units(0.0, base.size),
            };
            for run in &mut layout.runs {
                position_along_path(&mut run.glyphs, &path, offset + anchor_shift, step);
            }
        }
    }
    layout
}

/// Geometry of the shape a `textPath` refers to, in its parent's space.
fn text_path(id: &str, context: &dyn SvgContext) -> Option<Path> {
    let node = context.object_named(id)?;
    let shape = node.as_shape()?;
    Some(shape.geometry.transformed(node.transform()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use svgkit_common::config::FontDefaults;
    use svgkit_common::RenderConfig;
    use svgkit_scene::{Document, DocumentContext, ElementDefinition, NodeKind};
    use svgkit_text::{ShapedText, TextError, TextShaper};

    fn document(text: ElementDefinition) -> Document {
        let config = RenderConfig {
            font: FontDefaults {
                family: "Helvetica".into(),
                size: 10.0,
            },
            ..Default::default()
        };
        let root = ElementDefinition::new("svg")
            .child(ElementDefinition::new("path").attr("id", "line").attr("d", "M0,50 H100"))
            .child(text.attr("id", "t"));
        Document::from_definition(&root, config).unwrap()
    }

    fn layout(doc: &Document) -> TextLayout {
        let context = DocumentContext::new(doc);
        let node = doc.object_named("t").unwrap();
        let NodeKind::Text(text) = node.kind() else {
            panic!("expected text node");
        };
        layout_text(text, &AttributeMap::new(), &context)
    }

    fn xs(run: &StyledRun) -> Vec<f32> {
        run.glyphs.iter().map(|g| g.render_point.x).collect()
    }

    #[test]
    fn test_inline_runs_continue_the_pen() {
        let doc = document(
            ElementDefinition::new("text")
                .attr("x", "10")
                .attr("y", "20")
                .text("ab")
                .child(ElementDefinition::new("tspan").attr("font-size", "20").text("c")),
        );
        let layout = layout(&doc);
        assert_eq!(layout.runs.len(), 2);
        assert_eq!(xs(&layout.runs[0]), vec![10.0, 16.0]);
        assert_eq!(xs(&layout.runs[1]), vec![22.0]);
        assert_eq!(layout.runs[1].font.size, 20.0);
    }

    #[test]
    fn test_text_anchor_end() {
        let doc = document(ElementDefinition::new("text").attr("x", "50").text("abcd"));
        let context = DocumentContext::new(&doc);
        let node = doc.object_named("t").unwrap();
        let NodeKind::Text(text) = node.kind() else {
            panic!("expected text node");
        };
        let style = svgkit_style::attribute_map([("text-anchor", "end")]);
        let layout = layout_text(text, &style, &context);
        assert_eq!(xs(&layout.runs[0]), vec![26.0, 32.0, 38.0, 44.0]);
    }

    #[test]
    fn test_text_on_path() {
        let doc = document(
            ElementDefinition::new("text").child(
                ElementDefinition::new("textPath")
                    .attr("href", "#line")
                    .attr("startOffset", "10%")
                    .text("abc"),
            ),
        );
        let layout = layout(&doc);
        let points: Vec<Point> = layout.runs[0].glyphs.iter().map(|g| g.render_point).collect();
        assert!(points[0].approx_eq(Point::new(10.0, 50.0), 1e-3));
        assert!(points[2].approx_eq(Point::new(22.0, 50.0), 1e-3));
    }

    fn glyphs_on_curve(curve_step: Option<f32>) -> Vec<Point> {
        let config = RenderConfig {
            curve_step,
            font: FontDefaults {
                family: "Helvetica".into(),
                size: 10.0,
            },
            ..Default::default()
        };
        let root = ElementDefinition::new("svg")
            .child(
                ElementDefinition::new("path")
                    .attr("id", "arc")
                    .attr("d", "M100,0 C100,55.23 55.23,100 0,100"),
            )
            .child(
                ElementDefinition::new("text")
                    .attr("id", "t")
                    .child(ElementDefinition::new("textPath").attr("href", "#arc").text("abcdefg")),
            );
        let doc = Document::from_definition(&root, config).unwrap();
        layout(&doc).runs[0].glyphs.iter().map(|g| g.render_point).collect()
    }

    #[test]
    fn test_coarse_curve_step_moves_glyphs_on_path() {
        let fine = glyphs_on_curve(None);
        let coarse = glyphs_on_curve(Some(0.5));
        assert_eq!(fine.len(), 7);
        assert!(fine[0].approx_eq(Point::new(100.0, 0.0), 1e-3));
        assert!(coarse[0].approx_eq(Point::new(100.0, 0.0), 1e-3));
        // Two chords underestimate the arc, so the same offset lands further along.
        assert!(!coarse[6].approx_eq(fine[6], 0.1));
        assert!(coarse[6].y > fine[6].y);
    }

    struct NoFonts;

    impl TextShaper for NoFonts {
        fn shape(&self, _text: &str, font: &FontDescriptor) -> Result<ShapedText, TextError> {
            Err(TextError::FontNotFound(font.family.clone()))
        }
    }

    #[test]
    fn test_shaping_failure_skips_run() {
        let doc = document(ElementDefinition::new("text").attr("x", "5").text("abc"));
        let context = DocumentContext::new(&doc).with_shaper(Box::new(NoFonts));
        let node = doc.object_named("t").unwrap();
        let NodeKind::Text(text) = node.kind() else {
            panic!("expected text node");
        };
        let layout = layout_text(text, &AttributeMap::new(), &context);
        assert!(layout.runs.is_empty());
        assert_eq!(layout.shaping_failures, 1);
    }

    #[test]
    fn test_missing_text_path() {
        let doc = document(
            ElementDefinition::new("text").child(ElementDefinition::new("textPath").attr("href", "#gone").text("abc")),
        );
        let layout = layout(&doc);
        assert!(layout.missing_path);
        assert!(layout.runs.is_empty());
    }
}
