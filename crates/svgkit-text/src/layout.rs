//! Glyph placement: baseline runs and text on a path.

use svgkit_geometry::{point_at_distance_with_step, total_path_length_with_step, Path, Point, Rect, Transform, Vector};
use svgkit_style::{parse_length, text_for_style_attribute, AttributeMap};
use tracing::trace;

use crate::shaping::{FontDescriptor, TextError, TextShaper};

/// A positioned glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRecord {
    pub glyph_id: u32,
    /// Distance of the glyph's start from the start of its run.
    pub offset: f32,
    /// Advance width.
    pub width: f32,
    /// Rotation in radians.
    pub rotation: f32,
    /// Axis-aligned bounds of the rotated glyph cell.
    pub bounding_box: Rect,
    /// Baseline origin of the glyph.
    pub render_point: Point,
    /// Set for glyphs that ran off the end of a text path.
    pub not_rendering: bool,
    /// Cell extent above the baseline.
    pub ascent: f32,
    /// Cell extent below the baseline.
    pub descent: f32,
}

impl GlyphRecord {
    fn cell(&self) -> Rect {
        Rect::new(0.0, -self.ascent, self.width, self.ascent + self.descent)
    }

    /// Re-derive the bounding box from the render point and rotation.
    fn update_bounds(&mut self) {
        let placement = Transform::from_translate(self.render_point.x, self.render_point.y)
            .rotate(self.rotation);
        self.bounding_box = placement.apply_rect(&self.cell());
    }
}

/// Lay out `text` left to right along a baseline starting at `origin`.
///
/// `style` supplies the font (over `base`) plus `letter-spacing` and
/// `word-spacing`, which are added after every glyph and every space.
pub fn layout_run(
    text: &str,
    style: &AttributeMap,
    base: &FontDescriptor,
    shaper: &dyn TextShaper,
    origin: Point,
) -> Result<Vec<GlyphRecord>, TextError> {
    let font = FontDescriptor::from_style(style, base);
    let shaped = shaper.shape(text, &font)?;
    let metrics = shaped.metrics;

    let spacing = |name| {
        text_for_style_attribute(name, style, None, None)
            .filter(|v| v != "normal")
            .map(|v| parse_length(&v, font.size, font.size))
            .unwrap_or(0.0)
    };
    let letter_spacing = spacing("letter-spacing");
    let word_spacing = spacing("word-spacing");

    let mut pen = 0.0f32;
    let mut glyphs = Vec::with_capacity(shaped.glyphs.len());
    for glyph in &shaped.glyphs {
        let is_space = text
            .get(glyph.cluster as usize..)
            .and_then(|rest| rest.chars().next())
            .is_some_and(char::is_whitespace);

        let mut record = GlyphRecord {
            glyph_id: glyph.glyph_id,
            offset: pen,
            width: glyph.advance,
            rotation: 0.0,
            bounding_box: Rect::ZERO,
            render_point: Point::new(
                origin.x + pen + glyph.x_offset,
                origin.y + glyph.y_offset,
            ),
            not_rendering: false,
            ascent: metrics.ascent,
            descent: metrics.descent,
        };
        record.update_bounds();
        glyphs.push(record);

        pen += glyph.advance + letter_spacing;
        if is_space {
            pen += word_spacing;
        }
    }

    trace!(glyphs = glyphs.len(), width = pen, "laid out text run");
    Ok(glyphs)
}

/// Move glyphs onto `path`.
///
/// Each glyph's render point becomes the path point at `start_offset` plus
/// its run offset, and its rotation the tangent angle there. Glyphs whose
/// offset lies beyond the end of the path are marked `not_rendering` and
/// keep their previous placement.
///
/// `curve_step` is the subdivision step used to measure curved segments;
/// `None` picks one per curve.
pub fn position_along_path(
    glyphs: &mut [GlyphRecord],
    path: &Path,
    start_offset: f32,
    curve_step: Option<f32>,
) {
    let total = total_path_length_with_step(path, curve_step);
    for glyph in glyphs.iter_mut() {
        let distance = start_offset + glyph.offset;
        if distance > total {
            glyph.not_rendering = true;
            continue;
        }
        let (point, tangent): (Point, Vector) = point_at_distance_with_step(distance, path, curve_step);
        glyph.render_point = point;
        glyph.rotation = tangent.angle();
        glyph.not_rendering = false;
        glyph.update_bounds();
    }
}

/// Union of the bounds of every rendering glyph.
pub fn bounding_box_for_glyphs(glyphs: &[GlyphRecord]) -> Option<Rect> {
    glyphs
        .iter()
        .filter(|g| !g.not_rendering)
        .map(|g| g.bounding_box)
        .reduce(|a, b| a.union(&b))
}

/// Offset every glyph by `delta` (used for `text-anchor`).
pub fn translate_glyphs(glyphs: &mut [GlyphRecord], delta: Vector) {
    for glyph in glyphs.iter_mut() {
        glyph.render_point = glyph.render_point + delta;
        glyph.update_bounds();
    }
}

/// Total advance of a run, the end of its last glyph.
pub fn run_advance(glyphs: &[GlyphRecord]) -> f32 {
    glyphs.last().map(|g| g.offset + g.width).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaping::FixedAdvanceShaper;
    use svgkit_style::attribute_map;

    fn run(text: &str, style: &AttributeMap) -> Vec<GlyphRecord> {
        layout_run(
            text,
            style,
            &FontDescriptor::new("Helvetica", 10.0),
            &FixedAdvanceShaper::default(),
            Point::new(5.0, 20.0),
        )
        .unwrap()
    }

    #[test]
    fn test_layout_run_baseline_positions() {
        let glyphs = run("abc", &AttributeMap::new());
        let xs: Vec<f32> = glyphs.iter().map(|g| g.render_point.x).collect();
        assert_eq!(xs, vec![5.0, 11.0, 17.0]);
        assert!(glyphs.iter().all(|g| g.render_point.y == 20.0));
        assert_eq!(glyphs[1].offset, 6.0);
        assert_eq!(glyphs[0].bounding_box, Rect::new(5.0, 12.0, 6.0, 10.0));
    }

    #[test]
    fn test_letter_and_word_spacing() {
        let style = attribute_map([("letter-spacing", "2"), ("word-spacing", "10")]);
        let glyphs = run("a b", &style);
        let offsets: Vec<f32> = glyphs.iter().map(|g| g.offset).collect();
        assert_eq!(offsets, vec![0.0, 8.0, 26.0]);
    }

    #[test]
    fn test_on_path_marks_overflow_not_rendering() {
        let path = Path::polyline(&[Point::new(0.0, 0.0), Point::new(100.0, 0.0)], false);
        let mut glyphs = run("ABCDEFGHIJKLMNOPQRSTU", &AttributeMap::new());
        position_along_path(&mut glyphs, &path, 0.0, None);

        let rendering = glyphs.iter().filter(|g| !g.not_rendering).count();
        // 6-unit advances: offsets 0..=96 fit on a 100-unit path.
        assert_eq!(rendering, 17);
        assert_eq!(glyphs.len(), 21);
        assert!(glyphs[0].render_point.approx_eq(Point::new(0.0, 0.0), 1e-4));
        assert!(glyphs[16].render_point.approx_eq(Point::new(96.0, 0.0), 1e-3));
    }

    #[test]
    fn test_on_path_rotation_follows_tangent() {
        let path = Path::polyline(&[Point::new(0.0, 0.0), Point::new(0.0, 50.0)], false);
        let mut glyphs = run("ab", &AttributeMap::new());
        position_along_path(&mut glyphs, &path, 10.0, None);
        assert!((glyphs[0].rotation - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert!(glyphs[1].render_point.approx_eq(Point::new(0.0, 16.0), 1e-4));
    }

    #[test]
    fn test_bounding_box_skips_non_rendering() {
        let mut glyphs = run("ab", &AttributeMap::new());
        assert_eq!(
            bounding_box_for_glyphs(&glyphs),
            Some(Rect::new(5.0, 12.0, 12.0, 10.0))
        );
        glyphs[1].not_rendering = true;
        assert_eq!(
            bounding_box_for_glyphs(&glyphs),
            Some(Rect::new(5.0, 12.0, 6.0, 10.0))
        );
        glyphs[0].not_rendering = true;
        assert_eq!(bounding_box_for_glyphs(&glyphs), None);
    }
}
