//! The drawing sink capability the renderer paints into.

use svgkit_geometry::{FillRule, Path, Point, Rect, Transform};
use svgkit_scene::{ResolvedStop, SpreadMethod};
use svgkit_style::Color;
use svgkit_text::{FontDescriptor, GlyphRecord};

/// Line cap style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl LineCap {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "round" => LineCap::Round,
            "square" => LineCap::Square,
            _ => LineCap::Butt,
        }
    }
}

/// Line join style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl LineJoin {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "round" => LineJoin::Round,
            "bevel" => LineJoin::Bevel,
            _ => LineJoin::Miter,
        }
    }
}

/// `mix-blend-mode` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl BlendMode {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "multiply" => BlendMode::Multiply,
            "screen" => BlendMode::Screen,
            "overlay" => BlendMode::Overlay,
            "darken" => BlendMode::Darken,
            "lighten" => BlendMode::Lighten,
            "color-dodge" => BlendMode::ColorDodge,
            "color-burn" => BlendMode::ColorBurn,
            "hard-light" => BlendMode::HardLight,
            "soft-light" => BlendMode::SoftLight,
            "difference" => BlendMode::Difference,
            "exclusion" => BlendMode::Exclusion,
            "hue" => BlendMode::Hue,
            "saturation" => BlendMode::Saturation,
            "color" => BlendMode::Color,
            "luminosity" => BlendMode::Luminosity,
            _ => BlendMode::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDrawMode {
    Fill,
    Stroke,
}

/// Glyphs to draw with the current fill or stroke color.
///
/// Glyph positions are in the text element's user space; `transform` maps
/// them to device space. Glyphs marked not rendering are already removed.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRun {
    pub font: FontDescriptor,
    pub glyphs: Vec<GlyphRecord>,
    pub transform: Transform,
    pub mode: TextDrawMode,
}

/// 2D immediate-mode drawing target.
///
/// Paths arrive in device space. State set through the `set_*` calls and
/// clips added with [`DrawingSink::clip_to_path`] last until the matching
/// [`DrawingSink::restore_state`].
pub trait DrawingSink {
    fn save_state(&mut self);
    fn restore_state(&mut self);

    fn set_fill_color(&mut self, color: Color);
    fn set_stroke_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f32);
    /// Dash pattern starting `phase` into the pattern; empty means solid.
    fn set_line_dash(&mut self, phase: f32, lengths: &[f32]);
    fn set_line_cap(&mut self, cap: LineCap);
    fn set_line_join(&mut self, join: LineJoin);
    fn set_miter_limit(&mut self, limit: f32);
    fn set_blend_mode(&mut self, mode: BlendMode);
    fn set_alpha(&mut self, alpha: f32);

    fn fill_path(&mut self, path: &Path, rule: FillRule);
    fn stroke_path(&mut self, path: &Path);
    fn clip_to_path(&mut self, path: &Path, rule: FillRule);

    /// Fill the current clip with a linear gradient. `start`/`end` are in
    /// gradient space, mapped to device space by `transform`.
    fn draw_linear_gradient(
        &mut self,
        stops: &[ResolvedStop],
        start: Point,
        end: Point,
        spread: SpreadMethod,
        transform: &Transform,
    );

    /// Fill the current clip with a radial gradient, in gradient space.
    fn draw_radial_gradient(
        &mut self,
        stops: &[ResolvedStop],
        center: Point,
        focal: Point,
        radius: f32,
        spread: SpreadMethod,
        transform: &Transform,
    );

    fn draw_glyph_run(&mut self, run: &GlyphRun);

    /// Draw an external image into `bounds` (user space) under `transform`.
    fn draw_image(&mut self, source_ref: &str, bounds: Rect, transform: &Transform);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_styles() {
        assert_eq!(LineCap::parse("round"), LineCap::Round);
        assert_eq!(LineCap::parse("bogus"), LineCap::Butt);
        assert_eq!(LineJoin::parse(" bevel "), LineJoin::Bevel);
        assert_eq!(BlendMode::parse("color-dodge"), BlendMode::ColorDodge);
        assert_eq!(BlendMode::parse(""), BlendMode::Normal);
    }
}
