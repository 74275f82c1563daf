//! A recording drawing sink.

use svgkit_geometry::{FillRule, Path, Point, Rect, Transform};
use svgkit_scene::{ResolvedStop, SpreadMethod};
use svgkit_style::Color;

use crate::sink::{BlendMode, DrawingSink, GlyphRun, LineCap, LineJoin, TextDrawMode};

/// Graphics state captured with each draw command.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawState {
    pub fill_color: Color,
    pub stroke_color: Color,
    pub line_width: f32,
    pub dash: Vec<f32>,
    pub dash_phase: f32,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub miter_limit: f32,
    pub blend_mode: BlendMode,
    pub alpha: f32,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            fill_color: Color::BLACK,
            stroke_color: Color::BLACK,
            line_width: 1.0,
            dash: Vec::new(),
            dash_phase: 0.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 10.0,
            blend_mode: BlendMode::Normal,
            alpha: 1.0,
        }
    }
}

/// A recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCommand {
    Save,
    Restore,
    Clip {
        path: Path,
        rule: FillRule,
    },
    FillPath {
        path: Path,
        rule: FillRule,
        color: Color,
        alpha: f32,
        blend_mode: BlendMode,
    },
    /// Stroke with the full stroke state.
    StrokePath {
        path: Path,
        state: DrawState,
    },
    LinearGradient {
        stops: Vec<ResolvedStop>,
        start: Point,
        end: Point,
        spread: SpreadMethod,
        transform: Transform,
        alpha: f32,
    },
    RadialGradient {
        stops: Vec<ResolvedStop>,
        center: Point,
        focal: Point,
        radius: f32,
        spread: SpreadMethod,
        transform: Transform,
        alpha: f32,
    },
    Glyphs {
        run: GlyphRun,
        color: Color,
        alpha: f32,
    },
    Image {
        source_ref: String,
        bounds: Rect,
        transform: Transform,
        alpha: f32,
    },
}

/// A display list of paint commands.
#[derive(Debug, Default)]
pub struct DisplayList {
    pub commands: Vec<DisplayCommand>,
    state: DrawState,
    state_stack: Vec<DrawState>,
}

impl DisplayList {
    /// Create an empty display list.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Current graphics state.
    pub fn state(&self) -> &DrawState {
        &self.state
    }

    /// Commands that put paint on the surface.
    pub fn paint_commands(&self) -> impl Iterator<Item = &DisplayCommand> {
        self.commands
            .iter()
            .filter(|c| !matches!(c, DisplayCommand::Save | DisplayCommand::Restore | DisplayCommand::Clip { .. }))
    }

    /// Colors of every solid fill, in order.
    pub fn fill_colors(&self) -> Vec<Color> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DisplayCommand::FillPath { color, .. } => Some(*color),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.state = DrawState::default();
        self.state_stack.clear();
    }
}

impl DrawingSink for DisplayList {
    fn save_state(&mut self) {
        self.state_stack.push(self.state.clone());
        self.commands.push(DisplayCommand::Save);
    }

    fn restore_state(&mut self) {
        if let Some(state) = self.state_stack.pop() {
            self.state = state;
            self.commands.push(DisplayCommand::Restore);
        }
    }

    fn set_fill_color(&mut self, color: Color) {
        self.state.fill_color = color;
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.state.stroke_color = color;
    }

    fn set_line_width(&mut self, width: f32) {
        self.state.line_width = width;
    }

    fn set_line_dash(&mut self, phase: f32, lengths: &[f32]) {
        self.state.dash_phase = phase;
        self.state.dash = lengths.to_vec();
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.state.line_cap = cap;
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.state.line_join = join;
    }

    fn set_miter_limit(&mut self, limit: f32) {
        self.state.miter_limit = limit;
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend_mode = mode;
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn fill_path(&mut self, path: &Path, rule: FillRule) {
        self.commands.push(DisplayCommand::FillPath {
            path: path.clone(),
            rule,
            color: self.state.fill_color,
            alpha: self.state.alpha,
            blend_mode: self.state.blend_mode,
        });
    }

    fn stroke_path(&mut self, path: &Path) {
        self.commands.push(DisplayCommand::StrokePath {
            path: path.clone(),
            state: self.state.clone(),
        });
    }

    fn clip_to_path(&mut self, path: &Path, rule: FillRule) {
        self.commands.push(DisplayCommand::Clip {
            path: path.clone(),
            rule,
        });
    }

    fn draw_linear_gradient(
        &mut self,
        stops: &[ResolvedStop],
        start: Point,
        end: Point,
        spread: SpreadMethod,
        transform: &Transform,
    ) {
        self.commands.push(DisplayCommand::LinearGradient {
            stops: stops.to_vec(),
            start,
            end,
            spread,
            transform: *transform,
            alpha: self.state.alpha,
        });
    }

    fn draw_radial_gradient(
        &mut self,
        stops: &[ResolvedStop],
        center: Point,
        focal: Point,
        radius: f32,
        spread: SpreadMethod,
        transform: &Transform,
    ) {
        self.commands.push(DisplayCommand::RadialGradient {
            stops: stops.to_vec(),
            center,
            focal,
            radius,
            spread,
            transform: *transform,
            alpha: self.state.alpha,
        });
    }

    fn draw_glyph_run(&mut self, run: &GlyphRun) {
        let color = match run.mode {
            TextDrawMode::Fill => self.state.fill_color,
            TextDrawMode::Stroke => self.state.stroke_color,
        };
        self.commands.push(DisplayCommand::Glyphs {
            run: run.clone(),
            color,
            alpha: self.state.alpha,
        });
    }

    fn draw_image(&mut self, source_ref: &str, bounds: Rect, transform: &Transform) {
        self.commands.push(DisplayCommand::Image {
            source_ref: source_ref.to_string(),
            bounds,
            transform: *transform,
            alpha: self.state.alpha,
        });
    }
}
