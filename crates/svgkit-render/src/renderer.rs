//! Depth-first traversal for painting and hit-testing.
//!
//! Both walks share one traversal: environment gating, style cascade,
//! transform accumulation, clip scoping and `use` resolution. They differ
//! only in what happens at a clip boundary and at a leaf, which a [`Target`]
//! decides.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use svgkit_geometry::{FillRule, Path, Point, Rect, Transform};
use svgkit_scene::{
    resolve_placeholder, ClipGroupNode, Document, GroupMode, Node, NodeKind, PlaceholderNode,
    Resolution, ResolvedGradientKind, ShapeNode, SvgContext, TextNode, Units,
};
use svgkit_style::{
    default_drawing_attributes, environment_ok, inheritable_attributes, merge_style_attributes,
    presentation_attributes, text_for_style_attribute, AttributeMap,
};
use svgkit_text::bounding_box_for_glyphs;
use tracing::{debug, debug_span, trace};

use crate::paint::{resolve_paint, style_fraction, style_text, ResolvedPaint, StrokeSettings, UnresolvedSink};
use crate::sink::{BlendMode, DrawingSink, GlyphRun, TextDrawMode};
use crate::text::layout_text;

/// Options for a render or hit-test pass.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Checked at every node boundary; once set the pass stops descending.
    pub cancel: Option<Arc<AtomicBool>>,
    /// Transform from the document's user space to device space.
    pub base_transform: Option<Transform>,
}

/// What a pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub nodes_visited: usize,
    pub leaves_drawn: usize,
    /// Subtrees skipped by `display:none` or `systemLanguage`.
    pub skipped: usize,
    pub unresolved_references: usize,
    pub cycles: usize,
    pub shaping_failures: usize,
    pub cancelled: bool,
}

impl UnresolvedSink for RenderReport {
    fn unresolved(&mut self, reference: &str) {
        debug!(reference, "unresolved paint reference");
        self.unresolved_references += 1;
    }
}

/// Renders documents into drawing sinks.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Paint the whole document.
    pub fn render(
        &self,
        document: &Document,
        sink: &mut dyn DrawingSink,
        context: &mut dyn SvgContext,
    ) -> RenderReport {
        self.render_node(document, document.root(), sink, context)
    }

    /// Paint one node of `document` and everything below it.
    pub fn render_node(
        &self,
        document: &Document,
        node: &Arc<Node>,
        sink: &mut dyn DrawingSink,
        context: &mut dyn SvgContext,
    ) -> RenderReport {
        let _span = debug_span!("render_pass", root = node.name()).entered();
        let mut walk = Walk::new(document, context, &self.options, Painter { sink });
        walk.run(node);
        debug!(
            nodes = walk.env.report.nodes_visited,
            leaves = walk.env.report.leaves_drawn,
            unresolved = walk.env.report.unresolved_references,
            cycles = walk.env.report.cycles,
            cancelled = walk.env.report.cancelled,
            "render pass finished"
        );
        walk.env.report
    }

    /// The topmost painted leaf under `point` (device space), if any.
    pub fn hit_test(
        &self,
        document: &Document,
        point: Point,
        context: &mut dyn SvgContext,
    ) -> Option<Arc<Node>> {
        let _span = debug_span!("hit_test", x = point.x, y = point.y).entered();
        let tester = HitTester {
            point,
            clips: Vec::new(),
            hit: None,
        };
        let mut walk = Walk::new(document, context, &self.options, tester);
        walk.run(document.root());
        trace!(hit = walk.target.hit.is_some(), "hit test finished");
        walk.target.hit
    }
}

/// Per-level traversal state handed from a node to its children.
#[derive(Debug, Clone)]
struct Frame {
    transform: Transform,
    /// Inheritable part of the parent's resolved style.
    style: AttributeMap,
    opacity: f32,
    reference_depth: usize,
    /// Set for the node a `use` resolved to.
    via_reference: bool,
}

/// Device-space clip region.
#[derive(Debug, Clone)]
struct ClipRegion {
    path: Path,
    rule: FillRule,
}

/// Shared resources of a pass.
struct Env<'a> {
    document: &'a Document,
    context: &'a mut dyn SvgContext,
    report: RenderReport,
}

trait Target {
    fn push_clip(&mut self, region: &ClipRegion);
    fn pop_clip(&mut self);
    /// A shape, text or image with its full resolved style.
    fn leaf(&mut self, env: &mut Env<'_>, node: &Arc<Node>, style: &AttributeMap, frame: &Frame);
}

struct Walk<'a, T> {
    env: Env<'a>,
    cancel: Option<&'a AtomicBool>,
    base_transform: Transform,
    target: T,
}

impl<'a, T: Target> Walk<'a, T> {
    fn new(document: &'a Document, context: &'a mut dyn SvgContext, options: &'a RenderOptions, target: T) -> Self {
        Self {
            env: Env {
                document,
                context,
                report: RenderReport::default(),
            },
            cancel: options.cancel.as_deref(),
            base_transform: options.base_transform.unwrap_or_default(),
            target,
        }
    }

    fn run(&mut self, node: &Arc<Node>) {
        let frame = Frame {
            transform: self.base_transform,
            style: default_drawing_attributes(),
            opacity: 1.0,
            reference_depth: 0,
            via_reference: false,
        };
        let mut visited = HashSet::new();
        self.visit(node, &frame, &mut visited);
    }

    fn is_cancelled(&mut self) -> bool {
        let cancelled = self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed));
        if cancelled && !self.env.report.cancelled {
            debug!("render pass cancelled");
            self.env.report.cancelled = true;
        }
        cancelled
    }

    fn visit(&mut self, node: &Arc<Node>, parent: &Frame, visited: &mut HashSet<String>) {
        if self.is_cancelled() {
            return;
        }
        self.env.report.nodes_visited += 1;

        let attrs = node.attribute_map();
        if !environment_ok(attrs, self.env.context.iso_language()) {
            trace!(element = node.name(), "environment check failed, skipping subtree");
            self.env.report.skipped += 1;
            return;
        }
        match node.kind() {
            NodeKind::Gradient(_)
            | NodeKind::SolidColor(_)
            | NodeKind::ClipGroup(_)
            | NodeKind::Style(_)
            | NodeKind::Inert => return,
            NodeKind::Group(group) if group.mode() == GroupMode::Definitions => return,
            NodeKind::Group(_) if node.name() == "symbol" && !parent.via_reference => return,
            _ => {}
        }
        trace!(element = node.name(), id = node.id(), "visiting node");

        let own = presentation_attributes(attrs, Some(node.name()), self.env.context.class_styles());
        let style = merge_style_attributes(&parent.style, &own);
        let transform = parent.transform.multiply(node.transform());
        let opacity = parent.opacity * style_fraction(&own, "opacity");

        let saved_color = style_text(&own, "color").map(|color| {
            let previous = self.env.context.current_color().to_string();
            self.env.context.set_current_color(&color);
            previous
        });

        let clips = ClipGroupNode::clip_object_for_attributes(attrs, Some(node.name()), &*self.env.context);
        let mut pushed = 0;
        if !clips.is_empty() {
            let bounds = self.local_bounds(node, parent.reference_depth);
            for clip in &clips {
                if let Some(region) = self.clip_region(clip, bounds, &transform, visited) {
                    self.target.push_clip(&region);
                    pushed += 1;
                }
            }
        }

        let frame = Frame {
            transform,
            style: inheritable_attributes(&style),
            opacity,
            reference_depth: parent.reference_depth,
            via_reference: false,
        };

        match node.kind() {
            NodeKind::Shape(_) | NodeKind::Text(_) | NodeKind::Image(_) => {
                self.target.leaf(&mut self.env, node, &style, &frame);
            }
            NodeKind::Group(group) => {
                let children = group.materialize_children(self.env.document.factory());
                if group.mode() == GroupMode::Switch {
                    let language = self.env.context.iso_language().to_string();
                    if let Some(child) = children
                        .iter()
                        .find(|c| environment_ok(c.attribute_map(), &language))
                    {
                        self.visit(child, &frame, visited);
                    }
                } else {
                    for child in children {
                        self.visit(child, &frame, visited);
                    }
                }
            }
            NodeKind::Placeholder(placeholder) => self.visit_placeholder(placeholder, &frame, visited),
            _ => {}
        }

        for _ in 0..pushed {
            self.target.pop_clip();
        }
        if let Some(previous) = saved_color {
            self.env.context.set_current_color(&previous);
        }
    }

    /// Follow a `use`. The id stays in `visited` only while its target is
    /// being walked, so sibling references to one target both render.
    fn visit_placeholder(&mut self, placeholder: &PlaceholderNode, frame: &Frame, visited: &mut HashSet<String>) {
        if frame.reference_depth >= self.env.document.config().max_reference_depth {
            debug!(id = %placeholder.target_id, "reference depth limit reached");
            self.env.report.cycles += 1;
            return;
        }
        match resolve_placeholder(placeholder, &*self.env.context, visited) {
            Resolution::Resolved(target) => {
                let target_frame = Frame {
                    reference_depth: frame.reference_depth + 1,
                    via_reference: true,
                    ..frame.clone()
                };
                self.visit(&target, &target_frame, visited);
                visited.remove(&placeholder.target_id);
            }
            Resolution::Missing => self.env.report.unresolved_references += 1,
            Resolution::Cycle => self.env.report.cycles += 1,
        }
    }

    /// Bounds of a node in its own user space, used for bounding-box units.
    ///
    /// `hops` counts the `use` indirections already followed; only those are
    /// capped, plain group nesting is not.
    fn local_bounds(&self, node: &Node, hops: usize) -> Option<Rect> {
        match node.kind() {
            NodeKind::Shape(shape) => shape.geometry.bounding_box(),
            NodeKind::Image(image) => Some(image.bounds),
            NodeKind::Group(group) => group
                .materialize_children(self.env.document.factory())
                .iter()
                .filter_map(|child| {
                    self.local_bounds(child, hops)
                        .map(|b| child.transform().apply_rect(&b))
                })
                .reduce(|a, b| a.union(&b)),
            NodeKind::Placeholder(placeholder) => {
                if hops >= self.env.document.config().max_reference_depth {
                    return None;
                }
                let target = self.env.context.object_named(&placeholder.target_id)?;
                self.local_bounds(&target, hops + 1)
                    .map(|b| target.transform().apply_rect(&b))
            }
            NodeKind::Text(text) => {
                let layout = layout_text(text, &AttributeMap::new(), &*self.env.context);
                layout
                    .runs
                    .iter()
                    .filter_map(|run| bounding_box_for_glyphs(&run.glyphs))
                    .reduce(|a, b| a.union(&b))
            }
            _ => None,
        }
    }

    /// Device-space region of a clip group applied to an element whose user
    /// space maps to device space through `transform`.
    fn clip_region(
        &mut self,
        clip_node: &Arc<Node>,
        element_bounds: Option<Rect>,
        transform: &Transform,
        visited: &mut HashSet<String>,
    ) -> Option<ClipRegion> {
        let clip = clip_node.as_clip_group()?;
        let mut base = transform.multiply(clip_node.transform());
        if clip.units == Units::ObjectBoundingBox {
            let Some(b) = element_bounds else {
                debug!(id = clip_node.id(), "bounding-box clip on an element without bounds");
                return None;
            };
            base = base.multiply(&Transform::from_translate(b.x, b.y).scale(b.width, b.height));
        }

        let mut region = ClipRegion {
            path: Path::new(),
            rule: FillRule::NonZero,
        };
        let mut rule = None;
        for child in clip.group.materialize_children(self.env.document.factory()) {
            self.collect_clip_geometry(child, &base, &mut region.path, &mut rule, visited);
        }
        region.rule = rule.unwrap_or_default();
        Some(region)
    }

    fn collect_clip_geometry(
        &mut self,
        node: &Arc<Node>,
        transform: &Transform,
        path: &mut Path,
        rule: &mut Option<FillRule>,
        visited: &mut HashSet<String>,
    ) {
        if !environment_ok(node.attribute_map(), self.env.context.iso_language()) {
            return;
        }
        let transform = transform.multiply(node.transform());
        match node.kind() {
            NodeKind::Shape(shape) => {
                path.extend(&shape.geometry.transformed(&transform));
                if rule.is_none() {
                    *rule = text_for_style_attribute(
                        "clip-rule",
                        node.attribute_map(),
                        Some(node.name()),
                        self.env.context.class_styles(),
                    )
                    .map(|r| FillRule::parse(&r));
                }
            }
            NodeKind::Group(group) => {
                for child in group.materialize_children(self.env.document.factory()) {
                    self.collect_clip_geometry(child, &transform, path, rule, visited);
                }
            }
            NodeKind::Placeholder(placeholder) => {
                if let Resolution::Resolved(target) = resolve_placeholder(placeholder, &*self.env.context, visited) {
                    self.collect_clip_geometry(&target, &transform, path, rule, visited);
                    visited.remove(&placeholder.target_id);
                }
            }
            _ => trace!(element = node.name(), "ignored inside clip group"),
        }
    }
}

fn is_hidden(style: &AttributeMap) -> bool {
    matches!(style_text(style, "visibility").as_deref(), Some("hidden" | "collapse"))
}

fn fill_rule(style: &AttributeMap) -> FillRule {
    style_text(style, "fill-rule")
        .map(|r| FillRule::parse(&r))
        .unwrap_or_default()
}

/// Paints leaves into a drawing sink.
struct Painter<'s> {
    sink: &'s mut dyn DrawingSink,
}

impl Painter<'_> {
    fn paint_shape(&mut self, env: &mut Env<'_>, shape: &ShapeNode, style: &AttributeMap, frame: &Frame) {
        let Some(bbox) = shape.geometry.bounding_box() else {
            trace!("empty geometry, nothing to paint");
            return;
        };
        let device = shape.geometry.transformed(&frame.transform);

        if shape.is_fillable {
            let rule = fill_rule(style);
            let fill_opacity = style_fraction(style, "fill-opacity");
            match resolve_paint(style, "fill", bbox, env.document, &*env.context, &mut env.report) {
                ResolvedPaint::None => {}
                ResolvedPaint::Color(color) => {
                    self.sink.set_fill_color(color.with_alpha_multiplied(fill_opacity));
                    self.sink.fill_path(&device, rule);
                }
                ResolvedPaint::Gradient(gradient) => {
                    self.sink.save_state();
                    self.sink.clip_to_path(&device, rule);
                    self.sink.set_alpha(frame.opacity * fill_opacity);
                    let transform = frame.transform.multiply(&gradient.transform);
                    match gradient.kind {
                        ResolvedGradientKind::Linear { start, end } => self.sink.draw_linear_gradient(
                            &gradient.stops,
                            start,
                            end,
                            gradient.spread,
                            &transform,
                        ),
                        ResolvedGradientKind::Radial { center, focal, radius } => self.sink.draw_radial_gradient(
                            &gradient.stops,
                            center,
                            focal,
                            radius,
                            gradient.spread,
                            &transform,
                        ),
                    }
                    self.sink.restore_state();
                }
            }
        }

        let stroke = resolve_paint(style, "stroke", bbox, env.document, &*env.context, &mut env.report);
        if let Some(color) = stroke.solid_color() {
            let settings = StrokeSettings::from_style(
                style,
                &frame.transform,
                env.context.explicit_line_scaling(),
                env.document.viewport(),
                env.context.font().size,
            );
            if settings.device_width > 0.0 {
                settings.apply(self.sink);
                self.sink
                    .set_stroke_color(color.with_alpha_multiplied(style_fraction(style, "stroke-opacity")));
                self.sink.stroke_path(&device);
            }
        }
    }

    fn paint_text(&mut self, env: &mut Env<'_>, text: &TextNode, style: &AttributeMap, frame: &Frame) {
        let layout = layout_text(text, style, &*env.context);
        env.report.shaping_failures += layout.shaping_failures;
        if layout.missing_path {
            env.report.unresolved_references += 1;
            return;
        }

        for run in layout.runs {
            let glyphs: Vec<_> = run.glyphs.iter().filter(|g| !g.not_rendering).cloned().collect();
            let Some(bbox) = bounding_box_for_glyphs(&glyphs) else {
                continue;
            };
            let mut glyph_run = GlyphRun {
                font: run.font,
                glyphs,
                transform: frame.transform,
                mode: TextDrawMode::Fill,
            };

            let fill = resolve_paint(&run.style, "fill", bbox, env.document, &*env.context, &mut env.report);
            if let Some(color) = fill.solid_color() {
                self.sink
                    .set_fill_color(color.with_alpha_multiplied(style_fraction(&run.style, "fill-opacity")));
                self.sink.draw_glyph_run(&glyph_run);
            }

            let stroke = resolve_paint(&run.style, "stroke", bbox, env.document, &*env.context, &mut env.report);
            if let Some(color) = stroke.solid_color() {
                let settings = StrokeSettings::from_style(
                    &run.style,
                    &frame.transform,
                    env.context.explicit_line_scaling(),
                    env.document.viewport(),
                    glyph_run.font.size,
                );
                if settings.device_width > 0.0 {
                    settings.apply(self.sink);
                    self.sink
                        .set_stroke_color(color.with_alpha_multiplied(style_fraction(&run.style, "stroke-opacity")));
                    glyph_run.mode = TextDrawMode::Stroke;
                    self.sink.draw_glyph_run(&glyph_run);
                }
            }
        }
    }
}

impl Target for Painter<'_> {
    fn push_clip(&mut self, region: &ClipRegion) {
        self.sink.save_state();
        self.sink.clip_to_path(&region.path, region.rule);
    }

    fn pop_clip(&mut self) {
        self.sink.restore_state();
    }

    fn leaf(&mut self, env: &mut Env<'_>, node: &Arc<Node>, style: &AttributeMap, frame: &Frame) {
        if is_hidden(style) {
            return;
        }
        self.sink.set_alpha(frame.opacity);
        self.sink.set_blend_mode(
            style_text(style, "mix-blend-mode")
                .map(|m| BlendMode::parse(&m))
                .unwrap_or_default(),
        );
        match node.kind() {
            NodeKind::Shape(shape) => self.paint_shape(env, shape, style, frame),
            NodeKind::Text(text) => self.paint_text(env, text, style, frame),
            NodeKind::Image(image) => {
                self.sink
                    .draw_image(&image.source_ref, image.bounds, &frame.transform)
            }
            _ => return,
        }
        env.report.leaves_drawn += 1;
    }
}

/// Finds the last painted leaf under a point.
struct HitTester {
    point: Point,
    clips: Vec<ClipRegion>,
    hit: Option<Arc<Node>>,
}

impl HitTester {
    fn shape_hit(&self, env: &mut Env<'_>, shape: &ShapeNode, style: &AttributeMap, local: Point) -> bool {
        let Some(bbox) = shape.geometry.bounding_box() else {
            return false;
        };
        let fill = resolve_paint(style, "fill", bbox, env.document, &*env.context, &mut env.report);
        if shape.is_fillable && fill != ResolvedPaint::None && shape.geometry.contains(local, fill_rule(style)) {
            return true;
        }
        let stroke = resolve_paint(style, "stroke", bbox, env.document, &*env.context, &mut env.report);
        if stroke == ResolvedPaint::None {
            return false;
        }
        let settings = StrokeSettings::from_style(
            style,
            &Transform::IDENTITY,
            1.0,
            env.document.viewport(),
            env.context.font().size,
        );
        settings.user_width > 0.0 && shape.geometry.stroke_contains(local, settings.user_width)
    }
}

impl Target for HitTester {
    fn push_clip(&mut self, region: &ClipRegion) {
        self.clips.push(region.clone());
    }

    fn pop_clip(&mut self) {
        self.clips.pop();
    }

    fn leaf(&mut self, env: &mut Env<'_>, node: &Arc<Node>, style: &AttributeMap, frame: &Frame) {
        if is_hidden(style) || !self.clips.iter().all(|c| c.path.contains(self.point, c.rule)) {
            return;
        }
        let Some(local) = frame.transform.inverse().map(|inverse| inverse.apply(self.point)) else {
            return;
        };
        let hit = match node.kind() {
            NodeKind::Shape(shape) => self.shape_hit(env, shape, style, local),
            NodeKind::Text(text) => layout_text(text, style, &*env.context)
                .runs
                .iter()
                .flat_map(|run| run.glyphs.iter())
                .any(|glyph| !glyph.not_rendering && glyph.bounding_box.contains(local)),
            NodeKind::Image(image) => image.bounds.contains(local),
            _ => false,
        };
        if hit {
            trace!(element = node.name(), id = node.id(), "hit");
            self.hit = Some(Arc::clone(node));
        }
    }
}
