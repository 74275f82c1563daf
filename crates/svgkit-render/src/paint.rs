//! Paints and stroke settings derived from a resolved style frame.

use smallvec::SmallVec;
use svgkit_geometry::{Rect, Transform};
use svgkit_scene::{resolve_gradient, Document, NodeKind, ResolvedGradient, SvgContext};
use svgkit_style::{parse_fraction, parse_length, parse_number, parse_number_list, AttributeMap, Color, Paint};
use tracing::debug;

use crate::sink::{DrawingSink, LineCap, LineJoin};

/// Text of a key in a resolved style frame.
pub(crate) fn style_text(style: &AttributeMap, key: &str) -> Option<String> {
    style
        .get(key)
        .and_then(|v| v.to_text().map(|t| t.trim().to_string()))
}

/// An opacity-like key as a fraction, 1 when absent.
pub(crate) fn style_fraction(style: &AttributeMap, key: &str) -> f32 {
    style_text(style, key)
        .map(|v| parse_fraction(&v, 1.0))
        .unwrap_or(1.0)
}

/// A `fill` or `stroke` resolved for one object.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ResolvedPaint {
    None,
    Color(Color),
    Gradient(ResolvedGradient),
}

impl ResolvedPaint {
    /// A single color for places that cannot take a gradient: the gradient's
    /// first stop.
    pub(crate) fn solid_color(&self) -> Option<Color> {
        match self {
            ResolvedPaint::None => None,
            ResolvedPaint::Color(color) => Some(*color),
            ResolvedPaint::Gradient(gradient) => gradient.stops.first().map(|s| s.color),
        }
    }
}

/// Where paint resolution reports references it could not follow.
pub(crate) trait UnresolvedSink {
    fn unresolved(&mut self, reference: &str);
}

/// Resolve the paint under `key` for an object with bounds `bbox`.
pub(crate) fn resolve_paint(
    style: &AttributeMap,
    key: &str,
    bbox: Rect,
    document: &Document,
    context: &dyn SvgContext,
    report: &mut dyn UnresolvedSink,
) -> ResolvedPaint {
    match style_text(style, key) {
        Some(value) => resolve(&Paint::parse(&value), bbox, document, context, report),
        None => ResolvedPaint::None,
    }
}

fn resolve(
    paint: &Paint,
    bbox: Rect,
    document: &Document,
    context: &dyn SvgContext,
    report: &mut dyn UnresolvedSink,
) -> ResolvedPaint {
    let fallback = |fallback: &Option<Box<Paint>>, report: &mut dyn UnresolvedSink| match fallback {
        Some(paint) => resolve(paint, bbox, document, context, report),
        None => ResolvedPaint::None,
    };
    match paint {
        Paint::None => ResolvedPaint::None,
        Paint::Color(color) => ResolvedPaint::Color(*color),
        Paint::CurrentColor => ResolvedPaint::Color(context.color_for_string("currentColor")),
        Paint::Url { id, fallback: alternative } => {
            let Some(node) = context.object_named(id) else {
                report.unresolved(id);
                return fallback(alternative, report);
            };
            match node.kind() {
                NodeKind::Gradient(_) => match resolve_gradient(&node, bbox, document.viewport(), context) {
                    Some(gradient) => ResolvedPaint::Gradient(gradient),
                    None => fallback(alternative, report),
                },
                NodeKind::SolidColor(solid) => ResolvedPaint::Color(
                    context
                        .color_for_string(&solid.color_expr)
                        .with_alpha_multiplied(solid.opacity),
                ),
                _ => {
                    debug!(id = %id, "paint reference is not a paint server");
                    fallback(alternative, report)
                }
            }
        }
    }
}

/// Stroke geometry settings in device units.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StrokeSettings {
    /// Width in the object's user space.
    pub user_width: f32,
    pub device_width: f32,
    pub dash: SmallVec<[f32; 8]>,
    pub dash_phase: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f32,
}

impl StrokeSettings {
    /// Read stroke settings; lengths scale with `transform` unless the style
    /// asks for `non-scaling-stroke`, in which case `explicit_line_scaling`
    /// applies instead.
    pub(crate) fn from_style(
        style: &AttributeMap,
        transform: &Transform,
        explicit_line_scaling: f32,
        viewport: Rect,
        font_size: f32,
    ) -> Self {
        let diagonal = (viewport.width.powi(2) + viewport.height.powi(2)).sqrt() / std::f32::consts::SQRT_2;
        let length = |key: &str, default: f32| {
            style_text(style, key)
                .map(|v| parse_length(&v, diagonal, font_size))
                .unwrap_or(default)
        };

        let scale = if style_text(style, "vector-effect").as_deref() == Some("non-scaling-stroke") {
            explicit_line_scaling
        } else {
            transform.scale_factor()
        };

        let user_width = length("stroke-width", 1.0).max(0.0);
        let mut dash: SmallVec<[f32; 8]> = style_text(style, "stroke-dasharray")
            .filter(|d| d != "none")
            .map(|d| parse_number_list(&d).into_iter().map(|v| v * scale).collect())
            .unwrap_or_default();
        if dash.iter().any(|v| *v < 0.0) || dash.iter().all(|v| *v == 0.0) {
            dash.clear();
        }
        if dash.len() % 2 == 1 {
            let repeat = dash.clone();
            dash.extend_from_slice(&repeat);
        }

        Self {
            user_width,
            device_width: user_width * scale,
            dash,
            dash_phase: length("stroke-dashoffset", 0.0) * scale,
            cap: style_text(style, "stroke-linecap")
                .map(|c| LineCap::parse(&c))
                .unwrap_or_default(),
            join: style_text(style, "stroke-linejoin")
                .map(|j| LineJoin::parse(&j))
                .unwrap_or_default(),
            miter_limit: style_text(style, "stroke-miterlimit")
                .and_then(|m| parse_number(&m))
                .filter(|m| *m >= 1.0)
                .unwrap_or(4.0),
        }
    }

    pub(crate) fn apply(&self, sink: &mut dyn DrawingSink) {
        sink.set_line_width(self.device_width);
        sink.set_line_dash(self.dash_phase, &self.dash);
        sink.set_line_cap(self.cap);
        sink.set_line_join(self.join);
        sink.set_miter_limit(self.miter_limit);
    }
}
