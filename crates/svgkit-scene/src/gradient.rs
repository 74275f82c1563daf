//! Gradient paint servers and their resolution against an object.

use std::collections::HashSet;
use std::sync::Arc;

use svgkit_geometry::{Point, Rect, Transform};
use svgkit_style::{fragment_id, parse_fraction, text_for_style_attribute, Color, Length, LengthUnit};
use tracing::debug;

use crate::context::SvgContext;
use crate::definition::ElementDefinition;
use crate::node::{Node, Units};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientKind {
    Linear,
    Radial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpreadMethod {
    #[default]
    Pad,
    Reflect,
    Repeat,
}

impl SpreadMethod {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "reflect" => SpreadMethod::Reflect,
            "repeat" => SpreadMethod::Repeat,
            _ => SpreadMethod::Pad,
        }
    }
}

/// A `stop` as written: offset in [0, 1], unresolved color.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color_expr: String,
    pub opacity: f32,
}

/// `linearGradient` / `radialGradient`.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientNode {
    pub kind: GradientKind,
    pub stops: Vec<GradientStop>,
    /// Id of the gradient this one inherits from.
    pub href: Option<String>,
}

impl GradientNode {
    pub fn from_definition(kind: GradientKind, definition: &ElementDefinition) -> Self {
        let mut last_offset = 0.0f32;
        let stops = definition
            .children
            .iter()
            .filter(|child| child.name == "stop")
            .map(|stop| {
                let attrs = &stop.attributes;
                let text = |name| text_for_style_attribute(name, attrs, None, None);
                // Offsets never decrease.
                let offset = text("offset")
                    .map(|o| parse_fraction(&o, 0.0))
                    .unwrap_or(0.0)
                    .max(last_offset);
                last_offset = offset;
                GradientStop {
                    offset,
                    color_expr: text("stop-color").unwrap_or_else(|| "black".to_string()),
                    opacity: text("stop-opacity")
                        .map(|o| parse_fraction(&o, 1.0))
                        .unwrap_or(1.0),
                }
            })
            .collect();

        let href = ["href", "xlink:href"]
            .iter()
            .find_map(|key| definition.attribute_text(key))
            .and_then(|h| fragment_id(&h).map(str::to_string));

        Self { kind, stops, href }
    }
}

/// A stop with its color resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedStop {
    pub offset: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedGradientKind {
    Linear { start: Point, end: Point },
    Radial { center: Point, focal: Point, radius: f32 },
}

/// A gradient ready for a drawing sink: geometry in gradient space and the
/// transform from gradient space to the user space of the painted object.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedGradient {
    pub kind: ResolvedGradientKind,
    pub stops: Vec<ResolvedStop>,
    pub spread: SpreadMethod,
    pub transform: Transform,
}

/// The gradient node followed by the gradients it inherits from, stopping at
/// the first missing target or repeated id.
fn inheritance_chain(node: &Arc<Node>, context: &dyn SvgContext) -> Vec<Arc<Node>> {
    let mut visited: HashSet<String> = node.id().map(str::to_string).into_iter().collect();
    let mut chain = vec![Arc::clone(node)];
    loop {
        let Some(href) = chain.last().and_then(|n| n.as_gradient()).and_then(|g| g.href.clone()) else {
            break;
        };
        if !visited.insert(href.clone()) {
            debug!(id = %href, "gradient href cycle");
            break;
        }
        match context.object_named(&href) {
            Some(next) if next.as_gradient().is_some() => chain.push(next),
            _ => {
                debug!(id = %href, "gradient href does not name a gradient");
                break;
            }
        }
    }
    chain
}

/// Resolve a gradient node for an object with bounds `bbox`.
///
/// Attributes and stops missing on the node come from the gradients its
/// `href` chain names. Percentages in `userSpaceOnUse` resolve against
/// `viewport`. Returns `None` when the node is not a gradient, when no stops
/// are found, or when bounding-box units meet an empty box.
pub fn resolve_gradient(
    node: &Arc<Node>,
    bbox: Rect,
    viewport: Rect,
    context: &dyn SvgContext,
) -> Option<ResolvedGradient> {
    let gradient = node.as_gradient()?;
    let chain = inheritance_chain(node, context);
    let attr = |key: &str| {
        chain
            .iter()
            .find_map(|n| n.attributes().text(key).map(|t| t.into_owned()))
    };

    let stops = chain
        .iter()
        .filter_map(|n| n.as_gradient())
        .map(|g| &g.stops)
        .find(|stops| !stops.is_empty())?;
    let stops = stops
        .iter()
        .map(|stop| ResolvedStop {
            offset: stop.offset,
            color: context
                .color_for_string(&stop.color_expr)
                .with_alpha_multiplied(stop.opacity),
        })
        .collect();

    let units = Units::parse(attr("gradientUnits").as_deref(), Units::ObjectBoundingBox);
    let gradient_transform = attr("gradientTransform")
        .map(|t| Transform::parse(&t))
        .unwrap_or_default();
    let transform = match units {
        Units::ObjectBoundingBox => {
            if bbox.width <= 0.0 || bbox.height <= 0.0 {
                debug!("bounding-box gradient on an empty box");
                return None;
            }
            Transform::from_translate(bbox.x, bbox.y)
                .scale(bbox.width, bbox.height)
                .multiply(&gradient_transform)
        }
        Units::UserSpaceOnUse => gradient_transform,
    };

    let diagonal = (viewport.width.powi(2) + viewport.height.powi(2)).sqrt() / std::f32::consts::SQRT_2;
    let coordinate = |key: &str, default: &str, reference: f32| {
        let raw = attr(key);
        let length = Length::parse(raw.as_deref().unwrap_or(default))
            .or_else(|| Length::parse(default))
            .unwrap_or(Length::ZERO);
        match (units, length.unit) {
            (Units::ObjectBoundingBox, LengthUnit::Percent) => length.value / 100.0,
            (Units::ObjectBoundingBox, _) => length.value,
            (Units::UserSpaceOnUse, _) => {
                let font_size = context.font().size;
                length.to_user_units(reference, font_size)
            }
        }
    };

    let kind = match gradient.kind {
        GradientKind::Linear => ResolvedGradientKind::Linear {
            start: Point::new(
                coordinate("x1", "0%", viewport.width),
                coordinate("y1", "0%", viewport.height),
            ),
            end: Point::new(
                coordinate("x2", "100%", viewport.width),
                coordinate("y2", "0%", viewport.height),
            ),
        },
        GradientKind::Radial => {
            let center = Point::new(
                coordinate("cx", "50%", viewport.width),
                coordinate("cy", "50%", viewport.height),
            );
            let focal = Point::new(
                attr("fx").map_or(center.x, |_| coordinate("fx", "50%", viewport.width)),
                attr("fy").map_or(center.y, |_| coordinate("fy", "50%", viewport.height)),
            );
            ResolvedGradientKind::Radial {
                center,
                focal,
                radius: coordinate("r", "50%", diagonal).max(0.0),
            }
        }
    };

    Some(ResolvedGradient {
        kind,
        stops,
        spread: attr("spreadMethod")
            .map(|s| SpreadMethod::parse(&s))
            .unwrap_or_default(),
        transform,
    })
}
