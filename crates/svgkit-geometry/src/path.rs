//! Abstract paths: ordered move/line/curve segments.
//!
//! Paths are built once (from shape attributes or path data) and then only
//! read: measured, transformed into device space, flattened for hit-testing.

use smallvec::SmallVec;

use crate::arc::add_svg_arc;
use crate::point::{Point, Rect, Vector};
use crate::transform::Transform;

/// Magic constant for approximating a quarter circle with one cubic.
pub const KAPPA: f32 = 0.552_284_8;

/// Fill rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

impl FillRule {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "evenodd" => FillRule::EvenOdd,
            _ => FillRule::NonZero,
        }
    }
}

/// Path segment in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { ctrl: Point, to: Point },
    CubicTo { ctrl1: Point, ctrl2: Point, to: Point },
    Close,
}

/// A drawn piece of a path with its start point resolved.
///
/// Close segments appear as the line back to the subpath start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Line(Point, Point),
    Quad(Point, Point, Point),
    Cubic(Point, Point, Point, Point),
}

impl Curve {
    pub fn start(&self) -> Point {
        match *self {
            Curve::Line(p0, _) | Curve::Quad(p0, _, _) | Curve::Cubic(p0, _, _, _) => p0,
        }
    }

    pub fn end(&self) -> Point {
        match *self {
            Curve::Line(_, p1) | Curve::Quad(_, _, p1) | Curve::Cubic(_, _, _, p1) => p1,
        }
    }

    /// Point at parameter `t` in [0, 1].
    pub fn eval(&self, t: f32) -> Point {
        let mt = 1.0 - t;
        match *self {
            Curve::Line(p0, p1) => p0.lerp(p1, t),
            Curve::Quad(p0, c, p1) => p0 * (mt * mt) + c * (2.0 * mt * t) + p1 * (t * t),
            Curve::Cubic(p0, c1, c2, p1) => {
                p0 * (mt * mt * mt)
                    + c1 * (3.0 * mt * mt * t)
                    + c2 * (3.0 * mt * t * t)
                    + p1 * (t * t * t)
            }
        }
    }

    /// Unnormalized derivative at `t`.
    pub fn derivative(&self, t: f32) -> Vector {
        let mt = 1.0 - t;
        match *self {
            Curve::Line(p0, p1) => p1 - p0,
            Curve::Quad(p0, c, p1) => (c - p0) * (2.0 * mt) + (p1 - c) * (2.0 * t),
            Curve::Cubic(p0, c1, c2, p1) => {
                (c1 - p0) * (3.0 * mt * mt) + (c2 - c1) * (6.0 * mt * t) + (p1 - c2) * (3.0 * t * t)
            }
        }
    }

    /// Unit tangent at `t`; falls back to the chord when the derivative
    /// vanishes (coincident control points).
    pub fn tangent(&self, t: f32) -> Vector {
        let d = self.derivative(t);
        if d.length() > 1e-6 {
            return d.normalized();
        }
        let nearby = if t < 0.5 { (t + 0.01).min(1.0) } else { (t - 0.01).max(0.0) };
        let chord = if t < 0.5 {
            self.eval(nearby) - self.eval(t)
        } else {
            self.eval(t) - self.eval(nearby)
        };
        if chord.length() > 1e-6 {
            chord.normalized()
        } else {
            (self.end() - self.start()).normalized()
        }
    }

    /// Total length of the control polygon; an upper bound on arc length.
    pub fn control_polygon_length(&self) -> f32 {
        match *self {
            Curve::Line(p0, p1) => p0.distance_to(p1),
            Curve::Quad(p0, c, p1) => p0.distance_to(c) + c.distance_to(p1),
            Curve::Cubic(p0, c1, c2, p1) => {
                p0.distance_to(c1) + c1.distance_to(c2) + c2.distance_to(p1)
            }
        }
    }
}

/// A flattened subpath.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub closed: bool,
}

/// A 2D path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<PathSegment>,
    current: Option<Point>,
    subpath_start: Point,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Current pen position, `None` before the first move.
    pub fn current_point(&self) -> Option<Point> {
        self.current
    }

    pub fn move_to(&mut self, p: Point) {
        self.segments.push(PathSegment::MoveTo(p));
        self.current = Some(p);
        self.subpath_start = p;
    }

    /// Line to `p`; starts a subpath at `p` when the path is empty.
    pub fn line_to(&mut self, p: Point) {
        if self.current.is_none() {
            self.move_to(p);
            return;
        }
        self.segments.push(PathSegment::LineTo(p));
        self.current = Some(p);
    }

    pub fn quad_to(&mut self, ctrl: Point, to: Point) {
        if self.current.is_none() {
            self.move_to(ctrl);
        }
        self.segments.push(PathSegment::QuadTo { ctrl, to });
        self.current = Some(to);
    }

    pub fn cubic_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) {
        if self.current.is_none() {
            self.move_to(ctrl1);
        }
        self.segments.push(PathSegment::CubicTo { ctrl1, ctrl2, to });
        self.current = Some(to);
    }

    pub fn close(&mut self) {
        if self.current.is_some() {
            self.segments.push(PathSegment::Close);
            self.current = Some(self.subpath_start);
        }
    }

    /// Append an SVG elliptical arc from the current point.
    pub fn arc_to(&mut self, rx: f32, ry: f32, x_axis_rotation: f32, large_arc: bool, sweep: bool, to: Point) {
        add_svg_arc(self, rx, ry, x_axis_rotation, large_arc, sweep, to);
    }

    /// Axis-aligned rectangle with optional rounded corners.
    pub fn rect(rect: Rect, rx: f32, ry: f32) -> Self {
        let mut path = Path::new();
        let rx = rx.clamp(0.0, rect.width / 2.0);
        let ry = ry.clamp(0.0, rect.height / 2.0);
        let (x0, y0, x1, y1) = (rect.min_x(), rect.min_y(), rect.max_x(), rect.max_y());
        if rx <= 0.0 || ry <= 0.0 {
            path.move_to(Point::new(x0, y0));
            path.line_to(Point::new(x1, y0));
            path.line_to(Point::new(x1, y1));
            path.line_to(Point::new(x0, y1));
            path.close();
            return path;
        }
        let (kx, ky) = (rx * KAPPA, ry * KAPPA);
        path.move_to(Point::new(x0 + rx, y0));
        path.line_to(Point::new(x1 - rx, y0));
        path.cubic_to(Point::new(x1 - rx + kx, y0), Point::new(x1, y0 + ry - ky), Point::new(x1, y0 + ry));
        path.line_to(Point::new(x1, y1 - ry));
        path.cubic_to(Point::new(x1, y1 - ry + ky), Point::new(x1 - rx + kx, y1), Point::new(x1 - rx, y1));
        path.line_to(Point::new(x0 + rx, y1));
        path.cubic_to(Point::new(x0 + rx - kx, y1), Point::new(x0, y1 - ry + ky), Point::new(x0, y1 - ry));
        path.line_to(Point::new(x0, y0 + ry));
        path.cubic_to(Point::new(x0, y0 + ry - ky), Point::new(x0 + rx - kx, y0), Point::new(x0 + rx, y0));
        path.close();
        path
    }

    /// Ellipse as four cubic quadrants, starting at the rightmost point.
    pub fn ellipse(center: Point, rx: f32, ry: f32) -> Self {
        let mut path = Path::new();
        let (cx, cy) = (center.x, center.y);
        let (kx, ky) = (rx * KAPPA, ry * KAPPA);
        path.move_to(Point::new(cx + rx, cy));
        path.cubic_to(Point::new(cx + rx, cy + ky), Point::new(cx + kx, cy + ry), Point::new(cx, cy + ry));
        path.cubic_to(Point::new(cx - kx, cy + ry), Point::new(cx - rx, cy + ky), Point::new(cx - rx, cy));
        path.cubic_to(Point::new(cx - rx, cy - ky), Point::new(cx - kx, cy - ry), Point::new(cx, cy - ry));
        path.cubic_to(Point::new(cx + kx, cy - ry), Point::new(cx + rx, cy - ky), Point::new(cx + rx, cy));
        path.close();
        path
    }

    /// Open or closed polyline through `points`.
    pub fn polyline(points: &[Point], closed: bool) -> Self {
        let mut path = Path::new();
        if let Some((first, rest)) = points.split_first() {
            path.move_to(*first);
            for p in rest {
                path.line_to(*p);
            }
            if closed {
                path.close();
            }
        }
        path
    }

    /// Append all segments of another path.
    pub fn extend(&mut self, other: &Path) {
        for seg in &other.segments {
            match *seg {
                PathSegment::MoveTo(p) => self.move_to(p),
                PathSegment::LineTo(p) => self.line_to(p),
                PathSegment::QuadTo { ctrl, to } => self.quad_to(ctrl, to),
                PathSegment::CubicTo { ctrl1, ctrl2, to } => self.cubic_to(ctrl1, ctrl2, to),
                PathSegment::Close => self.close(),
            }
        }
    }

    /// Copy of this path mapped through `transform`.
    pub fn transformed(&self, transform: &Transform) -> Path {
        if transform.is_identity() {
            return self.clone();
        }
        let map = |p: Point| transform.apply(p);
        let segments = self
            .segments
            .iter()
            .map(|seg| match *seg {
                PathSegment::MoveTo(p) => PathSegment::MoveTo(map(p)),
                PathSegment::LineTo(p) => PathSegment::LineTo(map(p)),
                PathSegment::QuadTo { ctrl, to } => PathSegment::QuadTo {
                    ctrl: map(ctrl),
                    to: map(to),
                },
                PathSegment::CubicTo { ctrl1, ctrl2, to } => PathSegment::CubicTo {
                    ctrl1: map(ctrl1),
                    ctrl2: map(ctrl2),
                    to: map(to),
                },
                PathSegment::Close => PathSegment::Close,
            })
            .collect();
        Path {
            segments,
            current: self.current.map(map),
            subpath_start: map(self.subpath_start),
        }
    }

    /// First point of the path.
    pub fn start_point(&self) -> Option<Point> {
        self.segments.iter().find_map(|seg| match *seg {
            PathSegment::MoveTo(p) => Some(p),
            _ => None,
        })
    }

    /// Drawn pieces in order; moves are skipped, closes become lines.
    pub fn curves(&self) -> Vec<Curve> {
        let mut curves = Vec::with_capacity(self.segments.len());
        let mut current = Point::ZERO;
        let mut start = Point::ZERO;
        for seg in &self.segments {
            match *seg {
                PathSegment::MoveTo(p) => {
                    current = p;
                    start = p;
                }
                PathSegment::LineTo(p) => {
                    curves.push(Curve::Line(current, p));
                    current = p;
                }
                PathSegment::QuadTo { ctrl, to } => {
                    curves.push(Curve::Quad(current, ctrl, to));
                    current = to;
                }
                PathSegment::CubicTo { ctrl1, ctrl2, to } => {
                    curves.push(Curve::Cubic(current, ctrl1, ctrl2, to));
                    current = to;
                }
                PathSegment::Close => {
                    curves.push(Curve::Line(current, start));
                    current = start;
                }
            }
        }
        curves
    }

    /// Flatten into polylines, one per subpath.
    pub fn flatten(&self) -> Vec<Polyline> {
        let mut polylines = Vec::new();
        let mut points: Vec<Point> = Vec::new();
        let mut current = Point::ZERO;
        let mut start = Point::ZERO;

        let finish = |points: &mut Vec<Point>, closed: bool, polylines: &mut Vec<Polyline>| {
            if !points.is_empty() {
                polylines.push(Polyline {
                    points: std::mem::take(points),
                    closed,
                });
            }
        };

        for seg in &self.segments {
            match *seg {
                PathSegment::MoveTo(p) => {
                    finish(&mut points, false, &mut polylines);
                    points.push(p);
                    current = p;
                    start = p;
                }
                PathSegment::LineTo(p) => {
                    if points.is_empty() {
                        points.push(current);
                    }
                    points.push(p);
                    current = p;
                }
                PathSegment::QuadTo { ctrl, to } => {
                    if points.is_empty() {
                        points.push(current);
                    }
                    flatten_curve(&Curve::Quad(current, ctrl, to), &mut points);
                    current = to;
                }
                PathSegment::CubicTo { ctrl1, ctrl2, to } => {
                    if points.is_empty() {
                        points.push(current);
                    }
                    flatten_curve(&Curve::Cubic(current, ctrl1, ctrl2, to), &mut points);
                    current = to;
                }
                PathSegment::Close => {
                    finish(&mut points, true, &mut polylines);
                    current = start;
                }
            }
        }
        finish(&mut points, false, &mut polylines);
        polylines
    }

    /// Tight-ish bounds of the flattened path.
    pub fn bounding_box(&self) -> Option<Rect> {
        Rect::from_points(self.flatten().into_iter().flat_map(|poly| poly.points))
    }

    /// Point-in-fill test. Open subpaths are implicitly closed.
    pub fn contains(&self, p: Point, rule: FillRule) -> bool {
        let mut winding = 0i32;
        let mut crossings = 0u32;
        for poly in self.flatten() {
            let pts = &poly.points;
            if pts.len() < 3 {
                continue;
            }
            for i in 0..pts.len() {
                let a = pts[i];
                let b = pts[(i + 1) % pts.len()];
                if (a.y <= p.y) != (b.y <= p.y) {
                    let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                    if p.x < x {
                        crossings += 1;
                        winding += if b.y > a.y { 1 } else { -1 };
                    }
                }
            }
        }
        match rule {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => crossings % 2 == 1,
        }
    }

    /// Point-on-stroke test against a stroke of the given width.
    pub fn stroke_contains(&self, p: Point, width: f32) -> bool {
        let half = (width / 2.0).max(0.5);
        self.flatten().iter().any(|poly| {
            let pts = &poly.points;
            if pts.len() == 1 {
                return pts[0].distance_to(p) <= half;
            }
            let mut edges: SmallVec<[(Point, Point); 16]> =
                pts.windows(2).map(|w| (w[0], w[1])).collect();
            if poly.closed {
                if let (Some(last), Some(first)) = (pts.last(), pts.first()) {
                    edges.push((*last, *first));
                }
            }
            edges
                .iter()
                .any(|(a, b)| distance_to_segment(p, *a, *b) <= half)
        })
    }
}

/// Shortest distance from `p` to the segment `a`-`b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq <= f32::EPSILON {
        return p.distance_to(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance_to(a + ab * t)
}

fn flatten_curve(curve: &Curve, out: &mut Vec<Point>) {
    let steps = (curve.control_polygon_length() / 4.0).ceil().clamp(4.0, 128.0) as usize;
    for i in 1..=steps {
        out.push(curve.eval(i as f32 / steps as f32));
    }
}
