//! Arc-length measurement.
//!
//! Curve lengths are approximated by subdividing the curve parameter into
//! equal `step` increments and summing chord lengths. Chords never exceed
//! the arc they span, so refining the step approaches the true length from
//! below. Sums accumulate in `f64`.

use crate::path::{Curve, Path};
use crate::point::{Point, Vector};

/// Fewest chords used by the automatic step.
const MIN_SEGMENTS: f32 = 8.0;
/// Most chords used by the automatic step.
const MAX_SEGMENTS: f32 = 1000.0;
/// Smallest caller-supplied step honoured; finer steps are raised to this.
pub const MIN_STEP: f32 = 1.0e-4;

fn auto_step(polygon_length: f32) -> f32 {
    1.0 / (polygon_length / 2.0).ceil().clamp(MIN_SEGMENTS, MAX_SEGMENTS)
}

fn effective_step(step: f32, fallback: impl FnOnce() -> f32) -> f32 {
    if step.is_finite() && step > 0.0 {
        step.clamp(MIN_STEP, 1.0)
    } else {
        fallback()
    }
}

/// Parameter step for a quadratic curve, from its control-polygon size.
pub fn quadratic_spline_step(start: Point, end: Point, control: Point) -> f32 {
    auto_step(Curve::Quad(start, control, end).control_polygon_length())
}

/// Parameter step for a cubic curve, from its control-polygon size.
pub fn cubic_spline_step(start: Point, end: Point, control1: Point, control2: Point) -> f32 {
    auto_step(Curve::Cubic(start, control1, control2, end).control_polygon_length())
}

/// Approximate length of a quadratic curve. A step outside (0, 1] selects
/// [`quadratic_spline_step`].
pub fn quadratic_length(start: Point, end: Point, control: Point, step: f32) -> f32 {
    let step = effective_step(step, || quadratic_spline_step(start, end, control));
    chord_length(&Curve::Quad(start, control, end), step)
}

/// Approximate length of a cubic curve. A step outside (0, 1] selects
/// [`cubic_spline_step`].
pub fn cubic_length(start: Point, end: Point, control1: Point, control2: Point, step: f32) -> f32 {
    let step = effective_step(step, || cubic_spline_step(start, end, control1, control2));
    chord_length(&Curve::Cubic(start, control1, control2, end), step)
}

fn segments_for(curve: &Curve, step: Option<f32>) -> usize {
    match curve {
        Curve::Line(..) => 1,
        _ => {
            let step = step
                .filter(|s| s.is_finite() && *s > 0.0)
                .map(|s| s.clamp(MIN_STEP, 1.0))
                .unwrap_or_else(|| auto_step(curve.control_polygon_length()));
            (1.0 / step).ceil().max(1.0) as usize
        }
    }
}

fn chord_length(curve: &Curve, step: f32) -> f32 {
    let n = (1.0 / step).ceil().max(1.0) as usize;
    chord_sum(curve, n) as f32
}

/// Sum of the chords of `curve` split into `n` equal parameter steps.
fn chord_sum(curve: &Curve, n: usize) -> f64 {
    let mut total = 0.0;
    for_each_chord(curve, n, |chord| total += chord);
    total
}

fn for_each_chord(curve: &Curve, n: usize, mut f: impl FnMut(f64)) {
    if let Curve::Line(p0, p1) = *curve {
        f(p0.distance_to(p1) as f64);
        return;
    }
    let mut prev = curve.start();
    for i in 1..=n {
        let p = if i == n {
            curve.end()
        } else {
            curve.eval(i as f32 / n as f32)
        };
        let (dx, dy) = ((p.x - prev.x) as f64, (p.y - prev.y) as f64);
        f(dx.hypot(dy));
        prev = p;
    }
}

/// Chord lengths of `curve` split into `n` equal parameter steps.
fn chords(curve: &Curve, n: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(if matches!(curve, Curve::Line(..)) { 1 } else { n });
    for_each_chord(curve, n, |chord| out.push(chord));
    out
}

fn curve_length(curve: &Curve, step: Option<f32>) -> f64 {
    chord_sum(curve, segments_for(curve, step))
}

/// Total drawn length of a path. Moves contribute nothing; closes count as
/// the line back to the subpath start.
pub fn total_path_length(path: &Path) -> f32 {
    total_path_length_with_step(path, None)
}

/// [`total_path_length`] with an explicit curve step.
pub fn total_path_length_with_step(path: &Path, step: Option<f32>) -> f32 {
    path.curves()
        .iter()
        .map(|c| curve_length(c, step))
        .sum::<f64>() as f32
}

/// Perpendicular unit vector to the segment `start`-`end`, rotated a
/// quarter turn from its direction. Zero for a zero-length segment.
pub fn calculate_normal(start: Point, end: Point) -> Vector {
    let d = end - start;
    Point::new(-d.y, d.x).normalized()
}

/// Point and unit tangent at `distance` along `path`.
///
/// `callback` is invoked exactly once. Distances at or below zero give the
/// start point and initial tangent; distances at or past the end give the
/// end point and final tangent. An empty path reports the origin (or its
/// lone move point) with a tangent along +x.
pub fn point_and_vector_at_distance<F>(distance: f32, path: &Path, callback: F)
where
    F: FnOnce(Point, Vector),
{
    let (point, tangent) = locate(distance, path, None);
    callback(point, tangent);
}

/// Value-returning form of [`point_and_vector_at_distance`].
pub fn point_at_distance(distance: f32, path: &Path) -> (Point, Vector) {
    locate(distance, path, None)
}

/// [`point_at_distance`] with an explicit curve step. `None`, or a step
/// outside (0, 1], selects the automatic step per curve.
pub fn point_at_distance_with_step(distance: f32, path: &Path, step: Option<f32>) -> (Point, Vector) {
    locate(distance, path, step)
}

pub(crate) fn locate(distance: f32, path: &Path, step: Option<f32>) -> (Point, Vector) {
    const FALLBACK_TANGENT: Vector = Point::new(1.0, 0.0);

    let curves = path.curves();
    let measured: Vec<(Curve, usize, Vec<f64>)> = curves
        .iter()
        .map(|c| {
            let n = segments_for(c, step);
            (*c, n, chords(c, n))
        })
        .filter(|(_, _, lengths)| lengths.iter().sum::<f64>() > 0.0)
        .collect();

    let (first, last) = match (measured.first(), measured.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            let origin = curves
                .first()
                .map(|c| c.start())
                .or_else(|| path.start_point())
                .unwrap_or(Point::ZERO);
            return (origin, FALLBACK_TANGENT);
        }
    };

    if distance <= 0.0 {
        return (first.0.start(), first.0.tangent(0.0));
    }

    let target = distance as f64;
    let mut travelled = 0.0f64;
    for (curve, n, lengths) in &measured {
        let length: f64 = lengths.iter().sum();
        if travelled + length < target {
            travelled += length;
            continue;
        }
        let mut remaining = target - travelled;
        for (i, chord) in lengths.iter().enumerate() {
            if remaining <= *chord || i + 1 == lengths.len() {
                let within = if *chord > 0.0 { (remaining / chord).min(1.0) } else { 0.0 };
                let t = ((i as f64 + within) / *n as f64) as f32;
                return (curve.eval(t), curve.tangent(t));
            }
            remaining -= chord;
        }
    }

    (last.0.end(), last.0.tangent(1.0))
}
