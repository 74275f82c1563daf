//! SVG elliptical arcs.
//!
//! Endpoint parameterization is converted to center form (SVG 1.1, F.6.5)
//! and emitted as cubic slices of at most 90 degrees each.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::format_number;
use crate::path::Path;
use crate::point::{Point, Vector};

/// Signed angle in radians that rotates `v1` onto `v2`.
pub fn calculate_vector_angle(v1: Vector, v2: Vector) -> f32 {
    vector_angle(
        (v1.x as f64, v1.y as f64),
        (v2.x as f64, v2.y as f64),
    ) as f32
}

fn vector_angle(u: (f64, f64), v: (f64, f64)) -> f64 {
    let dot = u.0 * v.0 + u.1 * v.1;
    let cross = u.0 * v.1 - u.1 * v.0;
    cross.atan2(dot)
}

/// Append an SVG arc from the path's current point to `end`.
///
/// A path with no current point starts the arc at the origin. Zero radii
/// degrade to a straight line; an arc ending where it starts appends
/// nothing. Radii too small to span the endpoints are scaled up.
pub fn add_svg_arc(
    path: &mut Path,
    rx: f32,
    ry: f32,
    x_axis_rotation_deg: f32,
    large_arc: bool,
    sweep: bool,
    end: Point,
) {
    let start = match path.current_point() {
        Some(p) => p,
        None => {
            path.move_to(Point::ZERO);
            Point::ZERO
        }
    };

    if start.approx_eq(end, 1e-6) {
        return;
    }
    if rx == 0.0 || ry == 0.0 || !rx.is_finite() || !ry.is_finite() {
        path.line_to(end);
        return;
    }

    let (x1, y1) = (start.x as f64, start.y as f64);
    let (x2, y2) = (end.x as f64, end.y as f64);
    let mut rx = (rx as f64).abs();
    let mut ry = (ry as f64).abs();
    let phi = (x_axis_rotation_deg as f64).to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();

    // Step 1: midpoint in the rotated frame.
    let dx2 = (x1 - x2) / 2.0;
    let dy2 = (y1 - y2) / 2.0;
    let x1p = cos_phi * dx2 + sin_phi * dy2;
    let y1p = -sin_phi * dx2 + cos_phi * dy2;

    // Radii correction.
    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let scale = lambda.sqrt();
        rx *= scale;
        ry *= scale;
    }

    // Step 2: center in the rotated frame.
    let rx2 = rx * rx;
    let ry2 = ry * ry;
    let num = rx2 * ry2 - rx2 * y1p * y1p - ry2 * x1p * x1p;
    let den = rx2 * y1p * y1p + ry2 * x1p * x1p;
    let coef = if den > 0.0 { (num.max(0.0) / den).sqrt() } else { 0.0 };
    let sign = if large_arc == sweep { -1.0 } else { 1.0 };
    let cxp = sign * coef * (rx * y1p / ry);
    let cyp = sign * coef * -(ry * x1p / rx);

    // Step 3: center in user space.
    let cx = cos_phi * cxp - sin_phi * cyp + (x1 + x2) / 2.0;
    let cy = sin_phi * cxp + cos_phi * cyp + (y1 + y2) / 2.0;

    // Step 4: start angle and sweep.
    let u = ((x1p - cxp) / rx, (y1p - cyp) / ry);
    let v = ((-x1p - cxp) / rx, (-y1p - cyp) / ry);
    let theta1 = vector_angle((1.0, 0.0), u);
    let mut delta = vector_angle(u, v);
    if !sweep && delta > 0.0 {
        delta -= 2.0 * PI;
    } else if sweep && delta < 0.0 {
        delta += 2.0 * PI;
    }

    let slices = (delta.abs() / FRAC_PI_2 - 1e-9).ceil().max(1.0) as usize;
    let slice = delta / slices as f64;
    let k = 4.0 / 3.0 * (slice / 4.0).tan();

    let map = |x: f64, y: f64| {
        Point::new(
            (cx + rx * cos_phi * x - ry * sin_phi * y) as f32,
            (cy + rx * sin_phi * x + ry * cos_phi * y) as f32,
        )
    };

    for i in 0..slices {
        let t1 = theta1 + slice * i as f64;
        let t2 = t1 + slice;
        let (s1, c1) = t1.sin_cos();
        let (s2, c2) = t2.sin_cos();
        let ctrl1 = map(c1 - k * s1, s1 + k * c1);
        let ctrl2 = map(c2 + k * s2, s2 - k * c2);
        let to = if i + 1 == slices { end } else { map(c2, s2) };
        path.cubic_to(ctrl1, ctrl2, to);
    }
}

/// SVG path data for an arc of an origin-centered ellipse between two
/// angles in degrees: a move to the start point followed by one or two `A`
/// commands (two when the arc spans a full turn).
pub fn svg_arc_from_sensible_parameters(
    rx: f32,
    ry: f32,
    x_axis_rotation_deg: f32,
    start_angle_deg: f32,
    end_angle_deg: f32,
) -> String {
    let phi = (x_axis_rotation_deg as f64).to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let at = |deg: f64| {
        let (s, c) = deg.to_radians().sin_cos();
        let (x, y) = (rx as f64 * c, ry as f64 * s);
        Point::new(
            (cos_phi * x - sin_phi * y) as f32,
            (sin_phi * x + cos_phi * y) as f32,
        )
    };

    let start = start_angle_deg as f64;
    let end = end_angle_deg as f64;
    let span = end - start;
    let sweep = span >= 0.0;
    let p0 = at(start);
    let mut d = format!("M{},{}", format_number(p0.x), format_number(p0.y));

    let arc = |d: &mut String, large: bool, to: Point| {
        d.push_str(&format!(
            " A{},{} {} {},{} {},{}",
            format_number(rx),
            format_number(ry),
            format_number(x_axis_rotation_deg),
            large as u8,
            sweep as u8,
            format_number(to.x),
            format_number(to.y)
        ));
    };

    if span.abs() >= 360.0 {
        arc(&mut d, false, at(start + 180.0_f64.copysign(span)));
        arc(&mut d, false, p0);
    } else {
        arc(&mut d, span.abs() > 180.0, at(end));
    }
    d
}
