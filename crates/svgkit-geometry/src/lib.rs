//! # SVGKit Geometry
//!
//! Path geometry for SVGKit: points and affine transforms, abstract paths,
//! arc-to-cubic conversion, arc-length measurement and the path-data
//! mini-language.
//!
//! ## Features
//!
//! - **Paths**: move/line/quad/cubic/close segments, flattening, fill and stroke containment
//! - **Arcs**: SVG endpoint-parameterized elliptical arcs as cubic slices
//! - **Measurement**: curve lengths by chord subdivision, point and tangent at distance
//! - **Transforms**: affine matrices, `transform` attribute parsing, serialization, morphing
//! - **Path data**: `d` attribute and `points` list parsing
//!
//! ## Architecture
//!
//! ```text
//! "M 0 0 A 50 50 0 0 1 100 0"
//!    └── parse_path_data ──► Path ──┬── total_path_length / point_at_distance
//!                                   ├── transformed(Transform) ──► device path
//!                                   └── flatten ──► contains / stroke_contains
//! ```

pub mod arc;
pub mod measure;
pub mod path;
pub mod path_data;
pub mod point;
pub mod transform;

pub use arc::{add_svg_arc, calculate_vector_angle, svg_arc_from_sensible_parameters};
pub use measure::{
    calculate_normal, cubic_length, cubic_spline_step, point_and_vector_at_distance,
    point_at_distance, point_at_distance_with_step, quadratic_length, quadratic_spline_step,
    total_path_length, total_path_length_with_step, MIN_STEP,
};
pub use path::{Curve, FillRule, Path, PathSegment, Polyline};
pub use path_data::{parse_path_data, parse_points};
pub use point::{Point, Rect, Vector};
pub use transform::Transform;

/// Format a number the way SVG attribute values are written: integers
/// without a fraction, otherwise up to six decimals with trailing zeros
/// trimmed.
pub fn format_number(v: f32) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    if v.fract() == 0.0 && v.abs() < 1e9 {
        return format!("{}", v as i64);
    }
    let s = format!("{:.6}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-12.25), "-12.25");
        assert_eq!(format_number(f32::NAN), "0");
    }
}
