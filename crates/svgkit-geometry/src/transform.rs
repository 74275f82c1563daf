//! Affine transforms and the `transform` attribute mini-language.

use std::f32::consts::PI;

use smallvec::SmallVec;

use crate::point::{Point, Rect, Vector};
use crate::format_number;

/// 2D affine transform matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Matrix elements [a, b, c, d, e, f]
    /// Represents: [a c e]
    ///             [b d f]
    ///             [0 0 1]
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Create identity transform.
    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub const fn from_row(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn from_translate(tx: f32, ty: f32) -> Self {
        Self::from_row(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn from_scale(sx: f32, sy: f32) -> Self {
        Self::from_row(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `angle` radians.
    pub fn from_rotate(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::from_row(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Append a translation (applied before `self`).
    pub fn translate(self, tx: f32, ty: f32) -> Self {
        self.multiply(&Self::from_translate(tx, ty))
    }

    /// Append a scale (applied before `self`).
    pub fn scale(self, sx: f32, sy: f32) -> Self {
        self.multiply(&Self::from_scale(sx, sy))
    }

    /// Append a rotation in radians (applied before `self`).
    pub fn rotate(self, angle: f32) -> Self {
        self.multiply(&Self::from_rotate(angle))
    }

    /// Append a skew along x, angle in radians.
    pub fn skew_x(self, angle: f32) -> Self {
        self.multiply(&Self::from_row(1.0, 0.0, angle.tan(), 1.0, 0.0, 0.0))
    }

    /// Append a skew along y, angle in radians.
    pub fn skew_y(self, angle: f32) -> Self {
        self.multiply(&Self::from_row(1.0, angle.tan(), 0.0, 1.0, 0.0, 0.0))
    }

    /// `self * other`: `other` maps first, then `self`.
    pub fn multiply(&self, other: &Transform) -> Self {
        Transform {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    /// Transform a point.
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// Transform a direction (ignores translation).
    pub fn apply_vector(&self, v: Vector) -> Vector {
        Point::new(self.a * v.x + self.c * v.y, self.b * v.x + self.d * v.y)
    }

    /// Bounding box of a transformed rectangle.
    pub fn apply_rect(&self, rect: &Rect) -> Rect {
        Rect::from_points(rect.corners().iter().map(|p| self.apply(*p))).unwrap_or(Rect::ZERO)
    }

    pub fn determinant(&self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse transform, `None` when singular.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < 1e-10 {
            return None;
        }
        let inv_det = 1.0 / det;
        Some(Transform {
            a: self.d * inv_det,
            b: -self.b * inv_det,
            c: -self.c * inv_det,
            d: self.a * inv_det,
            e: (self.c * self.f - self.d * self.e) * inv_det,
            f: (self.b * self.e - self.a * self.f) * inv_det,
        })
    }

    /// Uniform scale approximation: sqrt(|det|). Used for stroke widths.
    pub fn scale_factor(&self) -> f32 {
        self.determinant().abs().sqrt()
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Parse a `transform` attribute value.
    ///
    /// Functions compose left to right. A list with any malformed function,
    /// including a wrong argument count, is rejected whole and yields
    /// identity.
    pub fn parse(s: &str) -> Self {
        let functions: Option<Vec<TransformFunction>> = TransformFunctions::new(s).collect();
        match functions {
            Some(functions) => functions
                .iter()
                .fold(Self::IDENTITY, |acc, function| acc.multiply(&function.to_transform())),
            None => {
                tracing::debug!(transform = s, "malformed transform list ignored");
                Self::IDENTITY
            }
        }
    }

    /// Canonical `matrix(a,b,c,d,e,f)` form.
    pub fn to_svg_string(&self) -> String {
        format!(
            "matrix({},{},{},{},{},{})",
            format_number(self.a),
            format_number(self.b),
            format_number(self.c),
            format_number(self.d),
            format_number(self.e),
            format_number(self.f)
        )
    }

    /// Component-wise blend towards `other`; `fraction` is clamped to [0, 1].
    pub fn interpolate(&self, other: &Transform, fraction: f32) -> Self {
        let t = fraction.clamp(0.0, 1.0);
        let mix = |from: f32, to: f32| from + (to - from) * t;
        Transform {
            a: mix(self.a, other.a),
            b: mix(self.b, other.b),
            c: mix(self.c, other.c),
            d: mix(self.d, other.d),
            e: mix(self.e, other.e),
            f: mix(self.f, other.f),
        }
    }

    /// Blend two transform strings, returning the canonical matrix form.
    pub fn morph(old: &str, new: &str, fraction: f32) -> String {
        Self::parse(old)
            .interpolate(&Self::parse(new), fraction)
            .to_svg_string()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// One entry of a transform list, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
enum TransformFunction {
    Matrix([f32; 6]),
    Translate(f32, f32),
    Scale(f32, f32),
    Rotate { degrees: f32, center: Option<(f32, f32)> },
    SkewX(f32),
    SkewY(f32),
}

impl TransformFunction {
    fn new(name: &str, args: &[f32]) -> Option<Self> {
        Some(match (name, args) {
            ("matrix", &[a, b, c, d, e, f]) => Self::Matrix([a, b, c, d, e, f]),
            ("translate", &[tx]) => Self::Translate(tx, 0.0),
            ("translate", &[tx, ty]) => Self::Translate(tx, ty),
            ("scale", &[s]) => Self::Scale(s, s),
            ("scale", &[sx, sy]) => Self::Scale(sx, sy),
            ("rotate", &[degrees]) => Self::Rotate { degrees, center: None },
            ("rotate", &[degrees, cx, cy]) => Self::Rotate {
                degrees,
                center: Some((cx, cy)),
            },
            ("skewX", &[degrees]) => Self::SkewX(degrees),
            ("skewY", &[degrees]) => Self::SkewY(degrees),
            _ => return None,
        })
    }

    fn to_transform(self) -> Transform {
        let radians = |degrees: f32| degrees * PI / 180.0;
        match self {
            Self::Matrix([a, b, c, d, e, f]) => Transform::from_row(a, b, c, d, e, f),
            Self::Translate(tx, ty) => Transform::from_translate(tx, ty),
            Self::Scale(sx, sy) => Transform::from_scale(sx, sy),
            Self::Rotate { degrees, center: None } => Transform::from_rotate(radians(degrees)),
            Self::Rotate {
                degrees,
                center: Some((cx, cy)),
            } => Transform::from_translate(cx, cy)
                .rotate(radians(degrees))
                .translate(-cx, -cy),
            Self::SkewX(degrees) => Transform::IDENTITY.skew_x(radians(degrees)),
            Self::SkewY(degrees) => Transform::IDENTITY.skew_y(radians(degrees)),
        }
    }
}

/// Splits a transform list into functions; yields `None` for a malformed
/// entry and then stops.
struct TransformFunctions<'a> {
    rest: &'a str,
}

impl<'a> TransformFunctions<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }

    fn skip_separators(&mut self) {
        self.rest = self.rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
    }
}

impl Iterator for TransformFunctions<'_> {
    type Item = Option<TransformFunction>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_separators();
        if self.rest.is_empty() {
            return None;
        }
        let parsed = self.rest.split_once('(').and_then(|(name, tail)| {
            let (body, after) = tail.split_once(')')?;
            let args: SmallVec<[f32; 6]> = body
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|p| !p.is_empty())
                .map(|p| p.parse::<f32>().ok())
                .collect::<Option<_>>()?;
            Some((TransformFunction::new(name.trim(), &args)?, after))
        });
        match parsed {
            Some((function, after)) => {
                self.rest = after;
                Some(Some(function))
            }
            None => {
                self.rest = "";
                Some(None)
            }
        }
    }
}
