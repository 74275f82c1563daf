//! Path data (`d` attribute) and `points` list parsing.
//!
//! Parsing stops at the first malformed token and keeps everything that
//! parsed before it.

use crate::path::Path;
use crate::point::Point;

/// Cursor over path-data bytes.
struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            bytes: s.as_bytes(),
            pos: 0,
        }
    }

    fn skip_separators(&mut self) {
        while let Some(&b) = self.bytes.get(self.pos) {
            if b.is_ascii_whitespace() || b == b',' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_separators();
        self.pos >= self.bytes.len()
    }

    /// Next command letter, if the next token is one.
    fn command(&mut self) -> Option<u8> {
        self.skip_separators();
        match self.bytes.get(self.pos) {
            Some(&b) if b.is_ascii_alphabetic() && b != b'e' && b != b'E' => {
                self.pos += 1;
                Some(b)
            }
            _ => None,
        }
    }

    /// True when the next token starts a number.
    fn number_ahead(&mut self) -> bool {
        self.skip_separators();
        matches!(
            self.bytes.get(self.pos),
            Some(b'0'..=b'9' | b'-' | b'+' | b'.')
        )
    }

    fn number(&mut self) -> Option<f32> {
        self.skip_separators();
        let start = self.pos;
        let peek = |scanner: &Self| scanner.bytes.get(scanner.pos).copied();

        if matches!(peek(self), Some(b'-' | b'+')) {
            self.pos += 1;
        }
        let mut digits = 0;
        while matches!(peek(self), Some(b'0'..=b'9')) {
            self.pos += 1;
            digits += 1;
        }
        if peek(self) == Some(b'.') {
            self.pos += 1;
            while matches!(peek(self), Some(b'0'..=b'9')) {
                self.pos += 1;
                digits += 1;
            }
        }
        if digits == 0 {
            self.pos = start;
            return None;
        }
        if matches!(peek(self), Some(b'e' | b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(peek(self), Some(b'-' | b'+')) {
                self.pos += 1;
            }
            let exp_start = self.pos;
            while matches!(peek(self), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
            if self.pos == exp_start {
                self.pos = mark;
            }
        }

        std::str::from_utf8(&self.bytes[start..self.pos])
            .ok()
            .and_then(|s| s.parse().ok())
    }

    fn flag(&mut self) -> Option<bool> {
        self.skip_separators();
        let flag = match self.bytes.get(self.pos) {
            Some(b'0') => false,
            Some(b'1') => true,
            _ => return None,
        };
        self.pos += 1;
        Some(flag)
    }

    fn point(&mut self) -> Option<Point> {
        let x = self.number()?;
        let y = self.number()?;
        Some(Point::new(x, y))
    }
}

/// Convert path data into an absolute [`Path`].
pub fn parse_path_data(d: &str) -> Path {
    let mut path = Path::new();
    let mut scanner = Scanner::new(d);
    let mut command: Option<u8> = None;
    let mut current = Point::ZERO;
    let mut subpath_start = Point::ZERO;
    // Reflection source for S/T; cleared by any other command.
    let mut last_cubic_ctrl: Option<Point> = None;
    let mut last_quad_ctrl: Option<Point> = None;

    while !scanner.at_end() {
        let cmd = match scanner.command() {
            Some(c) => c,
            None if scanner.number_ahead() => match command {
                // Implicit repetition; a repeated move becomes a line.
                Some(b'M') => b'L',
                Some(b'm') => b'l',
                Some(c) if c != b'Z' && c != b'z' => c,
                _ => break,
            },
            None => break,
        };

        let relative = cmd.is_ascii_lowercase();
        let base = if relative { current } else { Point::ZERO };
        let abs = |p: Point| p + base;

        let ok = match cmd.to_ascii_uppercase() {
            b'M' => scanner.point().map(|p| {
                let p = abs(p);
                path.move_to(p);
                current = p;
                subpath_start = p;
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
            }),
            b'L' => scanner.point().map(|p| {
                let p = abs(p);
                path.line_to(p);
                current = p;
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
            }),
            b'H' => scanner.number().map(|x| {
                let p = Point::new(if relative { current.x + x } else { x }, current.y);
                path.line_to(p);
                current = p;
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
            }),
            b'V' => scanner.number().map(|y| {
                let p = Point::new(current.x, if relative { current.y + y } else { y });
                path.line_to(p);
                current = p;
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
            }),
            b'C' => (|| {
                let c1 = abs(scanner.point()?);
                let c2 = abs(scanner.point()?);
                let to = abs(scanner.point()?);
                Some((c1, c2, to))
            })()
            .map(|(c1, c2, to)| {
                path.cubic_to(c1, c2, to);
                current = to;
                last_cubic_ctrl = Some(c2);
                last_quad_ctrl = None;
            }),
            b'S' => (|| {
                let c2 = abs(scanner.point()?);
                let to = abs(scanner.point()?);
                Some((c2, to))
            })()
            .map(|(c2, to)| {
                let c1 = last_cubic_ctrl
                    .map(|c| current + (current - c))
                    .unwrap_or(current);
                path.cubic_to(c1, c2, to);
                current = to;
                last_cubic_ctrl = Some(c2);
                last_quad_ctrl = None;
            }),
            b'Q' => (|| {
                let c = abs(scanner.point()?);
                let to = abs(scanner.point()?);
                Some((c, to))
            })()
            .map(|(c, to)| {
                path.quad_to(c, to);
                current = to;
                last_quad_ctrl = Some(c);
                last_cubic_ctrl = None;
            }),
            b'T' => scanner.point().map(|p| {
                let to = abs(p);
                let c = last_quad_ctrl
                    .map(|c| current + (current - c))
                    .unwrap_or(current);
                path.quad_to(c, to);
                current = to;
                last_quad_ctrl = Some(c);
                last_cubic_ctrl = None;
            }),
            b'A' => (|| {
                let rx = scanner.number()?;
                let ry = scanner.number()?;
                let rotation = scanner.number()?;
                let large = scanner.flag()?;
                let sweep = scanner.flag()?;
                let to = abs(scanner.point()?);
                Some((rx, ry, rotation, large, sweep, to))
            })()
            .map(|(rx, ry, rotation, large, sweep, to)| {
                path.arc_to(rx, ry, rotation, large, sweep, to);
                current = to;
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
            }),
            b'Z' => {
                path.close();
                current = subpath_start;
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
                Some(())
            }
            _ => None,
        };

        if ok.is_none() {
            tracing::debug!(data = d, offset = scanner.pos, "path data stopped at malformed token");
            break;
        }
        command = Some(cmd);
    }

    path
}

/// Parse a `points` list. A trailing odd coordinate is dropped, and parsing
/// stops at the first token that is not a number.
pub fn parse_points(s: &str) -> Vec<Point> {
    let mut scanner = Scanner::new(s);
    let mut points = Vec::new();
    while !scanner.at_end() {
        match scanner.point() {
            Some(p) => points.push(p),
            None => break,
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathSegment;

    #[test]
    fn test_parse_absolute_and_relative() {
        let path = parse_path_data("M10 10 L20 10 l0 10 h-10 z");
        assert_eq!(
            path.segments(),
            &[
                PathSegment::MoveTo(Point::new(10.0, 10.0)),
                PathSegment::LineTo(Point::new(20.0, 10.0)),
                PathSegment::LineTo(Point::new(20.0, 20.0)),
                PathSegment::LineTo(Point::new(10.0, 20.0)),
                PathSegment::Close,
            ]
        );
    }

    #[test]
    fn test_implicit_lineto_after_move() {
        let path = parse_path_data("m1,1 2,0 0,2");
        assert_eq!(path.current_point(), Some(Point::new(3.0, 3.0)));
        assert_eq!(path.segments().len(), 3);
    }

    #[test]
    fn test_compact_numbers() {
        let path = parse_path_data("M.5.5L-1e1-2");
        assert_eq!(
            path.segments(),
            &[
                PathSegment::MoveTo(Point::new(0.5, 0.5)),
                PathSegment::LineTo(Point::new(-10.0, -2.0)),
            ]
        );
    }

    #[test]
    fn test_smooth_cubic_reflects_control() {
        let path = parse_path_data("M0 0 C0 10 10 10 10 0 S20 -10 20 0");
        match path.segments()[2] {
            PathSegment::CubicTo { ctrl1, .. } => assert_eq!(ctrl1, Point::new(10.0, -10.0)),
            other => panic!("unexpected segment {:?}", other),
        }
    }

    #[test]
    fn test_arc_command() {
        let path = parse_path_data("M0 0 A50 50 0 0 1 100 0");
        assert_eq!(path.current_point(), Some(Point::new(100.0, 0.0)));
        // Flags may be written without separators.
        let packed = parse_path_data("M0 0a50 50 0 01100 0");
        assert_eq!(packed.current_point(), Some(Point::new(100.0, 0.0)));
    }

    #[test]
    fn test_malformed_keeps_prefix() {
        let path = parse_path_data("M0 0 L10 0 L oops 20");
        assert_eq!(path.segments().len(), 2);
        assert!(parse_path_data("10 10").is_empty());
        assert!(parse_path_data("").is_empty());
    }

    #[test]
    fn test_parse_points() {
        assert_eq!(
            parse_points("0,0 10,0 10 10 5"),
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)]
        );
        assert_eq!(parse_points("1,2 x 3,4"), vec![Point::new(1.0, 2.0)]);
    }
}
