//! Numbers, lengths, fractions and references in attribute values.
//!
//! Unparseable input never fails: each helper has a defined fallback.

/// Length unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    User,
    Px,
    Pt,
    Pc,
    In,
    Cm,
    Mm,
    Em,
    Ex,
    Percent,
}

/// A length with its unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f32,
    pub unit: LengthUnit,
}

impl Length {
    pub const ZERO: Length = Length {
        value: 0.0,
        unit: LengthUnit::User,
    };

    /// Parse `<number><unit>?`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (number, unit) = s.split_at(numeric_prefix_len(s));
        let value: f32 = number.trim().parse().ok()?;
        let unit = match unit.trim() {
            "" => LengthUnit::User,
            "px" => LengthUnit::Px,
            "pt" => LengthUnit::Pt,
            "pc" => LengthUnit::Pc,
            "in" => LengthUnit::In,
            "cm" => LengthUnit::Cm,
            "mm" => LengthUnit::Mm,
            "em" => LengthUnit::Em,
            "ex" => LengthUnit::Ex,
            "%" => LengthUnit::Percent,
            _ => return None,
        };
        Some(Length { value, unit })
    }

    /// Convert to user units. Percentages resolve against `reference`.
    pub fn to_user_units(&self, reference: f32, font_size: f32) -> f32 {
        let v = self.value;
        match self.unit {
            LengthUnit::User | LengthUnit::Px => v,
            LengthUnit::Pt => v * 96.0 / 72.0,
            LengthUnit::Pc => v * 16.0,
            LengthUnit::In => v * 96.0,
            LengthUnit::Cm => v * 96.0 / 2.54,
            LengthUnit::Mm => v * 96.0 / 25.4,
            LengthUnit::Em => v * font_size,
            LengthUnit::Ex => v * font_size / 2.0,
            LengthUnit::Percent => v * reference / 100.0,
        }
    }
}

/// Byte length of the leading number, exponent included only when digits
/// follow it (so `2em` splits as `2` + `em`).
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'-' | b'+')) {
        i += 1;
    }
    while matches!(bytes.get(i), Some(b'0'..=b'9' | b'.')) {
        i += 1;
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'-' | b'+')) {
            j += 1;
        }
        if matches!(bytes.get(j), Some(b'0'..=b'9')) {
            while matches!(bytes.get(j), Some(b'0'..=b'9')) {
                j += 1;
            }
            i = j;
        }
    }
    i
}

/// Plain number.
pub fn parse_number(s: &str) -> Option<f32> {
    s.trim().parse::<f32>().ok().filter(|v| v.is_finite())
}

/// Length in user units; unparseable input is zero.
pub fn parse_length(s: &str, reference: f32, font_size: f32) -> f32 {
    Length::parse(s)
        .map(|l| l.to_user_units(reference, font_size))
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Number or percentage clamped to [0, 1]; `default` when unparseable.
pub fn parse_fraction(s: &str, default: f32) -> f32 {
    let s = s.trim();
    let value = match s.strip_suffix('%') {
        Some(percent) => parse_number(percent).map(|v| v / 100.0),
        None => parse_number(s),
    };
    value.unwrap_or(default).clamp(0.0, 1.0)
}

/// Whether the value is a `url(...)` reference.
pub fn is_url(s: &str) -> bool {
    s.trim_start().starts_with("url(")
}

/// The id inside `url(#id)`, tolerating quotes and whitespace.
pub fn extract_url_contents(s: &str) -> Option<&str> {
    let inner = s.trim().strip_prefix("url(")?;
    let close = inner.find(')')?;
    let id = unquoted_string(inner[..close].trim());
    let id = id.strip_prefix('#').unwrap_or(id).trim();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// The id of a `#id` fragment reference (as in `href`).
pub fn fragment_id(s: &str) -> Option<&str> {
    let id = s.trim().strip_prefix('#')?.trim();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Strip one level of matching single or double quotes.
pub fn unquoted_string(s: &str) -> &str {
    let s = s.trim();
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Parse a list of numbers separated by commas and/or whitespace, stopping
/// at the first bad entry.
pub fn parse_number_list(s: &str) -> Vec<f32> {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .map_while(parse_number)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_length_units() {
        assert_eq!(parse_length("10", 100.0, 12.0), 10.0);
        assert_eq!(parse_length("10px", 100.0, 12.0), 10.0);
        assert_eq!(parse_length("1in", 100.0, 12.0), 96.0);
        assert_eq!(parse_length("2em", 100.0, 12.0), 24.0);
        assert_eq!(parse_length("50%", 300.0, 12.0), 150.0);
        assert_eq!(parse_length("1e1", 0.0, 12.0), 10.0);
        assert_eq!(parse_length("wide", 100.0, 12.0), 0.0);
        assert_eq!(parse_length("3furlongs", 100.0, 12.0), 0.0);
    }

    #[test]
    fn test_parse_fraction() {
        assert_eq!(parse_fraction("0.25", 1.0), 0.25);
        assert_eq!(parse_fraction("50%", 1.0), 0.5);
        assert_eq!(parse_fraction("7", 1.0), 1.0);
        assert_eq!(parse_fraction("", 1.0), 1.0);
        assert_eq!(parse_fraction("bad", 0.0), 0.0);
    }

    #[test]
    fn test_url_helpers() {
        assert!(is_url(" url(#a)"));
        assert_eq!(extract_url_contents("url(#clip1)"), Some("clip1"));
        assert_eq!(extract_url_contents("url('#grad')"), Some("grad"));
        assert_eq!(extract_url_contents("url()"), None);
        assert_eq!(extract_url_contents("#clip1"), None);
        assert_eq!(fragment_id("#target"), Some("target"));
    }

    #[test]
    fn test_unquoted_string() {
        assert_eq!(unquoted_string("'Helvetica Neue'"), "Helvetica Neue");
        assert_eq!(unquoted_string("\"Arial\""), "Arial");
        assert_eq!(unquoted_string("'mismatched\""), "'mismatched\"");
    }

    #[test]
    fn test_number_list() {
        assert_eq!(parse_number_list("5, 3 2"), vec![5.0, 3.0, 2.0]);
        assert_eq!(parse_number_list("1 x 2"), vec![1.0]);
    }
}
