//! Shaping seam: font descriptors, shaped runs and the shaper trait.

use smallvec::SmallVec;
use svgkit_common::SvgKitError;
use svgkit_style::{parse_length, text_for_style_attribute, unquoted_string, AttributeMap};
use thiserror::Error;

/// Errors from a text shaping collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TextError {
    #[error("Not implemented by this shaper")]
    NotImplemented,
    #[error("Font not found: {0}")]
    FontNotFound(String),
    #[error("Shaping failed: {0}")]
    ShapingFailed(String),
}

impl From<TextError> for SvgKitError {
    fn from(err: TextError) -> Self {
        SvgKitError::text_with_source("text shaping failed", err)
    }
}

/// Font style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

/// Numeric font weight (100-900).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontWeight(pub u32);

impl FontWeight {
    pub const NORMAL: FontWeight = FontWeight(400);
    pub const BOLD: FontWeight = FontWeight(700);

    /// Resolve a `font-weight` value relative to the inherited weight.
    pub fn parse(s: &str, inherited: FontWeight) -> FontWeight {
        match s.trim() {
            "normal" => Self::NORMAL,
            "bold" => Self::BOLD,
            "bolder" => FontWeight((inherited.0 + 300).min(900)),
            "lighter" => FontWeight(inherited.0.saturating_sub(300).max(100)),
            other => other
                .parse::<u32>()
                .map(|w| FontWeight(w.clamp(100, 900)))
                .unwrap_or(inherited),
        }
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    pub family: String,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub size: f32,
}

impl FontDescriptor {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            weight: FontWeight::NORMAL,
            style: FontStyle::Normal,
            size,
        }
    }

    /// Font selected by a resolved style frame, falling back to `base` for
    /// anything missing or unparseable.
    pub fn from_style(style: &AttributeMap, base: &FontDescriptor) -> Self {
        let text = |name| text_for_style_attribute(name, style, None, None);

        let family = text("font-family")
            .and_then(|list| {
                list.split(',')
                    .map(|f| unquoted_string(f).trim().to_string())
                    .find(|f| !f.is_empty())
            })
            .unwrap_or_else(|| base.family.clone());

        let size = text("font-size")
            .map(|s| parse_length(&s, base.size, base.size))
            .filter(|s| *s > 0.0)
            .unwrap_or(base.size);

        let weight = text("font-weight")
            .map(|w| FontWeight::parse(&w, base.weight))
            .unwrap_or(base.weight);

        let style = match text("font-style").as_deref() {
            Some("italic") => FontStyle::Italic,
            Some("oblique") => FontStyle::Oblique,
            Some("normal") => FontStyle::Normal,
            _ => base.style,
        };

        Self {
            family,
            weight,
            style,
            size,
        }
    }
}

/// Vertical font metrics in user units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_height: f32,
    pub em_size: f32,
    pub x_height: f32,
    pub cap_height: f32,
}

impl TextMetrics {
    /// Typical proportions for a font of `size`.
    pub fn approximate(size: f32) -> Self {
        Self {
            ascent: size * 0.8,
            descent: size * 0.2,
            line_height: size * 1.2,
            em_size: size,
            x_height: size * 0.5,
            cap_height: size * 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapedGlyph {
    pub glyph_id: u32,
    pub x_offset: f32,
    pub y_offset: f32,
    pub advance: f32,
    /// Byte index of the source character in the shaped text.
    pub cluster: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapedText {
    pub glyphs: SmallVec<[ShapedGlyph; 16]>,
    pub width: f32,
    pub metrics: TextMetrics,
}

/// Text shaping collaborator: glyph identities and advances for a run.
pub trait TextShaper: Send + Sync {
    fn shape(&self, text: &str, font: &FontDescriptor) -> Result<ShapedText, TextError>;

    fn metrics(&self, font: &FontDescriptor) -> Result<TextMetrics, TextError> {
        Ok(TextMetrics::approximate(font.size))
    }
}

/// Deterministic shaper: every character advances a fixed share of the
/// font size and its glyph id is its code point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAdvanceShaper {
    pub advance_ratio: f32,
}

impl Default for FixedAdvanceShaper {
    fn default() -> Self {
        Self { advance_ratio: 0.6 }
    }
}

impl TextShaper for FixedAdvanceShaper {
    fn shape(&self, text: &str, font: &FontDescriptor) -> Result<ShapedText, TextError> {
        if !font.size.is_finite() || font.size < 0.0 {
            return Err(TextError::ShapingFailed(format!("invalid font size {}", font.size)));
        }
        let advance = font.size * self.advance_ratio;
        let glyphs: SmallVec<[ShapedGlyph; 16]> = text
            .char_indices()
            .map(|(index, c)| ShapedGlyph {
                glyph_id: c as u32,
                x_offset: 0.0,
                y_offset: 0.0,
                advance,
                cluster: index as u32,
            })
            .collect();
        Ok(ShapedText {
            width: advance * glyphs.len() as f32,
            glyphs,
            metrics: TextMetrics::approximate(font.size),
        })
    }
}
