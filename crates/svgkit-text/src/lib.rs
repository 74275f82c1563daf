//! # SVGKit Text
//!
//! Glyph layout for SVGKit text elements.
//!
//! ## Features
//!
//! - Text shaping seam ([`TextShaper`]) with a deterministic fallback shaper
//! - Font descriptors resolved from style frames
//! - Left-to-right baseline layout with letter and word spacing
//! - Glyph placement along a path by arc length
//! - `xml:space` whitespace normalization
//!
//! Shaping itself (glyph identities, advances, outlines) belongs to the
//! embedding application; this crate only positions what a shaper returns.

mod layout;
mod shaping;
mod whitespace;

pub use layout::{
    bounding_box_for_glyphs, layout_run, position_along_path, run_advance, translate_glyphs,
    GlyphRecord,
};
pub use shaping::{
    FixedAdvanceShaper, FontDescriptor, FontStyle, FontWeight, ShapedGlyph, ShapedText,
    TextError, TextMetrics, TextShaper,
};
pub use whitespace::clean_xml_text;
