//! # SVGKit Style
//!
//! Attribute resolution for SVGKit.
//!
//! ## Features
//!
//! - **Attribute maps**: ordered, immutable maps with a memoized structural hash
//! - **Cascade**: filtered merging, compact `style` strings, presentation lookup
//! - **Class styles**: `.name` and `element.name` rules from `style` elements
//! - **Colors**: the SVG color keywords, hex and `rgb()` forms, paints
//! - **Values**: numbers, lengths, fractions and `url(#id)` references
//! - **Morphing**: interpolation between two attribute maps
//!
//! ## Lookup order
//!
//! ```text
//! direct attribute ──► style="k:v;…" ──► class rules (element.class, .class)
//! ```

pub mod attributes;
pub mod cascade;
pub mod class_styles;
pub mod color;
pub mod morph;
pub mod values;

pub use attributes::{attribute_map, AttributeMap, AttributeValue, AttributedNode};
pub use cascade::{
    default_drawing_attributes, environment_ok, inheritable_attributes, is_inheritable,
    merge_style_attributes, merge_style_attributes_with, parse_compact_style,
    presentation_attributes, serialize_compact_style, style_entries, text_for_style_attribute,
    value_for_style_attribute, INHERITABLE_ATTRIBUTES,
};
pub use class_styles::ClassStyles;
pub use color::{morph_color_string, named_color, parse_svg_color, resolve_color, Color, Paint};
pub use morph::morph_style_attributes;
pub use values::{
    extract_url_contents, fragment_id, is_url, parse_fraction, parse_length, parse_number,
    parse_number_list, unquoted_string, Length, LengthUnit,
};
