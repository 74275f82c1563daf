//! Attribute cascade: merging, compact `style` strings, presentation lookup
//! and environment gating.

use std::borrow::Cow;

use crate::attributes::{AttributeMap, AttributeValue};
use crate::class_styles::ClassStyles;

/// Presentation attributes a child inherits from its parent frame.
pub const INHERITABLE_ATTRIBUTES: &[&str] = &[
    "clip-rule",
    "color",
    "direction",
    "fill",
    "fill-opacity",
    "fill-rule",
    "font-family",
    "font-size",
    "font-style",
    "font-weight",
    "letter-spacing",
    "stroke",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-opacity",
    "stroke-width",
    "text-anchor",
    "visibility",
    "word-spacing",
];

/// Attributes that identify or classify an element rather than style it.
const NON_PRESENTATION: &[&str] = &["class", "id", "style", "xml:id"];

pub fn is_inheritable(key: &str) -> bool {
    INHERITABLE_ATTRIBUTES.binary_search(&key).is_ok()
}

/// The inheritable subset of a style frame.
pub fn inheritable_attributes(frame: &AttributeMap) -> AttributeMap {
    frame
        .iter()
        .filter(|(k, _)| is_inheritable(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Root style frame for a render pass.
pub fn default_drawing_attributes() -> AttributeMap {
    let mut map = AttributeMap::new();
    let mut set = |k: &str, v: AttributeValue| {
        map.insert(k.to_string(), v);
    };
    set("fill", "black".into());
    set("fill-opacity", AttributeValue::Number(1.0));
    set("fill-rule", "nonzero".into());
    set("stroke", "none".into());
    set("stroke-width", AttributeValue::Number(1.0));
    set("stroke-opacity", AttributeValue::Number(1.0));
    set("stroke-linecap", "butt".into());
    set("stroke-linejoin", "miter".into());
    set("stroke-miterlimit", AttributeValue::Number(4.0));
    set("stroke-dashoffset", AttributeValue::Number(0.0));
    set("visibility", "visible".into());
    map
}

/// Overlay `overlay` on `parent`, always replacing.
pub fn merge_style_attributes(parent: &AttributeMap, overlay: &AttributeMap) -> AttributeMap {
    merge_style_attributes_with(parent, overlay, |_, _, _| true)
}

/// Overlay `overlay` on `parent`. Each overlay entry is taken only when
/// `filter(key, parent_value, overlay_value)` allows it; parent-only keys
/// pass through. Always returns a new map.
pub fn merge_style_attributes_with<F>(parent: &AttributeMap, overlay: &AttributeMap, filter: F) -> AttributeMap
where
    F: Fn(&str, Option<&AttributeValue>, &AttributeValue) -> bool,
{
    let mut result = parent.clone();
    for (key, value) in overlay {
        if filter(key, parent.get(key), value) {
            result.insert(key.clone(), value.clone());
        }
    }
    result
}

/// Parse `key:value;key:value`. Fragments without a key or value are dropped.
pub fn parse_compact_style(style: &str) -> AttributeMap {
    style
        .split(';')
        .filter_map(|fragment| {
            let (key, value) = fragment.split_once(':')?;
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                return None;
            }
            Some((key.to_string(), AttributeValue::from(value)))
        })
        .collect()
}

/// Serialize to `key:value;key:value`. Nested maps are skipped.
pub fn serialize_compact_style(map: &AttributeMap) -> String {
    map.iter()
        .filter_map(|(key, value)| value.to_text().map(|v| format!("{}:{}", key, v)))
        .collect::<Vec<_>>()
        .join(";")
}

/// Entries of the `style` attribute, whether given as text or already as a
/// map.
pub fn style_entries(attrs: &AttributeMap) -> Cow<'_, AttributeMap> {
    match attrs.get("style") {
        Some(AttributeValue::Map(map)) => Cow::Borrowed(map),
        Some(value) => match value.to_text() {
            Some(text) => Cow::Owned(parse_compact_style(&text)),
            None => Cow::Owned(AttributeMap::new()),
        },
        None => Cow::Owned(AttributeMap::new()),
    }
}

/// Look up a presentation value: direct attribute, then the `style`
/// attribute, then class rules for the element's `class` list. First match
/// wins.
pub fn value_for_style_attribute(
    name: &str,
    attrs: &AttributeMap,
    entity: Option<&str>,
    class_styles: Option<&ClassStyles>,
) -> Option<AttributeValue> {
    if let Some(value) = attrs.get(name) {
        return Some(value.clone());
    }
    if let Some(value) = style_entries(attrs).get(name) {
        return Some(value.clone());
    }
    let styles = class_styles?;
    let classes = attrs.get("class")?.to_text()?;
    styles.lookup(name, entity, &classes).cloned()
}

/// Text form of [`value_for_style_attribute`].
pub fn text_for_style_attribute(
    name: &str,
    attrs: &AttributeMap,
    entity: Option<&str>,
    class_styles: Option<&ClassStyles>,
) -> Option<String> {
    value_for_style_attribute(name, attrs, entity, class_styles)
        .and_then(|v| v.to_text().map(|t| t.trim().to_string()))
}

/// All presentation values an element declares, with the same precedence as
/// [`value_for_style_attribute`].
pub fn presentation_attributes(
    attrs: &AttributeMap,
    entity: Option<&str>,
    class_styles: Option<&ClassStyles>,
) -> AttributeMap {
    let mut result = match (entity, class_styles, attrs.get("class").and_then(|c| c.to_text())) {
        (Some(entity), Some(styles), Some(classes)) => styles.attributes_for(entity, &classes),
        (None, Some(styles), Some(classes)) => styles.attributes_for("", &classes),
        _ => AttributeMap::new(),
    };
    result.extend(style_entries(attrs).into_owned());
    for (key, value) in attrs {
        if !NON_PRESENTATION.contains(&key.as_str()) {
            result.insert(key.clone(), value.clone());
        }
    }
    result
}

/// Whether an element should be shown: not `display:none`, and when it
/// carries `systemLanguage`, one of the listed tags matches `iso_language`.
pub fn environment_ok(attrs: &AttributeMap, iso_language: &str) -> bool {
    let display = text_for_style_attribute("display", attrs, None, None);
    if display.as_deref() == Some("none") {
        return false;
    }
    match attrs.get("systemLanguage").and_then(|v| v.to_text()) {
        Some(languages) => languages
            .split(',')
            .map(str::trim)
            .any(|tag| language_matches(tag, iso_language)),
        None => true,
    }
}

/// Tags match when equal (ignoring case) or when one is a `-`-separated
/// prefix of the other (`en` matches `en-US`).
fn language_matches(tag: &str, language: &str) -> bool {
    if tag.is_empty() || language.is_empty() {
        return false;
    }
    let (tag, language) = (tag.to_ascii_lowercase(), language.to_ascii_lowercase());
    let prefix_of = |short: &str, long: &str| {
        long.strip_prefix(short)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('-'))
    };
    prefix_of(&tag, &language) || prefix_of(&language, &tag)
}
