//! Point-in-time interpolation between two attribute maps.

use svgkit_geometry::Transform;

use crate::attributes::{AttributeMap, AttributeValue};
use crate::color::{morph_color_string, parse_svg_color};

/// Blend two attribute maps at `fraction` (clamped to [0, 1]).
///
/// Keys present in both maps interpolate when both values are numbers,
/// colors or (for `transform`) transform lists. Everything else switches
/// from `old` to `new` at the half-way point, including keys present in only
/// one map.
pub fn morph_style_attributes(old: &AttributeMap, new: &AttributeMap, fraction: f32) -> AttributeMap {
    let t = fraction.clamp(0.0, 1.0);
    let switched = t >= 0.5;
    let mut result = AttributeMap::new();

    for (key, old_value) in old {
        match new.get(key) {
            Some(new_value) => {
                result.insert(key.clone(), morph_value(key, old_value, new_value, t));
            }
            None if !switched => {
                result.insert(key.clone(), old_value.clone());
            }
            None => {}
        }
    }
    if switched {
        for (key, new_value) in new {
            if !old.contains_key(key) {
                result.insert(key.clone(), new_value.clone());
            }
        }
    }
    result
}

fn morph_value(key: &str, old: &AttributeValue, new: &AttributeValue, t: f32) -> AttributeValue {
    if let (Some(a), Some(b)) = (old.as_number(), new.as_number()) {
        return AttributeValue::Number(a + (b - a) * t);
    }
    if let (Some(a), Some(b)) = (old.to_text(), new.to_text()) {
        if key == "transform" {
            return AttributeValue::Text(Transform::morph(&a, &b, t));
        }
        if parse_svg_color(&a).is_some() && parse_svg_color(&b).is_some() {
            return AttributeValue::Text(morph_color_string(&a, &b, t));
        }
    }
    if t >= 0.5 {
        new.clone()
    } else {
        old.clone()
    }
}
