//! Immutable attribute maps.

use std::borrow::Cow;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use svgkit_geometry::format_number;

/// Attribute map ordered by key.
pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// Attribute value: text, a number or a nested map.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Number(f32),
    Map(AttributeMap),
}

impl AttributeValue {
    /// Borrowed text, only for `Text` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Textual form; numbers are formatted, maps have none.
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        match self {
            AttributeValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
            AttributeValue::Number(n) => Some(Cow::Owned(format_number(*n))),
            AttributeValue::Map(_) => None,
        }
    }

    /// Numeric form; text must be a plain number.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            AttributeValue::Text(s) => s.trim().parse().ok(),
            AttributeValue::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&AttributeMap> {
        match self {
            AttributeValue::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl Hash for AttributeValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            AttributeValue::Text(s) => s.hash(state),
            AttributeValue::Number(n) => n.to_bits().hash(state),
            AttributeValue::Map(m) => m.hash(state),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

impl From<f32> for AttributeValue {
    fn from(n: f32) -> Self {
        AttributeValue::Number(n)
    }
}

impl From<AttributeMap> for AttributeValue {
    fn from(m: AttributeMap) -> Self {
        AttributeValue::Map(m)
    }
}

/// Build an [`AttributeMap`] from key/value pairs.
pub fn attribute_map<K, V, I>(pairs: I) -> AttributeMap
where
    K: Into<String>,
    V: Into<AttributeValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Attribute map with its structural hash computed once at construction.
///
/// There is no way to change the attributes of an existing node; build a new
/// one instead.
#[derive(Debug, Clone)]
pub struct AttributedNode {
    attributes: AttributeMap,
    hash: u64,
}

impl AttributedNode {
    pub fn new(attributes: AttributeMap) -> Self {
        let mut hasher = DefaultHasher::new();
        attributes.hash(&mut hasher);
        Self {
            hash: hasher.finish(),
            attributes,
        }
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Text form of an attribute.
    pub fn text(&self, key: &str) -> Option<Cow<'_, str>> {
        self.attributes.get(key).and_then(AttributeValue::to_text)
    }

    /// The structural hash computed by `new`.
    pub fn calculated_hash(&self) -> u64 {
        self.hash
    }
}

impl Default for AttributedNode {
    fn default() -> Self {
        Self::new(AttributeMap::new())
    }
}

impl PartialEq for AttributedNode {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.attributes == other.attributes
    }
}

impl Hash for AttributedNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}
