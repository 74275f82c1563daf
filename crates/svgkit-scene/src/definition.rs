//! Raw element definitions, the input handed over by an XML front end.

use svgkit_style::{AttributeMap, AttributeValue};

/// One element of the input tree: its category name, raw attributes, child
/// elements and character data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementDefinition {
    pub name: String,
    pub attributes: AttributeMap,
    pub children: Vec<ElementDefinition>,
    pub text: Option<String>,
}

impl ElementDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: set an attribute.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builder: append a child element.
    pub fn child(mut self, child: ElementDefinition) -> Self {
        self.children.push(child);
        self
    }

    /// Builder: set the character data.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Text of an attribute.
    pub fn attribute_text(&self, key: &str) -> Option<String> {
        self.attributes
            .get(key)
            .and_then(|v| v.to_text().map(|t| t.into_owned()))
    }
}
