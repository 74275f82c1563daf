//! The per-pass context capability.

use std::sync::Arc;

use svgkit_style::{extract_url_contents, fragment_id, resolve_color, ClassStyles, Color};
use svgkit_text::{FixedAdvanceShaper, FontDescriptor, TextShaper};

use crate::document::Document;
use crate::node::Node;

/// What a render pass needs from its surroundings: color resolution, the
/// current color and language, registry lookups and the text shaper.
///
/// One context belongs to one pass; `current_color` is the only state that
/// changes while traversing.
pub trait SvgContext {
    /// Resolve a color string, `currentColor` included. Unrecognized strings
    /// give opaque black.
    fn color_for_string(&self, value: &str) -> Color {
        resolve_color(value, self.current_color())
    }

    fn current_color(&self) -> &str;

    fn set_current_color(&mut self, color: &str);

    fn iso_language(&self) -> &str;

    /// Registry lookup by id.
    fn object_named(&self, id: &str) -> Option<Arc<Node>>;

    /// Registry lookup for `url(#id)` or `#id`.
    fn object_at_url(&self, url: &str) -> Option<Arc<Node>> {
        extract_url_contents(url)
            .or_else(|| fragment_id(url))
            .and_then(|id| self.object_named(id))
    }

    /// Line width multiplier for `non-scaling-stroke`.
    fn explicit_line_scaling(&self) -> f32;

    fn class_styles(&self) -> Option<&ClassStyles>;

    fn text_shaper(&self) -> &dyn TextShaper;

    /// Font used where the document specifies none.
    fn font(&self) -> &FontDescriptor;

    /// Curve subdivision step for path measurement; `None` picks one per
    /// curve.
    fn curve_step(&self) -> Option<f32> {
        None
    }
}

/// Default context for rendering one [`Document`].
pub struct DocumentContext<'a> {
    document: &'a Document,
    current_color: String,
    iso_language: String,
    explicit_line_scaling: f32,
    curve_step: Option<f32>,
    font: FontDescriptor,
    shaper: Box<dyn TextShaper>,
}

impl<'a> DocumentContext<'a> {
    /// Context seeded from the document's configuration, shaping with
    /// [`FixedAdvanceShaper`].
    pub fn new(document: &'a Document) -> Self {
        let config = document.config();
        Self {
            document,
            current_color: config.current_color.clone(),
            iso_language: config.iso_language.clone(),
            explicit_line_scaling: config.explicit_line_scaling,
            curve_step: config.curve_step,
            font: FontDescriptor::new(config.font.family.clone(), config.font.size),
            shaper: Box::new(FixedAdvanceShaper::default()),
        }
    }

    pub fn with_shaper(mut self, shaper: Box<dyn TextShaper>) -> Self {
        self.shaper = shaper;
        self
    }

    pub fn with_iso_language(mut self, language: impl Into<String>) -> Self {
        self.iso_language = language.into();
        self
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }
}

impl SvgContext for DocumentContext<'_> {
    fn current_color(&self) -> &str {
        &self.current_color
    }

    fn set_current_color(&mut self, color: &str) {
        self.current_color = color.to_string();
    }

    fn iso_language(&self) -> &str {
        &self.iso_language
    }

    fn object_named(&self, id: &str) -> Option<Arc<Node>> {
        self.document.object_named(id)
    }

    fn explicit_line_scaling(&self) -> f32 {
        self.explicit_line_scaling
    }

    fn class_styles(&self) -> Option<&ClassStyles> {
        Some(self.document.class_styles())
    }

    fn text_shaper(&self) -> &dyn TextShaper {
        self.shaper.as_ref()
    }

    fn font(&self) -> &FontDescriptor {
        &self.font
    }

    fn curve_step(&self) -> Option<f32> {
        self.curve_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ElementDefinition;
    use svgkit_common::RenderConfig;

    fn document() -> Document {
        let root = ElementDefinition::new("svg")
            .child(ElementDefinition::new("rect").attr("id", "box").attr("width", "4").attr("height", "4"));
        Document::from_definition(&root, RenderConfig::default()).unwrap()
    }

    #[test]
    fn test_current_color_resolution() {
        let doc = document();
        let mut context = DocumentContext::new(&doc);
        assert_eq!(context.color_for_string("currentColor"), Color::BLACK);
        context.set_current_color("red");
        assert_eq!(context.color_for_string("currentColor"), Color::from_rgb(255, 0, 0));
        assert_eq!(context.color_for_string("not-a-color"), Color::BLACK);
    }

    #[test]
    fn test_object_lookups() {
        let doc = document();
        let context = DocumentContext::new(&doc);
        assert_eq!(context.object_named("box").map(|n| n.name().to_string()), Some("rect".into()));
        assert!(context.object_at_url("url(#box)").is_some());
        assert!(context.object_at_url("#box").is_some());
        assert!(context.object_at_url("url(#nope)").is_none());
    }

    #[test]
    fn test_curve_step_comes_from_config() {
        let doc = document();
        assert_eq!(DocumentContext::new(&doc).curve_step(), None);

        let root = ElementDefinition::new("svg");
        let config = RenderConfig {
            curve_step: Some(0.25),
            ..Default::default()
        };
        let doc = Document::from_definition(&root, config).unwrap();
        assert_eq!(DocumentContext::new(&doc).curve_step(), Some(0.25));
    }

    #[test]
    fn test_language_override() {
        let doc = document();
        let context = DocumentContext::new(&doc).with_iso_language("fr-CA");
        assert_eq!(context.iso_language(), "fr-CA");
    }
}
