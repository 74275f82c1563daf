//! Class rules from `style` elements.
//!
//! Only `.name` and `element.name` selectors are understood; any other
//! selector is skipped.

use std::collections::HashMap;

use tracing::debug;

use crate::attributes::{AttributeMap, AttributeValue};
use crate::cascade::parse_compact_style;

/// Class rules keyed by selector (`.name` or `element.name`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassStyles {
    rules: HashMap<String, AttributeMap>,
}

impl ClassStyles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse stylesheet text. Declarations of a later rule for the same
    /// selector override earlier ones.
    pub fn parse(css: &str) -> Self {
        debug!(len = css.len(), "Parsing class styles");
        let mut styles = ClassStyles::new();
        let css = strip_comments(css);

        for block in css.split('}') {
            let Some((selectors, body)) = block.split_once('{') else {
                continue;
            };
            let declarations = parse_compact_style(body);
            if declarations.is_empty() {
                continue;
            }
            for selector in selectors.split(',').map(str::trim) {
                if is_class_selector(selector) {
                    styles.add_rule(selector, declarations.clone());
                } else if !selector.is_empty() {
                    debug!(selector, "Skipping unsupported selector");
                }
            }
        }

        debug!(rule_count = styles.rules.len(), "Class styles parsed");
        styles
    }

    /// Add declarations for a selector, overriding existing keys.
    pub fn add_rule(&mut self, selector: &str, declarations: AttributeMap) {
        self.rules
            .entry(selector.to_string())
            .or_default()
            .extend(declarations);
    }

    /// Merge another set of rules over this one.
    pub fn extend(&mut self, other: &ClassStyles) {
        for (selector, declarations) in &other.rules {
            self.add_rule(selector, declarations.clone());
        }
    }

    pub fn rule(&self, selector: &str) -> Option<&AttributeMap> {
        self.rules.get(selector)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First value for `name` across the classes in `class_list`, checking
    /// `entity.class` before `.class` for each class in order.
    pub fn lookup(&self, name: &str, entity: Option<&str>, class_list: &str) -> Option<&AttributeValue> {
        class_list.split_whitespace().find_map(|class| {
            entity
                .and_then(|e| self.rules.get(&format!("{}.{}", e, class)))
                .and_then(|rule| rule.get(name))
                .or_else(|| {
                    self.rules
                        .get(&format!(".{}", class))
                        .and_then(|rule| rule.get(name))
                })
        })
    }

    /// Every declaration that applies to `entity` with `class_list`. Earlier
    /// classes win, matching [`ClassStyles::lookup`].
    pub fn attributes_for(&self, entity: &str, class_list: &str) -> AttributeMap {
        let mut result = AttributeMap::new();
        for class in class_list.split_whitespace() {
            let specific = self.rules.get(&format!("{}.{}", entity, class));
            let general = self.rules.get(&format!(".{}", class));
            for rule in [specific, general].into_iter().flatten() {
                for (key, value) in rule {
                    result.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
        }
        result
    }
}

fn is_class_selector(selector: &str) -> bool {
    let Some((element, class)) = selector.split_once('.') else {
        return false;
    };
    let ident = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    };
    (element.is_empty() || ident(element)) && ident(class)
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        rest = match rest[start + 2..].find("*/") {
            Some(end) => &rest[start + 2 + end + 2..],
            None => "",
        };
    }
    out.push_str(rest);
    out
}
