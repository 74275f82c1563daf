//! Render configuration
//!
//! Explicit configuration value handed to whatever builds a render pass, in
//! place of process-wide defaults.

use serde::{Deserialize, Serialize};

use crate::{Result, SvgKitError};

/// Render configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Starting value of `currentColor` (any SVG color string)
    pub current_color: String,

    /// Active user language, matched against `systemLanguage`
    pub iso_language: String,

    /// Line width multiplier for `non-scaling-stroke`
    pub explicit_line_scaling: f32,

    /// Curve subdivision step in parameter space; `None` selects a step
    /// from each curve's size
    pub curve_step: Option<f32>,

    /// Font settings used when a text element specifies none
    pub font: FontDefaults,

    /// Maximum nesting of `use` indirections followed in one call chain
    pub max_reference_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontDefaults {
    /// Family name
    pub family: String,

    /// Size in user units
    pub size: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            current_color: "black".to_string(),
            iso_language: "en".to_string(),
            explicit_line_scaling: 1.0,
            curve_step: None,
            font: FontDefaults::default(),
            max_reference_depth: 64,
        }
    }
}

impl Default for FontDefaults {
    fn default() -> Self {
        Self {
            family: "Helvetica".to_string(),
            size: 12.0,
        }
    }
}

impl RenderConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RenderConfig = serde_json::from_str(json)
            .map_err(|e| SvgKitError::config_with_source("malformed render config", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SvgKitError::config_with_source("cannot serialize render config", e))
    }

    /// Reject values that would make rendering meaningless.
    pub fn validate(&self) -> Result<()> {
        if !self.explicit_line_scaling.is_finite() || self.explicit_line_scaling <= 0.0 {
            return Err(SvgKitError::config(format!(
                "explicit_line_scaling must be positive, got {}",
                self.explicit_line_scaling
            )));
        }
        if let Some(step) = self.curve_step {
            if !(step > 0.0 && step <= 1.0) {
                return Err(SvgKitError::config(format!(
                    "curve_step must be in (0, 1], got {}",
                    step
                )));
            }
        }
        if !self.font.size.is_finite() || self.font.size <= 0.0 {
            return Err(SvgKitError::config("font size must be positive"));
        }
        if self.max_reference_depth == 0 {
            return Err(SvgKitError::config("max_reference_depth must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(RenderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = RenderConfig::from_json_str(r#"{"iso_language": "fr"}"#).unwrap();
        assert_eq!(config.iso_language, "fr");
        assert_eq!(config.current_color, "black");
        assert_eq!(config.font.size, 12.0);
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = RenderConfig::default();
        config.curve_step = Some(0.05);
        let json = config.to_json_string().unwrap();
        assert_eq!(RenderConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(RenderConfig::from_json_str(r#"{"curve_step": 2.0}"#).is_err());
        assert!(RenderConfig::from_json_str(r#"{"explicit_line_scaling": 0}"#).is_err());
        assert!(RenderConfig::from_json_str("not json").is_err());
    }
}
