//! # SVGKit Common
//!
//! Common error types, logging setup and render configuration shared by the
//! SVGKit crates.
//!
//! ## Features
//!
//! - Unified error type with per-category constructors
//! - Logging configuration and setup
//! - Serializable render configuration

use thiserror::Error;

pub mod config;
pub mod logging;

pub use config::RenderConfig;
pub use logging::{init_logging, LogConfig, LogFormat};

/// Unified error type for SVGKit.
///
/// Rendering itself never fails: malformed document data degrades locally.
/// These errors surface caller misuse at construction time (bad root element,
/// invalid configuration) and failures of external collaborators such as a
/// text shaper.
#[derive(Error, Debug)]
pub enum SvgKitError {
    /// Document construction errors.
    #[error("Construction error: {message}")]
    Construction {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors.
    #[error("Config error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Text shaping collaborator errors.
    #[error("Text error: {message}")]
    Text {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl SvgKitError {
    /// Create a construction error with source.
    pub fn construction_with_source<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::Construction {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a config error with source.
    pub fn config_with_source<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a text error with source.
    pub fn text_with_source<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::Text {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get the error category for metrics.
    pub fn category(&self) -> &'static str {
        match self {
            SvgKitError::Construction { .. } => "construction",
            SvgKitError::Config { .. } => "config",
            SvgKitError::Text { .. } => "text",
        }
    }
}

/// Result type alias for SVGKit operations.
pub type Result<T> = std::result::Result<T, SvgKitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "x");
        assert_eq!(SvgKitError::construction_with_source("test", io).category(), "construction");
        assert_eq!(SvgKitError::config("test").category(), "config");
    }

    #[test]
    fn test_error_display() {
        let err = SvgKitError::config("font size must be positive");
        assert_eq!(err.to_string(), "Config error: font size must be positive");
    }

    #[test]
    fn test_text_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "no font data");
        let err = SvgKitError::text_with_source("shaping failed", io);
        assert_eq!(err.category(), "text");
        assert_eq!(err.to_string(), "Text error: shaping failed");
        assert_eq!(std::error::Error::source(&err).map(|e| e.to_string()), Some("no font data".into()));
    }
}
