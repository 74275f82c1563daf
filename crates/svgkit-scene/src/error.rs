//! Document construction errors.

use svgkit_common::SvgKitError;
use thiserror::Error;

/// Errors raised while building a [`crate::Document`].
///
/// Malformed content inside a document never produces one of these; only
/// misuse of the construction API does.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Root element must be <svg>, found <{0}>")]
    NotSvgRoot(String),

    #[error("Invalid render configuration")]
    Config(#[from] SvgKitError),
}

impl From<SceneError> for SvgKitError {
    fn from(err: SceneError) -> Self {
        match err {
            SceneError::Config(inner) => inner,
            other @ SceneError::NotSvgRoot(_) => {
                SvgKitError::construction_with_source("document construction failed", other)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_error_converts_to_construction() {
        let err: SvgKitError = SceneError::NotSvgRoot("g".into()).into();
        assert_eq!(err.category(), "construction");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_config_error_passes_through() {
        let err: SvgKitError = SceneError::Config(SvgKitError::config("bad")).into();
        assert_eq!(err.category(), "config");
    }
}
