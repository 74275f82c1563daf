//! Logging configuration and setup.
//!
//! The SVGKit crates only emit `tracing` events; installing a subscriber is
//! left to the embedding application. [`init_logging`] is a convenience for
//! tools and tests.

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::{Result, SvgKitError};

/// Targets of the SVGKit crates, used to build the default filter.
const SVGKIT_TARGETS: [&str; 5] = [
    "svgkit_geometry",
    "svgkit_style",
    "svgkit_text",
    "svgkit_scene",
    "svgkit_render",
];

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON format for structured logging.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level applied to the SVGKit targets.
    pub level: Level,
    /// Output format.
    pub format: LogFormat,
    /// Include source file location.
    pub include_location: bool,
    /// Emit span enter/close events (one span per render or hit-test pass).
    pub include_span_events: bool,
    /// Custom filter string (e.g., "svgkit_render=debug,svgkit_scene=trace").
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::Pretty,
            include_location: false,
            include_span_events: false,
            filter: None,
        }
    }
}

impl LogConfig {
    /// Per-pass summaries and reference diagnostics.
    pub fn debug() -> Self {
        Self {
            level: Level::DEBUG,
            include_span_events: true,
            ..Default::default()
        }
    }

    /// Per-node traversal events. Very noisy on large documents.
    pub fn trace() -> Self {
        Self {
            level: Level::TRACE,
            format: LogFormat::Compact,
            include_location: true,
            include_span_events: true,
            ..Default::default()
        }
    }

    /// Set a custom filter.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Filter directives for this configuration.
    ///
    /// A custom filter wins; otherwise every SVGKit target gets `level`.
    pub fn directives(&self) -> String {
        if let Some(filter) = &self.filter {
            return filter.clone();
        }
        let level = self.level.to_string().to_lowercase();
        SVGKIT_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, level))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Install a global subscriber for the given configuration.
///
/// `RUST_LOG` overrides the configured directives when set. Fails if a global
/// subscriber is already installed or the filter does not parse.
pub fn init_logging(config: LogConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.directives())
            .map_err(|e| SvgKitError::config_with_source("invalid log filter", e))?,
    };

    let span_events = if config.include_span_events {
        FmtSpan::ENTER | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let installed = match config.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(config.include_location)
                    .with_line_number(config.include_location)
                    .with_span_events(span_events),
            )
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_span_events(span_events),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_span_events(span_events))
            .try_init(),
    };

    installed.map_err(|e| SvgKitError::config_with_source("logging already initialized", e))
}
