//! Tracing subscriber setup.
//!
//! Provides [`TracingSetup`], a builder that installs a `tracing`
//! subscriber for binaries and tests using keel.
//!
//! # Example
//!
//! ```
//! use keel_core::{TracingFormat, TracingSetup};
//! use tracing::Level;
//!
//! // Development: pretty output with callback spans
//! let dev = TracingSetup::default()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Pretty)
//!     .with_span_events(true);
//!
//! // Production: JSON output, keel at debug, everything else at warn
//! let prod = TracingSetup::default()
//!     .with_format(TracingFormat::Json)
//!     .with_env_filter("warn,keel_callbacks=debug,keel_dirty=debug");
//! # let _ = (dev, prod);
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

impl TracingFormat {
    /// Parses a format name (`pretty`, `compact` or `json`, any case).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "compact" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingSetup
// ─────────────────────────────────────────────────────────────────────────────

/// Errors from installing the subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    /// The env filter directive string did not parse.
    #[error("invalid env filter '{directives}': {message}")]
    InvalidFilter {
        /// The rejected directives.
        directives: String,
        /// Parser message.
        message: String,
    },
    /// A global subscriber is already installed.
    #[error("tracing subscriber already installed")]
    AlreadyInstalled(#[source] TryInitError),
}

/// Builder for the global `tracing` subscriber.
///
/// Uses [`tracing_subscriber`] under the hood. Nothing is installed until
/// [`init`](Self::init) is called.
///
/// # Environment Filter
///
/// [`with_env_filter`](Self::with_env_filter) takes `target=level` directives
/// and overrides [`with_level`](Self::with_level). [`with_env_var`](Self::with_env_var)
/// reads the same directives from an environment variable if it is set.
#[derive(Debug, Clone)]
pub struct TracingSetup {
    /// Maximum log level.
    level: Level,
    /// Output format.
    format: TracingFormat,
    /// Environment filter (e.g., "keel_callbacks=debug,keel_dirty=trace").
    env_filter: Option<String>,
    /// Whether to include span events (enter/exit).
    span_events: bool,
}

impl Default for TracingSetup {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingSetup {
    /// Creates a new `TracingSetup` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a custom environment filter string.
    ///
    /// Format: `target=level,target=level,...`
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Uses the directives in environment variable `var` as the env filter,
    /// if it is set and not empty.
    #[must_use]
    pub fn with_env_var(self, var: &str) -> Self {
        match std::env::var(var) {
            Ok(filter) if !filter.trim().is_empty() => self.with_env_filter(filter),
            _ => self,
        }
    }

    /// Returns the configured maximum level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Returns the configured output format.
    #[must_use]
    pub fn format(&self) -> TracingFormat {
        self.format
    }

    /// Builds the env filter from the configured directives or level.
    ///
    /// # Errors
    ///
    /// Returns [`TracingError::InvalidFilter`] if the directives do not parse.
    pub fn env_filter(&self) -> Result<EnvFilter, TracingError> {
        match &self.env_filter {
            Some(directives) => {
                EnvFilter::try_new(directives).map_err(|err| TracingError::InvalidFilter {
                    directives: directives.clone(),
                    message: err.to_string(),
                })
            }
            None => Ok(EnvFilter::new(self.level.as_str())),
        }
    }

    /// Installs the global subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`TracingError::InvalidFilter`] for unparseable directives and
    /// [`TracingError::AlreadyInstalled`] if a global subscriber exists. The
    /// existing subscriber stays in place in the latter case.
    pub fn init(&self) -> Result<(), TracingError> {
        let env_filter = self.env_filter()?;

        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        let registry = tracing_subscriber::registry().with(env_filter);
        let installed = match self.format {
            TracingFormat::Pretty => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_span_events(span_events),
                )
                .try_init(),
            TracingFormat::Compact => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_span_events(span_events),
                )
                .try_init(),
            TracingFormat::Json => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_span_events(span_events),
                )
                .try_init(),
        };
        installed.map_err(TracingError::AlreadyInstalled)?;

        tracing::debug!(
            level = %self.level,
            format = ?self.format,
            filter = self.env_filter.as_deref().unwrap_or_default(),
            "tracing initialized"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_format_default_is_pretty() {
        assert_eq!(TracingFormat::default(), TracingFormat::Pretty);
    }

    #[test]
    fn tracing_format_parse() {
        assert_eq!(TracingFormat::parse("JSON"), Some(TracingFormat::Json));
        assert_eq!(TracingFormat::parse(" compact "), Some(TracingFormat::Compact));
        assert_eq!(TracingFormat::parse("xml"), None);
    }

    #[test]
    fn default_level_is_info() {
        assert_eq!(TracingSetup::default().level(), Level::INFO);
    }

    #[test]
    fn with_level() {
        let setup = TracingSetup::new().with_level(Level::DEBUG);
        assert_eq!(setup.level(), Level::DEBUG);
    }

    #[test]
    fn with_format() {
        let setup = TracingSetup::new().with_format(TracingFormat::Json);
        assert_eq!(setup.format(), TracingFormat::Json);
    }

    #[test]
    fn with_env_filter() {
        let setup = TracingSetup::new().with_env_filter("keel_callbacks=debug");
        assert_eq!(setup.env_filter, Some("keel_callbacks=debug".to_string()));
        assert!(setup.env_filter().is_ok());
    }

    #[test]
    fn with_span_events() {
        let setup = TracingSetup::new().with_span_events(true);
        assert!(setup.span_events);
    }

    #[test]
    fn with_env_var_ignores_unset_variable() {
        let setup = TracingSetup::new().with_env_var("KEEL_TEST_UNSET_FILTER_VARIABLE");
        assert_eq!(setup.env_filter, None);
    }

    #[test]
    fn invalid_filter_is_reported() {
        let setup = TracingSetup::new().with_env_filter("keel_callbacks=notalevel");
        let err = setup.env_filter().unwrap_err();
        assert!(matches!(err, TracingError::InvalidFilter { .. }));
        assert!(err.to_string().starts_with("invalid env filter 'keel_callbacks=notalevel'"));
    }

    #[test]
    fn second_init_reports_already_installed() {
        let setup = TracingSetup::new().with_format(TracingFormat::Compact);
        let first = setup.init();
        let second = setup.init();
        assert!(first.is_ok() || matches!(first, Err(TracingError::AlreadyInstalled(_))));
        assert!(matches!(second, Err(TracingError::AlreadyInstalled(_))));
    }
}
