//! Tracing subscriber setup.
//!
//! The ledger crates only emit events through the `tracing` facade; they never
//! install a subscriber. Binaries (and tests that want log output) call
//! [`TracingSetup::init`] once at startup.
//!
//! # Example
//!
//! ```
//! use tally_core::{TracingFormat, TracingSetup};
//! use tracing::Level;
//!
//! // Development: pretty output with debug level
//! TracingSetup::new()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Pretty)
//!     .init();
//!
//! // Production: JSON output, ledger at debug, everything else at warn
//! let prod = TracingSetup::new()
//!     .with_format(TracingFormat::Json)
//!     .with_env_filter("warn,tally_ledger=debug");
//! ```

use core::str::FromStr;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_FILTER_ENV: &str = "TALLY_LOG";

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "TALLY_LOG_FORMAT";

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

/// Error returned when parsing an unknown [`TracingFormat`] name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tracing format '{0}', expected pretty, compact or json")]
pub struct UnknownFormat(pub String);

impl FromStr for TracingFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingSetup
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for the global `tracing` subscriber.
#[derive(Debug, Clone)]
pub struct TracingSetup {
    /// Maximum log level, used when no filter directive is set.
    level: Level,
    /// Output format.
    format: TracingFormat,
    /// Environment filter (e.g., "`tally_ledger=debug,warn`").
    env_filter: Option<String>,
    /// Whether to include span events (enter/exit).
    span_events: bool,
    /// Unparseable format name read by [`TracingSetup::from_env`].
    rejected_format: Option<UnknownFormat>,
}

impl Default for TracingSetup {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
            rejected_format: None,
        }
    }
}

impl TracingSetup {
    /// Creates a setup with default settings (INFO, pretty).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a setup from [`LOG_FILTER_ENV`] and [`LOG_FORMAT_ENV`].
    ///
    /// An unknown format name falls back to the default format with a
    /// warning once the subscriber is installed.
    #[must_use]
    pub fn from_env() -> Self {
        let mut setup = Self::default();
        if let Ok(filter) = std::env::var(LOG_FILTER_ENV) {
            setup.env_filter = Some(filter);
        }
        if let Ok(format) = std::env::var(LOG_FORMAT_ENV) {
            match format.parse() {
                Ok(format) => setup.format = format,
                Err(err) => setup.rejected_format = Some(err),
            }
        }
        setup
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

    /// Installs the global subscriber.
    ///
    /// Does nothing if a global subscriber is already installed.
    pub fn init(&self) {
        let env_filter = match &self.env_filter {
            Some(filter) => {
                EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
            }
            None => EnvFilter::new(self.level.as_str()),
        };

        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        // try_init().ok() ignores errors if already initialized
        match self.format {
            TracingFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .pretty()
                            .with_span_events(span_events),
                    )
                    .try_init()
                    .ok();
            }
            TracingFormat::Compact => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_span_events(span_events),
                    )
                    .try_init()
                    .ok();
            }
            TracingFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_span_events(span_events),
                    )
                    .try_init()
                    .ok();
            }
        }

        if let Some(err) = &self.rejected_format {
            tracing::warn!(%err, "ignoring {LOG_FORMAT_ENV}");
        }

        tracing::debug!(
            level = %self.level,
            format = ?self.format,
            "tracing initialized"
        );
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
    fn tracing_format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<TracingFormat>(), Ok(TracingFormat::Json));
        assert_eq!(
            " compact ".parse::<TracingFormat>(),
            Ok(TracingFormat::Compact)
        );
        assert_eq!(
            "xml".parse::<TracingFormat>(),
            Err(UnknownFormat("xml".to_string()))
        );
    }

    #[test]
    fn builder_sets_fields() {
        let setup = TracingSetup::new()
            .with_level(Level::DEBUG)
            .with_format(TracingFormat::Json)
            .with_env_filter("tally_ledger=trace")
            .with_span_events(true);

        assert_eq!(setup.level, Level::DEBUG);
        assert_eq!(setup.format, TracingFormat::Json);
        assert_eq!(setup.env_filter.as_deref(), Some("tally_ledger=trace"));
        assert!(setup.span_events);
    }

    #[test]
    fn init_twice_is_harmless() {
        let setup = TracingSetup::new().with_format(TracingFormat::Compact);
        setup.init();
        setup.init();
    }
}
