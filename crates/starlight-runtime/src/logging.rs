//! Logging setup on `tracing-subscriber`.
//!
//! [`init_from_config`] installs a global subscriber from the `[logging]`
//! section of [`StarlightConfig`](crate::config::StarlightConfig).
//! [`LoggingBuilder`] starts from the same settings and lets code adjust them
//! before installing:
//!
//! ```rust,ignore
//! use starlight_runtime::config::{LogOutput, SpanEventConfig};
//! use starlight_runtime::logging::LoggingBuilder;
//!
//! LoggingBuilder::new()
//!     .output(LogOutput::Stderr)
//!     .directive("starlight_views=debug")
//!     .span_events(SpanEventConfig::lifecycle())
//!     .init();
//! ```
//!
//! `RUST_LOG`, when set, replaces the configured base level. Per-module
//! directives are applied on top of either.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, SpanEventConfig};

const DEFAULT_LOG_FILE: &str = "starlight.log";

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while installing the subscriber.
#[derive(Error, Debug)]
pub enum LoggingError {
    /// The log file or its directory could not be opened.
    #[error("Failed to open log file: {0}")]
    Appender(#[from] InitError),

    /// A global subscriber is already installed.
    #[error(transparent)]
    Init(#[from] TryInitError),
}

// =============================================================================
// Configuration-Based Initialization
// =============================================================================

/// Installs the global subscriber described by `config`.
///
/// A subscriber that is already installed is left in place.
pub fn init_from_config(config: &LoggingConfig) {
    LoggingBuilder::from_config(config).init();
}

fn fmt_span(events: &SpanEventConfig) -> FmtSpan {
    [
        (events.new, FmtSpan::NEW),
        (events.enter, FmtSpan::ENTER),
        (events.exit, FmtSpan::EXIT),
        (events.close, FmtSpan::CLOSE),
    ]
    .into_iter()
    .filter(|(enabled, _)| *enabled)
    .fold(FmtSpan::NONE, |spans, (_, span)| spans | span)
}

fn rolling_appender(path: &Path, rotation: LogRotation) -> Result<RollingFileAppender, InitError> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file = path
        .file_name()
        .unwrap_or_else(|| OsStr::new(DEFAULT_LOG_FILE));
    let rotation = match rotation {
        LogRotation::Never => Rotation::NEVER,
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
    };
    RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(file.to_string_lossy().into_owned())
        .build(dir)
}

// =============================================================================
// LoggingBuilder
// =============================================================================

/// Adjusts [`LoggingConfig`] settings in code, then installs the subscriber.
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    settings: LoggingConfig,
    directives: Vec<String>,
    show_target: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::from_config(&LoggingConfig::default())
    }
}

impl LoggingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from `config`. Its per-module levels become directives, sorted
    /// by module name.
    pub fn from_config(config: &LoggingConfig) -> Self {
        let mut modules: Vec<_> = config.filters.iter().collect();
        modules.sort_by(|a, b| a.0.cmp(b.0));
        Self {
            settings: config.clone(),
            directives: modules
                .into_iter()
                .map(|(module, level)| format!("{module}={level}"))
                .collect(),
            show_target: true,
        }
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.settings.level = level;
        self
    }

    /// Adds a filter directive such as `starlight_views=trace`.
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    pub fn span_events(mut self, events: SpanEventConfig) -> Self {
        self.settings.span_events = events;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.settings.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.settings.output = output;
        self
    }

    /// Log file for [`LogOutput::File`].
    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings.file_path = Some(path.into());
        self
    }

    pub fn rotation(mut self, rotation: LogRotation) -> Self {
        self.settings.rotation = rotation;
        self
    }

    pub fn thread_ids(mut self, enabled: bool) -> Self {
        self.settings.thread_ids = enabled;
        self
    }

    /// Include file names and line numbers.
    pub fn file_location(mut self, enabled: bool) -> Self {
        self.settings.file_location = enabled;
        self
    }

    /// Include the event's target (module path). On by default.
    pub fn show_target(mut self, enabled: bool) -> Self {
        self.show_target = enabled;
        self
    }

    pub fn settings(&self) -> &LoggingConfig {
        &self.settings
    }

    /// The directives in the order they are applied.
    pub fn directives(&self) -> &[String] {
        &self.directives
    }

    fn env_filter(&self) -> EnvFilter {
        let base = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.settings.level.as_str()));
        self.directives
            .iter()
            .fold(base, |filter, directive| match directive.parse() {
                Ok(parsed) => filter.add_directive(parsed),
                Err(e) => {
                    eprintln!("ignoring invalid log directive {directive:?}: {e}");
                    filter
                }
            })
    }

    fn make_writer(&self) -> Result<BoxMakeWriter, InitError> {
        Ok(match self.settings.output {
            LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
            LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
            LogOutput::File => {
                let path = self
                    .settings
                    .file_path
                    .as_deref()
                    .unwrap_or_else(|| Path::new(DEFAULT_LOG_FILE));
                BoxMakeWriter::new(rolling_appender(path, self.settings.rotation)?)
            }
        })
    }

    /// Installs the subscriber, ignoring one that is already installed.
    pub fn init(self) {
        if let Err(LoggingError::Appender(e)) = self.try_init() {
            eprintln!("logging disabled: {e}");
        }
    }

    pub fn try_init(self) -> Result<(), LoggingError> {
        let filter = self.env_filter();
        let writer = self.make_writer()?;
        let spans = fmt_span(&self.settings.span_events);

        macro_rules! install {
            ($layer:expr) => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(
                        $layer
                            .with_writer(writer)
                            .with_span_events(spans)
                            .with_target(self.show_target)
                            .with_thread_ids(self.settings.thread_ids)
                            .with_file(self.settings.file_location)
                            .with_line_number(self.settings.file_location),
                    )
                    .try_init()
            };
        }

        let installed = match self.settings.format {
            LogFormat::Compact => install!(fmt::layer().compact()),
            LogFormat::Pretty => install!(fmt::layer().pretty()),
            LogFormat::Full => install!(fmt::layer()),
            #[cfg(feature = "json-log")]
            LogFormat::Json => install!(fmt::layer().json()),
            #[cfg(not(feature = "json-log"))]
            LogFormat::Json => install!(fmt::layer()),
        };
        installed?;

        // Reported once the subscriber is live.
        if cfg!(not(feature = "json-log")) && self.settings.format == LogFormat::Json {
            warn!("JSON logging needs the json-log feature, using the full format");
        }
        if self.settings.output == LogOutput::File && self.settings.file_path.is_none() {
            warn!(file = DEFAULT_LOG_FILE, "No log file configured, using the default");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_from_config_sorts_filters() {
        let config = LoggingConfig {
            level: LogLevel::Debug,
            format: LogFormat::Pretty,
            filters: HashMap::from([
                ("starlight_views".to_string(), LogLevel::Trace),
                ("starlight_core".to_string(), LogLevel::Warn),
            ]),
            ..LoggingConfig::default()
        };
        let builder = LoggingBuilder::from_config(&config);

        assert_eq!(builder.settings().level, LogLevel::Debug);
        assert_eq!(builder.settings().format, LogFormat::Pretty);
        assert_eq!(
            builder.directives(),
            ["starlight_core=warn", "starlight_views=trace"]
        );
    }

    #[test]
    fn test_builder_overrides() {
        let builder = LoggingBuilder::new()
            .output(LogOutput::Stderr)
            .directive("starlight=debug")
            .file_location(true)
            .rotation(LogRotation::Daily);

        assert!(builder.show_target);
        assert_eq!(builder.settings().output, LogOutput::Stderr);
        assert_eq!(builder.settings().rotation, LogRotation::Daily);
        assert!(builder.settings().file_location);
        assert_eq!(builder.directives(), ["starlight=debug"]);
    }

    #[test]
    fn test_span_presets() {
        assert_eq!(fmt_span(&SpanEventConfig::default()), FmtSpan::NONE);
        assert_eq!(
            fmt_span(&SpanEventConfig::lifecycle()),
            FmtSpan::NEW | FmtSpan::CLOSE
        );
        assert_eq!(
            fmt_span(&SpanEventConfig::active()),
            FmtSpan::ENTER | FmtSpan::EXIT
        );
        assert_eq!(fmt_span(&SpanEventConfig::full()), FmtSpan::FULL);
    }

    #[test]
    fn test_rolling_appender_creates_file() {
        let dir = std::env::temp_dir().join(format!("starlight-logging-{}", std::process::id()));
        let path = dir.join("bot.log");

        let appender = rolling_appender(&path, LogRotation::Never);

        assert!(appender.is_ok());
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
