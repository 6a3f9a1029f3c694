//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
#[cfg(feature = "help")]
use starlight_commands::HelpOptions;
use starlight_views::{NavigationButtons, PaginationOptions, ViewOptions};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StarlightConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Defaults for pagination views built from config.
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Texts and sizes of the help menu.
    #[cfg(feature = "help")]
    #[serde(default)]
    pub help: HelpConfig,
}

/// Help menu settings. Same shape as [`HelpOptions`].
#[cfg(feature = "help")]
pub type HelpConfig = HelpOptions;

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Needs the `json-log` feature; falls back to `Full` without it.
    Json,
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// When a log file is rolled over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanEventConfig {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

impl SpanEventConfig {
    /// Span creation and close, which shows how long each span took.
    pub const fn lifecycle() -> Self {
        Self {
            new: true,
            enter: false,
            exit: false,
            close: true,
        }
    }

    /// Enter and exit only.
    pub const fn active() -> Self {
        Self {
            new: false,
            enter: true,
            exit: true,
            close: false,
        }
    }

    pub const fn full() -> Self {
        Self {
            new: true,
            enter: true,
            exit: true,
            close: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    pub span_events: SpanEventConfig,
    pub thread_ids: bool,
    /// Include file names and line numbers.
    pub file_location: bool,
    /// Log file, used with [`LogOutput::File`].
    pub file_path: Option<PathBuf>,
    pub rotation: LogRotation,
    /// Per-module levels, e.g. `starlight_views = "debug"`.
    pub filters: HashMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
            file_path: None,
            rotation: LogRotation::Never,
            filters: HashMap::new(),
        }
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Pagination defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Idle seconds before a view times out.
    pub timeout_secs: u64,
    /// Keep views alive until stopped, ignoring `timeout_secs`.
    pub disable_timeout: bool,
    /// Delete the message when the view stops instead of disabling controls.
    pub delete_after: bool,
    pub cache_page: bool,
    pub buttons: NavigationButtons,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 180,
            disable_timeout: false,
            delete_after: false,
            cache_page: false,
            buttons: NavigationButtons::default(),
        }
    }
}

impl PaginationConfig {
    /// The idle timeout, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (!self.disable_timeout).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Converts to the options a pagination view is built with.
    pub fn to_options(&self) -> PaginationOptions {
        PaginationOptions {
            view: ViewOptions::default()
                .timeout(self.timeout())
                .delete_after(self.delete_after),
            cache_page: self.cache_page,
            buttons: self.buttons.clone(),
        }
    }
}

impl From<&PaginationConfig> for PaginationOptions {
    fn from(config: &PaginationConfig) -> Self {
        config.to_options()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_options() {
        let config = PaginationConfig {
            timeout_secs: 30,
            delete_after: true,
            cache_page: true,
            ..PaginationConfig::default()
        };
        let options = config.to_options();
        assert_eq!(options.view.timeout, Some(Duration::from_secs(30)));
        assert!(options.view.delete_after);
        assert!(options.cache_page);

        let forever = PaginationConfig {
            disable_timeout: true,
            ..PaginationConfig::default()
        };
        assert_eq!(PaginationOptions::from(&forever).view.timeout, None);
    }

    #[test]
    fn test_yaml_fixture() {
        let yaml = r#"
logging:
  level: debug
  format: pretty
  filters:
    starlight_views: trace
pagination:
  timeout_secs: 60
  buttons:
    stop:
      label: Close
      style: danger
help:
  per_page: 4
  placeholder: Pick one
"#;
        let config: StarlightConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.logging.filters["starlight_views"], LogLevel::Trace);
        assert_eq!(config.pagination.timeout_secs, 60);
        let stop = config.pagination.buttons.stop.unwrap();
        assert_eq!(stop.label.as_deref(), Some("Close"));
        assert!(config.pagination.buttons.next.is_some());
        #[cfg(feature = "help")]
        {
            assert_eq!(config.help.per_page, 4);
            assert_eq!(config.help.placeholder, "Pick one");
            assert_eq!(config.help.no_category, "No Category");
        }
    }

    #[cfg(not(feature = "help"))]
    #[test]
    fn test_help_section_ignored_without_feature() {
        let json = r#"{"help": {"per_page": 4}, "pagination": {"timeout_secs": 30}}"#;
        let config: StarlightConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.pagination.timeout_secs, 30);
    }
}
