//! # Starlight Runtime
//!
//! The ambient setup around starlight surfaces:
//!
//! - [`config`]: layered configuration with figment (files, `STARLIGHT_*`
//!   environment variables, programmatic merges) and validation
//! - [`logging`]: `tracing-subscriber` initialization from that configuration
//!
//! ```ignore
//! let config = starlight_runtime::config::load_config()?;
//! starlight_runtime::logging::init_from_config(&config.logging);
//!
//! let view = SimplePaginationView::for_context(
//!     ctx.as_ref(),
//!     items,
//!     DisplayRenderer,
//!     config.pagination.to_options(),
//! );
//! ```

pub mod config;
pub mod logging;

pub use config::{
    ConfigError, ConfigLoader, ConfigResult, LoggingConfig, PaginationConfig, StarlightConfig,
};
pub use logging::{LoggingBuilder, LoggingError, init_from_config};

// Bots log through the same tracing version the surfaces use.
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
