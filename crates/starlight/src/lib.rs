//! # Starlight
//!
//! Interactive message surfaces for chat bots: owner-only views, button
//! pagination, and inline loops over clicks and page requests.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────────┐     ┌────────────────────┐
//! │ Host (clicks)│────▶│ ViewAuthor.dispatch  │────▶│ control callbacks  │
//! └──────────────┘     └──────────────────────┘     └─────────┬──────────┘
//!                                                              │ change_page
//!                      ┌──────────────────────┐     ┌─────────▼──────────┐
//!                      │ Host (send / edit)   │◀────│ PageRenderer       │
//!                      └──────────────────────┘     └────────────────────┘
//! ```
//!
//! - **core**: host contracts, controls, payloads and errors
//! - **views**: [`ViewAuthor`](views::ViewAuthor),
//!   [`SimplePaginationView`](views::SimplePaginationView) and the inline adapters
//! - **commands**: separator arguments, usage strings and the help menu
//! - **utils**: search and collection helpers
//! - **runtime**: configuration and logging
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use starlight::prelude::*;
//!
//! let config = load_config()?;
//! init_from_config(&config.logging);
//!
//! let view = SimplePaginationView::for_context(
//!     ctx.as_ref(),
//!     vec!["one", "two", "three"],
//!     DisplayRenderer,
//!     config.pagination.to_options(),
//! );
//! let mut pages = InlinePagination::new(view, ctx);
//! while let Some(item) = pages.next().await {
//!     let text = item.data().to_uppercase();
//!     item.format(text)?;
//! }
//! ```
//!
//! ## Features
//!
//! - `help`: help menu, detail pages and the `[help]` config section (default)
//! - `toml-config` / `yaml-config`: config file formats (`toml-config` default)
//! - `json-log`: JSON log lines
//! - `mock`: in-memory host for tests and demos

pub use starlight_commands as commands;
pub use starlight_core as core;
pub use starlight_runtime as runtime;
pub use starlight_utils as utils;
pub use starlight_views as views;

/// Prelude module for convenient imports.
pub mod prelude {
    // Host boundary
    pub use starlight_core::prelude::*;

    // Surfaces
    pub use starlight_views::prelude::*;

    // Commands
    pub use starlight_commands::{CommandParameter, Separator, SeparatorMode, app_signature};
    #[cfg(feature = "help")]
    pub use starlight_commands::{
        Category, CommandInfo, HelpBook, HelpOptions, help_menu, send_command_help,
        send_error_message, send_group_help,
    };

    // Data helpers
    pub use starlight_utils::{Search, chunked, flatten};

    // Configuration and logging
    pub use starlight_runtime::config::load_config;
    pub use starlight_runtime::{StarlightConfig, init_from_config};
}
