//! # Starlight Commands
//!
//! Command-side helpers for starlight:
//!
//! - [`separator`]: delimiter-separated list arguments
//! - [`signature`]: usage strings for application command parameters
//! - [`help`]: a paginated help menu (feature `help`, on by default)

pub mod error;
pub mod separator;
pub mod signature;

#[cfg(feature = "help")]
pub mod help;

pub use error::{ConvertError, ConvertResult};
pub use separator::{Separator, SeparatorMode, SeparatorOutput};
pub use signature::{Choice, ChoiceValue, CommandParameter, ParameterKind, app_signature};

#[cfg(feature = "help")]
pub use help::{
    Category, CommandInfo, HelpBook, HelpOptions, HelpPage, HelpRenderer, help_menu,
    send_command_help, send_error_message, send_group_help,
};
