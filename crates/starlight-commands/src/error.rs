//! Errors raised while converting command arguments.

use thiserror::Error;

// =============================================================================
// Conversion Errors
// =============================================================================

/// Errors produced by argument converters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// A delimiter was the last thing in the input.
    #[error("Expected an argument after a \"{separator}\".")]
    ExpectedEndOfSeparator {
        /// The delimiter that had nothing after it.
        separator: char,
    },

    /// The delimiter is not exactly one non-whitespace character.
    #[error("delimiter needs to be a single non-whitespace character, got {0:?}")]
    InvalidDelimiter(String),

    /// A quoted argument was never closed.
    #[error("expected a closing quote in {0:?}")]
    ExpectedClosingQuote(String),

    /// One argument failed to convert to the target type.
    #[error("failed to convert {argument:?}: {reason}")]
    BadArgument {
        /// The raw argument text.
        argument: String,
        /// Why the conversion failed.
        reason: String,
    },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for argument conversion.
pub type ConvertResult<T> = Result<T, ConvertError>;
