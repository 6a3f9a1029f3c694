//! Unified error types for starlight surfaces.
//!
//! [`HostError`] describes failures of the host primitives (send, edit,
//! defer, delete). [`ViewError`] is the error every surface operation and
//! every control callback returns.

use thiserror::Error;

use crate::id::{ControlId, UserId};

// =============================================================================
// Host Errors
// =============================================================================

/// Errors reported by the host framework's primitives.
#[derive(Debug, Clone, Error)]
pub enum HostError {
    /// Creating a new message failed.
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// Editing an existing message failed.
    #[error("failed to edit message: {0}")]
    EditFailed(String),

    /// Deleting a message failed.
    #[error("failed to delete message: {0}")]
    DeleteFailed(String),

    /// Responding to an interaction failed.
    #[error("failed to respond to interaction: {0}")]
    ResponseFailed(String),

    /// The interaction was already acknowledged.
    #[error("interaction has already been acknowledged")]
    AlreadyAcknowledged,

    /// Other error.
    #[error("{0}")]
    Other(String),
}

// =============================================================================
// View Errors
// =============================================================================

/// Errors that can occur while driving a surface.
#[derive(Debug, Clone, Error)]
pub enum ViewError {
    /// A user other than the owner interacted with the surface.
    #[error("You cannot interact with this message.")]
    Unauthorized {
        /// The user that attempted the interaction.
        actor: UserId,
    },

    /// `start` was called on a surface that already started.
    #[error("view has already been started")]
    AlreadyStarted,

    /// The surface has no rendered message yet.
    #[error("view has not been started")]
    NotStarted,

    /// A page index outside the data source was requested.
    #[error("page {page} is out of range (max pages: {max_pages})")]
    PageOutOfRange {
        /// The requested page.
        page: usize,
        /// Number of pages in the data source.
        max_pages: usize,
    },

    /// An interaction referenced a control this surface does not own.
    #[error("unknown control '{0}'")]
    UnknownControl(ControlId),

    /// A render or view-mutation hook failed.
    #[error("failed to render page: {0}")]
    Render(String),

    /// The page request was already resolved or discarded.
    #[error("page request is no longer pending")]
    RequestClosed,

    /// Host primitive failure.
    #[error(transparent)]
    Host(#[from] HostError),
}

impl ViewError {
    /// Creates a render error with the given message.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Returns `true` for the unauthorized-interaction condition.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for host primitives.
pub type HostResult<T> = Result<T, HostError>;

/// Result type for surface operations.
pub type ViewResult<T> = Result<T, ViewError>;
