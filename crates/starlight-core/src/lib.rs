//! # Starlight Core
//!
//! Shared building blocks for starlight surfaces.
//!
//! Surfaces are plugins that live inside a host bot framework. This crate
//! describes the boundary between the two:
//!
//! - **Host contracts**: what a surface needs from the host ([`CommandContext`],
//!   [`Artifact`], [`Interaction`])
//! - **Controls**: buttons and selects with replaceable callback slots ([`Control`])
//! - **Payload model**: the platform-neutral send/edit payload ([`MessagePayload`],
//!   [`Embed`], [`PageContent`])
//! - **Errors**: [`HostError`] for host primitives, [`ViewError`] for surfaces
//!
//! ```text
//! ┌──────────────┐  dispatch   ┌──────────────┐  send/edit  ┌──────────────┐
//! │ Host (clicks)│────────────▶│   Surface    │────────────▶│ Host (render)│
//! └──────────────┘             └──────────────┘             └──────────────┘
//! ```
//!
//! The `mock` feature enables [`mock::MockHost`], an in-memory host for tests.

pub mod control;
pub mod error;
pub mod host;
pub mod id;
pub mod payload;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use control::{Control, ControlCallback, callback};
pub use error::{HostError, HostResult, ViewError, ViewResult};
pub use host::{
    Artifact, BoxedArtifact, BoxedContext, BoxedInteraction, CommandContext, Interaction,
};
pub use id::{ControlId, MessageId, UserId};
pub use payload::{
    ButtonStyle, ComponentKind, ComponentState, Embed, EmbedField, MessagePayload, PageContent,
    SelectOption,
};

/// Prelude for common imports.
pub mod prelude {
    pub use super::control::{Control, ControlCallback, callback};
    pub use super::error::{HostError, ViewError, ViewResult};
    pub use super::host::{BoxedArtifact, BoxedContext, BoxedInteraction, CommandContext};
    pub use super::id::{ControlId, UserId};
    pub use super::payload::{Embed, MessagePayload, PageContent};
}
