//! Host framework contracts.
//!
//! Surfaces never talk to the chat platform directly. Everything they need
//! is expressed through three traits the host framework implements:
//!
//! | Trait | Platform concept | Used for |
//! |-------|------------------|----------|
//! | [`CommandContext`] | The invocation a surface was created for | owner identity, first send |
//! | [`Artifact`] | A rendered message | edits and deletion after the first send |
//! | [`Interaction`] | A component click | owner check, deferral, interaction-scoped edits |

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HostResult;
use crate::id::{MessageId, UserId};
use crate::payload::MessagePayload;

/// A component interaction dispatched by the platform.
#[async_trait]
pub trait Interaction: Send + Sync {
    /// The user who triggered the interaction.
    fn actor(&self) -> UserId;

    /// Returns `true` once the interaction has been acknowledged
    /// (deferred, responded to, or edited through).
    fn is_done(&self) -> bool;

    /// The values picked in a select menu. Empty for buttons.
    fn values(&self) -> Vec<String> {
        Vec::new()
    }

    /// Acknowledges the interaction without changing the message.
    async fn defer(&self) -> HostResult<()>;

    /// Acknowledges the interaction by editing the message it came from.
    async fn edit_message(&self, payload: MessagePayload) -> HostResult<()>;

    /// Acknowledges the interaction with a new message.
    ///
    /// Surfaces use this with an ephemeral payload for notices meant only
    /// for the interacting user.
    async fn send_message(&self, payload: MessagePayload) -> HostResult<()>;
}

/// A shared interaction handle.
pub type BoxedInteraction = Arc<dyn Interaction>;

/// A message previously sent by a surface.
#[async_trait]
pub trait Artifact: Send + Sync {
    /// The platform id of this message.
    fn id(&self) -> MessageId;

    /// Replaces the message's content with `payload`.
    async fn edit(&self, payload: MessagePayload) -> HostResult<()>;

    /// Deletes the message.
    async fn delete(&self) -> HostResult<()>;
}

/// A shared artifact handle.
pub type BoxedArtifact = Arc<dyn Artifact>;

/// The invocation context a surface is started from.
#[async_trait]
pub trait CommandContext: Send + Sync {
    /// The user who invoked the command.
    fn author(&self) -> UserId;

    /// The interaction that invoked the command, for application commands.
    fn interaction(&self) -> Option<BoxedInteraction> {
        None
    }

    /// Sends a new message into the invocation's channel.
    async fn send(&self, payload: MessagePayload) -> HostResult<BoxedArtifact>;
}

/// A shared command context handle.
pub type BoxedContext = Arc<dyn CommandContext>;
