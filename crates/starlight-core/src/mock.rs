//! In-memory host used by tests and demos.
//!
//! [`MockHost`] stores every message it "sends" and records each primitive
//! call in order, so tests can assert on both the final rendered state and
//! the exact sequence of host operations a surface performed.
//!
//! Edits follow the platform's partial-update rule: only the parts present
//! in the payload are replaced.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{HostError, HostResult};
use crate::host::{Artifact, BoxedArtifact, BoxedInteraction, CommandContext, Interaction};
use crate::id::{MessageId, UserId};
use crate::payload::MessagePayload;

/// One recorded host primitive call.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Send(MessageId),
    Edit(MessageId),
    Delete(MessageId),
    Defer(UserId),
    InteractionEdit(UserId),
    InteractionSend { actor: UserId, payload: MessagePayload },
}

#[derive(Default)]
struct HostState {
    next_id: u64,
    messages: BTreeMap<MessageId, MessagePayload>,
    deleted: Vec<MessageId>,
    calls: Vec<HostCall>,
    fail_edits: bool,
}

impl HostState {
    fn latest(&self) -> Option<MessageId> {
        self.messages.keys().next_back().copied()
    }

    fn apply_edit(&mut self, id: MessageId, payload: MessagePayload) -> HostResult<()> {
        if self.fail_edits {
            return Err(HostError::EditFailed("edits disabled by test".into()));
        }
        let message = self
            .messages
            .get_mut(&id)
            .ok_or_else(|| HostError::EditFailed(format!("unknown message {id}")))?;
        merge(message, payload);
        Ok(())
    }
}

fn merge(target: &mut MessagePayload, update: MessagePayload) {
    if update.content.is_some() {
        target.content = update.content;
    }
    if update.embed.is_some() {
        target.embed = update.embed;
    }
    if update.components.is_some() {
        target.components = update.components;
    }
    target.extra.extend(update.extra);
}

/// An in-memory chat platform.
#[derive(Clone, Default)]
pub struct MockHost {
    state: Arc<Mutex<HostState>>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an invocation context authored by `author`.
    pub fn context(&self, author: impl Into<UserId>) -> Arc<MockContext> {
        Arc::new(MockContext {
            host: self.clone(),
            author: author.into(),
            interaction: None,
        })
    }

    /// Creates an invocation context that carries an application-command interaction.
    pub fn app_context(&self, author: impl Into<UserId>) -> Arc<MockContext> {
        let author = author.into();
        let interaction: BoxedInteraction = self.interaction(author);
        Arc::new(MockContext {
            host: self.clone(),
            author,
            interaction: Some(interaction),
        })
    }

    /// Creates a fresh, unacknowledged interaction from `actor` on the
    /// most recently sent message.
    pub fn interaction(&self, actor: impl Into<UserId>) -> Arc<MockInteraction> {
        Arc::new(MockInteraction {
            host: self.clone(),
            actor: actor.into(),
            message: None,
            values: Vec::new(),
            done: AtomicBool::new(false),
        })
    }

    /// Creates an unacknowledged select-menu interaction carrying `values`.
    pub fn select_interaction(
        &self,
        actor: impl Into<UserId>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Arc<MockInteraction> {
        Arc::new(MockInteraction {
            host: self.clone(),
            actor: actor.into(),
            message: None,
            values: values.into_iter().map(Into::into).collect(),
            done: AtomicBool::new(false),
        })
    }

    /// Creates an interaction that was already acknowledged elsewhere.
    pub fn acknowledged_interaction(&self, actor: impl Into<UserId>) -> Arc<MockInteraction> {
        let interaction = self.interaction(actor);
        interaction.done.store(true, Ordering::SeqCst);
        interaction
    }

    /// Returns the current payload of a message.
    pub fn message(&self, id: MessageId) -> Option<MessagePayload> {
        self.state.lock().messages.get(&id).cloned()
    }

    /// Returns the current payload of the most recently sent message.
    pub fn last_message(&self) -> Option<MessagePayload> {
        let state = self.state.lock();
        state.latest().and_then(|id| state.messages.get(&id).cloned())
    }

    /// Returns the id of the most recently sent message.
    pub fn last_message_id(&self) -> Option<MessageId> {
        self.state.lock().latest()
    }

    /// Returns `true` if the message was deleted.
    pub fn is_deleted(&self, id: MessageId) -> bool {
        self.state.lock().deleted.contains(&id)
    }

    /// Returns every recorded call in order.
    pub fn calls(&self) -> Vec<HostCall> {
        self.state.lock().calls.clone()
    }

    /// Makes every subsequent edit fail.
    pub fn fail_edits(&self, fail: bool) {
        self.state.lock().fail_edits = fail;
    }
}

/// Invocation context backed by a [`MockHost`].
pub struct MockContext {
    host: MockHost,
    author: UserId,
    interaction: Option<BoxedInteraction>,
}

#[async_trait]
impl CommandContext for MockContext {
    fn author(&self) -> UserId {
        self.author
    }

    fn interaction(&self) -> Option<BoxedInteraction> {
        self.interaction.clone()
    }

    async fn send(&self, payload: MessagePayload) -> HostResult<BoxedArtifact> {
        let mut state = self.host.state.lock();
        state.next_id += 1;
        let id = MessageId(state.next_id);
        state.messages.insert(id, payload);
        state.calls.push(HostCall::Send(id));
        Ok(Arc::new(MockArtifact {
            host: self.host.clone(),
            id,
        }))
    }
}

/// Message handle backed by a [`MockHost`].
pub struct MockArtifact {
    host: MockHost,
    id: MessageId,
}

#[async_trait]
impl Artifact for MockArtifact {
    fn id(&self) -> MessageId {
        self.id
    }

    async fn edit(&self, payload: MessagePayload) -> HostResult<()> {
        let mut state = self.host.state.lock();
        state.apply_edit(self.id, payload)?;
        state.calls.push(HostCall::Edit(self.id));
        Ok(())
    }

    async fn delete(&self) -> HostResult<()> {
        let mut state = self.host.state.lock();
        if state.messages.remove(&self.id).is_none() {
            return Err(HostError::DeleteFailed(format!("unknown message {}", self.id)));
        }
        state.deleted.push(self.id);
        state.calls.push(HostCall::Delete(self.id));
        Ok(())
    }
}

/// Component interaction backed by a [`MockHost`].
pub struct MockInteraction {
    host: MockHost,
    actor: UserId,
    message: Option<MessageId>,
    values: Vec<String>,
    done: AtomicBool,
}

impl MockInteraction {
    fn acknowledge(&self) -> HostResult<()> {
        if self.done.swap(true, Ordering::SeqCst) {
            return Err(HostError::AlreadyAcknowledged);
        }
        Ok(())
    }
}

#[async_trait]
impl Interaction for MockInteraction {
    fn actor(&self) -> UserId {
        self.actor
    }

    fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    fn values(&self) -> Vec<String> {
        self.values.clone()
    }

    async fn defer(&self) -> HostResult<()> {
        self.acknowledge()?;
        self.host.state.lock().calls.push(HostCall::Defer(self.actor));
        Ok(())
    }

    async fn edit_message(&self, payload: MessagePayload) -> HostResult<()> {
        self.acknowledge()?;
        let mut state = self.host.state.lock();
        let id = self
            .message
            .or_else(|| state.latest())
            .ok_or_else(|| HostError::ResponseFailed("no message to edit".into()))?;
        state.apply_edit(id, payload)?;
        state.calls.push(HostCall::InteractionEdit(self.actor));
        Ok(())
    }

    async fn send_message(&self, payload: MessagePayload) -> HostResult<()> {
        self.acknowledge()?;
        self.host.state.lock().calls.push(HostCall::InteractionSend {
            actor: self.actor,
            payload,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_edit_is_partial() {
        let host = MockHost::new();
        let ctx = host.context(1);
        let artifact = ctx.send(MessagePayload::text("first")).await.unwrap();

        artifact
            .edit(MessagePayload::components_only(Vec::new()))
            .await
            .unwrap();

        let message = host.message(artifact.id()).unwrap();
        assert_eq!(message.content.as_deref(), Some("first"));
        assert_eq!(message.components, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_interaction_acknowledges_once() {
        let host = MockHost::new();
        host.context(1).send(MessagePayload::text("x")).await.unwrap();

        let interaction = host.interaction(1);
        interaction.defer().await.unwrap();
        assert!(interaction.is_done());
        assert!(matches!(
            interaction.edit_message(MessagePayload::text("y")).await,
            Err(HostError::AlreadyAcknowledged)
        ));
    }
}
