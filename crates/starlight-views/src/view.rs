//! The owned interactive surface.
//!
//! A [`ViewAuthor`] is a set of controls bound to one rendered message and
//! one owner. Only the owner may drive it: every click goes through
//! [`ViewAuthor::dispatch`], which rejects other users before any callback
//! runs.
//!
//! # Lifecycle
//!
//! ```text
//! created ──start()──▶ active ──stop()/idle timeout──▶ terminal
//!                        │ ▲
//!                        └─┘ dispatch()
//! ```
//!
//! Stopping fires the installed stop hook, marks the view terminal and runs
//! teardown ([`ViewAuthor::on_stop`]) on a background task.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use starlight_core::{
    BoxedArtifact, BoxedInteraction, CommandContext, ComponentState, Control, ControlCallback,
    ControlId, HostError, MessagePayload, UserId, ViewError, ViewResult,
};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, debug_span, error, info, trace, warn};

/// Why a view became terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// `stop()` was called.
    Stopped,
    /// The idle watchdog fired.
    Timeout,
}

/// A hook invoked whenever the view stops, before teardown.
///
/// Interception utilities install one to learn that they must unplug.
pub type StopHook = Arc<dyn Fn(StopCause) + Send + Sync>;

/// Construction options for a [`ViewAuthor`].
#[derive(Debug, Clone)]
pub struct ViewOptions {
    /// Delete the message on teardown instead of disabling its controls.
    pub delete_after: bool,
    /// Idle timeout. `None` keeps the view alive until stopped.
    pub timeout: Option<Duration>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            delete_after: false,
            timeout: Some(Duration::from_secs(180)),
        }
    }
}

impl ViewOptions {
    /// Options without an idle timeout.
    pub fn no_timeout() -> Self {
        Self {
            timeout: None,
            ..Self::default()
        }
    }

    /// Sets `delete_after` (builder pattern).
    pub fn delete_after(mut self, delete_after: bool) -> Self {
        self.delete_after = delete_after;
        self
    }

    /// Sets the idle timeout (builder pattern).
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Default)]
struct ViewState {
    message: Option<BoxedArtifact>,
    controls: Vec<Control>,
    started: bool,
}

struct ViewInner {
    owner: UserId,
    options: ViewOptions,
    state: Mutex<ViewState>,
    stop_hook: Mutex<Option<StopHook>>,
    stopped: CancellationToken,
    activity: Notify,
    teardown: Mutex<Option<JoinHandle<ViewResult<()>>>>,
}

/// An interactive surface restricted to a single owner.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct ViewAuthor {
    inner: Arc<ViewInner>,
}

/// A non-owning reference to a [`ViewAuthor`].
#[derive(Clone)]
pub struct WeakView {
    inner: Weak<ViewInner>,
}

impl WeakView {
    pub fn upgrade(&self) -> Option<ViewAuthor> {
        self.inner.upgrade().map(|inner| ViewAuthor { inner })
    }
}

impl ViewAuthor {
    /// Creates a view owned by `owner`.
    pub fn new(owner: impl Into<UserId>, options: ViewOptions) -> Self {
        Self {
            inner: Arc::new(ViewInner {
                owner: owner.into(),
                options,
                state: Mutex::new(ViewState::default()),
                stop_hook: Mutex::new(None),
                stopped: CancellationToken::new(),
                activity: Notify::new(),
                teardown: Mutex::new(None),
            }),
        }
    }

    /// Creates a view owned by the author of an invocation.
    pub fn for_context(ctx: &dyn CommandContext, options: ViewOptions) -> Self {
        Self::new(ctx.author(), options)
    }

    pub fn downgrade(&self) -> WeakView {
        WeakView {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn owner(&self) -> UserId {
        self.inner.owner
    }

    pub fn options(&self) -> &ViewOptions {
        &self.inner.options
    }

    pub fn is_started(&self) -> bool {
        self.inner.state.lock().started
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.is_cancelled()
    }

    // =========================================================================
    // Message
    // =========================================================================

    /// The rendered message, once started.
    pub fn message(&self) -> Option<BoxedArtifact> {
        self.inner.state.lock().message.clone()
    }

    /// Forgets the rendered message so teardown leaves it untouched.
    pub fn clear_message(&self) -> Option<BoxedArtifact> {
        self.inner.state.lock().message.take()
    }

    // =========================================================================
    // Controls
    // =========================================================================

    /// Adds a control and returns its id.
    pub fn add_control(&self, control: Control) -> ControlId {
        let id = control.id().clone();
        self.inner.state.lock().controls.push(control);
        id
    }

    pub fn remove_control(&self, id: &ControlId) -> Option<Control> {
        let mut state = self.inner.state.lock();
        let index = state.controls.iter().position(|c| c.id() == id)?;
        Some(state.controls.remove(index))
    }

    /// Mutates a control in place. Returns `None` if the id is unknown.
    pub fn update_control<R>(&self, id: &ControlId, f: impl FnOnce(&mut Control) -> R) -> Option<R> {
        let mut state = self.inner.state.lock();
        state.controls.iter_mut().find(|c| c.id() == id).map(f)
    }

    pub fn has_control(&self, id: &ControlId) -> bool {
        self.inner.state.lock().controls.iter().any(|c| c.id() == id)
    }

    /// Ids of all controls, in insertion order.
    pub fn control_ids(&self) -> Vec<ControlId> {
        self.inner
            .state
            .lock()
            .controls
            .iter()
            .map(|c| c.id().clone())
            .collect()
    }

    /// Snapshot of all controls, ready to attach to a payload.
    pub fn components(&self) -> Vec<ComponentState> {
        self.inner
            .state
            .lock()
            .controls
            .iter()
            .map(Control::state)
            .collect()
    }

    /// Disables every control.
    pub fn disable_all(&self) {
        for control in self.inner.state.lock().controls.iter_mut() {
            control.disabled = true;
        }
    }

    /// Reads a control's callback slot.
    pub fn callback(&self, id: &ControlId) -> Option<ControlCallback> {
        let state = self.inner.state.lock();
        state.controls.iter().find(|c| c.id() == id)?.callback()
    }

    /// Swaps a control's callback slot and returns the previous value.
    pub fn replace_callback(
        &self,
        id: &ControlId,
        callback: Option<ControlCallback>,
    ) -> ViewResult<Option<ControlCallback>> {
        self.update_control(id, |control| control.replace_callback(callback))
            .ok_or_else(|| ViewError::UnknownControl(id.clone()))
    }

    /// Swaps the stop hook and returns the previous one.
    pub fn replace_stop_hook(&self, hook: Option<StopHook>) -> Option<StopHook> {
        std::mem::replace(&mut *self.inner.stop_hook.lock(), hook)
    }

    fn fire_stop_hook(&self, cause: StopCause) {
        let hook = self.inner.stop_hook.lock().clone();
        if let Some(hook) = hook {
            hook(cause);
        }
    }

    // =========================================================================
    // Interactions
    // =========================================================================

    /// Accepts the interaction only if it comes from the owner.
    pub fn interaction_check(&self, interaction: &BoxedInteraction) -> ViewResult<()> {
        let actor = interaction.actor();
        if actor == self.inner.owner {
            Ok(())
        } else {
            Err(ViewError::Unauthorized { actor })
        }
    }

    /// Handles a failure raised while dispatching an interaction.
    ///
    /// Unauthorized interactions get an ephemeral notice and are swallowed.
    /// Anything else is logged and returned to the host.
    pub async fn on_error(
        &self,
        interaction: &BoxedInteraction,
        error: ViewError,
        control: &ControlId,
    ) -> ViewResult<()> {
        if let ViewError::Unauthorized { actor } = &error {
            debug!(actor = %actor, control = %control, "Rejected interaction from non-owner");
            let notice = MessagePayload::text(error.to_string()).ephemeral();
            interaction.send_message(notice).await?;
            return Ok(());
        }

        error!(control = %control, error = %error, "View callback failed");
        Err(error)
    }

    /// Routes a component click to the control's callback.
    pub async fn dispatch(&self, interaction: BoxedInteraction, control: &ControlId) -> ViewResult<()> {
        if self.is_stopped() {
            debug!(control = %control, "Ignoring interaction on a stopped view");
            return Ok(());
        }

        let span = debug_span!("dispatch", control = %control, actor = %interaction.actor());
        let result = self
            .run_callback(&interaction, control)
            .instrument(span)
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(error) => self.on_error(&interaction, error, control).await,
        }
    }

    async fn run_callback(&self, interaction: &BoxedInteraction, control: &ControlId) -> ViewResult<()> {
        self.interaction_check(interaction)?;
        self.inner.activity.notify_one();

        let callback = {
            let state = self.inner.state.lock();
            state
                .controls
                .iter()
                .find(|c| c.id() == control)
                .ok_or_else(|| ViewError::UnknownControl(control.clone()))?
                .callback()
        };

        match callback {
            Some(callback) => callback(Arc::clone(interaction), control.clone()).await,
            None => {
                trace!("Control has no callback");
                Ok(())
            }
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    fn mark_started(&self) -> ViewResult<()> {
        let mut state = self.inner.state.lock();
        if state.started {
            return Err(ViewError::AlreadyStarted);
        }
        state.started = true;
        Ok(())
    }

    /// Sends the first rendering of the view and binds the resulting message.
    ///
    /// The current component snapshot is attached when `payload` carries none.
    pub async fn start(&self, ctx: &dyn CommandContext, mut payload: MessagePayload) -> ViewResult<()> {
        self.mark_started()?;
        if payload.components.is_none() {
            payload.components = Some(self.components());
        }

        let message = match ctx.send(payload).await {
            Ok(message) => message,
            Err(e) => {
                self.inner.state.lock().started = false;
                return Err(e.into());
            }
        };

        debug!(owner = %self.inner.owner, message = %message.id(), "View started");
        self.inner.state.lock().message = Some(message);
        if self.is_stopped() {
            debug!("View was stopped before its message was sent");
            return self.on_stop().await;
        }
        self.arm_watchdog();
        Ok(())
    }

    /// Binds an already rendered message instead of sending a new one.
    pub fn attach(&self, message: BoxedArtifact) -> ViewResult<()> {
        self.mark_started()?;
        debug!(owner = %self.inner.owner, message = %message.id(), "View attached to message");
        self.inner.state.lock().message = Some(message);
        self.arm_watchdog();
        Ok(())
    }

    fn arm_watchdog(&self) {
        let Some(timeout) = self.inner.options.timeout else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No tokio runtime available, idle timeout disabled");
            return;
        };
        let view = self.clone();
        handle.spawn(async move {
            loop {
                tokio::select! {
                    _ = view.inner.stopped.cancelled() => return,
                    _ = view.inner.activity.notified() => continue,
                    _ = tokio::time::sleep(timeout) => break,
                }
            }
            if let Err(e) = view.on_timeout().await {
                warn!(error = %e, "View teardown after timeout failed");
            }
        });
    }

    /// Stops the view and tears it down in the background.
    pub fn stop(&self) {
        self.stop_with(true);
    }

    /// Stops the view. Teardown runs only if `teardown` is set.
    ///
    /// Stopping a terminal view does nothing.
    pub fn stop_with(&self, teardown: bool) {
        if self.is_stopped() {
            return;
        }
        self.fire_stop_hook(StopCause::Stopped);
        self.inner.stopped.cancel();
        debug!(owner = %self.inner.owner, teardown, "View stopped");

        if !teardown {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let view = self.clone();
                let task = handle.spawn(async move { view.on_stop().await });
                *self.inner.teardown.lock() = Some(task);
            }
            Err(_) => warn!("No tokio runtime available, skipping view teardown"),
        }
    }

    /// Teardown: deletes the message or disables its controls.
    pub async fn on_stop(&self) -> ViewResult<()> {
        let Some(message) = self.message() else {
            return Ok(());
        };

        if self.inner.options.delete_after {
            message.delete().await?;
            return Ok(());
        }

        self.disable_all();
        message
            .edit(MessagePayload::components_only(self.components()))
            .await?;
        Ok(())
    }

    /// Ends the view after the idle timeout elapsed.
    pub async fn on_timeout(&self) -> ViewResult<()> {
        if self.is_stopped() {
            return Ok(());
        }
        self.fire_stop_hook(StopCause::Timeout);
        self.inner.stopped.cancel();
        info!(owner = %self.inner.owner, "View timed out");
        self.on_stop().await
    }

    /// Resolves once the view is terminal.
    pub async fn wait(&self) {
        self.inner.stopped.cancelled().await;
    }

    /// Awaits the background teardown started by [`stop`](Self::stop).
    pub async fn wait_teardown(&self) -> ViewResult<()> {
        let task = self.inner.teardown.lock().take();
        match task {
            Some(task) => task
                .await
                .map_err(|e| HostError::Other(format!("teardown task failed: {e}")))?,
            None => Ok(()),
        }
    }
}

impl fmt::Debug for ViewAuthor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ViewAuthor")
            .field("owner", &self.inner.owner)
            .field("controls", &state.controls.len())
            .field("started", &state.started)
            .field("stopped", &self.inner.stopped.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use starlight_core::callback;
    use starlight_core::mock::{HostCall, MockHost};

    use super::*;

    fn counting_button(counter: Arc<AtomicUsize>) -> Control {
        Control::button().label("count").on_click(callback(move |_, _| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }))
    }

    #[tokio::test]
    async fn test_start_attaches_components() {
        let host = MockHost::new();
        let ctx = host.context(1);
        let view = ViewAuthor::for_context(ctx.as_ref(), ViewOptions::no_timeout());
        view.add_control(Control::button().label("a"));

        view.start(ctx.as_ref(), MessagePayload::text("hi")).await.unwrap();

        let message = host.last_message().unwrap();
        assert_eq!(message.components.unwrap().len(), 1);
        assert!(view.message().is_some());
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let host = MockHost::new();
        let ctx = host.context(1);
        let view = ViewAuthor::new(1, ViewOptions::no_timeout());

        view.start(ctx.as_ref(), MessagePayload::text("a")).await.unwrap();
        let result = view.start(ctx.as_ref(), MessagePayload::text("b")).await;
        assert!(matches!(result, Err(ViewError::AlreadyStarted)));
    }

    #[tokio::test]
    async fn test_dispatch_runs_owner_callback() {
        let host = MockHost::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let view = ViewAuthor::new(1, ViewOptions::no_timeout());
        let id = view.add_control(counting_button(Arc::clone(&counter)));

        view.dispatch(host.interaction(1), &id).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dispatch_rejects_non_owner() {
        let host = MockHost::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let view = ViewAuthor::new(1, ViewOptions::no_timeout());
        let id = view.add_control(counting_button(Arc::clone(&counter)));

        view.dispatch(host.interaction(2), &id).await.unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        let calls = host.calls();
        match calls.as_slice() {
            [HostCall::InteractionSend { actor, payload }] => {
                assert_eq!(*actor, UserId(2));
                assert!(payload.ephemeral);
                assert_eq!(
                    payload.content.as_deref(),
                    Some("You cannot interact with this message.")
                );
            }
            other => panic!("unexpected calls: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_unknown_control() {
        let host = MockHost::new();
        let view = ViewAuthor::new(1, ViewOptions::no_timeout());
        let result = view.dispatch(host.interaction(1), &ControlId::new("nope")).await;
        assert!(matches!(result, Err(ViewError::UnknownControl(_))));
    }

    #[tokio::test]
    async fn test_stop_disables_controls() {
        let host = MockHost::new();
        let ctx = host.context(1);
        let view = ViewAuthor::new(1, ViewOptions::no_timeout());
        view.add_control(Control::button().label("a"));
        view.start(ctx.as_ref(), MessagePayload::text("hi")).await.unwrap();

        view.stop();
        view.wait_teardown().await.unwrap();

        let message = host.last_message().unwrap();
        assert_eq!(message.content.as_deref(), Some("hi"));
        assert!(message.components.unwrap().iter().all(|c| c.disabled));
        assert!(view.is_stopped());
    }

    #[tokio::test]
    async fn test_stop_deletes_when_configured() {
        let host = MockHost::new();
        let ctx = host.context(1);
        let view = ViewAuthor::new(1, ViewOptions::no_timeout().delete_after(true));
        view.start(ctx.as_ref(), MessagePayload::text("bye")).await.unwrap();
        let id = host.last_message_id().unwrap();

        view.stop();
        view.wait_teardown().await.unwrap();
        assert!(host.is_deleted(id));
    }

    #[tokio::test]
    async fn test_stop_hook_fires_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let view = ViewAuthor::new(1, ViewOptions::no_timeout());
        let counter = Arc::clone(&fired);
        view.replace_stop_hook(Some(Arc::new(move |cause| {
            assert_eq!(cause, StopCause::Stopped);
            counter.fetch_add(1, Ordering::SeqCst);
        })));

        view.stop();
        view.stop();
        view.wait().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cleared_message_skips_teardown() {
        let host = MockHost::new();
        let ctx = host.context(1);
        let view = ViewAuthor::new(1, ViewOptions::no_timeout());
        view.add_control(Control::button());
        view.start(ctx.as_ref(), MessagePayload::text("keep")).await.unwrap();

        view.clear_message();
        view.stop();
        view.wait_teardown().await.unwrap();

        assert_eq!(host.calls(), vec![HostCall::Send(host.last_message_id().unwrap())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timeout_stops_view() {
        let host = MockHost::new();
        let ctx = host.context(1);
        let view = ViewAuthor::new(1, ViewOptions::default().timeout(Some(Duration::from_secs(5))));
        let causes = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&causes);
        view.replace_stop_hook(Some(Arc::new(move |cause| seen.lock().push(cause))));
        view.start(ctx.as_ref(), MessagePayload::text("idle")).await.unwrap();

        view.wait().await;
        assert_eq!(*causes.lock(), vec![StopCause::Timeout]);
    }

    #[test]
    fn test_stop_without_runtime_skips_teardown() {
        let view = ViewAuthor::new(1, ViewOptions::no_timeout());
        view.stop();
        assert!(view.is_stopped());
    }

    #[test]
    fn test_attach_without_runtime_skips_watchdog() {
        let host = MockHost::new();
        let ctx = host.context(1);
        let message = tokio_test::block_on(ctx.send(MessagePayload::text("hi"))).unwrap();
        let view = ViewAuthor::new(1, ViewOptions::default());

        view.attach(message).unwrap();

        assert!(view.is_started());
        assert!(!view.is_stopped());
        assert!(view.message().is_some());
    }
}
