//! Turns a view's button clicks into an async stream.
//!
//! [`InlineView::plug`] swaps the callback of one control (or of every
//! control) for a thunk that first runs the original callback and then
//! queues the click. The stream ends when the view stops or times out, at
//! which point the original callbacks and stop hook are put back.
//!
//! ```ignore
//! let mut clicks = InlineView::plug(&view, None)?;
//! while let Some((interaction, control)) = clicks.next().await {
//!     // react to the click
//! }
//! ```

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use futures::Stream;
use parking_lot::Mutex;
use starlight_core::{BoxedInteraction, ControlCallback, ControlId, ViewError, ViewResult, callback};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::view::{StopCause, StopHook, ViewAuthor, WeakView};

/// One intercepted click.
pub type InlineEvent = (BoxedInteraction, ControlId);

struct Saved {
    callbacks: Vec<(ControlId, Option<ControlCallback>)>,
    stop_hook: Option<StopHook>,
}

struct Plug {
    view: WeakView,
    saved: Mutex<Option<Saved>>,
    tx: mpsc::UnboundedSender<Option<InlineEvent>>,
}

impl Plug {
    /// Restores everything that was swapped. Runs at most once.
    fn unplug(&self, cause: Option<StopCause>) {
        let Some(saved) = self.saved.lock().take() else {
            return;
        };
        let _ = self.tx.send(None);

        if let Some(view) = self.view.upgrade() {
            for (id, callback) in saved.callbacks {
                if view.replace_callback(&id, callback).is_err() {
                    debug!(control = %id, "Control was removed while plugged");
                }
            }
            view.replace_stop_hook(saved.stop_hook.clone());
        }
        trace!(?cause, "Inline view unplugged");

        if let (Some(cause), Some(previous)) = (cause, saved.stop_hook) {
            previous(cause);
        }
    }
}

fn intercept(previous: Option<ControlCallback>, tx: mpsc::UnboundedSender<Option<InlineEvent>>) -> ControlCallback {
    callback(move |interaction, id| {
        let previous = previous.clone();
        let tx = tx.clone();
        async move {
            if let Some(previous) = previous {
                previous(Arc::clone(&interaction), id.clone()).await?;
            }
            let _ = tx.send(Some((interaction, id)));
            Ok(())
        }
    })
}

/// A stream of clicks on a plugged view.
pub struct InlineView {
    view: ViewAuthor,
    rx: mpsc::UnboundedReceiver<Option<InlineEvent>>,
    plug: Arc<Plug>,
    finished: bool,
}

impl InlineView {
    /// Intercepts `target`, or every control of the view when `None`.
    pub fn plug(view: &ViewAuthor, target: Option<&ControlId>) -> ViewResult<Self> {
        let ids = match target {
            Some(id) if view.has_control(id) => vec![id.clone()],
            Some(id) => return Err(ViewError::UnknownControl(id.clone())),
            None => view.control_ids(),
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let plug = Arc::new(Plug {
            view: view.downgrade(),
            saved: Mutex::new(None),
            tx: tx.clone(),
        });

        let mut saved = plug.saved.lock();
        let mut callbacks = Vec::with_capacity(ids.len());
        for id in ids {
            let previous = view.replace_callback(&id, None)?;
            view.replace_callback(&id, Some(intercept(previous.clone(), tx.clone())))?;
            callbacks.push((id, previous));
        }
        let hook_plug = Arc::clone(&plug);
        let stop_hook = view.replace_stop_hook(Some(Arc::new(move |cause| {
            hook_plug.unplug(Some(cause));
        })));
        *saved = Some(Saved {
            callbacks,
            stop_hook,
        });
        drop(saved);

        debug!(owner = %view.owner(), "Inline view plugged");
        Ok(Self {
            view: view.clone(),
            rx,
            plug,
            finished: false,
        })
    }

    pub fn view(&self) -> &ViewAuthor {
        &self.view
    }

    /// Stops the underlying view, which also ends this stream.
    pub fn stop(&self) {
        self.view.stop();
    }

    /// Restores the original callbacks without stopping the view.
    pub fn unplug(&self) {
        self.plug.unplug(None);
    }
}

impl Stream for InlineView {
    type Item = InlineEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }
        match ready!(self.rx.poll_recv(cx)) {
            Some(Some(event)) => Poll::Ready(Some(event)),
            Some(None) | None => {
                self.finished = true;
                Poll::Ready(None)
            }
        }
    }
}

impl Drop for InlineView {
    fn drop(&mut self) {
        self.plug.unplug(None);
    }
}

impl fmt::Debug for InlineView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlineView")
            .field("view", &self.view)
            .field("finished", &self.finished)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::StreamExt;
    use starlight_core::Control;
    use starlight_core::mock::MockHost;

    use super::*;
    use crate::view::ViewOptions;

    fn counting(counter: &Arc<AtomicUsize>) -> ControlCallback {
        let counter = Arc::clone(counter);
        callback(move |_, _| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
    }

    #[tokio::test]
    async fn test_clicks_are_streamed_in_order() {
        let host = MockHost::new();
        let view = ViewAuthor::new(1, ViewOptions::no_timeout());
        let a = view.add_control(Control::button().label("a"));
        let b = view.add_control(Control::button().label("b"));
        let mut clicks = InlineView::plug(&view, None).unwrap();

        view.dispatch(host.interaction(1), &b).await.unwrap();
        view.dispatch(host.interaction(1), &a).await.unwrap();

        assert_eq!(clicks.next().await.unwrap().1, b);
        assert_eq!(clicks.next().await.unwrap().1, a);
    }

    #[tokio::test]
    async fn test_original_callback_runs_first() {
        let host = MockHost::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let view = ViewAuthor::new(1, ViewOptions::no_timeout());
        let id = view.add_control(Control::button().on_click(counting(&counter)));
        let mut clicks = InlineView::plug(&view, Some(&id)).unwrap();

        view.dispatch(host.interaction(1), &id).await.unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(clicks.next().await.is_some());
    }

    #[tokio::test]
    async fn test_stop_restores_callbacks() {
        let counter = Arc::new(AtomicUsize::new(0));
        let original = counting(&counter);
        let view = ViewAuthor::new(1, ViewOptions::no_timeout());
        let id = view.add_control(Control::button().on_click(original.clone()));
        let untouched = view.add_control(Control::button());
        let mut clicks = InlineView::plug(&view, Some(&id)).unwrap();
        assert!(!Arc::ptr_eq(&view.callback(&id).unwrap(), &original));
        assert!(view.callback(&untouched).is_none());

        view.stop();

        assert!(clicks.next().await.is_none());
        assert!(Arc::ptr_eq(&view.callback(&id).unwrap(), &original));
        assert!(view.replace_stop_hook(None).is_none());
    }

    #[tokio::test]
    async fn test_stop_cause_forwarded_to_previous_hook() {
        let view = ViewAuthor::new(1, ViewOptions::no_timeout());
        view.add_control(Control::button());
        let causes = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&causes);
        let previous: StopHook = Arc::new(move |cause| seen.lock().push(cause));
        view.replace_stop_hook(Some(previous.clone()));

        let mut clicks = InlineView::plug(&view, None).unwrap();
        clicks.stop();

        assert!(clicks.next().await.is_none());
        assert_eq!(*causes.lock(), vec![StopCause::Stopped]);
        assert!(Arc::ptr_eq(&view.replace_stop_hook(None).unwrap(), &previous));
    }

    #[tokio::test]
    async fn test_drop_unplugs() {
        let view = ViewAuthor::new(1, ViewOptions::no_timeout());
        let id = view.add_control(Control::button());

        drop(InlineView::plug(&view, None).unwrap());

        assert!(view.callback(&id).is_none());
        assert!(view.replace_stop_hook(None).is_none());
    }

    #[test]
    fn test_plug_unknown_control() {
        let view = ViewAuthor::new(1, ViewOptions::no_timeout());
        let result = InlineView::plug(&view, Some(&ControlId::new("missing")));
        assert!(matches!(result, Err(ViewError::UnknownControl(_))));
    }
}
