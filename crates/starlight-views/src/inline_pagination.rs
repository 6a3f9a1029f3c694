//! Drive a pagination view from an async loop.
//!
//! [`InlinePagination`] replaces the view's renderer with one that hands
//! every page request to the loop body and waits for it to answer:
//!
//! ```ignore
//! let mut pages = InlinePagination::new(view, ctx);
//! while let Some(item) = pages.next().await {
//!     let text = format!("page {} of {}", item.page() + 1, item.max_pages());
//!     item.format(text)?;
//! }
//! ```
//!
//! The view is started in the background on the first pull. Pulling again
//! without formatting the previous item discards it, which leaves the
//! message unchanged for that click.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use async_trait::async_trait;
use futures::Stream;
use parking_lot::Mutex;
use starlight_core::{BoxedContext, BoxedInteraction, PageContent, ViewError, ViewResult};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace};

use crate::handoff::{Handoff, handoff, settle};
use crate::pagination::{SimplePaginationView, StartOptions, WeakPagination};
use crate::render::{PageRenderer, PageRequest};
use crate::view::{StopCause, StopHook};

// =============================================================================
// Items
// =============================================================================

/// One page request waiting for content.
///
/// Dropping the item without calling [`format`](Self::format) discards the
/// request.
pub struct InlinePaginationItem<T> {
    page: usize,
    source: Arc<Vec<T>>,
    interaction: Option<BoxedInteraction>,
    resolver: Handoff<PageContent>,
}

impl<T> InlinePaginationItem<T> {
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn max_pages(&self) -> usize {
        self.source.len()
    }

    /// The data item for this page.
    pub fn data(&self) -> &T {
        &self.source[self.page]
    }

    /// The click that caused this request. `None` for the initial render.
    pub fn interaction(&self) -> Option<&BoxedInteraction> {
        self.interaction.as_ref()
    }

    /// Supplies the page content.
    pub fn format(self, content: impl Into<PageContent>) -> ViewResult<()> {
        if self.resolver.resolve(content.into()) {
            Ok(())
        } else {
            Err(ViewError::RequestClosed)
        }
    }

    /// Declines the request; the message stays as it is.
    pub fn discard(self) {}
}

impl<T> Drop for InlinePaginationItem<T> {
    fn drop(&mut self) {
        self.resolver.cancel();
    }
}

impl<T> fmt::Debug for InlinePaginationItem<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlinePaginationItem")
            .field("page", &self.page)
            .field("max_pages", &self.source.len())
            .field("pending", &self.resolver.is_pending())
            .finish()
    }
}

// =============================================================================
// Hand-off renderer
// =============================================================================

type ItemSender<T> = mpsc::UnboundedSender<Option<InlinePaginationItem<T>>>;

struct SavedHooks<T: Send + Sync + 'static> {
    renderer: Arc<dyn PageRenderer<T>>,
    stop_hook: Option<StopHook>,
}

struct Shared<T: Send + Sync + 'static> {
    view: WeakPagination<T>,
    tx: ItemSender<T>,
    /// The most recently yielded item's resolver.
    current: Mutex<Option<Handoff<PageContent>>>,
    saved: Mutex<Option<SavedHooks<T>>>,
}

impl<T: Send + Sync + 'static> Shared<T> {
    fn discard_current(&self) {
        let current = self.current.lock().take();
        if let Some(current) = current
            && current.cancel()
        {
            debug!("Discarded unformatted inline page");
        }
    }

    /// Puts the original renderer and stop hook back. Runs at most once.
    fn unplug(&self, cause: Option<StopCause>) {
        let Some(saved) = self.saved.lock().take() else {
            return;
        };
        let _ = self.tx.send(None);
        self.discard_current();

        if let Some(view) = self.view.upgrade() {
            view.replace_renderer(saved.renderer);
            view.view().replace_stop_hook(saved.stop_hook.clone());
        }
        trace!(?cause, "Inline pagination unplugged");

        if let (Some(cause), Some(previous)) = (cause, saved.stop_hook) {
            previous(cause);
        }
    }
}

struct HandoffRenderer<T: Send + Sync + 'static> {
    shared: Arc<Shared<T>>,
    fallback: Arc<dyn PageRenderer<T>>,
}

#[async_trait]
impl<T: Send + Sync + 'static> PageRenderer<T> for HandoffRenderer<T> {
    async fn format_page(&self, request: PageRequest<'_, T>) -> ViewResult<Option<PageContent>> {
        let (resolver, pending) = handoff();
        let item = InlinePaginationItem {
            page: request.page,
            source: Arc::clone(request.source()),
            interaction: request.interaction.cloned(),
            resolver,
        };

        if self.shared.tx.send(Some(item)).is_err() {
            debug!("Inline consumer is gone, using the replaced renderer");
            return self.fallback.format_page(request).await;
        }
        trace!(page = request.page, "Waiting for inline page content");
        Ok(settle(pending).await)
    }

    async fn format_view(
        &self,
        view: &SimplePaginationView<T>,
        request: PageRequest<'_, T>,
    ) -> ViewResult<()> {
        self.fallback.format_view(view, request).await
    }
}

// =============================================================================
// InlinePagination
// =============================================================================

/// A [`Stream`] of page requests from a pagination view.
pub struct InlinePagination<T: Send + Sync + 'static> {
    view: SimplePaginationView<T>,
    ctx: BoxedContext,
    rx: mpsc::UnboundedReceiver<Option<InlinePaginationItem<T>>>,
    shared: Arc<Shared<T>>,
    start: Option<JoinHandle<()>>,
    finished: bool,
}

impl<T: Send + Sync + 'static> InlinePagination<T> {
    /// Plugs into `view`. The view is started from `ctx` on the first pull.
    pub fn new(view: SimplePaginationView<T>, ctx: BoxedContext) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            view: view.downgrade(),
            tx,
            current: Mutex::new(None),
            saved: Mutex::new(None),
        });

        let mut saved = shared.saved.lock();
        let renderer = view.replace_renderer(Arc::new(HandoffRenderer {
            shared: Arc::clone(&shared),
            fallback: view.renderer(),
        }));
        let hook_shared = Arc::clone(&shared);
        let stop_hook = view.view().replace_stop_hook(Some(Arc::new(move |cause| {
            hook_shared.unplug(Some(cause));
        })));
        *saved = Some(SavedHooks {
            renderer,
            stop_hook,
        });
        drop(saved);

        debug!(owner = %view.view().owner(), "Inline pagination plugged");
        Self {
            view,
            ctx,
            rx,
            shared,
            start: None,
            finished: false,
        }
    }

    pub fn view(&self) -> &SimplePaginationView<T> {
        &self.view
    }

    pub fn is_started(&self) -> bool {
        self.start.is_some()
    }

    /// Stops the view, which also ends this stream.
    pub fn stop(&self) {
        self.view.view().stop();
    }

    /// Restores the original renderer without stopping the view.
    pub fn unplug(&self) {
        self.shared.unplug(None);
    }

    fn spawn_start(&mut self) {
        let view = self.view.clone();
        let ctx = Arc::clone(&self.ctx);
        self.start = Some(tokio::spawn(async move {
            if let Err(e) = view.start(ctx.as_ref(), StartOptions::default()).await {
                error!(error = %e, "Inline pagination failed to start");
                view.view().stop();
            }
        }));
    }
}

impl<T: Send + Sync + 'static> Stream for InlinePagination<T> {
    type Item = InlinePaginationItem<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }
        self.shared.discard_current();
        if self.start.is_none() {
            self.spawn_start();
        }

        match ready!(self.rx.poll_recv(cx)) {
            Some(Some(item)) => {
                *self.shared.current.lock() = Some(item.resolver.clone());
                Poll::Ready(Some(item))
            }
            Some(None) | None => {
                self.finished = true;
                while let Ok(Some(item)) = self.rx.try_recv() {
                    drop(item);
                }
                Poll::Ready(None)
            }
        }
    }
}

impl<T: Send + Sync + 'static> Drop for InlinePagination<T> {
    fn drop(&mut self) {
        self.shared.unplug(None);
    }
}

impl<T: Send + Sync + 'static> fmt::Debug for InlinePagination<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlinePagination")
            .field("view", &self.view)
            .field("started", &self.start.is_some())
            .field("finished", &self.finished)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::StreamExt;
    use starlight_core::mock::{HostCall, MockHost};
    use starlight_core::{CommandContext, ControlId, MessagePayload, UserId};
    use tokio_test::{assert_pending, assert_ready, task};

    use super::*;
    use crate::pagination::{NavRole, PaginationOptions};
    use crate::render::DisplayRenderer;
    use crate::view::ViewOptions;

    fn pagination(data: Vec<u32>) -> SimplePaginationView<u32> {
        SimplePaginationView::new(
            1,
            data,
            DisplayRenderer,
            PaginationOptions {
                view: ViewOptions::no_timeout(),
                ..PaginationOptions::default()
            },
        )
    }

    fn click(view: &SimplePaginationView<u32>, host: &MockHost, role: NavRole) -> JoinHandle<ViewResult<()>> {
        let id: ControlId = view.nav_control(role).unwrap().clone();
        let view = view.view().clone();
        let interaction = host.interaction(1);
        tokio::spawn(async move { view.dispatch(interaction, &id).await })
    }

    #[tokio::test]
    async fn test_inline_two_pages() {
        let host = MockHost::new();
        let view = pagination(vec![1, 2]);
        let mut pages = InlinePagination::new(view.clone(), host.context(1));

        let first = pages.next().await.unwrap();
        assert_eq!(first.page(), 0);
        assert_eq!(*first.data(), 1);
        assert!(first.interaction().is_none());
        first.format("hello").unwrap();

        tokio::task::yield_now().await;
        assert_eq!(host.last_message().unwrap().content.as_deref(), Some("hello"));

        let pending_click = click(&view, &host, NavRole::Next);
        let second = pages.next().await.unwrap();
        assert_eq!(second.page(), 1);
        assert_eq!(second.interaction().unwrap().actor(), UserId(1));

        view.view().stop();
        drop(second);
        assert!(pages.next().await.is_none());
        pending_click.await.unwrap().unwrap();

        // The second page was never formatted, so the click was only acknowledged.
        assert_eq!(host.last_message().unwrap().content.as_deref(), Some("hello"));
        assert!(host.calls().contains(&HostCall::Defer(UserId(1))));
    }

    #[tokio::test]
    async fn test_pulling_again_discards_previous() {
        let host = MockHost::new();
        let view = pagination(vec![1, 2, 3]);
        let mut pages = InlinePagination::new(view.clone(), host.context(1));

        pages.next().await.unwrap().format("first").unwrap();

        let pending_click = click(&view, &host, NavRole::Next);
        let held = pages.next().await.unwrap();
        assert_eq!(held.page(), 1);

        let mut next = task::spawn(pages.next());
        assert_pending!(next.poll());
        drop(next);

        pending_click.await.unwrap().unwrap();
        assert_eq!(view.current_page(), 1);
        assert!(matches!(held.format("late"), Err(ViewError::RequestClosed)));
        assert_eq!(host.last_message().unwrap().content.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_stop_restores_renderer() {
        let host = MockHost::new();
        let view = pagination(vec![1]);
        let original = view.renderer();
        let callbacks: Vec<_> = NavRole::ALL
            .iter()
            .map(|role| view.view().callback(view.nav_control(*role).unwrap()).unwrap())
            .collect();

        let mut pages = InlinePagination::new(view.clone(), host.context(1));
        assert!(!Arc::ptr_eq(&view.renderer(), &original));
        pages.next().await.unwrap().format("only").unwrap();

        pages.stop();
        assert!(pages.next().await.is_none());
        assert!(Arc::ptr_eq(&view.renderer(), &original));
        for (role, before) in NavRole::ALL.iter().zip(&callbacks) {
            let after = view.view().callback(view.nav_control(*role).unwrap()).unwrap();
            assert!(Arc::ptr_eq(&after, before));
        }
    }

    #[tokio::test]
    async fn test_unformatted_item_does_not_block_stop() {
        let host = MockHost::new();
        let view = pagination(vec![1, 2]);
        let mut pages = InlinePagination::new(view.clone(), host.context(1));

        let item = pages.next().await.unwrap();
        let mut start = task::spawn(view.view().wait());
        assert_pending!(start.poll());

        pages.stop();
        assert_ready!(start.poll());
        assert!(pages.next().await.is_none());
        assert!(matches!(item.format("late"), Err(ViewError::RequestClosed)));

        tokio::time::timeout(Duration::from_secs(1), view.view().wait_teardown())
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_dropped_adapter_falls_back() {
        let host = MockHost::new();
        let view = pagination(vec![1, 2]);
        let ctx = host.context(1);
        {
            let mut pages = InlinePagination::new(view.clone(), ctx.clone());
            pages.next().await.unwrap().format("inline").unwrap();
        }
        tokio::task::yield_now().await;
        assert_eq!(host.last_message().unwrap().content.as_deref(), Some("inline"));

        view.to_next(&(host.interaction(1) as BoxedInteraction)).await.unwrap();
        assert_eq!(host.last_message().unwrap().content.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_failed_start_ends_stream() {
        let host = MockHost::new();
        let view = pagination(vec![1]);
        let ctx = host.context(1);
        let taken = ctx.send(MessagePayload::text("taken")).await.unwrap();
        view.view().attach(taken).unwrap();

        let mut pages = InlinePagination::new(view.clone(), ctx);
        let item = pages.next().await.unwrap();
        item.format("ignored").unwrap();

        assert!(pages.next().await.is_none());
        assert!(view.view().is_stopped());
    }
}
