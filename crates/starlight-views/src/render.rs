//! Page render strategies for [`SimplePaginationView`].

use std::fmt::{self, Display};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use starlight_core::{BoxedInteraction, PageContent, ViewResult};

use crate::pagination::SimplePaginationView;

/// One page render request.
pub struct PageRequest<'a, T> {
    /// Index of the page being rendered.
    pub page: usize,
    /// The interaction that caused the render, if any.
    pub interaction: Option<&'a BoxedInteraction>,
    source: &'a Arc<Vec<T>>,
}

impl<'a, T> PageRequest<'a, T> {
    pub(crate) fn new(
        page: usize,
        interaction: Option<&'a BoxedInteraction>,
        source: &'a Arc<Vec<T>>,
    ) -> Self {
        Self {
            page,
            interaction,
            source,
        }
    }

    /// The data item for this page.
    pub fn data(&self) -> &'a T {
        &self.source[self.page]
    }

    pub fn max_pages(&self) -> usize {
        self.source.len()
    }

    /// The whole data source the page was taken from.
    pub fn source(&self) -> &'a Arc<Vec<T>> {
        self.source
    }
}

impl<T> Clone for PageRequest<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PageRequest<'_, T> {}

impl<T> fmt::Debug for PageRequest<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageRequest")
            .field("page", &self.page)
            .field("max_pages", &self.source.len())
            .field("has_interaction", &self.interaction.is_some())
            .finish()
    }
}

/// Turns one data item into page content.
///
/// `format_page` returning `Ok(None)` declines the render: the message is
/// left as it is and the interaction is only acknowledged.
#[async_trait]
pub trait PageRenderer<T: Send + Sync + 'static>: Send + Sync {
    async fn format_page(&self, request: PageRequest<'_, T>) -> ViewResult<Option<PageContent>>;

    /// Adjusts the view's controls before the page is sent.
    ///
    /// Runs on every render, cache hits included.
    async fn format_view(
        &self,
        view: &SimplePaginationView<T>,
        request: PageRequest<'_, T>,
    ) -> ViewResult<()> {
        let _ = (view, request);
        Ok(())
    }
}

/// Renders each item with its [`Display`] implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayRenderer;

#[async_trait]
impl<T> PageRenderer<T> for DisplayRenderer
where
    T: Display + Send + Sync + 'static,
{
    async fn format_page(&self, request: PageRequest<'_, T>) -> ViewResult<Option<PageContent>> {
        Ok(Some(PageContent::Text(request.data().to_string())))
    }
}

/// Renders pages with a synchronous closure.
pub struct FnRenderer<T, F> {
    f: F,
    _marker: PhantomData<fn(&T)>,
}

/// Builds a renderer from a closure.
///
/// ```ignore
/// let renderer = render_fn(|request: PageRequest<'_, Vec<u32>>| {
///     Ok(format!("{:?}", request.data()).into())
/// });
/// ```
pub fn render_fn<T, F>(f: F) -> FnRenderer<T, F>
where
    T: Send + Sync + 'static,
    F: Fn(PageRequest<'_, T>) -> ViewResult<PageContent> + Send + Sync,
{
    FnRenderer {
        f,
        _marker: PhantomData,
    }
}

#[async_trait]
impl<T, F> PageRenderer<T> for FnRenderer<T, F>
where
    T: Send + Sync + 'static,
    F: Fn(PageRequest<'_, T>) -> ViewResult<PageContent> + Send + Sync,
{
    async fn format_page(&self, request: PageRequest<'_, T>) -> ViewResult<Option<PageContent>> {
        (self.f)(request).map(Some)
    }
}

/// Renders pages with an async closure.
///
/// The returned future must own what it uses, so clone out of the request
/// before the `async move` block.
pub struct AsyncFnRenderer<T, F> {
    f: F,
    _marker: PhantomData<fn(&T)>,
}

pub fn render_async<T, F, Fut>(f: F) -> AsyncFnRenderer<T, F>
where
    T: Send + Sync + 'static,
    F: Fn(PageRequest<'_, T>) -> Fut + Send + Sync,
    Fut: Future<Output = ViewResult<Option<PageContent>>> + Send + 'static,
{
    AsyncFnRenderer {
        f,
        _marker: PhantomData,
    }
}

#[async_trait]
impl<T, F, Fut> PageRenderer<T> for AsyncFnRenderer<T, F>
where
    T: Send + Sync + 'static,
    F: Fn(PageRequest<'_, T>) -> Fut + Send + Sync,
    Fut: Future<Output = ViewResult<Option<PageContent>>> + Send + 'static,
{
    async fn format_page(&self, request: PageRequest<'_, T>) -> ViewResult<Option<PageContent>> {
        (self.f)(request).await
    }
}

#[cfg(test)]
mod tests {
    use starlight_core::ViewError;

    use super::*;

    #[tokio::test]
    async fn test_display_renderer() {
        let source = Arc::new(vec![10, 20]);
        let content = DisplayRenderer
            .format_page(PageRequest::new(1, None, &source))
            .await
            .unwrap();
        assert_eq!(content, Some(PageContent::Text("20".into())));
    }

    #[tokio::test]
    async fn test_fn_renderer_propagates_errors() {
        let renderer = render_fn(|request: PageRequest<'_, u32>| {
            if *request.data() == 0 {
                Err(ViewError::render("zero"))
            } else {
                Ok(format!("#{}", request.data()).into())
            }
        });
        let source = Arc::new(vec![0, 7]);

        let ok = renderer.format_page(PageRequest::new(1, None, &source)).await;
        assert_eq!(ok.unwrap(), Some(PageContent::Text("#7".into())));

        let err = renderer.format_page(PageRequest::new(0, None, &source)).await;
        assert!(matches!(err, Err(ViewError::Render(_))));
    }

    #[tokio::test]
    async fn test_async_renderer() {
        let renderer = render_async(|request: PageRequest<'_, String>| {
            let text = request.data().to_uppercase();
            async move { Ok(Some(PageContent::Text(text))) }
        });
        let source = Arc::new(vec!["abc".to_string()]);
        let content = renderer.format_page(PageRequest::new(0, None, &source)).await;
        assert_eq!(content.unwrap(), Some(PageContent::Text("ABC".into())));
    }
}
