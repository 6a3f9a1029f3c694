//! Button-driven pagination over an owned data source.
//!
//! [`SimplePaginationView`] shows one item of its data source per page and
//! installs up to five navigation buttons on its [`ViewAuthor`]. Every
//! transition goes through [`SimplePaginationView::change_page`], which rolls
//! the page pointer back if rendering or committing the page fails.
//!
//! # Example
//!
//! ```ignore
//! let view = SimplePaginationView::new(
//!     ctx.author(),
//!     vec!["one", "two", "three"],
//!     DisplayRenderer,
//!     PaginationOptions::default(),
//! );
//! view.start(ctx.as_ref(), StartOptions::default()).await?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use starlight_core::{
    BoxedArtifact, BoxedInteraction, ButtonStyle, CommandContext, Control, ControlCallback,
    ControlId, MessagePayload, PageContent, UserId, ViewError, ViewResult, callback,
};
use tracing::{debug, trace, warn};

use crate::paginator::TextPaginator;
use crate::render::{DisplayRenderer, PageRenderer, PageRequest};
use crate::view::{ViewAuthor, ViewOptions};

// =============================================================================
// Navigation buttons
// =============================================================================

/// The five navigation roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavRole {
    Start,
    Previous,
    Stop,
    Next,
    End,
}

impl NavRole {
    pub const ALL: [NavRole; 5] = [
        NavRole::Start,
        NavRole::Previous,
        NavRole::Stop,
        NavRole::Next,
        NavRole::End,
    ];
}

/// Appearance of one navigation button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavButton {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default)]
    pub style: ButtonStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<u8>,
}

impl NavButton {
    pub fn emoji(emoji: impl Into<String>) -> Self {
        Self {
            label: None,
            emoji: Some(emoji.into()),
            style: ButtonStyle::default(),
            row: None,
        }
    }

    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            emoji: None,
            style: ButtonStyle::default(),
            row: None,
        }
    }

    fn to_control(&self) -> Control {
        let mut control = Control::button().style(self.style);
        if let Some(label) = &self.label {
            control = control.label(label.clone());
        }
        if let Some(emoji) = &self.emoji {
            control = control.emoji(emoji.clone());
        }
        if let Some(row) = self.row {
            control = control.on_row(row);
        }
        control
    }
}

/// Which navigation buttons a pagination view installs. `None` omits the role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationButtons {
    pub start: Option<NavButton>,
    pub previous: Option<NavButton>,
    pub stop: Option<NavButton>,
    pub next: Option<NavButton>,
    pub end: Option<NavButton>,
}

impl Default for NavigationButtons {
    fn default() -> Self {
        Self {
            start: Some(NavButton::emoji("⏪")),
            previous: Some(NavButton::emoji("◀️")),
            stop: Some(NavButton::emoji("⏹️")),
            next: Some(NavButton::emoji("▶️")),
            end: Some(NavButton::emoji("⏩")),
        }
    }
}

impl NavigationButtons {
    /// No navigation buttons at all.
    pub fn none() -> Self {
        Self {
            start: None,
            previous: None,
            stop: None,
            next: None,
            end: None,
        }
    }

    /// Only the previous and next arrows.
    pub fn arrows() -> Self {
        Self {
            previous: Some(NavButton::emoji("◀️")),
            next: Some(NavButton::emoji("▶️")),
            ..Self::none()
        }
    }

    pub fn get(&self, role: NavRole) -> Option<&NavButton> {
        match role {
            NavRole::Start => self.start.as_ref(),
            NavRole::Previous => self.previous.as_ref(),
            NavRole::Stop => self.stop.as_ref(),
            NavRole::Next => self.next.as_ref(),
            NavRole::End => self.end.as_ref(),
        }
    }

    /// Removes one role (builder pattern).
    pub fn without(mut self, role: NavRole) -> Self {
        let slot = match role {
            NavRole::Start => &mut self.start,
            NavRole::Previous => &mut self.previous,
            NavRole::Stop => &mut self.stop,
            NavRole::Next => &mut self.next,
            NavRole::End => &mut self.end,
        };
        *slot = None;
        self
    }
}

// =============================================================================
// Options
// =============================================================================

/// Construction options for a [`SimplePaginationView`].
#[derive(Debug, Clone, Default)]
pub struct PaginationOptions {
    pub view: ViewOptions,
    /// Reuse rendered payloads instead of calling the renderer again.
    pub cache_page: bool,
    pub buttons: NavigationButtons,
}

/// Options for [`SimplePaginationView::start`].
#[derive(Default)]
pub struct StartOptions {
    /// Wait until the view stops before returning.
    pub wait: bool,
    /// Edit this message instead of sending a new one.
    pub message: Option<BoxedArtifact>,
}

// =============================================================================
// SimplePaginationView
// =============================================================================

struct PageState<T> {
    data: Arc<Vec<T>>,
    current_page: usize,
    cache: HashMap<usize, MessagePayload>,
}

struct PaginationInner<T: Send + Sync + 'static> {
    view: ViewAuthor,
    cache_page: bool,
    pages: Mutex<PageState<T>>,
    renderer: Mutex<Arc<dyn PageRenderer<T>>>,
    nav: HashMap<NavRole, ControlId>,
}

/// A paginated surface over `Vec<T>`.
pub struct SimplePaginationView<T: Send + Sync + 'static> {
    inner: Arc<PaginationInner<T>>,
}

impl<T: Send + Sync + 'static> Clone for SimplePaginationView<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// A non-owning reference to a [`SimplePaginationView`].
pub struct WeakPagination<T: Send + Sync + 'static> {
    inner: Weak<PaginationInner<T>>,
}

impl<T: Send + Sync + 'static> Clone for WeakPagination<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T: Send + Sync + 'static> WeakPagination<T> {
    pub fn upgrade(&self) -> Option<SimplePaginationView<T>> {
        self.inner.upgrade().map(|inner| SimplePaginationView { inner })
    }
}

fn nav_callback<T: Send + Sync + 'static>(view: WeakPagination<T>, role: NavRole) -> ControlCallback {
    callback(move |interaction, _| {
        let view = view.clone();
        async move {
            match view.upgrade() {
                Some(view) => view.navigate(role, &interaction).await,
                None => Ok(()),
            }
        }
    })
}

impl<T: Send + Sync + 'static> SimplePaginationView<T> {
    /// Creates a pagination view owned by `owner`.
    pub fn new<R>(
        owner: impl Into<UserId>,
        data: impl IntoIterator<Item = T>,
        renderer: R,
        options: PaginationOptions,
    ) -> Self
    where
        R: PageRenderer<T> + 'static,
    {
        Self::with_renderer(owner, data, Arc::new(renderer), options)
    }

    /// Creates a pagination view owned by the author of an invocation.
    pub fn for_context<R>(
        ctx: &dyn CommandContext,
        data: impl IntoIterator<Item = T>,
        renderer: R,
        options: PaginationOptions,
    ) -> Self
    where
        R: PageRenderer<T> + 'static,
    {
        Self::new(ctx.author(), data, renderer, options)
    }

    /// Creates a pagination view from a shared renderer.
    pub fn with_renderer(
        owner: impl Into<UserId>,
        data: impl IntoIterator<Item = T>,
        renderer: Arc<dyn PageRenderer<T>>,
        options: PaginationOptions,
    ) -> Self {
        let view = ViewAuthor::new(owner, options.view.clone());
        let data = Arc::new(data.into_iter().collect::<Vec<_>>());

        let inner = Arc::new_cyclic(|weak: &Weak<PaginationInner<T>>| {
            let mut nav = HashMap::new();
            for role in NavRole::ALL {
                if let Some(button) = options.buttons.get(role) {
                    let handle = WeakPagination {
                        inner: Weak::clone(weak),
                    };
                    let control = button.to_control().on_click(nav_callback(handle, role));
                    nav.insert(role, view.add_control(control));
                }
            }
            PaginationInner {
                view,
                cache_page: options.cache_page,
                pages: Mutex::new(PageState {
                    data,
                    current_page: 0,
                    cache: HashMap::new(),
                }),
                renderer: Mutex::new(renderer),
                nav,
            }
        });

        let this = Self { inner };
        this.refresh_buttons();
        this
    }

    pub fn downgrade(&self) -> WeakPagination<T> {
        WeakPagination {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// The underlying owned surface.
    pub fn view(&self) -> &ViewAuthor {
        &self.inner.view
    }

    pub fn current_page(&self) -> usize {
        self.inner.pages.lock().current_page
    }

    pub fn max_pages(&self) -> usize {
        self.inner.pages.lock().data.len()
    }

    pub fn data_source(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.inner.pages.lock().data)
    }

    pub fn cache_page(&self) -> bool {
        self.inner.cache_page
    }

    /// The control id installed for a navigation role.
    pub fn nav_control(&self, role: NavRole) -> Option<&ControlId> {
        self.inner.nav.get(&role)
    }

    pub fn renderer(&self) -> Arc<dyn PageRenderer<T>> {
        self.inner.renderer.lock().clone()
    }

    /// Swaps the render strategy and returns the previous one.
    pub fn replace_renderer(&self, renderer: Arc<dyn PageRenderer<T>>) -> Arc<dyn PageRenderer<T>> {
        std::mem::replace(&mut *self.inner.renderer.lock(), renderer)
    }

    fn refresh_buttons(&self) {
        let (current, max_pages) = {
            let pages = self.inner.pages.lock();
            (pages.current_page, pages.data.len())
        };
        for (role, id) in &self.inner.nav {
            let disabled = match role {
                NavRole::Start | NavRole::Previous => current == 0,
                NavRole::Next | NavRole::End => current + 1 >= max_pages,
                NavRole::Stop => continue,
            };
            self.inner.view.update_control(id, |control| control.disabled = disabled);
        }
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Moves to `page` and renders it.
    ///
    /// Returns `None` when there is nothing to send: the data source is
    /// empty or the renderer declined.
    pub async fn show_page(
        &self,
        interaction: Option<&BoxedInteraction>,
        page: usize,
    ) -> ViewResult<Option<MessagePayload>> {
        let data = {
            let mut pages = self.inner.pages.lock();
            let max_pages = pages.data.len();
            if max_pages == 0 && page == 0 {
                pages.current_page = 0;
                None
            } else if page >= max_pages {
                return Err(ViewError::PageOutOfRange { page, max_pages });
            } else {
                pages.current_page = page;
                Some(Arc::clone(&pages.data))
            }
        };
        self.refresh_buttons();

        let Some(data) = data else {
            trace!("Data source is empty, nothing to render");
            return Ok(None);
        };
        self.message_payload(PageRequest::new(page, interaction, &data))
            .await
    }

    async fn message_payload(&self, request: PageRequest<'_, T>) -> ViewResult<Option<MessagePayload>> {
        let payload = self.resolve_page(request).await?;
        self.renderer().format_view(self, request).await?;
        Ok(payload.map(|payload| payload.with_components(self.inner.view.components())))
    }

    async fn resolve_page(&self, request: PageRequest<'_, T>) -> ViewResult<Option<MessagePayload>> {
        let cached = if self.inner.cache_page {
            self.inner.pages.lock().cache.get(&request.page).cloned()
        } else {
            None
        };
        if let Some(payload) = cached {
            trace!(page = request.page, "Using cached page");
            return Ok(Some(payload));
        }

        let content = self.renderer().format_page(request).await?;
        let payload = content.map(PageContent::into_payload);
        if self.inner.cache_page
            && let Some(payload) = &payload
        {
            self.inner
                .pages
                .lock()
                .cache
                .insert(request.page, payload.clone());
        }
        Ok(payload)
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Moves to `page` in response to `interaction`.
    ///
    /// On any failure the page pointer is restored and the error returned.
    pub async fn change_page(&self, interaction: &BoxedInteraction, page: usize) -> ViewResult<()> {
        let previous = self.current_page();
        match self.commit_page(interaction, page).await {
            Ok(()) => {
                debug!(from = previous, to = page, "Changed page");
                Ok(())
            }
            Err(error) => {
                {
                    let mut pages = self.inner.pages.lock();
                    pages.current_page = previous.min(pages.data.len().saturating_sub(1));
                }
                self.refresh_buttons();
                warn!(page, previous, error = %error, "Page change failed, rolled back");
                Err(error)
            }
        }
    }

    async fn commit_page(&self, interaction: &BoxedInteraction, page: usize) -> ViewResult<()> {
        let Some(payload) = self.show_page(Some(interaction), page).await? else {
            if !interaction.is_done() {
                interaction.defer().await?;
            }
            return Ok(());
        };

        if interaction.is_done() {
            let message = self.inner.view.message().ok_or(ViewError::NotStarted)?;
            message.edit(payload).await?;
        } else {
            interaction.edit_message(payload).await?;
        }
        Ok(())
    }

    /// Runs the transition bound to a navigation role.
    pub async fn navigate(&self, role: NavRole, interaction: &BoxedInteraction) -> ViewResult<()> {
        match role {
            NavRole::Start => self.to_start(interaction).await,
            NavRole::Previous => self.to_previous(interaction).await,
            NavRole::Stop => self.to_stop(interaction).await,
            NavRole::Next => self.to_next(interaction).await,
            NavRole::End => self.to_end(interaction).await,
        }
    }

    pub async fn to_start(&self, interaction: &BoxedInteraction) -> ViewResult<()> {
        self.change_page(interaction, 0).await
    }

    pub async fn to_previous(&self, interaction: &BoxedInteraction) -> ViewResult<()> {
        let target = self.current_page().saturating_sub(1);
        self.change_page(interaction, target).await
    }

    pub async fn to_next(&self, interaction: &BoxedInteraction) -> ViewResult<()> {
        let target = {
            let pages = self.inner.pages.lock();
            (pages.current_page + 1).min(pages.data.len().saturating_sub(1))
        };
        self.change_page(interaction, target).await
    }

    pub async fn to_end(&self, interaction: &BoxedInteraction) -> ViewResult<()> {
        let target = self.max_pages().saturating_sub(1);
        self.change_page(interaction, target).await
    }

    /// Acknowledges the interaction and stops the view.
    pub async fn to_stop(&self, interaction: &BoxedInteraction) -> ViewResult<()> {
        if !interaction.is_done() {
            interaction.defer().await?;
        }
        self.inner.view.stop();
        Ok(())
    }

    /// Replaces the data source and shows `page` of the new data.
    ///
    /// On any failure the previous data, page and cache are restored and
    /// the error returned.
    pub async fn change_source(
        &self,
        data: impl IntoIterator<Item = T>,
        interaction: Option<&BoxedInteraction>,
        page: usize,
    ) -> ViewResult<()> {
        let data = Arc::new(data.into_iter().collect());
        let previous = {
            let mut pages = self.inner.pages.lock();
            (
                std::mem::replace(&mut pages.data, data),
                std::mem::replace(&mut pages.current_page, 0),
                std::mem::take(&mut pages.cache),
            )
        };
        debug!(max_pages = self.max_pages(), page, "Data source replaced");

        match self.commit_source(interaction, page).await {
            Ok(()) => Ok(()),
            Err(error) => {
                let (data, current_page, cache) = previous;
                {
                    let mut pages = self.inner.pages.lock();
                    pages.data = data;
                    pages.current_page = current_page;
                    pages.cache = cache;
                }
                self.refresh_buttons();
                warn!(page, error = %error, "Data source change failed, rolled back");
                Err(error)
            }
        }
    }

    async fn commit_source(&self, interaction: Option<&BoxedInteraction>, page: usize) -> ViewResult<()> {
        let Some(payload) = self.show_page(interaction, page).await? else {
            if let Some(interaction) = interaction
                && !interaction.is_done()
            {
                interaction.defer().await?;
            }
            return Ok(());
        };

        match interaction {
            Some(interaction) if !interaction.is_done() => {
                interaction.edit_message(payload).await?;
            }
            _ => {
                let message = self.inner.view.message().ok_or(ViewError::NotStarted)?;
                message.edit(payload).await?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Renders the current page and sends it.
    pub async fn start(&self, ctx: &dyn CommandContext, options: StartOptions) -> ViewResult<()> {
        let interaction = ctx.interaction();
        let payload = self
            .show_page(interaction.as_ref(), self.current_page())
            .await?
            .unwrap_or_else(|| MessagePayload::components_only(self.inner.view.components()));

        match options.message {
            Some(message) => {
                message.edit(payload).await?;
                self.inner.view.attach(message)?;
            }
            None => self.inner.view.start(ctx, payload).await?,
        }

        if options.wait {
            self.inner.view.wait().await;
        }
        Ok(())
    }
}

impl SimplePaginationView<String> {
    /// Builds a view whose pages are the closed pages of a [`TextPaginator`].
    pub fn from_paginator(
        owner: impl Into<UserId>,
        paginator: TextPaginator,
        options: PaginationOptions,
    ) -> Self {
        Self::new(owner, paginator.into_pages(), DisplayRenderer, options)
    }
}

impl<T: Send + Sync + 'static> fmt::Debug for SimplePaginationView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pages = self.inner.pages.lock();
        f.debug_struct("SimplePaginationView")
            .field("current_page", &pages.current_page)
            .field("max_pages", &pages.data.len())
            .field("cache_page", &self.inner.cache_page)
            .field("view", &self.inner.view)
            .finish()
    }
}
