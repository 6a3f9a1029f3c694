//! # Starlight Views
//!
//! Interactive surfaces for chat bots.
//!
//! - [`ViewAuthor`]: controls bound to one message, usable only by the
//!   user who invoked the command
//! - [`SimplePaginationView`]: one data item per page with navigation buttons
//!   and a pluggable [`PageRenderer`]
//! - [`InlineView`]: consume a view's clicks as a [`Stream`](futures::Stream)
//! - [`InlinePagination`]: render pages from the body of an async loop
//! - [`TextPaginator`]: split long text into message-sized pages
//!
//! ## Inline pagination
//!
//! ```ignore
//! use futures::StreamExt;
//! use starlight_views::prelude::*;
//!
//! let view = SimplePaginationView::for_context(
//!     ctx.as_ref(),
//!     vec![1, 2, 3],
//!     DisplayRenderer,
//!     PaginationOptions::default(),
//! );
//! let mut pages = InlinePagination::new(view, ctx);
//! while let Some(item) = pages.next().await {
//!     let squared = item.data() * item.data();
//!     item.format(format!("{squared}"))?;
//! }
//! ```

mod handoff;
pub mod inline_pagination;
pub mod inline_view;
pub mod pagination;
pub mod paginator;
pub mod render;
pub mod view;

pub use inline_pagination::{InlinePagination, InlinePaginationItem};
pub use inline_view::{InlineEvent, InlineView};
pub use pagination::{
    NavButton, NavRole, NavigationButtons, PaginationOptions, SimplePaginationView, StartOptions,
    WeakPagination,
};
pub use paginator::TextPaginator;
pub use render::{
    AsyncFnRenderer, DisplayRenderer, FnRenderer, PageRenderer, PageRequest, render_async,
    render_fn,
};
pub use view::{StopCause, StopHook, ViewAuthor, ViewOptions, WeakView};

/// Prelude for common imports.
pub mod prelude {
    pub use super::inline_pagination::{InlinePagination, InlinePaginationItem};
    pub use super::inline_view::InlineView;
    pub use super::pagination::{NavRole, PaginationOptions, SimplePaginationView, StartOptions};
    pub use super::render::{DisplayRenderer, PageRenderer, PageRequest, render_fn};
    pub use super::view::{ViewAuthor, ViewOptions};
}
