//! Paginated help menu.
//!
//! A [`HelpBook`] holds the visible commands grouped in categories. The menu
//! opens on an index of categories; a select switches to the pages of one
//! category and a home button goes back.
//!
//! A single command, a command group or an error is shown on its own
//! message instead; see [`send_command_help`], [`send_group_help`] and
//! [`send_error_message`].
//!
//! ```ignore
//! let book = HelpBook::new(categories, HelpOptions::default());
//! let menu = help_menu(ctx.author(), book, PaginationOptions {
//!     buttons: NavigationButtons::arrows(),
//!     ..PaginationOptions::default()
//! });
//! menu.start(ctx.as_ref(), StartOptions::default()).await?;
//! ```

mod detail;
mod model;
mod render;

pub use detail::{
    command_embed, error_embed, group_embed, send_command_help, send_error_message,
    send_group_help,
};
pub use model::{Category, CommandInfo, HelpBook, HelpOptions, HelpPage};
pub use render::HelpRenderer;

use std::sync::Arc;

use starlight_core::UserId;
use starlight_views::{PaginationOptions, SimplePaginationView};

/// Builds a help menu owned by `owner`, opened on the first index page.
pub fn help_menu(
    owner: impl Into<UserId>,
    book: HelpBook,
    options: PaginationOptions,
) -> SimplePaginationView<HelpPage> {
    let book = Arc::new(book);
    let pages = book.index_pages();
    SimplePaginationView::new(owner, pages, HelpRenderer::new(book), options)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use starlight_core::mock::MockHost;
    use starlight_core::{BoxedInteraction, ComponentKind, Interaction, MessagePayload};
    use starlight_views::{NavigationButtons, StartOptions, ViewOptions};

    use super::*;
    use crate::signature::CommandParameter;

    const OWNER: u64 = 7;

    fn book() -> HelpBook {
        HelpBook::new(
            [
                Category::new("Music")
                    .description("Play songs in a voice channel")
                    .command(
                        CommandInfo::new("play")
                            .brief("Queue a song")
                            .parameter(CommandParameter::new("query")),
                    )
                    .command(CommandInfo::new("skip"))
                    .command(CommandInfo::new("stop")),
                Category::new("Admin").command(CommandInfo::new("ban").brief("Ban a member")),
            ],
            HelpOptions {
                per_page: 2,
                ..HelpOptions::default()
            },
        )
    }

    fn options() -> PaginationOptions {
        PaginationOptions {
            view: ViewOptions::no_timeout(),
            buttons: NavigationButtons::arrows(),
            ..PaginationOptions::default()
        }
    }

    fn select_options(payload: &MessagePayload) -> Vec<(String, String)> {
        payload
            .components
            .iter()
            .flatten()
            .find_map(|component| match &component.kind {
                ComponentKind::Select { options, .. } => Some(
                    options
                        .iter()
                        .map(|option| (option.label.clone(), option.value.clone()))
                        .collect(),
                ),
                _ => None,
            })
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_index_page_lists_categories() {
        let host = MockHost::new();
        let ctx = host.context(OWNER);
        let menu = help_menu(OWNER, book(), options());
        menu.start(ctx.as_ref(), StartOptions::default()).await.unwrap();

        let payload = host.last_message().unwrap();
        let embed = payload.embed.clone().unwrap();
        assert_eq!(embed.title.as_deref(), Some("Help Command"));
        let names: Vec<_> = embed.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Admin (1)", "Music (3)"]);
        assert_eq!(embed.fields[0].value, "No Documentation");
        assert_eq!(embed.footer.as_deref(), Some("Page 1/1"));
        assert_eq!(
            select_options(&payload),
            vec![("Admin".into(), "0".into()), ("Music".into(), "1".into())]
        );
    }

    #[tokio::test]
    async fn test_select_opens_category_and_home_returns() {
        let host = MockHost::new();
        let ctx = host.context(OWNER);
        let renderer = Arc::new(HelpRenderer::new(Arc::new(book())));
        let menu = SimplePaginationView::with_renderer(
            OWNER,
            renderer.book().index_pages(),
            renderer.clone(),
            options(),
        );
        menu.start(ctx.as_ref(), StartOptions::default()).await.unwrap();
        let select = renderer.select_control().unwrap();
        assert!(renderer.home_control().is_none());

        let pick: BoxedInteraction = host.select_interaction(OWNER, ["1"]);
        menu.view().dispatch(pick, &select).await.unwrap();
        assert_eq!(menu.max_pages(), 2);
        assert_eq!(menu.current_page(), 0);

        let payload = host.last_message().unwrap();
        let embed = payload.embed.unwrap();
        assert_eq!(embed.title.as_deref(), Some("Music"));
        assert_eq!(embed.fields[0].name, "play <query>");
        assert_eq!(embed.fields[0].value, "Queue a song");
        assert_eq!(embed.fields[1].value, "No Documentation");
        assert_eq!(embed.footer.as_deref(), Some("Page 1/2"));

        let home = renderer.home_control().unwrap();
        assert!(menu.view().has_control(&home));

        let back: BoxedInteraction = host.interaction(OWNER);
        menu.view().dispatch(back, &home).await.unwrap();
        assert_eq!(menu.max_pages(), 1);
        assert!(!menu.view().has_control(&home));
        assert!(renderer.home_control().is_none());
        let embed = host.last_message().unwrap().embed.unwrap();
        assert_eq!(embed.title.as_deref(), Some("Help Command"));
    }

    #[tokio::test]
    async fn test_select_without_value_only_acknowledges() {
        let host = MockHost::new();
        let ctx = host.context(OWNER);
        let renderer = Arc::new(HelpRenderer::new(Arc::new(book())));
        let menu = SimplePaginationView::with_renderer(
            OWNER,
            renderer.book().index_pages(),
            renderer.clone(),
            options(),
        );
        menu.start(ctx.as_ref(), StartOptions::default()).await.unwrap();

        let empty = host.select_interaction(OWNER, Vec::<String>::new());
        let interaction: BoxedInteraction = empty.clone();
        menu.view()
            .dispatch(interaction, &renderer.select_control().unwrap())
            .await
            .unwrap();
        assert!(empty.is_done());
        assert_eq!(menu.max_pages(), 1);
    }

    #[tokio::test]
    async fn test_long_descriptions_are_shortened() {
        let host = MockHost::new();
        let ctx = host.context(OWNER);
        let book = HelpBook::new(
            [Category::new("Long")
                .description("word ".repeat(40))
                .command(CommandInfo::new("x"))],
            HelpOptions::default(),
        );
        let menu = help_menu(OWNER, book, options());
        menu.start(ctx.as_ref(), StartOptions::default()).await.unwrap();

        let payload = host.last_message().unwrap();
        let description = payload
            .components
            .iter()
            .flatten()
            .find_map(|component| match &component.kind {
                ComponentKind::Select { options, placeholder } => {
                    assert_eq!(placeholder.as_deref(), Some("Select a category"));
                    options[0].description.clone()
                }
                _ => None,
            })
            .unwrap();
        assert!(description.ends_with("..."));
        assert!(description.chars().count() <= 90);
    }
}
