//! Renders [`HelpPage`]s and keeps the menu controls in sync.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use starlight_core::{
    BoxedInteraction, ButtonStyle, Control, ControlCallback, ControlId, Embed, PageContent,
    SelectOption, ViewError, ViewResult, callback,
};
use starlight_utils::shorten;
use starlight_views::{PageRenderer, PageRequest, SimplePaginationView, WeakPagination};
use tracing::{debug, warn};

use super::model::{HelpBook, HelpPage};

/// Width of a select option description.
const DESCRIPTION_WIDTH: usize = 90;

#[derive(Default)]
struct MenuControls {
    select: Option<ControlId>,
    home: Option<ControlId>,
}

/// Page renderer for the help menu.
///
/// Index pages list categories and carry a category select; choosing a
/// category swaps the view's data source to that category's commands and
/// adds a button that returns to the index page last shown.
pub struct HelpRenderer {
    book: Arc<HelpBook>,
    controls: Mutex<MenuControls>,
    index_page: Arc<AtomicUsize>,
}

impl HelpRenderer {
    pub fn new(book: Arc<HelpBook>) -> Self {
        Self {
            book,
            controls: Mutex::new(MenuControls::default()),
            index_page: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn book(&self) -> &Arc<HelpBook> {
        &self.book
    }

    /// The category select, once the first page was rendered.
    pub fn select_control(&self) -> Option<ControlId> {
        self.controls.lock().select.clone()
    }

    /// The home button, while a category is shown.
    pub fn home_control(&self) -> Option<ControlId> {
        self.controls.lock().home.clone()
    }

    fn footer(request: &PageRequest<'_, HelpPage>) -> String {
        format!("Page {}/{}", request.page + 1, request.max_pages())
    }

    fn category_options(&self, categories: &[usize]) -> Vec<SelectOption> {
        categories
            .iter()
            .map(|&index| {
                let mut option = SelectOption::new(self.book.label(index)).description(shorten(
                    self.book.describe(index),
                    DESCRIPTION_WIDTH,
                    "...",
                ));
                option.value = index.to_string();
                option
            })
            .collect()
    }

    fn show_index(&self, view: &SimplePaginationView<HelpPage>, categories: &[usize]) {
        let options = self.category_options(categories);
        let mut controls = self.controls.lock();

        if let Some(home) = controls.home.take() {
            view.view().remove_control(&home);
        }

        let installed = controls.select.as_ref().and_then(|id| {
            view.view()
                .update_control(id, |control| control.set_options(options.clone()))
        });
        if installed.is_none() {
            let select = Control::select(options)
                .placeholder(self.book.options().placeholder.clone())
                .on_row(0)
                .on_click(select_callback(view.downgrade(), Arc::clone(&self.book)));
            controls.select = Some(view.view().add_control(select));
        }
    }

    fn show_category(&self, view: &SimplePaginationView<HelpPage>) {
        let mut controls = self.controls.lock();
        if controls
            .home
            .as_ref()
            .is_some_and(|id| view.view().has_control(id))
        {
            return;
        }
        let home = Control::button()
            .label(self.book.options().home_label.clone())
            .style(ButtonStyle::Success)
            .on_row(2)
            .on_click(home_callback(
                view.downgrade(),
                Arc::clone(&self.book),
                Arc::clone(&self.index_page),
            ));
        controls.home = Some(view.view().add_control(home));
    }
}

fn select_callback(view: WeakPagination<HelpPage>, book: Arc<HelpBook>) -> ControlCallback {
    callback(move |interaction: BoxedInteraction, _| {
        let view = view.clone();
        let book = Arc::clone(&book);
        async move {
            let Some(view) = view.upgrade() else {
                return Ok(());
            };
            let values = interaction.values();
            let Some(index) = values.first().and_then(|value| value.parse::<usize>().ok()) else {
                warn!(?values, "Category select sent no usable value");
                if !interaction.is_done() {
                    interaction.defer().await?;
                }
                return Ok(());
            };
            let pages = book
                .category_pages(index)
                .ok_or_else(|| ViewError::render(format!("unknown category {index}")))?;
            debug!(category = book.label(index), "Opening help category");
            view.change_source(pages, Some(&interaction), 0).await
        }
    })
}

fn home_callback(
    view: WeakPagination<HelpPage>,
    book: Arc<HelpBook>,
    index_page: Arc<AtomicUsize>,
) -> ControlCallback {
    callback(move |interaction: BoxedInteraction, _| {
        let view = view.clone();
        let book = Arc::clone(&book);
        let index_page = Arc::clone(&index_page);
        async move {
            let Some(view) = view.upgrade() else {
                return Ok(());
            };
            let pages = book.index_pages();
            let page = index_page.load(Ordering::SeqCst).min(pages.len().saturating_sub(1));
            view.change_source(pages, Some(&interaction), page).await
        }
    })
}

#[async_trait]
impl PageRenderer<HelpPage> for HelpRenderer {
    async fn format_page(
        &self,
        request: PageRequest<'_, HelpPage>,
    ) -> ViewResult<Option<PageContent>> {
        let options = self.book.options();
        let embed = match request.data() {
            HelpPage::Index { categories } => {
                let mut embed = Embed::new().title(options.title.clone());
                if let Some(description) = &options.description {
                    embed = embed.description(description.clone());
                }
                for &index in categories {
                    let count = self.book.categories()[index].commands.len();
                    embed = embed.field(
                        format!("{} ({count})", self.book.label(index)),
                        self.book.describe(index),
                        true,
                    );
                }
                embed
            }
            HelpPage::Commands { category, commands } => {
                let mut embed = Embed::new().title(self.book.label(*category));
                for command in commands {
                    embed = embed.field(
                        command.signature(),
                        command
                            .brief
                            .clone()
                            .unwrap_or_else(|| options.no_documentation.clone()),
                        false,
                    );
                }
                embed
            }
        };
        Ok(Some(
            embed
                .color(options.accent_color)
                .footer(Self::footer(&request))
                .into(),
        ))
    }

    async fn format_view(
        &self,
        view: &SimplePaginationView<HelpPage>,
        request: PageRequest<'_, HelpPage>,
    ) -> ViewResult<()> {
        match request.data() {
            HelpPage::Index { categories } => {
                self.index_page.store(request.page, Ordering::SeqCst);
                self.show_index(view, categories);
            }
            HelpPage::Commands { .. } => self.show_category(view),
        }
        Ok(())
    }
}
