//! The command catalogue a help menu pages through.

use serde::{Deserialize, Serialize};
use starlight_utils::chunked;

use crate::signature::{CommandParameter, app_signature};

/// Description of one command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brief: Option<String>,
    /// Full help text, shown on the detail page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<CommandParameter>,
    /// Subcommands, when this command is a group.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<CommandInfo>,
    /// Hidden commands are left out of the help menu.
    #[serde(default)]
    pub hidden: bool,
}

impl CommandInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            brief: None,
            description: None,
            parameters: Vec::new(),
            subcommands: Vec::new(),
            hidden: false,
        }
    }

    pub fn brief(mut self, text: impl Into<String>) -> Self {
        self.brief = Some(text.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn parameter(mut self, parameter: CommandParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn subcommand(mut self, command: CommandInfo) -> Self {
        self.subcommands.push(command);
        self
    }

    pub fn is_group(&self) -> bool {
        !self.subcommands.is_empty()
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// The command name followed by its usage string.
    pub fn signature(&self) -> String {
        let params = app_signature(&self.parameters);
        if params.is_empty() {
            self.name.clone()
        } else {
            format!("{} {params}", self.name)
        }
    }
}

/// A named group of commands. `name` is `None` for commands without one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub commands: Vec<CommandInfo>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// The catch-all category for commands without one.
    pub fn uncategorized() -> Self {
        Self::default()
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn command(mut self, command: CommandInfo) -> Self {
        self.commands.push(command);
        self
    }
}

/// Texts and sizes used by the help menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpOptions {
    /// Commands per page in a category.
    pub per_page: usize,
    /// Categories per index page. Falls back to `per_page`.
    pub categories_per_page: Option<usize>,
    pub title: String,
    /// Shown under the title of the index pages.
    pub description: Option<String>,
    pub placeholder: String,
    pub no_category: String,
    pub no_documentation: String,
    pub accent_color: u32,
    /// Label of the button that returns to the index.
    pub home_label: String,
    /// Title of error messages.
    pub error_title: String,
    pub error_color: u32,
    /// Label of the button that deletes an error message.
    pub close_label: String,
}

impl Default for HelpOptions {
    fn default() -> Self {
        Self {
            per_page: 6,
            categories_per_page: None,
            title: "Help Command".into(),
            description: None,
            placeholder: "Select a category".into(),
            no_category: "No Category".into(),
            no_documentation: "No Documentation".into(),
            accent_color: 0x5865F2,
            home_label: "Home".into(),
            error_title: "Something went wrong!".into(),
            error_color: 0xE74C3C,
            close_label: "Close".into(),
        }
    }
}

/// One page of the help menu.
#[derive(Debug, Clone, PartialEq)]
pub enum HelpPage {
    /// A page of the category index, as indices into [`HelpBook::categories`].
    Index { categories: Vec<usize> },
    /// A page of commands from one category.
    Commands {
        category: usize,
        commands: Vec<CommandInfo>,
    },
}

/// The visible catalogue plus the options it is rendered with.
#[derive(Debug, Clone)]
pub struct HelpBook {
    categories: Vec<Category>,
    options: HelpOptions,
}

impl HelpBook {
    /// Builds the catalogue, dropping hidden commands and categories left
    /// empty. Categories are ordered by their display label.
    pub fn new(categories: impl IntoIterator<Item = Category>, options: HelpOptions) -> Self {
        let mut categories: Vec<Category> = categories
            .into_iter()
            .map(|mut category| {
                category.commands.retain(|command| !command.hidden);
                category
            })
            .filter(|category| !category.commands.is_empty())
            .collect();
        categories.sort_by(|a, b| {
            let a = a.name.as_deref().unwrap_or(&options.no_category);
            let b = b.name.as_deref().unwrap_or(&options.no_category);
            a.cmp(b)
        });
        Self {
            categories,
            options,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn options(&self) -> &HelpOptions {
        &self.options
    }

    /// The display label of a category.
    pub fn label(&self, index: usize) -> &str {
        self.categories
            .get(index)
            .and_then(|category| category.name.as_deref())
            .unwrap_or(&self.options.no_category)
    }

    /// The description of a category, or the placeholder text.
    pub fn describe(&self, index: usize) -> &str {
        self.categories
            .get(index)
            .and_then(|category| category.description.as_deref())
            .unwrap_or(&self.options.no_documentation)
    }

    /// Pages of the category index.
    pub fn index_pages(&self) -> Vec<HelpPage> {
        let per_page = self
            .options
            .categories_per_page
            .unwrap_or(self.options.per_page);
        chunked(0..self.categories.len(), per_page)
            .into_iter()
            .map(|categories| HelpPage::Index { categories })
            .collect()
    }

    /// Pages listing the commands of one category.
    pub fn category_pages(&self, index: usize) -> Option<Vec<HelpPage>> {
        let category = self.categories.get(index)?;
        Some(
            chunked(category.commands.iter().cloned(), self.options.per_page)
                .into_iter()
                .map(|commands| HelpPage::Commands {
                    category: index,
                    commands,
                })
                .collect(),
        )
    }
}
