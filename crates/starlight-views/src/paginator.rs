//! Line-based text paginator.
//!
//! Accumulates lines into pages that fit a message size limit, wrapping each
//! page in a prefix and suffix (a code block by default). Sizes are counted
//! in characters.

use starlight_core::{ViewError, ViewResult};

/// Splits lines of text into size-limited pages.
#[derive(Debug, Clone)]
pub struct TextPaginator {
    prefix: Option<String>,
    suffix: Option<String>,
    max_size: usize,
    linesep: String,
    current: Vec<String>,
    count: usize,
    pages: Vec<String>,
}

impl Default for TextPaginator {
    fn default() -> Self {
        Self::new(Some("```"), Some("```"), 2000)
    }
}

impl TextPaginator {
    pub fn new(prefix: Option<&str>, suffix: Option<&str>, max_size: usize) -> Self {
        let mut paginator = Self {
            prefix: prefix.map(str::to_owned),
            suffix: suffix.map(str::to_owned),
            max_size,
            linesep: "\n".to_owned(),
            current: Vec::new(),
            count: 0,
            pages: Vec::new(),
        };
        paginator.reset_page();
        paginator
    }

    /// Sets the line separator (builder pattern).
    pub fn linesep(mut self, linesep: impl Into<String>) -> Self {
        self.linesep = linesep.into();
        self.reset_page();
        self
    }

    fn prefix_len(&self) -> usize {
        self.prefix.as_deref().map_or(0, |p| p.chars().count())
    }

    fn suffix_len(&self) -> usize {
        self.suffix.as_deref().map_or(0, |s| s.chars().count())
    }

    fn linesep_len(&self) -> usize {
        self.linesep.chars().count()
    }

    /// Largest line that fits on a page of its own.
    pub fn max_line_size(&self) -> usize {
        self.max_size
            .saturating_sub(self.prefix_len() + self.suffix_len() + 2 * self.linesep_len())
    }

    fn reset_page(&mut self) {
        self.current.clear();
        self.count = 0;
        if let Some(prefix) = &self.prefix {
            self.current.push(prefix.clone());
            self.count = prefix.chars().count() + self.linesep.chars().count();
        }
    }

    fn has_content(&self) -> bool {
        self.current.len() > usize::from(self.prefix.is_some())
    }

    /// Appends a line, closing the page first if it would overflow.
    ///
    /// With `empty` set, a blank line follows.
    pub fn add_line(&mut self, line: &str, empty: bool) -> ViewResult<()> {
        let len = line.chars().count();
        let max_line = self.max_line_size();
        if len > max_line {
            return Err(ViewError::render(format!(
                "line exceeds maximum page size {max_line}"
            )));
        }

        let linesep = self.linesep_len();
        if self.count + len + linesep > self.max_size.saturating_sub(self.suffix_len()) {
            self.close_page();
        }

        self.count += len + linesep;
        self.current.push(line.to_owned());
        if empty {
            self.current.push(String::new());
            self.count += linesep;
        }
        Ok(())
    }

    /// Closes the current page, even if it only holds the prefix.
    pub fn close_page(&mut self) {
        if let Some(suffix) = &self.suffix {
            self.current.push(suffix.clone());
        }
        self.pages.push(self.current.join(self.linesep.as_str()));
        self.reset_page();
    }

    /// The closed pages plus the current page if it has content.
    pub fn pages(&self) -> Vec<String> {
        let mut pages = self.pages.clone();
        if self.has_content() {
            let mut last = self.current.clone();
            if let Some(suffix) = &self.suffix {
                last.push(suffix.clone());
            }
            pages.push(last.join(self.linesep.as_str()));
        }
        pages
    }

    pub fn into_pages(mut self) -> Vec<String> {
        if self.has_content() {
            self.close_page();
        }
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_page() {
        let mut paginator = TextPaginator::default();
        paginator.add_line("hello", false).unwrap();
        paginator.add_line("world", true).unwrap();

        assert_eq!(paginator.pages(), vec!["```\nhello\nworld\n\n```"]);
    }

    #[test]
    fn test_overflow_opens_new_page() {
        let mut paginator = TextPaginator::new(None, None, 12);
        paginator.add_line("aaaa", false).unwrap();
        paginator.add_line("bbbb", false).unwrap();
        paginator.add_line("cccc", false).unwrap();

        let pages = paginator.into_pages();
        assert_eq!(pages, vec!["aaaa\nbbbb", "cccc"]);
    }

    #[test]
    fn test_line_too_long() {
        let mut paginator = TextPaginator::new(Some("```"), Some("```"), 10);
        assert_eq!(paginator.max_line_size(), 2);
        assert!(matches!(
            paginator.add_line("abc", false),
            Err(ViewError::Render(_))
        ));
    }

    #[test]
    fn test_empty_paginator_has_no_pages() {
        assert!(TextPaginator::default().into_pages().is_empty());
    }

    #[test]
    fn test_custom_linesep() {
        let mut paginator = TextPaginator::new(None, None, 100).linesep(" | ");
        paginator.add_line("a", false).unwrap();
        paginator.add_line("b", false).unwrap();
        assert_eq!(paginator.pages(), vec!["a | b"]);
    }
}
