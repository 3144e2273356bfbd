//! The `Section` page cache
//!
//! Pages are append-only. The cursor starts on page 0 and every successful
//! append moves it to the newest page, no matter where the user had navigated
//! to before.

use thiserror::Error;
use tracing::debug;

use super::surface::{DisplayRegion, EmptyStateRegion};

/// Recoverable conditions reported back to the user
///
/// None of these change any state; the caller surfaces them as a notice the
/// user has to acknowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SectionNotice {
    /// `previous` was called on the first page
    #[error("This is the first page")]
    FirstPage,
    /// `next` was called on the last page
    #[error("This is the last page")]
    LastPage,
    /// `add_page` received empty content
    #[error("There is no new content. Check back later.")]
    NoNewContent,
}

/// Cached pages of one region plus the cursor over them
#[derive(Debug)]
pub struct Section<D, E> {
    pages: Vec<String>,
    current: usize,
    last: usize,
    display: D,
    empty_state: Option<E>,
    empty_cleared: bool,
}

impl<D: DisplayRegion, E: EmptyStateRegion> Section<D, E> {
    /// Index of the first page; pages are never removed so this never moves
    pub const FIRST_INDEX: usize = 0;

    /// Creates a section over `display`
    ///
    /// Content already present in the display region becomes page 0.
    pub fn new(display: D, empty_state: Option<E>) -> Self {
        let mut pages = Vec::new();
        if !display.content().is_empty() {
            pages.push(display.content().to_string());
        }
        Self {
            pages,
            current: Self::FIRST_INDEX,
            last: Self::FIRST_INDEX,
            display,
            empty_state,
            empty_cleared: false,
        }
    }

    /// Steps back one page, replaying it from the cache
    pub fn previous(&mut self) -> Result<(), SectionNotice> {
        if self.current == Self::FIRST_INDEX {
            return Err(SectionNotice::FirstPage);
        }
        self.current -= 1;
        self.render_current();
        Ok(())
    }

    /// Steps forward one page, replaying it from the cache
    pub fn next(&mut self) -> Result<(), SectionNotice> {
        if self.current == self.last {
            return Err(SectionNotice::LastPage);
        }
        self.current += 1;
        self.render_current();
        Ok(())
    }

    /// Appends a freshly fetched page and shows it
    ///
    /// Empty content means the fetcher found nothing new and is rejected.
    pub fn add_page(&mut self, content: impl Into<String>) -> Result<(), SectionNotice> {
        let content = content.into();
        if content.is_empty() {
            return Err(SectionNotice::NoNewContent);
        }

        self.pages.push(content);
        if self.pages.len() > 1 {
            self.last += 1;
            self.current = self.last;
        }

        if !self.empty_cleared {
            if let Some(empty_state) = self.empty_state.as_mut() {
                empty_state.clear();
            }
            self.empty_cleared = true;
        }

        self.render_current();
        debug!(page = self.current, total = self.pages.len(), "appended page");
        Ok(())
    }

    fn render_current(&mut self) {
        if let Some(page) = self.pages.get(self.current) {
            self.display.set_content(page);
        }
    }

    /// All cached pages in arrival order
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    /// Number of cached pages
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether no page has arrived yet
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn last_index(&self) -> usize {
        self.last
    }

    /// The page under the cursor, if any page exists
    pub fn current_page(&self) -> Option<&str> {
        self.pages.get(self.current).map(String::as_str)
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn empty_state(&self) -> Option<&E> {
        self.empty_state.as_ref()
    }

    /// Whether the empty-state region has been cleared by a successful append
    pub fn empty_state_cleared(&self) -> bool {
        self.empty_cleared
    }
}
