//! Surfaces a `Section` renders into
//!
//! The section owns one display surface and, optionally, one empty-state
//! surface. The traits keep the section independent of the terminal UI so it
//! can be driven from tests with plain buffers.

/// A surface that shows exactly one page of content
pub trait DisplayRegion {
    /// Overwrites whatever the surface currently shows
    fn set_content(&mut self, content: &str);

    /// Returns what the surface currently shows
    fn content(&self) -> &str;
}

/// A surface shown while a region has no content yet
pub trait EmptyStateRegion {
    /// Removes the empty-state message for good
    fn clear(&mut self);
}

/// In-memory display surface used by the terminal UI
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextPane {
    content: String,
    /// Number of times the pane has been redrawn
    renders: usize,
}

impl TextPane {
    /// Creates a pane already showing `content`
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            renders: 0,
        }
    }

    /// Number of `set_content` calls since construction
    pub fn renders(&self) -> usize {
        self.renders
    }
}

impl DisplayRegion for TextPane {
    fn set_content(&mut self, content: &str) {
        self.content.clear();
        self.content.push_str(content);
        self.renders += 1;
    }

    fn content(&self) -> &str {
        &self.content
    }
}

/// Placeholder message shown before the first page arrives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyBanner {
    message: String,
}

impl EmptyBanner {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message, or `None` once the banner has been cleared
    pub fn message(&self) -> Option<&str> {
        if self.message.is_empty() {
            None
        } else {
            Some(&self.message)
        }
    }
}

impl EmptyStateRegion for EmptyBanner {
    fn clear(&mut self) {
        self.message.clear();
    }
}
