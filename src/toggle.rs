//! Two-state buttons backed by a pair of endpoints
//!
//! Follow, save and upvote all work the same way: the button knows its state,
//! posts to the endpoint that leaves that state, and only flips once the server
//! confirms. A button with a request in flight ignores further presses.

/// A state with exactly two values and an explicit transition between them
pub trait TwoState: Copy + Eq + std::fmt::Debug {
    /// Whether this is the "on" state (following, saved, upvoted)
    fn is_active(self) -> bool;

    fn from_active(active: bool) -> Self;

    /// The state reached by pressing the button
    fn toggled(self) -> Self {
        Self::from_active(!self.is_active())
    }
}

/// Fixed button text for a state
///
/// Upvotes have none: their button shows the vote count instead.
pub trait StateLabel: TwoState {
    fn label(self) -> &'static str;
}

/// Whether the current user follows an author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FollowState {
    Following,
    #[default]
    NotFollowing,
}

impl TwoState for FollowState {
    fn is_active(self) -> bool {
        self == FollowState::Following
    }

    fn from_active(active: bool) -> Self {
        if active {
            FollowState::Following
        } else {
            FollowState::NotFollowing
        }
    }
}

impl StateLabel for FollowState {
    fn label(self) -> &'static str {
        match self {
            FollowState::Following => "Unfollow",
            FollowState::NotFollowing => "Follow",
        }
    }
}

/// Whether the current user saved a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveState {
    Saved,
    #[default]
    NotSaved,
}

impl TwoState for SaveState {
    fn is_active(self) -> bool {
        self == SaveState::Saved
    }

    fn from_active(active: bool) -> Self {
        if active {
            SaveState::Saved
        } else {
            SaveState::NotSaved
        }
    }
}

impl StateLabel for SaveState {
    fn label(self) -> &'static str {
        match self {
            SaveState::Saved => "You saved this post",
            SaveState::NotSaved => "Save this post",
        }
    }
}

/// Whether the current user upvoted a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpvoteState {
    Upvoted,
    #[default]
    NotUpvoted,
}

impl TwoState for UpvoteState {
    fn is_active(self) -> bool {
        self == UpvoteState::Upvoted
    }

    fn from_active(active: bool) -> Self {
        if active {
            UpvoteState::Upvoted
        } else {
            UpvoteState::NotUpvoted
        }
    }
}

/// Endpoints for both directions of a toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleLinks {
    /// Link that enters the active state
    pub activate: String,
    /// Link that leaves the active state
    pub deactivate: String,
}

impl ToggleLinks {
    pub fn new(activate: impl Into<String>, deactivate: impl Into<String>) -> Self {
        Self {
            activate: activate.into(),
            deactivate: deactivate.into(),
        }
    }

    /// Follow/unfollow endpoints for `username`
    pub fn follow(username: &str) -> Self {
        Self::new(
            format!("/follow?username={}", username),
            format!("/unfollow?username={}", username),
        )
    }
}

/// A toggle button with its own state and endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleButton<S> {
    state: S,
    links: ToggleLinks,
    pending: Option<S>,
}

impl<S: TwoState> ToggleButton<S> {
    pub fn new(state: S, links: ToggleLinks) -> Self {
        Self {
            state,
            links,
            pending: None,
        }
    }

    pub fn state(&self) -> S {
        self.state
    }

    /// Whether a request for this button is still outstanding
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts a press and returns the endpoint to post to
    ///
    /// Returns `None` while a previous press is still in flight.
    pub fn begin(&mut self) -> Option<String> {
        if self.pending.is_some() {
            return None;
        }
        let link = if self.state.is_active() {
            self.links.deactivate.clone()
        } else {
            self.links.activate.clone()
        };
        self.pending = Some(self.state.toggled());
        Some(link)
    }

    /// Applies the pending transition after the server confirmed it
    pub fn complete(&mut self) -> Option<S> {
        let target = self.pending.take()?;
        self.state = target;
        Some(target)
    }

    /// Drops the pending transition after the server refused it
    pub fn abort(&mut self) {
        self.pending = None;
    }
}

impl<S: StateLabel> ToggleButton<S> {
    pub fn label(&self) -> &'static str {
        self.state.label()
    }
}

/// Upvote button that also tracks the displayed vote count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpvoteButton {
    toggle: ToggleButton<UpvoteState>,
    count: u32,
}

impl UpvoteButton {
    pub fn new(state: UpvoteState, count: u32, links: ToggleLinks) -> Self {
        Self {
            toggle: ToggleButton::new(state, links),
            count,
        }
    }

    pub fn state(&self) -> UpvoteState {
        self.toggle.state()
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Vote count, which is all the button shows in either state
    pub fn label(&self) -> String {
        format!("{} Upvotes", self.count)
    }

    pub fn is_pending(&self) -> bool {
        self.toggle.is_pending()
    }

    pub fn begin(&mut self) -> Option<String> {
        self.toggle.begin()
    }

    pub fn complete(&mut self) -> Option<UpvoteState> {
        let state = self.toggle.complete()?;
        self.count = match state {
            UpvoteState::Upvoted => self.count.saturating_add(1),
            UpvoteState::NotUpvoted => self.count.saturating_sub(1),
        };
        Some(state)
    }

    pub fn abort(&mut self) {
        self.toggle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn save_button(state: SaveState) -> ToggleButton<SaveState> {
        ToggleButton::new(
            state,
            ToggleLinks::new("/mylife/post-1/save", "/mylife/post-1/undosave"),
        )
    }

    #[test]
    fn test_toggled_flips_each_state() {
        assert_eq!(FollowState::Following.toggled(), FollowState::NotFollowing);
        assert_eq!(FollowState::NotFollowing.toggled(), FollowState::Following);
        assert_eq!(SaveState::Saved.toggled(), SaveState::NotSaved);
        assert_eq!(UpvoteState::NotUpvoted.toggled(), UpvoteState::Upvoted);
    }

    #[test]
    fn test_follow_labels_name_the_next_action() {
        assert_eq!(FollowState::Following.label(), "Unfollow");
        assert_eq!(FollowState::NotFollowing.label(), "Follow");
    }

    #[test]
    fn test_save_labels() {
        assert_eq!(SaveState::Saved.label(), "You saved this post");
        assert_eq!(SaveState::NotSaved.label(), "Save this post");
    }

    #[test]
    fn test_begin_uses_activate_link_when_inactive() {
        let mut button = save_button(SaveState::NotSaved);
        assert_eq!(button.begin().as_deref(), Some("/mylife/post-1/save"));
        assert!(button.is_pending());
        assert_eq!(button.state(), SaveState::NotSaved);
    }

    #[test]
    fn test_begin_uses_deactivate_link_when_active() {
        let mut button = save_button(SaveState::Saved);
        assert_eq!(button.begin().as_deref(), Some("/mylife/post-1/undosave"));
    }

    #[test]
    fn test_second_press_while_pending_is_ignored() {
        let mut button = save_button(SaveState::NotSaved);
        assert!(button.begin().is_some());
        assert!(button.begin().is_none());
    }

    #[test]
    fn test_complete_applies_transition() {
        let mut button = save_button(SaveState::NotSaved);
        button.begin();
        assert_eq!(button.complete(), Some(SaveState::Saved));
        assert_eq!(button.state(), SaveState::Saved);
        assert_eq!(button.label(), "You saved this post");
        assert!(!button.is_pending());
    }

    #[test]
    fn test_abort_keeps_state() {
        let mut button = save_button(SaveState::Saved);
        button.begin();
        button.abort();
        assert_eq!(button.state(), SaveState::Saved);
        assert!(!button.is_pending());
    }

    #[test]
    fn test_complete_without_begin_does_nothing() {
        let mut button = save_button(SaveState::NotSaved);
        assert!(button.complete().is_none());
        assert_eq!(button.state(), SaveState::NotSaved);
    }

    #[test]
    fn test_follow_links_use_username_query() {
        let links = ToggleLinks::follow("luisguve");
        assert_eq!(links.activate, "/follow?username=luisguve");
        assert_eq!(links.deactivate, "/unfollow?username=luisguve");
    }

    #[test]
    fn test_upvote_count_follows_state() {
        let mut button = UpvoteButton::new(
            UpvoteState::NotUpvoted,
            4,
            ToggleLinks::new("/a/b/upvote/", "/a/b/undoupvote/"),
        );
        assert_eq!(button.label(), "4 Upvotes");

        assert_eq!(button.begin().as_deref(), Some("/a/b/upvote/"));
        button.complete();
        assert_eq!(button.count(), 5);
        assert_eq!(button.state(), UpvoteState::Upvoted);

        assert_eq!(button.begin().as_deref(), Some("/a/b/undoupvote/"));
        button.complete();
        assert_eq!(button.count(), 4);
        assert_eq!(button.label(), "4 Upvotes");
    }

    #[test]
    fn test_upvote_label_shows_count_in_both_states() {
        let links = ToggleLinks::new("/up", "/undo");
        let upvoted = UpvoteButton::new(UpvoteState::Upvoted, 3, links.clone());
        let not_upvoted = UpvoteButton::new(UpvoteState::NotUpvoted, 3, links);
        assert_eq!(upvoted.label(), not_upvoted.label());
        assert_eq!(upvoted.label(), "3 Upvotes");
    }

    #[test]
    fn test_undo_upvote_never_goes_negative() {
        let mut button =
            UpvoteButton::new(UpvoteState::Upvoted, 0, ToggleLinks::new("/up", "/undo"));
        button.begin();
        button.complete();
        assert_eq!(button.count(), 0);
    }

    #[test]
    fn test_failed_upvote_keeps_count() {
        let mut button =
            UpvoteButton::new(UpvoteState::NotUpvoted, 7, ToggleLinks::new("/up", "/undo"));
        button.begin();
        button.abort();
        assert_eq!(button.count(), 7);
        assert_eq!(button.state(), UpvoteState::NotUpvoted);
    }
}
