//! Content regions: one `Section` per tab, plus the buttons of its posts
//!
//! A region owns its page cache, the toggle buttons of every post it has
//! received (indexed the same way as the pages), and the ticket of the load
//! it is waiting for. At most one load is outstanding per region; a result
//! that does not carry that ticket is stale and dropped.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::config::RegionConfig;
use crate::data::{render_page, Feed, Post};
use crate::section::{EmptyBanner, Section, SectionNotice, TextPane};
use crate::toggle::{SaveState, ToggleButton, ToggleLinks, TwoState, UpvoteButton, UpvoteState};

/// Page cache type used by the terminal UI
pub type PageCache = Section<TextPane, EmptyBanner>;

/// Index of a region in the app's region list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionId(pub usize);

/// Identifies one load request; unique for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

impl LoadTicket {
    fn issue() -> Self {
        LoadTicket(NEXT_TICKET.fetch_add(1, Ordering::Relaxed))
    }
}

/// What became of a finished load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The page was appended and is now displayed
    Appended,
    /// The ticket was not the one the region waits for
    Stale,
}

/// A post on a cached page together with its buttons
#[derive(Debug, Clone, PartialEq)]
pub struct PostEntry {
    pub post: Post,
    pub upvote: Option<UpvoteButton>,
    pub save: Option<ToggleButton<SaveState>>,
}

impl PostEntry {
    /// Builds the buttons of `post` as seen by the user `viewer_id`
    ///
    /// Authors cannot save their own threads.
    pub fn new(post: Post, viewer_id: Option<&str>) -> Self {
        let upvote = post.can_upvote().then(|| {
            UpvoteButton::new(
                UpvoteState::from_active(post.upvoted_by(viewer_id)),
                post.upvotes,
                ToggleLinks::new(&post.upvote_link, &post.undo_upvote_link),
            )
        });
        let save = (post.can_save() && !post.is_authored_by(viewer_id)).then(|| {
            ToggleButton::new(
                SaveState::from_active(post.saved_by(viewer_id)),
                ToggleLinks::new(&post.save_link, &post.undo_save_link),
            )
        });
        Self { post, upvote, save }
    }
}

/// One navigable content region
#[derive(Debug)]
pub struct Region {
    pub id: RegionId,
    pub label: String,
    pub recycle_link: String,
    pub post_link: Option<String>,
    section: PageCache,
    /// Posts of each cached page; `entries[i]` belongs to page `i`
    entries: Vec<Vec<PostEntry>>,
    in_flight: Option<LoadTicket>,
    /// User id that upvote and save states are computed for
    viewer_id: Option<String>,
    /// Selected post on the current page
    pub selected: usize,
    pub loaded_at: Option<DateTime<Local>>,
}

impl Region {
    pub fn new(id: RegionId, config: &RegionConfig) -> Self {
        Self {
            id,
            label: config.label.clone(),
            recycle_link: config.recycle_link.clone(),
            post_link: config.post_link.clone(),
            section: Section::new(
                TextPane::default(),
                Some(EmptyBanner::new(config.empty_message.clone())),
            ),
            entries: Vec::new(),
            in_flight: None,
            viewer_id: None,
            selected: 0,
            loaded_at: None,
        }
    }

    pub fn with_viewer_id(mut self, viewer_id: Option<String>) -> Self {
        self.viewer_id = viewer_id;
        self
    }

    pub fn section(&self) -> &PageCache {
        &self.section
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Starts a load, or returns `None` if one is already outstanding
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        if self.in_flight.is_some() {
            debug!(region = %self.label, "load already in flight");
            return None;
        }
        let ticket = LoadTicket::issue();
        self.in_flight = Some(ticket);
        Some(ticket)
    }

    /// Appends the page fetched for `ticket`
    ///
    /// An empty feed clears the outstanding load and reports
    /// `SectionNotice::NoNewContent`.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        feed: Feed,
    ) -> Result<LoadOutcome, SectionNotice> {
        if self.in_flight != Some(ticket) {
            debug!(region = %self.label, ?ticket, "dropping stale page");
            return Ok(LoadOutcome::Stale);
        }
        self.in_flight = None;

        self.section.add_page(render_page(&feed))?;
        let viewer_id = self.viewer_id.as_deref();
        self.entries.push(
            feed.contents
                .into_iter()
                .map(|post| PostEntry::new(post, viewer_id))
                .collect(),
        );
        self.selected = 0;
        self.loaded_at = Some(Local::now());
        info!(
            region = %self.label,
            page = self.section.current_index(),
            "page appended"
        );
        Ok(LoadOutcome::Appended)
    }

    /// Gives up on the load for `ticket`; returns whether it was outstanding
    pub fn abort_load(&mut self, ticket: LoadTicket) -> bool {
        if self.in_flight == Some(ticket) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    pub fn previous(&mut self) -> Result<(), SectionNotice> {
        self.section.previous()?;
        self.selected = 0;
        Ok(())
    }

    pub fn next(&mut self) -> Result<(), SectionNotice> {
        self.section.next()?;
        self.selected = 0;
        Ok(())
    }

    /// Index of the page on display
    pub fn current_page(&self) -> usize {
        self.section.current_index()
    }

    /// Posts of the page on display
    pub fn current_entries(&self) -> &[PostEntry] {
        self.entries
            .get(self.section.current_index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn selected_entry(&self) -> Option<&PostEntry> {
        self.current_entries().get(self.selected)
    }

    pub fn entry_mut(&mut self, page: usize, post: usize) -> Option<&mut PostEntry> {
        self.entries.get_mut(page)?.get_mut(post)
    }

    pub fn select_next(&mut self) {
        let count = self.current_entries().len();
        if count > 0 {
            self.selected = (self.selected + 1) % count;
        }
    }

    pub fn select_previous(&mut self) {
        let count = self.current_entries().len();
        if count == 0 {
            return;
        }
        self.selected = if self.selected == 0 {
            count - 1
        } else {
            self.selected - 1
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::DisplayRegion;

    fn region() -> Region {
        Region::new(RegionId(0), &RegionConfig::board_section("mylife"))
    }

    fn feed(titles: &[&str]) -> Feed {
        Feed {
            contents: titles
                .iter()
                .map(|title| Post {
                    title: title.to_string(),
                    upvote_link: format!("/mylife/{}/upvote/", title),
                    undo_upvote_link: format!("/mylife/{}/undoupvote/", title),
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[test]
    fn test_new_region_is_empty() {
        let region = region();
        assert!(region.section().is_empty());
        assert!(!region.is_loading());
        assert!(region.current_entries().is_empty());
        assert_eq!(region.post_link.as_deref(), Some("/mylife/new"));
    }

    #[test]
    fn test_only_one_load_in_flight() {
        let mut region = region();
        let ticket = region.begin_load().expect("first load starts");
        assert!(region.is_loading());
        assert!(region.begin_load().is_none());

        region.finish_load(ticket, feed(&["a"])).unwrap();
        assert!(!region.is_loading());
        assert!(region.begin_load().is_some());
    }

    #[test]
    fn test_tickets_are_unique() {
        let mut first = region();
        let mut second = region();
        assert_ne!(first.begin_load(), second.begin_load());
    }

    #[test]
    fn test_finish_load_appends_page_and_entries() {
        let mut region = region();
        let ticket = region.begin_load().unwrap();

        let outcome = region.finish_load(ticket, feed(&["one", "two"])).unwrap();
        assert_eq!(outcome, LoadOutcome::Appended);
        assert_eq!(region.section().len(), 1);
        assert!(region.section().display().content().contains("1. one"));
        assert_eq!(region.current_entries().len(), 2);
        assert!(region.loaded_at.is_some());
    }

    #[test]
    fn test_stale_ticket_is_dropped() {
        let mut region = region();
        let ticket = region.begin_load().unwrap();
        assert!(region.abort_load(ticket));

        let outcome = region.finish_load(ticket, feed(&["late"])).unwrap();
        assert_eq!(outcome, LoadOutcome::Stale);
        assert!(region.section().is_empty());
    }

    #[test]
    fn test_empty_feed_reports_no_new_content() {
        let mut region = region();
        let ticket = region.begin_load().unwrap();

        let result = region.finish_load(ticket, Feed::default());
        assert_eq!(result, Err(SectionNotice::NoNewContent));
        assert!(!region.is_loading());
        assert!(region.section().is_empty());
        assert!(region.current_entries().is_empty());
    }

    #[test]
    fn test_entries_follow_page_navigation() {
        let mut region = region();
        let ticket = region.begin_load().unwrap();
        region.finish_load(ticket, feed(&["a1", "a2"])).unwrap();
        let ticket = region.begin_load().unwrap();
        region.finish_load(ticket, feed(&["b1"])).unwrap();

        assert_eq!(region.selected_entry().unwrap().post.title, "b1");

        region.previous().unwrap();
        region.select_next();
        assert_eq!(region.selected_entry().unwrap().post.title, "a2");

        region.next().unwrap();
        assert_eq!(region.selected, 0);
        assert_eq!(region.selected_entry().unwrap().post.title, "b1");
    }

    #[test]
    fn test_selection_wraps() {
        let mut region = region();
        let ticket = region.begin_load().unwrap();
        region.finish_load(ticket, feed(&["a", "b", "c"])).unwrap();

        region.select_previous();
        assert_eq!(region.selected, 2);
        region.select_next();
        assert_eq!(region.selected, 0);
    }

    fn thread(author_id: &str) -> Post {
        Post {
            author_id: author_id.to_string(),
            upvotes: 9,
            voter_ids: vec!["u7".to_string()],
            saver_ids: vec!["u7".to_string()],
            upvote_link: "/s/t/upvote/".to_string(),
            undo_upvote_link: "/s/t/undoupvote/".to_string(),
            save_link: "/s/t/save".to_string(),
            undo_save_link: "/s/t/undosave".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_post_entry_buttons_reflect_viewer() {
        let entry = PostEntry::new(thread("u1"), Some("u7"));
        let upvote = entry.upvote.expect("upvote button");
        assert_eq!(upvote.count(), 9);
        assert_eq!(upvote.state(), UpvoteState::Upvoted);
        assert_eq!(entry.save.expect("save button").state(), SaveState::Saved);

        let entry = PostEntry::new(thread("u1"), None);
        assert_eq!(entry.upvote.unwrap().state(), UpvoteState::NotUpvoted);
        assert_eq!(entry.save.unwrap().state(), SaveState::NotSaved);
    }

    #[test]
    fn test_author_gets_no_save_button() {
        let entry = PostEntry::new(thread("u7"), Some("u7"));
        assert!(entry.save.is_none());
        assert!(entry.upvote.is_some());
    }

    #[test]
    fn test_comment_entry_has_upvote_but_no_save() {
        let post = Post {
            kind: crate::data::PostKind::Comment { id: "5".to_string() },
            upvote_link: "/s/t/upvote/?c_id=5".to_string(),
            undo_upvote_link: "/s/t/undoupvote/?c_id=5".to_string(),
            reply_link: "/s/t/comment/?c_id=5".to_string(),
            ..Default::default()
        };
        let entry = PostEntry::new(post, Some("u7"));
        assert!(entry.save.is_none());
        let mut upvote = entry.upvote.expect("upvote button");
        assert_eq!(upvote.begin().as_deref(), Some("/s/t/upvote/?c_id=5"));
    }

    #[test]
    fn test_region_uses_its_viewer_id() {
        let mut region = region().with_viewer_id(Some("u7".to_string()));
        let ticket = region.begin_load().unwrap();
        region
            .finish_load(ticket, Feed { contents: vec![thread("u1")] })
            .unwrap();
        let entry = region.selected_entry().unwrap();
        assert_eq!(entry.upvote.as_ref().unwrap().state(), UpvoteState::Upvoted);
    }
}
