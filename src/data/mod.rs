//! Data models and the HTTP client for a cherosite board
//!
//! Recycle endpoints answer with a JSON feed of content rules. The client
//! fetches feeds, posts toggles and submits forms; `Post` flattens a rule and
//! builds the links the board expects; `feed` turns posts into one page of
//! text for a `Section`.

pub mod client;
pub mod feed;
pub mod wire;

pub use client::{Attachment, SiteClient, SiteError};
pub use feed::render_page;

use chrono::DateTime;
use serde::{Deserialize, Deserializer};

use wire::{ContentRule, null_as_default};

/// Longest summary shown for a post, in characters
const SUMMARY_LEN: usize = 175;

/// One page of recycled content
///
/// The user feed, activity and saved endpoints send a bare array of rules;
/// explore, section and profile endpoints wrap it as `{"Contents": [...]}`.
/// Either may be `null` when there is nothing to show.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feed {
    pub contents: Vec<Post>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FeedBody {
    Bare(Vec<ContentRule>),
    Wrapped {
        #[serde(rename = "Contents", default, deserialize_with = "null_as_default")]
        contents: Vec<ContentRule>,
    },
}

impl<'de> Deserialize<'de> for Feed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rules = match Option::<FeedBody>::deserialize(deserializer)? {
            None => Vec::new(),
            Some(FeedBody::Bare(rules)) | Some(FeedBody::Wrapped { contents: rules }) => rules,
        };
        Ok(Feed {
            contents: rules.iter().filter_map(Post::from_rule).collect(),
        })
    }
}

impl Feed {
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

/// Where a post sits in a thread
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PostKind {
    #[default]
    Thread,
    Comment {
        id: String,
    },
    Subcomment {
        comment_id: String,
        id: String,
    },
}

/// A thread, comment or subcomment as listed in a feed
///
/// Links are built from the section and thread id; an empty link means the
/// corresponding button is not offered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Post {
    pub kind: PostKind,
    pub title: String,
    /// Display alias of the author
    pub author: String,
    /// Author's username, used for follow links
    pub username: String,
    pub author_id: String,
    pub section_name: String,
    pub summary: String,
    pub permalink: String,
    pub publish_date: String,
    pub upvotes: u32,
    /// User ids of everyone who upvoted
    pub voter_ids: Vec<String>,
    pub upvote_link: String,
    pub undo_upvote_link: String,
    pub replies: u32,
    pub reply_link: String,
    /// User ids of everyone who saved the thread
    pub saver_ids: Vec<String>,
    pub save_link: String,
    pub undo_save_link: String,
}

/// Section path segment: the section name lowercased without spaces
fn section_slug(section: &str) -> String {
    section.to_lowercase().replace(' ', "")
}

fn summarize(content: &str) -> String {
    if content.chars().count() <= SUMMARY_LEN {
        return content.to_string();
    }
    let mut summary: String = content.chars().take(SUMMARY_LEN).collect();
    summary.push_str("...");
    summary
}

fn format_publish_date(seconds: i64) -> String {
    DateTime::from_timestamp(seconds, 0)
        .map(|date| date.format("%b %e %Y %H:%M UTC").to_string())
        .unwrap_or_default()
}

impl Post {
    /// Flattens a content rule; rules without data are skipped
    pub fn from_rule(rule: &ContentRule) -> Option<Post> {
        let data = rule.data.as_ref()?;
        let metadata = &data.metadata;
        let thread_link = format!("/{}/{}", section_slug(&metadata.section), metadata.id);

        let context = rule.context.clone().unwrap_or_default();
        let kind = if let Some(subcomment) = context.subcomment {
            PostKind::Subcomment {
                comment_id: subcomment.comment_ctx.map(|c| c.id).unwrap_or_default(),
                id: subcomment.id,
            }
        } else if let Some(comment) = context.comment {
            PostKind::Comment { id: comment.id }
        } else {
            PostKind::Thread
        };

        let mut post = Post {
            title: data.content.title.clone(),
            author: data.author.alias.clone(),
            username: data.author.username.clone(),
            author_id: data.author.id.clone(),
            section_name: metadata.section.clone(),
            summary: summarize(&data.content.content),
            permalink: metadata.permalink.clone(),
            publish_date: data
                .content
                .publish_date
                .map(|date| format_publish_date(date.seconds))
                .unwrap_or_default(),
            upvotes: metadata.upvotes,
            voter_ids: metadata.voter_ids.clone(),
            replies: metadata.replies,
            saver_ids: metadata.users_who_saved.clone(),
            ..Default::default()
        };

        match &kind {
            PostKind::Thread => {
                post.upvote_link = format!("{}/upvote/", thread_link);
                post.undo_upvote_link = format!("{}/undoupvote/", thread_link);
                post.reply_link = format!("{}/comment/", thread_link);
                post.save_link = format!("{}/save", thread_link);
                post.undo_save_link = format!("{}/undosave", thread_link);
            }
            PostKind::Comment { id } => {
                post.upvote_link = format!("{}/upvote/?c_id={}", thread_link, id);
                post.undo_upvote_link = format!("{}/undoupvote/?c_id={}", thread_link, id);
                post.reply_link = format!("{}/comment/?c_id={}", thread_link, id);
            }
            PostKind::Subcomment { comment_id, id } => {
                post.upvote_link =
                    format!("{}/upvote/?c_id={}&sc_id={}", thread_link, comment_id, id);
                post.undo_upvote_link =
                    format!("{}/undoupvote/?c_id={}&sc_id={}", thread_link, comment_id, id);
            }
        }
        post.kind = kind;
        Some(post)
    }

    /// Whether the post can be saved (threads only)
    pub fn can_save(&self) -> bool {
        !self.save_link.is_empty() && !self.undo_save_link.is_empty()
    }

    pub fn can_upvote(&self) -> bool {
        !self.upvote_link.is_empty() && !self.undo_upvote_link.is_empty()
    }

    pub fn can_reply(&self) -> bool {
        !self.reply_link.is_empty()
    }

    pub fn upvoted_by(&self, user_id: Option<&str>) -> bool {
        user_id.is_some_and(|id| self.voter_ids.iter().any(|voter| voter == id))
    }

    pub fn saved_by(&self, user_id: Option<&str>) -> bool {
        user_id.is_some_and(|id| self.saver_ids.iter().any(|saver| saver == id))
    }

    pub fn is_authored_by(&self, user_id: Option<&str>) -> bool {
        user_id.is_some_and(|id| !self.author_id.is_empty() && self.author_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREAD: &str = r#"{
        "data": {
            "content": {"title": "Example post", "content": "Hello there"},
            "author": {"id": "u1", "alias": "Luis", "username": "luisguve"},
            "metadata": {"id": "example-post-16", "section": "My Life", "upvotes": 3,
                         "replies": 1, "voter_ids": ["u2"], "users_who_saved": ["u3"]}
        },
        "ContentContext": {"ThreadCtx": {"id": "example-post-16"}}
    }"#;

    #[test]
    fn test_bare_array_feed() {
        let json = format!("[{}]\n", THREAD);
        let feed: Feed = serde_json::from_str(&json).expect("array feed should parse");
        assert_eq!(feed.contents.len(), 1);
        let post = &feed.contents[0];
        assert_eq!(post.kind, PostKind::Thread);
        assert_eq!(post.title, "Example post");
        assert_eq!(post.author, "Luis");
        assert_eq!(post.username, "luisguve");
        assert_eq!(post.upvotes, 3);
        assert_eq!(post.summary, "Hello there");
    }

    #[test]
    fn test_wrapped_feed() {
        let json = format!(r#"{{"Contents": [{}]}}"#, THREAD);
        let feed: Feed = serde_json::from_str(&json).expect("wrapped feed should parse");
        assert_eq!(feed.contents[0].title, "Example post");
    }

    #[test]
    fn test_null_and_empty_feeds() {
        for body in ["null\n", "[]", "{}", r#"{"Contents": null}"#] {
            let feed: Feed = serde_json::from_str(body).expect("empty feed should parse");
            assert!(feed.is_empty(), "{} should be empty", body);
        }
    }

    #[test]
    fn test_rule_without_data_is_skipped() {
        let json = format!(r#"[{{"data": null}}, {}]"#, THREAD);
        let feed: Feed = serde_json::from_str(&json).unwrap();
        assert_eq!(feed.contents.len(), 1);
    }

    #[test]
    fn test_thread_links_use_section_slug() {
        let rule: ContentRule = serde_json::from_str(THREAD).unwrap();
        let post = Post::from_rule(&rule).unwrap();
        assert_eq!(post.upvote_link, "/mylife/example-post-16/upvote/");
        assert_eq!(post.undo_upvote_link, "/mylife/example-post-16/undoupvote/");
        assert_eq!(post.save_link, "/mylife/example-post-16/save");
        assert_eq!(post.undo_save_link, "/mylife/example-post-16/undosave");
        assert_eq!(post.reply_link, "/mylife/example-post-16/comment/");
        assert!(post.can_upvote() && post.can_save() && post.can_reply());
    }

    #[test]
    fn test_comment_links_carry_comment_id() {
        let json = r#"{
            "data": {"metadata": {"id": "t-1", "section": "mylife"}},
            "ContentContext": {"CommentCtx": {"id": "5"}}
        }"#;
        let post = Post::from_rule(&serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(post.kind, PostKind::Comment { id: "5".to_string() });
        assert_eq!(post.upvote_link, "/mylife/t-1/upvote/?c_id=5");
        assert_eq!(post.undo_upvote_link, "/mylife/t-1/undoupvote/?c_id=5");
        assert_eq!(post.reply_link, "/mylife/t-1/comment/?c_id=5");
        assert!(!post.can_save());
    }

    #[test]
    fn test_subcomment_links_carry_both_ids() {
        let json = r#"{
            "data": {"metadata": {"id": "t-1", "section": "mylife"}},
            "ContentContext": {"SubcommentCtx": {"id": "9", "comment_ctx": {"id": "5"}}}
        }"#;
        let post = Post::from_rule(&serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(post.upvote_link, "/mylife/t-1/upvote/?c_id=5&sc_id=9");
        assert_eq!(post.undo_upvote_link, "/mylife/t-1/undoupvote/?c_id=5&sc_id=9");
        assert!(!post.can_reply());
        assert!(!post.can_save());
    }

    #[test]
    fn test_viewer_state() {
        let post = Post::from_rule(&serde_json::from_str(THREAD).unwrap()).unwrap();
        assert!(post.upvoted_by(Some("u2")));
        assert!(!post.upvoted_by(Some("u3")));
        assert!(!post.upvoted_by(None));
        assert!(post.saved_by(Some("u3")));
        assert!(post.is_authored_by(Some("u1")));
        assert!(!post.is_authored_by(None));
    }

    #[test]
    fn test_long_content_is_summarized() {
        let long = "x".repeat(300);
        let summary = summarize(&long);
        assert_eq!(summary.chars().count(), SUMMARY_LEN + 3);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_publish_date_formatting() {
        assert_eq!(format_publish_date(0), "Jan  1 1970 00:00 UTC");
    }
}
