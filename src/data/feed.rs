//! Rendering a feed into one page of text
//!
//! The page is what a `Section` caches and replays, so it is produced once,
//! when the feed arrives. An empty feed renders to an empty string, which the
//! section reads as "nothing new".

use std::fmt::Write;

use super::{Feed, Post, PostKind};

/// Renders every post of `feed` as a numbered block of text
pub fn render_page(feed: &Feed) -> String {
    let mut page = String::new();
    for (i, post) in feed.contents.iter().enumerate() {
        if i > 0 {
            page.push('\n');
        }
        render_post(&mut page, i + 1, post);
    }
    page
}

fn render_post(out: &mut String, number: usize, post: &Post) {
    let title = match (&post.kind, post.title.is_empty()) {
        (_, false) => post.title.as_str(),
        (PostKind::Thread, true) => "(untitled)",
        (PostKind::Comment { .. }, true) => "(comment)",
        (PostKind::Subcomment { .. }, true) => "(reply to a comment)",
    };
    let _ = writeln!(out, "{}. {}", number, title);

    let mut byline = Vec::new();
    if !post.author.is_empty() {
        byline.push(format!("by {}", post.author));
    }
    if !post.section_name.is_empty() {
        byline.push(format!("in {}", post.section_name));
    }
    if !post.publish_date.is_empty() {
        byline.push(post.publish_date.clone());
    }
    byline.push(format!("{} upvotes", post.upvotes));
    byline.push(format!("{} replies", post.replies));
    let _ = writeln!(out, "   {}", byline.join(" · "));

    if !post.summary.is_empty() {
        let _ = writeln!(out, "   {}", post.summary);
    }
    if !post.permalink.is_empty() {
        let _ = writeln!(out, "   {}", post.permalink);
    }
}
