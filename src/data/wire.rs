//! Content records exactly as the recycle endpoints encode them
//!
//! Each item is a content rule: the content itself, its author, its metadata,
//! and a context saying whether it is a thread, a comment or a subcomment.
//! Go encodes nil slices and pointers as `null`, so every collection and
//! nested record tolerates it.

use serde::{Deserialize, Deserializer};

/// Reads `null` as the type's default value
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContentRule {
    #[serde(deserialize_with = "null_as_default")]
    pub data: Option<ContentData>,
    #[serde(rename = "ContentContext", deserialize_with = "null_as_default")]
    pub context: Option<ContentContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContentData {
    #[serde(deserialize_with = "null_as_default")]
    pub content: Content,
    #[serde(deserialize_with = "null_as_default")]
    pub author: Author,
    #[serde(deserialize_with = "null_as_default")]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Content {
    pub title: String,
    pub content: String,
    pub ft_file: String,
    #[serde(deserialize_with = "null_as_default")]
    pub publish_date: Option<Timestamp>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Author {
    pub id: String,
    pub alias: String,
    pub username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Metadata {
    /// Thread id, also for comments and subcomments of that thread
    pub id: String,
    /// Display name of the section; links use it lowercased without spaces
    pub section: String,
    pub permalink: String,
    pub upvotes: u32,
    pub replies: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub voter_ids: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub users_who_saved: Vec<String>,
}

/// The protobuf oneof; exactly one field is set
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContentContext {
    #[serde(rename = "ThreadCtx", deserialize_with = "null_as_default")]
    pub thread: Option<IdContext>,
    #[serde(rename = "CommentCtx", deserialize_with = "null_as_default")]
    pub comment: Option<IdContext>,
    #[serde(rename = "SubcommentCtx", deserialize_with = "null_as_default")]
    pub subcomment: Option<SubcommentContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct IdContext {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SubcommentContext {
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub comment_ctx: Option<IdContext>,
}
