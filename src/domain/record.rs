//! The shape of stories as returned by the backend.
//!
//! Records are deserialized leniently: unknown fields are ignored and every
//! field is optional so that a malformed record surfaces as a
//! [`HydrationError`](crate::domain::HydrationError) rather than a decode
//! failure.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::IgnoredAny};

use crate::domain::StoryId;

/// A story as stored by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRecord {
    /// The backend key of the story.
    #[serde(default, alias = "identifier")]
    pub id: Option<StoryId>,
    /// The story title.
    #[serde(default)]
    pub title: Option<String>,
    /// The author's name.
    #[serde(default)]
    pub author: Option<String>,
    /// A short summary.
    #[serde(default)]
    pub synopsis: Option<String>,
    /// Category name.
    #[serde(default)]
    pub category: Option<String>,
    /// Status name.
    #[serde(default)]
    pub status: Option<String>,
    /// The stored cover image reference.
    #[serde(default)]
    pub cover_image: Option<String>,
    /// Tags, with their backend identifiers.
    #[serde(default)]
    pub tags: Vec<TagRecord>,
    /// Chapters, in reading order.
    #[serde(default)]
    pub chapters: Vec<ChapterRecord>,
}

impl StoryRecord {
    /// The tag names, in order.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|tag| tag.tag_name.as_str())
    }
}

/// A tag association as stored by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    /// Backend-assigned tag identifier. Discarded on hydration.
    #[serde(default)]
    pub id: Option<StoryId>,
    /// The tag text.
    #[serde(default)]
    pub tag_name: String,
}

/// A chapter as stored by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRecord {
    /// Backend-assigned chapter identifier.
    #[serde(default)]
    pub id: Option<StoryId>,
    /// The chapter title.
    #[serde(default)]
    pub title: String,
    /// The chapter body (rich text).
    #[serde(default)]
    pub content: String,
    /// When the chapter was last modified, if the backend reports it.
    ///
    /// Timestamps without an offset are read as UTC. Unrecognised values are
    /// dropped rather than failing the record.
    #[serde(
        default,
        alias = "updatedAt",
        deserialize_with = "deserialize_timestamp"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TaggedDateTime {
    Utc(DateTime<Utc>),
    Local(NaiveDateTime),
    Unrecognised(IgnoredAny),
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<TaggedDateTime>::deserialize(deserializer)? {
        Some(TaggedDateTime::Utc(at)) => Some(at),
        Some(TaggedDateTime::Local(at)) => Some(at.and_utc()),
        Some(TaggedDateTime::Unrecognised(_)) | None => None,
    })
}
