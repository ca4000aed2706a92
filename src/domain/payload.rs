use serde::{Deserialize, Serialize};

/// The JSON body sent to create or update a story.
///
/// The story identifier is never part of the body; updates address the item
/// resource instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    /// The story title.
    pub title: String,
    /// The author's name.
    pub author: String,
    /// A short summary.
    pub synopsis: String,
    /// Category name.
    pub category: String,
    /// `Publish` or `Draft`.
    pub status: String,
    /// Local cover image reference (not an uploaded asset).
    pub cover_image: String,
    /// Tags, in order. Existing tag identifiers are never referenced.
    pub tags: Vec<TagPayload>,
    /// Chapters, in order.
    pub chapters: Vec<ChapterPayload>,
}

/// A tag in a [`SubmissionPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPayload {
    /// The tag text.
    pub tag_name: String,
}

/// A chapter in a [`SubmissionPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterPayload {
    /// The chapter title.
    pub title: String,
    /// The chapter body.
    pub content: String,
}
