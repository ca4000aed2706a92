use chrono::{DateTime, Utc};
use nonempty::NonEmpty;

use crate::domain::{
    payload::{ChapterPayload, SubmissionPayload, TagPayload},
    record::{ChapterRecord, StoryRecord},
    validation::{Reason, ValidationError},
    Category, CoverImageRef, Field, Status, StoryId,
};

/// The editable, unsaved representation of a story.
///
/// A draft is either new (no identifier) or hydrated from an existing record
/// for editing. All mutations are total; the only fallible steps are
/// [`StoryDraft::hydrate`] and [`StoryDraft::validate_for_submit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryDraft {
    title: String,
    author: String,
    synopsis: String,
    category: String,
    status: String,
    cover_image: Option<CoverImageRef>,
    tags: Vec<String>,
    chapters: Vec<Chapter>,
    identifier: Option<StoryId>,
    pending_chapter: ChapterInput,
}

/// A chapter of a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// The chapter title. Not required to be unique.
    pub title: String,
    /// The chapter body, as rich text.
    pub content: String,
    /// When the chapter was added to the draft, or the backend's timestamp
    /// for hydrated chapters. Display only; never submitted.
    pub last_updated: Option<DateTime<Utc>>,
}

impl From<ChapterRecord> for Chapter {
    fn from(record: ChapterRecord) -> Self {
        Self {
            title: record.title,
            content: record.content,
            last_updated: record.updated_at,
        }
    }
}

/// The input buffer of the "new chapter" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterInput {
    /// Title typed so far.
    pub title: String,
    /// Content typed so far.
    pub content: String,
}

impl ChapterInput {
    /// Whether nothing has been typed into the buffer.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_empty() && self.content.is_empty()
    }
}

/// Errors that prevent a fetched record from becoming an editable draft.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HydrationError {
    /// A required scalar field is absent from the record.
    #[error("story record is missing required field '{0}'")]
    MissingField(Field),

    /// The record has no identifier, so it cannot be updated.
    #[error("story record has no identifier")]
    MissingIdentifier,
}

impl StoryDraft {
    /// Creates an empty draft for a new story.
    #[must_use]
    pub fn create() -> Self {
        Self::default()
    }

    /// Builds a draft from a previously fetched record.
    ///
    /// Scalars are copied verbatim, tag objects are reduced to their names
    /// (server tag identifiers are dropped) and chapters are copied along
    /// with any server timestamps.
    ///
    /// # Errors
    ///
    /// Returns an error if the record has no title, author, or identifier.
    pub fn hydrate(record: StoryRecord) -> Result<Self, HydrationError> {
        let title = record.title.ok_or(HydrationError::MissingField(Field::Title))?;
        let author = record
            .author
            .ok_or(HydrationError::MissingField(Field::Author))?;
        let identifier = record.id.ok_or(HydrationError::MissingIdentifier)?;

        Ok(Self {
            title,
            author,
            synopsis: record.synopsis.unwrap_or_default(),
            category: record.category.unwrap_or_default(),
            status: record.status.unwrap_or_default(),
            cover_image: record.cover_image.and_then(|c| CoverImageRef::new(c).ok()),
            tags: record.tags.into_iter().map(|tag| tag.tag_name).collect(),
            chapters: record.chapters.into_iter().map(Chapter::from).collect(),
            identifier: Some(identifier),
            pending_chapter: ChapterInput::default(),
        })
    }

    /// Sets one scalar field.
    ///
    /// No validation is applied here. Setting [`Field::CoverImage`] to an
    /// empty string clears the cover.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Title => self.title = value,
            Field::Author => self.author = value,
            Field::Synopsis => self.synopsis = value,
            Field::Category => self.category = value,
            Field::Status => self.status = value,
            Field::CoverImage => self.cover_image = CoverImageRef::new(value).ok(),
        }
    }

    /// Sets the category from the closed list.
    pub fn set_category(&mut self, category: Category) {
        self.category = category.as_str().to_string();
    }

    /// Sets the publication status.
    pub fn set_status(&mut self, status: Status) {
        self.status = status.as_str().to_string();
    }

    /// Replaces the cover image reference.
    pub fn set_cover_image_ref(&mut self, cover: CoverImageRef) {
        self.cover_image = Some(cover);
    }

    /// Appends a tag.
    ///
    /// Input that is empty once trimmed is ignored. Otherwise the original,
    /// untrimmed text is stored. Duplicates are kept.
    ///
    /// Returns `true` if the tag was appended.
    pub fn add_tag(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text.trim().is_empty() {
            return false;
        }
        self.tags.push(text);
        true
    }

    /// Removes the tag at `index`, shifting later tags down.
    ///
    /// Out-of-range indices are ignored.
    pub fn remove_tag(&mut self, index: usize) -> Option<String> {
        (index < self.tags.len()).then(|| self.tags.remove(index))
    }

    /// Appends a chapter stamped with the current time and clears the
    /// pending chapter buffer.
    pub fn add_chapter(&mut self, title: impl Into<String>, content: impl Into<String>) {
        self.chapters.push(Chapter {
            title: title.into(),
            content: content.into(),
            last_updated: Some(Utc::now()),
        });
        self.pending_chapter = ChapterInput::default();
    }

    /// The "new chapter" form buffer.
    pub const fn pending_chapter_mut(&mut self) -> &mut ChapterInput {
        &mut self.pending_chapter
    }

    /// The "new chapter" form buffer.
    #[must_use]
    pub const fn pending_chapter(&self) -> &ChapterInput {
        &self.pending_chapter
    }

    /// Appends the buffered chapter, clearing the buffer.
    pub fn commit_pending_chapter(&mut self) {
        let ChapterInput { title, content } = std::mem::take(&mut self.pending_chapter);
        self.add_chapter(title, content);
    }

    /// Removes the chapter at `index`, shifting later chapters down.
    ///
    /// Out-of-range indices are ignored.
    pub fn remove_chapter(&mut self, index: usize) -> Option<Chapter> {
        (index < self.chapters.len()).then(|| self.chapters.remove(index))
    }

    /// Checks the rules that must hold before the draft can be submitted.
    ///
    /// Title, author, synopsis and category must be non-empty. Status must
    /// be `Publish` or `Draft`. A cover image is required only for new
    /// stories; edits keep the existing cover unless it is replaced.
    ///
    /// # Errors
    ///
    /// Returns every failed rule, in field order.
    pub fn validate_for_submit(&self) -> Result<(), NonEmpty<ValidationError>> {
        let mut errors = Vec::new();

        for (field, value) in [
            (Field::Title, &self.title),
            (Field::Author, &self.author),
            (Field::Synopsis, &self.synopsis),
            (Field::Category, &self.category),
        ] {
            if value.is_empty() {
                errors.push(ValidationError::new(field, Reason::Missing));
            }
        }

        if self.status.is_empty() {
            errors.push(ValidationError::new(Field::Status, Reason::Missing));
        } else if self.status.parse::<Status>().is_err() {
            errors.push(ValidationError::new(Field::Status, Reason::Invalid));
        }

        if self.identifier.is_none() && self.cover_image.is_none() {
            errors.push(ValidationError::new(Field::CoverImage, Reason::Missing));
        }

        NonEmpty::from_vec(errors).map_or(Ok(()), Err)
    }

    /// Produces the wire representation of the draft.
    ///
    /// This is total: an unvalidated draft yields empty strings for unset
    /// fields. Chapter timestamps and the identifier are not included.
    #[must_use]
    pub fn to_submission_payload(&self) -> SubmissionPayload {
        SubmissionPayload {
            title: self.title.clone(),
            author: self.author.clone(),
            synopsis: self.synopsis.clone(),
            category: self.category.clone(),
            status: self.status.clone(),
            cover_image: self
                .cover_image
                .as_ref()
                .map(|cover| cover.as_str().to_string())
                .unwrap_or_default(),
            tags: self
                .tags
                .iter()
                .map(|tag| TagPayload {
                    tag_name: tag.clone(),
                })
                .collect(),
            chapters: self
                .chapters
                .iter()
                .map(|chapter| ChapterPayload {
                    title: chapter.title.clone(),
                    content: chapter.content.clone(),
                })
                .collect(),
        }
    }

    /// The story title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The author's name.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// The synopsis.
    #[must_use]
    pub fn synopsis(&self) -> &str {
        &self.synopsis
    }

    /// The category, if it names one of the known categories.
    #[must_use]
    pub fn category(&self) -> Option<Category> {
        self.category.parse().ok()
    }

    /// The publication status, if set to a valid value.
    #[must_use]
    pub fn status(&self) -> Option<Status> {
        self.status.parse().ok()
    }

    /// The cover image reference, if any.
    #[must_use]
    pub const fn cover_image(&self) -> Option<&CoverImageRef> {
        self.cover_image.as_ref()
    }

    /// Tags, in order.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Chapters, in order.
    #[must_use]
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// The backend key, present only for drafts hydrated for editing.
    #[must_use]
    pub const fn identifier(&self) -> Option<&StoryId> {
        self.identifier.as_ref()
    }
}
