use std::{fmt, io, path::Path, str::FromStr};

use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};

/// The closed set of categories a story may be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Technology
    Technology,
    /// Health
    Health,
    /// Sport
    Sport,
    /// Financial
    Financial,
    /// Fantasy
    Fantasy,
    /// Culture
    Culture,
}

impl Category {
    /// Every category, in the order they are offered for selection.
    pub const ALL: [Self; 6] = [
        Self::Technology,
        Self::Health,
        Self::Sport,
        Self::Financial,
        Self::Fantasy,
        Self::Culture,
    ];

    /// The wire representation of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Technology => "Technology",
            Self::Health => "Health",
            Self::Sport => "Sport",
            Self::Financial => "Financial",
            Self::Fantasy => "Fantasy",
            Self::Culture => "Culture",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    /// Parses a category name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// Error returned when a string does not name a [`Category`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error(
    "Unknown category '{0}': expected one of Technology, Health, Sport, Financial, Fantasy, \
     Culture"
)]
pub struct ParseCategoryError(String);

/// Publication status of a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Visible to readers.
    Publish,
    /// Work in progress.
    Draft,
}

impl Status {
    /// Both statuses, in the order they are offered for selection.
    pub const ALL: [Self; 2] = [Self::Publish, Self::Draft];

    /// The wire representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Publish => "Publish",
            Self::Draft => "Draft",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseStatusError;

    /// Parses a status name exactly.
    ///
    /// The backend only understands the capitalised forms, so no case folding
    /// is applied here. Use [`Status::parse_lenient`] at input boundaries.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

impl Status {
    /// Parses a status name, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is neither `publish` nor `draft`.
    pub fn parse_lenient(s: &str) -> Result<Self, ParseStatusError> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// Error returned when a string does not name a [`Status`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown status '{0}': expected Publish or Draft")]
pub struct ParseStatusError(String);

/// The backend's key for a stored story.
///
/// The backend is free to use numeric or textual keys, so the identifier is
/// kept as an opaque string. It is only ever used to address the item
/// resource, never sent in a request body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StoryId(String);

impl StoryId {
    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for StoryId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl FromStr for StoryId {
    type Err = ParseStoryIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.contains('/') {
            return Err(ParseStoryIdError(s.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl<'de> Deserialize<'de> for StoryId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(serde_json::Number),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self(n.to_string())),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Error returned when a string cannot be used as a [`StoryId`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid story id '{0}': must be non-empty and must not contain '/'")]
pub struct ParseStoryIdError(String);

/// A scalar field of a story draft that can be set directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// The story title.
    Title,
    /// The author's name.
    Author,
    /// A short summary of the story.
    Synopsis,
    /// The story category.
    Category,
    /// The publication status.
    Status,
    /// The cover image reference.
    CoverImage,
}

impl Field {
    /// The field name as it appears on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Synopsis => "synopsis",
            Self::Category => "category",
            Self::Status => "status",
            Self::CoverImage => "cover_image",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            "synopsis" => Ok(Self::Synopsis),
            "category" => Ok(Self::Category),
            "status" => Ok(Self::Status),
            "cover_image" | "cover-image" | "cover" => Ok(Self::CoverImage),
            _ => Err(ParseFieldError(s.to_string())),
        }
    }
}

/// Error returned when a string does not name a [`Field`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown field '{0}'")]
pub struct ParseFieldError(String);

/// A reference to a locally selected cover image.
///
/// This is a display and submission placeholder only. The image is never
/// uploaded, so the backend receives a reference that it cannot resolve
/// outside the machine it was created on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImageRef(NonEmptyString);

impl CoverImageRef {
    /// Wraps an existing reference string.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference is empty.
    pub fn new(reference: impl Into<String>) -> Result<Self, CoverImageError> {
        NonEmptyString::new(reference.into())
            .map(Self)
            .map_err(|_| CoverImageError::Empty)
    }

    /// Derives a `file://` URL for an image on the local filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist, is not a file or cannot
    /// be expressed as a URL.
    pub fn from_local_file(path: &Path) -> Result<Self, CoverImageError> {
        let canonical = path.canonicalize().map_err(|source| CoverImageError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if !canonical.is_file() {
            return Err(CoverImageError::NotAFile(canonical.display().to_string()));
        }
        let url = reqwest::Url::from_file_path(&canonical)
            .map_err(|()| CoverImageError::NotAUrl(canonical.display().to_string()))?;
        Self::new(url.to_string())
    }

    /// Returns the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CoverImageRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur when deriving a [`CoverImageRef`].
#[derive(Debug, thiserror::Error)]
pub enum CoverImageError {
    /// The reference string was empty.
    #[error("cover image reference must not be empty")]
    Empty,

    /// The image file could not be accessed.
    #[error("failed to access cover image '{path}': {source}")]
    Io {
        /// The path as given by the caller.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The path exists but is not a regular file.
    #[error("cover image '{0}' is not a file")]
    NotAFile(String),

    /// The path has no `file://` URL form.
    #[error("cover image path '{0}' cannot be expressed as a file URL")]
    NotAUrl(String),
}
