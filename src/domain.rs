//! Domain models for story authoring.
//!
//! This module contains the draft model and its editing session, the shapes
//! exchanged with the backend, and configuration.

mod config;
pub use config::Config;

/// The editable draft of a story.
pub mod draft;
pub use draft::{Chapter, ChapterInput, HydrationError, StoryDraft};

/// Request bodies sent to the backend.
pub mod payload;
pub use payload::{ChapterPayload, SubmissionPayload, TagPayload};

pub mod record;
pub use record::{ChapterRecord, StoryRecord, TagRecord};

/// Authoring sessions and submission.
pub mod session;
pub use session::{
    DraftSession, Phase, SessionError, Submission, SubmissionTarget, SubmitError,
};

mod story;
pub use story::{
    Category, CoverImageError, CoverImageRef, Field, ParseCategoryError, ParseFieldError,
    ParseStatusError, ParseStoryIdError, Status, StoryId,
};

/// Submission rules.
pub mod validation;
pub use validation::{Reason, ValidationError};
