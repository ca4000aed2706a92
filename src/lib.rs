//! Story authoring client
//!
//! Stories are composed as drafts and submitted to a REST backend.

pub mod domain;
pub use domain::{
    Category, Config, CoverImageRef, DraftSession, Field, Status, StoryDraft, StoryId, StoryRecord,
    ValidationError,
};

/// HTTP access to the story backend.
pub mod api;
pub use api::{Client, SearchQuery, StoryBackend, TransportError};
