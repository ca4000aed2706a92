mod client;
mod error;
mod search;

pub use client::Client;
pub use error::TransportError;
pub use search::SearchQuery;

use crate::domain::{StoryId, StoryRecord, SubmissionPayload};

/// The operations the story backend offers.
///
/// Every call is a single blocking round trip. There are no retries.
pub trait StoryBackend {
    /// Lists every story.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    fn list_stories(&self) -> Result<Vec<StoryRecord>, TransportError>;

    /// Lists stories matching a free-text query and/or filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    fn search_stories(&self, query: &SearchQuery) -> Result<Vec<StoryRecord>, TransportError>;

    /// Fetches one story.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    fn get_story(&self, id: &StoryId) -> Result<StoryRecord, TransportError>;

    /// Creates a story, returning the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    fn create_story(&self, payload: &SubmissionPayload) -> Result<StoryRecord, TransportError>;

    /// Replaces an existing story, returning the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    fn update_story(
        &self,
        id: &StoryId,
        payload: &SubmissionPayload,
    ) -> Result<StoryRecord, TransportError>;
}
