use reqwest::{
    Url,
    blocking::{self, RequestBuilder},
};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

use crate::{
    api::{SearchQuery, StoryBackend, TransportError},
    domain::{Config, StoryId, StoryRecord, SubmissionPayload},
};

/// A blocking HTTP client for the story backend.
#[derive(Debug, Clone)]
pub struct Client {
    http: blocking::Client,
    base_url: Url,
}

impl Client {
    /// Builds a client from the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be initialised.
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        // a trailing slash makes `join` append rather than replace the last
        // path segment
        let base = format!("{}/", config.base_url().trim_end_matches('/'));
        let base_url = Url::parse(&base).map_err(|e| {
            TransportError::other(format!("invalid base URL '{}': {e}", config.base_url()))
        })?;

        let http = blocking::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self { http, base_url })
    }

    /// The base URL all routes are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|e| TransportError::other(format!("invalid request path '{path}': {e}")))
    }

    fn story_url(&self, id: &StoryId) -> Result<Url, TransportError> {
        self.url(&format!("stories/{id}"))
    }

    fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, TransportError> {
        let response = request.send()?;
        let status = response.status();
        debug!(%status, url = %response.url(), "received response");

        if !status.is_success() {
            let detail = response.text().ok().and_then(|body| extract_detail(&body));
            return Err(TransportError::status(status.as_u16(), detail));
        }

        Ok(response.json()?)
    }
}

/// Pulls a human-readable explanation out of an error response body.
///
/// The backend reports errors as `{"detail": ...}`.
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}

impl StoryBackend for Client {
    #[instrument(level = "debug", skip(self))]
    fn list_stories(&self) -> Result<Vec<StoryRecord>, TransportError> {
        let url = self.url("stories/")?;
        self.execute(self.http.get(url))
    }

    #[instrument(level = "debug", skip(self))]
    fn search_stories(&self, query: &SearchQuery) -> Result<Vec<StoryRecord>, TransportError> {
        if query.is_empty() {
            return self.list_stories();
        }
        let url = self.url("search/stories")?;
        self.execute(self.http.get(url).query(&query.params()))
    }

    #[instrument(level = "debug", skip(self))]
    fn get_story(&self, id: &StoryId) -> Result<StoryRecord, TransportError> {
        let url = self.story_url(id)?;
        self.execute(self.http.get(url))
    }

    #[instrument(level = "debug", skip_all)]
    fn create_story(&self, payload: &SubmissionPayload) -> Result<StoryRecord, TransportError> {
        trace!(?payload, "request body");
        let url = self.url("stories/")?;
        self.execute(self.http.post(url).json(payload))
    }

    #[instrument(level = "debug", skip(self, payload))]
    fn update_story(
        &self,
        id: &StoryId,
        payload: &SubmissionPayload,
    ) -> Result<StoryRecord, TransportError> {
        trace!(?payload, "request body");
        let url = self.story_url(id)?;
        self.execute(self.http.put(url).json(payload))
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;
    use crate::domain::{Category, Status, StoryDraft, TagPayload};

    fn client(server: &mockito::ServerGuard) -> Client {
        let mut config = Config::default();
        config.set_base_url(server.url());
        Client::new(&config).unwrap()
    }

    const STORY: &str = r#"{
        "id": 4,
        "title": "Ocean",
        "author": "A",
        "synopsis": "Waves",
        "category": "Culture",
        "status": "Publish",
        "cover_image": "blob:1",
        "tags": [{"id": 1, "tag_name": "sea"}],
        "chapters": [{"id": 2, "title": "One", "content": "hi"}]
    }"#;

    #[test]
    fn lists_the_collection() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/stories/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!("[{STORY}]"))
            .create();

        let stories = client(&server).list_stories().unwrap();

        mock.assert();
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].title.as_deref(), Some("Ocean"));
    }

    #[test]
    fn empty_search_lists_the_collection() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/stories/")
            .with_status(200)
            .with_body("[]")
            .create();

        let stories = client(&server)
            .search_stories(&SearchQuery::text(""))
            .unwrap();

        mock.assert();
        assert!(stories.is_empty());
    }

    #[test]
    fn search_sends_text_and_filters() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/search/stories")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "deep sea".into()),
                Matcher::UrlEncoded("category".into(), "Culture".into()),
                Matcher::UrlEncoded("status".into(), "Publish".into()),
            ]))
            .with_status(200)
            .with_body(format!("[{STORY}]"))
            .create();

        let query = SearchQuery {
            text: Some("deep sea".to_string()),
            category: Some(Category::Culture),
            status: Some(Status::Publish),
        };
        let stories = client(&server).search_stories(&query).unwrap();

        mock.assert();
        assert_eq!(stories.len(), 1);
    }

    #[test]
    fn fetches_one_story() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/stories/4")
            .with_status(200)
            .with_body(STORY)
            .create();

        let story = client(&server).get_story(&StoryId::from(4)).unwrap();

        assert_eq!(story.id, Some(StoryId::from(4)));
        assert_eq!(story.tag_names().collect::<Vec<_>>(), ["sea"]);
    }

    #[test]
    fn not_found_becomes_transport_error_with_detail() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/stories/9")
            .with_status(404)
            .with_body(r#"{"detail": "Story not found"}"#)
            .create();

        let error = client(&server).get_story(&StoryId::from(9)).unwrap_err();

        assert_eq!(error.status_code(), Some(404));
        assert!(error.message().ends_with("Story not found"));
    }

    #[test]
    fn creates_with_post_and_json_body() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/stories/")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "title": "Ocean",
                "author": "",
                "synopsis": "",
                "category": "",
                "status": "",
                "cover_image": "",
                "tags": [{"tag_name": "ocean"}],
                "chapters": [],
            })))
            .with_status(201)
            .with_body(STORY)
            .create();

        let payload = SubmissionPayload {
            title: "Ocean".to_string(),
            tags: vec![TagPayload {
                tag_name: "ocean".to_string(),
            }],
            ..SubmissionPayload::default()
        };
        let created = client(&server).create_story(&payload).unwrap();

        mock.assert();
        assert_eq!(created.id, Some(StoryId::from(4)));
    }

    #[test]
    fn updates_with_put_to_the_item() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("PUT", "/stories/4")
            .match_body(Matcher::PartialJson(json!({
                "tags": [{"tag_name": "sea"}],
                "chapters": [{"title": "One", "content": "hi"}],
            })))
            .with_status(200)
            .with_body(STORY)
            .create();

        let record: StoryRecord = serde_json::from_str(STORY).unwrap();
        let draft = StoryDraft::hydrate(record).unwrap();
        let id = draft.identifier().unwrap().clone();
        client(&server)
            .update_story(&id, &draft.to_submission_payload())
            .unwrap();

        mock.assert();
    }

    #[test]
    fn server_error_without_body() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("POST", "/stories/").with_status(500).create();

        let error = client(&server)
            .create_story(&SubmissionPayload::default())
            .unwrap_err();

        assert_eq!(error.status_code(), Some(500));
        assert_eq!(
            error.to_string(),
            "server responded with 500 Internal Server Error"
        );
    }

    #[test]
    fn base_url_path_is_preserved() {
        let mut config = Config::default();
        config.set_base_url("http://example.com/api");
        let client = Client::new(&config).unwrap();

        assert_eq!(
            client.url("stories/").unwrap().as_str(),
            "http://example.com/api/stories/"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let mut config = Config::default();
        config.set_base_url("not a url");
        assert!(Client::new(&config).is_err());
    }

    #[test]
    fn extract_detail_handles_structured_details() {
        assert_eq!(extract_detail(r#"{"detail": "x"}"#).as_deref(), Some("x"));
        assert_eq!(
            extract_detail(r#"{"detail": [1]}"#).as_deref(),
            Some("[1]")
        );
        assert_eq!(extract_detail("oops"), None);
    }
}
