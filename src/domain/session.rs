use std::fmt;

use nonempty::NonEmpty;
use tracing::{debug, instrument};

use crate::{
    api::{StoryBackend, TransportError},
    domain::{
        draft::{HydrationError, StoryDraft},
        payload::SubmissionPayload,
        record::StoryRecord,
        validation::ValidationError,
        StoryId,
    },
};

/// Where a [`DraftSession`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No draft has been created or hydrated yet.
    Empty,
    /// A draft is open for editing.
    Editing,
    /// A submission is outstanding. The draft is read-only until it
    /// completes.
    Submitting,
    /// The draft was submitted successfully or cancelled.
    Discarded,
}

/// Holds exactly one [`StoryDraft`] for the lifetime of an authoring session
/// and mediates its submission.
///
/// The session is not re-entrant: a second submission cannot begin while one
/// is outstanding, and edits are refused until the outstanding one completes.
#[derive(Debug)]
pub struct DraftSession {
    phase: Phase,
    draft: Option<StoryDraft>,
}

impl Default for DraftSession {
    fn default() -> Self {
        Self {
            phase: Phase::Empty,
            draft: None,
        }
    }
}

impl DraftSession {
    /// Starts a session for a new story.
    #[must_use]
    pub fn create() -> Self {
        let mut session = Self::default();
        session.start(StoryDraft::create());
        session
    }

    /// Starts a session editing an existing story.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be turned into a draft, in which
    /// case no session is created.
    pub fn hydrate(record: StoryRecord) -> Result<Self, HydrationError> {
        let mut session = Self::default();
        session.start(StoryDraft::hydrate(record)?);
        Ok(session)
    }

    /// Replaces the current draft with one hydrated from `record`.
    ///
    /// Used when the story being edited changes. On failure the session is
    /// left as it was.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InFlight`] while a submission is outstanding
    /// - [`SessionError::Hydration`] if the record cannot be turned into a
    ///   draft
    pub fn rehydrate(&mut self, record: StoryRecord) -> Result<(), SessionError> {
        self.ensure_idle()?;
        let draft = StoryDraft::hydrate(record)?;
        self.start(draft);
        Ok(())
    }

    const fn ensure_idle(&self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Submitting => Err(SessionError::InFlight),
            Phase::Empty | Phase::Editing | Phase::Discarded => Ok(()),
        }
    }

    fn start(&mut self, draft: StoryDraft) {
        debug!(identifier = ?draft.identifier(), "starting draft session");
        self.draft = Some(draft);
        self.phase = Phase::Editing;
    }

    /// The current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// The draft, while one is open or being submitted.
    #[must_use]
    pub const fn draft(&self) -> Option<&StoryDraft> {
        self.draft.as_ref()
    }

    /// The draft, if it is open for editing.
    pub fn draft_mut(&mut self) -> Option<&mut StoryDraft> {
        match self.phase {
            Phase::Editing => self.draft.as_mut(),
            _ => None,
        }
    }

    /// Releases the draft. The session is unusable until a new draft is
    /// created or hydrated.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InFlight`] while a submission is outstanding;
    /// only [`DraftSession::complete`] may end that phase.
    pub fn discard(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.release();
        Ok(())
    }

    fn release(&mut self) {
        self.draft = None;
        self.phase = Phase::Discarded;
    }

    /// Validates the draft and marks the session as submitting.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::Inactive`] if no draft is open
    /// - [`SubmitError::InFlight`] if a submission is already outstanding
    /// - [`SubmitError::Validation`] if the draft fails validation; the
    ///   session stays in [`Phase::Editing`]
    pub fn begin_submission(&mut self) -> Result<Submission, SubmitError> {
        match self.phase {
            Phase::Editing => {}
            Phase::Submitting => return Err(SubmitError::InFlight),
            Phase::Empty | Phase::Discarded => return Err(SubmitError::Inactive),
        }
        let draft = self.draft.as_ref().ok_or(SubmitError::Inactive)?;

        draft.validate_for_submit().map_err(SubmitError::Validation)?;

        let target = draft
            .identifier()
            .cloned()
            .map_or(SubmissionTarget::Create, SubmissionTarget::Update);
        let submission = Submission {
            target,
            payload: draft.to_submission_payload(),
        };

        self.phase = Phase::Submitting;
        debug!(destination = %submission.target, "submission started");
        Ok(submission)
    }

    /// Delivers the single completion signal of an outstanding submission.
    ///
    /// Success discards the draft. Failure returns the session to
    /// [`Phase::Editing`] with the draft intact.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Inactive`] if no submission is outstanding, or
    /// the transport error on failure.
    pub fn complete(
        &mut self,
        result: Result<StoryRecord, TransportError>,
    ) -> Result<StoryRecord, SubmitError> {
        if self.phase != Phase::Submitting {
            return Err(SubmitError::Inactive);
        }
        match result {
            Ok(record) => {
                debug!(id = ?record.id, "submission succeeded");
                self.release();
                Ok(record)
            }
            Err(error) => {
                debug!(%error, "submission failed");
                self.phase = Phase::Editing;
                Err(SubmitError::Transport(error))
            }
        }
    }

    /// Validates, sends and completes a submission in one step.
    ///
    /// # Errors
    ///
    /// See [`DraftSession::begin_submission`] and [`DraftSession::complete`].
    #[instrument(level = "debug", skip_all)]
    pub fn submit<B>(&mut self, backend: &B) -> Result<StoryRecord, SubmitError>
    where
        B: StoryBackend + ?Sized,
    {
        let submission = self.begin_submission()?;
        let result = submission.send(backend);
        self.complete(result)
    }
}

/// How a submission is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionTarget {
    /// `POST` to the stories collection.
    Create,
    /// `PUT` to the story item resource.
    Update(StoryId),
}

impl fmt::Display for SubmissionTarget {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Create => f.write_str("POST /stories/"),
            Self::Update(id) => write!(f, "PUT /stories/{id}"),
        }
    }
}

/// A validated payload and its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Where the payload is sent.
    pub target: SubmissionTarget,
    /// The request body.
    pub payload: SubmissionPayload,
}

impl Submission {
    /// Sends the payload to the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub fn send<B>(&self, backend: &B) -> Result<StoryRecord, TransportError>
    where
        B: StoryBackend + ?Sized,
    {
        match &self.target {
            SubmissionTarget::Create => backend.create_story(&self.payload),
            SubmissionTarget::Update(id) => backend.update_story(id, &self.payload),
        }
    }
}

/// Errors that return a submitting session to editing.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The draft failed one or more submission rules.
    #[error("story is incomplete ({} field(s) need attention)", .0.len())]
    Validation(NonEmpty<ValidationError>),

    /// The backend could not be reached or rejected the request.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// There is no draft open for submission.
    #[error("no draft is open for submission")]
    Inactive,

    /// A submission is already outstanding.
    #[error("a submission is already in progress")]
    InFlight,
}

/// Errors that leave the session's phase unchanged.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    /// The replacement record could not be turned into a draft.
    #[error(transparent)]
    Hydration(#[from] HydrationError),

    /// A submission is outstanding and must complete first.
    #[error("a submission is in progress")]
    InFlight,
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::{
        api::SearchQuery,
        domain::{CoverImageRef, Field, Status},
    };

    /// Records calls and answers with a canned result.
    #[derive(Default)]
    struct FakeBackend {
        calls: RefCell<Vec<SubmissionTarget>>,
        fail: bool,
    }

    impl FakeBackend {
        fn respond(&self, target: SubmissionTarget) -> Result<StoryRecord, TransportError> {
            self.calls.borrow_mut().push(target);
            if self.fail {
                Err(TransportError::status(500, None))
            } else {
                Ok(StoryRecord {
                    id: Some(StoryId::from(1)),
                    ..StoryRecord::default()
                })
            }
        }
    }

    impl StoryBackend for FakeBackend {
        fn list_stories(&self) -> Result<Vec<StoryRecord>, TransportError> {
            Ok(Vec::new())
        }

        fn search_stories(&self, _: &SearchQuery) -> Result<Vec<StoryRecord>, TransportError> {
            Ok(Vec::new())
        }

        fn get_story(&self, _: &StoryId) -> Result<StoryRecord, TransportError> {
            Err(TransportError::status(404, None))
        }

        fn create_story(&self, _: &SubmissionPayload) -> Result<StoryRecord, TransportError> {
            self.respond(SubmissionTarget::Create)
        }

        fn update_story(
            &self,
            id: &StoryId,
            _: &SubmissionPayload,
        ) -> Result<StoryRecord, TransportError> {
            self.respond(SubmissionTarget::Update(id.clone()))
        }
    }

    fn complete_new_session() -> DraftSession {
        let mut session = DraftSession::create();
        let draft = session.draft_mut().unwrap();
        draft.set_field(Field::Title, "Ocean");
        draft.set_field(Field::Author, "A");
        draft.set_field(Field::Synopsis, "Waves");
        draft.set_field(Field::Category, "Health");
        draft.set_status(Status::Publish);
        draft.set_cover_image_ref(CoverImageRef::new("blob:1").unwrap());
        session
    }

    fn hydrated_session() -> DraftSession {
        DraftSession::hydrate(StoryRecord {
            id: Some(StoryId::from(8)),
            title: Some("T".to_string()),
            author: Some("A".to_string()),
            synopsis: Some("S".to_string()),
            category: Some("Sport".to_string()),
            status: Some("Draft".to_string()),
            ..StoryRecord::default()
        })
        .unwrap()
    }

    #[test]
    fn default_session_is_empty() {
        let mut session = DraftSession::default();
        assert_eq!(session.phase(), Phase::Empty);
        assert!(session.draft().is_none());
        assert!(matches!(
            session.begin_submission(),
            Err(SubmitError::Inactive)
        ));
    }

    #[test]
    fn successful_create_discards_the_draft() {
        let backend = FakeBackend::default();
        let mut session = complete_new_session();

        let record = session.submit(&backend).unwrap();

        assert_eq!(record.id, Some(StoryId::from(1)));
        assert_eq!(session.phase(), Phase::Discarded);
        assert!(session.draft().is_none());
        assert_eq!(*backend.calls.borrow(), [SubmissionTarget::Create]);
    }

    #[test]
    fn hydrated_session_submits_an_update() {
        let backend = FakeBackend::default();
        let mut session = hydrated_session();

        session.submit(&backend).unwrap();

        assert_eq!(
            *backend.calls.borrow(),
            [SubmissionTarget::Update(StoryId::from(8))]
        );
    }

    #[test]
    fn transport_failure_returns_to_editing() {
        let backend = FakeBackend {
            fail: true,
            ..FakeBackend::default()
        };
        let mut session = complete_new_session();

        let error = session.submit(&backend).unwrap_err();

        assert!(matches!(error, SubmitError::Transport(_)));
        assert_eq!(session.phase(), Phase::Editing);
        assert_eq!(session.draft().unwrap().title(), "Ocean");
    }

    #[test]
    fn validation_failure_never_reaches_the_backend() {
        let backend = FakeBackend::default();
        let mut session = DraftSession::create();

        let error = session.submit(&backend).unwrap_err();

        assert!(matches!(error, SubmitError::Validation(_)));
        assert_eq!(session.phase(), Phase::Editing);
        assert!(backend.calls.borrow().is_empty());
    }

    #[test]
    fn outstanding_submission_blocks_edits_and_resubmission() {
        let mut session = complete_new_session();
        let submission = session.begin_submission().unwrap();

        assert_eq!(submission.target, SubmissionTarget::Create);
        assert_eq!(session.phase(), Phase::Submitting);
        assert!(session.draft_mut().is_none());
        assert!(session.draft().is_some());
        assert!(matches!(
            session.begin_submission(),
            Err(SubmitError::InFlight)
        ));

        session
            .complete(Err(TransportError::status(502, None)))
            .unwrap_err();
        assert!(session.draft_mut().is_some());
    }

    #[test]
    fn completion_without_submission_is_rejected() {
        let mut session = complete_new_session();
        let result = session.complete(Ok(StoryRecord::default()));
        assert!(matches!(result, Err(SubmitError::Inactive)));
        assert_eq!(session.phase(), Phase::Editing);
    }

    #[test]
    fn discarded_session_can_be_restarted() {
        let mut session = complete_new_session();
        session.discard().unwrap();
        assert_eq!(session.phase(), Phase::Discarded);
        assert!(session.draft_mut().is_none());

        session
            .rehydrate(StoryRecord {
                id: Some(StoryId::from(2)),
                title: Some("T".to_string()),
                author: Some("A".to_string()),
                ..StoryRecord::default()
            })
            .unwrap();
        assert_eq!(session.phase(), Phase::Editing);
    }

    #[test]
    fn failed_rehydration_leaves_session_untouched() {
        let mut session = complete_new_session();
        let error = session.rehydrate(StoryRecord::default()).unwrap_err();

        assert_eq!(
            error,
            SessionError::Hydration(HydrationError::MissingField(Field::Title))
        );
        assert_eq!(session.draft().unwrap().title(), "Ocean");
    }

    #[test]
    fn outstanding_submission_cannot_be_replaced_or_discarded() {
        let mut session = complete_new_session();
        session.begin_submission().unwrap();

        let replaced = session.rehydrate(StoryRecord {
            id: Some(StoryId::from(2)),
            title: Some("T".to_string()),
            author: Some("A".to_string()),
            ..StoryRecord::default()
        });
        assert_eq!(replaced, Err(SessionError::InFlight));
        assert_eq!(session.discard(), Err(SessionError::InFlight));
        assert_eq!(session.phase(), Phase::Submitting);
        assert_eq!(session.draft().unwrap().title(), "Ocean");

        let record = session
            .complete(Ok(StoryRecord {
                id: Some(StoryId::from(1)),
                ..StoryRecord::default()
            }))
            .unwrap();
        assert_eq!(record.id, Some(StoryId::from(1)));
        assert_eq!(session.phase(), Phase::Discarded);
    }
}
