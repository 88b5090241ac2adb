// src/domain/submission.rs
use std::fmt;

use crate::domain::error::ConnectError;
use crate::domain::note::NoteId;

/// Outcome of one submit-and-verify round trip.
///
/// Exactly one case per submission. `Success` is only reported after the
/// independent read-back confirmed the note; an accepted add that could not
/// be confirmed stays `VerificationFailed`, never `Success`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Note added and confirmed by read-back.
    Success(NoteId),
    /// AnkiConnect rejected the request (duplicate, bad deck, bad model).
    ApiError(String),
    /// The request never completed at the HTTP level.
    TransportError(String),
    /// The add looked accepted but the read-back could not confirm the note.
    VerificationFailed(NoteId),
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success(_))
    }

    pub fn note_id(&self) -> Option<NoteId> {
        match self {
            SubmissionOutcome::Success(id) | SubmissionOutcome::VerificationFailed(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<ConnectError> for SubmissionOutcome {
    fn from(err: ConnectError) -> Self {
        match err {
            ConnectError::Transport(msg) => SubmissionOutcome::TransportError(msg),
            ConnectError::Api(msg) => SubmissionOutcome::ApiError(msg),
        }
    }
}

impl fmt::Display for SubmissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionOutcome::Success(id) => write!(f, "confirmed as note {}", id),
            SubmissionOutcome::ApiError(msg) => write!(f, "rejected by AnkiConnect: {}", msg),
            SubmissionOutcome::TransportError(msg) => write!(f, "transport failure: {}", msg),
            SubmissionOutcome::VerificationFailed(id) => {
                write!(f, "note {} not confirmed by read-back", id)
            }
        }
    }
}
