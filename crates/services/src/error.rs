//! Shared error types for the services crate.

use thiserror::Error;

use crate::sessions::{InputField, Phase};

/// Errors emitted by a `LessonSession`.
///
/// None of these are fatal: the session is left exactly as it was and the
/// learner can resubmit. Wrong-but-well-formed answers are not errors at all;
/// they come back as a `StepOutcome`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("{field} is not accepted during {phase}")]
    WrongPhase { field: InputField, phase: Phase },
    #[error("please type a number for the {field}")]
    Malformed { field: InputField, raw: String },
    #[error("the {field} cannot be edited during {phase}")]
    InputLocked { field: InputField, phase: Phase },
    #[error("this problem is already solved; ask for the next one")]
    AlreadyResolved,
}

/// Errors emitted by tutor feedback collaborators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TutorError {
    #[error("the tutor is not configured")]
    Disabled,
    #[error("the tutor returned an empty response")]
    EmptyResponse,
    #[error("tutor request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("tutor did not answer in time")]
    Timeout,
    #[error("tutor unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
