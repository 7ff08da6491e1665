use serde::Serialize;
use std::collections::BTreeMap;

use fraction_core::model::{Problem, SessionId};

use crate::sessions::InputField;

/// Identifies one graded attempt of one session.
///
/// An explanation is only shown if its ticket is still the session's latest,
/// so answers for an abandoned session or a superseded attempt are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExplanationTicket {
    session_id: SessionId,
    attempt: u32,
}

impl ExplanationTicket {
    #[must_use]
    pub fn new(session_id: SessionId, attempt: u32) -> Self {
        Self {
            session_id,
            attempt,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}

/// What the tutor is told about a graded answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplanationContext {
    pub problem: Problem,
    pub outcome: bool,
    pub submitted: BTreeMap<InputField, String>,
}

/// A pending explanation: what to ask, and what to show if asking fails.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplanationRequest {
    pub ticket: ExplanationTicket,
    pub context: ExplanationContext,
    pub fallback: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplanationSource {
    Tutor,
    Fallback,
}

/// A finished explanation, ready to be offered to the session it was asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    pub ticket: ExplanationTicket,
    pub text: String,
    pub source: ExplanationSource,
}
