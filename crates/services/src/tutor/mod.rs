//! Tutor feedback: greeting, praise and explanations around a lesson.
//!
//! The state machine never waits on anything here. Praise is picked locally;
//! greetings and explanations come from a `TutorFeedbackService` and callers
//! fall back to fixed text when it fails.

mod context;
mod hints;
mod offline;
mod remote;

use async_trait::async_trait;

use crate::error::TutorError;

pub use context::{
    Explanation, ExplanationContext, ExplanationRequest, ExplanationSource, ExplanationTicket,
};
pub use hints::HintPool;
pub use offline::OfflineTutor;
pub use remote::{RemoteTutor, TutorConfig};

/// External source of tutoring text.
#[async_trait]
pub trait TutorFeedbackService: Send + Sync {
    /// Text shown when the learner enters or returns to the lesson menu.
    async fn greeting(&self) -> Result<String, TutorError>;

    /// Explanation of a graded final answer.
    async fn explain(&self, context: &ExplanationContext) -> Result<String, TutorError>;
}
