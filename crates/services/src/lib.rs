#![forbid(unsafe_code)]

pub mod error;
pub mod sessions;
pub mod tutor;

pub use fraction_core::Clock;
pub use sessions as session;

pub use error::{SessionError, TutorError};

pub use sessions::{
    DEFAULT_EXPLAIN_TIMEOUT, DEFAULT_GREETING, Hint, InputField, LessonAction, LessonLoopService,
    LessonSession, LessonView, Phase, StepOutcome,
};
pub use tutor::{
    Explanation, ExplanationRequest, ExplanationSource, ExplanationTicket, OfflineTutor,
    RemoteTutor, TutorConfig, TutorFeedbackService,
};
