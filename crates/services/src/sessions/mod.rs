mod hint;
mod phase;
mod service;
mod view;
mod workflow;

// Public API of the lesson subsystem.
pub use crate::error::SessionError;
pub use hint::Hint;
pub use phase::{InputField, Phase};
pub use service::{LessonAction, LessonSession, StepOutcome};
pub use view::LessonView;
pub use workflow::{DEFAULT_EXPLAIN_TIMEOUT, DEFAULT_GREETING, LessonLoopService};
