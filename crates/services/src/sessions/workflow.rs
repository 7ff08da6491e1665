use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, warn};

use fraction_core::model::{LessonKind, Problem, SessionId};
use fraction_core::{Clock, ProblemGenerator};

use super::service::{LessonAction, LessonSession, StepOutcome};
use crate::error::{SessionError, TutorError};
use crate::tutor::{
    Explanation, ExplanationRequest, ExplanationSource, HintPool, TutorFeedbackService,
};

/// Shown on the lesson menu when the tutor cannot greet.
pub const DEFAULT_GREETING: &str = "Hello! Let's learn fractions together.";
/// Upper bound on a single greeting or explanation call.
pub const DEFAULT_EXPLAIN_TIMEOUT: Duration = Duration::from_secs(8);

/// Orchestrates lesson start, submissions and tutor feedback.
///
/// Sessions are handed out by value and passed back in by reference, so the
/// caller holds exactly one current session. Tutor calls never touch a
/// session; their results come back as `Explanation`s that the caller offers
/// to whatever session is current, which drops them if they are stale.
pub struct LessonLoopService {
    clock: Clock,
    tutor: Arc<dyn TutorFeedbackService>,
    generator: Mutex<ProblemGenerator>,
    hints: Mutex<HintPool>,
    next_id: AtomicU64,
    tutor_timeout: Duration,
}

impl LessonLoopService {
    #[must_use]
    pub fn new(clock: Clock, tutor: Arc<dyn TutorFeedbackService>) -> Self {
        Self {
            clock,
            tutor,
            generator: Mutex::new(ProblemGenerator::from_os_rng()),
            hints: Mutex::new(HintPool::from_os_rng()),
            next_id: AtomicU64::new(1),
            tutor_timeout: DEFAULT_EXPLAIN_TIMEOUT,
        }
    }

    /// Seed problem generation and praise picking for reproducible runs.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.generator = Mutex::new(ProblemGenerator::seeded(seed));
        self.hints = Mutex::new(HintPool::seeded(seed.rotate_left(32)));
        self
    }

    #[must_use]
    pub fn with_tutor_timeout(mut self, tutor_timeout: Duration) -> Self {
        self.tutor_timeout = tutor_timeout;
        self
    }

    /// Start a fresh session for the given lesson.
    pub fn start_lesson(&self, lesson_kind: LessonKind) -> LessonSession {
        let problem = self
            .generator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generate(lesson_kind);
        self.start_with_problem(problem)
    }

    /// Start a session on a known problem.
    pub fn start_with_problem(&self, problem: Problem) -> LessonSession {
        let id = SessionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        info!(
            session = %id,
            lesson = %problem.lesson_kind(),
            group_size = problem.group_size(),
            total_groups = problem.total_groups(),
            target_groups = problem.target_groups(),
            length = problem.is_length(),
            "session started"
        );
        let mut session = LessonSession::new(id, problem, self.clock.now());
        session.set_tutor_message("Look at the problem carefully and give it a try!");
        session
    }

    /// Replace a session with a new one for the same lesson.
    ///
    /// The previous session is consumed whatever its state, so nothing of it
    /// (problem, drafts, pending explanation) can leak into the next one.
    pub fn next_problem(&self, previous: LessonSession) -> LessonSession {
        let lesson_kind = previous.problem().lesson_kind();
        drop(previous);
        self.start_lesson(lesson_kind)
    }

    /// Apply a submission and update the session's tutor message.
    ///
    /// # Errors
    ///
    /// Propagates `SessionError` from [`LessonSession::apply`].
    pub fn submit(
        &self,
        session: &mut LessonSession,
        action: LessonAction,
    ) -> Result<StepOutcome, SessionError> {
        let result = session.apply(action, self.clock.now());
        self.narrate(session, &result);
        result
    }

    /// Submit the drafts of the current phase.
    ///
    /// # Errors
    ///
    /// Propagates `SessionError` from [`LessonSession::check`].
    pub fn check(&self, session: &mut LessonSession) -> Result<StepOutcome, SessionError> {
        let result = session.check(self.clock.now());
        self.narrate(session, &result);
        result
    }

    /// Renderer callback for a ruler mark.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongPhase` outside ruler partitioning.
    pub fn on_ruler_pick(
        &self,
        session: &mut LessonSession,
        tick: u32,
    ) -> Result<StepOutcome, SessionError> {
        self.submit(session, LessonAction::RulerTick(tick))
    }

    /// Renderer callback for a bar segment.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongPhase` outside segment coloring.
    pub fn on_segment_pick(
        &self,
        session: &mut LessonSession,
        index: u32,
    ) -> Result<StepOutcome, SessionError> {
        self.submit(session, LessonAction::Segment(index))
    }

    /// What to ask the tutor about the session's latest graded answer.
    ///
    /// The fallback is the reaction already on screen, so a failed call leaves
    /// the learner looking at the same message instead of a spinner.
    #[must_use]
    pub fn explanation_request(&self, session: &LessonSession) -> Option<ExplanationRequest> {
        Some(ExplanationRequest {
            ticket: session.explanation_ticket()?,
            context: session.explanation_context()?,
            fallback: session.tutor_message().to_string(),
        })
    }

    /// Ask the tutor for an explanation, bounded by the tutor timeout.
    ///
    /// Never fails: errors and timeouts yield the request's fallback text.
    /// No retry is attempted.
    pub async fn explain(&self, request: ExplanationRequest) -> Explanation {
        let ExplanationRequest {
            ticket,
            context,
            fallback,
        } = request;
        match self.bounded(self.tutor.explain(&context)).await {
            Ok(text) => Explanation {
                ticket,
                text,
                source: ExplanationSource::Tutor,
            },
            Err(err) => {
                warn!(
                    session = %ticket.session_id(),
                    attempt = ticket.attempt(),
                    error = %err,
                    "explanation unavailable, keeping hint"
                );
                Explanation {
                    ticket,
                    text: fallback,
                    source: ExplanationSource::Fallback,
                }
            }
        }
    }

    /// Menu greeting, or `DEFAULT_GREETING` if the tutor cannot provide one.
    pub async fn greeting(&self) -> String {
        match self.bounded(self.tutor.greeting()).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "greeting unavailable, using default");
                DEFAULT_GREETING.to_string()
            }
        }
    }

    async fn bounded<F>(&self, call: F) -> Result<String, TutorError>
    where
        F: Future<Output = Result<String, TutorError>>,
    {
        timeout(self.tutor_timeout, call)
            .await
            .map_err(|_| TutorError::Timeout)?
    }

    fn narrate(&self, session: &mut LessonSession, result: &Result<StepOutcome, SessionError>) {
        let message = match result {
            Ok(StepOutcome::Advanced { hint, .. }) => format!("{} {hint}", self.react(true)),
            Ok(StepOutcome::Graded { outcome, .. }) => {
                let elapsed = session
                    .resolved_at()
                    .map(|at| (at - session.started_at()).num_seconds())
                    .unwrap_or_default();
                info!(
                    session = %session.id(),
                    outcome,
                    attempt = session.attempts(),
                    elapsed_secs = elapsed,
                    "final answer checked"
                );
                self.react(*outcome).to_string()
            }
            Ok(step) => match step.hint() {
                Some(hint) => hint.to_string(),
                None => return,
            },
            Err(err @ SessionError::Malformed { .. }) => err.to_string(),
            Err(_) => return,
        };
        session.set_tutor_message(message);
    }

    fn react(&self, correct: bool) -> &'static str {
        self.hints
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pick(correct)
    }
}

impl std::fmt::Debug for LessonLoopService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LessonLoopService")
            .field("clock", &self.clock)
            .field("next_id", &self.next_id)
            .field("tutor_timeout", &self.tutor_timeout)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
