use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::num::IntErrorKind;
use tracing::debug;

use fraction_core::model::{LessonKind, Problem, SessionId};

use super::hint::Hint;
use super::phase::{InputField, Phase};
use crate::error::SessionError;
use crate::tutor::{Explanation, ExplanationContext, ExplanationTicket};

//
// ─── ACTIONS ───────────────────────────────────────────────────────────────────
//

/// One learner submission. Typed answers carry the raw text as entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonAction {
    GroupCount(String),
    Fraction {
        numerator: String,
        denominator: String,
    },
    UnitValue(String),
    RulerTick(u32),
    Segment(u32),
    Value(String),
}

impl LessonAction {
    #[must_use]
    pub fn group_count(raw: impl Into<String>) -> Self {
        Self::GroupCount(raw.into())
    }

    #[must_use]
    pub fn fraction(numerator: impl Into<String>, denominator: impl Into<String>) -> Self {
        Self::Fraction {
            numerator: numerator.into(),
            denominator: denominator.into(),
        }
    }

    #[must_use]
    pub fn unit_value(raw: impl Into<String>) -> Self {
        Self::UnitValue(raw.into())
    }

    #[must_use]
    pub fn value(raw: impl Into<String>) -> Self {
        Self::Value(raw.into())
    }

    /// The field this action fills in.
    #[must_use]
    pub fn field(&self) -> InputField {
        match self {
            LessonAction::GroupCount(_) => InputField::GroupCount,
            LessonAction::Fraction { .. } => InputField::Numerator,
            LessonAction::UnitValue(_) => InputField::UnitValue,
            LessonAction::RulerTick(_) => InputField::RulerTick,
            LessonAction::Segment(_) => InputField::Segment,
            LessonAction::Value(_) => InputField::Value,
        }
    }
}

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// What a well-formed submission did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A gating step succeeded and the session moved on.
    Advanced { to: Phase, hint: Hint },
    /// Wrong answer for a gating step; the phase is unchanged.
    Retry { hint: Hint },
    /// Out-of-range interaction; nothing changed.
    Rejected { hint: Hint },
    /// A segment was colored and more are needed.
    Colored { active_segments: u32, hint: Hint },
    /// A segment that is already colored was picked again.
    Unchanged,
    /// The final answer was graded; the session is now `Resolved`.
    Graded {
        outcome: bool,
        ticket: ExplanationTicket,
    },
}

impl StepOutcome {
    #[must_use]
    pub fn hint(&self) -> Option<Hint> {
        match self {
            StepOutcome::Advanced { hint, .. }
            | StepOutcome::Retry { hint }
            | StepOutcome::Rejected { hint }
            | StepOutcome::Colored { hint, .. } => Some(*hint),
            StepOutcome::Unchanged | StepOutcome::Graded { .. } => None,
        }
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One learner working through one problem.
///
/// All progress lives here: the phase, the raw text of the fields the phase
/// cares about, the colored segment count and the final outcome. A session is
/// never reset; "next problem" replaces it with a new one.
#[derive(Debug, Clone)]
pub struct LessonSession {
    id: SessionId,
    problem: Problem,
    phase: Phase,
    inputs: BTreeMap<InputField, String>,
    active_segments: u32,
    outcome: Option<bool>,
    attempts: u32,
    started_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
    tutor_message: String,
}

impl LessonSession {
    /// Create a session in the problem's initial phase.
    ///
    /// `started_at` should come from the services layer clock.
    #[must_use]
    pub fn new(id: SessionId, problem: Problem, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            problem,
            phase: Phase::initial(&problem),
            inputs: BTreeMap::new(),
            active_segments: 0,
            outcome: None,
            attempts: 0,
            started_at,
            resolved_at: None,
            tutor_message: String::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn active_segments(&self) -> u32 {
        self.active_segments
    }

    /// Result of the latest final check, if any.
    #[must_use]
    pub fn outcome(&self) -> Option<bool> {
        self.outcome
    }

    /// Number of graded final answers.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    #[must_use]
    pub fn inputs(&self) -> &BTreeMap<InputField, String> {
        &self.inputs
    }

    #[must_use]
    pub fn input(&self, field: InputField) -> Option<&str> {
        self.inputs.get(&field).map(String::as_str)
    }

    #[must_use]
    pub fn tutor_message(&self) -> &str {
        &self.tutor_message
    }

    pub fn set_tutor_message(&mut self, message: impl Into<String>) {
        self.tutor_message = message.into();
    }

    /// Past the first gating step of the flow.
    #[must_use]
    pub fn is_partitioned(&self) -> bool {
        !self.phase.is_initial()
    }

    /// Edit the draft text of a field without submitting it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyResolved` after a correct final answer and
    /// `SessionError::InputLocked` if the field is not editable in this phase.
    pub fn update_input(
        &mut self,
        field: InputField,
        text: impl Into<String>,
    ) -> Result<(), SessionError> {
        if self.phase.is_terminal() {
            return Err(SessionError::AlreadyResolved);
        }
        if !field.is_typed() || !self.enabled_fields().contains(&field) {
            return Err(SessionError::InputLocked {
                field,
                phase: self.phase,
            });
        }
        self.inputs.insert(field, text.into());
        Ok(())
    }

    #[must_use]
    pub fn enabled_fields(&self) -> BTreeSet<InputField> {
        self.phase.enabled_fields(self.problem.lesson_kind())
    }

    /// Submit the drafts of the current phase.
    ///
    /// # Errors
    ///
    /// Same as [`LessonSession::apply`]. Phases driven by picks rather than
    /// typed text return `SessionError::WrongPhase`.
    pub fn check(&mut self, at: DateTime<Utc>) -> Result<StepOutcome, SessionError> {
        // A field with no draft is malformed and stays absent from the inputs.
        let draft = |field| {
            self.input(field)
                .map(str::to_string)
                .ok_or(SessionError::Malformed {
                    field,
                    raw: String::new(),
                })
        };
        let action = match self.phase {
            Phase::Grouping => LessonAction::GroupCount(draft(InputField::GroupCount)?),
            Phase::UnitValue => LessonAction::UnitValue(draft(InputField::UnitValue)?),
            Phase::FractionInput => LessonAction::Fraction {
                numerator: draft(InputField::Numerator)?,
                denominator: draft(InputField::Denominator)?,
            },
            Phase::ValueInput => LessonAction::Value(draft(InputField::Value)?),
            Phase::Resolved { outcome: false } => match self.problem.lesson_kind() {
                LessonKind::Naming => LessonAction::Fraction {
                    numerator: draft(InputField::Numerator)?,
                    denominator: draft(InputField::Denominator)?,
                },
                LessonKind::ValueFinding => LessonAction::Value(draft(InputField::Value)?),
            },
            Phase::Resolved { outcome: true } => return Err(SessionError::AlreadyResolved),
            Phase::RulerPartition => {
                return Err(SessionError::WrongPhase {
                    field: InputField::RulerTick,
                    phase: self.phase,
                });
            }
            Phase::SegmentColoring => {
                return Err(SessionError::WrongPhase {
                    field: InputField::Segment,
                    phase: self.phase,
                });
            }
        };
        self.apply(action, at)
    }

    /// Validate one submission against the current phase.
    ///
    /// `at` should come from the services layer clock; it is recorded as the
    /// resolution time when the submission is a graded final answer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyResolved` after a correct final answer,
    /// `SessionError::WrongPhase` if the action does not belong to this phase,
    /// and `SessionError::Malformed` if typed text is not an integer.
    /// The session is unchanged in every error case apart from the raw text
    /// being kept as the field's draft.
    pub fn apply(
        &mut self,
        action: LessonAction,
        at: DateTime<Utc>,
    ) -> Result<StepOutcome, SessionError> {
        if self.phase.is_terminal() {
            return Err(SessionError::AlreadyResolved);
        }
        let lesson_kind = self.problem.lesson_kind();
        let retry_open = self.phase == Phase::Resolved { outcome: false };

        match action {
            LessonAction::GroupCount(raw) if self.phase == Phase::Grouping => {
                let guess = self.record(InputField::GroupCount, raw)?;
                if same(guess, self.problem.total_groups()) {
                    Ok(self.advance(
                        Phase::FractionInput,
                        Hint::WriteFraction {
                            total_groups: self.problem.total_groups(),
                        },
                    ))
                } else {
                    Ok(StepOutcome::Retry {
                        hint: Hint::GroupBy {
                            total_items: self.problem.total_items(),
                            group_size: self.problem.group_size(),
                        },
                    })
                }
            }
            LessonAction::Fraction {
                numerator,
                denominator,
            } if self.phase == Phase::FractionInput
                || (retry_open && lesson_kind == LessonKind::Naming) =>
            {
                let numerator = self.record(InputField::Numerator, numerator);
                let denominator = self.record(InputField::Denominator, denominator);
                let (numerator, denominator) = (numerator?, denominator?);
                let target = self.problem.target_fraction();
                let correct =
                    same(numerator, target.numerator) && same(denominator, target.denominator);
                Ok(self.grade(correct, at))
            }
            LessonAction::UnitValue(raw) if self.phase == Phase::UnitValue => {
                let guess = self.record(InputField::UnitValue, raw)?;
                if same(guess, self.problem.group_size()) {
                    Ok(self.advance(
                        Phase::ValueInput,
                        Hint::FindValue {
                            target_groups: self.problem.target_groups(),
                            total_groups: self.problem.total_groups(),
                        },
                    ))
                } else {
                    Ok(StepOutcome::Retry {
                        hint: Hint::ShareEqually {
                            total_items: self.problem.total_items(),
                            total_groups: self.problem.total_groups(),
                        },
                    })
                }
            }
            LessonAction::RulerTick(tick) if self.phase == Phase::RulerPartition => {
                Ok(self.pick_tick(tick))
            }
            LessonAction::Segment(index) if self.phase == Phase::SegmentColoring => {
                Ok(self.pick_segment(index))
            }
            LessonAction::Value(raw)
                if self.phase == Phase::ValueInput
                    || (retry_open && lesson_kind == LessonKind::ValueFinding) =>
            {
                let value = self.record(InputField::Value, raw)?;
                Ok(self.grade(same(value, self.problem.target_items()), at))
            }
            other => Err(SessionError::WrongPhase {
                field: other.field(),
                phase: self.phase,
            }),
        }
    }

    /// The ticket of the latest graded attempt.
    #[must_use]
    pub fn explanation_ticket(&self) -> Option<ExplanationTicket> {
        (self.attempts > 0).then(|| ExplanationTicket::new(self.id, self.attempts))
    }

    /// What the tutor needs to explain the latest graded attempt.
    #[must_use]
    pub fn explanation_context(&self) -> Option<ExplanationContext> {
        let outcome = self.outcome?;
        Some(ExplanationContext {
            problem: self.problem,
            outcome,
            submitted: self.inputs.clone(),
        })
    }

    /// Show an explanation if it was asked for this session's latest attempt.
    ///
    /// Returns `false` and leaves the session untouched otherwise.
    pub fn apply_explanation(&mut self, explanation: &Explanation) -> bool {
        if self.explanation_ticket() != Some(explanation.ticket) {
            debug!(
                session = %self.id,
                ticket_session = %explanation.ticket.session_id(),
                ticket_attempt = explanation.ticket.attempt(),
                "discarding stale explanation"
            );
            return false;
        }
        self.tutor_message.clone_from(&explanation.text);
        true
    }

    /// Keep the raw text as the field's draft and read it as an integer.
    ///
    /// `None` is an integer too large for `i64`: well formed, never correct.
    fn record(&mut self, field: InputField, raw: String) -> Result<Option<i64>, SessionError> {
        let parsed = raw.trim().parse::<i64>();
        self.inputs.insert(field, raw.clone());
        match parsed {
            Ok(value) => Ok(Some(value)),
            Err(err)
                if matches!(
                    err.kind(),
                    IntErrorKind::PosOverflow | IntErrorKind::NegOverflow
                ) =>
            {
                Ok(None)
            }
            Err(_) => Err(SessionError::Malformed { field, raw }),
        }
    }

    fn pick_tick(&mut self, tick: u32) -> StepOutcome {
        let total_length = self.problem.total_items();
        if tick == 0 || tick > total_length {
            return StepOutcome::Rejected {
                hint: Hint::TickOffRuler { tick, total_length },
            };
        }
        if tick == self.problem.group_size() {
            self.advance(
                Phase::SegmentColoring,
                Hint::ColorSegments {
                    unit_length: tick,
                    target_groups: self.problem.target_groups(),
                },
            )
        } else {
            StepOutcome::Retry {
                hint: Hint::SplitRuler {
                    total_length,
                    total_groups: self.problem.total_groups(),
                },
            }
        }
    }

    fn pick_segment(&mut self, index: u32) -> StepOutcome {
        let target = self.problem.target_groups();
        let count = index.saturating_add(1);
        if count > target {
            return StepOutcome::Rejected {
                hint: Hint::TooManySegments {
                    target_groups: target,
                },
            };
        }
        if count <= self.active_segments {
            return StepOutcome::Unchanged;
        }

        self.active_segments = count;
        if count == target {
            self.advance(
                Phase::ValueInput,
                Hint::MeasureColored {
                    target_groups: target,
                },
            )
        } else {
            StepOutcome::Colored {
                active_segments: count,
                hint: Hint::KeepColoring {
                    remaining: target - count,
                },
            }
        }
    }

    fn advance(&mut self, to: Phase, hint: Hint) -> StepOutcome {
        debug!(session = %self.id, from = %self.phase, to = %to, "phase transition");
        if to == Phase::SegmentColoring {
            self.active_segments = 0;
        }
        self.phase = to;
        let enabled = self.enabled_fields();
        self.inputs.retain(|field, _| enabled.contains(field));
        StepOutcome::Advanced { to, hint }
    }

    fn grade(&mut self, outcome: bool, at: DateTime<Utc>) -> StepOutcome {
        self.attempts = self.attempts.saturating_add(1);
        self.outcome = Some(outcome);
        self.phase = Phase::Resolved { outcome };
        self.resolved_at = Some(at);
        debug!(session = %self.id, outcome, attempt = self.attempts, "final answer graded");
        StepOutcome::Graded {
            outcome,
            ticket: ExplanationTicket::new(self.id, self.attempts),
        }
    }
}

/// Whether a typed integer equals a problem value.
fn same(typed: Option<i64>, expected: u32) -> bool {
    typed == Some(i64::from(expected))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tutor::ExplanationSource;
    use fraction_core::model::Draw;
    use fraction_core::time::fixed_now;

    fn session(kind: LessonKind, draw: Draw) -> LessonSession {
        let problem = Problem::from_draw(kind, draw).unwrap();
        LessonSession::new(SessionId::new(1), problem, fixed_now())
    }

    fn naming() -> LessonSession {
        session(LessonKind::Naming, Draw::discrete(4, 3, 2))
    }

    fn discrete() -> LessonSession {
        session(LessonKind::ValueFinding, Draw::discrete(4, 3, 2))
    }

    fn length() -> LessonSession {
        session(LessonKind::ValueFinding, Draw::length(2, 4, 3))
    }

    #[test]
    fn naming_flow_accepts_groups_then_fraction() {
        let mut s = naming();
        assert_eq!(s.phase(), Phase::Grouping);

        let step = s.apply(LessonAction::group_count("3"), fixed_now()).unwrap();
        assert!(matches!(
            step,
            StepOutcome::Advanced {
                to: Phase::FractionInput,
                ..
            }
        ));
        assert!(s.is_partitioned());

        let step = s.apply(LessonAction::fraction("2", "3"), fixed_now()).unwrap();
        assert!(matches!(step, StepOutcome::Graded { outcome: true, .. }));
        assert_eq!(s.outcome(), Some(true));
        assert_eq!(s.phase(), Phase::Resolved { outcome: true });
        assert_eq!(s.resolved_at(), Some(fixed_now()));
    }

    #[test]
    fn wrong_group_count_only_hints() {
        let mut s = naming();
        let step = s.apply(LessonAction::group_count("4"), fixed_now()).unwrap();
        assert_eq!(
            step,
            StepOutcome::Retry {
                hint: Hint::GroupBy {
                    total_items: 12,
                    group_size: 4
                }
            }
        );
        assert_eq!(s.phase(), Phase::Grouping);
        assert_eq!(s.outcome(), None);
    }

    #[test]
    fn malformed_group_count_keeps_phase() {
        let mut s = naming();
        let err = s.apply(LessonAction::group_count("three"), fixed_now()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Malformed {
                field: InputField::GroupCount,
                ..
            }
        ));
        assert_eq!(s.phase(), Phase::Grouping);
        assert_eq!(s.input(InputField::GroupCount), Some("three"));
    }

    #[test]
    fn wrong_fraction_allows_retry() {
        let mut s = naming();
        s.apply(LessonAction::group_count("3"), fixed_now()).unwrap();

        let step = s.apply(LessonAction::fraction("3", "2"), fixed_now()).unwrap();
        assert!(matches!(step, StepOutcome::Graded { outcome: false, .. }));
        assert_eq!(s.phase(), Phase::Resolved { outcome: false });
        assert!(s.enabled_fields().contains(&InputField::Numerator));

        let step = s.apply(LessonAction::fraction("2", "3"), fixed_now()).unwrap();
        assert!(matches!(step, StepOutcome::Graded { outcome: true, .. }));
        assert_eq!(s.attempts(), 2);
    }

    #[test]
    fn malformed_fraction_sets_no_outcome() {
        let mut s = naming();
        s.apply(LessonAction::group_count("3"), fixed_now()).unwrap();
        let err = s.apply(LessonAction::fraction("2", ""), fixed_now()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Malformed {
                field: InputField::Denominator,
                ..
            }
        ));
        assert_eq!(s.outcome(), None);
        assert_eq!(s.phase(), Phase::FractionInput);
        assert_eq!(s.attempts(), 0);
    }

    #[test]
    fn out_of_range_integers_are_wrong_not_malformed() {
        let mut s = naming();
        let step = s.apply(LessonAction::group_count("-3"), fixed_now()).unwrap();
        assert!(matches!(step, StepOutcome::Retry { .. }));
        s.apply(LessonAction::group_count("3"), fixed_now()).unwrap();

        let step = s.apply(LessonAction::fraction("-1", "3"), fixed_now()).unwrap();
        assert!(matches!(step, StepOutcome::Graded { outcome: false, .. }));
        assert_eq!(s.attempts(), 1);

        let step = s
            .apply(LessonAction::fraction("2", "4294967296"), fixed_now())
            .unwrap();
        assert!(matches!(step, StepOutcome::Graded { outcome: false, .. }));

        let step = s
            .apply(
                LessonAction::fraction("-99999999999999999999999", "3"),
                fixed_now(),
            )
            .unwrap();
        assert!(matches!(step, StepOutcome::Graded { outcome: false, .. }));
        assert_eq!(s.attempts(), 3);
        assert_eq!(s.phase(), Phase::Resolved { outcome: false });

        let step = s.apply(LessonAction::fraction("+2", "3"), fixed_now()).unwrap();
        assert!(matches!(step, StepOutcome::Graded { outcome: true, .. }));
    }

    #[test]
    fn negative_unit_and_final_values_follow_retry_and_grade() {
        let mut s = discrete();
        let step = s.apply(LessonAction::unit_value("-4"), fixed_now()).unwrap();
        assert!(matches!(step, StepOutcome::Retry { .. }));
        s.apply(LessonAction::unit_value("4"), fixed_now()).unwrap();

        let step = s.apply(LessonAction::value("-8"), fixed_now()).unwrap();
        assert!(matches!(step, StepOutcome::Graded { outcome: false, .. }));
        assert_eq!(s.outcome(), Some(false));
    }

    #[test]
    fn missing_drafts_stay_out_of_the_submitted_answer() {
        let mut s = discrete();
        s.update_input(InputField::UnitValue, "4").unwrap();
        s.check(fixed_now()).unwrap();
        assert_eq!(s.phase(), Phase::ValueInput);

        let err = s.check(fixed_now()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Malformed {
                field: InputField::Value,
                ..
            }
        ));
        assert!(s.inputs().is_empty());

        s.update_input(InputField::Value, "7").unwrap();
        s.check(fixed_now()).unwrap();
        let context = s.explanation_context().unwrap();
        assert_eq!(
            context.submitted.values().cloned().collect::<Vec<_>>(),
            vec!["7".to_string()]
        );
    }

    #[test]
    fn discrete_value_flow() {
        let mut s = discrete();
        assert_eq!(s.phase(), Phase::UnitValue);

        let step = s.apply(LessonAction::unit_value("3"), fixed_now()).unwrap();
        assert!(matches!(
            step,
            StepOutcome::Retry {
                hint: Hint::ShareEqually {
                    total_items: 12,
                    total_groups: 3
                }
            }
        ));

        s.apply(LessonAction::unit_value("4"), fixed_now()).unwrap();
        assert_eq!(s.phase(), Phase::ValueInput);

        let step = s.apply(LessonAction::value("8"), fixed_now()).unwrap();
        assert!(matches!(step, StepOutcome::Graded { outcome: true, .. }));
    }

    #[test]
    fn discrete_wrong_value_is_graded_false() {
        let mut s = discrete();
        s.apply(LessonAction::unit_value("4"), fixed_now()).unwrap();
        let step = s.apply(LessonAction::value("9"), fixed_now()).unwrap();
        assert!(matches!(step, StepOutcome::Graded { outcome: false, .. }));
        assert_eq!(s.outcome(), Some(false));
    }

    #[test]
    fn length_flow_colors_then_measures() {
        let mut s = length();
        assert_eq!(s.phase(), Phase::RulerPartition);
        assert!(!s.is_partitioned());

        let step = s.apply(LessonAction::RulerTick(3), fixed_now()).unwrap();
        assert!(matches!(step, StepOutcome::Retry { .. }));

        s.apply(LessonAction::RulerTick(2), fixed_now()).unwrap();
        assert_eq!(s.phase(), Phase::SegmentColoring);
        assert_eq!(s.active_segments(), 0);

        let step = s.apply(LessonAction::Segment(3), fixed_now()).unwrap();
        assert_eq!(
            step,
            StepOutcome::Rejected {
                hint: Hint::TooManySegments { target_groups: 3 }
            }
        );
        assert_eq!(s.active_segments(), 0);

        s.apply(LessonAction::Segment(0), fixed_now()).unwrap();
        assert_eq!(s.active_segments(), 1);
        s.apply(LessonAction::Segment(1), fixed_now()).unwrap();
        assert_eq!(s.active_segments(), 2);
        assert_eq!(s.phase(), Phase::SegmentColoring);

        let step = s.apply(LessonAction::Segment(2), fixed_now()).unwrap();
        assert!(matches!(
            step,
            StepOutcome::Advanced {
                to: Phase::ValueInput,
                ..
            }
        ));
        assert_eq!(s.active_segments(), 3);

        let step = s.apply(LessonAction::value("6"), fixed_now()).unwrap();
        assert!(matches!(step, StepOutcome::Graded { outcome: true, .. }));
    }

    #[test]
    fn repeated_segment_is_a_no_op() {
        let mut s = length();
        s.apply(LessonAction::RulerTick(2), fixed_now()).unwrap();
        s.apply(LessonAction::Segment(1), fixed_now()).unwrap();
        assert_eq!(s.active_segments(), 2);

        assert_eq!(
            s.apply(LessonAction::Segment(1), fixed_now()).unwrap(),
            StepOutcome::Unchanged
        );
        assert_eq!(
            s.apply(LessonAction::Segment(0), fixed_now()).unwrap(),
            StepOutcome::Unchanged
        );
        assert_eq!(s.active_segments(), 2);
    }

    #[test]
    fn ticks_off_the_ruler_are_rejected() {
        let mut s = length();
        for tick in [0, 9, 100] {
            let step = s.apply(LessonAction::RulerTick(tick), fixed_now()).unwrap();
            assert!(matches!(step, StepOutcome::Rejected { .. }));
        }
        assert_eq!(s.phase(), Phase::RulerPartition);
    }

    #[test]
    fn actions_outside_their_phase_are_refused() {
        let mut s = naming();
        let err = s.apply(LessonAction::value("8"), fixed_now()).unwrap_err();
        assert_eq!(
            err,
            SessionError::WrongPhase {
                field: InputField::Value,
                phase: Phase::Grouping
            }
        );

        let mut s = discrete();
        s.apply(LessonAction::unit_value("4"), fixed_now()).unwrap();
        s.apply(LessonAction::value("1"), fixed_now()).unwrap();
        let err = s.apply(LessonAction::fraction("2", "3"), fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::WrongPhase { .. }));
    }

    #[test]
    fn correct_resolution_locks_the_session() {
        let mut s = discrete();
        s.apply(LessonAction::unit_value("4"), fixed_now()).unwrap();
        s.apply(LessonAction::value("8"), fixed_now()).unwrap();

        assert_eq!(
            s.apply(LessonAction::value("9"), fixed_now()).unwrap_err(),
            SessionError::AlreadyResolved
        );
        assert_eq!(
            s.update_input(InputField::Value, "9").unwrap_err(),
            SessionError::AlreadyResolved
        );
        assert_eq!(s.outcome(), Some(true));
    }

    #[test]
    fn drafts_are_checked_per_phase() {
        let mut s = naming();
        let err = s.update_input(InputField::Numerator, "2").unwrap_err();
        assert!(matches!(err, SessionError::InputLocked { .. }));

        s.update_input(InputField::GroupCount, " 3 ").unwrap();
        s.check(fixed_now()).unwrap();
        assert_eq!(s.phase(), Phase::FractionInput);
        assert!(s.inputs().is_empty());

        s.update_input(InputField::Numerator, "2").unwrap();
        let err = s.check(fixed_now()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Malformed {
                field: InputField::Denominator,
                ..
            }
        ));
        assert_eq!(s.input(InputField::Denominator), None);

        s.update_input(InputField::Denominator, "3").unwrap();
        let step = s.check(fixed_now()).unwrap();
        assert!(matches!(step, StepOutcome::Graded { outcome: true, .. }));
    }

    #[test]
    fn picks_cannot_be_checked_from_drafts() {
        let mut s = length();
        assert!(matches!(
            s.check(fixed_now()).unwrap_err(),
            SessionError::WrongPhase {
                field: InputField::RulerTick,
                ..
            }
        ));
        assert!(matches!(
            s.update_input(InputField::RulerTick, "2").unwrap_err(),
            SessionError::InputLocked { .. }
        ));
    }

    #[test]
    fn explanation_applies_only_to_latest_attempt() {
        let mut s = discrete();
        s.apply(LessonAction::unit_value("4"), fixed_now()).unwrap();
        assert_eq!(s.explanation_ticket(), None);

        s.apply(LessonAction::value("7"), fixed_now()).unwrap();
        let first = s.explanation_ticket().unwrap();
        s.apply(LessonAction::value("8"), fixed_now()).unwrap();
        let second = s.explanation_ticket().unwrap();
        assert_ne!(first, second);

        let stale = Explanation {
            ticket: first,
            text: "old".into(),
            source: ExplanationSource::Tutor,
        };
        assert!(!s.apply_explanation(&stale));

        let fresh = Explanation {
            ticket: second,
            text: "new".into(),
            source: ExplanationSource::Tutor,
        };
        assert!(s.apply_explanation(&fresh));
        assert_eq!(s.tutor_message(), "new");
    }

    #[test]
    fn explanation_context_records_submission() {
        let mut s = naming();
        assert!(s.explanation_context().is_none());
        s.apply(LessonAction::group_count("3"), fixed_now()).unwrap();
        s.apply(LessonAction::fraction("1", "3"), fixed_now()).unwrap();

        let context = s.explanation_context().unwrap();
        assert!(!context.outcome);
        assert_eq!(context.submitted.get(&InputField::Numerator).unwrap(), "1");
        assert_eq!(context.submitted.get(&InputField::Denominator).unwrap(), "3");
        assert!(!context.submitted.contains_key(&InputField::GroupCount));
    }
}
