use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use fraction_core::model::{LessonKind, Problem, SubKind};

/// Where a lesson session stands.
///
/// Which variants a session visits depends on the problem:
///
/// - naming: `Grouping` -> `FractionInput` -> `Resolved`
/// - value finding, discrete: `UnitValue` -> `ValueInput` -> `Resolved`
/// - value finding, length: `RulerPartition` -> `SegmentColoring` -> `ValueInput` -> `Resolved`
///
/// `Resolved { outcome: false }` still accepts a corrected final answer;
/// `Resolved { outcome: true }` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase")]
pub enum Phase {
    Grouping,
    FractionInput,
    UnitValue,
    RulerPartition,
    SegmentColoring,
    ValueInput,
    Resolved { outcome: bool },
}

impl Phase {
    /// The phase a fresh session for `problem` starts in.
    #[must_use]
    pub fn initial(problem: &Problem) -> Self {
        match (problem.lesson_kind(), problem.sub_kind()) {
            (LessonKind::Naming, _) => Phase::Grouping,
            (LessonKind::ValueFinding, SubKind::Discrete) => Phase::UnitValue,
            (LessonKind::ValueFinding, SubKind::Length) => Phase::RulerPartition,
        }
    }

    #[must_use]
    pub const fn is_initial(&self) -> bool {
        matches!(
            self,
            Phase::Grouping | Phase::UnitValue | Phase::RulerPartition
        )
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Phase::Resolved { .. })
    }

    /// Returns `true` once nothing more can be submitted for the problem.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Phase::Resolved { outcome: true })
    }

    /// Fields the learner may edit in this phase.
    #[must_use]
    pub fn enabled_fields(&self, lesson_kind: LessonKind) -> BTreeSet<InputField> {
        let fields: &[InputField] = match self {
            Phase::Grouping => &[InputField::GroupCount],
            Phase::UnitValue => &[InputField::UnitValue],
            Phase::RulerPartition => &[InputField::RulerTick],
            Phase::SegmentColoring => &[InputField::Segment],
            Phase::FractionInput => &[InputField::Numerator, InputField::Denominator],
            Phase::ValueInput => &[InputField::Value],
            Phase::Resolved { outcome: true } => &[],
            Phase::Resolved { outcome: false } => InputField::final_answer(lesson_kind),
        };
        fields.iter().copied().collect()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Grouping => f.write_str("grouping"),
            Phase::FractionInput => f.write_str("fraction input"),
            Phase::UnitValue => f.write_str("unit value"),
            Phase::RulerPartition => f.write_str("ruler partition"),
            Phase::SegmentColoring => f.write_str("segment coloring"),
            Phase::ValueInput => f.write_str("value input"),
            Phase::Resolved { outcome } => write!(f, "resolved ({})", outcome_label(*outcome)),
        }
    }
}

fn outcome_label(outcome: bool) -> &'static str {
    if outcome { "correct" } else { "incorrect" }
}

/// A learner-facing input slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    GroupCount,
    Numerator,
    Denominator,
    UnitValue,
    RulerTick,
    Segment,
    Value,
}

impl InputField {
    /// Fields that make up the final answer of a lesson.
    #[must_use]
    pub fn final_answer(lesson_kind: LessonKind) -> &'static [InputField] {
        match lesson_kind {
            LessonKind::Naming => &[InputField::Numerator, InputField::Denominator],
            LessonKind::ValueFinding => &[InputField::Value],
        }
    }

    /// Typed fields hold raw learner text; picks come from the renderer.
    #[must_use]
    pub const fn is_typed(&self) -> bool {
        !matches!(self, InputField::RulerTick | InputField::Segment)
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputField::GroupCount => "group count",
            InputField::Numerator => "numerator",
            InputField::Denominator => "denominator",
            InputField::UnitValue => "unit value",
            InputField::RulerTick => "ruler tick",
            InputField::Segment => "segment",
            InputField::Value => "value",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraction_core::model::Draw;

    #[test]
    fn initial_phase_per_lesson() {
        let naming = Problem::from_draw(LessonKind::Naming, Draw::discrete(4, 3, 2)).unwrap();
        let discrete =
            Problem::from_draw(LessonKind::ValueFinding, Draw::discrete(4, 3, 2)).unwrap();
        let length = Problem::from_draw(LessonKind::ValueFinding, Draw::length(2, 4, 3)).unwrap();

        assert_eq!(Phase::initial(&naming), Phase::Grouping);
        assert_eq!(Phase::initial(&discrete), Phase::UnitValue);
        assert_eq!(Phase::initial(&length), Phase::RulerPartition);
    }

    #[test]
    fn only_correct_resolution_is_terminal() {
        assert!(Phase::Resolved { outcome: true }.is_terminal());
        assert!(!Phase::Resolved { outcome: false }.is_terminal());
        assert!(Phase::Resolved { outcome: false }.is_resolved());
        assert!(!Phase::ValueInput.is_terminal());
    }

    #[test]
    fn failed_resolution_keeps_final_fields_open() {
        let naming = Phase::Resolved { outcome: false }.enabled_fields(LessonKind::Naming);
        assert!(naming.contains(&InputField::Numerator));
        assert!(naming.contains(&InputField::Denominator));

        let value = Phase::Resolved { outcome: false }.enabled_fields(LessonKind::ValueFinding);
        assert_eq!(value.into_iter().collect::<Vec<_>>(), vec![InputField::Value]);

        assert!(
            Phase::Resolved { outcome: true }
                .enabled_fields(LessonKind::Naming)
                .is_empty()
        );
    }

    #[test]
    fn phase_serializes_with_tag() {
        let json = serde_json::to_value(Phase::Resolved { outcome: true }).unwrap();
        assert_eq!(json["phase"], "resolved");
        assert_eq!(json["outcome"], true);
    }
}
