use serde::Serialize;
use std::collections::BTreeSet;

use fraction_core::model::Problem;

use super::phase::{InputField, Phase};
use super::service::LessonSession;

/// Everything a renderer needs to draw a session.
///
/// Derived on demand and never stored, so the renderer cannot drift from the
/// session. It carries no correctness logic: whether an answer is right is
/// decided only by the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LessonView {
    pub problem: Problem,
    pub phase: Phase,
    pub is_partitioned: bool,
    pub active_segments: u32,
    pub inputs_enabled: BTreeSet<InputField>,
    pub outcome: Option<bool>,
    pub tutor_message: String,
}

impl LessonView {
    #[must_use]
    pub fn from_session(session: &LessonSession) -> Self {
        Self {
            problem: *session.problem(),
            phase: session.phase(),
            is_partitioned: session.is_partitioned(),
            active_segments: session.active_segments(),
            inputs_enabled: session.enabled_fields(),
            outcome: session.outcome(),
            tutor_message: session.tutor_message().to_string(),
        }
    }

    /// Ruler marks the learner may pick, `1..=total` on a length problem.
    #[must_use]
    pub fn selectable_ticks(&self) -> Option<std::ops::RangeInclusive<u32>> {
        (self.inputs_enabled.contains(&InputField::RulerTick))
            .then(|| 1..=self.problem.total_items())
    }

    /// Whether segment `index` is drawn as colored.
    #[must_use]
    pub fn is_segment_colored(&self, index: u32) -> bool {
        index < self.active_segments
    }
}
