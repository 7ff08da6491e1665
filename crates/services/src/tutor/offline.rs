use async_trait::async_trait;

use fraction_core::model::{LessonKind, SubKind};

use super::TutorFeedbackService;
use super::context::ExplanationContext;
use crate::error::TutorError;

/// Tutor that explains from templates, for running without network access.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineTutor;

#[async_trait]
impl TutorFeedbackService for OfflineTutor {
    async fn greeting(&self) -> Result<String, TutorError> {
        Ok("Hi! Pick a lesson and let's find fractions together.".to_string())
    }

    async fn explain(&self, context: &ExplanationContext) -> Result<String, TutorError> {
        Ok(explain(context))
    }
}

fn explain(context: &ExplanationContext) -> String {
    if !context.outcome {
        return "Let's check again: how big is one part, and how many parts do we need?"
            .to_string();
    }
    let p = &context.problem;
    let fraction = p.target_fraction();
    let whole = match p.sub_kind() {
        SubKind::Discrete => format!("{} {}s", p.total_items(), p.glyph()),
        SubKind::Length => format!("{} cm", p.total_items()),
    };
    let reasoning = match p.lesson_kind() {
        LessonKind::Naming => format!(
            "{whole} in groups of {} make {} groups, and {} of them is {fraction} of the whole.",
            p.group_size(),
            p.total_groups(),
            p.target_groups(),
        ),
        LessonKind::ValueFinding => format!(
            "{whole} split into {} equal parts gives {} in each part, so {fraction} of it is {} x {} = {}.",
            p.total_groups(),
            p.group_size(),
            p.target_groups(),
            p.group_size(),
            p.target_items(),
        ),
    };
    format!("Correct! {reasoning}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraction_core::model::{Draw, Problem};
    use std::collections::BTreeMap;

    fn context(kind: LessonKind, draw: Draw, outcome: bool) -> ExplanationContext {
        ExplanationContext {
            problem: Problem::from_draw(kind, draw).unwrap(),
            outcome,
            submitted: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn explains_value_finding_with_the_product() {
        let text = OfflineTutor
            .explain(&context(LessonKind::ValueFinding, Draw::length(2, 4, 3), true))
            .await
            .unwrap();
        assert!(text.contains("8 cm"));
        assert!(text.contains("3 x 2 = 6"));
    }

    #[tokio::test]
    async fn explains_naming_with_the_fraction() {
        let text = OfflineTutor
            .explain(&context(LessonKind::Naming, Draw::discrete(4, 3, 2), true))
            .await
            .unwrap();
        assert!(text.contains("2/3"));
        assert!(text.contains("12 oranges"));
    }

    #[tokio::test]
    async fn wrong_answers_are_not_given_away() {
        let text = OfflineTutor
            .explain(&context(LessonKind::ValueFinding, Draw::discrete(4, 3, 2), false))
            .await
            .unwrap();
        assert!(!text.contains('8'));
    }
}
