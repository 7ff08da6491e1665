mod fraction;
mod ids;
mod problem;

pub use fraction::Fraction;
pub use ids::SessionId;
pub use problem::{
    Draw, GROUP_SIZES, ItemGlyph, LessonKind, MAX_TOTAL_ITEMS, MIN_TOTAL_GROUPS, Problem,
    ProblemError, SubKind,
};
