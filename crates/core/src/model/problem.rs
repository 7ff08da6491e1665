use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::fraction::Fraction;

/// Items per group the generator may draw from.
pub const GROUP_SIZES: [u32; 4] = [2, 3, 4, 5];
/// Upper bound on the size of the whole, in items or centimetres.
pub const MAX_TOTAL_ITEMS: u32 = 20;
/// Smallest denominator a problem may have.
pub const MIN_TOTAL_GROUPS: u32 = 2;

//
// ─── KINDS ─────────────────────────────────────────────────────────────────────
//

/// Which lesson a problem belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonKind {
    /// Group the items, then name the part as a fraction of the whole.
    Naming,
    /// Find the unit value, then the value of the fraction of the whole.
    ValueFinding,
}

impl fmt::Display for LessonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LessonKind::Naming => f.write_str("naming"),
            LessonKind::ValueFinding => f.write_str("value finding"),
        }
    }
}

/// Whether the whole is a set of countable items or a length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubKind {
    Discrete,
    Length,
}

/// Cosmetic tag for how the whole is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemGlyph {
    Orange,
    Apple,
    Strawberry,
    Star,
    Ruler,
}

impl ItemGlyph {
    /// Glyphs a discrete problem may be drawn with.
    pub const DISCRETE: [ItemGlyph; 4] = [
        ItemGlyph::Orange,
        ItemGlyph::Apple,
        ItemGlyph::Strawberry,
        ItemGlyph::Star,
    ];

    #[must_use]
    pub fn suits(self, sub_kind: SubKind) -> bool {
        match sub_kind {
            SubKind::Discrete => self != ItemGlyph::Ruler,
            SubKind::Length => self == ItemGlyph::Ruler,
        }
    }
}

impl fmt::Display for ItemGlyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemGlyph::Orange => "orange",
            ItemGlyph::Apple => "apple",
            ItemGlyph::Strawberry => "strawberry",
            ItemGlyph::Star => "star",
            ItemGlyph::Ruler => "ruler",
        };
        f.write_str(name)
    }
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProblemError {
    #[error("group size {0} is not one of 2, 3, 4, 5")]
    UnsupportedGroupSize(u32),

    #[error("a problem needs at least 2 groups, got {total_groups}")]
    TooFewGroups { total_groups: u32 },

    #[error("the whole may hold at most 20 items, got {total_items}")]
    TooManyItems { total_items: u32 },

    #[error("numerator {target_groups} must lie in 1..{total_groups}")]
    TargetOutOfRange { target_groups: u32, total_groups: u32 },

    #[error("length problems only exist in the value finding lesson")]
    LengthRequiresValueFinding,

    #[error("glyph {glyph} cannot draw a {sub_kind:?} problem")]
    GlyphMismatch { glyph: ItemGlyph, sub_kind: SubKind },
}

//
// ─── DRAW ──────────────────────────────────────────────────────────────────────
//

/// The raw choices a problem is assembled from.
///
/// `ProblemGenerator` produces these from randomness; tests build them by hand
/// to pin a specific problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draw {
    pub group_size: u32,
    pub total_groups: u32,
    pub target_groups: u32,
    pub sub_kind: SubKind,
    pub glyph: ItemGlyph,
}

impl Draw {
    /// A discrete draw with an arbitrary glyph.
    #[must_use]
    pub fn discrete(group_size: u32, total_groups: u32, target_groups: u32) -> Self {
        Self {
            group_size,
            total_groups,
            target_groups,
            sub_kind: SubKind::Discrete,
            glyph: ItemGlyph::Orange,
        }
    }

    /// A length draw; always drawn with the ruler.
    #[must_use]
    pub fn length(group_size: u32, total_groups: u32, target_groups: u32) -> Self {
        Self {
            group_size,
            total_groups,
            target_groups,
            sub_kind: SubKind::Length,
            glyph: ItemGlyph::Ruler,
        }
    }

    fn check(&self, lesson_kind: LessonKind) -> Result<(), ProblemError> {
        if !GROUP_SIZES.contains(&self.group_size) {
            return Err(ProblemError::UnsupportedGroupSize(self.group_size));
        }
        if self.total_groups < MIN_TOTAL_GROUPS {
            return Err(ProblemError::TooFewGroups {
                total_groups: self.total_groups,
            });
        }
        let total_items = self.group_size.saturating_mul(self.total_groups);
        if total_items > MAX_TOTAL_ITEMS {
            return Err(ProblemError::TooManyItems { total_items });
        }
        if self.target_groups == 0 || self.target_groups >= self.total_groups {
            return Err(ProblemError::TargetOutOfRange {
                target_groups: self.target_groups,
                total_groups: self.total_groups,
            });
        }
        if self.sub_kind == SubKind::Length && lesson_kind != LessonKind::ValueFinding {
            return Err(ProblemError::LengthRequiresValueFinding);
        }
        if !self.glyph.suits(self.sub_kind) {
            return Err(ProblemError::GlyphMismatch {
                glyph: self.glyph,
                sub_kind: self.sub_kind,
            });
        }
        Ok(())
    }
}

//
// ─── PROBLEM ───────────────────────────────────────────────────────────────────
//

/// One "part of a whole" fraction problem. Immutable once built.
///
/// The whole is `group_size * total_groups` items (or centimetres). The learner
/// works towards `target_groups / total_groups` of it, whose value is
/// `target_items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Problem {
    lesson_kind: LessonKind,
    sub_kind: SubKind,
    group_size: u32,
    total_groups: u32,
    target_groups: u32,
    glyph: ItemGlyph,
}

impl Problem {
    /// Builds a problem from explicit choices.
    ///
    /// # Errors
    ///
    /// Returns `ProblemError` if the draw would break any problem invariant:
    /// unsupported group size, fewer than two groups, a whole above 20,
    /// a numerator outside `1..total_groups`, a length problem outside the
    /// value finding lesson, or a glyph that does not match the sub kind.
    pub fn from_draw(lesson_kind: LessonKind, draw: Draw) -> Result<Self, ProblemError> {
        draw.check(lesson_kind)?;
        Ok(Self::assemble(lesson_kind, draw))
    }

    /// Builds a problem without checking the draw; the generator only calls
    /// this with draws taken from the valid ranges.
    pub(crate) fn assemble(lesson_kind: LessonKind, draw: Draw) -> Self {
        debug_assert!(draw.check(lesson_kind).is_ok(), "invalid draw: {draw:?}");
        Self {
            lesson_kind,
            sub_kind: draw.sub_kind,
            group_size: draw.group_size,
            total_groups: draw.total_groups,
            target_groups: draw.target_groups,
            glyph: draw.glyph,
        }
    }

    #[must_use]
    pub fn lesson_kind(&self) -> LessonKind {
        self.lesson_kind
    }

    #[must_use]
    pub fn sub_kind(&self) -> SubKind {
        self.sub_kind
    }

    /// Items in one group; the unit value.
    #[must_use]
    pub fn group_size(&self) -> u32 {
        self.group_size
    }

    /// Number of groups; the denominator.
    #[must_use]
    pub fn total_groups(&self) -> u32 {
        self.total_groups
    }

    /// Size of the whole.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.group_size * self.total_groups
    }

    /// Groups taken; the numerator.
    #[must_use]
    pub fn target_groups(&self) -> u32 {
        self.target_groups
    }

    /// The value of the fraction of the whole; the final numeric answer.
    #[must_use]
    pub fn target_items(&self) -> u32 {
        self.target_groups * self.group_size
    }

    #[must_use]
    pub fn glyph(&self) -> ItemGlyph {
        self.glyph
    }

    #[must_use]
    pub fn target_fraction(&self) -> Fraction {
        Fraction::new(self.target_groups, self.total_groups)
    }

    #[must_use]
    pub fn is_length(&self) -> bool {
        self.sub_kind == SubKind::Length
    }
}

impl Serialize for Problem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Problem", 8)?;
        state.serialize_field("lesson_kind", &self.lesson_kind)?;
        state.serialize_field("sub_kind", &self.sub_kind)?;
        state.serialize_field("group_size", &self.group_size)?;
        state.serialize_field("total_groups", &self.total_groups)?;
        state.serialize_field("total_items", &self.total_items())?;
        state.serialize_field("target_groups", &self.target_groups)?;
        state.serialize_field("target_items", &self.target_items())?;
        state.serialize_field("glyph", &self.glyph)?;
        state.end()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
