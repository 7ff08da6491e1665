//! Randomized problem generation.
//!
//! Every draw is taken from a range that is valid by construction, so
//! generation cannot fail: with a group size of at most 5 there are always at
//! least four candidate group counts, and a whole of at least two groups
//! always leaves a numerator in `1..total_groups`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{
    Draw, GROUP_SIZES, ItemGlyph, LessonKind, MAX_TOTAL_ITEMS, MIN_TOTAL_GROUPS, Problem, SubKind,
};

/// Probability that a value finding problem is posed on a ruler.
pub const LENGTH_PROBABILITY: f64 = 0.5;

/// Produces problems from an injectable random source.
#[derive(Debug, Clone)]
pub struct ProblemGenerator<R = StdRng> {
    rng: R,
}

impl ProblemGenerator<StdRng> {
    /// Generator seeded from the operating system.
    #[must_use]
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    /// Deterministic generator for tests and reproducible runs.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ProblemGenerator<R> {
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draws the raw choices for one problem of the given lesson.
    pub fn draw(&mut self, lesson_kind: LessonKind) -> Draw {
        let group_size = GROUP_SIZES[self.rng.random_range(0..GROUP_SIZES.len())];
        let max_groups = MAX_TOTAL_ITEMS / group_size;
        let total_groups = self.rng.random_range(MIN_TOTAL_GROUPS..=max_groups);
        let target_groups = self.rng.random_range(1..total_groups);

        let sub_kind = match lesson_kind {
            LessonKind::Naming => SubKind::Discrete,
            LessonKind::ValueFinding => {
                if self.rng.random_bool(LENGTH_PROBABILITY) {
                    SubKind::Length
                } else {
                    SubKind::Discrete
                }
            }
        };
        let glyph = match sub_kind {
            SubKind::Discrete => {
                ItemGlyph::DISCRETE[self.rng.random_range(0..ItemGlyph::DISCRETE.len())]
            }
            SubKind::Length => ItemGlyph::Ruler,
        };

        Draw {
            group_size,
            total_groups,
            target_groups,
            sub_kind,
            glyph,
        }
    }

    /// Generates a problem for the given lesson.
    pub fn generate(&mut self, lesson_kind: LessonKind) -> Problem {
        Problem::assemble(lesson_kind, self.draw(lesson_kind))
    }
}
