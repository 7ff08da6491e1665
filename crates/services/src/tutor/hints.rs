use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const PRAISE: [&str; 5] = [
    "Great job!",
    "You got it!",
    "Excellent!",
    "That's right!",
    "Wonderful!",
];

const ENCOURAGEMENT: [&str; 4] = [
    "Not yet, let's look again.",
    "Close! Check the groups once more.",
    "Let's think it through together.",
    "Try counting one group first.",
];

/// Local pool of short reactions, keyed only by correctness.
#[derive(Debug, Clone)]
pub struct HintPool {
    rng: StdRng,
}

impl HintPool {
    #[must_use]
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn pick(&mut self, correct: bool) -> &'static str {
        let pool: &[&'static str] = if correct { &PRAISE } else { &ENCOURAGEMENT };
        pool[self.rng.random_range(0..pool.len())]
    }
}
