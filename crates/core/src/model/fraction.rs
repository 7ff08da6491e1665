use serde::{Deserialize, Serialize};
use std::fmt;

/// A plain numerator/denominator pair as a learner writes it.
///
/// No reduction is performed: `2/4` and `1/2` are different answers in a
/// lesson that asks how many of the groups are taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fraction {
    pub numerator: u32,
    pub denominator: u32,
}

impl Fraction {
    #[must_use]
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// The fraction with the same denominator and a numerator of one.
    #[must_use]
    pub fn unit(&self) -> Self {
        Self::new(1, self.denominator)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
