use serde::Serialize;
use std::fmt;

/// Phase-specific guidance produced by the state machine.
///
/// Corrective hints name the numbers the learner should reason with; progress
/// hints say what to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "hint")]
pub enum Hint {
    /// Wrong group count.
    GroupBy { total_items: u32, group_size: u32 },
    /// Group count accepted; the fraction comes next.
    WriteFraction { total_groups: u32 },
    /// Wrong unit value.
    ShareEqually { total_items: u32, total_groups: u32 },
    /// Unit value accepted; the target value comes next.
    FindValue { target_groups: u32, total_groups: u32 },
    /// Wrong ruler tick.
    SplitRuler { total_length: u32, total_groups: u32 },
    /// A tick that is not on the ruler.
    TickOffRuler { tick: u32, total_length: u32 },
    /// Ruler tick accepted; coloring comes next.
    ColorSegments { unit_length: u32, target_groups: u32 },
    /// A segment pick beyond the numerator.
    TooManySegments { target_groups: u32 },
    /// Segment colored, more to go.
    KeepColoring { remaining: u32 },
    /// All target segments colored; the length comes next.
    MeasureColored { target_groups: u32 },
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Hint::GroupBy {
                total_items,
                group_size,
            } => write!(
                f,
                "Not quite. Try bundling all {total_items} items into groups of {group_size}."
            ),
            Hint::WriteFraction { total_groups } => write!(
                f,
                "There are {total_groups} groups. Now write the fraction."
            ),
            Hint::ShareEqually {
                total_items,
                total_groups,
            } => write!(
                f,
                "Not quite. If {total_items} is shared equally into {total_groups} groups, how many are in one group?"
            ),
            Hint::FindValue {
                target_groups,
                total_groups,
            } => write!(
                f,
                "The items are grouped. Now find what {target_groups}/{total_groups} of the whole is."
            ),
            Hint::SplitRuler {
                total_length,
                total_groups,
            } => write!(
                f,
                "To cut {total_length} cm into {total_groups} equal parts, how long must one part be?"
            ),
            Hint::TickOffRuler { tick, total_length } => write!(
                f,
                "{tick} is not on the ruler. Pick a mark between 1 and {total_length}."
            ),
            Hint::ColorSegments {
                unit_length,
                target_groups,
            } => write!(
                f,
                "One part is {unit_length} cm. Now color {target_groups} parts."
            ),
            Hint::TooManySegments { target_groups } => write!(
                f,
                "Wait! The numerator is {target_groups}, so color only {target_groups} parts."
            ),
            Hint::KeepColoring { remaining } => {
                write!(f, "Good. Color {remaining} more.")
            }
            Hint::MeasureColored { target_groups } => write!(
                f,
                "Well done! Now write how many cm the {target_groups} colored parts are."
            ),
        }
    }
}
