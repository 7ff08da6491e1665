use std::fmt::Write as _;

use fraction_core::model::{ItemGlyph, LessonKind, Problem};
use services::{LessonView, Phase};

/// Plain-text rendering of a lesson view.
pub fn lesson(view: &LessonView) -> String {
    let mut out = String::new();
    let problem = &view.problem;
    let _ = writeln!(out, "== {} ==", title(problem.lesson_kind()));
    if problem.is_length() {
        let _ = writeln!(out, "{}", ruler(view));
    } else {
        let _ = writeln!(out, "{}", items(view));
    }
    let _ = writeln!(out, "{}", question(view));
    if !view.tutor_message.is_empty() {
        let _ = writeln!(out, "Tutor: {}", view.tutor_message);
    }
    let _ = write!(out, "{}", prompt(view));
    out
}

pub fn title(kind: LessonKind) -> &'static str {
    match kind {
        LessonKind::Naming => "Naming fractions",
        LessonKind::ValueFinding => "Finding a fraction of a whole",
    }
}

fn symbol(glyph: ItemGlyph) -> char {
    match glyph {
        ItemGlyph::Orange => 'o',
        ItemGlyph::Apple => 'a',
        ItemGlyph::Strawberry => 's',
        ItemGlyph::Star => '*',
        ItemGlyph::Ruler => '-',
    }
}

// Items are shown loose until the first gate is passed, then boxed in groups
// with the target groups marked.
fn items(view: &LessonView) -> String {
    let problem = &view.problem;
    let mark = symbol(problem.glyph());
    if !view.is_partitioned {
        let row: Vec<String> = (0..problem.total_items()).map(|_| mark.to_string()).collect();
        return format!("{} x{}: {}", problem.glyph(), problem.total_items(), row.join(" "));
    }
    let groups: Vec<String> = (0..problem.total_groups())
        .map(|group| {
            let inner: Vec<String> = (0..problem.group_size()).map(|_| mark.to_string()).collect();
            let selected = group < problem.target_groups();
            if selected && problem.lesson_kind() == LessonKind::ValueFinding {
                format!("<{}>", inner.join(" "))
            } else {
                format!("[{}]", inner.join(" "))
            }
        })
        .collect();
    format!("{}: {}", problem.glyph(), groups.join(" "))
}

fn ruler(view: &LessonView) -> String {
    let problem = &view.problem;
    let total = problem.total_items();
    let mut bar = String::new();
    if view.is_partitioned {
        for segment in 0..problem.total_groups() {
            let fill = if view.is_segment_colored(segment) { '#' } else { '.' };
            bar.push('|');
            bar.extend(std::iter::repeat_n(fill, (problem.group_size() * 2) as usize));
        }
        bar.push('|');
        let numbers: Vec<String> = (1..=problem.total_groups()).map(|n| n.to_string()).collect();
        return format!("ruler {total} cm: {bar}\nsegments: {}", numbers.join(" "));
    }
    let ticks: Vec<String> = (0..=total).map(|cm| cm.to_string()).collect();
    format!("ruler {total} cm: {}", ticks.join("-"))
}

fn question(view: &LessonView) -> String {
    let p = &view.problem;
    match p.lesson_kind() {
        LessonKind::Naming if matches!(view.phase, Phase::Grouping) => format!(
            "{} grouped by {} makes __ groups.",
            p.total_items(),
            p.group_size()
        ),
        LessonKind::Naming => format!(
            "{} grouped by {} makes {} groups. {} is __/__ of {}.",
            p.total_items(),
            p.group_size(),
            p.total_groups(),
            p.target_items(),
            p.total_items()
        ),
        LessonKind::ValueFinding if p.is_length() => format!(
            "{} of {} cm is __ cm.",
            p.target_fraction(),
            p.total_items()
        ),
        LessonKind::ValueFinding if matches!(view.phase, Phase::UnitValue) => format!(
            "{} of {} is __.",
            p.target_fraction().unit(),
            p.total_items()
        ),
        LessonKind::ValueFinding => format!(
            "1/{} of {} is {}, so {} of {} is __.",
            p.total_groups(),
            p.total_items(),
            p.group_size(),
            p.target_fraction(),
            p.total_items()
        ),
    }
}

fn prompt(view: &LessonView) -> String {
    match view.phase {
        Phase::Grouping => "How many groups? > ".to_string(),
        Phase::FractionInput => "Fraction (a/b) > ".to_string(),
        Phase::UnitValue => "How many in one part? > ".to_string(),
        Phase::RulerPartition => match view.selectable_ticks() {
            Some(ticks) => format!(
                "Pick the cm mark where the first part ends ({}-{}) > ",
                ticks.start(),
                ticks.end()
            ),
            None => "> ".to_string(),
        },
        Phase::SegmentColoring => format!(
            "Color a segment (1-{}) > ",
            view.problem.total_groups()
        ),
        Phase::ValueInput => "Your answer > ".to_string(),
        Phase::Resolved { outcome: false } => {
            "Try again, or type 'next' for a new problem > ".to_string()
        }
        Phase::Resolved { outcome: true } => "Type 'next' or 'menu' > ".to_string(),
    }
}
