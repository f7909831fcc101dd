//! Ordered rank-matching rules
//!
//! Each table is evaluated top to bottom and the first matching pattern wins,
//! so a label containing both "letjen" and "jenderal" resolves to letjen.

use super::{PatiGrade, RankGroup};

/// Grade rules, matched by substring against the normalized rank
pub const GRADE_RULES: [(&str, PatiGrade); 4] = [
    ("brigjen", PatiGrade::Brigjen),
    ("mayjen", PatiGrade::Mayjen),
    ("letjen", PatiGrade::Letjen),
    ("jenderal", PatiGrade::Jenderal),
];

/// Group rules, matched by prefix against the normalized rank
pub const GROUP_RULES: [(&str, RankGroup); 10] = [
    ("brigjen", RankGroup::Pati),
    ("mayjen", RankGroup::Pati),
    ("letjen", RankGroup::Pati),
    ("jenderal", RankGroup::Pati),
    ("mayor", RankGroup::Pamen),
    ("letkol", RankGroup::Pamen),
    ("kolonel", RankGroup::Pamen),
    ("kapten", RankGroup::Pama),
    ("lettu", RankGroup::Pama),
    ("letda", RankGroup::Pama),
];

/// Canonical officer ranks, most senior first, used for per-rank statistics
pub const CANONICAL_RANKS: [&str; 10] = [
    "jenderal", "letjen", "mayjen", "brigjen", "kolonel",
    "letkol", "mayor", "kapten", "lettu", "letda",
];

/// First grade rule whose pattern occurs anywhere in `normalized`
pub fn match_grade(normalized: &str) -> Option<PatiGrade> {
    GRADE_RULES
        .iter()
        .find(|(pattern, _)| normalized.contains(pattern))
        .map(|&(_, grade)| grade)
}

/// First group rule whose pattern prefixes `normalized`, else `Other`
pub fn match_group(normalized: &str) -> RankGroup {
    GROUP_RULES
        .iter()
        .find(|(pattern, _)| normalized.starts_with(pattern))
        .map(|&(_, group)| group)
        .unwrap_or(RankGroup::Other)
}
