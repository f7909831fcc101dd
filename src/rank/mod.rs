//! Rank normalization and classification into officer groups and PATI grades

pub mod rules;

pub use rules::CANONICAL_RANKS;

use serde::{Deserialize, Serialize};

/// Broad officer rank group used for bulk statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankGroup {
    /// General officers (brigjen and above)
    Pati,
    /// Mid-grade officers (mayor through kolonel)
    Pamen,
    /// Junior officers (letda through kapten)
    Pama,
    Other,
}

impl RankGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankGroup::Pati => "pati",
            RankGroup::Pamen => "pamen",
            RankGroup::Pama => "pama",
            RankGroup::Other => "other",
        }
    }
}

/// Specific general-officer grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatiGrade {
    Brigjen,
    Mayjen,
    Letjen,
    /// Matched by name but carries no configured retirement age
    Jenderal,
}

impl PatiGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatiGrade::Brigjen => "brigjen",
            PatiGrade::Mayjen => "mayjen",
            PatiGrade::Letjen => "letjen",
            PatiGrade::Jenderal => "jenderal",
        }
    }
}

/// Result of classifying a free-text rank label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankClassification {
    pub group: RankGroup,
    pub grade: Option<PatiGrade>,
}

impl RankClassification {
    fn unknown() -> Self {
        Self { group: RankGroup::Other, grade: None }
    }
}

/// Normalize a rank label.
///
/// Lower-cases, drops `.` characters, cuts everything from the first
/// whitespace-preceded token beginning with "tni" (e.g. "TNI", "TNI-AD"),
/// then collapses runs of whitespace and trims.
pub fn normalize_rank(rank: &str) -> String {
    let lowered: String = rank.to_lowercase().chars().filter(|&c| c != '.').collect();

    let mut tokens = lowered.split_whitespace();
    let mut kept: Vec<&str> = Vec::new();
    if let Some(first) = tokens.next() {
        kept.push(first);
        kept.extend(tokens.take_while(|t| !t.starts_with("tni")));
    }
    kept.join(" ")
}

/// Classify a rank label into its group and, for general officers, its grade.
///
/// Never fails: absent or empty input yields `Other` with no grade.
pub fn classify_rank(rank: Option<&str>) -> RankClassification {
    let Some(rank) = rank else {
        return RankClassification::unknown();
    };

    let normalized = normalize_rank(rank);
    if normalized.is_empty() {
        return RankClassification::unknown();
    }

    RankClassification {
        group: rules::match_group(&normalized),
        grade: rules::match_grade(&normalized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_suffix_and_punctuation() {
        assert_eq!(normalize_rank("Brigjen TNI"), "brigjen");
        assert_eq!(normalize_rank("  Mayjen.  TNI (Purn.)"), "mayjen");
        assert_eq!(normalize_rank("Letkol   Inf."), "letkol inf");
        assert_eq!(normalize_rank("KAPTEN Cke TNI-AD"), "kapten cke");
        assert_eq!(normalize_rank(""), "");
    }

    #[test]
    fn test_normalize_keeps_leading_token() {
        // Only a token that follows whitespace is treated as the service suffix.
        assert_eq!(normalize_rank("tni"), "tni");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "Brigjen TNI", "Letjen. TNI (Purn)", "  kolonel   czi  ", "Mayor TNI AD",
            "Jenderal TNI", "lettu", "", "   ", "Kapten.Inf", "Brig. Jen TNI",
        ];
        for sample in samples {
            let once = normalize_rank(sample);
            assert_eq!(normalize_rank(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_classify_pati() {
        let c = classify_rank(Some("Brigjen TNI"));
        assert_eq!(c.group, RankGroup::Pati);
        assert_eq!(c.grade, Some(PatiGrade::Brigjen));

        let c = classify_rank(Some("Jenderal TNI"));
        assert_eq!(c.group, RankGroup::Pati);
        assert_eq!(c.grade, Some(PatiGrade::Jenderal));
    }

    #[test]
    fn test_classify_other_groups() {
        let c = classify_rank(Some("Kolonel Inf"));
        assert_eq!(c.group, RankGroup::Pamen);
        assert_eq!(c.grade, None);

        let c = classify_rank(Some("Letda Chk"));
        assert_eq!(c.group, RankGroup::Pama);
        assert_eq!(c.grade, None);

        let c = classify_rank(Some("Serma"));
        assert_eq!(c.group, RankGroup::Other);
    }

    #[test]
    fn test_classify_missing_rank() {
        assert_eq!(classify_rank(None), RankClassification::unknown());
        assert_eq!(classify_rank(Some("  ")), RankClassification::unknown());
    }
}
