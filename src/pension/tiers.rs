//! Pension base tier table
//!
//! The computed pension base is raised to the ceiling of the bracket it falls
//! in. Brackets are contiguous integer ranges; an amount outside every bracket
//! (negative, or above the last max) is returned unchanged.

use crate::error::{RecordError, Result};
use serde::{Deserialize, Serialize};

/// (min, max, ceiling) for the standard 25-bracket schedule
const STANDARD_TIERS: [(i64, i64, i64); 25] = [
    (0, 1_775_000, 1_775_000),
    (1_775_001, 1_901_300, 1_901_300),
    (1_901_301, 2_027_500, 2_027_500),
    (2_027_501, 2_153_700, 2_153_700),
    (2_153_701, 2_279_900, 2_279_900),
    (2_279_901, 2_406_100, 2_406_100),
    (2_406_101, 2_532_300, 2_532_300),
    (2_532_301, 2_658_600, 2_658_600),
    (2_658_601, 2_784_800, 2_784_800),
    (2_784_801, 2_911_000, 2_911_000),
    (2_911_001, 3_037_200, 3_037_200),
    (3_037_201, 3_163_400, 3_163_400),
    (3_163_401, 3_289_600, 3_289_600),
    (3_289_601, 3_415_900, 3_415_900),
    (3_415_901, 3_542_100, 3_542_100),
    (3_542_101, 3_668_300, 3_668_300),
    (3_668_301, 3_794_500, 3_794_500),
    (3_794_501, 3_920_700, 3_920_700),
    (3_920_701, 4_046_900, 4_046_900),
    (4_046_901, 4_173_200, 4_173_200),
    (4_173_201, 4_299_400, 4_299_400),
    (4_299_401, 4_425_600, 4_425_600),
    (4_425_601, 4_551_800, 4_551_800),
    (4_551_801, 4_678_000, 4_678_000),
    (4_678_001, 4_804_200, 4_804_200),
];

/// One bracket: amounts in `[min, max]` map to `ceiling`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensionTier {
    pub min: i64,
    pub max: i64,
    pub ceiling: i64,
}

/// Ordered, contiguous set of pension brackets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensionTierTable {
    tiers: Vec<PensionTier>,
}

impl PensionTierTable {
    /// Build a table, checking that brackets are non-empty, contiguous and
    /// that ceilings increase
    pub fn new(tiers: Vec<PensionTier>) -> Result<Self> {
        if tiers.is_empty() {
            return Err(RecordError::InvalidTierTable("no brackets".into()));
        }

        for (idx, tier) in tiers.iter().enumerate() {
            if tier.min > tier.max {
                return Err(RecordError::InvalidTierTable(format!(
                    "bracket {} has min {} above max {}",
                    idx + 1, tier.min, tier.max
                )));
            }
            if idx == 0 {
                continue;
            }
            let prev = &tiers[idx - 1];
            if tier.min != prev.max + 1 {
                return Err(RecordError::InvalidTierTable(format!(
                    "bracket {} starts at {}, expected {}",
                    idx + 1, tier.min, prev.max + 1
                )));
            }
            if tier.ceiling <= prev.ceiling {
                return Err(RecordError::InvalidTierTable(format!(
                    "bracket {} ceiling {} does not exceed {}",
                    idx + 1, tier.ceiling, prev.ceiling
                )));
            }
        }

        Ok(Self { tiers })
    }

    /// The standard 25-bracket schedule
    pub fn standard() -> Self {
        Self {
            tiers: STANDARD_TIERS
                .iter()
                .map(|&(min, max, ceiling)| PensionTier { min, max, ceiling })
                .collect(),
        }
    }

    /// Ceiling for `amount`, or `amount` itself when no bracket contains it
    pub fn lookup(&self, amount: i64) -> i64 {
        self.tiers
            .iter()
            .find(|t| amount >= t.min && amount <= t.max)
            .map(|t| t.ceiling)
            .unwrap_or(amount)
    }

    pub fn tiers(&self) -> &[PensionTier] {
        &self.tiers
    }

    /// Largest amount covered by an explicit bracket
    pub fn upper_bound(&self) -> i64 {
        self.tiers.last().map(|t| t.max).unwrap_or(0)
    }
}

impl Default for PensionTierTable {
    fn default() -> Self {
        Self::standard()
    }
}
