//! Pension base tiering and allowance calculation

mod tiers;
mod calculator;

pub use tiers::{PensionTier, PensionTierTable};
pub use calculator::{
    PensionBreakdown, PensionCalculator, compute_pension,
    FULL_SERVICE_YEARS, MAX_ALLOWANCE_CHILDREN,
};
