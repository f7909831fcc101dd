//! Personnel Retirement - retirement-age and pension computation for officer records
//!
//! This library provides:
//! - Rank normalization and classification (PATI / PAMEN / PAMA, PATI grades)
//! - Age, retirement date and BUP status computation against configurable ages
//! - Pension base tiering with partner and child allowances
//! - Roster-wide statistics, status refresh and retirement distribution
//! - Audit history entry formatting

pub mod error;
pub mod rank;
pub mod config;
pub mod personnel;
pub mod retirement;
pub mod pension;
pub mod roster;
pub mod history;

// Re-export commonly used types
pub use error::{RecordError, Result};
pub use rank::{classify_rank, normalize_rank, RankClassification, RankGroup, PatiGrade};
pub use config::RetirementAgeConfig;
pub use personnel::Personnel;
pub use retirement::{compute_age, compute_retirement_date, classify_bup_status, BupStatus, ServiceStatus};
pub use pension::{compute_pension, PensionBreakdown, PensionTierTable};
pub use roster::RosterRunner;
