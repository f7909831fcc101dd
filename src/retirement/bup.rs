//! Retirement date and BUP (mandatory retirement age) status

use super::age::{add_years, compute_age};
use crate::config::RetirementAgeConfig;
use crate::personnel::Personnel;
use crate::rank::{classify_rank, PatiGrade};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-way BUP status for general officers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BupStatus {
    /// No birth date, no PATI grade, or no age for the grade
    Unknown,
    #[serde(rename = "belum bup")]
    BelumBup,
    /// Exactly one year short of the threshold
    #[serde(rename = "akan bup")]
    AkanBup,
    #[serde(rename = "mencapai bup")]
    MencapaiBup,
}

impl BupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BupStatus::Unknown => "Unknown",
            BupStatus::BelumBup => "belum bup",
            BupStatus::AkanBup => "akan bup",
            BupStatus::MencapaiBup => "mencapai bup",
        }
    }
}

impl fmt::Display for BupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary service status against a stored retirement date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceStatus {
    Aktif,
    Pensiun,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Aktif => "Aktif",
            ServiceStatus::Pensiun => "Pensiun",
        }
    }
}

/// Retirement age that applies to a rank label.
///
/// Brigjen, mayjen and letjen use their configured age (or the fallback).
/// Jenderal resolves to no age. Everyone without a PATI grade uses the
/// OTHER age.
pub fn retirement_age_for(rank: Option<&str>, config: &RetirementAgeConfig) -> Option<u32> {
    match classify_rank(rank).grade {
        Some(grade) => config.grade_age(grade),
        None => Some(config.other_age()),
    }
}

/// Birth date plus the applicable retirement age, or `None` when either is unavailable
pub fn compute_retirement_date(
    birth: Option<NaiveDate>,
    rank: Option<&str>,
    config: &RetirementAgeConfig,
) -> Option<NaiveDate> {
    let birth = birth?;
    let age = retirement_age_for(rank, config)?;
    add_years(birth, age)
}

/// BUP age for a general officer; `None` for every other rank and for jenderal
fn bup_age(rank: Option<&str>, config: &RetirementAgeConfig) -> Option<u32> {
    match classify_rank(rank).grade? {
        grade @ (PatiGrade::Brigjen | PatiGrade::Mayjen | PatiGrade::Letjen) => config.grade_age(grade),
        PatiGrade::Jenderal => None,
    }
}

/// Classify a general officer's position relative to their BUP
pub fn classify_bup_status(
    person: &Personnel,
    config: &RetirementAgeConfig,
    as_of: NaiveDate,
) -> BupStatus {
    if person.ttl.is_none() {
        return BupStatus::Unknown;
    }
    let Some(threshold) = bup_age(person.pangkat.as_deref(), config) else {
        return BupStatus::Unknown;
    };

    let age = i64::from(compute_age(person.ttl, as_of));
    let threshold = i64::from(threshold);

    if age >= threshold {
        BupStatus::MencapaiBup
    } else if age == threshold - 1 {
        BupStatus::AkanBup
    } else {
        BupStatus::BelumBup
    }
}

/// `Pensiun` once `as_of` reaches the retirement date, `Aktif` before it
pub fn service_status(retirement_date: Option<NaiveDate>, as_of: NaiveDate) -> Option<ServiceStatus> {
    retirement_date.map(|date| {
        if as_of >= date {
            ServiceStatus::Pensiun
        } else {
            ServiceStatus::Aktif
        }
    })
}
