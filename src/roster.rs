//! Roster runner for bulk retirement and pension evaluation
//!
//! Holds one retirement age snapshot and a reference date, then evaluates
//! many records against them. Per-record work is independent, so batches run
//! in parallel.

use crate::config::RetirementAgeConfig;
use crate::error::{RecordError, Result};
use crate::history::{ActionType, HistoryEntry};
use crate::pension::{PensionBreakdown, PensionCalculator};
use crate::personnel::Personnel;
use crate::rank::{classify_rank, normalize_rank, PatiGrade, RankGroup, CANONICAL_RANKS};
use crate::retirement::{
    age_label, classify_bup_status, compute_age, compute_retirement_date, retirement_age_for,
    service_status, BupStatus, ServiceStatus,
};
use chrono::{Datelike, NaiveDate};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Everything computed for one record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonnelAssessment {
    pub id: Option<u32>,
    #[serde(rename = "NRP")]
    pub nrp: Option<String>,
    #[serde(rename = "NAMA")]
    pub nama: Option<String>,
    #[serde(rename = "PANGKAT")]
    pub pangkat: Option<String>,
    pub group: RankGroup,
    pub grade: Option<PatiGrade>,
    pub age: i32,
    /// Display age, e.g. "58 Tahun"
    pub usia: Option<String>,
    pub retirement_age: Option<u32>,
    /// Stored retirement date when present, else computed
    #[serde(rename = "PENSIUN")]
    pub retirement_date: Option<NaiveDate>,
    pub status_bup: BupStatus,
    pub service_status: Option<ServiceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pension: Option<PensionBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pension_error: Option<String>,
}

/// Statistic requested from `RosterRunner::counts`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountCategory {
    All,
    Group,
    Rank,
}

impl FromStr for CountCategory {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" | "all" => Ok(CountCategory::All),
            "group" => Ok(CountCategory::Group),
            "rank" => Ok(CountCategory::Rank),
            other => Err(RecordError::UnknownCategory(other.to_string())),
        }
    }
}

/// Headcounts in the shape of the records API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RosterCounts {
    All { total: usize },
    Group { pati: usize, pamen: usize, pama: usize },
    /// Every canonical rank is present, zero when unused
    Rank(BTreeMap<String, usize>),
}

/// BUP status totals over general officers with a resolvable status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BupSummary {
    pub sudah_bup: usize,
    pub akan_bup: usize,
    pub belum_bup: usize,
}

/// Retirements in one calendar year, by month
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementYear {
    pub year: i32,
    pub label: String,
    pub januari: usize,
    pub februari: usize,
    pub maret: usize,
    pub april: usize,
    pub mei: usize,
    pub juni: usize,
    pub juli: usize,
    pub agustus: usize,
    pub september: usize,
    pub oktober: usize,
    pub november: usize,
    pub desember: usize,
}

impl RetirementYear {
    fn new(year: i32) -> Self {
        Self {
            year,
            label: format!("Tahun {}", year),
            ..Default::default()
        }
    }

    fn month_mut(&mut self, month: u32) -> Option<&mut usize> {
        let slot = match month {
            1 => &mut self.januari,
            2 => &mut self.februari,
            3 => &mut self.maret,
            4 => &mut self.april,
            5 => &mut self.mei,
            6 => &mut self.juni,
            7 => &mut self.juli,
            8 => &mut self.agustus,
            9 => &mut self.september,
            10 => &mut self.oktober,
            11 => &mut self.november,
            12 => &mut self.desember,
            _ => return None,
        };
        Some(slot)
    }

    pub fn total(&self) -> usize {
        self.januari + self.februari + self.maret + self.april + self.mei + self.juni
            + self.juli + self.agustus + self.september + self.oktober + self.november
            + self.desember
    }
}

/// Retirement dates across a roster, oldest year first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementDistribution {
    pub data: Vec<RetirementYear>,
    /// Number of records examined, including those without a date
    pub total: usize,
}

/// Stored values that differ from a fresh computation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusChange {
    pub id: Option<u32>,
    #[serde(rename = "NRP")]
    pub nrp: Option<String>,
    pub previous_status: Option<String>,
    pub status_bup: BupStatus,
    pub previous_pensiun: Option<NaiveDate>,
    #[serde(rename = "PENSIUN")]
    pub pensiun: Option<NaiveDate>,
}

impl StatusChange {
    /// History row recording the update
    pub fn history_entry(&self) -> HistoryEntry {
        HistoryEntry::new(ActionType::PersonilUpdated)
            .for_personil(self.id)
            .with_detail("BUP status refresh")
            .with_request(serde_json::json!({
                "status_bup": self.status_bup.as_str(),
                "PENSIUN": self.pensiun.map(|d| d.to_string()),
            }))
    }
}

/// Bulk evaluator bound to one config snapshot and reference date
#[derive(Debug, Clone)]
pub struct RosterRunner {
    config: RetirementAgeConfig,
    calculator: PensionCalculator,
    as_of: NaiveDate,
}

impl RosterRunner {
    pub fn new(config: RetirementAgeConfig, as_of: NaiveDate) -> Self {
        Self {
            config,
            calculator: PensionCalculator::default(),
            as_of,
        }
    }

    pub fn with_calculator(mut self, calculator: PensionCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn config(&self) -> &RetirementAgeConfig {
        &self.config
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    /// Stored retirement date, else one computed from birth date and rank
    pub fn retirement_date(&self, person: &Personnel) -> Option<NaiveDate> {
        person.pensiun.or_else(|| {
            compute_retirement_date(person.ttl, person.pangkat.as_deref(), &self.config)
        })
    }

    pub fn assess(&self, person: &Personnel) -> PersonnelAssessment {
        let rank = classify_rank(person.pangkat.as_deref());
        let retirement_date = self.retirement_date(person);

        // Pension needs a retirement date; use the resolved one when none is stored.
        let pension_input;
        let pension_subject = if person.pensiun.is_none() && retirement_date.is_some() {
            pension_input = Personnel {
                pensiun: retirement_date,
                ..person.clone()
            };
            &pension_input
        } else {
            person
        };
        let (pension, pension_error) = match self.calculator.compute(pension_subject) {
            Ok(breakdown) => (Some(breakdown), None),
            Err(e) => {
                log::debug!("No pension for {}: {}", person.label(), e);
                (None, Some(e.to_string()))
            }
        };

        PersonnelAssessment {
            id: person.id,
            nrp: person.nrp.clone(),
            nama: person.nama.clone(),
            pangkat: person.pangkat.clone(),
            group: rank.group,
            grade: rank.grade,
            age: compute_age(person.ttl, self.as_of),
            usia: age_label(person.ttl, self.as_of),
            retirement_age: retirement_age_for(person.pangkat.as_deref(), &self.config),
            retirement_date,
            status_bup: classify_bup_status(person, &self.config, self.as_of),
            service_status: service_status(retirement_date, self.as_of),
            pension,
            pension_error,
        }
    }

    /// Assess every record in parallel, preserving input order
    pub fn assess_all(&self, people: &[Personnel]) -> Vec<PersonnelAssessment> {
        let results: Vec<_> = people.par_iter().map(|p| self.assess(p)).collect();
        log::info!("Assessed {} personnel as of {}", results.len(), self.as_of);
        results
    }

    /// Headcount statistics for the requested category
    pub fn counts(people: &[Personnel], category: CountCategory) -> RosterCounts {
        match category {
            CountCategory::All => RosterCounts::All { total: people.len() },
            CountCategory::Group => {
                let (mut pati, mut pamen, mut pama) = (0, 0, 0);
                for person in people {
                    match classify_rank(person.pangkat.as_deref()).group {
                        RankGroup::Pati => pati += 1,
                        RankGroup::Pamen => pamen += 1,
                        RankGroup::Pama => pama += 1,
                        RankGroup::Other => {}
                    }
                }
                RosterCounts::Group { pati, pamen, pama }
            }
            CountCategory::Rank => {
                let mut counts: BTreeMap<String, usize> =
                    CANONICAL_RANKS.iter().map(|r| (r.to_string(), 0)).collect();
                for person in people {
                    let Some(pangkat) = person.pangkat.as_deref() else {
                        continue;
                    };
                    if let Some(count) = counts.get_mut(&normalize_rank(pangkat)) {
                        *count += 1;
                    }
                }
                RosterCounts::Rank(counts)
            }
        }
    }

    pub fn bup_summary(&self, people: &[Personnel]) -> BupSummary {
        people
            .par_iter()
            .map(|p| classify_bup_status(p, &self.config, self.as_of))
            .fold(BupSummary::default, |mut acc, status| {
                match status {
                    BupStatus::MencapaiBup => acc.sudah_bup += 1,
                    BupStatus::AkanBup => acc.akan_bup += 1,
                    BupStatus::BelumBup => acc.belum_bup += 1,
                    BupStatus::Unknown => {}
                }
                acc
            })
            .reduce(BupSummary::default, |a, b| BupSummary {
                sudah_bup: a.sudah_bup + b.sudah_bup,
                akan_bup: a.akan_bup + b.akan_bup,
                belum_bup: a.belum_bup + b.belum_bup,
            })
    }

    /// General officers who have reached their BUP
    pub fn retired_officers<'a>(&self, people: &'a [Personnel]) -> Vec<&'a Personnel> {
        people
            .iter()
            .filter(|p| classify_bup_status(p, &self.config, self.as_of) == BupStatus::MencapaiBup)
            .collect()
    }

    pub fn retirement_distribution(&self, people: &[Personnel]) -> RetirementDistribution {
        let mut years: BTreeMap<i32, RetirementYear> = BTreeMap::new();
        for date in people.iter().filter_map(|p| self.retirement_date(p)) {
            let entry = years
                .entry(date.year())
                .or_insert_with(|| RetirementYear::new(date.year()));
            if let Some(count) = entry.month_mut(date.month()) {
                *count += 1;
            }
        }

        RetirementDistribution {
            data: years.into_values().collect(),
            total: people.len(),
        }
    }

    /// Records whose stored `status_bup` or `PENSIUN` no longer match
    pub fn refresh_statuses(&self, people: &[Personnel]) -> Vec<StatusChange> {
        let changes: Vec<StatusChange> = people
            .par_iter()
            .filter_map(|person| {
                let status = classify_bup_status(person, &self.config, self.as_of);
                let pensiun =
                    compute_retirement_date(person.ttl, person.pangkat.as_deref(), &self.config);

                let status_changed = person.status_bup.as_deref() != Some(status.as_str());
                let date_changed = person.pensiun != pensiun;
                if !status_changed && !date_changed {
                    return None;
                }

                Some(StatusChange {
                    id: person.id,
                    nrp: person.nrp.clone(),
                    previous_status: person.status_bup.clone(),
                    status_bup: status,
                    previous_pensiun: person.pensiun,
                    pensiun,
                })
            })
            .collect();

        log::info!("{} of {} records need a status update", changes.len(), people.len());
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn runner() -> RosterRunner {
        RosterRunner::new(RetirementAgeConfig::default(), date(2024, 6, 1))
    }

    fn roster() -> Vec<Personnel> {
        vec![
            Personnel::new("Brigjen TNI", date(1963, 2, 1)),  // 61, bup 60: sudah
            Personnel::new("Mayjen TNI", date(1964, 1, 1)),   // 60, bup 61: akan
            Personnel::new("Letjen TNI", date(1970, 1, 1)),   // 54, bup 62: belum
            Personnel::new("Jenderal TNI", date(1960, 1, 1)), // no age
            Personnel::new("Kolonel Inf", date(1975, 5, 5)),
            Personnel::new("letkol", date(1978, 11, 20)),
            Personnel::new("Kapten Ckm", date(1985, 9, 12)),
            Personnel::new("Serma", date(1980, 1, 1)),
        ]
    }

    #[test]
    fn test_count_categories() {
        let people = roster();
        assert_eq!(RosterRunner::counts(&people, CountCategory::All), RosterCounts::All { total: 8 });
        assert_eq!(
            RosterRunner::counts(&people, CountCategory::Group),
            RosterCounts::Group { pati: 4, pamen: 2, pama: 1 }
        );

        let RosterCounts::Rank(ranks) = RosterRunner::counts(&people, CountCategory::Rank) else {
            panic!("expected rank counts");
        };
        assert_eq!(ranks.len(), 10);
        assert_eq!(ranks["brigjen"], 1);
        assert_eq!(ranks["jenderal"], 1);
        assert_eq!(ranks["letkol"], 1);
        // "kolonel inf" is not exactly a canonical rank
        assert_eq!(ranks["kolonel"], 0);
        assert_eq!(ranks["letda"], 0);
    }

    #[test]
    fn test_count_category_parsing() {
        assert_eq!("".parse::<CountCategory>().unwrap(), CountCategory::All);
        assert_eq!("group".parse::<CountCategory>().unwrap(), CountCategory::Group);
        assert!(matches!(
            "pangkat".parse::<CountCategory>(),
            Err(RecordError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_bup_summary_and_retired_list() {
        let runner = runner();
        let people = roster();

        assert_eq!(
            runner.bup_summary(&people),
            BupSummary { sudah_bup: 1, akan_bup: 1, belum_bup: 1 }
        );

        let retired = runner.retired_officers(&people);
        assert_eq!(retired.len(), 1);
        assert_eq!(retired[0].pangkat.as_deref(), Some("Brigjen TNI"));
    }

    #[test]
    fn test_assess_fills_derived_fields() {
        let runner = runner();
        let mut person = Personnel::new("Brigjen TNI", date(1965, 3, 10));
        person.gpt = Some(1_000_000.0);
        person.mdk = Some(28.0);
        person.tmt_tni = Some(date(1995, 1, 1));

        let result = runner.assess(&person);
        assert_eq!(result.group, RankGroup::Pati);
        assert_eq!(result.grade, Some(PatiGrade::Brigjen));
        assert_eq!(result.age, 59);
        assert_eq!(result.usia.as_deref(), Some("59 Tahun"));
        assert_eq!(result.retirement_age, Some(60));
        assert_eq!(result.retirement_date, Some(date(2025, 3, 10)));
        assert_eq!(result.status_bup, BupStatus::AkanBup);
        assert_eq!(result.service_status, Some(ServiceStatus::Aktif));
        // 2025 - 1995 = 30 years of service
        assert_eq!(result.pension.map(|p| p.penspok), Some(1_775_000));
        assert_eq!(result.pension_error, None);
    }

    #[test]
    fn test_custom_calculator() {
        use crate::pension::{PensionTier, PensionTierTable};

        let flat = PensionTierTable::new(vec![PensionTier { min: 0, max: 10_000_000, ceiling: 10_000_000 }])
            .unwrap();
        let mut config = RetirementAgeConfig::default();
        config.brigjen = Some(59);
        let runner = RosterRunner::new(config, date(2024, 6, 1))
            .with_calculator(PensionCalculator::new(flat));

        assert_eq!(runner.as_of(), date(2024, 6, 1));
        assert_eq!(runner.config().brigjen, Some(59));

        let mut person = Personnel::new("Brigjen TNI", date(1965, 3, 10));
        person.gpt = Some(1_000_000.0);
        person.mdk = Some(28.0);
        person.tmt_tni = Some(date(1990, 1, 1));

        let result = runner.assess(&person);
        assert_eq!(result.retirement_date, Some(date(2024, 3, 10)));
        assert_eq!(result.status_bup, BupStatus::MencapaiBup);
        assert_eq!(result.pension.map(|p| p.penspok), Some(10_000_000));
    }

    #[test]
    fn test_assess_reports_pension_error() {
        let result = runner().assess(&Personnel::new("Kapten", date(1985, 9, 12)));
        assert_eq!(result.pension, None);
        assert!(result.pension_error.unwrap().contains("GPT"));
        assert_eq!(result.status_bup, BupStatus::Unknown);
    }

    #[test]
    fn test_assess_all_preserves_order() {
        let people = roster();
        let results = runner().assess_all(&people);
        assert_eq!(results.len(), people.len());
        for (person, result) in people.iter().zip(&results) {
            assert_eq!(person.pangkat, result.pangkat);
        }
    }

    #[test]
    fn test_stored_retirement_date_wins() {
        let mut person = Personnel::new("Brigjen TNI", date(1965, 3, 10));
        person.pensiun = Some(date(2026, 1, 1));
        assert_eq!(runner().retirement_date(&person), Some(date(2026, 1, 1)));
    }

    #[test]
    fn test_retirement_distribution() {
        let people = vec![
            Personnel::new("Brigjen", date(1965, 3, 10)), // 2025-03
            Personnel::new("Brigjen", date(1965, 3, 22)), // 2025-03
            Personnel::new("Mayjen", date(1964, 12, 1)),  // 2025-12
            Personnel::new("Kolonel", date(1970, 7, 7)),  // 2023-07
            Personnel::new("Jenderal", date(1960, 1, 1)), // none
        ];
        let dist = runner().retirement_distribution(&people);

        assert_eq!(dist.total, 5);
        assert_eq!(dist.data.len(), 2);
        assert_eq!(dist.data[0].year, 2023);
        assert_eq!(dist.data[0].juli, 1);
        assert_eq!(dist.data[1].label, "Tahun 2025");
        assert_eq!(dist.data[1].maret, 2);
        assert_eq!(dist.data[1].desember, 1);
        assert_eq!(dist.data[1].total(), 3);
    }

    #[test]
    fn test_refresh_reports_only_changes() {
        let runner = runner();

        let mut current = Personnel::new("Mayjen TNI", date(1964, 1, 1));
        current.id = Some(1);
        current.status_bup = Some("akan bup".into());
        current.pensiun = Some(date(2025, 1, 1));

        let mut stale = Personnel::new("Brigjen TNI", date(1963, 2, 1));
        stale.id = Some(2);
        stale.status_bup = Some("Aktif".into());
        stale.pensiun = Some(date(2023, 2, 1));

        let changes = runner.refresh_statuses(&[current, stale]);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].id, Some(2));
        assert_eq!(changes[0].previous_status.as_deref(), Some("Aktif"));
        assert_eq!(changes[0].status_bup, BupStatus::MencapaiBup);
        assert_eq!(changes[0].pensiun, Some(date(2023, 2, 1)));

        let record = changes[0].history_entry().into_record();
        assert_eq!(record.action, ActionType::PersonilUpdated);
        assert_eq!(record.personil_id, Some(2));
        assert!(record.detail.unwrap().starts_with("BUP status refresh | Request: "));
    }
}
