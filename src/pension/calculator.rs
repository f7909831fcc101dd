//! Pension amount calculation
//!
//! Base pension is 75% of GPT for 30+ years of service, otherwise 2.5% of GPT
//! per MDK unit. The base is tiered, then partner and child allowances are
//! added on top of the tiered amount. Every product is floored.

use super::PensionTierTable;
use crate::error::{RecordError, Result};
use crate::personnel::Personnel;
use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Years of service at which the full-career rate applies
pub const FULL_SERVICE_YEARS: i32 = 30;

pub const FULL_SERVICE_RATE: f64 = 0.75;
pub const PER_MDK_RATE: f64 = 0.025;
pub const PARTNER_RATE: f64 = 0.35;
pub const CHILD_RATE: f64 = 0.1;

/// Children beyond this count add nothing
pub const MAX_ALLOWANCE_CHILDREN: usize = 2;

/// Pension components in the shape the records API returns them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensionBreakdown {
    /// Calendar-year difference between service start and retirement
    pub usia: i32,

    /// Tiered pension base
    #[serde(rename = "PENSPOK")]
    pub penspok: i64,

    #[serde(rename = "TUNJANGAN_ISTRI")]
    pub tunjangan_istri: i64,

    #[serde(rename = "TUNJANGAN_ANAK")]
    pub tunjangan_anak: i64,

    #[serde(rename = "TOTAL_PENSIUN")]
    pub total_pensiun: i64,
}

/// Pension calculator over a tier table
#[derive(Debug, Clone, Default)]
pub struct PensionCalculator {
    tiers: PensionTierTable,
}

/// Treat absent, zero and non-finite factors alike
fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

/// Floor to a whole amount, rejecting values outside `i64`
fn whole_amount(value: f64, field: &'static str) -> Result<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63
    let floored = value.floor();
    if floored.is_finite() && (-LIMIT..LIMIT).contains(&floored) {
        Ok(floored as i64)
    } else {
        Err(RecordError::AmountOutOfRange { field })
    }
}

impl PensionCalculator {
    pub fn new(tiers: PensionTierTable) -> Self {
        Self { tiers }
    }

    pub fn tiers(&self) -> &PensionTierTable {
        &self.tiers
    }

    /// Compute the pension for a record.
    ///
    /// GPT, MDK, TMT_TNI and PENSIUN are all required; the error lists every
    /// one that is missing.
    pub fn compute(&self, person: &Personnel) -> Result<PensionBreakdown> {
        let gpt = usable(person.gpt);
        let mdk = usable(person.mdk);

        let mut missing = Vec::new();
        if gpt.is_none() {
            missing.push("GPT");
        }
        if mdk.is_none() {
            missing.push("MDK");
        }
        if person.tmt_tni.is_none() {
            missing.push("TMT_TNI");
        }
        if person.pensiun.is_none() {
            missing.push("PENSIUN");
        }

        let (Some(gpt), Some(mdk), Some(start), Some(retirement)) =
            (gpt, mdk, person.tmt_tni, person.pensiun)
        else {
            return Err(RecordError::MissingFields { fields: missing });
        };

        let usia = retirement.year() - start.year();

        let base = if usia >= FULL_SERVICE_YEARS {
            FULL_SERVICE_RATE * gpt
        } else {
            PER_MDK_RATE * mdk * gpt
        };
        let base = whole_amount(base, "PENSPOK")?;

        let penspok = self.tiers.lookup(base);

        let tunjangan_istri = if person.has_partner() {
            whole_amount(PARTNER_RATE * penspok as f64, "TUNJANGAN_ISTRI")?
        } else {
            0
        };

        let children = person.active_children().min(MAX_ALLOWANCE_CHILDREN);
        let tunjangan_anak =
            whole_amount(CHILD_RATE * penspok as f64 * children as f64, "TUNJANGAN_ANAK")?;

        let total_pensiun = penspok
            .checked_add(tunjangan_istri)
            .and_then(|sum| sum.checked_add(tunjangan_anak))
            .ok_or(RecordError::AmountOutOfRange { field: "TOTAL_PENSIUN" })?;

        Ok(PensionBreakdown {
            usia,
            penspok,
            tunjangan_istri,
            tunjangan_anak,
            total_pensiun,
        })
    }
}

/// Compute a pension with the standard tier table
pub fn compute_pension(person: &Personnel) -> Result<PensionBreakdown> {
    PensionCalculator::default().compute(person)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pensioner(gpt: f64, mdk: f64, start: NaiveDate, retirement: NaiveDate) -> Personnel {
        Personnel {
            gpt: Some(gpt),
            mdk: Some(mdk),
            tmt_tni: Some(start),
            pensiun: Some(retirement),
            ..Default::default()
        }
    }

    #[test]
    fn test_full_service_golden_case() {
        let mut person = pensioner(1_000_000.0, 28.0, date(1990, 1, 1), date(2020, 1, 1));
        person.pasangan = Some("Siti".into());
        person.sts_anak_1 = Some("AKTIF".into());
        person.sts_anak_2 = Some("AKTIF".into());

        let result = compute_pension(&person).unwrap();
        assert_eq!(result.usia, 30);
        assert_eq!(result.penspok, 1_775_000);
        assert_eq!(result.tunjangan_istri, 621_250);
        assert_eq!(result.tunjangan_anak, 355_000);
        assert_eq!(result.total_pensiun, 2_751_250);
    }

    #[test]
    fn test_short_service_uses_mdk() {
        // 0.025 * 28 * 4_000_000 = 2_800_000 -> bracket ceiling 2_911_000
        let person = pensioner(4_000_000.0, 28.0, date(1995, 6, 1), date(2024, 1, 1));
        let result = compute_pension(&person).unwrap();
        assert_eq!(result.usia, 29);
        assert_eq!(result.penspok, 2_911_000);
        assert_eq!(result.tunjangan_istri, 0);
        assert_eq!(result.tunjangan_anak, 0);
        assert_eq!(result.total_pensiun, 2_911_000);
    }

    #[test]
    fn test_service_years_ignore_month_and_day() {
        // Dec 1990 to Jan 2020 is just over 29 years elapsed, but 30 calendar years
        let person = pensioner(6_000_000.0, 10.0, date(1990, 12, 31), date(2020, 1, 1));
        let result = compute_pension(&person).unwrap();
        assert_eq!(result.usia, 30);
        assert_eq!(result.penspok, 4_551_800);
    }

    #[test]
    fn test_base_above_top_bracket_is_untiered() {
        let person = pensioner(7_000_000.0, 30.0, date(1985, 1, 1), date(2020, 1, 1));
        let result = compute_pension(&person).unwrap();
        assert_eq!(result.penspok, 5_250_000);
        assert_eq!(result.total_pensiun, 5_250_000);
    }

    #[test]
    fn test_child_allowance_capped_at_two() {
        let mut two = pensioner(1_000_000.0, 28.0, date(1990, 1, 1), date(2020, 1, 1));
        two.sts_anak_1 = Some("AKTIF".into());
        two.sts_anak_3 = Some("AKTIF".into());

        let mut four = two.clone();
        four.sts_anak_2 = Some("AKTIF".into());
        four.sts_anak_4 = Some("AKTIF".into());

        let mut one = two.clone();
        one.sts_anak_3 = Some("TIDAK AKTIF".into());

        let two = compute_pension(&two).unwrap();
        let four = compute_pension(&four).unwrap();
        let one = compute_pension(&one).unwrap();

        assert_eq!(two.tunjangan_anak, 355_000);
        assert_eq!(four.tunjangan_anak, two.tunjangan_anak);
        assert_eq!(one.tunjangan_anak, 177_500);
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let person = Personnel {
            gpt: Some(0.0),
            tmt_tni: Some(date(1990, 1, 1)),
            ..Default::default()
        };
        match compute_pension(&person) {
            Err(RecordError::MissingFields { fields }) => {
                assert_eq!(fields, vec!["GPT", "MDK", "PENSIUN"]);
            }
            other => panic!("expected missing fields, got {:?}", other),
        }
    }

    #[test]
    fn test_whitespace_partner_gets_allowance() {
        let mut person = pensioner(1_000_000.0, 28.0, date(1990, 1, 1), date(2020, 1, 1));
        person.pasangan = Some("   ".into());
        let result = compute_pension(&person).unwrap();
        assert_eq!(result.tunjangan_istri, 621_250);
        assert_eq!(result.total_pensiun, 2_396_250);
    }

    #[test]
    fn test_huge_factors_are_rejected() {
        // Base fits in i64 but the total with the partner allowance does not
        let mut person = pensioner(1e19, 30.0, date(1985, 1, 1), date(2020, 1, 1));
        person.pasangan = Some("Siti".into());
        match compute_pension(&person) {
            Err(RecordError::AmountOutOfRange { field }) => assert_eq!(field, "TOTAL_PENSIUN"),
            other => panic!("expected out of range, got {:?}", other),
        }

        let person = pensioner(1e20, 30.0, date(1985, 1, 1), date(2020, 1, 1));
        let err = compute_pension(&person).unwrap_err();
        assert!(matches!(err, RecordError::AmountOutOfRange { field: "PENSPOK" }));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_non_finite_factor_is_missing() {
        let person = pensioner(f64::NAN, 28.0, date(1990, 1, 1), date(2020, 1, 1));
        assert!(matches!(
            compute_pension(&person),
            Err(RecordError::MissingFields { .. })
        ));
    }

    #[test]
    fn test_breakdown_field_names() {
        let person = pensioner(1_000_000.0, 28.0, date(1990, 1, 1), date(2020, 1, 1));
        let value = serde_json::to_value(compute_pension(&person).unwrap()).unwrap();
        assert_eq!(value["usia"], 30);
        assert_eq!(value["PENSPOK"], 1_775_000);
        assert_eq!(value["TOTAL_PENSIUN"], 1_775_000);
    }
}
