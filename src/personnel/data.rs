//! Personnel record as held by the records store

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Dependent-child status that counts towards the child allowance
pub const ACTIVE_CHILD_STATUS: &str = "AKTIF";

/// Parse a stored date leniently.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (taken as their UTC calendar
/// date), naive timestamps, and the day-first `DD/MM/YYYY` / `DD-MM-YYYY`
/// forms found in spreadsheet imports. Anything else is `None`.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc().date());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts.date());
        }
    }
    for format in ["%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    None
}

/// Parse a numeric factor; non-finite and non-numeric input is `None`
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_record_date))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawAmount> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        RawAmount::Number(n) => Some(n).filter(|v| v.is_finite()),
        RawAmount::Text(s) => parse_amount(&s),
    }))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    Text(String),
    Flag(bool),
    Number(f64),
}

/// Free-text field that may arrive as a string, boolean or number.
/// `false`, zero and NaN read as absent; anything else is kept as text.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawText> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        RawText::Text(s) => Some(s),
        RawText::Flag(flag) => flag.then(|| "true".to_string()),
        RawText::Number(n) => (n != 0.0 && !n.is_nan()).then(|| n.to_string()),
    }))
}

fn is_present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// A single personnel record.
///
/// Field names on the wire match the records store (`TTL`, `PANGKAT`, ...).
/// Every field is optional because imported rows are frequently incomplete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Personnel {
    #[serde(default)]
    pub id: Option<u32>,

    /// Service number
    #[serde(rename = "NRP", default)]
    pub nrp: Option<String>,

    #[serde(rename = "NAMA", default)]
    pub nama: Option<String>,

    /// Free-text rank label
    #[serde(rename = "PANGKAT", default)]
    pub pangkat: Option<String>,

    /// Unit
    #[serde(rename = "KESATUAN", default)]
    pub kesatuan: Option<String>,

    /// Date of birth
    #[serde(rename = "TTL", default, deserialize_with = "lenient_date")]
    pub ttl: Option<NaiveDate>,

    /// Service start date
    #[serde(rename = "TMT_TNI", default, deserialize_with = "lenient_date")]
    pub tmt_tni: Option<NaiveDate>,

    /// Stored (denormalized) retirement date
    #[serde(rename = "PENSIUN", default, deserialize_with = "lenient_date")]
    pub pensiun: Option<NaiveDate>,

    /// Base salary factor
    #[serde(rename = "GPT", default, deserialize_with = "lenient_amount")]
    pub gpt: Option<f64>,

    /// Service-length adjusted factor
    #[serde(rename = "MDK", default, deserialize_with = "lenient_amount")]
    pub mdk: Option<f64>,

    /// Partner name; any non-empty value means a partner is present
    #[serde(rename = "PASANGAN", default, deserialize_with = "lenient_text")]
    pub pasangan: Option<String>,

    #[serde(rename = "ANAK_1", default)]
    pub anak_1: Option<String>,
    #[serde(rename = "ANAK_2", default)]
    pub anak_2: Option<String>,
    #[serde(rename = "ANAK_3", default)]
    pub anak_3: Option<String>,
    #[serde(rename = "ANAK_4", default)]
    pub anak_4: Option<String>,

    #[serde(rename = "STS_ANAK_1", default)]
    pub sts_anak_1: Option<String>,
    #[serde(rename = "STS_ANAK_2", default)]
    pub sts_anak_2: Option<String>,
    #[serde(rename = "STS_ANAK_3", default)]
    pub sts_anak_3: Option<String>,
    #[serde(rename = "STS_ANAK_4", default)]
    pub sts_anak_4: Option<String>,

    /// Stored BUP status
    #[serde(default)]
    pub status_bup: Option<String>,
}

impl Personnel {
    /// Record with only rank and birth date set
    pub fn new(pangkat: &str, ttl: NaiveDate) -> Self {
        Self {
            pangkat: Some(pangkat.to_string()),
            ttl: Some(ttl),
            ..Default::default()
        }
    }

    /// Any non-empty value counts, whitespace included
    pub fn has_partner(&self) -> bool {
        self.pasangan.as_deref().is_some_and(|v| !v.is_empty())
    }

    /// Dependent-child status slots in fixed order 1..4
    pub fn child_statuses(&self) -> [Option<&str>; 4] {
        [
            self.sts_anak_1.as_deref(),
            self.sts_anak_2.as_deref(),
            self.sts_anak_3.as_deref(),
            self.sts_anak_4.as_deref(),
        ]
    }

    /// Number of status slots exactly equal to `AKTIF`
    pub fn active_children(&self) -> usize {
        self.child_statuses()
            .iter()
            .filter(|status| **status == Some(ACTIVE_CHILD_STATUS))
            .count()
    }

    /// Number of named children (non-blank `ANAK_n`)
    pub fn child_count(&self) -> usize {
        [&self.anak_1, &self.anak_2, &self.anak_3, &self.anak_4]
            .into_iter()
            .filter(|name| is_present(name))
            .count()
    }

    /// Short label for log lines: NRP, else id, else "?"
    pub fn label(&self) -> String {
        match (&self.nrp, self.id) {
            (Some(nrp), _) if !nrp.trim().is_empty() => nrp.clone(),
            (_, Some(id)) => format!("#{}", id),
            _ => "?".to_string(),
        }
    }
}
