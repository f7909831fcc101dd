//! Load personnel rosters from CSV exports of the records store

use super::data::{parse_amount, parse_record_date};
use super::Personnel;
use crate::error::Result;
use csv::Reader;
use std::path::Path;

/// Raw CSV row; every column is text and may be empty
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "NRP", default)]
    nrp: Option<String>,
    #[serde(rename = "NAMA", default)]
    nama: Option<String>,
    #[serde(rename = "PANGKAT", default)]
    pangkat: Option<String>,
    #[serde(rename = "KESATUAN", default)]
    kesatuan: Option<String>,
    #[serde(rename = "TTL", default)]
    ttl: Option<String>,
    #[serde(rename = "TMT_TNI", default)]
    tmt_tni: Option<String>,
    #[serde(rename = "PENSIUN", default)]
    pensiun: Option<String>,
    #[serde(rename = "GPT", default)]
    gpt: Option<String>,
    #[serde(rename = "MDK", default)]
    mdk: Option<String>,
    #[serde(rename = "PASANGAN", default)]
    pasangan: Option<String>,
    #[serde(rename = "ANAK_1", default)]
    anak_1: Option<String>,
    #[serde(rename = "ANAK_2", default)]
    anak_2: Option<String>,
    #[serde(rename = "ANAK_3", default)]
    anak_3: Option<String>,
    #[serde(rename = "ANAK_4", default)]
    anak_4: Option<String>,
    #[serde(rename = "STS_ANAK_1", default)]
    sts_anak_1: Option<String>,
    #[serde(rename = "STS_ANAK_2", default)]
    sts_anak_2: Option<String>,
    #[serde(rename = "STS_ANAK_3", default)]
    sts_anak_3: Option<String>,
    #[serde(rename = "STS_ANAK_4", default)]
    sts_anak_4: Option<String>,
    #[serde(default)]
    status_bup: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl CsvRow {
    fn into_personnel(self, line: usize) -> Personnel {
        let date = |field: &str, raw: &Option<String>| {
            let raw = raw.as_deref()?;
            let parsed = parse_record_date(raw);
            if parsed.is_none() && !raw.trim().is_empty() {
                log::debug!("Row {}: unparseable {} {:?}", line, field, raw);
            }
            parsed
        };
        let amount = |field: &str, raw: &Option<String>| {
            let raw = raw.as_deref()?;
            let parsed = parse_amount(raw);
            if parsed.is_none() && !raw.trim().is_empty() {
                log::warn!("Row {}: invalid {} {:?}", line, field, raw);
            }
            parsed
        };

        Personnel {
            id: self.id.as_deref().and_then(|v| v.trim().parse().ok()),
            ttl: date("TTL", &self.ttl),
            tmt_tni: date("TMT_TNI", &self.tmt_tni),
            pensiun: date("PENSIUN", &self.pensiun),
            gpt: amount("GPT", &self.gpt),
            mdk: amount("MDK", &self.mdk),
            nrp: non_empty(self.nrp),
            nama: non_empty(self.nama),
            pangkat: non_empty(self.pangkat),
            kesatuan: non_empty(self.kesatuan),
            pasangan: self.pasangan.filter(|v| !v.is_empty()),
            anak_1: non_empty(self.anak_1),
            anak_2: non_empty(self.anak_2),
            anak_3: non_empty(self.anak_3),
            anak_4: non_empty(self.anak_4),
            sts_anak_1: non_empty(self.sts_anak_1),
            sts_anak_2: non_empty(self.sts_anak_2),
            sts_anak_3: non_empty(self.sts_anak_3),
            sts_anak_4: non_empty(self.sts_anak_4),
            status_bup: non_empty(self.status_bup),
        }
    }
}

/// Load all personnel from a CSV file
pub fn load_personnel<P: AsRef<Path>>(path: P) -> Result<Vec<Personnel>> {
    let reader = Reader::from_path(path.as_ref())?;
    let records = read_rows(reader)?;
    log::info!("Loaded {} personnel from {}", records.len(), path.as_ref().display());
    Ok(records)
}

/// Load personnel from any reader (e.g., string buffer, request body)
pub fn load_personnel_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<Personnel>> {
    read_rows(Reader::from_reader(reader))
}

fn read_rows<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<Personnel>> {
    let mut records = Vec::new();
    for (idx, result) in reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        // Header is line 1
        records.push(row.into_personnel(idx + 2));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const ROSTER: &str = "\
id,NRP,NAMA,PANGKAT,KESATUAN,TTL,TMT_TNI,PENSIUN,GPT,MDK,PASANGAN,STS_ANAK_1,STS_ANAK_2,status_bup
1,11001,Agus,Brigjen TNI,Mabes,1965-03-10,1988-12-01,,4500000,31,Siti,AKTIF,,
2,11002,Bambang,Kolonel Inf,Kodam III,15/07/1970,,,,,,,,Aktif
3,,Citra,,,bukan tanggal,,,abc,,,,,
";

    #[test]
    fn test_load_from_reader() {
        let people = load_personnel_from_reader(ROSTER.as_bytes()).unwrap();
        assert_eq!(people.len(), 3);

        let agus = &people[0];
        assert_eq!(agus.id, Some(1));
        assert_eq!(agus.pangkat.as_deref(), Some("Brigjen TNI"));
        assert_eq!(agus.ttl, NaiveDate::from_ymd_opt(1965, 3, 10));
        assert_eq!(agus.gpt, Some(4_500_000.0));
        assert_eq!(agus.pensiun, None);
        assert!(agus.has_partner());
        assert_eq!(agus.active_children(), 1);

        let bambang = &people[1];
        assert_eq!(bambang.ttl, NaiveDate::from_ymd_opt(1970, 7, 15));
        assert_eq!(bambang.status_bup.as_deref(), Some("Aktif"));
        assert_eq!(bambang.gpt, None);
    }

    #[test]
    fn test_bad_values_do_not_fail_the_load() {
        let people = load_personnel_from_reader(ROSTER.as_bytes()).unwrap();
        let citra = &people[2];
        assert_eq!(citra.nrp, None);
        assert_eq!(citra.pangkat, None);
        assert_eq!(citra.ttl, None);
        assert_eq!(citra.gpt, None);
        assert_eq!(citra.label(), "#3");
    }

    #[test]
    fn test_whitespace_partner_is_kept() {
        let csv = "NRP,PASANGAN\n1,\"   \"\n2,\n";
        let people = load_personnel_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(people[0].pasangan.as_deref(), Some("   "));
        assert!(people[0].has_partner());
        assert_eq!(people[1].pasangan, None);
    }

    #[test]
    fn test_load_sample_roster() {
        let people = load_personnel("data/personnel_sample.csv").expect("Failed to load sample roster");
        assert_eq!(people.len(), 8);
        assert!(people.iter().all(|p| p.nrp.is_some()));
    }
}
