//! Personnel Retirement CLI
//!
//! Command-line interface for retirement and pension computations over single
//! records or whole roster exports

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use personnel_retirement::config::{self, loader::DEFAULT_CONFIG_PATH};
use personnel_retirement::personnel::{load_personnel, parse_record_date, Personnel};
use personnel_retirement::rank::{classify_rank, normalize_rank};
use personnel_retirement::retirement::retirement_age_for;
use personnel_retirement::roster::{CountCategory, PersonnelAssessment, RosterRunner};
use personnel_retirement::compute_pension;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "personnel-retirement")]
#[command(about = "Retirement age, BUP status and pension computations for officer records", long_about = None)]
struct Cli {
    /// Retirement age CSV (key,value). Defaults to data/config/retirement_ages.csv when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reference date for ages and statuses (default: today)
    #[arg(long, global = true, value_parser = parse_date_arg)]
    as_of: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize and classify a rank label
    Classify {
        pangkat: String,
    },

    /// Age, retirement date and BUP status for one officer
    Person {
        #[arg(long, value_parser = parse_date_arg)]
        ttl: Option<NaiveDate>,

        #[arg(long)]
        pangkat: Option<String>,
    },

    /// Pension breakdown for one officer
    Pension {
        #[arg(long)]
        gpt: Option<f64>,

        #[arg(long)]
        mdk: Option<f64>,

        /// Service start date
        #[arg(long, value_parser = parse_date_arg)]
        tmt_tni: Option<NaiveDate>,

        /// Retirement date
        #[arg(long, value_parser = parse_date_arg)]
        pensiun: Option<NaiveDate>,

        /// Partner name
        #[arg(long)]
        pasangan: Option<String>,

        /// Child status, in slot order (repeat up to four times)
        #[arg(long = "anak", num_args = 1)]
        anak: Vec<String>,
    },

    /// Assess a whole roster CSV
    Roster {
        input: PathBuf,

        /// Write per-record results to this CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Headcount statistics for a roster (all, group or rank)
    Counts {
        input: PathBuf,

        #[arg(long, default_value = "all")]
        category: String,
    },

    /// List records whose stored status_bup or PENSIUN is out of date
    Refresh {
        input: PathBuf,
    },

    /// Retirements per year and month
    Distribution {
        input: PathBuf,
    },

    /// Show or update the PATI retirement ages
    Config {
        /// rank=age, e.g. brigjen=60 (repeatable)
        #[arg(long = "set")]
        set: Vec<String>,

        /// Save the updated ages back to the config file
        #[arg(long)]
        write: bool,
    },
}

fn parse_date_arg(raw: &str) -> std::result::Result<NaiveDate, String> {
    parse_record_date(raw).ok_or_else(|| format!("unrecognised date: {}", raw))
}

/// Flat CSV row for roster output
#[derive(Serialize)]
struct AssessmentRow<'a> {
    id: Option<u32>,
    #[serde(rename = "NRP")]
    nrp: Option<&'a str>,
    #[serde(rename = "NAMA")]
    nama: Option<&'a str>,
    #[serde(rename = "PANGKAT")]
    pangkat: Option<&'a str>,
    group: &'static str,
    grade: Option<&'static str>,
    age: i32,
    usia: Option<&'a str>,
    retirement_age: Option<u32>,
    #[serde(rename = "PENSIUN")]
    pensiun: Option<NaiveDate>,
    status_bup: &'static str,
    service_status: Option<&'static str>,
    #[serde(rename = "PENSPOK")]
    penspok: Option<i64>,
    #[serde(rename = "TUNJANGAN_ISTRI")]
    tunjangan_istri: Option<i64>,
    #[serde(rename = "TUNJANGAN_ANAK")]
    tunjangan_anak: Option<i64>,
    #[serde(rename = "TOTAL_PENSIUN")]
    total_pensiun: Option<i64>,
    pension_error: Option<&'a str>,
}

impl<'a> From<&'a PersonnelAssessment> for AssessmentRow<'a> {
    fn from(a: &'a PersonnelAssessment) -> Self {
        Self {
            id: a.id,
            nrp: a.nrp.as_deref(),
            nama: a.nama.as_deref(),
            pangkat: a.pangkat.as_deref(),
            group: a.group.as_str(),
            grade: a.grade.map(|g| g.as_str()),
            age: a.age,
            usia: a.usia.as_deref(),
            retirement_age: a.retirement_age,
            pensiun: a.retirement_date,
            status_bup: a.status_bup.as_str(),
            service_status: a.service_status.map(|s| s.as_str()),
            penspok: a.pension.map(|p| p.penspok),
            tunjangan_istri: a.pension.map(|p| p.tunjangan_istri),
            tunjangan_anak: a.pension.map(|p| p.tunjangan_anak),
            total_pensiun: a.pension.map(|p| p.total_pensiun),
            pension_error: a.pension_error.as_deref(),
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_roster(path: &Path) -> Result<Vec<Personnel>> {
    load_personnel(path).with_context(|| format!("Failed to load roster {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let as_of = cli.as_of.unwrap_or_else(|| Local::now().date_naive());
    let age_config = config::load_or_default(cli.config.as_deref())
        .context("Failed to load retirement ages")?;

    match cli.command {
        Commands::Classify { pangkat } => {
            let classification = classify_rank(Some(&pangkat));
            println!("Normalized:     {}", normalize_rank(&pangkat));
            println!("Group:          {}", classification.group.as_str());
            println!("Grade:          {}", classification.grade.map_or("-", |g| g.as_str()));
            match retirement_age_for(Some(&pangkat), &age_config) {
                Some(age) => println!("Retirement age: {}", age),
                None => println!("Retirement age: -"),
            }
            match age_config.group_age(classification.group) {
                Some(age) => println!("Group age:      {}", age),
                None => println!("Group age:      -"),
            }
        }

        Commands::Person { ttl, pangkat } => {
            let person = Personnel {
                ttl,
                pangkat,
                ..Default::default()
            };
            let runner = RosterRunner::new(age_config, as_of);
            print_json(&runner.assess(&person))?;
        }

        Commands::Pension { gpt, mdk, tmt_tni, pensiun, pasangan, anak } => {
            if anak.len() > 4 {
                bail!("at most four --anak statuses are accepted, got {}", anak.len());
            }
            let mut slots = anak.into_iter().map(Some);
            let person = Personnel {
                gpt,
                mdk,
                tmt_tni,
                pensiun,
                pasangan,
                sts_anak_1: slots.next().flatten(),
                sts_anak_2: slots.next().flatten(),
                sts_anak_3: slots.next().flatten(),
                sts_anak_4: slots.next().flatten(),
                ..Default::default()
            };
            print_json(&compute_pension(&person)?)?;
        }

        Commands::Roster { input, output } => {
            let people = load_roster(&input)?;
            let runner = RosterRunner::new(age_config, as_of);
            let assessments = runner.assess_all(&people);

            println!("Roster: {} ({} records, as of {})", input.display(), people.len(), runner.as_of());
            println!("{:>10} {:<24} {:<18} {:>4} {:>11} {:<13} {:>14}",
                "NRP", "NAMA", "PANGKAT", "Age", "PENSIUN", "status_bup", "TOTAL_PENSIUN");
            println!("{}", "-".repeat(102));
            for a in assessments.iter().take(25) {
                println!("{:>10} {:<24} {:<18} {:>4} {:>11} {:<13} {:>14}",
                    a.nrp.as_deref().unwrap_or("-"),
                    a.nama.as_deref().unwrap_or("-"),
                    a.pangkat.as_deref().unwrap_or("-"),
                    a.age,
                    a.retirement_date.map_or("-".to_string(), |d| d.to_string()),
                    a.status_bup.as_str(),
                    a.pension.map_or("-".to_string(), |p| p.total_pensiun.to_string()),
                );
            }
            if assessments.len() > 25 {
                println!("... ({} more records)", assessments.len() - 25);
            }

            let summary = runner.bup_summary(&people);
            println!("\nBUP summary:");
            println!("  Sudah BUP: {}", summary.sudah_bup);
            println!("  Akan BUP:  {}", summary.akan_bup);
            println!("  Belum BUP: {}", summary.belum_bup);

            if let Some(path) = output {
                let mut writer = csv::Writer::from_path(&path)
                    .with_context(|| format!("Unable to create {}", path.display()))?;
                for a in &assessments {
                    writer.serialize(AssessmentRow::from(a))?;
                }
                writer.flush()?;
                println!("\nFull results written to: {}", path.display());
            }
        }

        Commands::Counts { input, category } => {
            let category: CountCategory = category.parse()?;
            let people = load_roster(&input)?;
            print_json(&RosterRunner::counts(&people, category))?;
        }

        Commands::Refresh { input } => {
            let people = load_roster(&input)?;
            let runner = RosterRunner::new(age_config, as_of);
            let changes = runner.refresh_statuses(&people);
            for change in &changes {
                println!("{}", serde_json::to_string(change)?);
                println!("{}", serde_json::to_string(&change.history_entry().into_record())?);
            }
            eprintln!("{} of {} records out of date", changes.len(), people.len());
        }

        Commands::Distribution { input } => {
            let people = load_roster(&input)?;
            let runner = RosterRunner::new(age_config, as_of);
            print_json(&runner.retirement_distribution(&people))?;
        }

        Commands::Config { set, write } => {
            let mut age_config = age_config;
            if !set.is_empty() {
                let mut updates = BTreeMap::new();
                for entry in &set {
                    let Some((rank, age)) = entry.split_once('=') else {
                        bail!("expected rank=age, got {:?}", entry);
                    };
                    updates.insert(
                        rank.trim().to_lowercase(),
                        serde_json::Value::String(age.trim().to_string()),
                    );
                }
                let changed = age_config.apply_bup_update(&updates)?;
                log::info!("Updated {} retirement age(s)", changed.len());
            }

            if write {
                let path = cli.config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
                config::save_config(&path, &age_config)
                    .with_context(|| format!("Failed to save {}", path.display()))?;
            }

            print_json(&serde_json::json!({ "bupAges": age_config.bup_ages() }))?;
        }
    }

    Ok(())
}
