//! CSV-backed retirement age store
//!
//! The file holds `key,value` rows using the store's key names, e.g.
//! `BUP_BRIGJEN,60`. Values are read the way the admin store holds them
//! (as text) and coerced leniently; anything that is not a positive finite
//! number keeps the default for that key.

use super::{ConfigKey, RetirementAgeConfig};
use crate::error::Result;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Default path to the retirement age file
pub const DEFAULT_CONFIG_PATH: &str = "data/config/retirement_ages.csv";

#[derive(Debug, serde::Deserialize, serde::Serialize)]
struct ConfigRow {
    key: String,
    value: String,
}

/// Coerce a stored value into an age in years.
///
/// Accepts integers and finite decimals (truncated). Returns `None` for
/// empty, non-numeric, non-finite, zero or negative values.
pub fn parse_age(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if let Ok(age) = trimmed.parse::<i64>() {
        return u32::try_from(age).ok().filter(|&a| a > 0);
    }

    let value: f64 = trimmed.parse().ok()?;
    if !value.is_finite() || value < 1.0 || value > u32::MAX as f64 {
        return None;
    }
    Some(value.trunc() as u32)
}

/// Load retirement ages from a CSV file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RetirementAgeConfig> {
    let file = File::open(path.as_ref())?;
    log::debug!("Loading retirement ages from {}", path.as_ref().display());
    load_config_from_reader(file)
}

/// Load retirement ages from any reader
pub fn load_config_from_reader<R: Read>(reader: R) -> Result<RetirementAgeConfig> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut config = RetirementAgeConfig::default();

    for result in csv_reader.deserialize() {
        let row: ConfigRow = result?;

        let Some(key) = ConfigKey::parse(&row.key) else {
            log::warn!("Ignoring unknown config key {:?}", row.key);
            continue;
        };

        match parse_age(&row.value) {
            Some(age) => config.set(key, Some(age)),
            None => log::warn!(
                "Invalid value {:?} for {}, keeping default {}",
                row.value,
                key.as_str(),
                key.default_age()
            ),
        }
    }

    Ok(config)
}

/// Load from `path` when given, else the default file if it exists, else built-in defaults
pub fn load_or_default(path: Option<&Path>) -> Result<RetirementAgeConfig> {
    if let Some(path) = path {
        return load_config(path);
    }

    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        load_config(default_path)
    } else {
        log::info!("No retirement age file found, using built-in defaults");
        Ok(RetirementAgeConfig::default())
    }
}

/// Write every configured key back to a CSV file
pub fn save_config<P: AsRef<Path>>(path: P, config: &RetirementAgeConfig) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for key in ConfigKey::ALL {
        if let Some(age) = config.get(key) {
            writer.serialize(ConfigRow {
                key: key.as_str().to_string(),
                value: age.to_string(),
            })?;
        }
    }
    writer.flush()?;
    log::info!("Wrote retirement ages to {}", path.as_ref().display());
    Ok(())
}
