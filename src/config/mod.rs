//! Admin-configurable retirement ages (BUP thresholds)
//!
//! The configuration is a plain value passed into every computation. Callers
//! own fetching it; nothing here caches or shares it between calls.

pub mod loader;

pub use loader::{load_config, load_config_from_reader, load_or_default, save_config, parse_age};

use crate::error::{RecordError, Result};
use crate::rank::{PatiGrade, RankGroup};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Age used when a PATI grade has no configured value
pub const DEFAULT_FALLBACK_AGE: u32 = 58;

/// Age used for personnel without a PATI grade when the OTHER key is unset
pub const DEFAULT_OTHER_AGE: u32 = 53;

/// Keys under which retirement ages are stored in the config store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfigKey {
    #[serde(rename = "BUP_BRIGJEN")]
    BupBrigjen,
    #[serde(rename = "BUP_MAYJEN")]
    BupMayjen,
    #[serde(rename = "BUP_LETJEN")]
    BupLetjen,
    #[serde(rename = "PENSIUN_USIA_PAMEN")]
    PensiunUsiaPamen,
    #[serde(rename = "PENSIUN_USIA_PAMA")]
    PensiunUsiaPama,
    #[serde(rename = "PENSIUN_USIA_OTHER")]
    PensiunUsiaOther,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 6] = [
        ConfigKey::BupBrigjen,
        ConfigKey::BupMayjen,
        ConfigKey::BupLetjen,
        ConfigKey::PensiunUsiaPamen,
        ConfigKey::PensiunUsiaPama,
        ConfigKey::PensiunUsiaOther,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::BupBrigjen => "BUP_BRIGJEN",
            ConfigKey::BupMayjen => "BUP_MAYJEN",
            ConfigKey::BupLetjen => "BUP_LETJEN",
            ConfigKey::PensiunUsiaPamen => "PENSIUN_USIA_PAMEN",
            ConfigKey::PensiunUsiaPama => "PENSIUN_USIA_PAMA",
            ConfigKey::PensiunUsiaOther => "PENSIUN_USIA_OTHER",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key.trim())
    }

    /// Key an admin `bupAges` entry maps to; only the three PATI grades are editable
    pub fn for_bup_rank(rank: &str) -> Option<Self> {
        match rank {
            "brigjen" => Some(ConfigKey::BupBrigjen),
            "mayjen" => Some(ConfigKey::BupMayjen),
            "letjen" => Some(ConfigKey::BupLetjen),
            _ => None,
        }
    }

    /// Default seeded value
    pub fn default_age(&self) -> u32 {
        match self {
            ConfigKey::BupBrigjen => 60,
            ConfigKey::BupMayjen => 61,
            ConfigKey::BupLetjen => 62,
            ConfigKey::PensiunUsiaPamen => 58,
            ConfigKey::PensiunUsiaPama => 58,
            ConfigKey::PensiunUsiaOther => DEFAULT_OTHER_AGE,
        }
    }
}

/// Retirement ages per PATI grade and rank group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementAgeConfig {
    pub brigjen: Option<u32>,
    pub mayjen: Option<u32>,
    pub letjen: Option<u32>,
    pub pamen: Option<u32>,
    pub pama: Option<u32>,
    pub other: Option<u32>,

    /// Used for a PATI grade whose own key is unset
    #[serde(default = "default_fallback_age")]
    pub fallback_age: u32,
}

fn default_fallback_age() -> u32 {
    DEFAULT_FALLBACK_AGE
}

/// PATI ages as exposed to administrators
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BupAges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brigjen: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mayjen: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letjen: Option<u32>,
}

impl Default for RetirementAgeConfig {
    fn default() -> Self {
        let mut config = Self::empty();
        for key in ConfigKey::ALL {
            config.set(key, Some(key.default_age()));
        }
        config
    }
}

impl RetirementAgeConfig {
    /// Config with no keys set; every lookup falls back
    pub fn empty() -> Self {
        Self {
            brigjen: None,
            mayjen: None,
            letjen: None,
            pamen: None,
            pama: None,
            other: None,
            fallback_age: DEFAULT_FALLBACK_AGE,
        }
    }

    pub fn get(&self, key: ConfigKey) -> Option<u32> {
        match key {
            ConfigKey::BupBrigjen => self.brigjen,
            ConfigKey::BupMayjen => self.mayjen,
            ConfigKey::BupLetjen => self.letjen,
            ConfigKey::PensiunUsiaPamen => self.pamen,
            ConfigKey::PensiunUsiaPama => self.pama,
            ConfigKey::PensiunUsiaOther => self.other,
        }
    }

    pub fn set(&mut self, key: ConfigKey, age: Option<u32>) {
        let slot = match key {
            ConfigKey::BupBrigjen => &mut self.brigjen,
            ConfigKey::BupMayjen => &mut self.mayjen,
            ConfigKey::BupLetjen => &mut self.letjen,
            ConfigKey::PensiunUsiaPamen => &mut self.pamen,
            ConfigKey::PensiunUsiaPama => &mut self.pama,
            ConfigKey::PensiunUsiaOther => &mut self.other,
        };
        *slot = age;
    }

    /// Retirement age for a PATI grade.
    ///
    /// Unset grades use `fallback_age`; jenderal has no age at all.
    pub fn grade_age(&self, grade: PatiGrade) -> Option<u32> {
        let configured = match grade {
            PatiGrade::Brigjen => self.brigjen,
            PatiGrade::Mayjen => self.mayjen,
            PatiGrade::Letjen => self.letjen,
            PatiGrade::Jenderal => return None,
        };
        Some(configured.unwrap_or(self.fallback_age))
    }

    /// Retirement age for personnel with no PATI grade
    pub fn other_age(&self) -> u32 {
        self.other.unwrap_or(DEFAULT_OTHER_AGE)
    }

    /// Configured age for a rank group, if any
    pub fn group_age(&self, group: RankGroup) -> Option<u32> {
        match group {
            RankGroup::Pati => None,
            RankGroup::Pamen => self.pamen,
            RankGroup::Pama => self.pama,
            RankGroup::Other => self.other,
        }
    }

    pub fn bup_ages(&self) -> BupAges {
        BupAges {
            brigjen: self.brigjen,
            mayjen: self.mayjen,
            letjen: self.letjen,
        }
    }

    /// Upsert PATI ages from an admin `bupAges` object.
    ///
    /// Unknown ranks are skipped. Values are numbers or numeric strings read
    /// like stored values (`parse_age`: decimals truncate, must be positive);
    /// the whole update is rejected otherwise and the config is left
    /// untouched. Returns the keys whose value changed.
    pub fn apply_bup_update(
        &mut self,
        updates: &BTreeMap<String, serde_json::Value>,
    ) -> Result<Vec<ConfigKey>> {
        let mut staged = Vec::new();
        for (rank, value) in updates {
            let Some(key) = ConfigKey::for_bup_rank(rank) else {
                log::debug!("Skipping unknown BUP rank {:?}", rank);
                continue;
            };

            let age = match value {
                serde_json::Value::Number(n) => parse_age(&n.to_string()),
                serde_json::Value::String(s) => parse_age(s),
                _ => None,
            }
            .ok_or_else(|| RecordError::InvalidAge {
                key: key.as_str().to_string(),
                value: value.to_string(),
            })?;

            staged.push((key, age));
        }

        let mut changed = Vec::new();
        for (key, age) in staged {
            if self.get(key) != Some(age) {
                self.set(key, Some(age));
                changed.push(key);
            }
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn update(value: serde_json::Value) -> BTreeMap<String, serde_json::Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_defaults_match_seed() {
        let config = RetirementAgeConfig::default();
        assert_eq!(config.brigjen, Some(60));
        assert_eq!(config.mayjen, Some(61));
        assert_eq!(config.letjen, Some(62));
        assert_eq!(config.pamen, Some(58));
        assert_eq!(config.pama, Some(58));
        assert_eq!(config.other, Some(53));
        assert_eq!(config.fallback_age, 58);
    }

    #[test]
    fn test_grade_age_fallbacks() {
        let mut config = RetirementAgeConfig::default();
        config.mayjen = None;
        assert_eq!(config.grade_age(PatiGrade::Brigjen), Some(60));
        assert_eq!(config.grade_age(PatiGrade::Mayjen), Some(58));
        assert_eq!(config.grade_age(PatiGrade::Jenderal), None);

        assert_eq!(RetirementAgeConfig::empty().other_age(), 53);
    }

    #[test]
    fn test_key_round_trip_through_names() {
        for key in ConfigKey::ALL {
            assert_eq!(ConfigKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(ConfigKey::parse("BUP_JENDERAL"), None);
    }

    #[test]
    fn test_apply_bup_update_skips_unknown_ranks() {
        let mut config = RetirementAgeConfig::default();
        let changed = config
            .apply_bup_update(&update(json!({"brigjen": 59, "mayjen": "61", "jenderal": 65})))
            .unwrap();

        assert_eq!(changed, vec![ConfigKey::BupBrigjen]);
        assert_eq!(config.brigjen, Some(59));
        assert_eq!(config.mayjen, Some(61));
    }

    #[test]
    fn test_apply_bup_update_rejects_invalid_age() {
        let mut config = RetirementAgeConfig::default();
        let err = config
            .apply_bup_update(&update(json!({"brigjen": 64, "letjen": 0})))
            .unwrap_err();

        assert!(matches!(err, RecordError::InvalidAge { .. }));
        // Nothing is applied when any entry is invalid.
        assert_eq!(config.brigjen, Some(60));
    }

    #[test]
    fn test_apply_bup_update_accepts_float_ages() {
        let mut config = RetirementAgeConfig::default();
        let changed = config
            .apply_bup_update(&update(json!({"brigjen": 59.0, "mayjen": "62.0", "letjen": 63.7})))
            .unwrap();

        assert_eq!(changed.len(), 3);
        assert_eq!(config.brigjen, Some(59));
        assert_eq!(config.mayjen, Some(62));
        assert_eq!(config.letjen, Some(63));

        assert!(config.apply_bup_update(&update(json!({"brigjen": -1.5}))).is_err());
        assert!(config.apply_bup_update(&update(json!({"brigjen": true}))).is_err());
        assert_eq!(config.brigjen, Some(59));
    }

    #[test]
    fn test_group_age() {
        let mut config = RetirementAgeConfig::default();
        config.pama = Some(55);
        assert_eq!(config.group_age(RankGroup::Pati), None);
        assert_eq!(config.group_age(RankGroup::Pamen), Some(58));
        assert_eq!(config.group_age(RankGroup::Pama), Some(55));
        assert_eq!(config.group_age(RankGroup::Other), Some(53));
    }

    #[test]
    fn test_bup_ages_serialization() {
        let mut config = RetirementAgeConfig::default();
        config.letjen = None;
        let value = serde_json::to_value(config.bup_ages()).unwrap();
        assert_eq!(value, json!({"brigjen": 60, "mayjen": 61}));
    }
}
