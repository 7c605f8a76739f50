//! # Engine Configuration
//!
//! Loaded once at startup, from TOML or from `Default`.
//!
//! ```toml
//! table_shards = 64
//! lock_stripes = 256
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RankingError, RankingResult};

/// Upper bound for shard and stripe counts.
const MAX_SLOTS: usize = 1 << 16;

/// Sizing of the engine's internal lock spaces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankingConfig {
    /// Number of `PlayerScoreTable` shards. Power of two.
    pub table_shards: usize,
    /// Number of per-player update stripes. Power of two.
    pub lock_stripes: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            table_shards: 64,
            lock_stripes: 256,
        }
    }
}

impl RankingConfig {
    /// Smallest config: one shard, one stripe. Every update is serialized.
    #[must_use]
    pub const fn single() -> Self {
        Self {
            table_shards: 1,
            lock_stripes: 1,
        }
    }

    /// Checks that every count is a power of two within bounds.
    ///
    /// # Errors
    ///
    /// Returns [`RankingError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> RankingResult<()> {
        check_slots("table_shards", self.table_shards)?;
        check_slots("lock_stripes", self.lock_stripes)
    }

    /// Parses and validates a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a parse error or a validation error.
    pub fn from_toml_str(text: &str) -> RankingResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| RankingError::ConfigParse {
            path: "<inline>".to_string(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns an IO, parse or validation error.
    pub fn from_file(path: impl AsRef<Path>) -> RankingResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| RankingError::ConfigIo {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| RankingError::ConfigParse {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }
}

fn check_slots(field: &str, value: usize) -> RankingResult<()> {
    if value == 0 || !value.is_power_of_two() {
        return Err(RankingError::InvalidConfig(format!(
            "{field} must be a non-zero power of two, got {value}"
        )));
    }
    if value > MAX_SLOTS {
        return Err(RankingError::InvalidConfig(format!(
            "{field} must be at most {MAX_SLOTS}, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        RankingConfig::default().validate().unwrap();
        RankingConfig::single().validate().unwrap();
    }

    #[test]
    fn test_rejects_zero_and_non_power_of_two() {
        let zero = RankingConfig {
            table_shards: 0,
            ..RankingConfig::default()
        };
        assert!(matches!(zero.validate(), Err(RankingError::InvalidConfig(_))));

        let odd = RankingConfig {
            lock_stripes: 100,
            ..RankingConfig::default()
        };
        let err = odd.validate().unwrap_err();
        assert!(err.to_string().contains("lock_stripes"));
    }

    #[test]
    fn test_rejects_oversized() {
        let huge = RankingConfig {
            table_shards: MAX_SLOTS * 2,
            ..RankingConfig::default()
        };
        assert!(huge.validate().is_err());
    }

    #[test]
    fn test_toml_partial_uses_defaults() {
        let config = RankingConfig::from_toml_str("lock_stripes = 16").unwrap();
        assert_eq!(config.lock_stripes, 16);
        assert_eq!(config.table_shards, RankingConfig::default().table_shards);
    }

    #[test]
    fn test_toml_round_trip() {
        let text = toml::to_string(&RankingConfig::default()).unwrap();
        assert_eq!(RankingConfig::from_toml_str(&text).unwrap(), RankingConfig::default());
    }

    #[test]
    fn test_toml_rejects_unknown_and_invalid() {
        assert!(matches!(
            RankingConfig::from_toml_str("shards = 4"),
            Err(RankingError::ConfigParse { .. })
        ));
        assert!(matches!(
            RankingConfig::from_toml_str("table_shards = 3"),
            Err(RankingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("test_ranking_config_{id}.toml"));
        std::fs::write(&path, "table_shards = 8\nlock_stripes = 32\n").unwrap();

        let config = RankingConfig::from_file(&path).unwrap();
        assert_eq!(config.table_shards, 8);
        assert_eq!(config.lock_stripes, 32);

        std::fs::remove_file(&path).ok();
        assert!(matches!(
            RankingConfig::from_file(&path),
            Err(RankingError::ConfigIo { .. })
        ));
    }
}
