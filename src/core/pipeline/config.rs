//! Detection configuration.
//!
//! Loaded from `<config dir>/photo-dedup-engine/config.json` when present,
//! with defaults for every field left out.

use crate::core::burst::BurstConfig;
use crate::core::comparator::GroupingStrategy;
use crate::core::selection::SelectionConfig;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Operational parameters for one detection pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// How duplicate groups are formed
    pub grouping: GroupingStrategy,
    /// Burst sequence parameters
    pub burst: BurstConfig,
    /// Whether to run burst detection at all
    pub detect_bursts: bool,
    /// Smart selection parameters
    pub selection: SelectionConfig,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            grouping: GroupingStrategy::default(),
            burst: BurstConfig::default(),
            detect_bursts: true,
            selection: SelectionConfig::default(),
        }
    }
}

impl DetectionConfig {
    /// Load from the default location, or defaults if there is no file
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load and validate a config file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: DetectionConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/photo-dedup-engine/config.json`
    ///
    /// `None` when the platform has no config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("photo-dedup-engine").join("config.json"))
    }

    /// Check value ranges
    ///
    /// A grouping threshold wider than the fingerprints is clamped when a
    /// pass runs, since the width is only known then.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let window = self.burst.time_window_seconds;
        if !window.is_finite() || window < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "burst time window must be a non-negative number of seconds, got {}",
                window
            )));
        }

        let min_score = self.selection.min_score;
        if !(0.0..=100.0).contains(&min_score) {
            return Err(ConfigError::Invalid(format!(
                "selection min_score must be within 0-100, got {}",
                min_score
            )));
        }

        Ok(())
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::comparator::Linkage;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_production_settings() {
        let config = DetectionConfig::default();
        assert_eq!(config.grouping, GroupingStrategy::ExactMatch);
        assert_eq!(config.burst.time_window_seconds, 5.0);
        assert_eq!(config.burst.visual_distance_threshold, 30);
        assert_eq!(config.selection.min_score, 75.0);
        assert!(config.detect_bursts);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"grouping": {"mode": "threshold", "threshold": 6, "require_both_hashes": false}}"#,
        )
        .unwrap();

        let config = DetectionConfig::load_from(&path).unwrap();

        assert_eq!(
            config.grouping,
            GroupingStrategy::Threshold {
                threshold: 6,
                require_both_hashes: false,
                linkage: Linkage::Anchor,
            }
        );
        assert_eq!(config.burst, BurstConfig::default());
    }

    #[test]
    fn round_trips_through_json() {
        let config = DetectionConfig {
            grouping: GroupingStrategy::threshold(),
            detect_bursts: false,
            ..Default::default()
        };
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, config.to_json().unwrap()).unwrap();

        assert_eq!(DetectionConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut config = DetectionConfig::default();
        config.burst.time_window_seconds = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = DetectionConfig::default();
        config.selection.min_score = 120.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn invalid_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"grouping": {"mode": "fuzzy"}}"#).unwrap();

        let err = DetectionConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let err = DetectionConfig::load_from(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
