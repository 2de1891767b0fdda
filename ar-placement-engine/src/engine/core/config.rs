use bevy::log::Level;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::engine::lighting::LightingSettings;
use crate::engine::objects::{DuplicateCompletionPolicy, ObjectTemplate};
use crate::engine::placement::Alignment;
use constants::placement::{
    DEFAULT_FRAME_RATE, DEFAULT_LOG_FILTER, DEFAULT_LOG_LEVEL, DEFAULT_TEMPLATE_ID,
    DETECT_HORIZONTAL_PLANES, DETECT_VERTICAL_PLANES, MAX_FRAME_RATE, MIN_FRAME_RATE,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Runtime configuration, loaded from JSON. Missing fields take their defaults.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Surface alignments the hit test accepts.
    pub plane_detection: Vec<Alignment>,
    pub duplicate_completion_policy: DuplicateCompletionPolicy,
    pub log_level: String,
    pub log_filter: String,
    /// Frames per second for the headless runner.
    pub frame_rate: f64,
    pub lighting: LightingSettings,
    pub catalog: Vec<ObjectTemplate>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        let mut plane_detection = Vec::new();
        if DETECT_HORIZONTAL_PLANES {
            plane_detection.push(Alignment::Horizontal);
        }
        if DETECT_VERTICAL_PLANES {
            plane_detection.push(Alignment::Vertical);
        }

        Self {
            plane_detection,
            duplicate_completion_policy: DuplicateCompletionPolicy::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            frame_rate: DEFAULT_FRAME_RATE,
            lighting: LightingSettings::default(),
            catalog: vec![ObjectTemplate {
                id: DEFAULT_TEMPLATE_ID.to_string(),
                scene_path: "models/car.scn".to_string(),
                size: [1.9, 1.3, 4.5],
            }],
        }
    }
}

impl PlacementConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        info!("Loaded placement config from {}", path.display());
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_FRAME_RATE..=MAX_FRAME_RATE).contains(&self.frame_rate) {
            return Err(ConfigError::Invalid(format!(
                "frame_rate must be within {}..={} Hz, got {}",
                MIN_FRAME_RATE, MAX_FRAME_RATE, self.frame_rate
            )));
        }
        if Level::from_str(&self.log_level).is_err() {
            return Err(ConfigError::Invalid(format!(
                "unknown log_level '{}'",
                self.log_level
            )));
        }
        let lighting = &self.lighting;
        if !(lighting.base_intensity.is_finite() && lighting.base_intensity > 0.0) {
            return Err(ConfigError::Invalid(
                "lighting.base_intensity must be positive".to_string(),
            ));
        }
        if lighting.spot_min > lighting.spot_max {
            return Err(ConfigError::Invalid(format!(
                "lighting.spot_min {} exceeds spot_max {}",
                lighting.spot_min, lighting.spot_max
            )));
        }
        Ok(())
    }

    /// Whether hits against surfaces with this alignment are accepted.
    pub fn detects(&self, alignment: Alignment) -> bool {
        self.plane_detection.contains(&alignment)
    }

    pub fn log_level(&self) -> Level {
        Level::from_str(&self.log_level).unwrap_or(Level::INFO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_detect_horizontal_only() {
        let config = PlacementConfig::default();
        assert!(config.detects(Alignment::Horizontal));
        assert!(!config.detects(Alignment::Vertical));
        assert_eq!(config.catalog.len(), 1);
        assert_eq!(config.catalog[0].id, "car");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = PlacementConfig::from_json_str(
            r#"{ "plane_detection": ["horizontal", "vertical"], "log_level": "debug" }"#,
        )
        .unwrap();
        assert!(config.detects(Alignment::Vertical));
        assert_eq!(config.log_level(), Level::DEBUG);
        assert_eq!(config.frame_rate, DEFAULT_FRAME_RATE);
        assert_eq!(config.lighting, LightingSettings::default());
    }

    #[test]
    fn policy_is_read_from_config() {
        let config =
            PlacementConfig::from_json_str(r#"{ "duplicate_completion_policy": "log_and_ignore" }"#)
                .unwrap();
        assert_eq!(
            config.duplicate_completion_policy,
            DuplicateCompletionPolicy::LogAndIgnore
        );
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            PlacementConfig::from_json_str(r#"{ "frame_rate": 0.0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            PlacementConfig::from_json_str(r#"{ "log_level": "loud" }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            PlacementConfig::from_json_str(r#"{ "lighting": { "spot_min": 2000.0 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            PlacementConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn frame_rate_must_yield_a_finite_frame_period() {
        let mut config = PlacementConfig::default();
        for frame_rate in [1e-320, -60.0, f64::NAN, f64::INFINITY, 1e6] {
            config.frame_rate = frame_rate;
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid(_))),
                "accepted frame_rate {frame_rate}"
            );
        }

        for frame_rate in [MIN_FRAME_RATE, 30.0, MAX_FRAME_RATE] {
            config.frame_rate = frame_rate;
            assert!(config.validate().is_ok());
            assert!((1.0 / config.frame_rate).is_finite());
        }
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "frame_rate": 30.0, "catalog": [ {{ "id": "lamp", "scene_path": "models/lamp.scn", "size": [0.3, 0.6, 0.3] }} ] }}"#
        )
        .unwrap();

        let config = PlacementConfig::from_path(file.path()).unwrap();
        assert_eq!(config.frame_rate, 30.0);
        assert_eq!(config.catalog[0].id, "lamp");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PlacementConfig::from_path(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
