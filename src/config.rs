//! Tunables, persisted as JSON
//!
//! Every field has a default, so a partial file or no file at all still
//! gives a complete configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::bubbles::BubbleConfig;
use crate::submarine::SubmarineConfig;
use crate::texture::TexturePaths;

/// Looked up in the working directory at startup
pub const CONFIG_FILE: &str = "aquarium.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can not access config file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AquariumConfig {
    pub textures: TexturePaths,
    /// Fixed seed for the bubble jitter; random when absent
    pub seed: Option<u64>,
    pub vsync: bool,
    /// Display list slots available at startup
    pub display_list_capacity: usize,
    pub bubbles: BubbleConfig,
    pub submarine: SubmarineConfig,
}

impl Default for AquariumConfig {
    fn default() -> Self {
        Self {
            textures: TexturePaths::default(),
            seed: None,
            vsync: true,
            display_list_capacity: 16,
            bubbles: BubbleConfig::default(),
            submarine: SubmarineConfig::default(),
        }
    }
}

impl AquariumConfig {
    /// Save config to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })
    }

    /// Load config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject tunables the simulation can not run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: &'static str| -> Result<(), ConfigError> {
            Err(ConfigError::Invalid { field, reason })
        };
        let sub = &self.submarine;
        let bubbles = &self.bubbles;

        let finite = [
            ("submarine.thrust", sub.thrust),
            ("submarine.water_resistance", sub.water_resistance),
            ("submarine.bounce", sub.bounce),
            ("submarine.pitch_step", sub.pitch_step),
            ("submarine.yaw_step", sub.yaw_step),
            ("submarine.max_dive", sub.max_dive),
            ("bubbles.spawn_interval", bubbles.spawn_interval),
            ("bubbles.buoyancy", bubbles.buoyancy),
            ("bubbles.bounce", bubbles.bounce),
            ("bubbles.surface_height", bubbles.surface_height),
            ("bubbles.spread", bubbles.spread),
        ];
        if let Some((field, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return invalid(*field, "must be a finite number");
        }
        if bubbles.origin.iter().any(|v| !v.is_finite()) {
            return invalid("bubbles.origin", "must be a finite number");
        }

        if !(0.0..=90.0).contains(&sub.max_dive) {
            return invalid("submarine.max_dive", "must be between 0 and 90 degrees");
        }
        if !(0.0..=1.0).contains(&sub.bounce) {
            return invalid("submarine.bounce", "must be between 0 and 1");
        }
        if !(0.0..=1.0).contains(&bubbles.bounce) {
            return invalid("bubbles.bounce", "must be between 0 and 1");
        }
        if sub.water_resistance < 0.0 {
            return invalid("submarine.water_resistance", "must not be negative");
        }
        if bubbles.spawn_interval <= 0.0 {
            return invalid("bubbles.spawn_interval", "must be positive");
        }
        Ok(())
    }

    /// Load `path` if it exists. A missing file silently gives the
    /// defaults; an unreadable or malformed one is logged first.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                info!(path = %path.display(), "loaded config");
                config
            }
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "using default config");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("aquarium-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AquariumConfig =
            serde_json::from_str(r#"{ "seed": 7, "bubbles": { "capacity": 10 } }"#).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.bubbles.capacity, 10);
        assert_eq!(config.bubbles.spawn_interval, 0.3);
        assert!(config.vsync);
        assert_eq!(config.textures, TexturePaths::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = scratch("saved.json");
        let mut config = AquariumConfig::default();
        config.vsync = false;
        config.submarine.max_dive = 45.0;
        config.save(&path).unwrap();
        let loaded = AquariumConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let missing = scratch("missing.json");
        assert!(matches!(AquariumConfig::load(&missing), Err(ConfigError::Io { .. })));
        assert_eq!(AquariumConfig::load_or_default(&missing), AquariumConfig::default());

        let bad = scratch("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(AquariumConfig::load(&bad), Err(ConfigError::Parse { .. })));
        assert_eq!(AquariumConfig::load_or_default(&bad), AquariumConfig::default());
        let _ = fs::remove_file(&bad);
    }

    #[test]
    fn test_out_of_range_values_fall_back() {
        let negative_dive = scratch("negative-dive.json");
        fs::write(&negative_dive, r#"{ "seed": 1, "submarine": { "max_dive": -10.0 } }"#).unwrap();
        assert!(matches!(
            AquariumConfig::load(&negative_dive),
            Err(ConfigError::Invalid { field: "submarine.max_dive", .. })
        ));
        assert_eq!(AquariumConfig::load_or_default(&negative_dive), AquariumConfig::default());
        let _ = fs::remove_file(&negative_dive);

        let mut config = AquariumConfig::default();
        assert!(config.validate().is_ok());
        config.bubbles.spawn_interval = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "bubbles.spawn_interval", .. })
        ));
        config.bubbles.spawn_interval = 0.3;
        config.submarine.bounce = 1.5;
        assert!(config.validate().is_err());
        config.submarine.bounce = 0.5;
        config.submarine.yaw_step = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "submarine.yaw_step", .. })
        ));
    }
}
