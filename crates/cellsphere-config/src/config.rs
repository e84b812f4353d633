//! Config sections with defaults and RON persistence.

use std::path::{Path, PathBuf};

use cellsphere_mesh::SphereParams;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Sphere tessellation.
    pub mesh: MeshConfig,
    /// Offscreen frame and instancing.
    pub render: RenderConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Sphere tessellation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeshConfig {
    /// Latitude bands between the poles.
    pub latitude_segments: u32,
    /// Longitude columns around the equator.
    pub longitude_segments: u32,
    /// Sphere radius in model units.
    pub radius: f32,
}

/// Rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Offscreen target width in pixels.
    pub width: u32,
    /// Offscreen target height in pixels.
    pub height: u32,
    /// Number of cells drawn per frame.
    pub instance_count: u32,
    /// Linear RGBA clear color.
    pub clear_color: [f64; 4],
}

/// Debug/development settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for MeshConfig {
    fn default() -> Self {
        let params = SphereParams::default();
        Self {
            latitude_segments: params.latitude_segments,
            longitude_segments: params.longitude_segments,
            radius: params.radius,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            instance_count: 512,
            clear_color: [0.02, 0.02, 0.05, 1.0],
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl MeshConfig {
    /// Generator parameters for this section. Not validated here.
    pub fn sphere_params(&self) -> SphereParams {
        SphereParams::new(self.latitude_segments, self.longitude_segments, self.radius)
    }
}

/// `<platform config dir>/cellsphere`, if the platform has one.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("cellsphere"))
        .ok_or(ConfigError::NoConfigDir)
}

impl Config {
    /// Load `config.ron` from `config_dir`, writing defaults if it is missing.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save as `config.ron` inside `config_dir`, creating the directory.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .enumerate_arrays(false);
        let serialized = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::Write {
            path: config_path,
            source,
        })
    }

    /// Re-read from disk: `Some(new_config)` if it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.mesh.latitude_segments, 16);
        assert_eq!(config.mesh.longitude_segments, 32);
        assert_eq!(config.mesh.radius, 1.0);
        assert_eq!((config.render.width, config.render.height), (1280, 720));
        assert_eq!(config.render.instance_count, 512);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_default_config_serializes() {
        let ron_str =
            ron::ser::to_string_pretty(&Config::default(), ron::ser::PrettyConfig::new()).unwrap();
        assert!(ron_str.contains("latitude_segments: 16"));
        assert!(ron_str.contains("instance_count: 512"));
    }

    #[test]
    fn test_missing_section_uses_default() {
        let config: Config = ron::from_str("(mesh: (latitude_segments: 4))").unwrap();
        assert_eq!(config.mesh.latitude_segments, 4);
        assert_eq!(config.mesh.longitude_segments, 32);
        assert_eq!(config.render, RenderConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_sphere_params_conversion() {
        let mesh = MeshConfig {
            latitude_segments: 2,
            longitude_segments: 4,
            radius: 3.5,
        };
        assert_eq!(mesh.sphere_params(), SphereParams::new(2, 4, 3.5));
        assert!(MeshConfig::default().sphere_params().validate().is_ok());
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.mesh.latitude_segments = 8;
        config.render.instance_count = 1;
        config.render.clear_color = [1.0, 0.0, 0.0, 1.0];

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.mesh.radius = 2.0;
        modified.save(dir.path()).unwrap();

        let reloaded = config.reload(dir.path()).unwrap();
        assert_eq!(reloaded.map(|c| c.mesh.radius), Some(2.0));
        assert!(modified.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{{not valid}}").unwrap();
        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn test_reload_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::default().reload(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
