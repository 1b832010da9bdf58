//! Engine configuration.
//!
//! Controls how the headless runner steps a scene: timestep, run length,
//! seeding and reporting. Configuration can be loaded from and saved to a
//! TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "ember.toml";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Simulation Settings ===
    /// Fixed timestep in milliseconds
    pub timestep_ms: f32,
    /// Number of frames to simulate
    pub frame_count: u32,
    /// Manager time scale
    pub time_scale: f32,
    /// Base seed for emitters without their own (None = random)
    pub seed: Option<u64>,
    /// Stable-sort particles by depth after every frame
    pub depth_sort: bool,

    // === Scene Settings ===
    /// Scene file to load
    pub scene_path: PathBuf,
    /// Where to write the final emitter descriptions (None = skip)
    pub describe_path: Option<PathBuf>,

    // === Reporting ===
    /// Log pool statistics every N frames (0 = only at the end)
    pub report_interval: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timestep_ms: 1000.0 / 60.0,
            frame_count: 600,
            time_scale: 1.0,
            seed: None,
            depth_sort: false,
            scene_path: PathBuf::from("scene.json"),
            describe_path: None,
            report_interval: 60,
        }
    }
}

impl EngineConfig {
    /// Load configuration from the default file in the working directory.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.timestep_ms = self.timestep_ms.clamp(1.0, 1000.0);
        self.frame_count = self.frame_count.clamp(1, 1_000_000);
        self.time_scale = self.time_scale.clamp(0.0, 100.0);
    }

    /// Simulated duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        f64::from(self.timestep_ms) * f64::from(self.frame_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!((config.timestep_ms - 16.666_666).abs() < 0.001);
        assert_eq!(config.frame_count, 600);
        assert_eq!(config.time_scale, 1.0);
        assert!(config.seed.is_none());
        assert_eq!(config.scene_path, PathBuf::from("scene.json"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();

        config.timestep_ms = 0.0;
        config.frame_count = 0;
        config.time_scale = -2.0;

        config.validate();

        assert_eq!(config.timestep_ms, 1.0);
        assert_eq!(config.frame_count, 1);
        assert_eq!(config.time_scale, 0.0);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("ember.toml");

        let mut config = EngineConfig::default();
        config.frame_count = 120;
        config.seed = Some(12345);
        config.depth_sort = true;
        config.describe_path = Some(PathBuf::from("out.json"));

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = EngineConfig::load_from(&config_path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = EngineConfig::load_from("/nonexistent/path/ember.toml");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_config_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("ember.toml");
        fs::write(&config_path, "frame_count = 10\n").expect("Failed to write config");

        let config = EngineConfig::load_from(&config_path);
        assert_eq!(config.frame_count, 10);
        assert_eq!(config.report_interval, 60);
    }

    #[test]
    fn test_config_invalid_file_uses_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("ember.toml");
        fs::write(&config_path, "frame_count = \"lots\"").expect("Failed to write config");

        assert_eq!(EngineConfig::load_from(&config_path), EngineConfig::default());
    }

    #[test]
    fn test_duration() {
        let mut config = EngineConfig::default();
        config.timestep_ms = 10.0;
        config.frame_count = 50;
        assert_eq!(config.duration_ms(), 500.0);
    }
}
