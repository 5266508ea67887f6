use anyhow::{Context, Result};
use colored::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sampling: SamplingConfig,
    pub camera: CameraConfig,
    pub display: DisplayConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub interval_ms: u64,
    pub copy_feedback_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub ideal_width: u32,
    pub prefer_rear: bool,
    pub mirror: bool,
    pub permission_timeout_secs: u64,
}

/// The viewport the stream is shaped for. `handheld` selects a portrait
/// aspect ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub handheld: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub font_family: String, // TrueType family; bitmap font when not found
    pub font_size_pt: f32,
    pub text_scale: usize,   // bitmap font scale
    pub pill_radius: u32,
    pub pill_padding: u32,
    pub marker_size: u32,
    pub marker_border: u32,
    pub marker_color_hex: String,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            copy_feedback_ms: 2000,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            ideal_width: 1920,
            prefer_rear: true,
            mirror: false,
            permission_timeout_secs: 30,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            handheld: false,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            font_family: "DejaVuSans".to_string(),
            font_size_pt: 20.0,
            text_scale: 3,
            pill_radius: 6,
            pill_padding: 15,
            marker_size: 4,
            marker_border: 2,
            marker_color_hex: "#000000".to_string(),
        }
    }
}

impl SamplingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }

    pub fn copy_feedback(&self) -> Duration {
        Duration::from_millis(self.copy_feedback_ms)
    }
}

impl CameraConfig {
    pub fn permission_timeout(&self) -> Duration {
        Duration::from_secs(self.permission_timeout_secs)
    }
}

impl AppConfig {
    pub const DEFAULT_PATH: &'static str = "config.json";

    /// Loads `path`, falling back to defaults when it is missing or broken,
    /// then writes the result back so new fields show up in the file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            match serde_json::from_str::<AppConfig>(&content) {
                Ok(c) => {
                    log::info!("Loaded configuration from {}", path.display());
                    c
                }
                Err(e) => {
                    println!(
                        "{}",
                        format!("Error parsing config: {}. Loading defaults.", e).yellow()
                    );
                    Self::default()
                }
            }
        } else {
            println!("Configuration file not found. Creating default at {}", path.display());
            Self::default()
        };

        config.save_to(path)?;

        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());

        let reloaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "sampling": { "interval_ms": 250 }, "display": { "handheld": true } }"#).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.sampling.interval_ms, 250);
        assert_eq!(config.sampling.copy_feedback_ms, 2000);
        assert!(config.display.handheld);
        assert_eq!(config.display.width, 1280);
        assert_eq!(config.camera.ideal_width, 1920);

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("copy_feedback_ms"));
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn zero_interval_is_clamped() {
        let sampling = SamplingConfig {
            interval_ms: 0,
            copy_feedback_ms: 2000,
        };
        assert_eq!(sampling.interval(), Duration::from_millis(1));
        assert_eq!(sampling.copy_feedback(), Duration::from_secs(2));
    }
}
