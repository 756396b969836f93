//! Top-level recorder configuration.
//!
//! Stored as JSON with one object per section. Every key is optional; missing
//! keys and sections take their defaults.
//!
//! ```json
//! {
//!   "video": { "fps": 30, "width": 1280, "height": 720, "codec": "mp4v" },
//!   "capture": { "device_ids": [0, 2] },
//!   "paths": { "clips_dir": "/data/clips" },
//!   "logging": { "log_level": "debug" }
//! }
//! ```

use crate::config::{CaptureConfig, LoggingConfig, WindowConfig};
use crate::error::{AppError, Result};
use capture::{FourCc, VideoConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding an explicit config path
pub const CONFIG_ENV_VAR: &str = "MULTICAM_CONFIG";
/// File name searched for under `./config/` and `./`
pub const CONFIG_FILE_NAME: &str = "multicam.json";

/// Clip format shared by every camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    pub codec: String,
}

impl Default for VideoSettings {
    fn default() -> Self {
        let video = VideoConfig::default();
        VideoSettings {
            fps: video.fps(),
            width: video.width(),
            height: video.height(),
            codec: video.codec().to_string(),
        }
    }
}

/// Output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of `<product>/clip_cam<id>_...` clips
    pub clips_dir: String,
    /// JSON array of known product base names
    pub products_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            clips_dir: "clips".to_string(),
            products_file: "products.json".to_string(),
        }
    }
}

/// Recorder application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub video: VideoSettings,
    pub window: WindowConfig,
    pub capture: CaptureConfig,
    pub paths: PathsConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Parses and validates a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = config_loader::load_config_file(path)?;
        Self::from_json(&content)
    }

    /// Picks the config file to load.
    ///
    /// # Arguments
    /// * `env_path` - Value of `MULTICAM_CONFIG`, if set
    /// * `cli_path` - First command-line argument, if any
    /// * `base` - Directory searched for `config/multicam.json`, then `multicam.json`
    ///
    /// # Returns
    /// The first candidate that exists, or `None` to run on defaults
    pub fn locate(env_path: Option<&str>, cli_path: Option<&str>, base: &Path) -> Option<PathBuf> {
        let explicit = [env_path, cli_path]
            .into_iter()
            .flatten()
            .map(PathBuf::from)
            .find(|path| path.exists());

        explicit.or_else(|| config_loader::find_config_file_in(CONFIG_FILE_NAME, None, base).ok())
    }

    /// Video settings as the validated capture type.
    pub fn video_config(&self) -> Result<VideoConfig> {
        let codec = FourCc::new(&self.video.codec)?;
        let config = VideoConfig::new(self.video.fps, self.video.width, self.video.height)?;
        Ok(config.with_codec(codec))
    }

    pub fn validate(&self) -> Result<()> {
        self.video_config()?;
        self.window.validate()?;

        if self.capture.max_probe_devices < 0 {
            return Err(AppError::Config(format!(
                "capture.max_probe_devices must not be negative, got {}",
                self.capture.max_probe_devices
            )));
        }
        if let Some(id) = self.capture.device_ids.iter().find(|id| **id < 0) {
            return Err(AppError::Config(format!("invalid device id {}", id)));
        }
        if self.paths.clips_dir.trim().is_empty() {
            return Err(AppError::Config("paths.clips_dir must not be empty".to_string()));
        }
        if self.paths.products_file.trim().is_empty() {
            return Err(AppError::Config(
                "paths.products_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
