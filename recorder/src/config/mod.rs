//! Recorder configuration

pub mod app_config;
pub mod capture_config;
pub mod logging_config;
pub mod window_config;

pub use app_config::{AppConfig, CONFIG_ENV_VAR, CONFIG_FILE_NAME, PathsConfig, VideoSettings};
pub use capture_config::CaptureConfig;
pub use logging_config::LoggingConfig;
pub use window_config::WindowConfig;
