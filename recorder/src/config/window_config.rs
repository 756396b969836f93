//! Preview window geometry.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Window size and the bounds it may be resized within
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: i32,
    pub height: i32,
    pub min_width: i32,
    pub min_height: i32,
    pub max_width: i32,
    pub max_height: i32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            width: 800,
            height: 600,
            min_width: 400,
            min_height: 300,
            max_width: 1920,
            max_height: 1080,
        }
    }
}

impl WindowConfig {
    /// Checks `0 < min <= size <= max` on both axes.
    pub fn validate(&self) -> Result<()> {
        let axes = [
            ("width", self.min_width, self.width, self.max_width),
            ("height", self.min_height, self.height, self.max_height),
        ];
        for (name, min, value, max) in axes {
            if min <= 0 {
                return Err(AppError::Config(format!(
                    "window min_{} must be positive, got {}",
                    name, min
                )));
            }
            if !(min <= value && value <= max) {
                return Err(AppError::Config(format!(
                    "window {} must be within {}..={}, got {}",
                    name, min, max, value
                )));
            }
        }
        Ok(())
    }

    /// Clamps a size into the configured bounds.
    pub fn clamp(&self, width: i32, height: i32) -> (i32, i32) {
        (
            width.clamp(self.min_width, self.max_width),
            height.clamp(self.min_height, self.max_height),
        )
    }

    /// Whether a size reported by the window system is within bounds.
    pub fn contains(&self, width: i32, height: i32) -> bool {
        (self.min_width..=self.max_width).contains(&width)
            && (self.min_height..=self.max_height).contains(&height)
    }

    /// Size after growing (x1.2) or shrinking (x0.8), clamped to bounds.
    pub fn scaled(&self, grow: bool) -> (i32, i32) {
        let (num, den) = if grow { (6, 5) } else { (4, 5) };
        self.clamp(self.width * num / den, self.height * num / den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = WindowConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!((config.width, config.height), (800, 600));
    }

    #[test]
    fn test_size_outside_bounds_is_rejected() {
        let config = WindowConfig {
            width: 300,
            ..WindowConfig::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        let config = WindowConfig {
            height: 2000,
            ..WindowConfig::default()
        };
        assert!(config.validate().is_err());

        let config = WindowConfig {
            min_width: 0,
            width: 0,
            ..WindowConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scaled_grows_and_shrinks_within_bounds() {
        let config = WindowConfig::default();
        assert_eq!(config.scaled(true), (960, 720));
        assert_eq!(config.scaled(false), (640, 480));

        let at_max = WindowConfig {
            width: 1800,
            height: 1000,
            ..WindowConfig::default()
        };
        assert_eq!(at_max.scaled(true), (1920, 1080));

        let at_min = WindowConfig {
            width: 420,
            height: 320,
            ..WindowConfig::default()
        };
        assert_eq!(at_min.scaled(false), (400, 300));
    }
}
