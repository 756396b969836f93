//! Capture configuration types.
//!
//! Immutable settings shared by every device of a session: one frame rate,
//! one resolution and one codec, validated once at construction.

use crate::error::{CaptureError, Result};
use std::fmt;
use std::time::Duration;

/// Four-character codec / pixel-format tag (`mp4v`, `MJPG`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FourCc([u8; 4]);

impl FourCc {
    /// MPEG-4 part 2, the clip codec
    pub const MP4V: FourCc = FourCc(*b"mp4v");
    /// Motion JPEG, the camera pixel format requested at initialization
    pub const MJPG: FourCc = FourCc(*b"MJPG");

    /// Parses a tag of exactly four printable ASCII characters.
    pub fn new(tag: &str) -> Result<Self> {
        let bytes: [u8; 4] = tag
            .as_bytes()
            .try_into()
            .map_err(|_| CaptureError::Config(format!("FourCC must be 4 characters, got '{}'", tag)))?;
        if !bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            return Err(CaptureError::Config(format!(
                "FourCC must be printable ASCII, got '{}'",
                tag
            )));
        }
        Ok(FourCc(bytes))
    }

    /// Packed code as expected by OpenCV (`c1 | c2 << 8 | c3 << 16 | c4 << 24`).
    pub fn code(&self) -> i32 {
        i32::from_le_bytes(self.0)
    }

    /// Decodes the `CAP_PROP_FOURCC` property value reported by a device.
    pub fn from_property(value: f64) -> Option<Self> {
        if !value.is_finite() || value <= 0.0 || value > f64::from(u32::MAX) {
            return None;
        }
        let bytes = (value as u32).to_le_bytes();
        bytes
            .iter()
            .all(|b| b.is_ascii_graphic() || *b == b' ')
            .then_some(FourCc(bytes))
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// Recording / capture configuration
#[derive(Debug, Clone, PartialEq)]
pub struct VideoConfig {
    fps: f64,
    width: u32,
    height: u32,
    codec: FourCc,
}

impl VideoConfig {
    /// Maximum accepted frame rate
    pub const MAX_FPS: f64 = 240.0;
    /// Maximum accepted dimension (8K)
    pub const MAX_DIMENSION: u32 = 7680;

    /// Creates a validated configuration using the `mp4v` codec.
    ///
    /// # Errors
    /// `CaptureError::Config` when fps is not a finite value in (0, 240]
    /// or a dimension is outside 1..=7680.
    pub fn new(fps: f64, width: u32, height: u32) -> Result<Self> {
        if !fps.is_finite() || fps <= 0.0 || fps > Self::MAX_FPS {
            return Err(CaptureError::Config(format!(
                "FPS must be in (0, {}], got {}",
                Self::MAX_FPS,
                fps
            )));
        }
        for (name, value) in [("Width", width), ("Height", height)] {
            if !(1..=Self::MAX_DIMENSION).contains(&value) {
                return Err(CaptureError::Config(format!(
                    "{} must be between 1 and {}, got {}",
                    name,
                    Self::MAX_DIMENSION,
                    value
                )));
            }
        }

        Ok(Self {
            fps,
            width,
            height,
            codec: FourCc::MP4V,
        })
    }

    pub fn with_codec(mut self, codec: FourCc) -> Self {
        self.codec = codec;
        self
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn codec(&self) -> FourCc {
        self.codec
    }

    /// Nominal time between two frames (1 / fps)
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps)
    }
}

/// 60 FPS, 800x600, mp4v
impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            fps: 60.0,
            width: 800,
            height: 600,
            codec: FourCc::MP4V,
        }
    }
}

/// Deadlines and retry counts for device operations
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureTimeouts {
    /// Quick probe: open + one read
    pub probe: Duration,
    /// Full single-device initialization: open, configure, trial reads
    pub init: Duration,
    /// Per-worker join window during cleanup
    pub join: Duration,
    /// Trial reads attempted during initialization
    pub trial_reads: u32,
    /// Pause between failed trial reads
    pub trial_read_delay: Duration,
    /// Pause after a failed read inside a capture worker
    pub read_failure_backoff: Duration,
    /// Pause between cleanup and re-initialization on restart/redetect
    pub settle: Duration,
}

impl Default for CaptureTimeouts {
    fn default() -> Self {
        Self {
            probe: Duration::from_secs(3),
            init: Duration::from_secs(10),
            join: Duration::from_secs(2),
            trial_reads: 3,
            trial_read_delay: Duration::from_millis(100),
            read_failure_backoff: Duration::from_millis(10),
            settle: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = VideoConfig::default();
        assert_eq!(config.fps(), 60.0);
        assert_eq!(config.resolution(), (800, 600));
        assert_eq!(config.codec(), FourCc::MP4V);
    }

    #[test]
    fn test_rejects_non_positive_fps() {
        assert!(matches!(VideoConfig::new(0.0, 640, 480), Err(CaptureError::Config(_))));
        assert!(VideoConfig::new(-30.0, 640, 480).is_err());
        assert!(VideoConfig::new(f64::NAN, 640, 480).is_err());
        assert!(VideoConfig::new(f64::INFINITY, 640, 480).is_err());
        assert!(VideoConfig::new(241.0, 640, 480).is_err());
    }

    #[test]
    fn test_rejects_zero_or_oversized_dimensions() {
        assert!(VideoConfig::new(30.0, 0, 480).is_err());
        assert!(VideoConfig::new(30.0, 640, 0).is_err());
        assert!(VideoConfig::new(30.0, 10_000, 480).is_err());
        assert!(VideoConfig::new(30.0, 1, 1).is_ok());
    }

    #[test]
    fn test_frame_interval() {
        let config = VideoConfig::new(25.0, 640, 480).unwrap();
        assert_eq!(config.frame_interval(), Duration::from_millis(40));
    }

    #[test]
    fn test_fourcc_code_matches_opencv_packing() {
        // cv::VideoWriter::fourcc('m','p','4','v')
        assert_eq!(FourCc::MP4V.code(), 0x7634_706d);
        assert_eq!(FourCc::new("MJPG").unwrap(), FourCc::MJPG);
    }

    #[test]
    fn test_fourcc_rejects_bad_tags() {
        assert!(FourCc::new("mp4").is_err());
        assert!(FourCc::new("mp4vv").is_err());
        assert!(FourCc::new("m\u{1}4v").is_err());
    }

    #[test]
    fn test_fourcc_from_property() {
        let value = f64::from(FourCc::MJPG.code() as u32);
        assert_eq!(FourCc::from_property(value), Some(FourCc::MJPG));
        assert_eq!(FourCc::from_property(0.0), None);
        assert_eq!(FourCc::from_property(-1.0), None);
        assert_eq!(FourCc::MJPG.to_string(), "MJPG");
    }
}
