//! Device seams.
//!
//! Everything that touches capture hardware goes through `CameraOpener` and
//! `CameraDevice`, so detection and the capture workers can run against
//! in-memory devices in tests.

use crate::config::{FourCc, VideoConfig};
use crate::error::Result;
use crate::frame::VideoFrame;
use opencv::videoio::{CAP_ANY, CAP_V4L2};
use std::fmt;

/// Capture backend requested when opening a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureApi {
    V4l2,
    Any,
}

impl CaptureApi {
    /// Order in which backends are tried during initialization
    pub const PREFERENCE: [CaptureApi; 2] = [CaptureApi::V4l2, CaptureApi::Any];

    /// OpenCV `CAP_*` constant
    pub fn code(self) -> i32 {
        match self {
            CaptureApi::V4l2 => CAP_V4L2,
            CaptureApi::Any => CAP_ANY,
        }
    }
}

impl fmt::Display for CaptureApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureApi::V4l2 => write!(f, "V4L2"),
            CaptureApi::Any => write!(f, "ANY"),
        }
    }
}

/// Settings a device reports after negotiation
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProperties {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub fourcc: Option<FourCc>,
    pub backend: String,
}

/// An open capture device.
///
/// Owned by exactly one thread at a time; it is moved into its capture
/// worker and never shared.
pub trait CameraDevice: Send {
    fn device_id(&self) -> i32;

    /// Applies the baseline resolution and pixel format.
    fn configure(&mut self, config: &VideoConfig) -> Result<()>;

    /// Reads one frame. An empty or failed read is an error.
    fn read_frame(&mut self) -> Result<VideoFrame>;

    fn properties(&self) -> Result<DeviceProperties>;

    /// Releases the underlying handle. Further reads fail.
    fn release(&mut self);
}

/// Opens capture devices by id
pub trait CameraOpener: Send + Sync {
    /// Opens `device_id` with the given backend.
    ///
    /// # Errors
    /// `CaptureError::Camera` when the device cannot be opened.
    fn open(&self, device_id: i32, api: CaptureApi) -> Result<Box<dyn CameraDevice>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_preference_order() {
        assert_eq!(CaptureApi::PREFERENCE, [CaptureApi::V4l2, CaptureApi::Any]);
        assert_eq!(CaptureApi::V4l2.code(), CAP_V4L2);
        assert_eq!(CaptureApi::Any.code(), CAP_ANY);
        assert_eq!(CaptureApi::V4l2.to_string(), "V4L2");
    }
}
