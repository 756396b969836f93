//! Detected camera description.

use crate::config::FourCc;

use super::traits::DeviceProperties;

/// Information about an available camera device
#[derive(Debug, Clone, PartialEq)]
pub struct CameraInfo {
    /// Device identifier (`/dev/video<id>`)
    pub device_id: i32,
    /// Device name as reported by the OS, or "Unknown Camera"
    pub name: String,
    /// Backend name, when the device was opened
    pub backend: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<f64>,
    pub fourcc: Option<FourCc>,
}

impl CameraInfo {
    /// Name used for devices found by probing rather than by listing
    pub const UNKNOWN_NAME: &'static str = "Unknown Camera";

    /// Creates an entry carrying only an id and a name
    pub fn named(device_id: i32, name: impl Into<String>) -> Self {
        Self {
            device_id,
            name: name.into(),
            backend: None,
            width: None,
            height: None,
            fps: None,
            fourcc: None,
        }
    }

    pub fn unknown(device_id: i32) -> Self {
        Self::named(device_id, Self::UNKNOWN_NAME)
    }

    /// Creates an entry from negotiated device properties
    ///
    /// # Arguments
    /// * `device_id` - Camera device identifier
    /// * `name` - Display name
    /// * `properties` - Values read from the open device
    pub fn from_properties(device_id: i32, name: impl Into<String>, properties: DeviceProperties) -> Self {
        Self {
            device_id,
            name: name.into(),
            backend: Some(properties.backend),
            width: Some(properties.width),
            height: Some(properties.height),
            fps: Some(properties.fps),
            fourcc: properties.fourcc,
        }
    }

    /// `WIDTHxHEIGHT`, or `?` when unknown
    pub fn resolution_string(&self) -> String {
        match (self.width, self.height) {
            (Some(w), Some(h)) => format!("{}x{}", w, h),
            _ => "?".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_camera() {
        let info = CameraInfo::unknown(4);
        assert_eq!(info.device_id, 4);
        assert_eq!(info.name, "Unknown Camera");
        assert_eq!(info.resolution_string(), "?");
        assert!(info.backend.is_none());
    }

    #[test]
    fn test_from_properties() {
        let props = DeviceProperties {
            width: 1280,
            height: 720,
            fps: 30.0,
            fourcc: Some(FourCc::MJPG),
            backend: "V4L2".to_string(),
        };
        let info = CameraInfo::from_properties(2, "Camera", props);
        assert_eq!(info.resolution_string(), "1280x720");
        assert_eq!(info.fps, Some(30.0));
        assert_eq!(info.fourcc, Some(FourCc::MJPG));
        assert_eq!(info.backend.as_deref(), Some("V4L2"));
    }
}
