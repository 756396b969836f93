//! Camera module
//!
//! Device abstraction, OpenCV-backed devices, OS device listing and
//! camera detection.

pub mod detection;
pub mod device;
pub mod info;
pub mod lister;
pub mod timeout;
pub mod traits;

pub use detection::CameraDetector;
pub use device::{Camera, OpenCvOpener};
pub use info::CameraInfo;
pub use lister::{DeviceLister, ListedDevice, V4l2CtlLister, parse_v4l2_listing};
pub use timeout::run_with_timeout;
pub use traits::{CameraDevice, CameraOpener, CaptureApi, DeviceProperties};
