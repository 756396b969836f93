//! Multi-camera capture core
//!
//! Camera discovery, one capture thread per device feeding a latest-frame
//! slot, and a recorder that samples those slots into per-device clips.

pub mod camera;
pub mod clip;
pub mod config;
pub mod constants;
pub mod error;
pub mod frame;
pub mod manager;
pub mod recorder;
pub mod slot;

pub use camera::{
    CameraDetector, CameraDevice, CameraInfo, CameraOpener, CaptureApi, DeviceLister,
    DeviceProperties, OpenCvOpener, V4l2CtlLister,
};
pub use clip::ClipName;
pub use config::{CaptureTimeouts, FourCc, VideoConfig};
pub use error::{CaptureError, Result};
pub use frame::VideoFrame;
pub use manager::{CameraManager, CaptureStats};
pub use recorder::{
    FrameWriter, OpenCvWriterFactory, ProductLabelProvider, RecordingSummary, VideoRecorder,
    WriterFactory,
};
pub use slot::FrameSlot;
