//! OpenCV-backed capture devices.

use crate::config::{FourCc, VideoConfig};
use crate::error::{CaptureError, Result};
use crate::frame::VideoFrame;
use opencv::prelude::*;
use opencv::videoio::{
    CAP_PROP_FOURCC, CAP_PROP_FPS, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH, VideoCapture,
};

use super::traits::{CameraDevice, CameraOpener, CaptureApi, DeviceProperties};

/// Video capture device
///
/// Thin wrapper over `VideoCapture`. The handle is released exactly once,
/// either explicitly or on drop.
pub struct Camera {
    capture: VideoCapture,
    device_id: i32,
    api: CaptureApi,
    released: bool,
}

impl Camera {
    /// Opens a device with the given backend
    ///
    /// # Arguments
    /// * `device_id` - `/dev/video<id>` index
    /// * `api` - Backend to request
    ///
    /// # Returns
    /// * `Ok(Camera)` - Device is open
    /// * `Err(CaptureError::Camera)` - Open failed or the device reports closed
    pub fn open(device_id: i32, api: CaptureApi) -> Result<Self> {
        let mut capture = VideoCapture::new(device_id, api.code()).map_err(|e| {
            CaptureError::Camera(format!("Failed to open device {} ({}): {}", device_id, api, e))
        })?;

        if !capture.is_opened().unwrap_or(false) {
            let _ = capture.release();
            return Err(CaptureError::Camera(format!(
                "Device {} is not available via {}",
                device_id, api
            )));
        }

        Ok(Self {
            capture,
            device_id,
            api,
            released: false,
        })
    }

    pub fn api(&self) -> CaptureApi {
        self.api
    }

    fn property(&self, prop: i32) -> Result<f64> {
        self.capture.get(prop).map_err(|e| {
            CaptureError::Camera(format!(
                "Error reading property {} of device {}: {}",
                prop, self.device_id, e
            ))
        })
    }
}

impl CameraDevice for Camera {
    fn device_id(&self) -> i32 {
        self.device_id
    }

    fn configure(&mut self, config: &VideoConfig) -> Result<()> {
        // Drivers may ignore any of these; the negotiated values are read back
        // through `properties`.
        let _ = self
            .capture
            .set(CAP_PROP_FRAME_WIDTH, f64::from(config.width()));
        let _ = self
            .capture
            .set(CAP_PROP_FRAME_HEIGHT, f64::from(config.height()));
        let _ = self
            .capture
            .set(CAP_PROP_FOURCC, f64::from(FourCc::MJPG.code()));
        Ok(())
    }

    fn read_frame(&mut self) -> Result<VideoFrame> {
        if self.released {
            return Err(CaptureError::Camera(format!(
                "Device {} was released",
                self.device_id
            )));
        }

        let mut mat = Mat::default();
        let success = self.capture.read(&mut mat).map_err(|e| {
            CaptureError::Camera(format!("Failed to read from device {}: {}", self.device_id, e))
        })?;

        if !success || mat.empty() || mat.cols() == 0 || mat.rows() == 0 {
            return Err(CaptureError::Camera(format!(
                "Empty frame from device {}",
                self.device_id
            )));
        }

        Ok(VideoFrame::new(mat))
    }

    fn properties(&self) -> Result<DeviceProperties> {
        let width = self.property(CAP_PROP_FRAME_WIDTH)?;
        let height = self.property(CAP_PROP_FRAME_HEIGHT)?;
        let fps = self.property(CAP_PROP_FPS)?;
        let fourcc = self.property(CAP_PROP_FOURCC)?;
        let backend = self
            .capture
            .get_backend_name()
            .unwrap_or_else(|_| self.api.to_string());

        Ok(DeviceProperties {
            width: width.max(0.0) as u32,
            height: height.max(0.0) as u32,
            fps,
            fourcc: FourCc::from_property(fourcc),
            backend,
        })
    }

    fn release(&mut self) {
        if !self.released {
            let _ = self.capture.release();
            self.released = true;
        }
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        self.release();
    }
}

/// Opens real devices through OpenCV
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenCvOpener;

impl CameraOpener for OpenCvOpener {
    fn open(&self, device_id: i32, api: CaptureApi) -> Result<Box<dyn CameraDevice>> {
        Ok(Box::new(Camera::open(device_id, api)?))
    }
}
