//! Video frame representation.
//!
//! `VideoFrame` wraps an OpenCV `Mat` (BGR) with its capture instant. Cloning
//! performs a deep copy of the pixel buffer, so a clone handed to a consumer
//! never aliases the buffer a capture thread may replace.

use crate::error::{CaptureError, Result};
use opencv::core::{CV_8UC3, Mat, Scalar, Size};
use opencv::imgproc;
use opencv::prelude::*;
use std::time::Instant;

#[derive(Clone)]
pub struct VideoFrame {
    data: Mat,
    width: i32,
    height: i32,
    captured_at: Instant,
}

impl VideoFrame {
    /// Wraps a decoded image, stamping it with the current instant.
    pub fn new(mat: Mat) -> Self {
        let width = mat.cols();
        let height = mat.rows();

        VideoFrame {
            data: mat,
            width,
            height,
            captured_at: Instant::now(),
        }
    }

    /// Creates a solid BGR frame.
    pub fn filled(width: i32, height: i32, bgr: (u8, u8, u8)) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(CaptureError::Config(format!(
                "Frame dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        let color = Scalar::new(f64::from(bgr.0), f64::from(bgr.1), f64::from(bgr.2), 0.0);
        let mat = Mat::new_rows_cols_with_default(height, width, CV_8UC3, color)?;
        Ok(Self::new(mat))
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// True when the frame carries no pixels.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0 || self.data.empty()
    }

    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }

    pub fn data(&self) -> &Mat {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Mat {
        &mut self.data
    }

    pub fn into_mat(self) -> Mat {
        self.data
    }

    /// Returns a copy scaled to `width`x`height` (bilinear). The capture
    /// instant is preserved.
    pub fn resized(&self, width: i32, height: i32) -> Result<VideoFrame> {
        if self.size() == (width, height) {
            return Ok(self.clone());
        }
        let mut dst = Mat::default();
        imgproc::resize(
            &self.data,
            &mut dst,
            Size::new(width, height),
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )?;
        Ok(VideoFrame {
            data: dst,
            width,
            height,
            captured_at: self.captured_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::Vec3b;

    #[test]
    fn test_empty_frame() {
        let frame = VideoFrame::new(Mat::default());
        assert!(frame.is_empty());
        assert_eq!(frame.size(), (0, 0));
    }

    #[test]
    fn test_filled_frame() {
        let frame = VideoFrame::filled(640, 480, (10, 20, 30)).unwrap();
        assert_eq!(frame.width(), 640);
        assert_eq!(frame.height(), 480);
        assert!(!frame.is_empty());
    }

    #[test]
    fn test_filled_rejects_zero_size() {
        assert!(VideoFrame::filled(0, 480, (0, 0, 0)).is_err());
    }

    #[test]
    fn test_resized_keeps_timestamp() {
        let frame = VideoFrame::filled(640, 480, (0, 0, 255)).unwrap();
        let small = frame.resized(320, 240).unwrap();

        assert_eq!(small.size(), (320, 240));
        assert_eq!(small.data().cols(), 320);
        assert_eq!(small.captured_at(), frame.captured_at());
    }

    #[test]
    fn test_clone_is_deep_copy() {
        let frame = VideoFrame::filled(4, 4, (1, 2, 3)).unwrap();
        let mut copy = frame.clone();
        copy.data_mut()
            .at_2d_mut::<Vec3b>(0, 0)
            .unwrap()
            .copy_from_slice(&[9, 9, 9]);

        let original = frame.data().at_2d::<Vec3b>(0, 0).unwrap();
        assert_eq!(original[0], 1);
    }
}
