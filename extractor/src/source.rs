//! Clip decoding.
//!
//! Extraction only needs random access by frame index, the clip's frame
//! count and its nominal frame rate. Readers release their decoder on drop.

use crate::error::{ExtractError, Result};
use capture::VideoFrame;
use opencv::prelude::*;
use opencv::videoio::{CAP_ANY, CAP_PROP_FPS, CAP_PROP_FRAME_COUNT, CAP_PROP_POS_FRAMES, VideoCapture};
use std::path::Path;

/// Random-access reader over one clip
pub trait ClipReader {
    /// Total frames reported by the container
    fn frame_count(&self) -> u64;

    /// Nominal frame rate; zero or negative when the metadata is unusable
    fn fps(&self) -> f64;

    /// Seeks to `index` and decodes one frame.
    ///
    /// # Returns
    /// * `Ok(Some(frame))` - Frame decoded
    /// * `Ok(None)` - Past the end or the decoder returned nothing
    fn read_at(&mut self, index: u64) -> Result<Option<VideoFrame>>;
}

/// Opens clip readers
pub trait ClipOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn ClipReader>>;
}

/// `VideoCapture` over a clip file
pub struct OpenCvClipReader {
    capture: VideoCapture,
    frame_count: u64,
    fps: f64,
}

impl OpenCvClipReader {
    pub fn open(path: &Path) -> Result<Self> {
        let path_str = path
            .to_str()
            .ok_or_else(|| ExtractError::Clip(format!("Non UTF-8 path: {}", path.display())))?;

        let mut capture = VideoCapture::from_file(path_str, CAP_ANY)?;
        if !capture.is_opened()? {
            let _ = capture.release();
            return Err(ExtractError::Clip(format!("Could not open {}", path.display())));
        }

        let frame_count = capture.get(CAP_PROP_FRAME_COUNT)?.max(0.0) as u64;
        let fps = capture.get(CAP_PROP_FPS)?;

        Ok(Self {
            capture,
            frame_count,
            fps,
        })
    }
}

impl ClipReader for OpenCvClipReader {
    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn read_at(&mut self, index: u64) -> Result<Option<VideoFrame>> {
        self.capture.set(CAP_PROP_POS_FRAMES, index as f64)?;

        let mut mat = Mat::default();
        if !self.capture.read(&mut mat)? || mat.empty() {
            return Ok(None);
        }
        Ok(Some(VideoFrame::new(mat)))
    }
}

impl Drop for OpenCvClipReader {
    fn drop(&mut self) {
        let _ = self.capture.release();
    }
}

/// Opens clips through OpenCV
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenCvClipOpener;

impl ClipOpener for OpenCvClipOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn ClipReader>> {
        Ok(Box::new(OpenCvClipReader::open(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_missing_clip_fails() {
        let dir = tempdir().unwrap();
        let result = OpenCvClipOpener.open(&dir.path().join("clip_cam0_x_20240101_000000.mp4"));
        assert!(result.is_err());
    }
}
