//! Frame output.

use crate::error::{ExtractError, Result};
use capture::VideoFrame;
use opencv::core::Vector;
use opencv::imgcodecs;
use std::fs;
use std::path::Path;

/// Destination of extracted frames
pub trait FrameStore {
    /// Creates `dir` and its parents if needed.
    fn prepare_dir(&self, dir: &Path) -> Result<()>;

    fn save(&self, path: &Path, frame: &VideoFrame) -> Result<()>;
}

/// Encodes frames as JPEG files (format chosen by extension)
#[derive(Debug, Default, Clone, Copy)]
pub struct JpegFrameStore;

impl FrameStore for JpegFrameStore {
    fn prepare_dir(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        Ok(())
    }

    fn save(&self, path: &Path, frame: &VideoFrame) -> Result<()> {
        let path_str = path
            .to_str()
            .ok_or_else(|| ExtractError::Clip(format!("Non UTF-8 path: {}", path.display())))?;

        if !imgcodecs::imwrite(path_str, frame.data(), &Vector::new())? {
            return Err(ExtractError::Clip(format!("Could not write {}", path.display())));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_jpeg() {
        let dir = tempdir().unwrap();
        let cam_dir = dir.path().join("frames").join("soda_v1").join("cam0");
        let store = JpegFrameStore;
        store.prepare_dir(&cam_dir).unwrap();

        let frame = VideoFrame::filled(32, 24, (0, 128, 255)).unwrap();
        let path = cam_dir.join("20240105_093000_frame_0000.jpg");
        store.save(&path, &frame).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.len() > 2);
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
