//! Clip writers.

use crate::config::VideoConfig;
use crate::error::{CaptureError, Result};
use crate::frame::VideoFrame;
use opencv::core::Size;
use opencv::prelude::*;
use opencv::videoio::VideoWriter;
use std::path::Path;

/// Appends frames to one clip file
pub trait FrameWriter: Send {
    fn write(&mut self, frame: &VideoFrame) -> Result<()>;

    /// Flushes and closes the file. Further writes fail.
    fn release(&mut self) -> Result<()>;
}

/// Opens clip writers
pub trait WriterFactory: Send + Sync {
    /// Opens a writer for `path` at the configured fps, resolution and codec.
    ///
    /// # Errors
    /// `CaptureError::Recording` when the container cannot be opened.
    fn create(&self, path: &Path, config: &VideoConfig) -> Result<Box<dyn FrameWriter>>;
}

/// `VideoWriter`-backed clip file
pub struct OpenCvWriter {
    writer: VideoWriter,
    width: i32,
    height: i32,
    released: bool,
}

impl OpenCvWriter {
    /// Opens a color clip
    ///
    /// # Arguments
    /// * `path` - Output file; the parent directory must exist
    /// * `config` - fps, frame size and codec shared by the whole session
    pub fn open(path: &Path, config: &VideoConfig) -> Result<Self> {
        let width = config.width() as i32;
        let height = config.height() as i32;
        let path_str = path
            .to_str()
            .ok_or_else(|| CaptureError::Recording(format!("Non UTF-8 path: {}", path.display())))?;

        let writer = VideoWriter::new(
            path_str,
            config.codec().code(),
            config.fps(),
            Size::new(width, height),
            true,
        )?;

        if !writer.is_opened()? {
            return Err(CaptureError::Recording(format!(
                "Could not open writer for {} ({})",
                path.display(),
                config.codec()
            )));
        }

        Ok(Self {
            writer,
            width,
            height,
            released: false,
        })
    }
}

impl FrameWriter for OpenCvWriter {
    fn write(&mut self, frame: &VideoFrame) -> Result<()> {
        if self.released {
            return Err(CaptureError::Recording("Writer already released".to_string()));
        }
        if frame.is_empty() {
            return Err(CaptureError::Recording("Empty frame".to_string()));
        }

        // VideoWriter silently drops frames whose size differs from the clip's.
        if frame.size() != (self.width, self.height) {
            let resized = frame.resized(self.width, self.height)?;
            self.writer.write(resized.data())?;
        } else {
            self.writer.write(frame.data())?;
        }
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        if !self.released {
            self.released = true;
            self.writer.release()?;
        }
        Ok(())
    }
}

impl Drop for OpenCvWriter {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

/// Creates `OpenCvWriter`s
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenCvWriterFactory;

impl WriterFactory for OpenCvWriterFactory {
    fn create(&self, path: &Path, config: &VideoConfig) -> Result<Box<dyn FrameWriter>> {
        Ok(Box::new(OpenCvWriter::open(path, config)?))
    }
}
