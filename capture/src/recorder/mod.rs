//! Recording lifecycle.
//!
//! `VideoRecorder` turns start/stop commands into one clip per active
//! device. All clips of a session share the product label, the session
//! timestamp and the video configuration; every tick appends each device's
//! latest frame to its clip, which is what keeps the clips aligned.

pub mod session;
pub mod writer;

pub use session::{ClipSummary, RecordingSession, RecordingSummary, WriteOutcome};
pub use writer::{FrameWriter, OpenCvWriter, OpenCvWriterFactory, WriterFactory};

use crate::clip::{ClipName, session_timestamp};
use crate::config::VideoConfig;
use crate::constants::logging::READ_FAILURE_LOG_INTERVAL;
use crate::error::{CaptureError, Result};
use crate::frame::VideoFrame;
use crate::manager::CameraManager;
use chrono::Local;
use logging::Logger;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Source of the product label for a new session.
///
/// May block for as long as the operator needs; capture workers keep
/// running meanwhile.
pub trait ProductLabelProvider {
    /// Returns the versioned label, or `None` when the operator cancels.
    fn request_label(&mut self) -> Option<String>;
}

impl<F> ProductLabelProvider for F
where
    F: FnMut() -> Option<String>,
{
    fn request_label(&mut self) -> Option<String> {
        self()
    }
}

/// Records synchronized per-device clips
pub struct VideoRecorder {
    config: VideoConfig,
    clips_dir: PathBuf,
    factory: Arc<dyn WriterFactory>,
    session: Option<RecordingSession>,
    logger: Logger,
}

impl VideoRecorder {
    /// Creates an idle recorder
    ///
    /// # Arguments
    /// * `config` - fps, resolution and codec of every clip
    /// * `clips_dir` - Root directory; clips go to `<clips_dir>/<product>/`
    /// * `factory` - Opens clip writers
    /// * `logger` - Parent logger; a `VideoRecorder` component is derived from it
    pub fn new(
        config: VideoConfig,
        clips_dir: impl Into<PathBuf>,
        factory: Arc<dyn WriterFactory>,
        logger: &Logger,
    ) -> Self {
        Self {
            config,
            clips_dir: clips_dir.into(),
            factory,
            session: None,
            logger: logger.for_component("VideoRecorder"),
        }
    }

    pub fn clips_dir(&self) -> &Path {
        &self.clips_dir
    }

    /// Starts a session over every active camera
    ///
    /// # Arguments
    /// * `cameras` - Source of active device ids and frames
    /// * `labels` - Asked for the product label (may cancel)
    ///
    /// # Returns
    /// * `Ok(true)` - Recording with at least one writer
    /// * `Ok(false)` - Already recording, no cameras, cancelled, or no writer opened
    /// * `Err` - Invalid label or the product directory could not be created
    pub fn start_recording(
        &mut self,
        cameras: &CameraManager,
        labels: &mut dyn ProductLabelProvider,
    ) -> Result<bool> {
        if self.session.is_some() {
            self.logger.debug("Start requested while already recording");
            return Ok(false);
        }

        let device_ids = cameras.active_device_ids();
        if device_ids.is_empty() {
            self.logger.error("No cameras available for recording");
            return Ok(false);
        }

        self.logger.info("Selecting product...");
        let Some(product) = labels.request_label() else {
            self.logger.info("Recording cancelled by user");
            return Ok(false);
        };
        validate_label(&product)?;

        let product_dir = self.clips_dir.join(&product);
        let created_dir = !product_dir.exists();
        fs::create_dir_all(&product_dir)?;
        self.logger
            .info(&format!("Product directory ready: {}", product_dir.display()));

        let timestamp = session_timestamp(&Local::now());
        let mut session = RecordingSession::new(&product, &timestamp, &product_dir);

        self.logger.info(&format!(
            "RECORDING: {} - {} using camera(s) {:?}",
            product, timestamp, device_ids
        ));

        for device_id in device_ids {
            let file_name = ClipName::new(device_id, &product, &timestamp).file_name();
            let path = product_dir.join(&file_name);

            match self.factory.create(&path, &self.config) {
                Ok(writer) => {
                    self.logger.info(&format!("Recording: {}", file_name));
                    session.add_writer(device_id, path, writer);
                }
                Err(e) => {
                    self.logger.error(&format!(
                        "Error creating writer for camera {}: {}",
                        device_id, e
                    ));
                }
            }
        }

        if session.writer_count() == 0 {
            self.logger.error("No clip writer could be opened, recording not started");
            if created_dir && let Err(e) = fs::remove_dir(&product_dir) {
                self.logger.warn(&format!(
                    "Could not remove unused directory {}: {}",
                    product_dir.display(),
                    e
                ));
            }
            return Ok(false);
        }

        self.session = Some(session);
        Ok(true)
    }

    /// Appends each device's latest frame to its clip. One call is one tick.
    ///
    /// No-op when not recording.
    pub fn write_frames(&mut self, cameras: &CameraManager) {
        if self.session.is_some() {
            self.write_snapshot(&cameras.latest_frames());
        }
    }

    /// Same as `write_frames`, from frames already taken out of the slots
    /// this tick (`CameraManager::latest_frames`). Lets the display and the
    /// recorder share one copy per device.
    pub fn write_snapshot(&mut self, frames: &[(i32, VideoFrame)]) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        session.begin_tick();
        for device_id in session.device_ids() {
            let frame = frames
                .iter()
                .find(|(id, _)| *id == device_id)
                .map(|(_, frame)| frame);
            if let WriteOutcome::Failed { failures, reason } = session.write(device_id, frame)
                && (failures == 1 || failures.is_multiple_of(READ_FAILURE_LOG_INTERVAL))
            {
                self.logger.warn(&format!(
                    "Failed to write frame for camera {} ({} so far): {}",
                    device_id, failures, reason
                ));
            }
        }
    }

    /// Ends the session and closes every clip
    ///
    /// # Returns
    /// * `Some(summary)` - A session was active
    /// * `None` - Nothing was recording
    pub fn stop_recording(&mut self) -> Option<RecordingSummary> {
        let session = self.session.take()?;

        let (summary, errors) = session.finish();
        for (device_id, error) in errors {
            self.logger
                .error(&format!("Error closing clip for camera {}: {}", device_id, error));
        }

        for clip in &summary.clips {
            self.logger.info(&format!(
                "Saved: clip_cam{} ({} frames, {:.1}s)",
                clip.device_id,
                clip.frames_written,
                summary.duration.as_secs_f64()
            ));
        }
        self.logger.info(&format!(
            "Recording finished - Duration: {:.1}s, clips saved to {}",
            summary.duration.as_secs_f64(),
            summary.product_dir.display()
        ));

        Some(summary)
    }

    /// Stops an active session, if any
    pub fn cleanup(&mut self) {
        if self.session.is_some() {
            self.stop_recording();
        }
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    pub fn current_product(&self) -> Option<&str> {
        self.session.as_ref().map(RecordingSession::product)
    }

    /// Time since the session started, zero when idle
    pub fn elapsed(&self) -> Duration {
        self.session
            .as_ref()
            .map(RecordingSession::elapsed)
            .unwrap_or_default()
    }

    pub fn session(&self) -> Option<&RecordingSession> {
        self.session.as_ref()
    }
}

impl Drop for VideoRecorder {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// A label becomes a directory and part of every clip name.
fn validate_label(label: &str) -> Result<()> {
    if label.trim().is_empty() {
        return Err(CaptureError::Recording("Product label is empty".to_string()));
    }
    if label.contains(['/', '\\']) || label == "." || label == ".." {
        return Err(CaptureError::Recording(format!(
            "Product label '{}' is not a valid directory name",
            label
        )));
    }
    Ok(())
}
