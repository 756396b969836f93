//! State of one recording session.

use crate::frame::VideoFrame;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::writer::FrameWriter;

struct ClipWriter {
    path: PathBuf,
    writer: Box<dyn FrameWriter>,
    frames_written: u64,
    write_failures: u64,
}

/// Outcome of feeding one tick to one clip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The device had no frame yet
    NoFrame,
    /// The writer rejected the frame
    Failed { failures: u64, reason: String },
}

/// One clip of a finished session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipSummary {
    pub device_id: i32,
    pub path: PathBuf,
    pub frames_written: u64,
}

/// Returned when a session stops
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSummary {
    pub product: String,
    pub timestamp: String,
    pub product_dir: PathBuf,
    pub duration: Duration,
    /// Write ticks seen while the session was active
    pub ticks: u64,
    pub clips: Vec<ClipSummary>,
}

impl RecordingSummary {
    /// Total frames written across all clips
    pub fn frames_written(&self) -> u64 {
        self.clips.iter().map(|clip| clip.frames_written).sum()
    }
}

/// Writers of an active recording, keyed by device id.
///
/// The writer set is fixed when the session is created.
pub struct RecordingSession {
    product: String,
    timestamp: String,
    product_dir: PathBuf,
    started_at: Instant,
    writers: BTreeMap<i32, ClipWriter>,
    ticks: u64,
}

impl RecordingSession {
    pub(crate) fn new(product: &str, timestamp: &str, product_dir: &Path) -> Self {
        Self {
            product: product.to_string(),
            timestamp: timestamp.to_string(),
            product_dir: product_dir.to_path_buf(),
            started_at: Instant::now(),
            writers: BTreeMap::new(),
            ticks: 0,
        }
    }

    pub(crate) fn add_writer(&mut self, device_id: i32, path: PathBuf, writer: Box<dyn FrameWriter>) {
        self.writers.insert(
            device_id,
            ClipWriter {
                path,
                writer,
                frames_written: 0,
                write_failures: 0,
            },
        );
    }

    pub(crate) fn begin_tick(&mut self) {
        self.ticks += 1;
    }

    pub(crate) fn write(&mut self, device_id: i32, frame: Option<&VideoFrame>) -> WriteOutcome {
        let (Some(clip), Some(frame)) = (self.writers.get_mut(&device_id), frame) else {
            return WriteOutcome::NoFrame;
        };

        match clip.writer.write(frame) {
            Ok(()) => {
                clip.frames_written += 1;
                WriteOutcome::Written
            }
            Err(e) => {
                clip.write_failures += 1;
                WriteOutcome::Failed {
                    failures: clip.write_failures,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Closes every writer and summarizes the session.
    ///
    /// Release errors are collected per device instead of aborting.
    pub(crate) fn finish(mut self) -> (RecordingSummary, Vec<(i32, String)>) {
        let duration = self.started_at.elapsed();
        let mut errors = Vec::new();
        let mut clips = Vec::with_capacity(self.writers.len());

        for (device_id, mut clip) in std::mem::take(&mut self.writers) {
            if let Err(e) = clip.writer.release() {
                errors.push((device_id, e.to_string()));
            }
            clips.push(ClipSummary {
                device_id,
                path: clip.path,
                frames_written: clip.frames_written,
            });
        }

        let summary = RecordingSummary {
            product: self.product,
            timestamp: self.timestamp,
            product_dir: self.product_dir,
            duration,
            ticks: self.ticks,
            clips,
        };
        (summary, errors)
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn product_dir(&self) -> &Path {
        &self.product_dir
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Devices with an open writer, ascending
    pub fn device_ids(&self) -> Vec<i32> {
        self.writers.keys().copied().collect()
    }

    pub fn writer_count(&self) -> usize {
        self.writers.len()
    }

    pub fn frames_written(&self, device_id: i32) -> Option<u64> {
        self.writers.get(&device_id).map(|clip| clip.frames_written)
    }
}
