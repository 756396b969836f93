//! In-memory cameras and clip writers shared by the integration tests.

#![allow(dead_code)]

use capture::{
    CameraDevice, CameraOpener, CaptureApi, CaptureError, CaptureTimeouts, DeviceProperties,
    FrameWriter, Result, VideoConfig, VideoFrame, WriterFactory,
};
use logging::{LogLevel, Logger};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// How a fake device behaves once opened
#[derive(Clone)]
pub enum Behavior {
    /// Every read succeeds
    Healthy,
    /// Opens but never produces a frame
    Silent,
    /// Only the `Any` backend can open it
    AnyBackendOnly,
    /// First `n` reads succeed, the rest fail
    FailAfter(u64),
    /// Reads succeed but each one blocks for the given time
    Slow(Duration),
}

#[derive(Default)]
pub struct OpenerState {
    /// Handles currently open per device
    pub open_handles: HashMap<i32, i32>,
    /// Highest number of simultaneous handles ever seen per device
    pub max_handles: HashMap<i32, i32>,
    pub open_calls: Vec<(i32, CaptureApi)>,
}

#[derive(Clone, Default)]
pub struct FakeOpener {
    behaviors: HashMap<i32, Behavior>,
    pub state: Arc<Mutex<OpenerState>>,
}

impl FakeOpener {
    pub fn new(devices: &[(i32, Behavior)]) -> Self {
        Self {
            behaviors: devices.iter().cloned().collect(),
            state: Arc::default(),
        }
    }

    pub fn healthy(ids: &[i32]) -> Self {
        let devices: Vec<_> = ids.iter().map(|&id| (id, Behavior::Healthy)).collect();
        Self::new(&devices)
    }

    pub fn open_handles(&self, device_id: i32) -> i32 {
        let state = self.state.lock().unwrap();
        state.open_handles.get(&device_id).copied().unwrap_or(0)
    }

    pub fn total_open_handles(&self) -> i32 {
        self.state.lock().unwrap().open_handles.values().sum()
    }

    pub fn max_handles(&self, device_id: i32) -> i32 {
        let state = self.state.lock().unwrap();
        state.max_handles.get(&device_id).copied().unwrap_or(0)
    }
}

impl CameraOpener for FakeOpener {
    fn open(&self, device_id: i32, api: CaptureApi) -> Result<Box<dyn CameraDevice>> {
        let mut state = self.state.lock().unwrap();
        state.open_calls.push((device_id, api));

        let behavior = self
            .behaviors
            .get(&device_id)
            .cloned()
            .ok_or_else(|| CaptureError::Camera(format!("no device {}", device_id)))?;
        if matches!(behavior, Behavior::AnyBackendOnly) && api != CaptureApi::Any {
            return Err(CaptureError::Camera("backend not supported".to_string()));
        }

        let open = state.open_handles.entry(device_id).or_insert(0);
        *open += 1;
        let open = *open;
        let max = state.max_handles.entry(device_id).or_insert(0);
        *max = (*max).max(open);

        Ok(Box::new(FakeCamera {
            device_id,
            behavior,
            reads: 0,
            released: false,
            state: Arc::clone(&self.state),
        }))
    }
}

pub struct FakeCamera {
    device_id: i32,
    behavior: Behavior,
    reads: u64,
    released: bool,
    state: Arc<Mutex<OpenerState>>,
}

impl CameraDevice for FakeCamera {
    fn device_id(&self) -> i32 {
        self.device_id
    }

    fn configure(&mut self, _config: &VideoConfig) -> Result<()> {
        Ok(())
    }

    fn read_frame(&mut self) -> Result<VideoFrame> {
        if self.released {
            return Err(CaptureError::Camera("released".to_string()));
        }
        self.reads += 1;
        match &self.behavior {
            Behavior::Silent => return Err(CaptureError::Camera("no data".to_string())),
            Behavior::FailAfter(n) if self.reads > *n => {
                return Err(CaptureError::Camera("read failed".to_string()));
            }
            Behavior::Slow(delay) => thread::sleep(*delay),
            _ => {}
        }
        // Blue channel carries the device id so frames can be told apart.
        VideoFrame::filled(64, 48, (self.device_id as u8, 0, 0))
    }

    fn properties(&self) -> Result<DeviceProperties> {
        Ok(DeviceProperties {
            width: 64,
            height: 48,
            fps: 30.0,
            fourcc: None,
            backend: "FAKE".to_string(),
        })
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            let mut state = self.state.lock().unwrap();
            if let Some(open) = state.open_handles.get_mut(&self.device_id) {
                *open -= 1;
            }
        }
    }
}

impl Drop for FakeCamera {
    fn drop(&mut self) {
        self.release();
    }
}

/// Frames written per clip path
#[derive(Default)]
pub struct WriterLog {
    pub created: Vec<PathBuf>,
    pub frames: HashMap<PathBuf, u64>,
    pub released: Vec<PathBuf>,
}

/// Creates an empty file per clip and counts writes in memory
#[derive(Clone, Default)]
pub struct FakeWriterFactory {
    /// Device ids whose writer fails to open
    pub failing: Vec<i32>,
    pub log: Arc<Mutex<WriterLog>>,
}

impl FakeWriterFactory {
    pub fn failing(ids: &[i32]) -> Self {
        Self {
            failing: ids.to_vec(),
            log: Arc::default(),
        }
    }

    pub fn frames_for(&self, path: &Path) -> u64 {
        let log = self.log.lock().unwrap();
        log.frames.get(path).copied().unwrap_or(0)
    }
}

impl WriterFactory for FakeWriterFactory {
    fn create(&self, path: &Path, _config: &VideoConfig) -> Result<Box<dyn FrameWriter>> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if self
            .failing
            .iter()
            .any(|id| name.starts_with(&format!("clip_cam{}_", id)))
        {
            return Err(CaptureError::Recording("codec unavailable".to_string()));
        }

        File::create(path)?;
        self.log.lock().unwrap().created.push(path.to_path_buf());
        Ok(Box::new(FakeWriter {
            path: path.to_path_buf(),
            log: Arc::clone(&self.log),
        }))
    }
}

struct FakeWriter {
    path: PathBuf,
    log: Arc<Mutex<WriterLog>>,
}

impl FrameWriter for FakeWriter {
    fn write(&mut self, _frame: &VideoFrame) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        *log.frames.entry(self.path.clone()).or_insert(0) += 1;
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.log.lock().unwrap().released.push(self.path.clone());
        Ok(())
    }
}

pub fn test_logger() -> Logger {
    Logger::detached(LogLevel::Debug, false)
}

/// Short deadlines so failure paths finish quickly
pub fn fast_timeouts() -> CaptureTimeouts {
    CaptureTimeouts {
        probe: Duration::from_millis(500),
        init: Duration::from_secs(2),
        join: Duration::from_millis(500),
        trial_reads: 3,
        trial_read_delay: Duration::from_millis(5),
        read_failure_backoff: Duration::from_millis(1),
        settle: Duration::from_millis(10),
    }
}

pub fn test_config() -> VideoConfig {
    VideoConfig::new(100.0, 64, 48).unwrap()
}

/// Polls `condition` for up to two seconds
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}
