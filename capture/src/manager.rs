//! Camera lifetimes and capture workers.
//!
//! `CameraManager` owns every open device. While threads are running each
//! device is moved into its own worker, which is the only code that touches
//! it; frames leave the worker through the device's `FrameSlot`. Stopping a
//! worker hands the device back so it can be restarted or released.

use crate::camera::{CameraDetector, CameraDevice, CameraOpener, CaptureApi, run_with_timeout};
use crate::config::{CaptureTimeouts, VideoConfig};
use crate::constants::logging::{CAPTURE_LOG_INTERVAL, READ_FAILURE_LOG_INTERVAL};
use crate::error::{CaptureError, Result};
use crate::frame::VideoFrame;
use crate::slot::FrameSlot;
use logging::Logger;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Per-device capture counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    pub frames_captured: u64,
    pub read_failures: u64,
}

#[derive(Default)]
struct StatsCounters {
    frames_captured: AtomicU64,
    read_failures: AtomicU64,
}

impl StatsCounters {
    fn snapshot(&self) -> CaptureStats {
        CaptureStats {
            frames_captured: self.frames_captured.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
        }
    }
}

struct CaptureWorker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<Box<dyn CameraDevice>>,
}

/// One initialized device. Exactly one of `device` / `worker` holds the
/// handle at any time (both are empty after a worker was abandoned).
struct ActiveCamera {
    device: Option<Box<dyn CameraDevice>>,
    worker: Option<CaptureWorker>,
    slot: FrameSlot,
    stats: Arc<StatsCounters>,
}

/// Everything a capture worker needs, moved into its thread
struct WorkerContext {
    device: Box<dyn CameraDevice>,
    slot: FrameSlot,
    stats: Arc<StatsCounters>,
    stop: Arc<AtomicBool>,
    frame_interval: Duration,
    failure_backoff: Duration,
    logger: Logger,
}

/// Owns open cameras and their capture threads
pub struct CameraManager {
    config: VideoConfig,
    timeouts: CaptureTimeouts,
    opener: Arc<dyn CameraOpener>,
    cameras: BTreeMap<i32, ActiveCamera>,
    running: bool,
    logger: Logger,
}

impl CameraManager {
    /// Creates a manager with no open devices
    ///
    /// # Arguments
    /// * `config` - Resolution and frame rate applied to every device
    /// * `timeouts` - Deadlines for initialization and shutdown
    /// * `opener` - Opens devices by id
    /// * `logger` - Parent logger; a `CameraManager` component is derived from it
    pub fn new(
        config: VideoConfig,
        timeouts: CaptureTimeouts,
        opener: Arc<dyn CameraOpener>,
        logger: &Logger,
    ) -> Self {
        Self {
            config,
            timeouts,
            opener,
            cameras: BTreeMap::new(),
            running: false,
            logger: logger.for_component("CameraManager"),
        }
    }

    pub fn config(&self) -> &VideoConfig {
        &self.config
    }

    /// Opens and verifies every candidate device
    ///
    /// Devices that fail to open under every backend, or never produce a
    /// frame, are dropped. Any previously active devices are cleaned up first.
    ///
    /// # Arguments
    /// * `candidates` - Device ids to try
    ///
    /// # Returns
    /// * `true` if at least one device is now active
    pub fn initialize_cameras(&mut self, candidates: &[i32]) -> bool {
        if !self.cameras.is_empty() {
            self.logger
                .info("Releasing active cameras before re-initialization");
            self.cleanup();
        }

        self.logger.info(&format!(
            "Initializing cameras {:?} at {}x{}",
            candidates,
            self.config.width(),
            self.config.height()
        ));

        for &device_id in candidates {
            if self.cameras.contains_key(&device_id) {
                continue;
            }

            match self.initialize_single_camera(device_id) {
                Ok((device, frame)) => {
                    self.logger.info(&format!(
                        "Camera {} initialized successfully - {}x{}",
                        device_id,
                        frame.width(),
                        frame.height()
                    ));
                    self.cameras.insert(
                        device_id,
                        ActiveCamera {
                            device: Some(device),
                            worker: None,
                            slot: FrameSlot::seeded(frame),
                            stats: Arc::new(StatsCounters::default()),
                        },
                    );
                }
                Err(e) => {
                    self.logger
                        .error(&format!("Camera {} initialization failed: {}", device_id, e));
                }
            }
        }

        if self.cameras.is_empty() {
            self.logger.error("No cameras were initialized successfully");
            return false;
        }

        self.logger.info(&format!(
            "Successfully initialized {} camera(s): {:?}",
            self.cameras.len(),
            self.active_device_ids()
        ));
        true
    }

    /// Opens, configures and trial-reads one device under the init deadline
    fn initialize_single_camera(&self, device_id: i32) -> Result<(Box<dyn CameraDevice>, VideoFrame)> {
        let opener = Arc::clone(&self.opener);
        let config = self.config.clone();
        let trial_reads = self.timeouts.trial_reads.max(1);
        let trial_delay = self.timeouts.trial_read_delay;
        let logger = self.logger.clone();

        run_with_timeout(
            &format!("init-video{}", device_id),
            self.timeouts.init,
            move || {
                let mut device = open_with_preference(opener.as_ref(), device_id, &logger)?;
                device.configure(&config)?;

                for attempt in 1..=trial_reads {
                    match device.read_frame() {
                        Ok(frame) => return Ok((device, frame)),
                        Err(e) => {
                            logger.debug(&format!(
                                "Camera {} trial read {}/{} failed: {}",
                                device_id, attempt, trial_reads, e
                            ));
                            if attempt < trial_reads {
                                thread::sleep(trial_delay);
                            }
                        }
                    }
                }

                device.release();
                Err(CaptureError::Camera(format!(
                    "Device {} opened but produced no frames",
                    device_id
                )))
            },
        )
    }

    /// Starts one capture worker per active device
    ///
    /// No-op when workers are already running.
    ///
    /// # Returns
    /// Number of workers running afterwards. The manager only counts as
    /// running when this is at least one.
    pub fn start_capture_threads(&mut self) -> usize {
        if self.running {
            return self.worker_count();
        }
        if self.cameras.is_empty() {
            self.logger.warn("No active cameras, capture threads not started");
            return 0;
        }

        let frame_interval = self.config.frame_interval();
        let failure_backoff = self.timeouts.read_failure_backoff;

        let mut started = 0;
        for (&device_id, camera) in self.cameras.iter_mut() {
            let Some(device) = camera.device.take() else {
                self.logger.warn(&format!(
                    "Camera {} has no device handle, skipping capture thread",
                    device_id
                ));
                continue;
            };

            let stop = Arc::new(AtomicBool::new(false));
            let context = WorkerContext {
                device,
                slot: camera.slot.clone(),
                stats: Arc::clone(&camera.stats),
                stop: Arc::clone(&stop),
                frame_interval,
                failure_backoff,
                logger: self.logger.clone(),
            };

            let spawned = thread::Builder::new()
                .name(format!("capture-cam{}", device_id))
                .spawn(move || capture_loop(context));

            match spawned {
                Ok(handle) => {
                    camera.worker = Some(CaptureWorker { stop, handle });
                    started += 1;
                    self.logger
                        .info(&format!("Capture thread started for camera {}", device_id));
                }
                Err(e) => {
                    // The context (and the device inside it) was consumed by
                    // the failed spawn and has been dropped, releasing it.
                    self.logger.error(&format!(
                        "Failed to spawn capture thread for camera {}: {}",
                        device_id, e
                    ));
                }
            }
        }

        if started == 0 {
            self.logger.error("No capture thread could be started");
        }
        self.running = started > 0;
        started
    }

    fn worker_count(&self) -> usize {
        self.cameras.values().filter(|c| c.worker.is_some()).count()
    }

    /// Signals every worker to stop and joins each within the join window
    ///
    /// Devices of workers that exit in time are kept for a later restart.
    /// A worker that misses the window is abandoned; its device is released
    /// when that thread eventually returns.
    pub fn stop_capture_threads(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;

        for camera in self.cameras.values() {
            if let Some(worker) = &camera.worker {
                worker.stop.store(true, Ordering::Release);
            }
        }

        for (&device_id, camera) in self.cameras.iter_mut() {
            let Some(worker) = camera.worker.take() else {
                continue;
            };

            let deadline = Instant::now() + self.timeouts.join;
            while !worker.handle.is_finished() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(5));
            }

            if !worker.handle.is_finished() {
                self.logger.warn(&format!(
                    "Capture thread for camera {} did not stop within {:.1}s, abandoning it",
                    device_id,
                    self.timeouts.join.as_secs_f64()
                ));
                continue;
            }

            match worker.handle.join() {
                Ok(device) => camera.device = Some(device),
                Err(_) => self
                    .logger
                    .error(&format!("Capture thread for camera {} panicked", device_id)),
            }
        }

        self.logger.info("All capture threads stopped");
    }

    /// Stops workers, releases every device and clears all frame slots
    pub fn cleanup(&mut self) {
        self.stop_capture_threads();

        let count = self.cameras.len();
        for (_, mut camera) in std::mem::take(&mut self.cameras) {
            if let Some(mut device) = camera.device.take() {
                device.release();
            }
            camera.slot.clear();
        }

        if count > 0 {
            self.logger
                .info(&format!("Camera resources cleaned up ({} device(s))", count));
        }
    }

    /// Releases everything and re-initializes the previously active ids
    ///
    /// Ids whose device no longer reports its properties are dropped.
    ///
    /// # Returns
    /// * `true` if at least one device is capturing again
    pub fn restart_cameras(&mut self, detector: &CameraDetector) -> bool {
        let previous = self.active_device_ids();
        self.logger
            .info(&format!("Restarting cameras {:?}", previous));

        self.cleanup();
        thread::sleep(self.timeouts.settle);

        let available: Vec<i32> = previous
            .into_iter()
            .filter(|&id| {
                let present = detector.get_camera_info(id).is_some();
                if !present {
                    self.logger
                        .warn(&format!("Camera {} is no longer available", id));
                }
                present
            })
            .collect();

        if available.is_empty() {
            self.logger.error("No cameras available after restart");
            return false;
        }

        self.reinitialize(&available)
    }

    /// Releases everything, runs full detection and initializes what is found
    ///
    /// # Returns
    /// * `true` if at least one device is capturing
    pub fn force_redetect(&mut self, detector: &CameraDetector) -> bool {
        self.logger.info("Forcing camera re-detection");

        self.cleanup();
        thread::sleep(self.timeouts.settle);

        let detected: Vec<i32> = detector.detect_available_cameras().into_keys().collect();
        if detected.is_empty() {
            self.logger.error("No cameras detected");
            return false;
        }

        self.reinitialize(&detected)
    }

    fn reinitialize(&mut self, ids: &[i32]) -> bool {
        if !self.initialize_cameras(ids) {
            return false;
        }
        self.start_capture_threads() > 0
    }

    /// Active device ids, ascending
    pub fn active_device_ids(&self) -> Vec<i32> {
        self.cameras.keys().copied().collect()
    }

    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Copy of a device's most recent frame
    pub fn latest_frame(&self, device_id: i32) -> Option<VideoFrame> {
        self.cameras.get(&device_id)?.slot.latest()
    }

    /// Most recent frame of every active device that has one, by id
    pub fn latest_frames(&self) -> Vec<(i32, VideoFrame)> {
        self.cameras
            .iter()
            .filter_map(|(&id, camera)| camera.slot.latest().map(|frame| (id, frame)))
            .collect()
    }

    /// Shared handle to a device's slot
    pub fn frame_slot(&self, device_id: i32) -> Option<FrameSlot> {
        self.cameras.get(&device_id).map(|camera| camera.slot.clone())
    }

    pub fn capture_stats(&self, device_id: i32) -> Option<CaptureStats> {
        self.cameras
            .get(&device_id)
            .map(|camera| camera.stats.snapshot())
    }
}

impl Drop for CameraManager {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Tries each backend in preference order
fn open_with_preference(
    opener: &dyn CameraOpener,
    device_id: i32,
    logger: &Logger,
) -> Result<Box<dyn CameraDevice>> {
    let mut last_error = None;

    for api in CaptureApi::PREFERENCE {
        match opener.open(device_id, api) {
            Ok(device) => {
                logger.debug(&format!("Camera {} opened via {}", device_id, api));
                return Ok(device);
            }
            Err(e) => {
                logger.debug(&format!("Camera {} failed via {}: {}", device_id, api, e));
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        CaptureError::Camera(format!("Could not open device {} with any backend", device_id))
    }))
}

/// Capture worker body: read, publish, pace. Returns the device on stop.
fn capture_loop(context: WorkerContext) -> Box<dyn CameraDevice> {
    let WorkerContext {
        mut device,
        slot,
        stats,
        stop,
        frame_interval,
        failure_backoff,
        logger,
    } = context;

    let device_id = device.device_id();
    let mut consecutive_failures: u64 = 0;

    while !stop.load(Ordering::Acquire) {
        let started = Instant::now();

        match device.read_frame() {
            Ok(frame) => {
                slot.store(frame);
                consecutive_failures = 0;
                let captured = stats.frames_captured.fetch_add(1, Ordering::Relaxed) + 1;
                if captured.is_multiple_of(CAPTURE_LOG_INTERVAL) {
                    logger.debug(&format!("Camera {}: {} frames captured", device_id, captured));
                }
            }
            Err(e) => {
                stats.read_failures.fetch_add(1, Ordering::Relaxed);
                consecutive_failures += 1;
                if consecutive_failures == 1
                    || consecutive_failures.is_multiple_of(READ_FAILURE_LOG_INTERVAL)
                {
                    logger.warn(&format!(
                        "Failed to read from camera {} ({} consecutive): {}",
                        device_id, consecutive_failures, e
                    ));
                }
                thread::sleep(failure_backoff);
            }
        }

        let elapsed = started.elapsed();
        if elapsed < frame_interval {
            thread::sleep(frame_interval - elapsed);
        }
    }

    logger.debug(&format!("Capture thread for camera {} exiting", device_id));
    device
}
