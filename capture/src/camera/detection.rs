//! Camera device detection and enumeration.
//!
//! Three methods are tried in order and the first one that yields at least
//! one device wins:
//! 1. the OS device lister (names only, nothing is opened),
//! 2. sequential probing of ids `0..max_devices`,
//! 3. probing every `<dev_dir>/videoN` node.
//!
//! Probes are bounded by a wall-clock timeout and never fail detection as a
//! whole; a device that errors or hangs is simply reported as unavailable.

use crate::config::CaptureTimeouts;
use crate::constants::devices::{DEFAULT_DEV_DIR, DEFAULT_MAX_PROBE_DEVICES, DEVICE_NODE_PREFIX};
use logging::Logger;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::info::CameraInfo;
use super::lister::{DeviceLister, V4l2CtlLister};
use super::timeout::run_with_timeout;
use super::traits::{CameraOpener, CaptureApi};

/// Discovers which device ids are usable cameras
pub struct CameraDetector {
    opener: Arc<dyn CameraOpener>,
    lister: Option<Box<dyn DeviceLister>>,
    max_devices: i32,
    dev_dir: PathBuf,
    probe_timeout: Duration,
    logger: Logger,
}

impl CameraDetector {
    /// Creates a detector using `v4l2-ctl` as the OS lister
    ///
    /// # Arguments
    /// * `opener` - Opens devices for probing
    /// * `logger` - Parent logger; a `CameraDetector` component is derived from it
    pub fn new(opener: Arc<dyn CameraOpener>, logger: &Logger) -> Self {
        Self {
            opener,
            lister: Some(Box::new(V4l2CtlLister::new())),
            max_devices: DEFAULT_MAX_PROBE_DEVICES,
            dev_dir: PathBuf::from(DEFAULT_DEV_DIR),
            probe_timeout: CaptureTimeouts::default().probe,
            logger: logger.for_component("CameraDetector"),
        }
    }

    /// Replaces (or with `None`, disables) the OS lister
    pub fn with_lister(mut self, lister: Option<Box<dyn DeviceLister>>) -> Self {
        self.lister = lister;
        self
    }

    pub fn with_max_devices(mut self, max_devices: i32) -> Self {
        self.max_devices = max_devices.max(0);
        self
    }

    pub fn with_dev_dir(mut self, dev_dir: impl Into<PathBuf>) -> Self {
        self.dev_dir = dev_dir.into();
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Detects available cameras
    ///
    /// # Returns
    /// Map from device id to info, empty when nothing was found. Never fails.
    pub fn detect_available_cameras(&self) -> BTreeMap<i32, CameraInfo> {
        self.logger.info("Detecting available cameras...");

        let mut cameras = self.detect_with_lister();

        if cameras.is_empty() {
            self.logger.info("Falling back to sequential probing...");
            cameras = self.probe_ids(0..self.max_devices);
        }

        if cameras.is_empty() {
            self.logger.info(&format!(
                "Searching {}/{}* nodes...",
                self.dev_dir.display(),
                DEVICE_NODE_PREFIX
            ));
            cameras = self.probe_ids(list_device_nodes(&self.dev_dir));
        }

        if cameras.is_empty() {
            self.logger.warn("No cameras detected");
        } else {
            self.logger.info(&format!(
                "Detected {} camera(s): {:?}",
                cameras.len(),
                cameras.keys().collect::<Vec<_>>()
            ));
        }

        cameras
    }

    /// Opens the device, reads exactly one frame and releases it
    ///
    /// # Arguments
    /// * `device_id` - Device to test
    /// * `timeout` - Hard deadline for open + read
    ///
    /// # Returns
    /// * `true` only when a frame was read before the deadline
    pub fn test_camera_quick(&self, device_id: i32, timeout: Duration) -> bool {
        let opener = Arc::clone(&self.opener);
        let result = run_with_timeout(&format!("probe-video{}", device_id), timeout, move || {
            let mut device = opener.open(device_id, CaptureApi::V4l2)?;
            let frame = device.read_frame();
            device.release();
            frame.map(|_| ())
        });

        match result {
            Ok(()) => true,
            Err(e) => {
                self.logger
                    .debug(&format!("Device {} unavailable: {}", device_id, e));
                false
            }
        }
    }

    /// Reads negotiated properties of a device
    ///
    /// # Returns
    /// * `Some(CameraInfo)` - Device opened and reported its properties
    /// * `None` - Open, property read or the probe deadline failed
    pub fn get_camera_info(&self, device_id: i32) -> Option<CameraInfo> {
        let opener = Arc::clone(&self.opener);
        let result = run_with_timeout(
            &format!("info-video{}", device_id),
            self.probe_timeout,
            move || {
                let mut device = opener.open(device_id, CaptureApi::V4l2)?;
                let properties = device.properties();
                device.release();
                properties
            },
        );

        match result {
            Ok(properties) => Some(CameraInfo::from_properties(device_id, "Camera", properties)),
            Err(e) => {
                self.logger
                    .error(&format!("Error getting camera {} info: {}", device_id, e));
                None
            }
        }
    }

    fn detect_with_lister(&self) -> BTreeMap<i32, CameraInfo> {
        let Some(lister) = &self.lister else {
            return BTreeMap::new();
        };

        match lister.list_devices() {
            Ok(devices) => {
                let mut cameras = BTreeMap::new();
                for device in devices {
                    self.logger.info(&format!(
                        "Found camera: /dev/video{} -> {}",
                        device.device_id, device.name
                    ));
                    cameras.insert(device.device_id, CameraInfo::named(device.device_id, device.name));
                }
                cameras
            }
            Err(e) => {
                self.logger
                    .warn(&format!("OS device listing failed: {}", e));
                BTreeMap::new()
            }
        }
    }

    fn probe_ids(&self, ids: impl IntoIterator<Item = i32>) -> BTreeMap<i32, CameraInfo> {
        ids.into_iter()
            .filter(|&id| self.test_camera_quick(id, self.probe_timeout))
            .map(|id| (id, CameraInfo::unknown(id)))
            .collect()
    }
}

/// Lists `videoN` node ids in `dev_dir`, ascending
///
/// Entries that do not parse as `video<integer>` are skipped; an unreadable
/// directory yields an empty list.
pub fn list_device_nodes(dev_dir: &Path) -> Vec<i32> {
    let Ok(entries) = fs::read_dir(dev_dir) else {
        return Vec::new();
    };

    let mut ids: Vec<i32> = entries
        .flatten()
        .filter_map(|entry| {
            entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_prefix(DEVICE_NODE_PREFIX))
                .and_then(|id| id.parse::<i32>().ok())
        })
        .collect();

    ids.sort_unstable();
    ids.dedup();
    ids
}
