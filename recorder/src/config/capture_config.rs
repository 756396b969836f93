use serde::{Deserialize, Serialize};

/// Which devices to use and where to look for them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Fixed device ids; empty means auto-detect at startup
    pub device_ids: Vec<i32>,
    /// Sequential probing covers ids `0..max_probe_devices`
    pub max_probe_devices: i32,
    /// Directory holding the `videoN` device nodes
    pub dev_dir: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        CaptureConfig {
            device_ids: Vec::new(),
            max_probe_devices: 10,
            dev_dir: "/dev".to_string(),
        }
    }
}

impl CaptureConfig {
    pub fn auto_detect(&self) -> bool {
        self.device_ids.is_empty()
    }
}
