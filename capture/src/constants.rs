//! Constants shared across capture modules

/// Logging cadence for long-running loops
pub mod logging {
    /// Log capture progress every N frames per device
    pub const CAPTURE_LOG_INTERVAL: u64 = 1000;
    /// After the first failed read, log only every N-th consecutive failure
    pub const READ_FAILURE_LOG_INTERVAL: u64 = 30;
}

/// Device enumeration defaults
pub mod devices {
    /// Device ids probed sequentially: 0..N
    pub const DEFAULT_MAX_PROBE_DEVICES: i32 = 10;
    /// Directory scanned for `video<N>` nodes
    pub const DEFAULT_DEV_DIR: &str = "/dev";
    /// File name prefix of capture device nodes
    pub const DEVICE_NODE_PREFIX: &str = "video";
    /// Deadline for the OS device-listing utility
    pub const LISTER_TIMEOUT_SECS: u64 = 5;
}
