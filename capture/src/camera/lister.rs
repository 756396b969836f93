//! OS-level device listing.
//!
//! The first detection method asks the system for named capture devices
//! instead of opening anything. `V4l2CtlLister` wraps `v4l2-ctl
//! --list-devices`; other listers can be plugged in through `DeviceLister`.

use crate::constants::devices::LISTER_TIMEOUT_SECS;
use crate::error::{CaptureError, Result};
use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// A device node reported by the OS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedDevice {
    pub device_id: i32,
    pub name: String,
}

/// Enumerates named capture devices without opening them
pub trait DeviceLister: Send + Sync {
    fn list_devices(&self) -> Result<Vec<ListedDevice>>;
}

/// Runs `v4l2-ctl --list-devices` under a deadline
pub struct V4l2CtlLister {
    program: String,
    timeout: Duration,
}

impl V4l2CtlLister {
    pub fn new() -> Self {
        Self {
            program: "v4l2-ctl".to_string(),
            timeout: Duration::from_secs(LISTER_TIMEOUT_SECS),
        }
    }

    /// Uses a different executable (same output format)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the program and collects its stdout. Output is drained on a
    /// helper thread while the child runs, so a listing larger than the pipe
    /// buffer cannot stall it.
    fn wait_for_output(&self) -> Result<String> {
        let mut child = Command::new(&self.program)
            .arg("--list-devices")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let Some(mut stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(CaptureError::Camera(format!("{} has no stdout", self.program)));
        };
        let (tx, rx) = mpsc::channel();
        let reader = thread::Builder::new()
            .name("device-listing".to_string())
            .spawn(move || {
                let mut output = String::new();
                let result = stdout.read_to_string(&mut output).map(|_| output);
                let _ = tx.send(result);
            });
        if let Err(e) = reader {
            let _ = child.kill();
            let _ = child.wait();
            return Err(e.into());
        }

        let deadline = Instant::now() + self.timeout;
        let timed_out = || {
            CaptureError::Timeout(format!(
                "{} did not finish within {}s",
                self.program,
                self.timeout.as_secs()
            ))
        };
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(timed_out());
            }
            thread::sleep(Duration::from_millis(20));
        };

        if !status.success() {
            return Err(CaptureError::Camera(format!(
                "{} exited with {}",
                self.program, status
            )));
        }

        match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(output) => Ok(output?),
            Err(_) => Err(timed_out()),
        }
    }
}

impl Default for V4l2CtlLister {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceLister for V4l2CtlLister {
    fn list_devices(&self) -> Result<Vec<ListedDevice>> {
        let output = self.wait_for_output()?;
        Ok(parse_v4l2_listing(&output))
    }
}

/// Parses `v4l2-ctl --list-devices` output.
///
/// A line that is not a `/dev/videoN` path names the device; the
/// `/dev/videoN` lines that follow belong to it. Other nodes (`/dev/media0`)
/// are ignored.
pub fn parse_v4l2_listing(output: &str) -> Vec<ListedDevice> {
    let mut devices = Vec::new();
    let mut current_name: Option<&str> = None;

    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(id) = line.strip_prefix("/dev/video") {
            if let Ok(device_id) = id.parse::<i32>() {
                devices.push(ListedDevice {
                    device_id,
                    name: current_name.unwrap_or("Unknown").to_string(),
                });
            }
        } else if !line.starts_with("/dev/") {
            current_name = Some(line.trim_end_matches(':'));
        }
    }

    devices
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
HD Pro Webcam C920 (usb-0000:00:14.0-1):
\t/dev/video0
\t/dev/video1
\t/dev/media0

USB2.0 Camera: USB2.0 Camera (usb-0000:00:14.0-2):
\t/dev/video2
\t/dev/video3
\t/dev/media1
";

    #[test]
    fn test_parse_listing_assigns_names() {
        let devices = parse_v4l2_listing(SAMPLE);
        let ids: Vec<i32> = devices.iter().map(|d| d.device_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(devices[0].name, "HD Pro Webcam C920 (usb-0000:00:14.0-1)");
        assert_eq!(devices[3].name, "USB2.0 Camera: USB2.0 Camera (usb-0000:00:14.0-2)");
    }

    #[test]
    fn test_parse_listing_without_header() {
        let devices = parse_v4l2_listing("/dev/video4\n/dev/videoX\n");
        assert_eq!(
            devices,
            vec![ListedDevice {
                device_id: 4,
                name: "Unknown".to_string()
            }]
        );
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_v4l2_listing("").is_empty());
        assert!(parse_v4l2_listing("Cannot open device /dev/video0\n").is_empty());
    }

    #[cfg(unix)]
    fn script(dir: &std::path::Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-v4l2-ctl");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[test]
    fn test_listing_larger_than_pipe_buffer() {
        let dir = tempfile::tempdir().unwrap();
        // ~300 KB, several times a pipe buffer
        let program = script(dir.path(), "yes /dev/video0 | head -n 25000");
        let lister = V4l2CtlLister::new()
            .with_program(program)
            .with_timeout(Duration::from_secs(5));

        let started = Instant::now();
        // Retry covers ETXTBSY when a parallel test forks while the script is being written
        let devices = (0..5)
            .find_map(|_| lister.list_devices().ok())
            .expect("listing should succeed");
        assert_eq!(devices.len(), 25000);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn test_hanging_program_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let program = script(dir.path(), "exec sleep 10");
        let lister = V4l2CtlLister::new()
            .with_program(program)
            .with_timeout(Duration::from_millis(300));

        let started = Instant::now();
        let mut result = lister.list_devices();
        for _ in 0..4 {
            if !matches!(result, Err(CaptureError::Io(_))) {
                break;
            }
            result = lister.list_devices();
        }
        assert!(matches!(result, Err(CaptureError::Timeout(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let lister = V4l2CtlLister::new().with_program("definitely-not-a-real-v4l2-binary");
        assert!(lister.list_devices().is_err());
    }
}
