//! Error types for capture and recording operations.

use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, CaptureError>;

/// Error type for capture operations
#[derive(Debug)]
pub enum CaptureError {
    /// Invalid configuration value
    Config(String),
    /// I/O error
    Io(io::Error),
    /// Device could not be opened, configured or read
    Camera(String),
    /// A bounded device operation did not finish in time
    Timeout(String),
    /// Recording session error
    Recording(String),
    /// OpenCV error
    OpenCv(opencv::Error),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Config(msg) => write!(f, "Config error: {}", msg),
            CaptureError::Io(err) => write!(f, "I/O error: {}", err),
            CaptureError::Camera(msg) => write!(f, "Camera error: {}", msg),
            CaptureError::Timeout(msg) => write!(f, "Timed out: {}", msg),
            CaptureError::Recording(msg) => write!(f, "Recording error: {}", msg),
            CaptureError::OpenCv(err) => write!(f, "OpenCV error: {}", err),
        }
    }
}

impl std::error::Error for CaptureError {}

impl From<io::Error> for CaptureError {
    fn from(err: io::Error) -> Self {
        CaptureError::Io(err)
    }
}

impl From<opencv::Error> for CaptureError {
    fn from(err: opencv::Error) -> Self {
        CaptureError::OpenCv(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_camera() {
        let err = CaptureError::Camera("Device 4 not found".to_string());
        assert_eq!(err.to_string(), "Camera error: Device 4 not found");
    }

    #[test]
    fn test_error_display_timeout() {
        let err = CaptureError::Timeout("probe of device 2 after 3s".to_string());
        assert_eq!(err.to_string(), "Timed out: probe of device 2 after 3s");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: CaptureError = io_err.into();
        assert!(matches!(err, CaptureError::Io(_)));
    }
}
