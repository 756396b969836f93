//! Error types for frame extraction.

use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, ExtractError>;

/// Error type for extraction operations
#[derive(Debug)]
pub enum ExtractError {
    /// I/O error
    Io(io::Error),
    /// OpenCV error
    OpenCv(opencv::Error),
    /// A clip could not be opened or decoded
    Clip(String),
    /// A clip group cannot be extracted as a whole
    Group(String),
    /// Invalid option or argument
    Config(String),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::Io(err) => write!(f, "I/O error: {}", err),
            ExtractError::OpenCv(err) => write!(f, "OpenCV error: {}", err),
            ExtractError::Clip(msg) => write!(f, "Clip error: {}", msg),
            ExtractError::Group(msg) => write!(f, "Group error: {}", msg),
            ExtractError::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for ExtractError {}

impl From<io::Error> for ExtractError {
    fn from(err: io::Error) -> Self {
        ExtractError::Io(err)
    }
}

impl From<opencv::Error> for ExtractError {
    fn from(err: opencv::Error) -> Self {
        ExtractError::OpenCv(err)
    }
}

impl From<capture::CaptureError> for ExtractError {
    fn from(err: capture::CaptureError) -> Self {
        match err {
            capture::CaptureError::Io(e) => ExtractError::Io(e),
            capture::CaptureError::OpenCv(e) => ExtractError::OpenCv(e),
            other => ExtractError::Clip(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExtractError::Group("min_frames is 0".to_string());
        assert_eq!(err.to_string(), "Group error: min_frames is 0");
    }

    #[test]
    fn test_from_capture_error() {
        let err: ExtractError = capture::CaptureError::Camera("gone".to_string()).into();
        assert!(matches!(err, ExtractError::Clip(_)));

        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: ExtractError = capture::CaptureError::Io(io_err).into();
        assert!(matches!(err, ExtractError::Io(_)));
    }
}
