//! Error types for logging operations.

use std::fmt;
use std::io;

/// Result type for logging operations.
pub type Result<T> = std::result::Result<T, LoggingError>;

/// Errors that can occur while setting up or using a logger.
#[derive(Debug)]
pub enum LoggingError {
    /// I/O error from file operations.
    Io(io::Error),
    /// Unknown log level name.
    InvalidLevel(String),
    /// The writer thread is gone or did not answer in time.
    Writer(String),
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggingError::Io(err) => write!(f, "I/O error: {}", err),
            LoggingError::InvalidLevel(level) => write!(f, "Unknown log level: '{}'", level),
            LoggingError::Writer(msg) => write!(f, "Log writer error: {}", msg),
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoggingError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for LoggingError {
    fn from(err: io::Error) -> Self {
        LoggingError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io::ErrorKind;

    #[test]
    fn test_invalid_level_display() {
        let err = LoggingError::InvalidLevel("verbose".to_string());
        assert_eq!(err.to_string(), "Unknown log level: 'verbose'");
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err: LoggingError = io::Error::new(ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, LoggingError::Io(_)));
        assert!(err.source().is_some());
    }
}
