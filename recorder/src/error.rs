//! Error type for the operator application.

use capture::CaptureError;
use config_loader::ConfigError;
use logging::LoggingError;
use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// Configuration file missing values or holding invalid ones
    Config(String),
    /// Products database could not be written
    Products(String),
    /// No usable camera after detection / initialization
    NoCameras,
    Io(io::Error),
    Capture(CaptureError),
    Logging(LoggingError),
    /// Preview window or frame composition failed
    Display(opencv::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "Config error: {}", msg),
            AppError::Products(msg) => write!(f, "Products database error: {}", msg),
            AppError::NoCameras => write!(f, "No cameras could be initialized"),
            AppError::Io(err) => write!(f, "I/O error: {}", err),
            AppError::Capture(err) => write!(f, "{}", err),
            AppError::Logging(err) => write!(f, "Logging error: {}", err),
            AppError::Display(err) => write!(f, "Display error: {}", err),
        }
    }
}

impl std::error::Error for AppError {}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<LoggingError> for AppError {
    fn from(err: LoggingError) -> Self {
        AppError::Logging(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<opencv::Error> for AppError {
    fn from(err: opencv::Error) -> Self {
        AppError::Display(err)
    }
}
