use std::fmt;

/// Result type used across the crate
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while locating, reading or writing configuration files
#[derive(Debug)]
pub enum ConfigError {
    /// No file at the given location (or at any searched location)
    FileNotFound(String),

    /// The file exists but could not be read
    ReadError(String),

    /// The file could not be written or replaced
    WriteError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => {
                write!(f, "Configuration file not found: {}", path)
            }
            ConfigError::ReadError(msg) => {
                write!(f, "Failed to read configuration file: {}", msg)
            }
            ConfigError::WriteError(msg) => {
                write!(f, "Failed to write configuration file: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
