//! Thread-safe, non-blocking component logger.
//!
//! One writer thread owns the log file; every [`Logger`] clone (and every
//! component logger derived from it) feeds the same channel.

pub mod error;
mod log_level;
mod log_message;
mod log_writer;
mod logger;

pub use error::{LoggingError, Result};
pub use log_level::LogLevel;
pub use logger::Logger;
